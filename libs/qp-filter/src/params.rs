use crate::errors::FilterError;

/// Ordered multimap of raw query parameters.
///
/// Keeps every repetition of a key in arrival order, which is what `MANY`
/// rules and repeated `sort_by` values rely on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw `a=1&b=2&a=3` query string.
    ///
    /// # Errors
    /// Returns `FilterError::MalformedQuery` if the string is not valid
    /// `application/x-www-form-urlencoded` data.
    pub fn from_query_str(raw: &str) -> Result<Self, FilterError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw)
            .map_err(|e| FilterError::MalformedQuery(e.to_string()))?;
        Ok(Self { pairs })
    }

    #[must_use]
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// All values of `key`, in arrival order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Distinct keys in the order they were first seen.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for (k, _) in &self.pairs {
            if !out.contains(&k.as_str()) {
                out.push(k);
            }
        }
        out
    }

    /// Remove every value of `key` and return them in arrival order.
    #[must_use]
    pub fn take_all(&mut self, key: &str) -> Vec<String> {
        let (taken, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pairs).into_iter().partition(|(k, _)| k == key);
        self.pairs = kept;
        taken.into_iter().map(|(_, v)| v).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_keys_in_order() {
        let params = QueryParams::from_query_str("a=1&b=2&a=3").unwrap();
        assert_eq!(params.get_all("a").collect::<Vec<_>>(), vec!["1", "3"]);
        assert_eq!(params.keys(), vec!["a", "b"]);
    }

    #[test]
    fn decodes_percent_escapes() {
        let params = QueryParams::from_query_str("area=1-5%D0%9F").unwrap();
        assert_eq!(params.get_all("area").next(), Some("1-5\u{41f}"));
    }

    #[test]
    fn take_all_removes_key() {
        let mut params = QueryParams::from_pairs([("sort_by", "a"), ("x", "1"), ("sort_by", "-b")]);
        assert_eq!(params.take_all("sort_by"), vec!["a", "-b"]);
        assert!(!params.contains("sort_by"));
        assert!(params.contains("x"));
    }
}
