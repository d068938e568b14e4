use crate::errors::{FilterError, FilterResult};
use crate::limits::TranslatorLimits;
use crate::params::QueryParams;
use crate::spec::FilterSpec;
use crate::{LIMIT_PARAM, OFFSET_PARAM, SORT_PARAM};

/// Result of running query parameters through a [`FilterSpec`].
///
/// Fragments are meant to be AND-combined by the persistence layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedQuery<Q> {
    pub fragments: Vec<Q>,
    /// Sort keys, a leading `-` meaning descending.
    pub sort: Vec<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl<Q> TranslatedQuery<Q> {
    /// Effective limit under the endpoint's bounds.
    #[must_use]
    pub fn limit_or(&self, limits: &TranslatorLimits) -> u64 {
        limits.clamp_limit(self.limit)
    }

    /// Append a fragment not derived from client input, e.g. access scoping.
    pub fn push_fragment(&mut self, fragment: Q) {
        self.fragments.push(fragment);
    }
}

impl<Q> Default for TranslatedQuery<Q> {
    fn default() -> Self {
        Self {
            fragments: Vec::new(),
            sort: Vec::new(),
            limit: None,
            offset: None,
        }
    }
}

/// Translate raw query parameters with `spec`.
///
/// `limit` and `offset` are taken out first and silently left unset when not
/// a non-negative integer. Every other key must be known to `spec`; a rule is
/// skipped when any of its exclusion keys is present.
///
/// # Errors
/// - `FilterError::UnknownFilter` naming every unknown key
/// - `FilterError::InvalidFilterValue` when a parser rejects a value
/// - `FilterError::MissingRequiredFilter` when a required rule was not triggered
/// - `FilterError::InvalidSortKey` for a sort key outside the spec's whitelist
pub fn translate<Q>(params: &QueryParams, spec: &FilterSpec<Q>) -> FilterResult<TranslatedQuery<Q>> {
    let mut params = params.clone();

    let limit = last_non_negative(&params.take_all(LIMIT_PARAM));
    let offset = last_non_negative(&params.take_all(OFFSET_PARAM));
    let sort = params
        .take_all(SORT_PARAM)
        .into_iter()
        .flat_map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    for key in &sort {
        if !spec.is_sortable(key.trim_start_matches('-')) {
            return Err(FilterError::InvalidSortKey(key.clone()));
        }
    }

    let keys = params.keys();

    let mut unknown: Vec<String> = keys
        .iter()
        .filter(|k| spec.get(k).is_none())
        .map(|k| (*k).to_owned())
        .collect();
    if !unknown.is_empty() {
        unknown.sort();
        return Err(FilterError::UnknownFilter(unknown));
    }

    let mut fragments = Vec::with_capacity(keys.len());
    let mut triggered: Vec<&str> = Vec::with_capacity(keys.len());

    for key in &keys {
        let Some(rule) = spec.get(key) else {
            continue;
        };
        if rule.exclusions().iter().any(|ex| params.contains(ex)) {
            continue;
        }
        let values: Vec<&str> = params.get_all(key).collect();
        let fragment = rule
            .apply(&values)
            .map_err(|e| FilterError::invalid_value(key, &e))?;
        fragments.push(fragment);
        triggered.push(*key);
    }

    let missing: Vec<String> = spec
        .rules()
        .filter(|(key, rule)| rule.is_required() && !triggered.contains(key))
        .map(|(key, _)| key.to_owned())
        .collect();
    if !missing.is_empty() {
        return Err(FilterError::MissingRequiredFilter(missing));
    }

    Ok(TranslatedQuery {
        fragments,
        sort,
        limit,
        offset,
    })
}

fn last_non_negative(values: &[String]) -> Option<u64> {
    values.last().and_then(|v| v.trim().parse::<u64>().ok())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::parsers;
    use crate::spec::FilterRule;

    fn spec() -> FilterSpec<String> {
        FilterSpec::new()
            .with(
                "category",
                FilterRule::single(parsers::non_empty_string, |v| format!("category={v}")),
            )
            .with(
                "subcategory",
                FilterRule::single(parsers::non_empty_string, |v| format!("subcategory={v}"))
                    .excluded_by(["work_area"]),
            )
            .with(
                "number",
                FilterRule::single(parsers::integer, |v| format!("number={v}")),
            )
    }

    #[test]
    fn limit_and_offset_never_fail() {
        let params = QueryParams::from_pairs([("limit", "-3"), ("offset", "abc")]);
        let q = translate(&params, &spec()).unwrap();
        assert_eq!(q.limit, None);
        assert_eq!(q.offset, None);

        let params = QueryParams::from_pairs([("limit", "15"), ("offset", "30")]);
        let q = translate(&params, &spec()).unwrap();
        assert_eq!(q.limit, Some(15));
        assert_eq!(q.offset, Some(30));
    }

    #[test]
    fn sort_by_repeats_and_splits() {
        let params = QueryParams::from_pairs([("sort_by", "-created,number"), ("sort_by", "id")]);
        let q = translate(&params, &spec()).unwrap();
        assert_eq!(q.sort, vec!["-created", "number", "id"]);
    }

    #[test]
    fn single_rule_uses_last_value() {
        let params = QueryParams::from_pairs([("number", "1"), ("number", "2")]);
        let q = translate(&params, &spec()).unwrap();
        assert_eq!(q.fragments, vec!["number=2".to_owned()]);
    }

    #[test]
    fn unknown_key_is_rejected_even_when_it_would_exclude() {
        let params = QueryParams::from_pairs([("subcategory", "x"), ("work_area", "y")]);
        let err = translate(&params, &spec()).unwrap_err();
        assert_eq!(err, FilterError::UnknownFilter(vec!["work_area".to_owned()]));
    }

    #[test]
    fn required_rule_absent() {
        let spec = spec().with(
            "created__gte",
            FilterRule::single(parsers::datetime, |d| d.to_rfc3339()).required(),
        );
        let err = translate(&QueryParams::new(), &spec).unwrap_err();
        assert_eq!(
            err,
            FilterError::MissingRequiredFilter(vec!["created__gte".to_owned()])
        );
    }

    #[test]
    fn sort_key_whitelist() {
        let spec = spec().sortable(["number"]);
        let params = QueryParams::from_pairs([("sort_by", "-number")]);
        assert!(translate(&params, &spec).is_ok());

        let params = QueryParams::from_pairs([("sort_by", "secret")]);
        assert_eq!(
            translate(&params, &spec).unwrap_err(),
            FilterError::InvalidSortKey("secret".to_owned())
        );
    }
}
