use std::fmt;
use std::sync::Arc;

use crate::errors::ParseError;

type ApplyFn<Q> = dyn Fn(&[&str]) -> Result<Q, ParseError> + Send + Sync;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Multiplicity {
    /// The parameter is read once; a repeated key uses its last value.
    Single,
    /// Every repetition is parsed and handed to the builder as a list.
    Many,
}

/// One entry of a [`FilterSpec`].
///
/// The parser and the builder are fused into a single type-erased closure so
/// that rules with different value types can live in the same table.
pub struct FilterRule<Q> {
    apply: Arc<ApplyFn<Q>>,
    multiplicity: Multiplicity,
    exclusions: Vec<String>,
    required: bool,
}

impl<Q: 'static> FilterRule<Q> {
    /// Rule for a parameter that is read once.
    pub fn single<T, P, B>(parser: P, builder: B) -> Self
    where
        P: Fn(&str) -> Result<T, ParseError> + Send + Sync + 'static,
        B: Fn(T) -> Q + Send + Sync + 'static,
    {
        let apply = move |values: &[&str]| {
            let raw = values.last().copied().unwrap_or_default();
            parser(raw).map(&builder)
        };
        Self {
            apply: Arc::new(apply),
            multiplicity: Multiplicity::Single,
            exclusions: Vec::new(),
            required: false,
        }
    }

    /// Rule for a parameter that may repeat; values are parsed elementwise.
    pub fn many<T, P, B>(parser: P, builder: B) -> Self
    where
        P: Fn(&str) -> Result<T, ParseError> + Send + Sync + 'static,
        B: Fn(Vec<T>) -> Q + Send + Sync + 'static,
    {
        let apply = move |values: &[&str]| {
            values
                .iter()
                .map(|raw| parser(raw))
                .collect::<Result<Vec<T>, ParseError>>()
                .map(&builder)
        };
        Self {
            apply: Arc::new(apply),
            multiplicity: Multiplicity::Many,
            exclusions: Vec::new(),
            required: false,
        }
    }
}

impl<Q> FilterRule<Q> {
    /// Skip this rule whenever any of `keys` is present in the same request.
    #[must_use]
    pub fn excluded_by<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for key in keys {
            let key = key.into();
            if !self.exclusions.contains(&key) {
                self.exclusions.push(key);
            }
        }
        self
    }

    /// Translation fails when this rule is not triggered.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn multiplicity(&self) -> Multiplicity {
        self.multiplicity
    }

    #[must_use]
    pub fn exclusions(&self) -> &[String] {
        &self.exclusions
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    pub(crate) fn apply(&self, values: &[&str]) -> Result<Q, ParseError> {
        (self.apply)(values)
    }
}

impl<Q> Clone for FilterRule<Q> {
    fn clone(&self) -> Self {
        Self {
            apply: Arc::clone(&self.apply),
            multiplicity: self.multiplicity,
            exclusions: self.exclusions.clone(),
            required: self.required,
        }
    }
}

impl<Q> fmt::Debug for FilterRule<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRule")
            .field("multiplicity", &self.multiplicity)
            .field("exclusions", &self.exclusions)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

/// Per-endpoint filter table with unique keys.
///
/// Variants for other views are derived by overriding or removing a few keys
/// of a base spec rather than by building a new one from scratch.
pub struct FilterSpec<Q> {
    rules: Vec<(String, FilterRule<Q>)>,
    sortable: Option<Vec<String>>,
}

impl<Q> FilterSpec<Q> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            sortable: None,
        }
    }

    /// Insert `rule` under `key`, replacing an existing rule in place.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, rule: FilterRule<Q>) -> Self {
        let key = key.into();
        if let Some(slot) = self.rules.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = rule;
        } else {
            self.rules.push((key, rule));
        }
        self
    }

    #[must_use]
    pub fn without(mut self, key: &str) -> Self {
        self.rules.retain(|(k, _)| k != key);
        self
    }

    /// Add every rule of `other`; keys present in both take `other`'s rule.
    #[must_use]
    pub fn merge(mut self, other: FilterSpec<Q>) -> Self {
        for (key, rule) in other.rules {
            self = self.with(key, rule);
        }
        if other.sortable.is_some() {
            self.sortable = other.sortable;
        }
        self
    }

    /// Restrict `sort_by` to the given field names (with optional `-` prefix).
    #[must_use]
    pub fn sortable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sortable = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FilterRule<Q>> {
        self.rules.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(k, _)| k.as_str())
    }

    pub(crate) fn rules(&self) -> impl Iterator<Item = (&str, &FilterRule<Q>)> {
        self.rules.iter().map(|(k, r)| (k.as_str(), r))
    }

    #[must_use]
    pub fn is_sortable(&self, field: &str) -> bool {
        self.sortable
            .as_ref()
            .is_none_or(|allowed| allowed.iter().any(|f| f == field))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<Q> Default for FilterSpec<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q> Clone for FilterSpec<Q> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
            sortable: self.sortable.clone(),
        }
    }
}

impl<Q> fmt::Debug for FilterSpec<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSpec")
            .field("rules", &self.rules)
            .field("sortable", &self.sortable)
            .finish()
    }
}
