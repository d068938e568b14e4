//! Page-size and sort caps applied on top of a translated query.
//!
//! Translation itself never fails on `limit`/`offset`; endpoints pick their
//! own bounds (20 for heavy views, 1000 for plain lists) through these limits.

use crate::errors::FilterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslatorLimits {
    /// Page size used when the client sends no usable `limit` (default: 20)
    pub default_limit: u64,
    /// Largest page size an endpoint hands out (default: 1000)
    pub max_limit: u64,
    /// Maximum number of `sort_by` keys (default: 5)
    pub max_sort_keys: usize,
}

impl Default for TranslatorLimits {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 1000,
            max_sort_keys: 5,
        }
    }
}

impl TranslatorLimits {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit;
        self
    }

    #[must_use]
    pub fn with_max_limit(mut self, max: u64) -> Self {
        self.max_limit = max;
        self
    }

    #[must_use]
    pub fn with_max_sort_keys(mut self, max: usize) -> Self {
        self.max_sort_keys = max;
        self
    }

    /// Effective page size for a requested `limit`.
    #[must_use]
    pub fn clamp_limit(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_limit)
            .min(self.max_limit)
    }

    /// Validate the number of sort keys.
    ///
    /// # Errors
    /// Fails when `count` exceeds the sort-key cap.
    pub fn validate_sort_count(&self, count: usize) -> Result<(), FilterError> {
        if count > self.max_sort_keys {
            return Err(FilterError::InvalidSortKey(format!(
                "too many sort keys (max: {})",
                self.max_sort_keys
            )));
        }
        Ok(())
    }
}
