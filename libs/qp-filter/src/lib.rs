//! Query-parameter filters.
//!
//! A [`FilterSpec`] is a per-endpoint table that maps a query parameter key to
//! a value parser, a query-fragment builder, a multiplicity and a set of keys
//! that suppress it. [`translate`] runs an incoming [`QueryParams`] multimap
//! through a spec and yields a [`TranslatedQuery`]: the fragments to AND
//! together, plus pagination and sort keys.
//!
//! ```ignore
//! let spec = FilterSpec::new()
//!     .with("status__in", FilterRule::many(parsers::non_empty_string, |v| json!({"status": {"$in": v}})))
//!     .with("category", FilterRule::single(parsers::non_empty_string, |v| json!({"category": v})))
//!     .with(
//!         "subcategory",
//!         FilterRule::single(parsers::non_empty_string, |v| json!({"subcategory": v})),
//!     );
//! let query = translate(&QueryParams::from_query_str("status__in=run&limit=20")?, &spec)?;
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod errors;
pub mod limits;
pub mod params;
pub mod parsers;
pub mod spec;
pub mod translator;

pub use errors::{FilterError, ParseError};
pub use limits::TranslatorLimits;
pub use params::QueryParams;
pub use spec::{FilterRule, FilterSpec, Multiplicity};
pub use translator::{TranslatedQuery, translate};

/// Control parameter carrying the page size.
pub const LIMIT_PARAM: &str = "limit";
/// Control parameter carrying the page offset.
pub const OFFSET_PARAM: &str = "offset";
/// Control parameter carrying a sort key; may repeat.
pub const SORT_PARAM: &str = "sort_by";
