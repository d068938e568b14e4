//! Requests Module Implementation
//!
//! Filtered listing of maintenance requests and the audited update workflows
//! that change them. The public API is defined in `requests-sdk` and
//! re-exported here.

pub use requests_sdk::{RequestsClientV1, RequestsError};

pub mod module;
pub use module::RequestsModule;

pub mod local_client;

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
