//! Requests SDK
//!
//! This crate provides the public API for the `requests` module:
//! - `RequestsClientV1` trait
//! - Model types for requests, their execution section and history
//! - Error type (`RequestsError`)

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod client;
pub mod errors;
pub mod models;

pub use client::RequestsClientV1;
pub use errors::RequestsError;
pub use models::{
    Actor, ActorRole, AreaRef, Binds, CategorySelection, ChangeRecord, DesiredTime,
    DispatcherRef, Execution, FileRef, FilesPatch, HistoryActor, HistoryEntry, HistoryLog,
    HouseRef, NewFile, Relations, Request, RequestStatus, RequestTag, RequestUpdate,
    ResourceLine, StatusUpdate, UnknownVariant, WarehouseLine,
};
