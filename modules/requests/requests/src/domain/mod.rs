pub mod categories;
pub mod change_tracker;
pub mod display;
pub mod document;
pub mod error;
pub mod filters;
pub mod history;
pub mod ports;
pub mod repo;
pub mod rollback;
pub mod service;
