//! Core domain model for marquee.
//!
//! This crate defines the per-title record with its snapshot time series,
//! the `dd.MM.yyyy` date labels used throughout, the [`RecordStore`]
//! abstraction, and its SQLite implementation.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod label;
pub mod model;
pub mod schema;
pub mod store;

pub use error::{Error, Result};
pub use label::{DateLabel, SnapshotLabel};
pub use model::{SnapshotEntry, TitleRecord};
pub use schema::Database;
pub use store::{RecordStore, RemovalReport};
