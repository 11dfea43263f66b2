//! Ingestion and enrichment for marquee.
//!
//! Merges dated ratings-export snapshots into per-title time series and
//! fills each title's country of origin from Wikidata in a cancellable
//! background job.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod enrich;
pub mod error;
pub mod import;

pub use config::Config;
pub use enrich::job::{CountryFillJob, FillSummary, JobState};
pub use enrich::lookup::CountryLookup;
pub use enrich::wikidata::WikidataCountryLookup;
pub use error::{EnrichError, EnrichResult};
pub use import::merge::{MergeReport, RowError, RowOutcome, SnapshotMerger};
pub use import::remove::{remove_snapshot, RemovalReport};
pub use import::row::RawRow;
pub use import::{import_dir, import_file};
