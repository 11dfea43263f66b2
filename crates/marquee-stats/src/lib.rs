//! Aggregate views over marquee rating snapshots.
//!
//! The free functions in each module are pure over a slice of
//! [`TitleRecord`](marquee_core::TitleRecord)s. [`Statistics`] binds them to a
//! [`RecordStore`](marquee_core::RecordStore), validating `dd.MM.yyyy`
//! arguments and defaulting absent ones to today.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod compare;
pub mod counts;
pub mod engine;
pub mod genres;
pub mod ratings;
pub mod round;
pub mod years;

pub use compare::{compare, CompareRow};
pub use counts::{country_counts, title_type_counts, NameCount};
pub use engine::Statistics;
pub use genres::{genre_stats, primary_genre, GenreStat};
pub use ratings::{ratings_at, SnapshotRating};
pub use years::{year_counts, yearly_average, YearAverage, YearHistogram, FIRST_YEAR};
