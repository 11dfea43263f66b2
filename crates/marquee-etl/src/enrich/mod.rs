//! Country-of-origin enrichment.

pub mod job;
pub mod lookup;
pub mod resilience;
pub mod wikidata;
