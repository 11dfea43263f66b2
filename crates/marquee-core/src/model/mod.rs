pub mod title;

pub use title::{SnapshotEntry, TitleRecord};
