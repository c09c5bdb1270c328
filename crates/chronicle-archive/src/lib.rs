//! The chronicle archive engine.
//!
//! [`Archive`] is the single entry point: it owns a [`ChronicleStore`] (the
//! source of truth) and an in-memory [`SearchIndex`] derived from it, and
//! sequences every mutation so that the two never observably diverge.
//!
//! The engine expects to be driven serially by one caller. It takes no
//! internal locks beyond what is needed to share the index behind `&self`.
//!
//! [`ChronicleStore`]: chronicle_core::store::ChronicleStore

mod archive;
mod roman;

pub mod config;
pub mod index;
pub mod query;

pub use archive::{Archive, IndexAudit};
pub use config::ArchiveConfig;
pub use index::SearchIndex;
pub use query::{ChronicleFilter, GroupedChronicles, NumberedChronicle, YearGroup};
pub use roman::to_roman;

#[cfg(test)]
mod tests;
