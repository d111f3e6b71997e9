// Library root for the VCT record-linkage core.
//
// Everything here is pure computation over already-parsed records: reference
// tables, match mapping ingest, linking, fuzzy resolution, and query-time
// name lookup. File and network I/O live in the `vct-scout` crate.

pub mod context;
pub mod entity;
pub mod fuzzy;
pub mod ingest;
pub mod linker;
pub mod query;
pub mod scrape;
pub mod similarity;
pub mod store;

pub use context::{SharedSnapshot, Snapshot};
pub use entity::{normalize_key, Entity, EntityKind};
pub use fuzzy::{FuzzyMatch, FuzzyResolver};
pub use ingest::{IngestError, MappingIngest, MappingRecord};
pub use linker::{LinkPolicy, LinkStats, LinkedRecord, Linker};
pub use query::{MatchKind, QueryOutcome, QueryResolver, QueryTarget, TargetHint};
pub use scrape::{ScrapeError, ScrapedPlayer};
pub use similarity::{JaroWinkler, Scorer, SequenceRatio, DEFAULT_THRESHOLD};
pub use store::ReferenceStore;
