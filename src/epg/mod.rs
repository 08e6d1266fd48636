//! EPG (Electronic Program Guide) ingestion
//!
//! XMLTV fetch, streaming parse and the schedule table it produces.

mod ingest;
mod parser;
mod schedule;
mod source;
mod store;

pub use ingest::{ingest, no_progress, try_ingest, ProgressCallback};
pub use parser::{parse_document, MAX_PARTIAL_PROGRESS};
pub use schedule::{Program, ScheduleTable};
pub use source::{DocumentSource, FetchedDocument, HttpSource, StaticSource};
pub use store::{RefreshOutcome, RefreshTicket, ScheduleStore};
