pub mod codec;
pub mod record_store;
pub mod records;
pub mod seed;

pub use record_store::{LoadReport, Loaded, MalformedPolicy, RecordStore, SkippedRecord};
pub use records::{Recordable, Sequence};
