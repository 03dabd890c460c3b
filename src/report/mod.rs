//! Output of audit results: JSON and persistence records.

mod json;
mod record;

pub use json::{to_json, to_json_pretty, JsonFormat};
pub use record::{
    details_by_page, records_for, MemorySink, PageDetails, PageRecord, ResultSink,
};
