//! Activation request records for cidgen.
//!
//! Each `POST /api/generate-cid` call creates one record in `pending` state
//! and updates it once with the outcome. Records are kept in memory only.

mod record;
mod store;

pub use record::{ActivationRecord, ActivationStatus, NewActivationRequest, RecordId, RecordPatch};
pub use store::{MemoryRecordStore, RecordStore};
