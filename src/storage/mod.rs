pub mod object_store;
pub mod session_record;

pub use object_store::{compute_hash, FsObjectStore, ObjectStore};
pub use session_record::{
    storage_key, PersistenceStatus, RecordOutcome, SessionRecord, SessionRecorder,
};
