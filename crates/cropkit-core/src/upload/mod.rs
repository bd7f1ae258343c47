//! Upload coordination and the storage seam.

mod coordinator;
mod job;
mod path;
mod storage;

pub use coordinator::{UploadCoordinator, UploadEvents};
pub use job::UploadJob;
pub use path::{object_path, random_object_id, OBJECT_ID_BYTES};
pub use storage::{ObjectStorage, RawStorageError, StorageError, UploadOptions};
