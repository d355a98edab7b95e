// Storage module - saving and retrieving recordings by opaque token

pub mod fs;
pub mod memory;
pub mod recording;
pub mod store;

pub use fs::JsonFileStore;
pub use memory::MemoryStore;
pub use recording::{Recording, SavedRecording};
pub use store::{RecordingStore, StorageError};
