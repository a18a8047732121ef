/// Platform-specific functionality: turning `std::fs::Metadata` into the
/// portable `FileInfo` and the low-level `FileStat` records.
pub mod stat;

pub use stat::{device_id, file_info, file_mode, to_stat};
