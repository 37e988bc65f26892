pub mod database;
pub mod error;
pub mod history;
pub mod row_helpers;
pub mod saved_devices;
pub mod schema;

pub use database::Database;
pub use error::StoreError;
pub use history::{HistoryStore, MemoryHistoryStore, SqliteHistoryStore, HISTORY_CAP};
pub use saved_devices::SavedDeviceRepo;
