mod storage;

pub use storage::{CacheStorage, NoopStorage, SqliteStorage};
