//! Outbound ポート: アプリが外界（時刻・ID・FS・環境変数・ログ・リモート API・キャッシュ）を使うための trait

pub mod clock;
pub mod env_resolver;
pub mod fs;
pub mod id_generator;
pub mod log;
pub mod memory_api;
pub mod query_cache;

pub use clock::Clock;
pub use env_resolver::EnvResolver;
pub use fs::{FileMetadata, FileSystem};
pub use id_generator::IdGenerator;
pub use log::{log_event, now_iso8601, Log, LogLevel, LogRecord};
pub use memory_api::{FileUpload, MemoryApi, UploadTarget};
pub use query_cache::{QueryCache, QueryKey};
