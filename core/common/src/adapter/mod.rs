//! アダプター（外界の I/O を trait で抽象化）
//!
//! usecase は ports::outbound の trait 経由でのみファイル・時刻・HTTP に触れる。
//! 実装は標準実装（Std*）や HTTP クライアント、テスト用のモックを注入する。

pub mod file_json_log;
pub mod http_memory_api;
pub mod in_memory_query_cache;
pub mod std_clock;
pub mod std_env_resolver;
pub mod std_fs;
pub mod std_id_generator;

pub use file_json_log::{FileJsonLog, NoopLog, StderrLog};
pub use http_memory_api::HttpMemoryApi;
pub use in_memory_query_cache::InMemoryQueryCache;
pub use std_clock::StdClock;
pub use std_env_resolver::StdEnvResolver;
pub use std_fs::StdFileSystem;
pub use std_id_generator::StdIdGenerator;
