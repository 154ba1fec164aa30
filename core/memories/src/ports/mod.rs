//! Ports & Adapters のポート定義
//!
//! - inbound: ドライバ（CLI）がアプリを呼び出すインターフェース
//! - outbound は common::ports::outbound（MemoryApi / QueryCache / Log など）をそのまま使う

pub mod inbound;
