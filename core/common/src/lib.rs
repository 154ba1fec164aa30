//! memories 共通ライブラリ
//!
//! `memories` コマンド（や将来の別フロントエンド）で共有するドメイン・ポート・アダプターを提供します。

/// エラーハンドリング
pub mod error;

/// ドメイン型（memory / fragment / 一覧 / 共有）
pub mod domain;

/// Outbound ポート（trait）
pub mod ports;

/// ポートの標準実装
pub mod adapter;

/// config.json と環境変数からの設定解決
pub mod config;

/// 型付きクエリキャッシュ
pub mod query_client;

/// 楽観的更新プロトコル
pub mod optimistic;
