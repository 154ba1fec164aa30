//! クエリキャッシュ Outbound ポート
//!
//! サーバーから取得した状態をエンティティ ID 由来のキーで保持する。
//! 楽観的更新（optimistic）はこの get / set / invalidate だけを前提にする。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// キャッシュキー（例: ["memory"], ["memory", "<id>"]）
///
/// invalidate はプレフィックス一致で効く（["memory"] は ["memory", id] も無効化する）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// memory 一覧
    pub fn memories() -> Self {
        Self::new(["memory"])
    }

    /// memory 1 件
    pub fn memory(memory_id: &str) -> Self {
        Self::new(["memory", memory_id])
    }

    /// 公開ページ用の memory（認証なし）
    pub fn public_memory(memory_id: &str) -> Self {
        Self::new(["public-memory", memory_id])
    }

    /// 共有設定
    pub fn sharing(memory_id: &str) -> Self {
        Self::new(["sharing", memory_id])
    }

    pub fn rss(memory_id: &str, fragment_id: &str) -> Self {
        Self::new(["rss", memory_id, fragment_id])
    }

    pub fn account() -> Self {
        Self::new(["auth", "account"])
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// prefix の全要素が先頭から一致するか
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// クエリキャッシュ抽象（Outbound ポート）
///
/// 実装は `common::adapter::InMemoryQueryCache`。値は JSON のまま保持し、
/// 型付きの読み書きは `common::query_client::QueryClient` が担う。
pub trait QueryCache: Send + Sync {
    /// キーに対応する値（無ければ None）
    fn get(&self, key: &QueryKey) -> Option<Value>;

    /// 値を書き込む。None はエントリ削除。書き込んだエントリは fresh になる。
    fn set(&self, key: &QueryKey, value: Option<Value>);

    /// prefix に一致する全エントリを stale にする（値は残す）
    fn invalidate(&self, prefix: &QueryKey);

    /// stale か（エントリが無い場合も true）
    fn is_stale(&self, key: &QueryKey) -> bool;
}
