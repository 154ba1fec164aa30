//! ドメイン型
//!
//! String / PathBuf を直接運ばず、意味のある型に包んで境界を明確にする。
//! memory・fragment・一覧の不変条件はこのモジュールが持つ。

pub mod audio;
pub mod fragment;
pub mod memory;
pub mod memory_list;
pub mod rss;
pub mod session;
pub mod sharing;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use audio::AudioState;
pub use fragment::{
    storage_url, DeltaOp, FileAttachment, FileKind, Fragment, FragmentKind, RichText, RssFeed,
    UploadStatus,
};
pub use memory::{Memory, NewMemory, Tag};
pub use memory_list::{ListMemoryItem, MemoryList, PLACEHOLDER_TITLE};
pub use rss::{RssChannel, RssItem};
pub use session::{ActiveMemory, SessionContext};
pub use sharing::{validate_email, Account, Collaborator, SharingPermissions};

/// ホームディレクトリのパス（config.json・logs を置く）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeDir(PathBuf);

impl HomeDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }
}

impl std::ops::Deref for HomeDir {
    type Target = PathBuf;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for HomeDir {
    fn as_ref(&self) -> &Path {
        self.0.as_ref()
    }
}

impl From<PathBuf> for HomeDir {
    fn from(p: PathBuf) -> Self {
        Self(p)
    }
}

/// memory の ID（サーバー採番、下書きはクライアント側 UUID）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryId(String);

impl MemoryId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl std::ops::Deref for MemoryId {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for MemoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for MemoryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MemoryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// fragment の ID（不変）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentId(String);

impl FragmentId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl std::ops::Deref for FragmentId {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for FragmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for FragmentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FragmentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// アカウント ID（memory の所有者・共同編集者）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl std::ops::Deref for UserId {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = MemoryId::new("m1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"m1\"");
        let back: FragmentId = serde_json::from_str("\"f1\"").unwrap();
        assert_eq!(&*back, "f1");
    }
}
