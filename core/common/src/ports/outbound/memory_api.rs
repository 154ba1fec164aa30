//! リモート API Outbound ポート
//!
//! memory / fragment / sharing / account の CRUD エンドポイント。パスとペイロードの形は
//! アダプター（`common::adapter::HttpMemoryApi`）が持ち、usecase は型だけを見る。

use crate::domain::{
    Account, DeltaOp, FileKind, FragmentId, ListMemoryItem, Memory, MemoryId, RssItem,
    SharingPermissions, UserId,
};
use crate::error::Error;

/// 添付ファイルの送り先
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    /// 既存の memory に fragment として追加
    Memory(MemoryId),
    /// ファイルから新しい memory を作る
    NewMemory { title: String },
}

/// 添付ファイル 1 件のアップロード内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub target: UploadTarget,
    pub kind: FileKind,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// リモート API 抽象（Outbound ポート）
///
/// 失敗は `Error::Remote` で返す（通信エラー・非 2xx）。
pub trait MemoryApi: Send + Sync {
    // --- memory
    fn list_memories(&self) -> Result<Vec<ListMemoryItem>, Error>;
    fn get_memory(&self, memory_id: &MemoryId) -> Result<Memory, Error>;
    /// 公開ページ用（認証なし）
    fn get_public_memory(&self, memory_id: &MemoryId) -> Result<Memory, Error>;
    /// 空の memory を作り、サーバーが採番した ID を返す
    fn create_empty_memory(&self) -> Result<MemoryId, Error>;
    /// memory を忘れる（削除、取り消し不可）
    fn forget_memory(&self, memory_id: &MemoryId) -> Result<(), Error>;
    fn forget_fragments(&self, memory_id: &MemoryId, fragment_ids: &[FragmentId])
        -> Result<(), Error>;
    fn set_memory_title(&self, memory_id: &MemoryId, title: &str) -> Result<(), Error>;
    fn set_fragment_order(&self, memory_id: &MemoryId, fragment_ids: &[FragmentId])
        -> Result<(), Error>;
    fn set_pin(&self, memory_id: &MemoryId, pin: bool) -> Result<(), Error>;
    fn set_private(&self, memory_id: &MemoryId, private: bool) -> Result<(), Error>;

    // --- fragment
    fn add_rich_text_fragment(&self, memory_id: &MemoryId, content: &[DeltaOp])
        -> Result<FragmentId, Error>;
    fn modify_rich_text_fragment(
        &self,
        memory_id: &MemoryId,
        fragment_id: &FragmentId,
        content: &[DeltaOp],
    ) -> Result<(), Error>;
    fn add_file_fragment(&self, upload: &FileUpload) -> Result<(), Error>;
    fn add_rss_fragment(&self, memory_id: &MemoryId, urls: &[String]) -> Result<(), Error>;
    fn modify_rss_feed(
        &self,
        memory_id: &MemoryId,
        fragment_id: &FragmentId,
        urls: &[String],
    ) -> Result<(), Error>;
    fn get_rss_feed(&self, memory_id: &MemoryId, fragment_id: &FragmentId)
        -> Result<Vec<RssItem>, Error>;

    // --- sharing
    fn get_sharing_permissions(&self, memory_id: &MemoryId) -> Result<SharingPermissions, Error>;
    fn add_editor(&self, memory_id: &MemoryId, email: &str) -> Result<(), Error>;
    fn remove_editor(&self, memory_id: &MemoryId, user_id: &UserId) -> Result<(), Error>;
    fn add_reader(&self, memory_id: &MemoryId, email: &str) -> Result<(), Error>;
    fn remove_reader(&self, memory_id: &MemoryId, user_id: &UserId) -> Result<(), Error>;
    fn set_public(&self, memory_id: &MemoryId, is_public: bool) -> Result<(), Error>;

    // --- auth
    fn get_account(&self) -> Result<Account, Error>;
}
