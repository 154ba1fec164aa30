//! MemoryList: 一覧表示用の投影と、楽観的更新のための局所変更
//!
//! サーバーのスナップショットから毎回作り直し、変更を当てたら捨てる。

use super::MemoryId;
use crate::ports::outbound::{Clock, IdGenerator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// クライアント側で作る下書きのタイトル
pub const PLACEHOLDER_TITLE: &str = "blank_";

/// 一覧 API の 1 件（memory のサマリ）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListMemoryItem {
    pub id: MemoryId,
    pub title: String,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub private: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryList {
    memories: Vec<ListMemoryItem>,
}

impl MemoryList {
    pub fn new(memories: Vec<ListMemoryItem>) -> Self {
        Self { memories }
    }

    /// 一致する項目の pinned を書き換える。無い ID は何もしない。
    pub fn pin(&mut self, memory_id: &MemoryId, pin: bool) {
        if let Some(memory) = self.memories.iter_mut().find(|m| &m.id == memory_id) {
            memory.pinned = pin;
        }
    }

    /// 一致する項目を取り除く。無い ID は何もしない。
    pub fn remove(&mut self, memory_id: &MemoryId) {
        self.memories.retain(|m| &m.id != memory_id);
    }

    /// ピン留めを先頭に、その中は作成日時の古い順で並べ替えて返す。
    ///
    /// その場でソートする（安定ソートなので同値は入力順）。
    pub fn get_memories(&mut self) -> &[ListMemoryItem] {
        self.memories.sort_by(|a, b| {
            b.pinned
                .cmp(&a.pinned)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        &self.memories
    }

    /// サーバー確定前に表示する下書きを末尾に足して返す
    pub fn add_new(&mut self, clock: &dyn Clock, ids: &dyn IdGenerator) -> ListMemoryItem {
        let item = ListMemoryItem {
            id: MemoryId::new(ids.next_id()),
            title: PLACEHOLDER_TITLE.to_string(),
            created_at: clock.now(),
            pinned: false,
            private: false,
        };
        self.memories.push(item.clone());
        item
    }

    pub fn find(&self, memory_id: &MemoryId) -> Option<&ListMemoryItem> {
        self.memories.iter().find(|m| &m.id == memory_id)
    }

    pub fn len(&self) -> usize {
        self.memories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memories.is_empty()
    }

    /// 並べ替え済みの中身を取り出す（キャッシュへ書き戻す用）
    pub fn into_memories(mut self) -> Vec<ListMemoryItem> {
        self.get_memories();
        self.memories
    }
}
