//! Memory（集約ルート）
//!
//! 順序付きの fragment 列とメタデータ（タイトル・公開状態・ピン・タグ・時刻）。
//! fragment の並びが表示・反復の正規の順序。変更操作はすべて `updated_at` を進める。

use super::{Fragment, FragmentId, MemoryId, UserId};
use crate::error::Error;
use crate::ports::outbound::{Clock, IdGenerator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// タグ文字列
pub type Tag = String;

/// 新規作成時の入力
#[derive(Debug, Clone)]
pub struct NewMemory {
    pub title: String,
    pub owner: UserId,
    pub fragments: Vec<Fragment>,
}

fn default_private() -> bool {
    true
}

/// memory 1 件（API の詳細ペイロードと同じ形でデシリアライズできる）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: MemoryId,
    pub title: String,
    /// 作成したアカウント（作成後は不変）
    #[serde(alias = "user_id")]
    pub owner: UserId,
    #[serde(default)]
    pub fragments: Vec<Fragment>,
    #[serde(default = "default_private")]
    pub private: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub tags: BTreeSet<Tag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Memory {
    /// クライアント側で下書きを作る。ID は UUID、非公開・ピンなし・タグなし。
    pub fn new(input: NewMemory, clock: &dyn Clock, ids: &dyn IdGenerator) -> Self {
        let now = clock.now();
        Self {
            id: MemoryId::new(ids.next_id()),
            title: input.title,
            owner: input.owner,
            fragments: input.fragments,
            private: true,
            pinned: false,
            tags: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// ID に一致する fragment。無ければ NotFound。
    pub fn get_fragment(&self, fragment_id: &FragmentId) -> Result<&Fragment, Error> {
        self.fragments
            .iter()
            .find(|f| f.id() == fragment_id)
            .ok_or_else(|| Error::fragment_not_found(fragment_id, &self.id))
    }

    /// 指定 ID に含まれる fragment を memory 自身の順序で返す（入力の順序は使わない）
    pub fn list_fragments(&self, fragment_ids: &[FragmentId]) -> Vec<&Fragment> {
        self.fragments
            .iter()
            .filter(|f| fragment_ids.contains(f.id()))
            .collect()
    }

    /// fragment を 1 件取り除く。存在しない ID は NotFound（2 回目の呼び出しも失敗する）。
    pub fn forget_fragment(&mut self, fragment_id: &FragmentId, clock: &dyn Clock) -> Result<(), Error> {
        let target = self.get_fragment(fragment_id)?.id().clone();
        self.fragments.retain(|f| f.id() != &target);
        self.touch(clock);
        Ok(())
    }

    /// 入力の順序どおりに fragment を並べ替える。
    ///
    /// 全 ID を先に解決し、1 つでも未知なら NotFound で何も変えない。
    /// 入力に含まれない fragment は落ちる（部分集合を渡すと消える）。
    pub fn update_fragment_ordering(
        &mut self,
        fragment_ids: &[FragmentId],
        clock: &dyn Clock,
    ) -> Result<(), Error> {
        let reordered = fragment_ids
            .iter()
            .map(|id| self.get_fragment(id).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        self.fragments = reordered;
        self.touch(clock);
        Ok(())
    }

    pub fn make_public(&mut self, clock: &dyn Clock) {
        self.private = false;
        self.touch(clock);
    }

    pub fn make_private(&mut self, clock: &dyn Clock) {
        self.private = true;
        self.touch(clock);
    }

    pub fn pin(&mut self, clock: &dyn Clock) {
        self.pinned = true;
        self.touch(clock);
    }

    pub fn unpin(&mut self, clock: &dyn Clock) {
        self.pinned = false;
        self.touch(clock);
    }

    /// タグ集合を丸ごと置き換える
    pub fn set_tags(&mut self, tags: BTreeSet<Tag>, clock: &dyn Clock) {
        self.tags = tags;
        self.touch(clock);
    }

    pub fn set_title(&mut self, title: impl Into<String>, clock: &dyn Clock) {
        self.title = title.into();
        self.touch(clock);
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner == user_id
    }

    pub fn fragment_ids(&self) -> Vec<FragmentId> {
        self.fragments.iter().map(|f| f.id().clone()).collect()
    }

    fn touch(&mut self, clock: &dyn Clock) {
        self.updated_at = clock.now();
    }
}
