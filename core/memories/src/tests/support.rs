//! テスト用のモック（MemoryApi・時刻・ID）とフィクスチャ

use chrono::{DateTime, Utc};
use common::adapter::{InMemoryQueryCache, NoopLog, StdFileSystem};
use common::domain::{
    Account, Collaborator, DeltaOp, FileAttachment, Fragment, FragmentId, ListMemoryItem, Memory,
    MemoryId, RichText, RssFeed, RssItem, SharingPermissions, UploadStatus, UserId,
};
use common::error::Error;
use common::ports::outbound::{Clock, FileUpload, IdGenerator, MemoryApi};
use common::query_client::QueryClient;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::usecase::{MemoryUseCase, SharingUseCase};

pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.0
    }
}

/// draft-1, draft-2, ... を順に返す
#[derive(Default)]
pub struct SeqIds(AtomicU64);

impl IdGenerator for SeqIds {
    fn next_id(&self) -> String {
        format!("draft-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

pub fn at(secs: u64) -> DateTime<Utc> {
    FixedClock(secs * 1000).now()
}

pub fn item(id: &str, title: &str, pinned: bool, created: u64) -> ListMemoryItem {
    ListMemoryItem {
        id: id.into(),
        title: title.to_string(),
        pinned,
        private: true,
        created_at: at(created),
    }
}

pub fn text(id: &str, s: &str) -> Fragment {
    Fragment::RichText(RichText {
        id: id.into(),
        content: DeltaOp::from_plain_text(s),
    })
}

pub fn audio(id: &str, name: &str) -> Fragment {
    Fragment::Audio(FileAttachment {
        id: id.into(),
        name: name.to_string(),
        status: UploadStatus::Uploaded,
        upload_progress: 1.0,
        url: None,
    })
}

pub fn rss(id: &str, urls: &[&str]) -> Fragment {
    Fragment::RssFeed(RssFeed {
        id: id.into(),
        urls: urls.iter().map(|u| u.to_string()).collect(),
    })
}

pub fn memory(id: &str, owner: &str, fragments: Vec<Fragment>) -> Memory {
    Memory {
        id: id.into(),
        title: format!("title of {}", id),
        owner: owner.into(),
        fragments,
        private: true,
        pinned: false,
        tags: BTreeSet::new(),
        created_at: at(1_000),
        updated_at: at(1_000),
    }
}

#[derive(Default)]
pub struct FakeState {
    pub list: Vec<ListMemoryItem>,
    pub memories: HashMap<MemoryId, Memory>,
    pub sharing: HashMap<MemoryId, SharingPermissions>,
    pub rss: Vec<RssItem>,
    pub account: Option<Account>,
    pub uploads: Vec<FileUpload>,
    /// 呼ばれた操作名（順番どおり）
    pub calls: Vec<String>,
    /// true の間、すべての操作が Remote エラーになる
    pub fail: bool,
    next_id: u64,
}

/// メモリ上で状態を持つ MemoryApi のモック
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(&self, f: impl FnOnce(&mut FakeState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn set_fail(&self, fail: bool) {
        self.state.lock().unwrap().fail = fail;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn stored(&self, id: &str) -> Option<Memory> {
        self.state.lock().unwrap().memories.get(&MemoryId::from(id)).cloned()
    }

    pub fn uploads(&self) -> Vec<FileUpload> {
        self.state.lock().unwrap().uploads.clone()
    }

    fn call<R>(&self, name: &str, f: impl FnOnce(&mut FakeState) -> Result<R, Error>) -> Result<R, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(name.to_string());
        if state.fail {
            return Err(Error::remote(Some(500), "internal server error"));
        }
        f(&mut state)
    }
}

fn memory_mut<'a>(state: &'a mut FakeState, id: &MemoryId) -> Result<&'a mut Memory, Error> {
    state
        .memories
        .get_mut(id)
        .ok_or_else(|| Error::remote(Some(404), format!("memory {} not found", id)))
}

impl MemoryApi for FakeApi {
    fn list_memories(&self) -> Result<Vec<ListMemoryItem>, Error> {
        self.call("list_memories", |s| Ok(s.list.clone()))
    }

    fn get_memory(&self, memory_id: &MemoryId) -> Result<Memory, Error> {
        self.call("get_memory", |s| memory_mut(s, memory_id).map(|m| m.clone()))
    }

    fn get_public_memory(&self, memory_id: &MemoryId) -> Result<Memory, Error> {
        self.call("get_public_memory", |s| {
            let m = memory_mut(s, memory_id)?;
            if m.private {
                return Err(Error::remote(Some(403), "memory is private"));
            }
            Ok(m.clone())
        })
    }

    fn create_empty_memory(&self) -> Result<MemoryId, Error> {
        self.call("create_empty_memory", |s| {
            s.next_id += 1;
            let id = MemoryId::from(format!("srv-{}", s.next_id));
            s.list.push(ListMemoryItem {
                id: id.clone(),
                title: String::new(),
                pinned: false,
                private: true,
                created_at: at(5_000),
            });
            s.memories.insert(id.clone(), memory(&id, "u1", Vec::new()));
            Ok(id)
        })
    }

    fn forget_memory(&self, memory_id: &MemoryId) -> Result<(), Error> {
        self.call("forget_memory", |s| {
            s.list.retain(|m| &m.id != memory_id);
            s.memories.remove(memory_id);
            Ok(())
        })
    }

    fn forget_fragments(&self, memory_id: &MemoryId, fragment_ids: &[FragmentId]) -> Result<(), Error> {
        self.call("forget_fragments", |s| {
            let m = memory_mut(s, memory_id)?;
            m.fragments.retain(|f| !fragment_ids.contains(f.id()));
            Ok(())
        })
    }

    fn set_memory_title(&self, memory_id: &MemoryId, title: &str) -> Result<(), Error> {
        self.call("set_memory_title", |s| {
            memory_mut(s, memory_id)?.title = title.to_string();
            Ok(())
        })
    }

    fn set_fragment_order(&self, memory_id: &MemoryId, fragment_ids: &[FragmentId]) -> Result<(), Error> {
        self.call("set_fragment_order", |s| {
            let m = memory_mut(s, memory_id)?;
            let fragments = fragment_ids
                .iter()
                .filter_map(|id| m.fragments.iter().find(|f| f.id() == id).cloned())
                .collect();
            m.fragments = fragments;
            Ok(())
        })
    }

    fn set_pin(&self, memory_id: &MemoryId, pin: bool) -> Result<(), Error> {
        self.call("set_pin", |s| {
            for m in s.list.iter_mut().filter(|m| &m.id == memory_id) {
                m.pinned = pin;
            }
            Ok(())
        })
    }

    fn set_private(&self, memory_id: &MemoryId, private: bool) -> Result<(), Error> {
        self.call("set_private", |s| {
            memory_mut(s, memory_id)?.private = private;
            Ok(())
        })
    }

    fn add_rich_text_fragment(&self, memory_id: &MemoryId, content: &[DeltaOp]) -> Result<FragmentId, Error> {
        self.call("add_rich_text_fragment", |s| {
            s.next_id += 1;
            let id = FragmentId::from(format!("frag-{}", s.next_id));
            memory_mut(s, memory_id)?.fragments.push(Fragment::RichText(RichText {
                id: id.clone(),
                content: content.to_vec(),
            }));
            Ok(id)
        })
    }

    fn modify_rich_text_fragment(
        &self,
        memory_id: &MemoryId,
        fragment_id: &FragmentId,
        content: &[DeltaOp],
    ) -> Result<(), Error> {
        self.call("modify_rich_text_fragment", |s| {
            for f in memory_mut(s, memory_id)?.fragments.iter_mut() {
                if let Fragment::RichText(t) = f {
                    if &t.id == fragment_id {
                        t.content = content.to_vec();
                    }
                }
            }
            Ok(())
        })
    }

    fn add_file_fragment(&self, upload: &FileUpload) -> Result<(), Error> {
        self.call("add_file_fragment", |s| {
            s.uploads.push(upload.clone());
            Ok(())
        })
    }

    fn add_rss_fragment(&self, memory_id: &MemoryId, urls: &[String]) -> Result<(), Error> {
        self.call("add_rss_fragment", |s| {
            s.next_id += 1;
            let id = format!("frag-{}", s.next_id);
            let urls: Vec<&str> = urls.iter().map(|u| u.as_str()).collect();
            memory_mut(s, memory_id)?.fragments.push(rss(&id, &urls));
            Ok(())
        })
    }

    fn modify_rss_feed(&self, memory_id: &MemoryId, fragment_id: &FragmentId, urls: &[String]) -> Result<(), Error> {
        self.call("modify_rss_feed", |s| {
            for f in memory_mut(s, memory_id)?.fragments.iter_mut() {
                if let Fragment::RssFeed(r) = f {
                    if &r.id == fragment_id {
                        r.urls = urls.to_vec();
                    }
                }
            }
            Ok(())
        })
    }

    fn get_rss_feed(&self, _memory_id: &MemoryId, _fragment_id: &FragmentId) -> Result<Vec<RssItem>, Error> {
        self.call("get_rss_feed", |s| Ok(s.rss.clone()))
    }

    fn get_sharing_permissions(&self, memory_id: &MemoryId) -> Result<SharingPermissions, Error> {
        self.call("get_sharing_permissions", |s| {
            s.sharing
                .get(memory_id)
                .cloned()
                .ok_or_else(|| Error::remote(Some(404), "not found"))
        })
    }

    fn add_editor(&self, memory_id: &MemoryId, email: &str) -> Result<(), Error> {
        self.call("add_editor", |s| {
            if let Some(p) = s.sharing.get_mut(memory_id) {
                p.editors.push(Collaborator {
                    id: UserId::from(format!("user-{}", email)),
                    email: email.to_string(),
                });
            }
            Ok(())
        })
    }

    fn remove_editor(&self, memory_id: &MemoryId, user_id: &UserId) -> Result<(), Error> {
        self.call("remove_editor", |s| {
            if let Some(p) = s.sharing.get_mut(memory_id) {
                p.editors.retain(|c| &c.id != user_id);
            }
            Ok(())
        })
    }

    fn add_reader(&self, memory_id: &MemoryId, email: &str) -> Result<(), Error> {
        self.call("add_reader", |s| {
            if let Some(p) = s.sharing.get_mut(memory_id) {
                p.readers.push(Collaborator {
                    id: UserId::from(format!("user-{}", email)),
                    email: email.to_string(),
                });
            }
            Ok(())
        })
    }

    fn remove_reader(&self, memory_id: &MemoryId, user_id: &UserId) -> Result<(), Error> {
        self.call("remove_reader", |s| {
            if let Some(p) = s.sharing.get_mut(memory_id) {
                p.readers.retain(|c| &c.id != user_id);
            }
            Ok(())
        })
    }

    fn set_public(&self, memory_id: &MemoryId, is_public: bool) -> Result<(), Error> {
        self.call("set_public", |s| {
            if let Some(p) = s.sharing.get_mut(memory_id) {
                p.private = !is_public;
            }
            Ok(())
        })
    }

    fn get_account(&self) -> Result<Account, Error> {
        self.call("get_account", |s| {
            s.account.clone().ok_or_else(|| Error::remote(Some(401), "unauthorized"))
        })
    }
}

/// usecase を直接組み立てる（キャッシュも覗けるように QueryClient を返す）
pub struct Harness {
    pub api: Arc<FakeApi>,
    pub queries: QueryClient,
    pub memories: MemoryUseCase,
    pub sharing: SharingUseCase,
}

pub fn harness() -> Harness {
    let api = Arc::new(FakeApi::new());
    let queries = QueryClient::new(Arc::new(InMemoryQueryCache::new()));
    let memories = MemoryUseCase::new(
        Arc::clone(&api) as Arc<dyn MemoryApi>,
        queries.clone(),
        Arc::new(FixedClock(9_000_000)),
        Arc::new(SeqIds::default()),
        Arc::new(StdFileSystem),
        Arc::new(NoopLog),
    );
    let sharing = SharingUseCase::new(Arc::clone(&api) as Arc<dyn MemoryApi>, queries.clone());
    Harness {
        api,
        queries,
        memories,
        sharing,
    }
}
