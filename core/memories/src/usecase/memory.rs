//! memory / fragment のユースケース
//!
//! 一覧の削除・ピン留め・新規作成と fragment の並べ替えは楽観的更新（失敗したらキャッシュを戻す）。
//! それ以外の変更はリクエスト後に関係するキーを無効化するだけ。

use common::domain::{
    ActiveMemory, DeltaOp, FileKind, Fragment, FragmentId, ListMemoryItem, Memory, MemoryId,
    MemoryList, RssItem, PLACEHOLDER_TITLE,
};
use common::error::Error;
use common::optimistic::{run_optimistic, OptimisticUpdate};
use common::ports::outbound::{
    log_event, Clock, FileSystem, FileUpload, IdGenerator, Log, LogLevel, MemoryApi, QueryKey,
    UploadTarget,
};
use common::query_client::QueryClient;
use serde_json::json;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub struct MemoryUseCase {
    api: Arc<dyn MemoryApi>,
    queries: QueryClient,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    fs: Arc<dyn FileSystem>,
    log: Arc<dyn Log>,
    active: Mutex<ActiveMemory>,
}

impl MemoryUseCase {
    pub fn new(
        api: Arc<dyn MemoryApi>,
        queries: QueryClient,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        fs: Arc<dyn FileSystem>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            api,
            queries,
            clock,
            ids,
            fs,
            log,
            active: Mutex::new(ActiveMemory::default()),
        }
    }

    /// 一覧（ピン留めが先頭、その中は作成日時の古い順）
    pub fn list(&self) -> Result<Vec<ListMemoryItem>, Error> {
        let items = self
            .queries
            .fetch_query(&QueryKey::memories(), || self.api.list_memories())?;
        Ok(MemoryList::new(items).into_memories())
    }

    /// 1 件取得し、開いている memory として覚える
    pub fn get(&self, memory_id: &MemoryId) -> Result<Memory, Error> {
        let memory = self
            .queries
            .fetch_query(&QueryKey::memory(memory_id), || self.api.get_memory(memory_id))?;
        self.with_active(|active| active.set(memory.clone()));
        Ok(memory)
    }

    pub fn get_public(&self, memory_id: &MemoryId) -> Result<Memory, Error> {
        self.queries.fetch_query(&QueryKey::public_memory(memory_id), || {
            self.api.get_public_memory(memory_id)
        })
    }

    /// 直近に get した memory
    #[allow(dead_code)]
    pub fn active(&self) -> Option<Memory> {
        self.with_active(|active| active.get().cloned())
    }

    /// 下書きを一覧に先に出してから作成する。サーバーが採番した ID を返す。
    pub fn create(&self) -> Result<MemoryId, Error> {
        run_optimistic(
            &self.queries,
            self.log.as_ref(),
            QueryKey::memories(),
            |old: Option<Vec<ListMemoryItem>>| {
                let mut list = MemoryList::new(old.unwrap_or_default());
                list.add_new(self.clock.as_ref(), self.ids.as_ref());
                list.into_memories()
            },
            || self.api.create_empty_memory(),
        )
    }

    /// 一覧から先に消してから削除する
    pub fn forget(&self, memory_id: &MemoryId) -> Result<(), Error> {
        run_optimistic(
            &self.queries,
            self.log.as_ref(),
            QueryKey::memories(),
            |old: Option<Vec<ListMemoryItem>>| match old {
                Some(items) => {
                    let mut list = MemoryList::new(items);
                    list.remove(memory_id);
                    list.into_memories()
                }
                None => Vec::new(),
            },
            || self.api.forget_memory(memory_id),
        )?;
        self.with_active(|active| {
            if active.get().map(|m| &m.id == memory_id).unwrap_or(false) {
                active.clear();
            }
        });
        Ok(())
    }

    /// 一覧のピン状態を先に書き換えてから送る。失敗時も戻したうえで一覧を無効化する。
    pub fn pin(&self, memory_id: &MemoryId, pin: bool) -> Result<(), Error> {
        let result = run_optimistic(
            &self.queries,
            self.log.as_ref(),
            QueryKey::memories(),
            |old: Option<Vec<ListMemoryItem>>| match old {
                Some(items) => {
                    let mut list = MemoryList::new(items);
                    list.pin(memory_id, pin);
                    list.into_memories()
                }
                None => Vec::new(),
            },
            || self.api.set_pin(memory_id, pin),
        );
        self.queries.invalidate_queries(&QueryKey::memories());
        result
    }

    /// 公開状態の変更。成否にかかわらず一覧を無効化する。
    pub fn set_private(&self, memory_id: &MemoryId, private: bool) -> Result<(), Error> {
        let result = self.api.set_private(memory_id, private);
        self.queries.invalidate_queries(&QueryKey::memories());
        result
    }

    pub fn rename(&self, memory_id: &MemoryId, title: &str) -> Result<(), Error> {
        if title.trim().is_empty() {
            return Err(Error::invalid_argument("title must not be empty"));
        }
        self.api.set_memory_title(memory_id, title)?;
        self.queries.invalidate_queries(&QueryKey::memories());
        Ok(())
    }

    /// 並べ替え。未知の ID はリクエスト前に NotFound。
    ///
    /// 指定しなかった fragment は並びから落ちる（サーバーにもその順序で送る）。
    pub fn reorder(&self, memory_id: &MemoryId, fragment_ids: &[FragmentId]) -> Result<Memory, Error> {
        let mut memory = self.get(memory_id)?;
        memory.update_fragment_ordering(fragment_ids, self.clock.as_ref())?;
        let key = QueryKey::memory(memory_id);
        let update = OptimisticUpdate::begin(&self.queries, key.clone());
        if let Err(e) = update.apply(|_: Option<Memory>| memory.clone()) {
            update.rollback();
            return Err(e);
        }

        match self.api.set_fragment_order(memory_id, fragment_ids) {
            Ok(()) => {
                update.commit();
            }
            Err(e) => {
                update.rollback();
                // 失敗してもサーバー側の状態は不明なので取り直させる
                self.queries.invalidate_queries(&key);
                return Err(e);
            }
        }
        self.with_active(|active| active.set(memory.clone()));
        Ok(memory)
    }

    /// fragment の削除。未知の ID はリクエスト前に NotFound。
    pub fn forget_fragments(&self, memory_id: &MemoryId, fragment_ids: &[FragmentId]) -> Result<(), Error> {
        let mut memory = self.get(memory_id)?;
        for fragment_id in fragment_ids {
            memory.forget_fragment(fragment_id, self.clock.as_ref())?;
        }
        self.api.forget_fragments(memory_id, fragment_ids)?;
        self.queries.invalidate_queries(&QueryKey::memories());
        Ok(())
    }

    pub fn add_text(&self, memory_id: &MemoryId, text: &str) -> Result<FragmentId, Error> {
        let content = DeltaOp::from_plain_text(text);
        let fragment_id = self.api.add_rich_text_fragment(memory_id, &content)?;
        self.queries.invalidate_queries(&QueryKey::memory(memory_id));
        Ok(fragment_id)
    }

    /// テキストの書き換え。内容が変わらなければ送らずに false を返す。
    pub fn edit_text(&self, memory_id: &MemoryId, fragment_id: &FragmentId, text: &str) -> Result<bool, Error> {
        let memory = self.get(memory_id)?;
        let current = match memory.get_fragment(fragment_id)? {
            Fragment::RichText(t) => &t.content,
            other => {
                return Err(Error::invalid_argument(format!(
                    "fragment {} is {}, not rich_text",
                    fragment_id,
                    other.kind().as_str()
                )))
            }
        };
        let content = DeltaOp::from_plain_text(text);
        if current == &content {
            return Ok(false);
        }
        self.api
            .modify_rich_text_fragment(memory_id, fragment_id, &content)?;
        self.queries.invalidate_queries(&QueryKey::memories());
        Ok(true)
    }

    /// ファイルを読み込んでアップロードする。memory_id が None なら新しい memory を作る。
    pub fn add_file(&self, memory_id: Option<&MemoryId>, path: &Path, kind: FileKind) -> Result<(), Error> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| Error::invalid_argument(format!("not a file: {}", path.display())))?;
        let bytes = self.fs.read(path)?;
        let target = match memory_id {
            Some(id) => UploadTarget::Memory(id.clone()),
            None => UploadTarget::NewMemory {
                title: PLACEHOLDER_TITLE.to_string(),
            },
        };
        log_event(
            self.log.as_ref(),
            LogLevel::Info,
            "usecase",
            "upload",
            "uploading file",
            &[
                ("file_name", json!(file_name)),
                ("kind", json!(kind.as_str())),
                ("bytes", json!(bytes.len())),
            ],
        );
        self.api.add_file_fragment(&FileUpload {
            target,
            kind,
            file_name,
            bytes,
        })?;
        self.queries.invalidate_queries(&QueryKey::memories());
        Ok(())
    }

    pub fn add_rss(&self, memory_id: &MemoryId, urls: &[String]) -> Result<(), Error> {
        validate_feed_urls(urls)?;
        self.api.add_rss_fragment(memory_id, urls)?;
        self.queries.invalidate_queries(&QueryKey::memories());
        Ok(())
    }

    pub fn edit_rss(&self, memory_id: &MemoryId, fragment_id: &FragmentId, urls: &[String]) -> Result<(), Error> {
        validate_feed_urls(urls)?;
        self.api.modify_rss_feed(memory_id, fragment_id, urls)?;
        self.queries
            .invalidate_queries(&QueryKey::rss(memory_id, fragment_id));
        self.queries.invalidate_queries(&QueryKey::memory(memory_id));
        Ok(())
    }

    pub fn rss_items(&self, memory_id: &MemoryId, fragment_id: &FragmentId) -> Result<Vec<RssItem>, Error> {
        self.queries
            .fetch_query(&QueryKey::rss(memory_id, fragment_id), || {
                self.api.get_rss_feed(memory_id, fragment_id)
            })
    }

    fn with_active<R>(&self, f: impl FnOnce(&mut ActiveMemory) -> R) -> R {
        match self.active.lock() {
            Ok(mut active) => f(&mut active),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

/// フィード URL は 1 件以上、http(s) のみ
fn validate_feed_urls(urls: &[String]) -> Result<(), Error> {
    if urls.is_empty() {
        return Err(Error::invalid_argument("at least one feed URL is required"));
    }
    for url in urls {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::invalid_argument(format!(
                "feed URL must start with http:// or https://: '{}'",
                url
            )));
        }
    }
    Ok(())
}
