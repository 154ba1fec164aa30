//! 楽観的更新（snapshot → apply → commit / rollback）
//!
//! リクエストの前にキャッシュを書き換えて即座に反映し、失敗したら書き換え前の値に戻す。
//! 1 回の更新ごとに自分の snapshot を持ち、他の更新の snapshot とは合成しない
//! （連続して失敗すると途中の楽観的状態は失われうる。後勝ち）。

use crate::error::Error;
use crate::ports::outbound::{log_event, Log, LogLevel, QueryKey};
use crate::query_client::QueryClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

/// 確定後の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Committed,
    RolledBack,
}

/// 進行中（Pending）の楽観的更新。commit / rollback で消費される。
#[must_use]
pub struct OptimisticUpdate<'a> {
    client: &'a QueryClient,
    key: QueryKey,
    snapshot: Option<Value>,
}

impl<'a> OptimisticUpdate<'a> {
    /// 現在のキャッシュ値をそのまま（無ければ無いまま）snapshot として取る
    pub fn begin(client: &'a QueryClient, key: QueryKey) -> Self {
        let snapshot = client.cache().get(&key);
        Self {
            client,
            key,
            snapshot,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn snapshot(&self) -> Option<&Value> {
        self.snapshot.as_ref()
    }

    /// 変換結果をキャッシュへ同期的に書き込む
    pub fn apply<T, F>(&self, transform: F) -> Result<(), Error>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Option<T>) -> T,
    {
        let current = self.client.get_query_data::<T>(&self.key)?;
        let next = transform(current);
        self.client.set_query_data(&self.key, &next)
    }

    /// snapshot を捨て、キーを stale にして次の読み出しで取り直させる
    pub fn commit(self) -> Settled {
        self.client.invalidate_queries(&self.key);
        Settled::Committed
    }

    /// snapshot をそのまま書き戻す（snapshot が無ければエントリを消す）。再試行はしない。
    pub fn rollback(self) -> Settled {
        self.client.cache().set(&self.key, self.snapshot);
        Settled::RolledBack
    }
}

/// begin → apply → request → 成功なら commit、失敗なら rollback してエラーを返す
pub fn run_optimistic<T, R, F, Q>(
    client: &QueryClient,
    log: &dyn Log,
    key: QueryKey,
    transform: F,
    request: Q,
) -> Result<R, Error>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(Option<T>) -> T,
    Q: FnOnce() -> Result<R, Error>,
{
    let update = OptimisticUpdate::begin(client, key);
    if let Err(e) = update.apply(transform) {
        update.rollback();
        return Err(e);
    }

    match request() {
        Ok(r) => {
            update.commit();
            Ok(r)
        }
        Err(e) => {
            let key = update.key().to_string();
            update.rollback();
            log_event(
                log,
                LogLevel::Warn,
                "usecase",
                "optimistic",
                "request failed; cache rolled back",
                &[("key", json!(key)), ("error", json!(e.to_string()))],
            );
            Err(e)
        }
    }
}
