//! 配線: 標準アダプタで UseCase を組み立てる

use std::sync::Arc;

use common::adapter::{
    FileJsonLog, HttpMemoryApi, InMemoryQueryCache, NoopLog, StderrLog, StdClock,
    StdEnvResolver, StdFileSystem, StdIdGenerator,
};
use common::config::{load_client_config, ClientConfig};
use common::domain::SessionContext;
use common::error::Error;
use common::ports::outbound::{Clock, EnvResolver, FileSystem, IdGenerator, Log, MemoryApi};
use common::query_client::QueryClient;

use crate::usecase::{AccountUseCase, MemoryUseCase, PlaybackUseCase, SharingUseCase};

/// 配線で組み立てた UseCase 群（main の Command ディスパッチで利用）
pub struct App {
    pub memory_use_case: MemoryUseCase,
    pub sharing_use_case: SharingUseCase,
    pub account_use_case: AccountUseCase,
    pub playback_use_case: PlaybackUseCase,
    /// 添付ファイル URL の組み立てに使う（show の表示用）
    pub storage_url: Option<String>,
    /// 構造化ログ（ファイルへ JSONL）。エラー時のコンソール表示とは別。
    pub logger: Arc<dyn Log>,
}

/// App の材料。テストではここにモックを入れる。
pub struct Ports {
    pub api: Arc<dyn MemoryApi>,
    pub fs: Arc<dyn FileSystem>,
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdGenerator>,
    pub logger: Arc<dyn Log>,
    pub session: SessionContext,
    pub storage_url: Option<String>,
}

/// ポート群から App を組み立てる（1 回の実行で 1 つの QueryClient を共有する）
pub fn assemble(ports: Ports) -> App {
    let queries = QueryClient::new(Arc::new(InMemoryQueryCache::new()));
    App {
        memory_use_case: MemoryUseCase::new(
            Arc::clone(&ports.api),
            queries.clone(),
            ports.clock,
            ports.ids,
            ports.fs,
            Arc::clone(&ports.logger),
        ),
        sharing_use_case: SharingUseCase::new(Arc::clone(&ports.api), queries.clone()),
        account_use_case: AccountUseCase::new(ports.api, queries, ports.session),
        playback_use_case: PlaybackUseCase::new(ports.storage_url.clone()),
        storage_url: ports.storage_url,
        logger: ports.logger,
    }
}

fn wire_logger(fs: &Arc<dyn FileSystem>, config: Option<&ClientConfig>, verbose: bool) -> Arc<dyn Log> {
    let base: Arc<dyn Log> = match config {
        Some(c) => Arc::new(FileJsonLog::new(Arc::clone(fs), &c.log_file)),
        None => Arc::new(NoopLog),
    };
    if verbose {
        Arc::new(StderrLog::new(base))
    } else {
        base
    }
}

/// 配線: config.json と環境変数を読み、標準アダプタで App を組み立てる
pub fn wire_memories(verbose: bool) -> Result<App, Error> {
    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let env_resolver: Arc<dyn EnvResolver> = Arc::new(StdEnvResolver);
    let config = load_client_config(fs.as_ref(), env_resolver.as_ref())?;
    let logger = wire_logger(&fs, Some(&config), verbose);

    let access_token = config.access_token(env_resolver.as_ref());
    let session = SessionContext::new(access_token.clone());
    let api: Arc<dyn MemoryApi> = Arc::new(HttpMemoryApi::new(
        &config.backend_url,
        access_token,
        Arc::clone(&logger),
    ));
    Ok(assemble(Ports {
        api,
        fs,
        clock: Arc::new(StdClock),
        ids: Arc::new(StdIdGenerator),
        logger,
        session,
        storage_url: config.storage_url,
    }))
}
