//! config.json の読み込みとクライアント設定の解決
//!
//! 優先順位: 環境変数 > config.json > デフォルト。

use crate::domain::HomeDir;
use crate::error::Error;
use crate::ports::outbound::{EnvResolver, FileSystem};
use serde::Deserialize;
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_ACCESS_TOKEN_ENV: &str = "MEMORIES_ACCESS_TOKEN";
pub const BACKEND_URL_ENV: &str = "MEMORIES_BACKEND_URL";
pub const STORAGE_URL_ENV: &str = "MEMORIES_STORAGE_URL";

/// config.json の中身（すべて任意）
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigFile {
    #[serde(alias = "backend")]
    pub backend_url: Option<String>,
    #[serde(alias = "storage")]
    pub storage_url: Option<String>,
    pub access_token_env: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFile {
    /// JSON 文字列からパース（ファイル読みは load_config_file で行う）
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// 解決済みの設定
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub home_dir: HomeDir,
    pub backend_url: String,
    /// 添付ファイルの公開 URL のベース（未設定なら URL を組み立てない）
    pub storage_url: Option<String>,
    /// アクセストークンを読む環境変数名
    pub access_token_env: String,
    pub log_file: PathBuf,
}

impl ClientConfig {
    /// デフォルト・config.json・環境変数の順に重ねる
    pub fn resolve(home_dir: HomeDir, file: ConfigFile, env: &dyn EnvResolver) -> Self {
        let backend_url = env
            .var(BACKEND_URL_ENV)
            .or(file.backend_url)
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let storage_url = env.var(STORAGE_URL_ENV).or(file.storage_url);
        let access_token_env = file
            .access_token_env
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_ACCESS_TOKEN_ENV.to_string());
        let log_file = match file.log_file {
            Some(p) if p.is_absolute() => p,
            Some(p) => home_dir.join(p),
            None => home_dir.join("logs").join("memories.jsonl"),
        };
        Self {
            home_dir,
            backend_url: backend_url.trim_end_matches('/').to_string(),
            storage_url: storage_url.map(|s| s.trim_end_matches('/').to_string()),
            access_token_env,
            log_file,
        }
    }

    /// アクセストークン（未設定・空ならセッション無し）
    pub fn access_token(&self, env: &dyn EnvResolver) -> Option<String> {
        env.var(&self.access_token_env)
    }
}

/// config.json を読み込む。ファイルが無ければデフォルト、JSON が壊れていれば Err（メッセージにパス含める）
pub fn load_config_file(fs: &dyn FileSystem, home_dir: &HomeDir) -> Result<ConfigFile, Error> {
    let path = home_dir.join(CONFIG_FILE_NAME);
    if !fs.exists(&path) {
        return Ok(ConfigFile::default());
    }
    let contents = fs
        .read_to_string(&path)
        .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;
    ConfigFile::parse(&contents).map_err(|e| Error::config(format!("{}: {}", path.display(), e)))
}

/// ホームディレクトリを解決し、config.json と環境変数から設定を作る
pub fn load_client_config(fs: &dyn FileSystem, env: &dyn EnvResolver) -> Result<ClientConfig, Error> {
    let home_dir = env.resolve_home_dir()?;
    let file = load_config_file(fs, &home_dir)?;
    Ok(ClientConfig::resolve(home_dir, file, env))
}
