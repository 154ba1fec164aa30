//! エラーハンドリング
//!
//! ドメイン・アダプター・CLI で共通のエラー型。終了コードは sysexits.h に合わせる。

/// エラー型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// メモリ内に存在しない ID を参照した（fragment / memory）
    #[error("{what} with ID {id} doesn't exist in {container}")]
    NotFound {
        what: String,
        id: String,
        container: String,
    },

    /// リモート API へのリクエスト失敗（通信エラー・非 2xx）
    #[error("remote request failed{}: {message}", status_suffix(.status))]
    Remote {
        status: Option<u16>,
        message: String,
    },

    /// セッション（アクセストークン）が無い状態で認証が必要な操作をした
    #[error("not signed in: set the access token environment variable")]
    Unauthenticated,

    /// 引数不正
    #[error("{0}")]
    InvalidArgument(String),

    /// JSON のシリアライズ・デシリアライズ失敗
    #[error("JSON error: {0}")]
    Json(String),

    /// ファイル I/O
    #[error("I/O error: {0}")]
    Io(String),

    /// 環境変数の解決失敗
    #[error("environment error: {0}")]
    Env(String),

    /// 設定ファイルの解決・解析失敗
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// 引数不正エラー
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn io_msg(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn env(msg: impl Into<String>) -> Self {
        Self::Env(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn json(msg: impl Into<String>) -> Self {
        Self::Json(msg.into())
    }

    /// HTTP ステータス付きのリモートエラー（通信自体に失敗した場合は status = None）
    pub fn remote(status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: msg.into(),
        }
    }

    /// メモリ内に fragment が存在しない
    pub fn fragment_not_found(fragment_id: &str, memory_id: &str) -> Self {
        Self::NotFound {
            what: "Fragment".to_string(),
            id: fragment_id.to_string(),
            container: format!("memory {}", memory_id),
        }
    }

    /// 一覧・キャッシュに memory が存在しない
    pub fn memory_not_found(memory_id: &str) -> Self {
        Self::NotFound {
            what: "Memory".to_string(),
            id: memory_id.to_string(),
            container: "the memory list".to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// ロールバック対象となるリモート失敗か
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// 使い方を表示すべきエラーか
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// プロセス終了コード（sysexits.h）
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => 64,
            Self::Json(_) => 65,
            Self::NotFound { .. } => 66,
            Self::Remote { .. } => 69,
            Self::Io(_) => 74,
            Self::Unauthenticated => 77,
            Self::Env(_) | Self::Config(_) => 78,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
