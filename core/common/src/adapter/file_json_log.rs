//! ファイルへ JSONL で追記する Log 実装
//!
//! ログの出力先はファイルのみ。エラー時のコンソール表示（stderr）とは別。
//! `-v` のときだけ StderrLog で包み、同じレコードを stderr にも流す。

use crate::error::Error;
use crate::ports::outbound::{FileSystem, Log, LogRecord};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// ファイルへ JSONL を追記する Log 実装
pub struct FileJsonLog {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl FileJsonLog {
    /// ログファイルパスへ追記する logger を生成する。
    /// 親ディレクトリが無ければ作成する（初回書き込み時）。
    pub fn new(fs: Arc<dyn FileSystem>, path: impl AsRef<Path>) -> Self {
        Self {
            fs,
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Log for FileJsonLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            self.fs.create_dir_all(parent)?;
        }
        let mut w = self.fs.open_append(&self.path)?;
        let line = serde_json::to_string(record)?;
        w.write_all(line.as_bytes())
            .map_err(|e| Error::io_msg(e.to_string()))?;
        w.write_all(b"\n")
            .map_err(|e| Error::io_msg(e.to_string()))?;
        w.flush().map_err(|e| Error::io_msg(e.to_string()))?;
        Ok(())
    }
}

/// 内側の Log に書いたうえで、1 行に整形して stderr にも出す
pub struct StderrLog {
    inner: Arc<dyn Log>,
}

impl StderrLog {
    pub fn new(inner: Arc<dyn Log>) -> Self {
        Self { inner }
    }
}

/// stderr 向けの 1 行表現（例: `[info] adapter/http: GET /memory {"status":200}`）
pub fn format_record(record: &LogRecord) -> String {
    let level = serde_json::to_value(record.level)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let mut line = format!("[{}] ", level);
    match (&record.layer, &record.kind) {
        (Some(layer), Some(kind)) => line.push_str(&format!("{}/{}: ", layer, kind)),
        (Some(layer), None) => line.push_str(&format!("{}: ", layer)),
        (None, Some(kind)) => line.push_str(&format!("{}: ", kind)),
        (None, None) => {}
    }
    line.push_str(&record.message);
    if let Some(fields) = &record.fields {
        if let Ok(json) = serde_json::to_string(fields) {
            line.push(' ');
            line.push_str(&json);
        }
    }
    line
}

impl Log for StderrLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        eprintln!("{}", format_record(record));
        self.inner.log(record)
    }
}

/// 何も出力しない Log 実装（テスト用・ログパスが解決できないとき）
#[derive(Debug, Clone, Default)]
pub struct NoopLog;

impl Log for NoopLog {
    fn log(&self, _record: &LogRecord) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::StdFileSystem;
    use crate::ports::outbound::{log_event, now_iso8601, LogLevel};
    use std::collections::BTreeMap;

    fn record(message: &str) -> LogRecord {
        LogRecord {
            ts: now_iso8601(),
            level: LogLevel::Info,
            message: message.to_string(),
            layer: None,
            kind: None,
            fields: None,
        }
    }

    #[test]
    fn test_noop_log() {
        assert!(NoopLog.log(&record("test")).is_ok());
    }

    #[test]
    fn test_file_json_log_appends_lines_and_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("memories.jsonl");
        let log = FileJsonLog::new(Arc::new(StdFileSystem), &path);
        log.log(&record("first")).unwrap();
        log_event(
            &log,
            LogLevel::Error,
            "adapter",
            "http",
            "request failed",
            &[("status", serde_json::json!(500))],
        );

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["message"], "first");
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["level"], "error");
        assert_eq!(second["fields"]["status"], 500);
    }

    #[test]
    fn test_format_record() {
        let mut fields = BTreeMap::new();
        fields.insert("status".to_string(), serde_json::json!(200));
        let rec = LogRecord {
            layer: Some("adapter".to_string()),
            kind: Some("http".to_string()),
            fields: Some(fields),
            ..record("GET /memory")
        };
        assert_eq!(
            format_record(&rec),
            "[info] adapter/http: GET /memory {\"status\":200}"
        );
    }
}
