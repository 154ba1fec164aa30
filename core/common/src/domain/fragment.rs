//! Fragment: memory を構成する 1 つのコンテンツ（閉じた直和型）
//!
//! ワイヤ上は `"type"` タグ付きの JSON。種別を増やすと、種別ごとに分岐している
//! すべての match がコンパイルエラーになる。

use super::{FragmentId, UserId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// リッチテキストエディタの op（insert + 任意の書式属性）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaOp {
    /// 文字列、または埋め込み（画像等）のオブジェクト
    pub insert: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Map<String, Value>>,
}

impl DeltaOp {
    /// 書式なしのテキスト insert
    pub fn text(s: impl Into<String>) -> Self {
        Self {
            insert: Value::String(s.into()),
            attributes: None,
        }
    }

    /// 平文を op 列にする。エディタと同じく末尾は必ず改行で終わる。
    pub fn from_plain_text(text: &str) -> Vec<DeltaOp> {
        if text.ends_with('\n') {
            vec![DeltaOp::text(text)]
        } else {
            vec![DeltaOp::text(format!("{}\n", text))]
        }
    }

    /// 文字列 insert だけを連結する（埋め込みは無視）
    pub fn plain_text(ops: &[DeltaOp]) -> String {
        ops.iter()
            .filter_map(|op| op.insert.as_str())
            .collect::<String>()
    }
}

/// アップロード状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Uploading,
    #[default]
    Uploaded,
    Error,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploading => "uploading",
            Self::Uploaded => "uploaded",
            Self::Error => "error",
        }
    }
}

/// ファイル系 fragment（file / audio / image）の共通ペイロード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAttachment {
    pub id: FragmentId,
    pub name: String,
    #[serde(default)]
    pub status: UploadStatus,
    #[serde(default)]
    pub upload_progress: f64,
    /// 画像の表示 URL（サーバーが付与する場合のみ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    pub id: FragmentId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: Vec<DeltaOp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssFeed {
    pub id: FragmentId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub urls: Vec<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// memory を構成するコンテンツ 1 件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fragment {
    RichText(RichText),
    File(FileAttachment),
    Audio(FileAttachment),
    Image(FileAttachment),
    RssFeed(RssFeed),
}

/// Fragment の判別子（ペイロードなし）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    RichText,
    File,
    Audio,
    Image,
    RssFeed,
}

impl FragmentKind {
    /// ワイヤ上の `"type"` の値
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RichText => "rich_text",
            Self::File => "file",
            Self::Audio => "audio",
            Self::Image => "image",
            Self::RssFeed => "rss_feed",
        }
    }

    /// アップロードで作れる種別なら対応する FileKind
    pub fn file_kind(&self) -> Option<FileKind> {
        match self {
            Self::File => Some(FileKind::File),
            Self::Audio => Some(FileKind::Audio),
            Self::Image => Some(FileKind::Image),
            Self::RichText | Self::RssFeed => None,
        }
    }
}

/// アップロード時の `type` フォーム値
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileKind {
    #[default]
    File,
    Audio,
    Image,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Audio => "audio",
            Self::Image => "image",
        }
    }
}

impl std::str::FromStr for FileKind {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "audio" => Ok(Self::Audio),
            "image" => Ok(Self::Image),
            other => Err(crate::error::Error::invalid_argument(format!(
                "unknown file kind '{}' (expected file, audio or image)",
                other
            ))),
        }
    }
}

/// Storage 上の公開パス（`{base}/storage/v1/object/public/memories.develop/{owner}/{name}`）
pub fn storage_url(storage_base: &str, owner: &UserId, name: &str) -> String {
    format!(
        "{}/storage/v1/object/public/memories.develop/{}/{}",
        storage_base.trim_end_matches('/'),
        owner,
        name
    )
}

impl Fragment {
    pub fn id(&self) -> &FragmentId {
        match self {
            Self::RichText(f) => &f.id,
            Self::File(f) | Self::Audio(f) | Self::Image(f) => &f.id,
            Self::RssFeed(f) => &f.id,
        }
    }

    pub fn kind(&self) -> FragmentKind {
        match self {
            Self::RichText(_) => FragmentKind::RichText,
            Self::File(_) => FragmentKind::File,
            Self::Audio(_) => FragmentKind::Audio,
            Self::Image(_) => FragmentKind::Image,
            Self::RssFeed(_) => FragmentKind::RssFeed,
        }
    }

    /// ファイル系ならその添付情報
    pub fn file(&self) -> Option<&FileAttachment> {
        match self {
            Self::File(f) | Self::Audio(f) | Self::Image(f) => Some(f),
            Self::RichText(_) | Self::RssFeed(_) => None,
        }
    }

    pub fn is_uploading(&self) -> bool {
        self.file()
            .map(|f| f.status == UploadStatus::Uploading)
            .unwrap_or(false)
    }

    /// ファイル系の再生・表示用 URL。画像はサーバーが付けた url を優先する。
    pub fn media_url(&self, storage_base: &str, owner: &UserId) -> Option<String> {
        match self {
            Self::Image(f) => Some(
                f.url
                    .clone()
                    .unwrap_or_else(|| storage_url(storage_base, owner, &f.name)),
            ),
            Self::File(f) | Self::Audio(f) => Some(storage_url(storage_base, owner, &f.name)),
            Self::RichText(_) | Self::RssFeed(_) => None,
        }
    }

    /// ダウンロードリンク（`?download=<name>` 付き）
    pub fn download_url(&self, storage_base: &str, owner: &UserId) -> Option<String> {
        let f = self.file()?;
        Some(format!(
            "{}?download={}",
            storage_url(storage_base, owner, &f.name),
            f.name
        ))
    }

    /// 一覧表示用の 1 行要約
    pub fn summary(&self) -> String {
        match self {
            Self::RichText(t) => {
                let text = DeltaOp::plain_text(&t.content);
                text.lines().next().unwrap_or("").to_string()
            }
            Self::File(f) | Self::Audio(f) | Self::Image(f) => {
                if f.status == UploadStatus::Uploaded {
                    f.name.clone()
                } else {
                    format!("{} ({})", f.name, f.status.as_str())
                }
            }
            Self::RssFeed(r) => r.urls.join(", "),
        }
    }
}
