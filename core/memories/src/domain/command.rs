//! memories コマンドの enum（Command Pattern）
//!
//! 引数解析の結果を enum に落とし、match でディスパッチする。

use common::domain::{FileKind, FragmentId, MemoryId, UserId};
use common::error::Error;
use std::path::PathBuf;

/// memories のサブコマンド
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// ヘルプ表示（コマンド未指定時も）
    Help,

    /// memory 一覧（ピン留めが先頭）
    List,
    /// memory 1 件の詳細
    Show { id: MemoryId },
    /// 公開ページ用の memory（認証なし）
    Public { id: MemoryId },
    /// 空の memory を作る
    Create,
    /// memory を忘れる（削除）
    Forget { id: MemoryId },
    /// ピン留め / 解除
    Pin { id: MemoryId, pin: bool },
    /// 非公開（on）/ 公開（off）
    Privacy { id: MemoryId, private: bool },
    Rename { id: MemoryId, title: String },
    /// fragment の並べ替え（指定しなかった fragment は落ちる）
    Order { id: MemoryId, fragment_ids: Vec<FragmentId> },
    ForgetFragment { id: MemoryId, fragment_ids: Vec<FragmentId> },

    AddText { id: MemoryId, text: String },
    EditText { id: MemoryId, fragment_id: FragmentId, text: String },
    /// 添付ファイル。id が None なら新しい memory を作る
    AddFile { id: Option<MemoryId>, path: PathBuf, kind: FileKind },
    AddRss { id: MemoryId, urls: Vec<String> },
    EditRss { id: MemoryId, fragment_id: FragmentId, urls: Vec<String> },
    /// RSS fragment の記事一覧
    Rss { id: MemoryId, fragment_id: FragmentId },

    /// 共有設定の表示
    Share { id: MemoryId },
    ShareAddEditor { id: MemoryId, email: String },
    ShareRemoveEditor { id: MemoryId, user_id: UserId },
    ShareAddReader { id: MemoryId, email: String },
    ShareRemoveReader { id: MemoryId, user_id: UserId },
    ShareSetPublic { id: MemoryId, public: bool },

    /// サインイン中のアカウント
    Whoami,
    /// 音声 fragment の再生 / 一時停止
    Play { id: MemoryId, fragment_id: FragmentId },

    /// 未知のコマンド（エラー用）
    Unknown(String),
}

fn arg<'a>(args: &'a [String], index: usize, what: &str, command: &str) -> Result<&'a str, Error> {
    args.get(index)
        .map(|s| s.as_str())
        .ok_or_else(|| Error::invalid_argument(format!("{} requires <{}>", command, what)))
}

fn rest(args: &[String], from: usize, what: &str, command: &str) -> Result<Vec<String>, Error> {
    let out: Vec<String> = args.iter().skip(from).cloned().collect();
    if out.is_empty() {
        return Err(Error::invalid_argument(format!(
            "{} requires at least one <{}>",
            command, what
        )));
    }
    Ok(out)
}

/// on / off（yes / no, true / false も受け付ける）
pub fn parse_switch(s: &str) -> Result<bool, Error> {
    match s.to_lowercase().as_str() {
        "on" | "yes" | "true" => Ok(true),
        "off" | "no" | "false" => Ok(false),
        other => Err(Error::invalid_argument(format!(
            "expected on or off, got '{}'",
            other
        ))),
    }
}

impl Command {
    /// コマンド名と引数から Command に解析する
    pub fn parse_with_args(name: &str, args: &[String]) -> Result<Self, Error> {
        let id = |i: usize| arg(args, i, "memory_id", name).map(MemoryId::from);
        let fragment_id = |i: usize| arg(args, i, "fragment_id", name).map(FragmentId::from);
        let fragment_ids = |from: usize| {
            rest(args, from, "fragment_id", name)
                .map(|v| v.into_iter().map(FragmentId::from).collect::<Vec<_>>())
        };

        let cmd = match name {
            "list" => Command::List,
            "show" => Command::Show { id: id(0)? },
            "public" => Command::Public { id: id(0)? },
            "create" => Command::Create,
            "forget" => Command::Forget { id: id(0)? },
            "pin" => Command::Pin { id: id(0)?, pin: true },
            "unpin" => Command::Pin { id: id(0)?, pin: false },
            "privacy" => Command::Privacy {
                id: id(0)?,
                private: parse_switch(arg(args, 1, "on|off", name)?)?,
            },
            "rename" => Command::Rename {
                id: id(0)?,
                title: rest(args, 1, "title", name)?.join(" "),
            },
            "order" => Command::Order {
                id: id(0)?,
                fragment_ids: fragment_ids(1)?,
            },
            "forget-fragment" => Command::ForgetFragment {
                id: id(0)?,
                fragment_ids: fragment_ids(1)?,
            },
            "add-text" => Command::AddText {
                id: id(0)?,
                text: rest(args, 1, "text", name)?.join(" "),
            },
            "edit-text" => Command::EditText {
                id: id(0)?,
                fragment_id: fragment_id(1)?,
                text: rest(args, 2, "text", name)?.join(" "),
            },
            "add-file" => {
                let target = arg(args, 0, "memory_id|-", name)?;
                let path = arg(args, 1, "path", name)?;
                let kind = match args.get(2) {
                    Some(k) => k.parse::<FileKind>()?,
                    None => FileKind::default(),
                };
                Command::AddFile {
                    id: if target == "-" { None } else { Some(MemoryId::from(target)) },
                    path: PathBuf::from(path),
                    kind,
                }
            }
            "add-rss" => Command::AddRss {
                id: id(0)?,
                urls: rest(args, 1, "url", name)?,
            },
            "edit-rss" => Command::EditRss {
                id: id(0)?,
                fragment_id: fragment_id(1)?,
                urls: rest(args, 2, "url", name)?,
            },
            "rss" => Command::Rss {
                id: id(0)?,
                fragment_id: fragment_id(1)?,
            },
            "share" => Self::parse_share(args)?,
            "whoami" => Command::Whoami,
            "play" => Command::Play {
                id: id(0)?,
                fragment_id: fragment_id(1)?,
            },
            other => Command::Unknown(other.to_string()),
        };
        Ok(cmd)
    }

    /// share <id> / share <sub> <id> <arg>
    fn parse_share(args: &[String]) -> Result<Self, Error> {
        let sub = arg(args, 0, "memory_id", "share")?;
        let command = format!("share {}", sub);
        let id = || arg(args, 1, "memory_id", &command).map(MemoryId::from);
        let value = |what: &str| arg(args, 2, what, &command).map(str::to_string);
        let cmd = match sub {
            "add-editor" => Command::ShareAddEditor {
                id: id()?,
                email: value("email")?,
            },
            "remove-editor" => Command::ShareRemoveEditor {
                id: id()?,
                user_id: UserId::from(value("user_id")?),
            },
            "add-reader" => Command::ShareAddReader {
                id: id()?,
                email: value("email")?,
            },
            "remove-reader" => Command::ShareRemoveReader {
                id: id()?,
                user_id: UserId::from(value("user_id")?),
            },
            "set-public" => Command::ShareSetPublic {
                id: id()?,
                public: parse_switch(&value("on|off")?)?,
            },
            memory_id => Command::Share {
                id: MemoryId::from(memory_id),
            },
        };
        Ok(cmd)
    }

    /// ログ用のコマンド名
    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::List => "list",
            Command::Show { .. } => "show",
            Command::Public { .. } => "public",
            Command::Create => "create",
            Command::Forget { .. } => "forget",
            Command::Pin { pin: true, .. } => "pin",
            Command::Pin { pin: false, .. } => "unpin",
            Command::Privacy { .. } => "privacy",
            Command::Rename { .. } => "rename",
            Command::Order { .. } => "order",
            Command::ForgetFragment { .. } => "forget-fragment",
            Command::AddText { .. } => "add-text",
            Command::EditText { .. } => "edit-text",
            Command::AddFile { .. } => "add-file",
            Command::AddRss { .. } => "add-rss",
            Command::EditRss { .. } => "edit-rss",
            Command::Rss { .. } => "rss",
            Command::Share { .. } => "share",
            Command::ShareAddEditor { .. } => "share add-editor",
            Command::ShareRemoveEditor { .. } => "share remove-editor",
            Command::ShareAddReader { .. } => "share add-reader",
            Command::ShareRemoveReader { .. } => "share remove-reader",
            Command::ShareSetPublic { .. } => "share set-public",
            Command::Whoami => "whoami",
            Command::Play { .. } => "play",
            Command::Unknown(_) => "unknown",
        }
    }

    /// セッション（アクセストークン）が必要か。公開ページの取得とヘルプ以外はすべて必要。
    pub fn requires_session(&self) -> bool {
        !matches!(
            self,
            Command::Help | Command::Public { .. } | Command::Unknown(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    fn parse(name: &str, xs: &[&str]) -> Result<Command, Error> {
        Command::parse_with_args(name, &args(xs))
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse("list", &[]).unwrap(), Command::List);
        assert_eq!(parse("create", &[]).unwrap(), Command::Create);
        assert_eq!(parse("whoami", &[]).unwrap(), Command::Whoami);
        assert_eq!(
            parse("show", &["m1"]).unwrap(),
            Command::Show { id: "m1".into() }
        );
    }

    #[test]
    fn test_parse_pin_unpin_privacy() {
        assert_eq!(
            parse("pin", &["m1"]).unwrap(),
            Command::Pin { id: "m1".into(), pin: true }
        );
        assert_eq!(
            parse("unpin", &["m1"]).unwrap(),
            Command::Pin { id: "m1".into(), pin: false }
        );
        assert_eq!(
            parse("privacy", &["m1", "off"]).unwrap(),
            Command::Privacy { id: "m1".into(), private: false }
        );
        assert!(parse("privacy", &["m1", "maybe"]).unwrap_err().is_usage());
    }

    #[test]
    fn test_parse_order_requires_fragment_ids() {
        assert_eq!(
            parse("order", &["m1", "c", "a"]).unwrap(),
            Command::Order {
                id: "m1".into(),
                fragment_ids: vec!["c".into(), "a".into()],
            }
        );
        let err = parse("order", &["m1"]).unwrap_err();
        assert!(err.is_usage());
        assert!(err.to_string().contains("fragment_id"));
    }

    #[test]
    fn test_parse_text_joins_words() {
        assert_eq!(
            parse("add-text", &["m1", "hello", "world"]).unwrap(),
            Command::AddText { id: "m1".into(), text: "hello world".to_string() }
        );
        assert_eq!(
            parse("rename", &["m1", "Summer", "2024"]).unwrap(),
            Command::Rename { id: "m1".into(), title: "Summer 2024".to_string() }
        );
    }

    #[test]
    fn test_parse_add_file() {
        assert_eq!(
            parse("add-file", &["-", "song.mp3", "audio"]).unwrap(),
            Command::AddFile { id: None, path: PathBuf::from("song.mp3"), kind: FileKind::Audio }
        );
        assert_eq!(
            parse("add-file", &["m1", "doc.pdf"]).unwrap(),
            Command::AddFile { id: Some("m1".into()), path: PathBuf::from("doc.pdf"), kind: FileKind::File }
        );
        assert!(parse("add-file", &["m1", "x", "video"]).is_err());
    }

    #[test]
    fn test_parse_share_subcommands() {
        assert_eq!(
            parse("share", &["m1"]).unwrap(),
            Command::Share { id: "m1".into() }
        );
        assert_eq!(
            parse("share", &["add-editor", "m1", "a@b.io"]).unwrap(),
            Command::ShareAddEditor { id: "m1".into(), email: "a@b.io".to_string() }
        );
        assert_eq!(
            parse("share", &["remove-reader", "m1", "u2"]).unwrap(),
            Command::ShareRemoveReader { id: "m1".into(), user_id: "u2".into() }
        );
        assert_eq!(
            parse("share", &["set-public", "m1", "on"]).unwrap(),
            Command::ShareSetPublic { id: "m1".into(), public: true }
        );
        assert!(parse("share", &["add-reader", "m1"]).unwrap_err().is_usage());
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse("frobnicate", &[]).unwrap(),
            Command::Unknown("frobnicate".to_string())
        );
    }

    #[test]
    fn test_requires_session() {
        assert!(Command::List.requires_session());
        assert!(Command::Create.requires_session());
        assert!(!Command::Help.requires_session());
        assert!(!Command::Public { id: "m1".into() }.requires_session());
    }
}
