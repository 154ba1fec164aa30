use crate::domain::command::Command;
use clap::builder::ArgAction;
use clap::value_parser;
use clap_complete::Shell;
use common::error::Error;

/// CLI から受け取った生の設定（command は文字列のまま保持）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub help: bool,
    /// -v / --verbose: ログレコードを stderr にも出す
    pub verbose: bool,
    pub home_dir: Option<String>,
    /// コマンド名（None の場合は Help）
    pub command_name: Option<String>,
    pub command_args: Vec<String>,
}

/// 解析結果: 通常の Config または補完スクリプト生成
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Config(Config),
    GenerateCompletion(Shell),
}

const SUBCOMMANDS: &[&str] = &[
    "list", "show", "public", "create", "forget", "pin", "unpin", "privacy", "rename", "order",
    "forget-fragment", "add-text", "edit-text", "add-file", "add-rss", "edit-rss", "rss", "share",
    "whoami", "play", "help",
];

const SHARE_SUBCOMMANDS: &[&str] = &[
    "add-editor", "remove-editor", "add-reader", "remove-reader", "set-public",
];

fn global_args(cmd: clap::Command) -> clap::Command {
    cmd.disable_help_flag(true)
        .arg(
            clap::Arg::new("help")
                .short('h')
                .long("help")
                .help("Print help")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("home-dir")
                .short('d')
                .long("home-dir")
                .value_name("directory")
                .help("Specify a home directory (sets MEMORIES_HOME for this process)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Echo log records to stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("generate")
                .long("generate")
                .value_name("shell")
                .help("Generate shell completion script")
                .value_parser(value_parser!(Shell))
                .num_args(1),
        )
}

/// -h はトップレベルだけで受ける
fn sub(name: &'static str) -> clap::Command {
    clap::Command::new(name).disable_help_flag(true)
}

fn id_arg() -> clap::Arg {
    clap::Arg::new("id").value_name("memory_id").required(true)
}

fn words(name: &'static str, value_name: &'static str) -> clap::Arg {
    clap::Arg::new(name)
        .value_name(value_name)
        .num_args(1..)
        .required(true)
        .allow_hyphen_values(true)
}

fn switch(name: &'static str) -> clap::Arg {
    clap::Arg::new(name)
        .value_name("on|off")
        .required(true)
        .value_parser(["on", "off"])
}

fn build_share_subcommand() -> clap::Command {
    let collaborator = |name: &'static str, about: &'static str, value: &'static str| {
        sub(name)
            .about(about)
            .arg(id_arg())
            .arg(clap::Arg::new("value").value_name(value).required(true))
    };
    sub("share")
        .about("Show or change who can see and edit a memory")
        .disable_help_subcommand(true)
        .args_conflicts_with_subcommands(true)
        .arg(clap::Arg::new("id").value_name("memory_id"))
        .subcommand(collaborator("add-editor", "Invite an editor by email", "email"))
        .subcommand(collaborator("remove-editor", "Remove an editor by user id", "user_id"))
        .subcommand(collaborator("add-reader", "Invite a reader by email", "email"))
        .subcommand(collaborator("remove-reader", "Remove a reader by user id", "user_id"))
        .subcommand(
            sub("set-public")
                .about("Make the memory public (on) or private (off)")
                .arg(id_arg())
                .arg(switch("value")),
        )
}

fn build_clap_command() -> clap::Command {
    global_args(
        clap::Command::new("memories")
            .about("Command-line client for the memories journal")
            .disable_help_subcommand(true)
            .subcommand_required(false)
            .subcommand(sub("help").about("Display this help message"))
            .subcommand(sub("list").about("List memories (pinned first)"))
            .subcommand(sub("show").about("Show a memory and its fragments").arg(id_arg()))
            .subcommand(
                sub("public")
                    .about("Show a public memory without signing in")
                    .arg(id_arg()),
            )
            .subcommand(sub("create").about("Create an empty memory"))
            .subcommand(sub("forget").about("Forget (delete) a memory").arg(id_arg()))
            .subcommand(sub("pin").about("Pin a memory").arg(id_arg()))
            .subcommand(sub("unpin").about("Unpin a memory").arg(id_arg()))
            .subcommand(
                sub("privacy")
                    .about("Make a memory private (on) or public (off)")
                    .arg(id_arg())
                    .arg(switch("private")),
            )
            .subcommand(
                sub("rename")
                    .about("Set the title of a memory")
                    .arg(id_arg())
                    .arg(words("title", "title")),
            )
            .subcommand(
                sub("order")
                    .about("Reorder fragments (fragments not listed are dropped)")
                    .arg(id_arg())
                    .arg(words("fragment_ids", "fragment_id")),
            )
            .subcommand(
                sub("forget-fragment")
                    .about("Forget fragment(s) of a memory")
                    .arg(id_arg())
                    .arg(words("fragment_ids", "fragment_id")),
            )
            .subcommand(
                sub("add-text")
                    .about("Add a text fragment")
                    .arg(id_arg())
                    .arg(words("text", "text")),
            )
            .subcommand(
                sub("edit-text")
                    .about("Replace the content of a text fragment")
                    .arg(id_arg())
                    .arg(clap::Arg::new("fragment_id").value_name("fragment_id").required(true))
                    .arg(words("text", "text")),
            )
            .subcommand(
                sub("add-file")
                    .about("Upload a file as a fragment (use - as memory_id to create a new memory)")
                    .arg(id_arg().allow_hyphen_values(true))
                    .arg(clap::Arg::new("path").value_name("path").required(true))
                    .arg(
                        clap::Arg::new("kind")
                            .long("kind")
                            .value_name("kind")
                            .value_parser(["file", "audio", "image"])
                            .num_args(1),
                    ),
            )
            .subcommand(
                sub("add-rss")
                    .about("Add an RSS feed fragment")
                    .arg(id_arg())
                    .arg(words("urls", "url")),
            )
            .subcommand(
                sub("edit-rss")
                    .about("Replace the feed URLs of an RSS fragment")
                    .arg(id_arg())
                    .arg(clap::Arg::new("fragment_id").value_name("fragment_id").required(true))
                    .arg(words("urls", "url")),
            )
            .subcommand(
                sub("rss")
                    .about("Show the items of an RSS fragment")
                    .arg(id_arg())
                    .arg(clap::Arg::new("fragment_id").value_name("fragment_id").required(true)),
            )
            .subcommand(build_share_subcommand())
            .subcommand(sub("whoami").about("Show the signed-in account"))
            .subcommand(
                sub("play")
                    .about("Print the playback URL of an audio fragment")
                    .arg(id_arg())
                    .arg(clap::Arg::new("fragment_id").value_name("fragment_id").required(true)),
            ),
    )
}

fn strings(m: &clap::ArgMatches, name: &str) -> Vec<String> {
    m.get_many::<String>(name)
        .map(|i| i.cloned().collect())
        .unwrap_or_default()
}

/// サブコマンドの引数を位置順の文字列列に戻す（Command::parse_with_args が解釈する）
fn subcommand_args(name: &str, m: &clap::ArgMatches) -> Vec<String> {
    let mut args = Vec::new();
    match name {
        "share" => match m.subcommand() {
            Some((sub, sm)) => {
                args.push(sub.to_string());
                args.extend(strings(sm, "id"));
                args.extend(strings(sm, "value"));
            }
            None => args.extend(strings(m, "id")),
        },
        "add-file" => {
            args.extend(strings(m, "id"));
            args.extend(strings(m, "path"));
            args.extend(strings(m, "kind"));
        }
        _ => {
            for key in ["id", "fragment_id", "private", "title", "fragment_ids", "text", "urls"] {
                if m.try_contains_id(key).unwrap_or(false) {
                    args.extend(strings(m, key));
                }
            }
        }
    }
    args
}

fn matches_to_config(matches: &clap::ArgMatches) -> Config {
    let help = matches.get_flag("help");
    let verbose = matches.get_flag("verbose");
    let home_dir = matches.get_one::<String>("home-dir").cloned();

    let (command_name, command_args) = match matches.subcommand() {
        None | Some(("help", _)) => (None, Vec::new()),
        Some((name, m)) => (Some(name.to_string()), subcommand_args(name, m)),
    };

    Config {
        help,
        verbose,
        home_dir,
        command_name,
        command_args,
    }
}

/// コマンドラインを解析する。補完生成が要求された場合は ParseOutcome::GenerateCompletion を返す。
pub fn parse_args() -> Result<ParseOutcome, Error> {
    let cmd = build_clap_command();
    let matches = cmd
        .try_get_matches()
        .map_err(|e| Error::invalid_argument(e.to_string()))?;

    if let Some(&shell) = matches.get_one::<Shell>("generate") {
        return Ok(ParseOutcome::GenerateCompletion(shell));
    }

    Ok(ParseOutcome::Config(matches_to_config(&matches)))
}

/// テスト用: 引数スライスから解析する
#[allow(dead_code)]
pub fn parse_args_from(args: &[&str]) -> Result<Config, Error> {
    let cmd = build_clap_command();
    let matches = cmd
        .try_get_matches_from(args)
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    Ok(matches_to_config(&matches))
}

/// 補完スクリプトを標準出力に出力する。
/// 注: -h を自前で定義しているため clap_complete::generate は使わず、簡易フォールバックを出す。
pub fn print_completion(shell: Shell) {
    emit_fallback_completion(shell);
}

fn emit_fallback_completion(shell: Shell) {
    match shell {
        Shell::Bash => {
            println!(
                r#"# Fallback completion for memories (subcommands only)
_memories() {{
  local cur="${{COMP_WORDS[COMP_CWORD]}}"
  if [ "$COMP_CWORD" -eq 1 ]; then
    COMPREPLY=($(compgen -W "{}" -- "$cur"))
  elif [ "${{COMP_WORDS[1]}}" = "share" ] && [ "$COMP_CWORD" -eq 2 ]; then
    COMPREPLY=($(compgen -W "{}" -- "$cur"))
  fi
}}
complete -F _memories memories
"#,
                SUBCOMMANDS.join(" "),
                SHARE_SUBCOMMANDS.join(" ")
            );
        }
        Shell::Zsh => {
            println!(
                r#"# Fallback completion for memories (subcommands only)
#compdef memories
local subcommands
subcommands=({})
_describe 'command' subcommands
"#,
                SUBCOMMANDS
                    .iter()
                    .map(|s| format!("\"{}\"", s))
                    .collect::<Vec<_>>()
                    .join(" ")
            );
        }
        Shell::Fish => {
            println!(
                r#"# Fallback completion for memories (subcommands only)
complete -c memories -n "__fish_use_subcommand" -a "{}"
complete -c memories -n "__fish_seen_subcommand_from share" -a "{}"
"#,
                SUBCOMMANDS.join(" "),
                SHARE_SUBCOMMANDS.join(" ")
            );
        }
        _ => {}
    }
}

/// Config を Command に変換する
pub fn config_to_command(config: &Config) -> Result<Command, Error> {
    if config.help {
        return Ok(Command::Help);
    }
    match &config.command_name {
        Some(name) => Command::parse_with_args(name, &config.command_args),
        None => Ok(Command::Help),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::domain::FileKind;
    use std::path::PathBuf;

    fn command(args: &[&str]) -> Command {
        let config = parse_args_from(args).unwrap();
        config_to_command(&config).unwrap()
    }

    #[test]
    fn test_config_default_is_help() {
        let config = Config::default();
        assert_eq!(config_to_command(&config).unwrap(), Command::Help);
        assert_eq!(command(&["memories"]), Command::Help);
        assert_eq!(command(&["memories", "help"]), Command::Help);
        assert_eq!(command(&["memories", "-h", "list"]), Command::Help);
    }

    #[test]
    fn test_global_flags() {
        let config = parse_args_from(&["memories", "-v", "-d", "/tmp/m", "list"]).unwrap();
        assert!(config.verbose);
        assert_eq!(config.home_dir.as_deref(), Some("/tmp/m"));
        assert_eq!(config.command_name.as_deref(), Some("list"));
    }

    #[test]
    fn test_parse_order_and_privacy() {
        assert_eq!(
            command(&["memories", "order", "m1", "c", "a", "b"]),
            Command::Order {
                id: "m1".into(),
                fragment_ids: vec!["c".into(), "a".into(), "b".into()],
            }
        );
        assert_eq!(
            command(&["memories", "privacy", "m1", "on"]),
            Command::Privacy { id: "m1".into(), private: true }
        );
        assert!(parse_args_from(&["memories", "privacy", "m1", "sometimes"]).is_err());
    }

    #[test]
    fn test_parse_edit_text_keeps_fragment_then_text() {
        assert_eq!(
            command(&["memories", "edit-text", "m1", "f1", "new", "words"]),
            Command::EditText {
                id: "m1".into(),
                fragment_id: "f1".into(),
                text: "new words".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_add_file_with_kind_and_new_memory() {
        assert_eq!(
            command(&["memories", "add-file", "-", "voice.m4a", "--kind", "audio"]),
            Command::AddFile {
                id: None,
                path: PathBuf::from("voice.m4a"),
                kind: FileKind::Audio,
            }
        );
    }

    #[test]
    fn test_parse_share() {
        assert_eq!(
            command(&["memories", "share", "m1"]),
            Command::Share { id: "m1".into() }
        );
        assert_eq!(
            command(&["memories", "share", "add-reader", "m1", "r@x.io"]),
            Command::ShareAddReader { id: "m1".into(), email: "r@x.io".to_string() }
        );
        assert_eq!(
            command(&["memories", "share", "set-public", "m1", "off"]),
            Command::ShareSetPublic { id: "m1".into(), public: false }
        );
    }

    #[test]
    fn test_missing_required_arg_is_usage_error() {
        let err = parse_args_from(&["memories", "show"]).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_clap_command_passes_debug_asserts() {
        // 自前の help サブコマンドと clap の自動 help が重複しないこと
        build_clap_command().debug_assert();
        assert_eq!(command(&["memories", "--help"]), Command::Help);
        assert_eq!(command(&["memories", "list"]), Command::List);
    }

    #[test]
    fn test_subcommand_list_matches_clap() {
        let cmd = build_clap_command();
        for name in SUBCOMMANDS {
            assert!(cmd.find_subcommand(name).is_some(), "{}", name);
        }
        let share = cmd.find_subcommand("share").unwrap();
        for name in SHARE_SUBCOMMANDS {
            assert!(share.find_subcommand(name).is_some(), "share {}", name);
        }
    }
}
