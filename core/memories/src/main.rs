mod cli;
mod domain;
mod ports;
mod usecase;
mod wiring;

#[cfg(test)]
mod tests;

use std::process;
use common::adapter::std_env_resolver::HOME_ENV;
use common::domain::{Fragment, ListMemoryItem, Memory, RssChannel, RssItem, SharingPermissions};
use common::error::Error;
use common::ports::outbound::{log_event, LogLevel};
use cli::{config_to_command, parse_args, print_completion, Config, ParseOutcome};
use domain::Command;
use ports::inbound::UseCaseRunner;
use serde_json::json;
use wiring::{wire_memories, App};

/// Command をディスパッチする Runner（match は main レイヤーに集約）
struct Runner {
    app: App,
}

impl UseCaseRunner for Runner {
    fn run(&self, config: Config) -> Result<i32, Error> {
        let cmd = config_to_command(&config)?;
        let command_name = cmd.name();
        log_event(
            self.app.logger.as_ref(),
            LogLevel::Info,
            "cli",
            "lifecycle",
            "command started",
            &[("command", json!(command_name))],
        );

        let result = self.dispatch(cmd);

        let code = result.as_ref().copied().unwrap_or(0);
        log_event(
            self.app.logger.as_ref(),
            LogLevel::Info,
            "cli",
            "lifecycle",
            "command finished",
            &[("command", json!(command_name)), ("exit_code", json!(code))],
        );
        if let Err(ref e) = result {
            log_event(
                self.app.logger.as_ref(),
                LogLevel::Error,
                "cli",
                "error",
                &e.to_string(),
                &[("command", json!(command_name))],
            );
        }
        result
    }
}

impl Runner {
    fn dispatch(&self, cmd: Command) -> Result<i32, Error> {
        if cmd.requires_session() {
            self.app.account_use_case.require_session()?;
        }
        let memories = &self.app.memory_use_case;
        let sharing = &self.app.sharing_use_case;

        match cmd {
            Command::Help => {
                print_help();
            }
            Command::List => print_memory_list(&memories.list()?),
            Command::Show { id } => {
                let memory = memories.get(&id)?;
                print_memory(&memory, self.app.storage_url.as_deref());
            }
            Command::Public { id } => {
                let memory = memories.get_public(&id)?;
                print_memory(&memory, self.app.storage_url.as_deref());
            }
            Command::Create => println!("{}", memories.create()?),
            Command::Forget { id } => memories.forget(&id)?,
            Command::Pin { id, pin } => memories.pin(&id, pin)?,
            Command::Privacy { id, private } => memories.set_private(&id, private)?,
            Command::Rename { id, title } => memories.rename(&id, &title)?,
            Command::Order { id, fragment_ids } => {
                let memory = memories.reorder(&id, &fragment_ids)?;
                print_fragments(&memory, self.app.storage_url.as_deref());
            }
            Command::ForgetFragment { id, fragment_ids } => {
                memories.forget_fragments(&id, &fragment_ids)?
            }
            Command::AddText { id, text } => println!("{}", memories.add_text(&id, &text)?),
            Command::EditText {
                id,
                fragment_id,
                text,
            } => {
                if !memories.edit_text(&id, &fragment_id, &text)? {
                    println!("(unchanged)");
                }
            }
            Command::AddFile { id, path, kind } => memories.add_file(id.as_ref(), &path, kind)?,
            Command::AddRss { id, urls } => memories.add_rss(&id, &urls)?,
            Command::EditRss {
                id,
                fragment_id,
                urls,
            } => memories.edit_rss(&id, &fragment_id, &urls)?,
            Command::Rss { id, fragment_id } => {
                print_rss(memories.rss_items(&id, &fragment_id)?);
            }
            Command::Share { id } => print_sharing(&sharing.permissions(&id)?),
            Command::ShareAddEditor { id, email } => sharing.add_editor(&id, &email)?,
            Command::ShareRemoveEditor { id, user_id } => sharing.remove_editor(&id, &user_id)?,
            Command::ShareAddReader { id, email } => sharing.add_reader(&id, &email)?,
            Command::ShareRemoveReader { id, user_id } => sharing.remove_reader(&id, &user_id)?,
            Command::ShareSetPublic { id, public } => sharing.set_public(&id, public)?,
            Command::Whoami => {
                let session = self.app.account_use_case.whoami()?;
                if let Some(account) = session.account {
                    println!("{} <{}>", account.id, account.email);
                }
            }
            Command::Play { id, fragment_id } => {
                let memory = memories.get(&id)?;
                // 再生状態はプロセス内だけなので、CLI では解決した URL だけを出す
                let playback = self.app.playback_use_case.toggle(&memory, &fragment_id)?;
                println!("{}", playback.name);
                println!("{}", playback.src);
            }
            Command::Unknown(name) => {
                return Err(Error::invalid_argument(format!(
                    "Command '{}' is not implemented.",
                    name
                )))
            }
        }
        Ok(0)
    }
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            if e.is_usage() {
                print_usage();
            }
            eprintln!("memories: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

pub fn run() -> Result<i32, Error> {
    let outcome = parse_args()?;
    let config = match &outcome {
        ParseOutcome::Config(c) => c.clone(),
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(*shell);
            return Ok(0);
        }
    };
    // -d/--home-dir 指定時は MEMORIES_HOME を設定し、config.json とログをその配下から使う
    if let Some(ref h) = config.home_dir {
        std::env::set_var(HOME_ENV, h);
    }
    let app = wire_memories(config.verbose)?;
    let runner = Runner { app };
    runner.run(config)
}

fn print_usage() {
    eprintln!("Usage: memories [-h] [-v] [-d|--home-dir directory] <command> [args...]");
}

fn print_help() {
    println!("Usage: memories [-h] [-v] [-d|--home-dir directory] <command> [args...]");
    println!("  -h, --help            Display this help message.");
    println!("  -d, --home-dir        Specify a home directory (sets MEMORIES_HOME for this process).");
    println!("  -v, --verbose         Echo log records to stderr (for troubleshooting).");
    println!("  --generate <shell>    Generate shell completion script (bash, zsh, fish).");
    println!();
    println!("Environment:");
    println!("  MEMORIES_HOME          Home directory (config.json, logs). Default: $XDG_CONFIG_HOME/memories or ~/.config/memories.");
    println!("  MEMORIES_ACCESS_TOKEN  Access token of the signed-in session (name configurable with access_token_env).");
    println!("  MEMORIES_BACKEND_URL   API base URL (overrides config.json backend_url).");
    println!("  MEMORIES_STORAGE_URL   Public storage base URL for attachments (overrides config.json storage_url).");
    println!();
    println!("Memories:");
    println!("  list                               List memories (pinned first, then oldest first).");
    println!("  show <id>                          Show a memory and its fragments.");
    println!("  public <id>                        Show a public memory (no sign-in needed).");
    println!("  create                             Create an empty memory and print its id.");
    println!("  forget <id>                        Forget (delete) a memory.");
    println!("  pin <id> | unpin <id>              Pin or unpin a memory.");
    println!("  privacy <id> on|off                Make a memory private (on) or public (off).");
    println!("  rename <id> <title...>             Set the title of a memory.");
    println!("  order <id> <fragment_id...>        Reorder fragments. Fragments not listed are dropped.");
    println!();
    println!("Fragments:");
    println!("  add-text <id> <text...>            Add a text fragment.");
    println!("  edit-text <id> <fragment_id> <text...>  Replace the text of a fragment.");
    println!("  add-file <id|-> <path> [--kind k]  Upload a file (file, audio, image). '-' creates a new memory.");
    println!("  add-rss <id> <url...>              Add an RSS feed fragment.");
    println!("  edit-rss <id> <fragment_id> <url...>  Replace the feed URLs.");
    println!("  rss <id> <fragment_id>             Show feed items grouped by source.");
    println!("  forget-fragment <id> <fragment_id...>  Forget fragment(s).");
    println!("  play <id> <fragment_id>            Print the name and playback URL of an audio fragment.");
    println!();
    println!("Sharing:");
    println!("  share <id>                         Show owner, editors and readers.");
    println!("  share add-editor <id> <email>      Invite an editor.");
    println!("  share remove-editor <id> <user_id> Remove an editor.");
    println!("  share add-reader <id> <email>      Invite a reader.");
    println!("  share remove-reader <id> <user_id> Remove a reader.");
    println!("  share set-public <id> on|off       Make the memory public or private.");
    println!();
    println!("  whoami                             Show the signed-in account.");
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

fn print_memory_list(items: &[ListMemoryItem]) {
    if items.is_empty() {
        println!("(no memories)");
        return;
    }
    println!("{:38} {:3} {:7} {:<20} {}", "ID", "PIN", "PRIVATE", "CREATED", "TITLE");
    for m in items {
        println!(
            "{:38} {:3} {:7} {:<20} {}",
            m.id,
            if m.pinned { "*" } else { "" },
            if m.private { "yes" } else { "no" },
            m.created_at.format("%Y-%m-%d %H:%M"),
            truncate(&m.title, 50)
        );
    }
}

fn print_memory(memory: &Memory, storage_url: Option<&str>) {
    println!("{}", memory.title);
    println!(
        "id={} owner={} private={} pinned={}",
        memory.id,
        memory.owner,
        if memory.private { "yes" } else { "no" },
        if memory.pinned { "yes" } else { "no" }
    );
    if !memory.tags.is_empty() {
        let tags: Vec<&str> = memory.tags.iter().map(|t| t.as_str()).collect();
        println!("tags: {}", tags.join(", "));
    }
    println!("updated: {}", memory.updated_at.to_rfc3339());
    println!();
    print_fragments(memory, storage_url);
}

fn print_fragments(memory: &Memory, storage_url: Option<&str>) {
    if memory.fragments.is_empty() {
        println!("(no fragments)");
        return;
    }
    for f in &memory.fragments {
        println!("{:38} {:<9} {}", f.id(), f.kind().as_str(), truncate(&f.summary(), 60));
        if let Some(base) = storage_url {
            let url = match f {
                Fragment::Audio(_) | Fragment::Image(_) => f.media_url(base, &memory.owner),
                _ => f.download_url(base, &memory.owner),
            };
            if let Some(url) = url {
                println!("{:38} {}", "", url);
            }
        }
    }
}

fn print_rss(items: Vec<RssItem>) {
    if items.is_empty() {
        println!("(no items)");
        return;
    }
    for channel in RssChannel::group_by_source(items) {
        println!("== {} ==", if channel.title.is_empty() { "(unknown source)" } else { channel.title.as_str() });
        for item in &channel.items {
            match &item.pub_date {
                Some(date) => println!("- {} ({})", item.title, date),
                None => println!("- {}", item.title),
            }
            println!("  {}", item.link);
        }
    }
}

fn print_sharing(p: &SharingPermissions) {
    println!("owner: {}", p.owner);
    println!("private: {}", if p.private { "yes" } else { "no" });
    println!("editors:");
    for c in &p.editors {
        println!("  {:38} {}", c.id, c.email);
    }
    println!("readers:");
    for c in &p.readers {
        println!("  {:38} {}", c.id, c.email);
    }
}
