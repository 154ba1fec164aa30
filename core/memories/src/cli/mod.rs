//! CLI 境界: 引数解析と Config → Command の変換

mod args;

#[cfg(test)]
pub use args::parse_args_from;
pub use args::{config_to_command, parse_args, print_completion, Config, ParseOutcome};
