//! memories コマンド側のドメイン（コマンド enum）

pub mod command;

pub use command::Command;
