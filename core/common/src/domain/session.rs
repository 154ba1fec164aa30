//! セッション単位のコンテキスト
//!
//! クライアントのセッション 1 つにつき 1 回作り、必要な usecase に明示的に渡す。

use super::{Account, Memory, UserId};

/// 認証状態。トークンは外部の認証プロバイダーが発行したものを受け取るだけ。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionContext {
    pub access_token: Option<String>,
    pub account: Option<Account>,
}

impl SessionContext {
    /// 空文字のトークンはセッション無しとして扱う
    pub fn new(access_token: Option<String>) -> Self {
        Self {
            access_token: access_token.filter(|t| !t.trim().is_empty()),
            account: None,
        }
    }

    pub fn with_account(mut self, account: Account) -> Self {
        self.account = Some(account);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn account_id(&self) -> Option<&UserId> {
        self.account.as_ref().map(|a| &a.id)
    }
}

/// いま開いている memory
#[derive(Debug, Clone, Default)]
pub struct ActiveMemory {
    memory: Option<Memory>,
}

impl ActiveMemory {
    pub fn set(&mut self, memory: Memory) {
        self.memory = Some(memory);
    }

    pub fn clear(&mut self) {
        self.memory = None;
    }

    pub fn get(&self) -> Option<&Memory> {
        self.memory.as_ref()
    }
}
