//! 共有設定とアカウント

use super::{MemoryId, UserId};
use crate::error::Error;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// サインイン中のアカウント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: UserId,
    pub email: String,
}

/// 閲覧者・編集者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub id: UserId,
    pub email: String,
}

/// memory 1 件の共有状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharingPermissions {
    pub id: MemoryId,
    pub owner: UserId,
    #[serde(default)]
    pub readers: Vec<Collaborator>,
    #[serde(default)]
    pub editors: Vec<Collaborator>,
    #[serde(default)]
    pub private: bool,
}

impl SharingPermissions {
    pub fn can_edit(&self, user_id: &UserId) -> bool {
        &self.owner == user_id || self.editors.iter().any(|c| &c.id == user_id)
    }

    pub fn can_read(&self, user_id: &UserId) -> bool {
        !self.private || self.can_edit(user_id) || self.readers.iter().any(|c| &c.id == user_id)
    }
}

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// 招待先メールアドレスを検証し、前後の空白を落として返す
pub fn validate_email(email: &str) -> Result<String, Error> {
    let re = Regex::new(EMAIL_PATTERN).map_err(|e| Error::invalid_argument(e.to_string()))?;
    let trimmed = email.trim();
    if re.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(Error::invalid_argument(format!(
            "invalid email address: '{}'",
            email
        )))
    }
}
