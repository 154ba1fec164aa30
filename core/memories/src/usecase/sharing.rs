//! 共有設定のユースケース
//!
//! 変更は成否にかかわらず ["memory", id] と ["sharing", id] を無効化して確定させる。

use common::domain::{validate_email, MemoryId, SharingPermissions, UserId};
use common::error::Error;
use common::ports::outbound::{MemoryApi, QueryKey};
use common::query_client::QueryClient;
use std::sync::Arc;

pub struct SharingUseCase {
    api: Arc<dyn MemoryApi>,
    queries: QueryClient,
}

impl SharingUseCase {
    pub fn new(api: Arc<dyn MemoryApi>, queries: QueryClient) -> Self {
        Self { api, queries }
    }

    pub fn permissions(&self, memory_id: &MemoryId) -> Result<SharingPermissions, Error> {
        self.queries.fetch_query(&QueryKey::sharing(memory_id), || {
            self.api.get_sharing_permissions(memory_id)
        })
    }

    pub fn add_editor(&self, memory_id: &MemoryId, email: &str) -> Result<(), Error> {
        let email = validate_email(email)?;
        self.settle(memory_id, self.api.add_editor(memory_id, &email))
    }

    pub fn remove_editor(&self, memory_id: &MemoryId, user_id: &UserId) -> Result<(), Error> {
        self.settle(memory_id, self.api.remove_editor(memory_id, user_id))
    }

    pub fn add_reader(&self, memory_id: &MemoryId, email: &str) -> Result<(), Error> {
        let email = validate_email(email)?;
        self.settle(memory_id, self.api.add_reader(memory_id, &email))
    }

    pub fn remove_reader(&self, memory_id: &MemoryId, user_id: &UserId) -> Result<(), Error> {
        self.settle(memory_id, self.api.remove_reader(memory_id, user_id))
    }

    pub fn set_public(&self, memory_id: &MemoryId, is_public: bool) -> Result<(), Error> {
        self.settle(memory_id, self.api.set_public(memory_id, is_public))
    }

    fn settle(&self, memory_id: &MemoryId, result: Result<(), Error>) -> Result<(), Error> {
        self.queries.invalidate_queries(&QueryKey::memory(memory_id));
        self.queries.invalidate_queries(&QueryKey::sharing(memory_id));
        result
    }
}
