//! アカウント・セッションのユースケース

use common::domain::{Account, SessionContext};
use common::error::Error;
use common::ports::outbound::{MemoryApi, QueryKey};
use common::query_client::QueryClient;
use std::sync::Arc;

pub struct AccountUseCase {
    api: Arc<dyn MemoryApi>,
    queries: QueryClient,
    session: SessionContext,
}

impl AccountUseCase {
    pub fn new(api: Arc<dyn MemoryApi>, queries: QueryClient, session: SessionContext) -> Self {
        Self {
            api,
            queries,
            session,
        }
    }

    /// トークンが無ければ Unauthenticated
    pub fn require_session(&self) -> Result<(), Error> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(Error::Unauthenticated)
        }
    }

    /// サインイン中のアカウントを取得し、それを持たせたセッションを返す
    pub fn whoami(&self) -> Result<SessionContext, Error> {
        self.require_session()?;
        let account: Account = self
            .queries
            .fetch_query(&QueryKey::account(), || self.api.get_account())?;
        Ok(self.session.clone().with_account(account))
    }
}
