//! Synchronization repositories, one per resource family.
//!
//! Every `update_*` fetches from the server, transforms the payload and
//! upserts it parents first. Reads only ever touch the cache.

pub mod devices;
pub mod events;
pub mod purchases;
pub mod reports;
pub mod users;

use crate::errors::AppResult;
use crate::models::users::User;
use crate::remote::ResponseHandler;
use crate::remote::UsersApi;
use crate::remote::models::users::UserDto;
use crate::resource::Resource;
use crate::store::CacheStore;
use std::collections::BTreeSet;
use std::future::Future;
use tracing::{debug, info, warn};

pub use devices::DevicesRepository;
pub use events::EventsRepository;
pub use purchases::PurchasesRepository;
pub use reports::ReportsRepository;
pub use users::UsersRepository;

/// What every repository shares: the cache and the request gate.
#[derive(Clone)]
pub struct SyncContext {
    store: CacheStore,
    handler: ResponseHandler,
}

impl SyncContext {
    pub fn new(store: CacheStore, handler: ResponseHandler) -> Self {
        Self { store, handler }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn handler(&self) -> &ResponseHandler {
        &self.handler
    }

    /// Context whose remote calls can be cancelled without touching the
    /// parent's in-flight work.
    pub fn scoped(&self) -> Self {
        Self {
            store: self.store.clone(),
            handler: self.handler.child(),
        }
    }

    pub fn cancel(&self) {
        self.handler.cancel();
    }

    /// Issue one remote call through the handler.
    pub async fn call<T, F>(&self, request: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        self.handler.call(request).await
    }

    /// Await a fetch-and-store unit of work and report its outcome.
    ///
    /// The outcome is traced and recorded in the `log` table; failures become
    /// `Resource::Error` and leave the cache as it was.
    pub async fn try_update<T, Fut>(&self, operation: &str, target: &str, work: Fut) -> Resource<T>
    where
        Fut: Future<Output = AppResult<T>>,
    {
        let result = work.await;

        match &result {
            Ok(_) => {
                info!(operation, target, "sync completed");
                self.record(operation, target, "ok");
            }
            Err(e) => {
                warn!(operation, target, error = %e, "sync failed");
                self.record(operation, target, &format!("failed: {e}"));
            }
        }

        result.into()
    }

    /// Best effort: losing a log line must not fail the sync.
    fn record(&self, operation: &str, target: &str, message: &str) {
        if let Err(e) = self.store.log(operation, target, message) {
            debug!(error = %e, "could not record sync outcome");
        }
    }

    /// Fetch every user in `ids` the cache does not know yet.
    pub(crate) async fn fetch_missing_users<I>(
        &self,
        api: &dyn UsersApi,
        ids: I,
    ) -> AppResult<Vec<UserDto>>
    where
        I: IntoIterator<Item = String>,
    {
        let known = self.store.ids::<User>()?;
        let missing: BTreeSet<String> = ids.into_iter().filter(|id| !known.contains(id)).collect();

        let mut users = Vec::with_capacity(missing.len());
        for id in missing {
            debug!(user_id = %id, "fetching missing user");
            users.push(self.call(api.get_user(&id)).await?);
        }
        Ok(users)
    }
}
