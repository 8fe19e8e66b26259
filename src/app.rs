//! Composition root: builds the store, the request gate and every repository
//! explicitly, with no global state.

use crate::config::Config;
use crate::errors::AppResult;
use crate::remote::{RemoteApi, ResponseHandler, RestClient};
use crate::repository::{
    DevicesRepository, EventsRepository, PurchasesRepository, ReportsRepository, SyncContext,
    UsersRepository,
};
use crate::store::CacheStore;
use std::sync::Arc;

/// Settings the repositories need beyond the store and the client.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub user_id: Option<String>,
    pub page_size: u32,
    pub max_concurrent_requests: usize,
}

impl From<&Config> for AppSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            user_id: cfg.user_id.clone(),
            page_size: cfg.page_size.max(1),
            max_concurrent_requests: cfg.max_concurrent_requests,
        }
    }
}

#[derive(Clone)]
pub struct App {
    ctx: SyncContext,
    settings: AppSettings,
    pub events: EventsRepository,
    pub reports: ReportsRepository,
    pub users: UsersRepository,
    pub devices: DevicesRepository,
    pub purchases: PurchasesRepository,
}

impl App {
    /// Open the configured cache and talk to the configured server.
    pub fn open(cfg: &Config) -> AppResult<Self> {
        let store = CacheStore::open(&cfg.database)?;
        let client = RestClient::new(
            &cfg.base_url,
            cfg.access_token.clone(),
            cfg.request_timeout(),
        )?;
        Ok(Self::with_remote(store, Arc::new(client), AppSettings::from(cfg)))
    }

    /// Wire repositories around any client implementation.
    pub fn with_remote<R>(store: CacheStore, remote: Arc<R>, settings: AppSettings) -> Self
    where
        R: RemoteApi + 'static,
    {
        let handler = ResponseHandler::new(settings.max_concurrent_requests);
        Self::build(SyncContext::new(store, handler), remote, settings)
    }

    fn build<R>(ctx: SyncContext, remote: Arc<R>, settings: AppSettings) -> Self
    where
        R: RemoteApi + 'static,
    {
        Self {
            events: EventsRepository::new(ctx.clone(), remote.clone(), remote.clone()),
            reports: ReportsRepository::new(ctx.clone(), remote.clone()),
            users: UsersRepository::new(ctx.clone(), remote.clone(), settings.user_id.clone()),
            devices: DevicesRepository::new(ctx.clone(), remote.clone(), remote.clone()),
            purchases: PurchasesRepository::new(ctx.clone(), remote),
            ctx,
            settings,
        }
    }

    /// Repositories sharing this app's cache and request permits whose
    /// remote calls can be cancelled as a group.
    pub fn scoped(&self) -> Self {
        let ctx = self.ctx.scoped();
        Self {
            events: self.events.scoped_in(&ctx),
            reports: self.reports.scoped_in(&ctx),
            users: self.users.scoped_in(&ctx),
            devices: self.devices.scoped_in(&ctx),
            purchases: self.purchases.scoped_in(&ctx),
            ctx,
            settings: self.settings.clone(),
        }
    }

    /// Abort every remote call issued through this app (or scope).
    pub fn cancel(&self) {
        self.ctx.cancel();
    }

    pub fn store(&self) -> &CacheStore {
        self.ctx.store()
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }
}
