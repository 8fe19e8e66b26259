use crate::app::App;
use crate::cli::parser::{Commands, SyncTarget};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::purchases::PurchaseFilter;
use crate::paginator::FetchOutcome;
use crate::resource::Resource;
use crate::ui::messages::{info, success, warning};
use crate::utils::date::parse_optional_bound;
use tokio::runtime::Runtime;
use tracing::debug;

/// Arguments shared by every sync target, already validated.
struct SyncArgs {
    user: Option<String>,
    begin: Option<String>,
    end: Option<String>,
    id: Option<String>,
    pages: u32,
}

impl SyncArgs {
    fn user(&self) -> AppResult<&str> {
        self.user
            .as_deref()
            .ok_or_else(|| AppError::Config("no --user given and no user_id configured".into()))
    }

    fn id(&self, what: &str) -> AppResult<&str> {
        self.id
            .as_deref()
            .ok_or_else(|| AppError::Config(format!("--id is required to sync a single {what}")))
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Sync {
        target,
        user,
        begin,
        end,
        id,
        pages,
    } = cmd
    {
        let args = SyncArgs {
            user: user.clone().or_else(|| cfg.user_id.clone()),
            begin: parse_optional_bound(begin.as_deref())?,
            end: parse_optional_bound(end.as_deref())?,
            id: id.clone(),
            pages: (*pages).max(1),
        };

        let app = App::open(cfg)?;
        let rt = runtime(cfg)?;

        let outcome = rt.block_on(async {
            let scope = app.scoped();
            tokio::select! {
                r = run(&scope, *target, &args) => r,
                _ = tokio::signal::ctrl_c() => {
                    scope.cancel();
                    warning("Interrupted, cancelling requests");
                    Ok(Resource::Error("cancelled".to_string()))
                }
            }
        })?;

        match outcome {
            Resource::Success(n) => success(format!("{n} item(s) synced into the cache.")),
            Resource::Error(msg) => return Err(AppError::Other(format!("sync failed: {msg}"))),
            Resource::Loading => info("Nothing to do."),
        }
    }

    Ok(())
}

fn runtime(cfg: &Config) -> AppResult<Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .worker_threads(cfg.worker_threads.max(1))
        .enable_all()
        .build()?)
}

fn count<T>(r: Resource<Vec<T>>) -> Resource<usize> {
    r.map(|v| v.len())
}

fn one<T>(r: Resource<T>) -> Resource<usize> {
    r.map(|_| 1)
}

async fn run(app: &App, target: SyncTarget, args: &SyncArgs) -> AppResult<Resource<usize>> {
    let begin = args.begin.as_deref();
    let end = args.end.as_deref();
    debug!(?target, begin, end, "sync requested");

    let outcome = match target {
        SyncTarget::Events => count(app.events.update_events(begin, end).await),
        SyncTarget::PendingEvents => count(app.events.update_pending_events().await),
        SyncTarget::UserEvents => count(
            app.events
                .update_user_events(args.user()?, begin, end)
                .await,
        ),
        SyncTarget::Invitations => count(app.events.update_invitations().await),
        SyncTarget::EventRoles => count(app.events.update_event_roles().await),
        SyncTarget::EventTypes => count(app.events.update_event_types().await),
        SyncTarget::Event => one(app.events.fetch_event(args.id("event")?).await),
        SyncTarget::Reports => count(app.reports.update_reports(args.user()?, None).await),
        SyncTarget::UserReports => count(
            app.reports
                .update_user_reports(args.user()?, begin, end)
                .await,
        ),
        SyncTarget::Users => count(app.users.update_all_users().await),
        SyncTarget::User => {
            let id = match args.id.as_deref() {
                Some(id) => id,
                None => args.user()?,
            };
            one(app.users.update_user(id).await)
        }
        SyncTarget::PropertyTypes => count(app.users.update_property_types().await),
        SyncTarget::Devices => count(app.devices.update_devices().await),
        SyncTarget::UserDevices => count(app.devices.update_user_devices(args.user()?).await),
        SyncTarget::EquipmentTypes => count(app.devices.update_equipment_types().await),
        SyncTarget::Purchases => sync_purchases(app, args.pages).await,
    };

    Ok(outcome)
}

async fn sync_purchases(app: &App, pages: u32) -> Resource<usize> {
    let paginator = app
        .purchases
        .paginator(PurchaseFilter::default(), app.settings().page_size);

    for _ in 0..pages {
        match paginator.fetch_next().await {
            FetchOutcome::Appended(n) => debug!(n, "purchase page appended"),
            FetchOutcome::Failed(msg) => return Resource::Error(msg),
            FetchOutcome::EndReached | FetchOutcome::Skipped | FetchOutcome::Stale => break,
        }
    }

    Resource::Success(paginator.snapshot().items.len())
}
