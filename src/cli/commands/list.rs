use crate::app::App;
use crate::cli::parser::{Commands, ListTarget};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::devices::DeviceView;
use crate::models::events::{EventWithType, InvitationView, UserEventView};
use crate::models::purchases::Purchase;
use crate::models::reports::ReportView;
use crate::models::users::User;
use crate::ui::messages::info;
use crate::utils::colors::{RESET, color_for_status};
use crate::utils::date::short;
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List {
        target,
        search,
        user,
    } = cmd
    {
        let app = App::open(cfg)?;
        let query = search.as_deref();
        let explicit_user = user.as_deref();
        let user = user.clone().or_else(|| cfg.user_id.clone());

        let table = match target {
            ListTarget::Events => events_table(&match query {
                Some(q) => app.events.search_events(q, None, None).current()?,
                None => app.events.get_events().current()?,
            }),
            ListTarget::UserEvents => {
                let user = require_user(user)?;
                user_events_table(&app.events.get_user_events(&user).current()?)
            }
            ListTarget::Invitations => invitations_table(&app.events.get_invitations().current()?),
            // An explicit --user narrows reports to the ones about that user.
            ListTarget::Reports => reports_table(&match (query, explicit_user) {
                (q, Some(u)) => app
                    .reports
                    .search_reports_about_user(q.unwrap_or(""), u)
                    .current()?,
                (Some(q), None) => app.reports.search_reports(q).current()?,
                (None, None) => app.reports.get_reports().current()?,
            }),
            ListTarget::Users => users_table(&match query {
                Some(q) => app.users.search_users(q).current()?,
                None => app.users.get_all_users().current()?,
            }),
            ListTarget::Devices => devices_table(&match query {
                Some(q) => app.devices.search_devices(q).current()?,
                None => app.devices.get_devices().current()?,
            }),
            ListTarget::FreeDevices => devices_table(&app.devices.get_free_devices().current()?),
            ListTarget::Purchases => purchases_table(&match query {
                Some(q) => app.purchases.search_purchases(q).current()?,
                None => app.purchases.get_purchases().current()?,
            }),
        };

        if table.is_empty() {
            info("Nothing cached yet, run `itlab-sync sync` first.");
        } else {
            print!("{}", table.render());
        }
    }

    Ok(())
}

fn require_user(user: Option<String>) -> AppResult<String> {
    user.ok_or_else(|| AppError::Config("no --user given and no user_id configured".into()))
}

fn events_table(events: &[EventWithType]) -> Table {
    let mut t = Table::new(&["BEGIN", "END", "TYPE", "TITLE", "ADDRESS"]);
    for e in events {
        t.add_row(vec![
            short(&e.event.begin_time),
            short(&e.event.end_time),
            e.event_type.title.clone(),
            e.event.title.clone(),
            e.event.address.clone(),
        ]);
    }
    t
}

fn user_events_table(events: &[UserEventView]) -> Table {
    let mut t = Table::new(&["BEGIN", "TITLE", "TYPE", "ROLE"]);
    for e in events {
        t.add_row(vec![
            short(&e.event.begin_time),
            e.event.title.clone(),
            e.event_type.title.clone(),
            e.role.title.clone(),
        ]);
    }
    t
}

fn invitations_table(invitations: &[InvitationView]) -> Table {
    let mut t = Table::new(&["PLACE", "EVENT", "TYPE", "ROLE", "BEGIN"]);
    for i in invitations {
        t.add_row(vec![
            i.invitation.place_id.clone(),
            i.invitation.event_title.clone(),
            i.event_type.title.clone(),
            i.role.title.clone(),
            short(&i.invitation.begin_time),
        ]);
    }
    t
}

fn reports_table(reports: &[ReportView]) -> Table {
    let mut t = Table::new(&["DATE", "TITLE", "REPORTER", "IMPLEMENTER", "SALARY"]);
    for r in reports {
        t.add_row(vec![
            short(&r.report.date),
            r.content.title_or_empty().to_string(),
            r.report.reporter_id.clone(),
            r.report.implementer_id.clone(),
            r.salary
                .as_ref()
                .map(|s| s.count.to_string())
                .unwrap_or_else(|| "--".to_string()),
        ]);
    }
    t
}

fn users_table(users: &[User]) -> Table {
    let mut t = Table::new(&["ID", "NAME", "EMAIL", "PHONE"]);
    for u in users {
        t.add_row(vec![
            u.id.clone(),
            u.full_name(),
            u.email.clone(),
            u.phone_number.clone().unwrap_or_default(),
        ]);
    }
    t
}

fn devices_table(devices: &[DeviceView]) -> Table {
    let mut t = Table::new(&["#", "TYPE", "SERIAL", "OWNER", "PARTS"]);
    for d in devices {
        t.add_row(vec![
            d.device.number.to_string(),
            d.equipment_type.title.clone(),
            d.device.serial_number.clone().unwrap_or_default(),
            d.device.owner_id.clone().unwrap_or_else(|| "free".to_string()),
            d.children.len().to_string(),
        ]);
    }
    t
}

fn purchases_table(purchases: &[Purchase]) -> Table {
    let mut t = Table::new(&["ID", "DATE", "NAME", "QTY", "PRICE", "STATUS"]);
    for p in purchases {
        let status = p.status.as_str();
        t.add_row(vec![
            p.id.to_string(),
            short(&p.purchase_date),
            p.name.clone(),
            p.quantity.to_string(),
            format!("{:.2}", p.price),
            // Last column, so escape codes never misalign the rest.
            format!("{}{}{}", color_for_status(status), status, RESET),
        ]);
    }
    t
}
