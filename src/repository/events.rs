use super::SyncContext;
use super::users::write_users;
use crate::errors::AppResult;
use crate::models::events::{
    Event, EventDetail, EventDetailView, EventRole, EventSalary, EventType, EventWithType,
    Invitation, InvitationView, Place, PlaceSalary, PlaceWithSalary, Shift, ShiftSalary,
    ShiftWithPlaces, UserEvent, UserEventView,
};
use crate::remote::models::events::{
    EventDetailDto, EventDto, EventRoleDto, EventSalaryDto, EventTypeDto, InvitationDto,
    UserEventDto,
};
use crate::remote::{EventsApi, UsersApi};
use crate::resource::Resource;
use crate::store::entity::{Entity, Table, text};
use crate::store::live::LiveQuery;
use crate::store::{Criteria, like, load_all, load_by_id, load_where};
use crate::utils::date::now_as_iso8601;
use rusqlite::Connection;
use rusqlite::types::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

fn by_id<T: Entity, F: Fn(&T) -> String>(rows: Vec<T>, key: F) -> HashMap<String, T> {
    rows.into_iter().map(|r| (key(&r), r)).collect()
}

fn with_types(conn: &Connection, events: Vec<Event>) -> AppResult<Vec<EventWithType>> {
    let types = by_id(load_all::<EventType>(conn)?, |t| t.id.clone());
    Ok(events
        .into_iter()
        .filter_map(|event| {
            types.get(&event.type_id).cloned().map(|event_type| EventWithType {
                event,
                event_type,
            })
        })
        .collect())
}

fn load_event_detail(conn: &Connection, event_id: &str) -> AppResult<Option<EventDetailView>> {
    let Some(event) = load_by_id::<Event>(conn, text(event_id))? else {
        return Ok(None);
    };
    let Some(event_type) = load_by_id::<EventType>(conn, text(&event.type_id))? else {
        return Ok(None);
    };

    let description =
        load_by_id::<EventDetail>(conn, text(event_id))?.map(|detail| detail.description);
    let salary = load_by_id::<EventSalary>(conn, text(event_id))?.map(|s| s.0);

    let shifts = load_where::<Shift>(
        conn,
        "event_id = ?1 ORDER BY begin_time",
        vec![text(event_id)],
    )?;

    let mut out = Vec::with_capacity(shifts.len());
    for shift in shifts {
        let shift_salary = load_by_id::<ShiftSalary>(conn, text(&shift.id))?.map(|s| s.0);
        let places = load_where::<Place>(conn, "shift_id = ?1", vec![text(&shift.id)])?;

        let mut with_salaries = Vec::with_capacity(places.len());
        for place in places {
            let salary = load_by_id::<PlaceSalary>(conn, text(&place.id))?.map(|s| s.0);
            with_salaries.push(PlaceWithSalary { place, salary });
        }

        out.push(ShiftWithPlaces {
            shift,
            salary: shift_salary,
            places: with_salaries,
        });
    }

    Ok(Some(EventDetailView {
        event,
        event_type,
        description,
        salary,
        shifts: out,
    }))
}

fn load_user_events(conn: &Connection, user_id: &str) -> AppResult<Vec<UserEventView>> {
    let links = load_where::<UserEvent>(conn, "user_id = ?1", vec![text(user_id)])?;
    let types = by_id(load_all::<EventType>(conn)?, |t| t.id.clone());
    let roles = by_id(load_all::<EventRole>(conn)?, |r| r.id.clone());

    let mut out = Vec::with_capacity(links.len());
    for link in links {
        let Some(event) = load_by_id::<Event>(conn, text(&link.event_id))? else {
            continue;
        };
        if let (Some(event_type), Some(role)) = (types.get(&event.type_id), roles.get(&link.role_id))
        {
            out.push(UserEventView {
                event_type: event_type.clone(),
                role: role.clone(),
                event,
            });
        }
    }
    out.sort_by(|a, b| b.event.begin_time.cmp(&a.event.begin_time));
    Ok(out)
}

fn load_invitations(conn: &Connection) -> AppResult<Vec<InvitationView>> {
    let types = by_id(load_all::<EventType>(conn)?, |t| t.id.clone());
    let roles = by_id(load_all::<EventRole>(conn)?, |r| r.id.clone());

    Ok(
        load_where::<Invitation>(conn, "1 = 1 ORDER BY begin_time", Vec::new())?
            .into_iter()
            .filter_map(|invitation| {
                let event_type = types.get(&invitation.type_id)?.clone();
                let role = roles.get(&invitation.role_id)?.clone();
                Some(InvitationView {
                    invitation,
                    event_type,
                    role,
                })
            })
            .collect(),
    )
}

const DETAIL_TABLES: &[Table] = &[
    Table::Events,
    Table::EventTypes,
    Table::EventDetails,
    Table::Shifts,
    Table::Places,
    Table::EventSalaries,
    Table::ShiftSalaries,
    Table::PlaceSalaries,
];

#[derive(Clone)]
pub struct EventsRepository {
    ctx: SyncContext,
    api: Arc<dyn EventsApi>,
    users: Arc<dyn UsersApi>,
}

impl EventsRepository {
    pub fn new(ctx: SyncContext, api: Arc<dyn EventsApi>, users: Arc<dyn UsersApi>) -> Self {
        Self { ctx, api, users }
    }

    pub fn scoped(&self) -> Self {
        self.scoped_in(&self.ctx.scoped())
    }

    pub(crate) fn scoped_in(&self, ctx: &SyncContext) -> Self {
        Self {
            ctx: ctx.clone(),
            api: Arc::clone(&self.api),
            users: Arc::clone(&self.users),
        }
    }

    // ---------------------------------------------------------------------
    // Sync
    // ---------------------------------------------------------------------

    pub async fn update_events(
        &self,
        begin: Option<&str>,
        end: Option<&str>,
    ) -> Resource<Vec<EventDto>> {
        self.ctx
            .try_update("sync_events", "events", async {
                let dtos = self.ctx.call(self.api.get_events(begin, end)).await?;
                let types: Vec<EventType> = dtos.iter().map(|d| d.event_type.to_entity()).collect();
                let events: Vec<Event> = dtos.iter().map(EventDto::to_entity).collect();

                let store = self.ctx.store();
                store.upsert(&types)?;
                store.upsert(&events)?;
                Ok(dtos)
            })
            .await
    }

    /// Events that have not started yet.
    pub async fn update_pending_events(&self) -> Resource<Vec<EventDto>> {
        let now = now_as_iso8601();
        self.update_events(Some(&now), None).await
    }

    pub async fn update_user_events(
        &self,
        user_id: &str,
        begin: Option<&str>,
        end: Option<&str>,
    ) -> Resource<Vec<UserEventDto>> {
        self.ctx
            .try_update("sync_user_events", user_id, async {
                let dtos = self
                    .ctx
                    .call(self.api.get_user_events(user_id, begin, end))
                    .await?;
                let missing = self
                    .ctx
                    .fetch_missing_users(self.users.as_ref(), [user_id.to_string()])
                    .await?;

                let roles: Vec<EventRole> = dtos.iter().map(|d| d.role.to_entity()).collect();
                let types: Vec<EventType> = dtos.iter().map(|d| d.event_type.to_entity()).collect();
                let events: Vec<Event> = dtos.iter().map(UserEventDto::to_event).collect();
                let links: Vec<UserEvent> =
                    dtos.iter().map(|d| d.to_user_event(user_id)).collect();

                self.ctx.store().batch(|b| {
                    b.upsert(&roles)?;
                    b.upsert(&types)?;
                    write_users(b, &missing)?;
                    b.upsert(&events)?;
                    b.upsert(&links)?;
                    Ok(())
                })?;
                Ok(dtos)
            })
            .await
    }

    /// Fetch one event with its shifts and places, then its salaries.
    ///
    /// The event and its children are written in a single transaction. A
    /// failing salary fetch is logged and does not fail the detail.
    pub async fn fetch_event(&self, event_id: &str) -> Resource<EventDetailDto> {
        let detail = self
            .ctx
            .try_update("sync_event_detail", event_id, async {
                let dto = self.ctx.call(self.api.get_event(event_id)).await?;

                let event_type = dto.event_type.to_entity();
                let event = dto.to_event();
                let detail = dto.to_detail();
                let shifts = dto.shifts();
                let places = dto.places();

                self.ctx.store().batch(|b| {
                    b.upsert(std::slice::from_ref(&event_type))?;
                    b.upsert(std::slice::from_ref(&event))?;
                    b.upsert(std::slice::from_ref(&detail))?;
                    b.upsert(&shifts)?;
                    b.upsert(&places)?;
                    Ok(())
                })?;
                Ok(dto)
            })
            .await;

        if detail.is_success()
            && let Resource::Error(msg) = self.update_event_salary(event_id).await
        {
            warn!(event_id, error = %msg, "event salary not refreshed");
        }

        detail
    }

    /// Salaries of an event, its shifts and its places. Rows whose owner is
    /// not cached are dropped.
    pub async fn update_event_salary(&self, event_id: &str) -> Resource<EventSalaryDto> {
        self.ctx
            .try_update("sync_event_salary", event_id, async {
                let dto = self.ctx.call(self.api.get_event_salary(event_id)).await?;
                let store = self.ctx.store();

                let known_events = store.ids::<Event>()?;
                let known_shifts = store.ids::<Shift>()?;
                let known_places = store.ids::<Place>()?;

                let event_salary: Vec<EventSalary> = Some(dto.event_salary())
                    .filter(|s| known_events.contains(&s.0.owner_id))
                    .into_iter()
                    .collect();
                let shift_salaries: Vec<ShiftSalary> = dto
                    .shift_salaries()
                    .into_iter()
                    .filter(|s| known_shifts.contains(&s.0.owner_id))
                    .collect();
                let place_salaries: Vec<PlaceSalary> = dto
                    .place_salaries()
                    .into_iter()
                    .filter(|s| known_places.contains(&s.0.owner_id))
                    .collect();

                let dropped = (1 + dto.shift_salaries.len() + dto.place_salaries.len())
                    - (event_salary.len() + shift_salaries.len() + place_salaries.len());
                if dropped > 0 {
                    warn!(event_id, dropped, "salaries reference rows missing from cache");
                }

                store.batch(|b| {
                    b.upsert(&event_salary)?;
                    b.upsert(&shift_salaries)?;
                    b.upsert(&place_salaries)?;
                    Ok(())
                })?;
                Ok(dto)
            })
            .await
    }

    pub async fn update_event_roles(&self) -> Resource<Vec<EventRoleDto>> {
        self.ctx
            .try_update("sync_event_roles", "event_roles", async {
                let dtos = self.ctx.call(self.api.get_event_roles()).await?;
                let rows: Vec<EventRole> = dtos.iter().map(EventRoleDto::to_entity).collect();
                self.ctx.store().upsert(&rows)?;
                Ok(dtos)
            })
            .await
    }

    pub async fn update_event_types(&self) -> Resource<Vec<EventTypeDto>> {
        self.ctx
            .try_update("sync_event_types", "event_types", async {
                let dtos = self.ctx.call(self.api.get_event_types()).await?;
                let rows: Vec<EventType> = dtos.iter().map(EventTypeDto::to_entity).collect();
                self.ctx.store().upsert(&rows)?;
                Ok(dtos)
            })
            .await
    }

    /// Replaces the cached invitations; ones the server no longer lists
    /// (accepted, rejected, expired) disappear.
    pub async fn update_invitations(&self) -> Resource<Vec<InvitationDto>> {
        self.ctx
            .try_update("sync_invitations", "invitations", async {
                let dtos = self.ctx.call(self.api.get_invitations()).await?;
                let types: Vec<EventType> = dtos.iter().map(|d| d.event_type.to_entity()).collect();
                let roles: Vec<EventRole> = dtos.iter().map(|d| d.role.to_entity()).collect();
                let rows: Vec<Invitation> = dtos.iter().map(InvitationDto::to_entity).collect();

                self.ctx.store().batch(|b| {
                    b.upsert(&types)?;
                    b.upsert(&roles)?;
                    b.delete::<Invitation>(&Criteria::All)?;
                    b.upsert(&rows)?;
                    Ok(())
                })?;
                Ok(dtos)
            })
            .await
    }

    pub async fn apply_for_place(&self, place_id: &str, role_id: &str) -> Resource<()> {
        self.ctx
            .try_update(
                "apply_for_place",
                place_id,
                self.ctx.call(self.api.apply_for_place(place_id, role_id)),
            )
            .await
    }

    pub async fn accept_invitation(&self, place_id: &str) -> Resource<()> {
        self.ctx
            .try_update(
                "accept_invitation",
                place_id,
                self.ctx.call(self.api.accept_invitation(place_id)),
            )
            .await
    }

    pub async fn reject_invitation(&self, place_id: &str) -> Resource<()> {
        self.ctx
            .try_update(
                "reject_invitation",
                place_id,
                self.ctx.call(self.api.reject_invitation(place_id)),
            )
            .await
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    pub fn get_events(&self) -> LiveQuery<Vec<EventWithType>> {
        self.ctx
            .store()
            .observe(&[Table::Events, Table::EventTypes], |conn| {
                let events = load_where::<Event>(conn, "1 = 1 ORDER BY begin_time DESC", Vec::new())?;
                with_types(conn, events)
            })
    }

    /// Events whose title or address matches, optionally bounded in time.
    pub fn search_events(
        &self,
        query: &str,
        begin: Option<&str>,
        end: Option<&str>,
    ) -> LiveQuery<Vec<EventWithType>> {
        let params: Vec<Value> = vec![
            like(query),
            begin.map(text).unwrap_or(Value::Null),
            end.map(text).unwrap_or(Value::Null),
        ];
        self.ctx
            .store()
            .observe(&[Table::Events, Table::EventTypes], move |conn| {
                let events = load_where::<Event>(
                    conn,
                    "(title LIKE ?1 OR address LIKE ?1)
                     AND (?2 IS NULL OR begin_time >= ?2)
                     AND (?3 IS NULL OR end_time <= ?3)
                     ORDER BY begin_time DESC",
                    params.clone(),
                )?;
                with_types(conn, events)
            })
    }

    pub fn get_event_detail(&self, event_id: &str) -> LiveQuery<Option<EventDetailView>> {
        let id = event_id.to_string();
        self.ctx
            .store()
            .observe(DETAIL_TABLES, move |conn| load_event_detail(conn, &id))
    }

    pub fn get_user_events(&self, user_id: &str) -> LiveQuery<Vec<UserEventView>> {
        let id = user_id.to_string();
        self.ctx.store().observe(
            &[
                Table::UserEvents,
                Table::Events,
                Table::EventTypes,
                Table::EventRoles,
            ],
            move |conn| load_user_events(conn, &id),
        )
    }

    pub fn get_invitations(&self) -> LiveQuery<Vec<InvitationView>> {
        self.ctx.store().observe(
            &[Table::Invitations, Table::EventTypes, Table::EventRoles],
            load_invitations,
        )
    }

    pub fn get_event_roles(&self) -> LiveQuery<Vec<EventRole>> {
        self.ctx
            .store()
            .observe(&[Table::EventRoles], |conn| load_all::<EventRole>(conn))
    }

    pub fn get_event_types(&self) -> LiveQuery<Vec<EventType>> {
        self.ctx
            .store()
            .observe(&[Table::EventTypes], |conn| load_all::<EventType>(conn))
    }
}
