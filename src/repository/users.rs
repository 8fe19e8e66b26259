use super::SyncContext;
use crate::errors::AppResult;
use crate::models::users::{PropertyType, PropertyWithType, User, UserProperty, UserWithProperties};
use crate::remote::UsersApi;
use crate::remote::models::users::{
    PropertyTypeDto, UserDto, UserEditRequest, UserPropertyDto, UserPropertyEditRequest,
};
use crate::resource::Resource;
use crate::store::entity::{Table, text};
use crate::store::live::LiveQuery;
use crate::store::{Batch, Criteria, like, load_all, load_by_id, load_where};
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::Arc;

/// Write users with their property types and properties, types first.
pub(crate) fn write_users(batch: &mut Batch<'_>, users: &[UserDto]) -> AppResult<()> {
    let types: Vec<PropertyType> = users.iter().flat_map(UserDto::property_types).collect();
    let rows: Vec<User> = users.iter().map(UserDto::to_entity).collect();
    let properties: Vec<UserProperty> = users.iter().flat_map(UserDto::properties).collect();

    batch.upsert(&types)?;
    batch.upsert(&rows)?;
    batch.upsert(&properties)?;
    Ok(())
}

fn with_properties(conn: &Connection, user: User) -> AppResult<UserWithProperties> {
    let types: HashMap<String, PropertyType> = load_all::<PropertyType>(conn)?
        .into_iter()
        .map(|t| (t.id.clone(), t))
        .collect();

    let properties = load_where::<UserProperty>(conn, "user_id = ?1", vec![text(&user.id)])?
        .into_iter()
        .filter_map(|property| {
            types.get(&property.type_id).cloned().map(|property_type| PropertyWithType {
                property,
                property_type,
            })
        })
        .collect();

    Ok(UserWithProperties { user, properties })
}

fn load_user(conn: &Connection, id: &str) -> AppResult<Option<UserWithProperties>> {
    match load_by_id::<User>(conn, text(id))? {
        Some(user) => Ok(Some(with_properties(conn, user)?)),
        None => Ok(None),
    }
}

const USER_TABLES: &[Table] = &[Table::Users, Table::UserProperties, Table::PropertyTypes];

#[derive(Clone)]
pub struct UsersRepository {
    ctx: SyncContext,
    api: Arc<dyn UsersApi>,
    current_user_id: Option<String>,
}

impl UsersRepository {
    pub fn new(ctx: SyncContext, api: Arc<dyn UsersApi>, current_user_id: Option<String>) -> Self {
        Self {
            ctx,
            api,
            current_user_id,
        }
    }

    pub fn scoped(&self) -> Self {
        self.scoped_in(&self.ctx.scoped())
    }

    pub(crate) fn scoped_in(&self, ctx: &SyncContext) -> Self {
        Self {
            ctx: ctx.clone(),
            api: Arc::clone(&self.api),
            current_user_id: self.current_user_id.clone(),
        }
    }

    pub fn current_user_id(&self) -> Option<&str> {
        self.current_user_id.as_deref()
    }

    // ---------------------------------------------------------------------
    // Sync
    // ---------------------------------------------------------------------

    pub async fn update_all_users(&self) -> Resource<Vec<UserDto>> {
        self.ctx
            .try_update("sync_users", "users", async {
                let users = self.ctx.call(self.api.get_users()).await?;
                self.ctx.store().batch(|b| write_users(b, &users))?;
                Ok(users)
            })
            .await
    }

    pub async fn update_user(&self, user_id: &str) -> Resource<UserDto> {
        self.ctx
            .try_update("sync_user", user_id, async {
                let user = self.ctx.call(self.api.get_user(user_id)).await?;
                self.ctx
                    .store()
                    .batch(|b| write_users(b, std::slice::from_ref(&user)))?;
                Ok(user)
            })
            .await
    }

    pub async fn update_property_types(&self) -> Resource<Vec<PropertyTypeDto>> {
        self.ctx
            .try_update("sync_property_types", "property_types", async {
                let types = self.ctx.call(self.api.get_property_types()).await?;
                let rows: Vec<PropertyType> = types.iter().map(PropertyTypeDto::to_entity).collect();
                self.ctx.store().upsert(&rows)?;
                Ok(types)
            })
            .await
    }

    pub async fn edit_user_info(&self, request: &UserEditRequest) -> Resource<UserDto> {
        self.ctx
            .try_update(
                "edit_user_info",
                self.current_user_id.as_deref().unwrap_or("me"),
                self.ctx.call(self.api.edit_user_info(request)),
            )
            .await
    }

    pub async fn edit_user_property(
        &self,
        property_id: &str,
        value: &str,
    ) -> Resource<UserPropertyDto> {
        let request = UserPropertyEditRequest {
            id: property_id.to_string(),
            value: value.to_string(),
        };
        self.ctx
            .try_update(
                "edit_user_property",
                property_id,
                self.ctx.call(self.api.edit_user_property(&request)),
            )
            .await
    }

    // ---------------------------------------------------------------------
    // Local-only writes
    // ---------------------------------------------------------------------

    /// Store a user and its properties without asking the server. Property
    /// types must already be cached.
    pub fn insert_user(&self, user: &User, properties: &[UserProperty]) -> AppResult<()> {
        self.ctx.store().batch(|b| {
            b.upsert(std::slice::from_ref(user))?;
            b.upsert(properties)?;
            Ok(())
        })
    }

    /// Remove a user, properties first.
    pub fn delete_user(&self, user_id: &str) -> AppResult<usize> {
        self.ctx.store().batch(|b| {
            b.delete::<UserProperty>(&Criteria::eq("user_id", text(user_id)))?;
            b.delete::<User>(&Criteria::ids([text(user_id)]))
        })
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    pub fn get_all_users(&self) -> LiveQuery<Vec<User>> {
        self.ctx.store().observe(&[Table::Users], |conn| {
            load_where::<User>(conn, "1 = 1 ORDER BY last_name, first_name", Vec::new())
        })
    }

    pub fn search_users(&self, query: &str) -> LiveQuery<Vec<User>> {
        let pattern = like(query);
        self.ctx.store().observe(&[Table::Users], move |conn| {
            load_where::<User>(
                conn,
                "first_name LIKE ?1 OR last_name LIKE ?1 OR middle_name LIKE ?1
                 OR email LIKE ?1 OR phone_number LIKE ?1
                 ORDER BY last_name, first_name",
                vec![pattern.clone()],
            )
        })
    }

    pub fn get_user_by_id(&self, user_id: &str) -> AppResult<Option<UserWithProperties>> {
        self.ctx.store().query(|conn| load_user(conn, user_id))
    }

    pub fn observe_user_by_id(&self, user_id: &str) -> LiveQuery<Option<UserWithProperties>> {
        let id = user_id.to_string();
        self.ctx
            .store()
            .observe(USER_TABLES, move |conn| load_user(conn, &id))
    }

    /// The signed-in user, when one is configured and cached.
    pub fn get_current_user(&self) -> AppResult<Option<UserWithProperties>> {
        match &self.current_user_id {
            Some(id) => self.get_user_by_id(id),
            None => Ok(None),
        }
    }

    pub fn observe_current_user(&self) -> LiveQuery<Option<UserWithProperties>> {
        let id = self.current_user_id.clone();
        self.ctx.store().observe(USER_TABLES, move |conn| match &id {
            Some(id) => load_user(conn, id),
            None => Ok(None),
        })
    }

    pub fn get_property_types(&self) -> AppResult<Vec<PropertyType>> {
        self.ctx.store().all::<PropertyType>()
    }

    pub fn observe_property_types(&self) -> LiveQuery<Vec<PropertyType>> {
        self.ctx
            .store()
            .observe(&[Table::PropertyTypes], |conn| load_all::<PropertyType>(conn))
    }

    pub fn get_properties(&self) -> AppResult<Vec<UserProperty>> {
        self.ctx.store().all::<UserProperty>()
    }

    pub fn get_properties_with_types(&self) -> AppResult<Vec<PropertyWithType>> {
        self.ctx.store().query(|conn| {
            let types: HashMap<String, PropertyType> = load_all::<PropertyType>(conn)?
                .into_iter()
                .map(|t| (t.id.clone(), t))
                .collect();
            Ok(load_all::<UserProperty>(conn)?
                .into_iter()
                .filter_map(|property| {
                    types.get(&property.type_id).cloned().map(|property_type| {
                        PropertyWithType {
                            property,
                            property_type,
                        }
                    })
                })
                .collect())
        })
    }
}
