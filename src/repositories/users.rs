use chrono::Utc;
use sea_orm::{
    prelude::*, ActiveModelTrait, ActiveValue::Set, Condition, ConnectionTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{user, User};
use crate::error::AppError;
use crate::models::{
    InvestorType, NewAccount, Profile, UpdateProfileRequest, UserRole, DEFAULT_USER_PAGE_SIZE,
    MAX_USER_PAGE_SIZE,
};

/// Narrowing applied to a user listing.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub sector: Option<String>,
    pub investor_type: Option<InvestorType>,
}

impl UserFilter {
    fn keeps(&self, profile: &Profile) -> bool {
        if let Some(sector) = &self.sector {
            if profile.sector() != Some(sector.as_str()) {
                return false;
            }
        }
        if let Some(investor_type) = self.investor_type {
            if profile.investor_type() != Some(investor_type) {
                return false;
            }
        }
        true
    }
}

pub struct UserRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> UserRepository<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<user::Model>, AppError> {
        Ok(User::find_by_id(id.to_string()).one(self.conn).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, AppError> {
        Ok(User::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(self.conn)
            .await?)
    }

    pub async fn create(
        &self,
        account: &NewAccount,
        password_hash: String,
    ) -> Result<user::Model, AppError> {
        let email = account.account.email.trim().to_lowercase();
        if self.find_by_email(&email).await?.is_some() {
            return Err(AppError::DuplicateEntity(
                "User with this email already exists".into(),
            ));
        }

        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            uid: Set(Uuid::new_v4().to_string()),
            email: Set(email),
            password_hash: Set(password_hash),
            first_name: Set(account.account.first_name.trim().to_string()),
            last_name: Set(account.account.last_name.trim().to_string()),
            role: Set(account.profile.role().as_str().to_string()),
            profile: Set(serde_json::to_value(&account.profile)?),
            is_email_verified: Set(false),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.conn)
        .await?;

        info!("Created user {} with role {}", model.email, model.role);
        Ok(model)
    }

    pub async fn touch_last_login(&self, model: user::Model) -> Result<user::Model, AppError> {
        let now = Utc::now();
        let mut active = user::ActiveModel::from(model);
        active.last_login_at = Set(Some(now));
        active.updated_at = Set(now);
        Ok(active.update(self.conn).await?)
    }

    /// Applies a partial update. A replacement profile must keep the kind of
    /// the stored one so the role stays consistent with it.
    pub async fn update_profile(
        &self,
        model: user::Model,
        changes: UpdateProfileRequest,
    ) -> Result<user::Model, AppError> {
        let current: Profile = serde_json::from_value(model.profile.clone())?;
        let mut active = user::ActiveModel::from(model);

        if let Some(first_name) = changes.first_name {
            crate::models::validation::not_blank("firstName", &first_name)?;
            active.first_name = Set(first_name.trim().to_string());
        }
        if let Some(last_name) = changes.last_name {
            crate::models::validation::not_blank("lastName", &last_name)?;
            active.last_name = Set(last_name.trim().to_string());
        }
        if let Some(profile) = changes.profile {
            if profile.role() != current.role() {
                return Err(AppError::ValidationFailed(format!(
                    "profile kind must stay '{}'",
                    current.role()
                )));
            }
            profile.validate()?;
            active.profile = Set(serde_json::to_value(&profile)?);
        }

        active.updated_at = Set(Utc::now());
        Ok(active.update(self.conn).await?)
    }

    /// Grants or revokes the admin role. The only other accepted target is
    /// the role owning the stored profile.
    pub async fn set_role(&self, id: &str, role: UserRole) -> Result<user::Model, AppError> {
        let model = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::RecordNotFound(format!("User {} not found", id)))?;
        let profile: Profile = serde_json::from_value(model.profile.clone())?;

        if role != UserRole::Admin && role != profile.role() {
            return Err(AppError::ValidationFailed(format!(
                "Cannot change a {} account to role '{}'",
                profile.role(),
                role
            )));
        }

        let mut active = user::ActiveModel::from(model);
        active.role = Set(role.as_str().to_string());
        active.updated_at = Set(Utc::now());
        let updated = active.update(self.conn).await?;

        info!("User {} now has role {}", updated.email, updated.role);
        Ok(updated)
    }

    /// Newest first, cursor paginated. `page_token` is the id of the last
    /// user of the previous page; the returned token is set when the page
    /// is full.
    pub async fn list(
        &self,
        filter: &UserFilter,
        limit: Option<u64>,
        page_token: Option<&str>,
    ) -> Result<(Vec<user::Model>, Option<String>), AppError> {
        let limit = limit
            .unwrap_or(DEFAULT_USER_PAGE_SIZE)
            .clamp(1, MAX_USER_PAGE_SIZE) as usize;

        let mut query = User::find()
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id);
        if let Some(role) = filter.role {
            query = query.filter(user::Column::Role.eq(role.as_str()));
        }
        if let Some(token) = page_token.filter(|t| !t.is_empty()) {
            let cursor = self
                .find_by_id(token)
                .await?
                .ok_or_else(|| AppError::ValidationFailed("Invalid pageToken".into()))?;
            query = query.filter(
                Condition::any()
                    .add(user::Column::CreatedAt.lt(cursor.created_at))
                    .add(
                        Condition::all()
                            .add(user::Column::CreatedAt.eq(cursor.created_at))
                            .add(user::Column::Id.lt(cursor.id)),
                    ),
            );
        }

        let needs_profile_filter = filter.sector.is_some() || filter.investor_type.is_some();
        if !needs_profile_filter {
            query = query.limit(limit as u64);
        }

        let mut users = Vec::with_capacity(limit);
        for model in query.all(self.conn).await? {
            if needs_profile_filter {
                let profile: Profile = serde_json::from_value(model.profile.clone())?;
                if !filter.keeps(&profile) {
                    continue;
                }
            }
            users.push(model);
            if users.len() == limit {
                break;
            }
        }

        let next_page_token = (users.len() == limit)
            .then(|| users.last().map(|u| u.id.clone()))
            .flatten();
        Ok((users, next_page_token))
    }
}
