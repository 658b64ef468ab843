use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::instrument;

use crate::entities::user::{self, UserProfile};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Registration request.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub profile: UserProfile,
    pub name: String,
    pub document: String,
    pub full_address: String,
    pub email: String,
    pub password: String,
}

/// Claims embedded in the login token; this is the caller-identity context
/// the rest of the system sees (no ambient client-side state).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub profile: UserProfile,
    pub exp: u64,
}

/// Successful login payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub name: String,
    pub profile: UserProfile,
}

/// User management: registration, login, activation toggling.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    jwt_secret: String,
    jwt_expiration: u64,
}

impl UserService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        jwt_secret: String,
        jwt_expiration: u64,
    ) -> Self {
        Self {
            db,
            event_sender,
            jwt_secret,
            jwt_expiration,
        }
    }

    fn digest(password: &str) -> String {
        hex::encode(Sha256::digest(password.as_bytes()))
    }

    /// Registers a new user. Email and document must both be unused.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterUser) -> Result<user::Model, ServiceError> {
        let existing = user::Entity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Email.eq(request.email.clone()))
                    .add(user::Column::Document.eq(request.document.clone())),
            )
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "Email or document already in use".to_string(),
            ));
        }

        let now = Utc::now();
        let created = user::ActiveModel {
            profile: Set(request.profile),
            name: Set(request.name),
            document: Set(request.document),
            full_address: Set(request.full_address),
            email: Set(request.email),
            password_digest: Set(Self::digest(&request.password)),
            status: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        self.event_sender
            .send_best_effort(Event::UserRegistered {
                user_id: created.id,
            })
            .await;
        Ok(created)
    }

    /// Verifies credentials against active users and issues a signed token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ServiceError> {
        let user = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .filter(user::Column::Status.eq(true))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid credentials".to_string()))?;

        if user.password_digest != Self::digest(password) {
            return Err(ServiceError::Unauthorized("Invalid credentials".to_string()));
        }

        let claims = Claims {
            sub: user.id.to_string(),
            name: user.name.clone(),
            profile: user.profile,
            exp: Utc::now().timestamp() as u64 + self.jwt_expiration,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("token signing failed: {}", e)))?;

        Ok(LoginOutcome {
            token,
            name: user.name,
            profile: user.profile,
        })
    }

    /// All users, insertion order.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<user::Model>, ServiceError> {
        let users = user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(users)
    }

    /// Flips the active flag on a user.
    #[instrument(skip(self))]
    pub async fn toggle_status(&self, user_id: i32) -> Result<user::Model, ServiceError> {
        let user = user::Entity::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))?;

        let next = !user.status;
        let mut active: user::ActiveModel = user.into();
        active.status = Set(next);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;
        Ok(updated)
    }

    /// Deletes a user.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: i32) -> Result<(), ServiceError> {
        let result = user::Entity::delete_by_id(user_id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }
}
