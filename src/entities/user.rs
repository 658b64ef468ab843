use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// Role of an application user. Roles gate which screens and actions the
/// mobile client offers; server-side they are carried in the login token.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum UserProfile {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "branch")]
    Branch,
    #[sea_orm(string_value = "driver")]
    Driver,
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserProfile::Admin => write!(f, "admin"),
            UserProfile::Branch => write!(f, "branch"),
            UserProfile::Driver => write!(f, "driver"),
        }
    }
}

impl FromStr for UserProfile {
    type Err = ServiceError;

    // "filial" and "motorista" are the labels legacy clients register with.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let profile = match value.trim().to_lowercase().as_str() {
            "admin" => UserProfile::Admin,
            "branch" | "filial" => UserProfile::Branch,
            "driver" | "motorista" => UserProfile::Driver,
            other => {
                return Err(ServiceError::ValidationError(format!(
                    "Unknown user profile '{}'",
                    other
                )))
            }
        };
        Ok(profile)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub profile: UserProfile,
    pub name: String,
    pub document: String,
    pub full_address: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_digest: String,
    /// Active flag; inactive users cannot log in.
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
