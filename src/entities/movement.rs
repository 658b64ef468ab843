use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// Movement lifecycle status.
///
/// The canonical vocabulary is snake_case; `FromStr` additionally accepts
/// the legacy Portuguese labels that older clients still send
/// (`em transito`, `coleta finalizada`, `finalizada`, `cancelada`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum MovementStatus {
    #[sea_orm(string_value = "created")]
    Created,
    #[sea_orm(string_value = "in_transit")]
    InTransit,
    #[sea_orm(string_value = "collection_finished")]
    CollectionFinished,
    #[sea_orm(string_value = "finalized")]
    Finalized,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl MovementStatus {
    /// Terminal statuses admit no further lifecycle transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MovementStatus::Finalized | MovementStatus::Cancelled)
    }

    /// Statuses from which a movement may still be cancelled.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, MovementStatus::Created | MovementStatus::InTransit)
    }
}

impl fmt::Display for MovementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementStatus::Created => write!(f, "created"),
            MovementStatus::InTransit => write!(f, "in_transit"),
            MovementStatus::CollectionFinished => write!(f, "collection_finished"),
            MovementStatus::Finalized => write!(f, "finalized"),
            MovementStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for MovementStatus {
    type Err = ServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let status = match value.trim().to_lowercase().as_str() {
            "created" => MovementStatus::Created,
            "in_transit" | "em transito" | "em trânsito" => MovementStatus::InTransit,
            "collection_finished" | "coleta finalizada" => MovementStatus::CollectionFinished,
            "finalized" | "finalizada" => MovementStatus::Finalized,
            "cancelled" | "cancelada" => MovementStatus::Cancelled,
            other => {
                return Err(ServiceError::InvalidStatus(format!(
                    "Unknown movement status '{}'",
                    other
                )))
            }
        };
        Ok(status)
    }
}

/// A stock transfer between two branches.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub origin_branch_id: i32,
    pub destination_branch_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub status: MovementStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::branch::Entity",
        from = "Column::OriginBranchId",
        to = "super::branch::Column::Id"
    )]
    OriginBranch,
    #[sea_orm(
        belongs_to = "super::branch::Entity",
        from = "Column::DestinationBranchId",
        to = "super::branch::Column::Id"
    )]
    DestinationBranch,
    #[sea_orm(has_many = "super::movement_history::Entity")]
    History,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::movement_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
