use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only audit entry for a movement status change.
///
/// `status_label` is free text (e.g. "Driver Ana started delivery") and is
/// not required to match the movement's status enum. Rows are never
/// mutated; they are only removed by cascade when the parent movement is
/// deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movement_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub movement_id: i32,
    pub status_label: String,
    pub evidence_file: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::movement::Entity",
        from = "Column::MovementId",
        to = "super::movement::Column::Id"
    )]
    Movement,
}

impl Related<super::movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movement.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
