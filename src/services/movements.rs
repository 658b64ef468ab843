use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::instrument;

use crate::entities::movement::MovementStatus;
use crate::entities::{branch, movement, movement_history, product};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::stock::StockService;

/// Creation request for a movement.
#[derive(Debug, Clone)]
pub struct CreateMovement {
    pub origin_branch_id: i32,
    pub destination_branch_id: i32,
    pub product_id: i32,
    pub quantity: i32,
}

/// A movement joined with its product, branches, and ordered history.
#[derive(Debug, Clone)]
pub struct MovementDetail {
    pub movement: movement::Model,
    pub product: product::Model,
    pub origin: branch::Model,
    pub destination: branch::Model,
    pub history: Vec<movement_history::Model>,
}

/// Movement lifecycle controller.
///
/// The single place where lifecycle rules are enforced: creation runs the
/// stock sufficiency check, ledger debit, movement insert, and initial
/// history append as one transaction; the start/finalize/cancel actions
/// guard transition legality; `set_status` is the deliberate unguarded
/// administrative escape hatch.
#[derive(Clone)]
pub struct MovementService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl MovementService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Creates a movement, debiting the origin ledger atomically.
    ///
    /// No partial effects: if any step fails, the debit does not apply.
    #[instrument(skip(self))]
    pub async fn create_movement(
        &self,
        command: CreateMovement,
    ) -> Result<movement::Model, ServiceError> {
        if command.origin_branch_id == command.destination_branch_id {
            return Err(ServiceError::ValidationError(
                "Origin and destination branches must differ".to_string(),
            ));
        }
        if command.quantity <= 0 {
            return Err(ServiceError::ValidationError(format!(
                "Movement quantity must be positive, got {}",
                command.quantity
            )));
        }

        let cmd = command.clone();
        let (created, remaining) = self
            .db
            .transaction::<_, (movement::Model, i32), ServiceError>(|txn| {
                Box::pin(async move {
                    for branch_id in [cmd.origin_branch_id, cmd.destination_branch_id] {
                        branch::Entity::find_by_id(branch_id)
                            .one(txn)
                            .await?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!("Branch {} not found", branch_id))
                            })?;
                    }

                    let remaining = StockService::debit_on(
                        txn,
                        cmd.product_id,
                        cmd.origin_branch_id,
                        cmd.quantity,
                    )
                    .await?;

                    let now = Utc::now();
                    let inserted = movement::ActiveModel {
                        origin_branch_id: Set(cmd.origin_branch_id),
                        destination_branch_id: Set(cmd.destination_branch_id),
                        product_id: Set(cmd.product_id),
                        quantity: Set(cmd.quantity),
                        status: Set(MovementStatus::Created),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    movement_history::ActiveModel {
                        movement_id: Set(inserted.id),
                        status_label: Set(MovementStatus::Created.to_string()),
                        evidence_file: Set(None),
                        timestamp: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    Ok((inserted, remaining))
                })
            })
            .await?;

        self.event_sender
            .send_best_effort(Event::StockDebited {
                product_id: created.product_id,
                branch_id: created.origin_branch_id,
                quantity: created.quantity,
                remaining,
            })
            .await;
        self.event_sender
            .send_best_effort(Event::MovementCreated {
                movement_id: created.id,
                product_id: created.product_id,
                origin_branch_id: created.origin_branch_id,
                destination_branch_id: created.destination_branch_id,
                quantity: created.quantity,
            })
            .await;

        Ok(created)
    }

    /// Marks the movement in transit. Only legal from `created`; carries
    /// the driver's pickup evidence into the history.
    #[instrument(skip(self, evidence_file))]
    pub async fn start_delivery(
        &self,
        movement_id: i32,
        evidence_file: String,
        driver_name: &str,
    ) -> Result<movement::Model, ServiceError> {
        self.transition(
            movement_id,
            &[MovementStatus::Created],
            MovementStatus::InTransit,
            format!("Driver {} started delivery", driver_name),
            Some(evidence_file),
        )
        .await
    }

    /// Finalizes the delivery. Only legal from `in_transit`.
    #[instrument(skip(self, evidence_file))]
    pub async fn finalize_delivery(
        &self,
        movement_id: i32,
        evidence_file: String,
        driver_name: &str,
    ) -> Result<movement::Model, ServiceError> {
        self.transition(
            movement_id,
            &[MovementStatus::InTransit],
            MovementStatus::Finalized,
            format!("Driver {} finished delivery", driver_name),
            Some(evidence_file),
        )
        .await
    }

    /// Cancels the movement. Legal from `created` or `in_transit`.
    ///
    /// Does NOT credit the debited stock back; the origin ledger keeps
    /// the debit.
    #[instrument(skip(self))]
    pub async fn cancel_movement(&self, movement_id: i32) -> Result<movement::Model, ServiceError> {
        self.transition(
            movement_id,
            &[MovementStatus::Created, MovementStatus::InTransit],
            MovementStatus::Cancelled,
            MovementStatus::Cancelled.to_string(),
            None,
        )
        .await
    }

    /// Administrative status overwrite. Appends history but performs no
    /// transition-legality or stock re-validation.
    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        movement_id: i32,
        status: MovementStatus,
    ) -> Result<movement::Model, ServiceError> {
        let current = self.get_movement(movement_id).await?;
        let old_status = current.status;
        let updated = self
            .apply_status(current, status, status.to_string(), None)
            .await?;
        self.event_sender
            .send_best_effort(Event::MovementStatusChanged {
                movement_id,
                old_status,
                new_status: status,
            })
            .await;
        Ok(updated)
    }

    /// Deletes the movement and cascades its history entries.
    ///
    /// Debited stock is not restored (same gap as cancellation).
    #[instrument(skip(self))]
    pub async fn delete_movement(&self, movement_id: i32) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    movement_history::Entity::delete_many()
                        .filter(movement_history::Column::MovementId.eq(movement_id))
                        .exec(txn)
                        .await?;

                    let result = movement::Entity::delete_by_id(movement_id).exec(txn).await?;
                    if result.rows_affected == 0 {
                        return Err(ServiceError::NotFound(format!(
                            "Movement {} not found",
                            movement_id
                        )));
                    }
                    Ok(())
                })
            })
            .await?;

        self.event_sender
            .send_best_effort(Event::MovementDeleted { movement_id })
            .await;
        Ok(())
    }

    /// Gets a movement by id.
    #[instrument(skip(self))]
    pub async fn get_movement(&self, movement_id: i32) -> Result<movement::Model, ServiceError> {
        movement::Entity::find_by_id(movement_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Movement {} not found", movement_id)))
    }

    /// Lists movements in insertion order, optionally filtered by status.
    #[instrument(skip(self))]
    pub async fn list_movements(
        &self,
        status: Option<MovementStatus>,
    ) -> Result<Vec<movement::Model>, ServiceError> {
        let mut query = movement::Entity::find();
        if let Some(status) = status {
            query = query.filter(movement::Column::Status.eq(status));
        }
        let movements = query
            .order_by_asc(movement::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(movements)
    }

    /// Ordered audit trail for a movement, oldest first. Returns an empty
    /// sequence for unknown or deleted movements.
    #[instrument(skip(self))]
    pub async fn history_for(
        &self,
        movement_id: i32,
    ) -> Result<Vec<movement_history::Model>, ServiceError> {
        let history = movement_history::Entity::find()
            .filter(movement_history::Column::MovementId.eq(movement_id))
            .order_by_asc(movement_history::Column::Timestamp)
            .order_by_asc(movement_history::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(history)
    }

    /// Appends a free-text history entry; the movement must exist.
    #[instrument(skip(self))]
    pub async fn append_history(
        &self,
        movement_id: i32,
        status_label: impl Into<String> + std::fmt::Debug,
        evidence_file: Option<String>,
    ) -> Result<movement_history::Model, ServiceError> {
        self.get_movement(movement_id).await?;
        let entry = movement_history::ActiveModel {
            movement_id: Set(movement_id),
            status_label: Set(status_label.into()),
            evidence_file: Set(evidence_file),
            timestamp: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;
        Ok(entry)
    }

    /// A movement joined with product, branches, and ordered history.
    #[instrument(skip(self))]
    pub async fn get_detail(&self, movement_id: i32) -> Result<MovementDetail, ServiceError> {
        let movement = self.get_movement(movement_id).await?;
        self.compose_detail(movement).await
    }

    /// Full detail rows for every movement, insertion order.
    #[instrument(skip(self))]
    pub async fn list_details(
        &self,
        status: Option<MovementStatus>,
    ) -> Result<Vec<MovementDetail>, ServiceError> {
        let movements = self.list_movements(status).await?;
        let mut details = Vec::with_capacity(movements.len());
        for movement in movements {
            details.push(self.compose_detail(movement).await?);
        }
        Ok(details)
    }

    async fn compose_detail(
        &self,
        movement: movement::Model,
    ) -> Result<MovementDetail, ServiceError> {
        let product = product::Entity::find_by_id(movement.product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", movement.product_id))
            })?;
        let origin = self.find_branch(movement.origin_branch_id).await?;
        let destination = self.find_branch(movement.destination_branch_id).await?;
        let history = self.history_for(movement.id).await?;
        Ok(MovementDetail {
            movement,
            product,
            origin,
            destination,
            history,
        })
    }

    async fn find_branch(&self, branch_id: i32) -> Result<branch::Model, ServiceError> {
        branch::Entity::find_by_id(branch_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Branch {} not found", branch_id)))
    }

    /// Guarded status transition plus history append, in one transaction.
    async fn transition(
        &self,
        movement_id: i32,
        allowed_from: &[MovementStatus],
        next: MovementStatus,
        status_label: String,
        evidence_file: Option<String>,
    ) -> Result<movement::Model, ServiceError> {
        let current = self.get_movement(movement_id).await?;
        if !allowed_from.contains(&current.status) {
            return Err(ServiceError::InvalidTransition(format!(
                "Movement {} is '{}', cannot move to '{}'",
                movement_id, current.status, next
            )));
        }

        let old_status = current.status;
        let updated = self
            .apply_status(current, next, status_label, evidence_file)
            .await?;
        self.event_sender
            .send_best_effort(Event::MovementStatusChanged {
                movement_id,
                old_status,
                new_status: next,
            })
            .await;
        Ok(updated)
    }

    /// Writes the new status and its history entry atomically.
    async fn apply_status(
        &self,
        current: movement::Model,
        next: MovementStatus,
        status_label: String,
        evidence_file: Option<String>,
    ) -> Result<movement::Model, ServiceError> {
        let updated = self
            .db
            .transaction::<_, movement::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    let movement_id = current.id;

                    let mut active: movement::ActiveModel = current.into();
                    active.status = Set(next);
                    active.updated_at = Set(now);
                    let updated = active.update(txn).await?;

                    movement_history::ActiveModel {
                        movement_id: Set(movement_id),
                        status_label: Set(status_label),
                        evidence_file: Set(evidence_file),
                        timestamp: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    Ok(updated)
                })
            })
            .await?;
        Ok(updated)
    }
}
