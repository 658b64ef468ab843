use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use std::sync::Arc;
use tracing::instrument;

use crate::entities::product;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Stock ledger over the per-(product, branch) quantity counters.
///
/// The counters live on the product rows; this service is the only writer,
/// and the only write it performs is the debit executed during movement
/// creation.
#[derive(Clone)]
pub struct StockService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl StockService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Current on-hand quantity for the (product, branch) pair.
    #[instrument(skip(self))]
    pub async fn get_quantity(&self, product_id: i32, branch_id: i32) -> Result<i32, ServiceError> {
        Self::quantity_on(&*self.db, product_id, branch_id).await
    }

    /// Debits `amount` from the pair's counter and returns the new value.
    ///
    /// Fails with InsufficientStock when `amount` exceeds the current
    /// quantity; the counter is untouched in that case.
    #[instrument(skip(self))]
    pub async fn debit(
        &self,
        product_id: i32,
        branch_id: i32,
        amount: i32,
    ) -> Result<i32, ServiceError> {
        let remaining = Self::debit_on(&*self.db, product_id, branch_id, amount).await?;
        self.event_sender
            .send_best_effort(Event::StockDebited {
                product_id,
                branch_id,
                quantity: amount,
                remaining,
            })
            .await;
        Ok(remaining)
    }

    /// Reads the counter on an arbitrary connection (pool or transaction).
    pub(crate) async fn quantity_on<C: ConnectionTrait>(
        conn: &C,
        product_id: i32,
        branch_id: i32,
    ) -> Result<i32, ServiceError> {
        let entry = product::Entity::find()
            .filter(product::Column::Id.eq(product_id))
            .filter(product::Column::BranchId.eq(branch_id))
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Product {} is not stocked at branch {}",
                    product_id, branch_id
                ))
            })?;
        Ok(entry.quantity)
    }

    /// Conditionally decrements the counter on an arbitrary connection.
    ///
    /// Expressed as a single guarded UPDATE (`quantity = quantity - amount
    /// WHERE quantity >= amount`) so that two racing debits can never drive
    /// the counter below zero, regardless of isolation level.
    pub(crate) async fn debit_on<C: ConnectionTrait>(
        conn: &C,
        product_id: i32,
        branch_id: i32,
        amount: i32,
    ) -> Result<i32, ServiceError> {
        if amount <= 0 {
            return Err(ServiceError::ValidationError(format!(
                "Debit amount must be positive, got {}",
                amount
            )));
        }

        let result = product::Entity::update_many()
            .col_expr(
                product::Column::Quantity,
                Expr::col(product::Column::Quantity).sub(amount),
            )
            .filter(product::Column::Id.eq(product_id))
            .filter(product::Column::BranchId.eq(branch_id))
            .filter(product::Column::Quantity.gte(amount))
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            // Distinguish a missing ledger entry from an overdraw.
            let current = Self::quantity_on(conn, product_id, branch_id).await?;
            return Err(ServiceError::InsufficientStock(format!(
                "Requested {} units of product {} at branch {}, only {} available",
                amount, product_id, branch_id, current
            )));
        }

        Self::quantity_on(conn, product_id, branch_id).await
    }
}
