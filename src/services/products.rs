use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;
use tracing::instrument;

use crate::entities::{branch, product};
use crate::errors::ServiceError;
use crate::services::stock::StockService;

/// Read-side catalog queries over products and branches, backing the
/// product/branch pickers and the stock availability probe.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Products joined with their branch, optionally filtered by a search
    /// term matching either the product or the branch name.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        search: Option<String>,
    ) -> Result<Vec<(product::Model, branch::Model)>, ServiceError> {
        let mut query = product::Entity::find().find_also_related(branch::Entity);

        if let Some(term) = search.filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", term.trim());
            query = query.filter(
                Condition::any()
                    .add(product::Column::Name.like(pattern.clone()))
                    .add(branch::Column::Name.like(pattern)),
            );
        }

        let rows = query
            .order_by_asc(product::Column::Id)
            .all(&*self.db)
            .await?;

        // Branch is a non-nullable FK; a missing row means a broken join.
        rows.into_iter()
            .map(|(product, branch)| {
                let branch = branch.ok_or_else(|| {
                    ServiceError::InternalError(format!(
                        "Product {} references a missing branch",
                        product.id
                    ))
                })?;
                Ok((product, branch))
            })
            .collect()
    }

    /// Distinct product names for selection lists. A product stocked at
    /// several branches appears once, under its lowest id.
    #[instrument(skip(self))]
    pub async fn product_options(&self) -> Result<Vec<(i32, String)>, ServiceError> {
        let products = product::Entity::find()
            .order_by_asc(product::Column::Id)
            .all(&*self.db)
            .await?;

        let mut seen = std::collections::HashSet::new();
        let options = products
            .into_iter()
            .filter(|p| seen.insert(p.name.clone()))
            .map(|p| (p.id, p.name))
            .collect();
        Ok(options)
    }

    /// All branches, for selection lists.
    #[instrument(skip(self))]
    pub async fn branch_options(&self) -> Result<Vec<branch::Model>, ServiceError> {
        let branches = branch::Entity::find()
            .order_by_asc(branch::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(branches)
    }

    /// Available quantity of a product at a branch.
    #[instrument(skip(self))]
    pub async fn quantity_at(&self, product_id: i32, branch_id: i32) -> Result<i32, ServiceError> {
        StockService::quantity_on(&*self.db, product_id, branch_id).await
    }
}
