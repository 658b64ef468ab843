//! Shared fixtures for unit tests: an in-memory SQLite pool with the full
//! schema applied, plus row seeding helpers.

use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, Set};

use crate::entities::{branch, product};
use crate::migrator::Migrator;
use sea_orm_migration::MigratorTrait;

/// A fresh in-memory database. The pool is capped at one connection so
/// every query sees the same SQLite memory instance.
pub async fn setup_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_string());
    opt.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.expect("connect sqlite memory");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub async fn seed_branch(db: &DatabaseConnection, id: i32, name: &str) {
    branch::Entity::insert(branch::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        location: Set(format!("{} street", name)),
        latitude: Set(-23.55),
        longitude: Set(-46.63),
    })
    .exec(db)
    .await
    .expect("seed branch");
}

pub async fn seed_product(db: &DatabaseConnection, id: i32, name: &str, quantity: i32, branch_id: i32) {
    product::Entity::insert(product::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        quantity: Set(quantity),
        branch_id: Set(branch_id),
        image_url: Set(None),
        description: Set(None),
    })
    .exec(db)
    .await
    .expect("seed product");
}
