use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::events::EventSender;
use crate::services::movements::MovementService;
use crate::services::products::ProductService;
use crate::services::stock::StockService;
use crate::services::users::UserService;

pub mod branches;
pub mod movements;
pub mod products;
pub mod users;

/// Aggregated services used by the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub movements: Arc<MovementService>,
    pub stock: Arc<StockService>,
    pub products: Arc<ProductService>,
    pub users: Arc<UserService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender, cfg: &AppConfig) -> Self {
        Self {
            movements: Arc::new(MovementService::new(db.clone(), event_sender.clone())),
            stock: Arc::new(StockService::new(db.clone(), event_sender.clone())),
            products: Arc::new(ProductService::new(db.clone())),
            users: Arc::new(UserService::new(
                db,
                event_sender,
                cfg.jwt_secret.clone(),
                cfg.jwt_expiration,
            )),
        }
    }
}
