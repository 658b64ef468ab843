pub mod movements;
pub mod products;
pub mod stock;
pub mod users;
