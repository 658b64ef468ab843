pub mod branch;
pub mod movement;
pub mod movement_history;
pub mod product;
pub mod user;
