pub mod auth;
pub mod calculate;
pub mod dashboard;
pub mod health;
pub mod market;
pub mod trades;
