pub mod admin;
pub mod definitions;
pub mod health;
pub mod license;
pub mod signature;
pub mod statistics;
