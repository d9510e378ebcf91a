pub mod admin;
pub mod license;
pub mod signature;
pub mod statistics;
