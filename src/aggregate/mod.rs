pub mod config;
pub mod monthly;
pub mod upsert;
