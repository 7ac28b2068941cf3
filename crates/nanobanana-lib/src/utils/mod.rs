// Utility functions module

pub mod database;
pub mod schema;
pub mod shared_store;
