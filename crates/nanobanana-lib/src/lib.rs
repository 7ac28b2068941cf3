// Nano Banana Shared Library
// Models, repositories, services, and utilities shared by the terminal client
//
// The workflow turns a short concept into an optimized generation prompt and
// then into an image or video asset through the Gemini API.

pub mod config;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

pub use config::{AppConfig, ConfigError};
pub use models::*;
