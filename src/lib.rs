pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod images;
pub mod memory;
pub mod profiles;
pub mod state;
pub mod users;
