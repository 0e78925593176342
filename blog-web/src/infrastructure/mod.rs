pub mod config;
pub mod database;
pub mod logging;
pub mod session;
