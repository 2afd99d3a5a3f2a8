pub mod auth;
pub mod config;
pub mod demo_data;
pub mod fixtures;
pub mod home;
pub mod logging;
pub mod models;
pub mod session;
pub mod state;
pub mod store;
pub mod top_liked;
