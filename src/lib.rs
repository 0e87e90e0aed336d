#![doc = "The `taskvault` library crate."]
#![doc = ""]
#![doc = "Personal task service: account signup, bearer-token authentication, and"]
#![doc = "task CRUD with owner/shared access control. The binary (`main.rs`) wires"]
#![doc = "these modules into an actix-web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
