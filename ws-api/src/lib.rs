pub mod activity_checker;
pub mod client;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use activity_checker::start_activity_checker_task;
pub use client::WorkspaceMasterClient;
pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use routes::create_app;
pub use state::AppState;
