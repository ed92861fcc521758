use thiserror::Error;

pub type Result<T> = std::result::Result<T, ActivityError>;

#[derive(Error, Debug)]
pub enum ActivityError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid attribute {attribute} of workspace {workspace_id}: {reason}")]
    InvalidAttribute {
        workspace_id: String,
        attribute: String,
        reason: String,
    },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Workspace error: {0}")]
    Workspace(#[from] anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
