use std::fmt::{self, Display, Formatter};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    Internal(String),
    UnknownStatus(String),
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            CoreError::Internal(s) => write!(f, "Internal error: {}", s),
            CoreError::UnknownStatus(s) => write!(f, "Unknown workspace status: {}", s),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
