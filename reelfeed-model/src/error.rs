use std::fmt::{self, Display};

use crate::ids::ItemId;

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    EmptyId,
    InvalidGeometry { id: ItemId, reason: &'static str },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::EmptyId => write!(f, "feed item id must not be empty"),
            ModelError::InvalidGeometry { id, reason } => {
                write!(f, "invalid geometry for item {id}: {reason}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
