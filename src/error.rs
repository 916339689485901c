use crate::carriage::CarriageId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidArgument {
    #[error("n must be at least 0")]
    NegativePosition(i64),
    #[error("n must be a positive integer")]
    NonPositiveCount(i64),
    #[error("n must be at most 4294967295, got {0}")]
    CountTooLarge(i64),
    #[error("Capacity should be between 1 and 999")]
    CapacityOutOfRange(i64),
    #[error("Invalid carriage type")]
    InvalidType,
}

/// A rejected command. The yard is left exactly as it was before the command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum YardError {
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
    #[error("a carriage with id: '{0}' already exists in this train")]
    DuplicateId(CarriageId),
    #[error("No carriage exists with id: '{0}'")]
    NotFound(CarriageId),
    #[error("Carriages are in the wrong order")]
    OrderError { start: CarriageId, end: CarriageId },
    #[error("Cannot remove {count} passengers from {id}")]
    InsufficientOccupancy { id: CarriageId, count: u32 },
    #[error("not enough space to move passengers")]
    InsufficientSpace { requested: u32, available: u32 },
}

impl YardError {
    pub fn kind(&self) -> &'static str {
        match self {
            YardError::InvalidArgument(_) => "invalid_argument",
            YardError::DuplicateId(_) => "duplicate_id",
            YardError::NotFound(_) => "not_found",
            YardError::OrderError { .. } => "order_error",
            YardError::InsufficientOccupancy { .. } => "insufficient_occupancy",
            YardError::InsufficientSpace { .. } => "insufficient_space",
        }
    }
}

pub type YardResult<T> = Result<T, YardError>;
