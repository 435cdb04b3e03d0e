use thiserror::Error;

use crate::stop::StopId;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown stop id {0}")]
    UnknownStop(StopId),

    #[error("reorder must be a permutation of the current stop ids")]
    InvalidOrder,
}
