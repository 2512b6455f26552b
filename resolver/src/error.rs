use runtime::{RuntimeError, Value};
use thiserror::Error;
use crate::capability::ReferenceOp;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("ReferenceError: {0} is not defined")]
    UnboundReference(String),
    #[error("SyntaxError: invalid assignment target")]
    InvalidAssignmentTarget,
    #[error("TypeError: cannot assign to read only property '{0}'")]
    InvalidAssignment(String),
    #[error("TypeError: cannot delete property '{0}'")]
    InvalidDelete(String),
    /// Delete attempted through a reference carrying an explicit receiver.
    #[error("ReferenceError: unsupported reference to 'super' when deleting '{0}'")]
    SuperReferenceDelete(String),
    #[error("TypeError: {name} does not implement reference {op}")]
    MissingCapability { op: ReferenceOp, name: String },
    #[error("TypeError: {0}")]
    TypeError(String),
    #[error("RangeError: reference dispatch exceeded depth {0}")]
    DispatchDepthExceeded(u32),
    /// Failure signalled by a capability handler through its own error path.
    #[error("uncaught exception: {0:?}")]
    Thrown(Value),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
