use thiserror::Error;
use crate::value::Value;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("TypeError: {0}")]
    TypeError(String),
    #[error("ReferenceError: {0} is not defined")]
    ReferenceError(String),
    #[error("ReferenceError: cannot access '{0}' before initialization")]
    UninitializedBinding(String),
    #[error("TypeError: assignment to constant binding '{0}'")]
    ImmutableAssignment(String),
    #[error("uncaught exception: {0:?}")]
    Thrown(Value),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
