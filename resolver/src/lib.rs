pub mod builtins;
pub mod capability;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod reference;

pub use capability::{Capability, CapabilityRegistry, ReferenceHandler, ReferenceOp};
pub use config::EngineConfig;
pub use error::{ResolveError, Result};
pub use evaluation::EvaluationContext;
pub use reference::{EnvironmentReference, Operand, PropertyReference, ReferenceName};

pub use runtime;
