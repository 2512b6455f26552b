pub mod environment;
pub mod error;
pub mod object;
pub mod realm;
pub mod value;

pub use environment::{BindingKind, ScopeRef, VariableValue};
pub use error::{Result, RuntimeError};
pub use object::{MapStorage, NativeFunction, ObjectKind, ObjectRef, Property, WeakMapStorage, WeakObjectRef};
pub use realm::{Intrinsics, Realm};
pub use value::{PropertyKey, Symbol, Value};

// Re-exported so callers can name interned strings without a direct dependency.
pub use string_interner::DefaultSymbol;
