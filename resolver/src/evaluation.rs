use runtime::{ObjectRef, Realm, ScopeRef, Value};
use tracing::{debug, trace};
use crate::builtins;
use crate::capability::{CapabilityRegistry, ReferenceHandler, ReferenceOp};
use crate::config::EngineConfig;
use crate::error::{ResolveError, Result};
use crate::reference::{EnvironmentReference, Operand, PropertyReference, ReferenceName};

/// Resolves references against a realm. Reads, writes and deletes through
/// string or symbol keys go to the realm's object model, identifier
/// references go to their environment record, and abstract references are
/// dispatched to the capability handlers installed for their name object.
pub struct EvaluationContext {
    pub realm: Realm,
    /// Capabilities of this context only; other contexts keep their own registry.
    pub capabilities: CapabilityRegistry,
    config: EngineConfig,
    dispatch_depth: u32,
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let realm = Realm::new();
        let mut capabilities = CapabilityRegistry::new();
        if config.install_builtins {
            builtins::install(&mut capabilities, realm.intrinsics());
        }
        Self {
            realm,
            capabilities,
            config,
            dispatch_depth: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Identifier lookup starting at `scope`, or at the global scope when none is given.
    pub fn resolve_binding(&mut self, name: &str, scope: Option<&ScopeRef>, strict: bool) -> Operand {
        let name = self.realm.intern(name);
        let scope = scope.unwrap_or_else(|| self.realm.global());
        Operand::Environment(EnvironmentReference::resolve(scope, name, strict))
    }

    /// Member access `base.key` with a string key.
    pub fn property_reference(&mut self, base: Value, key: &str, strict: bool) -> Operand {
        let key = self.realm.key(key);
        Operand::Property(PropertyReference::new(base, key, strict))
    }

    /// Read: produces the value a reference denotes.
    pub fn get_value(&mut self, operand: &Operand) -> Result<Value> {
        match operand {
            Operand::Value(value) => Ok(value.clone()),
            Operand::Environment(reference) => {
                let Some(scope) = reference.scope() else {
                    return Err(ResolveError::UnboundReference(self.realm.resolve(reference.name()).to_string()));
                };
                Ok(scope.get_binding(reference.name(), reference.is_strict(), self.realm.string_interner())?)
            }
            Operand::Property(reference) => {
                let receiver = self.coerce_base(reference, ReferenceOp::Read)?;
                match reference.name() {
                    ReferenceName::Abstract(name) => {
                        self.dispatch(ReferenceOp::Read, name, |handler, cx| handler.on_read(cx, name, &receiver))
                    }
                    ReferenceName::Key(key) => Ok(self.realm.get(&receiver, key, reference.this_value())?),
                }
            }
        }
    }

    /// Write: stores `value` through a reference.
    pub fn put_value(&mut self, operand: &Operand, value: Value) -> Result<()> {
        match operand {
            Operand::Value(_) => Err(ResolveError::InvalidAssignmentTarget),
            Operand::Environment(reference) => {
                let name = reference.name();
                match reference.scope() {
                    None if reference.is_strict() => {
                        Err(ResolveError::UnboundReference(self.realm.resolve(name).to_string()))
                    }
                    None => {
                        debug!(name = self.realm.resolve(name), "implicit global binding from non-strict write");
                        self.realm.global().create_global_binding(name, value);
                        Ok(())
                    }
                    Some(scope) => {
                        Ok(scope.set_binding(name, value, reference.is_strict(), self.realm.string_interner())?)
                    }
                }
            }
            Operand::Property(reference) => {
                let receiver = self.coerce_base(reference, ReferenceOp::Write)?;
                match reference.name() {
                    ReferenceName::Abstract(name) => {
                        self.dispatch(ReferenceOp::Write, name, |handler, cx| handler.on_write(cx, name, &receiver, &value))
                    }
                    ReferenceName::Key(key) => {
                        if self.realm.set(&receiver, key, value, reference.this_value())? {
                            return Ok(());
                        }
                        let key = self.realm.key_name(key);
                        if reference.is_strict() {
                            return Err(ResolveError::InvalidAssignment(key));
                        }
                        debug!(%key, "ignoring rejected non-strict property write");
                        Ok(())
                    }
                }
            }
        }
    }

    /// Delete: removes the binding or property a reference denotes.
    pub fn delete_reference(&mut self, operand: &Operand) -> Result<bool> {
        match operand {
            Operand::Value(_) => Ok(true),
            Operand::Environment(reference) => match reference.scope() {
                // Strict code rejects deleting identifiers before evaluation.
                None => {
                    trace!(name = self.realm.resolve(reference.name()), "delete of unresolvable reference");
                    Ok(true)
                }
                Some(scope) => Ok(scope.delete_binding(reference.name())),
            },
            Operand::Property(reference) => {
                if reference.has_receiver_override() {
                    let name = reference.name().display(self.realm.string_interner());
                    return Err(ResolveError::SuperReferenceDelete(name));
                }
                let receiver = self.coerce_base(reference, ReferenceOp::Delete)?;
                match reference.name() {
                    ReferenceName::Abstract(name) => {
                        // The handler reports failure through its error path; its
                        // boolean outcome is not the result of the delete.
                        let outcome = self.dispatch(ReferenceOp::Delete, name, |handler, cx| handler.on_delete(cx, name, &receiver))?;
                        trace!(outcome, "abstract delete dispatched");
                        Ok(true)
                    }
                    ReferenceName::Key(key) => {
                        if self.realm.delete(&receiver, key) {
                            return Ok(true);
                        }
                        let key = self.realm.key_name(key);
                        if reference.is_strict() {
                            return Err(ResolveError::InvalidDelete(key));
                        }
                        debug!(%key, "non-strict delete of non-configurable property");
                        Ok(false)
                    }
                }
            }
        }
    }

    /// Builds the abstract reference `base::name` from evaluated operands.
    /// The base is stored as given; it is coerced anew on every resolution.
    pub fn make_abstract_reference(&self, base: Value, name: Value, strict: bool) -> Result<Operand> {
        if base.is_nullish() {
            return Err(ResolveError::TypeError(format!(
                "cannot create an abstract reference with {} base",
                base.type_name()
            )));
        }
        match name {
            Value::Object(name) => Ok(Operand::Property(PropertyReference::abstract_name(base, name, strict))),
            other => Err(ResolveError::TypeError(format!(
                "abstract reference name must be an object, got {}",
                other.type_name()
            ))),
        }
    }

    /// Evaluates the base operand, then the name operand, reading through any
    /// reference each produces, and builds the abstract reference. Stops at
    /// the first failure, so a failing base never evaluates the name.
    pub fn evaluate_abstract_reference<B, N>(&mut self, base: B, name: N, strict: bool) -> Result<Operand>
    where
        B: FnOnce(&mut Self) -> Result<Operand>,
        N: FnOnce(&mut Self) -> Result<Operand>,
    {
        let base = base(self)?;
        let base = self.get_value(&base)?;
        let name = name(self)?;
        let name = self.get_value(&name)?;
        self.make_abstract_reference(base, name, strict)
    }

    fn coerce_base(&self, reference: &PropertyReference, op: ReferenceOp) -> Result<ObjectRef> {
        let base = reference.base();
        if base.is_nullish() {
            return Err(ResolveError::TypeError(format!(
                "cannot {op} '{}' of {}",
                reference.name().display(self.realm.string_interner()),
                base.type_name()
            )));
        }
        Ok(self.realm.to_object(base)?)
    }

    fn dispatch<T>(
        &mut self,
        op: ReferenceOp,
        name: &ObjectRef,
        mut invoke: impl FnMut(&dyn ReferenceHandler, &mut Self) -> Option<Result<T>>,
    ) -> Result<T> {
        if self.dispatch_depth >= self.config.max_dispatch_depth {
            return Err(ResolveError::DispatchDepthExceeded(self.config.max_dispatch_depth));
        }
        let handlers = self.capabilities.handlers_for(name);
        trace!(%op, ?name, candidates = handlers.len(), "dispatching abstract reference");

        self.dispatch_depth += 1;
        let outcome = handlers.iter().find_map(|handler| invoke(handler.as_ref(), self));
        self.dispatch_depth -= 1;

        outcome.unwrap_or_else(|| {
            Err(ResolveError::MissingCapability { op, name: name.class_name().to_string() })
        })
    }
}
