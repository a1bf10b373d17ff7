//! Full and partial interface satisfaction.

use std::sync::Arc;

use crate::dispatch::{find_method, MethodQuery};
use crate::error::{QuackError, QuackResult};
use crate::object::{Interface, Method, Type, Value};

/// Tracks which methods of an interface are still unimplemented while
/// objects are fed to it.
#[derive(Debug, Clone)]
pub struct DuckMatcher {
    interface: Arc<Interface>,
    methods: Vec<Arc<Method>>,
    missing: Vec<Arc<Method>>,
}

impl DuckMatcher {
    /// Create a matcher for an interface type.
    pub fn new(ty: &Type) -> QuackResult<Self> {
        let interface = ty.as_interface().ok_or_else(|| {
            QuackError::invalid(format!(
                "a duck matcher can only be created for an interface, not `{}`",
                ty
            ))
        })?;
        Ok(Self::for_interface(interface))
    }

    pub fn for_interface(interface: &Arc<Interface>) -> Self {
        let methods = interface.all_methods();
        DuckMatcher {
            interface: interface.clone(),
            missing: methods.clone(),
            methods,
        }
    }

    pub fn interface(&self) -> &Arc<Interface> {
        &self.interface
    }

    /// Methods no fed object implements yet.
    pub fn missing(&self) -> &[Arc<Method>] {
        &self.missing
    }

    /// Forget every object fed so far.
    pub fn reset(&mut self) {
        self.missing = self.methods.clone();
    }

    /// Remove the methods `object` implements. Returns whether any was
    /// removed.
    pub fn feed(&mut self, object: &Value) -> bool {
        if object.is_null() {
            return false;
        }

        let before = self.missing.len();
        self.missing
            .retain(|method| find_method(object, &MethodQuery::structural(method)).is_none());
        self.missing.len() < before
    }

    /// Whether `object` alone implements the whole interface.
    pub fn match_duck(&mut self, object: &Value) -> bool {
        self.reset();
        self.feed(object);
        self.is_duck()
    }

    /// Every method is implemented.
    pub fn is_duck(&self) -> bool {
        self.missing.is_empty()
    }

    /// Some, but not all, methods are implemented.
    pub fn is_duckling(&self) -> bool {
        !self.missing.is_empty() && self.missing.len() < self.methods.len()
    }
}
