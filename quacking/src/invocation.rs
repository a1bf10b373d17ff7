//! Resolved calls and interceptors.

use std::fmt;
use std::sync::Arc;

use crate::error::{QuackError, QuackResult};
use crate::mixed::CurryTemplate;
use crate::object::{DefId, Method, Type, Value};

/// Interceptor run in place of a direct call.
///
/// Receives the target object, the resolved method and the final
/// arguments. Calling `method.invoke(target, args)` performs the call.
pub trait Wing: Send + Sync {
    fn wrap(&self, target: &Value, method: &Arc<Method>, args: &[Value]) -> QuackResult<Value>;
}

impl<F> Wing for F
where
    F: Fn(&Value, &Arc<Method>, &[Value]) -> QuackResult<Value> + Send + Sync,
{
    fn wrap(&self, target: &Value, method: &Arc<Method>, args: &[Value]) -> QuackResult<Value> {
        self(target, method, args)
    }
}

/// The default interceptor. Invokes the method directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectWing;

impl Wing for DirectWing {
    fn wrap(&self, target: &Value, method: &Arc<Method>, args: &[Value]) -> QuackResult<Value> {
        method.invoke(target, args)
    }
}

/// Cache key: the interface method and the runtime types of the arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallShape {
    pub method: DefId,
    pub args: Vec<Option<Type>>,
}

impl CallShape {
    pub fn of(method: &Method, args: &[Value]) -> Self {
        CallShape {
            method: method.def_id(),
            args: args.iter().map(Value::runtime_type).collect(),
        }
    }
}

/// A resolved call, ready to run with the caller's arguments.
pub struct Invocation {
    target: Value,
    wing: Option<Arc<dyn Wing>>,
    method: Arc<Method>,
    curry: Option<CurryTemplate>,
}

impl Invocation {
    pub fn new(
        target: Value,
        wing: Option<Arc<dyn Wing>>,
        method: Arc<Method>,
        curry: Option<CurryTemplate>,
    ) -> Self {
        Invocation {
            target,
            wing,
            method,
            curry,
        }
    }

    pub fn target(&self) -> &Value {
        &self.target
    }

    pub fn method(&self) -> &Arc<Method> {
        &self.method
    }

    pub fn is_wrapped(&self) -> bool {
        self.wing.is_some()
    }

    pub fn curry(&self) -> Option<&CurryTemplate> {
        self.curry.as_ref()
    }

    /// The arguments the method receives for the given call arguments.
    pub fn final_args(&self, args: &[Value]) -> Option<Vec<Value>> {
        match &self.curry {
            Some(template) => template.merge(args),
            None => Some(args.to_vec()),
        }
    }

    /// Run the call through the interceptor.
    pub fn proceed(&self, args: &[Value]) -> QuackResult<Value> {
        let args = self.final_args(args).ok_or_else(|| {
            QuackError::invalid(format!(
                "{} arguments do not fit the curried template of {}",
                args.len(),
                self.method.signature()
            ))
        })?;

        match &self.wing {
            Some(wing) => wing.wrap(&self.target, &self.method, &args),
            None => DirectWing.wrap(&self.target, &self.method, &args),
        }
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("target", &self.target)
            .field("method", &self.method)
            .field("wrapped", &self.is_wrapped())
            .field("curry", &self.curry)
            .finish()
    }
}
