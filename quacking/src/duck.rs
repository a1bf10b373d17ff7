//! Synthesized interface instances.

use std::fmt;
use std::sync::Arc;

use crate::dispatch::compatible;
use crate::error::{QuackError, QuackResult};
use crate::mixin::Mixin;
use crate::object::{object_methods, Interface, Method, Type, Value};

/// Capability shared by mixins and the ducks they create.
pub trait DuckType {
    /// Whether the underlying mixin implements `ty`.
    fn is(&self, ty: &Type) -> bool;

    /// View the underlying mixin as `ty`.
    fn as_interface(&self, ty: &Type) -> QuackResult<Option<Duck>>;
}

struct DuckInner {
    interface: Arc<Interface>,
    mixin: Mixin,
}

/// An instance of an interface whose calls are answered by a [`Mixin`].
///
/// Ducks compare by identity. Cloning yields the same duck.
#[derive(Clone)]
pub struct Duck {
    inner: Arc<DuckInner>,
}

impl Duck {
    pub(crate) fn new(interface: Arc<Interface>, mixin: Mixin) -> Self {
        Duck {
            inner: Arc::new(DuckInner { interface, mixin }),
        }
    }

    pub fn interface(&self) -> &Arc<Interface> {
        &self.inner.interface
    }

    pub fn mixin(&self) -> &Mixin {
        &self.inner.mixin
    }

    pub fn ptr_eq(&self, other: &Duck) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn address(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    /// Call `method` on this duck.
    ///
    /// `equals` with the duck itself is answered without consulting the
    /// mixin. Everything else is dispatched to the mixed objects.
    pub fn invoke(&self, method: &Arc<Method>, args: &[Value]) -> QuackResult<Value> {
        if args.len() != method.arity() {
            return Err(QuackError::invalid(format!(
                "{} expects {} argument(s), got {}",
                method.signature(),
                method.arity(),
                args.len()
            )));
        }

        if method.is_object_equals() && self.is_self(&args[0]) {
            return Ok(Value::Bool(true));
        }

        let result = self.inner.mixin.dispatch(method, args)?;
        unbox_return(method, result)
    }

    /// Find the method `name` taking `arity` arguments, declared by the
    /// interface or by the `Object` protocol.
    pub fn method(&self, name: &str, arity: usize) -> Option<Arc<Method>> {
        self.overloads(name, arity).into_iter().next()
    }

    /// Call a method by name, picking the first overload whose parameters
    /// accept the arguments.
    pub fn call(&self, name: &str, args: &[Value]) -> QuackResult<Value> {
        let overloads = self.overloads(name, args.len());
        let method = overloads
            .iter()
            .find(|method| accepts(method, args))
            .or_else(|| overloads.first())
            .cloned()
            .ok_or_else(|| QuackError::UnsupportedDispatch {
                method: name.to_string(),
                signature: format!("{}.{}/{}", self.interface().name(), name, args.len()),
            })?;

        self.invoke(&method, args)
    }

    /// `equals` as seen through the duck.
    pub fn equals(&self, other: &Value) -> QuackResult<bool> {
        let result = self.call("equals", std::slice::from_ref(other))?;
        result
            .as_bool()
            .ok_or_else(|| self.unexpected_return("equals", "boolean", &result))
    }

    /// `hashCode` as seen through the duck.
    pub fn hash_code(&self) -> QuackResult<i32> {
        let result = self.call("hashCode", &[])?;
        match result {
            Value::Int(hash) => Ok(hash),
            other => Err(self.unexpected_return("hashCode", "int", &other)),
        }
    }

    /// `toString` as seen through the duck.
    pub fn to_string_value(&self) -> QuackResult<String> {
        Ok(self.call("toString", &[])?.to_string())
    }

    fn overloads(&self, name: &str, arity: usize) -> Vec<Arc<Method>> {
        let declared = self.interface().all_methods();
        declared
            .into_iter()
            .chain(object_methods().iter().cloned())
            .filter(|method| method.name() == name && method.arity() == arity)
            .collect()
    }

    fn unexpected_return(&self, name: &str, expected: &str, found: &Value) -> QuackError {
        QuackError::UnexpectedReturn {
            method: format!("{}.{}", self.interface().name(), name),
            expected: expected.to_string(),
            found: format!("{:?}", found),
        }
    }

    fn is_self(&self, value: &Value) -> bool {
        matches!(value, Value::Duck(other) if other.ptr_eq(self))
    }
}

/// Whether each argument may be passed for the matching parameter.
fn accepts(method: &Method, args: &[Value]) -> bool {
    method.params().iter().zip(args).all(|(param, arg)| match arg.runtime_type() {
        Some(ty) => compatible(param, &ty),
        None => !param.is_primitive(),
    })
}

fn unbox_return(method: &Method, result: Value) -> QuackResult<Value> {
    let ret = method.ret();
    if ret.is_void() {
        return Ok(Value::Null);
    }

    if ret.is_primitive() && result.is_null() {
        return Err(QuackError::NullUnboxing {
            signature: method.signature(),
            expected: ret.name(),
        });
    }

    Ok(result)
}

impl DuckType for Duck {
    fn is(&self, ty: &Type) -> bool {
        self.inner.mixin.is(ty)
    }

    fn as_interface(&self, ty: &Type) -> QuackResult<Option<Duck>> {
        self.inner.mixin.as_interface(ty)
    }
}

impl fmt::Debug for Duck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Duck")
            .field("interface", &self.interface().name())
            .field("mixin", &self.inner.mixin)
            .finish()
    }
}
