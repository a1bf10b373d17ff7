//! Dynamically typed values.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::class::{object_methods, Class, Method, MethodBody};
use super::ty::{PrimitiveTy, Type};
use crate::duck::Duck;
use crate::mixin::Producer;

/// An instance of a user defined class.
pub struct Instance {
    class: Arc<Class>,
    state: Box<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    /// Borrow the instance state as `T`.
    pub fn state<T: Any>(&self) -> Option<&T> {
        self.state.downcast_ref::<T>()
    }
}

/// A value flowing through method calls.
///
/// Cloning is cheap: strings, instances and ducks are shared handles.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(Arc<str>),
    Object(Arc<Instance>),
    Duck(Duck),
}

impl Value {
    /// Create an instance of `class` holding `state`.
    pub fn object(class: &Arc<Class>, state: impl Any + Send + Sync) -> Self {
        Value::Object(Arc::new(Instance {
            class: class.clone(),
            state: Box::new(state),
        }))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The runtime type. `Null` has none.
    pub fn runtime_type(&self) -> Option<Type> {
        let ty = match self {
            Value::Null => return None,
            Value::Bool(_) => Type::Boxed(PrimitiveTy::Boolean),
            Value::Byte(_) => Type::Boxed(PrimitiveTy::Byte),
            Value::Char(_) => Type::Boxed(PrimitiveTy::Char),
            Value::Short(_) => Type::Boxed(PrimitiveTy::Short),
            Value::Int(_) => Type::Boxed(PrimitiveTy::Int),
            Value::Long(_) => Type::Boxed(PrimitiveTy::Long),
            Value::Float(_) => Type::Boxed(PrimitiveTy::Float),
            Value::Double(_) => Type::Boxed(PrimitiveTy::Double),
            Value::Str(_) => Type::string(),
            Value::Object(instance) => Type::Class(instance.class.clone()),
            Value::Duck(duck) => Type::Interface(duck.interface().clone()),
        };
        Some(ty)
    }

    /// Hash consistent with the default `equals`.
    pub fn identity_hash(&self) -> i32 {
        match self {
            Value::Null => 0,
            Value::Bool(b) => {
                if *b {
                    1231
                } else {
                    1237
                }
            }
            Value::Byte(v) => i32::from(*v),
            Value::Char(c) => *c as i32,
            Value::Short(v) => i32::from(*v),
            Value::Int(v) => *v,
            Value::Long(v) => (*v ^ (*v >> 32)) as i32,
            Value::Float(v) => v.to_bits() as i32,
            Value::Double(v) => {
                let bits = v.to_bits();
                (bits ^ (bits >> 32)) as i32
            }
            Value::Str(s) => s
                .chars()
                .fold(0i32, |hash, c| hash.wrapping_mul(31).wrapping_add(c as i32)),
            Value::Object(instance) => Arc::as_ptr(instance) as *const () as usize as i32,
            Value::Duck(duck) => duck.address() as i32,
        }
    }

    /// Methods that can be called on this value from outside.
    pub fn public_methods(&self) -> Vec<Arc<Method>> {
        match self {
            Value::Null => Vec::new(),
            Value::Object(instance) => instance.class.public_methods(),
            Value::Str(_) => Class::string().public_methods(),
            Value::Duck(duck) => {
                let mut methods = duck.interface().all_methods();
                for method in object_methods() {
                    if !methods.iter().any(|known| known.same_shape(method)) {
                        methods.push(method.clone());
                    }
                }
                methods
            }
            _ => object_methods().to_vec(),
        }
    }

    /// The body that runs when `method` is invoked on this value.
    pub(crate) fn virtual_body(&self, method: &Method) -> Option<MethodBody> {
        match self {
            Value::Null | Value::Duck(_) => None,
            Value::Object(instance) => instance.class.resolve_virtual(method),
            Value::Str(_) => Class::string().resolve_virtual(method),
            _ => method.body().cloned(),
        }
    }

    /// Producer declared by the value's class, if any.
    pub fn producer(&self) -> Option<Arc<dyn Producer>> {
        match self {
            Value::Object(instance) => instance.class.producer().cloned(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view of any integral scalar that fits in `i32`.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Byte(v) => Some(i32::from(*v)),
            Value::Short(v) => Some(i32::from(*v)),
            Value::Int(v) => Some(*v),
            Value::Char(c) => Some(*c as i32),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Arc<Instance>> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_duck(&self) -> Option<&Duck> {
        match self {
            Value::Duck(duck) => Some(duck),
            _ => None,
        }
    }

    /// Borrow the state of an object value as `T`.
    pub fn state<T: Any>(&self) -> Option<&T> {
        self.as_instance().and_then(|instance| instance.state::<T>())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Duck(a), Value::Duck(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Char(c) => write!(f, "{}", c),
            Value::Short(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Double(v) => write!(f, "{:?}", v),
            Value::Str(s) => write!(f, "{}", s),
            Value::Object(instance) => {
                write!(f, "{}@{:x}", instance.class.name(), self.identity_hash())
            }
            Value::Duck(duck) => {
                write!(f, "{}@{:x}", duck.interface().name(), self.identity_hash())
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Duck(duck) => write!(f, "Duck<{}>", duck.interface().name()),
            other => write!(f, "{}", other),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Value::Byte(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Short(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(Arc::from(value))
    }
}

impl From<Duck> for Value {
    fn from(value: Duck) -> Self {
        Value::Duck(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_type_of_scalars_is_boxed() {
        assert_eq!(Value::Int(1).runtime_type(), Some(Type::Boxed(PrimitiveTy::Int)));
        assert_eq!(Value::from("quack").runtime_type(), Some(Type::string()));
        assert_eq!(Value::Null.runtime_type(), None);
    }

    #[test]
    fn test_objects_compare_by_identity() {
        let class = Class::builder("Egg").build();
        let a = Value::object(&class, 1u8);
        let b = Value::object(&class, 1u8);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(a.state::<u8>(), Some(&1));
        assert_eq!(a.state::<u16>(), None);
    }

    #[test]
    fn test_strings_compare_by_value() {
        assert_eq!(Value::from("quack"), Value::from(String::from("quack")));
        assert_eq!(
            Value::from("ab").identity_hash(),
            31 * ('a' as i32) + ('b' as i32)
        );
    }

    #[test]
    fn test_object_display_uses_class_name() {
        let class = Class::builder("Egg").build();
        let egg = Value::object(&class, ());
        assert!(egg.to_string().starts_with("Egg@"));
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Double(1.0).to_string(), "1.0");
    }
}
