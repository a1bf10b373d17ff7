//! Runtime types and definition ids.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use super::class::{Class, Interface};

/// Unique identifier of a class, interface, method or type parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(u32);

impl DefId {
    /// The id of the root `Object` type.
    pub const OBJECT: DefId = DefId(0);

    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        DefId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw index of this id.
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Primitive scalar types. Each one has a boxed counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTy {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl PrimitiveTy {
    pub const ALL: [PrimitiveTy; 9] = [
        PrimitiveTy::Boolean,
        PrimitiveTy::Byte,
        PrimitiveTy::Char,
        PrimitiveTy::Short,
        PrimitiveTy::Int,
        PrimitiveTy::Long,
        PrimitiveTy::Float,
        PrimitiveTy::Double,
        PrimitiveTy::Void,
    ];

    /// Name of the primitive type.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveTy::Boolean => "boolean",
            PrimitiveTy::Byte => "byte",
            PrimitiveTy::Char => "char",
            PrimitiveTy::Short => "short",
            PrimitiveTy::Int => "int",
            PrimitiveTy::Long => "long",
            PrimitiveTy::Float => "float",
            PrimitiveTy::Double => "double",
            PrimitiveTy::Void => "void",
        }
    }

    /// Name of the boxed counterpart.
    pub fn boxed_name(self) -> &'static str {
        match self {
            PrimitiveTy::Boolean => "Boolean",
            PrimitiveTy::Byte => "Byte",
            PrimitiveTy::Char => "Character",
            PrimitiveTy::Short => "Short",
            PrimitiveTy::Int => "Integer",
            PrimitiveTy::Long => "Long",
            PrimitiveTy::Float => "Float",
            PrimitiveTy::Double => "Double",
            PrimitiveTy::Void => "Void",
        }
    }
}

/// A type parameter with its upper bounds.
#[derive(Debug)]
pub struct TypeParam {
    id: DefId,
    name: String,
    bounds: Vec<Type>,
}

impl TypeParam {
    pub fn def_id(&self) -> DefId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Upper bounds. Never empty: an unbounded parameter is bounded by `Object`.
    pub fn bounds(&self) -> &[Type] {
        &self.bounds
    }
}

/// A runtime type.
///
/// Types compare and hash by identity, so they can key resolution caches.
#[derive(Clone)]
pub enum Type {
    /// The root of every reference type.
    Object,
    /// A primitive scalar such as `int`.
    Primitive(PrimitiveTy),
    /// The boxed counterpart of a primitive such as `Integer`.
    Boxed(PrimitiveTy),
    /// A class.
    Class(Arc<Class>),
    /// An interface.
    Interface(Arc<Interface>),
    /// A bounded type parameter.
    Param(Arc<TypeParam>),
}

impl Type {
    pub fn primitive(ty: PrimitiveTy) -> Self {
        Type::Primitive(ty)
    }

    pub fn boxed(ty: PrimitiveTy) -> Self {
        Type::Boxed(ty)
    }

    pub fn boolean() -> Self {
        Type::Primitive(PrimitiveTy::Boolean)
    }

    pub fn int() -> Self {
        Type::Primitive(PrimitiveTy::Int)
    }

    pub fn long() -> Self {
        Type::Primitive(PrimitiveTy::Long)
    }

    pub fn double() -> Self {
        Type::Primitive(PrimitiveTy::Double)
    }

    pub fn void() -> Self {
        Type::Primitive(PrimitiveTy::Void)
    }

    /// The builtin `String` class.
    pub fn string() -> Self {
        Type::Class(Class::string().clone())
    }

    /// Create a fresh type parameter. An empty bound list means `Object`.
    pub fn param(name: impl Into<String>, bounds: impl IntoIterator<Item = Type>) -> Self {
        let mut bounds: Vec<Type> = bounds.into_iter().collect();
        if bounds.is_empty() {
            bounds.push(Type::Object);
        }
        Type::Param(Arc::new(TypeParam {
            id: DefId::fresh(),
            name: name.into(),
            bounds,
        }))
    }

    /// Identity of this type. Primitive and boxed types have no definition.
    pub fn def_id(&self) -> Option<DefId> {
        match self {
            Type::Object => Some(DefId::OBJECT),
            Type::Class(class) => Some(class.def_id()),
            Type::Interface(interface) => Some(interface.def_id()),
            Type::Param(param) => Some(param.def_id()),
            Type::Primitive(_) | Type::Boxed(_) => None,
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(self, Type::Interface(_))
    }

    pub fn as_interface(&self) -> Option<&Arc<Interface>> {
        match self {
            Type::Interface(interface) => Some(interface),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveTy::Void))
    }

    /// The direct superclass, walking towards `Object`.
    ///
    /// Interfaces report `Object` because the values typed by them are
    /// objects. Primitives, parameters and `Object` itself have none.
    pub fn superclass(&self) -> Option<Type> {
        match self {
            Type::Class(class) => Some(
                class
                    .superclass()
                    .map(|parent| Type::Class(parent.clone()))
                    .unwrap_or(Type::Object),
            ),
            Type::Boxed(_) | Type::Interface(_) => Some(Type::Object),
            Type::Object | Type::Primitive(_) | Type::Param(_) => None,
        }
    }

    /// Ordinary substitutability: `self` is the same type as `target` or a
    /// subtype of it. Type parameters take no part in subtyping.
    pub fn is_subtype_of(&self, target: &Type) -> bool {
        if self == target {
            return true;
        }

        match (self, target) {
            (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
            (Type::Param(_), _) | (_, Type::Param(_)) => false,
            (_, Type::Object) => true,
            (Type::Class(class), Type::Class(parent)) => class
                .ancestors()
                .any(|ancestor| ancestor.def_id() == parent.def_id()),
            (Type::Class(class), Type::Interface(interface)) => class.implements(interface),
            (Type::Interface(sub), Type::Interface(interface)) => sub.is_subinterface_of(interface),
            _ => false,
        }
    }

    /// Display name of the type.
    pub fn name(&self) -> String {
        match self {
            Type::Object => "Object".to_string(),
            Type::Primitive(prim) => prim.name().to_string(),
            Type::Boxed(prim) => prim.boxed_name().to_string(),
            Type::Class(class) => class.name().to_string(),
            Type::Interface(interface) => interface.name().to_string(),
            Type::Param(param) => param.name().to_string(),
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Object, Type::Object) => true,
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::Boxed(a), Type::Boxed(b)) => a == b,
            (Type::Class(a), Type::Class(b)) => a.def_id() == b.def_id(),
            (Type::Interface(a), Type::Interface(b)) => a.def_id() == b.def_id(),
            (Type::Param(a), Type::Param(b)) => a.def_id() == b.def_id(),
            _ => false,
        }
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Type::Primitive(prim) | Type::Boxed(prim) => prim.hash(state),
            other => other.def_id().hash(state),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Param(param) => {
                let bounds: Vec<String> = param.bounds().iter().map(Type::name).collect();
                write!(f, "{} extends {}", param.name(), bounds.join(" & "))
            }
            other => write!(f, "{}", other.name()),
        }
    }
}
