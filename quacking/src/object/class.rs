//! Classes, interfaces and the methods they declare.

use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use rustc_hash::FxHashSet;

use super::ty::{DefId, PrimitiveTy, Type};
use super::value::Value;
use crate::error::{AccessViolation, QuackError, QuackResult};
use crate::mixin::{Mixin, Producer};

/// Executable body of a method. Receives the receiver and the arguments.
pub type MethodBody = Arc<dyn Fn(&Value, &[Value]) -> QuackResult<Value> + Send + Sync>;

/// Visibility of a declared method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

/// Back reference from a method to its declaring type.
#[derive(Debug, Clone)]
enum OwnerRef {
    Object,
    Class(Weak<Class>),
    Interface(Weak<Interface>),
}

/// A method declared by a class, an interface or the `Object` protocol.
pub struct Method {
    id: DefId,
    name: String,
    owner: OwnerRef,
    owner_id: DefId,
    owner_name: String,
    owner_public: bool,
    params: Vec<Type>,
    ret: Type,
    visibility: Visibility,
    body: Option<MethodBody>,
}

impl Method {
    pub fn def_id(&self) -> DefId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Type] {
        &self.params
    }

    pub fn ret(&self) -> &Type {
        &self.ret
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub(crate) fn body(&self) -> Option<&MethodBody> {
        self.body.as_ref()
    }

    /// Id of the declaring class or interface.
    pub fn owner_id(&self) -> DefId {
        self.owner_id
    }

    /// The declaring type, if it is still alive.
    pub fn owner(&self) -> Option<Type> {
        match &self.owner {
            OwnerRef::Object => Some(Type::Object),
            OwnerRef::Class(class) => class.upgrade().map(Type::Class),
            OwnerRef::Interface(interface) => interface.upgrade().map(Type::Interface),
        }
    }

    /// A method can be invoked from outside its owner only when both the
    /// method and the owner are public.
    pub fn is_accessible(&self) -> bool {
        self.access_violation().is_none()
    }

    /// What prevents invoking this method from outside its owner.
    pub fn access_violation(&self) -> Option<AccessViolation> {
        if self.visibility != Visibility::Public {
            Some(AccessViolation::PrivateMethod(self.name.clone()))
        } else if !self.owner_public {
            Some(AccessViolation::PrivateOwner(self.owner_name.clone()))
        } else {
            None
        }
    }

    /// Same name and same parameter types.
    pub fn same_shape(&self, other: &Method) -> bool {
        self.name == other.name && self.params == other.params
    }

    /// Whether this is the `Object` protocol's `equals(Object) -> boolean`.
    pub fn is_object_equals(&self) -> bool {
        self.owner_id == DefId::OBJECT
            && self.name == "equals"
            && self.params == [Type::Object]
            && self.ret == Type::boolean()
    }

    /// Human readable signature such as `Duck.quack(int) -> String`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(Type::name).collect();
        format!(
            "{}.{}({}) -> {}",
            self.owner_name,
            self.name,
            params.join(", "),
            self.ret
        )
    }

    /// Invoke this method on `receiver`, selecting the most derived body.
    pub fn invoke(self: &Arc<Self>, receiver: &Value, args: &[Value]) -> QuackResult<Value> {
        if let Some(reason) = self.access_violation() {
            return Err(QuackError::InaccessibleMember {
                signature: self.signature(),
                target: receiver.to_string(),
                reason,
            });
        }

        if receiver.is_null() {
            return Err(QuackError::invalid(format!(
                "cannot invoke {} on null",
                self.signature()
            )));
        }

        if args.len() != self.arity() {
            return Err(QuackError::invalid(format!(
                "{} expects {} argument(s), got {}",
                self.signature(),
                self.arity(),
                args.len()
            )));
        }

        if let Value::Duck(duck) = receiver {
            return duck.invoke(self, args);
        }

        match receiver.virtual_body(self) {
            Some(body) => body(receiver, args),
            None => Err(QuackError::UnsupportedDispatch {
                method: self.name.clone(),
                signature: self.signature(),
            }),
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signature())
    }
}

/// A method before it is attached to its owner.
struct MethodSpec {
    name: String,
    params: Vec<Type>,
    ret: Type,
    visibility: Visibility,
    body: Option<MethodBody>,
}

impl MethodSpec {
    fn attach(
        self,
        owner: OwnerRef,
        owner_id: DefId,
        owner_name: &str,
        owner_public: bool,
    ) -> Arc<Method> {
        Arc::new(Method {
            id: DefId::fresh(),
            name: self.name,
            owner,
            owner_id,
            owner_name: owner_name.to_string(),
            owner_public,
            params: self.params,
            ret: self.ret,
            visibility: self.visibility,
            body: self.body,
        })
    }
}

/// The methods every value answers: `equals`, `hashCode` and `toString`.
pub fn object_methods() -> &'static [Arc<Method>] {
    static METHODS: OnceLock<Vec<Arc<Method>>> = OnceLock::new();
    METHODS.get_or_init(|| {
        let specs = vec![
            MethodSpec {
                name: "equals".to_string(),
                params: vec![Type::Object],
                ret: Type::boolean(),
                visibility: Visibility::Public,
                body: Some(Arc::new(|this: &Value, args: &[Value]| {
                    Ok(Value::Bool(args.first().is_some_and(|other| this == other)))
                })),
            },
            MethodSpec {
                name: "hashCode".to_string(),
                params: Vec::new(),
                ret: Type::int(),
                visibility: Visibility::Public,
                body: Some(Arc::new(|this: &Value, _: &[Value]| {
                    Ok(Value::Int(this.identity_hash()))
                })),
            },
            MethodSpec {
                name: "toString".to_string(),
                params: Vec::new(),
                ret: Type::string(),
                visibility: Visibility::Public,
                body: Some(Arc::new(|this: &Value, _: &[Value]| Ok(Value::from(this.to_string())))),
            },
        ];

        specs
            .into_iter()
            .map(|spec| spec.attach(OwnerRef::Object, DefId::OBJECT, "Object", true))
            .collect()
    })
}

/// A class with single inheritance.
pub struct Class {
    id: DefId,
    name: String,
    /// Direct superclass. `None` means the class extends `Object`.
    superclass: Option<Arc<Class>>,
    interfaces: Vec<Arc<Interface>>,
    methods: Vec<Arc<Method>>,
    producer: Option<Arc<dyn Producer>>,
}

impl Class {
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            name: name.into(),
            superclass: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            producer: None,
        }
    }

    /// The builtin `String` class.
    pub fn string() -> &'static Arc<Class> {
        static STRING: OnceLock<Arc<Class>> = OnceLock::new();
        STRING.get_or_init(|| {
            Class::builder("String")
                .method("length", [], Type::int(), |this, _| {
                    let len = this.as_str().map_or(0, |s| s.chars().count());
                    Ok(Value::Int(i32::try_from(len).unwrap_or(i32::MAX)))
                })
                .method("isEmpty", [], Type::boolean(), |this, _| {
                    Ok(Value::Bool(this.as_str().map_or(true, str::is_empty)))
                })
                .method("charAt", [Type::int()], Type::primitive(PrimitiveTy::Char), |this, args| {
                    let index = args.first().and_then(Value::as_int).unwrap_or(-1);
                    usize::try_from(index)
                        .ok()
                        .and_then(|index| this.as_str()?.chars().nth(index))
                        .map(Value::Char)
                        .ok_or_else(|| {
                            QuackError::raise(format!("String index out of range: {}", index))
                        })
                })
                .build()
        })
    }

    pub fn def_id(&self) -> DefId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn superclass(&self) -> Option<&Arc<Class>> {
        self.superclass.as_ref()
    }

    /// Interfaces declared directly on this class.
    pub fn interfaces(&self) -> &[Arc<Interface>] {
        &self.interfaces
    }

    /// Methods declared directly on this class.
    pub fn methods(&self) -> &[Arc<Method>] {
        &self.methods
    }

    pub fn producer(&self) -> Option<&Arc<dyn Producer>> {
        self.producer.as_ref()
    }

    /// This class followed by its superclasses, most derived first.
    pub fn ancestors(&self) -> impl Iterator<Item = &Class> {
        std::iter::successors(Some(self), |class| class.superclass().map(|parent| parent.as_ref()))
    }

    /// Every interface implemented by this class or an ancestor, including
    /// super-interfaces, without duplicates.
    pub fn all_interfaces(&self) -> Vec<Arc<Interface>> {
        let mut seen = FxHashSet::default();
        let mut result = Vec::new();
        let mut pending: Vec<Arc<Interface>> = Vec::new();

        for class in self.ancestors() {
            pending.extend(class.interfaces.iter().rev().cloned());
            while let Some(interface) = pending.pop() {
                if seen.insert(interface.def_id()) {
                    pending.extend(interface.extends().iter().rev().cloned());
                    result.push(interface);
                }
            }
        }

        result
    }

    pub fn implements(&self, interface: &Interface) -> bool {
        self.ancestors().any(|class| {
            class
                .interfaces
                .iter()
                .any(|declared| declared.is_subinterface_of(interface))
        })
    }

    /// Public methods callable on instances of this class.
    ///
    /// The class chain comes first and overrides hide what they override,
    /// then inherited default methods, then the `Object` protocol.
    pub fn public_methods(&self) -> Vec<Arc<Method>> {
        let mut result: Vec<Arc<Method>> = Vec::new();
        let mut push = |method: &Arc<Method>| {
            if !result.iter().any(|known| known.same_shape(method)) {
                result.push(method.clone());
            }
        };

        for class in self.ancestors() {
            class
                .methods
                .iter()
                .filter(|method| method.visibility == Visibility::Public)
                .for_each(&mut push);
        }

        for interface in self.all_interfaces() {
            interface
                .all_methods()
                .iter()
                .filter(|method| method.has_body())
                .for_each(&mut push);
        }

        object_methods().iter().for_each(&mut push);
        result
    }

    /// Find the body that runs when `method` is invoked on an instance.
    pub fn resolve_virtual(&self, method: &Method) -> Option<MethodBody> {
        let declared = self
            .ancestors()
            .flat_map(|class| class.methods.iter())
            .find(|m| m.visibility == Visibility::Public && m.has_body() && m.same_shape(method));
        if let Some(found) = declared {
            return found.body.clone();
        }

        let inherited = self.all_interfaces().into_iter().find_map(|interface| {
            interface
                .all_methods()
                .into_iter()
                .find(|m| m.has_body() && m.same_shape(method))
        });
        if let Some(found) = inherited {
            return found.body.clone();
        }

        method.body.clone()
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("superclass", &self.superclass.as_ref().map(|c| c.name()))
            .field("methods", &self.methods)
            .finish()
    }
}

/// Builder for [`Class`].
pub struct ClassBuilder {
    name: String,
    superclass: Option<Arc<Class>>,
    interfaces: Vec<Arc<Interface>>,
    methods: Vec<MethodSpec>,
    producer: Option<Arc<dyn Producer>>,
}

impl ClassBuilder {
    pub fn extends(mut self, parent: &Arc<Class>) -> Self {
        self.superclass = Some(parent.clone());
        self
    }

    pub fn implements(mut self, interface: &Arc<Interface>) -> Self {
        self.interfaces.push(interface.clone());
        self
    }

    /// Declare a public method.
    pub fn method<F>(
        mut self,
        name: impl Into<String>,
        params: impl IntoIterator<Item = Type>,
        ret: Type,
        body: F,
    ) -> Self
    where
        F: Fn(&Value, &[Value]) -> QuackResult<Value> + Send + Sync + 'static,
    {
        self.methods.push(MethodSpec {
            name: name.into(),
            params: params.into_iter().collect(),
            ret,
            visibility: Visibility::Public,
            body: Some(Arc::new(body)),
        });
        self
    }

    /// Declare a private method. It is never found by the dispatcher.
    pub fn private_method<F>(
        mut self,
        name: impl Into<String>,
        params: impl IntoIterator<Item = Type>,
        ret: Type,
        body: F,
    ) -> Self
    where
        F: Fn(&Value, &[Value]) -> QuackResult<Value> + Send + Sync + 'static,
    {
        self.methods.push(MethodSpec {
            name: name.into(),
            params: params.into_iter().collect(),
            ret,
            visibility: Visibility::Private,
            body: Some(Arc::new(body)),
        });
        self
    }

    /// Attach a producer. Mixing an instance of this class mixes whatever
    /// the producer returns instead.
    pub fn producer<F>(mut self, producer: F) -> Self
    where
        F: Fn(&Value, &Mixin) -> QuackResult<Value> + Send + Sync + 'static,
    {
        self.producer = Some(Arc::new(producer));
        self
    }

    pub fn build(self) -> Arc<Class> {
        let id = DefId::fresh();
        let ClassBuilder {
            name,
            superclass,
            interfaces,
            methods,
            producer,
        } = self;

        Arc::new_cyclic(|weak| Class {
            id,
            methods: methods
                .into_iter()
                .map(|spec| spec.attach(OwnerRef::Class(weak.clone()), id, &name, true))
                .collect(),
            name,
            superclass,
            interfaces,
            producer,
        })
    }
}

/// An interface with multiple inheritance and optional default bodies.
pub struct Interface {
    id: DefId,
    name: String,
    public: bool,
    extends: Vec<Arc<Interface>>,
    methods: Vec<Arc<Method>>,
}

impl Interface {
    pub fn builder(name: impl Into<String>) -> InterfaceBuilder {
        InterfaceBuilder {
            name: name.into(),
            public: true,
            extends: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn def_id(&self) -> DefId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub fn extends(&self) -> &[Arc<Interface>] {
        &self.extends
    }

    /// Methods declared directly on this interface.
    pub fn methods(&self) -> &[Arc<Method>] {
        &self.methods
    }

    /// Declared methods followed by inherited ones. A redeclaration hides
    /// the inherited method with the same shape.
    pub fn all_methods(&self) -> Vec<Arc<Method>> {
        let mut result: Vec<Arc<Method>> = self.methods.clone();
        for parent in &self.extends {
            for method in parent.all_methods() {
                if !result.iter().any(|known| known.same_shape(&method)) {
                    result.push(method);
                }
            }
        }
        result
    }

    /// First method with the given name, declared or inherited.
    pub fn method(&self, name: &str) -> Option<Arc<Method>> {
        self.all_methods().into_iter().find(|method| method.name() == name)
    }

    pub fn is_subinterface_of(&self, other: &Interface) -> bool {
        self.id == other.id || self.extends.iter().any(|parent| parent.is_subinterface_of(other))
    }

    pub fn as_type(self: &Arc<Self>) -> Type {
        Type::Interface(self.clone())
    }
}

impl fmt::Debug for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interface")
            .field("name", &self.name)
            .field("public", &self.public)
            .field("methods", &self.methods)
            .finish()
    }
}

/// Builder for [`Interface`].
pub struct InterfaceBuilder {
    name: String,
    public: bool,
    extends: Vec<Arc<Interface>>,
    methods: Vec<MethodSpec>,
}

impl InterfaceBuilder {
    /// Mark the interface as package private. Its methods become
    /// inaccessible from outside.
    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn extends(mut self, parent: &Arc<Interface>) -> Self {
        self.extends.push(parent.clone());
        self
    }

    /// Declare an abstract method.
    pub fn method(
        mut self,
        name: impl Into<String>,
        params: impl IntoIterator<Item = Type>,
        ret: Type,
    ) -> Self {
        self.methods.push(MethodSpec {
            name: name.into(),
            params: params.into_iter().collect(),
            ret,
            visibility: Visibility::Public,
            body: None,
        });
        self
    }

    /// Declare a method with a default body.
    pub fn default_method<F>(
        mut self,
        name: impl Into<String>,
        params: impl IntoIterator<Item = Type>,
        ret: Type,
        body: F,
    ) -> Self
    where
        F: Fn(&Value, &[Value]) -> QuackResult<Value> + Send + Sync + 'static,
    {
        self.methods.push(MethodSpec {
            name: name.into(),
            params: params.into_iter().collect(),
            ret,
            visibility: Visibility::Public,
            body: Some(Arc::new(body)),
        });
        self
    }

    pub fn build(self) -> Arc<Interface> {
        let id = DefId::fresh();
        let InterfaceBuilder {
            name,
            public,
            extends,
            methods,
        } = self;

        Arc::new_cyclic(|weak| Interface {
            id,
            methods: methods
                .into_iter()
                .map(|spec| spec.attach(OwnerRef::Interface(weak.clone()), id, &name, public))
                .collect(),
            name,
            public,
            extends,
        })
    }
}
