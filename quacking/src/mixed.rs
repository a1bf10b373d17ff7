//! Mixed objects and their per-method configuration.
//!
//! A [`Mixed`] wraps one object registered in a [`Mixin`]. Besides the
//! object it keeps:
//!
//! - the interfaces the object is preferred for
//! - a configuration per call name: rename target, curry template and wing
//! - a cache of resolved invocations per call shape
//!
//! Cached invocations are never invalidated. A configuration change made
//! after a call shape was first resolved does not affect that shape.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::dispatch::{find_method, MethodQuery};
use crate::error::{QuackError, QuackResult};
use crate::invocation::{CallShape, Invocation, Wing};
use crate::mixin::Mixin;
use crate::object::{DefId, Method, Type, Value};

/// One slot of a curry template.
#[derive(Debug, Clone)]
pub enum CurryArg {
    /// A constant passed on every call.
    Value(Value),
    /// Filled with the next call argument.
    Hole,
}

impl From<Value> for CurryArg {
    fn from(value: Value) -> Self {
        CurryArg::Value(value)
    }
}

impl From<i32> for CurryArg {
    fn from(value: i32) -> Self {
        CurryArg::Value(Value::Int(value))
    }
}

impl From<&str> for CurryArg {
    fn from(value: &str) -> Self {
        CurryArg::Value(Value::from(value))
    }
}

/// Constants and holes spliced in front of the call arguments.
#[derive(Debug, Clone)]
pub struct CurryTemplate {
    types: Vec<Type>,
    args: Vec<CurryArg>,
}

impl CurryTemplate {
    pub fn new(types: Vec<Type>, args: Vec<CurryArg>) -> QuackResult<Self> {
        if types.len() != args.len() {
            return Err(QuackError::invalid(format!(
                "curry needs one type per argument, got {} type(s) and {} argument(s)",
                types.len(),
                args.len()
            )));
        }
        Ok(CurryTemplate { types, args })
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    pub fn args(&self) -> &[CurryArg] {
        &self.args
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn holes(&self) -> usize {
        self.args.iter().filter(|arg| matches!(arg, CurryArg::Hole)).count()
    }

    /// Parameter types to look up: the template types, then the interface
    /// parameters not consumed by holes.
    pub fn lookup_types(&self, interface_params: &[Type]) -> Option<Vec<Type>> {
        let rest = interface_params.get(self.holes()..)?;
        Some(self.types.iter().chain(rest).cloned().collect())
    }

    /// Runtime types of the merged arguments.
    pub fn concrete_types(&self, call_args: &[Option<Type>]) -> Option<Vec<Option<Type>>> {
        self.splice(call_args, |arg| arg.runtime_type())
    }

    /// Merge the template with the call arguments. Holes take the call
    /// arguments in order and the leftover ones are appended.
    pub fn merge(&self, call_args: &[Value]) -> Option<Vec<Value>> {
        self.splice(call_args, Value::clone)
    }

    fn splice<T: Clone>(&self, call_args: &[T], constant: impl Fn(&Value) -> T) -> Option<Vec<T>> {
        let mut call_args = call_args.iter();
        let mut merged = Vec::with_capacity(self.args.len() + call_args.len());
        for arg in &self.args {
            match arg {
                CurryArg::Value(value) => merged.push(constant(value)),
                CurryArg::Hole => merged.push(call_args.next()?.clone()),
            }
        }
        merged.extend(call_args.cloned());
        Some(merged)
    }
}

/// Configuration of one call name.
#[derive(Clone, Default)]
pub struct MethodConfig {
    rename: Option<String>,
    curry: Option<CurryTemplate>,
    wing: Option<Arc<dyn Wing>>,
}

impl MethodConfig {
    pub fn is_renamed(&self) -> bool {
        self.rename.is_some()
    }

    pub fn rename(&self) -> Option<&str> {
        self.rename.as_deref()
    }

    pub fn is_curried(&self) -> bool {
        self.curry.as_ref().is_some_and(|template| !template.is_empty())
    }

    pub fn curry(&self) -> Option<&CurryTemplate> {
        self.curry.as_ref().filter(|template| !template.is_empty())
    }

    pub fn is_wrapped(&self) -> bool {
        self.wing.is_some()
    }

    pub fn wing(&self) -> Option<&Arc<dyn Wing>> {
        self.wing.as_ref()
    }
}

impl fmt::Debug for MethodConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodConfig")
            .field("rename", &self.rename)
            .field("curry", &self.curry)
            .field("wrapped", &self.is_wrapped())
            .finish()
    }
}

/// An object registered in a mixin.
pub struct Mixed {
    index: usize,
    /// The object calls are routed to.
    instance: Value,
    /// The value passed to `mix`. Differs from `instance` when a producer ran.
    origin: Value,
    preferred: RwLock<FxHashSet<DefId>>,
    configs: RwLock<IndexMap<String, MethodConfig>>,
    cache: Mutex<FxHashMap<CallShape, Arc<Invocation>>>,
}

impl Mixed {
    pub(crate) fn new(index: usize, instance: Value, origin: Value) -> Self {
        Mixed {
            index,
            instance,
            origin,
            preferred: RwLock::new(FxHashSet::default()),
            configs: RwLock::new(IndexMap::new()),
            cache: Mutex::new(FxHashMap::default()),
        }
    }

    /// Insertion position in the registry.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn instance(&self) -> &Value {
        &self.instance
    }

    pub fn origin(&self) -> &Value {
        &self.origin
    }

    pub fn has_preference_for(&self, interface: DefId) -> bool {
        self.preferred.read().contains(&interface)
    }

    pub fn has_configuration_for(&self, call_name: &str) -> bool {
        self.configs.read().contains_key(call_name)
    }

    pub fn configuration_for(&self, call_name: &str) -> Option<MethodConfig> {
        self.configs.read().get(call_name).cloned()
    }

    /// Configured call names, in the order they were first configured.
    pub fn configured_names(&self) -> Vec<String> {
        self.configs.read().keys().cloned().collect()
    }

    pub(crate) fn add_preference(&self, interface: DefId) {
        self.preferred.write().insert(interface);
    }

    fn configure(&self, call_name: &str, update: impl FnOnce(&mut MethodConfig)) {
        let mut configs = self.configs.write();
        update(configs.entry(call_name.to_string()).or_default());
    }

    /// Resolve `method` against this object for the given argument types.
    ///
    /// Applies the configuration of the call name. `None` means the object
    /// does not implement the method for this shape.
    pub fn resolve(&self, method: &Arc<Method>, arg_types: &[Option<Type>]) -> Option<Invocation> {
        let config = self.configuration_for(method.name()).unwrap_or_default();
        let name = config.rename().unwrap_or(method.name());

        let (lookup_types, concrete) = match config.curry() {
            Some(template) => (
                template.lookup_types(method.params())?,
                template.concrete_types(arg_types)?,
            ),
            None => (method.params().to_vec(), arg_types.to_vec()),
        };

        let query = MethodQuery {
            method,
            name,
            param_types: &lookup_types,
            args: &concrete,
            exact_match: !config.is_renamed() && !config.is_curried(),
        };

        let found = find_method(&self.instance, &query)?;
        if found.arity() != lookup_types.len() {
            trace!(method = %found.signature(), "curried arity mismatch");
            return None;
        }

        Some(Invocation::new(
            self.instance.clone(),
            config.wing().cloned(),
            found,
            config.curry().cloned(),
        ))
    }

    pub(crate) fn cached(&self, shape: &CallShape) -> Option<Arc<Invocation>> {
        self.cache.lock().get(shape).cloned()
    }

    pub(crate) fn cache(&self, shape: CallShape, invocation: Arc<Invocation>) {
        self.cache.lock().insert(shape, invocation);
    }

    /// Number of cached call shapes.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }
}

impl fmt::Debug for Mixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mixed")
            .field("index", &self.index)
            .field("instance", &self.instance)
            .field("configured", &self.configured_names())
            .finish()
    }
}

/// Handle returned by [`Mixin::mix`] to configure the mixed object.
///
/// Every method is last-write-wins and returns the handle for chaining.
#[derive(Debug, Clone)]
pub struct MixedRef {
    mixin: Mixin,
    mixed: Arc<Mixed>,
}

impl MixedRef {
    pub(crate) fn new(mixin: Mixin, mixed: Arc<Mixed>) -> Self {
        MixedRef { mixin, mixed }
    }

    pub fn mixed(&self) -> &Arc<Mixed> {
        &self.mixed
    }

    /// Route calls to `call_name` to the method named `target_name`.
    pub fn rename(self, call_name: &str, target_name: &str) -> QuackResult<Self> {
        check_name(call_name)?;
        check_name(target_name)?;
        debug!(call = call_name, target = target_name, "rename");
        self.mixed
            .configure(call_name, |config| config.rename = Some(target_name.to_string()));
        Ok(self)
    }

    /// Splice constants in front of the arguments of `call_name`.
    pub fn curry(
        self,
        call_name: &str,
        types: impl IntoIterator<Item = Type>,
        args: impl IntoIterator<Item = CurryArg>,
    ) -> QuackResult<Self> {
        check_name(call_name)?;
        let template = CurryTemplate::new(types.into_iter().collect(), args.into_iter().collect())?;
        debug!(call = call_name, slots = template.len(), holes = template.holes(), "curry");
        self.mixed
            .configure(call_name, |config| config.curry = Some(template));
        Ok(self)
    }

    /// Run `wing` in place of direct calls to `call_name`.
    pub fn around<F>(self, call_name: &str, wing: F) -> QuackResult<Self>
    where
        F: Fn(&Value, &Arc<Method>, &[Value]) -> QuackResult<Value> + Send + Sync + 'static,
    {
        self.around_with(call_name, Arc::new(wing))
    }

    pub fn around_with(self, call_name: &str, wing: Arc<dyn Wing>) -> QuackResult<Self> {
        check_name(call_name)?;
        debug!(call = call_name, "around");
        self.mixed.configure(call_name, |config| config.wing = Some(wing));
        Ok(self)
    }

    /// Try this object first for calls declared by `interface`.
    pub fn preferring(self, interface: &Type) -> QuackResult<Self> {
        self.mixin.prefer(&self.mixed, interface)?;
        Ok(self)
    }
}

impl Deref for MixedRef {
    type Target = Mixed;

    fn deref(&self) -> &Mixed {
        &self.mixed
    }
}

fn check_name(name: &str) -> QuackResult<()> {
    if name.is_empty() {
        return Err(QuackError::invalid("method names cannot be empty"));
    }
    Ok(())
}
