//! The composition registry.
//!
//! A [`Mixin`] owns an ordered list of mixed objects and routes every call
//! made on the ducks it hands out. For a method declared by interface `I`
//! the candidates are, in order:
//!
//! 1. the object preferred for `I`, if any
//! 2. every mixed object in insertion order
//!
//! The first candidate resolving the call wins, and the resolution is
//! cached on that candidate.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::config::{InaccessiblePolicy, MixinConfig};
use crate::duck::{Duck, DuckType};
use crate::error::{QuackError, QuackResult};
use crate::invocation::{CallShape, Invocation};
use crate::matcher::DuckMatcher;
use crate::mixed::{Mixed, MixedRef};
use crate::object::{DefId, Method, Type, Value};

/// Replaces an object when it is mixed.
///
/// Classes declaring a producer are never mixed themselves. The producer
/// receives the object and the mixin, and whatever it returns is mixed
/// instead.
pub trait Producer: Send + Sync {
    fn produce(&self, this: &Value, mixin: &Mixin) -> QuackResult<Value>;
}

impl<F> Producer for F
where
    F: Fn(&Value, &Mixin) -> QuackResult<Value> + Send + Sync,
{
    fn produce(&self, this: &Value, mixin: &Mixin) -> QuackResult<Value> {
        self(this, mixin)
    }
}

#[derive(Default)]
struct MixinState {
    mixed: Vec<Arc<Mixed>>,
    preferred: FxHashMap<DefId, Arc<Mixed>>,
}

struct MixinInner {
    config: MixinConfig,
    state: RwLock<MixinState>,
}

/// A set of objects usable together as any interface they jointly
/// implement.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone)]
pub struct Mixin {
    inner: Arc<MixinInner>,
}

impl Mixin {
    pub fn new() -> Self {
        Self::with_config(MixinConfig::default())
    }

    pub fn with_config(config: MixinConfig) -> Self {
        Mixin {
            inner: Arc::new(MixinInner {
                config,
                state: RwLock::new(MixinState::default()),
            }),
        }
    }

    pub fn config(&self) -> &MixinConfig {
        &self.inner.config
    }

    /// Register an object.
    ///
    /// When the object's class declares a producer, the produced value is
    /// registered instead. The producer runs without any lock held, so it
    /// may use the mixin freely.
    pub fn mix(&self, value: impl Into<Value>) -> QuackResult<MixedRef> {
        let origin = value.into();
        if origin.is_null() {
            return Err(QuackError::invalid("cannot mix null"));
        }

        let instance = match origin.producer() {
            Some(producer) => {
                let produced = producer.produce(&origin, self)?;
                if produced.is_null() {
                    return Err(QuackError::UnsatisfiedProducer {
                        producer: origin.to_string(),
                    });
                }
                produced
            }
            None => origin.clone(),
        };

        let mixed = {
            let mut state = self.inner.state.write();
            let mixed = Arc::new(Mixed::new(state.mixed.len(), instance, origin));
            state.mixed.push(mixed.clone());
            mixed
        };

        debug!(index = mixed.index(), instance = %mixed.instance(), "mixed");
        Ok(MixedRef::new(self.clone(), mixed))
    }

    pub fn len(&self) -> usize {
        self.inner.state.read().mixed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.read().mixed.is_empty()
    }

    /// Mixed objects in insertion order.
    pub fn mixed(&self) -> Vec<Arc<Mixed>> {
        self.inner.state.read().mixed.clone()
    }

    /// The object preferred for `interface`, if any.
    pub fn preferred_for(&self, interface: &Type) -> Option<Arc<Mixed>> {
        let id = interface.as_interface()?.def_id();
        self.inner.state.read().preferred.get(&id).cloned()
    }

    pub(crate) fn prefer(&self, mixed: &Arc<Mixed>, interface: &Type) -> QuackResult<()> {
        let interface = interface.as_interface().ok_or_else(|| {
            QuackError::invalid(format!(
                "an interface must be used, cannot prefer an object for `{}`",
                interface
            ))
        })?;

        mixed.add_preference(interface.def_id());
        self.inner
            .state
            .write()
            .preferred
            .insert(interface.def_id(), mixed.clone());
        debug!(interface = interface.name(), index = mixed.index(), "preferring");
        Ok(())
    }

    /// Candidates for a method declared by `owner`, in resolution order.
    fn candidates(&self, owner: DefId) -> Vec<Arc<Mixed>> {
        let state = self.inner.state.read();
        let preferred = state.preferred.get(&owner);

        let mut candidates = Vec::with_capacity(state.mixed.len() + 1);
        candidates.extend(preferred.cloned());
        let listed_again = |mixed: &&Arc<Mixed>| {
            self.inner.config.duplicate_preferred
                || preferred.map_or(true, |first| !Arc::ptr_eq(first, mixed))
        };
        candidates.extend(state.mixed.iter().filter(listed_again).cloned());
        candidates
    }

    /// The objects consulted, in order, for methods declared by `interface`.
    pub fn instances_for(&self, interface: &Type) -> Vec<Value> {
        let owner = interface.def_id().unwrap_or(DefId::OBJECT);
        self.candidates(owner)
            .iter()
            .map(|mixed| mixed.instance().clone())
            .collect()
    }

    /// Whether the mixed objects jointly implement `ty`. Always false for
    /// anything but an interface.
    pub fn is(&self, ty: &Type) -> bool {
        let Some(interface) = ty.as_interface() else {
            return false;
        };

        let mut matcher = DuckMatcher::for_interface(interface);
        for mixed in self.candidates(interface.def_id()) {
            matcher.feed(mixed.instance());
        }
        matcher.is_duck()
    }

    /// A duck implementing `ty` backed by this mixin, or `None` when
    /// nothing is mixed.
    pub fn as_interface(&self, ty: &Type) -> QuackResult<Option<Duck>> {
        let interface = ty.as_interface().ok_or_else(|| {
            QuackError::invalid(format!("an interface must be used, cannot implement `{}`", ty))
        })?;

        if self.is_empty() {
            return Ok(None);
        }
        Ok(Some(Duck::new(interface.clone(), self.clone())))
    }

    /// Route a call of `method` to the first candidate implementing it.
    pub(crate) fn dispatch(&self, method: &Arc<Method>, args: &[Value]) -> QuackResult<Value> {
        let shape = CallShape::of(method, args);

        for mixed in self.candidates(method.owner_id()) {
            let invocation = match self.invocation_for(&mixed, method, &shape) {
                Some(invocation) => invocation,
                None => {
                    trace!(
                        method = method.name(),
                        index = mixed.index(),
                        "candidate does not match"
                    );
                    continue;
                }
            };

            if let Some(reason) = invocation.method().access_violation() {
                match self.inner.config.inaccessible {
                    InaccessiblePolicy::Skip => {
                        warn!(
                            method = %invocation.method().signature(),
                            index = mixed.index(),
                            %reason,
                            "skipping inaccessible method"
                        );
                        continue;
                    }
                    InaccessiblePolicy::Fail => {
                        return Err(QuackError::InaccessibleMember {
                            signature: invocation.method().signature(),
                            target: mixed.instance().to_string(),
                            reason,
                        });
                    }
                }
            }

            return invocation.proceed(args);
        }

        Err(QuackError::UnsupportedDispatch {
            method: method.name().to_string(),
            signature: method.signature(),
        })
    }

    fn invocation_for(
        &self,
        mixed: &Mixed,
        method: &Arc<Method>,
        shape: &CallShape,
    ) -> Option<Arc<Invocation>> {
        if let Some(cached) = mixed.cached(shape) {
            trace!(method = method.name(), index = mixed.index(), "cache hit");
            return Some(cached);
        }

        let invocation = Arc::new(mixed.resolve(method, &shape.args)?);
        debug!(
            method = %method.signature(),
            resolved = %invocation.method().signature(),
            index = mixed.index(),
            "resolved"
        );
        if self.inner.config.cache_invocations {
            mixed.cache(shape.clone(), invocation.clone());
        }
        Some(invocation)
    }

    /// A handle that does not keep the mixin alive.
    pub fn downgrade(&self) -> WeakMixin {
        WeakMixin {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Whether both handles refer to the same registry.
    pub fn ptr_eq(&self, other: &Mixin) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Mixin {
    fn default() -> Self {
        Self::new()
    }
}

impl DuckType for Mixin {
    fn is(&self, ty: &Type) -> bool {
        Mixin::is(self, ty)
    }

    fn as_interface(&self, ty: &Type) -> QuackResult<Option<Duck>> {
        Mixin::as_interface(self, ty)
    }
}

impl fmt::Debug for Mixin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mixin")
            .field("config", &self.inner.config)
            .field("mixed", &self.len())
            .finish()
    }
}

/// Non-owning handle to a [`Mixin`].
///
/// Objects that keep a reference to the mixin they are part of hold this
/// one, so the mixin and its objects can be dropped.
#[derive(Clone)]
pub struct WeakMixin {
    inner: Weak<MixinInner>,
}

impl WeakMixin {
    pub fn upgrade(&self) -> Option<Mixin> {
        self.inner.upgrade().map(|inner| Mixin { inner })
    }
}

impl fmt::Debug for WeakMixin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakMixin(alive: {})", self.inner.strong_count() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Class, Interface};

    fn speaker() -> Arc<Interface> {
        Interface::builder("Speaker")
            .method("speak", [], Type::string())
            .build()
    }

    fn talker(name: &'static str, says: &'static str) -> Value {
        let class = Class::builder(name)
            .method("speak", [], Type::string(), move |_, _| Ok(says.into()))
            .build();
        Value::object(&class, ())
    }

    #[test]
    fn test_mix_rejects_null() {
        let mixin = Mixin::new();
        let err = mixin.mix(Value::Null).unwrap_err();
        assert!(matches!(err, QuackError::InvalidArgument(_)));
        assert!(mixin.is_empty());
    }

    #[test]
    fn test_preferred_candidate_appears_twice() {
        let speaker = speaker();
        let mixin = Mixin::new();
        mixin.mix(talker("A", "a")).unwrap();
        mixin
            .mix(talker("B", "b"))
            .unwrap()
            .preferring(&speaker.as_type())
            .unwrap();

        let candidates = mixin.instances_for(&speaker.as_type());
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0], candidates[2]);
    }

    #[test]
    fn test_preferred_candidate_once_when_configured() {
        let speaker = speaker();
        let config = MixinConfig {
            duplicate_preferred: false,
            ..MixinConfig::default()
        };
        let mixin = Mixin::with_config(config);
        mixin.mix(talker("A", "a")).unwrap();
        let b = mixin.mix(talker("B", "b")).unwrap().preferring(&speaker.as_type()).unwrap();

        let candidates = mixin.instances_for(&speaker.as_type());
        assert_eq!(candidates.len(), 2);
        assert_eq!(&candidates[0], b.instance());
        assert!(b.has_preference_for(speaker.def_id()));
    }

    #[test]
    fn test_preferring_requires_interface() {
        let mixin = Mixin::new();
        let class = Class::builder("Egg").build();
        let err = mixin
            .mix(talker("A", "a"))
            .unwrap()
            .preferring(&Type::Class(class))
            .unwrap_err();
        assert!(matches!(err, QuackError::InvalidArgument(_)));
    }

    #[test]
    fn test_producer_returning_null_is_unsatisfied() {
        let lazy = Class::builder("LazyProducer")
            .producer(|_, _| Ok(Value::Null))
            .build();
        let mixin = Mixin::new();
        let err = mixin.mix(Value::object(&lazy, ())).unwrap_err();
        assert!(matches!(err, QuackError::UnsatisfiedProducer { .. }));
        assert!(mixin.is_empty());
    }

    #[test]
    fn test_dispatch_caches_per_shape() {
        let speaker = speaker();
        let mixin = Mixin::new();
        let a = mixin.mix(talker("A", "a")).unwrap();

        let speak = speaker.method("speak").unwrap();
        assert_eq!(mixin.dispatch(&speak, &[]).unwrap(), Value::from("a"));
        assert_eq!(mixin.dispatch(&speak, &[]).unwrap(), Value::from("a"));
        assert_eq!(a.cached_len(), 1);
    }

    #[test]
    fn test_dispatch_without_cache() {
        let speaker = speaker();
        let config = MixinConfig {
            cache_invocations: false,
            ..MixinConfig::default()
        };
        let mixin = Mixin::with_config(config);
        let a = mixin.mix(talker("A", "a")).unwrap();

        let speak = speaker.method("speak").unwrap();
        assert_eq!(mixin.dispatch(&speak, &[]).unwrap(), Value::from("a"));
        assert_eq!(a.cached_len(), 0);
    }

    #[test]
    fn test_weak_mixin_does_not_keep_registry_alive() {
        let mixin = Mixin::new();
        let weak = mixin.downgrade();
        assert!(weak.upgrade().is_some_and(|strong| strong.ptr_eq(&mixin)));
        drop(mixin);
        assert!(weak.upgrade().is_none());
    }
}
