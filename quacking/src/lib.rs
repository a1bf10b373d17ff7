//! Quacking: duck typing by composition
//!
//! This crate lets unrelated objects be used together as an implementation
//! of any interface they jointly satisfy, even when none of them implements
//! it alone. Calls made on the synthesized instance are routed at call time
//! to whichever object exposes a structurally compatible method:
//!
//! - Same name and arity
//! - Compatible parameter types, including boxing equivalence
//! - Compatible return type
//!
//! Objects can be configured per call name: renamed, curried with constant
//! arguments, or wrapped by an interceptor.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐ invoke ┌─────────┐ candidates ┌─────────┐ find ┌──────────┐
//! │   Duck   │───────►│  Mixin  │───────────►│  Mixed  │─────►│ dispatch │
//! └──────────┘        └─────────┘            └─────────┘      └──────────┘
//!                                                 │ cache
//!                                                 ▼
//!                                           ┌────────────┐
//!                                           │ Invocation │
//!                                           └────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use quacking::{Class, Interface, Mixin, Type, Value};
//!
//! let speaker = Interface::builder("Speaker")
//!     .method("speak", [], Type::string())
//!     .build();
//! let quacker = Class::builder("Quacker")
//!     .method("speak", [], Type::string(), |_, _| Ok("quack".into()))
//!     .build();
//!
//! let mixin = Mixin::new();
//! mixin.mix(Value::object(&quacker, ())).unwrap();
//! assert!(mixin.is(&speaker.as_type()));
//!
//! let duck = mixin.as_interface(&speaker.as_type()).unwrap().unwrap();
//! assert_eq!(duck.call("speak", &[]).unwrap(), Value::from("quack"));
//! ```

pub mod config;
pub mod dispatch;
pub mod duck;
pub mod error;
pub mod invocation;
pub mod matcher;
pub mod mixed;
pub mod mixin;
pub mod object;

pub use config::{InaccessiblePolicy, MixinConfig};
pub use duck::{Duck, DuckType};
pub use error::{AccessViolation, QuackError, QuackResult};
pub use invocation::{CallShape, DirectWing, Invocation, Wing};
pub use matcher::DuckMatcher;
pub use mixed::{CurryArg, CurryTemplate, MethodConfig, Mixed, MixedRef};
pub use mixin::{Mixin, Producer, WeakMixin};
pub use object::{
    object_methods, Class, ClassBuilder, DefId, Instance, Interface, InterfaceBuilder, Method,
    MethodBody, PrimitiveTy, Type, TypeParam, Value, Visibility,
};
