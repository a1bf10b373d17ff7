//! The reflective object model that mixins operate on.
//!
//! Rust has no runtime reflection, so the dispatcher works over a small
//! object model of its own: classes with single inheritance, interfaces with
//! multiple inheritance and default bodies, bounded type parameters, scalar
//! values with their boxed counterparts, and opaque instances.
//!
//! # Module Structure
//!
//! - [`ty`] - Runtime types and definition ids
//! - [`class`] - Classes, interfaces and methods
//! - [`value`] - Dynamically typed values and instances

mod class;
mod ty;
mod value;

pub use class::{
    object_methods,
    Class,
    ClassBuilder,
    Interface,
    InterfaceBuilder,
    Method,
    MethodBody,
    Visibility,
};

pub use ty::{DefId, PrimitiveTy, Type, TypeParam};

pub use value::{Instance, Value};
