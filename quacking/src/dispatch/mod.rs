//! Structural method resolution.
//!
//! This module decides which method of a candidate object implements a
//! method declared by an interface the object never heard of. Matching is
//! structural: name, arity, parameter compatibility and return
//! compatibility.
//!
//! # Resolution Overview
//!
//! 1. **Exact match**: the object's type already implements the declaring
//!    type, so the interface method itself is used
//! 2. **Direct lookup**: a public method with the same name and exactly the
//!    same parameter types
//! 3. **Multi-dispatch**: among the public methods with the same name and
//!    arity, pick the one closest to the runtime types of the arguments,
//!    left to right
//!
//! # Module Structure
//!
//! - [`compat`] - Type compatibility and subtype distance
//! - [`finder`] - The three step method finder
//! - [`result`] - Finder results

mod compat;
mod finder;
mod result;


pub use compat::{compatible, distance, equivalent_primitives, return_compatible};

pub use finder::{find_method, MethodFinder, MethodQuery};

pub use result::{FindResult, NoMatch, NoMatchReason};
