//! Finder result types.

use std::fmt;
use std::sync::Arc;

use crate::object::Method;

/// Result of looking up an implementing method on one object.
#[derive(Debug, Clone)]
pub enum FindResult {
    /// The object's type implements the declaring type.
    Exact(Arc<Method>),
    /// A method with exactly the looked up name and parameter types.
    Direct(Arc<Method>),
    /// The closest overload for the runtime argument types.
    Dispatched(Arc<Method>),
    /// Nothing on the object implements the method.
    NoMatch(NoMatch),
}

impl FindResult {
    pub fn is_match(&self) -> bool {
        !matches!(self, FindResult::NoMatch(_))
    }

    pub fn method(&self) -> Option<&Arc<Method>> {
        match self {
            FindResult::Exact(method)
            | FindResult::Direct(method)
            | FindResult::Dispatched(method) => Some(method),
            FindResult::NoMatch(_) => None,
        }
    }

    pub fn into_method(self) -> Option<Arc<Method>> {
        match self {
            FindResult::Exact(method)
            | FindResult::Direct(method)
            | FindResult::Dispatched(method) => Some(method),
            FindResult::NoMatch(_) => None,
        }
    }
}

/// Why an object does not implement a method.
#[derive(Debug, Clone)]
pub struct NoMatch {
    /// The name that was looked up.
    pub method_name: String,
    pub reason: NoMatchReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoMatchReason {
    /// No public method with the name and arity.
    NoCandidates,
    /// Candidates exist but none accepts the argument types.
    NoApplicable,
    /// The selected method returns an incompatible type.
    IncompatibleReturn { candidate: String },
}

impl fmt::Display for NoMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            NoMatchReason::NoCandidates => {
                write!(f, "no public method named `{}`", self.method_name)
            }
            NoMatchReason::NoApplicable => {
                write!(f, "no overload of `{}` accepts the arguments", self.method_name)
            }
            NoMatchReason::IncompatibleReturn { candidate } => {
                write!(f, "{} has an incompatible return type", candidate)
            }
        }
    }
}
