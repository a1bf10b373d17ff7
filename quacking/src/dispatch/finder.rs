//! The three step method finder.

use std::sync::Arc;

use tracing::trace;

use super::compat::{distance, return_compatible};
use super::result::{FindResult, NoMatch, NoMatchReason};
use crate::object::{Method, Type, Value};

/// What to look for on a candidate object.
#[derive(Debug, Clone, Copy)]
pub struct MethodQuery<'a> {
    /// The interface method being called.
    pub method: &'a Arc<Method>,
    /// Name to look up, after renaming.
    pub name: &'a str,
    /// Parameter types to look up, after currying.
    pub param_types: &'a [Type],
    /// Runtime type of each argument. `None` stands for a null argument.
    pub args: &'a [Option<Type>],
    /// Whether an object implementing the declaring type may use the
    /// interface method as is.
    pub exact_match: bool,
}

impl<'a> MethodQuery<'a> {
    /// Plain structural query: the declared name and parameter types, with
    /// the declared types standing in for the arguments.
    pub fn structural(method: &'a Arc<Method>) -> Self {
        MethodQuery {
            method,
            name: method.name(),
            param_types: method.params(),
            args: &[],
            exact_match: true,
        }
    }

    /// The type used for scoring the argument at `position`.
    fn concrete(&self, position: usize) -> Type {
        self.args
            .get(position)
            .cloned()
            .flatten()
            .unwrap_or_else(|| self.param_types[position].clone())
    }
}

/// Looks up implementing methods on one target object.
pub struct MethodFinder<'v> {
    target: &'v Value,
    methods: Vec<Arc<Method>>,
}

impl<'v> MethodFinder<'v> {
    pub fn new(target: &'v Value) -> Self {
        MethodFinder {
            target,
            methods: target.public_methods(),
        }
    }

    pub fn find(&self, query: &MethodQuery<'_>) -> FindResult {
        if query.exact_match && self.implements_owner(query.method) {
            return FindResult::Exact(query.method.clone());
        }

        let declared_ret = query.method.ret();

        let direct = self
            .methods
            .iter()
            .find(|method| method.name() == query.name && method.params() == query.param_types);
        if let Some(method) = direct {
            if return_compatible(declared_ret, method.ret()) {
                trace!(method = %method.signature(), "direct match");
                return FindResult::Direct(method.clone());
            }
            return self.incompatible_return(query, method);
        }

        let candidates: Vec<Arc<Method>> = self
            .methods
            .iter()
            .filter(|method| {
                method.name() == query.name && method.arity() == query.param_types.len()
            })
            .cloned()
            .collect();
        if candidates.is_empty() {
            return FindResult::NoMatch(NoMatch {
                method_name: query.name.to_string(),
                reason: NoMatchReason::NoCandidates,
            });
        }

        let concrete: Vec<Type> = (0..query.param_types.len())
            .map(|position| query.concrete(position))
            .collect();

        match select(candidates, &concrete, 0) {
            Some(method) if return_compatible(declared_ret, method.ret()) => {
                trace!(method = %method.signature(), "multi-dispatch match");
                FindResult::Dispatched(method)
            }
            Some(method) => self.incompatible_return(query, &method),
            None => FindResult::NoMatch(NoMatch {
                method_name: query.name.to_string(),
                reason: NoMatchReason::NoApplicable,
            }),
        }
    }

    /// The target's type declares `method` and the target has a body for
    /// it. Ducks answer every method of their interface.
    fn implements_owner(&self, method: &Method) -> bool {
        let declared = match (self.target.runtime_type(), method.owner()) {
            (Some(ty), Some(owner)) => ty.is_subtype_of(&owner),
            _ => false,
        };
        declared
            && (matches!(self.target, Value::Duck(_)) || self.target.virtual_body(method).is_some())
    }

    fn incompatible_return(&self, query: &MethodQuery<'_>, method: &Method) -> FindResult {
        trace!(
            method = %method.signature(),
            expected = %query.method.ret(),
            "rejected for its return type"
        );
        FindResult::NoMatch(NoMatch {
            method_name: query.name.to_string(),
            reason: NoMatchReason::IncompatibleReturn {
                candidate: method.signature(),
            },
        })
    }
}

/// Narrow `candidates` position by position, keeping the closest ones.
///
/// When the closest candidates fail on a later position, the remaining ones
/// are ranked again at the same position.
fn select(candidates: Vec<Arc<Method>>, concrete: &[Type], position: usize) -> Option<Arc<Method>> {
    if position == concrete.len() {
        return candidates.into_iter().next();
    }

    let scored: Vec<(u32, Arc<Method>)> = candidates
        .into_iter()
        .filter_map(|method| {
            distance(&method.params()[position], &concrete[position]).map(|score| (score, method))
        })
        .collect();

    let best_score = scored.iter().map(|(score, _)| *score).min()?;
    let (best, others): (Vec<_>, Vec<_>) = scored
        .into_iter()
        .partition(|(score, _)| *score == best_score);

    let best: Vec<Arc<Method>> = best.into_iter().map(|(_, method)| method).collect();
    let others: Vec<Arc<Method>> = others.into_iter().map(|(_, method)| method).collect();

    select(best, concrete, position + 1).or_else(|| {
        if others.is_empty() {
            None
        } else {
            select(others, concrete, position)
        }
    })
}

/// Find the method of `target` implementing the queried method.
pub fn find_method(target: &Value, query: &MethodQuery<'_>) -> Option<Arc<Method>> {
    MethodFinder::new(target).find(query).into_method()
}
