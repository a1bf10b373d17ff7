//! Type compatibility checks.

use crate::object::Type;

/// Whether a value of type `value` may be used where `target` is declared.
///
/// Concrete types use ordinary subtyping plus boxing equivalence. A type
/// parameter on the target side must accept every bound, while a type
/// parameter on the value side needs a single compatible bound.
pub fn compatible(target: &Type, value: &Type) -> bool {
    match (target, value) {
        (Type::Param(param), _) => param.bounds().iter().all(|bound| compatible(bound, value)),
        (_, Type::Param(param)) => param.bounds().iter().any(|bound| compatible(target, bound)),
        _ => value.is_subtype_of(target) || equivalent_primitives(target, value),
    }
}

/// A primitive and its boxed counterpart, in either order.
pub fn equivalent_primitives(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Primitive(p), Type::Boxed(q)) | (Type::Boxed(q), Type::Primitive(p)) => p == q,
        _ => false,
    }
}

/// Return type check. A `void` declaration discards whatever is returned.
pub fn return_compatible(declared: &Type, candidate: &Type) -> bool {
    declared.is_void() || compatible(declared, candidate)
}

/// How far `concrete` is from `target` in the superclass chain.
///
/// `Some(0)` when equal and `None` when incompatible. Every step up the
/// chain that stays compatible adds one.
pub fn distance(target: &Type, concrete: &Type) -> Option<u32> {
    if target == concrete {
        return Some(0);
    }

    if !compatible(target, concrete) {
        return None;
    }

    let above = concrete
        .superclass()
        .and_then(|parent| distance(target, &parent))
        .unwrap_or(0);
    Some(1 + above)
}
