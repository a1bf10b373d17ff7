//! Interface methods with default bodies.

mod common;

use std::sync::Arc;

use common::{init_tracing, returns};
use pretty_assertions::assert_eq;
use quacking::{
    Class, InaccessiblePolicy, Interface, Mixin, MixinConfig, QuackError, Type, Value,
};

fn default_duck() -> Arc<Interface> {
    init_tracing();
    Interface::builder("DefaultDuck")
        .default_method("quack", [], Type::string(), returns("quack"))
        .build()
}

fn default_shy_duck() -> Arc<Interface> {
    init_tracing();
    Interface::builder("DefaultShyDuck")
        .private()
        .default_method("quack", [], Type::string(), returns("quack"))
        .build()
}

fn explicit_bird() -> Value {
    let class = Class::builder("ExplicitBird")
        .method("quack", [], Type::string(), returns("explicit quack"))
        .build();
    Value::object(&class, ())
}

#[test]
fn test_default_method() {
    let duck = default_duck();
    let bird = Class::builder("DefaultBird").implements(&duck).build();

    let mixin = Mixin::new();
    mixin.mix(Value::object(&bird, ())).unwrap();
    assert!(mixin.is(&duck.as_type()));

    let as_duck = mixin.as_interface(&duck.as_type()).unwrap().unwrap();
    assert_eq!(as_duck.call("quack", &[]).unwrap(), Value::from("quack"));
}

#[test]
fn test_inherited_default_method() {
    let duck = default_duck();
    let bird = Class::builder("DefaultBird").implements(&duck).build();
    let chick = Class::builder("DefaultChick").extends(&bird).build();

    let mixin = Mixin::new();
    mixin.mix(Value::object(&chick, ())).unwrap();

    let as_duck = mixin.as_interface(&duck.as_type()).unwrap().unwrap();
    assert_eq!(as_duck.call("quack", &[]).unwrap(), Value::from("quack"));
}

#[test]
fn test_explicit_method() {
    let duck = default_duck();
    let mixin = Mixin::new();
    mixin.mix(explicit_bird()).unwrap();
    assert!(mixin.is(&duck.as_type()));

    let as_duck = mixin.as_interface(&duck.as_type()).unwrap().unwrap();
    assert_eq!(as_duck.call("quack", &[]).unwrap(), Value::from("explicit quack"));
}

#[test]
fn test_inaccessible_default_method() {
    let shy = default_shy_duck();
    let bird = Class::builder("DefaultShyBird").implements(&shy).build();

    let mixin = Mixin::new();
    mixin.mix(Value::object(&bird, ())).unwrap();
    assert!(mixin.is(&shy.as_type()));

    let as_duck = mixin.as_interface(&shy.as_type()).unwrap().unwrap();
    let err = as_duck.call("quack", &[]).unwrap_err();
    assert!(matches!(err, QuackError::InaccessibleMember { .. }));
}

#[test]
fn test_inaccessible_fails_before_later_candidates() {
    let shy = default_shy_duck();
    let bird = Class::builder("DefaultShyBird").implements(&shy).build();

    let mixin = Mixin::new();
    mixin.mix(Value::object(&bird, ())).unwrap();
    mixin.mix(explicit_bird()).unwrap();

    let as_duck = mixin.as_interface(&shy.as_type()).unwrap().unwrap();
    assert!(matches!(
        as_duck.call("quack", &[]),
        Err(QuackError::InaccessibleMember { .. })
    ));
}

#[test]
fn test_skip_policy_tries_later_candidates() {
    let shy = default_shy_duck();
    let bird = Class::builder("DefaultShyBird").implements(&shy).build();
    let config = MixinConfig {
        inaccessible: InaccessiblePolicy::Skip,
        ..MixinConfig::default()
    };

    let mixin = Mixin::with_config(config);
    mixin.mix(Value::object(&bird, ())).unwrap();
    let as_duck = mixin.as_interface(&shy.as_type()).unwrap().unwrap();
    assert!(matches!(
        as_duck.call("quack", &[]),
        Err(QuackError::UnsupportedDispatch { .. })
    ));

    mixin.mix(explicit_bird()).unwrap();
    assert_eq!(as_duck.call("quack", &[]).unwrap(), Value::from("explicit quack"));
}
