//! Boxing equivalence and subtyping of parameters and return types.

mod common;

use std::sync::Arc;

use common::{init_tracing, returns};
use pretty_assertions::assert_eq;
use quacking::{Class, Interface, Mixin, PrimitiveTy, QuackError, Type, Value};

fn quacking_name(prim: PrimitiveTy) -> String {
    format!("{}Quacking", prim.name())
}

/// Interface with one `<prim>Quacking()` method per primitive, returning
/// either the primitive or its boxed counterpart.
fn quacking(name: &str, boxed: bool) -> Arc<Interface> {
    init_tracing();
    PrimitiveTy::ALL
        .into_iter()
        .fold(Interface::builder(name), |builder, prim| {
            let ret = if boxed { Type::boxed(prim) } else { Type::primitive(prim) };
            builder.method(quacking_name(prim), [], ret)
        })
        .build()
}

fn zero(prim: PrimitiveTy) -> Value {
    match prim {
        PrimitiveTy::Boolean => Value::Bool(false),
        PrimitiveTy::Byte => Value::Byte(0),
        PrimitiveTy::Char => Value::Char('\0'),
        PrimitiveTy::Short => Value::Short(0),
        PrimitiveTy::Int => Value::Int(0),
        PrimitiveTy::Long => Value::Long(0),
        PrimitiveTy::Float => Value::Float(0.0),
        PrimitiveTy::Double => Value::Double(0.0),
        PrimitiveTy::Void => Value::Null,
    }
}

fn quacker(name: &str, boxed: bool) -> Value {
    let class = PrimitiveTy::ALL
        .into_iter()
        .fold(Class::builder(name), |builder, prim| {
            let ret = if boxed { Type::boxed(prim) } else { Type::primitive(prim) };
            let value = zero(prim);
            builder.method(quacking_name(prim), [], ret, move |_, _| Ok(value.clone()))
        })
        .build();
    Value::object(&class, ())
}

fn assert_zeroes(mixin: &Mixin, interface: &Arc<Interface>) {
    let duck = mixin.as_interface(&interface.as_type()).unwrap().unwrap();
    for prim in PrimitiveTy::ALL {
        assert_eq!(duck.call(&quacking_name(prim), &[]).unwrap(), zero(prim));
    }
}

#[test]
fn test_wrapper_duck_is_primitive() {
    let primitive = quacking("PrimitiveQuacking", false);
    let mixin = Mixin::new();
    mixin.mix(quacker("WrapperQuacker", true)).unwrap();
    assert!(mixin.is(&primitive.as_type()));
}

#[test]
fn test_primitive_duck_is_wrapper() {
    let wrapper = quacking("WrapperQuacking", true);
    let mixin = Mixin::new();
    mixin.mix(quacker("PrimitiveQuacker", false)).unwrap();
    assert!(mixin.is(&wrapper.as_type()));
}

#[test]
fn test_primitive_duck_as_wrapper() {
    let wrapper = quacking("WrapperQuacking", true);
    let mixin = Mixin::new();
    mixin.mix(quacker("PrimitiveQuacker", false)).unwrap();
    assert_zeroes(&mixin, &wrapper);
}

#[test]
fn test_wrapper_duck_as_primitive() {
    let primitive = quacking("PrimitiveQuacking", false);
    let mixin = Mixin::new();
    mixin.mix(quacker("WrapperQuacker", true)).unwrap();
    assert_zeroes(&mixin, &primitive);
}

#[test]
fn test_liar_wrapper_fails_unboxing() {
    let primitive = quacking("PrimitiveQuacking", false);
    let liar = Class::builder("LiarWrapperQuacker")
        .method("booleanQuacking", [], Type::boxed(PrimitiveTy::Boolean), |_, _| {
            Ok(Value::Null)
        })
        .build();
    let mixin = Mixin::new();
    mixin.mix(Value::object(&liar, ())).unwrap();

    let duck = mixin.as_interface(&primitive.as_type()).unwrap().unwrap();
    let err = duck.call("booleanQuacking", &[]).unwrap_err();
    match err {
        QuackError::NullUnboxing { expected, .. } => assert_eq!(expected, "boolean"),
        other => panic!("expected a null unboxing error, got {other:?}"),
    }
}

#[test]
fn test_void_quacking_with_return() {
    let primitive = quacking("PrimitiveQuacking", false);
    let something = Class::builder("VoidReturnQuacker")
        .method("voidQuacking", [], Type::string(), returns("something"))
        .build();
    let mixin = Mixin::new();
    mixin.mix(Value::object(&something, ())).unwrap();

    let duck = mixin.as_interface(&primitive.as_type()).unwrap().unwrap();
    assert_eq!(duck.call("voidQuacking", &[]).unwrap(), Value::Null);
}

struct Quacks {
    quack: Arc<Interface>,
    sonic: Arc<Class>,
    subsonic: Arc<Class>,
    strange: Arc<Class>,
}

impl Quacks {
    fn new() -> Self {
        init_tracing();
        let quack = Interface::builder("Quack").build();
        let sonic = Class::builder("SonicQuack").implements(&quack).build();
        let subsonic = Class::builder("SubsonicQuack").implements(&quack).build();
        let strange = Class::builder("StrangeQuack").implements(&quack).build();
        Quacks {
            quack,
            sonic,
            subsonic,
            strange,
        }
    }

    fn sonic(&self) -> Value {
        Value::object(&self.sonic, "sonic quack")
    }

    fn subsonic(&self) -> Value {
        Value::object(&self.subsonic, "subsonic quack")
    }

    fn strange(&self) -> Value {
        Value::object(&self.strange, "strange quack")
    }
}

/// The description a quack was created with.
fn describe(value: &Value) -> &'static str {
    value.state::<&'static str>().copied().unwrap_or("?")
}

fn heard(
    prefix: &'static str,
) -> impl Fn(&Value, &[Value]) -> quacking::QuackResult<Value> + Send + Sync + 'static {
    move |_, args| {
        let parts: Vec<&str> = args.iter().map(describe).collect();
        Ok(Value::from(format!("{} {}", prefix, parts.join(" "))))
    }
}

#[test]
fn test_subtyping_return() {
    let quacks = Quacks::new();
    let specialized = Interface::builder("SpecializedQuacker")
        .method("quack", [], quacks.quack.as_type())
        .build();
    let generic = Class::builder("GenericQuacker")
        .method("quack", [], Type::string(), returns("quack"))
        .build();
    let sonic_class = quacks.sonic.clone();
    let sonic = Class::builder("SonicQuacker")
        .method("quack", [], Type::Class(quacks.sonic.clone()), move |_, _| {
            Ok(Value::object(&sonic_class, "sonic quack"))
        })
        .build();

    let mixin = Mixin::new();
    mixin.mix(Value::object(&generic, ())).unwrap();
    mixin.mix(Value::object(&sonic, ())).unwrap();
    assert!(mixin.is(&specialized.as_type()));

    let duck = mixin.as_interface(&specialized.as_type()).unwrap().unwrap();
    let quack = duck.call("quack", &[]).unwrap();
    assert_eq!(describe(&quack), "sonic quack");
}

#[test]
fn test_subtyping_parameters() {
    let quacks = Quacks::new();
    let listener = Interface::builder("QuackListener")
        .method("hear", [quacks.quack.as_type()], Type::string())
        .build();
    let generic = Class::builder("GenericListener")
        .method("hear", [Type::string()], Type::string(), heard("listened to"))
        .build();
    let sonic = Type::Class(quacks.sonic.clone());
    let subsonic = Type::Class(quacks.subsonic.clone());
    let specialized = Class::builder("SpecializedListener")
        .method("hear", [sonic], Type::string(), heard("sonic hear"))
        .method("hear", [subsonic], Type::string(), heard("subsonic hear"))
        .build();

    let mixin = Mixin::new();
    mixin.mix(Value::object(&generic, ())).unwrap();
    mixin.mix(Value::object(&specialized, ())).unwrap();

    let duck = mixin.as_interface(&listener.as_type()).unwrap().unwrap();
    assert_eq!(
        duck.call("hear", &[quacks.sonic()]).unwrap(),
        Value::from("sonic hear sonic quack")
    );
    assert_eq!(
        duck.call("hear", &[quacks.subsonic()]).unwrap(),
        Value::from("subsonic hear subsonic quack")
    );
}

#[test]
fn test_multi_dispatch_parameters() {
    let quacks = Quacks::new();
    let quack = quacks.quack.as_type();
    let listener = Interface::builder("QuackStereoListener")
        .method("hear", [quack.clone(), quack], Type::string())
        .build();
    let sonic = Type::Class(quacks.sonic.clone());
    let subsonic = Type::Class(quacks.subsonic.clone());
    let stereo = Class::builder("StereoListener")
        .method("hear", [Type::Object, Type::Object], Type::string(), heard("regular hear"))
        .method("hear", [sonic, Type::Object], Type::string(), heard("left sonic hear"))
        .method("hear", [Type::Object, subsonic], Type::string(), heard("right subsonic hear"))
        .build();

    let mixin = Mixin::new();
    mixin.mix(Value::object(&stereo, ())).unwrap();
    let duck = mixin.as_interface(&listener.as_type()).unwrap().unwrap();

    let cases = [
        (quacks.sonic(), quacks.sonic(), "left sonic hear sonic quack sonic quack"),
        (quacks.sonic(), quacks.subsonic(), "left sonic hear sonic quack subsonic quack"),
        (
            quacks.subsonic(),
            quacks.subsonic(),
            "right subsonic hear subsonic quack subsonic quack",
        ),
        (
            quacks.strange(),
            quacks.subsonic(),
            "right subsonic hear strange quack subsonic quack",
        ),
        (quacks.strange(), quacks.sonic(), "regular hear strange quack sonic quack"),
    ];
    for (left, right, expected) in cases {
        assert_eq!(duck.call("hear", &[left, right]).unwrap(), Value::from(expected));
    }
}
