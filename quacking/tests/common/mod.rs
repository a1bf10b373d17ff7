//! Shared helpers for the integration tests.

#![allow(dead_code)]

use quacking::{QuackResult, Value};
use tracing_subscriber::EnvFilter;

/// Install a test subscriber once. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// A method body returning a fixed string.
pub fn returns(
    text: &'static str,
) -> impl Fn(&Value, &[Value]) -> QuackResult<Value> + Send + Sync + 'static {
    move |_, _| Ok(Value::from(text))
}

/// A method body returning nothing.
pub fn nothing() -> impl Fn(&Value, &[Value]) -> QuackResult<Value> + Send + Sync + 'static {
    |_, _| Ok(Value::Null)
}

/// Integer argument at `index`, or zero.
pub fn int_arg(args: &[Value], index: usize) -> i32 {
    args.get(index).and_then(Value::as_int).unwrap_or_default()
}
