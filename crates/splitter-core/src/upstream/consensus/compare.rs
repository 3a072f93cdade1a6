//! Structural equality used by majority voting.
//!
//! Values are compared through their serialized form: every decoded result type in this crate
//! derives `Serialize`, and projecting into [`serde_json::Value`] strips any wrapping the caller
//! may hold (`&T`, `Box<T>`, `Arc<T>`, `Option<T>`) before comparing.
//!
//! # Field visibility
//!
//! Struct fields take part in equality exactly when they are serialized, whether they are public
//! or not. Fields marked `#[serde(skip)]` are ignored. A value that fails to serialize is unequal
//! to everything except itself (same storage).

use serde::Serialize;
use serde_json::Value;

/// Returns `true` if `a` and `b` are structurally equal.
///
/// `a` and `b` may be held differently: a value equals a reference, `Box` or `Arc` of an equal
/// value.
///
/// - both absent (`None` / `null`) are equal
/// - the same storage of the same type is equal without further inspection
/// - sequences are compared element-wise, maps by key set and per-key value
/// - values of different kinds are never equal
///
/// # Examples
///
/// ```
/// use splitter_core::upstream::consensus::compare::equal;
/// use std::sync::Arc;
///
/// let a = vec![1u64, 2, 3];
/// assert!(equal(&a, &a));
/// assert!(equal(&Arc::new(a.clone()), &vec![1u64, 2, 3]));
/// assert!(equal(&&a, &a));
/// assert!(!equal(&a, &vec![1u64, 2]));
/// assert!(equal(&None::<u64>, &None::<String>));
/// ```
#[must_use]
pub fn equal<A, B>(a: &A, b: &B) -> bool
where
    A: Serialize + ?Sized,
    B: Serialize + ?Sized,
{
    if same_storage(a, b) {
        return true;
    }
    match (project(a), project(b)) {
        (Some(a), Some(b)) => values_equal(&a, &b),
        _ => false,
    }
}

/// A struct and its first field share an address, so the type has to match too.
fn same_storage<A: ?Sized, B: ?Sized>(a: &A, b: &B) -> bool {
    std::ptr::addr_eq(a, b) &&
        std::mem::size_of_val(a) == std::mem::size_of_val(b) &&
        std::any::type_name::<A>() == std::any::type_name::<B>()
}

/// Projects a value into its structural JSON form, or `None` if it cannot be serialized.
#[must_use]
pub fn project<T: Serialize + ?Sized>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

/// Recursive structural equality on projected values.
#[must_use]
pub fn values_equal(a: &Value, b: &Value) -> bool {
    if std::ptr::eq(a, b) {
        return true;
    }
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len() &&
                a.iter().all(|(key, a)| b.get(key).is_some_and(|b| values_equal(a, b)))
        }
        _ => false,
    }
}
