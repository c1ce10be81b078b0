//! Typed extraction of [`Value`]s.

use std::collections::{BTreeSet, HashSet};
use std::hash::{BuildHasher, Hash};
use std::path::PathBuf;

use super::{Value, ValueError};

/// Converts a parsed [`Value`] back into a Rust type.
///
/// Implemented for the built-in scalar types, `String`, `PathBuf`, options,
/// collections and small tuples. `#[derive(Parameters)]` implements it for
/// composite structs by unwrapping [`Value::Object`]. Custom types with a
/// registered conversion usually implement it with [`Value::into_object`]:
///
/// ```
/// use sigcli::{FromValue, Value, ValueError};
///
/// struct Port(u16);
///
/// impl FromValue for Port {
///     fn from_value(value: Value) -> Result<Self, ValueError> {
///         value.into_object()
///     }
/// }
///
/// let port = Port::from_value(Value::object(Port(8080))).expect("port");
/// assert_eq!(port.0, 8080);
/// ```
pub trait FromValue: Sized {
    /// Performs the conversion.
    ///
    /// # Errors
    ///
    /// Returns a [`ValueError`] when the value has the wrong shape.
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::None => Ok(false),
            other => Err(other.mismatch("bool")),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Str(v) => Ok(v),
            Value::Path(v) => Ok(v.display().to_string()),
            other => Err(other.mismatch("str")),
        }
    }
}

impl FromValue for PathBuf {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Path(v) => Ok(v),
            Value::Str(v) => Ok(Self::from(v)),
            other => Err(other.mismatch("path")),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Int(v) => Ok(v),
            other => Err(other.mismatch("int")),
        }
    }
}

macro_rules! narrow_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ValueError> {
                    let wide = i64::from_value(value)?;
                    <$ty>::try_from(wide).map_err(|_| ValueError::OutOfRange {
                        value: wide,
                        target: stringify!($ty),
                    })
                }
            }
        )*
    };
}

narrow_int!(i8, i16, i32, isize, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    #[expect(
        clippy::cast_precision_loss,
        reason = "integer tokens are accepted where floats are expected"
    )]
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as Self),
            other => Err(other.mismatch("float")),
        }
    }
}

impl FromValue for f32 {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "narrowing to the field type the caller declared"
    )]
    fn from_value(value: Value) -> Result<Self, ValueError> {
        f64::from_value(value).map(|v| v as Self)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::None => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

fn elements(value: Value, expected: &str) -> Result<Vec<Value>, ValueError> {
    match value {
        Value::List(items) | Value::Tuple(items) => Ok(items),
        Value::None => Ok(Vec::new()),
        other => Err(other.mismatch(expected)),
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        elements(value, "list")?
            .into_iter()
            .map(T::from_value)
            .collect()
    }
}

impl<T: FromValue + Ord> FromValue for BTreeSet<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        elements(value, "set")?
            .into_iter()
            .map(T::from_value)
            .collect()
    }
}

impl<T, S> FromValue for HashSet<T, S>
where
    T: FromValue + Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_value(value: Value) -> Result<Self, ValueError> {
        elements(value, "set")?
            .into_iter()
            .map(T::from_value)
            .collect()
    }
}

fn fixed_tuple<const N: usize>(value: Value) -> Result<[Value; N], ValueError> {
    let found = value.kind();
    let items = match value {
        Value::Tuple(items) | Value::List(items) => items,
        _ => Vec::new(),
    };
    let len = items.len();
    <[Value; N]>::try_from(items).map_err(|_| ValueError::Mismatch {
        expected: format!("tuple of {N}"),
        found: if len == 0 { found } else { format!("tuple of {len}") },
    })
}

impl<A: FromValue, B: FromValue> FromValue for (A, B) {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        let [a, b] = fixed_tuple::<2>(value)?;
        Ok((A::from_value(a)?, B::from_value(b)?))
    }
}

impl<A: FromValue, B: FromValue, C: FromValue> FromValue for (A, B, C) {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        let [a, b, c] = fixed_tuple::<3>(value)?;
        Ok((A::from_value(a)?, B::from_value(b)?, C::from_value(c)?))
    }
}

impl<A: FromValue, B: FromValue, C: FromValue, D: FromValue> FromValue for (A, B, C, D) {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        let [a, b, c, d] = fixed_tuple::<4>(value)?;
        Ok((
            A::from_value(a)?,
            B::from_value(b)?,
            C::from_value(c)?,
            D::from_value(d)?,
        ))
    }
}
