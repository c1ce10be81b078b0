//! Dynamic values produced by parsing and consumed by callbacks.
//!
//! Parsing happens against descriptors built at run time, so parsed values
//! travel as [`Value`] until the callback re-extracts typed fields through
//! [`FromValue`].

mod from_value;

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::signature::TypeTag;

pub use from_value::FromValue;

/// A single parsed (or default) parameter value.
#[derive(Clone, Default)]
pub enum Value {
    /// Absent optional value.
    #[default]
    None,
    /// Boolean flag or token.
    Bool(bool),
    /// Integer token.
    Int(i64),
    /// Floating point token.
    Float(f64),
    /// Text token.
    Str(String),
    /// Filesystem path token.
    Path(PathBuf),
    /// Fixed-size group of values consumed by one occurrence.
    Tuple(Vec<Self>),
    /// Repeated values accumulated across occurrences.
    List(Vec<Self>),
    /// Constructed composite or custom-converted value.
    Object(Object),
}

/// Type-erased value carrying the short name of its Rust type.
#[derive(Clone)]
pub struct Object {
    type_name: String,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Object {
    /// Short type name recorded when the object was created.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

/// Errors raised when a [`Value`] does not have the requested shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValueError {
    /// The value held a different variant than requested.
    #[error("expected {expected}, found {found}")]
    Mismatch {
        /// Requested type.
        expected: String,
        /// Type actually held.
        found: String,
    },

    /// A numeric value does not fit the requested integer width.
    #[error("{value} is out of range for {target}")]
    OutOfRange {
        /// Offending value.
        value: i64,
        /// Requested integer type.
        target: &'static str,
    },

    /// An integer does not fit in the 64-bit signed range of [`Value::Int`].
    #[error("{value} does not fit in a 64-bit signed integer")]
    TooWide {
        /// Offending value as written.
        value: String,
    },

    /// A type-erased object is still shared and cannot be moved out.
    #[error("value of type {0} is shared and cannot be taken")]
    Shared(String),

    /// A raw token could not be converted to the target type.
    #[error("'{token}' is not a valid {target}: {message}")]
    Conversion {
        /// Raw token.
        token: String,
        /// Target type name.
        target: String,
        /// Reason reported by the converter.
        message: String,
    },
}

/// Returns the unqualified name of `T` without generic arguments.
///
/// ```
/// assert_eq!(sigcli::short_type_name::<std::path::PathBuf>(), "PathBuf");
/// assert_eq!(sigcli::short_type_name::<Vec<u8>>(), "Vec");
/// ```
#[must_use]
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

impl Value {
    /// Wraps an arbitrary value, tagging it with its short type name.
    #[must_use]
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Self::Object(Object {
            type_name: short_type_name::<T>().to_owned(),
            inner: Arc::new(value),
        })
    }

    /// Converts any integer to [`Value::Int`], rejecting values outside
    /// the `i64` range instead of truncating them.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::TooWide`] when `v` does not fit in an `i64`.
    ///
    /// ```
    /// use sigcli::{Value, ValueError};
    ///
    /// assert_eq!(Value::int(7_u64), Ok(Value::Int(7)));
    /// assert!(matches!(Value::int(u64::MAX), Err(ValueError::TooWide { .. })));
    /// ```
    pub fn int<T>(v: T) -> Result<Self, ValueError>
    where
        T: TryInto<i64> + fmt::Display + Copy,
    {
        v.try_into().map(Self::Int).map_err(|_| ValueError::TooWide {
            value: v.to_string(),
        })
    }

    /// Returns `true` for [`Value::None`].
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Runtime type of the value, used when a parameter has no annotation.
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Self::None => TypeTag::None,
            Self::Bool(_) => TypeTag::Bool,
            Self::Int(_) => TypeTag::Int,
            Self::Float(_) => TypeTag::Float,
            Self::Str(_) => TypeTag::Str,
            Self::Path(_) => TypeTag::Path,
            Self::Tuple(_) => TypeTag::Tuple,
            Self::List(_) => TypeTag::List,
            Self::Object(object) => TypeTag::Custom(object.type_name.clone()),
        }
    }

    /// Human-readable variant name used in error messages.
    #[must_use]
    pub fn kind(&self) -> String {
        match self {
            Self::Object(object) => object.type_name.clone(),
            other => other.type_tag().to_string(),
        }
    }

    /// Borrows the wrapped object as `T` when the types match.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Object(object) => object.inner.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Moves the wrapped object out as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::Mismatch`] when the value is not an object of
    /// type `T`, and [`ValueError::Shared`] when other clones of the object
    /// are still alive.
    pub fn into_object<T: Any + Send + Sync>(self) -> Result<T, ValueError> {
        let Self::Object(object) = self else {
            return Err(self.mismatch(short_type_name::<T>()));
        };
        let Object { type_name, inner } = object;
        let typed = inner.downcast::<T>().map_err(|_| ValueError::Mismatch {
            expected: short_type_name::<T>().to_owned(),
            found: type_name.clone(),
        })?;
        Arc::try_unwrap(typed).map_err(|_| ValueError::Shared(type_name))
    }

    pub(crate) fn mismatch(&self, expected: &str) -> ValueError {
        ValueError::Mismatch {
            expected: expected.to_owned(),
            found: self.kind(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Self::Path(v) => f.debug_tuple("Path").field(v).finish(),
            Self::Tuple(v) => f.debug_tuple("Tuple").field(v).finish(),
            Self::List(v) => f.debug_tuple("List").field(v).finish(),
            Self::Object(object) => write!(f, "Object(<{}>)", object.type_name),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Path(a), Self::Path(b)) => a == b,
            (Self::Tuple(a), Self::Tuple(b)) | (Self::List(a), Self::List(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(&a.inner, &b.inner),
            _ => false,
        }
    }
}

/// Formats the value the way it would be typed on the command line.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
            Self::Path(v) => write!(f, "{}", v.display()),
            Self::Tuple(items) | Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Object(object) => write!(f, "<{}>", object.type_name),
        }
    }
}

macro_rules! value_from_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::Int(i64::from(v))
                }
            }
        )*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! value_try_from_wide_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TryFrom<$ty> for Value {
                type Error = ValueError;

                fn try_from(v: $ty) -> Result<Self, ValueError> {
                    Self::int(v)
                }
            }
        )*
    };
}

value_try_from_wide_int!(u64, usize, isize);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<PathBuf> for Value {
    fn from(v: PathBuf) -> Self {
        Self::Path(v)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::None, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<BTreeSet<T>> for Value {
    fn from(v: BTreeSet<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<Self>, B: Into<Self>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Self::Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<Self>, B: Into<Self>, C: Into<Self>> From<(A, B, C)> for Value {
    fn from((a, b, c): (A, B, C)) -> Self {
        Self::Tuple(vec![a.into(), b.into(), c.into()])
    }
}
