//! Raw-token conversion functions and the built-in set.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::signature::TypeTag;
use crate::value::{Value, ValueError};

/// Converts one raw command-line token into a [`Value`].
///
/// The error string is shown to the user as the reason the token was
/// rejected.
pub type Conversion = Arc<dyn Fn(&str) -> Result<Value, String> + Send + Sync>;

/// A conversion bound to the name of the type it produces.
#[derive(Clone)]
pub struct Converter {
    target: String,
    func: Option<Conversion>,
}

impl Converter {
    pub(crate) fn new(target: &TypeTag, func: Conversion) -> Self {
        Self {
            target: target.to_string(),
            func: Some(func),
        }
    }

    /// Passes tokens through unchanged as [`Value::Str`].
    pub(crate) fn passthrough(target: &TypeTag) -> Self {
        Self {
            target: target.to_string(),
            func: None,
        }
    }

    /// Name of the produced type.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Converts `token`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::Conversion`] carrying the converter's message.
    pub fn convert(&self, token: &str) -> Result<Value, ValueError> {
        let Some(func) = &self.func else {
            return Ok(Value::Str(token.to_owned()));
        };
        func(token).map_err(|message| ValueError::Conversion {
            token: token.to_owned(),
            target: self.target.clone(),
            message,
        })
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("target", &self.target)
            .field("passthrough", &self.func.is_none())
            .finish()
    }
}

pub(super) fn builtins() -> [(TypeTag, Conversion); 5] {
    [
        (TypeTag::Str, Arc::new(|t: &str| Ok(Value::Str(t.to_owned())))),
        (TypeTag::Int, Arc::new(parse_int)),
        (TypeTag::Float, Arc::new(parse_float)),
        (TypeTag::Bool, Arc::new(parse_bool)),
        (TypeTag::Path, Arc::new(|t: &str| Ok(Value::Path(PathBuf::from(t))))),
    ]
}

fn parse_int(token: &str) -> Result<Value, String> {
    token
        .trim()
        .parse::<i64>()
        .map(Value::Int)
        .map_err(|e| e.to_string())
}

fn parse_float(token: &str) -> Result<Value, String> {
    token
        .trim()
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|e| e.to_string())
}

fn parse_bool(token: &str) -> Result<Value, String> {
    match token.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(Value::Bool(true)),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(Value::Bool(false)),
        _ => Err("expected one of 1/0, true/false, yes/no, on/off".to_owned()),
    }
}
