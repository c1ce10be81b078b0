//! Constructors and clap conversion helpers for `SigError`.

use clap::error::ErrorKind;

use super::SigError;

impl SigError {
    /// Construct a signature error for `parameter` of `callable`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sigcli::SigError;
    /// let e = SigError::signature("main", "foo", "union type not supported");
    /// assert!(matches!(e, SigError::Signature { .. }));
    /// ```
    #[must_use]
    pub fn signature(
        callable: impl Into<String>,
        parameter: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Signature {
            callable: callable.into(),
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Construct a collision error for an already claimed option name.
    #[must_use]
    pub fn collision(parameter: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ParameterCollision {
            parameter: parameter.into(),
            name: name.into(),
        }
    }

    /// Returns `true` for errors raised while building a command.
    #[must_use]
    pub const fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::Signature { .. }
                | Self::ParameterCollision { .. }
                | Self::ShortNameExhausted { .. }
        )
    }

    /// Render the error through clap so it can terminate the process with
    /// clap's formatting and exit status.
    ///
    /// Parse failures keep their original kind. Validation failures map to
    /// [`ErrorKind::ValueValidation`] and value extraction failures to
    /// [`ErrorKind::InvalidValue`].
    #[must_use]
    pub fn into_clap_error(self, cmd: &clap::Command) -> clap::Error {
        match self {
            Self::CliParsing(err) => *err,
            Self::Validation(err) => {
                clap::Error::raw(ErrorKind::ValueValidation, format!("{err}\n")).with_cmd(cmd)
            }
            Self::Value { .. } => {
                clap::Error::raw(ErrorKind::InvalidValue, format!("{self}\n")).with_cmd(cmd)
            }
            other => clap::Error::raw(ErrorKind::Io, format!("{other}\n")).with_cmd(cmd),
        }
    }
}

impl From<clap::Error> for SigError {
    fn from(e: clap::Error) -> Self {
        Self::CliParsing(e.into())
    }
}

impl From<figment::Error> for SigError {
    fn from(e: figment::Error) -> Self {
        Self::Options(e.into())
    }
}
