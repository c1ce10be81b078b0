//! Classification helpers used by entry points.

use clap::error::ErrorKind;

use super::SigError;

impl SigError {
    /// Returns `true` when parsing stopped to print help or version text.
    ///
    /// Such errors should be rendered with [`clap::Error::exit`], which keeps
    /// the zero exit status.
    #[must_use]
    pub fn is_display_request(&self) -> bool {
        matches!(
            self,
            Self::CliParsing(err) if matches!(
                err.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            )
        )
    }

    /// Name of the parameter the error is attributed to, if any.
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::Signature { parameter, .. }
            | Self::ParameterCollision { parameter, .. }
            | Self::ShortNameExhausted { parameter }
            | Self::Value { parameter, .. } => Some(parameter),
            Self::Validation(err) => err.parameter(),
            Self::CliParsing(_) | Self::Options(_) => None,
        }
    }
}
