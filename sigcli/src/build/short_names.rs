//! Short alias selection shared by a command and its composites.

use std::collections::BTreeSet;

use tracing::warn;

use crate::error::{SigError, SigResult};

/// Aliases claimed before any parameter is considered.
const RESERVED_SHORTS: &[char] = &['h'];

/// Claimed short aliases for one command build.
#[derive(Debug, Clone)]
pub(crate) struct ShortNames {
    claimed: BTreeSet<char>,
}

impl Default for ShortNames {
    fn default() -> Self {
        Self {
            claimed: RESERVED_SHORTS.iter().copied().collect(),
        }
    }
}

impl ShortNames {
    /// Prevents `shorts` from being inferred or claimed explicitly.
    pub(crate) fn exclude(&mut self, shorts: impl IntoIterator<Item = char>) {
        self.claimed.extend(shorts);
    }

    /// Claims a user-supplied alias for `parameter`.
    pub(crate) fn claim_explicit(
        &mut self,
        callable: &str,
        parameter: &str,
        short: char,
    ) -> SigResult<char> {
        if !short.is_ascii_alphabetic() {
            return Err(SigError::signature(
                callable,
                parameter,
                format!("invalid short name '{short}': must be an ASCII letter"),
            ));
        }
        if !self.claimed.insert(short) {
            return Err(SigError::collision(parameter, format!("-{short}")));
        }
        Ok(short)
    }

    /// Derives an alias from the characters of `parameter`.
    ///
    /// Each character is tried in lowercase, then uppercase. When every
    /// candidate is taken the first free letter of `a..=z`, then `A..=Z`, is
    /// used instead.
    pub(crate) fn infer(&mut self, parameter: &str) -> SigResult<char> {
        let derived = parameter
            .chars()
            .filter(char::is_ascii_alphabetic)
            .flat_map(|c| [c.to_ascii_lowercase(), c.to_ascii_uppercase()])
            .find(|candidate| !self.claimed.contains(candidate));
        let short = match derived {
            Some(short) => short,
            None => {
                let fallback = ('a'..='z')
                    .chain('A'..='Z')
                    .find(|candidate| !self.claimed.contains(candidate))
                    .ok_or_else(|| SigError::ShortNameExhausted {
                        parameter: parameter.to_owned(),
                    })?;
                warn!(
                    parameter,
                    short = %fallback,
                    "no free short name in parameter name, using fallback"
                );
                fallback
            }
        };
        self.claimed.insert(short);
        Ok(short)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn apple_and_avocado_receive_distinct_aliases() {
        let mut shorts = ShortNames::default();
        assert_eq!(shorts.infer("apple").ok(), Some('a'));
        assert_eq!(shorts.infer("avocado").ok(), Some('A'));
    }

    #[rstest]
    fn help_is_never_inferred() {
        let mut shorts = ShortNames::default();
        assert_eq!(shorts.infer("help").ok(), Some('H'));
    }

    #[rstest]
    fn scanning_moves_to_later_characters() {
        let mut shorts = ShortNames::default();
        shorts.exclude(['b', 'B']);
        assert_eq!(shorts.infer("bar").ok(), Some('a'));
    }

    #[rstest]
    fn exhausted_names_fall_back_alphabetically() {
        let mut shorts = ShortNames::default();
        shorts.exclude(['x', 'X', 'a']);
        assert_eq!(shorts.infer("x").ok(), Some('b'));
    }

    #[rstest]
    fn exhausting_every_letter_fails() {
        let mut shorts = ShortNames::default();
        shorts.exclude(('a'..='z').chain('A'..='Z'));
        assert!(matches!(
            shorts.infer("q"),
            Err(SigError::ShortNameExhausted { ref parameter }) if parameter == "q"
        ));
    }

    #[rstest]
    #[case('h')]
    #[case('v')]
    fn explicit_alias_collides_with_claimed(#[case] short: char) {
        let mut shorts = ShortNames::default();
        shorts.exclude(['v']);
        assert!(matches!(
            shorts.claim_explicit("main", "verbose", short),
            Err(SigError::ParameterCollision { .. })
        ));
    }

    #[rstest]
    fn explicit_alias_must_be_a_letter() {
        let mut shorts = ShortNames::default();
        assert!(matches!(
            shorts.claim_explicit("main", "x", '1'),
            Err(SigError::Signature { .. })
        ));
    }
}
