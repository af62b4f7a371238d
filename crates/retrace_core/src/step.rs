//! Step directives for moving a replay cursor.

use crate::error::FormatError;
use crate::policy::DirectivePolicy;
use serde::{Deserialize, Serialize};

/// Cursor movement requested by a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Stay on the current cycle
    Hold,
    /// One cycle forward
    Forward,
    /// One cycle backward
    Backward,
    /// Run to the last cycle
    JumpEnd,
}

impl Step {
    /// Decode the integer wire form: `0`, `1`, `-1`, anything else.
    ///
    /// # Errors
    ///
    /// Under [`DirectivePolicy::Strict`], codes outside {-1, 0, 1} fail
    /// with [`FormatError::UnknownDirective`].
    pub fn from_code(code: i64, policy: DirectivePolicy) -> Result<Self, FormatError> {
        match code {
            0 => Ok(Self::Hold),
            1 => Ok(Self::Forward),
            -1 => Ok(Self::Backward),
            _ => match policy {
                DirectivePolicy::Legacy => Ok(Self::JumpEnd),
                DirectivePolicy::Strict => Err(FormatError::UnknownDirective { code }),
            },
        }
    }

    /// Whether this step can change the cursor position
    #[must_use]
    pub const fn moves(self) -> bool {
        !matches!(self, Self::Hold)
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hold => write!(f, "hold"),
            Self::Forward => write!(f, "forward"),
            Self::Backward => write!(f, "backward"),
            Self::JumpEnd => write!(f, "jump-end"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_codes() {
        let p = DirectivePolicy::Legacy;
        assert_eq!(Step::from_code(0, p), Ok(Step::Hold));
        assert_eq!(Step::from_code(1, p), Ok(Step::Forward));
        assert_eq!(Step::from_code(-1, p), Ok(Step::Backward));
    }

    #[test]
    fn test_legacy_fall_through() {
        assert_eq!(Step::from_code(2, DirectivePolicy::Legacy), Ok(Step::JumpEnd));
        assert_eq!(Step::from_code(-7, DirectivePolicy::Legacy), Ok(Step::JumpEnd));
    }

    #[test]
    fn test_strict_rejects_unknown() {
        assert_eq!(
            Step::from_code(9, DirectivePolicy::Strict),
            Err(FormatError::UnknownDirective { code: 9 })
        );
        assert_eq!(Step::from_code(-1, DirectivePolicy::Strict), Ok(Step::Backward));
    }

    #[test]
    fn test_display() {
        assert_eq!(Step::JumpEnd.to_string(), "jump-end");
        assert!(!Step::Hold.moves());
        assert!(Step::Backward.moves());
    }

    proptest::proptest! {
        #[test]
        fn prop_legacy_never_fails(code: i64) {
            prop_assert!(Step::from_code(code, DirectivePolicy::Legacy).is_ok());
        }

        #[test]
        fn prop_strict_rejects_outside_unit_range(code in proptest::num::i64::ANY) {
            let result = Step::from_code(code, DirectivePolicy::Strict);
            prop_assert_eq!(result.is_ok(), (-1..=1).contains(&code));
        }
    }
}
