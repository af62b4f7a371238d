//! Replay policies.

use serde::{Deserialize, Serialize};

/// What FORWARD does when the cursor already sits on the last cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Stay on the last cycle
    #[default]
    Clamp,
    /// Look up the nonexistent next cycle and fail
    Strict,
}

/// How step codes outside {-1, 0, 1} are read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectivePolicy {
    /// Any other code means jump to end
    #[default]
    Legacy,
    /// Any other code is rejected
    Strict,
}
