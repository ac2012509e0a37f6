//! Restart strategies (§4.3), BEAM-inspired `OneForOne`/`OneForAll`/
//! `RestForOne` semantics collapsed into a single enum — the strategy is
//! picked per supervisor at construction time rather than encoded as a
//! generic type parameter, since supervisors here are stored behind a
//! dynamic registry rather than monomorphized.

use serde::{Deserialize, Serialize};

/// Which siblings restart when one child fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestartStrategy {
    /// Restart only the failed child.
    OneForOne,
    /// Restart every child under the supervisor.
    OneForAll,
    /// Restart the failed child and every child started after it.
    RestForOne,
}
