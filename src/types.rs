use std::fmt;

use serde::Deserialize;

/// How a task may be dispatched once it is ready.
///
/// - `Parallel`: the task joins the concurrent batch of its wave (default).
/// - `Sequential`: the task only ever runs inside the strictly-ordered run of
///   a wave, after that wave's parallel batch has fully settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcurrencyMode {
    Parallel,
    Sequential,
}

impl ConcurrencyMode {
    pub fn is_parallel(self) -> bool {
        matches!(self, ConcurrencyMode::Parallel)
    }
}

impl Default for ConcurrencyMode {
    fn default() -> Self {
        ConcurrencyMode::Parallel
    }
}

impl fmt::Display for ConcurrencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcurrencyMode::Parallel => f.write_str("parallel"),
            ConcurrencyMode::Sequential => f.write_str("sequential"),
        }
    }
}
