//! Nesting depth tracking across re-entrant invocations
//!
//! Contexts nest by re-running `with` from inside a context, so the depth
//! lives in an environment variable that each child inherits on spawn.
//! Siblings started from the same parent do not see each other's changes.

use std::env;
use tracing::warn;

/// Environment variable carrying the current nesting depth
pub const DEPTH_VAR: &str = "WITH_DEPTH";

fn parse(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}

/// Depth after entering a context, given the inherited value
///
/// Missing or malformed values count as 0.
pub fn depth_after_enter(raw: Option<&str>) -> u32 {
    raw.and_then(parse).unwrap_or(0).saturating_add(1)
}

/// Depth after leaving a context, given the current value
///
/// Missing or malformed values count as 1, and the result never drops
/// below 0.
pub fn depth_after_exit(raw: Option<&str>) -> u32 {
    raw.and_then(parse).unwrap_or(1).saturating_sub(1)
}

/// Environment-backed depth counter
#[derive(Debug, Clone)]
pub struct DepthCounter {
    var: String,
}

impl Default for DepthCounter {
    fn default() -> Self {
        Self::new(DEPTH_VAR)
    }
}

impl DepthCounter {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }

    fn raw(&self) -> Option<String> {
        let raw = env::var(&self.var).ok();
        if let Some(value) = &raw {
            if parse(value).is_none() {
                warn!(var = %self.var, value = %value, "ignoring malformed depth value");
            }
        }
        raw
    }

    /// Current depth, 0 when unset or malformed
    pub fn current(&self) -> u32 {
        env::var(&self.var)
            .ok()
            .and_then(|v| parse(&v))
            .unwrap_or(0)
    }

    /// Enter one level and return the new depth
    pub fn increment(&self) -> u32 {
        let depth = depth_after_enter(self.raw().as_deref());
        env::set_var(&self.var, depth.to_string());
        depth
    }

    /// Leave one level and return the new depth
    pub fn decrement(&self) -> u32 {
        let depth = depth_after_exit(self.raw().as_deref());
        env::set_var(&self.var, depth.to_string());
        depth
    }
}
