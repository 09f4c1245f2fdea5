//! Engine types
//!
//! The invocation request and the statistics reported for it.

use crate::request::BoundParameters;
use crate::types::JsonValue;
use serde::Serialize;

/// One command invocation as the caller described it
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Command name, case-insensitive
    pub command: String,
    /// Parameter bindings by name, not yet validated
    pub parameters: BoundParameters,
    /// Selector: `*`, `Field` or `^Parameter`
    pub select: Option<String>,
    /// Legacy switch echoing the operation's pass-through parameter
    pub pass_thru: bool,
    /// Skip the confirmation prompt
    pub force: bool,
    /// Describe the call without making it
    pub what_if: bool,
    /// Fetch a single page and leave continuation to the caller
    pub no_auto_iteration: bool,
    /// Token to resume a paginated listing from
    pub starting_token: Option<String>,
}

impl Invocation {
    /// Create an invocation of a command with no parameters
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    /// Bind a parameter
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.parameters.bind(name, value);
        self
    }

    /// Set the selector
    #[must_use]
    pub fn select(mut self, selector: impl Into<String>) -> Self {
        self.select = Some(selector.into());
        self
    }

    /// Echo the pass-through parameter
    #[must_use]
    pub fn pass_thru(mut self) -> Self {
        self.pass_thru = true;
        self
    }

    /// Skip confirmation
    #[must_use]
    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }

    /// Describe only
    #[must_use]
    pub fn what_if(mut self) -> Self {
        self.what_if = true;
        self
    }

    /// Fetch a single page
    #[must_use]
    pub fn no_auto_iteration(mut self) -> Self {
        self.no_auto_iteration = true;
        self
    }

    /// Resume a listing from a token
    #[must_use]
    pub fn starting_token(mut self, token: impl Into<String>) -> Self {
        self.starting_token = Some(token.into());
        self
    }
}

/// Statistics from one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvocationStats {
    /// Transport calls made
    pub calls: u32,
    /// Pages processed
    pub pages: u32,
    /// Objects emitted to the sink
    pub outputs: usize,
    /// No call was made: what-if, or the prompt was declined
    pub skipped: bool,
    /// Token to continue from after a manual-mode page
    pub next_token: Option<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl InvocationStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a transport call
    pub fn add_call(&mut self) {
        self.calls += 1;
    }

    /// Count a page
    pub fn add_page(&mut self) {
        self.pages += 1;
    }

    /// Count emitted outputs
    pub fn add_outputs(&mut self, count: usize) {
        self.outputs += count;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
