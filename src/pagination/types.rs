//! Pagination types
//!
//! Defines the continuation-token protocol shared by every list operation.

use crate::error::{Error, Result};
use crate::loader::OperationDefinition;
use serde_json::Value;

/// Result of processing one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Fetch again with this token
    Continue {
        /// Token for the next call, exactly as returned by the service
        token: String,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Create a continuation with a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self::Continue {
            token: token.into(),
        }
    }

    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue { .. })
    }
}

/// Who drives pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaginationMode {
    /// Keep fetching until the service stops returning a token
    #[default]
    Auto,
    /// Fetch exactly one page; the caller handles continuation
    Manual,
}

impl PaginationMode {
    /// Manual when the caller opted out of auto-iteration or bound the token parameter
    ///
    /// A resume token supplied any other way does not switch to manual mode.
    pub fn resolve(no_auto_iteration: bool, token_parameter_bound: bool) -> Self {
        if no_auto_iteration || token_parameter_bound {
            Self::Manual
        } else {
            Self::Auto
        }
    }
}

/// Lifecycle of a pagination run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No call made yet
    #[default]
    Start,
    /// At least one call made, more may follow
    Fetching,
    /// Terminal; no further calls
    Done,
}

/// Tracks pagination state during iteration
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Token for the next call
    pub token: Option<String>,
    /// Pages fetched so far
    pub pages_fetched: u32,
    /// Items fetched so far
    pub items_fetched: u64,
    /// Current phase
    pub phase: Phase,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state that starts from a caller-supplied token
    pub fn starting_at(token: Option<String>) -> Self {
        Self {
            token,
            ..Self::default()
        }
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.phase = Phase::Done;
    }

    /// Is pagination complete?
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// 1-based number of the page about to be fetched
    pub fn next_page_number(&self) -> u32 {
        self.pages_fetched + 1
    }
}

/// Token pagination of one list operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPagination {
    /// Parameter carrying the token (user-facing name)
    pub input_parameter: String,
    /// Request member the token is written to
    pub input_member: String,
    /// Response field holding the next token
    pub output_token: String,
    /// Response field holding the page items
    pub items: String,
}

impl TokenPagination {
    /// Create a token pagination config
    pub fn new(
        input_parameter: impl Into<String>,
        input_member: impl Into<String>,
        output_token: impl Into<String>,
        items: impl Into<String>,
    ) -> Self {
        Self {
            input_parameter: input_parameter.into(),
            input_member: input_member.into(),
            output_token: output_token.into(),
            items: items.into(),
        }
    }

    /// Derive from an operation's model, if it is paginated
    pub fn from_operation(op: &OperationDefinition) -> Option<Self> {
        let def = op.pagination.as_ref()?;
        let input = op.parameter(&def.input_token)?;
        Some(Self::new(
            input.name.clone(),
            input.member(),
            def.output_token.clone(),
            def.items.clone(),
        ))
    }

    /// Extract the page items; an omitted list is an empty page
    pub fn items(&self, body: &Value) -> Result<Vec<Value>> {
        match body.get(&self.items) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(other) => Err(Error::decode(format!(
                "Expected '{}' to be a list, got {other}",
                self.items
            ))),
        }
    }

    /// Extract the continuation token; empty strings count as absent
    pub fn next_token(&self, body: &Value) -> Result<Option<String>> {
        match body.get(&self.output_token) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(Error::decode(format!(
                "Expected '{}' to be a string token, got {other}",
                self.output_token
            ))),
        }
    }

    /// Process a response and advance the state machine
    pub fn process_response(
        &self,
        body: &Value,
        records_count: usize,
        mode: PaginationMode,
        state: &mut PaginationState,
    ) -> Result<NextPage> {
        let token = self.next_token(body)?;
        state.pages_fetched += 1;
        state.items_fetched += records_count as u64;
        state.phase = Phase::Fetching;

        match (mode, token) {
            (PaginationMode::Manual, token) => {
                state.token = token;
                state.mark_done();
                Ok(NextPage::Done)
            }
            (PaginationMode::Auto, None) => {
                state.token = None;
                state.mark_done();
                Ok(NextPage::Done)
            }
            (PaginationMode::Auto, Some(token)) => {
                state.token = Some(token.clone());
                Ok(NextPage::with_token(token))
            }
        }
    }
}

/// One fetched page
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based page number
    pub number: u32,
    /// The page's items, in service order
    pub items: Vec<Value>,
    /// Token returned with this page
    pub next_token: Option<String>,
    /// Full response body
    pub response: Value,
}
