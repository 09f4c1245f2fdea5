//! Confirmation of state-changing operations
//!
//! Operations declare a `confirm_impact`. When the impact reaches the
//! context's confirm preference the caller is asked before any call is made,
//! unless the invocation is forced. A what-if invocation describes the call
//! and stops.

use crate::error::Result;
use crate::types::ConfirmImpact;
use async_trait::async_trait;
use std::fmt;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

/// What is about to happen, shown to the person confirming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationPrompt {
    pub command: String,
    pub operation: String,
    pub target: Option<String>,
    pub impact: ConfirmImpact,
}

impl fmt::Display for ConfirmationPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Performing the operation \"{} ({})\" on target \"{}\".",
            self.command,
            self.operation,
            self.target.as_deref().unwrap_or("(none)")
        )
    }
}

/// Asks whether to proceed
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> Result<bool>;
}

/// Fixed answer, for scripts and tests
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

#[async_trait]
impl Confirmer for AutoConfirm {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> Result<bool> {
        debug!("Auto-answering {} with {}", prompt.command, self.0);
        Ok(self.0)
    }
}

/// Prompts on stderr and reads the answer from stdin
///
/// Only `y` or `yes` proceed; end of input declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirmer;

#[async_trait]
impl Confirmer for StdinConfirmer {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> Result<bool> {
        let mut stderr = tokio::io::stderr();
        stderr
            .write_all(format!("Are you sure you want to perform this action?\n{prompt}\n[y] Yes  [N] No: ").as_bytes())
            .await?;
        stderr.flush().await?;

        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        Ok(is_yes(&line))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Outcome of the confirmation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Make the call
    Proceed,
    /// What-if: describe and stop
    WhatIf,
    /// The prompt was declined
    Declined,
}

/// Whether an operation's impact calls for a prompt
///
/// A `none` impact never prompts, and a `none` preference disables prompting.
pub fn needs_confirmation(impact: ConfirmImpact, preference: ConfirmImpact) -> bool {
    impact != ConfirmImpact::None && preference != ConfirmImpact::None && impact >= preference
}

/// Run the confirmation step for one invocation
pub async fn decide(
    confirmer: &dyn Confirmer,
    prompt: &ConfirmationPrompt,
    preference: ConfirmImpact,
    force: bool,
    what_if: bool,
) -> Result<Decision> {
    if what_if {
        info!("What if: {prompt}");
        return Ok(Decision::WhatIf);
    }
    if force || !needs_confirmation(prompt.impact, preference) {
        return Ok(Decision::Proceed);
    }
    if confirmer.confirm(prompt).await? {
        Ok(Decision::Proceed)
    } else {
        info!("Declined: {prompt}");
        Ok(Decision::Declined)
    }
}
