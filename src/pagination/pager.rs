//! Paginated fetch loop
//!
//! Drives a `PageSource` through the token protocol and yields pages as a
//! stream. Calls are strictly sequential; a failed call ends the stream.

use super::types::{Page, PaginationMode, PaginationState, TokenPagination};
use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Something that can fetch one page given a continuation token
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page for `token` (`None` for the first page without a start token)
    async fn fetch_page(&self, token: Option<&str>) -> Result<Value>;
}

/// Stream every page of a list operation
///
/// The token passed to call N+1 is the token returned by call N. The stream
/// ends after the first page in manual mode, when a page carries no token in
/// automatic mode, or right after yielding an error.
pub fn paginate<'a>(
    source: &'a dyn PageSource,
    pagination: &'a TokenPagination,
    start_token: Option<String>,
    mode: PaginationMode,
    cancel: &'a CancellationToken,
) -> BoxStream<'a, Result<Page>> {
    let state = PaginationState::starting_at(start_token);

    stream::unfold(state, move |mut state| async move {
        if state.is_done() {
            return None;
        }

        let number = state.next_page_number();
        let result = fetch_one(source, state.token.as_deref(), cancel).await;

        let page = result.and_then(|response| {
            let items = pagination.items(&response)?;
            let next = pagination.process_response(&response, items.len(), mode, &mut state)?;
            trace!(page = number, ?next, "Processed page");
            Ok(Page {
                number,
                items,
                next_token: state.token.clone(),
                response,
            })
        });

        match page {
            Ok(page) => {
                debug!(
                    page = page.number,
                    items = page.items.len(),
                    more = !state.is_done(),
                    "Fetched page"
                );
                Some((Ok(page), state))
            }
            Err(e) => {
                state.mark_done();
                let e = if number > 1 {
                    Error::page_failed(number, e)
                } else {
                    e
                };
                Some((Err(e), state))
            }
        }
    })
    .boxed()
}

/// One call, raced against cancellation
async fn fetch_one(
    source: &dyn PageSource,
    token: Option<&str>,
    cancel: &CancellationToken,
) -> Result<Value> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Error::Cancelled),
        result = source.fetch_page(token) => result,
    }
}

/// Collect every page's items, stopping at the first failure
pub async fn collect_items(
    source: &dyn PageSource,
    pagination: &TokenPagination,
    start_token: Option<String>,
    mode: PaginationMode,
    cancel: &CancellationToken,
) -> Result<Vec<Value>> {
    let mut pages = paginate(source, pagination, start_token, mode, cancel);
    let mut items = Vec::new();
    while let Some(page) = pages.next().await {
        items.extend(page?.items);
    }
    Ok(items)
}
