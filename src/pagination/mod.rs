//! Pagination module
//!
//! Continuation-token pagination for list operations.
//!
//! # Overview
//!
//! A list call returns a page of items plus an optional opaque token. The
//! loop feeds each returned token into the next call until a page comes back
//! without one, or stops after a single page when the caller has taken manual
//! control. States: `Start` -> `Fetching` -> `Done`.

mod pager;
mod types;

pub use pager::{collect_items, paginate, PageSource};
pub use types::{NextPage, Page, PaginationMode, PaginationState, Phase, TokenPagination};
