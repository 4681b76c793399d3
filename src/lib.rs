//! Tagged, dated personal memos.
//!
//! [`MemoStore`] owns the memo collection and is the only thing that mutates
//! it. It assigns identifiers, answers tag, date and text queries, and
//! persists to a flat XML notebook file or exports plain text. Presentation
//! is left to callers; the store never prints.

pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod search;
pub mod store;
pub mod types;

pub use error::{MemoError, Result};
pub use store::{MemoStore, DEFAULT_TITLE};
pub use types::{DateBounds, Memo, MemoDate, SearchHit};
