//! Test oracles derived from sample rows.
//!
//! Every oracle reads the immutable rows produced by
//! [`generate_rows`](crate::generators::generate_rows) and never synthesizes
//! values of its own beyond deliberate constraint violations.

pub mod invalid;
pub mod patch;
pub mod search;

pub use invalid::{InvalidCase, enumerate_invalid};
pub use patch::{PatchCase, enumerate_patch_invalid};
pub use search::{SearchCase, SearchKind, build_search_cases};
