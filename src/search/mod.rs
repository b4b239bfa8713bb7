//! Search module
//!
//! Case-insensitive name search over the whole sandbox tree.

mod operations;
mod results;

pub use operations::{MAX_SEARCH_RESULTS, search_tree};
pub use results::{SearchHit, SearchResults};
