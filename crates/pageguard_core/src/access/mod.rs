//! Request origin allow-listing.

/// Host and bypass-pattern decisions.
pub mod guard;
/// Segment-wise path pattern matching.
pub mod path_matcher;

pub use guard::{check_referer, AccessGuard, Decision};
pub use path_matcher::{matches, referer_host};
