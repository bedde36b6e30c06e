//! Client capability.

use crate::interfaces::PostRecord;

/// Pre-rendered fragments contributed to the front end.
pub trait ClientPlugin: Send + Sync {
    fn main_feed(&self, posts: &[PostRecord]) -> Option<String>;

    fn home_sidebar(&self) -> Option<String>;
}
