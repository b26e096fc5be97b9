mod dedupe;

pub use dedupe::{Dedupe, DedupeResult};
