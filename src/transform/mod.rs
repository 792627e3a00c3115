//! Dataset wrappers that reindex a wrapped dataset without copying it.

mod selection;

pub use selection::*;
