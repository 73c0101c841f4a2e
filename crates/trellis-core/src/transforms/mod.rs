//! Rewrite passes over the syntax tree.

pub mod optimize;
pub mod substitute;
pub mod use_count;

pub use optimize::{always, Optimizer};
pub use substitute::Substitution;
pub use use_count::UseCounter;
