//! Core data structures shared across the Compiscript compiler pipeline.
//!
//! - `types` - the type lattice and assignability rules
//! - `span` - byte spans and line/column recovery

pub mod span;
pub mod types;

#[cfg(test)]
mod types_tests;

pub use span::{LineIndex, Span};
pub use types::{
    Ty, are_eq_comparable, are_order_comparable, can_concat_with_plus, is_assignable,
    numeric_result, type_equals,
};
