//! MIPS-32 back-end.
//!
//! The translator is line-directed: it consumes the textual TAC rendering,
//! classifies each line by shape, and emits standard MIPS-32 mnemonics with
//! a fixed register policy (`t0..t7` direct-mapped to `$t0..$t7`, other
//! names on `$s0..$s7`, then spilled). Shapes outside the lowered set
//! (object stores, array pseudo-ops) become `# unhandled:` comments and are
//! counted, never aborting emission.

mod codegen;
mod line;
mod regalloc;

#[cfg(test)]
mod codegen_tests;
#[cfg(test)]
mod line_tests;
#[cfg(test)]
mod regalloc_tests;

pub use codegen::MipsGen;
pub use regalloc::{AllocError, RegisterAllocator};
