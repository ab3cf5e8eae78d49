//! Semantic analysis: scoped name resolution, the symbol table with its
//! activation-record model, and the type-checking walk.

pub mod scope;
pub mod semantic;
pub mod symbol_table;

#[cfg(test)]
mod scope_tests;
#[cfg(test)]
mod symbol_table_tests;

pub use scope::{ScopeStack, VarInfo};
pub use semantic::{Analysis, TypeTable, analyze};
pub use symbol_table::{ClassInfo, FrameLayout, FuncKey, FunctionInfo, SymbolTable};
