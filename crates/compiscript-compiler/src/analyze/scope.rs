//! Variable bindings and the lexically nested scope stack.

use compiscript_core::Ty;
use indexmap::IndexMap;

/// The compiler's record of a named entity (variable, parameter, local).
///
/// Created at declaration. Mutated in exactly two ways afterwards: type
/// inference when an `<unknown>` binding receives its first typed
/// assignment, and address assignment (frame offset or global memory
/// address) done by the symbol table.
#[derive(Clone, PartialEq, Debug)]
pub struct VarInfo {
    pub name: String,
    pub ty: Ty,
    pub is_const: bool,
    /// Declaration site, for dumps and error reporting.
    pub line: u32,
    pub col: u32,
    pub frame_offset: Option<i32>,
    pub memory_address: Option<String>,
    pub is_global: bool,
    pub is_parameter: bool,
    /// Lexical level at declaration; 0 is the global frame.
    pub level: usize,
}

impl VarInfo {
    pub fn new(name: impl Into<String>, ty: Ty, is_const: bool, line: u32, col: u32) -> Self {
        Self {
            name: name.into(),
            ty,
            is_const,
            line,
            col,
            frame_offset: None,
            memory_address: None,
            is_global: false,
            is_parameter: false,
            level: 0,
        }
    }
}

/// Stack of name→binding frames. Frame 0 is the global scope and outlives
/// every pop; inner frames die when their block exits.
#[derive(Clone, Debug)]
pub struct ScopeStack {
    stack: Vec<IndexMap<String, VarInfo>>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            stack: vec![IndexMap::new()],
        }
    }

    pub fn push(&mut self) {
        self.stack.push(IndexMap::new());
    }

    pub fn pop(&mut self) {
        // Frame 0 must survive; a stray pop would orphan the globals.
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Current lexical level; 0 is global.
    pub fn level(&self) -> usize {
        self.stack.len() - 1
    }

    /// Declares into the innermost frame. `false` on same-scope collision;
    /// shadowing an outer level is allowed and silent.
    pub fn declare(&mut self, name: &str, info: VarInfo) -> bool {
        let frame = self.stack.last_mut().expect("at least one frame");
        if frame.contains_key(name) {
            return false;
        }
        frame.insert(name.to_owned(), info);
        true
    }

    /// Whether the innermost frame already binds `name`.
    pub fn declared_in_current(&self, name: &str) -> bool {
        self.stack
            .last()
            .expect("at least one frame")
            .contains_key(name)
    }

    /// Innermost-outward lookup.
    pub fn resolve(&self, name: &str) -> Option<&VarInfo> {
        self.stack.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn resolve_mut(&mut self, name: &str) -> Option<&mut VarInfo> {
        self.stack
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(name))
    }

    /// Bindings of the global frame, in declaration order.
    pub fn globals(&self) -> impl Iterator<Item = (&str, &VarInfo)> {
        self.stack[0].iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn globals_mut(&mut self) -> impl Iterator<Item = (&str, &mut VarInfo)> {
        self.stack[0].iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// All frames, outermost first. Used by the symbol-table dump.
    pub fn frames(&self) -> impl Iterator<Item = &IndexMap<String, VarInfo>> {
        self.stack.iter()
    }
}
