//! The symbol table: function and class registries, activation-record
//! layout, and address/label minting.
//!
//! Registries are insertion-ordered so that memory addresses and labels are
//! minted deterministically in source declaration order. The table is the
//! only structure shared across passes: read-write during analysis, then
//! frozen except for the monotonic address/label counters that run right
//! before TAC generation.

use compiscript_core::Ty;
use indexmap::IndexMap;

use super::scope::{ScopeStack, VarInfo};

/// Registry key for functions: `(owning class, name)`; `None` for globals.
pub type FuncKey = (Option<String>, String);

/// Fixed offsets of the activation record, relative to FP.
pub const STATIC_LINK_OFFSET: i32 = -8;
pub const DYNAMIC_LINK_OFFSET: i32 = 0;
pub const RETURN_ADDR_OFFSET: i32 = 8;

/// Offset table for one function's activation record. Locals grow upward
/// from +16; parameters grow downward from -16.
#[derive(Clone, PartialEq, Debug)]
pub struct FrameLayout {
    pub next_local_offset: i32,
    pub next_param_offset: i32,
    pub locals: IndexMap<String, i32>,
    pub params: IndexMap<String, i32>,
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLayout {
    pub fn new() -> Self {
        Self {
            next_local_offset: 16,
            next_param_offset: -16,
            locals: IndexMap::new(),
            params: IndexMap::new(),
        }
    }

    pub fn alloc_local(&mut self, name: &str, size: i32) -> i32 {
        let off = self.next_local_offset;
        self.locals.insert(name.to_owned(), off);
        self.next_local_offset += size;
        off
    }

    pub fn alloc_param(&mut self, name: &str, size: i32) -> i32 {
        let off = self.next_param_offset;
        self.params.insert(name.to_owned(), off);
        self.next_param_offset -= size;
        off
    }

    /// Frozen into `FunctionInfo::stack_size` on function exit.
    pub fn frame_size(&self) -> i32 {
        self.next_local_offset
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct FunctionInfo {
    pub name: String,
    pub params: Vec<VarInfo>,
    pub ret: Ty,
    pub is_method: bool,
    pub is_constructor: bool,
    pub label: Option<String>,
    pub stack_size: i32,
    pub local_vars: Vec<VarInfo>,
    pub level: usize,
    pub frame: FrameLayout,
    pub owning_class: Option<String>,
}

impl FunctionInfo {
    pub fn new(
        name: impl Into<String>,
        params: Vec<VarInfo>,
        ret: Ty,
        is_method: bool,
        is_constructor: bool,
        owning_class: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            ret,
            is_method,
            is_constructor,
            label: None,
            stack_size: 0,
            local_vars: Vec::new(),
            level: 0,
            frame: FrameLayout::new(),
            owning_class,
        }
    }

    pub fn key(&self) -> FuncKey {
        (self.owning_class.clone(), self.name.clone())
    }

    pub fn param_types(&self) -> Vec<Ty> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct ClassInfo {
    pub name: String,
    pub base: Option<String>,
    pub fields: IndexMap<String, VarInfo>,
    pub methods: IndexMap<String, FunctionInfo>,
    pub vtable_label: Option<String>,
    pub size: i32,
}

impl ClassInfo {
    pub fn new(
        name: impl Into<String>,
        base: Option<String>,
        fields: IndexMap<String, VarInfo>,
        methods: IndexMap<String, FunctionInfo>,
    ) -> Self {
        Self {
            name: name.into(),
            base,
            fields,
            methods,
            vtable_label: None,
            size: 0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    pub scopes: ScopeStack,
    functions: IndexMap<FuncKey, FunctionInfo>,
    classes: IndexMap<String, ClassInfo>,
    next_memory_address: u32,
    next_label_id: u32,
    func_stack: Vec<FuncKey>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: ScopeStack::new(),
            ..Default::default()
        }
    }

    // --- variables ---

    /// Declares into the current scope; level-0 bindings are marked global.
    pub fn declare_var(&mut self, name: &str, mut info: VarInfo) -> bool {
        info.level = self.scopes.level();
        if self.scopes.level() == 0 {
            info.is_global = true;
        }
        self.scopes.declare(name, info)
    }

    pub fn resolve_var(&self, name: &str) -> Option<&VarInfo> {
        self.scopes.resolve(name)
    }

    pub fn resolve_var_mut(&mut self, name: &str) -> Option<&mut VarInfo> {
        self.scopes.resolve_mut(name)
    }

    // --- functions ---

    /// Registers a function. Fails on a duplicate `(class, name)` key.
    /// Records the current lexical level and a fresh frame layout.
    pub fn declare_func(&mut self, mut finfo: FunctionInfo) -> bool {
        let key = finfo.key();
        if self.functions.contains_key(&key) {
            return false;
        }
        finfo.level = self.scopes.level();
        finfo.frame = FrameLayout::new();
        self.functions.insert(key, finfo);
        true
    }

    pub fn resolve_func(&self, key: &FuncKey) -> Option<&FunctionInfo> {
        self.functions.get(key)
    }

    pub fn resolve_global_func(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.get(&(None, name.to_owned()))
    }

    pub fn functions(&self) -> impl Iterator<Item = (&FuncKey, &FunctionInfo)> {
        self.functions.iter()
    }

    /// Whether a global (non-method) function with this name exists.
    pub fn is_global_func(&self, name: &str) -> bool {
        self.functions.contains_key(&(None, name.to_owned()))
    }

    /// Opens the function's scope and assigns parameter offsets with the
    /// layout's downward allocator; parameters are declared into the new
    /// scope with `is_parameter` set.
    pub fn enter_function(&mut self, key: &FuncKey) {
        self.scopes.push();
        let level = self.scopes.level();
        self.func_stack.push(key.clone());

        let mut declared = Vec::new();
        if let Some(finfo) = self.functions.get_mut(key) {
            for i in 0..finfo.params.len() {
                let name = finfo.params[i].name.clone();
                let size = finfo.params[i].ty.size();
                let off = finfo.frame.alloc_param(&name, size);
                let p = &mut finfo.params[i];
                p.is_parameter = true;
                p.frame_offset = Some(off);
                p.level = level;
                declared.push(p.clone());
            }
        }
        for p in declared {
            let name = p.name.clone();
            self.scopes.declare(&name, p);
        }
    }

    /// Closes the function's scope and freezes its `stack_size`.
    pub fn leave_function(&mut self) {
        self.scopes.pop();
        if let Some(key) = self.func_stack.pop()
            && let Some(finfo) = self.functions.get_mut(&key)
        {
            finfo.stack_size = finfo.frame.frame_size();
        }
    }

    pub fn current_function(&self) -> Option<&FunctionInfo> {
        self.func_stack.last().and_then(|k| self.functions.get(k))
    }

    /// Allocates an upward frame offset on the current function for a local
    /// and records the binding in `local_vars`.
    pub fn allocate_local(&mut self, info: &mut VarInfo) -> i32 {
        let Some(key) = self.func_stack.last() else {
            return 0;
        };
        let Some(finfo) = self.functions.get_mut(key) else {
            return 0;
        };
        let off = finfo.frame.alloc_local(&info.name, info.ty.size());
        info.frame_offset = Some(off);
        info.level = self.scopes.level();
        info.is_global = false;
        finfo.local_vars.push(info.clone());
        off
    }

    // --- classes ---

    pub fn declare_class(&mut self, cinfo: ClassInfo) -> bool {
        if self.classes.contains_key(&cinfo.name) {
            return false;
        }
        self.classes.insert(cinfo.name.clone(), cinfo);
        true
    }

    pub fn resolve_class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values()
    }

    // --- address and label minting ---

    fn allocate_memory_address(&mut self) -> String {
        let address = format!("mem_{}", self.next_memory_address);
        self.next_memory_address += 1;
        address
    }

    /// Mints `mem_0, mem_1, ...` for every global without an address, in
    /// declaration order.
    pub fn assign_memory_addresses(&mut self) {
        let mut next = self.next_memory_address;
        for (_, info) in self.scopes.globals_mut() {
            if info.memory_address.is_none() {
                info.memory_address = Some(format!("mem_{next}"));
                info.is_global = true;
                next += 1;
            }
        }
        self.next_memory_address = next;
    }

    /// Gives every unlabeled function `func_<name>`.
    pub fn assign_function_labels(&mut self) {
        for finfo in self.functions.values_mut() {
            if finfo.label.is_none() {
                finfo.label = Some(format!("func_{}", finfo.name));
            }
        }
    }

    /// Monotonic label counter shared by all passes that mint labels here.
    pub fn generate_label(&mut self, prefix: &str) -> String {
        let label = format!("{prefix}{}", self.next_label_id);
        self.next_label_id += 1;
        label
    }

    /// `(level, frame offset)` for FP-relative addressing; globals report
    /// `(0, None)` and carry their address on the binding.
    pub fn address_of(&self, name: &str) -> (usize, Option<i32>) {
        match self.resolve_var(name) {
            None => (0, None),
            Some(v) if v.is_global => (0, None),
            Some(v) => (v.level, v.frame_offset),
        }
    }

    // --- dump ---

    pub fn dump(&self) -> String {
        let mut lines = vec!["--- Symbol Table ---".to_owned()];

        lines.push("Variables:".to_owned());
        for (i, frame) in self.scopes.frames().enumerate() {
            lines.push(format!("  Scope {i}:"));
            for (name, info) in frame {
                let addr = info.memory_address.as_deref().unwrap_or("N/A");
                lines.push(format!(
                    "    {name} -> type={}, const={}, frame_off={}, level={}, global={}, addr={addr}",
                    info.ty,
                    info.is_const,
                    info.frame_offset
                        .map_or_else(|| "N/A".to_owned(), |o| o.to_string()),
                    info.level,
                    info.is_global,
                ));
            }
        }

        lines.push("Functions:".to_owned());
        for ((class, _), finfo) in &self.functions {
            let params = finfo
                .params
                .iter()
                .map(|p| {
                    format!(
                        "{}:{}@{}",
                        p.name,
                        p.ty,
                        p.frame_offset
                            .map_or_else(|| "N/A".to_owned(), |o| o.to_string())
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            let label = finfo.label.as_deref().unwrap_or("N/A");
            let qualified = match class {
                Some(c) => format!("{c}.{}", finfo.name),
                None => finfo.name.clone(),
            };
            lines.push(format!(
                "  {qualified}({params}) -> {}, label={label}, stack_size={}, locals={:?}",
                finfo.ret,
                finfo.stack_size,
                finfo
                    .frame
                    .locals
                    .iter()
                    .map(|(n, o)| (n.as_str(), *o))
                    .collect::<Vec<_>>(),
            ));
        }

        lines.push("Classes:".to_owned());
        for cinfo in self.classes.values() {
            lines.push(format!(
                "  class {} extends {}",
                cinfo.name,
                cinfo.base.as_deref().unwrap_or("None")
            ));
            for (mname, m) in &cinfo.methods {
                let params = m
                    .params
                    .iter()
                    .map(|p| format!("{}:{}", p.name, p.ty))
                    .collect::<Vec<_>>()
                    .join(", ");
                lines.push(format!("    method {mname}({params}) -> {}", m.ret));
            }
            for (fname, f) in &cinfo.fields {
                lines.push(format!("    field {fname}: {}", f.ty));
            }
        }
        lines.join("\n")
    }
}
