//! Standalone register allocator with spill-to-stack.
//!
//! Keeps the two classic descriptor tables: register → variable and
//! variable → location. Temporaries `$t0..$t9` are handed out first; when
//! none are free, the oldest occupied register is spilled to a stack slot
//! (offsets decrease by 4) and reassigned. Spill/load code accumulates in a
//! buffer the caller drains.

use std::collections::VecDeque;

use indexmap::IndexMap;

/// Where a variable currently lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarLocation {
    Reg(String),
    Stack(i32),
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AllocError {
    #[error("variable '{0}' is not on the stack")]
    NotOnStack(String),
}

pub struct RegisterAllocator {
    temp_regs: VecDeque<String>,
    saved_regs: VecDeque<String>,
    /// Register → variable it holds, in assignment order (the front is the
    /// spill victim).
    register_descriptor: IndexMap<String, String>,
    /// Variable → current location.
    address_descriptor: IndexMap<String, VarLocation>,
    stack_offset: i32,
    spill_code: Vec<String>,
}

impl Default for RegisterAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterAllocator {
    pub fn new() -> Self {
        Self {
            temp_regs: (0..10).map(|i| format!("$t{i}")).collect(),
            saved_regs: (0..8).map(|i| format!("$s{i}")).collect(),
            register_descriptor: IndexMap::new(),
            address_descriptor: IndexMap::new(),
            stack_offset: 0,
            spill_code: Vec::new(),
        }
    }

    /// Register holding `var`, allocating or spilling as needed.
    pub fn get_reg(&mut self, var: &str) -> String {
        if let Some(VarLocation::Reg(reg)) = self.address_descriptor.get(var) {
            return reg.clone();
        }
        if let Some(reg) = self.temp_regs.pop_front() {
            self.assign(reg.clone(), var);
            return reg;
        }
        self.spill_register(var)
    }

    /// Returns a register to its free pool. `false` if it was already free.
    pub fn free_reg(&mut self, reg: &str) -> bool {
        let Some(var) = self.register_descriptor.shift_remove(reg) else {
            return false;
        };
        // Only clear the variable's location if it still points here; it
        // may have been moved to the stack by a spill.
        if self.address_descriptor.get(&var) == Some(&VarLocation::Reg(reg.to_owned())) {
            self.address_descriptor.shift_remove(&var);
        }
        if reg.starts_with("$t") {
            self.temp_regs.push_back(reg.to_owned());
        } else if reg.starts_with("$s") {
            self.saved_regs.push_back(reg.to_owned());
        }
        true
    }

    /// Brings a stack-resident variable back into a register.
    pub fn load_from_stack(&mut self, var: &str) -> Result<String, AllocError> {
        let Some(VarLocation::Stack(stack_pos)) = self.address_descriptor.get(var).cloned() else {
            return Err(AllocError::NotOnStack(var.to_owned()));
        };
        // May itself spill another register.
        let reg = self.get_reg(var);
        self.spill_code
            .push(format!("lw {reg}, {stack_pos}($sp)  # Load {var}"));
        self.assign(reg.clone(), var);
        Ok(reg)
    }

    /// Drains the accumulated spill/load code.
    pub fn take_spill_code(&mut self) -> Vec<String> {
        std::mem::take(&mut self.spill_code)
    }

    pub fn location_of(&self, var: &str) -> Option<&VarLocation> {
        self.address_descriptor.get(var)
    }

    fn assign(&mut self, reg: String, var: &str) {
        self.register_descriptor.insert(reg.clone(), var.to_owned());
        self.address_descriptor
            .insert(var.to_owned(), VarLocation::Reg(reg));
    }

    /// Evicts the oldest occupied register to the stack and hands it to
    /// `new_var`.
    fn spill_register(&mut self, new_var: &str) -> String {
        let (reg, victim) = self
            .register_descriptor
            .first()
            .map(|(r, v)| (r.clone(), v.clone()))
            .expect("no free registers implies an occupied one");

        self.stack_offset -= 4;
        let stack_pos = self.stack_offset;
        self.spill_code
            .push(format!("sw {reg}, {stack_pos}($sp)  # Spill {victim}"));
        self.address_descriptor
            .insert(victim, VarLocation::Stack(stack_pos));

        self.register_descriptor.shift_remove(&reg);
        self.assign(reg.clone(), new_var);
        reg
    }
}
