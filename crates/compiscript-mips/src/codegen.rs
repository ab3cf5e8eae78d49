//! The line-directed TAC → MIPS-32 translator.
//!
//! Emission goes into two buffers: `main_buffer` for top-level code and a
//! per-function buffer that gets wrapped with the prologue/epilogue when the
//! function ends. The final program is the synthetic `main` harness, the
//! user functions, then the runtime helpers.

use std::collections::HashMap;

use crate::line::{TacLine, classify, is_ident, is_int_literal, is_temp};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    Reg(String),
    Spill(i32),
}

pub struct MipsGen {
    lines: Vec<String>,
    out_asm: Vec<String>,
    main_buffer: Vec<String>,
    func_name: String,

    // Per-function state, reset by `start_function`.
    local_map: HashMap<String, Location>,
    next_spill_offset: i32,
    next_s_reg: usize,
    call_args: Vec<String>,
    in_function: bool,
    current_func_buffer: Vec<String>,

    unhandled_count: usize,
}

impl MipsGen {
    pub fn new(tac_text: &str) -> Self {
        Self {
            lines: tac_text
                .lines()
                .map(str::trim_end)
                .filter(|l| !l.trim().is_empty())
                .map(str::to_owned)
                .collect(),
            out_asm: Vec::new(),
            main_buffer: Vec::new(),
            func_name: String::new(),
            local_map: HashMap::new(),
            next_spill_offset: 4,
            next_s_reg: 0,
            call_args: Vec::new(),
            in_function: false,
            current_func_buffer: Vec::new(),
            unhandled_count: 0,
        }
    }

    /// TAC lines the translator could not lower; they are left as comments.
    pub fn unhandled_count(&self) -> usize {
        self.unhandled_count
    }

    fn emit(&mut self, line: impl Into<String>) {
        let line = line.into();
        if self.in_function {
            self.current_func_buffer.push(line);
        } else {
            self.main_buffer.push(line);
        }
    }

    fn unhandled(&mut self, line: &str) {
        self.unhandled_count += 1;
        self.emit(format!("  # unhandled: {line}"));
    }

    fn start_function(&mut self, label: &str) {
        self.func_name = if label == "main" {
            "user_main".to_owned()
        } else {
            label.to_owned()
        };
        self.local_map.clear();
        self.next_spill_offset = 4;
        self.next_s_reg = 0;
        self.call_args.clear();
        self.in_function = true;
        self.current_func_buffer.clear();
    }

    fn end_function(&mut self) {
        if !self.in_function {
            return;
        }
        let saved_s_regs = self.next_s_reg;
        let frame_size = 4 + (4 * saved_s_regs as i32) + self.next_spill_offset;

        let mut prologue = vec![
            String::new(),
            format!("# --- function {} ---", self.func_name),
            format!("{}:", self.func_name),
            format!("  addiu $sp, $sp, -{frame_size}"),
            format!("  sw $ra, {}($sp)", frame_size - 4),
        ];
        for i in 0..saved_s_regs {
            prologue.push(format!("  sw $s{i}, {}($sp)", frame_size - 8 - 4 * i as i32));
        }

        let mut epilogue = vec![format!(".epilogue_{}:", self.func_name)];
        for i in (0..saved_s_regs).rev() {
            epilogue.push(format!("  lw $s{i}, {}($sp)", frame_size - 8 - 4 * i as i32));
        }
        epilogue.push(format!("  lw $ra, {}($sp)", frame_size - 4));
        epilogue.push(format!("  addiu $sp, $sp, {frame_size}"));
        epilogue.push("  jr $ra".to_owned());

        self.out_asm.extend(prologue);
        self.out_asm.append(&mut self.current_func_buffer);
        self.out_asm.extend(epilogue);
        self.in_function = false;
    }

    /// Register or spill slot for an operand. `t0..t7` map straight onto
    /// `$t0..$t7`; everything else takes `$s` registers until they run out,
    /// then a stack slot.
    fn op_location(&mut self, op: &str) -> Location {
        if let Some(loc) = self.local_map.get(op) {
            return loc.clone();
        }
        if is_temp(op) {
            let idx: usize = op[1..].parse().unwrap_or(usize::MAX);
            if idx < 8 {
                let loc = Location::Reg(format!("$t{idx}"));
                self.local_map.insert(op.to_owned(), loc.clone());
                return loc;
            }
        }
        let loc = if self.next_s_reg < 8 {
            let reg = format!("$s{}", self.next_s_reg);
            self.next_s_reg += 1;
            Location::Reg(reg)
        } else {
            let offset = self.next_spill_offset;
            self.next_spill_offset += 4;
            Location::Spill(offset)
        };
        self.local_map.insert(op.to_owned(), loc.clone());
        loc
    }

    /// `true`/`false`/`null` load as immediates; strings and floats stay
    /// runtime stubs.
    fn immediate_of(op: &str) -> Option<String> {
        if is_int_literal(op) {
            return Some(op.to_owned());
        }
        match op {
            "true" => Some("1".to_owned()),
            "false" | "null" => Some("0".to_owned()),
            _ => None,
        }
    }

    fn load_op(&mut self, op: &str, dest_reg: &str) {
        if let Some(imm) = Self::immediate_of(op) {
            self.emit(format!("  li {dest_reg}, {imm}"));
            return;
        }
        if !is_ident(op) {
            self.unhandled(&format!("load {op}"));
            return;
        }
        match self.op_location(op) {
            Location::Reg(reg) => {
                if reg != dest_reg {
                    self.emit(format!("  move {dest_reg}, {reg}"));
                }
            }
            Location::Spill(offset) => {
                self.emit(format!("  lw {dest_reg}, -{offset}($sp)"));
            }
        }
    }

    fn store_op(&mut self, src_reg: &str, dest_op: &str) {
        match self.op_location(dest_op) {
            Location::Reg(reg) => {
                if reg != src_reg {
                    self.emit(format!("  move {reg}, {src_reg}"));
                }
            }
            Location::Spill(offset) => {
                self.emit(format!("  sw {src_reg}, -{offset}($sp)"));
            }
        }
    }

    pub fn translate(&mut self) -> String {
        let mut i = 0;
        while i < self.lines.len() {
            let raw = self.lines[i].clone();
            let parsed = classify(&raw);

            match parsed {
                TacLine::Label(name) => {
                    let next_is_begin = self
                        .lines
                        .get(i + 1)
                        .is_some_and(|l| l.trim() == "BeginFunc");
                    if next_is_begin {
                        self.end_function();
                        self.start_function(name);
                        i += 2;
                        continue;
                    }
                    self.emit(format!("{name}:"));
                }
                TacLine::BeginFunc => {}
                TacLine::EndFunc => self.end_function(),
                TacLine::Goto(target) => self.emit(format!("  j {target}")),
                TacLine::IfFalse { cond, target } => {
                    let cond = cond.to_owned();
                    let target = target.to_owned();
                    if let Some(Location::Reg(reg)) = self.local_map.get(&cond).cloned() {
                        self.emit(format!("  beq {reg}, $zero, {target}"));
                    } else {
                        self.load_op(&cond, "$t8");
                        self.emit(format!("  beq $t8, $zero, {target}"));
                    }
                }
                TacLine::Param(value) => self.call_args.push(value.to_owned()),
                TacLine::Call {
                    dest,
                    name,
                    num_args,
                } => {
                    let dest = dest.map(str::to_owned);
                    let name = if name == "main" { "user_main" } else { name }.to_owned();
                    let args: Vec<String> = std::mem::take(&mut self.call_args);
                    let n = num_args.min(args.len());
                    for (j, arg) in args.iter().enumerate().take(n.min(4)) {
                        self.load_op(arg, &format!("$a{j}"));
                    }
                    // Args beyond $a3 ride on the stack, pushed one word at
                    // a time and popped in one adjustment after the call.
                    for arg in args.iter().take(n).skip(4) {
                        self.emit("  addiu $sp, $sp, -4");
                        self.load_op(arg, "$t8");
                        self.emit("  sw $t8, 0($sp)");
                    }
                    self.emit(format!("  jal {name}"));
                    if n > 4 {
                        self.emit(format!("  addiu $sp, $sp, {}", 4 * (n - 4)));
                    }
                    if let Some(dest) = dest {
                        self.store_op("$v0", &dest);
                    }
                }
                TacLine::Return(value) => {
                    if !self.in_function {
                        self.unhandled(&raw);
                    } else {
                        if let Some(value) = value {
                            let value = value.to_owned();
                            self.load_op(&value, "$v0");
                        }
                        self.emit(format!("  j .epilogue_{}", self.func_name));
                    }
                }
                TacLine::Binary {
                    dest,
                    left,
                    op,
                    right,
                } => {
                    let (dest, left, op, right) =
                        (dest.to_owned(), left.to_owned(), op.to_owned(), right.to_owned());
                    self.translate_binary(&dest, &left, &op, &right, &raw);
                }
                TacLine::Unary { dest, op, operand } => {
                    let (dest, op, operand) = (dest.to_owned(), op.to_owned(), operand.to_owned());
                    self.load_op(&operand, "$t8");
                    match op.as_str() {
                        "-" => self.emit("  sub $t8, $zero, $t8"),
                        _ => self.emit("  seq $t8, $t8, $zero"),
                    }
                    self.store_op("$t8", &dest);
                }
                TacLine::Copy { dest, src } => {
                    let (dest, src) = (dest.to_owned(), src.to_owned());
                    self.translate_copy(&dest, &src, &raw);
                }
                TacLine::Other(_) => self.unhandled(&raw),
            }
            i += 1;
        }
        self.end_function();

        self.assemble()
    }

    fn mnemonic_of(op: &str) -> Option<&'static str> {
        Some(match op {
            "+" => "add",
            "-" => "sub",
            "*" => "mul",
            "/" | "%" => "div",
            "<" => "slt",
            ">" => "sgt",
            "<=" => "sle",
            ">=" => "sge",
            "==" => "seq",
            "!=" => "sne",
            "&&" => "and",
            "||" => "or",
            _ => return None,
        })
    }

    fn translate_binary(&mut self, dest: &str, left: &str, op: &str, right: &str, raw: &str) {
        let Some(mnemonic) = Self::mnemonic_of(op) else {
            self.unhandled(raw);
            return;
        };
        self.load_op(left, "$t8");
        self.load_op(right, "$t9");
        self.emit(format!("  {mnemonic} $t8, $t8, $t9"));
        if op == "/" {
            self.emit("  mflo $t8");
        } else if op == "%" {
            self.emit("  mfhi $t8");
        }
        self.store_op("$t8", dest);
    }

    fn translate_copy(&mut self, dest: &str, src: &str, raw: &str) {
        if let Some(imm) = Self::immediate_of(src) {
            match self.op_location(dest) {
                Location::Reg(reg) => self.emit(format!("  li {reg}, {imm}")),
                Location::Spill(_) => {
                    self.emit(format!("  li $t8, {imm}"));
                    self.store_op("$t8", dest);
                }
            }
            return;
        }
        if !is_ident(src) {
            // Strings, floats, fresh arrays: runtime stubs.
            self.unhandled(raw);
            return;
        }
        let src_loc = self.op_location(src);
        let dest_loc = self.op_location(dest);
        match (dest_loc, src_loc) {
            (Location::Reg(d), Location::Reg(s)) => {
                if d != s {
                    self.emit(format!("  move {d}, {s}"));
                }
            }
            (Location::Reg(d), Location::Spill(off)) => {
                self.emit(format!("  lw {d}, -{off}($sp)"));
            }
            (Location::Spill(_), Location::Reg(s)) => {
                self.store_op(&s, dest);
            }
            (Location::Spill(_), Location::Spill(off)) => {
                self.emit(format!("  lw $t8, -{off}($sp)"));
                self.store_op("$t8", dest);
            }
        }
    }

    /// Stitches the final program: data segment, synthetic `main`, user
    /// functions, runtime helpers.
    fn assemble(&mut self) -> String {
        let has_user_main = self
            .out_asm
            .iter()
            .any(|line| line.trim() == "user_main:");

        let mut program = vec![
            "# MIPS-32 assembly generated from TAC".to_owned(),
            ".data".to_owned(),
            "newline: .asciiz \"\\n\"".to_owned(),
            String::new(),
            ".text".to_owned(),
            ".globl main".to_owned(),
            "main:".to_owned(),
            "  addiu $sp, $sp, -256".to_owned(),
            "  sw $ra, 252($sp)".to_owned(),
        ];
        program.append(&mut self.main_buffer);
        if has_user_main {
            program.push("  jal user_main".to_owned());
        }
        program.extend([
            "  lw $ra, 252($sp)".to_owned(),
            "  addiu $sp, $sp, 256".to_owned(),
            "  li $v0, 10".to_owned(),
            "  syscall".to_owned(),
            String::new(),
        ]);
        program.append(&mut self.out_asm);

        program.extend([
            String::new(),
            "# --- runtime helpers ---".to_owned(),
            "print:".to_owned(),
            "  li $v0, 1".to_owned(),
            "  syscall".to_owned(),
            "  li $v0, 4".to_owned(),
            "  la $a0, newline".to_owned(),
            "  syscall".to_owned(),
            "  jr $ra".to_owned(),
        ]);

        let mut text = program.join("\n");
        text.push('\n');
        text
    }
}
