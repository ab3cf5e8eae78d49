//! TAC generation: a single post-order walk over the typed AST.
//!
//! Temporaries come from a free-list pool so that linear expression chains
//! reuse one name: for arithmetic, an operand that is already a temporary
//! becomes the destination instead of minting a new one. Labels are
//! `L0, L1, ...`; function entry labels are the function name itself.


use compiscript_tac::{BinOp, Operand, Tac, UnOp};

use crate::ast::{
    BinaryOp, Block, ClassDecl, Expr, ExprKind, FunctionDecl, Program, Stmt, StmtKind, UnaryOp,
    VarDecl,
};

/// Free-list of temporary names. `release` returns a name to the pool iff
/// it carries the temporary prefix.
pub struct TempPool {
    prefix: &'static str,
    free: Vec<String>,
    counter: u32,
}

impl TempPool {
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            free: Vec::new(),
            counter: 0,
        }
    }

    pub fn acquire(&mut self) -> String {
        if let Some(name) = self.free.pop() {
            return name;
        }
        let name = format!("{}{}", self.prefix, self.counter);
        self.counter += 1;
        name
    }

    pub fn release(&mut self, name: &str) {
        if name.starts_with(self.prefix) {
            self.free.push(name.to_owned());
        }
    }
}

pub struct TacGen {
    code: Vec<Tac>,
    temps: TempPool,
    label_count: u32,
    break_stack: Vec<String>,
    continue_stack: Vec<String>,
}

/// Lowers a whole program to a linear TAC sequence.
pub fn generate(program: &Program) -> Vec<Tac> {
    let mut generator = TacGen::new();
    for stmt in &program.stmts {
        generator.visit_stmt(stmt);
    }
    generator.code
}

impl Default for TacGen {
    fn default() -> Self {
        Self::new()
    }
}

impl TacGen {
    pub fn new() -> Self {
        Self {
            code: Vec::new(),
            temps: TempPool::new("t"),
            label_count: 0,
            break_stack: Vec::new(),
            continue_stack: Vec::new(),
        }
    }

    fn new_label(&mut self) -> String {
        let label = format!("L{}", self.label_count);
        self.label_count += 1;
        label
    }

    fn emit(&mut self, instr: Tac) {
        self.code.push(instr);
    }

    fn release(&mut self, op: &Operand) {
        if let Operand::Name(name) = op {
            self.temps.release(name);
        }
    }

    // --- statements ---

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Var(decl) => self.visit_var_decl(decl),
            StmtKind::Function(f) => self.visit_function(f),
            StmtKind::Class(c) => self.visit_class(c),
            StmtKind::Block(b) => self.visit_block(b),
            StmtKind::If { cond, then, else_ } => self.visit_if(cond, then, else_.as_ref()),
            StmtKind::While { cond, body } => self.visit_while(cond, body),
            StmtKind::DoWhile { body, cond } => self.visit_do_while(body, cond),
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => self.visit_for(init.as_deref(), cond.as_ref(), update.as_deref(), body),
            StmtKind::Foreach {
                var_name,
                seq,
                body,
            } => self.visit_foreach(var_name, seq, body),
            StmtKind::Switch {
                expr,
                cases,
                default,
            } => self.visit_switch(expr, cases, default.as_ref()),
            StmtKind::Break => {
                if let Some(target) = self.break_stack.last().cloned() {
                    self.emit(Tac::Jump { target });
                }
            }
            StmtKind::Continue => {
                if let Some(target) = self.continue_stack.last().cloned() {
                    self.emit(Tac::Jump { target });
                }
            }
            StmtKind::Return { expr } => match expr {
                Some(expr) => {
                    let value = self.visit_expr(expr);
                    self.emit(Tac::Return {
                        value: Some(value.clone()),
                    });
                    self.release(&value);
                }
                None => self.emit(Tac::Return { value: None }),
            },
            StmtKind::TryCatch {
                try_block,
                err_name,
                catch_block,
            } => self.visit_try_catch(try_block, err_name, catch_block),
            StmtKind::Print { expr } => {
                let value = self.visit_expr(expr);
                self.emit(Tac::Param {
                    value: value.clone(),
                });
                self.emit(Tac::Call {
                    target: None,
                    name: "print".to_owned(),
                    num_params: 1,
                });
                self.release(&value);
            }
            StmtKind::ExprStmt { expr } => {
                let value = self.visit_expr(expr);
                self.release(&value);
            }
            StmtKind::Assign { target, value } => self.visit_assign(target, value),
        }
    }

    fn visit_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.visit_stmt(stmt);
        }
    }

    fn visit_var_decl(&mut self, decl: &VarDecl) {
        if let Some(init) = &decl.init {
            let rhs = self.visit_expr(init);
            self.emit(Tac::Assign {
                target: decl.name.clone(),
                source: rhs.clone(),
            });
            self.release(&rhs);
        }
    }

    fn visit_function(&mut self, f: &FunctionDecl) {
        self.emit(Tac::Label {
            name: f.name.clone(),
        });
        self.emit(Tac::BeginFunc);
        self.visit_block(&f.body);
        self.emit(Tac::EndFunc);
    }

    fn visit_class(&mut self, c: &ClassDecl) {
        // Field initializers belong to object construction, which stays a
        // back-end stub; only method bodies lower to code.
        for method in &c.methods {
            self.visit_function(method);
        }
    }

    fn visit_if(&mut self, cond: &Expr, then: &Block, else_: Option<&Block>) {
        let cond_op = self.visit_expr(cond);
        match else_ {
            Some(else_block) => {
                let else_label = self.new_label();
                let end_label = self.new_label();
                self.emit(Tac::CondJump {
                    condition: cond_op.clone(),
                    target: else_label.clone(),
                });
                self.release(&cond_op);
                self.visit_block(then);
                self.emit(Tac::Jump {
                    target: end_label.clone(),
                });
                self.emit(Tac::Label { name: else_label });
                self.visit_block(else_block);
                self.emit(Tac::Label { name: end_label });
            }
            None => {
                let end_label = self.new_label();
                self.emit(Tac::CondJump {
                    condition: cond_op.clone(),
                    target: end_label.clone(),
                });
                self.release(&cond_op);
                self.visit_block(then);
                self.emit(Tac::Label { name: end_label });
            }
        }
    }

    fn visit_while(&mut self, cond: &Expr, body: &Block) {
        let start_label = self.new_label();
        let end_label = self.new_label();

        self.emit(Tac::Label {
            name: start_label.clone(),
        });
        let cond_op = self.visit_expr(cond);
        self.emit(Tac::CondJump {
            condition: cond_op.clone(),
            target: end_label.clone(),
        });
        self.release(&cond_op);

        self.break_stack.push(end_label.clone());
        self.continue_stack.push(start_label.clone());
        self.visit_block(body);
        self.continue_stack.pop();
        self.break_stack.pop();

        self.emit(Tac::Jump {
            target: start_label,
        });
        self.emit(Tac::Label { name: end_label });
    }

    /// `start: body; cond: c; if_false c goto end; goto start; end:` - the
    /// false-jump exits when the condition no longer holds, which is the
    /// natural do-while semantics.
    fn visit_do_while(&mut self, body: &Block, cond: &Expr) {
        let start_label = self.new_label();
        let cond_label = self.new_label();
        let end_label = self.new_label();

        self.emit(Tac::Label {
            name: start_label.clone(),
        });
        self.break_stack.push(end_label.clone());
        self.continue_stack.push(cond_label.clone());
        self.visit_block(body);
        self.continue_stack.pop();
        self.break_stack.pop();

        self.emit(Tac::Label { name: cond_label });
        let cond_op = self.visit_expr(cond);
        self.emit(Tac::CondJump {
            condition: cond_op.clone(),
            target: end_label.clone(),
        });
        self.release(&cond_op);
        self.emit(Tac::Jump {
            target: start_label,
        });
        self.emit(Tac::Label { name: end_label });
    }

    fn visit_for(
        &mut self,
        init: Option<&Stmt>,
        cond: Option<&Expr>,
        update: Option<&Stmt>,
        body: &Block,
    ) {
        let start_label = self.new_label();
        let end_label = self.new_label();
        let update_label = self.new_label();

        if let Some(init) = init {
            self.visit_stmt(init);
        }
        self.emit(Tac::Label {
            name: start_label.clone(),
        });
        if let Some(cond) = cond {
            let cond_op = self.visit_expr(cond);
            self.emit(Tac::CondJump {
                condition: cond_op.clone(),
                target: end_label.clone(),
            });
            self.release(&cond_op);
        }

        self.break_stack.push(end_label.clone());
        self.continue_stack.push(update_label.clone());
        self.visit_block(body);
        self.continue_stack.pop();
        self.break_stack.pop();

        self.emit(Tac::Label { name: update_label });
        if let Some(update) = update {
            self.visit_stmt(update);
        }
        self.emit(Tac::Jump {
            target: start_label,
        });
        self.emit(Tac::Label { name: end_label });
    }

    /// Index loop over the sequence: `i := 0; start: len := s length; c :=
    /// i < len; if_false c goto end; x := s[i]; body; next: i := i + 1;
    /// goto start; end:`.
    fn visit_foreach(&mut self, var_name: &str, seq: &Expr, body: &Block) {
        let start_label = self.new_label();
        let end_label = self.new_label();
        let next_label = self.new_label();

        let seq_op = self.visit_expr(seq);
        let index = self.temps.acquire();
        self.emit(Tac::Assign {
            target: index.clone(),
            source: Operand::Int(0),
        });

        self.emit(Tac::Label {
            name: start_label.clone(),
        });
        let length = self.temps.acquire();
        self.emit(Tac::BinaryOp {
            target: length.clone(),
            left: seq_op.clone(),
            op: BinOp::Length,
            right: Operand::Int(0),
        });
        let cond = self.temps.acquire();
        self.emit(Tac::BinaryOp {
            target: cond.clone(),
            left: Operand::name(index.clone()),
            op: BinOp::Lt,
            right: Operand::name(length.clone()),
        });
        self.emit(Tac::CondJump {
            condition: Operand::name(cond.clone()),
            target: end_label.clone(),
        });
        self.temps.release(&cond);
        self.temps.release(&length);

        let elem = self.temps.acquire();
        self.emit(Tac::BinaryOp {
            target: elem.clone(),
            left: seq_op.clone(),
            op: BinOp::IndexGet,
            right: Operand::name(index.clone()),
        });
        self.emit(Tac::Assign {
            target: var_name.to_owned(),
            source: Operand::name(elem.clone()),
        });
        self.temps.release(&elem);

        self.break_stack.push(end_label.clone());
        self.continue_stack.push(next_label.clone());
        self.visit_block(body);
        self.continue_stack.pop();
        self.break_stack.pop();

        self.emit(Tac::Label { name: next_label });
        self.emit(Tac::BinaryOp {
            target: index.clone(),
            left: Operand::name(index.clone()),
            op: BinOp::Add,
            right: Operand::Int(1),
        });
        self.emit(Tac::Jump {
            target: start_label,
        });
        self.emit(Tac::Label { name: end_label });
        self.temps.release(&index);
        self.release(&seq_op);
    }

    /// Comparison chain: each case tests `v == k` and falls through to the
    /// next on mismatch; every case body jumps to the common end.
    fn visit_switch(
        &mut self,
        expr: &Expr,
        cases: &[crate::ast::SwitchCase],
        default: Option<&Block>,
    ) {
        let value = self.visit_expr(expr);
        let end_label = self.new_label();

        self.break_stack.push(end_label.clone());
        for case in cases {
            let next_label = self.new_label();
            let case_value = self.visit_expr(&case.value);
            let cond = self.temps.acquire();
            self.emit(Tac::BinaryOp {
                target: cond.clone(),
                left: value.clone(),
                op: BinOp::Eq,
                right: case_value.clone(),
            });
            self.emit(Tac::CondJump {
                condition: Operand::name(cond.clone()),
                target: next_label.clone(),
            });
            self.temps.release(&cond);
            self.release(&case_value);

            self.visit_block(&case.body);
            self.emit(Tac::Jump {
                target: end_label.clone(),
            });
            self.emit(Tac::Label { name: next_label });
        }
        if let Some(default) = default {
            self.visit_block(default);
        }
        self.break_stack.pop();

        self.emit(Tac::Label { name: end_label });
        self.release(&value);
    }

    /// Exception dispatch is symbolic: the catch arm binds the error value
    /// and is only reachable through the `catch` label.
    fn visit_try_catch(&mut self, try_block: &Block, err_name: &str, catch_block: &Block) {
        let try_label = self.new_label();
        let catch_label = self.new_label();
        let end_label = self.new_label();

        self.emit(Tac::Label { name: try_label });
        self.visit_block(try_block);
        self.emit(Tac::Jump {
            target: end_label.clone(),
        });

        self.emit(Tac::Label { name: catch_label });
        self.emit(Tac::Assign {
            target: err_name.to_owned(),
            source: Operand::name("error"),
        });
        self.visit_block(catch_block);

        self.emit(Tac::Label { name: end_label });
    }

    fn visit_assign(&mut self, target: &Expr, value: &Expr) {
        match &target.kind {
            ExprKind::Name(name) => {
                let rhs = self.visit_expr(value);
                self.emit(Tac::Assign {
                    target: name.clone(),
                    source: rhs.clone(),
                });
                self.release(&rhs);
            }
            ExprKind::Member { obj, name } => {
                let obj_op = self.visit_expr(obj);
                let rhs = self.visit_expr(value);
                self.emit(Tac::SetField {
                    object: obj_op.clone(),
                    field: name.clone(),
                    value: rhs.clone(),
                });
                self.release(&rhs);
                self.release(&obj_op);
            }
            ExprKind::Index { arr, index } => {
                let arr_op = self.visit_expr(arr);
                let idx_op = self.visit_expr(index);
                let rhs = self.visit_expr(value);
                self.emit(Tac::SetIndex {
                    array: arr_op.clone(),
                    index: idx_op.clone(),
                    value: rhs.clone(),
                });
                self.release(&rhs);
                self.release(&idx_op);
                self.release(&arr_op);
            }
            _ => {
                let rhs = self.visit_expr(value);
                self.release(&rhs);
            }
        }
    }

    // --- expressions ---

    fn visit_expr(&mut self, expr: &Expr) -> Operand {
        match &expr.kind {
            ExprKind::Int(v) => Operand::Int(*v),
            ExprKind::Float(v) => Operand::Float(*v),
            ExprKind::Str(s) => Operand::Str(s.clone()),
            ExprKind::Bool(b) => Operand::Bool(*b),
            ExprKind::Null => Operand::Null,
            ExprKind::Name(name) => Operand::name(name.clone()),
            ExprKind::Unary { op, expr: operand } => {
                let source = self.visit_expr(operand);
                let target = self.temps.acquire();
                self.emit(Tac::UnaryOp {
                    target: target.clone(),
                    op: match op {
                        UnaryOp::Neg => UnOp::Neg,
                        UnaryOp::Not => UnOp::Not,
                    },
                    source: source.clone(),
                });
                self.release(&source);
                Operand::name(target)
            }
            ExprKind::Binary { op, left, right } => self.visit_binary(*op, left, right),
            ExprKind::Ternary {
                cond,
                then,
                otherwise,
            } => self.visit_ternary(cond, then, otherwise),
            ExprKind::ArrayLiteral { elems } => self.visit_array_literal(elems),
            ExprKind::Member { obj, name } => {
                let obj_op = self.visit_expr(obj);
                let target = self.temps.acquire();
                self.emit(Tac::BinaryOp {
                    target: target.clone(),
                    left: obj_op.clone(),
                    op: BinOp::FieldGet,
                    right: Operand::Str(name.clone()),
                });
                self.release(&obj_op);
                Operand::name(target)
            }
            ExprKind::Index { arr, index } => {
                let arr_op = self.visit_expr(arr);
                let idx_op = self.visit_expr(index);
                let target = self.temps.acquire();
                self.emit(Tac::BinaryOp {
                    target: target.clone(),
                    left: arr_op.clone(),
                    op: BinOp::IndexGet,
                    right: idx_op.clone(),
                });
                self.release(&idx_op);
                self.release(&arr_op);
                Operand::name(target)
            }
            ExprKind::Call { callee, args } => self.visit_call(callee, args),
            ExprKind::New { class_name, args } => self.visit_new(class_name, args),
        }
    }

    fn visit_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Operand {
        let left_op = self.visit_expr(left);
        let right_op = self.visit_expr(right);
        let tac_op = Self::lower_binop(op);

        // Arithmetic reuses a temporary operand as the destination, which
        // keeps linear chains on a single temporary.
        if matches!(op, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div) {
            let target = if left_op.is_temp() {
                left_op.as_name().unwrap().to_owned()
            } else if right_op.is_temp() {
                right_op.as_name().unwrap().to_owned()
            } else {
                self.temps.acquire()
            };
            self.emit(Tac::BinaryOp {
                target: target.clone(),
                left: left_op.clone(),
                op: tac_op,
                right: right_op.clone(),
            });
            if left_op.as_name() != Some(target.as_str()) {
                self.release(&left_op);
            }
            if right_op.as_name() != Some(target.as_str()) {
                self.release(&right_op);
            }
            return Operand::name(target);
        }

        let target = self.temps.acquire();
        self.emit(Tac::BinaryOp {
            target: target.clone(),
            left: left_op.clone(),
            op: tac_op,
            right: right_op.clone(),
        });
        self.release(&left_op);
        self.release(&right_op);
        Operand::name(target)
    }

    fn lower_binop(op: BinaryOp) -> BinOp {
        match op {
            BinaryOp::Add => BinOp::Add,
            BinaryOp::Sub => BinOp::Sub,
            BinaryOp::Mul => BinOp::Mul,
            BinaryOp::Div => BinOp::Div,
            BinaryOp::Mod => BinOp::Mod,
            BinaryOp::Lt => BinOp::Lt,
            BinaryOp::Le => BinOp::Le,
            BinaryOp::Gt => BinOp::Gt,
            BinaryOp::Ge => BinOp::Ge,
            BinaryOp::Eq => BinOp::Eq,
            BinaryOp::Ne => BinOp::Ne,
            BinaryOp::And => BinOp::And,
            BinaryOp::Or => BinOp::Or,
        }
    }

    /// Both arms assign into the same temporary; the false label holds the
    /// else arm so the false-jump lands there.
    fn visit_ternary(&mut self, cond: &Expr, then: &Expr, otherwise: &Expr) -> Operand {
        let false_label = self.new_label();
        let end_label = self.new_label();

        let cond_op = self.visit_expr(cond);
        self.emit(Tac::CondJump {
            condition: cond_op.clone(),
            target: false_label.clone(),
        });
        self.release(&cond_op);

        let target = self.temps.acquire();
        let then_op = self.visit_expr(then);
        self.emit(Tac::Assign {
            target: target.clone(),
            source: then_op.clone(),
        });
        self.release(&then_op);
        self.emit(Tac::Jump {
            target: end_label.clone(),
        });

        self.emit(Tac::Label { name: false_label });
        let else_op = self.visit_expr(otherwise);
        self.emit(Tac::Assign {
            target: target.clone(),
            source: else_op.clone(),
        });
        self.release(&else_op);

        self.emit(Tac::Label { name: end_label });
        Operand::name(target)
    }

    fn visit_array_literal(&mut self, elems: &[Expr]) -> Operand {
        let target = self.temps.acquire();
        self.emit(Tac::Assign {
            target: target.clone(),
            source: Operand::EmptyArray,
        });
        for elem in elems {
            let elem_op = self.visit_expr(elem);
            self.emit(Tac::BinaryOp {
                target: target.clone(),
                left: Operand::name(target.clone()),
                op: BinOp::Append,
                right: elem_op.clone(),
            });
            self.release(&elem_op);
        }
        Operand::name(target)
    }

    /// Arguments evaluate left to right, then the params are emitted as one
    /// run so nested calls cannot interleave their own. Method calls pass
    /// the receiver as the first param.
    fn visit_call(&mut self, callee: &Expr, args: &[Expr]) -> Operand {
        let (name, receiver) = match &callee.kind {
            ExprKind::Name(f) if f != "this" => (f.clone(), None),
            ExprKind::Member { obj, name } => {
                let obj_op = self.visit_expr(obj);
                (name.clone(), Some(obj_op))
            }
            _ => {
                let op = self.visit_expr(callee);
                self.release(&op);
                ("unknown_call".to_owned(), None)
            }
        };

        let arg_ops: Vec<Operand> = args.iter().map(|a| self.visit_expr(a)).collect();
        let mut num_params = arg_ops.len();
        if let Some(receiver) = &receiver {
            self.emit(Tac::Param {
                value: receiver.clone(),
            });
            num_params += 1;
        }
        for op in &arg_ops {
            self.emit(Tac::Param { value: op.clone() });
        }

        let target = self.temps.acquire();
        self.emit(Tac::Call {
            target: Some(target.clone()),
            name,
            num_params,
        });
        for op in &arg_ops {
            self.release(op);
        }
        if let Some(receiver) = &receiver {
            self.release(receiver);
        }
        Operand::name(target)
    }

    fn visit_new(&mut self, class_name: &str, args: &[Expr]) -> Operand {
        let arg_ops: Vec<Operand> = args.iter().map(|a| self.visit_expr(a)).collect();
        for op in &arg_ops {
            self.emit(Tac::Param { value: op.clone() });
        }
        let target = self.temps.acquire();
        self.emit(Tac::Call {
            target: Some(target.clone()),
            name: format!("new_{class_name}"),
            num_params: arg_ops.len(),
        });
        for op in &arg_ops {
            self.release(op);
        }
        Operand::name(target)
    }
}
