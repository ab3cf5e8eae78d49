//! Inspection dumps for the AST: an indented text form (`ast.txt`) and a
//! Graphviz digraph (`ast.dot`). Explicit per-variant walkers, no
//! reflection.

use std::fmt::Write;

use crate::ast::{Block, Expr, ExprKind, FunctionDecl, Program, Stmt, StmtKind, TypeRef,
    TypeRefKind, VarDecl};

/// Indented field-wise dump of the program.
pub fn dump_text(program: &Program) -> String {
    let mut out = String::new();
    out.push_str("Program\n");
    list(&mut out, 1, "stmts", &program.stmts, stmt_text);
    out
}

fn pad(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

fn line(out: &mut String, indent: usize, text: &str) {
    pad(out, indent);
    out.push_str(text);
    out.push('\n');
}

fn list<T>(out: &mut String, indent: usize, name: &str, items: &[T], f: fn(&mut String, usize, &T)) {
    if items.is_empty() {
        return;
    }
    line(out, indent, &format!(".{name}:"));
    for item in items {
        f(out, indent + 1, item);
    }
}

fn type_ref_text(ty: &TypeRef) -> String {
    match &ty.kind {
        TypeRefKind::Simple(name) => name.clone(),
        TypeRefKind::Array(elem) => format!("{}[]", type_ref_text(elem)),
    }
}

fn var_decl_text(out: &mut String, indent: usize, decl: &VarDecl) {
    line(out, indent, "VarDecl");
    line(out, indent + 1, &format!("name={}", decl.name));
    line(out, indent + 1, &format!("kind={}", decl.kind.as_str()));
    if let Some(ty) = &decl.ty {
        line(out, indent + 1, &format!("type={}", type_ref_text(ty)));
    }
    if let Some(init) = &decl.init {
        line(out, indent + 1, ".init:");
        expr_text(out, indent + 2, init);
    }
}

fn function_text(out: &mut String, indent: usize, f: &FunctionDecl) {
    line(out, indent, "FunctionDecl");
    line(out, indent + 1, &format!("name={}", f.name));
    if !f.params.is_empty() {
        let params = f
            .params
            .iter()
            .map(|p| match &p.ty {
                Some(ty) => format!("{}: {}", p.name, type_ref_text(ty)),
                None => p.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        line(out, indent + 1, &format!("params=({params})"));
    }
    if let Some(ret) = &f.ret {
        line(out, indent + 1, &format!("ret={}", type_ref_text(ret)));
    }
    line(out, indent + 1, ".body:");
    block_text(out, indent + 2, &f.body);
}

fn block_text(out: &mut String, indent: usize, block: &Block) {
    line(out, indent, "Block");
    list(out, indent + 1, "stmts", &block.stmts, stmt_text);
}

fn stmt_text(out: &mut String, indent: usize, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Var(decl) => var_decl_text(out, indent, decl),
        StmtKind::Function(f) => function_text(out, indent, f),
        StmtKind::Class(c) => {
            line(out, indent, "ClassDecl");
            line(out, indent + 1, &format!("name={}", c.name));
            if let Some(base) = &c.base {
                line(out, indent + 1, &format!("base={base}"));
            }
            list(out, indent + 1, "fields", &c.fields, var_decl_text);
            list(out, indent + 1, "methods", &c.methods, function_text);
        }
        StmtKind::Block(b) => block_text(out, indent, b),
        StmtKind::If { cond, then, else_ } => {
            line(out, indent, "If");
            line(out, indent + 1, ".cond:");
            expr_text(out, indent + 2, cond);
            line(out, indent + 1, ".then:");
            block_text(out, indent + 2, then);
            if let Some(else_) = else_ {
                line(out, indent + 1, ".else:");
                block_text(out, indent + 2, else_);
            }
        }
        StmtKind::While { cond, body } => {
            line(out, indent, "While");
            line(out, indent + 1, ".cond:");
            expr_text(out, indent + 2, cond);
            line(out, indent + 1, ".body:");
            block_text(out, indent + 2, body);
        }
        StmtKind::DoWhile { body, cond } => {
            line(out, indent, "DoWhile");
            line(out, indent + 1, ".body:");
            block_text(out, indent + 2, body);
            line(out, indent + 1, ".cond:");
            expr_text(out, indent + 2, cond);
        }
        StmtKind::For {
            init,
            cond,
            update,
            body,
        } => {
            line(out, indent, "For");
            if let Some(init) = init {
                line(out, indent + 1, ".init:");
                stmt_text(out, indent + 2, init);
            }
            if let Some(cond) = cond {
                line(out, indent + 1, ".cond:");
                expr_text(out, indent + 2, cond);
            }
            if let Some(update) = update {
                line(out, indent + 1, ".update:");
                stmt_text(out, indent + 2, update);
            }
            line(out, indent + 1, ".body:");
            block_text(out, indent + 2, body);
        }
        StmtKind::Foreach {
            var_name,
            seq,
            body,
        } => {
            line(out, indent, "Foreach");
            line(out, indent + 1, &format!("var={var_name}"));
            line(out, indent + 1, ".seq:");
            expr_text(out, indent + 2, seq);
            line(out, indent + 1, ".body:");
            block_text(out, indent + 2, body);
        }
        StmtKind::Switch {
            expr,
            cases,
            default,
        } => {
            line(out, indent, "Switch");
            line(out, indent + 1, ".expr:");
            expr_text(out, indent + 2, expr);
            for case in cases {
                line(out, indent + 1, ".case:");
                expr_text(out, indent + 2, &case.value);
                block_text(out, indent + 2, &case.body);
            }
            if let Some(default) = default {
                line(out, indent + 1, ".default:");
                block_text(out, indent + 2, default);
            }
        }
        StmtKind::Break => line(out, indent, "Break"),
        StmtKind::Continue => line(out, indent, "Continue"),
        StmtKind::Return { expr } => {
            line(out, indent, "Return");
            if let Some(expr) = expr {
                line(out, indent + 1, ".expr:");
                expr_text(out, indent + 2, expr);
            }
        }
        StmtKind::TryCatch {
            try_block,
            err_name,
            catch_block,
        } => {
            line(out, indent, "TryCatch");
            line(out, indent + 1, ".try:");
            block_text(out, indent + 2, try_block);
            line(out, indent + 1, &format!("err={err_name}"));
            line(out, indent + 1, ".catch:");
            block_text(out, indent + 2, catch_block);
        }
        StmtKind::Print { expr } => {
            line(out, indent, "Print");
            line(out, indent + 1, ".expr:");
            expr_text(out, indent + 2, expr);
        }
        StmtKind::ExprStmt { expr } => {
            line(out, indent, "ExprStmt");
            line(out, indent + 1, ".expr:");
            expr_text(out, indent + 2, expr);
        }
        StmtKind::Assign { target, value } => {
            line(out, indent, "Assign");
            line(out, indent + 1, ".target:");
            expr_text(out, indent + 2, target);
            line(out, indent + 1, ".value:");
            expr_text(out, indent + 2, value);
        }
    }
}

fn expr_text(out: &mut String, indent: usize, expr: &Expr) {
    match &expr.kind {
        ExprKind::Name(name) => line(out, indent, &format!("Name name={name}")),
        ExprKind::Int(v) => line(out, indent, &format!("LiteralInt value={v}")),
        ExprKind::Float(v) => line(out, indent, &format!("LiteralFloat value={v}")),
        ExprKind::Str(s) => line(out, indent, &format!("LiteralString value=\"{s}\"")),
        ExprKind::Bool(b) => line(out, indent, &format!("LiteralBool value={b}")),
        ExprKind::Null => line(out, indent, "LiteralNull"),
        ExprKind::Member { obj, name } => {
            line(out, indent, &format!("Member name={name}"));
            expr_text(out, indent + 1, obj);
        }
        ExprKind::Index { arr, index } => {
            line(out, indent, "Index");
            expr_text(out, indent + 1, arr);
            expr_text(out, indent + 1, index);
        }
        ExprKind::Call { callee, args } => {
            line(out, indent, "Call");
            expr_text(out, indent + 1, callee);
            list(out, indent + 1, "args", args, expr_text);
        }
        ExprKind::New { class_name, args } => {
            line(out, indent, &format!("New class={class_name}"));
            list(out, indent + 1, "args", args, expr_text);
        }
        ExprKind::Unary { op, expr: operand } => {
            line(out, indent, &format!("Unary op={}", op.as_str()));
            expr_text(out, indent + 1, operand);
        }
        ExprKind::Binary { op, left, right } => {
            line(out, indent, &format!("Binary op={}", op.as_str()));
            expr_text(out, indent + 1, left);
            expr_text(out, indent + 1, right);
        }
        ExprKind::Ternary {
            cond,
            then,
            otherwise,
        } => {
            line(out, indent, "Ternary");
            expr_text(out, indent + 1, cond);
            expr_text(out, indent + 1, then);
            expr_text(out, indent + 1, otherwise);
        }
        ExprKind::ArrayLiteral { elems } => {
            line(out, indent, "ArrayLiteral");
            list(out, indent + 1, "elems", elems, expr_text);
        }
    }
}

/// Graphviz digraph: one box per node, edges labeled with the field name.
pub fn dump_dot(program: &Program) -> String {
    let mut dot = DotBuilder {
        lines: vec![
            "digraph AST {".to_owned(),
            "  node [shape=box, fontname=\"Arial\"];".to_owned(),
        ],
        counter: 0,
    };
    let root = dot.node("Program");
    for stmt in &program.stmts {
        let child = dot.stmt(stmt);
        dot.edge(&root, &child, "stmts");
    }
    dot.lines.push("}".to_owned());
    dot.lines.join("\n")
}

struct DotBuilder {
    lines: Vec<String>,
    counter: u32,
}

impl DotBuilder {
    fn node(&mut self, label: &str) -> String {
        let id = format!("n{}", self.counter);
        self.counter += 1;
        let mut line = String::new();
        write!(line, "  {id} [label=\"{label}\"];").unwrap();
        self.lines.push(line);
        id
    }

    fn edge(&mut self, from: &str, to: &str, label: &str) {
        self.lines.push(format!("  {from} -> {to} [label=\"{label}\"];"));
    }

    fn block(&mut self, block: &Block) -> String {
        let id = self.node("Block");
        for stmt in &block.stmts {
            let child = self.stmt(stmt);
            self.edge(&id, &child, "stmts");
        }
        id
    }

    fn var_decl(&mut self, decl: &VarDecl) -> String {
        let id = self.node(&format!("VarDecl\\nname={}\\nkind={}", decl.name, decl.kind.as_str()));
        if let Some(init) = &decl.init {
            let child = self.expr(init);
            self.edge(&id, &child, "init");
        }
        id
    }

    fn function(&mut self, f: &FunctionDecl) -> String {
        let id = self.node(&format!("FunctionDecl\\nname={}", f.name));
        let body = self.block(&f.body);
        self.edge(&id, &body, "body");
        id
    }

    fn stmt(&mut self, stmt: &Stmt) -> String {
        match &stmt.kind {
            StmtKind::Var(decl) => self.var_decl(decl),
            StmtKind::Function(f) => self.function(f),
            StmtKind::Class(c) => {
                let id = self.node(&format!("ClassDecl\\nname={}", c.name));
                for field in &c.fields {
                    let child = self.var_decl(field);
                    self.edge(&id, &child, "fields");
                }
                for method in &c.methods {
                    let child = self.function(method);
                    self.edge(&id, &child, "methods");
                }
                id
            }
            StmtKind::Block(b) => self.block(b),
            StmtKind::If { cond, then, else_ } => {
                let id = self.node("If");
                let c = self.expr(cond);
                self.edge(&id, &c, "cond");
                let t = self.block(then);
                self.edge(&id, &t, "then");
                if let Some(else_) = else_ {
                    let e = self.block(else_);
                    self.edge(&id, &e, "else");
                }
                id
            }
            StmtKind::While { cond, body } => {
                let id = self.node("While");
                let c = self.expr(cond);
                self.edge(&id, &c, "cond");
                let b = self.block(body);
                self.edge(&id, &b, "body");
                id
            }
            StmtKind::DoWhile { body, cond } => {
                let id = self.node("DoWhile");
                let b = self.block(body);
                self.edge(&id, &b, "body");
                let c = self.expr(cond);
                self.edge(&id, &c, "cond");
                id
            }
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => {
                let id = self.node("For");
                if let Some(init) = init {
                    let child = self.stmt(init);
                    self.edge(&id, &child, "init");
                }
                if let Some(cond) = cond {
                    let child = self.expr(cond);
                    self.edge(&id, &child, "cond");
                }
                if let Some(update) = update {
                    let child = self.stmt(update);
                    self.edge(&id, &child, "update");
                }
                let b = self.block(body);
                self.edge(&id, &b, "body");
                id
            }
            StmtKind::Foreach {
                var_name,
                seq,
                body,
            } => {
                let id = self.node(&format!("Foreach\\nvar={var_name}"));
                let s = self.expr(seq);
                self.edge(&id, &s, "seq");
                let b = self.block(body);
                self.edge(&id, &b, "body");
                id
            }
            StmtKind::Switch {
                expr,
                cases,
                default,
            } => {
                let id = self.node("Switch");
                let e = self.expr(expr);
                self.edge(&id, &e, "expr");
                for case in cases {
                    let v = self.expr(&case.value);
                    self.edge(&id, &v, "case");
                    let b = self.block(&case.body);
                    self.edge(&v, &b, "body");
                }
                if let Some(default) = default {
                    let d = self.block(default);
                    self.edge(&id, &d, "default");
                }
                id
            }
            StmtKind::Break => self.node("Break"),
            StmtKind::Continue => self.node("Continue"),
            StmtKind::Return { expr } => {
                let id = self.node("Return");
                if let Some(expr) = expr {
                    let child = self.expr(expr);
                    self.edge(&id, &child, "expr");
                }
                id
            }
            StmtKind::TryCatch {
                try_block,
                err_name,
                catch_block,
            } => {
                let id = self.node(&format!("TryCatch\\nerr={err_name}"));
                let t = self.block(try_block);
                self.edge(&id, &t, "try");
                let c = self.block(catch_block);
                self.edge(&id, &c, "catch");
                id
            }
            StmtKind::Print { expr } => {
                let id = self.node("Print");
                let child = self.expr(expr);
                self.edge(&id, &child, "expr");
                id
            }
            StmtKind::ExprStmt { expr } => {
                let id = self.node("ExprStmt");
                let child = self.expr(expr);
                self.edge(&id, &child, "expr");
                id
            }
            StmtKind::Assign { target, value } => {
                let id = self.node("Assign");
                let t = self.expr(target);
                self.edge(&id, &t, "target");
                let v = self.expr(value);
                self.edge(&id, &v, "value");
                id
            }
        }
    }

    fn expr(&mut self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Name(name) => self.node(&format!("Name\\nname={name}")),
            ExprKind::Int(v) => self.node(&format!("LiteralInt\\nvalue={v}")),
            ExprKind::Float(v) => self.node(&format!("LiteralFloat\\nvalue={v}")),
            ExprKind::Str(s) => self.node(&format!("LiteralString\\nvalue={}", s.replace('"', "'"))),
            ExprKind::Bool(b) => self.node(&format!("LiteralBool\\nvalue={b}")),
            ExprKind::Null => self.node("LiteralNull"),
            ExprKind::Member { obj, name } => {
                let id = self.node(&format!("Member\\nname={name}"));
                let o = self.expr(obj);
                self.edge(&id, &o, "obj");
                id
            }
            ExprKind::Index { arr, index } => {
                let id = self.node("Index");
                let a = self.expr(arr);
                self.edge(&id, &a, "arr");
                let i = self.expr(index);
                self.edge(&id, &i, "index");
                id
            }
            ExprKind::Call { callee, args } => {
                let id = self.node("Call");
                let c = self.expr(callee);
                self.edge(&id, &c, "callee");
                for arg in args {
                    let a = self.expr(arg);
                    self.edge(&id, &a, "args");
                }
                id
            }
            ExprKind::New { class_name, args } => {
                let id = self.node(&format!("New\\nclass={class_name}"));
                for arg in args {
                    let a = self.expr(arg);
                    self.edge(&id, &a, "args");
                }
                id
            }
            ExprKind::Unary { op, expr: operand } => {
                let id = self.node(&format!("Unary\\nop={}", op.as_str()));
                let o = self.expr(operand);
                self.edge(&id, &o, "expr");
                id
            }
            ExprKind::Binary { op, left, right } => {
                let id = self.node(&format!("Binary\\nop={}", op.as_str()));
                let l = self.expr(left);
                self.edge(&id, &l, "left");
                let r = self.expr(right);
                self.edge(&id, &r, "right");
                id
            }
            ExprKind::Ternary {
                cond,
                then,
                otherwise,
            } => {
                let id = self.node("Ternary");
                let c = self.expr(cond);
                self.edge(&id, &c, "cond");
                let t = self.expr(then);
                self.edge(&id, &t, "then");
                let o = self.expr(otherwise);
                self.edge(&id, &o, "otherwise");
                id
            }
            ExprKind::ArrayLiteral { elems } => {
                let id = self.node("ArrayLiteral");
                for elem in elems {
                    let e = self.expr(elem);
                    self.edge(&id, &e, "elems");
                }
                id
            }
        }
    }
}
