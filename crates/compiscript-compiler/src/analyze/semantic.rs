//! The semantic analyzer: a single AST walk that resolves names, annotates
//! every expression with a type, populates the symbol table, and accumulates
//! diagnostics.
//!
//! Errors never abort the walk; the offending expression is typed
//! `<unknown>` and analysis continues, so one mistake does not cascade into
//! a wall of spurious findings. The walk also computes the per-statement
//! "always returns" property, flags unreachable code, validates overrides,
//! and records closure captures per function.

use std::collections::{HashMap, HashSet};

use compiscript_core::{
    LineIndex, Span, Ty, are_eq_comparable, are_order_comparable, can_concat_with_plus,
    is_assignable, numeric_result, type_equals,
};
use indexmap::{IndexMap, IndexSet};

use super::scope::VarInfo;
use super::symbol_table::{ClassInfo, FuncKey, FunctionInfo, SymbolTable};
use crate::ast::{
    BinaryOp, Block, ClassDecl, DeclKind, Expr, ExprKind, FunctionDecl, NodeId, Program, Stmt,
    StmtKind, TypeRef, TypeRefKind, UnaryOp, VarDecl,
};
use crate::diagnostics::Diagnostics;

/// Expression types, keyed by the parser-minted `NodeId`.
#[derive(Clone, Debug)]
pub struct TypeTable {
    types: Vec<Ty>,
}

impl TypeTable {
    fn new(node_count: u32) -> Self {
        Self {
            types: vec![Ty::Unknown; node_count as usize],
        }
    }

    pub fn get(&self, id: NodeId) -> &Ty {
        &self.types[id.index()]
    }

    fn set(&mut self, id: NodeId, ty: Ty) {
        self.types[id.index()] = ty;
    }
}

/// Everything the semantic pass produces.
pub struct Analysis {
    pub symbols: SymbolTable,
    pub diagnostics: Diagnostics,
    pub types: TypeTable,
    /// Per-function capture sets: names resolved to a strictly enclosing
    /// function's parameters or locals.
    pub captures: IndexMap<FuncKey, IndexSet<String>>,
}

pub fn analyze(program: &Program, node_count: u32, line_index: &LineIndex) -> Analysis {
    let mut analyzer = Analyzer {
        line_index,
        symbols: SymbolTable::new(),
        diags: Diagnostics::new(),
        types: TypeTable::new(node_count),
        loop_depth: 0,
        switch_depth: 0,
        func_ret_stack: Vec::new(),
        class_stack: Vec::new(),
        class_extends: IndexMap::new(),
        class_fields: IndexMap::new(),
        func_key_stack: Vec::new(),
        func_locals: HashMap::new(),
        func_captures: IndexMap::new(),
    };
    analyzer.visit_program(program);
    Analysis {
        symbols: analyzer.symbols,
        diagnostics: analyzer.diags,
        types: analyzer.types,
        captures: analyzer.func_captures,
    }
}

struct Analyzer<'a> {
    line_index: &'a LineIndex,
    symbols: SymbolTable,
    diags: Diagnostics,
    types: TypeTable,
    loop_depth: u32,
    switch_depth: u32,
    func_ret_stack: Vec<Ty>,
    class_stack: Vec<String>,
    class_extends: IndexMap<String, Option<String>>,
    class_fields: IndexMap<String, IndexMap<String, Ty>>,
    func_key_stack: Vec<FuncKey>,
    func_locals: HashMap<FuncKey, HashSet<String>>,
    func_captures: IndexMap<FuncKey, IndexSet<String>>,
}

impl<'a> Analyzer<'a> {
    fn err(&mut self, span: &Span, message: String) {
        let (line, col) = self.line_index.line_col(span.start);
        self.diags.error(message, line, col, span.clone());
    }

    fn decl_pos(&self, span: &Span) -> (u32, u32) {
        self.line_index.line_col(span.start)
    }

    fn ty_from_annotation(&self, annotation: &TypeRef) -> Ty {
        match &annotation.kind {
            TypeRefKind::Simple(name) => Ty::from_name(name),
            TypeRefKind::Array(elem) => Ty::array(self.ty_from_annotation(elem)),
        }
    }

    /// Assignability including derived→base class subtyping.
    fn is_assignable_c(&self, expected: &Ty, got: &Ty) -> bool {
        if is_assignable(expected, got) {
            return true;
        }
        if let (Ty::Class(e), Ty::Class(g)) = (expected, got) {
            let mut cur = Some(g.clone());
            while let Some(c) = cur {
                if &c == e {
                    return true;
                }
                cur = self.class_extends.get(&c).cloned().flatten();
            }
        }
        false
    }

    fn find_field(&self, class: &str, member: &str) -> Option<Ty> {
        let mut cur = Some(class.to_owned());
        while let Some(c) = cur {
            if let Some(fields) = self.class_fields.get(&c)
                && let Some(ty) = fields.get(member)
            {
                return Some(ty.clone());
            }
            cur = self.class_extends.get(&c).cloned().flatten();
        }
        None
    }

    /// Method signature lookup through the `extends` chain, the class
    /// itself included.
    fn find_method_sig(&self, class: &str, method: &str) -> Option<(Vec<Ty>, Ty)> {
        let mut cur = Some(class.to_owned());
        while let Some(c) = cur {
            if let Some(f) = self.symbols.resolve_func(&(Some(c.clone()), method.to_owned())) {
                return Some((f.param_types(), f.ret.clone()));
            }
            cur = self.class_extends.get(&c).cloned().flatten();
        }
        None
    }

    fn find_method_sig_in_ancestors(&self, class: &str, method: &str) -> Option<(Vec<Ty>, Ty)> {
        let base = self.class_extends.get(class).cloned().flatten()?;
        self.find_method_sig(&base, method)
    }

    fn sig_to_str(params: &[Ty], ret: &Ty) -> String {
        let ps = params
            .iter()
            .map(Ty::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("({ps}) -> {ret}")
    }

    /// Records `name` as a capture when it belongs to a strictly enclosing
    /// function. Globals are not captures.
    fn maybe_mark_capture(&mut self, name: &str) {
        let Some(cur_key) = self.func_key_stack.last().cloned() else {
            return;
        };
        if self
            .func_locals
            .get(&cur_key)
            .is_some_and(|locals| locals.contains(name))
        {
            return;
        }
        for outer_key in self.func_key_stack[..self.func_key_stack.len() - 1]
            .iter()
            .rev()
        {
            if self
                .func_locals
                .get(outer_key)
                .is_some_and(|locals| locals.contains(name))
            {
                self.func_captures
                    .entry(cur_key)
                    .or_default()
                    .insert(name.to_owned());
                return;
            }
        }
    }

    // --- statements ---

    fn visit_program(&mut self, program: &Program) {
        // Unreachable-code detection is a block-level property; top-level
        // statements run in the global frame without it.
        for stmt in &program.stmts {
            self.visit_stmt(stmt);
        }
    }

    /// Walks one statement; the return value is the statement's
    /// "always returns" property.
    fn visit_stmt(&mut self, stmt: &Stmt) -> bool {
        match &stmt.kind {
            StmtKind::Var(decl) => {
                self.visit_var_decl(decl);
                false
            }
            StmtKind::Function(f) => {
                self.visit_function(f);
                false
            }
            StmtKind::Class(c) => {
                self.visit_class(c);
                false
            }
            StmtKind::Block(b) => self.visit_block(b),
            StmtKind::If { cond, then, else_ } => {
                let cond_t = self.visit_expr(cond);
                self.check_boolean(&cond_t, &cond.span, "La condicion de if debe ser boolean.");
                let then_ret = self.visit_block(then);
                let else_ret = else_.as_ref().map(|b| self.visit_block(b));
                match cond.const_bool() {
                    Some(true) => then_ret,
                    Some(false) => else_ret.unwrap_or(false),
                    None => match else_ret {
                        Some(e) => then_ret && e,
                        None => false,
                    },
                }
            }
            StmtKind::While { cond, body } => {
                self.loop_depth += 1;
                let cond_t = self.visit_expr(cond);
                self.check_boolean(
                    &cond_t,
                    &cond.span,
                    "La condicion de while debe ser boolean.",
                );
                self.visit_block(body);
                self.loop_depth -= 1;
                false
            }
            StmtKind::DoWhile { body, cond } => {
                self.loop_depth += 1;
                self.visit_block(body);
                let cond_t = self.visit_expr(cond);
                self.check_boolean(
                    &cond_t,
                    &cond.span,
                    "La condicion de do-while debe ser boolean.",
                );
                self.loop_depth -= 1;
                false
            }
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => {
                self.loop_depth += 1;
                if let Some(init) = init {
                    self.visit_stmt(init);
                }
                if let Some(cond) = cond {
                    let cond_t = self.visit_expr(cond);
                    self.check_boolean(
                        &cond_t,
                        &cond.span,
                        "La condicion del for debe ser boolean.",
                    );
                }
                if let Some(update) = update {
                    self.visit_stmt(update);
                }
                self.visit_block(body);
                self.loop_depth -= 1;
                false
            }
            StmtKind::Foreach {
                var_name,
                seq,
                body,
            } => {
                self.loop_depth += 1;
                let seq_t = self.visit_expr(seq);
                let elem_t = match seq_t {
                    Ty::Array(elem) => *elem,
                    _ => {
                        self.err(
                            &seq.span,
                            "La expresion de 'foreach' debe ser un arreglo.".to_owned(),
                        );
                        Ty::Unknown
                    }
                };
                let (line, col) = self.decl_pos(&stmt.span);
                let binding = VarInfo::new(var_name.clone(), elem_t, false, line, col);
                let name = var_name.clone();
                self.visit_block_with(body, |a| {
                    a.symbols.scopes.declare(&name, binding);
                });
                self.loop_depth -= 1;
                false
            }
            StmtKind::Switch {
                expr,
                cases,
                default,
            } => {
                self.switch_depth += 1;
                let sw_t = self.visit_expr(expr);
                for case in cases {
                    let case_t = self.visit_expr(&case.value);
                    if !are_eq_comparable(&sw_t, &case_t) {
                        self.err(
                            &case.value.span,
                            format!("Tipo de 'case' incompatible con 'switch' ({sw_t} vs {case_t})"),
                        );
                    }
                    self.visit_block(&case.body);
                }
                if let Some(default) = default {
                    self.visit_block(default);
                }
                self.switch_depth -= 1;
                false
            }
            StmtKind::Break => {
                if self.loop_depth == 0 && self.switch_depth == 0 {
                    self.err(
                        &stmt.span,
                        "'break' solo puede usarse dentro de un bucle o switch.".to_owned(),
                    );
                }
                false
            }
            StmtKind::Continue => {
                if self.loop_depth == 0 {
                    self.err(
                        &stmt.span,
                        "'continue' solo puede usarse dentro de un bucle.".to_owned(),
                    );
                }
                false
            }
            StmtKind::Return { expr } => self.visit_return(stmt, expr.as_ref()),
            StmtKind::TryCatch {
                try_block,
                err_name,
                catch_block,
            } => {
                let try_ret = self.visit_block(try_block);
                let (line, col) = self.decl_pos(&stmt.span);
                // The error value type is string by fiat.
                let binding = VarInfo::new(err_name.clone(), Ty::String, false, line, col);
                let name = err_name.clone();
                let catch_ret = self.visit_block_with(catch_block, |a| {
                    a.symbols.scopes.declare(&name, binding);
                });
                try_ret && catch_ret
            }
            StmtKind::Print { expr } => {
                self.visit_expr(expr);
                false
            }
            StmtKind::ExprStmt { expr } => {
                self.visit_expr(expr);
                false
            }
            StmtKind::Assign { target, value } => {
                self.visit_assign(stmt, target, value);
                false
            }
        }
    }

    fn visit_block(&mut self, block: &Block) -> bool {
        self.visit_block_with(block, |_| {})
    }

    /// Opens the block scope, lets `pre` declare loop/catch bindings into
    /// it, then walks the statements with unreachable-code detection.
    fn visit_block_with(&mut self, block: &Block, pre: impl FnOnce(&mut Self)) -> bool {
        self.symbols.scopes.push();
        pre(self);
        let mut always_returns = false;
        let mut terminated = false;
        for stmt in &block.stmts {
            if terminated {
                self.err(
                    &stmt.span,
                    "Codigo inalcanzable: aparece despues de un return/break/continue.".to_owned(),
                );
            }
            let returns = self.visit_stmt(stmt);
            if returns {
                always_returns = true;
            }
            if returns || matches!(stmt.kind, StmtKind::Break | StmtKind::Continue) {
                terminated = true;
            }
        }
        self.symbols.scopes.pop();
        always_returns
    }

    fn check_boolean(&mut self, ty: &Ty, span: &Span, message: &str) {
        if !ty.is_boolean() {
            self.err(span, message.to_owned());
        }
    }

    fn visit_var_decl(&mut self, decl: &VarDecl) {
        let name = decl.name.clone();
        let annotated = decl.ty.as_ref().map(|t| self.ty_from_annotation(t));
        let init_t = decl.init.as_ref().map(|e| self.visit_expr(e));
        let is_const = decl.kind == DeclKind::Const;

        // Class fields are declarations outside any method body.
        if !self.class_stack.is_empty() && self.func_ret_stack.is_empty() {
            self.visit_class_field(decl, annotated, init_t);
            return;
        }

        let var_t = if is_const {
            let Some(rhs_t) = init_t else {
                self.err(
                    &decl.span,
                    format!("La constante '{name}' debe inicializarse."),
                );
                return;
            };
            match annotated {
                Some(annotated) => {
                    if !self.is_assignable_c(&annotated, &rhs_t) {
                        self.err(
                            &decl.span,
                            format!(
                                "Tipo incompatible en inicializacion de const '{name}': se esperaba {annotated}, se obtuvo {rhs_t}."
                            ),
                        );
                    }
                    annotated
                }
                None => rhs_t,
            }
        } else {
            if let (Some(annotated), Some(init_t)) = (&annotated, &init_t)
                && !self.is_assignable_c(annotated, init_t)
            {
                self.err(
                    &decl.span,
                    format!(
                        "Tipo incompatible en inicializacion de variable '{name}': se esperaba {annotated}, se obtuvo {init_t}"
                    ),
                );
            }
            match (annotated, init_t) {
                (Some(annotated), _) => annotated,
                (None, Some(init_t)) => init_t,
                (None, None) => Ty::Unknown,
            }
        };

        let (line, col) = self.decl_pos(&decl.span);
        let mut info = VarInfo::new(name.clone(), var_t, is_const, line, col);

        if self.symbols.scopes.declared_in_current(&name) {
            self.err(
                &decl.span,
                format!("Redeclaracion de '{name}' en el mismo ambito."),
            );
            return;
        }
        if let Some(key) = self.func_key_stack.last().cloned() {
            // Function local: gets an FP-relative offset now.
            self.symbols.allocate_local(&mut info);
            self.func_locals.entry(key).or_default().insert(name.clone());
            self.symbols.scopes.declare(&name, info);
        } else {
            // Global or block-nested outside functions; addresses are
            // assigned in bulk before TAC generation.
            self.symbols.declare_var(&name, info);
        }
    }

    fn visit_class_field(&mut self, decl: &VarDecl, annotated: Option<Ty>, init_t: Option<Ty>) {
        let name = decl.name.clone();
        let cname = self.class_stack.last().cloned().expect("inside class");

        let field_t = if decl.kind == DeclKind::Const {
            let Some(rhs_t) = init_t else {
                self.err(
                    &decl.span,
                    format!("La constante de clase '{name}' debe inicializarse."),
                );
                return;
            };
            match annotated {
                Some(annotated) => {
                    if !self.is_assignable_c(&annotated, &rhs_t) {
                        self.err(
                            &decl.span,
                            format!(
                                "Tipo incompatible en inicializacion de const de clase '{name}': {annotated} vs {rhs_t}"
                            ),
                        );
                    }
                    annotated
                }
                None => rhs_t,
            }
        } else {
            if let (Some(annotated), Some(init_t)) = (&annotated, &init_t)
                && !self.is_assignable_c(annotated, init_t)
            {
                self.err(
                    &decl.span,
                    format!(
                        "Tipo incompatible en inicializacion de variable '{name}': se esperaba {annotated}, se obtuvo {init_t}"
                    ),
                );
            }
            match (annotated, init_t) {
                (Some(annotated), _) => annotated,
                (None, Some(init_t)) => init_t,
                (None, None) => Ty::Unknown,
            }
        };

        let fields = self.class_fields.entry(cname.clone()).or_default();
        if fields.contains_key(&name) {
            self.err(
                &decl.span,
                format!("Campo '{name}' redeclarado en la clase '{cname}'."),
            );
        } else {
            fields.insert(name, field_t);
        }
    }

    fn visit_function(&mut self, f: &FunctionDecl) {
        let current_class = self.class_stack.last().cloned();
        let param_types: Vec<Ty> = f
            .params
            .iter()
            .map(|p| {
                p.ty.as_ref()
                    .map_or(Ty::Unknown, |t| self.ty_from_annotation(t))
            })
            .collect();
        let mut ret_t = f
            .ret
            .as_ref()
            .map_or(Ty::Unknown, |t| self.ty_from_annotation(t));

        if f.is_constructor {
            ret_t = Ty::Void;
            if self.class_stack.is_empty() {
                self.err(&f.span, "constructor fuera de una clase.".to_owned());
            }
        }

        let key: FuncKey = (current_class.clone(), f.name.clone());
        self.func_key_stack.push(key.clone());
        self.func_captures.entry(key.clone()).or_default();
        self.func_locals
            .entry(key.clone())
            .or_default()
            .extend(f.params.iter().map(|p| p.name.clone()));

        let mut entered = false;
        if self.symbols.resolve_func(&key).is_some() {
            self.err(&f.span, format!("Funcion '{}' redeclarada.", f.name));
        } else {
            if let Some(cname) = &current_class
                && !f.is_constructor
                && let Some((anc_params, anc_ret)) =
                    self.find_method_sig_in_ancestors(cname, &f.name)
            {
                let same_arity = anc_params.len() == param_types.len();
                let same_params = same_arity
                    && anc_params
                        .iter()
                        .zip(&param_types)
                        .all(|(p, q)| type_equals(p, q));
                let same_ret = type_equals(&anc_ret, &ret_t);
                if !(same_arity && same_params && same_ret) {
                    self.err(
                        &f.span,
                        format!(
                            "Override incompatible de metodo '{cname}.{}': se esperaba {}, se definio {}.",
                            f.name,
                            Self::sig_to_str(&anc_params, &anc_ret),
                            Self::sig_to_str(&param_types, &ret_t),
                        ),
                    );
                }
            }

            let params_infos: Vec<VarInfo> = f
                .params
                .iter()
                .zip(&param_types)
                .map(|(p, ty)| {
                    let (line, col) = self.decl_pos(&p.span);
                    VarInfo::new(p.name.clone(), ty.clone(), false, line, col)
                })
                .collect();
            let finfo = FunctionInfo::new(
                f.name.clone(),
                params_infos,
                ret_t.clone(),
                !self.class_stack.is_empty(),
                f.is_constructor,
                current_class.clone(),
            );
            self.symbols.declare_func(finfo);
            self.symbols.enter_function(&key);
            entered = true;
        }

        self.func_ret_stack.push(ret_t.clone());
        let body_returns = self.visit_block(&f.body);
        if ret_t != Ty::Void && ret_t != Ty::Unknown && !body_returns {
            self.err(
                &f.span,
                format!(
                    "La funcion '{}' debe retornar {ret_t} en todos los caminos.",
                    f.name
                ),
            );
        }
        self.func_key_stack.pop();
        if entered {
            self.symbols.leave_function();
        }
        self.func_ret_stack.pop();
    }

    fn visit_class(&mut self, c: &ClassDecl) {
        self.class_stack.push(c.name.clone());
        self.class_extends.insert(c.name.clone(), c.base.clone());

        for field in &c.fields {
            self.visit_var_decl(field);
        }
        for method in &c.methods {
            self.visit_function(method);
        }
        self.class_stack.pop();

        let fields: IndexMap<String, VarInfo> = self
            .class_fields
            .get(&c.name)
            .map(|fields| {
                fields
                    .iter()
                    .map(|(n, t)| (n.clone(), VarInfo::new(n.clone(), t.clone(), false, 0, 0)))
                    .collect()
            })
            .unwrap_or_default();
        let methods: IndexMap<String, FunctionInfo> = self
            .symbols
            .functions()
            .filter(|((class, _), _)| class.as_deref() == Some(c.name.as_str()))
            .map(|((_, name), finfo)| (name.clone(), finfo.clone()))
            .collect();
        self.symbols
            .declare_class(ClassInfo::new(c.name.clone(), c.base.clone(), fields, methods));
    }

    fn visit_return(&mut self, stmt: &Stmt, expr: Option<&Expr>) -> bool {
        if self.func_ret_stack.is_empty() {
            // Type the operand anyway so later passes stay consistent.
            if let Some(expr) = expr {
                self.visit_expr(expr);
            }
            self.err(&stmt.span, "return fuera de una funcion.".to_owned());
            return false;
        }

        let expected = self.func_ret_stack.last().unwrap().clone();
        let expr_t = expr.map(|e| self.visit_expr(e));

        if expected == Ty::Void {
            if let Some(expr_t) = expr_t {
                self.err(
                    &stmt.span,
                    format!("La funcion es 'void' y no debe retornar valor (se obtuvo {expr_t})."),
                );
            }
        } else {
            match expr_t {
                None => self.err(
                    &stmt.span,
                    format!("La funcion debe retornar {expected}, pero no se retorno valor."),
                ),
                Some(expr_t) => {
                    if !self.is_assignable_c(&expected, &expr_t) {
                        self.err(
                            &stmt.span,
                            format!(
                                "Tipo de retorno incompatible: se esperaba {expected}, se obtuvo {expr_t}."
                            ),
                        );
                    }
                }
            }
        }
        true
    }

    fn visit_assign(&mut self, stmt: &Stmt, target: &Expr, value: &Expr) {
        match &target.kind {
            ExprKind::Name(name) => {
                let rhs_t = self.visit_expr(value);
                let name = name.clone();
                self.maybe_mark_capture(&name);
                self.assign_to_name(&stmt.span, &name, rhs_t);
            }
            ExprKind::Member { obj, name } => {
                let obj_t = self.visit_expr(obj);
                let rhs_t = self.visit_expr(value);
                self.check_property_assignment(&stmt.span, &obj_t, name, &rhs_t);
            }
            ExprKind::Index { arr, index } => {
                let arr_t = self.visit_expr(arr);
                let idx_t = self.visit_expr(index);
                let rhs_t = self.visit_expr(value);
                let Ty::Array(elem) = arr_t else {
                    self.err(&stmt.span, "Indexacion sobre un valor no-arreglo".to_owned());
                    return;
                };
                if idx_t != Ty::Integer {
                    self.err(
                        &stmt.span,
                        "El indice de un arreglo debe ser de tipo integer".to_owned(),
                    );
                    return;
                }
                if !self.is_assignable_c(&elem, &rhs_t) {
                    self.err(
                        &stmt.span,
                        format!(
                            "Tipo incompatible en asignacion a elemento de arreglo: se esperaba {elem}, se obtuvo {rhs_t}"
                        ),
                    );
                }
            }
            // The parser already reported a non-assignable target.
            _ => {
                self.visit_expr(value);
            }
        }
    }

    fn assign_to_name(&mut self, span: &Span, name: &str, rhs_t: Ty) {
        enum Action {
            Undeclared,
            Const,
            Infer,
            Check(Ty),
        }
        let action = match self.symbols.resolve_var(name) {
            None => Action::Undeclared,
            Some(info) if info.is_const => Action::Const,
            Some(info) if info.ty.is_unknown() => Action::Infer,
            Some(info) => Action::Check(info.ty.clone()),
        };
        match action {
            Action::Undeclared => self.err(
                span,
                format!("Asignacion a identificador no declarado: '{name}'."),
            ),
            Action::Const => self.err(
                span,
                format!("No se puede reasignar a constante '{name}'."),
            ),
            Action::Infer => {
                // First typed assignment pins the binding's type.
                if let Some(info) = self.symbols.resolve_var_mut(name) {
                    info.ty = rhs_t;
                }
            }
            Action::Check(expected) => {
                if !self.is_assignable_c(&expected, &rhs_t) {
                    self.err(
                        span,
                        format!(
                            "Tipo incompatible en asignacion a '{name}': se esperaba {expected}, se obtuvo {rhs_t}."
                        ),
                    );
                }
            }
        }
    }

    fn check_property_assignment(&mut self, span: &Span, obj_t: &Ty, member: &str, rhs_t: &Ty) {
        let Ty::Class(class) = obj_t else {
            self.err(
                span,
                "Asignacion a propiedad sobre un valor no-objeto.".to_owned(),
            );
            return;
        };
        let class = class.clone();
        if let Some(field_t) = self.find_field(&class, member) {
            if !self.is_assignable_c(&field_t, rhs_t) {
                self.err(
                    span,
                    format!(
                        "Tipo incompatible en asignacion a '{class}.{member}': se esperaba {field_t}, se obtuvo {rhs_t}."
                    ),
                );
            }
            return;
        }
        if self.find_method_sig(&class, member).is_some() {
            self.err(
                span,
                format!("No se puede asignar al metodo '{class}.{member}'."),
            );
            return;
        }
        self.err(
            span,
            format!("Atributo '{member}' no existe en clase '{class}'."),
        );
    }

    // --- expressions ---

    fn visit_expr(&mut self, expr: &Expr) -> Ty {
        let ty = self.type_of_expr(expr);
        self.types.set(expr.id, ty.clone());
        ty
    }

    fn type_of_expr(&mut self, expr: &Expr) -> Ty {
        match &expr.kind {
            ExprKind::Int(_) => Ty::Integer,
            ExprKind::Float(_) => Ty::Float,
            ExprKind::Str(_) => Ty::String,
            ExprKind::Bool(_) => Ty::Boolean,
            ExprKind::Null => Ty::Null,
            ExprKind::ArrayLiteral { elems } => self.type_of_array_literal(expr, elems),
            ExprKind::Name(name) => self.type_of_name(expr, name),
            ExprKind::Unary { op, expr: operand } => {
                let t = self.visit_expr(operand);
                match op {
                    UnaryOp::Not => {
                        if !t.is_boolean() {
                            self.err(&expr.span, "Operando de '!' debe ser booleano.".to_owned());
                            Ty::Unknown
                        } else {
                            Ty::Boolean
                        }
                    }
                    UnaryOp::Neg => {
                        if !t.is_numeric() {
                            self.err(&expr.span, "Operando de '-' debe ser numerico.".to_owned());
                            Ty::Unknown
                        } else {
                            t
                        }
                    }
                }
            }
            ExprKind::Binary { op, left, right } => {
                let lt = self.visit_expr(left);
                let rt = self.visit_expr(right);
                self.type_of_binary(expr, *op, lt, rt)
            }
            ExprKind::Ternary {
                cond,
                then,
                otherwise,
            } => {
                let cond_t = self.visit_expr(cond);
                let then_t = self.visit_expr(then);
                let else_t = self.visit_expr(otherwise);
                if !cond_t.is_boolean() {
                    self.err(
                        &expr.span,
                        "La condicion del operador ternario debe ser boolean.".to_owned(),
                    );
                }
                if !type_equals(&then_t, &else_t) {
                    self.err(
                        &expr.span,
                        format!(
                            "Las ramas del ternario deben ser del mismo tipo ({then_t} vs {else_t})."
                        ),
                    );
                    Ty::Unknown
                } else {
                    then_t
                }
            }
            ExprKind::Index { arr, index } => {
                let arr_t = self.visit_expr(arr);
                let idx_t = self.visit_expr(index);
                match arr_t {
                    Ty::Array(elem) => {
                        if idx_t != Ty::Integer {
                            self.err(
                                &index.span,
                                "El indice de un arreglo debe ser de tipo integer.".to_owned(),
                            );
                        }
                        *elem
                    }
                    _ => {
                        self.err(
                            &expr.span,
                            "Indexacion sobre un valor no-arreglo.".to_owned(),
                        );
                        Ty::Unknown
                    }
                }
            }
            ExprKind::Member { obj, name } => {
                let obj_t = self.visit_expr(obj);
                self.type_of_member_read(expr, &obj_t, name)
            }
            ExprKind::Call { callee, args } => self.type_of_call(expr, callee, args),
            ExprKind::New { class_name, args } => self.type_of_new(expr, class_name, args),
        }
    }

    fn type_of_array_literal(&mut self, expr: &Expr, elems: &[Expr]) -> Ty {
        let Some(first) = elems.first() else {
            return Ty::array(Ty::Unknown);
        };
        let elem_t = self.visit_expr(first);
        let mut consistent = true;
        for elem in &elems[1..] {
            let t = self.visit_expr(elem);
            if !type_equals(&t, &elem_t) {
                consistent = false;
            }
        }
        if !consistent {
            self.err(
                &expr.span,
                "Elementos del arreglo con tipos inconsistentes.".to_owned(),
            );
            Ty::array(Ty::Unknown)
        } else {
            Ty::array(elem_t)
        }
    }

    fn type_of_name(&mut self, expr: &Expr, name: &str) -> Ty {
        if name == "this" {
            return match self.class_stack.last() {
                Some(class) => Ty::Class(class.clone()),
                None => {
                    self.err(&expr.span, "Uso de 'this' fuera de una clase.".to_owned());
                    Ty::Unknown
                }
            };
        }
        if let Some(info) = self.symbols.resolve_var(name) {
            let ty = info.ty.clone();
            self.maybe_mark_capture(name);
            return ty;
        }
        if self.symbols.is_global_func(name) {
            self.err(
                &expr.span,
                format!("No se puede usar la funcion '{name}' como valor; invócala con '()'."),
            );
            return Ty::Unknown;
        }
        self.err(
            &expr.span,
            format!("Uso de variable no declarada: '{name}'."),
        );
        Ty::Unknown
    }

    fn type_of_binary(&mut self, expr: &Expr, op: BinaryOp, lt: Ty, rt: Ty) -> Ty {
        match op {
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => match numeric_result(&lt, &rt) {
                Some(t) => t,
                None => {
                    self.err(
                        &expr.span,
                        format!("Operandos de '{}' deben ser numericos.", op.as_str()),
                    );
                    Ty::Unknown
                }
            },
            BinaryOp::Add => {
                if can_concat_with_plus(&lt, &rt) {
                    Ty::String
                } else {
                    match numeric_result(&lt, &rt) {
                        Some(t) => t,
                        None => {
                            self.err(
                                &expr.span,
                                format!("Tipos invalidos para '+': {lt} y {rt}."),
                            );
                            Ty::Unknown
                        }
                    }
                }
            }
            BinaryOp::Sub => match numeric_result(&lt, &rt) {
                Some(t) => t,
                None => {
                    self.err(&expr.span, "Operandos de '-' deben ser numericos.".to_owned());
                    Ty::Unknown
                }
            },
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                if !are_order_comparable(&lt, &rt) {
                    self.err(
                        &expr.span,
                        format!("Operandos de '{}' deben ser numericos.", op.as_str()),
                    );
                }
                Ty::Boolean
            }
            BinaryOp::Eq | BinaryOp::Ne => {
                if !are_eq_comparable(&lt, &rt) {
                    self.err(
                        &expr.span,
                        format!(
                            "Operandos de '{}' deben ser de tipos compatibles (mismo tipo o numericos).",
                            op.as_str()
                        ),
                    );
                }
                Ty::Boolean
            }
            BinaryOp::And | BinaryOp::Or => {
                if !(lt.is_boolean() && rt.is_boolean()) {
                    self.err(
                        &expr.span,
                        format!("Operandos de '{}' deben ser booleanos.", op.as_str()),
                    );
                    Ty::Unknown
                } else {
                    Ty::Boolean
                }
            }
        }
    }

    fn type_of_member_read(&mut self, expr: &Expr, obj_t: &Ty, member: &str) -> Ty {
        let Ty::Class(class) = obj_t else {
            self.err(
                &expr.span,
                "Acceso a propiedad sobre un valor no-objeto.".to_owned(),
            );
            return Ty::Unknown;
        };
        let class = class.clone();
        if member == "constructor" {
            self.err(
                &expr.span,
                "No se puede usar 'constructor' como valor.".to_owned(),
            );
            return Ty::Unknown;
        }
        if let Some(field_t) = self.find_field(&class, member) {
            return field_t;
        }
        if self.find_method_sig(&class, member).is_some() {
            self.err(
                &expr.span,
                format!("No se puede usar el metodo '{class}.{member}' como valor; invocalo con '()'."),
            );
            return Ty::Unknown;
        }
        self.err(
            &expr.span,
            format!("Atributo '{member}' no existe en clase '{class}'."),
        );
        Ty::Unknown
    }

    fn type_of_call(&mut self, expr: &Expr, callee: &Expr, args: &[Expr]) -> Ty {
        match &callee.kind {
            ExprKind::Name(fname) if fname != "this" => {
                let arg_types: Vec<Ty> = args.iter().map(|a| self.visit_expr(a)).collect();
                // Globals take priority over any shadowing binding, matching
                // the resolution order of call positions.
                if let Some(finfo) = self.symbols.resolve_global_func(fname) {
                    let param_types = finfo.param_types();
                    let ret = finfo.ret.clone();
                    let fname = fname.clone();
                    if arg_types.len() != param_types.len() {
                        self.err(
                            &expr.span,
                            format!(
                                "Llamada a '{fname}' con {} argumento(s), se esperaban {}.",
                                arg_types.len(),
                                param_types.len()
                            ),
                        );
                    } else {
                        for (j, (pt, at)) in param_types.iter().zip(&arg_types).enumerate() {
                            if !self.is_assignable_c(pt, at) {
                                self.err(
                                    &args[j].span,
                                    format!(
                                        "Argumento {} de '{fname}' incompatible: se esperaba {pt}, se obtuvo {at}.",
                                        j + 1
                                    ),
                                );
                            }
                        }
                    }
                    self.types.set(callee.id, Ty::Unknown);
                    return ret;
                }
                if self.symbols.resolve_var(fname).is_some() {
                    // Calling a variable; no function signature to check.
                    self.visit_expr(callee);
                    return Ty::Unknown;
                }
                self.err(
                    &callee.span,
                    format!("Llamada a identificador no declarado: '{fname}'."),
                );
                Ty::Unknown
            }
            ExprKind::Member { obj, name: method } => {
                let obj_t = self.visit_expr(obj);
                let arg_types: Vec<Ty> = args.iter().map(|a| self.visit_expr(a)).collect();
                let Ty::Class(class) = obj_t else {
                    self.err(
                        &callee.span,
                        "Acceso a propiedad sobre un valor no-objeto.".to_owned(),
                    );
                    return Ty::Unknown;
                };
                if method == "constructor" {
                    self.err(
                        &callee.span,
                        format!(
                            "No se puede invocar 'constructor' como metodo de instancia; usa 'new {class}(...)'."
                        ),
                    );
                    return Ty::Unknown;
                }
                let Some((param_types, ret)) = self.find_method_sig(&class, method) else {
                    self.err(
                        &callee.span,
                        format!("Metodo '{method}' no existe en clase '{class}'."),
                    );
                    return Ty::Unknown;
                };
                if arg_types.len() != param_types.len() {
                    self.err(
                        &expr.span,
                        format!(
                            "Llamada a metodo '{class}.{method}' con {} argumento(s), se esperaban {}.",
                            arg_types.len(),
                            param_types.len()
                        ),
                    );
                } else {
                    for (j, (pt, at)) in param_types.iter().zip(&arg_types).enumerate() {
                        if !self.is_assignable_c(pt, at) {
                            self.err(
                                &args[j].span,
                                format!(
                                    "Argumento {} de metodo '{class}.{method}' incompatible: {pt} vs {at}.",
                                    j + 1
                                ),
                            );
                        }
                    }
                }
                ret
            }
            _ => {
                self.visit_expr(callee);
                for arg in args {
                    self.visit_expr(arg);
                }
                Ty::Unknown
            }
        }
    }

    fn type_of_new(&mut self, expr: &Expr, class_name: &str, args: &[Expr]) -> Ty {
        let arg_types: Vec<Ty> = args.iter().map(|a| self.visit_expr(a)).collect();
        match self.find_method_sig(class_name, "constructor") {
            Some((param_types, _)) => {
                if arg_types.len() != param_types.len() {
                    self.err(
                        &expr.span,
                        format!(
                            "Constructor de '{class_name}' espera {} argumento(s), se pasaron {}.",
                            param_types.len(),
                            arg_types.len()
                        ),
                    );
                } else {
                    for (i, (pt, at)) in param_types.iter().zip(&arg_types).enumerate() {
                        if !self.is_assignable_c(pt, at) {
                            self.err(
                                &args[i].span,
                                format!(
                                    "Argumento {} del constructor de '{class_name}' incompatible: {pt} vs {at}.",
                                    i + 1
                                ),
                            );
                        }
                    }
                }
            }
            None => {
                if !arg_types.is_empty() {
                    self.err(
                        &expr.span,
                        format!(
                            "La clase '{class_name}' no define constructor que acepte {} argumento(s).",
                            arg_types.len()
                        ),
                    );
                }
            }
        }
        Ty::Class(class_name.to_owned())
    }
}
