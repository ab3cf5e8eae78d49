//! Grammar rules: declarations, statements, and the expression precedence
//! ladder. Postfix chains and left-associative operator chains are nested as
//! they are parsed.

use super::Parser;
use crate::ast::{
    BinaryOp, Block, ClassDecl, DeclKind, Expr, ExprKind, FunctionDecl, Param, Program, Stmt,
    StmtKind, SwitchCase, TypeRef, TypeRefKind, UnaryOp, VarDecl,
};
use crate::lexer::TokenKind;

impl<'s> Parser<'s> {
    pub(crate) fn program(&mut self) -> Program {
        let mut stmts = Vec::new();
        while !self.at(TokenKind::Eof) {
            let before = self.pos();
            if let Some(stmt) = self.statement() {
                stmts.push(stmt);
            }
            // A statement that consumed nothing must not stall the loop.
            if self.pos() == before {
                self.bump();
            }
        }
        Program { stmts }
    }

    fn statement(&mut self) -> Option<Stmt> {
        match self.peek() {
            TokenKind::Let | TokenKind::Var | TokenKind::Const => self.var_decl_stmt(),
            TokenKind::Function => {
                let f = self.function_decl(false)?;
                let span = f.span.clone();
                Some(Stmt {
                    kind: StmtKind::Function(f),
                    span,
                })
            }
            TokenKind::Class => self.class_decl(),
            TokenKind::LBrace => {
                let b = self.block()?;
                let span = b.span.clone();
                Some(Stmt {
                    kind: StmtKind::Block(b),
                    span,
                })
            }
            TokenKind::If => self.if_stmt(),
            TokenKind::While => self.while_stmt(),
            TokenKind::Do => self.do_while_stmt(),
            TokenKind::For => self.for_stmt(),
            TokenKind::Foreach => self.foreach_stmt(),
            TokenKind::Switch => self.switch_stmt(),
            TokenKind::Break => {
                let start = self.start();
                self.bump();
                self.expect(TokenKind::Semi, "';'");
                Some(Stmt {
                    kind: StmtKind::Break,
                    span: start..self.end(),
                })
            }
            TokenKind::Continue => {
                let start = self.start();
                self.bump();
                self.expect(TokenKind::Semi, "';'");
                Some(Stmt {
                    kind: StmtKind::Continue,
                    span: start..self.end(),
                })
            }
            TokenKind::Return => self.return_stmt(),
            TokenKind::Try => self.try_catch_stmt(),
            TokenKind::Print => self.print_stmt(),
            TokenKind::Garbage => {
                self.error_here("Caracteres no reconocidos.".to_owned());
                self.bump();
                None
            }
            _ => {
                let stmt = self.expr_or_assign();
                self.expect(TokenKind::Semi, "';'");
                Some(stmt)
            }
        }
    }

    fn var_decl_stmt(&mut self) -> Option<Stmt> {
        let decl = self.var_decl()?;
        let span = decl.span.clone();
        Some(Stmt {
            kind: StmtKind::Var(decl),
            span,
        })
    }

    /// `let|var|const NAME (: type)? (= expr)? ;`
    ///
    /// A `const` without initializer parses fine; the analyzer reports it.
    fn var_decl(&mut self) -> Option<VarDecl> {
        let start = self.start();
        let kind = match self.bump().kind {
            TokenKind::Let => DeclKind::Let,
            TokenKind::Var => DeclKind::Var,
            _ => DeclKind::Const,
        };
        let name_tok = self.expect(TokenKind::Identifier, "un identificador")?;
        let name = self.text(&name_tok).to_owned();
        let ty = if self.eat(TokenKind::Colon) {
            self.type_ref()
        } else {
            None
        };
        let init = if self.eat(TokenKind::Assign) {
            Some(self.expression())
        } else {
            None
        };
        self.expect(TokenKind::Semi, "';'");
        Some(VarDecl {
            name,
            ty,
            init,
            kind,
            span: start..self.end(),
        })
    }

    /// `baseType ([])*` - base names are plain identifiers; unlisted names
    /// resolve to class types during analysis.
    fn type_ref(&mut self) -> Option<TypeRef> {
        let start = self.start();
        let base_tok = self.expect(TokenKind::Identifier, "un nombre de tipo")?;
        let mut ty = TypeRef {
            kind: TypeRefKind::Simple(self.text(&base_tok).to_owned()),
            span: base_tok.span(),
        };
        while self.eat(TokenKind::LBracket) {
            self.expect(TokenKind::RBracket, "']'");
            ty = TypeRef {
                kind: TypeRefKind::Array(Box::new(ty)),
                span: start..self.end(),
            };
        }
        Some(ty)
    }

    fn function_decl(&mut self, is_method: bool) -> Option<FunctionDecl> {
        let start = self.start();
        self.bump(); // function
        let name_tok = self.expect(TokenKind::Identifier, "un nombre de funcion")?;
        let name = self.text(&name_tok).to_owned();
        self.expect(TokenKind::LParen, "'('");
        let mut params = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                let p_start = self.start();
                if let Some(p_tok) = self.expect(TokenKind::Identifier, "un parametro") {
                    let p_name = self.text(&p_tok).to_owned();
                    let p_ty = if self.eat(TokenKind::Colon) {
                        self.type_ref()
                    } else {
                        None
                    };
                    params.push(Param {
                        name: p_name,
                        ty: p_ty,
                        span: p_start..self.end(),
                    });
                } else {
                    break;
                }
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'");
        let ret = if self.eat(TokenKind::Colon) {
            self.type_ref()
        } else {
            None
        };
        let body = self.block()?;
        let is_constructor = name == "constructor";
        Some(FunctionDecl {
            name,
            params,
            ret,
            body,
            is_method,
            is_constructor,
            span: start..self.end(),
        })
    }

    /// `class NAME (: BASE)? { (field | method)* }`
    fn class_decl(&mut self) -> Option<Stmt> {
        let start = self.start();
        self.bump(); // class
        let name_tok = self.expect(TokenKind::Identifier, "un nombre de clase")?;
        let name = self.text(&name_tok).to_owned();
        let base = if self.eat(TokenKind::Colon) {
            self.expect(TokenKind::Identifier, "un nombre de clase base")
                .map(|t| self.text(&t).to_owned())
        } else {
            None
        };
        self.expect(TokenKind::LBrace, "'{'");
        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            match self.peek() {
                TokenKind::Let | TokenKind::Var | TokenKind::Const => {
                    if let Some(field) = self.var_decl() {
                        fields.push(field);
                    }
                }
                TokenKind::Function => {
                    if let Some(method) = self.function_decl(true) {
                        methods.push(method);
                    }
                }
                _ => {
                    self.error_here("Se esperaba un campo o un metodo.".to_owned());
                    self.bump();
                }
            }
        }
        self.expect(TokenKind::RBrace, "'}'");
        Some(Stmt {
            kind: StmtKind::Class(ClassDecl {
                name,
                base,
                fields,
                methods,
                span: start..self.end(),
            }),
            span: start..self.end(),
        })
    }

    fn block(&mut self) -> Option<Block> {
        let start = self.start();
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            let before = self.pos();
            if let Some(stmt) = self.statement() {
                stmts.push(stmt);
            }
            if self.pos() == before {
                self.bump();
            }
        }
        self.expect(TokenKind::RBrace, "'}'");
        Some(Block {
            stmts,
            span: start..self.end(),
        })
    }

    fn if_stmt(&mut self) -> Option<Stmt> {
        let start = self.start();
        self.bump(); // if
        self.expect(TokenKind::LParen, "'('");
        let cond = self.expression();
        self.expect(TokenKind::RParen, "')'");
        let then = self.block()?;
        let else_ = if self.eat(TokenKind::Else) {
            self.block()
        } else {
            None
        };
        Some(Stmt {
            kind: StmtKind::If { cond, then, else_ },
            span: start..self.end(),
        })
    }

    fn while_stmt(&mut self) -> Option<Stmt> {
        let start = self.start();
        self.bump(); // while
        self.expect(TokenKind::LParen, "'('");
        let cond = self.expression();
        self.expect(TokenKind::RParen, "')'");
        let body = self.block()?;
        Some(Stmt {
            kind: StmtKind::While { cond, body },
            span: start..self.end(),
        })
    }

    fn do_while_stmt(&mut self) -> Option<Stmt> {
        let start = self.start();
        self.bump(); // do
        let body = self.block()?;
        self.expect(TokenKind::While, "'while'");
        self.expect(TokenKind::LParen, "'('");
        let cond = self.expression();
        self.expect(TokenKind::RParen, "')'");
        self.expect(TokenKind::Semi, "';'");
        Some(Stmt {
            kind: StmtKind::DoWhile { body, cond },
            span: start..self.end(),
        })
    }

    /// `for (init?; cond?; update?) block` - a declaration init consumes its
    /// own semicolon.
    fn for_stmt(&mut self) -> Option<Stmt> {
        let start = self.start();
        self.bump(); // for
        self.expect(TokenKind::LParen, "'('");
        let init = match self.peek() {
            TokenKind::Semi => {
                self.bump();
                None
            }
            TokenKind::Let | TokenKind::Var | TokenKind::Const => {
                self.var_decl_stmt().map(Box::new)
            }
            _ => {
                let stmt = self.expr_or_assign();
                self.expect(TokenKind::Semi, "';'");
                Some(Box::new(stmt))
            }
        };
        let cond = if self.at(TokenKind::Semi) {
            None
        } else {
            Some(self.expression())
        };
        self.expect(TokenKind::Semi, "';'");
        let update = if self.at(TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.expr_or_assign()))
        };
        self.expect(TokenKind::RParen, "')'");
        let body = self.block()?;
        Some(Stmt {
            kind: StmtKind::For {
                init,
                cond,
                update,
                body,
            },
            span: start..self.end(),
        })
    }

    fn foreach_stmt(&mut self) -> Option<Stmt> {
        let start = self.start();
        self.bump(); // foreach
        self.expect(TokenKind::LParen, "'('");
        let var_tok = self.expect(TokenKind::Identifier, "un identificador")?;
        let var_name = self.text(&var_tok).to_owned();
        self.expect(TokenKind::In, "'in'");
        let seq = self.expression();
        self.expect(TokenKind::RParen, "')'");
        let body = self.block()?;
        Some(Stmt {
            kind: StmtKind::Foreach {
                var_name,
                seq,
                body,
            },
            span: start..self.end(),
        })
    }

    fn switch_stmt(&mut self) -> Option<Stmt> {
        let start = self.start();
        self.bump(); // switch
        self.expect(TokenKind::LParen, "'('");
        let expr = self.expression();
        self.expect(TokenKind::RParen, "')'");
        self.expect(TokenKind::LBrace, "'{'");
        let mut cases = Vec::new();
        let mut default = None;
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            if self.eat(TokenKind::Case) {
                let case_start = self.end();
                let value = self.expression();
                self.expect(TokenKind::Colon, "':'");
                let body = self.case_body(case_start);
                cases.push(SwitchCase {
                    value,
                    body,
                    span: case_start..self.end(),
                });
            } else if self.eat(TokenKind::Default) {
                let default_start = self.end();
                self.expect(TokenKind::Colon, "':'");
                default = Some(self.case_body(default_start));
            } else {
                self.error_here("Se esperaba 'case' o 'default'.".to_owned());
                self.bump();
            }
        }
        self.expect(TokenKind::RBrace, "'}'");
        Some(Stmt {
            kind: StmtKind::Switch {
                expr,
                cases,
                default,
            },
            span: start..self.end(),
        })
    }

    /// Statements up to the next `case`/`default`/`}`.
    fn case_body(&mut self, start: usize) -> Block {
        let mut stmts = Vec::new();
        while !matches!(
            self.peek(),
            TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
        ) {
            let before = self.pos();
            if let Some(stmt) = self.statement() {
                stmts.push(stmt);
            }
            if self.pos() == before {
                self.bump();
            }
        }
        Block {
            stmts,
            span: start..self.end(),
        }
    }

    fn return_stmt(&mut self) -> Option<Stmt> {
        let start = self.start();
        self.bump(); // return
        let expr = if self.at(TokenKind::Semi) {
            None
        } else {
            Some(self.expression())
        };
        self.expect(TokenKind::Semi, "';'");
        Some(Stmt {
            kind: StmtKind::Return { expr },
            span: start..self.end(),
        })
    }

    fn try_catch_stmt(&mut self) -> Option<Stmt> {
        let start = self.start();
        self.bump(); // try
        let try_block = self.block()?;
        self.expect(TokenKind::Catch, "'catch'");
        self.expect(TokenKind::LParen, "'('");
        let err_name = self
            .expect(TokenKind::Identifier, "un identificador")
            .map(|t| self.text(&t).to_owned())
            .unwrap_or_else(|| "err".to_owned());
        self.expect(TokenKind::RParen, "')'");
        let catch_block = self.block()?;
        Some(Stmt {
            kind: StmtKind::TryCatch {
                try_block,
                err_name,
                catch_block,
            },
            span: start..self.end(),
        })
    }

    fn print_stmt(&mut self) -> Option<Stmt> {
        let start = self.start();
        self.bump(); // print
        self.expect(TokenKind::LParen, "'('");
        let expr = self.expression();
        self.expect(TokenKind::RParen, "')'");
        self.expect(TokenKind::Semi, "';'");
        Some(Stmt {
            kind: StmtKind::Print { expr },
            span: start..self.end(),
        })
    }

    /// Expression statement, or assignment when `=` follows; the target must
    /// be a name, member access, or index.
    fn expr_or_assign(&mut self) -> Stmt {
        let start = self.start();
        let expr = self.expression();
        if self.eat(TokenKind::Assign) {
            if !expr.is_lvalue() {
                self.error_at(
                    "El lado izquierdo de la asignacion no es asignable.".to_owned(),
                    expr.span.clone(),
                );
            }
            let value = self.expression();
            Stmt {
                kind: StmtKind::Assign {
                    target: expr,
                    value,
                },
                span: start..self.end(),
            }
        } else {
            Stmt {
                kind: StmtKind::ExprStmt { expr },
                span: start..self.end(),
            }
        }
    }

    // --- expression precedence ladder ---

    pub(crate) fn expression(&mut self) -> Expr {
        self.ternary()
    }

    fn ternary(&mut self) -> Expr {
        let start = self.start();
        let cond = self.or_expr();
        if self.eat(TokenKind::Question) {
            let then = self.expression();
            self.expect(TokenKind::Colon, "':'");
            let otherwise = self.expression();
            let span = start..self.end();
            self.mk_expr(
                ExprKind::Ternary {
                    cond: Box::new(cond),
                    then: Box::new(then),
                    otherwise: Box::new(otherwise),
                },
                span,
            )
        } else {
            cond
        }
    }

    fn or_expr(&mut self) -> Expr {
        let start = self.start();
        let mut node = self.and_expr();
        while self.eat(TokenKind::OrOr) {
            let rhs = self.and_expr();
            node = self.binary(BinaryOp::Or, node, rhs, start);
        }
        node
    }

    fn and_expr(&mut self) -> Expr {
        let start = self.start();
        let mut node = self.equality();
        while self.eat(TokenKind::AndAnd) {
            let rhs = self.equality();
            node = self.binary(BinaryOp::And, node, rhs, start);
        }
        node
    }

    fn equality(&mut self) -> Expr {
        let start = self.start();
        let mut node = self.relational();
        loop {
            let op = match self.peek() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                _ => break,
            };
            self.bump();
            let rhs = self.relational();
            node = self.binary(op, node, rhs, start);
        }
        node
    }

    fn relational(&mut self) -> Expr {
        let start = self.start();
        let mut node = self.additive();
        loop {
            let op = match self.peek() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Ge => BinaryOp::Ge,
                _ => break,
            };
            self.bump();
            let rhs = self.additive();
            node = self.binary(op, node, rhs, start);
        }
        node
    }

    fn additive(&mut self) -> Expr {
        let start = self.start();
        let mut node = self.multiplicative();
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.bump();
            let rhs = self.multiplicative();
            node = self.binary(op, node, rhs, start);
        }
        node
    }

    fn multiplicative(&mut self) -> Expr {
        let start = self.start();
        let mut node = self.unary();
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.bump();
            let rhs = self.unary();
            node = self.binary(op, node, rhs, start);
        }
        node
    }

    fn binary(&mut self, op: BinaryOp, left: Expr, right: Expr, start: usize) -> Expr {
        let span = start..self.end();
        self.mk_expr(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    fn unary(&mut self) -> Expr {
        let start = self.start();
        let op = match self.peek() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let operand = self.unary();
            let span = start..self.end();
            self.mk_expr(
                ExprKind::Unary {
                    op,
                    expr: Box::new(operand),
                },
                span,
            )
        } else {
            self.postfix()
        }
    }

    fn postfix(&mut self) -> Expr {
        let start = self.start();
        let mut node = self.primary();
        loop {
            match self.peek() {
                TokenKind::LParen => {
                    let args = self.arguments();
                    let span = start..self.end();
                    node = self.mk_expr(
                        ExprKind::Call {
                            callee: Box::new(node),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.bump();
                    let name = self
                        .expect(TokenKind::Identifier, "un nombre de miembro")
                        .map(|t| self.text(&t).to_owned())
                        .unwrap_or_default();
                    let span = start..self.end();
                    node = self.mk_expr(
                        ExprKind::Member {
                            obj: Box::new(node),
                            name,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.bump();
                    let index = self.expression();
                    self.expect(TokenKind::RBracket, "']'");
                    let span = start..self.end();
                    node = self.mk_expr(
                        ExprKind::Index {
                            arr: Box::new(node),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                _ => break,
            }
        }
        node
    }

    fn arguments(&mut self) -> Vec<Expr> {
        self.expect(TokenKind::LParen, "'('");
        let mut args = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                args.push(self.expression());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'");
        args
    }

    fn primary(&mut self) -> Expr {
        let start = self.start();
        match self.peek() {
            TokenKind::IntLiteral => {
                let tok = self.bump();
                let value = self.text(&tok).parse().unwrap_or_default();
                self.mk_expr(ExprKind::Int(value), tok.span())
            }
            TokenKind::FloatLiteral => {
                let tok = self.bump();
                let value = self.text(&tok).parse().unwrap_or_default();
                self.mk_expr(ExprKind::Float(value), tok.span())
            }
            TokenKind::StringLiteral => {
                let tok = self.bump();
                let text = self.text(&tok);
                let inner = text[1..text.len() - 1].to_owned();
                self.mk_expr(ExprKind::Str(inner), tok.span())
            }
            TokenKind::True => {
                let tok = self.bump();
                self.mk_expr(ExprKind::Bool(true), tok.span())
            }
            TokenKind::False => {
                let tok = self.bump();
                self.mk_expr(ExprKind::Bool(false), tok.span())
            }
            TokenKind::Null => {
                let tok = self.bump();
                self.mk_expr(ExprKind::Null, tok.span())
            }
            TokenKind::This => {
                let tok = self.bump();
                self.mk_expr(ExprKind::Name("this".to_owned()), tok.span())
            }
            TokenKind::New => {
                self.bump();
                let class_name = self
                    .expect(TokenKind::Identifier, "un nombre de clase")
                    .map(|t| self.text(&t).to_owned())
                    .unwrap_or_default();
                let args = self.arguments();
                let span = start..self.end();
                self.mk_expr(ExprKind::New { class_name, args }, span)
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.expression();
                self.expect(TokenKind::RParen, "')'");
                inner
            }
            TokenKind::LBracket => {
                self.bump();
                let mut elems = Vec::new();
                if !self.at(TokenKind::RBracket) {
                    loop {
                        elems.push(self.expression());
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RBracket, "']'");
                let span = start..self.end();
                self.mk_expr(ExprKind::ArrayLiteral { elems }, span)
            }
            TokenKind::Identifier => {
                let tok = self.bump();
                let name = self.text(&tok).to_owned();
                self.mk_expr(ExprKind::Name(name), tok.span())
            }
            _ => {
                self.error_here("Se esperaba una expresion.".to_owned());
                // Consume the offender unless it can close the statement.
                if !matches!(
                    self.peek(),
                    TokenKind::Semi | TokenKind::RBrace | TokenKind::RParen | TokenKind::Eof
                ) {
                    self.bump();
                }
                let span = start..self.end().max(start);
                self.mk_expr(ExprKind::Null, span)
            }
        }
    }
}
