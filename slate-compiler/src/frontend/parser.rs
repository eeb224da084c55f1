//! Hand-written recursive descent parser producing the spanned AST.

use super::ast::*;
use super::lexer::{self, Spanned, Token};
use crate::CompileError;

/// Parse a whole source file.
pub fn parse_file(source: &str) -> Result<File, CompileError> {
    let tokens = lexer::lex(source)?;
    Parser {
        tokens,
        pos: 0,
        end: source.len(),
    }
    .file()
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t, _)| t)
    }

    fn location(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(s, _, _)| *s)
            .unwrap_or(self.end)
    }

    fn bump(&mut self) -> Option<Spanned> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn error(&self, expected: impl Into<String>) -> CompileError {
        let message = match self.peek() {
            Some(tok) => format!("expected {}, found {tok}", expected.into()),
            None => format!("expected {}, found end of file", expected.into()),
        };
        CompileError::Parse {
            location: self.location(),
            message,
        }
    }

    fn eat(&mut self, tok: &Token) -> Option<Span> {
        if self.peek() == Some(tok) {
            let (s, _, e) = self.bump().unwrap();
            Some(Span::new(s, e))
        } else {
            None
        }
    }

    fn expect(&mut self, tok: &Token, what: &str) -> Result<Span, CompileError> {
        self.eat(tok).ok_or_else(|| self.error(what))
    }

    fn ident(&mut self) -> Result<Ident, CompileError> {
        match self.peek() {
            Some(Token::Ident(_)) => {
                let Some((s, Token::Ident(name), e)) = self.bump() else {
                    unreachable!()
                };
                Ok(Ident {
                    span: Span::new(s, e),
                    name,
                })
            }
            _ => Err(self.error("identifier")),
        }
    }

    fn skip_semis(&mut self) {
        while self.eat(&Token::Semi).is_some() {}
    }

    /// A statement or declaration terminator: an explicit or inserted `;`,
    /// or the closing brace / end of file right after.
    fn terminator(&mut self) -> Result<(), CompileError> {
        if self.eat(&Token::Semi).is_some() {
            return Ok(());
        }
        match self.peek() {
            Some(Token::RBrace) | None => Ok(()),
            _ => Err(self.error("';' or newline")),
        }
    }

    fn file(&mut self) -> Result<File, CompileError> {
        self.skip_semis();
        let start = self.expect(&Token::Package, "'package'")?;
        let name = self.ident()?;
        let mut end_span = name.span;
        self.terminator()?;
        self.skip_semis();
        let mut decls = Vec::new();
        while self.peek().is_some() {
            let decl = self.decl()?;
            end_span = decl.span();
            decls.push(decl);
            self.terminator()?;
            self.skip_semis();
        }
        Ok(File {
            span: start.to(end_span),
            package: name.name,
            decls,
        })
    }

    fn decl(&mut self) -> Result<Decl, CompileError> {
        match self.peek() {
            Some(Token::Func) => self.func_decl().map(Decl::Func),
            Some(Token::Import) => {
                let kw = self.eat(&Token::Import).unwrap();
                match self.peek() {
                    Some(Token::Str(_)) => {
                        let Some((s, Token::Str(path), e)) = self.bump() else {
                            unreachable!()
                        };
                        Ok(Decl::Import {
                            span: kw.to(Span::new(s, e)),
                            path,
                        })
                    }
                    _ => Err(self.error("import path string")),
                }
            }
            Some(Token::Var | Token::Const | Token::Type) => self.gen_decl().map(Decl::Gen),
            _ => Err(self.error("declaration")),
        }
    }

    fn func_decl(&mut self) -> Result<FuncDecl, CompileError> {
        let kw = self.expect(&Token::Func, "'func'")?;
        let recv = if self.peek() == Some(&Token::LParen) {
            self.bump();
            let field = self.field()?;
            self.expect(&Token::RParen, "')'")?;
            Some(field)
        } else {
            None
        };
        let name = self.ident()?;
        self.expect(&Token::LParen, "'('")?;
        let params = if self.peek() == Some(&Token::RParen) {
            Vec::new()
        } else {
            self.fields()?
        };
        self.expect(&Token::RParen, "')'")?;
        let results = self.results()?;
        let (body, end) = self.block()?;
        Ok(FuncDecl {
            span: kw.to(end),
            recv,
            name,
            params,
            results,
            body,
        })
    }

    fn fields(&mut self) -> Result<Vec<Field>, CompileError> {
        let mut out = vec![self.field()?];
        while self.eat(&Token::Comma).is_some() {
            out.push(self.field()?);
        }
        Ok(out)
    }

    /// One parameter group: `a, b int64`. All identifiers before the type
    /// belong to the group.
    fn field(&mut self) -> Result<Field, CompileError> {
        let mut names = vec![self.ident()?];
        while self.peek() == Some(&Token::Comma) {
            self.bump();
            names.push(self.ident()?);
        }
        let ty = self.type_expr()?;
        let span = names[0].span.to(ty.span());
        Ok(Field { span, names, ty })
    }

    fn results(&mut self) -> Result<Vec<TypeExpr>, CompileError> {
        match self.peek() {
            Some(Token::LParen) => {
                self.bump();
                let mut out = Vec::new();
                if self.peek() != Some(&Token::RParen) {
                    out.push(self.type_expr()?);
                    while self.eat(&Token::Comma).is_some() {
                        out.push(self.type_expr()?);
                    }
                }
                self.expect(&Token::RParen, "')'")?;
                Ok(out)
            }
            Some(Token::Ident(_) | Token::Star) => Ok(vec![self.type_expr()?]),
            _ => Ok(Vec::new()),
        }
    }

    fn block(&mut self) -> Result<(Vec<Stmt>, Span), CompileError> {
        self.expect(&Token::LBrace, "'{'")?;
        self.skip_semis();
        let mut stmts = Vec::new();
        while self.peek() != Some(&Token::RBrace) {
            if self.peek().is_none() {
                return Err(self.error("'}'"));
            }
            stmts.push(self.stmt()?);
            self.terminator()?;
            self.skip_semis();
        }
        let end = self.eat(&Token::RBrace).unwrap();
        Ok((stmts, end))
    }

    fn stmt(&mut self) -> Result<Stmt, CompileError> {
        match self.peek() {
            Some(Token::Return) => {
                let kw = self.eat(&Token::Return).unwrap();
                let results = match self.peek() {
                    Some(Token::Semi | Token::RBrace) | None => Vec::new(),
                    _ => self.expr_list()?,
                };
                let span = results.last().map(|e| kw.to(e.span())).unwrap_or(kw);
                Ok(Stmt::Return { span, results })
            }
            Some(Token::Var | Token::Const | Token::Type) => self.gen_decl().map(Stmt::Decl),
            _ => self.simple_stmt(),
        }
    }

    fn simple_stmt(&mut self) -> Result<Stmt, CompileError> {
        let lhs = self.expr_list()?;
        let define = match self.peek() {
            Some(Token::Assign) => {
                self.bump();
                false
            }
            Some(Token::Define) => {
                self.bump();
                true
            }
            _ => {
                if lhs.len() == 1 {
                    return Ok(Stmt::Expr(lhs.into_iter().next().unwrap()));
                }
                return Err(self.error("'=' or ':='"));
            }
        };
        let rhs = self.expr_list()?;
        let span = lhs[0].span().to(rhs.last().unwrap().span());
        Ok(Stmt::Assign {
            span,
            lhs,
            rhs,
            define,
        })
    }

    fn gen_decl(&mut self) -> Result<GenDecl, CompileError> {
        let (kw, kind) = match self.peek() {
            Some(Token::Var) => (self.bump().unwrap(), DeclKind::Var),
            Some(Token::Const) => (self.bump().unwrap(), DeclKind::Const),
            Some(Token::Type) => (self.bump().unwrap(), DeclKind::Type),
            _ => return Err(self.error("declaration")),
        };
        let kw_span = Span::new(kw.0, kw.2);
        if kind == DeclKind::Type {
            let name = self.ident()?;
            self.eat(&Token::Assign); // alias form: `type A = B`
            let ty = self.type_expr()?;
            let spec_span = name.span.to(ty.span());
            return Ok(GenDecl {
                span: kw_span.to(ty.span()),
                kind,
                spec: Spec::Type(TypeSpec {
                    span: spec_span,
                    name,
                    ty,
                }),
            });
        }
        let mut names = vec![self.ident()?];
        while self.eat(&Token::Comma).is_some() {
            names.push(self.ident()?);
        }
        let ty = match self.peek() {
            Some(Token::Ident(_) | Token::Star) => Some(self.type_expr()?),
            _ => None,
        };
        let values = if self.eat(&Token::Assign).is_some() {
            self.expr_list()?
        } else {
            Vec::new()
        };
        let end = values
            .last()
            .map(|e| e.span())
            .or_else(|| ty.as_ref().map(|t| t.span()))
            .unwrap_or(names.last().unwrap().span);
        let spec_span = names[0].span.to(end);
        Ok(GenDecl {
            span: kw_span.to(end),
            kind,
            spec: Spec::Value(ValueSpec {
                span: spec_span,
                names,
                ty,
                values,
            }),
        })
    }

    fn type_expr(&mut self) -> Result<TypeExpr, CompileError> {
        if let Some(star) = self.eat(&Token::Star) {
            let elem = self.type_expr()?;
            let span = star.to(elem.span());
            return Ok(TypeExpr::Pointer {
                span,
                elem: Box::new(elem),
            });
        }
        match self.peek() {
            Some(Token::Ident(_)) => Ok(TypeExpr::Name(self.ident()?)),
            _ => Err(self.error("type")),
        }
    }

    fn expr_list(&mut self) -> Result<Vec<Expr>, CompileError> {
        let mut out = vec![self.expr()?];
        while self.eat(&Token::Comma).is_some() {
            out.push(self.expr()?);
        }
        Ok(out)
    }

    fn expr(&mut self) -> Result<Expr, CompileError> {
        self.add_expr()
    }

    fn add_expr(&mut self) -> Result<Expr, CompileError> {
        let mut lhs = self.mul_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.bump();
            let rhs = self.mul_expr()?;
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Binary {
                span,
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn mul_expr(&mut self) -> Result<Expr, CompileError> {
        let mut lhs = self.unary_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Rem,
                _ => break,
            };
            self.bump();
            let rhs = self.unary_expr()?;
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Binary {
                span,
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary_expr(&mut self) -> Result<Expr, CompileError> {
        let op = match self.peek() {
            Some(Token::Minus) => Some(UnOp::Neg),
            Some(Token::Star) => Some(UnOp::Deref),
            Some(Token::Amp) => Some(UnOp::Addr),
            _ => None,
        };
        if let Some(op) = op {
            let (s, _, _) = self.bump().unwrap();
            let operand = self.unary_expr()?;
            let span = Span::new(s, operand.span().end);
            return Ok(Expr::Unary {
                span,
                op,
                operand: Box::new(operand),
            });
        }
        self.postfix_expr()
    }

    fn postfix_expr(&mut self) -> Result<Expr, CompileError> {
        let mut e = self.operand()?;
        while self.peek() == Some(&Token::LParen) {
            self.bump();
            let mut args = Vec::new();
            if self.peek() != Some(&Token::RParen) {
                args.push(self.expr()?);
                while self.eat(&Token::Comma).is_some() {
                    args.push(self.expr()?);
                }
            }
            let rp = self.expect(&Token::RParen, "')'")?;
            let span = e.span().to(rp);
            e = Expr::Call {
                span,
                callee: Box::new(e),
                args,
            };
        }
        Ok(e)
    }

    fn operand(&mut self) -> Result<Expr, CompileError> {
        match self.peek() {
            Some(Token::Ident(_)) => Ok(Expr::Ident(self.ident()?)),
            Some(Token::Int(_)) => {
                let Some((s, Token::Int(text), e)) = self.bump() else {
                    unreachable!()
                };
                Ok(Expr::IntLit {
                    span: Span::new(s, e),
                    text,
                })
            }
            Some(Token::Str(_)) => {
                let Some((s, Token::Str(value), e)) = self.bump() else {
                    unreachable!()
                };
                Ok(Expr::StrLit {
                    span: Span::new(s, e),
                    value,
                })
            }
            Some(Token::LParen) => {
                self.bump();
                let inner = self.expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            _ => Err(self.error("expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file() {
        let file = parse_file("package main\n").unwrap();
        assert_eq!(file.package, "main");
        assert!(file.decls.is_empty());
    }

    #[test]
    fn hello_function() {
        let src = "package main\n\nfunc main() {\n\tputs(\"hi\")\n}\n";
        let file = parse_file(src).unwrap();
        assert_eq!(file.decls.len(), 1);
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl")
        };
        assert_eq!(f.name.name, "main");
        assert!(f.recv.is_none());
        assert!(f.params.is_empty());
        assert!(f.results.is_empty());
        assert_eq!(f.body.len(), 1);
        assert!(matches!(&f.body[0], Stmt::Expr(Expr::Call { .. })));
    }

    #[test]
    fn grouped_params_and_result() {
        let src = "package p\nfunc f(a, b int64, c *uint8) int64 {\n\treturn a\n}\n";
        let file = parse_file(src).unwrap();
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl")
        };
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.params[0].names.len(), 2);
        assert_eq!(f.params[1].names.len(), 1);
        assert!(matches!(&f.params[1].ty, TypeExpr::Pointer { .. }));
        assert_eq!(f.results.len(), 1);
    }

    #[test]
    fn method_receiver_is_parsed() {
        let src = "package p\nfunc (r T) f() {\n}\n";
        let file = parse_file(src).unwrap();
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl")
        };
        assert!(f.recv.is_some());
    }

    #[test]
    fn var_decl_forms() {
        let src = "package p\nfunc f() {\n\tvar a int64\n\tvar b, c int32 = 1, 2\n\tvar d = 3\n}\n";
        let file = parse_file(src).unwrap();
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl")
        };
        assert_eq!(f.body.len(), 3);
        let Stmt::Decl(d) = &f.body[1] else {
            panic!("expected decl stmt")
        };
        let Spec::Value(spec) = &d.spec else {
            panic!("expected value spec")
        };
        assert_eq!(spec.names.len(), 2);
        assert_eq!(spec.values.len(), 2);
        assert!(spec.ty.is_some());
        let Stmt::Decl(d) = &f.body[2] else {
            panic!("expected decl stmt")
        };
        let Spec::Value(spec) = &d.spec else {
            panic!("expected value spec")
        };
        assert!(spec.ty.is_none());
    }

    #[test]
    fn parallel_assignment() {
        let src = "package p\nfunc f() {\n\ta, b = b, a\n}\n";
        let file = parse_file(src).unwrap();
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl")
        };
        let Stmt::Assign {
            lhs, rhs, define, ..
        } = &f.body[0]
        else {
            panic!("expected assignment")
        };
        assert_eq!(lhs.len(), 2);
        assert_eq!(rhs.len(), 2);
        assert!(!define);
    }

    #[test]
    fn short_decl_sets_define_flag() {
        let src = "package p\nfunc f() {\n\tx := 1\n}\n";
        let file = parse_file(src).unwrap();
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl")
        };
        assert!(matches!(&f.body[0], Stmt::Assign { define: true, .. }));
    }

    #[test]
    fn multiple_return_values_are_parsed() {
        let src = "package p\nfunc f() (int64, int64) {\n\treturn a, b\n}\n";
        let file = parse_file(src).unwrap();
        let Decl::Func(f) = &file.decls[0] else {
            panic!("expected func decl")
        };
        assert_eq!(f.results.len(), 2);
        let Stmt::Return { results, .. } = &f.body[0] else {
            panic!("expected return")
        };
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn missing_package_clause() {
        let err = parse_file("func f() {}\n").unwrap_err();
        assert!(matches!(err, CompileError::Parse { .. }));
    }

    #[test]
    fn semicolons_may_be_explicit() {
        let src = "package p; func f() { puts(\"x\"); }";
        assert!(parse_file(src).is_ok());
    }
}
