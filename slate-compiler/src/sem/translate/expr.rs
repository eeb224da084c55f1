//! Expression translation.

use super::Translator;
use crate::diag::Diag;
use crate::frontend::ast;
use crate::ir;
use crate::sem::scope::BindingId;
use crate::sem::types::Type;
use crate::sem::value::{parse_int, Operand, Typed, Value};

impl Translator {
    /// Translate an expression into an untyped operand.
    pub(crate) fn translate_expr_rhs(&mut self, expr: &ast::Expr) -> Result<Operand, Diag> {
        match expr {
            ast::Expr::Ident(id) => self
                .scopes
                .lookup_var(self.current_scope(), &id.name)
                .map(Operand::Var)
                .ok_or_else(|| {
                    self.diag_at(id.span, format!("Unknown identifier \"{}\".", id.name))
                }),
            ast::Expr::IntLit { span, text } => {
                let parsed = parse_int(text)
                    .ok_or_else(|| self.diag_at(*span, "Unable to parse integer!"))?;
                Ok(Operand::Val(Value::Int(parsed)))
            }
            ast::Expr::StrLit { value, .. } => {
                let lit = self.translate_string_lit(value);
                Ok(Operand::Val(Value::Typed(lit)))
            }
            ast::Expr::Call { .. } => self.translate_call_expr(expr),
            ast::Expr::Binary { span, .. } | ast::Expr::Unary { span, .. } => {
                Err(self.diag_at(*span, "Cannot translate this expression."))
            }
        }
    }

    /// Translate an expression and commit it against `expected`.
    pub(crate) fn translate_expr_rhs_typed(
        &mut self,
        expr: &ast::Expr,
        expected: Option<&Type>,
    ) -> Result<Typed, Diag> {
        let operand = self.translate_expr_rhs(expr)?;
        operand
            .rvalue(&self.scopes, expected)
            .map_err(|ud| self.bind(expr.span(), ud))
    }

    /// Resolve an expression to an assignable binding. Only bare identifiers
    /// bound to non-const variables qualify.
    pub(crate) fn translate_expr_lhs(&mut self, expr: &ast::Expr) -> Result<BindingId, Diag> {
        match expr {
            ast::Expr::Ident(id) => {
                let Some(binding) = self.scopes.lookup_var(self.current_scope(), &id.name) else {
                    return Err(
                        self.diag_at(id.span, format!("Unknown identifier \"{}\".", id.name))
                    );
                };
                if !Operand::Var(binding).is_lvalue(&self.scopes) {
                    return Err(self.diag_at(
                        id.span,
                        format!("Unable to assign to variable \"{}\".", id.name),
                    ));
                }
                Ok(binding)
            }
            other => Err(self.diag_at(other.span(), "Expected an lvalue expression.")),
        }
    }

    /// Allocate the backing byte-array global for a string literal. The
    /// bytes are taken as written; a NUL terminator is appended.
    fn translate_string_lit(&mut self, lit: &str) -> Typed {
        let byte_ty = self
            .scopes
            .lookup_type(self.top, "byte")
            .cloned()
            .expect("the byte alias is installed with the primitives");
        let mut bytes = lit.as_bytes().to_vec();
        bytes.push(0);
        let arr_ty = ir::Ty::Array {
            elem: Box::new(byte_ty.ir_ty(self.word())),
            len: bytes.len(),
        };
        let ptr_ty = Type::Pointer(Box::new(byte_ty));
        let global = self.ns.alloc_static_const(
            &mut self.module,
            &ptr_ty.base_id(),
            arr_ty,
            ir::Value::Bytes(bytes.clone()),
        );
        Typed::Str { bytes, global }
    }

    fn translate_call_expr(&mut self, expr: &ast::Expr) -> Result<Operand, Diag> {
        let ast::Expr::Call { span, callee, args } = expr else {
            unreachable!("translate_call_expr requires a call expression")
        };
        let callee_operand = self.translate_expr_rhs(callee)?;
        let callee_val = callee_operand
            .rvalue(&self.scopes, None)
            .map_err(|ud| self.bind(callee.span(), ud))?;
        let Typed::Func(func) = callee_val else {
            return Err(self.diag_at(callee.span(), "Given expression not a function!"));
        };
        let Type::Func { params, result } = func.ty.clone() else {
            unreachable!("function value without function type")
        };

        if params.len() != args.len() {
            return Err(self.diag_at(
                *span,
                format!("Expected {} arguments, found {}!", params.len(), args.len()),
            ));
        }

        let mut ir_args = Vec::with_capacity(args.len());
        for (arg, param_ty) in args.iter().zip(&params) {
            let operand = self.translate_expr_rhs(arg)?;
            let typed = operand
                .rvalue(&self.scopes, Some(param_ty))
                .map_err(|ud| self.bind(arg.span(), ud))?;
            ir_args.push(typed.ir_value(self.word()));
        }

        let builder = self.ctx().builder;
        let ret = builder.build_call(&mut self.module, func.ir.clone(), ir_args);
        Ok(match (ret, result) {
            (Some(value), Some(result_ty)) => Operand::Val(Value::Typed(Typed::Raw {
                ty: *result_ty,
                ir: value,
            })),
            _ => Operand::Val(Value::Typed(Typed::Func(func))),
        })
    }
}
