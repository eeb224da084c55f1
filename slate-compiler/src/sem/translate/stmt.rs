//! Statement translation.

use super::Translator;
use crate::diag::Diag;
use crate::frontend::ast::{self, Span};
use crate::sem::value::Value;

impl Translator {
    pub(crate) fn translate_stmt(&mut self, stmt: &ast::Stmt) -> Result<(), Diag> {
        match stmt {
            ast::Stmt::Expr(e) => {
                self.translate_expr_rhs(e)?;
                Ok(())
            }
            ast::Stmt::Return { span, results } => self.translate_return(*span, results),
            ast::Stmt::Decl(gen) => self.translate_gen_decl(gen),
            ast::Stmt::Assign {
                span,
                lhs,
                rhs,
                define,
            } => self.translate_assign(*span, lhs, rhs, *define),
        }
    }

    fn translate_return(&mut self, span: Span, results: &[ast::Expr]) -> Result<(), Diag> {
        let result_ty = self.ctx().result.clone();
        if results.is_empty() {
            if result_ty.is_some() {
                return Err(self.diag_at(span, "Function is expected to return a value!"));
            }
            let builder = self.ctx().builder;
            builder.build_ret_void(&mut self.module);
            return Ok(());
        }
        if results.len() > 1 {
            return Err(self.diag_at(
                span,
                "Only single-value return is implemented at this time.",
            ));
        }
        let typed = self.translate_expr_rhs_typed(&results[0], result_ty.as_ref())?;
        let value = typed.ir_value(self.word());
        let builder = self.ctx().builder;
        builder.build_ret(&mut self.module, value);
        Ok(())
    }

    fn translate_gen_decl(&mut self, gen: &ast::GenDecl) -> Result<(), Diag> {
        match (gen.kind, &gen.spec) {
            (ast::DeclKind::Var | ast::DeclKind::Const, ast::Spec::Value(spec)) => {
                self.translate_var_spec(gen.kind, spec)
            }
            _ => Err(self.diag_at(
                gen.span,
                format!(
                    "General declaration type \"{}\" not implemented yet.",
                    gen.kind.name()
                ),
            )),
        }
    }

    fn translate_var_spec(
        &mut self,
        kind: ast::DeclKind,
        spec: &ast::ValueSpec,
    ) -> Result<(), Diag> {
        if kind == ast::DeclKind::Const {
            return Err(self.diag_at(spec.span, "Const declarations are not yet implemented."));
        }
        let Some(ty_expr) = &spec.ty else {
            return Err(self.diag_at(
                spec.span,
                "Unable to handle non-typed variable declarations at this time.",
            ));
        };
        let ty = self.translate_type(ty_expr)?;

        // Variables are either all zero-initialized or all given expressions.
        if !spec.values.is_empty() && spec.values.len() != spec.names.len() {
            return Err(self.diag_at(
                spec.span,
                "Partial initialization of variables in a variable declaration is not allowed.",
            ));
        }

        for (idx, name) in spec.names.iter().enumerate() {
            let scope = self.ctx().scope;
            if self.scopes.lookup_var(scope, &name.name).is_some() {
                return Err(
                    self.diag_at(name.span, "A variable already exists with this identifier.")
                );
            }

            let value = if spec.values.is_empty() {
                Value::Typed(ty.zero(self.word()))
            } else {
                let init = &spec.values[idx];
                let operand = self.translate_expr_rhs(init)?;
                if let Some(actual) = operand.committed_ty(&self.scopes) {
                    if actual != ty {
                        return Err(self.diag_at(
                            init.span(),
                            format!(
                                "Expected initializer of type \"{ty}\", but found type \"{actual}\"."
                            ),
                        ));
                    }
                }
                let typed = operand
                    .rvalue(&self.scopes, Some(&ty))
                    .map_err(|ud| self.bind(init.span(), ud))?;
                Value::Typed(typed)
            };

            self.scopes.add_value(scope, &name.name, false, value);
        }
        Ok(())
    }

    fn translate_assign(
        &mut self,
        span: Span,
        lhs: &[ast::Expr],
        rhs: &[ast::Expr],
        define: bool,
    ) -> Result<(), Diag> {
        if define {
            return Err(self.diag_at(
                span,
                "Short variable declarations are not yet implemented.",
            ));
        }
        if lhs.len() != rhs.len() {
            return Err(self.diag_at(span, "Every variable must have an equivalent rValue"));
        }

        // Evaluate every right-hand side before committing any left-hand
        // side: `a, b = b, a` swaps.
        let mut values = Vec::with_capacity(rhs.len());
        for e in rhs {
            values.push(self.translate_expr_rhs_typed(e, None)?);
        }
        for (target, value) in lhs.iter().zip(values) {
            let binding = self.translate_expr_lhs(target)?;
            self.scopes.binding_mut(binding).value = Value::Typed(value);
        }
        Ok(())
    }
}
