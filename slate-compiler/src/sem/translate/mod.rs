//! The semantic pass: walks the syntax tree, resolves identifiers and types
//! against the lexical scope chain, and emits typed IR into the module.

mod expr;
mod stmt;

use crate::diag::{Diag, UnboundDiag};
use crate::frontend::ast::{self, Span};
use crate::ir;
use crate::sem::namespace::IrNamespace;
use crate::sem::scope::{ScopeId, Scopes};
use crate::sem::types::{IntKind, Type};
use crate::sem::value::{FuncValue, Typed, Value};
use crate::source_map::SourceIndex;
use crate::target::Target;

/// Translate a parsed file into an IR module. Declarations are translated in
/// file order; the first diagnostic aborts.
pub fn translate_file(
    file: &ast::File,
    source: &str,
    file_name: &str,
    target: Target,
) -> Result<ir::Module, Diag> {
    let mut trans = Translator::new(file, source, file_name, target);
    trans.install_primitives();
    trans.declare_runtime();
    for decl in &file.decls {
        trans.translate_decl(decl)?;
    }
    Ok(trans.module)
}

/// Translation state for the function body currently being emitted.
pub(crate) struct FuncCtx {
    pub scope: ScopeId,
    pub builder: ir::Builder,
    pub result: Option<Type>,
}

pub struct Translator {
    pub module: ir::Module,
    pub scopes: Scopes,
    pub top: ScopeId,
    pub target: Target,
    pub ns: IrNamespace,
    file_name: String,
    index: SourceIndex,
    pub(crate) fn_ctx: Option<FuncCtx>,
}

impl Translator {
    fn new(file: &ast::File, source: &str, file_name: &str, target: Target) -> Self {
        let mut module = ir::Module::new(&file.package);
        module.set_target(&target.triple);
        module.set_data_layout(&target.data_layout);
        let mut scopes = Scopes::new();
        let top = scopes.root();
        Self {
            module,
            scopes,
            top,
            target,
            ns: IrNamespace::new(),
            file_name: file_name.to_string(),
            index: SourceIndex::new(source),
            fn_ctx: None,
        }
    }

    pub(crate) fn word(&self) -> u32 {
        self.target.word_size
    }

    pub(crate) fn ctx(&self) -> &FuncCtx {
        self.fn_ctx
            .as_ref()
            .expect("statement translation outside a function body")
    }

    pub(crate) fn current_scope(&self) -> ScopeId {
        self.fn_ctx.as_ref().map(|c| c.scope).unwrap_or(self.top)
    }

    pub(crate) fn diag_at(&self, span: Span, msg: impl Into<String>) -> Diag {
        Diag::bound(&self.file_name, &self.index, span.start, span.end, msg)
    }

    /// Attach a span to a diagnostic raised by the value model.
    pub(crate) fn bind(&self, span: Span, unbound: UnboundDiag) -> Diag {
        self.diag_at(span, unbound.0)
    }

    /// Register the integer primitives and the `byte` alias.
    fn install_primitives(&mut self) {
        for signed in [false, true] {
            for kind in [
                IntKind::W8,
                IntKind::W16,
                IntKind::W32,
                IntKind::W64,
                IntKind::Word,
            ] {
                let ty = Type::int(kind, signed);
                self.scopes.add_type(self.top, &ty.to_string(), ty);
            }
        }
        self.scopes
            .add_alias(self.top, "byte", "uint8")
            .expect("uint8 is registered before the byte alias");
    }

    /// Declare the module-external runtime symbols.
    fn declare_runtime(&mut self) {
        let uint8 = Type::int(IntKind::W8, false);
        let int64 = Type::int(IntKind::W64, true);
        let uint64 = Type::int(IntKind::W64, false);
        self.add_extern_func("puts", None, vec![Type::Pointer(Box::new(uint8))]);
        self.add_extern_func("print_int", None, vec![int64]);
        self.add_extern_func("print_uint", None, vec![uint64]);
    }

    fn add_extern_func(&mut self, name: &str, result: Option<Type>, params: Vec<Type>) {
        let ty = Type::Func {
            params,
            result: result.map(Box::new),
        };
        let func = self
            .module
            .add_function(name, ty.ir_ty(self.word()), ir::Linkage::External);
        let value = Typed::Func(FuncValue {
            name: name.to_string(),
            ty,
            ir: ir::Value::Func(func),
        });
        self.scopes
            .add_value(self.top, name, true, Value::Typed(value));
    }

    fn translate_decl(&mut self, decl: &ast::Decl) -> Result<(), Diag> {
        match decl {
            ast::Decl::Func(f) => {
                if f.recv.is_some() {
                    return Err(self.diag_at(f.span, "Methods not supported yet."));
                }
                self.translate_func_decl(f)
            }
            other => Err(self.diag_at(
                other.span(),
                format!("Unsupported declaration type \"{}\".", other.kind_name()),
            )),
        }
    }

    fn translate_func_decl(&mut self, decl: &ast::FuncDecl) -> Result<(), Diag> {
        if decl.results.len() > 1 {
            return Err(self.diag_at(
                decl.span,
                "Returning more than one value is not yet permitted.",
            ));
        }

        let mut params = Vec::new();
        for field in &decl.params {
            let ty = self.translate_type(&field.ty)?;
            for _ in &field.names {
                params.push(ty.clone());
            }
        }
        let result = match decl.results.first() {
            Some(r) => Some(self.translate_type(r)?),
            None => None,
        };
        let fn_ty = Type::Func {
            params,
            result: result.clone().map(Box::new),
        };

        let func = self.module.add_function(
            &decl.name.name,
            fn_ty.ir_ty(self.word()),
            ir::Linkage::Default,
        );
        let entry = self.module.append_block(func, "entry");
        let mut builder = ir::Builder::new();
        builder.position_at_end(entry);

        let scope = self.scopes.child(self.top);
        self.fn_ctx = Some(FuncCtx {
            scope,
            builder,
            result,
        });
        let outcome = decl.body.iter().try_for_each(|s| self.translate_stmt(s));
        self.fn_ctx = None;
        outcome
    }

    pub(crate) fn translate_type(&mut self, ty: &ast::TypeExpr) -> Result<Type, Diag> {
        match ty {
            ast::TypeExpr::Name(id) => self
                .scopes
                .lookup_type(self.current_scope(), &id.name)
                .cloned()
                .ok_or_else(|| self.diag_at(id.span, format!("Unknown type \"{}\".", id.name))),
            ast::TypeExpr::Pointer { elem, .. } => {
                let at = self.translate_type(elem)?;
                Ok(Type::Pointer(Box::new(at)))
            }
        }
    }
}
