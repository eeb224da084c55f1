//! Spanned syntax tree for a single source file.

/// A byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
        }
    }
}

#[derive(Debug, Clone)]
pub struct File {
    pub span: Span,
    pub package: String,
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone)]
pub enum Decl {
    Func(FuncDecl),
    Gen(GenDecl),
    Import { span: Span, path: String },
}

impl Decl {
    pub fn span(&self) -> Span {
        match self {
            Decl::Func(d) => d.span,
            Decl::Gen(d) => d.span,
            Decl::Import { span, .. } => *span,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Decl::Func(_) => "func",
            Decl::Gen(d) => d.kind.name(),
            Decl::Import { .. } => "import",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub span: Span,
    /// Present for method declarations, which the translator rejects.
    pub recv: Option<Field>,
    pub name: Ident,
    pub params: Vec<Field>,
    pub results: Vec<TypeExpr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct Ident {
    pub span: Span,
    pub name: String,
}

/// A grouped parameter field: `a, b int64`.
#[derive(Debug, Clone)]
pub struct Field {
    pub span: Span,
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone)]
pub enum TypeExpr {
    Name(Ident),
    Pointer { span: Span, elem: Box<TypeExpr> },
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Name(id) => id.span,
            TypeExpr::Pointer { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Var,
    Const,
    Type,
}

impl DeclKind {
    pub fn name(self) -> &'static str {
        match self {
            DeclKind::Var => "var",
            DeclKind::Const => "const",
            DeclKind::Type => "type",
        }
    }
}

/// A `var`, `const`, or `type` declaration.
#[derive(Debug, Clone)]
pub struct GenDecl {
    pub span: Span,
    pub kind: DeclKind,
    pub spec: Spec,
}

#[derive(Debug, Clone)]
pub enum Spec {
    Value(ValueSpec),
    Type(TypeSpec),
}

/// `name1, name2 T = v1, v2` — type and values both optional in the syntax.
#[derive(Debug, Clone)]
pub struct ValueSpec {
    pub span: Span,
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub span: Span,
    pub name: Ident,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Return {
        span: Span,
        results: Vec<Expr>,
    },
    Assign {
        span: Span,
        lhs: Vec<Expr>,
        rhs: Vec<Expr>,
        /// True for `:=` assignments.
        define: bool,
    },
    Decl(GenDecl),
    Expr(Expr),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Return { span, .. } => *span,
            Stmt::Assign { span, .. } => *span,
            Stmt::Decl(d) => d.span,
            Stmt::Expr(e) => e.span(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Ident(Ident),
    IntLit {
        span: Span,
        /// The literal digits as written; base detection happens later.
        text: String,
    },
    StrLit {
        span: Span,
        /// Raw bytes between the quotes; no escape processing.
        value: String,
    },
    Call {
        span: Span,
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Binary {
        span: Span,
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        span: Span,
        op: UnOp,
        operand: Box<Expr>,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident(id) => id.span,
            Expr::IntLit { span, .. } => *span,
            Expr::StrLit { span, .. } => *span,
            Expr::Call { span, .. } => *span,
            Expr::Binary { span, .. } => *span,
            Expr::Unary { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Deref,
    Addr,
}
