//! Abstract Syntax Tree definitions for MiniJava.

/// Source span for tracking positions in error messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    /// Byte offset from start of source
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
}

impl Span {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// Create a span that covers both self and other
    pub fn merge(&self, other: &Span) -> Span {
        let start = self.offset.min(other.offset);
        let end = (self.offset + self.length).max(other.offset + other.length);
        Span::new(start, end - start)
    }
}

/// The root of the AST - one compiled unit
#[derive(Debug, Clone)]
pub struct Program {
    pub main: MainClass,
    pub classes: Vec<ClassDecl>,
}

/// An identifier together with where it was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// The entry-point class holding `public static void main(String[] args)`
#[derive(Debug, Clone)]
pub struct MainClass {
    pub name: Ident,
    /// Name of the `String[]` parameter of `main`
    pub arg: Ident,
    pub locals: Vec<VarDecl>,
    pub body: Vec<Stmt>,
}

/// A regular class, optionally extending a previously declared one
#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: Ident,
    pub parent: Option<Ident>,
    pub fields: Vec<VarDecl>,
    pub methods: Vec<MethodDecl>,
}

/// A typed name: field, parameter or local variable
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub type_spec: TypeSpec,
    pub name: Ident,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub return_type: TypeSpec,
    pub name: Ident,
    pub params: Vec<VarDecl>,
    pub locals: Vec<VarDecl>,
    pub body: Vec<Stmt>,
    /// Every method ends in exactly one `return <expr>;`
    pub return_expr: Expr,
}

/// A type annotation as written in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub base: BaseType,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseType {
    Int,
    Boolean,
    IntArray,
    Named(String),
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Block(Vec<Stmt>),
    Assign {
        target: Ident,
        value: Expr,
    },
    ArrayAssign {
        target: Ident,
        index: Expr,
        value: Expr,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Box<Stmt>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    Print(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Lt,
    Add,
    Sub,
    Mul,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::And => "&&",
            BinaryOp::Lt => "<",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    IntLiteral {
        value: i32,
        span: Span,
    },
    BoolLiteral {
        value: bool,
        span: Span,
    },
    Identifier(Ident),
    This(Span),
    /// `new int[size]`
    NewArray {
        size: Box<Expr>,
        span: Span,
    },
    /// `new C()`
    NewObject {
        class: Ident,
        span: Span,
    },
    Not {
        operand: Box<Expr>,
        span: Span,
    },
    Paren {
        inner: Box<Expr>,
        span: Span,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
        span: Span,
    },
    ArrayLookup {
        array: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    ArrayLength {
        array: Box<Expr>,
        span: Span,
    },
    /// `receiver.method(args)`
    Call {
        receiver: Box<Expr>,
        method: Ident,
        args: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Identifier(ident) => ident.span,
            Expr::This(span) => *span,
            Expr::IntLiteral { span, .. }
            | Expr::BoolLiteral { span, .. }
            | Expr::NewArray { span, .. }
            | Expr::NewObject { span, .. }
            | Expr::Not { span, .. }
            | Expr::Paren { span, .. }
            | Expr::Binary { span, .. }
            | Expr::ArrayLookup { span, .. }
            | Expr::ArrayLength { span, .. }
            | Expr::Call { span, .. } => *span,
        }
    }
}
