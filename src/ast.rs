//! AST/IR node shapes, generic over an `info: T` payload.
//!
//! The same node definitions serve both stages of the pipeline: the parser
//! produces `Stmt<()>`/`Expr<()>`, the analyzer produces `Stmt<Type>`/`Expr<Type>`
//! by re-annotating every node with its resolved type. This mirrors the
//! teacher crate's own in-progress generic-node rewrite (`Statement<T>`,
//! `BinaryExpr<T>`) rather than keeping two parallel tree types in sync by
//! hand.
use bigdecimal::BigDecimal;
use num_bigint::BigInt;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Nil,
    Bool(bool),
    Integer(BigInt),
    Decimal(BigDecimal),
    Str(String),
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Neq,
    And,
    Or,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
        }
    }
}

/// A field of an `ObjectExpr`, i.e. a `LET` appearing between `OBJECT ... DO` and `END`.
#[derive(Debug, Clone, PartialEq)]
pub struct LetField<T> {
    pub name: String,
    pub type_name: Option<String>,
    pub value: Option<Expr<T>>,
    pub info: T,
}

/// A function definition, used both at top level (`Stmt::Def`) and inside an
/// `ObjectExpr` (methods share the same shape, just analyzed with `this` bound).
#[derive(Debug, Clone, PartialEq)]
pub struct Def<T> {
    pub name: String,
    pub parameters: Vec<String>,
    pub parameter_types: Vec<Option<String>>,
    pub return_type: Option<String>,
    pub body: Vec<Stmt<T>>,
    pub info: T,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr<T> {
    Literal(Literal, T),
    Group(Box<Expr<T>>, T),
    Binary(BinaryOp, Box<Expr<T>>, Box<Expr<T>>, T),
    Variable(String, T),
    Property(Box<Expr<T>>, String, T),
    Function(String, Vec<Expr<T>>, T),
    Method(Box<Expr<T>>, String, Vec<Expr<T>>, T),
    ObjectExpr {
        name: Option<String>,
        fields: Vec<LetField<T>>,
        methods: Vec<Def<T>>,
        info: T,
    },
}

impl<T: Clone> Expr<T> {
    /// The `info` payload carried by this node — `()` for the raw AST, the
    /// resolved `Type` once the analyzer has visited it.
    pub fn info(&self) -> T {
        match self {
            Expr::Literal(_, info) => info.clone(),
            Expr::Group(_, info) => info.clone(),
            Expr::Binary(_, _, _, info) => info.clone(),
            Expr::Variable(_, info) => info.clone(),
            Expr::Property(_, _, info) => info.clone(),
            Expr::Function(_, _, info) => info.clone(),
            Expr::Method(_, _, _, info) => info.clone(),
            Expr::ObjectExpr { info, .. } => info.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<T> {
    Let {
        name: String,
        type_name: Option<String>,
        value: Option<Expr<T>>,
        info: T,
    },
    Def(Def<T>),
    If {
        cond: Expr<T>,
        then_branch: Vec<Stmt<T>>,
        else_branch: Vec<Stmt<T>>,
        info: T,
    },
    For {
        name: String,
        iterable: Expr<T>,
        body: Vec<Stmt<T>>,
        info: T,
    },
    Return {
        value: Option<Expr<T>>,
        info: T,
    },
    Expression {
        expr: Expr<T>,
    },
    Assignment {
        target: Expr<T>,
        value: Expr<T>,
        info: T,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Source<T> {
    pub statements: Vec<Stmt<T>>,
}
