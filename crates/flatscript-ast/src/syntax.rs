//! Syntax tree for FlatScript programs.
//!
//! The shape follows the conventional ESTree model for a dynamically-typed,
//! C-style scripting language: programs, statements, expressions, function
//! declarations, `with`, `try`/`catch`, labels, `for-in`, compound
//! assignment, pre/post increment, short-circuit operators, `delete`, and
//! implicit globals. Every node kind carries its ESTree name as the serde
//! `type` tag, so trees interchange with front ends that emit ESTree JSON
//! (unknown keys such as `loc` or `raw` are ignored on input).

use serde::{Deserialize, Serialize};

/// A whole source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub body: Vec<Stmt>,
}

/// A function, shared between declaration and expression positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub id: Option<String>,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

/// A single `name = init` slot of a `var` statement.
///
/// `exposed` is set by the normalizer on hoisted declarators whose binding
/// is assigned from a nested function; downstream passes use it to tell
/// closure-mutated locals apart from purely local ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declarator {
    pub name: String,
    pub init: Option<Expr>,
    #[serde(default)]
    pub exposed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Stmt {
    #[serde(rename = "EmptyStatement")]
    Empty,
    #[serde(rename = "ExpressionStatement")]
    Expr { expression: Expr },
    #[serde(rename = "VariableDeclaration")]
    VarDecl { declarations: Vec<Declarator> },
    #[serde(rename = "FunctionDeclaration")]
    FunctionDecl { function: Box<Function> },
    #[serde(rename = "BlockStatement")]
    Block { body: Vec<Stmt> },
    #[serde(rename = "ReturnStatement")]
    Return { argument: Option<Expr> },
    #[serde(rename = "DebuggerStatement")]
    Debugger,
    #[serde(rename = "IfStatement")]
    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    #[serde(rename = "ThrowStatement")]
    Throw { argument: Expr },
    #[serde(rename = "TryStatement")]
    Try {
        block: Vec<Stmt>,
        handlers: Vec<CatchClause>,
        finalizer: Option<Vec<Stmt>>,
    },
    #[serde(rename = "LabeledStatement")]
    Labeled { label: String, body: Box<Stmt> },
    #[serde(rename = "BreakStatement")]
    Break { label: Option<String> },
    #[serde(rename = "ContinueStatement")]
    Continue { label: Option<String> },
    #[serde(rename = "WhileStatement")]
    While { test: Expr, body: Box<Stmt> },
    #[serde(rename = "DoWhileStatement")]
    DoWhile { body: Box<Stmt>, test: Expr },
    #[serde(rename = "ForStatement")]
    For {
        init: Option<ForInit>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    #[serde(rename = "ForInStatement")]
    ForIn {
        left: ForInTarget,
        right: Expr,
        body: Box<Stmt>,
    },
    #[serde(rename = "SwitchStatement")]
    Switch { discriminant: Expr, cases: Vec<SwitchCase> },
    #[serde(rename = "WithStatement")]
    With { object: Expr, body: Box<Stmt> },
}

/// Initializer slot of a `for` statement head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForInit {
    Decl(Vec<Declarator>),
    Expr(Expr),
}

/// Left-hand side of a `for-in` statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ForInTarget {
    #[serde(rename = "VariableDeclaration")]
    Decl { declarations: Vec<Declarator> },
    #[serde(rename = "Identifier")]
    Ident { name: String },
    #[serde(rename = "MemberExpression")]
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        computed: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    /// `None` marks the `default` case.
    pub test: Option<Expr>,
    pub consequent: Vec<Stmt>,
}

/// A `catch (param) { body }` clause.
///
/// `guard` carries the non-standard `catch (e if cond)` form some front
/// ends emit; the normalizer rejects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub param: String,
    #[serde(default)]
    pub guard: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expr {
    #[serde(rename = "Literal")]
    Lit { value: Lit },
    #[serde(rename = "Identifier")]
    Ident { name: String },
    #[serde(rename = "ThisExpression")]
    This,
    #[serde(rename = "ArrayExpression")]
    Array {
        /// `None` elements are elisions (`[a, , b]`).
        elements: Vec<Option<Expr>>,
    },
    #[serde(rename = "ObjectExpression")]
    Object { properties: Vec<Property> },
    #[serde(rename = "FunctionExpression")]
    Function { function: Box<Function> },
    #[serde(rename = "MemberExpression")]
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        /// Bracket (`o[p]`) versus dotted (`o.p`) syntax.
        computed: bool,
        /// Set on normalizer-built members whose source access was computed.
        #[serde(default, rename = "isComputed")]
        was_computed: bool,
    },
    #[serde(rename = "AssignmentExpression")]
    Assign {
        operator: AssignOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    #[serde(rename = "CallExpression")]
    Call { callee: Box<Expr>, arguments: Vec<Expr> },
    #[serde(rename = "NewExpression")]
    New { callee: Box<Expr>, arguments: Vec<Expr> },
    #[serde(rename = "SequenceExpression")]
    Seq { expressions: Vec<Expr> },
    #[serde(rename = "LogicalExpression")]
    Logical {
        operator: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    #[serde(rename = "BinaryExpression")]
    Binary {
        operator: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    #[serde(rename = "ConditionalExpression")]
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    #[serde(rename = "UpdateExpression")]
    Update {
        operator: UpdateOp,
        prefix: bool,
        argument: Box<Expr>,
    },
    #[serde(rename = "UnaryExpression")]
    Unary { operator: UnaryOp, argument: Box<Expr> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lit {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub key: PropertyKey,
    pub value: Expr,
    pub kind: PropertyKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Init,
    Get,
    Set,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PropertyKey {
    #[serde(rename = "Identifier")]
    Ident { name: String },
    #[serde(rename = "Literal")]
    Lit { value: Lit },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "===")]
    StrictEq,
    #[serde(rename = "!==")]
    StrictNotEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    LtEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "<<")]
    Shl,
    #[serde(rename = ">>")]
    Shr,
    #[serde(rename = ">>>")]
    UShr,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Rem,
    #[serde(rename = "|")]
    BitOr,
    #[serde(rename = "^")]
    BitXor,
    #[serde(rename = "&")]
    BitAnd,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "instanceof")]
    InstanceOf,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::StrictEq => "===",
            Self::StrictNotEq => "!==",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::UShr => ">>>",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::BitAnd => "&",
            Self::In => "in",
            Self::InstanceOf => "instanceof",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "+=")]
    AddAssign,
    #[serde(rename = "-=")]
    SubAssign,
    #[serde(rename = "*=")]
    MulAssign,
    #[serde(rename = "/=")]
    DivAssign,
    #[serde(rename = "%=")]
    RemAssign,
    #[serde(rename = "<<=")]
    ShlAssign,
    #[serde(rename = ">>=")]
    ShrAssign,
    #[serde(rename = ">>>=")]
    UShrAssign,
    #[serde(rename = "|=")]
    BitOrAssign,
    #[serde(rename = "^=")]
    BitXorAssign,
    #[serde(rename = "&=")]
    BitAndAssign,
}

impl AssignOp {
    /// The binary operator a compound assignment applies, `None` for `=`.
    pub fn binary_op(self) -> Option<BinaryOp> {
        match self {
            Self::Assign => None,
            Self::AddAssign => Some(BinaryOp::Add),
            Self::SubAssign => Some(BinaryOp::Sub),
            Self::MulAssign => Some(BinaryOp::Mul),
            Self::DivAssign => Some(BinaryOp::Div),
            Self::RemAssign => Some(BinaryOp::Rem),
            Self::ShlAssign => Some(BinaryOp::Shl),
            Self::ShrAssign => Some(BinaryOp::Shr),
            Self::UShrAssign => Some(BinaryOp::UShr),
            Self::BitOrAssign => Some(BinaryOp::BitOr),
            Self::BitXorAssign => Some(BinaryOp::BitXor),
            Self::BitAndAssign => Some(BinaryOp::BitAnd),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::DivAssign => "/=",
            Self::RemAssign => "%=",
            Self::ShlAssign => "<<=",
            Self::ShrAssign => ">>=",
            Self::UShrAssign => ">>>=",
            Self::BitOrAssign => "|=",
            Self::BitXorAssign => "^=",
            Self::BitAndAssign => "&=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
}

impl LogicalOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    #[serde(rename = "-")]
    Neg,
    #[serde(rename = "+")]
    Pos,
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "~")]
    BitNot,
    #[serde(rename = "typeof")]
    TypeOf,
    #[serde(rename = "void")]
    Void,
    #[serde(rename = "delete")]
    Delete,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Pos => "+",
            Self::Not => "!",
            Self::BitNot => "~",
            Self::TypeOf => "typeof",
            Self::Void => "void",
            Self::Delete => "delete",
        }
    }

    /// Word-like operators need a space before their operand.
    pub fn is_word(self) -> bool {
        matches!(self, Self::TypeOf | Self::Void | Self::Delete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOp {
    #[serde(rename = "++")]
    Inc,
    #[serde(rename = "--")]
    Dec,
}

impl UpdateOp {
    /// The binary operator the update applies (`+` for `++`, `-` for `--`).
    pub fn binary_op(self) -> BinaryOp {
        match self {
            Self::Inc => BinaryOp::Add,
            Self::Dec => BinaryOp::Sub,
        }
    }

    /// The compound-assignment form of the update.
    pub fn compound_op(self) -> AssignOp {
        match self {
            Self::Inc => AssignOp::AddAssign,
            Self::Dec => AssignOp::SubAssign,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Inc => "++",
            Self::Dec => "--",
        }
    }
}

impl Expr {
    /// Whether the expression is already an atom in the normalized form.
    pub fn is_atom(&self) -> bool {
        matches!(self, Self::Lit { .. } | Self::Ident { .. })
    }
}
