//! Abstract syntax tree
//!
//! The tree produced by [crate::parsing::parse]. Every node carries a unique
//! [NodeId]; the semantic analyses ([crate::analysis]) never rewrite the tree
//! but attach all of their results to these ids.

use crate::util::{NodeId, NodeIdGen, Span};

pub type Ident = String;

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    pub kind: ExprKind,
}

impl Expr {
    /// A freshly parsed node; its id is assigned later by [assign_ids]
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            id: NodeId::DUMMY,
            span,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),

    /// Two expressions in sequence; the value is the second one
    Seq {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// `var x = bind`; binds `x` for the rest of the enclosing sequence
    Let {
        name: Ident,
        bind: Box<Expr>,
    },

    /// A variable use
    Lookup {
        name: Ident,
    },

    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    Unary {
        op: UnaryOp,
        inner: Box<Expr>,
    },

    /// A call; the callee is an arbitrary expression
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    /// `fun (x, y) -> body`
    Fun {
        params: Vec<Param>,
        body: Box<Expr>,
    },

    /// `ann<body>`: a quoted program fragment, evaluated one stage later
    Quote {
        annotation: Ident,
        body: Box<Expr>,
    },

    /// `[body]` or `%[body]`: reaches back to the enclosing stage
    Escape {
        kind: EscapeKind,
        body: Box<Expr>,
    },

    /// `!inner`: evaluate a quoted fragment now
    Run {
        inner: Box<Expr>,
    },

    /// A value persisted by an earlier stage, referenced by slot.
    /// Has no surface syntax; produced by upstream desugaring.
    Persist {
        slot: usize,
    },
}

/// A function parameter; carries its own id so that lookups can
/// point at it as a definition site
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub id: NodeId,
    pub name: Ident,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Equals,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeKind {
    /// The outer-stage result is a value, re-embedded as data
    Persist,
    /// The outer-stage result is code, re-embedded as source
    Splice,
}

/// Number the tree in textual order: a node before its children,
/// left-to-right, function parameters before the body.
pub(crate) fn assign_ids(expr: &mut Expr, ids: &mut NodeIdGen) {
    expr.id = ids.fresh();
    match &mut expr.kind {
        ExprKind::Literal(_) | ExprKind::Lookup { .. } | ExprKind::Persist { .. } => {}
        ExprKind::Seq { lhs, rhs } => {
            assign_ids(lhs, ids);
            assign_ids(rhs, ids);
        }
        ExprKind::Let { bind, .. } => assign_ids(bind, ids),
        ExprKind::Binary { lhs, rhs, .. } => {
            assign_ids(lhs, ids);
            assign_ids(rhs, ids);
        }
        ExprKind::Unary { inner, .. } => assign_ids(inner, ids),
        ExprKind::Call { callee, args } => {
            assign_ids(callee, ids);
            for arg in args {
                assign_ids(arg, ids);
            }
        }
        ExprKind::Fun { params, body } => {
            for param in params {
                param.id = ids.fresh();
            }
            assign_ids(body, ids);
        }
        ExprKind::Quote { body, .. } => assign_ids(body, ids),
        ExprKind::Escape { body, .. } => assign_ids(body, ids),
        ExprKind::Run { inner } => assign_ids(inner, ids),
    }
}

use ptree::{print_tree, Style, TreeItem};
use std::borrow::Cow;
use std::{fmt, io};

impl Expr {
    pub fn pretty_print(&self) -> io::Result<()> {
        print_tree(self)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(x) => write!(f, "{x}"),
            Literal::Float(x) => write!(f, "{x}"),
            Literal::Bool(x) => write!(f, "{x}"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Equals => write!(f, "=="),
            BinaryOp::And => write!(f, "&&"),
            BinaryOp::Or => write!(f, "||"),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "not"),
        }
    }
}

impl TreeItem for Expr {
    type Child = Self;

    fn write_self<W: io::Write>(&self, f: &mut W, style: &Style) -> io::Result<()> {
        match &self.kind {
            ExprKind::Literal(lit) => write!(f, "{}", style.paint(lit)),
            ExprKind::Seq { .. } => write!(f, "{}", style.paint("SEQ")),
            ExprKind::Let { name, .. } => write!(f, "{}", style.paint(format!("VAR {name}"))),
            ExprKind::Lookup { name } => write!(f, "{}", style.paint(name)),
            ExprKind::Binary { op, .. } => write!(f, "{}", style.paint(op)),
            ExprKind::Unary { op, .. } => write!(f, "{}", style.paint(op)),
            ExprKind::Call { .. } => write!(f, "{}", style.paint("CALL")),
            ExprKind::Fun { params, .. } => {
                let mut fun_string = String::from("FUN (");
                for (i, param) in params.iter().enumerate() {
                    fun_string.push_str(&param.name);
                    if i != params.len() - 1 {
                        fun_string.push_str(", ");
                    }
                }
                fun_string.push(')');
                write!(f, "{}", style.paint(fun_string))
            }
            ExprKind::Quote { annotation, .. } => {
                if annotation.is_empty() {
                    write!(f, "{}", style.paint("QUOTE"))
                } else {
                    write!(f, "{}", style.paint(format!("QUOTE {annotation}")))
                }
            }
            ExprKind::Escape { kind, .. } => match kind {
                EscapeKind::Persist => write!(f, "{}", style.paint("PERSIST")),
                EscapeKind::Splice => write!(f, "{}", style.paint("SPLICE")),
            },
            ExprKind::Run { .. } => write!(f, "{}", style.paint("RUN")),
            ExprKind::Persist { slot } => write!(f, "{}", style.paint(format!("%{slot}"))),
        }
    }

    fn children(&self) -> Cow<[Self::Child]> {
        match &self.kind {
            ExprKind::Literal(_) | ExprKind::Lookup { .. } | ExprKind::Persist { .. } => {
                Cow::from(vec![])
            }
            ExprKind::Seq { lhs, rhs } | ExprKind::Binary { lhs, rhs, .. } => {
                Cow::from(vec![lhs.as_ref().clone(), rhs.as_ref().clone()])
            }
            ExprKind::Let { bind, .. } => Cow::from(vec![bind.as_ref().clone()]),
            ExprKind::Unary { inner, .. } | ExprKind::Run { inner } => {
                Cow::from(vec![inner.as_ref().clone()])
            }
            ExprKind::Call { callee, args } => {
                let mut children = vec![callee.as_ref().clone()];
                children.extend(args.iter().cloned());
                Cow::from(children)
            }
            ExprKind::Fun { body, .. } => Cow::from(vec![body.as_ref().clone()]),
            ExprKind::Quote { body, .. } | ExprKind::Escape { body, .. } => {
                Cow::from(vec![body.as_ref().clone()])
            }
        }
    }
}
