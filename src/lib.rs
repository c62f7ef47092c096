mod analysis;
mod ast;
mod ir;
mod parsing;
mod types;
mod util;

pub use analysis::{analyze, find_def_use, fold, lambda_lift, quote_lift, AnalysisError};
pub use ast::{BinaryOp, EscapeKind, Expr, ExprKind, Ident, Literal, Param, UnaryOp};
pub use ir::{CompilerIR, DefUseTable, Proc, Prog, ProgEscape};
pub use parsing::{parse, ParsingError};
pub use types::{builtin_types, CodeType, FunType, Primitive, Snippet, Type, TypeVar};
pub use util::{NodeId, Span};
