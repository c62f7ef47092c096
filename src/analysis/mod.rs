//! Semantic analysis
//!
//! This module turns a parsed tree into the mid-level IR ([crate::ir]). The
//! main interface is [analyze], which runs the pipeline: def/use resolution
//! first, then lambda lifting and quote lifting (two independent walks over
//! the same tree), and finally the grouping of procedures by the quotation
//! that contains them.
//!
//! Every failure here is a fatal consistency error: the input either came
//! from a broken desugaring stage or violates a structural invariant. The
//! pipeline aborts instead of producing a partial IR.

use miette::Diagnostic;
use thiserror::Error;

use tracing::debug;

use crate::ast::Expr;
use crate::ir::CompilerIR;
use crate::util::{NodeId, Span};

pub mod fold;

mod lambda;
mod quote;
mod resolve;

pub use lambda::lambda_lift;
pub use quote::quote_lift;
pub use resolve::find_def_use;

#[derive(Debug, Error, Diagnostic)]
pub enum AnalysisError {
    #[error("The variable {name} is not bound")]
    #[diagnostic(help(
        "Every name must be introduced by `var` or a function parameter before use"
    ))]
    UnboundVariable {
        name: String,

        #[label("this variable")]
        span: Span,
    },

    #[error("An escape has no enclosing quotation")]
    #[diagnostic(help("`[e]` and `%[e]` may only appear inside a quotation `<...>`"))]
    EscapeOutsideQuote {
        #[label("this escape")]
        span: Span,
    },

    #[error("The node id {id} is shared by more than one function")]
    DuplicateFun {
        id: NodeId,

        #[label("this function")]
        span: Span,
    },

    #[error("The node id {id} is shared by more than one quotation")]
    DuplicateQuote {
        id: NodeId,

        #[label("this quotation")]
        span: Span,
    },

    #[error("The variable {name} has no def/use entry")]
    MissingDefUse {
        name: String,

        #[label("this variable")]
        span: Span,
    },

    #[error("Procedure {proc_id} belongs to a quotation {quote_id} that was never lifted")]
    UnknownQuote { proc_id: NodeId, quote_id: NodeId },
}

pub(crate) type Result<T> = std::result::Result<T, AnalysisError>;

/// Run the full semantic analysis over a parsed tree and assemble the
/// mid-level IR. The tree is only read; all results refer back into it.
pub fn analyze(tree: &Expr) -> Result<CompilerIR<'_>> {
    let defuse = find_def_use(tree)?;

    // Lambda lifting and quote lifting read the same tree and neither
    // consults the other's output.
    let (procs, main) = lambda_lift(tree, &defuse)?;
    let progs = quote_lift(tree)?;

    // Group the procedures by their containing quotation. Every proc must
    // land exactly once: unquoted procs at the top level, the rest under
    // their quotation's id.
    let mut toplevel_procs = Vec::new();
    let mut quoted_procs: std::collections::BTreeMap<NodeId, Vec<NodeId>> =
        progs.keys().map(|&id| (id, Vec::new())).collect();

    for (&id, proc) in &procs {
        match proc.quote {
            None => toplevel_procs.push(id),
            Some(quote_id) => quoted_procs
                .get_mut(&quote_id)
                .ok_or(AnalysisError::UnknownQuote {
                    proc_id: id,
                    quote_id,
                })?
                .push(id),
        }
    }

    debug!(
        lookups = defuse.len(),
        procs = procs.len(),
        progs = progs.len(),
        "semantic analysis finished"
    );

    Ok(CompilerIR {
        defuse,
        procs,
        main,
        progs,
        toplevel_procs,
        quoted_procs,
    })
}
