//! Lambda lifting
//!
//! Extracts every `fun` node into a flat [Proc] record with explicit
//! parameter, free-variable and bound-variable sets, tagged with the
//! quotation that contains it. The tree itself is left alone; the Proc
//! table supersedes the `fun` nodes it describes.
//!
//! The free list flows *into* a nested function's traversal and the caller's
//! accumulators are restored afterwards, so a nested Proc lists everything
//! captured from outside itself while nothing leaks back out. The bound
//! list starts fresh for every function.

use std::collections::BTreeMap;

use crate::ast::{EscapeKind, Expr, Param};
use crate::ir::{DefUseTable, Proc};
use crate::util::NodeId;

use super::fold::{walk_child, Fold};
use super::{AnalysisError, Result};

/// Extract a Proc for every `fun` node, plus the implicit main Proc
/// covering the whole program.
pub fn lambda_lift<'ast>(
    tree: &'ast Expr,
    defuse: &DefUseTable,
) -> Result<(BTreeMap<NodeId, Proc<'ast>>, Proc<'ast>)> {
    let mut lifter = LambdaLifter {
        defuse,
        quotes: Vec::new(),
        procs: BTreeMap::new(),
    };
    let acc = lifter.fold(tree, Accumulators::default())?;

    let main = Proc {
        id: None,
        body: tree,
        params: Vec::new(),
        free: Vec::new(),
        bound: acc.bound,
        quote: None,
    };
    Ok((lifter.procs, main))
}

/// The per-scope state threaded through the fold
#[derive(Debug, Default)]
struct Accumulators {
    /// Captured variables, in first-encounter order
    free: Vec<NodeId>,
    /// Variables bound by `var` directly in the current function
    bound: Vec<NodeId>,
}

struct LambdaLifter<'ast, 'tbl> {
    defuse: &'tbl DefUseTable,
    /// Ids of the currently open quotations, innermost last
    quotes: Vec<NodeId>,
    procs: BTreeMap<NodeId, Proc<'ast>>,
}

impl<'ast> Fold<'ast> for LambdaLifter<'ast, '_> {
    type Acc = Accumulators;

    /// Collect the function body's variable sets and record a Proc,
    /// then continue with the caller's accumulators.
    fn fold_fun(
        &mut self,
        expr: &'ast Expr,
        params: &'ast [Param],
        body: &'ast Expr,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        let inner = self.fold(
            body,
            Accumulators {
                free: acc.free.clone(),
                bound: Vec::new(),
            },
        )?;

        let proc = Proc {
            id: Some(expr.id),
            body,
            params: params.iter().map(|param| param.id).collect(),
            free: inner.free,
            bound: inner.bound,
            quote: self.quotes.last().copied(),
        };
        if self.procs.insert(expr.id, proc).is_some() {
            return Err(AnalysisError::DuplicateFun {
                id: expr.id,
                span: expr.span,
            });
        }

        Ok(acc)
    }

    /// A free use adds its definition site to the free set
    fn fold_lookup(
        &mut self,
        expr: &'ast Expr,
        name: &'ast str,
        mut acc: Self::Acc,
    ) -> Result<Self::Acc> {
        let &(def, bound) = self
            .defuse
            .get(&expr.id)
            .ok_or_else(|| AnalysisError::MissingDefUse {
                name: name.to_owned(),
                span: expr.span,
            })?;

        if !bound && !acc.free.contains(&def) {
            acc.free.push(def);
        }
        Ok(acc)
    }

    /// A `var` adds itself to the current function's bound set
    fn fold_let(
        &mut self,
        expr: &'ast Expr,
        _name: &'ast str,
        bind: &'ast Expr,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        let mut acc = walk_child(self, bind, acc)?;
        if !acc.bound.contains(&expr.id) {
            acc.bound.push(expr.id);
        }
        Ok(acc)
    }

    fn fold_quote(
        &mut self,
        expr: &'ast Expr,
        _annotation: &'ast str,
        body: &'ast Expr,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        self.quotes.push(expr.id);
        let acc = self.fold(body, acc)?;
        self.quotes.pop();
        Ok(acc)
    }

    /// The escape body belongs to the enclosing stage
    fn fold_escape(
        &mut self,
        expr: &'ast Expr,
        _kind: EscapeKind,
        body: &'ast Expr,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        let current = self
            .quotes
            .pop()
            .ok_or(AnalysisError::EscapeOutsideQuote { span: expr.span })?;
        let acc = self.fold(body, acc)?;
        self.quotes.push(current);
        Ok(acc)
    }
}
