//! Quote lifting
//!
//! The quotation analogue of lambda lifting: every `quote` node becomes a
//! flat [Prog] record. Instead of free variables, a Prog carries its escape
//! lists: by construction a quotation's only connection to its enclosing
//! stage is through `persist` and `splice` escapes, never direct capture.
//!
//! This pass is independent of lambda lifting and consults no def/use
//! information; it can run against the same tree before or after it.

use std::collections::BTreeMap;

use crate::ast::{EscapeKind, Expr};
use crate::ir::{Prog, ProgEscape};
use crate::util::NodeId;

use super::fold::{walk_child, Fold};
use super::{AnalysisError, Result};

/// Extract a Prog for every quotation in the tree
pub fn quote_lift(tree: &Expr) -> Result<BTreeMap<NodeId, Prog<'_>>> {
    let mut lifter = QuoteLifter {
        progs: BTreeMap::new(),
    };
    lifter.fold(tree, Layers::default())?;
    Ok(lifter.progs)
}

/// One accumulator layer per open quotation, innermost last. The base layer
/// collects (and discards) whatever sits outside any quotation.
#[derive(Debug)]
struct Layers<'ast> {
    bound: Vec<Vec<NodeId>>,
    escapes: Vec<Vec<&'ast Expr>>,
}

impl Default for Layers<'_> {
    fn default() -> Self {
        Self {
            bound: vec![Vec::new()],
            escapes: vec![Vec::new()],
        }
    }
}

struct QuoteLifter<'ast> {
    progs: BTreeMap<NodeId, Prog<'ast>>,
}

impl<'ast> Fold<'ast> for QuoteLifter<'ast> {
    type Acc = Layers<'ast>;

    /// Collect the quotation body under fresh layers, then partition the
    /// recorded escapes into persists and splices, preserving source order.
    fn fold_quote(
        &mut self,
        expr: &'ast Expr,
        annotation: &'ast str,
        body: &'ast Expr,
        mut acc: Self::Acc,
    ) -> Result<Self::Acc> {
        acc.bound.push(Vec::new());
        acc.escapes.push(Vec::new());
        let mut acc = walk_child(self, body, acc)?;

        let escapes = acc.escapes.pop().expect("layer pushed above");
        let bound = acc.bound.pop().expect("layer pushed above");

        let mut persist = Vec::new();
        let mut splice = Vec::new();
        for escape in escapes {
            if let crate::ast::ExprKind::Escape { kind, body } = &escape.kind {
                let record = ProgEscape {
                    id: escape.id,
                    body: body.as_ref(),
                };
                match kind {
                    EscapeKind::Persist => persist.push(record),
                    EscapeKind::Splice => splice.push(record),
                }
            }
        }

        let prog = Prog {
            id: expr.id,
            body,
            annotation,
            bound,
            persist,
            splice,
        };
        if self.progs.insert(expr.id, prog).is_some() {
            return Err(AnalysisError::DuplicateQuote {
                id: expr.id,
                span: expr.span,
            });
        }

        Ok(acc)
    }

    /// A `var` is bound in the innermost enclosing quotation; nested
    /// quotations have their own layer, so their bindings never reach here.
    fn fold_let(
        &mut self,
        expr: &'ast Expr,
        _name: &'ast str,
        bind: &'ast Expr,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        let mut acc = walk_child(self, bind, acc)?;
        let top = acc.bound.last_mut().expect("base layer always present");
        if !top.contains(&expr.id) {
            top.push(expr.id);
        }
        Ok(acc)
    }

    /// The escape body is collected one stage up; the escape itself is
    /// recorded in the quotation it is lexically part of.
    fn fold_escape(
        &mut self,
        expr: &'ast Expr,
        _kind: EscapeKind,
        body: &'ast Expr,
        mut acc: Self::Acc,
    ) -> Result<Self::Acc> {
        if acc.bound.len() < 2 {
            return Err(AnalysisError::EscapeOutsideQuote { span: expr.span });
        }
        let bound_top = acc.bound.pop().expect("checked above");
        let escapes_top = acc.escapes.pop().expect("stacks move in lockstep");

        let mut acc = self.fold(body, acc)?;

        acc.bound.push(bound_top);
        let mut escapes_top = escapes_top;
        escapes_top.push(expr);
        acc.escapes.push(escapes_top);
        Ok(acc)
    }
}
