//! Definition/use resolution
//!
//! Walks the tree and links every variable use to its definition site (a
//! `var` node or a function parameter). Scoping follows two independent
//! disciplines at once: function scopes nest *within* stage scopes, and a
//! quotation opens a fresh stage whose bindings are invisible outside of it.
//! An escape temporarily re-enters the enclosing stage for its body.
//!
//! The scope state is threaded by value through the fold; handler exits
//! simply continue with the state they were given, which discards everything
//! an inner scope added.

use crate::ast::{EscapeKind, Expr, Param};
use crate::ir::DefUseTable;
use crate::util::NodeId;

use super::fold::{walk_child, Fold};
use super::{AnalysisError, Result};

use std::collections::HashMap;

/// Build the def/use table linking lookups to their `var` or parameter nodes
pub fn find_def_use(tree: &Expr) -> Result<DefUseTable> {
    let mut resolver = Resolver {
        table: DefUseTable::new(),
    };
    resolver.fold(tree, ScopeStack::default())?;
    Ok(resolver.table)
}

/// A stack of stacks of name maps: the outer level tracks open stages, the
/// inner level tracks function scopes within the current stage. The last
/// element is the innermost.
#[derive(Debug, Clone)]
struct ScopeStack<'ast> {
    stages: Vec<Vec<HashMap<&'ast str, NodeId>>>,
}

impl Default for ScopeStack<'_> {
    fn default() -> Self {
        Self {
            stages: vec![vec![HashMap::new()]],
        }
    }
}

impl<'ast> ScopeStack<'ast> {
    /// Bind a name in the innermost function scope of the current stage
    fn define(&mut self, name: &'ast str, def: NodeId) {
        let scope = self
            .stages
            .last_mut()
            .and_then(|scopes| scopes.last_mut())
            .expect("scope stack never runs dry");
        scope.insert(name, def);
    }

    /// Open a function scope in the current stage
    fn push_function(&mut self) {
        self.stages
            .last_mut()
            .expect("scope stack never runs dry")
            .push(HashMap::new());
    }

    /// Open a fresh, empty stage
    fn push_stage(&mut self) {
        self.stages.push(vec![HashMap::new()]);
    }

    /// Drop the current stage, re-entering the enclosing one.
    /// Fails when there is no enclosing stage.
    fn pop_stage(&mut self) -> Option<()> {
        if self.stages.len() > 1 {
            self.stages.pop();
            Some(())
        } else {
            None
        }
    }

    /// Find the nearest binding of `name` in the current stage, innermost
    /// function scope first. The flag is true iff the binding lives in the
    /// innermost scope.
    fn lookup(&self, name: &str) -> Option<(NodeId, bool)> {
        let scopes = self.stages.last()?;
        for (depth, scope) in scopes.iter().enumerate().rev() {
            if let Some(&def) = scope.get(name) {
                return Some((def, depth == scopes.len() - 1));
            }
        }
        None
    }
}

struct Resolver {
    table: DefUseTable,
}

impl<'ast> Fold<'ast> for Resolver {
    type Acc = ScopeStack<'ast>;

    /// A `var` first resolves its bound expression, then overlays the new
    /// binding for the rest of the enclosing sequence.
    fn fold_let(
        &mut self,
        expr: &'ast Expr,
        name: &'ast str,
        bind: &'ast Expr,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        let mut acc = walk_child(self, bind, acc)?;
        acc.define(name, expr.id);
        Ok(acc)
    }

    /// A `fun` scopes its parameters over the body only; the scope state
    /// from before the function continues afterwards.
    fn fold_fun(
        &mut self,
        _expr: &'ast Expr,
        params: &'ast [Param],
        body: &'ast Expr,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        let mut inner = acc.clone();
        inner.push_function();
        for param in params {
            inner.define(&param.name, param.id);
        }
        self.fold(body, inner)?;
        Ok(acc)
    }

    fn fold_lookup(
        &mut self,
        expr: &'ast Expr,
        name: &'ast str,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        let (def, bound) = acc.lookup(name).ok_or_else(|| AnalysisError::UnboundVariable {
            name: name.to_owned(),
            span: expr.span,
        })?;
        self.table.insert(expr.id, (def, bound));
        Ok(acc)
    }

    /// A quotation is resolved under a fresh stage; its bindings are
    /// invisible outside, so only the table survives.
    fn fold_quote(
        &mut self,
        _expr: &'ast Expr,
        _annotation: &'ast str,
        body: &'ast Expr,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        let mut inner = acc.clone();
        inner.push_stage();
        self.fold(body, inner)?;
        Ok(acc)
    }

    /// An escape body executes one stage up: resolve it against the
    /// enclosing stage's scopes, then restore the full stack.
    fn fold_escape(
        &mut self,
        expr: &'ast Expr,
        _kind: EscapeKind,
        body: &'ast Expr,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        let mut outer = acc.clone();
        outer
            .pop_stage()
            .ok_or(AnalysisError::EscapeOutsideQuote { span: expr.span })?;
        self.fold(body, outer)?;
        Ok(acc)
    }
}
