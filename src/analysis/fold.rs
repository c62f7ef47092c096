//! Generic bottom-up tree folds
//!
//! A [Fold] threads one accumulator value through a whole tree, children
//! before parents and left to right. The default trait methods make up the
//! base rule table: pure structural recursion that leaves the accumulator
//! untouched at the leaves. An analysis overrides the methods it cares about
//! and inherits the rest.
//!
//! Recursive calls inside a handler go through `self.fold(..)`, which
//! dispatches to the *overridden* rule set, not the base one: `self` is the
//! fixed point of the composed table. A handler that wants the base rule for
//! its own node kind calls the matching `walk_*` function instead.

use crate::ast::{EscapeKind, Expr, ExprKind, Literal, Param};

use super::AnalysisError;

type Result<T> = std::result::Result<T, AnalysisError>;

pub trait Fold<'ast>: Sized {
    type Acc;

    /// Dispatch on the node kind
    fn fold(&mut self, expr: &'ast Expr, acc: Self::Acc) -> Result<Self::Acc> {
        match &expr.kind {
            ExprKind::Literal(lit) => self.fold_literal(expr, lit, acc),
            ExprKind::Seq { lhs, rhs } => self.fold_seq(expr, lhs, rhs, acc),
            ExprKind::Let { name, bind } => self.fold_let(expr, name, bind, acc),
            ExprKind::Lookup { name } => self.fold_lookup(expr, name, acc),
            ExprKind::Binary { lhs, rhs, .. } => self.fold_binary(expr, lhs, rhs, acc),
            ExprKind::Unary { inner, .. } => self.fold_unary(expr, inner, acc),
            ExprKind::Call { callee, args } => self.fold_call(expr, callee, args, acc),
            ExprKind::Fun { params, body } => self.fold_fun(expr, params, body, acc),
            ExprKind::Quote { annotation, body } => self.fold_quote(expr, annotation, body, acc),
            ExprKind::Escape { kind, body } => self.fold_escape(expr, *kind, body, acc),
            ExprKind::Run { inner } => self.fold_run(expr, inner, acc),
            ExprKind::Persist { slot } => self.fold_persist(expr, *slot, acc),
        }
    }

    fn fold_literal(
        &mut self,
        _expr: &'ast Expr,
        _lit: &'ast Literal,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        Ok(acc)
    }

    fn fold_seq(
        &mut self,
        _expr: &'ast Expr,
        lhs: &'ast Expr,
        rhs: &'ast Expr,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        walk_pair(self, lhs, rhs, acc)
    }

    fn fold_let(
        &mut self,
        _expr: &'ast Expr,
        _name: &'ast str,
        bind: &'ast Expr,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        walk_child(self, bind, acc)
    }

    fn fold_lookup(
        &mut self,
        _expr: &'ast Expr,
        _name: &'ast str,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        Ok(acc)
    }

    fn fold_binary(
        &mut self,
        _expr: &'ast Expr,
        lhs: &'ast Expr,
        rhs: &'ast Expr,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        walk_pair(self, lhs, rhs, acc)
    }

    fn fold_unary(
        &mut self,
        _expr: &'ast Expr,
        inner: &'ast Expr,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        walk_child(self, inner, acc)
    }

    fn fold_call(
        &mut self,
        _expr: &'ast Expr,
        callee: &'ast Expr,
        args: &'ast [Expr],
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        walk_call(self, callee, args, acc)
    }

    fn fold_fun(
        &mut self,
        _expr: &'ast Expr,
        _params: &'ast [Param],
        body: &'ast Expr,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        walk_child(self, body, acc)
    }

    fn fold_quote(
        &mut self,
        _expr: &'ast Expr,
        _annotation: &'ast str,
        body: &'ast Expr,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        walk_child(self, body, acc)
    }

    fn fold_escape(
        &mut self,
        _expr: &'ast Expr,
        _kind: EscapeKind,
        body: &'ast Expr,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        walk_child(self, body, acc)
    }

    fn fold_run(
        &mut self,
        _expr: &'ast Expr,
        inner: &'ast Expr,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        walk_child(self, inner, acc)
    }

    fn fold_persist(
        &mut self,
        _expr: &'ast Expr,
        _slot: usize,
        acc: Self::Acc,
    ) -> Result<Self::Acc> {
        Ok(acc)
    }
}

/// Base rule for single-child nodes: recurse through the composed fold
pub fn walk_child<'ast, F: Fold<'ast>>(
    fold: &mut F,
    child: &'ast Expr,
    acc: F::Acc,
) -> Result<F::Acc> {
    fold.fold(child, acc)
}

/// Base rule for two-child nodes, left before right
pub fn walk_pair<'ast, F: Fold<'ast>>(
    fold: &mut F,
    lhs: &'ast Expr,
    rhs: &'ast Expr,
    acc: F::Acc,
) -> Result<F::Acc> {
    let acc = fold.fold(lhs, acc)?;
    fold.fold(rhs, acc)
}

/// Base rule for calls: all arguments left to right, then the callee
pub fn walk_call<'ast, F: Fold<'ast>>(
    fold: &mut F,
    callee: &'ast Expr,
    args: &'ast [Expr],
    acc: F::Acc,
) -> Result<F::Acc> {
    let mut acc = acc;
    for arg in args {
        acc = fold.fold(arg, acc)?;
    }
    fold.fold(callee, acc)
}
