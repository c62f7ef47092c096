//! Mid-level intermediate representation
//!
//! The output of [crate::analysis::analyze]: flat records for every lifted
//! function and quotation, all keyed by node id. The IR borrows the tree it
//! was built from and never copies or rewrites subtrees; once it exists,
//! consumers read `fun` and `quote` nodes through these records instead of
//! re-interpreting the tree.

use std::collections::BTreeMap;

use crate::ast::Expr;
use crate::util::NodeId;

/// Def/use table: for every lookup node, the defining node and a flag that
/// is true iff the definition lives in the innermost function scope of the
/// lookup's own stage.
pub type DefUseTable = BTreeMap<NodeId, (NodeId, bool)>;

/// A lambda-lifted procedure
#[derive(Debug, Clone, PartialEq)]
pub struct Proc<'ast> {
    /// Id of the defining `fun` node; `None` for the implicit main proc
    pub id: Option<NodeId>,
    pub body: &'ast Expr,
    /// Parameter node ids, in declaration order
    pub params: Vec<NodeId>,
    /// Captured definition sites, in first-encounter order; disjoint from
    /// `params`, and each resolves outside this proc but in the same stage
    pub free: Vec<NodeId>,
    /// `var` nodes bound directly in this procedure
    pub bound: Vec<NodeId>,
    /// Id of the enclosing quotation; `None` outside any stage
    pub quote: Option<NodeId>,
}

/// A quote-lifted program fragment
///
/// Progs have no free-variable set: a quotation's only connection to its
/// enclosing stage is its escapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Prog<'ast> {
    /// Id of the defining `quote` node
    pub id: NodeId,
    pub body: &'ast Expr,
    /// Free-form marker for the target representation, e.g. `shader`
    pub annotation: &'ast str,
    /// `var` nodes bound directly in this quotation, not in nested ones
    pub bound: Vec<NodeId>,
    /// Escapes whose outer-stage result is re-embedded as a value
    pub persist: Vec<ProgEscape<'ast>>,
    /// Escapes whose outer-stage result is re-embedded as code
    pub splice: Vec<ProgEscape<'ast>>,
}

/// One escape site; the body is the outer-stage expression
#[derive(Debug, Clone, PartialEq)]
pub struct ProgEscape<'ast> {
    pub id: NodeId,
    pub body: &'ast Expr,
}

/// The assembled mid-level IR
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerIR<'ast> {
    pub defuse: DefUseTable,

    /// All lifted procedures except main, keyed by their `fun` node id
    pub procs: BTreeMap<NodeId, Proc<'ast>>,
    /// The implicit whole-program procedure
    pub main: Proc<'ast>,

    /// All lifted program fragments, keyed by their `quote` node id
    pub progs: BTreeMap<NodeId, Prog<'ast>>,

    /// Procedures not owned by any quotation
    pub toplevel_procs: Vec<NodeId>,
    /// For each Prog, the procedures lexically nested inside it
    pub quoted_procs: BTreeMap<NodeId, Vec<NodeId>>,
}

impl CompilerIR<'_> {
    /// The annotation of every fragment, for backends picking a target
    /// representation per quotation
    pub fn fragment_annotations(&self) -> Vec<(NodeId, &str)> {
        self.progs.values().map(|p| (p.id, p.annotation)).collect()
    }
}
