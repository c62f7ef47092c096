use quillc::{Expr, ExprKind, NodeId};

/// Visit every node of a tree, parents before children
pub fn walk<'ast>(tree: &'ast Expr, visit: &mut dyn FnMut(&'ast Expr)) {
    visit(tree);
    match &tree.kind {
        ExprKind::Literal(_) | ExprKind::Lookup { .. } | ExprKind::Persist { .. } => {}
        ExprKind::Seq { lhs, rhs } | ExprKind::Binary { lhs, rhs, .. } => {
            walk(lhs, visit);
            walk(rhs, visit);
        }
        ExprKind::Let { bind, .. } => walk(bind, visit),
        ExprKind::Unary { inner, .. } | ExprKind::Run { inner } => walk(inner, visit),
        ExprKind::Call { callee, args } => {
            walk(callee, visit);
            for arg in args {
                walk(arg, visit);
            }
        }
        ExprKind::Fun { body, .. } => walk(body, visit),
        ExprKind::Quote { body, .. } | ExprKind::Escape { body, .. } => walk(body, visit),
    }
}

/// Ids of all lookups of `name`, in source order
pub fn lookups_of(tree: &Expr, name: &str) -> Vec<NodeId> {
    let mut found = Vec::new();
    walk(tree, &mut |node| {
        if matches!(&node.kind, ExprKind::Lookup { name: n } if n == name) {
            found.push(node.id);
        }
    });
    found
}

/// Id of the unique `var` node binding `name`
pub fn let_of(tree: &Expr, name: &str) -> NodeId {
    let mut found = Vec::new();
    walk(tree, &mut |node| {
        if matches!(&node.kind, ExprKind::Let { name: n, .. } if n == name) {
            found.push(node.id);
        }
    });
    assert_eq!(found.len(), 1, "expected exactly one `var {name}`");
    found[0]
}

/// Id of the unique function parameter named `name`
pub fn param_of(tree: &Expr, name: &str) -> NodeId {
    let mut found = Vec::new();
    walk(tree, &mut |node| {
        if let ExprKind::Fun { params, .. } = &node.kind {
            for param in params {
                if param.name == name {
                    found.push(param.id);
                }
            }
        }
    });
    assert_eq!(found.len(), 1, "expected exactly one parameter `{name}`");
    found[0]
}

/// Ids of all `fun` nodes, in source order
pub fn funs_of(tree: &Expr) -> Vec<NodeId> {
    let mut found = Vec::new();
    walk(tree, &mut |node| {
        if matches!(node.kind, ExprKind::Fun { .. }) {
            found.push(node.id);
        }
    });
    found
}

/// Ids of all `quote` nodes, in source order
pub fn quotes_of(tree: &Expr) -> Vec<NodeId> {
    let mut found = Vec::new();
    walk(tree, &mut |node| {
        if matches!(node.kind, ExprKind::Quote { .. }) {
            found.push(node.id);
        }
    });
    found
}

/// Ids of all escape nodes, in source order
pub fn escapes_of(tree: &Expr) -> Vec<NodeId> {
    let mut found = Vec::new();
    walk(tree, &mut |node| {
        if matches!(node.kind, ExprKind::Escape { .. }) {
            found.push(node.id);
        }
    });
    found
}

/// All definition sites: `var` nodes and function parameters
pub fn def_sites(tree: &Expr) -> Vec<NodeId> {
    let mut found = Vec::new();
    walk(tree, &mut |node| match &node.kind {
        ExprKind::Let { .. } => found.push(node.id),
        ExprKind::Fun { params, .. } => found.extend(params.iter().map(|p| p.id)),
        _ => {}
    });
    found
}

/// All node ids within a subtree, including parameter ids
pub fn subtree_ids(tree: &Expr) -> Vec<NodeId> {
    let mut found = Vec::new();
    walk(tree, &mut |node| {
        found.push(node.id);
        if let ExprKind::Fun { params, .. } = &node.kind {
            found.extend(params.iter().map(|p| p.id));
        }
    });
    found
}
