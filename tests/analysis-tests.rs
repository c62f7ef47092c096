mod common;

use common::*;
use quillc::{analyze, parse, ExprKind};

#[test]
fn let_and_capture() {
    let tree = parse("var x = 1; var f = fun (y) -> x + y; f(2)").unwrap();
    let ir = analyze(&tree).unwrap();

    let x_let = let_of(&tree, "x");
    let f_let = let_of(&tree, "f");
    let y_param = param_of(&tree, "y");

    // `y` is bound by the parameter, `x` is captured from the enclosing
    // scope, `f` is bound at the top level.
    assert_eq!(ir.defuse[&lookups_of(&tree, "y")[0]], (y_param, true));
    assert_eq!(ir.defuse[&lookups_of(&tree, "x")[0]], (x_let, false));
    assert_eq!(ir.defuse[&lookups_of(&tree, "f")[0]], (f_let, true));

    let fun_id = funs_of(&tree)[0];
    let proc = &ir.procs[&fun_id];
    assert_eq!(proc.id, Some(fun_id));
    assert_eq!(proc.params, vec![y_param]);
    assert_eq!(proc.free, vec![x_let]);
    assert!(proc.bound.is_empty());
    assert_eq!(proc.quote, None);

    assert_eq!(ir.main.id, None);
    assert!(ir.main.params.is_empty());
    assert!(ir.main.free.is_empty());
    assert_eq!(ir.main.bound, vec![x_let, f_let]);

    assert_eq!(ir.toplevel_procs, vec![fun_id]);
    assert!(ir.quoted_procs.is_empty());
}

#[test]
fn quote_with_splice() {
    let tree = parse("var b = 2; shader<var a = 1; a + [b]>").unwrap();
    let ir = analyze(&tree).unwrap();

    let quote_id = quotes_of(&tree)[0];
    let prog = &ir.progs[&quote_id];

    assert_eq!(prog.annotation, "shader");
    assert_eq!(prog.bound, vec![let_of(&tree, "a")]);
    assert!(prog.persist.is_empty());
    assert_eq!(prog.splice.len(), 1);
    assert_eq!(prog.splice[0].id, escapes_of(&tree)[0]);
    assert!(
        matches!(&prog.splice[0].body.kind, ExprKind::Lookup { name } if name == "b"),
        "the escape body is the outer-stage expression"
    );

    // The splice body resolves against the outer stage.
    assert_eq!(
        ir.defuse[&lookups_of(&tree, "b")[0]],
        (let_of(&tree, "b"), true)
    );

    // Quotation-local bindings resolve inside the quotation.
    assert_eq!(
        ir.defuse[&lookups_of(&tree, "a")[0]],
        (let_of(&tree, "a"), true)
    );
}

#[test]
fn nested_quotes_own_their_escapes() {
    let tree = parse("<var c = 1; <%[c]>>").unwrap();
    let ir = analyze(&tree).unwrap();

    let quotes = quotes_of(&tree);
    assert_eq!(quotes.len(), 2);
    let outer = &ir.progs[&quotes[0]];
    let inner = &ir.progs[&quotes[1]];

    // The persist escape belongs to the inner fragment only.
    assert!(outer.persist.is_empty());
    assert!(outer.splice.is_empty());
    assert_eq!(inner.persist.len(), 1);
    assert_eq!(inner.persist[0].id, escapes_of(&tree)[0]);
    assert!(inner.splice.is_empty());

    assert_eq!(outer.bound, vec![let_of(&tree, "c")]);
    assert!(inner.bound.is_empty());
}

#[test]
fn escape_resolves_against_the_next_outer_stage() {
    // `d` is invisible to the inner quotation itself, but the escape body
    // runs one stage up where `d` is in scope.
    let tree = parse("<var d = 1; <[d]>>").unwrap();
    let ir = analyze(&tree).unwrap();

    assert_eq!(
        ir.defuse[&lookups_of(&tree, "d")[0]],
        (let_of(&tree, "d"), true)
    );
}

#[test]
fn escapes_partition_in_source_order() {
    let tree = parse("var p = 1; var s = 2; sh<[s] * %[p] + [p + s]>").unwrap();
    let ir = analyze(&tree).unwrap();

    let escapes = escapes_of(&tree);
    assert_eq!(escapes.len(), 3);

    let prog = &ir.progs[&quotes_of(&tree)[0]];
    let splice_ids: Vec<_> = prog.splice.iter().map(|e| e.id).collect();
    let persist_ids: Vec<_> = prog.persist.iter().map(|e| e.id).collect();
    assert_eq!(splice_ids, vec![escapes[0], escapes[2]]);
    assert_eq!(persist_ids, vec![escapes[1]]);
}

const TOUR: &str = "\
var x = 1;
var f = fun (a, b) -> a + b + x;
var g = fun (n) -> f(n, x);
var r = sh<var q = fun (w) -> w * %[g(2)]; q(3)>;
!r";

#[test]
fn resolution_is_total_over_definition_sites() {
    let tree = parse(TOUR).unwrap();
    let ir = analyze(&tree).unwrap();

    let defs = def_sites(&tree);
    let mut lookups = Vec::new();
    walk(&tree, &mut |node| {
        if matches!(node.kind, ExprKind::Lookup { .. }) {
            lookups.push(node.id);
        }
    });

    for lookup in lookups {
        let (def, _) = ir.defuse[&lookup];
        assert!(defs.contains(&def), "{lookup} must resolve to a def site");
    }
    assert_eq!(ir.defuse.len(), lookups_count(&tree));
}

fn lookups_count(tree: &quillc::Expr) -> usize {
    let mut count = 0;
    walk(tree, &mut |node| {
        if matches!(node.kind, ExprKind::Lookup { .. }) {
            count += 1;
        }
    });
    count
}

#[test]
fn procs_never_capture_their_own_subtree() {
    let tree = parse(TOUR).unwrap();
    let ir = analyze(&tree).unwrap();

    for proc in ir.procs.values().chain([&ir.main]) {
        let inside = subtree_ids(proc.body);
        for free in &proc.free {
            assert!(!inside.contains(free), "free variables resolve outside");
            assert!(!proc.params.contains(free), "free and params are disjoint");
        }
    }
}

#[test]
fn procs_group_under_their_quotation() {
    let tree = parse(TOUR).unwrap();
    let ir = analyze(&tree).unwrap();

    let funs = funs_of(&tree);
    let quote_id = quotes_of(&tree)[0];
    let (f_fun, g_fun, q_fun) = (funs[0], funs[1], funs[2]);

    assert_eq!(ir.toplevel_procs, vec![f_fun, g_fun]);
    assert_eq!(ir.quoted_procs[&quote_id], vec![q_fun]);
    assert_eq!(ir.procs[&q_fun].quote, Some(quote_id));

    // Nothing is dropped: every proc id appears exactly once in the groups.
    let mut grouped: Vec<_> = ir
        .toplevel_procs
        .iter()
        .chain(ir.quoted_procs.values().flatten())
        .copied()
        .collect();
    grouped.sort();
    let all: Vec<_> = ir.procs.keys().copied().collect();
    assert_eq!(grouped, all);

    // Cross-stage references are escapes, not captures.
    assert!(ir.procs[&q_fun].free.is_empty());

    // Captures inside one stage are ordinary free variables, arguments
    // before the callee.
    let x_let = let_of(&tree, "x");
    let f_let = let_of(&tree, "f");
    assert_eq!(ir.procs[&f_fun].free, vec![x_let]);
    assert_eq!(ir.procs[&g_fun].free, vec![x_let, f_let]);
}

#[test]
fn fragment_annotations_summarize_progs() {
    let tree = parse(TOUR).unwrap();
    let ir = analyze(&tree).unwrap();

    let annotations = ir.fragment_annotations();
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].1, "sh");
}

#[test]
fn unannotated_quote_has_empty_annotation() {
    let tree = parse("<1>").unwrap();
    let ir = analyze(&tree).unwrap();
    assert_eq!(ir.progs[&quotes_of(&tree)[0]].annotation, "");
}

#[test]
fn nested_functions_restore_the_enclosing_accumulators() {
    let tree = parse("var x = 1; var g = fun (a) -> (var h = fun (b) -> a + b + x; h(a)); g(1)")
        .unwrap();
    let ir = analyze(&tree).unwrap();

    let funs = funs_of(&tree);
    let (g_fun, h_fun) = (funs[0], funs[1]);

    // `h` captures `a` from `g` and `x` from the top level.
    assert_eq!(
        ir.procs[&h_fun].free,
        vec![param_of(&tree, "a"), let_of(&tree, "x")]
    );

    // `h`'s captures do not leak into `g`; `g` itself captures nothing.
    assert!(ir.procs[&g_fun].free.is_empty());
    assert_eq!(ir.procs[&g_fun].bound, vec![let_of(&tree, "h")]);

    assert_eq!(ir.main.bound, vec![let_of(&tree, "x"), let_of(&tree, "g")]);
}

#[test]
fn analysis_is_deterministic() {
    let tree = parse(TOUR).unwrap();
    let first = analyze(&tree).unwrap();
    let second = analyze(&tree).unwrap();
    assert_eq!(first, second);
}
