//! Diff and commit behavior observed through the in-memory target.
//!
//! Run with: cargo test --test reconcile

use pretty_assertions::assert_eq;

use spark_reconciler::{
    Child, MemoryTarget, Mutation, MutationKinds, Node, NodeHandle, Props, RenderSession, Unbounded,
    Value, WorkStatus, create_element,
};

// =============================================================================
// Helpers
// =============================================================================

fn el(tag: &str, props: Props, children: Vec<Child>) -> Node {
    create_element(tag, props, children)
}

fn sample() -> Node {
    el(
        "div",
        Props::new().with("id", "foo"),
        vec![
            el("p", Props::new(), vec!["bar".into()]).into(),
            el("b", Props::new(), vec![]).into(),
        ],
    )
}

fn session() -> (RenderSession<MemoryTarget>, NodeHandle) {
    let mut target = MemoryTarget::new();
    let root = target.create_container();
    (RenderSession::new(target), root)
}

/// Render and run to commit in one slice, returning the commit's mutations.
fn commit(session: &mut RenderSession<MemoryTarget>, node: Node, root: NodeHandle) -> Vec<Mutation> {
    session.target_mut().clear_log();
    session.render(node, root);
    match session.work_loop(&Unbounded).unwrap() {
        WorkStatus::Committed(_) => {}
        other => panic!("expected commit, got {other:?}"),
    }
    session.target_mut().take_log()
}

fn structural(log: &[Mutation]) -> Vec<&Mutation> {
    log.iter()
        .filter(|m| MutationKinds::STRUCTURAL.contains(m.kind()))
        .collect()
}

// =============================================================================
// Initial mount
// =============================================================================

#[test]
fn initial_render_builds_the_tree() {
    let (mut session, root) = session();
    commit(&mut session, sample(), root);

    assert_eq!(
        session.target().to_markup(root),
        "<div id=\"foo\"><p>bar</p><b></b></div>"
    );
    assert!(session.current_root().is_some());
    assert!(session.work_in_progress_root().is_none());
}

#[test]
fn initial_render_appends_parents_before_children() {
    let (mut session, root) = session();
    let log = commit(&mut session, sample(), root);

    let appends: Vec<(NodeHandle, NodeHandle)> = log
        .iter()
        .filter_map(|m| match m {
            Mutation::AppendChild { parent, child } => Some((*parent, *child)),
            _ => None,
        })
        .collect();

    let div = session.target().children_of(root)[0];
    let p = session.target().children_of(div)[0];
    let text = session.target().children_of(p)[0];
    let b = session.target().children_of(div)[1];
    assert_eq!(appends, vec![(root, div), (div, p), (p, text), (div, b)]);
}

// =============================================================================
// Updates
// =============================================================================

#[test]
fn rerendering_identical_tree_mutates_nothing() {
    let (mut session, root) = session();
    commit(&mut session, sample(), root);

    let log = commit(&mut session, sample(), root);
    assert_eq!(log, vec![]);
    assert_eq!(
        session.target().to_markup(root),
        "<div id=\"foo\"><p>bar</p><b></b></div>"
    );
}

#[test]
fn changing_one_leaf_property_sets_exactly_that_property() {
    let (mut session, root) = session();
    commit(&mut session, sample(), root);

    let changed = el(
        "div",
        Props::new().with("id", "foo"),
        vec![
            el("p", Props::new(), vec!["baz".into()]).into(),
            el("b", Props::new(), vec![]).into(),
        ],
    );
    let log = commit(&mut session, changed, root);

    let p = session.target().find_element(root, "p").unwrap();
    let text = session.target().children_of(p)[0];
    assert_eq!(
        log,
        vec![Mutation::SetProperty {
            handle: text,
            name: "nodeValue".into(),
            value: Value::from("baz"),
        }]
    );
}

#[test]
fn removed_property_is_cleared() {
    let (mut session, root) = session();
    commit(&mut session, el("a", Props::new().with("href", "/x").with("title", "t"), vec![]), root);

    let log = commit(&mut session, el("a", Props::new().with("href", "/x"), vec![]), root);
    let a = session.target().children_of(root)[0];
    assert_eq!(log, vec![Mutation::ClearProperty { handle: a, name: "title".into() }]);
    assert_eq!(session.target().to_markup(root), "<a href=\"/x\"></a>");
}

#[test]
fn changed_listener_is_swapped() {
    let (mut session, root) = session();
    commit(
        &mut session,
        el("button", Props::new().with("onClick", Value::listener(|_| {})), vec![]),
        root,
    );
    let log = commit(
        &mut session,
        el("button", Props::new().with("onClick", Value::listener(|_| {})), vec![]),
        root,
    );

    let button = session.target().children_of(root)[0];
    assert_eq!(
        log,
        vec![
            Mutation::RemoveListener { handle: button, event: "click".into() },
            Mutation::AddListener { handle: button, event: "click".into() },
        ]
    );
    assert_eq!(session.target().listener_count(button, "click"), 1);
}

// =============================================================================
// Structural changes
// =============================================================================

fn list(len: i32) -> Node {
    el(
        "ul",
        Props::new(),
        (0..len)
            .map(|i| el("li", Props::new(), vec![i.into()]).into())
            .collect(),
    )
}

#[test]
fn shrinking_a_list_removes_the_tail_first() {
    let (mut session, root) = session();
    commit(&mut session, list(5), root);
    let ul = session.target().children_of(root)[0];
    let old_items = session.target().children_of(ul).to_vec();

    session.target_mut().clear_log();
    session.render(list(2), root);
    let WorkStatus::Committed(report) = session.work_loop(&Unbounded).unwrap() else {
        panic!("expected commit");
    };
    let log = session.target_mut().take_log();

    assert_eq!(report.deletions, 3);
    assert_eq!(report.placements, 0);
    assert_eq!(
        structural(&log),
        vec![
            &Mutation::RemoveChild { parent: ul, child: old_items[2] },
            &Mutation::RemoveChild { parent: ul, child: old_items[3] },
            &Mutation::RemoveChild { parent: ul, child: old_items[4] },
        ]
    );
    // Removals come before any other commit operation.
    assert!(log[..3].iter().all(|m| m.kind() == MutationKinds::REMOVE));
    assert_eq!(session.target().to_markup(root), "<ul><li>0</li><li>1</li></ul>");
}

#[test]
fn growing_a_list_places_new_items() {
    let (mut session, root) = session();
    commit(&mut session, list(1), root);

    session.render(list(3), root);
    let WorkStatus::Committed(report) = session.work_loop(&Unbounded).unwrap() else {
        panic!("expected commit");
    };
    // Two <li> plus their text children.
    assert_eq!(report.placements, 4);
    assert_eq!(report.deletions, 0);
    assert!(report.is_structural());
    assert_eq!(
        session.target().to_markup(root),
        "<ul><li>0</li><li>1</li><li>2</li></ul>"
    );
}

#[test]
fn swapping_children_of_different_tags_replaces_both() {
    let (mut session, root) = session();
    let ab = el(
        "div",
        Props::new(),
        vec![el("a", Props::new(), vec![]).into(), el("b", Props::new(), vec![]).into()],
    );
    let ba = el(
        "div",
        Props::new(),
        vec![el("b", Props::new(), vec![]).into(), el("a", Props::new(), vec![]).into()],
    );
    commit(&mut session, ab, root);

    session.render(ba, root);
    let WorkStatus::Committed(report) = session.work_loop(&Unbounded).unwrap() else {
        panic!("expected commit");
    };

    // Positional diff: no move detection, each slot is a delete + place.
    assert_eq!(report.deletions, 2);
    assert_eq!(report.placements, 2);
    assert_eq!(report.updates, 1);
    assert_eq!(session.target().to_markup(root), "<div><b></b><a></a></div>");
}

#[test]
fn replacing_middle_child_appends_replacement() {
    let (mut session, root) = session();
    let before = el(
        "div",
        Props::new(),
        vec![
            el("a", Props::new(), vec![]).into(),
            el("b", Props::new(), vec![]).into(),
            el("c", Props::new(), vec![]).into(),
        ],
    );
    let after = el(
        "div",
        Props::new(),
        vec![
            el("a", Props::new(), vec![]).into(),
            el("x", Props::new(), vec![]).into(),
            el("c", Props::new(), vec![]).into(),
        ],
    );
    commit(&mut session, before, root);
    commit(&mut session, after, root);

    // Placement only knows how to append.
    assert_eq!(session.target().to_markup(root), "<div><a></a><c></c><x></x></div>");
}
