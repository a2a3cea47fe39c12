//! Session internals: effect tags, deletion queue, arena lifetime.

use std::time::Duration;

use super::*;
use crate::error::ReconcileError;
use crate::fiber::{EffectTag, FiberId};
use crate::hooks::Hooks;
use crate::node::{Child, Component, Node, Props, create_element};
use crate::target::{MemoryTarget, NodeHandle};

fn list(len: i32) -> Node {
    create_element(
        "ul",
        Props::new(),
        (0..len).map(|i| Child::from(create_element("li", Props::new(), [Child::from(i)]))),
    )
}

fn mounted(node: Node) -> (RenderSession<MemoryTarget>, NodeHandle) {
    let mut target = MemoryTarget::new();
    let root = target.create_container();
    let mut session = RenderSession::new(target);
    session.render(node, root);
    session.flush().unwrap();
    session.target_mut().clear_log();
    (session, root)
}

/// Step one unit at a time until the diff has queued deletions.
fn step_until_deletions(session: &mut RenderSession<MemoryTarget>) -> Vec<FiberId> {
    let zero = FixedDeadline(Duration::ZERO);
    loop {
        match session.work_loop(&zero).unwrap() {
            WorkStatus::Yielded if !session.pending_deletions().is_empty() => {
                return session.pending_deletions().to_vec();
            }
            WorkStatus::Yielded => {}
            other => panic!("walk ended before any deletion: {other:?}"),
        }
    }
}

#[test]
fn test_shrinking_list_marks_old_fibers_for_deletion() {
    let (mut session, root) = mounted(list(5));

    session.render(list(2), root);
    let marked = step_until_deletions(&mut session);
    assert_eq!(marked.len(), 3);
    for id in &marked {
        assert_eq!(session.arena().get(*id).unwrap().effect, EffectTag::Deletion);
    }

    let WorkStatus::Committed(report) = session.work_loop(&Unbounded).unwrap() else {
        panic!("expected commit");
    };
    assert_eq!(report.deletions, 3);
    for id in &marked {
        assert!(session.arena().get(*id).is_none(), "deleted fiber outlived commit");
    }
}

#[test]
fn test_committed_tree_has_no_effect_tags_or_history() {
    let (mut session, root) = mounted(list(2));
    session.render(list(3), root);
    session.flush().unwrap();

    let current = session.current_root().unwrap();
    for id in session.arena().descendants(current) {
        let fiber = session.arena().get(id).unwrap();
        assert_eq!(fiber.effect, EffectTag::None);
        assert!(fiber.alternate.is_none());
    }
}

#[test]
fn test_arena_holds_one_generation() {
    // root + ul + 2 li + 2 text
    let (mut session, root) = mounted(list(2));
    assert_eq!(session.arena().len(), 6);

    for _ in 0..3 {
        session.render(list(2), root);
        session.flush().unwrap();
        assert_eq!(session.arena().len(), 6);
    }
}

#[test]
fn test_overwritten_render_is_released_and_unmarked() {
    let (mut session, root) = mounted(list(3));
    let before = session.arena().len();

    session.render(list(1), root);
    let marked = step_until_deletions(&mut session);

    // Last caller wins: the in-flight render is dropped.
    session.render(list(3), root);
    for id in &marked {
        assert_eq!(session.arena().get(*id).unwrap().effect, EffectTag::None);
    }
    assert!(session.pending_deletions().is_empty());

    let WorkStatus::Committed(report) = session.work_loop(&Unbounded).unwrap() else {
        panic!("expected commit");
    };
    assert_eq!(report.operations, 0);
    assert_eq!(report.deletions, 0);
    assert!(session.target().log().is_empty());
    assert_eq!(session.arena().len(), before);
}

#[test]
fn test_unit_of_work_order_is_depth_first() {
    let mut target = MemoryTarget::new();
    let root = target.create_container();
    let mut session = RenderSession::new(target);
    session.render(
        create_element(
            "div",
            Props::new(),
            [
                create_element("p", Props::new(), ["bar".into()]).into(),
                create_element("b", Props::new(), []).into(),
            ],
        ),
        root,
    );

    // Handles are created in visit order: div, p, "bar", b.
    let zero = FixedDeadline(Duration::ZERO);
    while let WorkStatus::Yielded = session.work_loop(&zero).unwrap() {}

    let created: Vec<_> = session
        .target()
        .log()
        .iter()
        .filter_map(|m| match m {
            crate::target::Mutation::Create { kind, .. } => Some(kind.clone()),
            _ => None,
        })
        .collect();
    use crate::target::MemoryKind;
    assert_eq!(
        created,
        vec![
            MemoryKind::Element("div".into()),
            MemoryKind::Element("p".into()),
            MemoryKind::Text,
            MemoryKind::Element("b".into()),
        ]
    );
}

fn flaky(props: &Props, hooks: &mut Hooks<'_>) -> Node {
    if props.contains("extra") {
        hooks.use_state(0i32);
    }
    let (value, _) = hooks.use_state(1i32);
    create_element("span", Props::new(), [Child::from(value)])
}

#[test]
fn test_hook_order_violation_keeps_committed_tree() {
    let (mut session, root) = mounted(create_element(Component::new(flaky), Props::new(), []));
    let fibers = session.arena().len();
    let current = session.current_root();

    session.render(
        create_element(Component::new(flaky), Props::new().with("extra", true), []),
        root,
    );
    let err = session.flush().unwrap_err();

    assert_eq!(
        err,
        ReconcileError::HookCountMismatch { component: "flaky", previous: 1, current: 2 }
    );
    assert_eq!(session.current_root(), current);
    assert!(session.work_in_progress_root().is_none());
    assert_eq!(session.arena().len(), fibers);
    assert_eq!(session.target().to_markup(root), "<span>1</span>");
}

fn wrapper(_: &Props, _: &mut Hooks<'_>) -> Node {
    create_element("div", Props::new().with("class", "wrapped"), [])
}

#[test]
fn test_deleting_component_removes_its_host_child() {
    let (mut session, root) = mounted(create_element(Component::new(wrapper), Props::new(), []));
    assert_eq!(session.target().to_markup(root), "<div class=\"wrapped\"></div>");
    let div = session.target().children_of(root)[0];

    session.render(create_element("p", Props::new(), []), root);
    session.flush().unwrap();

    assert_eq!(session.target().to_markup(root), "<p></p>");
    assert!(session.target().parent_of(div).is_none());
}

#[test]
fn test_commit_signal_counts_commits() {
    let (mut session, root) = mounted(list(1));
    let commits = session.commits();
    assert_eq!(commits.get(), 1);

    session.render(list(1), root);
    session.flush().unwrap();
    assert_eq!(commits.get(), 2);
}
