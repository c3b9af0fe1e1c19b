use crate::*;

#[test]
fn renderable_excludes_only_hidden() {
    assert!(VisibilityState::Visible.renderable());
    assert!(VisibilityState::AnimatingIn.renderable());
    assert!(VisibilityState::AnimatingOut.renderable());
    assert!(!VisibilityState::Hidden.renderable());
}

#[test]
fn set_bumps_the_epoch_and_invalidates_stale_settles() {
    let mut map = VisibilityMap::new();
    let epoch = map.set("a", VisibilityState::AnimatingOut);

    // the node is toggled again before the settle fires
    map.set("a", VisibilityState::AnimatingIn);
    assert!(!map.set_if_epoch("a", epoch, VisibilityState::Hidden));
    assert_eq!(map.state("a"), Some(VisibilityState::AnimatingIn));
}

#[test]
fn set_if_epoch_applies_when_current() {
    let mut map = VisibilityMap::new();
    let epoch = map.set("a", VisibilityState::AnimatingOut);
    assert!(map.set_if_epoch("a", epoch, VisibilityState::Hidden));
    assert_eq!(map.state("a"), Some(VisibilityState::Hidden));
    // settling does not invalidate the epoch itself
    assert_eq!(map.epoch("a"), Some(epoch));
}

#[test]
fn set_if_epoch_on_removed_entry_is_a_noop() {
    let mut map = VisibilityMap::new();
    let epoch = map.set("a", VisibilityState::AnimatingOut);
    map.remove("a");
    assert!(!map.set_if_epoch("a", epoch, VisibilityState::Hidden));
    assert_eq!(map.state("a"), None);
}

#[test]
fn scheduler_releases_steps_in_due_order() {
    let mut sched = Scheduler::new();
    sched.schedule_in(
        300.0,
        Step::SettleVisibility {
            id: "late".to_string(),
            epoch: 1,
            state: VisibilityState::Hidden,
        },
    );
    sched.schedule_in(
        16.0,
        Step::AnimateExpand {
            id: "early".to_string(),
            generation: 1,
        },
    );

    let first = sched.tick(16.0);
    assert_eq!(first.len(), 1);
    assert!(matches!(&first[0], Step::AnimateExpand { id, .. } if id == "early"));
    assert_eq!(sched.pending(), 1);

    assert!(sched.tick(200.0).is_empty());
    let second = sched.tick(100.0);
    assert_eq!(second.len(), 1);
    assert!(matches!(&second[0], Step::SettleVisibility { id, .. } if id == "late"));
    assert_eq!(sched.pending(), 0);
}

#[test]
fn scheduler_breaks_due_ties_by_insertion_order() {
    let mut sched = Scheduler::new();
    for n in 0..3 {
        sched.schedule_in(
            50.0,
            Step::AnimateExpand {
                id: format!("n{n}"),
                generation: n,
            },
        );
    }
    let steps = sched.tick(50.0);
    let ids: Vec<&str> = steps
        .iter()
        .map(|s| match s {
            Step::AnimateExpand { id, .. } => id.as_str(),
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(ids, vec!["n0", "n1", "n2"]);
}
