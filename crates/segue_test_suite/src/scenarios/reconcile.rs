//! Reconciliation scenarios

use std::time::Duration;

use anyhow::{anyhow, ensure, Result};
use segue_animation::presets::{
    animate_enter, animate_exit, css_exit, persist_for, EnterAnimation, ExitAnimation,
    ExitBehavior, ENTER_ANIMATION_ID, EXIT_ANIMATION_ID,
};
use segue_animation::{Animate, ClassNames};
use segue_core::DetachMode;
use segue_group::{Child, Initial, TransitionOptions};

use crate::harness::{names, MockAnimation, MockNode, TestHarness};
use crate::runner::TestSuite;

pub fn suite() -> TestSuite {
    let mut suite = TestSuite::new("reconcile");

    // Removed elements stay visible for the timed exit, then disappear
    suite.add("persist_then_remove", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .exit(persist_for(Duration::from_millis(200)))
                .initial(Initial::Skip),
        );
        let [a, b, c] = TestHarness::nodes(["a", "b", "c"]);

        t.reconcile(&[&a, &b, &c]);
        t.flush();
        let summary = t.reconcile(&[&a, &c]);
        ensure!(names(&summary.exiting) == ["b"], "exiting: {:?}", summary.exiting);
        ensure!(t.visible_names() == ["a", "b", "c"]);

        t.flush();
        t.advance(Duration::from_millis(199));
        ensure!(t.visible_names() == ["a", "b", "c"], "removed early");

        t.advance(Duration::from_millis(1));
        ensure!(t.visible_names() == ["a", "c"], "visible: {:?}", t.visible_names());
        ensure!(t.group.pending_exits() == 0);
        Ok(())
    });

    // A pending exit is cancelled when the element comes back
    suite.add("reentry_during_exit", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .exit(persist_for(Duration::from_millis(300)))
                .initial(Initial::Skip),
        );
        let [a, b] = TestHarness::nodes(["a", "b"]);

        t.reconcile(&[&a, &b]);
        t.flush();
        t.reconcile(&[&a]);
        t.flush();
        ensure!(t.group.pending_exits() == 1);

        let summary = t.reconcile(&[&a, &b]);
        ensure!(names(&summary.cancelled) == ["b"], "cancelled: {:?}", summary.cancelled);
        ensure!(t.group.pending_exits() == 0);

        // The stale timer must not remove the re-entered element
        t.flush();
        t.advance(Duration::from_millis(300));
        ensure!(t.visible_names() == ["a", "b"], "visible: {:?}", t.visible_names());
        Ok(())
    });

    // Overlapping exits each keep their slot and complete on their own
    suite.add("interleaved_exits_keep_order", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .exit(persist_for(Duration::from_millis(200)))
                .initial(Initial::Skip),
        );
        let [a, b, c, d] = TestHarness::nodes(["a", "b", "c", "d"]);

        t.reconcile(&[&a, &b, &c, &d]);
        t.flush();

        t.reconcile(&[&a, &c, &d]);
        t.flush();
        t.advance(Duration::from_millis(100));

        t.reconcile(&[&a, &c]);
        t.flush();
        ensure!(
            t.visible_names() == ["a", "b", "c", "d"],
            "visible: {:?}",
            t.visible_names()
        );
        ensure!(t.group.pending_exits() == 2);

        t.advance(Duration::from_millis(100));
        ensure!(t.visible_names() == ["a", "c", "d"], "visible: {:?}", t.visible_names());

        t.advance(Duration::from_millis(100));
        ensure!(t.visible_names() == ["a", "c"], "visible: {:?}", t.visible_names());
        Ok(())
    });

    // Without an exit strategy removals are immediate
    suite.add("no_exit_strategy_removes_at_once", || {
        let t = TestHarness::new(TransitionOptions::new().initial(Initial::Skip));
        let [a, b] = TestHarness::nodes(["a", "b"]);

        t.reconcile(&[&a, &b]);
        t.reconcile(&[&b]);
        ensure!(t.visible_names() == ["b"]);
        ensure!(t.group.pending_exits() == 0);
        Ok(())
    });

    // Fragments flatten, text is skipped, repeated references count once
    suite.add("nested_children_flatten", || {
        let t = TestHarness::new(TransitionOptions::new());
        let [a, b] = TestHarness::nodes(["a", "b"]);

        let summary = t.group.reconcile(&[
            Child::element(a.clone()),
            Child::fragment(vec![
                Child::text("label"),
                Child::element(b.clone()),
                Child::element(a.clone()),
            ]),
            Child::Empty,
        ]);
        ensure!(summary.initial);
        ensure!(names(&summary.entering) == ["a", "b"], "entering: {:?}", summary.entering);
        ensure!(t.visible_names() == ["a", "b"]);
        Ok(())
    });

    // Empty renders do not consume the initial population
    suite.add("empty_render_stays_initial", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .enter(animate_enter(EnterAnimation::new()))
                .initial(Initial::Enter),
        );
        let [a] = TestHarness::nodes(["a"]);

        let summary = t.reconcile(&[]);
        ensure!(!summary.initial);
        ensure!(t.group.is_initial());

        let summary = t.reconcile(&[&a]);
        t.flush();
        ensure!(summary.initial);
        ensure!(!t.group.is_initial());
        ensure!(a.animations().len() == 1, "initial population should animate");
        Ok(())
    });

    // Auto defers to the enter strategy, which skips unless asked to animate
    suite.add("initial_auto_defers_to_strategy", || {
        let t = TestHarness::new(
            TransitionOptions::new().enter(animate_enter(EnterAnimation::new())),
        );
        let [a, b, c] = TestHarness::nodes(["a", "b", "c"]);

        t.reconcile(&[&a, &b]);
        t.flush();
        ensure!(a.animations().is_empty() && b.animations().is_empty());

        t.reconcile(&[&a, &b, &c]);
        t.flush();
        let enter = running_enter(&c)?;
        ensure!(enter.keyframes().frames[0].get("opacity") == Some("0"));
        ensure!(enter.keyframes().frames[1].get("opacity") == Some("1"));
        Ok(())
    });

    suite.add("initial_auto_with_animate_initial", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .enter(animate_enter(EnterAnimation::new().animate_initial(true))),
        );
        let [a] = TestHarness::nodes(["a"]);

        t.reconcile(&[&a]);
        t.flush();
        running_enter(&a)?;
        Ok(())
    });

    // Re-added before the update phase: the queued exit never touches it
    suite.add("readd_before_update_phase", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .exit(css_exit(ClassNames::named("fade")).detach(DetachMode::Absolute))
                .initial(Initial::Skip),
        );
        let [a, b] = TestHarness::nodes(["a", "b"]);

        t.reconcile(&[&a, &b]);
        t.flush();
        t.reconcile(&[&b]);
        let summary = t.reconcile(&[&a, &b]);
        ensure!(names(&summary.cancelled) == ["a"], "cancelled: {:?}", summary.cancelled);
        t.flush();

        ensure!(a.classes().is_empty(), "a classes: {:?}", a.classes());
        ensure!(!a.is_detached(), "a still pinned");
        ensure!(a.listener_count() == 0);
        ensure!(t.group.pending_exits() == 0);
        ensure!(t.visible_names() == ["a", "b"], "visible: {:?}", t.visible_names());
        Ok(())
    });

    // Removed before the update phase: only the exit plays
    suite.add("remove_before_update_phase", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .enter(animate_enter(EnterAnimation::new()))
                .exit(animate_exit(ExitAnimation::new(), ExitBehavior::new()))
                .initial(Initial::Skip),
        );
        let [a, b] = TestHarness::nodes(["a", "b"]);

        t.reconcile(&[&a]);
        t.flush();
        t.reconcile(&[&a, &b]);
        t.reconcile(&[&a]);
        t.flush();

        let played = b.animations();
        ensure!(played.len() == 1, "b played {} animation(s)", played.len());
        ensure!(played[0].id() == Some(EXIT_ANIMATION_ID));

        played[0].finish();
        ensure!(t.visible_names() == ["a"], "visible: {:?}", t.visible_names());
        Ok(())
    });

    suite
}

fn running_enter(node: &MockNode) -> Result<MockAnimation> {
    node.running_animation(ENTER_ANIMATION_ID)
        .ok_or_else(|| anyhow!("{} has no running enter animation", node.name()))
}
