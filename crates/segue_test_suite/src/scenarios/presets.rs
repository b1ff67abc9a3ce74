//! Preset strategy scenarios

use anyhow::{anyhow, ensure, Result};
use segue_animation::presets::{
    animate_enter, animate_exit, animate_move, css_enter, css_exit, EnterAnimation,
    ExitAnimation, ExitBehavior, MoveAnimation, EXIT_ANIMATION_ID,
};
use segue_animation::{ClassNames, EndEvent, EndEventType};
use segue_core::{DetachMode, StyleProp};
use segue_group::{Initial, TransitionOptions};

use crate::harness::{MockAnimation, MockNode, PlayState, TestHarness, ROW_HEIGHT};
use crate::runner::TestSuite;

pub fn suite() -> TestSuite {
    let mut suite = TestSuite::new("presets");

    // Batch exits leave together once the last animation finished
    suite.add("animate_exit_batch", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .exit(animate_exit(ExitAnimation::new(), ExitBehavior::new()))
                .initial(Initial::Skip),
        );
        let [a, b, c] = TestHarness::nodes(["a", "b", "c"]);

        t.reconcile(&[&a, &b, &c]);
        t.flush();
        t.reconcile(&[&a]);
        t.flush();

        let fade_b = last_animation(&b)?;
        ensure!(fade_b.id() == Some(EXIT_ANIMATION_ID));
        ensure!(fade_b.keyframes().frames[0].get("opacity") == Some("1"));

        fade_b.finish();
        ensure!(t.visible_names() == ["a", "b", "c"], "batch completed early");

        last_animation(&c)?.finish();
        ensure!(t.visible_names() == ["a"], "visible: {:?}", t.visible_names());
        ensure!(t.group.pending_exits() == 0);
        Ok(())
    });

    // Separate exits leave one by one
    suite.add("animate_exit_separate", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .exit(animate_exit(
                    ExitAnimation::new(),
                    ExitBehavior::new().separate(true),
                ))
                .initial(Initial::Skip),
        );
        let [a, b, c] = TestHarness::nodes(["a", "b", "c"]);

        t.reconcile(&[&a, &b, &c]);
        t.flush();
        t.reconcile(&[&a]);
        t.flush();

        last_animation(&c)?.finish();
        ensure!(t.visible_names() == ["a", "b"], "visible: {:?}", t.visible_names());
        last_animation(&b)?.finish();
        ensure!(t.visible_names() == ["a"]);
        Ok(())
    });

    // Detached exits keep their box and survivors slide into the gap
    suite.add("detached_exit_then_move", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .exit(animate_exit(
                    ExitAnimation::new(),
                    ExitBehavior::new().detach(DetachMode::Absolute),
                ))
                .move_(animate_move(MoveAnimation::new()))
                .initial(Initial::Skip),
        );
        let [a, b, c] = TestHarness::nodes(["a", "b", "c"]);

        t.reconcile(&[&a, &b, &c]);
        t.flush();
        t.reconcile(&[&a, &c]);
        t.flush();

        ensure!(b.style(StyleProp::Position).as_deref() == Some("absolute"));
        ensure!(b.style(StyleProp::Top) == Some(format!("{}px", ROW_HEIGHT)));
        ensure!(c.animations().is_empty(), "c moved before b left");

        b.finish_animations();
        ensure!(t.visible_names() == ["a", "c"]);
        t.flush();

        let slide = last_animation(&c)?;
        let expected = format!("translate(0px, {}px)", ROW_HEIGHT);
        ensure!(
            slide.keyframes().frames[0].get("transform") == Some(expected.as_str()),
            "keyframes: {:?}",
            slide.keyframes()
        );
        ensure!(a.animations().is_empty(), "a did not move");
        Ok(())
    });

    // An interrupted enter plays backwards instead of starting a new animation
    suite.add("reverse_enter_on_quick_removal", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .enter(animate_enter(EnterAnimation::new()))
                .exit(animate_exit(
                    ExitAnimation::new(),
                    ExitBehavior::new().reverse_enter(true),
                ))
                .initial(Initial::Skip),
        );
        let [a, b] = TestHarness::nodes(["a", "b"]);

        t.reconcile(&[&a]);
        t.flush();
        t.reconcile(&[&a, &b]);
        t.flush();
        let enter = last_animation(&b)?;

        t.reconcile(&[&a]);
        t.flush();
        ensure!(b.animations().len() == 1, "a second animation was started");
        ensure!(enter.is_reversed());

        enter.finish();
        ensure!(t.visible_names() == ["a"]);
        Ok(())
    });

    // Re-entry cancels the exit animation and restores the layout box
    suite.add("reentry_cancels_exit_animation", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .exit(animate_exit(
                    ExitAnimation::new(),
                    ExitBehavior::new().detach(DetachMode::Absolute),
                ))
                .initial(Initial::Skip),
        );
        let [a, b] = TestHarness::nodes(["a", "b"]);

        t.reconcile(&[&a, &b]);
        t.flush();
        t.reconcile(&[&a]);
        t.flush();
        let fade = last_animation(&b)?;
        ensure!(b.is_detached());

        let summary = t.reconcile(&[&a, &b]);
        ensure!(summary.cancelled.len() == 1);
        ensure!(fade.play_state() == PlayState::Cancelled);
        ensure!(!b.is_detached(), "b still pinned");

        t.flush();
        fade.finish();
        ensure!(t.visible_names() == ["a", "b"], "visible: {:?}", t.visible_names());
        Ok(())
    });

    // from + active, two frames later active + to, active dropped on end
    suite.add("css_enter_lifecycle", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .enter(css_enter(ClassNames::named("fade")))
                .initial(Initial::Skip),
        );
        let [a, b] = TestHarness::nodes(["a", "b"]);

        t.reconcile(&[&a]);
        t.flush();
        t.reconcile(&[&a, &b]);
        t.host.run_updates();
        ensure!(b.classes() == ["fade-enter-from", "fade-enter-active"], "{:?}", b.classes());

        t.host.run_commits();
        t.frame();
        ensure!(b.classes() == ["fade-enter-from", "fade-enter-active"], "swapped too early");
        t.frame();
        ensure!(b.classes() == ["fade-enter-active", "fade-enter-to"], "{:?}", b.classes());
        ensure!(b.listener_count() == 2);

        ensure!(b.fire(EndEvent::TransitionEnd) == 1);
        ensure!(b.classes() == ["fade-enter-to"], "{:?}", b.classes());
        ensure!(b.listener_count() == 0);
        Ok(())
    });

    // The initial population only gets the settled classes
    suite.add("css_enter_initial", || {
        let t = TestHarness::new(TransitionOptions::new().enter(css_enter(
            ClassNames::new().with_to("shown visible"),
        )));
        let [a] = TestHarness::nodes(["a"]);

        t.reconcile(&[&a]);
        t.flush();
        ensure!(a.classes() == ["shown", "visible"], "{:?}", a.classes());
        Ok(())
    });

    // Class exits complete on the first matching end event
    suite.add("css_exit_on_end_event", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .exit(css_exit(ClassNames::named("fade")).event(EndEventType::Animation))
                .initial(Initial::Skip),
        );
        let [a, b] = TestHarness::nodes(["a", "b"]);

        t.reconcile(&[&a, &b]);
        t.flush();
        t.reconcile(&[&a]);
        t.flush();
        ensure!(b.classes() == ["fade-exit-active", "fade-exit-to"], "{:?}", b.classes());

        ensure!(b.fire(EndEvent::TransitionEnd) == 0, "wrong event handled");
        ensure!(t.visible_names() == ["a", "b"]);

        b.fire(EndEvent::AnimationEnd);
        ensure!(t.visible_names() == ["a"], "visible: {:?}", t.visible_names());
        ensure!(b.listener_count() == 0);
        Ok(())
    });

    // Nothing fires on an element that is not rendered
    suite.add("css_exit_disconnected", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .exit(css_exit(ClassNames::named("fade")))
                .initial(Initial::Skip),
        );
        let [a, b] = TestHarness::nodes(["a", "b"]);

        t.reconcile(&[&a, &b]);
        t.flush();
        b.set_connected(false);
        t.reconcile(&[&a]);
        t.flush();
        ensure!(t.visible_names() == ["a"], "visible: {:?}", t.visible_names());
        Ok(())
    });

    // Re-entering during a class exit strips every exit class
    suite.add("css_exit_cancel", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .exit(css_exit(ClassNames::named("fade")))
                .initial(Initial::Skip),
        );
        let [a, b] = TestHarness::nodes(["a", "b"]);

        t.reconcile(&[&a, &b]);
        t.flush();
        t.reconcile(&[&a]);
        t.flush();
        t.reconcile(&[&a, &b]);

        ensure!(b.classes().is_empty(), "{:?}", b.classes());
        ensure!(b.listener_count() == 0);
        ensure!(t.group.pending_exits() == 0);
        Ok(())
    });

    suite
}

fn last_animation(node: &MockNode) -> Result<MockAnimation> {
    node.last_animation()
        .ok_or_else(|| anyhow!("{} has no animation", node.name()))
}
