//! FLIP move scenarios

use std::time::Duration;

use anyhow::{ensure, Result};
use segue_animation::presets::{
    animate_enter, animate_move, css_move, EnterAnimation, MoveAnimation, ENTER_ANIMATION_ID,
};
use segue_animation::{AnimationOptions, ClassNames, Composite, EndEvent, Keyframes};
use segue_core::{Delta, StyleProp};
use segue_group::{Initial, TransitionOptions};

use crate::harness::{MockNode, TestHarness, ROW_HEIGHT};
use crate::runner::TestSuite;

pub fn suite() -> TestSuite {
    let mut suite = TestSuite::new("moves");

    // Swapped rows play back from their old slot; untouched rows stay still
    suite.add("animate_move_swap", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .move_(animate_move(
                    MoveAnimation::new().options(AnimationOptions::new().duration_ms(150)),
                ))
                .initial(Initial::Skip),
        );
        let [a, b, c] = TestHarness::nodes(["a", "b", "c"]);

        t.reconcile(&[&a, &b, &c]);
        t.flush();
        t.reconcile(&[&b, &a, &c]);
        t.flush();

        ensure!(translate_of(&a)? == translate(0.0, -ROW_HEIGHT));
        ensure!(translate_of(&b)? == translate(0.0, ROW_HEIGHT));
        ensure!(c.animations().is_empty(), "c did not move");

        let slide = a.animations().remove(0);
        ensure!(slide.keyframes().composite == Composite::Add);
        ensure!(slide.options().duration == Duration::from_millis(150));
        Ok(())
    });

    // Entering elements animate in while their siblings shift down
    suite.add("enter_pushes_siblings", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .enter(animate_enter(EnterAnimation::new()))
                .move_(animate_move(MoveAnimation::new()))
                .initial(Initial::Skip),
        );
        let [a, b, c] = TestHarness::nodes(["a", "b", "c"]);

        t.reconcile(&[&a, &b]);
        t.flush();
        t.reconcile(&[&c, &a, &b]);
        t.flush();

        ensure!(translate_of(&a)? == translate(0.0, -ROW_HEIGHT));
        ensure!(translate_of(&b)? == translate(0.0, -ROW_HEIGHT));

        let animations = c.animations();
        ensure!(animations.len() == 1, "c: {:?}", animations);
        ensure!(animations[0].id() == Some(ENTER_ANIMATION_ID));
        Ok(())
    });

    // Elements that are not rendered have no box to animate
    suite.add("disconnected_not_moved", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .move_(animate_move(MoveAnimation::new()))
                .initial(Initial::Skip),
        );
        let [a, b] = TestHarness::nodes(["a", "b"]);

        t.reconcile(&[&a, &b]);
        t.flush();
        b.set_connected(false);
        t.reconcile(&[&b, &a]);
        t.flush();

        ensure!(a.animations().len() == 1);
        ensure!(b.animations().is_empty());
        Ok(())
    });

    // Custom keyframes receive the inverted delta
    suite.add("custom_move_keyframes", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .move_(animate_move(MoveAnimation::new().keyframes(|delta: Delta| {
                    Keyframes::property("top", &[format!("{}px", delta.dy).as_str(), "0px"])
                })))
                .initial(Initial::Skip),
        );
        let [a, b] = TestHarness::nodes(["a", "b"]);

        t.reconcile(&[&a, &b]);
        t.flush();
        t.reconcile(&[&b, &a]);
        t.flush();

        let animations = b.animations();
        let frames = &animations[0].keyframes().frames;
        ensure!(frames[0].get("top") == Some("20px"), "frames: {:?}", frames);
        ensure!(frames[1].get("top") == Some("0px"));
        Ok(())
    });

    // Class moves: inline inversion first, then the move classes play it back
    suite.add("css_move_flip", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .move_(css_move(ClassNames::named("list")))
                .initial(Initial::Skip),
        );
        let [a, b] = TestHarness::nodes(["a", "b"]);

        t.reconcile(&[&a, &b]);
        t.flush();
        t.reconcile(&[&b, &a]);
        t.host.run_updates();
        t.host.run_commits();

        ensure!(a.style(StyleProp::Transform) == Some(translate(0.0, -ROW_HEIGHT)));
        ensure!(a.classes() == ["list-move-from"], "{:?}", a.classes());

        t.frame();
        ensure!(a.style(StyleProp::Transform).is_none());
        ensure!(a.classes() == ["list-move-active", "list-move-to"], "{:?}", a.classes());

        a.fire(EndEvent::TransitionEnd);
        ensure!(a.classes().is_empty(), "{:?}", a.classes());
        ensure!(a.listener_count() == 0);
        Ok(())
    });

    // Moving again mid-transition restarts the classes with a single listener
    suite.add("css_move_restarts", || {
        let t = TestHarness::new(
            TransitionOptions::new()
                .move_(css_move(ClassNames::named("list")))
                .initial(Initial::Skip),
        );
        let [a, b] = TestHarness::nodes(["a", "b"]);

        t.reconcile(&[&a, &b]);
        t.flush();
        t.reconcile(&[&b, &a]);
        t.host.run_updates();
        t.host.run_commits();
        t.frame();
        ensure!(a.listener_count() == 2, "listeners: {}", a.listener_count());

        t.reconcile(&[&a, &b]);
        t.host.run_updates();
        t.host.run_commits();
        ensure!(a.listener_count() == 0, "stale listeners: {}", a.listener_count());
        ensure!(a.classes() == ["list-move-from"], "{:?}", a.classes());
        ensure!(a.style(StyleProp::Transform) == Some(translate(0.0, ROW_HEIGHT)));

        t.frame();
        ensure!(a.classes() == ["list-move-active", "list-move-to"], "{:?}", a.classes());
        ensure!(a.listener_count() == 2, "listeners: {}", a.listener_count());

        a.fire(EndEvent::TransitionEnd);
        ensure!(a.classes().is_empty(), "{:?}", a.classes());
        ensure!(a.listener_count() == 0);
        Ok(())
    });

    suite
}

fn translate(dx: f32, dy: f32) -> String {
    format!("translate({}px, {}px)", dx, dy)
}

/// The starting transform of the node's latest animation
fn translate_of(node: &MockNode) -> Result<String> {
    let animation = node
        .last_animation()
        .ok_or_else(|| anyhow::anyhow!("{} did not animate", node.name()))?;
    animation
        .keyframes()
        .frames
        .first()
        .and_then(|frame| frame.get("transform"))
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("{} has no transform keyframe", node.name()))
}
