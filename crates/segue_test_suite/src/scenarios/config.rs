//! Scenarios driven by preset files

use std::time::Duration;

use anyhow::{ensure, Context, Result};
use segue_animation::{AnimationError, Easing, EndEvent, PresetConfig};
use segue_group::TransitionOptions;

use crate::harness::{MockNode, TestHarness};
use crate::runner::TestSuite;

const LIST_PRESETS: &str = r#"
[enter]
kind = "css"
classes = { name = "fade" }
event = "transition"

[exit]
kind = "persist"
duration_ms = 150

[move]
kind = "animate"
options = { duration_ms = 200, easing = "ease-out" }
"#;

fn options_from_toml(source: &str) -> Result<TransitionOptions<MockNode>> {
    let config = PresetConfig::from_toml_str(source).context("parsing presets")?;
    config.validate()?;
    Ok(TransitionOptions::from_presets(&config))
}

pub fn suite() -> TestSuite {
    let mut suite = TestSuite::new("config");

    suite.add("toml_presets_drive_group", || {
        let t = TestHarness::new(options_from_toml(LIST_PRESETS)?);
        let [a, b, c] = TestHarness::nodes(["a", "b", "c"]);

        // Class enter presets settle the initial population on `to`
        t.reconcile(&[&a, &b]);
        t.flush();
        ensure!(a.classes() == ["fade-enter-to"], "{:?}", a.classes());

        t.reconcile(&[&c, &b]);
        t.flush();
        // `a` keeps its old slot while it persists
        ensure!(t.visible_names() == ["a", "c", "b"], "visible: {:?}", t.visible_names());
        ensure!(c.classes() == ["fade-enter-active", "fade-enter-to"], "{:?}", c.classes());
        c.fire(EndEvent::TransitionEnd);
        ensure!(c.classes() == ["fade-enter-to"]);

        // `b` slid down to make room
        let slide = b.last_animation().context("b did not move")?;
        ensure!(slide.options().duration == Duration::from_millis(200));
        ensure!(slide.options().easing == Easing::EaseOut);

        t.advance(Duration::from_millis(150));
        ensure!(t.visible_names() == ["c", "b"], "visible: {:?}", t.visible_names());
        Ok(())
    });

    suite.add("json_presets", || {
        let config = PresetConfig::from_json_str(
            r#"{
                "enter": { "kind": "animate", "animate_initial": true,
                           "options": { "duration_ms": 120, "id": "appear" } },
                "exit": { "kind": "animate", "detach": "fixed" }
            }"#,
        )?;
        let t = TestHarness::new(TransitionOptions::from_presets(&config));
        let [a, b] = TestHarness::nodes(["a", "b"]);

        t.reconcile(&[&a, &b]);
        t.flush();
        let appear = a.last_animation().context("a did not enter")?;
        ensure!(appear.id() == Some("appear"));
        ensure!(appear.options().duration == Duration::from_millis(120));

        t.reconcile(&[&a]);
        t.flush();
        ensure!(b.style(segue_core::StyleProp::Position).as_deref() == Some("fixed"));
        b.last_animation().context("b did not exit")?.finish();
        ensure!(t.visible_names() == ["a"]);
        Ok(())
    });

    suite.add("invalid_presets_rejected", || {
        let bad_easing = PresetConfig::from_toml_str(
            r#"
            [move]
            kind = "animate"
            options = { easing = "wobble" }
            "#,
        );
        ensure!(matches!(bad_easing, Err(AnimationError::Toml(_))));

        let bad_kind = PresetConfig::from_json_str(r#"{ "exit": { "kind": "vanish" } }"#);
        ensure!(matches!(bad_kind, Err(AnimationError::Json(_))));

        let descending = PresetConfig::from_json_str(
            r#"{ "exit": { "kind": "animate", "keyframes": { "frames": [
                { "opacity": "1", "offset": 0.9 },
                { "opacity": "0", "offset": 0.1 }
            ] } } }"#,
        )?;
        ensure!(descending.validate().is_err());
        Ok(())
    });

    suite
}
