// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyboard navigation over a cross of five buttons.
//!
//! Shows key mappings (arrows plus WASD), a `focuschanging` listener that
//! vetoes one target, and an override that wraps around the cross.
//!
//! Run:
//! - `cargo run -p understory_autofocus_demos --example cross_layout`
//! - `RUST_LOG=understory_autofocus=debug cargo run -p understory_autofocus_demos --example cross_layout`

use kurbo::Rect;
use understory_autofocus::scene::{ElementId, Scene, SceneNode};
use understory_autofocus::{
    AutoFocus, Direction, FocusHost, KeyCode, MoveOutcome, OverrideMap, Verdict,
};

fn label(scene: &Scene, id: Option<ElementId>) -> &str {
    id.and_then(|id| scene.node(id))
        .and_then(|n| n.id.as_deref())
        .unwrap_or("<none>")
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "understory_autofocus=info".into()),
        )
        .init();

    let mut scene = Scene::new();
    let names = ["up", "left", "center", "right", "down"];
    let origins = [(250.0, 50.0), (50.0, 250.0), (250.0, 250.0), (450.0, 250.0), (250.0, 450.0)];
    let mut ids = Vec::new();
    for (name, (x, y)) in names.into_iter().zip(origins) {
        let node = SceneNode::button(Rect::new(x, y, x + 150.0, y + 150.0)).with_id(name);
        ids.push(scene.insert(None, node));
    }

    // Leaving the cross downwards wraps back to the top.
    scene.set_overrides(
        ids[4],
        OverrideMap::parse("{ down: '#up' }").expect("static override map"),
    );
    scene.focus(ids[2]);

    let mut engine = AutoFocus::new();
    engine.enable_auto_focus();
    let m = engine.mappings_mut();
    m[Direction::Up].push(KeyCode::W);
    m[Direction::Left].push(KeyCode::A);
    m[Direction::Down].push(KeyCode::S);
    m[Direction::Right].push(KeyCode::D);

    let blocked = ids[3];
    engine.on_focus_changing(move |e| {
        if e.next_focus_element == blocked {
            Verdict::Cancel
        } else {
            Verdict::Proceed
        }
    });
    engine.on_focus_changed(|e| println!("  focuschanged ({}) key={:?}", e.direction, e.key_code));

    let keys = [
        KeyCode::ARROW_LEFT,
        KeyCode::D,
        KeyCode::ARROW_RIGHT,
        KeyCode::S,
        KeyCode::S,
        KeyCode::W,
        KeyCode(13),
    ];
    for key in keys {
        let before = scene.active_element();
        let outcome = engine.handle_key_down(&mut scene, key);
        let verdict = match outcome {
            None => "ignored".to_string(),
            Some(MoveOutcome::Moved(_)) => "moved".to_string(),
            Some(MoveOutcome::Canceled(e)) => format!("canceled (would go to {})", label(&scene, Some(e))),
            Some(other) => format!("{other:?}"),
        };
        println!(
            "key {key}: {} -> {} [{verdict}]",
            label(&scene, before),
            label(&scene, scene.active_element()),
        );
    }
}
