// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus moving in and out of an embedded frame.
//!
//! Two engines, one per context, talk only through JSON strings, standing in
//! for a cross-context message channel. Messages from the parent are
//! delivered one step late to show that neither side depends on timing.
//!
//! Run:
//! - `RUST_LOG=understory_autofocus=debug cargo run -p understory_autofocus_demos --example frame_relay`

use std::collections::VecDeque;

use kurbo::Rect;
use understory_autofocus::scene::{ElementId, Scene, SceneNode};
use understory_autofocus::{
    AutoFocus, Delivery, Direction, FocusHost, FrameMessage, NavigateOptions, Peer,
};

struct Context {
    name: &'static str,
    scene: Scene,
    engine: AutoFocus<ElementId>,
}

impl Context {
    fn describe(&self) -> String {
        let active = self.scene.active_element();
        let id = active.and_then(|e| self.scene.node(e)).and_then(|n| n.id.clone());
        format!("{}: {}", self.name, id.unwrap_or_else(|| "<none>".into()))
    }
}

/// Wire: JSON text plus the sender as seen by the receiver.
type Wire = VecDeque<(Peer<ElementId>, String)>;

fn send(ctx: &mut Context, from: Peer<ElementId>, wire: &mut Wire) {
    for env in ctx.engine.drain_outbox() {
        let json = serde_json::to_string(&env.message).expect("frame messages serialize");
        println!("  {} -> {:?}: {json}", ctx.name, env.to);
        wire.push_back((from, json));
    }
}

fn receive(ctx: &mut Context, wire: &mut Wire) {
    while let Some((from, json)) = wire.pop_front() {
        let message: FrameMessage<ElementId> = match serde_json::from_str(&json) {
            Ok(m) => m,
            Err(err) => {
                tracing::warn!(%err, "undecodable frame message");
                continue;
            }
        };
        match ctx.engine.handle_frame_message(&mut ctx.scene, from, message) {
            Delivery::Discarded(reason) => println!("  {} dropped message: {reason}", ctx.name),
            Delivery::Focused(_) => println!("  {}", ctx.describe()),
            Delivery::Accepted => {}
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "understory_autofocus=info".into()),
        )
        .init();

    let mut parent = Context {
        name: "parent",
        scene: Scene::new(),
        engine: AutoFocus::new(),
    };
    let left = parent.scene.insert(
        None,
        SceneNode::button(Rect::new(50.0, 300.0, 200.0, 450.0)).with_id("left"),
    );
    let frame = parent.scene.insert(
        None,
        SceneNode::frame(Rect::new(250.0, 250.0, 700.0, 700.0)).with_id("frame"),
    );
    parent.scene.insert(
        None,
        SceneNode::button(Rect::new(750.0, 300.0, 900.0, 450.0)).with_id("right"),
    );

    let mut child = Context {
        name: "child",
        scene: Scene::new(),
        engine: AutoFocus::new(),
    };
    for (i, (x, y)) in [(50.0, 50.0), (250.0, 50.0), (50.0, 250.0), (250.0, 250.0)]
        .into_iter()
        .enumerate()
    {
        child.scene.insert(
            None,
            SceneNode::button(Rect::new(x, y, x + 150.0, y + 150.0)).with_id(format!("cell{i}")),
        );
    }

    let mut to_parent = Wire::new();
    let mut to_child = Wire::new();
    let opts = NavigateOptions::default();

    // The parent moves first: its Enter is held until the child reports ready.
    parent.scene.focus(left);
    println!("{}", parent.describe());
    parent.engine.move_focus(&mut parent.scene, Direction::Right, &opts);
    println!("{}", parent.describe());

    child.engine.attach_to_parent();
    for _ in 0..4 {
        send(&mut child, Peer::Child(frame), &mut to_parent);
        receive(&mut parent, &mut to_parent);
        receive(&mut child, &mut to_child);
        send(&mut parent, Peer::Parent, &mut to_child);
    }

    // Walk right inside the frame until the move leaves it.
    for _ in 0..2 {
        let outcome = child.engine.navigate(&mut child.scene, Direction::Right, &opts);
        println!("{} ({outcome:?})", child.describe());
    }
    for _ in 0..2 {
        send(&mut child, Peer::Child(frame), &mut to_parent);
        receive(&mut parent, &mut to_parent);
        send(&mut parent, Peer::Parent, &mut to_child);
        receive(&mut child, &mut to_child);
    }
    println!("{}", parent.describe());

    // And back in from the right edge.
    parent.engine.move_focus(&mut parent.scene, Direction::Left, &opts);
    for _ in 0..2 {
        send(&mut parent, Peer::Parent, &mut to_child);
        receive(&mut child, &mut to_child);
        send(&mut child, Peer::Child(frame), &mut to_parent);
        receive(&mut parent, &mut to_parent);
    }
    println!("{} / {}", parent.describe(), child.describe());
}
