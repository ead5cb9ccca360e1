// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cross-frame relay between nested browsing contexts.
//!
//! Each context runs its own [`AutoFocus`] engine. Engines never call each
//! other; they exchange [`FrameMessage`]s, and the host carries them over
//! whatever channel connects the contexts. The bridge is sans-IO: outbound
//! envelopes queue until [`AutoFocus::drain_outbox`] is called, and inbound
//! messages are fed to [`AutoFocus::handle_frame_message`].
//!
//! The protocol:
//!
//! - A child context calls [`AutoFocus::attach_to_parent`], which queues
//!   [`FrameMessage::Ready`]. The parent answers [`FrameMessage::ReadyAck`].
//!   Neither side sends requests to a peer it has not heard from.
//! - When a parent's move lands on a frame element, it sends
//!   [`FrameMessage::Enter`] with the reference rectangle in the child's
//!   coordinates. The child scores its elements against that rectangle,
//!   falls back to the element nearest the entry edge when none lies in its
//!   shadow, and answers [`FrameMessage::EnterResult`]. An `Enter` for a frame that has not
//!   announced itself is held, newest wins, until its `Ready` arrives.
//! - When a child's move finds nothing, it sends [`FrameMessage::Exit`] with
//!   the reference rectangle in its own coordinates. The parent resolves from
//!   that rectangle, skipping the frame element, and answers
//!   [`FrameMessage::ExitResult`]. A parent that is itself embedded relays
//!   further out when it finds nothing, and answers the child with `None`.
//!
//! Requests carry an opaque [`RelayToken`]. Responses that match no pending
//! request, or come from the wrong peer, are discarded. Unanswered requests
//! stay pending until evicted by newer ones or cleared.

use alloc::collections::VecDeque;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};
use kurbo::Rect;

use crate::direction::Direction;
use crate::engine::{AutoFocus, Request};
use crate::host::{ElementFlags, FocusHost};
use crate::resolver::NavigateOptions;

/// Correlates a relayed request with its response.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelayToken(pub u64);

/// The other end of a message.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Peer<E> {
    /// The context embedding this one.
    Parent,
    /// The context hosted by this frame element.
    Child(E),
}

/// Wire messages between a parent context and a child context.
///
/// `E` in `EnterResult`/`ExitResult` is the responder's own element handle;
/// the receiver treats it as opaque.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "camelCase"))]
pub enum FrameMessage<E> {
    /// Child to parent: the child engine is listening.
    Ready,
    /// Parent to child: the parent engine is listening.
    ReadyAck,
    /// Parent to child: focus entered the frame.
    Enter {
        /// Correlation token.
        token: RelayToken,
        /// Direction of travel.
        direction: Direction,
        /// Where the move came from, in child coordinates; `None` when the
        /// parent had no reference.
        reference_rect: Option<Rect>,
    },
    /// Child to parent: answer to `Enter`.
    EnterResult {
        /// Token of the answered `Enter`.
        token: RelayToken,
        /// Element the child focused, if any.
        resolved: Option<E>,
    },
    /// Child to parent: the move leaves the frame.
    Exit {
        /// Correlation token.
        token: RelayToken,
        /// Direction of travel.
        direction: Direction,
        /// Where the move came from, in child coordinates.
        reference_rect: Rect,
    },
    /// Parent to child: answer to `Exit`.
    ExitResult {
        /// Token of the answered `Exit`.
        token: RelayToken,
        /// Element the parent focused, if any.
        resolved: Option<E>,
    },
}

/// An outbound message and its destination.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Envelope<E> {
    /// Destination.
    pub to: Peer<E>,
    /// Payload.
    pub message: FrameMessage<E>,
}

/// Why an inbound message was dropped.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiscardReason {
    /// No pending request from this peer carries the token.
    #[error("no pending relay {0:?} for this peer")]
    Uncorrelated(RelayToken),
    /// A parent-only message arrived but this context was never attached.
    #[error("not attached to a parent")]
    NotEmbedded,
    /// The sending element is not a frame.
    #[error("sender is not a frame element")]
    NotAFrame,
    /// The message is not meaningful in this direction.
    #[error("unexpected message for this peer")]
    Unexpected,
}

/// Result of feeding one inbound message to the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Delivery<E> {
    /// The message was processed without moving local focus.
    Accepted,
    /// The message moved local focus to the element.
    Focused(E),
    /// The message was dropped.
    Discarded(DiscardReason),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Pending<E> {
    Enter { frame: E },
    Exit,
}

#[derive(Copy, Clone, Debug)]
struct HeldEnter {
    token: RelayToken,
    direction: Direction,
    reference_rect: Option<Rect>,
}

/// Relay bookkeeping owned by an engine.
#[derive(Debug)]
pub(crate) struct FrameBridge<E> {
    embedded: bool,
    parent_ready: bool,
    ready_frames: HashSet<E>,
    held: HashMap<E, HeldEnter>,
    pending: HashMap<RelayToken, Pending<E>>,
    order: VecDeque<RelayToken>,
    outbox: VecDeque<Envelope<E>>,
    next_token: u64,
    max_pending: usize,
}

impl<E: Copy + Eq + Hash + Debug> FrameBridge<E> {
    pub(crate) fn new(max_pending: usize) -> Self {
        Self {
            embedded: false,
            parent_ready: false,
            ready_frames: HashSet::new(),
            held: HashMap::new(),
            pending: HashMap::new(),
            order: VecDeque::new(),
            outbox: VecDeque::new(),
            next_token: 0,
            max_pending: max_pending.max(1),
        }
    }

    pub(crate) fn is_embedded(&self) -> bool {
        self.embedded
    }

    fn send(&mut self, to: Peer<E>, message: FrameMessage<E>) {
        self.outbox.push_back(Envelope { to, message });
    }

    fn register(&mut self, pending: Pending<E>) -> RelayToken {
        self.next_token += 1;
        let token = RelayToken(self.next_token);
        while self.pending.len() >= self.max_pending {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if self.pending.remove(&oldest).is_some() {
                tracing::debug!(token = ?oldest, "evicted unanswered relay");
            }
        }
        self.pending.insert(token, pending);
        self.order.push_back(token);
        token
    }

    fn take(&mut self, token: RelayToken, from: Peer<E>) -> Result<Pending<E>, DiscardReason> {
        let matches = match (self.pending.get(&token), from) {
            (Some(Pending::Enter { frame }), Peer::Child(sender)) => *frame == sender,
            (Some(Pending::Exit), Peer::Parent) => true,
            _ => false,
        };
        if !matches {
            return Err(DiscardReason::Uncorrelated(token));
        }
        self.order.retain(|t| *t != token);
        self.pending
            .remove(&token)
            .ok_or(DiscardReason::Uncorrelated(token))
    }

    pub(crate) fn request_exit(&mut self, direction: Direction, reference_rect: Rect) -> Option<RelayToken> {
        if !self.parent_ready {
            tracing::debug!(%direction, "parent not ready, exit not relayed");
            return None;
        }
        let token = self.register(Pending::Exit);
        tracing::debug!(?token, %direction, "relaying exit to parent");
        self.send(
            Peer::Parent,
            FrameMessage::Exit {
                token,
                direction,
                reference_rect,
            },
        );
        Some(token)
    }

    pub(crate) fn request_enter(
        &mut self,
        frame: E,
        direction: Direction,
        reference_rect: Option<Rect>,
    ) -> RelayToken {
        let token = self.register(Pending::Enter { frame });
        if self.ready_frames.contains(&frame) {
            tracing::debug!(?token, ?frame, %direction, "relaying enter to frame");
            self.send(
                Peer::Child(frame),
                FrameMessage::Enter {
                    token,
                    direction,
                    reference_rect,
                },
            );
        } else {
            tracing::debug!(?token, ?frame, "frame not ready, holding enter");
            let held = HeldEnter {
                token,
                direction,
                reference_rect,
            };
            if let Some(stale) = self.held.insert(frame, held) {
                self.pending.remove(&stale.token);
                self.order.retain(|t| *t != stale.token);
            }
        }
        token
    }

    fn frame_ready(&mut self, frame: E) {
        self.ready_frames.insert(frame);
        self.send(Peer::Child(frame), FrameMessage::ReadyAck);
        if let Some(held) = self.held.remove(&frame) {
            if !self.pending.contains_key(&held.token) {
                tracing::debug!(token = ?held.token, "held enter was evicted");
                return;
            }
            self.send(
                Peer::Child(frame),
                FrameMessage::Enter {
                    token: held.token,
                    direction: held.direction,
                    reference_rect: held.reference_rect,
                },
            );
        }
    }

    fn clear_pending(&mut self) {
        self.pending.clear();
        self.order.clear();
        self.held.clear();
    }
}

impl<E: Copy + Eq + Hash + Debug> AutoFocus<E> {
    /// Mark this engine as running inside a frame and announce it to the parent.
    pub fn attach_to_parent(&mut self) {
        self.bridge.embedded = true;
        self.bridge.send(Peer::Parent, FrameMessage::Ready);
    }

    /// Whether [`attach_to_parent`](Self::attach_to_parent) was called.
    pub fn is_embedded(&self) -> bool {
        self.bridge.embedded
    }

    /// Forget a child frame, for example after it navigated or was removed.
    ///
    /// Its next `Ready` is required before further `Enter` requests are sent.
    pub fn detach_frame(&mut self, frame: E) {
        let bridge = &mut self.bridge;
        bridge.ready_frames.remove(&frame);
        bridge.held.remove(&frame);
        bridge
            .pending
            .retain(|_, p| *p != Pending::Enter { frame });
        let pending = &bridge.pending;
        bridge.order.retain(|t| pending.contains_key(t));
    }

    /// Take every queued outbound envelope, oldest first.
    pub fn drain_outbox(&mut self) -> impl Iterator<Item = Envelope<E>> + '_ {
        self.bridge.outbox.drain(..)
    }

    /// Number of relays awaiting a response.
    pub fn pending_relays(&self) -> usize {
        self.bridge.pending.len()
    }

    /// Give up on every unanswered relay. Late responses are then discarded.
    pub fn clear_pending_relays(&mut self) {
        self.bridge.clear_pending();
    }

    /// Process one message received from `from`.
    pub fn handle_frame_message<H>(
        &mut self,
        host: &mut H,
        from: Peer<E>,
        message: FrameMessage<E>,
    ) -> Delivery<E>
    where
        H: FocusHost<Element = E>,
    {
        if from == Peer::Parent && !self.bridge.embedded {
            tracing::debug!(?message, "message from parent while not embedded");
            return Delivery::Discarded(DiscardReason::NotEmbedded);
        }
        if let Peer::Child(frame) = from
            && !host.flags(frame).contains(ElementFlags::FRAME)
        {
            tracing::debug!(?frame, "message from a non-frame element");
            return Delivery::Discarded(DiscardReason::NotAFrame);
        }

        match (from, message) {
            (Peer::Child(frame), FrameMessage::Ready) => {
                tracing::debug!(?frame, "frame ready");
                self.bridge.frame_ready(frame);
                Delivery::Accepted
            }
            (Peer::Parent, FrameMessage::ReadyAck) => {
                self.bridge.parent_ready = true;
                Delivery::Accepted
            }
            (
                Peer::Parent,
                FrameMessage::Enter {
                    token,
                    direction,
                    reference_rect,
                },
            ) => {
                // Implies readiness; the ack may still be in flight.
                self.bridge.parent_ready = true;
                let options = NavigateOptions {
                    reference_rect,
                    ..NavigateOptions::default()
                };
                let request = Request {
                    use_active: false,
                    exclude: None,
                    relay_on_miss: false,
                    edge_fallback: true,
                };
                let resolved = self
                    .navigate_with(host, direction, None, &options, request)
                    .moved();
                self.bridge
                    .send(Peer::Parent, FrameMessage::EnterResult { token, resolved });
                resolved.map_or(Delivery::Accepted, Delivery::Focused)
            }
            (
                Peer::Child(frame),
                FrameMessage::Exit {
                    token,
                    direction,
                    reference_rect,
                },
            ) => {
                self.bridge.ready_frames.insert(frame);
                let offset = host.bounding_rect(frame).origin().to_vec2();
                let options = NavigateOptions::from_rect(reference_rect + offset);
                let request = Request {
                    use_active: false,
                    exclude: Some(frame),
                    relay_on_miss: true,
                    edge_fallback: false,
                };
                let resolved = self
                    .navigate_with(host, direction, None, &options, request)
                    .moved();
                self.bridge
                    .send(Peer::Child(frame), FrameMessage::ExitResult { token, resolved });
                resolved.map_or(Delivery::Accepted, Delivery::Focused)
            }
            (Peer::Child(_), FrameMessage::EnterResult { token, resolved })
            | (Peer::Parent, FrameMessage::ExitResult { token, resolved }) => {
                match self.bridge.take(token, from) {
                    Ok(_) => {
                        tracing::debug!(?token, ?resolved, "relay answered");
                        Delivery::Accepted
                    }
                    Err(reason) => {
                        tracing::debug!(?token, ?from, "uncorrelated response discarded");
                        Delivery::Discarded(reason)
                    }
                }
            }
            (from, message) => {
                tracing::debug!(?from, ?message, "unexpected frame message");
                Delivery::Discarded(DiscardReason::Unexpected)
            }
        }
    }
}
