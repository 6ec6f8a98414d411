// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fitrank Authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Side-effect dispatch for engagement events.
//!
//! Point awards and notification deliveries are independent, at-least-
//! attempted effects: neither blocks the business operation that produced
//! them, and a failure in one never rolls back the other. Effects flow
//! through a channel to a single worker thread that executes each one with
//! its own error handling; failures land in the log instead of failing the
//! caller.
//!
//! The channel is FIFO, so a like followed by an unlike applies its +1/−1
//! pair in order.

use crate::base::UserId;
use crate::engine::PointsEngine;
use crate::entry::PointSource;
use crate::notify::{NotificationDraft, NotificationStore};
use crossbeam::channel::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::warn;

/// A deferred side effect of an engagement event.
#[derive(Debug)]
pub enum Effect {
    /// Award (or reverse) points for a user.
    Points {
        user_id: UserId,
        delta: i64,
        source: PointSource,
    },
    /// Deliver a notification.
    Notify(NotificationDraft),
    /// Barrier: acknowledge once every previously queued effect has run.
    Flush(Sender<()>),
}

/// Channel-backed dispatcher executing effects on a worker thread.
pub struct EffectBus {
    tx: Option<Sender<Effect>>,
    worker: Option<JoinHandle<()>>,
}

impl EffectBus {
    /// Spawns the worker thread draining effects against the given engine
    /// and notification store.
    pub fn new(engine: Arc<PointsEngine>, notifications: Arc<NotificationStore>) -> Self {
        let (tx, rx) = channel::unbounded::<Effect>();

        let worker = thread::spawn(move || {
            for effect in rx {
                match effect {
                    Effect::Points {
                        user_id,
                        delta,
                        source,
                    } => {
                        if let Err(error) = engine.record_points(user_id, delta, source) {
                            warn!(
                                user = %user_id,
                                delta,
                                source = %source,
                                %error,
                                "point recording failed"
                            );
                        }
                    }
                    Effect::Notify(draft) => notifications.push(draft),
                    Effect::Flush(ack) => {
                        // A closed ack receiver only means the flusher gave up
                        // waiting.
                        let _ = ack.send(());
                    }
                }
            }
        });

        Self {
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    /// Queues an effect; never blocks the caller.
    pub fn dispatch(&self, effect: Effect) {
        let sent = self
            .tx
            .as_ref()
            .is_some_and(|tx| tx.send(effect).is_ok());
        if !sent {
            warn!("effect worker is gone; dropping effect");
        }
    }

    /// Blocks until every effect queued before this call has executed.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = channel::bounded(1);
        let sent = self
            .tx
            .as_ref()
            .is_some_and(|tx| tx.send(Effect::Flush(ack_tx)).is_ok());
        if sent {
            let _ = ack_rx.recv();
        }
    }
}

impl Drop for EffectBus {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop once the queue drains.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
