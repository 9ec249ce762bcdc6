// src/session/mod.rs
//! Sensor session: providers, stream forwarding, and the controller loop.
//!
//! Two independent update streams (mesh anchors and hand anchors) are pumped
//! by their own tasks into one bounded channel. A single [`Controller`]
//! drains that channel, so every piece of mutable state has exactly one
//! writer and no locks are needed.

pub mod controller;
pub mod provider;
pub mod synthetic;

pub use controller::{Controller, ControllerStats};
pub use provider::{AnchorProvider, ChannelProvider, HandProvider, SensorProvider, UpdateStream};

use crate::anchor::{AnchorUpdate, HandAnchor};
use log::{debug, info};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;

/// Capacity of the merged sensor channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{provider} provider is unavailable: {reason}")]
    ProviderUnavailable {
        provider: &'static str,
        reason: String,
    },

    #[error("{0} provider was already started")]
    AlreadyStarted(&'static str),
}

/// One item on the merged channel.
#[derive(Debug, Clone)]
pub enum SensorEvent {
    Mesh(AnchorUpdate),
    Hand(HandAnchor),
}

/// A running sensor session.
pub struct Session {
    /// Merged updates from both providers, in per-stream arrival order.
    pub events: mpsc::Receiver<SensorEvent>,
    tasks: Vec<JoinHandle<()>>,
}

impl Session {
    /// Starts both providers and spawns one forwarding task per stream.
    ///
    /// Either provider failing to start aborts the whole session; nothing is
    /// spawned in that case.
    pub fn start<A, H>(anchors: &mut A, hands: &mut H) -> Result<Self, SessionError>
    where
        A: AnchorProvider,
        H: HandProvider,
    {
        let anchor_stream = anchors.start()?;
        let hand_stream = hands.start()?;
        info!("Sensor session started ({} + {})", anchors.name(), hands.name());

        let (tx, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let tasks = vec![
            forward(anchors.name(), anchor_stream, tx.clone(), SensorEvent::Mesh),
            forward(hands.name(), hand_stream, tx, SensorEvent::Hand),
        ];
        Ok(Self { events, tasks })
    }

    /// Stops the forwarding tasks. Events already queued can still be drained.
    pub fn shutdown(&self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn forward<T, F>(
    name: &'static str,
    mut stream: UpdateStream<T>,
    tx: mpsc::Sender<SensorEvent>,
    wrap: F,
) -> JoinHandle<()>
where
    T: Send + 'static,
    F: Fn(T) -> SensorEvent + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(item) = stream.next().await {
            if tx.send(wrap(item)).await.is_err() {
                debug!("{name} forwarder: consumer gone");
                return;
            }
        }
        debug!("{name} stream ended");
    })
}
