// src/session/provider.rs
use super::SessionError;
use crate::anchor::{AnchorUpdate, HandAnchor};
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;

/// Lazy, non-restartable sequence of sensor updates.
pub type UpdateStream<T> = Pin<Box<dyn Stream<Item = T> + Send + 'static>>;

/// A source of sensor updates (mesh anchors or hand anchors).
pub trait SensorProvider {
    type Update: Send + 'static;

    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Starts delivery. Fails if the provider cannot run or was already started.
    fn start(&mut self) -> Result<UpdateStream<Self::Update>, SessionError>;
}

/// Source of mesh anchor updates.
pub trait AnchorProvider: SensorProvider<Update = AnchorUpdate> {}
impl<P: SensorProvider<Update = AnchorUpdate>> AnchorProvider for P {}

/// Source of hand anchor updates.
pub trait HandProvider: SensorProvider<Update = HandAnchor> {}
impl<P: SensorProvider<Update = HandAnchor>> HandProvider for P {}

/// Provider fed through an mpsc channel, for embedding hosts and tests.
pub struct ChannelProvider<T> {
    name: &'static str,
    rx: Option<mpsc::Receiver<T>>,
}

impl<T: Send + 'static> ChannelProvider<T> {
    /// Returns the sending half together with the provider.
    pub fn new(name: &'static str, capacity: usize) -> (mpsc::Sender<T>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { name, rx: Some(rx) })
    }
}

impl<T: Send + 'static> SensorProvider for ChannelProvider<T> {
    type Update = T;

    fn name(&self) -> &'static str {
        self.name
    }

    fn start(&mut self) -> Result<UpdateStream<T>, SessionError> {
        let rx = self.rx.take().ok_or(SessionError::AlreadyStarted(self.name))?;
        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}
