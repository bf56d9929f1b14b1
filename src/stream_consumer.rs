//! Long-lived event subscriptions.
//!
//! A [`StreamConsumer`] keeps one logical subscription alive for as long as the
//! process runs. Each physical subscription goes through
//! `Open -> Receiving -> Closed`; on `Closed`, whatever the reason, the consumer
//! waits a fixed delay and opens a new one for the same category and handler.
//! Frames sent while no subscription is open are lost.

use crate::frame::{EventCategory, Frame};
use crate::store::StoreTransport;
use futures::StreamExt;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Delay between a subscription closing and the next one opening
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(1000);

/// Receives the frames of a subscription, one at a time and in order
pub trait FrameHandler: Send + 'static {
    fn on_frame(&mut self, frame: Frame);
}

impl<F> FrameHandler for F
where
    F: FnMut(Frame) + Send + 'static,
{
    fn on_frame(&mut self, frame: Frame) {
        self(frame)
    }
}

/// How a subscription ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    EndOfStream,
    TransportError,
}

/// Lifecycle of one physical subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Open,
    Receiving { frames: u64 },
    Closed { reason: CloseReason, frames: u64 },
}

/// Inputs driving [`SubscriptionState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionEvent {
    FrameArrived(Frame),
    EndOfStream,
    TransportError,
}

impl SubscriptionState {
    /// Apply `event`. `Closed` is terminal: a closed subscription is replaced, never reopened.
    pub fn next(self, event: &SubscriptionEvent) -> SubscriptionState {
        let frames = self.frames();
        match (self, event) {
            (closed @ SubscriptionState::Closed { .. }, _) => closed,
            (_, SubscriptionEvent::FrameArrived(_)) => SubscriptionState::Receiving {
                frames: frames + 1,
            },
            (_, SubscriptionEvent::EndOfStream) => SubscriptionState::Closed {
                reason: CloseReason::EndOfStream,
                frames,
            },
            (_, SubscriptionEvent::TransportError) => SubscriptionState::Closed {
                reason: CloseReason::TransportError,
                frames,
            },
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, SubscriptionState::Closed { .. })
    }

    /// Frames received on this subscription
    pub fn frames(&self) -> u64 {
        match self {
            SubscriptionState::Open => 0,
            SubscriptionState::Receiving { frames } | SubscriptionState::Closed { frames, .. } => {
                *frames
            }
        }
    }
}

/// Keeps a subscription to one event category open, forever
pub struct StreamConsumer {
    transport: Arc<dyn StoreTransport>,
    reconnect_delay: Duration,
}

impl StreamConsumer {
    pub fn new(transport: Arc<dyn StoreTransport>) -> Self {
        Self {
            transport,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    pub fn with_reconnect_delay(mut self, reconnect_delay: Duration) -> Self {
        self.reconnect_delay = reconnect_delay;
        self
    }

    /// Spawn the consumer loop on the current runtime.
    ///
    /// The task never finishes on its own; drop or abort the handle at shutdown.
    pub fn start<H: FrameHandler>(self, category: EventCategory, handler: H) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(category, handler).await })
    }

    /// Subscribe, consume, wait, repeat. Never returns.
    pub async fn run<H: FrameHandler>(&self, category: EventCategory, mut handler: H) {
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            info!("📡 Subscribing to {} events (attempt {})", category, attempt);

            let state = self.consume(category, &mut handler).await;
            info!(
                "🔄 {} subscription closed after {} frames, reopening in {}ms",
                category,
                state.frames(),
                self.reconnect_delay.as_millis()
            );

            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    /// Drive a single subscription until it is closed and return its final state
    async fn consume<H: FrameHandler>(
        &self,
        category: EventCategory,
        handler: &mut H,
    ) -> SubscriptionState {
        let mut state = SubscriptionState::Open;

        let mut stream = match self.transport.subscribe(category).await {
            Ok(stream) => stream,
            Err(_) => return state.next(&SubscriptionEvent::TransportError),
        };

        while !state.is_closed() {
            let event = match stream.next().await {
                None => SubscriptionEvent::EndOfStream,
                Some(Err(_)) => SubscriptionEvent::TransportError,
                Some(Ok(event)) => match Frame::try_from(event) {
                    Ok(frame) if frame.category() == category => {
                        SubscriptionEvent::FrameArrived(frame)
                    }
                    Ok(frame) => {
                        debug!(
                            "Skipping {} frame on {} subscription",
                            frame.category(),
                            category
                        );
                        continue;
                    }
                    Err(e) => {
                        debug!("Skipping undecodable {} event: {}", category, e);
                        continue;
                    }
                },
            };

            state = state.next(&event);
            if let SubscriptionEvent::FrameArrived(frame) = event {
                debug!(
                    "📥 {} frame #{} ({} bytes)",
                    category,
                    state.frames(),
                    frame.payload_len()
                );
                handler.on_frame(frame);
            }
        }

        state
    }
}
