use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use super::messages::Notification;
use crate::game::ArenaState;

/// Receives notifications from the training loop
pub trait TelemetrySink {
    fn publish(&mut self, notification: &Notification);
}

/// Consumes a read-only arena snapshot every tick
pub trait RenderSink {
    fn render(&mut self, state: &ArenaState);
}

/// Writes notifications to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn publish(&mut self, notification: &Notification) {
        match notification {
            Notification::TrainingUpdate {
                episode,
                last_reward,
                avg_reward,
            } => debug!(episode, last_reward, avg_reward, "episode complete"),
            Notification::TrainingStopped { episode } => info!(episode, "training stopped"),
            Notification::Error { message } => warn!("{}", message),
            other => info!(?other, "notification"),
        }
    }
}

/// Forwards notifications over a channel, e.g. to a bridge task
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<Notification>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<Notification>) -> Self {
        Self { tx }
    }
}

impl TelemetrySink for ChannelSink {
    fn publish(&mut self, notification: &Notification) {
        if self.tx.send(notification.clone()).is_err() {
            debug!("telemetry receiver dropped; notification discarded");
        }
    }
}

impl TelemetrySink for Vec<Notification> {
    fn publish(&mut self, notification: &Notification) {
        self.push(notification.clone());
    }
}

/// Render sink for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRender;

impl RenderSink for NullRender {
    fn render(&mut self, _state: &ArenaState) {}
}

impl<F: FnMut(&ArenaState)> RenderSink for F {
    fn render(&mut self, state: &ArenaState) {
        self(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{ArenaConfig, ArenaEngine};
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<Notification> = Vec::new();
        sink.publish(&Notification::Pong);
        sink.publish(&Notification::TrainingStopped { episode: 3 });
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0], Notification::Pong);
    }

    #[test]
    fn test_channel_sink_forwards() {
        let (tx, mut rx) = unbounded_channel();
        let mut sink = ChannelSink::new(tx);
        sink.publish(&Notification::Pong);
        assert_eq!(rx.try_recv().unwrap(), Notification::Pong);
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (tx, rx) = unbounded_channel();
        drop(rx);
        let mut sink = ChannelSink::new(tx);
        sink.publish(&Notification::Pong);
    }

    #[test]
    fn test_closure_render_sink() {
        let state = ArenaEngine::with_seed(ArenaConfig::default(), 0).reset();
        let mut frames = 0;
        {
            let mut sink = |s: &ArenaState| {
                assert_eq!(s.learner.health, 100.0);
                frames += 1;
            };
            sink.render(&state);
            sink.render(&state);
        }
        assert_eq!(frames, 2);
    }
}
