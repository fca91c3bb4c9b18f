//! Notifications published while a level is played.
//!
//! The engine never waits on subscribers; events exist for animation and
//! status display only and carry nothing the engine reads back.

use std::fmt;
use std::sync::mpsc::Sender;
use std::time::Duration;

use codequest_data::Action;
use log::debug;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LevelEvent {
    RunStarted,
    Moved { action: Action, from: f64, to: f64 },
    Jumped { x: f64, y: f64 },
    Shot { x: f64, y: f64, target: Option<usize> },
    SpeedChanged { speed: i64 },
    VariableSet { name: String, value: i64 },
    /// Emitted between loop iterations; the driver should wait `delay` before resuming.
    Pacing { iteration: i64, delay: Duration },
    EnemyMoved { near: bool },
    ObstacleHit { index: usize },
    Completed,
    Reset,
    RunFinished { completed: bool },
}

impl fmt::Display for LevelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelEvent::RunStarted => write!(f, "run started"),
            LevelEvent::Moved { action, from, to } => write!(f, "{action}: {from} -> {to}"),
            LevelEvent::Jumped { x, y } => write!(f, "jump at ({x}, {y})"),
            LevelEvent::Shot { target: Some(idx), .. } => write!(f, "shot hits target {}", idx + 1),
            LevelEvent::Shot { target: None, .. } => write!(f, "shot flies wide"),
            LevelEvent::SpeedChanged { speed } => write!(f, "speed is now {speed}"),
            LevelEvent::VariableSet { name, value } => write!(f, "{name} = {value}"),
            LevelEvent::Pacing { iteration, delay } => {
                write!(f, "iteration {iteration} done, pausing {}ms", delay.as_millis())
            },
            LevelEvent::EnemyMoved { near: true } => write!(f, "the enemy moves closer"),
            LevelEvent::EnemyMoved { near: false } => write!(f, "the enemy backs away"),
            LevelEvent::ObstacleHit { index } => write!(f, "ran into obstacle {}", index + 1),
            LevelEvent::Completed => write!(f, "level completed"),
            LevelEvent::Reset => write!(f, "level reset"),
            LevelEvent::RunFinished { completed } => write!(f, "run finished (completed: {completed})"),
        }
    }
}

/// Receiver of level notifications.
pub trait EventSink {
    fn notify(&mut self, event: &LevelEvent);
}

impl EventSink for Sender<LevelEvent> {
    fn notify(&mut self, event: &LevelEvent) {
        if self.send(event.clone()).is_err() {
            debug!("event receiver dropped; discarding {event:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn sender_forwards_events() {
        let (mut tx, rx) = mpsc::channel();
        tx.notify(&LevelEvent::Completed);
        assert_eq!(rx.try_recv().expect("event"), LevelEvent::Completed);
    }

    #[test]
    fn dropped_receiver_is_not_an_error() {
        let (mut tx, rx) = mpsc::channel::<LevelEvent>();
        drop(rx);
        tx.notify(&LevelEvent::Reset);
    }

    #[test]
    fn shot_description_is_one_based() {
        let event = LevelEvent::Shot {
            x: 0.0,
            y: 0.0,
            target: Some(0),
        };
        assert_eq!(event.to_string(), "shot hits target 1");
    }
}
