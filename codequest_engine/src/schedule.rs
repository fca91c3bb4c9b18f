//! Enemy proximity schedule
//!
//! The enemy moves on its own clock, independent of script execution. The
//! schedule is driven by elapsed time fed in from outside (`advance`), so the
//! session decides when time passes and tests can step it deterministically.

use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proximity {
    Far,
    Near,
}

impl Proximity {
    pub fn is_near(self) -> bool {
        self == Proximity::Near
    }
}

/// How the enemy picks its next position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum EnemyPattern {
    /// Repeat `phases` in order.
    Cycle { phases: Vec<Proximity> },
    /// Coin flip every period.
    Random,
}

impl Default for EnemyPattern {
    fn default() -> Self {
        EnemyPattern::Cycle {
            phases: vec![
                Proximity::Far,
                Proximity::Near,
                Proximity::Far,
                Proximity::Far,
                Proximity::Near,
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnemySchedule {
    pattern: EnemyPattern,
    period: Duration,
    elapsed: Duration,
    phase: usize,
    running: bool,
}

impl EnemySchedule {
    /// A running schedule positioned at its first phase. A zero period is bumped to one millisecond.
    pub fn new(pattern: EnemyPattern, period: Duration) -> Self {
        Self {
            pattern,
            period: period.max(Duration::from_millis(1)),
            elapsed: Duration::ZERO,
            phase: 0,
            running: true,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            info!("enemy schedule stopped at phase {}", self.phase);
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Stop, rewind to the first phase, and start again.
    pub fn restart(&mut self) {
        self.elapsed = Duration::ZERO;
        self.phase = 0;
        self.running = true;
        debug!("enemy schedule restarted");
    }

    /// Let `elapsed` pass. Returns the proximity chosen at each period boundary crossed.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<Proximity> {
        if !self.running {
            return Vec::new();
        }
        self.elapsed += elapsed;
        let mut ticks = Vec::new();
        while self.elapsed >= self.period {
            self.elapsed -= self.period;
            ticks.push(self.tick());
        }
        ticks
    }

    /// Move to the next phase immediately.
    pub fn tick(&mut self) -> Proximity {
        let proximity = match &self.pattern {
            EnemyPattern::Cycle { phases } if !phases.is_empty() => phases[self.phase % phases.len()],
            EnemyPattern::Cycle { .. } => Proximity::Far,
            EnemyPattern::Random => {
                if rand::random_bool(0.5) {
                    Proximity::Near
                } else {
                    Proximity::Far
                }
            },
        };
        self.phase = self.phase.wrapping_add(1);
        debug!("enemy schedule phase {} -> {proximity:?}", self.phase);
        proximity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> EnemySchedule {
        EnemySchedule::new(EnemyPattern::default(), Duration::from_millis(2000))
    }

    #[test]
    fn cycle_repeats_in_order() {
        let mut schedule = schedule();
        let seen: Vec<_> = (0..7).map(|_| schedule.tick()).collect();
        use Proximity::{Far, Near};
        assert_eq!(seen, vec![Far, Near, Far, Far, Near, Far, Near]);
    }

    #[test]
    fn advance_ticks_once_per_period() {
        let mut schedule = schedule();
        assert!(schedule.advance(Duration::from_millis(1999)).is_empty());
        assert_eq!(schedule.advance(Duration::from_millis(1)), vec![Proximity::Far]);
        assert_eq!(
            schedule.advance(Duration::from_millis(4500)),
            vec![Proximity::Near, Proximity::Far]
        );
    }

    #[test]
    fn stopped_schedule_ignores_time() {
        let mut schedule = schedule();
        schedule.stop();
        assert!(schedule.advance(Duration::from_secs(60)).is_empty());
        assert!(!schedule.is_running());
    }

    #[test]
    fn restart_rewinds_to_first_phase() {
        let mut schedule = schedule();
        schedule.tick();
        schedule.tick();
        schedule.stop();
        schedule.restart();
        assert!(schedule.is_running());
        assert_eq!(schedule.tick(), Proximity::Far);
        assert_eq!(schedule.tick(), Proximity::Near);
    }

    #[test]
    fn zero_period_does_not_spin() {
        let mut schedule = EnemySchedule::new(EnemyPattern::default(), Duration::ZERO);
        assert_eq!(schedule.period(), Duration::from_millis(1));
        assert_eq!(schedule.advance(Duration::from_millis(3)).len(), 3);
    }

    #[test]
    fn empty_cycle_stays_far() {
        let mut schedule = EnemySchedule::new(EnemyPattern::Cycle { phases: Vec::new() }, Duration::from_secs(1));
        assert_eq!(schedule.tick(), Proximity::Far);
    }

    #[test]
    fn pattern_reads_from_toml() {
        let pattern: EnemyPattern = toml::from_str(r#"mode = "cycle"
phases = ["near", "far"]"#)
        .expect("cycle");
        assert_eq!(
            pattern,
            EnemyPattern::Cycle {
                phases: vec![Proximity::Near, Proximity::Far]
            }
        );
        let random: EnemyPattern = toml::from_str(r#"mode = "random""#).expect("random");
        assert_eq!(random, EnemyPattern::Random);
    }
}
