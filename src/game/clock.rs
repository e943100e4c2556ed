use crate::core::Color;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Countdown for one side that ran out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout(pub Color);

/// Per-color countdown accounting.
///
/// Pure bookkeeping: every operation takes the instant it happens at, so the
/// scheduling of ticks is left to [`Ticker`]. `stop` and `tick` share the
/// running flag, so time debited by one is never debited again by the other.
#[derive(Debug, Clone)]
pub struct Clock {
    budget: f64,
    remaining: [f64; 2],
    running: Option<Color>,
    last_tick: Option<Instant>,
}

impl Clock {
    pub fn new(budget: Duration) -> Self {
        let budget = budget.as_secs_f64();
        Clock {
            budget,
            remaining: [budget; 2],
            running: None,
            last_tick: None,
        }
    }

    pub fn remaining(&self, color: Color) -> f64 {
        self.remaining[color.index()]
    }

    pub fn running(&self) -> Option<Color> {
        self.running
    }

    pub fn reset(&mut self) {
        self.remaining = [self.budget; 2];
        self.running = None;
        self.last_tick = None;
    }

    pub fn start(&mut self, color: Color) {
        self.start_at(color, Instant::now());
    }

    pub fn start_at(&mut self, color: Color, now: Instant) {
        self.running = Some(color);
        self.last_tick = Some(now);
    }

    pub fn stop(&mut self) -> f64 {
        self.stop_at(Instant::now())
    }

    /// Debits the running side and returns the elapsed seconds; 0 if nothing ran.
    pub fn stop_at(&mut self, now: Instant) -> f64 {
        let elapsed = self.debit(now);
        self.running = None;
        self.last_tick = None;
        elapsed
    }

    pub fn tick(&mut self) -> Option<Timeout> {
        self.tick_at(Instant::now())
    }

    /// Debits time since the last tick. Running out stops the clock and
    /// reports the side that flagged.
    pub fn tick_at(&mut self, now: Instant) -> Option<Timeout> {
        let color = self.running?;
        self.debit(now);
        self.last_tick = Some(now);
        if self.remaining(color) <= 0.0 {
            self.running = None;
            self.last_tick = None;
            return Some(Timeout(color));
        }
        None
    }

    fn debit(&mut self, now: Instant) -> f64 {
        let (color, last) = match (self.running, self.last_tick) {
            (Some(color), Some(last)) => (color, last),
            _ => return 0.0,
        };
        let elapsed = now.saturating_duration_since(last).as_secs_f64();
        let slot = &mut self.remaining[color.index()];
        *slot = (*slot - elapsed).max(0.0);
        elapsed
    }
}

/// Periodic tick source with an explicit cancel handle.
///
/// Posts `make_event()` into the owner's channel every `period`. Missed ticks
/// are delayed, not bursted, so ticks never overlap.
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    pub fn spawn<E, F>(period: Duration, tx: mpsc::Sender<E>, make_event: F) -> Self
    where
        E: Send + 'static,
        F: Fn() -> E + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(make_event()).await.is_err() {
                    break;
                }
            }
        });
        Ticker { handle }
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
