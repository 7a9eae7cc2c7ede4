//! Thread timers.
//!
//! The loop turns every expiry into a
//! [`Message::timer`](crate::message::Message::timer) in its queue. Menu mode
//! runs one repeating timer for as long as a menu is open so that a foreign
//! message pump never sits idle with the interception filter installed.
//!
//! Deadlines live in a min-heap. Stopping a timer only removes it from the
//! arena; its heap entries go stale and are skipped when they surface.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};

use crate::error::TimerError;
use crate::logging::targets;

new_key_type! {
    /// Identifies a running timer.
    pub struct TimerId;
}

/// Whether a timer re-arms after firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    OneShot,
    /// Re-armed for `now + interval` every time it fires.
    Repeating,
}

#[derive(Debug)]
struct Timer {
    deadline: Instant,
    interval: Duration,
    kind: TimerKind,
}

/// Arena of timers plus a deadline heap.
#[derive(Debug, Default)]
pub struct TimerManager {
    timers: SlotMap<TimerId, Timer>,
    deadlines: BinaryHeap<Reverse<(Instant, TimerId)>>,
}

impl TimerManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn arm(&mut self, interval: Duration, kind: TimerKind, now: Instant) -> TimerId {
        let deadline = now + interval;
        let id = self.timers.insert(Timer {
            deadline,
            interval,
            kind,
        });
        self.deadlines.push(Reverse((deadline, id)));
        tracing::trace!(target: targets::TIMER, ?id, ?interval, ?kind, "timer armed");
        id
    }

    /// Fire once, `delay` from now.
    pub fn start_one_shot(&mut self, delay: Duration) -> TimerId {
        self.arm(delay, TimerKind::OneShot, Instant::now())
    }

    /// Fire every `interval`, starting one interval from now.
    pub fn start_repeating(&mut self, interval: Duration) -> TimerId {
        self.arm(interval, TimerKind::Repeating, Instant::now())
    }

    /// [`start_repeating`](Self::start_repeating) against an explicit clock.
    pub fn start_repeating_at(&mut self, interval: Duration, now: Instant) -> TimerId {
        self.arm(interval, TimerKind::Repeating, now)
    }

    pub fn stop(&mut self, id: TimerId) -> Result<(), TimerError> {
        self.timers.remove(id).ok_or(TimerError::InvalidTimerId)?;
        tracing::trace!(target: targets::TIMER, ?id, "timer stopped");
        Ok(())
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Whether a heap entry still matches a running timer's deadline.
    fn is_current(&self, deadline: Instant, id: TimerId) -> bool {
        self.timers.get(id).is_some_and(|t| t.deadline == deadline)
    }

    /// Time left until the earliest live deadline.
    pub fn time_until_next(&mut self) -> Option<Duration> {
        while let Some(&Reverse((deadline, id))) = self.deadlines.peek() {
            if self.is_current(deadline, id) {
                return Some(deadline.saturating_duration_since(Instant::now()));
            }
            self.deadlines.pop();
        }
        None
    }

    pub fn process_expired(&mut self) -> Vec<TimerId> {
        self.process_expired_at(Instant::now())
    }

    /// Fire every timer due by `now`, earliest deadline first.
    ///
    /// A repeating timer fires at most once per call, however many intervals
    /// have passed.
    pub fn process_expired_at(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired = Vec::new();
        while let Some(&Reverse((deadline, id))) = self.deadlines.peek() {
            if deadline > now {
                break;
            }
            self.deadlines.pop();
            if !self.is_current(deadline, id) {
                continue;
            }
            fired.push(id);

            let Some(timer) = self.timers.get_mut(id) else {
                continue;
            };
            if timer.kind == TimerKind::Repeating {
                timer.deadline = now + timer.interval;
                self.deadlines.push(Reverse((timer.deadline, id)));
            } else {
                self.timers.remove(id);
            }
        }
        if !fired.is_empty() {
            tracing::trace!(target: targets::TIMER, count = fired.len(), "timers fired");
        }
        fired
    }
}
