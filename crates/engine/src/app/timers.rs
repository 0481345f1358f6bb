use std::time::Duration;

use tracing::debug;

/// Identifies a delayed callback to the world that scheduled it.
///
/// `kind` is world-defined; `stamp` lets a world carry its own relevance token
/// (round number, message serial) alongside the session generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerTag {
    pub kind: u32,
    pub stamp: u64,
}

impl TimerTag {
    pub const fn new(kind: u32) -> Self {
        Self { kind, stamp: 0 }
    }

    pub const fn stamped(kind: u32, stamp: u64) -> Self {
        Self { kind, stamp }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    due: Duration,
    sequence: u64,
    generation: u64,
    tag: TimerTag,
}

/// One-shot timers guarded by a session generation token.
///
/// Each entry records the generation current when it was scheduled. Bumping
/// the generation (on every world stop) makes older entries stale; they are
/// discarded when they come due instead of being delivered.
#[derive(Debug, Default)]
pub struct TimerQueue {
    pending: Vec<PendingTimer>,
    generation: u64,
    next_sequence: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn schedule(&mut self, now: Duration, delay: Duration, tag: TimerTag) {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        self.pending.push(PendingTimer {
            due: now.saturating_add(delay),
            sequence,
            generation: self.generation,
            tag,
        });
    }

    pub fn advance_generation(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Removes every timer due at `now`, returning the current-generation tags
    /// in due order. Stale entries are dropped.
    pub fn take_due(&mut self, now: Duration) -> Vec<TimerTag> {
        let mut due = Vec::new();
        let mut index = 0;
        while index < self.pending.len() {
            if self.pending[index].due <= now {
                due.push(self.pending.swap_remove(index));
            } else {
                index += 1;
            }
        }
        due.sort_by_key(|timer| (timer.due, timer.sequence));

        let current = self.generation;
        due.into_iter()
            .filter(|timer| {
                if timer.generation == current {
                    return true;
                }
                debug!(
                    kind = timer.tag.kind,
                    stamp = timer.tag.stamp,
                    scheduled_generation = timer.generation,
                    current_generation = current,
                    "stale_timer_dropped"
                );
                false
            })
            .map(|timer| timer.tag)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn timers_fire_in_due_order_once() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(0), ms(300), TimerTag::new(2));
        queue.schedule(ms(0), ms(100), TimerTag::new(1));
        queue.schedule(ms(0), ms(900), TimerTag::new(3));

        assert!(queue.take_due(ms(50)).is_empty());
        assert_eq!(queue.take_due(ms(300)), vec![TimerTag::new(1), TimerTag::new(2)]);
        assert!(queue.take_due(ms(300)).is_empty());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn equal_due_times_keep_schedule_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(0), ms(10), TimerTag::new(7));
        queue.schedule(ms(0), ms(10), TimerTag::new(5));
        assert_eq!(queue.take_due(ms(10)), vec![TimerTag::new(7), TimerTag::new(5)]);
    }

    #[test]
    fn stale_generation_is_discarded_at_fire_time() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(0), ms(100), TimerTag::stamped(1, 4));
        queue.advance_generation();
        queue.schedule(ms(0), ms(100), TimerTag::stamped(1, 5));

        assert_eq!(queue.take_due(ms(100)), vec![TimerTag::stamped(1, 5)]);
        assert!(queue.is_empty());
    }
}
