//! Per-attempt execution state owned by the [`ExecutionEngine`](crate::ExecutionEngine).
//!
//! Actions are shared, immutable capability descriptions. Anything an action
//! needs to remember between ticks of one attempt (a timer, a chosen target,
//! the last observed animation) goes into the [`ExecutionContext`] the
//! engine hands to `perform`. The engine creates a fresh context when an
//! action starts and drops it once the action succeeds, fails or is aborted,
//! so a restarted action never sees state from an earlier attempt.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::time::{Duration, Instant};

/// A typed slot in an [`ExecutionContext`].
///
/// ```
/// use goap_engine::{CtxKey, ExecutionContext};
///
/// const TARGET: CtxKey<String> = CtxKey::new("target");
///
/// let mut ctx = ExecutionContext::new();
/// ctx.set(TARGET, "Oak tree".to_string());
/// assert_eq!(ctx.get(TARGET).map(String::as_str), Some("Oak tree"));
/// ```
#[derive(Debug)]
pub struct CtxKey<T: 'static> {
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Copy for CtxKey<T> {}

impl<T: 'static> Clone for CtxKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> CtxKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _phantom: PhantomData,
        }
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

/// Scratch state for a single attempt at one action.
pub struct ExecutionContext {
    started_at: Instant,
    ticks: u32,
    values: BTreeMap<&'static str, Box<dyn Any>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            ticks: 0,
            values: BTreeMap::new(),
        }
    }

    /// Number of `perform` calls made in this attempt, including the current one.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub(crate) fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Whether this attempt has been running for longer than `limit`.
    pub fn timed_out(&self, limit: Duration) -> bool {
        self.elapsed() > limit
    }

    pub fn contains<T: 'static>(&self, key: CtxKey<T>) -> bool {
        self.values.contains_key(key.name)
    }

    pub fn set<T: 'static>(&mut self, key: CtxKey<T>, value: T) {
        self.values.insert(key.name, Box::new(value));
    }

    /// Reads a slot. A slot holding a different type reads as absent.
    pub fn get<T: 'static>(&self, key: CtxKey<T>) -> Option<&T> {
        self.values.get(key.name)?.downcast_ref::<T>()
    }

    pub fn get_mut<T: 'static>(&mut self, key: CtxKey<T>) -> Option<&mut T> {
        self.values.get_mut(key.name)?.downcast_mut::<T>()
    }

    pub fn remove<T: 'static>(&mut self, key: CtxKey<T>) -> Option<T> {
        if !self.values.get(key.name)?.is::<T>() {
            return None;
        }
        let value = self.values.remove(key.name)?;
        value.downcast::<T>().ok().map(|boxed| *boxed)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("ticks", &self.ticks)
            .field("elapsed", &self.elapsed())
            .field("slots", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTER: CtxKey<u32> = CtxKey::new("counter");
    const LABEL: CtxKey<&'static str> = CtxKey::new("label");

    #[test]
    fn test_new_context_is_empty() {
        let ctx = ExecutionContext::new();
        assert_eq!(ctx.ticks(), 0);
        assert!(!ctx.contains(COUNTER));
        assert!(ctx.get(COUNTER).is_none());
    }

    #[test]
    fn test_set_get_mutate_remove() {
        let mut ctx = ExecutionContext::new();
        ctx.set(COUNTER, 1);
        if let Some(counter) = ctx.get_mut(COUNTER) {
            *counter += 2;
        }
        assert_eq!(ctx.get(COUNTER), Some(&3));
        assert_eq!(ctx.remove(COUNTER), Some(3));
        assert!(!ctx.contains(COUNTER));
    }

    #[test]
    fn test_type_mismatch_reads_as_absent() {
        let mut ctx = ExecutionContext::new();
        ctx.set(LABEL, "rock");
        let wrong: CtxKey<u32> = CtxKey::new("label");
        assert!(ctx.get(wrong).is_none());
        assert_eq!(ctx.get(LABEL), Some(&"rock"));
    }

    #[test]
    fn test_remove_with_wrong_type_keeps_value() {
        let mut ctx = ExecutionContext::new();
        ctx.set(LABEL, "rock");
        let wrong: CtxKey<u32> = CtxKey::new("label");
        assert_eq!(ctx.remove(wrong), None);
        assert_eq!(ctx.get(LABEL), Some(&"rock"));
        assert_eq!(ctx.remove(LABEL), Some("rock"));
    }

    #[test]
    fn test_ticks_and_clear() {
        let mut ctx = ExecutionContext::new();
        ctx.record_tick();
        ctx.record_tick();
        ctx.set(COUNTER, 9);
        ctx.clear();
        assert_eq!(ctx.ticks(), 2);
        assert!(!ctx.contains(COUNTER));
    }

    #[test]
    fn test_timed_out() {
        let ctx = ExecutionContext::new();
        assert!(!ctx.timed_out(Duration::from_secs(60)));
        std::thread::sleep(Duration::from_millis(5));
        assert!(ctx.timed_out(Duration::from_millis(1)));
    }
}
