use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

/// Per-project limit on generation runs, fixed window per project.
pub struct GenerationRateLimiter {
    /// project_id -> (count, window_start)
    entries: DashMap<Uuid, (u32, Instant)>,
}

impl GenerationRateLimiter {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Check if a run may start. Returns Ok(()) or Err with retry-after seconds.
    pub fn check(&self, project_id: Uuid, limit: u32, window_secs: u64) -> Result<(), u64> {
        let window = Duration::from_secs(window_secs);
        let now = Instant::now();

        let mut entry = self.entries.entry(project_id).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > window {
            *count = 1;
            *start = now;
            return Ok(());
        }

        if *count >= limit {
            let elapsed = now.duration_since(*start).as_secs();
            return Err(window_secs.saturating_sub(elapsed).max(1));
        }

        *count += 1;
        Ok(())
    }

    /// Hand back a slot taken by `check` for a run that never started.
    pub fn release(&self, project_id: Uuid) {
        if let Some(mut entry) = self.entries.get_mut(&project_id) {
            let (count, _) = entry.value_mut();
            *count = count.saturating_sub(1);
        }
    }

    /// Remove stale entries older than the given duration.
    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries
            .retain(|_, (_, start)| now.duration_since(*start) < max_age);
    }
}

impl Default for GenerationRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_limit_then_rejects() {
        let limiter = GenerationRateLimiter::new();
        let project = Uuid::now_v7();

        assert!(limiter.check(project, 2, 60).is_ok());
        assert!(limiter.check(project, 2, 60).is_ok());
        let retry_after = limiter.check(project, 2, 60).unwrap_err();
        assert!((1..=60).contains(&retry_after));
    }

    #[test]
    fn projects_are_limited_independently() {
        let limiter = GenerationRateLimiter::new();
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();

        assert!(limiter.check(a, 1, 60).is_ok());
        assert!(limiter.check(a, 1, 60).is_err());
        assert!(limiter.check(b, 1, 60).is_ok());
    }

    #[test]
    fn zero_limit_rejects_everything() {
        let limiter = GenerationRateLimiter::new();
        assert!(limiter.check(Uuid::now_v7(), 0, 60).is_err());
    }

    #[test]
    fn released_slot_can_be_reused() {
        let limiter = GenerationRateLimiter::new();
        let project = Uuid::now_v7();

        assert!(limiter.check(project, 1, 60).is_ok());
        limiter.release(project);
        assert!(limiter.check(project, 1, 60).is_ok());
        assert!(limiter.check(project, 1, 60).is_err());
    }

    #[test]
    fn release_without_entry_is_a_noop() {
        let limiter = GenerationRateLimiter::new();
        let project = Uuid::now_v7();

        limiter.release(project);
        assert!(limiter.check(project, 1, 60).is_ok());
        assert!(limiter.check(project, 1, 60).is_err());
    }

    #[test]
    fn cleanup_drops_old_windows() {
        let limiter = GenerationRateLimiter::new();
        let project = Uuid::now_v7();
        assert!(limiter.check(project, 1, 60).is_ok());
        assert!(limiter.check(project, 1, 60).is_err());

        limiter.cleanup(Duration::ZERO);
        assert!(limiter.check(project, 1, 60).is_ok());
    }
}
