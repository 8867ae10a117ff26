//! Per-call retry schedule, modelled as a small state machine.
//!
//! ```text
//! Attempting(n) --2xx--------------------------> Succeeded
//! Attempting(n) --any failure, n+1 == max------> Failed
//! Attempting(n) --429--------------------------> WaitingRateLimit { next: n+1, 2^n * base }
//! Attempting(n) --network/5xx/4xx/bad body-----> WaitingBackoff   { next: n+1, (n+1) * step }
//! Waiting*      --delay elapsed----------------> Attempting(next)
//! ```
//!
//! A 429 consumes an attempt like any other failure; only the wait differs.

use std::time::Duration;

use compendium_core::config::RetrySettings;
use compendium_core::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub rate_limit_base: Duration,
    pub failure_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&RetrySettings::default())
    }
}

impl RetryPolicy {
    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            rate_limit_base: Duration::from_millis(settings.rate_limit_base_ms),
            failure_step: Duration::from_millis(settings.failure_step_ms),
        }
    }

    /// Exponential: `2^attempt * base`, attempt counted from 0.
    pub fn rate_limit_delay(&self, attempt: u32) -> Duration {
        self.rate_limit_base.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Linear: `(attempt + 1) * step`.
    pub fn failure_delay(&self, attempt: u32) -> Duration {
        self.failure_step.saturating_mul(attempt.saturating_add(1))
    }
}

/// How a single attempt ended, as far as the schedule cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    RateLimited,
    Failed,
}

impl AttemptOutcome {
    pub fn of<T>(result: &Result<T, Error>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(Error::RateLimited { .. }) => Self::RateLimited,
            Err(_) => Self::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Attempting(u32),
    WaitingRateLimit { next: u32, delay: Duration },
    WaitingBackoff { next: u32, delay: Duration },
    Succeeded,
    Failed,
}

impl RetryState {
    pub fn start() -> Self {
        Self::Attempting(0)
    }

    /// Transition out of `Attempting`; any other state is returned unchanged.
    pub fn after_attempt(self, policy: &RetryPolicy, outcome: AttemptOutcome) -> Self {
        let Self::Attempting(attempt) = self else { return self };
        if outcome == AttemptOutcome::Success {
            return Self::Succeeded;
        }
        if attempt + 1 >= policy.max_attempts {
            return Self::Failed;
        }
        match outcome {
            AttemptOutcome::RateLimited => Self::WaitingRateLimit {
                next: attempt + 1,
                delay: policy.rate_limit_delay(attempt),
            },
            _ => Self::WaitingBackoff {
                next: attempt + 1,
                delay: policy.failure_delay(attempt),
            },
        }
    }

    /// Transition out of a waiting state once its delay has elapsed.
    pub fn after_wait(self) -> Self {
        match self {
            Self::WaitingRateLimit { next, .. } | Self::WaitingBackoff { next, .. } => Self::Attempting(next),
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn default_schedule_matches_catalog_limits() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_attempts, 3);
        assert_eq!(p.rate_limit_delay(0), ms(1000));
        assert_eq!(p.rate_limit_delay(1), ms(2000));
        assert_eq!(p.failure_delay(0), ms(1000));
        assert_eq!(p.failure_delay(1), ms(2000));
    }

    #[test]
    fn success_short_circuits() {
        let p = RetryPolicy::default();
        let s = RetryState::start().after_attempt(&p, AttemptOutcome::Success);
        assert_eq!(s, RetryState::Succeeded);
        assert!(s.is_terminal());
    }

    #[test]
    fn rate_limit_waits_exponentially_and_consumes_budget() {
        let p = RetryPolicy::default();
        let mut s = RetryState::start();
        s = s.after_attempt(&p, AttemptOutcome::RateLimited);
        assert_eq!(s, RetryState::WaitingRateLimit { next: 1, delay: ms(1000) });
        s = s.after_wait();
        assert_eq!(s, RetryState::Attempting(1));
        s = s.after_attempt(&p, AttemptOutcome::RateLimited);
        assert_eq!(s, RetryState::WaitingRateLimit { next: 2, delay: ms(2000) });
        s = s.after_wait().after_attempt(&p, AttemptOutcome::RateLimited);
        assert_eq!(s, RetryState::Failed, "third 429 exhausts the budget without waiting");
    }

    #[test]
    fn other_failures_back_off_linearly() {
        let p = RetryPolicy::default();
        let s = RetryState::start().after_attempt(&p, AttemptOutcome::Failed);
        assert_eq!(s, RetryState::WaitingBackoff { next: 1, delay: ms(1000) });
        let s = s.after_wait().after_attempt(&p, AttemptOutcome::Failed);
        assert_eq!(s, RetryState::WaitingBackoff { next: 2, delay: ms(2000) });
        let s = s.after_wait().after_attempt(&p, AttemptOutcome::Success);
        assert_eq!(s, RetryState::Succeeded);
    }

    #[test]
    fn mixed_failures_share_one_budget() {
        let p = RetryPolicy::default();
        let s = RetryState::start()
            .after_attempt(&p, AttemptOutcome::RateLimited)
            .after_wait()
            .after_attempt(&p, AttemptOutcome::Failed);
        assert_eq!(s, RetryState::WaitingBackoff { next: 2, delay: ms(2000) });
        assert_eq!(s.after_wait().after_attempt(&p, AttemptOutcome::Failed), RetryState::Failed);
    }

    #[test]
    fn single_attempt_policy_never_waits() {
        let p = RetryPolicy { max_attempts: 1, ..RetryPolicy::default() };
        assert_eq!(RetryState::start().after_attempt(&p, AttemptOutcome::RateLimited), RetryState::Failed);
    }

    #[test]
    fn classifies_results() {
        let limited: Result<(), Error> = Err(Error::RateLimited { path: "/x".into(), attempts: 1 });
        let missing: Result<(), Error> = Err(Error::Permanent { path: "/x".into(), status: 404 });
        assert_eq!(AttemptOutcome::of(&limited), AttemptOutcome::RateLimited);
        assert_eq!(AttemptOutcome::of(&missing), AttemptOutcome::Failed);
        assert_eq!(AttemptOutcome::of(&Ok::<(), Error>(())), AttemptOutcome::Success);
    }
}
