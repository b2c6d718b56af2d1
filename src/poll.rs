//! Polling budget and the per-job state machine.

use crate::error::{CaptchaError, Result};
use crate::protocol::PollStatus;
use std::time::Duration;

/// Default pause between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3_000);

/// Default total time to wait for an answer. Services drop job ids after
/// roughly 300 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(300_000);

/// How often and how long to poll for an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    interval: Duration,
    budget: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            budget: DEFAULT_TIMEOUT,
        }
    }
}

impl PollPolicy {
    pub fn new(interval: Duration, budget: Duration) -> Result<Self> {
        // Budgets are counted in whole milliseconds
        if interval.as_millis() == 0 {
            return Err(CaptchaError::Config(
                "poll interval must be at least 1ms".into(),
            ));
        }
        Ok(Self { interval, budget })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Number of status checks allowed: `floor(budget / interval)`.
    pub fn max_attempts(&self) -> u64 {
        let attempts = self.budget.as_millis() / self.interval.as_millis().max(1);
        u64::try_from(attempts).unwrap_or(u64::MAX)
    }
}

/// Lifecycle of one submitted job as seen from poll responses.
#[derive(Debug)]
pub enum JobState {
    /// Job id obtained, nothing checked yet
    Submitted,
    /// At least one "not ready" response seen
    Polling { attempts: u64 },
    Answered(String),
    /// The service rejected the job or the transport failed
    Rejected(CaptchaError),
    TimedOut { attempts: u64 },
}

impl JobState {
    /// Initial state; a policy allowing zero checks times out immediately.
    pub fn start(max_attempts: u64) -> Self {
        if max_attempts == 0 {
            JobState::TimedOut { attempts: 0 }
        } else {
            JobState::Submitted
        }
    }

    /// Apply the outcome of one status check.
    pub fn on_response(self, response: Result<PollStatus>, max_attempts: u64) -> Self {
        let attempts = match self {
            JobState::Submitted => 1,
            JobState::Polling { attempts } => attempts + 1,
            terminal => return terminal,
        };

        match response {
            Ok(PollStatus::Ready(answer)) => JobState::Answered(answer),
            Ok(PollStatus::NotReady) if attempts >= max_attempts => JobState::TimedOut { attempts },
            Ok(PollStatus::NotReady) => JobState::Polling { attempts },
            Err(e) => JobState::Rejected(e),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Submitted | JobState::Polling { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval(), Duration::from_secs(3));
        assert_eq!(policy.budget(), Duration::from_secs(300));
        assert_eq!(policy.max_attempts(), 100);
    }

    #[test]
    fn test_max_attempts_floors() {
        let policy =
            PollPolicy::new(Duration::from_millis(7_000), Duration::from_millis(300_000)).unwrap();
        assert_eq!(policy.max_attempts(), 42);

        let short = PollPolicy::new(Duration::from_secs(5), Duration::from_secs(4)).unwrap();
        assert_eq!(short.max_attempts(), 0);
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(PollPolicy::new(Duration::ZERO, Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_sub_millisecond_interval_rejected() {
        let result = PollPolicy::new(Duration::from_micros(500), Duration::from_secs(1));
        assert!(matches!(result, Err(CaptchaError::Config(_))));

        let one_ms = PollPolicy::new(Duration::from_millis(1), Duration::from_secs(1)).unwrap();
        assert_eq!(one_ms.max_attempts(), 1_000);
    }

    #[test]
    fn test_huge_budget_saturates() {
        let policy = PollPolicy::new(Duration::from_millis(1), Duration::MAX).unwrap();
        assert_eq!(policy.max_attempts(), u64::MAX);
    }

    #[test]
    fn test_state_transitions() {
        let state = JobState::start(3);
        assert!(!state.is_terminal());

        let state = state.on_response(Ok(PollStatus::NotReady), 3);
        assert!(matches!(state, JobState::Polling { attempts: 1 }));

        let state = state.on_response(Ok(PollStatus::Ready("w7xk".into())), 3);
        assert!(matches!(state, JobState::Answered(ref a) if a == "w7xk"));
        assert!(state.is_terminal());
    }

    #[test]
    fn test_times_out_on_last_attempt() {
        let mut state = JobState::start(2);
        state = state.on_response(Ok(PollStatus::NotReady), 2);
        state = state.on_response(Ok(PollStatus::NotReady), 2);
        assert!(matches!(state, JobState::TimedOut { attempts: 2 }));

        // Terminal states ignore further responses
        let state = state.on_response(Ok(PollStatus::Ready("late".into())), 2);
        assert!(matches!(state, JobState::TimedOut { attempts: 2 }));
    }

    #[test]
    fn test_zero_budget_times_out_without_checks() {
        assert!(matches!(JobState::start(0), JobState::TimedOut { attempts: 0 }));
    }

    #[test]
    fn test_error_rejects() {
        let state = JobState::Submitted.on_response(
            Err(CaptchaError::RemoteRejected {
                backend: "a".into(),
                code: "ERROR_NO_SUCH_CAPCHA_ID".into(),
            }),
            100,
        );
        assert!(matches!(state, JobState::Rejected(ref e) if e.code() == Some("ERROR_NO_SUCH_CAPCHA_ID")));
    }
}
