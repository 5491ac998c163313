//! Retry policy for package installs.
//!
//! # Policy
//!
//! - "already installed" → `Skipped`, no retry
//! - installed → `Success`
//! - hash mismatch, force not yet tried → retry once with `--force`. This
//!   retry is free: it consumes no attempt and does not sleep. A mismatch
//!   is a stale-cache symptom that a forced redownload fixes.
//! - anything else (including failing to start the package manager)
//!   consumes one attempt; `retry_delay` is slept between consumed attempts
//! - after `max_retries` consumed attempts → `Failed`

use std::time::Duration;
use tracing::{info, warn};

use crate::outcome::Outcome;
use crate::system::{InstallSignal, PackageManager};

/// Retry parameters for the install action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Blocking pause between attempts
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Install `id`, retrying according to `policy`.
pub fn install_with_retry(
    packages: &mut dyn PackageManager,
    id: &str,
    locale: Option<&str>,
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
) -> Outcome {
    let max_attempts = policy.max_retries.max(1);
    let mut consumed = 0;
    let mut force = false;

    loop {
        match packages.install(id, locale, force) {
            Ok(InstallSignal::AlreadyInstalled) => {
                info!("{} is already installed", id);
                return Outcome::Skipped;
            }
            Ok(InstallSignal::Installed) => {
                info!("{} installed", id);
                return Outcome::Success;
            }
            Ok(InstallSignal::HashMismatch) if !force => {
                warn!("{}: installer hash mismatch, retrying with --force", id);
                force = true;
                continue;
            }
            Ok(signal) => {
                warn!("{}: install attempt {} failed ({:?})", id, consumed + 1, signal);
            }
            Err(e) => {
                warn!("{}: install attempt {} could not run: {:#}", id, consumed + 1, e);
            }
        }

        consumed += 1;
        if consumed >= max_attempts {
            warn!("{}: giving up after {} attempts", id, consumed);
            return Outcome::Failed;
        }
        sleeper.sleep(policy.retry_delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::VecDeque;

    /// Replays scripted install results and records the `force` flags seen
    struct Scripted {
        results: VecDeque<anyhow::Result<InstallSignal>>,
        fallback: InstallSignal,
        forces: Vec<bool>,
    }

    impl Scripted {
        fn new(results: Vec<anyhow::Result<InstallSignal>>, fallback: InstallSignal) -> Self {
            Self {
                results: results.into(),
                fallback,
                forces: Vec::new(),
            }
        }
    }

    impl PackageManager for Scripted {
        fn is_installed(&mut self, _id: &str) -> anyhow::Result<bool> {
            Ok(false)
        }

        fn install(&mut self, _id: &str, _locale: Option<&str>, force: bool) -> anyhow::Result<InstallSignal> {
            self.forces.push(force);
            self.results.pop_front().unwrap_or(Ok(self.fallback))
        }

        fn uninstall(&mut self, _id: &str) -> anyhow::Result<bool> {
            Ok(true)
        }
    }

    #[derive(Default)]
    struct CountingSleeper {
        count: Cell<u32>,
    }

    impl Sleeper for CountingSleeper {
        fn sleep(&self, _duration: Duration) {
            self.count.set(self.count.get() + 1);
        }
    }

    #[test]
    fn test_success_first_try() {
        let mut pm = Scripted::new(vec![], InstallSignal::Installed);
        let sleeper = CountingSleeper::default();
        let outcome = install_with_retry(&mut pm, "A", None, &RetryPolicy::default(), &sleeper);
        assert_eq!(outcome, Outcome::Success);
        assert_eq!(pm.forces.len(), 1);
        assert_eq!(sleeper.count.get(), 0);
    }

    #[test]
    fn test_already_installed_is_skipped_without_retry() {
        let mut pm = Scripted::new(vec![], InstallSignal::AlreadyInstalled);
        let sleeper = CountingSleeper::default();
        let outcome = install_with_retry(&mut pm, "A", None, &RetryPolicy::default(), &sleeper);
        assert_eq!(outcome, Outcome::Skipped);
        assert_eq!(pm.forces.len(), 1);
    }

    #[test]
    fn test_hash_mismatch_retry_is_free() {
        let mut pm = Scripted::new(vec![Ok(InstallSignal::HashMismatch)], InstallSignal::Installed);
        let sleeper = CountingSleeper::default();
        let policy = RetryPolicy {
            max_retries: 1,
            retry_delay: Duration::from_secs(5),
        };
        let outcome = install_with_retry(&mut pm, "A", None, &policy, &sleeper);
        assert_eq!(outcome, Outcome::Success);
        assert_eq!(pm.forces, vec![false, true]);
        assert_eq!(sleeper.count.get(), 0);
    }

    #[test]
    fn test_second_hash_mismatch_consumes_attempts() {
        let mut pm = Scripted::new(vec![], InstallSignal::HashMismatch);
        let sleeper = CountingSleeper::default();
        let outcome = install_with_retry(&mut pm, "A", None, &RetryPolicy::default(), &sleeper);
        assert_eq!(outcome, Outcome::Failed);
        // one free forced retry + three consumed attempts
        assert_eq!(pm.forces, vec![false, true, true, true]);
        assert_eq!(sleeper.count.get(), 2);
    }

    #[test]
    fn test_exhaustion() {
        let mut pm = Scripted::new(vec![], InstallSignal::Failed(1));
        let sleeper = CountingSleeper::default();
        let outcome = install_with_retry(&mut pm, "A", None, &RetryPolicy::default(), &sleeper);
        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(pm.forces.len(), 3);
        assert_eq!(sleeper.count.get(), 2);
    }

    #[test]
    fn test_spawn_errors_consume_attempts() {
        let mut pm = Scripted::new(
            vec![Err(anyhow::anyhow!("winget not found"))],
            InstallSignal::Installed,
        );
        let sleeper = CountingSleeper::default();
        let outcome = install_with_retry(&mut pm, "A", None, &RetryPolicy::default(), &sleeper);
        assert_eq!(outcome, Outcome::Success);
        assert_eq!(pm.forces.len(), 2);
        assert_eq!(sleeper.count.get(), 1);
    }
}
