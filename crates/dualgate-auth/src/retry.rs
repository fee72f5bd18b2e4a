//! Bounded retry with a fixed delay between attempts

use dualgate_core::config::DirectoryConfig;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

/// Terminal failure of a retried operation
#[derive(Debug)]
pub enum RetryError<E> {
    /// A non-retryable failure ended the sequence early
    Permanent { attempt: u32, error: E },
    /// Every attempt failed with a retryable error
    Exhausted { attempts: u32, error: E },
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Permanent { attempt, .. } => *attempt,
            RetryError::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn into_inner(self) -> E {
        match self {
            RetryError::Permanent { error, .. } | RetryError::Exhausted { error, .. } => error,
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Permanent { attempt, error } => {
                write!(f, "failed permanently on attempt {}: {}", attempt, error)
            }
            RetryError::Exhausted { attempts, error } => {
                write!(f, "gave up after {} attempts: {}", attempts, error)
            }
        }
    }
}

impl RetryPolicy {
    /// At least one attempt is always made
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_directory(config: &DirectoryConfig) -> Self {
        Self::new(config.max_attempts, config.retry_delay())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `operation` until it succeeds, fails with an error `is_retryable`
    /// rejects, or the attempt budget is spent.
    ///
    /// The operation receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut, P>(&self, mut operation: F, is_retryable: P) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: fmt::Display,
    {
        for attempt in 1..self.max_attempts {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) if is_retryable(&error) => {
                    info!(
                        "Attempt {}/{} failed, retrying in {:?}: {}",
                        attempt, self.max_attempts, self.delay, error
                    );
                    tokio::time::sleep(self.delay).await;
                }
                Err(error) => return Err(RetryError::Permanent { attempt, error }),
            }
        }

        let attempt = self.max_attempts;
        debug!("Final attempt {}/{}", attempt, self.max_attempts);
        match operation(attempt).await {
            Ok(value) => Ok(value),
            Err(error) if is_retryable(&error) => Err(RetryError::Exhausted {
                attempts: attempt,
                error,
            }),
            Err(error) => Err(RetryError::Permanent { attempt, error }),
        }
    }
}
