//! Wait for a condition the remote side offers no notification for.
//!
//! [`wait_until`] sleeps a fixed interval, then evaluates the check, and loops
//! until it holds. There is no backoff. Every wait carries a deadline, and can
//! carry a cancellation signal on top.

use std::{future::Future, time::Duration};

use tokio::{sync::watch, time::Instant};

/// How a wait ended, when it did not end with the check holding.
#[derive(Debug, PartialEq, Eq)]
pub enum WaitError<E> {
    /// The deadline passed first. Carries how long the wait ran.
    TimedOut { waited: Duration },
    /// The cancellation signal was raised.
    Cancelled,
    /// The check itself failed. Not retried.
    Check(E),
}

/// Interval and deadline of a wait, plus an optional cancellation signal.
///
/// Raising the signal (sending `true`) ends every wait holding a receiver
/// with [`WaitError::Cancelled`]. A dropped sender cancels nothing.
#[derive(Clone, Debug)]
pub struct WaitOptions {
    pub interval: Duration,
    pub timeout: Duration,
    pub cancel: Option<watch::Receiver<bool>>,
}

impl WaitOptions {
    pub fn new(interval: Duration, timeout: Duration) -> WaitOptions {
        WaitOptions {
            interval,
            timeout,
            cancel: None,
        }
    }

    pub fn cancel_on(mut self, cancel: watch::Receiver<bool>) -> WaitOptions {
        self.cancel = Some(cancel);
        self
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        WaitOptions::new(Duration::from_secs(1), Duration::from_secs(120))
    }
}

/// The time budget of one operation, shared by every wait inside it.
///
/// An operation that waits more than once (delete, then create) hands the
/// same deadline to each wait, so the whole operation is bounded, not each
/// wait on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deadline {
    started: Instant,
    at: Instant,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Deadline {
        let started = Instant::now();
        Deadline {
            started,
            at: started + timeout,
        }
    }

    pub fn at(&self) -> Instant {
        self.at
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn has_passed(&self) -> bool {
        Instant::now() >= self.at
    }
}

pub async fn wait_until<F, Fut, E>(options: &WaitOptions, check: F) -> Result<(), WaitError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    //! Sleep `options.interval`, evaluate `check`, and repeat until it
    //! returns `Ok(true)`, within a deadline of `options.timeout` from now.
    //!
    //! - an `Err` from `check` ends the wait at once as [`WaitError::Check`]
    //! - once `options.timeout` has elapsed, the next `false` ends it as
    //!   [`WaitError::TimedOut`]
    //! - a raised cancellation signal ends it as [`WaitError::Cancelled`], even
    //!   mid-sleep

    wait_until_deadline(options, Deadline::after(options.timeout), check).await
}

pub async fn wait_until_deadline<F, Fut, E>(
    options: &WaitOptions,
    deadline: Deadline,
    mut check: F,
) -> Result<(), WaitError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    //! As [`wait_until`], against a deadline that may have started before
    //! this wait. `options.timeout` is not consulted.
    //!
    //! A check still pending at the deadline is abandoned and the wait ends
    //! as [`WaitError::TimedOut`]. `waited` counts from the deadline's start.

    let mut cancel = options.cancel.clone();

    loop {
        tokio::select! {
            _ = cancelled(&mut cancel) => return Err(WaitError::Cancelled),
            _ = tokio::time::sleep(options.interval) => {}
        }

        match tokio::time::timeout_at(deadline.at(), check()).await {
            Ok(Ok(true)) => return Ok(()),
            Ok(Ok(false)) => {}
            Ok(Err(error)) => return Err(WaitError::Check(error)),
            Err(_) => {
                return Err(WaitError::TimedOut {
                    waited: deadline.elapsed(),
                });
            }
        }

        if deadline.has_passed() {
            return Err(WaitError::TimedOut {
                waited: deadline.elapsed(),
            });
        }
    }
}

async fn cancelled(cancel: &mut Option<watch::Receiver<bool>>) {
    if let Some(receiver) = cancel {
        let raised = receiver.wait_for(|raised| *raised).await.is_ok();
        if raised {
            return;
        }
    }
    std::future::pending::<()>().await
}
