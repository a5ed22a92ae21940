// Retrying assertion over a live event stream.
//
// Purpose
// - Let tests wait for events that are published asynchronously, without sleeping blindly.
//
// Responsibilities
// - Re-read the source on every attempt, filter by event type, count predicate matches.
// - Succeed as soon as exactly one event matches; otherwise wait and retry until the budget
//   is spent, then report the last observed count.

use crate::shared::core::event::{Event, PublishedEvent};
use crate::shared::core::retry_policy::RetryPolicy;
use crate::testing::events_log::EventSource;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

pub const EXPECTED_MATCHES: usize = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssertionError {
    #[error("expected {expected} published {event_type} matching the predicate, found {found}")]
    Unmet {
        event_type: &'static str,
        found: usize,
        expected: usize,
    },

    #[error("expected at least one published {event_type}, found none")]
    Missing { event_type: &'static str },
}

/// Counts the events of type `E` in `events` that satisfy `predicate`.
pub fn count_matching<E, F>(events: &[PublishedEvent], predicate: &F) -> usize
where
    E: Event,
    F: Fn(&E) -> bool,
{
    events
        .iter()
        .filter_map(|e| e.downcast_ref::<E>())
        .filter(|e| predicate(e))
        .count()
}

/// Polls `source` until exactly one event of type `E` satisfies `predicate`.
///
/// The first check runs immediately. Each failed check is followed by a wait of
/// `policy.interval()` while retries remain, so a policy of `n` checks at most `n + 1`
/// times. Success returns without any further wait. When the budget is spent the error
/// carries the count seen on the last check.
pub async fn assert_eventually<E, S, F>(
    source: &S,
    predicate: F,
    policy: RetryPolicy,
) -> Result<(), AssertionError>
where
    E: Event,
    S: EventSource + ?Sized,
    F: Fn(&E) -> bool,
{
    let event_type = E::event_type();
    let mut remaining = policy.max_attempts;
    let mut attempt: u32 = 1;

    loop {
        let found = count_matching::<E, F>(&source.snapshot().await, &predicate);
        if found == EXPECTED_MATCHES {
            debug!(event_type, attempt, "event published");
            return Ok(());
        }

        if remaining == 0 {
            warn!(
                event_type,
                attempt,
                found,
                expected = EXPECTED_MATCHES,
                "event assertion unmet after retries"
            );
            return Err(AssertionError::Unmet {
                event_type,
                found,
                expected: EXPECTED_MATCHES,
            });
        }

        debug!(event_type, attempt, found, remaining, "event not published yet, retrying");
        sleep(policy.interval()).await;
        remaining -= 1;
        attempt = attempt.saturating_add(1);
    }
}
