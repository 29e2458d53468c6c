//! Bounded retry for generate-then-commit workflows.
//!
//! The allocator draws a candidate, tries to commit it, and draws again on
//! a collision. [`bounded`] captures that loop: the caller supplies the
//! attempt budget, a generator for candidates and a commit function that
//! classifies each try as committed, collided or aborted.

use std::future::Future;

/// The result of committing a single candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T, E> {
    /// The candidate was accepted.
    Committed(T),
    /// The candidate was already taken; another one may be tried.
    Collided,
    /// A failure that must not be retried.
    Aborted(E),
}

/// The overall result of a bounded retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T, E> {
    /// A candidate was committed on attempt number `attempts`.
    Committed { value: T, attempts: u32 },
    /// Every attempt in the budget collided.
    Exhausted { attempts: u32 },
    /// Attempt number `attempts` failed with a non-retryable error.
    Aborted { error: E, attempts: u32 },
}

impl<T, E> RetryOutcome<T, E> {
    /// Number of attempts that were consumed.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Committed { attempts, .. }
            | RetryOutcome::Exhausted { attempts }
            | RetryOutcome::Aborted { attempts, .. } => *attempts,
        }
    }
}

/// Runs up to `budget` generate-then-commit rounds.
///
/// Each round calls `generate` for a fresh candidate and hands it to
/// `commit`. The loop stops at the first [`Attempt::Committed`] or
/// [`Attempt::Aborted`]; [`Attempt::Collided`] moves on to the next round.
/// A budget of zero yields `Exhausted { attempts: 0 }` without calling
/// either function.
pub async fn bounded<C, T, E, G, F, Fut>(
    budget: u32,
    mut generate: G,
    mut commit: F,
) -> RetryOutcome<T, E>
where
    G: FnMut() -> C,
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Attempt<T, E>>,
{
    for attempt in 1..=budget {
        let candidate = generate();
        match commit(candidate).await {
            Attempt::Committed(value) => {
                return RetryOutcome::Committed {
                    value,
                    attempts: attempt,
                }
            }
            Attempt::Aborted(error) => {
                return RetryOutcome::Aborted {
                    error,
                    attempts: attempt,
                }
            }
            Attempt::Collided => continue,
        }
    }

    RetryOutcome::Exhausted { attempts: budget }
}
