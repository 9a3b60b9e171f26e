/*!
Retry-until-deadline for provider reads.

Busy poll with no backoff. Attempts yield the thread between them; the
deadline is the only bound.
*/

use crate::types::ProviderError;
use std::time::{Duration, Instant};

/// Run `attempt` until it succeeds, fails permanently, or `deadline` elapses.
///
/// Always makes at least one attempt, even with a zero deadline.
/// Returns `None` when giving up.
pub(crate) fn until_deadline<T>(
  deadline: Duration,
  mut attempt: impl FnMut() -> Result<T, ProviderError>,
) -> Option<T> {
  let started = Instant::now();
  let mut attempts: u32 = 0;
  loop {
    attempts = attempts.saturating_add(1);
    match attempt() {
      Ok(value) => return Some(value),
      Err(e) if e.is_transient() && started.elapsed() < deadline => std::thread::yield_now(),
      Err(e) => {
        log::debug!(
          "[retry] giving up after {attempts} attempt(s) in {:?}: {e}",
          started.elapsed()
        );
        return None;
      }
    }
  }
}
