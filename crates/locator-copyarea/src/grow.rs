//! The grow-and-retry sizing loop shared by every copy-area producer
//! (`fetch`, `fetch_all`, `fetch_lockset`, `force`'s reply area).
//!
//! Callers start with a one-page budget, hand it to `attempt`, and get
//! back either a finished value or the byte count that was needed. The
//! loop regrows to `max(required, budget + one page)` and retries.
//! This always terminates: each iteration either succeeds or strictly
//! grows the budget past the last known shortfall.

/// Run `attempt` with a growing budget until it succeeds. `attempt`
/// receives the current budget and returns `Ok(value)` on success or
/// `Err(required_bytes)` to request a retry at a larger budget.
pub fn grow_and_retry<T>(
    page_size: usize,
    mut attempt: impl FnMut(usize) -> Result<T, usize>,
) -> T {
    let mut budget = page_size;
    loop {
        match attempt(budget) {
            Ok(value) => return value,
            Err(required) => {
                let grown = budget + page_size;
                budget = required.max(grown);
                tracing::warn!(budget, required, "copy area too small, growing and retrying");
            }
        }
    }
}
