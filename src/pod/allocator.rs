//! Next-free pod number selection.

use crate::pod::error::PodError;

/// Returns the first unused pod number given the assigned ones in ascending order.
///
/// Walks `assigned` with a candidate starting at 1. Every value equal to the
/// candidate advances it; the first value that differs marks a gap and the
/// candidate is returned without looking further. If the input runs out the
/// candidate is the next value after the last assignment.
///
/// Only the first mismatch is ever considered, so unsorted or duplicated input
/// yields whatever that mismatch happens to reveal. Callers pass keys from an
/// ordered index.
///
/// # Errors
///
/// [`PodError::Exhausted`] when the candidate ends up above `max`.
pub fn next_free<I>(assigned: I, max: u32) -> Result<u32, PodError>
where
    I: IntoIterator<Item = u32>,
{
    let mut candidate: u32 = 1;

    for pod in assigned {
        if pod != candidate {
            break;
        }
        candidate += 1;
    }

    if candidate > max {
        return Err(PodError::Exhausted { max });
    }
    Ok(candidate)
}
