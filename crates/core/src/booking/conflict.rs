//! Interval conflict checking for room reservations.
//!
//! Reservations occupy half-open intervals `[start, end)`: a reservation
//! ending exactly when another starts does not conflict with it. The
//! checker only ever sees intervals of *active* reservations for one room;
//! filtering by room and activity is the caller's query concern.

use chrono::{DateTime, Utc};

use stanza_shared::types::ReservationId;

/// The occupied interval of one active reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookedInterval {
    /// The reservation occupying the interval.
    pub reservation_id: ReservationId,
    /// Inclusive start of the stay.
    pub start: DateTime<Utc>,
    /// Exclusive end of the stay.
    pub end: DateTime<Utc>,
}

/// Returns true when two half-open intervals `[s1, e1)` and `[s2, e2)`
/// overlap.
///
/// Abutting intervals (`e1 == s2` or `e2 == s1`) do not overlap.
#[must_use]
pub fn intervals_overlap(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && s2 < e1
}

/// Returns true when the candidate interval overlaps any of the given
/// booked intervals.
///
/// `exclude` skips one reservation from the comparison set; an update must
/// not conflict with the reservation it is modifying.
///
/// Precondition: `start < end`, enforced by input validation before this
/// check runs.
#[must_use]
pub fn has_conflict(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    booked: &[BookedInterval],
    exclude: Option<ReservationId>,
) -> bool {
    booked
        .iter()
        .filter(|b| exclude != Some(b.reservation_id))
        .any(|b| intervals_overlap(start, end, b.start, b.end))
}
