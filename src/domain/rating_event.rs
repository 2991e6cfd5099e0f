//! Rating recomputation event model.

/// Emitted after any review create, update, or delete touching a tour.
///
/// Carries only the tour id; the worker re-reads the full review set, so
/// events are idempotent and safe to coalesce or replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingEvent {
    pub tour_id: i64,
}
