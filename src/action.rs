use crate::types::{Direction, Floor};

/// The dispatch policy's verdict for one elevator.
///
/// Deliberately a plain tagged union rather than a trait object: the
/// Controller's dispatch is a single `match`, and there's only ever a
/// handful of variants, so virtual dispatch buys nothing here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop at the current floor, open doors, and service passengers.
    Arrive { direction: Direction },
    /// Travel towards `floor`, one floor at a time.
    Move { floor: Floor },
    /// No work: go idle and wait for a wake-up event.
    Stop,
}
