use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use derive_more::{Deref, DerefMut, Display, From};
use serde::{Deserialize, Serialize};

/// A point in simulated time.
#[derive(Debug, Clone, Copy, Default, From, Display, Deref, DerefMut, Serialize, Deserialize)]
pub struct Time(pub f64);

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0).is_eq()
    }
}

impl Eq for Time {}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.0.total_cmp(&other.0))
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap()
    }
}

/// A duration of simulated time.
#[derive(Debug, Clone, Copy, Default, From, Display, Deref, DerefMut, Serialize, Deserialize)]
pub struct Duration(pub f64);

impl PartialEq for Duration {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0).is_eq()
    }
}

impl Eq for Duration {}

impl PartialOrd for Duration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.0.total_cmp(&other.0))
    }
}

impl Ord for Duration {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap()
    }
}

impl Add<Duration> for Time {
    type Output = Time;

    fn add(self, rhs: Duration) -> Self::Output {
        Time(self.0 + rhs.0)
    }
}

impl AddAssign<Duration> for Time {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs.0;
    }
}

impl Sub<Duration> for Time {
    type Output = Time;

    fn sub(self, rhs: Duration) -> Self::Output {
        Time(self.0 - rhs.0)
    }
}

impl SubAssign<Duration> for Time {
    fn sub_assign(&mut self, rhs: Duration) {
        self.0 -= rhs.0;
    }
}

impl Sub for Time {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        Duration(self.0 - rhs.0)
    }
}

/// A floor index, `[0, floors)`.
pub type Floor = usize;

/// Travel direction: up, idle, or down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Down,
    #[default]
    Idle,
    Up,
}

impl Direction {
    pub fn sign(self) -> i32 {
        match self {
            Direction::Down => -1,
            Direction::Idle => 0,
            Direction::Up => 1,
        }
    }

    pub fn from_sign(sign: i32) -> Self {
        match sign.cmp(&0) {
            Ordering::Less => Direction::Down,
            Ordering::Equal => Direction::Idle,
            Ordering::Greater => Direction::Up,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Down => Direction::Up,
            Direction::Idle => Direction::Idle,
            Direction::Up => Direction::Down,
        }
    }

    pub fn is_idle(self) -> bool {
        matches!(self, Direction::Idle)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Down => write!(f, "down"),
            Direction::Idle => write!(f, "idle"),
            Direction::Up => write!(f, "up"),
        }
    }
}

/// A passenger trip from `start` to `end`, tracked from hall-button press
/// to drop-off.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    /// Monotonically increasing identifier, for observability only.
    pub name: usize,
    pub start: Floor,
    pub end: Floor,
    /// Set when the request joins a building queue.
    pub start_time: Option<Time>,
    /// Set on exit at destination.
    pub end_time: Option<Time>,
}

impl Request {
    pub fn new(name: usize, start: Floor, end: Floor) -> Self {
        Request {
            name,
            start,
            end,
            start_time: None,
            end_time: None,
        }
    }

    pub fn direction(&self) -> Direction {
        Direction::from_sign((self.end as i64 - self.start as i64).signum() as i32)
    }

    pub fn wait(&mut self, now: Time) {
        self.start_time = Some(now);
    }

    pub fn exit(&mut self, now: Time) {
        self.end_time = Some(now);
    }

    pub fn latency(&self) -> Option<Duration> {
        match (self.start_time, self.end_time) {
            (Some(s), Some(e)) => Some(e - s),
            _ => None,
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Request#{}({} -> {})", self.name, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_from_request() {
        let r = Request::new(0, 3, 7);
        assert_eq!(r.direction(), Direction::Up);
        let r = Request::new(1, 7, 3);
        assert_eq!(r.direction(), Direction::Down);
    }

    #[test]
    fn latency_needs_both_timestamps() {
        let mut r = Request::new(0, 0, 1);
        assert!(r.latency().is_none());
        r.wait(Time(1.0));
        assert!(r.latency().is_none());
        r.exit(Time(3.5));
        assert_eq!(r.latency(), Some(Duration(2.5)));
    }

    #[test]
    fn time_ordering_uses_total_cmp() {
        let a = Time(1.0);
        let b = Time(2.0);
        assert!(a < b);
        assert_eq!(a + Duration(1.0), b);
        assert_eq!(b - a, Duration(1.0));
    }
}
