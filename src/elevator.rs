use crate::types::{Direction, Floor, Request};

/// Per-cabin state: floor, direction, motion flags, occupancy, car buttons,
/// and the per-destination passenger queues.
#[derive(Debug)]
pub struct Elevator {
    floors: usize,
    capacity: usize,
    pub floor: Floor,
    pub direction: Direction,
    pub moving: bool,
    pub arrived: bool,
    pub target: Option<Floor>,
    buttons: Vec<bool>,
    /// Passengers aboard, bucketed by destination floor. Car buttons are
    /// logically unordered, so each bucket is a `Vec` used as a LIFO stack.
    requests: Vec<Vec<Request>>,
}

impl Elevator {
    pub fn new(floors: usize, capacity: usize) -> Self {
        Elevator {
            floors,
            capacity,
            floor: 0,
            direction: Direction::Idle,
            moving: false,
            arrived: false,
            target: None,
            buttons: vec![false; floors],
            requests: (0..floors).map(|_| Vec::new()).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn count(&self) -> usize {
        self.requests.iter().map(Vec::len).sum()
    }

    pub fn button(&self, floor: Floor) -> bool {
        self.buttons[floor]
    }

    pub fn set_button(&mut self, floor: Floor, pressed: bool) {
        self.buttons[floor] = pressed;
    }

    pub fn requests_at(&self, floor: Floor) -> &[Request] {
        &self.requests[floor]
    }

    /// Board a passenger; sets the car button for their destination.
    pub fn board(&mut self, request: Request) {
        let dest = request.end;
        self.requests[dest].push(request);
        self.buttons[dest] = true;
    }

    /// Pop the next passenger to disembark at the current floor, if any.
    pub fn disembark_one(&mut self) -> Option<Request> {
        self.requests[self.floor].pop()
    }

    /// Nearest floor at or above the current floor with a car button pressed.
    pub fn next_car_button_at_or_above(&self) -> Option<Floor> {
        self.car_button_at_or_above(self.floor)
    }

    /// Nearest floor at or below the current floor with a car button pressed.
    pub fn next_car_button_at_or_below(&self) -> Option<Floor> {
        self.car_button_at_or_below(self.floor)
    }

    /// Nearest floor at or above `floor` with a car button pressed.
    pub fn car_button_at_or_above(&self, floor: Floor) -> Option<Floor> {
        (floor..self.floors).find(|&f| self.buttons[f])
    }

    /// Nearest floor at or below `floor` with a car button pressed.
    pub fn car_button_at_or_below(&self, floor: Floor) -> Option<Floor> {
        (0..=floor.min(self.floors.saturating_sub(1))).rev().find(|&f| self.buttons[f])
    }

    /// Every floor with a car button currently pressed.
    pub fn car_floors(&self) -> impl Iterator<Item = Floor> + '_ {
        (0..self.floors).filter(move |&f| self.buttons[f])
    }

    pub fn no_car_buttons(&self) -> bool {
        self.buttons.iter().all(|&b| !b)
    }

    /// Debug-only invariant check.
    #[cfg(debug_assertions)]
    pub fn check_invariants(&self) {
        assert_eq!(
            self.count(),
            self.requests.iter().map(Vec::len).sum::<usize>(),
            "count must equal the sum of per-destination passenger buckets"
        );
        assert!(self.count() <= self.capacity, "elevator over capacity");
        assert!(
            !self.moving || !self.direction.is_idle(),
            "a moving elevator must have a non-idle direction"
        );
        assert!(!self.arrived || !self.moving, "an arrived elevator cannot be moving");
        assert!(self.floor < self.floors, "floor out of range");
    }
}
