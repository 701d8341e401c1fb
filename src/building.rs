use std::collections::VecDeque;

use crate::types::{Direction, Floor, Request};

/// Per-floor up/down hall buttons and the FIFO queues of requests waiting
/// on each.
#[derive(Debug)]
pub struct Building {
    floors: usize,
    up_buttons: Vec<bool>,
    down_buttons: Vec<bool>,
    up_requests: Vec<VecDeque<Request>>,
    down_requests: Vec<VecDeque<Request>>,
}

impl Building {
    pub fn new(floors: usize) -> Self {
        Building {
            floors,
            up_buttons: vec![false; floors],
            down_buttons: vec![false; floors],
            up_requests: (0..floors).map(|_| VecDeque::new()).collect(),
            down_requests: (0..floors).map(|_| VecDeque::new()).collect(),
        }
    }

    pub fn floors(&self) -> usize {
        self.floors
    }

    pub fn buttons(&self, direction: Direction) -> &[bool] {
        match direction {
            Direction::Up => &self.up_buttons,
            Direction::Down => &self.down_buttons,
            Direction::Idle => panic!("buttons queried with idle direction"),
        }
    }

    pub fn button(&self, direction: Direction, floor: Floor) -> bool {
        match direction {
            Direction::Up => self.up_buttons[floor],
            Direction::Down => self.down_buttons[floor],
            Direction::Idle => false,
        }
    }

    pub fn set_button(&mut self, direction: Direction, floor: Floor, pressed: bool) {
        match direction {
            Direction::Up => self.up_buttons[floor] = pressed,
            Direction::Down => self.down_buttons[floor] = pressed,
            Direction::Idle => {}
        }
    }

    pub fn requests(&self, direction: Direction, floor: Floor) -> &VecDeque<Request> {
        match direction {
            Direction::Up => &self.up_requests[floor],
            Direction::Down => &self.down_requests[floor],
            Direction::Idle => panic!("requests queried with idle direction"),
        }
    }

    pub fn requests_mut(&mut self, direction: Direction, floor: Floor) -> &mut VecDeque<Request> {
        match direction {
            Direction::Up => &mut self.up_requests[floor],
            Direction::Down => &mut self.down_requests[floor],
            Direction::Idle => panic!("requests queried with idle direction"),
        }
    }

    pub fn push_request(&mut self, direction: Direction, request: Request) {
        self.requests_mut(direction, request.start).push_back(request);
    }

    /// Nearest floor at or above `floor` with its up button pressed.
    pub fn next_up_button_at_or_above(&self, floor: Floor) -> Option<Floor> {
        (floor..self.floors).find(|&f| self.up_buttons[f])
    }

    /// Nearest floor at or below `floor` with its down button pressed.
    pub fn next_down_button_at_or_below(&self, floor: Floor) -> Option<Floor> {
        (0..=floor).rev().find(|&f| self.down_buttons[f])
    }

    /// Every floor with an up button currently pressed.
    pub fn up_floors(&self) -> impl Iterator<Item = Floor> + '_ {
        (0..self.floors).filter(move |&f| self.up_buttons[f])
    }

    /// Every floor with a down button currently pressed.
    pub fn down_floors(&self) -> impl Iterator<Item = Floor> + '_ {
        (0..self.floors).filter(move |&f| self.down_buttons[f])
    }

    /// `true` if no hall button is pressed anywhere in the building.
    pub fn no_buttons(&self) -> bool {
        self.up_buttons.iter().all(|&b| !b) && self.down_buttons.iter().all(|&b| !b)
    }
}
