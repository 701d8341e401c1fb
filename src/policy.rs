//! The dispatch policy (`simple_policy`), a pure function over Controller
//! state.

use crate::action::Action;
use crate::building::Building;
use crate::elevator::Elevator;
use crate::types::{Direction, Floor};

fn min_opt(a: Option<Floor>, b: Option<Floor>) -> Option<Floor> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

fn max_opt(a: Option<Floor>, b: Option<Floor>) -> Option<Floor> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Step 1: directional scan along the elevator's current direction.
fn directional_scan(elevator: &Elevator, building: &Building) -> Option<Floor> {
    match elevator.direction {
        Direction::Up => {
            let mut candidate = min_opt(
                elevator.next_car_button_at_or_above(),
                building.next_up_button_at_or_above(elevator.floor),
            );
            if candidate.is_none() {
                if let Some(c) = building.next_down_button_at_or_below(building.floors() - 1) {
                    if c > elevator.floor {
                        candidate = Some(c);
                    }
                }
            }
            candidate
        }
        Direction::Down => {
            let mut candidate = max_opt(
                elevator.next_car_button_at_or_below(),
                building.next_down_button_at_or_below(elevator.floor),
            );
            if candidate.is_none() {
                if let Some(c) = building.next_up_button_at_or_above(0) {
                    if c < elevator.floor {
                        candidate = Some(c);
                    }
                }
            }
            candidate
        }
        Direction::Idle => None,
    }
}

/// Step 2: idle acquisition, closest floor with any hall button pressed.
fn idle_acquisition(elevator: &Elevator, building: &Building) -> Option<Floor> {
    building
        .up_floors()
        .chain(building.down_floors())
        .min_by_key(|&f| (f as i64 - elevator.floor as i64).abs())
}

/// Step 4: peer avoidance, idle elevators only.
fn blocked_by_peer(elevators: &[Elevator], index: usize, candidate: Floor) -> bool {
    let me = &elevators[index];
    debug_assert!(me.direction.is_idle());

    let target_taken = elevators
        .iter()
        .enumerate()
        .any(|(j, e)| j != index && e.target == Some(candidate));
    if target_taken {
        return true;
    }

    let my_distance = (candidate as i64 - me.floor as i64).abs();
    elevators.iter().enumerate().any(|(j, e)| {
        j != index
            && e.direction.is_idle()
            && (candidate as i64 - e.floor as i64).abs() < my_distance
    })
}

/// Step 6: decide the direction to arrive in once the elevator has reached
/// the candidate floor.
fn arrive_direction(elevators: &[Elevator], building: &Building, index: usize) -> Direction {
    let e = &elevators[index];

    let no_buttons_anywhere = building.no_buttons() && elevators.iter().all(|e| e.no_car_buttons());
    if no_buttons_anywhere {
        return Direction::Idle;
    }

    match e.direction {
        Direction::Up => {
            let further = min_opt(
                e.car_button_at_or_above(e.floor + 1),
                building.next_up_button_at_or_above(e.floor + 1),
            );
            if further.is_none() {
                Direction::Down
            } else {
                Direction::Up
            }
        }
        Direction::Down => {
            let further = if e.floor == 0 {
                None
            } else {
                max_opt(
                    e.car_button_at_or_below(e.floor - 1),
                    building.next_down_button_at_or_below(e.floor - 1),
                )
            };
            if further.is_none() {
                Direction::Up
            } else {
                Direction::Down
            }
        }
        Direction::Idle => {
            if building.button(Direction::Up, e.floor) {
                Direction::Up
            } else if building.button(Direction::Down, e.floor) {
                Direction::Down
            } else {
                unreachable!(
                    "idle elevator arrived at {} with no hall button there, \
                     though idle_acquisition only ever candidates a floor with one pressed",
                    e.floor
                )
            }
        }
    }
}

/// Select the next action for elevator `index`.
pub fn simple_policy(elevators: &[Elevator], building: &Building, index: usize) -> Action {
    let elevator = &elevators[index];

    // Step 1 + step 2.
    let candidate = directional_scan(elevator, building).or_else(|| idle_acquisition(elevator, building));

    // Step 3: no work.
    let candidate = match candidate {
        Some(c) => c,
        None => return Action::Stop,
    };

    // Step 4: peer avoidance, idle only.
    if elevator.direction.is_idle() && blocked_by_peer(elevators, index, candidate) {
        return Action::Stop;
    }

    // Step 5: different floor.
    if candidate != elevator.floor {
        return Action::Move { floor: candidate };
    }

    // Step 6: same floor, decide arrival direction.
    Action::Arrive {
        direction: arrive_direction(elevators, building, index),
    }
}
