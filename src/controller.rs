//! The dispatch controller: owns the building and the fleet, drives each
//! elevator's per-floor action loop, and reacts to new requests as they
//! arrive. One event at a time, mutate shared state, reschedule. Every
//! suspension point an elevator passes through is an explicit `Phase`
//! variant rather than a generator `yield`, so the whole machine advances
//! through plain function calls.

use tracing::{debug, info, instrument};

use crate::action::Action;
use crate::building::Building;
use crate::config::SimConstants;
use crate::elevator::Elevator;
use crate::engine::{EndCondition, Engine};
use crate::error::{ErrorKind, Kind, Result};
use crate::policy::simple_policy;
use crate::types::{Direction, Duration, Floor, Request, Time};

/// Events the controller schedules on the clock. `WorkloadArrival` is the
/// hook external request generators use to inject traffic onto the same
/// timeline as the elevators' own suspensions.
#[derive(Debug, Clone)]
pub enum SimEvent {
    ElevatorTimer { index: usize },
    DoorWaitElapsed { index: usize, generation: u64 },
    SkipFloorRepress { index: usize, floor: Floor, direction: Direction },
    WorkloadArrival(Request),
}

/// Where in its current action an elevator is paused, replacing the
/// coroutine pause-points a generator-based engine would use.
#[derive(Debug, Clone, Copy)]
enum Phase {
    /// About to ask the policy for a new action.
    Ready,
    /// Idle, parked, waiting for a new request to resolve its wake-up.
    Parked,
    Stopping,
    MoveWaitingAccel { direction: Direction },
    MoveWaitingVelocity { direction: Direction },
    ArriveDecelerating,
    ArriveDoorOpening,
    ArriveDisembarking,
    ArriveEmbarking,
    ArriveDoorWaiting { at_capacity: bool },
    ArriveDoorClosing { at_capacity: bool },
}

/// Owns the building, the fleet, and the per-elevator dispatch loop.
pub struct Controller {
    building: Building,
    elevators: Vec<Elevator>,
    phases: Vec<Phase>,
    door_generation: Vec<u64>,
    waiting_for_wake: Vec<bool>,
    constants: SimConstants,
    on_exit: Box<dyn FnMut(Request)>,
}

impl Controller {
    pub fn new(constants: SimConstants) -> Self {
        let elevators: Vec<_> = (0..constants.elevator_count)
            .map(|_| Elevator::new(constants.floors, constants.capacity))
            .collect();
        let phases = vec![Phase::Ready; elevators.len()];
        let door_generation = vec![0; elevators.len()];
        let waiting_for_wake = vec![false; elevators.len()];

        Controller {
            building: Building::new(constants.floors),
            elevators,
            phases,
            door_generation,
            waiting_for_wake,
            constants,
            on_exit: Box::new(|_| {}),
        }
    }

    pub fn building(&self) -> &Building {
        &self.building
    }

    pub fn elevators(&self) -> &[Elevator] {
        &self.elevators
    }

    /// Register a callback invoked with each request as it disembarks at
    /// its destination, for a demo binary to observe and report on.
    pub fn on_exit(&mut self, f: impl FnMut(Request) + 'static) {
        self.on_exit = Box::new(f);
    }

    /// Kick off every elevator's dispatch loop. Called once before the
    /// engine starts draining events.
    pub fn spawn(&mut self, engine: &mut Engine<SimEvent>) {
        let now = engine.now();
        for index in 0..self.elevators.len() {
            self.begin_action(index, now, engine);
        }
    }

    /// Inject a new hall/car request. Rejects a request whose start and
    /// end floor coincide or that names a floor outside `[0, floors)`,
    /// per spec's "invalid request" error kind, without mutating any
    /// state.
    #[instrument(skip(self, engine), fields(start = request.start, end = request.end))]
    pub fn new_request(&mut self, mut request: Request, now: Time, engine: &mut Engine<SimEvent>) -> Result<()> {
        self.validate_request(&request)?;

        request.wait(now);
        let direction = request.direction();
        let start = request.start;

        info!("new request");
        self.building.push_request(direction, request);

        if self.needs_button(engine, now, direction, start) {
            self.building.set_button(direction, start, true);
        }

        self.resolve_wakeups(now, engine);
        Ok(())
    }

    fn validate_request(&self, request: &Request) -> Result<()> {
        let floors = self.building.floors();
        if request.start == request.end {
            return Err(anyhow::anyhow!("request start and end floor must differ, got {}", request.start))
                .kind(ErrorKind::InvalidRequest);
        }
        if request.start >= floors || request.end >= floors {
            return Err(anyhow::anyhow!(
                "request floor out of range [0, {}): start={}, end={}",
                floors,
                request.start,
                request.end
            ))
            .kind(ErrorKind::InvalidRequest);
        }
        Ok(())
    }

    /// Central event dispatch, called by the engine for each popped event.
    pub fn handle(&mut self, engine: &mut Engine<SimEvent>, event: SimEvent) {
        let now = engine.now();
        match event {
            SimEvent::ElevatorTimer { index } => self.on_timer(index, now, engine),
            SimEvent::DoorWaitElapsed { index, generation } => {
                if generation == self.door_generation[index] {
                    if let Phase::ArriveDoorWaiting { at_capacity } = self.phases[index] {
                        self.close_doors(index, now, engine, at_capacity);
                    }
                }
            }
            SimEvent::SkipFloorRepress { index: _, floor, direction } => {
                let needed = self.needs_button(engine, now, direction, floor);
                self.building.set_button(direction, floor, needed);
            }
            SimEvent::WorkloadArrival(request) => {
                if let Err(err) = self.new_request(request, now, engine) {
                    tracing::error!(%err, "dropping invalid workload-generated request");
                }
            }
        }
    }

    // ---- policy dispatch ----

    fn begin_action(&mut self, index: usize, now: Time, engine: &mut Engine<SimEvent>) {
        let action = simple_policy(&self.elevators, &self.building, index);
        debug!(?action, elevator = index, "action chosen");
        match action {
            Action::Stop => self.begin_stop(index, now, engine),
            Action::Move { floor } => self.begin_move(index, floor, now, engine),
            Action::Arrive { direction } => self.begin_arrive(index, direction, now, engine),
        }
    }

    fn begin_stop(&mut self, index: usize, now: Time, engine: &mut Engine<SimEvent>) {
        self.elevators[index].target = None;
        if self.elevators[index].moving {
            self.phases[index] = Phase::Stopping;
            engine.timeout(self.constants.t_accel(), SimEvent::ElevatorTimer { index });
        } else {
            self.park(index);
            let _ = now;
        }
    }

    fn park(&mut self, index: usize) {
        let e = &mut self.elevators[index];
        e.direction = Direction::Idle;
        e.moving = false;
        self.phases[index] = Phase::Parked;
        self.waiting_for_wake[index] = true;
    }

    /// A single one-floor hop towards `floor`.
    fn begin_move(&mut self, index: usize, floor: Floor, now: Time, engine: &mut Engine<SimEvent>) {
        let e = &mut self.elevators[index];
        let step = floor as i64 - e.floor as i64;
        let step_direction = Direction::from_sign(step.signum() as i32);
        assert!(!step_direction.is_idle(), "Move precondition: target floor differs");

        e.target = Some(floor);
        let _ = now;

        if e.moving && e.direction != step_direction {
            assert_eq!((e.direction.sign() - step_direction.sign()).abs(), 2, "reversal must flip sign");
            self.phases[index] = Phase::MoveWaitingAccel { direction: step_direction };
            engine.timeout(Duration(self.constants.t_accel * 2.0), SimEvent::ElevatorTimer { index });
        } else if !e.moving {
            self.phases[index] = Phase::MoveWaitingAccel { direction: step_direction };
            engine.timeout(self.constants.t_accel(), SimEvent::ElevatorTimer { index });
        } else {
            self.phases[index] = Phase::MoveWaitingVelocity { direction: step_direction };
            engine.timeout(self.constants.t_velocity(), SimEvent::ElevatorTimer { index });
        }
    }

    /// Preliminary synchronous updates on arriving at a floor.
    fn begin_arrive(&mut self, index: usize, direction: Direction, now: Time, engine: &mut Engine<SimEvent>) {
        let e = &mut self.elevators[index];
        e.arrived = true;
        let floor = e.floor;
        e.set_button(floor, false);
        e.direction = direction;
        e.target = Some(floor);
        let moving = e.moving;

        if !direction.is_idle() {
            self.building.set_button(direction, floor, false);
        }

        if moving {
            self.phases[index] = Phase::ArriveDecelerating;
            engine.timeout(self.constants.t_accel(), SimEvent::ElevatorTimer { index });
        } else {
            self.phases[index] = Phase::ArriveDoorOpening;
            engine.timeout(self.constants.t_door(), SimEvent::ElevatorTimer { index });
        }
        let _ = now;
    }

    fn on_timer(&mut self, index: usize, now: Time, engine: &mut Engine<SimEvent>) {
        match self.phases[index] {
            Phase::Ready | Phase::Parked => {
                unreachable!("no timer can be outstanding while ready or parked")
            }
            Phase::ArriveDoorWaiting { .. } => {
                unreachable!("door-wait completion arrives as DoorWaitElapsed, not ElevatorTimer")
            }
            Phase::Stopping => {
                self.elevators[index].moving = false;
                self.park(index);
            }
            Phase::MoveWaitingAccel { direction } => {
                let e = &mut self.elevators[index];
                e.moving = true;
                e.direction = direction;
                self.phases[index] = Phase::MoveWaitingVelocity { direction };
                engine.timeout(self.constants.t_velocity(), SimEvent::ElevatorTimer { index });
            }
            Phase::MoveWaitingVelocity { direction } => {
                let e = &mut self.elevators[index];
                e.floor = (e.floor as i64 + direction.sign() as i64) as usize;
                self.phases[index] = Phase::Ready;
                self.begin_action(index, now, engine);
            }
            Phase::ArriveDecelerating => {
                self.elevators[index].moving = false;
                self.phases[index] = Phase::ArriveDoorOpening;
                engine.timeout(self.constants.t_door(), SimEvent::ElevatorTimer { index });
            }
            Phase::ArriveDoorOpening => {
                self.service_step(index, now, engine);
            }
            Phase::ArriveDisembarking => {
                if let Some(mut r) = self.elevators[index].disembark_one() {
                    r.exit(now);
                    debug!(request = %r, "disembark");
                    (self.on_exit)(r);
                }
                self.service_step(index, now, engine);
            }
            Phase::ArriveEmbarking => {
                let floor = self.elevators[index].floor;
                let direction = self.elevators[index].direction;
                if let Some(r) = self.building.requests_mut(direction, floor).pop_front() {
                    debug!(request = %r, "embark");
                    self.elevators[index].board(r);
                }
                self.service_step(index, now, engine);
            }
            Phase::ArriveDoorClosing { at_capacity } => {
                if at_capacity {
                    let direction = self.elevators[index].direction;
                    let floor = self.elevators[index].floor;
                    self.building.set_button(direction, floor, false);
                    engine.timeout(Duration(1.0), SimEvent::SkipFloorRepress { index, floor, direction });
                }
                self.phases[index] = Phase::Ready;
                self.begin_action(index, now, engine);
            }
        }
    }

    /// The disembark/embark service loop, one
    /// `t_person` step at a time.
    fn service_step(&mut self, index: usize, now: Time, engine: &mut Engine<SimEvent>) {
        let floor = self.elevators[index].floor;

        if !self.elevators[index].requests_at(floor).is_empty() {
            self.phases[index] = Phase::ArriveDisembarking;
            engine.timeout(self.constants.t_person(), SimEvent::ElevatorTimer { index });
            return;
        }

        let direction = self.elevators[index].direction;
        if !direction.is_idle() {
            let can_board = !self.building.requests(direction, floor).is_empty()
                && self.elevators[index].count() < self.elevators[index].capacity();
            if can_board {
                self.phases[index] = Phase::ArriveEmbarking;
                engine.timeout(self.constants.t_person(), SimEvent::ElevatorTimer { index });
                return;
            }
        }

        let at_capacity = !direction.is_idle() && !self.building.requests(direction, floor).is_empty();
        self.enter_door_wait(index, now, engine, at_capacity);
    }

    fn enter_door_wait(&mut self, index: usize, _now: Time, engine: &mut Engine<SimEvent>, at_capacity: bool) {
        self.door_generation[index] += 1;
        let generation = self.door_generation[index];
        self.phases[index] = Phase::ArriveDoorWaiting { at_capacity };
        engine.timeout(self.constants.t_door_wait(), SimEvent::DoorWaitElapsed { index, generation });
    }

    fn close_doors(&mut self, index: usize, _now: Time, engine: &mut Engine<SimEvent>, at_capacity: bool) {
        self.elevators[index].arrived = false;
        self.phases[index] = Phase::ArriveDoorClosing { at_capacity };
        engine.timeout(self.constants.t_door(), SimEvent::ElevatorTimer { index });
    }

    /// `true` unless another elevator is already
    /// arrived at `floor` heading `direction`, or idle there (in which
    /// case it is promoted to `direction` and, if mid-dwell, interrupted).
    fn needs_button(&mut self, engine: &mut Engine<SimEvent>, now: Time, direction: Direction, floor: Floor) -> bool {
        if self.building.button(direction, floor) {
            return false;
        }

        for j in 0..self.elevators.len() {
            let matches = {
                let e = &self.elevators[j];
                e.arrived && e.floor == floor && (e.direction == direction || e.direction.is_idle())
            };
            if matches {
                if self.elevators[j].direction.is_idle() {
                    self.elevators[j].direction = direction;
                }
                self.interrupt_door(j, now, engine);
                return false;
            }
        }

        true
    }

    fn interrupt_door(&mut self, index: usize, now: Time, engine: &mut Engine<SimEvent>) {
        if matches!(self.phases[index], Phase::ArriveDoorWaiting { .. }) {
            self.door_generation[index] += 1;
            self.service_step(index, now, engine);
        }
    }

    fn resolve_wakeups(&mut self, now: Time, engine: &mut Engine<SimEvent>) {
        for index in 0..self.elevators.len() {
            if self.waiting_for_wake[index] {
                self.waiting_for_wake[index] = false;
                self.phases[index] = Phase::Ready;
                self.begin_action(index, now, engine);
            }
        }
    }
}

/// Couples a `Controller` with its clock, for convenient driving from
/// tests and the demo binary.
pub struct Simulator {
    pub engine: Engine<SimEvent>,
    pub controller: Controller,
}

impl Simulator {
    pub fn new(constants: SimConstants) -> Self {
        let mut engine = Engine::new();
        let mut controller = Controller::new(constants);
        controller.spawn(&mut engine);
        Simulator { engine, controller }
    }

    pub fn new_request_now(&mut self, request: Request) -> Result<()> {
        let now = self.engine.now();
        self.controller.new_request(request, now, &mut self.engine)
    }

    pub fn schedule_request(&mut self, fire_at: Time, request: Request) {
        self.engine.schedule_at(fire_at, SimEvent::WorkloadArrival(request));
    }

    pub fn run(&mut self, until: EndCondition) {
        let controller = &mut self.controller;
        self.engine.run(until, |engine, event| controller.handle(engine, event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn constants(floors: usize, elevator_count: usize, capacity: usize) -> SimConstants {
        SimConstants {
            floors,
            elevator_count,
            capacity,
            t_velocity: 1.0,
            t_accel: 1.0,
            t_door: 1.0,
            t_door_wait: 1.0,
            t_person: 1.0,
            seed: None,
            output_dir: None,
        }
    }

    #[test]
    fn idle_fleet_parks_immediately_with_no_requests() {
        let mut sim = Simulator::new(constants(10, 2, 4));
        sim.run(EndCondition::NoEvents);
        assert_eq!(sim.engine.now(), Time(0.0));
        for e in sim.controller.elevators() {
            assert!(!e.moving);
            assert!(e.direction.is_idle());
        }
    }

    #[test]
    fn request_at_the_elevators_own_floor_completes_with_exact_timing() {
        let exits: Rc<RefCell<Vec<Request>>> = Rc::new(RefCell::new(vec![]));
        let exits_clone = exits.clone();

        let mut sim = Simulator::new(constants(10, 1, 4));
        sim.controller.on_exit(move |r| exits_clone.borrow_mut().push(r));

        sim.new_request_now(Request::new(0, 0, 3)).unwrap();
        sim.run(EndCondition::NoEvents);

        let exits = exits.borrow();
        assert_eq!(exits.len(), 1);
        assert_eq!(exits[0].start, 0);
        assert_eq!(exits[0].end, 3);
        assert!(exits[0].latency().unwrap() > Duration(0.0));

        // With every constant set to 1.0, the full trip is eleven unit
        // steps: door open, embark, door-wait, door close, accelerate,
        // three floors at constant velocity, decelerate, door open,
        // disembark.
        assert_eq!(exits[0].end_time.unwrap(), Time(11.0));
    }

    #[test]
    fn request_requiring_travel_eventually_completes() {
        let exits: Rc<RefCell<Vec<Request>>> = Rc::new(RefCell::new(vec![]));
        let exits_clone = exits.clone();

        let mut sim = Simulator::new(constants(10, 1, 4));
        sim.controller.on_exit(move |r| exits_clone.borrow_mut().push(r));

        sim.new_request_now(Request::new(0, 6, 2)).unwrap();
        sim.run(EndCondition::Time { max: Time(200.0) });

        let exits = exits.borrow();
        assert_eq!(exits.len(), 1);
        assert_eq!(exits[0].start, 6);
        assert_eq!(exits[0].end, 2);
        assert!(exits[0].end_time.unwrap() > exits[0].start_time.unwrap());
    }

    #[test]
    fn capacity_overflow_leaves_a_passenger_behind_then_serves_them() {
        let exits: Rc<RefCell<Vec<Request>>> = Rc::new(RefCell::new(vec![]));
        let exits_clone = exits.clone();

        let mut sim = Simulator::new(constants(10, 1, 1));
        sim.controller.on_exit(move |r| exits_clone.borrow_mut().push(r));

        sim.new_request_now(Request::new(0, 0, 5)).unwrap();
        sim.new_request_now(Request::new(1, 0, 9)).unwrap();
        sim.run(EndCondition::Time { max: Time(500.0) });

        let exits = exits.borrow();
        assert_eq!(exits.len(), 2);
        assert!(exits.iter().any(|r| r.name == 0 && r.end == 5));
        assert!(exits.iter().any(|r| r.name == 1 && r.end == 9));
    }

    #[test]
    fn door_interrupt_lets_a_newcomer_board_before_close() {
        let exits: Rc<RefCell<Vec<Request>>> = Rc::new(RefCell::new(vec![]));
        let exits_clone = exits.clone();

        let mut sim = Simulator::new(constants(10, 1, 4));
        sim.controller.on_exit(move |r| exits_clone.borrow_mut().push(r));

        sim.new_request_now(Request::new(0, 3, 7)).unwrap();
        // Fires mid-dwell: t_door (open) + t_person (embark) elapses at t=2,
        // then door_wait runs for t_door_wait=1 more, closing at t=3.
        sim.schedule_request(Time(2.5), Request::new(1, 3, 8));
        sim.run(EndCondition::Time { max: Time(200.0) });

        let exits = exits.borrow();
        assert_eq!(exits.len(), 2);
    }

    #[test]
    fn new_request_rejects_same_floor_start_and_end() {
        let mut sim = Simulator::new(constants(10, 1, 4));
        let err = sim.new_request_now(Request::new(0, 4, 4)).unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidRequest(_)));
    }

    #[test]
    fn new_request_rejects_out_of_range_floor() {
        let mut sim = Simulator::new(constants(10, 1, 4));
        let err = sim.new_request_now(Request::new(0, 0, 10)).unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidRequest(_)));
    }

    /// spec.md §8's "Reversal" boundary case, exercised through
    /// `begin_move`'s own `2 * t_accel` branch rather than through
    /// `arrive_direction` flipping (already covered in `policy.rs`):
    /// an elevator already moving up, with nothing left ahead of it but
    /// a hall call behind it, must decelerate and re-accelerate — twice
    /// the ordinary per-hop cost — before its floor changes.
    #[test]
    fn reversal_mid_move_waits_for_two_accelerations() {
        let mut sim = Simulator::new(constants(20, 1, 4));

        {
            let e = &mut sim.controller.elevators[0];
            e.floor = 5;
            e.direction = Direction::Up;
            e.moving = true;
        }
        sim.controller.phases[0] = Phase::Ready;
        sim.controller.building.set_button(Direction::Down, 2, true);
        sim.controller.building.push_request(Direction::Down, Request::new(99, 2, 0));

        let now = sim.engine.now();
        sim.controller.begin_action(0, now, &mut sim.engine);

        let mut decel_time = None;
        let controller = &mut sim.controller;
        sim.engine.run(EndCondition::NoEvents, |engine, event| {
            let before = controller.elevators()[0].floor;
            controller.handle(engine, event);
            let after = controller.elevators()[0].floor;
            if decel_time.is_none() && before == 5 && after == 4 {
                decel_time = Some(engine.now());
            }
        });

        assert_eq!(decel_time, Some(Time(2.0 * 1.0 + 1.0)));
    }
}
