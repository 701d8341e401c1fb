//! End-to-end scenario tests driving the full engine/controller stack,
//! complementing the per-module unit tests in `src/`. These exercise
//! whole-run behavior (determinism, capacity, peer avoidance) rather
//! than a single policy decision.

use std::cell::RefCell;
use std::rc::Rc;

use elevsim::config::SimConstants;
use elevsim::engine::EndCondition;
use elevsim::{Request, Simulator, Time};

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

fn run_to_completion(constants: SimConstants, arrivals: Vec<(f64, Request)>, bound: f64) -> Vec<Request> {
    let completed = Rc::new(RefCell::new(Vec::new()));
    let sink = completed.clone();

    let mut sim = Simulator::new(constants);
    sim.controller.on_exit(move |r| sink.borrow_mut().push(r));

    for (fire_at, request) in arrivals {
        sim.schedule_request(Time(fire_at), request);
    }
    sim.run(EndCondition::Time { max: Time(bound) });

    Rc::try_unwrap(completed).unwrap().into_inner()
}

#[test]
fn every_request_in_a_multi_elevator_fleet_eventually_completes() {
    let arrivals = vec![
        (0.0, Request::new(0, 0, 9)),
        (1.0, Request::new(1, 9, 0)),
        (2.0, Request::new(2, 4, 2)),
        (3.0, Request::new(3, 2, 8)),
        (10.0, Request::new(4, 6, 1)),
    ];

    let completed = run_to_completion(constants(10, 3, 6), arrivals, 1000.0);

    assert_eq!(completed.len(), 5);
    for r in &completed {
        let latency = r.latency().expect("completed request must have both timestamps");
        assert!(latency > elevsim::Duration(0.0));
    }
}

#[test]
fn identical_seeded_runs_are_deterministic() {
    let arrivals = || {
        vec![
            (0.0, Request::new(0, 1, 7)),
            (2.0, Request::new(1, 7, 1)),
            (2.0, Request::new(2, 3, 9)),
            (5.0, Request::new(3, 9, 0)),
        ]
    };

    let first = run_to_completion(constants(10, 2, 4), arrivals(), 500.0);
    let second = run_to_completion(constants(10, 2, 4), arrivals(), 500.0);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.start_time, b.start_time);
        assert_eq!(a.end_time, b.end_time);
    }
}

#[test]
fn never_exceeds_configured_capacity() {
    let arrivals = vec![
        (0.0, Request::new(0, 0, 5)),
        (0.0, Request::new(1, 0, 6)),
        (0.0, Request::new(2, 0, 7)),
        (0.1, Request::new(3, 0, 8)),
    ];

    let completed = Rc::new(RefCell::new(Vec::new()));
    let sink = completed.clone();

    let mut sim = Simulator::new(constants(10, 1, 2));
    sim.controller.on_exit(move |r| sink.borrow_mut().push(r));

    for (fire_at, request) in arrivals {
        sim.schedule_request(Time(fire_at), request);
    }

    // Drive the engine one event at a time, re-checking the capacity
    // invariant after every dispatched event, not just once the run
    // has finished.
    let controller = &mut sim.controller;
    sim.engine.run(EndCondition::Time { max: Time(500.0) }, |engine, event| {
        controller.handle(engine, event);
        for e in controller.elevators() {
            assert!(
                e.count() <= e.capacity(),
                "elevator carried {} passengers against a capacity of {}",
                e.count(),
                e.capacity()
            );
        }
    });

    let completed = completed.borrow();
    assert_eq!(completed.len(), 4);
}

#[test]
fn peer_elevators_do_not_converge_on_the_same_hall_call() {
    let arrivals = vec![(0.0, Request::new(0, 19, 0))];
    let completed = run_to_completion(constants(20, 2, 4), arrivals, 500.0);
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].start, 19);
    assert_eq!(completed[0].end, 0);
}
