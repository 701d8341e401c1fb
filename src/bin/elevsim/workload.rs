//! Synthetic demand generator for the demo binary: a seeded RNG
//! producing a bounded stream of requests for the simulator to consume.
//! Kept entirely out of the library crate, since randomized workload
//! generation is a demo concern, not part of the simulation core.

use elevsim::{Floor, Request, Time};
use rand::Rng;
use rand_distr::Exp;
use rand_seeder::{Seeder, SipRng};

/// One `(fire_time, Request)` pair scheduled onto the simulation clock.
pub struct Arrival {
    pub fire_at: Time,
    pub request: Request,
}

/// Generate `count` arrivals with exponential interarrival times (mean
/// `mean_interarrival`), uniformly random distinct start/end floors.
pub fn generate(seed: &str, floors: usize, count: usize, mean_interarrival: f64) -> Vec<Arrival> {
    let mut rng: SipRng = Seeder::from(seed).make_rng();
    let interarrival = Exp::new(1.0 / mean_interarrival).expect("mean_interarrival must be positive");

    let mut now = 0.0f64;
    let mut arrivals = Vec::with_capacity(count);
    for name in 0..count {
        now += rng.sample(interarrival);
        let (start, end) = distinct_floors(&mut rng, floors);
        arrivals.push(Arrival {
            fire_at: Time(now),
            request: Request::new(name, start, end),
        });
    }
    arrivals
}

fn distinct_floors(rng: &mut SipRng, floors: usize) -> (Floor, Floor) {
    let start = rng.gen_range(0..floors);
    loop {
        let end = rng.gen_range(0..floors);
        if end != start {
            return (start, end);
        }
    }
}
