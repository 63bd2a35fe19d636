//! Pedestrian and car behavior validation
//!
//! Exercises both population managers directly, then runs a fully scripted
//! end-to-end cycle through the world: one car stopped by the light and one
//! pedestrian queued, pressed, and crossed.

use std::io::Cursor;

use crosswalk_sim::simulation::{
    CarId, CarManager, EventKind, LightState, LightTrigger, PedId, PedManager, PseudoRandom,
    Scheduler, SimCar, SimConfig, SimLight, SimPed, SimWorld, TraceStream, Welford,
    CAR_SPEED_MAX, CAR_SPEED_MIN, IMPATIENCE_INTERVAL, YELLOW_DURATION,
};

/// In-memory trace stream yielding exactly the given draws
fn scripted(values: &[f64]) -> TraceStream<Cursor<String>> {
    let text = values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    TraceStream::new(Cursor::new(text))
}

/// Drive a fresh light into RED, with walk expiry at `red_start` + red duration
fn red_light(red_start: f64, config: &SimConfig) -> SimLight {
    let mut light = SimLight::new();
    light.apply(LightTrigger::Press, red_start - config.yellow_duration, config);
    light.apply(LightTrigger::TimerExpire, red_start, config);
    assert_eq!(light.state(), LightState::Red);
    light
}

#[test]
fn test_ped_travel_times() {
    let config = SimConfig::new();
    let ped = SimPed::new(PedId(1), 0.0, 4.0, &config);
    assert_eq!(ped.time_to_button, 94.0);
    assert_eq!(ped.crossing_time, 11.5);
}

#[test]
fn test_ped_spawn_schedules_arrival() {
    let config = SimConfig::new();
    let mut peds = PedManager::new();
    let mut scheduler = Scheduler::new();

    peds.spawn(SimPed::new(PedId(1), 0.0, 4.0, &config), &mut scheduler);
    assert_eq!(peds.walking().len(), 1);
    assert_eq!(scheduler.len(), 1);

    let event = scheduler.pop_next().unwrap();
    assert_eq!(event.kind, EventKind::PedArrive(PedId(1)));
    assert_eq!(event.at, 94.0);
}

#[test]
fn test_arrive_during_green_joins_queue() {
    let config = SimConfig::new();
    let light = SimLight::new();
    let mut peds = PedManager::new();
    let mut scheduler = Scheduler::new();
    let mut delays = Welford::new();
    let mut button = scripted(&[1.0]);

    peds.spawn(SimPed::new(PedId(1), 0.0, 4.0, &config), &mut scheduler);
    scheduler.pop_next();

    let pressed = peds.arrive(
        PedId(1),
        &light,
        &mut scheduler,
        &mut delays,
        &mut button,
        &config,
    );
    assert!(pressed);
    assert!(peds.walking().is_empty());
    assert_eq!(peds.waiting().len(), 1);
    assert_eq!(delays.count(), 0);

    let event = scheduler.pop_next().unwrap();
    assert_eq!(event.kind, EventKind::PedImpatient(PedId(1)));
    assert_eq!(event.at, 94.0 + IMPATIENCE_INTERVAL);
}

#[test]
fn test_arrive_with_declined_press_still_queues() {
    let config = SimConfig::new();
    let light = SimLight::new();
    let mut peds = PedManager::new();
    let mut scheduler = Scheduler::new();
    let mut delays = Welford::new();
    let mut button = scripted(&[0.0]);

    peds.spawn(SimPed::new(PedId(1), 0.0, 4.0, &config), &mut scheduler);
    scheduler.pop_next();

    let pressed = peds.arrive(
        PedId(1),
        &light,
        &mut scheduler,
        &mut delays,
        &mut button,
        &config,
    );
    assert!(!pressed);
    assert_eq!(peds.waiting().len(), 1);
    assert_eq!(scheduler.len(), 1);
}

#[test]
fn test_arrive_mid_red_crosses_when_window_allows() {
    let config = SimConfig::new();
    // Red began at 90: walk expiry 108 leaves a 14s window at t=94
    let light = red_light(90.0, &config);
    let mut peds = PedManager::new();
    let mut scheduler = Scheduler::new();
    let mut delays = Welford::new();
    let mut button = scripted(&[]);

    peds.spawn(SimPed::new(PedId(1), 0.0, 4.0, &config), &mut scheduler);
    scheduler.pop_next();

    let pressed = peds.arrive(
        PedId(1),
        &light,
        &mut scheduler,
        &mut delays,
        &mut button,
        &config,
    );
    assert!(!pressed);
    assert!(peds.waiting().is_empty());
    assert_eq!(peds.crossed_this_phase(), 1);
    assert_eq!(delays.count(), 1);
    assert!(delays.mean().abs() < 1e-9);
    assert!(!button.is_exhausted());
    assert_eq!(scheduler.len(), 0);
}

#[test]
fn test_arrive_mid_red_window_too_short_queues() {
    let config = SimConfig::new();
    // Red began at 82: walk expiry 100 leaves only 6s at t=94, under the
    // 11.5s this pedestrian needs
    let light = red_light(82.0, &config);
    let mut peds = PedManager::new();
    let mut scheduler = Scheduler::new();
    let mut delays = Welford::new();
    let mut button = scripted(&[1.0]);

    peds.spawn(SimPed::new(PedId(1), 0.0, 4.0, &config), &mut scheduler);
    scheduler.pop_next();

    let pressed = peds.arrive(
        PedId(1),
        &light,
        &mut scheduler,
        &mut delays,
        &mut button,
        &config,
    );
    assert!(pressed);
    assert_eq!(peds.waiting().len(), 1);
    assert_eq!(delays.count(), 0);
}

#[test]
fn test_arrive_mid_red_at_capacity_falls_back_to_queue() {
    let mut config = SimConfig::new();
    config.max_peds_per_red = 0;
    let light = red_light(90.0, &config);
    let mut peds = PedManager::new();
    let mut scheduler = Scheduler::new();
    let mut delays = Welford::new();
    let mut button = scripted(&[1.0]);

    peds.spawn(SimPed::new(PedId(1), 0.0, 4.0, &config), &mut scheduler);
    scheduler.pop_next();

    let pressed = peds.arrive(
        PedId(1),
        &light,
        &mut scheduler,
        &mut delays,
        &mut button,
        &config,
    );
    assert!(pressed);
    assert_eq!(peds.waiting().len(), 1);
    assert_eq!(delays.count(), 0);
}

#[test]
fn test_deploy_crosses_fifo_until_capacity() {
    let mut config = SimConfig::new();
    config.max_peds_per_red = 2;
    let light = SimLight::new();
    let mut peds = PedManager::new();
    let mut scheduler = Scheduler::new();
    let mut delays = Welford::new();
    let mut button = scripted(&[0.0, 0.0, 0.0]);

    for i in 1..=3 {
        peds.spawn(SimPed::new(PedId(i), 0.0, 4.0, &config), &mut scheduler);
    }
    for _ in 0..3 {
        let event = scheduler.pop_next().unwrap();
        let id = match event.kind {
            EventKind::PedArrive(id) => id,
            other => panic!("unexpected event {:?}", other),
        };
        peds.arrive(id, &light, &mut scheduler, &mut delays, &mut button, &config);
    }
    assert_eq!(peds.waiting().len(), 3);

    peds.deploy(200.0, &mut delays, &config);
    assert_eq!(delays.count(), 2);
    assert_eq!(peds.crossed_this_phase(), 2);
    assert_eq!(peds.waiting().len(), 1);
    assert_eq!(peds.waiting()[0].id, PedId(3));
    // Both crossers waited from t=94 to t=200
    assert!((delays.mean() - 106.0).abs() < 1e-9);

    // Next red starts fresh and drains the remainder
    peds.deploy(260.0, &mut delays, &config);
    assert_eq!(delays.count(), 3);
    assert_eq!(peds.crossed_this_phase(), 1);
    assert!(peds.waiting().is_empty());
}

#[test]
fn test_impatient_while_waiting_presses_and_reschedules() {
    let config = SimConfig::new();
    let light = SimLight::new();
    let mut peds = PedManager::new();
    let mut scheduler = Scheduler::new();
    let mut delays = Welford::new();
    let mut button = scripted(&[0.0, 1.0]);

    peds.spawn(SimPed::new(PedId(1), 0.0, 4.0, &config), &mut scheduler);
    scheduler.pop_next();
    peds.arrive(
        PedId(1),
        &light,
        &mut scheduler,
        &mut delays,
        &mut button,
        &config,
    );

    let pressed = peds.impatient(PedId(1), &mut scheduler, &mut button, &config);
    assert!(pressed);
    let rechecks = scheduler
        .pending()
        .filter(|e| e.kind == EventKind::PedImpatient(PedId(1)))
        .count();
    assert_eq!(rechecks, 2);
}

#[test]
fn test_impatient_after_crossing_is_noop() {
    let config = SimConfig::new();
    let mut peds = PedManager::new();
    let mut scheduler = Scheduler::new();
    let mut button = scripted(&[]);

    let pressed = peds.impatient(PedId(7), &mut scheduler, &mut button, &config);
    assert!(!pressed);
    assert!(scheduler.is_empty());
    assert!(!button.is_exhausted());
}

#[test]
fn test_press_model_probabilities() {
    let config = SimConfig::new();
    let mut source = PseudoRandom::seeded(23);
    let trials = 20_000;

    let lone = (0..trials)
        .filter(|_| PedManager::attempt_press(0, PedId(1), &mut source, &config))
        .count();
    let lone_freq = lone as f64 / trials as f64;
    assert!(
        (lone_freq - 15.0 / 16.0).abs() < 0.02,
        "lone press frequency off: {}",
        lone_freq
    );

    let crowded = (0..trials)
        .filter(|_| PedManager::attempt_press(3, PedId(1), &mut source, &config))
        .count();
    let crowded_freq = crowded as f64 / trials as f64;
    assert!(
        (crowded_freq - 0.25).abs() < 0.02,
        "crowded press frequency off: {}",
        crowded_freq
    );
}

#[test]
fn test_car_kinematics() {
    let config = SimConfig::new();
    let car = SimCar::new(CarId(1), 0.0, 40.0, &config);
    assert_eq!(car.braking_distance, 80.0);
    assert_eq!(car.braking_time, 4.0);
    assert!(!car.should_stop);
    assert_eq!(car.stop_decision, None);
}

#[test]
fn test_car_manager_geometry() {
    let config = SimConfig::new();
    let cars = CarManager::new(&config);
    assert_eq!(cars.total, 2586.0);
    assert_eq!(cars.before, 1281.0);
    assert_eq!(cars.after, 1314.0);
}

#[test]
fn test_car_spawn_schedules_arrive_and_exit() {
    let config = SimConfig::new();
    let mut cars = CarManager::new(&config);
    let mut scheduler = Scheduler::new();

    cars.spawn(SimCar::new(CarId(1), 0.0, 40.0, &config), &mut scheduler);
    assert_eq!(cars.driving().len(), 1);

    let arrive = scheduler.pop_next().unwrap();
    assert_eq!(arrive.kind, EventKind::CarArrive(CarId(1)));
    assert!((arrive.at - 30.025).abs() < 1e-9);

    let exit = scheduler.pop_next().unwrap();
    assert_eq!(exit.kind, EventKind::CarExit(CarId(1)));
    assert!((exit.at - 64.65).abs() < 1e-9);
}

#[test]
fn test_on_yellow_flags_every_driving_car() {
    // The feasibility check is conservative: the red window projects far
    // past the crosswalk zone, so no driving car can show both bounds clear
    let config = SimConfig::new();
    let mut cars = CarManager::new(&config);
    let mut scheduler = Scheduler::new();

    for (i, (at, speed)) in [(0.0, 40.0), (10.0, 35.0), (55.0, 50.0)].iter().enumerate() {
        cars.spawn(SimCar::new(CarId(i + 1), *at, *speed, &config), &mut scheduler);
    }
    cars.on_yellow(60.0, &config);
    for car in cars.driving() {
        assert!(car.should_stop, "car {} not flagged", car.id.0);
    }
}

#[test]
fn test_on_yellow_boundary_position_counts_as_clear() {
    // Both position bounds are strict inequalities. With the default
    // geometry the two clearance conditions can never hold together (the
    // red-window projection always overshoots the braking line), so the
    // equality case is only observable with the crosswalk zone and the red
    // window collapsed onto a single line.
    let mut config = SimConfig::new();
    config.crosswalk_width = 0.0;
    config.car_length = 0.0;
    config.red_duration = 0.0;

    let mut scheduler = Scheduler::new();
    let mut cars = CarManager::new(&config);
    assert_eq!(cars.before, 1293.0);
    assert_eq!(cars.after, 1293.0);

    // 32 ft/s from t=0 projects to exactly 1293 ft at end-of-yellow when
    // the yellow begins at 32.40625
    cars.spawn(SimCar::new(CarId(1), 0.0, 32.0, &config), &mut scheduler);
    cars.on_yellow(32.40625, &config);
    assert!(!cars.driving()[0].should_stop);

    // A fraction earlier, the projection falls short of the clearance line
    let mut cars = CarManager::new(&config);
    cars.spawn(SimCar::new(CarId(1), 0.0, 32.0, &config), &mut scheduler);
    cars.on_yellow(32.40625 - 0.03125, &config);
    assert!(cars.driving()[0].should_stop);

    // A fraction later, the projection overshoots the braking line
    let mut cars = CarManager::new(&config);
    cars.spawn(SimCar::new(CarId(1), 0.0, 32.0, &config), &mut scheduler);
    cars.on_yellow(32.40625 + 0.03125, &config);
    assert!(cars.driving()[0].should_stop);
}

#[test]
fn test_on_yellow_exact_clearance_still_flagged_by_red_window() {
    // Default geometry: 36 ft/s from t=0 lands exactly on the clearance
    // line (1314 ft) at end-of-yellow, so the first bound reads clear; the
    // red-window projection (1962 ft, past the 1281 ft braking line) flags
    // the car anyway
    let config = SimConfig::new();
    let mut cars = CarManager::new(&config);
    let mut scheduler = Scheduler::new();

    cars.spawn(SimCar::new(CarId(1), 0.0, 36.0, &config), &mut scheduler);
    cars.on_yellow(28.5, &config);
    assert!(cars.driving()[0].should_stop);
}

#[test]
fn test_flagged_car_stops_only_against_yellow_or_red() {
    let config = SimConfig::new();
    let mut scheduler = Scheduler::new();

    // Against yellow: pulls over
    let mut cars = CarManager::new(&config);
    cars.spawn(SimCar::new(CarId(1), 0.0, 40.0, &config), &mut scheduler);
    cars.on_yellow(0.0, &config);
    cars.arrive(CarId(1), 30.025, LightState::Yellow);
    assert!(cars.driving().is_empty());
    assert_eq!(cars.stopped().len(), 1);
    assert_eq!(cars.stopped()[0].stop_decision, Some(30.025));

    // Light back to green before the braking point: rolls through
    let mut cars = CarManager::new(&config);
    cars.spawn(SimCar::new(CarId(1), 0.0, 40.0, &config), &mut scheduler);
    cars.on_yellow(0.0, &config);
    cars.arrive(CarId(1), 30.025, LightState::Green);
    assert_eq!(cars.driving().len(), 1);
    assert!(cars.stopped().is_empty());
}

#[test]
fn test_unflagged_car_rolls_through_red() {
    // Spawned after the yellow notification, so never flagged
    let config = SimConfig::new();
    let mut cars = CarManager::new(&config);
    let mut scheduler = Scheduler::new();

    cars.spawn(SimCar::new(CarId(1), 0.0, 40.0, &config), &mut scheduler);
    cars.arrive(CarId(1), 30.025, LightState::Red);
    assert_eq!(cars.driving().len(), 1);
    assert!(cars.stopped().is_empty());
}

#[test]
fn test_stopped_car_release_delay() {
    let config = SimConfig::new();
    let mut cars = CarManager::new(&config);
    let mut scheduler = Scheduler::new();
    let mut delays = Welford::new();

    // 50 ft/s: braking point at t=23.12, released on the green at t=26
    cars.spawn(SimCar::new(CarId(1), 0.0, 50.0, &config), &mut scheduler);
    cars.on_yellow(0.0, &config);
    cars.arrive(CarId(1), 23.12, LightState::Red);
    assert_eq!(cars.stopped().len(), 1);

    cars.on_green(26.0, &mut delays);
    assert!(cars.stopped().is_empty());
    assert_eq!(delays.count(), 1);

    let expected = (2586.0 - 250.0) / 50.0 + 5.0 + (26.0 - 23.12) - 2586.0 / 50.0;
    assert!((delays.mean() - expected).abs() < 1e-9);
    assert!(delays.mean() > 0.0);

    // The pending exit event later finds nothing to do
    cars.exit(CarId(1), 51.72, &mut delays);
    assert_eq!(delays.count(), 1);
}

#[test]
fn test_unstopped_car_exits_with_zero_delay() {
    let config = SimConfig::new();
    let mut cars = CarManager::new(&config);
    let mut scheduler = Scheduler::new();
    let mut delays = Welford::new();

    cars.spawn(SimCar::new(CarId(1), 0.0, 40.0, &config), &mut scheduler);
    cars.exit(CarId(1), 64.65, &mut delays);
    assert!(cars.driving().is_empty());
    assert_eq!(delays.count(), 1);
    assert_eq!(delays.mean(), 0.0);
}

#[test]
fn test_end_to_end_stopped_car_cycle() {
    let config = SimConfig::new();
    // Auto stream: first gap 0 (car enters at t=0), far-off second chain,
    // speed draw landing on 50 ft/s, then an idle follow-up gap
    let auto = [0.0, 0.99, 50.0 / 54.0, 0.5];
    // Ped stream: both chains open with ~184s gaps, then speed and gap for
    // the single pedestrian
    let ped = [0.9999, 0.9999, 0.5, 0.3];
    // Button stream: one press draw, taken when the pedestrian arrives
    let button = [1.0];

    let mut world = SimWorld::new_with_sources(
        1,
        config,
        Box::new(scripted(&auto)),
        Box::new(scripted(&ped)),
        Box::new(scripted(&button)),
    );

    // The car enters the corridor
    assert!(world.step());
    assert_eq!(world.cars_spawned(), 1);
    assert_eq!(world.cars.driving().len(), 1);
    let speed = CAR_SPEED_MIN + (CAR_SPEED_MAX - CAR_SPEED_MIN) * (50.0 / 54.0);
    assert!((world.cars.driving()[0].speed - speed).abs() < 1e-9);

    // Button pressed while the car is still upstream of the light
    world.press_button();
    assert_eq!(world.light.state(), LightState::Yellow);
    assert!(world.cars.driving()[0].should_stop);

    // Yellow timer: red begins
    assert!(world.step());
    assert_eq!(world.light.state(), LightState::Red);

    // Follow-up car spawn is a no-op, the population target is reached
    assert!(world.step());
    assert_eq!(world.cars_spawned(), 1);

    // The flagged car reaches its braking point mid-red and pulls over
    assert!(world.step());
    assert!(world.cars.driving().is_empty());
    assert_eq!(world.cars.stopped().len(), 1);

    // Red timer: green returns and the car is released with its delay
    assert!(world.step());
    assert!(world.cars.stopped().is_empty());
    assert_eq!(world.car_delay.count(), 1);

    let braking_distance = speed * speed / 20.0;
    let arrive_at = (1281.0 - braking_distance) / speed;
    let expected_delay = (2586.0 - 2.0 * braking_distance) / speed + speed / 10.0
        + (26.0 - arrive_at)
        - 2586.0 / speed;
    assert!(expected_delay > 0.0);
    assert!((world.car_delay.mean() - expected_delay).abs() < 1e-9);

    // Run out the rest: the pedestrian spawns, presses, and crosses
    world.run();
    let report = world.report();
    assert_eq!(report.cars_recorded, 1);
    assert_eq!(report.peds_recorded, 1);
    assert_eq!(world.peds_spawned(), 1);
    // The pedestrian waits exactly one yellow phase for the red
    assert!((report.ped_delay_mean - YELLOW_DURATION).abs() < 1e-9);
    assert!(world.scheduler.is_empty());
    assert_eq!(world.events_dispatched(), 16);
}
