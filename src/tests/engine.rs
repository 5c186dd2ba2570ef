use super::macros::*;
use crate::prelude::*;
use std::ops::ControlFlow;

/// Types A and B, where a mixed pair makes A and anything else makes B.
fn mixed_pairs(amount_a: usize, amount_b: usize, seed: u64) -> (Vessel, [MoleculeType; 2]) {
    let (registry, [a, b]) = registry!("A", "B");
    let rules = RuleTable::from_rules([rule!(registry, "A + B -> A"), rule!(registry, "-> B")]);
    let vessel = Vessel::seeded(registry, [(a, amount_a), (b, amount_b)], rules, seed).unwrap();
    (vessel, [a, b])
}

#[test]
fn concrete_scenario() {
    trace_capture!();
    let (registry, [a, b]) = registry!("A", "B");
    let table = RuleTable::from_rules([rule!(registry, "A + B -> A"), rule!(registry, "-> B")]);
    for (sample, rule, product) in [([a, b], 0, a), ([a, a], 1, b), ([b, b], 1, b)] {
        let counts = ReactantCounts::tally(&registry, sample).unwrap();
        let (i, r) = table.first_match_index(&counts).unwrap();
        assert_eq!((i, r.product()), (rule, product));
    }

    let (mut vessel, _) = mixed_pairs(2, 2, 11);
    let mut check = |_: u64, c: &Concentrations| -> ControlFlow<()> {
        assert!((c.sum() - 100.0).abs() < 1e-9);
        ControlFlow::Continue(())
    };
    vessel
        .run(RunConfig::new(1000, 2, 1), &mut check)
        .unwrap();
    assert_eq!(vessel.population().len(), 4);
    assert_eq!(vessel.state(), EngineState::Done);
    assert_eq!(vessel.steps_taken(), 1000);
    assert_eq!(vessel.population().amounts().total(), 4);
}

#[test]
fn fall_through() {
    let (mut vessel, [a, b]) = mixed_pairs(4, 0, 5);
    vessel.start(RunConfig::new(1, 2, 1)).unwrap();
    let outcome = vessel.step().unwrap();
    assert!(matches!(
        outcome,
        StepOutcome::Reacted {
            rule: 1,
            product,
            ..
        } if product == b
    ));
    let amounts = vessel.population().amounts();
    assert_eq!(amounts.get(a), Some(3));
    assert_eq!(amounts.get(b), Some(1));
}

#[test]
fn mixed_pair() {
    let (mut vessel, [a, _]) = mixed_pairs(1, 1, 6);
    vessel.start(RunConfig::new(1, 2, 1)).unwrap();
    let outcome = vessel.step().unwrap();
    assert!(matches!(
        outcome,
        StepOutcome::Reacted {
            rule: 0,
            product,
            ..
        } if product == a
    ));
    assert_eq!(vessel.population().len(), 2);
}

#[test]
fn no_match_is_noop() {
    let (registry, [a, b]) = registry!("A", "B");
    let rules = RuleTable::from_rules([rule!(registry, "2A -> B")]);
    let mut vessel = Vessel::seeded(registry, [(a, 1), (b, 3)], rules, 8).unwrap();
    vessel.start(RunConfig::new(50, 1, 1)).unwrap();
    while vessel.state() == EngineState::Running {
        let before = vessel.population().clone();
        assert_eq!(vessel.step().unwrap(), StepOutcome::NoMatch);
        assert_eq!(vessel.population(), &before);
    }
    assert_eq!(vessel.steps_taken(), 50);
}

#[test]
fn conservation() {
    let scenario = Scenario::basic(250);
    let config = scenario.default_config();
    let mut vessel = scenario.into_seeded(3).unwrap();
    vessel.start(config).unwrap();
    while vessel.state() == EngineState::Running {
        vessel.step().unwrap();
        assert_eq!(vessel.population().len(), 500);
        assert!((vessel.concentrations().sum() - 100.0).abs() < 1e-9);
    }
    assert_eq!(vessel.steps_taken(), 2000);
}

#[test]
fn determinism() {
    let run = |seed| {
        let scenario = Scenario::basic(100);
        let config = scenario.default_config();
        let mut vessel = scenario.into_seeded(seed).unwrap();
        let mut trajectory = Trajectory::new();
        let last = vessel.run(config, &mut trajectory).unwrap();
        assert_eq!(trajectory.last().map(|s| &s.concentrations), Some(&last));
        (trajectory, vessel.into_population())
    };
    // each run declares its own registry, so compare by index and value
    let values = |t: &Trajectory| {
        t.samples()
            .iter()
            .map(|s| (s.step, s.concentrations.values().to_vec()))
            .collect::<Vec<_>>()
    };
    let indices = |p: &Population| p.as_slice().iter().map(|m| m.index()).collect::<Vec<_>>();
    let (t1, p1) = run(42);
    let (t2, p2) = run(42);
    assert_eq!(values(&t1), values(&t2));
    assert_eq!(indices(&p1), indices(&p2));
    let (t3, _) = run(43);
    assert_ne!(values(&t1), values(&t3));
}

#[test]
fn emission_schedule() {
    let (mut vessel, _) = mixed_pairs(5, 5, 1);
    let mut trajectory = Trajectory::new();
    vessel
        .run(RunConfig::new(10, 2, 3), &mut trajectory)
        .unwrap();
    assert_eq!(trajectory.steps().collect::<Vec<_>>(), [0, 3, 6, 9, 10]);

    let (mut vessel, _) = mixed_pairs(5, 5, 1);
    let mut trajectory = Trajectory::new();
    vessel
        .run(RunConfig::new(10, 2, 5), &mut trajectory)
        .unwrap();
    assert_eq!(trajectory.steps().collect::<Vec<_>>(), [0, 5, 10]);
}

#[test]
fn emission_does_not_change_dynamics() {
    let (mut v1, _) = mixed_pairs(20, 20, 9);
    let (mut v2, _) = mixed_pairs(20, 20, 9);
    let l1 = v1.run(RunConfig::new(300, 3, 1), &mut Discard).unwrap();
    let l2 = v2.run(RunConfig::new(300, 3, 77), &mut Discard).unwrap();
    assert_eq!(l1.values(), l2.values());
}

#[test]
fn early_halt() {
    let (mut vessel, _) = mixed_pairs(5, 5, 2);
    let mut halt = |step: u64, _: &Concentrations| -> ControlFlow<()> {
        if step >= 4 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    };
    vessel.run(RunConfig::new(100, 2, 1), &mut halt).unwrap();
    assert_eq!(vessel.state(), EngineState::Running);
    assert_eq!(vessel.steps_taken(), 4);
    vessel.step().unwrap();
    assert_eq!(vessel.steps_taken(), 5);
}

#[test]
fn resume_after_halt() {
    trace_capture!();
    let (mut vessel, _) = mixed_pairs(5, 5, 3);
    let mut halt = |step: u64, _: &Concentrations| -> ControlFlow<()> {
        if step >= 6 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    };
    vessel.run(RunConfig::new(20, 2, 3), &mut halt).unwrap();
    assert_eq!(vessel.state(), EngineState::Running);
    assert_eq!(vessel.steps_taken(), 6);

    let mut rest = Trajectory::new();
    let last = vessel.resume(&mut rest).unwrap();
    assert_eq!(vessel.state(), EngineState::Done);
    assert_eq!(vessel.steps_taken(), 20);
    assert_eq!(rest.steps().collect::<Vec<_>>(), [9, 12, 15, 18, 20]);
    assert_eq!(rest.last().map(|s| &s.concentrations), Some(&last));
    assert_eq!(last, vessel.concentrations());

    assert!(matches!(
        vessel.resume(&mut Discard),
        Err(SimError::InvalidState {
            state: EngineState::Done,
            ..
        })
    ));
    let (mut idle, _) = mixed_pairs(2, 2, 0);
    assert!(matches!(
        idle.resume(&mut Discard),
        Err(SimError::InvalidState {
            state: EngineState::Idle,
            ..
        })
    ));
}

#[test]
fn state_errors() {
    let (mut vessel, _) = mixed_pairs(2, 2, 0);
    assert!(matches!(
        vessel.step(),
        Err(SimError::InvalidState {
            state: EngineState::Idle,
            ..
        })
    ));
    vessel.run(RunConfig::new(5, 2, 1), &mut Discard).unwrap();
    assert_eq!(vessel.state(), EngineState::Done);
    assert!(matches!(
        vessel.step(),
        Err(SimError::InvalidState {
            state: EngineState::Done,
            ..
        })
    ));
    assert!(matches!(
        vessel.run(RunConfig::new(5, 2, 1), &mut Discard),
        Err(SimError::InvalidState {
            state: EngineState::Done,
            ..
        })
    ));
    assert_eq!(vessel.steps_taken(), 5);
}

#[test]
fn config_errors() {
    let (mut vessel, _) = mixed_pairs(2, 2, 0);
    assert!(matches!(
        vessel.start(RunConfig::new(5, 0, 1)),
        Err(SimError::Config(ConfigError::SampleSize {
            size: 0,
            population: 4
        }))
    ));
    assert!(matches!(
        vessel.start(RunConfig::new(5, 5, 1)),
        Err(SimError::Config(ConfigError::SampleSize {
            size: 5,
            population: 4
        }))
    ));
    assert!(matches!(
        vessel.start(RunConfig::new(0, 2, 1)),
        Err(SimError::Config(ConfigError::ZeroSteps))
    ));
    assert!(matches!(
        vessel.start(RunConfig::new(5, 2, 0)),
        Err(SimError::Config(ConfigError::ZeroEmitInterval))
    ));
    assert_eq!(vessel.state(), EngineState::Idle);

    // the whole population at once is fine
    vessel.start(RunConfig::new(5, 4, 1)).unwrap();
    while vessel.state() == EngineState::Running {
        vessel.step().unwrap();
    }
}

#[test]
fn foreign_rule() {
    let (registry, [a, b]) = registry!("A", "B");
    let (other, _) = registry!("A", "B");
    let rules = RuleTable::from_rules([rule!(registry, "A -> B"), rule!(other, "A -> B")]);
    assert_eq!(
        Vessel::seeded(registry, [(a, 1), (b, 1)], rules, 0).unwrap_err(),
        ConfigError::ForeignRule(1)
    );
}
