use super::*;
use crate::game::config::InitialConfig;
use crate::game::fixed_math::{FixedNum, FixedVec2};

fn kinds(events: &[SimEvent]) -> Vec<&'static str> {
    events.iter().map(|e| e.kind.name()).collect()
}

fn run_until(sim: &mut Simulation, limit: Tick, mut stop: impl FnMut(&SimEvent) -> bool) -> Option<SimEvent> {
    for _ in 0..limit {
        if let Some(event) = sim.tick().into_iter().find(|e| stop(e)) {
            return Some(event);
        }
    }
    None
}

#[test]
fn test_empty_match_is_silent() {
    let mut sim = Simulation::new(SimConfig::default());
    for _ in 0..300 {
        assert!(sim.tick().is_empty());
    }
    assert_eq!(sim.current_tick(), 300);
}

#[test]
fn test_spawn_events_are_stamped_with_current_tick() {
    let mut sim = Simulation::new(SimConfig::default());
    sim.enqueue(Command::spawn_hero("Tank", FixedVec2::from_int(1, 2))).unwrap();
    let events = sim.tick();

    assert_eq!(kinds(&events), vec!["HeroSpawned"]);
    assert_eq!(events[0].tick, 0);
    match &events[0].kind {
        EventKind::HeroSpawned { hero_id, max_health, weapon_type, .. } => {
            assert_eq!(*hero_id, EntityId(1));
            assert_eq!(*max_health, FixedNum::from_int(150));
            assert_eq!(weapon_type, "Shotgun");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(sim.current_tick(), 1);
}

#[test]
fn test_stale_command_is_rejected_without_mutation() {
    let mut sim = Simulation::new(SimConfig::default());
    for _ in 0..5 {
        sim.tick();
    }
    let before = sim.state_hash().unwrap();

    let result = sim.enqueue(Command::spawn_hero("Default", FixedVec2::ZERO).scheduled(2));
    assert!(matches!(result, Err(SimError::StaleCommand { scheduled: 2, current: 5 })));
    assert_eq!(sim.pending_commands(), 0);
    assert_eq!(sim.state_hash().unwrap(), before);
}

#[test]
fn test_future_commands_wait_for_their_tick() {
    let mut sim = Simulation::new(SimConfig::default());
    assert_eq!(sim.enqueue(Command::spawn_hero("Default", FixedVec2::ZERO).scheduled(3)).unwrap(), 3);

    for _ in 0..3 {
        assert!(sim.tick().is_empty());
    }
    let events = sim.tick();
    assert_eq!(kinds(&events), vec!["HeroSpawned"]);
    assert_eq!(events[0].tick, 3);
}

#[test]
fn test_commands_apply_in_enqueue_order() {
    let mut sim = Simulation::new(SimConfig::default());
    let events = sim.tick_with([
        Command::spawn_enemy("Tank", FixedVec2::from_int(3, 0)),
        Command::spawn_enemy("BasicGrunt", FixedVec2::from_int(-3, 0)),
        Command::spawn_enemy("FastRunner", FixedVec2::from_int(0, 3)),
    ]);

    let spawned: Vec<_> = events
        .iter()
        .filter_map(|e| match &e.kind {
            EventKind::EnemySpawned { enemy_id, enemy_type, .. } => Some((*enemy_id, enemy_type.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(
        spawned,
        vec![(EntityId(1), "Tank"), (EntityId(2), "BasicGrunt"), (EntityId(3), "FastRunner")]
    );

    let first: Vec<_> = sim.world().enemies().map(|e| e.id).collect();
    let second: Vec<_> = sim.world().enemies().map(|e| e.id).collect();
    assert_eq!(first, second);
    assert_eq!(first, vec![EntityId(1), EntityId(2), EntityId(3)]);
}

#[test]
fn test_invalid_commands_are_dropped() {
    let mut sim = Simulation::new(SimConfig::default());
    let events = sim.tick_with([
        Command::choose_upgrade(EntityId(42), UpgradeKind::Damage, 1),
        Command::spawn_hero("Paladin", FixedVec2::ZERO),
        Command::spawn_hero("Default", FixedVec2::ZERO),
    ]);
    assert_eq!(kinds(&events), vec!["HeroSpawned"]);
    assert_eq!(sim.world().hero_count(), 1);
}

#[test]
fn test_upgrades_and_weapons() {
    let mut sim = Simulation::new(SimConfig::default());
    sim.tick_with([Command::spawn_hero("Default", FixedVec2::ZERO)]);
    let hero_id = EntityId(1);

    let events = sim.tick_with([
        Command::choose_upgrade(hero_id, UpgradeKind::Damage, 2),
        Command::choose_upgrade(hero_id, UpgradeKind::AttackSpeed, 1),
        Command::choose_upgrade(hero_id, UpgradeKind::Health, 1),
        Command::choose_weapon(hero_id, "IceBow"),
    ]);
    assert_eq!(kinds(&events), vec!["UpgradeChosen", "UpgradeChosen", "UpgradeChosen", "WeaponChosen"]);

    let hero = sim.world().hero(hero_id).unwrap();
    assert_eq!(hero.damage, FixedNum::from_int(30));
    assert_eq!(hero.attack_speed, FixedNum::from_ratio(5, 2));
    assert_eq!(hero.shot_cooldown_ticks, 12);
    assert_eq!(hero.max_health, FixedNum::from_int(130));
    assert_eq!(hero.health, FixedNum::from_int(130));
    assert_eq!(hero.weapon_type, "IceBow");
    assert_eq!(hero.weapon_tier, 2);
}

#[test]
fn test_stars_only_for_archers() {
    let mut sim = Simulation::new(SimConfig::default());
    sim.tick_with([
        Command::spawn_hero("Archer", FixedVec2::ZERO),
        Command::spawn_hero("Tank", FixedVec2::from_int(2, 0)),
    ]);
    let (archer, tank) = (EntityId(1), EntityId(2));

    for _ in 0..4 {
        sim.tick_with([
            Command::choose_upgrade(archer, UpgradeKind::Star, 1),
            Command::choose_upgrade(tank, UpgradeKind::Star, 1),
        ]);
    }

    let archer = sim.world().hero(archer).unwrap();
    assert_eq!(archer.stars, 3, "Stars cap at three");
    assert_eq!(archer.projectile_count(), 4);
    assert_eq!(archer.projectile_damage(), FixedNum::from_int(24));
    assert_eq!(archer.attack_speed, FixedNum::from_ratio(9, 4));
    assert_eq!(sim.world().hero(tank).unwrap().stars, 0);
}

#[test]
fn test_wave_start_spawns_ring() {
    let mut sim = Simulation::new(SimConfig::default());
    let events = sim.tick_with([Command::start_wave(1, 1)]);

    assert_eq!(events[0].kind, EventKind::WaveStarted { wave_number: 1, level_number: 1, enemy_count: 5 });
    let spawned = events.iter().filter(|e| matches!(e.kind, EventKind::EnemySpawned { .. })).count();
    assert_eq!(spawned, 5);
    for enemy in sim.world().enemies() {
        let distance = enemy.position.length();
        assert!((distance - FixedNum::from_int(10)).abs() < FixedNum::from_ratio(1, 100));
    }
}

#[test]
fn test_hero_kills_grunt_and_gains_xp() {
    let mut sim = Simulation::new(SimConfig::default());
    sim.enqueue(Command::spawn_hero("Default", FixedVec2::ZERO)).unwrap();
    sim.enqueue(Command::spawn_enemy("BasicGrunt", FixedVec2::from_int(4, 0))).unwrap();

    let mut log = Vec::new();
    for _ in 0..200 {
        log.extend(sim.tick());
        if sim.world().enemy_count() == 0 {
            break;
        }
    }

    let xp = log.iter().position(|e| matches!(e.kind, EventKind::XpGained { amount: 10, .. }));
    let kill = log.iter().position(|e| matches!(e.kind, EventKind::EnemyKilled { enemy_id: EntityId(2), .. }));
    assert!(xp.is_some() && kill.is_some());
    assert!(xp < kill, "XP is awarded before the kill is announced");
    assert_eq!(sim.world().hero(EntityId(1)).unwrap().current_xp, 10);
    assert!(log.iter().any(|e| matches!(e.kind, EventKind::ProjectileDestroyed { hit_target: true, .. })));
}

#[test]
fn test_boss_kills_lone_hero() {
    let mut sim = Simulation::new(SimConfig::default());
    sim.enqueue(Command::spawn_hero("Default", FixedVec2::ZERO)).unwrap();
    sim.enqueue(Command::spawn_enemy("Boss", FixedVec2::from_int(2, 0))).unwrap();

    let killed = run_until(&mut sim, 600, |e| matches!(e.kind, EventKind::HeroKilled { .. }));
    let killed = killed.expect("boss should kill the hero");
    // Four 25-damage hits, one every 90 ticks after spawning
    assert_eq!(killed.tick, 360);
    assert!(sim.world().is_game_over());

    let mut game_overs = 0;
    for _ in 0..100 {
        game_overs += sim.tick().iter().filter(|e| matches!(e.kind, EventKind::GameOver { .. })).count();
    }
    assert_eq!(game_overs, 0, "Game over fires exactly once");
}

#[test]
fn test_capacity_limits_drop_spawns() {
    let config = SimConfig::from_initial(&InitialConfig { max_heroes: 1, ..Default::default() });
    let mut sim = Simulation::new(config);
    let events = sim.tick_with([
        Command::spawn_hero("Default", FixedVec2::ZERO),
        Command::spawn_hero("Fast", FixedVec2::ZERO),
    ]);
    assert_eq!(kinds(&events), vec!["HeroSpawned"]);
    assert_eq!(sim.world().hero_count(), 1);
}

#[test]
fn test_huge_wave_number_is_bounded_by_enemy_cap() {
    let mut sim = Simulation::new(SimConfig::default());
    let limit = sim.config().limits.enemies;
    sim.enqueue(Command::start_wave(u32::MAX, 1)).unwrap();

    let events = sim.tick();

    assert!(matches!(events[0].kind, EventKind::WaveStarted { enemy_count: u32::MAX, .. }));
    assert_eq!(sim.world().enemy_count(), limit);
    assert_eq!(kinds(&events).iter().filter(|k| **k == "EnemySpawned").count(), limit);
    assert_eq!(sim.current_tick(), 1);
}

#[test]
fn test_world_iteration_order_is_stable() {
    let mut sim = Simulation::new(SimConfig::default());
    sim.tick_with([
        Command::spawn_enemy("Tank", FixedVec2::from_int(4, 0)),
        Command::spawn_enemy("BasicGrunt", FixedVec2::from_int(-4, 0)),
        Command::spawn_enemy("FastRunner", FixedVec2::from_int(0, 4)),
    ]);

    let first = sim.world().enemy_ids();
    assert_eq!(first.as_slice(), &[EntityId(1), EntityId(2), EntityId(3)]);
    assert_eq!(sim.world().enemy_ids(), first);

    for _ in 0..10 {
        sim.tick();
    }
    assert_eq!(sim.world().enemy_ids(), first, "Order survives later ticks");
}

#[test]
fn test_blocked_volley_keeps_cooldown_ready() {
    let config = SimConfig::from_initial(&InitialConfig { max_projectiles: 0, ..Default::default() });
    let mut sim = Simulation::new(config);
    sim.enqueue(Command::spawn_hero("Default", FixedVec2::ZERO)).unwrap();
    sim.enqueue(Command::spawn_enemy("BasicGrunt", FixedVec2::from_int(4, 0))).unwrap();

    let mut log = Vec::new();
    for _ in 0..5 {
        log.extend(sim.tick());
    }

    assert!(!log.iter().any(|e| matches!(e.kind, EventKind::HeroShoot { .. } | EventKind::ProjectileSpawned { .. })));
    assert_eq!(sim.world().hero(EntityId(1)).unwrap().last_shot_tick, None);
}

#[test]
fn test_identical_sessions_stay_in_lockstep() {
    let script = |sim: &mut Simulation| {
        let mut events = Vec::new();
        for tick in 0..240 {
            let commands = match tick {
                0 => vec![Command::spawn_hero("IceArcher", FixedVec2::ZERO), Command::start_wave(1, 1)],
                30 => vec![Command::choose_upgrade(EntityId(1), UpgradeKind::Star, 1)],
                _ => Vec::new(),
            };
            events.extend(sim.tick_with(commands));
        }
        (events, sim.state_hash().unwrap())
    };

    let mut a = Simulation::new(SimConfig::default());
    let mut b = Simulation::new(SimConfig::default());
    assert_eq!(script(&mut a), script(&mut b));
}

#[test]
fn test_reset_returns_to_tick_zero() {
    let mut sim = Simulation::new(SimConfig::default());
    let fresh = sim.state_hash().unwrap();
    sim.start_recording(Default::default());
    sim.tick_with([Command::spawn_hero("Default", FixedVec2::ZERO)]);
    sim.enqueue(Command::start_wave(1, 1).scheduled(10)).unwrap();

    sim.reset();
    assert_eq!(sim.current_tick(), 0);
    assert_eq!(sim.pending_commands(), 0);
    assert!(!sim.is_recording());
    assert_eq!(sim.state_hash().unwrap(), fresh);
}
