use survivor_core::{
    CameraView, Damageable, EnemyRecord, HeroFacade, ProjectileOrigin, ProjectileRecord,
    ProjectileRequest, Species, Vec2, WorldMode, PROJECTILE_CAPACITY,
};
use survivor_simulation::{SaveError, Simulation, SimulationConfig};
use survivor_system_hero::Hero;
use survivor_world::query;

fn config() -> SimulationConfig {
    SimulationConfig::new(2024).with_projectile_capacity(64)
}

fn populated() -> (Simulation, Hero) {
    let mut sim = Simulation::new(config());
    let mut hero = Hero::new(Vec2::new(500.0, 400.0));
    let camera = CameraView::new(Vec2::new(0.0, 0.0));
    for _ in 0..40 {
        sim.update(0.5, camera, &mut hero, WorldMode::Infinite);
    }
    let _ = sim.spawn_projectile(ProjectileRequest {
        source: Vec2::new(516.0, 416.0),
        target: Vec2::new(900.0, 416.0),
        damage: 100,
        origin: ProjectileOrigin::Hero,
    });
    hero.credit_score(350);
    (sim, hero)
}

type Records = (Vec<Vec<EnemyRecord>>, Vec<Option<ProjectileRecord>>);

fn snapshot(sim: &Simulation) -> Records {
    let enemies = Species::ALL
        .iter()
        .map(|species| query::enemy_records(sim.world(), *species))
        .collect();
    (enemies, query::projectile_records(sim.world()))
}

#[test]
fn save_then_load_restores_world_hero_and_mode() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("savegame.txt");
    let (sim, hero) = populated();
    let counts = sim.population_counts();
    for species in Species::ALL {
        assert!(counts.get(species) >= 1, "no {species:?} alive to round-trip");
    }
    let active = query::projectiles(sim.world()).active_count();
    assert!(active > 0 && active < 64, "{active} of 64 slots active");

    sim.save_game(&path, &hero, WorldMode::Infinite)
        .expect("save succeeds");

    let mut restored = Simulation::new(config());
    let mut restored_hero = Hero::new(Vec2::ZERO);
    let mode = restored
        .load_game(&path, &mut restored_hero)
        .expect("load succeeds");

    assert_eq!(mode, WorldMode::Infinite);
    assert_eq!(restored.population_counts(), sim.population_counts());
    assert_eq!(snapshot(&restored), snapshot(&sim));
    assert_eq!(restored_hero.record(), hero.record());
    assert_eq!(restored_hero.score(), hero.score());
}

#[test]
fn missing_file_leaves_state_untouched() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.txt");
    let (mut sim, mut hero) = populated();
    let before = snapshot(&sim);
    let hero_before = hero.record();

    match sim.load_game(&path, &mut hero) {
        Err(SaveError::Missing { path: reported }) => assert_eq!(reported, path),
        other => panic!("expected missing save, got {other:?}"),
    }

    assert_eq!(snapshot(&sim), before);
    assert_eq!(hero.record(), hero_before);
}

#[test]
fn non_utf8_file_is_corrupt_and_changes_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("garbled.txt");
    std::fs::write(&path, [0xff, 0xfe, b'\n', b'1']).expect("write save");
    let (mut sim, mut hero) = populated();
    let before = snapshot(&sim);
    let hero_before = hero.record();

    match sim.load_game(&path, &mut hero) {
        Err(SaveError::Corrupt { line, .. }) => assert_eq!(line, 1),
        other => panic!("expected corrupt save, got {other:?}"),
    }

    assert_eq!(snapshot(&sim), before);
    assert_eq!(hero.record(), hero_before);
}

#[test]
fn truncated_file_is_corrupt_and_changes_nothing() {
    let (source, source_hero) = populated();
    let mut bytes = Vec::new();
    source
        .save_to(&mut bytes, &source_hero, WorldMode::Finite)
        .expect("save succeeds");
    let text = String::from_utf8(bytes).expect("ascii save");
    let truncated: String = text
        .lines()
        .take(text.lines().count() - 1)
        .map(|line| format!("{line}\n"))
        .collect();

    let mut sim = Simulation::new(config());
    let mut hero = Hero::new(Vec2::new(10.0, 10.0));
    sim.update(0.1, CameraView::default(), &mut hero, WorldMode::Finite);
    let before = snapshot(&sim);

    let result = sim.load_from_str(&truncated, &mut hero);

    assert!(matches!(result, Err(SaveError::Corrupt { .. })), "{result:?}");
    assert_eq!(snapshot(&sim), before);
    assert_eq!(hero.position(), Vec2::new(10.0, 10.0));
    assert_eq!(hero.score(), 0);
}

#[test]
fn save_writes_one_line_per_projectile_slot() {
    let sim = Simulation::new(SimulationConfig::default());
    let hero = Hero::new(Vec2::new(500.0, 400.0));
    let mut bytes = Vec::new();
    sim.save_to(&mut bytes, &hero, WorldMode::Finite)
        .expect("save succeeds");
    let text = String::from_utf8(bytes).expect("ascii save");

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5 + PROJECTILE_CAPACITY);
    assert_eq!(lines[0], "500 400 200 0");
    assert_eq!(lines[3], "0");
    assert_eq!(lines[4], "0 0 0 0");
    assert!(lines[5..].iter().all(|line| *line == "0"));
}
