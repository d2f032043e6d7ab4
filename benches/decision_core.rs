use criterion::{black_box, criterion_group, criterion_main, Criterion};

use eclipse_core::belief::{BagComposition, BeliefConfig, ParticleSet};
use eclipse_core::combat::{estimate_combat, resolve_combat, CombatConfig, Combatant, ShipClass};
use eclipse_core::core::PlayerId;
use eclipse_core::games::skirmish::{Skirmish, SkirmishState};
use eclipse_core::mcts::{Planner, PlannerConfig};

fn mixed_battle() -> CombatConfig {
    let attacker = vec![
        ShipClass::Dreadnought.default_design(),
        ShipClass::Cruiser.default_design(),
        ShipClass::Interceptor.default_design().with_missiles(1),
    ];
    let defender = vec![
        ShipClass::Cruiser.default_design().with_shield(1),
        ShipClass::Cruiser.default_design(),
        ShipClass::Starbase.default_design(),
    ];
    CombatConfig::new(
        Combatant::new(PlayerId::new(0), attacker),
        Combatant::new(PlayerId::new(1), defender),
    )
    .with_seed(17)
}

fn bench_resolve_combat(c: &mut Criterion) {
    let config = mixed_battle();
    c.bench_function("resolve_combat_3v3", |b| b.iter(|| resolve_combat(black_box(&config))));
}

fn bench_estimate_combat(c: &mut Criterion) {
    let config = mixed_battle();
    c.bench_function("estimate_combat_500", |b| {
        b.iter(|| estimate_combat(black_box(&config), 500, 1.0))
    });
}

fn bench_particle_draw(c: &mut Criterion) {
    let bag: BagComposition = [("ancient", 3), ("money", 6), ("science", 5)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    let config = BeliefConfig::default().with_particles(512).with_seed(3);
    c.bench_function("particle_draw_512", |b| {
        b.iter(|| {
            let mut set = ParticleSet::with_hidden_removals("II", &bag, 2, &config).ok()?;
            set.update_on_draw(black_box("money")).ok()?;
            set.update_on_peek(&[("science", 1)]).ok()
        })
    });
}

fn bench_plan(c: &mut Criterion) {
    let state = SkirmishState::new(3).with_round(4);
    let config = PlannerConfig::default().with_simulations(400).with_seed(1);
    c.bench_function("plan_skirmish_400", |b| {
        b.iter(|| {
            let mut planner = Planner::new(Skirmish::new(), config.clone()).ok()?;
            Some(planner.plan(black_box(&state), PlayerId::new(0)))
        })
    });
}

criterion_group!(
    benches,
    bench_resolve_combat,
    bench_estimate_combat,
    bench_particle_draw,
    bench_plan
);
criterion_main!(benches);
