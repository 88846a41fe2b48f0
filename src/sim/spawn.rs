//! Time-gated entity spawning
//!
//! Each kind keeps its own next-spawn time. When elapsed run time crosses it
//! (and the kind's tier gate passes) one entity of that kind enters at a
//! screen edge, and the next time is scheduled from the interval at the
//! current difficulty.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyState;
use super::entity::{Entity, EntityKind, SharkState, SizeClass};
use crate::tuning::{SpawnRule, SpawnTable, Tuning};

/// Entity kinds with independent spawn schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnKind {
    Prey,
    Shark,
    Crab,
    Jellyfish,
    Seahorse,
}

impl SpawnKind {
    pub const ALL: [SpawnKind; 5] = [
        SpawnKind::Prey,
        SpawnKind::Shark,
        SpawnKind::Crab,
        SpawnKind::Jellyfish,
        SpawnKind::Seahorse,
    ];

    pub fn rule(self, table: &SpawnTable) -> &SpawnRule {
        match self {
            SpawnKind::Prey => &table.prey,
            SpawnKind::Shark => &table.shark,
            SpawnKind::Crab => &table.crab,
            SpawnKind::Jellyfish => &table.jellyfish,
            SpawnKind::Seahorse => &table.seahorse,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-kind spawn clocks and the entity id allocator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnSystem {
    /// Elapsed time at which each kind spawns next (indexed by `SpawnKind`)
    next_spawn: [f32; 5],
    next_id: u32,
}

impl Default for SpawnSystem {
    fn default() -> Self {
        Self::new(&SpawnTable::default())
    }
}

impl SpawnSystem {
    pub fn new(table: &SpawnTable) -> Self {
        let mut next_spawn = [0.0; 5];
        for kind in SpawnKind::ALL {
            next_spawn[kind.index()] = kind.rule(table).enable_time;
        }
        Self {
            next_spawn,
            next_id: 1,
        }
    }

    pub fn next_spawn_time(&self, kind: SpawnKind) -> f32 {
        self.next_spawn[kind.index()]
    }

    /// Allocate an entity id (monotonic within a run)
    pub fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn whatever is due at `elapsed`
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        elapsed: f32,
        tier: u8,
        difficulty: &DifficultyState,
        live_entities: usize,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Vec<Entity> {
        let mut spawned = Vec::new();

        for kind in SpawnKind::ALL {
            let rule = kind.rule(&tuning.spawn);
            if !rule.enabled || elapsed < self.next_spawn[kind.index()] {
                continue;
            }
            // Tier-gated kinds stay due and appear as soon as the tier is reached
            if tier < rule.min_tier {
                continue;
            }
            self.next_spawn[kind.index()] = elapsed + rule.interval(difficulty.spawn_rate);

            if live_entities + spawned.len() >= tuning.max_entities {
                log::debug!("Entity cap reached, skipping {:?} spawn", kind);
                continue;
            }

            let id = self.allocate_id();
            let entity = build_entity(kind, id, difficulty, tuning, rng);
            log::debug!(
                "Spawned {} #{} at ({:.0}, {:.0}) t={:.2}",
                entity.kind.name(),
                id,
                entity.pos.x,
                entity.pos.y,
                elapsed
            );
            spawned.push(entity);
        }

        spawned
    }
}

/// Uniform sample in [lo, hi), collapsing to `lo` for empty ranges
fn random_between<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

/// Pick a prey class by the configured weights
fn pick_size_class<R: Rng + ?Sized>(tuning: &Tuning, rng: &mut R) -> SizeClass {
    let total: u32 = tuning.size_classes.iter().map(|c| c.weight).sum();
    if total == 0 {
        return SizeClass::Tiny;
    }
    let mut roll = rng.random_range(0..total);
    for class in SizeClass::ALL {
        let weight = class.tuning(tuning).weight;
        if roll < weight {
            return class;
        }
        roll -= weight;
    }
    SizeClass::Tiny
}

/// Start just outside the left or right edge, moving inward
fn edge_start<R: Rng + ?Sized>(rng: &mut R, radius: f32, width: f32) -> (f32, f32) {
    if rng.random_bool(0.5) {
        (-radius, 1.0)
    } else {
        (width + radius, -1.0)
    }
}

fn build_entity<R: Rng + ?Sized>(
    kind: SpawnKind,
    id: u32,
    difficulty: &DifficultyState,
    tuning: &Tuning,
    rng: &mut R,
) -> Entity {
    let (w, h) = (tuning.world_width, tuning.world_height);

    match kind {
        SpawnKind::Prey => {
            let class = pick_size_class(tuning, rng);
            let ct = class.tuning(tuning);
            let r = ct.radius;
            let (x, dir) = edge_start(rng, r, w);
            let y = random_between(rng, r, h - r);
            let speed = tuning.base_speed * ct.speed * difficulty.speed;
            Entity::new(id, EntityKind::Prey { class }, Vec2::new(x, y), Vec2::new(dir * speed, 0.0), r)
        }
        SpawnKind::Shark => {
            let r = tuning.shark.radius;
            let (x, dir) = edge_start(rng, r, w);
            // Sharks patrol the upper part of the water column
            let cruise_y = random_between(rng, r, h * 0.6);
            let shark = SharkState::new(dir, cruise_y, difficulty.speed);
            let vel = Vec2::new(dir * tuning.shark.patrol_speed * difficulty.speed, 0.0);
            Entity::new(id, EntityKind::Shark(shark), Vec2::new(x, cruise_y), vel, r)
        }
        SpawnKind::Crab => {
            let r = tuning.crab.radius;
            let (x, dir) = edge_start(rng, r, w);
            let vel = Vec2::new(dir * tuning.crab.speed * difficulty.speed, 0.0);
            Entity::new(id, EntityKind::Crab, Vec2::new(x, h - r), vel, r)
        }
        SpawnKind::Jellyfish => {
            let jt = &tuning.jellyfish;
            let r = jt.radius;
            let (x, dir) = edge_start(rng, r, w);
            let base_y = random_between(rng, r + jt.drift_amplitude, h - r - jt.drift_amplitude);
            let phase = random_between(rng, 0.0, std::f32::consts::TAU);
            let vel = Vec2::new(dir * jt.drift_speed * difficulty.speed, 0.0);
            let pos = Vec2::new(x, base_y + jt.drift_amplitude * phase.sin());
            Entity::new(id, EntityKind::Jellyfish { phase, base_y }, pos, vel, r)
        }
        SpawnKind::Seahorse => {
            let st = &tuning.seahorse;
            let r = st.radius;
            let (x, dir) = edge_start(rng, r, w);
            let y = random_between(rng, r, h - r);
            let vel = Vec2::new(dir * st.speed * difficulty.speed, 0.0);
            Entity::new(id, EntityKind::Seahorse { ttl: st.ttl }, Vec2::new(x, y), vel, r)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn only_prey_tuning() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.spawn = SpawnTable {
            prey: tuning.spawn.prey,
            shark: SpawnRule::disabled(),
            crab: SpawnRule::disabled(),
            jellyfish: SpawnRule::disabled(),
            seahorse: SpawnRule::disabled(),
        };
        tuning
    }

    #[test]
    fn test_first_spawn_at_enable_time() {
        let tuning = Tuning::default();
        let spawner = SpawnSystem::new(&tuning.spawn);
        assert_eq!(spawner.next_spawn_time(SpawnKind::Prey), 0.0);
        assert_eq!(spawner.next_spawn_time(SpawnKind::Shark), tuning.spawn.shark.enable_time);
    }

    #[test]
    fn test_spawns_once_per_interval() {
        let tuning = only_prey_tuning();
        let mut spawner = SpawnSystem::new(&tuning.spawn);
        let mut rng = Pcg32::seed_from_u64(7);
        let difficulty = DifficultyState::initial(&tuning.difficulty);

        let mut count = 0;
        let dt = 1.0 / 60.0;
        for i in 1..=600 {
            let elapsed = i as f32 * dt;
            count += spawner.update(elapsed, 1, &difficulty, 0, &tuning, &mut rng).len();
        }
        // 10 seconds at a 1.2s interval starting at t=0
        assert_eq!(count, 9);
    }

    #[test]
    fn test_spawned_prey_enters_from_edge() {
        let tuning = only_prey_tuning();
        let mut spawner = SpawnSystem::new(&tuning.spawn);
        let mut rng = Pcg32::seed_from_u64(42);
        let difficulty = DifficultyState::initial(&tuning.difficulty);

        for step in 0..200 {
            let elapsed = step as f32 * 1.5;
            for fish in spawner.update(elapsed, 1, &difficulty, 0, &tuning, &mut rng) {
                let on_left = fish.pos.x < 0.0 && fish.vel.x > 0.0;
                let on_right = fish.pos.x > tuning.world_width && fish.vel.x < 0.0;
                assert!(on_left || on_right);
                assert!(fish.pos.y >= fish.radius && fish.pos.y <= tuning.world_height - fish.radius);
                assert!(matches!(fish.kind, EntityKind::Prey { .. }));
            }
        }
    }

    /// Table where only `kind` spawns, from t=0 at any tier
    fn only_kind_tuning(kind: SpawnKind) -> Tuning {
        let mut tuning = Tuning::default();
        for other in SpawnKind::ALL {
            let rule = match other {
                SpawnKind::Prey => &mut tuning.spawn.prey,
                SpawnKind::Shark => &mut tuning.spawn.shark,
                SpawnKind::Crab => &mut tuning.spawn.crab,
                SpawnKind::Jellyfish => &mut tuning.spawn.jellyfish,
                SpawnKind::Seahorse => &mut tuning.spawn.seahorse,
            };
            if other == kind {
                rule.enable_time = 0.0;
                rule.min_tier = 1;
            } else {
                *rule = SpawnRule::disabled();
            }
        }
        tuning
    }

    /// Spawn `kind` repeatedly at the given difficulty
    fn spawn_many(kind: SpawnKind, difficulty: &DifficultyState, tuning: &Tuning, seed: u64) -> Vec<Entity> {
        let mut spawner = SpawnSystem::new(&tuning.spawn);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut all = Vec::new();
        for step in 0..100 {
            let elapsed = step as f32 * 100.0;
            all.extend(spawner.update(elapsed, 1, difficulty, 0, tuning, &mut rng));
        }
        assert_eq!(all.len(), 100);
        all
    }

    fn enters_from_edge(entity: &Entity, width: f32) -> bool {
        (entity.pos.x < 0.0 && entity.vel.x > 0.0) || (entity.pos.x > width && entity.vel.x < 0.0)
    }

    #[test]
    fn test_shark_enters_in_upper_band() {
        let tuning = only_kind_tuning(SpawnKind::Shark);
        let difficulty = DifficultyState::at(60.0, &tuning.difficulty);
        for shark in spawn_many(SpawnKind::Shark, &difficulty, &tuning, 21) {
            assert!(enters_from_edge(&shark, tuning.world_width));
            assert!(shark.pos.y >= shark.radius && shark.pos.y <= tuning.world_height * 0.6);
            match shark.kind {
                EntityKind::Shark(state) => {
                    assert_eq!(state.cruise_y, shark.pos.y);
                    assert_eq!(state.speed_scale, difficulty.speed);
                    assert_eq!(state.heading, shark.vel.x.signum());
                    assert!(!state.tail_bitten);
                }
                other => panic!("expected a shark, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_crab_walks_the_floor() {
        let tuning = only_kind_tuning(SpawnKind::Crab);
        let difficulty = DifficultyState::initial(&tuning.difficulty);
        for crab in spawn_many(SpawnKind::Crab, &difficulty, &tuning, 22) {
            assert_eq!(crab.kind, EntityKind::Crab);
            assert!(enters_from_edge(&crab, tuning.world_width));
            assert_eq!(crab.pos.y, tuning.world_height - crab.radius);
            assert_eq!(crab.vel.y, 0.0);
        }
    }

    #[test]
    fn test_jellyfish_bobs_inside_the_water() {
        let tuning = only_kind_tuning(SpawnKind::Jellyfish);
        let difficulty = DifficultyState::initial(&tuning.difficulty);
        let amp = tuning.jellyfish.drift_amplitude;
        for jelly in spawn_many(SpawnKind::Jellyfish, &difficulty, &tuning, 23) {
            assert!(enters_from_edge(&jelly, tuning.world_width));
            let EntityKind::Jellyfish { base_y, .. } = jelly.kind else {
                panic!("expected a jellyfish, got {:?}", jelly.kind);
            };
            let r = jelly.radius;
            assert!(base_y >= r + amp && base_y <= tuning.world_height - r - amp);
            assert!((jelly.pos.y - base_y).abs() <= amp + 1e-3);
        }
    }

    #[test]
    fn test_seahorse_enters_from_edge_at_difficulty_speed() {
        let tuning = only_kind_tuning(SpawnKind::Seahorse);
        let difficulty = DifficultyState::at(tuning.difficulty.ramp_duration, &tuning.difficulty);
        let expected_speed = tuning.seahorse.speed * difficulty.speed;
        for seahorse in spawn_many(SpawnKind::Seahorse, &difficulty, &tuning, 24) {
            assert!(enters_from_edge(&seahorse, tuning.world_width));
            assert!(seahorse.pos.y >= seahorse.radius);
            assert!(seahorse.pos.y <= tuning.world_height - seahorse.radius);
            assert_eq!(seahorse.kind, EntityKind::Seahorse { ttl: tuning.seahorse.ttl });
            assert!((seahorse.vel.x.abs() - expected_speed).abs() < 1e-3);
        }
    }

    #[test]
    fn test_ids_are_monotonic() {
        let tuning = only_prey_tuning();
        let mut spawner = SpawnSystem::new(&tuning.spawn);
        let mut rng = Pcg32::seed_from_u64(1);
        let difficulty = DifficultyState::initial(&tuning.difficulty);
        let a = spawner.update(0.0, 1, &difficulty, 0, &tuning, &mut rng);
        let b = spawner.update(5.0, 1, &difficulty, 0, &tuning, &mut rng);
        assert!(b[0].id > a[0].id);
    }

    #[test]
    fn test_tier_gate_delays_spawn() {
        let mut tuning = Tuning::default();
        tuning.spawn.crab.enable_time = 0.0;
        tuning.spawn.crab.min_tier = 2;
        let mut spawner = SpawnSystem::new(&tuning.spawn);
        let mut rng = Pcg32::seed_from_u64(3);
        let difficulty = DifficultyState::initial(&tuning.difficulty);

        let crabs = |spawned: &[Entity]| spawned.iter().filter(|e| e.kind == EntityKind::Crab).count();

        let spawned = spawner.update(10.0, 1, &difficulty, 0, &tuning, &mut rng);
        assert_eq!(crabs(&spawned), 0);
        let spawned = spawner.update(10.1, 2, &difficulty, 0, &tuning, &mut rng);
        assert_eq!(crabs(&spawned), 1);
    }

    #[test]
    fn test_entity_cap_skips_but_reschedules() {
        let mut tuning = only_prey_tuning();
        tuning.max_entities = 3;
        let mut spawner = SpawnSystem::new(&tuning.spawn);
        let mut rng = Pcg32::seed_from_u64(9);
        let difficulty = DifficultyState::initial(&tuning.difficulty);

        assert!(spawner.update(0.0, 1, &difficulty, 3, &tuning, &mut rng).is_empty());
        assert!(spawner.next_spawn_time(SpawnKind::Prey) > 0.0);
    }

    #[test]
    fn test_higher_difficulty_spawns_faster_and_quicker_fish() {
        let tuning = only_prey_tuning();
        let easy = DifficultyState::initial(&tuning.difficulty);
        let hard = DifficultyState::at(tuning.difficulty.ramp_duration, &tuning.difficulty);

        let mut a = SpawnSystem::new(&tuning.spawn);
        let mut b = SpawnSystem::new(&tuning.spawn);
        let fish_easy = a.update(0.0, 1, &easy, 0, &tuning, &mut Pcg32::seed_from_u64(5));
        let fish_hard = b.update(0.0, 1, &hard, 0, &tuning, &mut Pcg32::seed_from_u64(5));
        assert!(b.next_spawn_time(SpawnKind::Prey) < a.next_spawn_time(SpawnKind::Prey));
        assert!(fish_hard[0].vel.x.abs() > fish_easy[0].vel.x.abs());
    }

    #[test]
    fn test_weighted_class_pick() {
        let mut tuning = Tuning::default();
        for (i, class) in tuning.size_classes.iter_mut().enumerate() {
            class.weight = if i == 2 { 1 } else { 0 };
        }
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..50 {
            assert_eq!(pick_size_class(&tuning, &mut rng), SizeClass::Medium);
        }
    }
}
