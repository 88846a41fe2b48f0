//! Entities: the player fish, prey, hazards and the bonus seahorse
//!
//! Coordinates are screen space (+y down) in pixels; velocities in px/s.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::{SizeClassTuning, Tuning};

/// Prey size category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    Tiny,
    Small,
    Medium,
    Large,
    Giant,
}

impl SizeClass {
    pub const ALL: [SizeClass; 5] = [
        SizeClass::Tiny,
        SizeClass::Small,
        SizeClass::Medium,
        SizeClass::Large,
        SizeClass::Giant,
    ];

    /// Ordinal 1 (Tiny) ..= 5 (Giant)
    pub fn rank(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.get((rank as usize).checked_sub(1)?).copied()
    }

    pub fn tuning(self, tuning: &Tuning) -> &SizeClassTuning {
        &tuning.size_classes[self.rank() as usize - 1]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeClass::Tiny => "Tiny",
            SizeClass::Small => "Small",
            SizeClass::Medium => "Medium",
            SizeClass::Large => "Large",
            SizeClass::Giant => "Giant",
        }
    }
}

/// Whether a player at `tier` may eat prey of `class`
///
/// A tier-T player counts as size rank T + 1, so anything of rank <= T is
/// strictly smaller.
#[inline]
pub fn can_eat(tier: u8, class: SizeClass) -> bool {
    class.rank() <= tier
}

/// The player-controlled fish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Growth stage, 1..=5, never decreases within a run
    pub tier: u8,
    pub eaten_count: u32,
    /// Seconds of remaining death immunity
    pub invulnerable: f32,
    /// Last horizontal facing (-1 left, +1 right) for rendering
    pub facing: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: 0.0,
            tier: MIN_TIER,
            eaten_count: 0,
            invulnerable: 0.0,
            facing: 1.0,
        }
    }
}

impl Player {
    /// Fresh tier-1 player at the centre of the world
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(tuning.world_width, tuning.world_height) / 2.0,
            radius: tuning.player_radius_for(MIN_TIER),
            ..Self::default()
        }
    }

    /// Move by the input direction for one step, staying inside the world
    pub fn steer(&mut self, direction: Vec2, dt: f32, tuning: &Tuning) {
        // Touch input may carry magnitude < 1; never let it exceed 1
        let direction = direction.clamp_length_max(1.0);
        self.vel = direction * tuning.player_speed;
        self.pos += self.vel * dt;

        let min = Vec2::splat(self.radius);
        let max = Vec2::new(tuning.world_width, tuning.world_height) - self.radius;
        self.pos = self.pos.clamp(min, max.max(min));

        if self.vel.x != 0.0 {
            self.facing = self.vel.x.signum();
        }
        self.invulnerable = (self.invulnerable - dt).max(0.0);
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0.0
    }

    pub fn can_eat(&self, class: SizeClass) -> bool {
        can_eat(self.tier, class)
    }

    /// Count one eaten fish; returns the new tier if a threshold was crossed
    pub fn record_eat(&mut self, tuning: &Tuning) -> Option<u8> {
        self.eaten_count += 1;
        let before = self.tier;
        while self.tier < MAX_TIER
            && self.eaten_count >= tuning.tier_thresholds[self.tier as usize - 1]
        {
            self.tier += 1;
        }
        if self.tier != before {
            self.radius = tuning.player_radius_for(self.tier);
            Some(self.tier)
        } else {
            None
        }
    }

    /// Back to the centre after losing a life; growth is kept
    pub fn respawn(&mut self, tuning: &Tuning) {
        self.pos = Vec2::new(tuning.world_width, tuning.world_height) / 2.0;
        self.vel = Vec2::ZERO;
        self.invulnerable = tuning.respawn_invulnerability;
    }
}

/// What a shark is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SharkMode {
    /// Cruising horizontally at its patrol depth
    Patrol,
    /// Charging at where the player was when the dive began
    Dive { target: Vec2, remaining: f32 },
    /// Returning to patrol depth; cannot dive until the cooldown ends
    Recover { cooldown: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SharkState {
    pub mode: SharkMode,
    /// Patrol direction: -1 (left) or +1 (right)
    pub heading: f32,
    /// Depth the shark patrols at
    pub cruise_y: f32,
    /// Difficulty speed multiplier captured at spawn
    pub speed_scale: f32,
    /// Tail already bitten (bonus is paid once per shark)
    pub tail_bitten: bool,
}

impl SharkState {
    pub fn new(heading: f32, cruise_y: f32, speed_scale: f32) -> Self {
        Self {
            mode: SharkMode::Patrol,
            heading,
            cruise_y,
            speed_scale,
            tail_bitten: false,
        }
    }
}

/// Variant-specific entity data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Prey { class: SizeClass },
    Shark(SharkState),
    Crab,
    /// Drifts sideways while bobbing around `base_y`
    Jellyfish { phase: f32, base_y: f32 },
    /// Bonus pickup, gone when `ttl` runs out
    Seahorse { ttl: f32 },
}

impl EntityKind {
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Prey { .. } => "prey",
            EntityKind::Shark(_) => "shark",
            EntityKind::Crab => "crab",
            EntityKind::Jellyfish { .. } => "jellyfish",
            EntityKind::Seahorse { .. } => "seahorse",
        }
    }

    /// Sharks, crabs and jellyfish kill at any tier
    pub fn is_hazard(&self) -> bool {
        matches!(
            self,
            EntityKind::Shark(_) | EntityKind::Crab | EntityKind::Jellyfish { .. }
        )
    }
}

/// A non-player entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub alive: bool,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            vel,
            radius,
            alive: true,
        }
    }

    /// Shark tail circle (centre, radius), behind the body along the heading
    pub fn shark_tail(&self) -> Option<(Vec2, f32)> {
        match self.kind {
            EntityKind::Shark(shark) => {
                let forward = self
                    .vel
                    .try_normalize()
                    .unwrap_or(Vec2::new(shark.heading, 0.0));
                let center = self.pos - forward * self.radius * SHARK_TAIL_OFFSET;
                Some((center, self.radius * SHARK_TAIL_RADIUS))
            }
            _ => None,
        }
    }

    /// Integrate one step of movement and behaviour
    pub fn advance(&mut self, dt: f32, player_pos: Vec2, tuning: &Tuning) {
        match &mut self.kind {
            EntityKind::Prey { .. } | EntityKind::Crab => {
                self.pos += self.vel * dt;
            }
            EntityKind::Shark(shark) => {
                self.vel = shark_velocity(shark, self.pos, player_pos, dt, tuning);
                self.pos += self.vel * dt;
            }
            EntityKind::Jellyfish { phase, base_y } => {
                let jelly = &tuning.jellyfish;
                *phase = (*phase + jelly.drift_frequency * dt) % std::f32::consts::TAU;
                self.vel.y = jelly.drift_amplitude * jelly.drift_frequency * phase.cos();
                self.pos.x += self.vel.x * dt;
                self.pos.y = *base_y + jelly.drift_amplitude * phase.sin();
            }
            EntityKind::Seahorse { ttl } => {
                *ttl -= dt;
                self.pos += self.vel * dt;
                if *ttl <= 0.0 {
                    self.alive = false;
                }
            }
        }
    }

    /// Past the world edge (plus margin) and still heading away
    pub fn is_offscreen(&self, width: f32, height: f32) -> bool {
        let m = self.radius + OFFSCREEN_MARGIN;
        (self.pos.x < -m && self.vel.x <= 0.0)
            || (self.pos.x > width + m && self.vel.x >= 0.0)
            || (self.pos.y < -m && self.vel.y <= 0.0)
            || (self.pos.y > height + m && self.vel.y >= 0.0)
    }
}

/// Shark steering for one step; may switch the shark's mode
fn shark_velocity(
    shark: &mut SharkState,
    pos: Vec2,
    player_pos: Vec2,
    dt: f32,
    tuning: &Tuning,
) -> Vec2 {
    let st = &tuning.shark;
    let patrol = |shark: &SharkState| {
        // Ease back toward cruise depth while moving along the heading
        let climb = ((shark.cruise_y - pos.y) * 2.0).clamp(-st.patrol_speed, st.patrol_speed);
        Vec2::new(shark.heading * st.patrol_speed, climb) * shark.speed_scale
    };

    match shark.mode {
        SharkMode::Patrol => {
            let dx = player_pos.x - pos.x;
            let ahead = dx.signum() == shark.heading;
            if ahead && dx.abs() < st.dive_range {
                shark.mode = SharkMode::Dive {
                    target: player_pos,
                    remaining: st.dive_duration,
                };
                log::debug!("Shark dives toward ({:.0}, {:.0})", player_pos.x, player_pos.y);
                (player_pos - pos).normalize_or_zero() * st.dive_speed * shark.speed_scale
            } else {
                patrol(shark)
            }
        }
        SharkMode::Dive { target, remaining } => {
            let remaining = remaining - dt;
            let to_target = target - pos;
            if remaining <= 0.0 || to_target.length() < st.dive_speed * shark.speed_scale * dt {
                shark.mode = SharkMode::Recover {
                    cooldown: st.dive_cooldown,
                };
                patrol(shark)
            } else {
                shark.mode = SharkMode::Dive { target, remaining };
                to_target.normalize_or_zero() * st.dive_speed * shark.speed_scale
            }
        }
        SharkMode::Recover { cooldown } => {
            let cooldown = cooldown - dt;
            shark.mode = if cooldown <= 0.0 {
                SharkMode::Patrol
            } else {
                SharkMode::Recover { cooldown }
            };
            patrol(shark)
        }
    }
}
