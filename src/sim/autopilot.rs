//! Demo-mode steering
//!
//! Plays the game from the state alone: runs from hazards and bigger fish,
//! chases the nearest thing it can eat, and keeps off the walls. Used for
//! attract mode and the headless runner.

use glam::Vec2;

use super::entity::{EntityKind, can_eat};
use super::state::SimulationState;
use crate::tuning::Tuning;

/// Threats further than this are ignored
const DANGER_RADIUS: f32 = 160.0;
/// Distance from a wall at which the push-back starts
const WALL_MARGIN: f32 = 60.0;
const FLEE_WEIGHT: f32 = 2.5;

/// Steering vector (length <= 1) for the current state
pub fn steer(state: &SimulationState, tuning: &Tuning) -> Vec2 {
    let player = &state.player;
    let tier = player.tier;

    let mut flee = Vec2::ZERO;
    for entity in &state.entities {
        let dangerous = match entity.kind {
            EntityKind::Prey { class } => !can_eat(tier, class),
            EntityKind::Seahorse { .. } => false,
            _ => true,
        };
        if !dangerous {
            continue;
        }
        let away = player.pos - entity.pos;
        let gap = away.length() - entity.radius - player.radius;
        if gap < DANGER_RADIUS {
            // Closer threats dominate
            let weight = 1.0 - gap.max(0.0) / DANGER_RADIUS;
            flee += away.normalize_or_zero() * weight * weight;
        }
    }

    // Nearest edible fish or seahorse
    let target = state
        .entities
        .iter()
        .filter(|e| match e.kind {
            EntityKind::Prey { class } => can_eat(tier, class),
            EntityKind::Seahorse { .. } => true,
            _ => false,
        })
        .min_by(|a, b| {
            let dist_a = a.pos.distance_squared(player.pos);
            let dist_b = b.pos.distance_squared(player.pos);
            dist_a
                .partial_cmp(&dist_b)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let seek = match target {
        Some(entity) => (entity.pos - player.pos).normalize_or_zero(),
        None => {
            // Drift back toward the middle with a slow wobble for variety
            let time_factor = state.time_ticks as f32 * 0.01;
            let center = Vec2::new(tuning.world_width, tuning.world_height) / 2.0
                + Vec2::new(time_factor.sin(), (time_factor * 0.7).cos()) * 80.0;
            let to_center = center - player.pos;
            if to_center.length() > 10.0 {
                to_center.normalize_or_zero() * 0.5
            } else {
                Vec2::ZERO
            }
        }
    };

    let mut wall = Vec2::ZERO;
    let edge = |d: f32| (1.0 - d / WALL_MARGIN).max(0.0);
    wall.x += edge(player.pos.x);
    wall.x -= edge(tuning.world_width - player.pos.x);
    wall.y += edge(player.pos.y);
    wall.y -= edge(tuning.world_height - player.pos.y);

    (seek + flee * FLEE_WEIGHT + wall).clamp_length_max(1.0)
}
