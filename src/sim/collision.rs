//! Collision detection and size-relative resolution
//!
//! Each tick the player is tested against every live entity (circle overlap).
//! Overlaps are classified against the player's tier at the start of the
//! tick, then resolved in a fixed order: bonuses, consumes, tail bites,
//! deaths. A tier gained mid-tick never retroactively changes what killed
//! the player, and at most one life is lost per tick.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind, Player, SharkMode, SizeClass, can_eat};
use crate::circles_overlap;
use crate::tuning::Tuning;

/// What killed the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    BiggerFish,
    Shark,
    Crab,
    Jellyfish,
}

/// Raw overlap, classified but not yet applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Consume { id: u32, class: SizeClass },
    TailBite { id: u32 },
    Bonus { id: u32 },
    Death { id: u32, cause: DeathCause },
}

impl Contact {
    pub fn entity_id(&self) -> u32 {
        match *self {
            Contact::Consume { id, .. }
            | Contact::TailBite { id }
            | Contact::Bonus { id }
            | Contact::Death { id, .. } => id,
        }
    }

    /// Resolution order; lower goes first
    fn priority(&self) -> u8 {
        match self {
            Contact::Bonus { .. } => 0,
            Contact::Consume { .. } => 1,
            Contact::TailBite { .. } => 2,
            Contact::Death { .. } => 3,
        }
    }
}

/// Outcome of a resolved contact, consumed by the state reducer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionEvent {
    Eaten { id: u32, class: SizeClass, points: u64 },
    TailBitten { id: u32, points: u64 },
    SeahorseCollected { id: u32, points: u64, extra_life: bool },
    Died { cause: DeathCause },
}

/// Classify every overlap between the player and `entities` at `tier`
pub fn detect(player: &Player, entities: &[Entity], tier: u8) -> Vec<Contact> {
    let mut contacts = Vec::new();

    for entity in entities.iter().filter(|e| e.alive) {
        let body_hit = circles_overlap(player.pos, player.radius, entity.pos, entity.radius);
        let id = entity.id;

        let contact = match entity.kind {
            EntityKind::Prey { class } if body_hit => Some(if can_eat(tier, class) {
                Contact::Consume { id, class }
            } else {
                Contact::Death { id, cause: DeathCause::BiggerFish }
            }),
            EntityKind::Shark(_) if body_hit => Some(Contact::Death { id, cause: DeathCause::Shark }),
            EntityKind::Shark(shark) if !shark.tail_bitten => entity
                .shark_tail()
                .filter(|(tail, r)| circles_overlap(player.pos, player.radius, *tail, *r))
                .map(|_| Contact::TailBite { id }),
            EntityKind::Crab if body_hit => Some(Contact::Death { id, cause: DeathCause::Crab }),
            EntityKind::Jellyfish { .. } if body_hit => {
                Some(Contact::Death { id, cause: DeathCause::Jellyfish })
            }
            EntityKind::Seahorse { .. } if body_hit => Some(Contact::Bonus { id }),
            _ => None,
        };

        if let Some(contact) = contact {
            contacts.push(contact);
        }
    }

    contacts
}

/// Turn contacts into events in deterministic order
///
/// Seahorses roll their extra life from `rng`. Deaths are dropped while
/// `invulnerable`; otherwise only the first (lowest id) death counts.
pub fn resolve<R: Rng + ?Sized>(
    mut contacts: Vec<Contact>,
    invulnerable: bool,
    tuning: &Tuning,
    rng: &mut R,
) -> Vec<CollisionEvent> {
    contacts.sort_by_key(|c| (c.priority(), c.entity_id()));

    let mut events = Vec::with_capacity(contacts.len());
    let mut died = false;

    for contact in contacts {
        match contact {
            Contact::Bonus { id } => {
                let extra_life = rng.random_bool(tuning.seahorse.extra_life_chance.clamp(0.0, 1.0));
                events.push(CollisionEvent::SeahorseCollected {
                    id,
                    points: tuning.seahorse.points,
                    extra_life,
                });
            }
            Contact::Consume { id, class } => {
                events.push(CollisionEvent::Eaten {
                    id,
                    class,
                    points: class.tuning(tuning).points,
                });
            }
            Contact::TailBite { id } => {
                events.push(CollisionEvent::TailBitten {
                    id,
                    points: tuning.shark.tail_points,
                });
            }
            Contact::Death { cause, .. } => {
                if !invulnerable && !died {
                    died = true;
                    events.push(CollisionEvent::Died { cause });
                }
            }
        }
    }

    events
}

/// Detect, resolve and apply entity-side effects for one tick
///
/// Eaten prey and collected seahorses are removed; bitten sharks are marked
/// and pushed into recovery. Score, growth and lives are left to the caller.
pub fn run<R: Rng + ?Sized>(
    player: &Player,
    entities: &mut Vec<Entity>,
    tuning: &Tuning,
    rng: &mut R,
) -> Vec<CollisionEvent> {
    let contacts = detect(player, entities, player.tier);
    if contacts.is_empty() {
        return Vec::new();
    }
    let events = resolve(contacts, player.is_invulnerable(), tuning, rng);

    for event in &events {
        match *event {
            CollisionEvent::Eaten { id, .. } | CollisionEvent::SeahorseCollected { id, .. } => {
                if let Some(entity) = entities.iter_mut().find(|e| e.id == id) {
                    entity.alive = false;
                }
            }
            CollisionEvent::TailBitten { id, .. } => {
                if let Some(entity) = entities.iter_mut().find(|e| e.id == id) {
                    if let EntityKind::Shark(shark) = &mut entity.kind {
                        shark.tail_bitten = true;
                        shark.mode = SharkMode::Recover {
                            cooldown: tuning.shark.dive_cooldown,
                        };
                    }
                }
            }
            CollisionEvent::Died { .. } => {}
        }
    }
    entities.retain(|e| e.alive);

    events
}
