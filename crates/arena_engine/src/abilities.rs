//! Card abilities.
//!
//! The set is closed, so each ability is a variant of [`Ability`] carrying
//! its own target parameters. [`MatchEngine::use_ability`] checks the
//! common preconditions (turn, own ready card, matching [`AbilityType`],
//! mana) and then hands off to the variant.
//!
//! Shapes:
//!
//! | Ability        | Target                         | Effect                                    |
//! |----------------|--------------------------------|-------------------------------------------|
//! | `Meteor`       | any cell within Manhattan 5    | damage on the cell and its 4 neighbours   |
//! | `DrainSword`   | adjacent enemy card            | damage, caster heals up to its max HP     |
//! | `PiercingShot` | adjacent cell, sets direction  | damage on 3 cells in a line, no blocking  |
//! | `WhirlwindAxe` | none                           | damage on the 8 surrounding cells         |
//! | `Sidestep`     | adjacent enemy card            | damage, then back to the turn-start cell  |
//! | `Cover`        | none                           | redirect nearby hits until next turn      |
//!
//! Area abilities only ever hit opponent cards.

use arena_store::Entity;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::*;
use crate::engine::{MatchEngine, pay};
use crate::error::{MatchError, MatchResult};
use crate::events::GameEvent;
use crate::grid;
use crate::world::{CardView, Changes, MatchState, Outcome, Seat};

/// An ability invocation with its targeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Ability {
    Meteor { x: u32, y: u32 },
    DrainSword { target: Entity },
    PiercingShot { x: u32, y: u32 },
    WhirlwindAxe,
    Sidestep { x: u32, y: u32 },
    Cover,
}

impl Ability {
    /// The [`AbilityType`] a card needs to use this ability.
    #[must_use]
    pub fn ability_type(&self) -> AbilityType {
        match self {
            Self::Meteor { .. } => AbilityType::Meteor,
            Self::DrainSword { .. } => AbilityType::DrainSword,
            Self::PiercingShot { .. } => AbilityType::PiercingShot,
            Self::WhirlwindAxe => AbilityType::WhirlwindAxe,
            Self::Sidestep { .. } => AbilityType::Sidestep,
            Self::Cover => AbilityType::Cover,
        }
    }
}

/// Validated effect of an ability, ready to apply.
enum Effect {
    Damage(Vec<(Entity, u32)>),
    Drain { hits: Vec<(Entity, u32)>, heal: u32 },
    Strike {
        hits: Vec<(Entity, u32)>,
        home: Option<(u32, u32)>,
    },
    Guard,
}

impl MatchEngine {
    /// Uses `card`'s ability.
    ///
    /// # Errors
    ///
    /// Turn and card checks as for [`attack`](Self::attack), `InvalidState`
    /// if the card has a different ability, the variant's own targeting
    /// errors, and `ResourceExhausted` without mana.
    pub fn use_ability(
        &self,
        match_id: Entity,
        actor: Entity,
        card: Entity,
        ability: Ability,
    ) -> MatchResult<Outcome> {
        let (state, seat) = self.load_turn(match_id, actor)?;
        let caster = self.ready_card(&state, actor, card)?;
        let kind = ability.ability_type();
        if caster.ability != Some(kind) {
            return Err(MatchError::InvalidState("card does not have this ability"));
        }
        let effect = self.plan(&state, actor, &caster, ability)?;
        let mana = pay(&state, self.rules().costs.ability(kind))?;

        let t = &self.world().tables;
        let mut changes = Changes::new(Some(match_id));
        self.spend(&mut changes, &state, card, mana);
        changes.emit(GameEvent::AbilityUsed {
            card,
            ability: kind,
        });
        match effect {
            Effect::Damage(hits) => self.resolve_hits(&mut changes, &state, actor, hits),
            Effect::Drain { hits, heal } => {
                self.resolve_hits(&mut changes, &state, actor, hits);
                let current = caster.current_hp.saturating_add(heal).min(caster.max_hp);
                if current != caster.current_hp {
                    changes.set(&t.current_hp, card, CurrentHp(current));
                    changes.emit(GameEvent::CardHealed {
                        card,
                        previous: caster.current_hp,
                        current,
                    });
                }
            }
            Effect::Strike { hits, home } => {
                self.resolve_hits(&mut changes, &state, actor, hits);
                changes.set(&t.sidestep, card, SidestepInitialPosition::default());
                if let Some((x, y)) = home {
                    changes.set(&t.position, card, Position::placed(match_id, x, y));
                    changes.emit(GameEvent::CardMoved {
                        card,
                        from: caster.cell(),
                        to: (x, y),
                    });
                }
            }
            Effect::Guard => {
                let mut cover = state.cover;
                let slot = Some(CoverSlot {
                    card,
                    player: actor,
                });
                match seat {
                    Seat::One => cover.one = slot,
                    Seat::Two => cover.two = slot,
                }
                changes.set(&t.cover, match_id, cover);
                changes.emit(GameEvent::CoverRaised {
                    card,
                    player: actor,
                });
            }
        }

        debug!(%match_id, %card, ability = %kind, mana, "ability used");
        Ok(changes.finish())
    }

    fn plan(
        &self,
        state: &MatchState,
        actor: Entity,
        caster: &CardView,
        ability: Ability,
    ) -> MatchResult<Effect> {
        let params = &self.rules().abilities;
        let origin = grid::cell(caster.x, caster.y);
        let hit_all = |cards: Vec<Entity>, damage: u32| {
            let hits = cards.into_iter().map(|card| (card, damage)).collect();
            Effect::Damage(self.covered(state, actor, hits))
        };

        match ability {
            Ability::Meteor { x, y } => {
                if !state.map.contains(x, y) {
                    return Err(MatchError::OutOfBounds("cell is off the board"));
                }
                let center = grid::cell(x, y);
                if grid::manhattan(origin, center) > params.meteor_range {
                    return Err(MatchError::OutOfBounds("target beyond meteor range"));
                }
                let mut cells = vec![(x, y)];
                cells.extend(grid::area(&state.map, center, &grid::ORTHOGONAL));
                let cards = self.enemies_on(state, actor, &cells);
                Ok(hit_all(cards, params.meteor_damage))
            }
            Ability::DrainSword { target } => {
                let victim = self.enemy_card(state, actor, target)?;
                if grid::manhattan(origin, grid::cell(victim.x, victim.y)) != 1 {
                    return Err(MatchError::OutOfBounds("target is not adjacent"));
                }
                let hits = self.covered(state, actor, vec![(target, params.drain_sword_damage)]);
                Ok(Effect::Drain {
                    hits,
                    heal: params.drain_sword_heal,
                })
            }
            Ability::PiercingShot { x, y } => {
                if !state.map.contains(x, y) {
                    return Err(MatchError::OutOfBounds("cell is off the board"));
                }
                let step = grid::direction(origin, grid::cell(x, y)).ok_or(
                    MatchError::OutOfBounds("direction cell must be orthogonally adjacent"),
                )?;
                let cells = grid::ray(&state.map, origin, step, params.piercing_shot_length);
                let cards = self.enemies_on(state, actor, &cells);
                Ok(hit_all(cards, params.piercing_shot_damage))
            }
            Ability::WhirlwindAxe => {
                let t = &self.world().tables;
                let cells: Vec<(u32, u32)> = self
                    .world()
                    .cards_in(state.id)
                    .into_iter()
                    .filter_map(|card| t.position.get(card))
                    .filter(|at| at.placed && grid::chebyshev(origin, grid::cell(at.x, at.y)) == 1)
                    .map(|at| (at.x, at.y))
                    .collect();
                let cards = self.enemies_on(state, actor, &cells);
                Ok(hit_all(cards, params.whirlwind_axe_damage))
            }
            Ability::Sidestep { x, y } => {
                if !state.map.contains(x, y) {
                    return Err(MatchError::OutOfBounds("cell is off the board"));
                }
                if grid::direction(origin, grid::cell(x, y)).is_none() {
                    return Err(MatchError::OutOfBounds("target is not adjacent"));
                }
                let victim = self
                    .world()
                    .occupant(state.id, x, y)
                    .ok_or(MatchError::InvalidState("no card on target cell"))?;
                self.enemy_card(state, actor, victim)?;
                let hits = self.covered(state, actor, vec![(victim, params.sidestep_damage)]);
                Ok(Effect::Strike {
                    hits,
                    home: self.sidestep_home(state, caster),
                })
            }
            Ability::Cover => Ok(Effect::Guard),
        }
    }

    /// The saved turn-start cell, if the caster has left it and it is free.
    fn sidestep_home(&self, state: &MatchState, caster: &CardView) -> Option<(u32, u32)> {
        let saved = self
            .world()
            .tables
            .sidestep
            .get(caster.id)
            .filter(|saved| saved.active)?;
        let home = (saved.x, saved.y);
        (home != caster.cell() && self.world().occupant(state.id, saved.x, saved.y).is_none())
            .then_some(home)
    }
}
