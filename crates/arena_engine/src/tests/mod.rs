mod abilities;

use arena_store::Entity;

use crate::components::*;
use crate::engine::MatchEngine;
use crate::events::GameEvent;
use crate::rules::RulesConfig;
use crate::world::Outcome;

// ==========================================
// HELPER FUNCTIONS
// ==========================================

/// A started match between `alice` (player one) and `bob`.
struct Fixture {
    engine: MatchEngine,
    alice: Entity,
    bob: Entity,
    match_id: Entity,
}

fn map(width: u32, height: u32, max_placed_cards: u32) -> MapConfig {
    MapConfig {
        width,
        height,
        max_placed_cards,
    }
}

fn started(map: MapConfig) -> Fixture {
    let engine = MatchEngine::new(RulesConfig::default());
    let (alice, _) = engine.register("alice").unwrap();
    let (bob, _) = engine.register("bob").unwrap();
    let created = engine.create_match(alice, map).unwrap();
    let match_id = created.match_id.unwrap();
    engine.join_match(match_id, bob).unwrap();
    Fixture {
        engine,
        alice,
        bob,
        match_id,
    }
}

impl Fixture {
    fn current(&self) -> Entity {
        self.engine
            .world()
            .tables
            .current_player
            .get(self.match_id)
            .unwrap()
            .0
    }

    fn mana(&self) -> u32 {
        self.engine
            .world()
            .tables
            .current_mana
            .get(self.match_id)
            .unwrap()
            .0
    }

    fn turn(&self) -> u32 {
        self.engine
            .world()
            .tables
            .current_turn
            .get(self.match_id)
            .unwrap()
            .0
    }

    fn phase(&self) -> MatchPhase {
        self.engine.world().tables.phase.get(self.match_id).unwrap()
    }

    /// Ends turns until it is `player`'s turn.
    fn pass_to(&self, player: Entity) {
        while self.current() != player {
            self.engine.end_turn(self.match_id, self.current()).unwrap();
        }
    }

    /// Tops up the current player's mana so setup steps never run dry.
    fn fund(&self, mana: u32) {
        self.engine
            .world()
            .tables
            .current_mana
            .set(self.match_id, CurrentMana(mana));
    }

    /// Places a card for `owner` on their turn, paying from topped-up mana.
    fn summon(&self, owner: Entity, unit: UnitType, x: u32, y: u32) -> Entity {
        self.pass_to(owner);
        self.fund(15);
        let outcome = self
            .engine
            .place_card(self.match_id, owner, unit, x, y)
            .unwrap();
        placed_card(&outcome)
    }

    fn hp(&self, card: Entity) -> Option<u32> {
        self.engine
            .world()
            .tables
            .current_hp
            .get(card)
            .map(|hp| hp.0)
    }

    fn set_hp(&self, card: Entity, hp: u32) {
        self.engine
            .world()
            .tables
            .current_hp
            .set(card, CurrentHp(hp));
    }

    /// Puts a card on another cell without spending its action.
    fn relocate(&self, card: Entity, x: u32, y: u32) {
        self.engine
            .world()
            .tables
            .position
            .set(card, Position::placed(self.match_id, x, y));
    }

    fn cell_of(&self, card: Entity) -> (u32, u32) {
        let position = self.engine.world().tables.position.get(card).unwrap();
        (position.x, position.y)
    }

    fn base_of(&self, player: Entity) -> Entity {
        let world = self.engine.world();
        world
            .cards_in(self.match_id)
            .into_iter()
            .find(|card| {
                world.tables.is_base.get(*card) == Some(IsBase(true))
                    && world.tables.owned_by.get(*card) == Some(OwnedBy(player))
            })
            .unwrap()
    }
}

fn placed_card(outcome: &Outcome) -> Entity {
    outcome
        .events
        .iter()
        .find_map(|event| match event {
            GameEvent::CardPlaced { card, .. } => Some(*card),
            _ => None,
        })
        .unwrap()
}

fn damage_of(outcome: &Outcome, card: Entity) -> Option<(u32, u32)> {
    outcome.events.iter().find_map(|event| match event {
        GameEvent::CardDamaged {
            card: hit,
            previous,
            current,
        } if *hit == card => Some((*previous, *current)),
        _ => None,
    })
}
