//! Tunable game rules.
//!
//! Everything numeric about the game (mana curve, action prices, ability
//! reach and the unit catalog) lives in [`RulesConfig`]. The defaults are
//! the stock balance; a server can load an override from JSON.

use serde::{Deserialize, Serialize};

use crate::components::{AbilityType, MapConfig, UnitType};

/// Why a rule set was refused.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// The document is not valid JSON for a rule set.
    #[error("malformed rules: {0}")]
    Parse(#[from] serde_json::Error),

    /// The rule set parses but cannot be played.
    #[error("invalid rules: {0}")]
    Invalid(&'static str),
}

/// Mana granted at the start of each turn: `min(base + turn * per_turn, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManaCurve {
    pub base: u32,
    pub per_turn: u32,
    pub max: u32,
}

impl Default for ManaCurve {
    fn default() -> Self {
        Self {
            base: 5,
            per_turn: 1,
            max: 15,
        }
    }
}

impl ManaCurve {
    /// Mana available on `turn`.
    #[must_use]
    pub fn allotment(&self, turn: u32) -> u32 {
        self.base
            .saturating_add(turn.saturating_mul(self.per_turn))
            .min(self.max)
    }
}

/// Mana price of every action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionCosts {
    pub summon: u32,
    pub movement: u32,
    pub attack: u32,
    pub meteor: u32,
    pub drain_sword: u32,
    pub piercing_shot: u32,
    pub whirlwind_axe: u32,
    pub sidestep: u32,
    pub cover: u32,
}

impl Default for ActionCosts {
    fn default() -> Self {
        Self {
            summon: 3,
            movement: 2,
            attack: 2,
            meteor: 4,
            drain_sword: 4,
            piercing_shot: 3,
            whirlwind_axe: 3,
            sidestep: 4,
            cover: 4,
        }
    }
}

impl ActionCosts {
    #[must_use]
    pub fn ability(&self, ability: AbilityType) -> u32 {
        match ability {
            AbilityType::Meteor => self.meteor,
            AbilityType::DrainSword => self.drain_sword,
            AbilityType::PiercingShot => self.piercing_shot,
            AbilityType::WhirlwindAxe => self.whirlwind_axe,
            AbilityType::Sidestep => self.sidestep,
            AbilityType::Cover => self.cover,
        }
    }
}

/// Reach and strength of abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityParams {
    pub meteor_range: u32,
    pub meteor_damage: u32,
    pub drain_sword_damage: u32,
    pub drain_sword_heal: u32,
    pub piercing_shot_damage: u32,
    pub piercing_shot_length: u32,
    pub whirlwind_axe_damage: u32,
    pub sidestep_damage: u32,
    pub cover_range: u32,
}

impl Default for AbilityParams {
    fn default() -> Self {
        Self {
            meteor_range: 5,
            meteor_damage: 4,
            drain_sword_damage: 2,
            drain_sword_heal: 2,
            piercing_shot_damage: 3,
            piercing_shot_length: 3,
            whirlwind_axe_damage: 3,
            sidestep_damage: 3,
            cover_range: 2,
        }
    }
}

/// Accepted board sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapLimits {
    pub min_side: u32,
    pub max_side: u32,
}

impl Default for MapLimits {
    fn default() -> Self {
        Self {
            min_side: 3,
            max_side: 32,
        }
    }
}

impl MapLimits {
    /// Returns `true` if a match may be created on `map`.
    ///
    /// Both sides must be within limits, the bases must land on different
    /// rows, and the placement budget must leave room for the two bases.
    #[must_use]
    pub fn accepts(&self, map: &MapConfig) -> bool {
        let side_ok = |side: u32| (self.min_side..=self.max_side).contains(&side);
        let Some(cells) = map.width.checked_mul(map.height) else {
            return false;
        };
        side_ok(map.width)
            && side_ok(map.height)
            && map.height >= 2
            && map.max_placed_cards >= 2
            && map.max_placed_cards <= cells.saturating_sub(2)
    }
}

/// Catalog entry for a summonable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    pub unit: UnitType,
    pub attack_damage: u32,
    pub max_hp: u32,
    pub movement_speed: u32,
    pub ability: Option<AbilityType>,
}

impl UnitStats {
    const fn new(
        unit: UnitType,
        attack_damage: u32,
        max_hp: u32,
        movement_speed: u32,
        ability: AbilityType,
    ) -> Self {
        Self {
            unit,
            attack_damage,
            max_hp,
            movement_speed,
            ability: Some(ability),
        }
    }
}

/// The full rule set a [`MatchEngine`](crate::MatchEngine) runs with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub mana: ManaCurve,
    pub costs: ActionCosts,
    pub abilities: AbilityParams,
    pub map_limits: MapLimits,
    pub base_max_hp: u32,
    pub units: Vec<UnitStats>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            mana: ManaCurve::default(),
            costs: ActionCosts::default(),
            abilities: AbilityParams::default(),
            map_limits: MapLimits::default(),
            base_max_hp: 20,
            units: vec![
                UnitStats::new(UnitType::VaanStrife, 3, 8, 2, AbilityType::Meteor),
                UnitStats::new(UnitType::Felguard, 4, 10, 2, AbilityType::DrainSword),
                UnitStats::new(UnitType::Sakura, 2, 6, 3, AbilityType::PiercingShot),
                UnitStats::new(UnitType::Freya, 3, 9, 2, AbilityType::WhirlwindAxe),
                UnitStats::new(UnitType::Lyra, 2, 7, 4, AbilityType::Sidestep),
                UnitStats::new(UnitType::Madmartigan, 3, 12, 1, AbilityType::Cover),
            ],
        }
    }
}

impl RulesConfig {
    /// Parses and validates a rule set from JSON. Missing fields keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// [`RulesError::Parse`] for a malformed document, otherwise whatever
    /// [`validate`](Self::validate) reports.
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Checks that every board the limits admit can hold both bases, and
    /// that every card starts alive.
    ///
    /// # Errors
    ///
    /// [`RulesError::Invalid`] naming the first broken limit.
    pub fn validate(&self) -> Result<(), RulesError> {
        let limits = &self.map_limits;
        if limits.min_side < 2 {
            return Err(RulesError::Invalid("map_limits.min_side must be at least 2"));
        }
        if limits.min_side > limits.max_side {
            return Err(RulesError::Invalid("map_limits.min_side exceeds max_side"));
        }
        if limits.max_side.checked_mul(limits.max_side).is_none() {
            return Err(RulesError::Invalid("map_limits.max_side is too large"));
        }
        if self.base_max_hp == 0 {
            return Err(RulesError::Invalid("base_max_hp must be positive"));
        }
        if self.units.iter().any(|stats| stats.max_hp == 0) {
            return Err(RulesError::Invalid("unit max_hp must be positive"));
        }
        Ok(())
    }

    /// Catalog stats of `unit`, if it is summonable.
    #[must_use]
    pub fn unit(&self, unit: UnitType) -> Option<&UnitStats> {
        self.units.iter().find(|stats| stats.unit == unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mana_curve() {
        let curve = ManaCurve::default();
        assert_eq!(curve.allotment(1), 6);
        assert_eq!(curve.allotment(4), 9);
        assert_eq!(curve.allotment(10), 15);
        assert_eq!(curve.allotment(u32::MAX), 15);
    }

    #[test]
    fn test_every_placeable_unit_has_stats() {
        let rules = RulesConfig::default();
        for unit in UnitType::PLACEABLE {
            assert!(rules.unit(unit).is_some(), "{unit} missing from catalog");
        }
        assert!(rules.unit(UnitType::Base).is_none());
    }

    #[test]
    fn test_map_limits() {
        let limits = MapLimits::default();
        let map = |width, height, max_placed_cards| MapConfig {
            width,
            height,
            max_placed_cards,
        };
        assert!(limits.accepts(&map(5, 5, 4)));
        assert!(!limits.accepts(&map(2, 5, 4)));
        assert!(!limits.accepts(&map(5, 33, 4)));
        assert!(!limits.accepts(&map(3, 3, 8)));
        assert!(!limits.accepts(&map(5, 5, 1)));
    }

    #[test]
    fn test_single_row_board_is_refused() {
        let limits = MapLimits {
            min_side: 1,
            max_side: 32,
        };
        let row = MapConfig {
            width: 4,
            height: 1,
            max_placed_cards: 2,
        };
        assert!(!limits.accepts(&row));
    }

    #[test]
    fn test_huge_sides_do_not_overflow() {
        let limits = MapLimits {
            min_side: 2,
            max_side: u32::MAX,
        };
        let huge = MapConfig {
            width: u32::MAX,
            height: u32::MAX,
            max_placed_cards: 4,
        };
        assert!(!limits.accepts(&huge));
    }

    #[test]
    fn test_validate_rejects_unplayable_limits() {
        for json in [
            r#"{ "map_limits": { "min_side": 1, "max_side": 32 } }"#,
            r#"{ "map_limits": { "min_side": 0, "max_side": 32 } }"#,
            r#"{ "map_limits": { "min_side": 8, "max_side": 4 } }"#,
            r#"{ "map_limits": { "min_side": 3, "max_side": 100000 } }"#,
            r#"{ "base_max_hp": 0 }"#,
        ] {
            let err = RulesConfig::from_json(json).unwrap_err();
            assert!(matches!(err, RulesError::Invalid(_)), "{json} accepted");
        }
        assert!(RulesConfig::default().validate().is_ok());
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let err = RulesConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, RulesError::Parse(_)));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let rules = RulesConfig::from_json(r#"{ "costs": { "summon": 1 }, "base_max_hp": 30 }"#)
            .unwrap();
        assert_eq!(rules.costs.summon, 1);
        assert_eq!(rules.costs.attack, 2);
        assert_eq!(rules.base_max_hp, 30);
        assert_eq!(rules.units.len(), 6);
    }
}
