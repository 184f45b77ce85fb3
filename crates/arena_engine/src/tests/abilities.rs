use crate::abilities::Ability;
use crate::components::*;
use crate::error::{ErrorKind, MatchError};
use crate::events::GameEvent;
use crate::tests::*;

fn arena() -> Fixture {
    started(map(7, 7, 12))
}

#[test]
fn test_ability_requires_matching_type() {
    let f = arena();
    let sakura = f.summon(f.alice, UnitType::Sakura, 1, 1);
    let err = f
        .engine
        .use_ability(f.match_id, f.alice, sakura, Ability::WhirlwindAxe)
        .unwrap_err();
    assert_eq!(err, MatchError::InvalidState("card does not have this ability"));
}

#[test]
fn test_ability_costs_mana_and_action() {
    let f = arena();
    let freya = f.summon(f.alice, UnitType::Freya, 1, 1);
    f.fund(2);
    assert_eq!(
        f.engine
            .use_ability(f.match_id, f.alice, freya, Ability::WhirlwindAxe)
            .unwrap_err(),
        MatchError::ResourceExhausted("not enough mana")
    );

    f.fund(5);
    let outcome = f
        .engine
        .use_ability(f.match_id, f.alice, freya, Ability::WhirlwindAxe)
        .unwrap();
    assert_eq!(f.mana(), 2);
    assert!(outcome.events.contains(&GameEvent::AbilityUsed {
        card: freya,
        ability: AbilityType::WhirlwindAxe,
    }));
    assert_eq!(
        f.engine
            .use_ability(f.match_id, f.alice, freya, Ability::WhirlwindAxe)
            .unwrap_err()
            .kind(),
        ErrorKind::InvalidState
    );
}

#[test]
fn test_meteor_hits_plus_shape_of_enemies() {
    let f = arena();
    let caster = f.summon(f.alice, UnitType::VaanStrife, 2, 2);
    let friend = f.summon(f.alice, UnitType::Freya, 4, 3);
    let center = f.summon(f.bob, UnitType::Sakura, 4, 4);
    let side = f.summon(f.bob, UnitType::Lyra, 5, 4);
    let diagonal = f.summon(f.bob, UnitType::Felguard, 3, 3);
    f.pass_to(f.alice);

    let outcome = f
        .engine
        .use_ability(f.match_id, f.alice, caster, Ability::Meteor { x: 4, y: 4 })
        .unwrap();
    assert_eq!(damage_of(&outcome, center), Some((6, 2)));
    assert_eq!(damage_of(&outcome, side), Some((7, 3)));
    assert_eq!(f.hp(diagonal), Some(10));
    assert_eq!(f.hp(friend), Some(9));
    assert_eq!(f.mana(), 8 - 4);
}

#[test]
fn test_meteor_range_and_empty_target() {
    let f = arena();
    let caster = f.summon(f.alice, UnitType::VaanStrife, 0, 1);
    let err = f
        .engine
        .use_ability(f.match_id, f.alice, caster, Ability::Meteor { x: 6, y: 5 })
        .unwrap_err();
    assert_eq!(err, MatchError::OutOfBounds("target beyond meteor range"));

    let outcome = f
        .engine
        .use_ability(f.match_id, f.alice, caster, Ability::Meteor { x: 1, y: 4 })
        .unwrap();
    assert!(!outcome
        .events
        .iter()
        .any(|event| matches!(event, GameEvent::CardDamaged { .. })));
}

#[test]
fn test_drain_sword_heals_up_to_max() {
    let f = arena();
    let victim = f.summon(f.bob, UnitType::Sakura, 2, 3);
    let caster = f.summon(f.alice, UnitType::Felguard, 2, 2);
    f.set_hp(caster, 9);

    let outcome = f
        .engine
        .use_ability(
            f.match_id,
            f.alice,
            caster,
            Ability::DrainSword { target: victim },
        )
        .unwrap();
    assert_eq!(f.hp(victim), Some(4));
    assert_eq!(f.hp(caster), Some(10));
    assert!(outcome.events.contains(&GameEvent::CardHealed {
        card: caster,
        previous: 9,
        current: 10,
    }));
}

#[test]
fn test_drain_sword_targeting() {
    let f = arena();
    let far = f.summon(f.bob, UnitType::Sakura, 5, 5);
    let caster = f.summon(f.alice, UnitType::Felguard, 2, 2);
    let friend = f.summon(f.alice, UnitType::Sakura, 2, 3);

    let drain = |target| {
        f.engine
            .use_ability(f.match_id, f.alice, caster, Ability::DrainSword { target })
    };
    assert_eq!(drain(far).unwrap_err().kind(), ErrorKind::OutOfBounds);
    assert_eq!(drain(friend).unwrap_err().kind(), ErrorKind::InvalidState);
    assert_eq!(f.hp(caster), Some(10));
}

#[test]
fn test_piercing_shot_passes_through_and_skips_friends() {
    let f = arena();
    let caster = f.summon(f.alice, UnitType::Sakura, 1, 1);
    let friend = f.summon(f.alice, UnitType::Lyra, 3, 1);
    let near = f.summon(f.bob, UnitType::Felguard, 2, 1);
    let far = f.summon(f.bob, UnitType::Madmartigan, 4, 1);
    let beyond = f.summon(f.bob, UnitType::Freya, 5, 1);
    f.pass_to(f.alice);

    f.engine
        .use_ability(
            f.match_id,
            f.alice,
            caster,
            Ability::PiercingShot { x: 2, y: 1 },
        )
        .unwrap();
    assert_eq!(f.hp(near), Some(7));
    assert_eq!(f.hp(far), Some(9));
    assert_eq!(f.hp(friend), Some(7));
    assert_eq!(f.hp(beyond), Some(9));
}

#[test]
fn test_piercing_shot_needs_adjacent_direction() {
    let f = arena();
    let caster = f.summon(f.alice, UnitType::Sakura, 1, 1);
    for (x, y) in [(3, 1), (2, 2), (1, 1)] {
        let err = f
            .engine
            .use_ability(f.match_id, f.alice, caster, Ability::PiercingShot { x, y })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
    }
}

#[test]
fn test_whirlwind_axe_hits_surrounding_enemies() {
    let f = arena();
    let caster = f.summon(f.alice, UnitType::Freya, 2, 2);
    let friend = f.summon(f.alice, UnitType::Lyra, 2, 3);
    let diagonal = f.summon(f.bob, UnitType::Sakura, 1, 1);
    let beside = f.summon(f.bob, UnitType::Felguard, 3, 2);
    let outside = f.summon(f.bob, UnitType::Lyra, 2, 4);
    f.pass_to(f.alice);

    let outcome = f
        .engine
        .use_ability(f.match_id, f.alice, caster, Ability::WhirlwindAxe)
        .unwrap();
    assert_eq!(f.hp(diagonal), Some(3));
    assert_eq!(f.hp(beside), Some(7));
    assert_eq!(f.hp(outside), Some(7));
    assert_eq!(f.hp(friend), Some(7));
    assert_eq!(damage_of(&outcome, friend), None);
}

#[test]
fn test_area_damage_kills_and_finishes() {
    let f = arena();
    let caster = f.summon(f.alice, UnitType::Freya, 3, 5);
    let base = f.base_of(f.bob);
    let guard = f.summon(f.bob, UnitType::Sakura, 4, 6);
    f.pass_to(f.alice);
    f.set_hp(base, 2);
    f.set_hp(guard, 1);

    let outcome = f
        .engine
        .use_ability(f.match_id, f.alice, caster, Ability::WhirlwindAxe)
        .unwrap();
    assert!(outcome.events.contains(&GameEvent::CardDestroyed { card: base }));
    assert!(outcome.events.contains(&GameEvent::CardDestroyed { card: guard }));
    assert_eq!(f.phase(), MatchPhase::Finished { winner: f.alice });
}

#[test]
fn test_sidestep_strikes_adjacent_enemy() {
    let f = arena();
    let lyra = f.summon(f.alice, UnitType::Lyra, 1, 1);
    assert_eq!(
        f.engine.world().tables.sidestep.get(lyra),
        Some(SidestepInitialPosition::saved(1, 1))
    );
    let felguard = f.summon(f.bob, UnitType::Felguard, 1, 2);
    f.pass_to(f.alice);

    let outcome = f
        .engine
        .use_ability(f.match_id, f.alice, lyra, Ability::Sidestep { x: 1, y: 2 })
        .unwrap();
    assert_eq!(damage_of(&outcome, felguard), Some((10, 7)));
    assert_eq!(f.cell_of(lyra), (1, 1));
    assert!(
        !outcome
            .events
            .iter()
            .any(|event| matches!(event, GameEvent::CardMoved { .. }))
    );
    assert!(!f.engine.world().tables.sidestep.get(lyra).unwrap().active);
}

#[test]
fn test_sidestep_targeting() {
    let f = arena();
    let lyra = f.summon(f.alice, UnitType::Lyra, 1, 1);
    f.summon(f.alice, UnitType::Freya, 0, 1);
    f.summon(f.bob, UnitType::Sakura, 2, 2);
    f.pass_to(f.alice);

    let cases = [
        ((9, 1), MatchError::OutOfBounds("cell is off the board")),
        ((2, 2), MatchError::OutOfBounds("target is not adjacent")),
        ((1, 3), MatchError::OutOfBounds("target is not adjacent")),
        ((1, 1), MatchError::OutOfBounds("target is not adjacent")),
        ((1, 0), MatchError::InvalidState("no card on target cell")),
        ((0, 1), MatchError::InvalidState("target is a friendly card")),
    ];
    for ((x, y), expected) in cases {
        let err = f
            .engine
            .use_ability(f.match_id, f.alice, lyra, Ability::Sidestep { x, y })
            .unwrap_err();
        assert_eq!(err, expected, "target ({x}, {y})");
    }
}

#[test]
fn test_sidestep_returns_to_turn_start_cell() {
    let f = arena();
    let lyra = f.summon(f.alice, UnitType::Lyra, 1, 1);
    let felguard = f.summon(f.bob, UnitType::Felguard, 2, 2);
    f.pass_to(f.alice);
    f.relocate(lyra, 2, 1);

    let outcome = f
        .engine
        .use_ability(f.match_id, f.alice, lyra, Ability::Sidestep { x: 2, y: 2 })
        .unwrap();
    assert_eq!(f.hp(felguard), Some(7));
    assert!(outcome.events.contains(&GameEvent::CardMoved {
        card: lyra,
        from: (2, 1),
        to: (1, 1),
    }));
    assert_eq!(f.cell_of(lyra), (1, 1));
    assert_eq!(f.engine.world().occupant(f.match_id, 2, 1), None);
}

#[test]
fn test_sidestep_stays_when_start_cell_taken() {
    let f = arena();
    let lyra = f.summon(f.alice, UnitType::Lyra, 1, 1);
    let freya = f.summon(f.alice, UnitType::Freya, 0, 0);
    f.summon(f.bob, UnitType::Felguard, 2, 2);
    f.pass_to(f.alice);
    f.relocate(lyra, 2, 1);
    f.relocate(freya, 1, 1);

    f.engine
        .use_ability(f.match_id, f.alice, lyra, Ability::Sidestep { x: 2, y: 2 })
        .unwrap();
    assert_eq!(f.cell_of(lyra), (2, 1));
    assert_eq!(f.engine.world().occupant(f.match_id, 1, 1), Some(freya));
}

#[test]
fn test_sidestep_hit_is_covered() {
    let f = arena();
    let guard = f.summon(f.bob, UnitType::Madmartigan, 4, 4);
    let ward = f.summon(f.bob, UnitType::Sakura, 4, 5);
    f.engine
        .use_ability(f.match_id, f.bob, guard, Ability::Cover)
        .unwrap();

    let lyra = f.summon(f.alice, UnitType::Lyra, 3, 5);
    let outcome = f
        .engine
        .use_ability(f.match_id, f.alice, lyra, Ability::Sidestep { x: 4, y: 5 })
        .unwrap();
    assert_eq!(damage_of(&outcome, guard), Some((12, 9)));
    assert_eq!(f.hp(ward), Some(6));
}

#[test]
fn test_cover_redirects_hits_until_owner_turn() {
    let f = arena();
    let guard = f.summon(f.bob, UnitType::Madmartigan, 4, 4);
    let ward = f.summon(f.bob, UnitType::Sakura, 4, 5);
    let outcome = f
        .engine
        .use_ability(f.match_id, f.bob, guard, Ability::Cover)
        .unwrap();
    assert!(outcome.events.contains(&GameEvent::CoverRaised {
        card: guard,
        player: f.bob,
    }));

    let felguard = f.summon(f.alice, UnitType::Felguard, 3, 5);
    let outcome = f.engine.attack(f.match_id, f.alice, felguard, ward).unwrap();
    assert_eq!(damage_of(&outcome, guard), Some((12, 8)));
    assert_eq!(f.hp(ward), Some(6));

    let outcome = f.engine.end_turn(f.match_id, f.alice).unwrap();
    assert!(outcome.events.contains(&GameEvent::CoverExpired { card: guard }));
    let cover = f.engine.world().tables.cover.get(f.match_id).unwrap();
    assert_eq!(cover.two, None);
}

#[test]
fn test_cover_leaves_distant_and_guard_hits_alone() {
    let f = arena();
    let guard = f.summon(f.bob, UnitType::Madmartigan, 1, 5);
    let distant = f.summon(f.bob, UnitType::Sakura, 5, 5);
    f.engine
        .use_ability(f.match_id, f.bob, guard, Ability::Cover)
        .unwrap();

    let first = f.summon(f.alice, UnitType::Felguard, 5, 4);
    let second = f.summon(f.alice, UnitType::Freya, 1, 4);
    f.engine.attack(f.match_id, f.alice, first, distant).unwrap();
    f.engine.attack(f.match_id, f.alice, second, guard).unwrap();

    assert_eq!(f.hp(distant), Some(2));
    assert_eq!(f.hp(guard), Some(9));
}

#[test]
fn test_killed_guard_clears_cover() {
    let f = arena();
    let guard = f.summon(f.bob, UnitType::Madmartigan, 1, 5);
    f.engine
        .use_ability(f.match_id, f.bob, guard, Ability::Cover)
        .unwrap();
    let attacker = f.summon(f.alice, UnitType::Felguard, 1, 4);
    f.set_hp(guard, 2);
    f.engine.attack(f.match_id, f.alice, attacker, guard).unwrap();

    let cover = f.engine.world().tables.cover.get(f.match_id).unwrap();
    assert_eq!(cover, CoverPosition::default());
}
