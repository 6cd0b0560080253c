//! Replays recorded event logs through the driver and checks what was
//! inferred about the opponent's team.

use sleuth_battle::{Dex, TrackedBattle, candidates, decisions};
use sleuth_parser::{Driver, ParserContext, ParserError};
use sleuth_protocol::{Event, EventTag, Player, PokemonIdent};
use tracing_subscriber::EnvFilter;

const DEX: &str = include_str!("fixtures/dex.json");

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

fn load(fixture: &str) -> Vec<Event> {
    serde_json::from_str(fixture).expect("fixture should be a JSON event list")
}

fn battle() -> TrackedBattle {
    let mut battle = TrackedBattle::new(Dex::from_json(DEX).unwrap());
    battle.set_perspective(Player::P1);
    battle
}

fn opponent(name: &str) -> PokemonIdent {
    PokemonIdent::new(Player::P2, name)
}

#[test]
fn test_rocks_and_intimidate() {
    init_tracing();
    let events = load(include_str!("fixtures/rocks_and_intimidate.json"));
    let mut driver = Driver::new(ParserContext::new(&events, battle()));

    driver.run(decisions::step).unwrap();

    let (battle, beliefs, log) = driver.into_parts();
    assert!(log.is_empty());
    assert_eq!(battle.turn, 4);

    let gyarados = battle.pokemon(&opponent("Gyarados")).unwrap();
    assert_eq!(beliefs.known(gyarados.ability.unwrap()), Some("intimidate"));
    assert_eq!(beliefs.known(gyarados.item.unwrap()), Some("leftovers"));
    assert_eq!(gyarados.hp_current, 26);

    // Clefable took no rock damage: boots or magic guard, still undecided
    let clefable = battle.pokemon(&opponent("Clefable")).unwrap();
    assert_eq!(candidates(&beliefs, clefable.ability).len(), 3);
    assert_eq!(candidates(&beliefs, clefable.item).len(), 3);
    assert_eq!(beliefs.deferred().len(), 1);

    let pikachu = battle
        .pokemon(&PokemonIdent::new(Player::P1, "Pikachu"))
        .unwrap();
    assert_eq!(pikachu.known_moves, ["Stealth Rock", "Thunderbolt"]);
}

#[test]
fn test_magic_guard_inferred_from_leftovers() {
    init_tracing();
    let events = load(include_str!("fixtures/magic_guard.json"));
    let mut driver = Driver::new(ParserContext::new(&events, battle()));

    driver.run(decisions::step).unwrap();

    let (battle, beliefs, _) = driver.into_parts();
    assert!(battle.ended);
    assert_eq!(battle.winner.as_deref(), Some("Alice"));

    // No intimidate on entry
    let gyarados = battle.pokemon(&opponent("Gyarados")).unwrap();
    assert_eq!(beliefs.known(gyarados.ability.unwrap()), Some("moxie"));

    let clefable = battle.pokemon(&opponent("Clefable")).unwrap();
    assert_eq!(beliefs.known(clefable.item.unwrap()), Some("leftovers"));
    assert_eq!(beliefs.known(clefable.ability.unwrap()), Some("magicguard"));
    assert!(beliefs.deferred().is_empty());
    assert_eq!(clefable.hp_current, 66);
}

#[test]
fn test_impossible_reveal_desynchronizes() {
    init_tracing();
    let events = vec![
        Event::new(EventTag::Switch)
            .arg("p2a: Gyarados")
            .arg("Gyarados, L84")
            .arg("100/100"),
        Event::new(EventTag::Turn).arg("1"),
        Event::new(EventTag::Ability)
            .arg("p2a: Gyarados")
            .arg("Levitate"),
        Event::new(EventTag::Turn).arg("2"),
    ];
    let mut driver = Driver::new(ParserContext::new(&events, battle()));

    let err = driver.run(decisions::step).unwrap_err();
    assert!(err.to_string().contains("decision point"));
    assert!(driver.is_desynchronized());

    let err = driver.run(decisions::step).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ParserError>(),
        Some(ParserError::Desynchronized { position: 2, .. })
    ));
}

#[test]
fn test_soft_inconsistency_does_not_stop_replay() {
    init_tracing();
    let events = vec![
        Event::new(EventTag::Switch)
            .arg("p2a: Gyarados")
            .arg("Gyarados, L84")
            .arg("100/100"),
        Event::new(EventTag::CureStatus)
            .arg("p2a: Gyarados")
            .arg("slp"),
        Event::new(EventTag::Turn).arg("1"),
    ];
    let mut driver = Driver::new(ParserContext::new(&events, battle()));

    driver.run(decisions::step).unwrap();

    let (battle, _, log) = driver.into_parts();
    assert_eq!(log.entries().len(), 1);
    assert_eq!(battle.turn, 1);
}
