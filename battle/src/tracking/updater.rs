//! Baseline handling of every event kind

use sleuth_inference::PossibilityArena;
use sleuth_parser::{Dispatch, InconsistencyLog, ParserError};
use sleuth_protocol::{EffectKind, Event, EventTag, Player, PokemonIdent, ProtocolError, to_id};

use super::battle::TrackedBattle;
use crate::types::{PokemonState, SideCondition, Status};

impl Dispatch for TrackedBattle {
    fn dispatch(
        &mut self,
        event: &Event,
        beliefs: &mut PossibilityArena,
        log: &mut InconsistencyLog,
    ) -> Result<(), ParserError> {
        tracing::trace!(%event, "applying event");
        match event.tag {
            // === Battle Initialization ===
            EventTag::Player => {
                let player = parse_player(event.require(0)?)?;
                self.get_or_create_side(player, event.get(1).unwrap_or_default());
            }

            EventTag::Gen => {
                if let Some(generation) = event.get(0).and_then(|g| g.parse().ok()) {
                    self.generation = generation;
                }
            }

            EventTag::Tier => {
                self.tier = event.require(0)?.to_string();
            }

            EventTag::Turn => {
                let turn = event.require(0)?;
                self.turn = turn
                    .parse()
                    .map_err(|_| ParserError::Handler(format!("invalid turn number {turn:?}")))?;
            }

            // === Major Actions ===
            EventTag::Switch | EventTag::Drag => self.handle_switch(event, beliefs)?,

            EventTag::Faint => self.handle_faint(&event.ident(0)?, log),

            EventTag::Move => {
                let ident = event.ident(0)?;
                let move_name = event.require(1)?;
                if let Some(poke) = self.pokemon_mut(&ident) {
                    poke.record_move(move_name);
                }
            }

            // === HP Changes ===
            EventTag::Damage | EventTag::Heal | EventTag::SetHp => {
                let ident = event.ident(0)?;
                if let Some(hp) = event.hp_status(1)? {
                    match self.pokemon_mut(&ident) {
                        Some(poke) => poke.apply_hp_status(&hp),
                        None => log.record(format!("HP change for unseen pokemon {ident}")),
                    }
                }
                self.reveal_source(event, &ident, beliefs)?;
            }

            // === Status ===
            EventTag::Status => {
                let ident = event.ident(0)?;
                let status = Status::from_protocol(event.require(1)?);
                if let Some(poke) = self.pokemon_mut(&ident) {
                    poke.status = status;
                }
            }

            EventTag::CureStatus => {
                let ident = event.ident(0)?;
                let status = event.require(1)?;
                if let Some(poke) = self.pokemon_mut(&ident) {
                    if poke.status.is_none() {
                        log.record(format!("{ident} cured of {status} it was never seen with"));
                    }
                    poke.status = None;
                }
            }

            EventTag::CureTeam => {
                let ident = event.ident(0)?;
                if let Some(side) = self.get_side_mut(ident.player) {
                    for poke in &mut side.pokemon {
                        poke.status = None;
                    }
                }
            }

            // === Items and Abilities ===
            EventTag::Item => {
                let ident = event.ident(0)?;
                self.reveal_item(&ident, event.require(1)?, beliefs)?;
            }

            EventTag::EndItem => {
                let ident = event.ident(0)?;
                self.reveal_item(&ident, event.require(1)?, beliefs)?;
                if let Some(poke) = self.pokemon_mut(&ident) {
                    poke.consume_item();
                }
            }

            EventTag::Ability => {
                let ident = event.ident(0)?;
                self.reveal_ability(&ident, event.require(1)?, beliefs)?;
            }

            // === Side Conditions ===
            EventTag::SideStart => {
                let player = parse_player(event.require(0)?)?;
                if let Some(condition) = SideCondition::from_protocol(event.require(1)?) {
                    self.get_or_create_side(player, "").add_condition(condition);
                }
            }

            EventTag::SideEnd => {
                let player = parse_player(event.require(0)?)?;
                if let (Some(side), Some(condition)) = (
                    self.get_side_mut(player),
                    SideCondition::from_protocol(event.require(1)?),
                ) {
                    side.remove_condition(condition);
                }
            }

            // === Forme changes ===
            EventTag::DetailsChange | EventTag::FormeChange => {
                let ident = event.ident(0)?;
                let species = event.require(1)?.split(", ").next().unwrap_or_default();
                let hp = event.hp_status(2)?;
                if let Some(poke) = self.pokemon_mut(&ident) {
                    poke.species = species.to_string();
                    if let Some(hp) = hp {
                        poke.apply_hp_status(&hp);
                    }
                }
            }

            // === Battle End ===
            EventTag::Win => {
                self.ended = true;
                self.winner = event.get(0).map(str::to_string);
            }

            EventTag::Tie => {
                self.ended = true;
                self.tie = true;
            }

            // === Informational only ===
            EventTag::Init
            | EventTag::TeamSize
            | EventTag::GameType
            | EventTag::Rule
            | EventTag::Start
            | EventTag::Request
            | EventTag::Upkeep
            | EventTag::Cant
            | EventTag::Fail
            | EventTag::Immune
            | EventTag::Miss
            | EventTag::Boost
            | EventTag::Unboost
            | EventTag::Weather
            | EventTag::VolatileStart
            | EventTag::VolatileEnd
            | EventTag::Crit
            | EventTag::SuperEffective
            | EventTag::Resisted
            | EventTag::EndAbility
            | EventTag::Transform
            | EventTag::Activate
            | EventTag::Hint
            | EventTag::Message => {}
        }
        Ok(())
    }
}

impl TrackedBattle {
    fn handle_switch(
        &mut self,
        event: &Event,
        beliefs: &mut PossibilityArena,
    ) -> Result<(), ParserError> {
        let ident = event.ident(0)?;
        let details = event.require(1)?;
        let hp = event.hp_status(2)?;

        let existing = self
            .get_side(ident.player)
            .and_then(|side| side.find_pokemon(&ident.name));
        let index = match existing {
            Some(index) => index,
            None => {
                let mut poke = PokemonState::from_details(ident.name.as_str(), details);
                self.seed_possibilities(&mut poke, ident.player, beliefs);
                let side = self.get_or_create_side(ident.player, "");
                side.pokemon.push(poke);
                side.pokemon.len() - 1
            }
        };

        let side = self.get_or_create_side(ident.player, "");
        if let Some(hp) = hp {
            side.pokemon[index].apply_hp_status(&hp);
        }
        side.set_active(index);
        Ok(())
    }

    fn handle_faint(&mut self, ident: &PokemonIdent, log: &mut InconsistencyLog) {
        let Some(side) = self.get_side_mut(ident.player) else {
            log.record(format!("faint of unseen pokemon {ident}"));
            return;
        };
        let Some(index) = side.find_pokemon(&ident.name) else {
            log.record(format!("faint of unseen pokemon {ident}"));
            return;
        };
        let poke = &mut side.pokemon[index];
        poke.fainted = true;
        poke.hp_current = 0;
        poke.status = None;
        poke.active = false;
        side.clear_active(index);
    }

    /// Narrow whatever a `[from] item:` or `[from] ability:` keyword gives
    /// away. The effect belongs to the `[of]` pokemon when there is one.
    fn reveal_source(
        &mut self,
        event: &Event,
        target: &PokemonIdent,
        beliefs: &mut PossibilityArena,
    ) -> Result<(), ParserError> {
        let Some(effect) = event.from_effect() else {
            return Ok(());
        };
        let holder = event.of_ident().unwrap_or_else(|| target.clone());
        match effect.kind {
            EffectKind::Item => self.reveal_item(&holder, &effect.name, beliefs),
            EffectKind::Ability => self.reveal_ability(&holder, &effect.name, beliefs),
            EffectKind::Move | EffectKind::Other => Ok(()),
        }
    }

    fn reveal_item(
        &mut self,
        ident: &PokemonIdent,
        item: &str,
        beliefs: &mut PossibilityArena,
    ) -> Result<(), ParserError> {
        let Some(poke) = self.pokemon_mut(ident) else {
            return Ok(());
        };
        if let Some(set) = poke.item {
            beliefs.narrow(set, [to_id(item)])?;
        }
        poke.record_item(item);
        Ok(())
    }

    fn reveal_ability(
        &mut self,
        ident: &PokemonIdent,
        ability: &str,
        beliefs: &mut PossibilityArena,
    ) -> Result<(), ParserError> {
        let Some(poke) = self.pokemon_mut(ident) else {
            return Ok(());
        };
        if let Some(set) = poke.ability {
            beliefs.narrow(set, [to_id(ability)])?;
        }
        poke.record_ability(ability);
        Ok(())
    }
}

/// Side reference such as "p2" or "p2: Bob"
fn parse_player(raw: &str) -> Result<Player, ProtocolError> {
    Player::parse(raw).ok_or_else(|| ProtocolError::InvalidIdent(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use sleuth_inference::InferenceError;

    use super::*;
    use crate::dex::Dex;
    use crate::tracking::battle::candidates;

    struct Harness {
        battle: TrackedBattle,
        beliefs: PossibilityArena,
        log: InconsistencyLog,
    }

    impl Harness {
        fn new() -> Self {
            let dex = Dex::from_json(
                r#"{"species": {"gyarados": {"abilities": ["intimidate", "moxie"]}},
                    "items": ["leftovers", "choiceband", "heavydutyboots"]}"#,
            )
            .unwrap();
            let mut battle = TrackedBattle::new(dex);
            battle.set_perspective(Player::P1);
            Self {
                battle,
                beliefs: PossibilityArena::new(),
                log: InconsistencyLog::new(),
            }
        }

        fn apply(&mut self, event: Event) -> Result<(), ParserError> {
            self.battle
                .dispatch(&event, &mut self.beliefs, &mut self.log)
        }

        fn gyarados(&self) -> &PokemonState {
            let ident = PokemonIdent::new(Player::P2, "Gyarados");
            self.battle.pokemon(&ident).unwrap()
        }
    }

    fn switch_in() -> Event {
        Event::new(EventTag::Switch)
            .arg("p2a: Gyarados")
            .arg("Gyarados, L84, M")
            .arg("100/100")
    }

    #[test]
    fn test_update_player() {
        let mut h = Harness::new();
        h.apply(Event::new(EventTag::Player).arg("p2").arg("Bob")).unwrap();
        assert_eq!(h.battle.get_side(Player::P2).unwrap().username, "Bob");
    }

    #[test]
    fn test_update_switch_seeds_possibilities() {
        let mut h = Harness::new();
        h.apply(switch_in()).unwrap();

        let poke = h.gyarados();
        assert!(poke.active);
        assert_eq!(poke.level, 84);
        assert_eq!(
            candidates(&h.beliefs, poke.ability),
            vec!["intimidate", "moxie"]
        );
        assert_eq!(candidates(&h.beliefs, poke.item).len(), 3);

        // Switching back in later reuses the same sets
        h.apply(switch_in()).unwrap();
        assert_eq!(h.beliefs.len(), 2);
        assert_eq!(h.battle.get_side(Player::P2).unwrap().pokemon.len(), 1);
    }

    #[test]
    fn test_update_damage() {
        let mut h = Harness::new();
        h.apply(switch_in()).unwrap();
        h.apply(Event::new(EventTag::Damage).arg("p2a: Gyarados").arg("52/100"))
            .unwrap();

        assert_eq!(h.gyarados().hp_current, 52);
    }

    #[test]
    fn test_damage_to_unseen_pokemon_is_soft() {
        let mut h = Harness::new();
        h.apply(Event::new(EventTag::Damage).arg("p2a: Mew").arg("52/100"))
            .unwrap();

        assert_eq!(h.log.entries().len(), 1);
    }

    #[test]
    fn test_update_status() {
        let mut h = Harness::new();
        h.apply(switch_in()).unwrap();

        h.apply(Event::new(EventTag::Status).arg("p2a: Gyarados").arg("par"))
            .unwrap();
        assert_eq!(h.gyarados().status, Some(Status::Paralysis));

        h.apply(Event::new(EventTag::CureStatus).arg("p2a: Gyarados").arg("par"))
            .unwrap();
        assert!(h.gyarados().status.is_none());
        assert!(h.log.is_empty());
    }

    #[test]
    fn test_cure_without_onset_is_inconsistency() {
        let mut h = Harness::new();
        h.apply(switch_in()).unwrap();

        h.apply(Event::new(EventTag::CureStatus).arg("p2a: Gyarados").arg("slp"))
            .unwrap();

        assert_eq!(h.log.entries().len(), 1);
        assert!(h.log.entries()[0].message.contains("slp"));
    }

    #[test]
    fn test_update_faint() {
        let mut h = Harness::new();
        h.apply(switch_in()).unwrap();
        h.apply(Event::new(EventTag::Faint).arg("p2a: Gyarados")).unwrap();

        let poke = h.gyarados();
        assert!(poke.fainted);
        assert_eq!(poke.hp_current, 0);
        assert!(h.battle.get_side(Player::P2).unwrap().active_pokemon().is_none());
    }

    #[test]
    fn test_item_reveals_narrow() {
        let mut h = Harness::new();
        h.apply(switch_in()).unwrap();

        h.apply(
            Event::new(EventTag::Heal)
                .arg("p2a: Gyarados")
                .arg("100/100")
                .kwarg("from", "item: Leftovers"),
        )
        .unwrap();

        let poke = h.gyarados();
        assert_eq!(poke.known_item.as_deref(), Some("Leftovers"));
        assert_eq!(h.beliefs.known(poke.item.unwrap()), Some("leftovers"));
    }

    #[test]
    fn test_source_of_keyword_names_the_holder() {
        let mut h = Harness::new();
        h.apply(switch_in()).unwrap();
        h.apply(
            Event::new(EventTag::Switch)
                .arg("p1a: Pikachu")
                .arg("Pikachu, L90")
                .arg("100/100"),
        )
        .unwrap();

        h.apply(
            Event::new(EventTag::Ability)
                .arg("p2a: Gyarados")
                .arg("Intimidate")
                .arg("boost"),
        )
        .unwrap();
        h.apply(
            Event::new(EventTag::Damage)
                .arg("p1a: Pikachu")
                .arg("80/100")
                .kwarg("from", "item: Choice Band")
                .kwarg("of", "p2a: Gyarados"),
        )
        .unwrap();

        let poke = h.gyarados();
        assert_eq!(h.beliefs.known(poke.ability.unwrap()), Some("intimidate"));
        assert_eq!(h.beliefs.known(poke.item.unwrap()), Some("choiceband"));
    }

    #[test]
    fn test_end_item_consumes() {
        let mut h = Harness::new();
        h.apply(switch_in()).unwrap();
        h.apply(
            Event::new(EventTag::EndItem)
                .arg("p2a: Gyarados")
                .arg("Heavy-Duty Boots"),
        )
        .unwrap();

        let poke = h.gyarados();
        assert!(poke.item_consumed);
        assert_eq!(h.beliefs.known(poke.item.unwrap()), Some("heavydutyboots"));
    }

    #[test]
    fn test_impossible_reveal_is_fatal() {
        let mut h = Harness::new();
        h.apply(switch_in()).unwrap();

        let err = h
            .apply(
                Event::new(EventTag::Ability)
                    .arg("p2a: Gyarados")
                    .arg("Levitate"),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            ParserError::Inference(InferenceError::Overnarrow { .. })
        ));
        assert_eq!(candidates(&h.beliefs, h.gyarados().ability).len(), 2);
        assert!(h.gyarados().known_ability.is_none());
    }

    #[test]
    fn test_impossible_item_reveal_leaves_known_item() {
        let mut h = Harness::new();
        h.apply(switch_in()).unwrap();
        h.apply(
            Event::new(EventTag::Item)
                .arg("p2a: Gyarados")
                .arg("Leftovers"),
        )
        .unwrap();

        let err = h
            .apply(
                Event::new(EventTag::Heal)
                    .arg("p2a: Gyarados")
                    .arg("100/100")
                    .kwarg("from", "item: Sitrus Berry"),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            ParserError::Inference(InferenceError::Overnarrow { .. })
        ));
        assert_eq!(h.gyarados().known_item.as_deref(), Some("Leftovers"));
    }

    #[test]
    fn test_side_conditions() {
        let mut h = Harness::new();
        h.apply(
            Event::new(EventTag::SideStart)
                .arg("p2: Bob")
                .arg("move: Stealth Rock"),
        )
        .unwrap();
        assert!(h
            .battle
            .get_side(Player::P2)
            .unwrap()
            .has_condition(SideCondition::StealthRock));

        h.apply(
            Event::new(EventTag::SideEnd)
                .arg("p2: Bob")
                .arg("move: Stealth Rock"),
        )
        .unwrap();
        assert!(!h
            .battle
            .get_side(Player::P2)
            .unwrap()
            .has_condition(SideCondition::StealthRock));
    }

    #[test]
    fn test_update_turn_and_win() {
        let mut h = Harness::new();
        h.apply(Event::new(EventTag::Turn).arg("3")).unwrap();
        assert_eq!(h.battle.turn, 3);
        assert!(h.battle.is_active());

        assert!(matches!(
            h.apply(Event::new(EventTag::Turn).arg("three")),
            Err(ParserError::Handler(_))
        ));

        h.apply(Event::new(EventTag::Win).arg("Alice")).unwrap();
        assert!(h.battle.ended);
        assert_eq!(h.battle.winner.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_missing_argument_is_protocol_error() {
        let mut h = Harness::new();
        assert!(matches!(
            h.apply(Event::new(EventTag::Switch)),
            Err(ParserError::Protocol(ProtocolError::MissingArgument { index: 0, .. }))
        ));
    }
}
