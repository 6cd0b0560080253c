#[cfg(test)]
mod tests {
    use crate::{EffectKind, EffectRef, Event, EventTag, HpStatus, Player, PokemonIdent, to_id};

    #[test]
    fn test_tag_round_trip_spelling() {
        assert_eq!(EventTag::parse("-damage"), Some(EventTag::Damage));
        assert_eq!(EventTag::parse("switch"), Some(EventTag::Switch));
        assert_eq!(EventTag::VolatileStart.as_str(), "-start");
        assert_eq!(EventTag::parse("-nonsense"), None);
    }

    #[test]
    fn test_parse_ident() {
        let ident = PokemonIdent::parse("p2a: Mr. Mime").unwrap();

        assert_eq!(ident.player, Player::P2);
        assert_eq!(ident.position, Some('a'));
        assert_eq!(ident.name, "Mr. Mime");
        assert_eq!(ident.to_string(), "p2a: Mr. Mime");
    }

    #[test]
    fn test_parse_ident_invalid() {
        assert!(PokemonIdent::parse("p3a: Pikachu").is_none());
        assert!(PokemonIdent::parse("Pikachu").is_none());
    }

    #[test]
    fn test_parse_hp_status() {
        let hp = HpStatus::parse("50/100 slp").unwrap();
        assert_eq!(hp.current, 50);
        assert_eq!(hp.max, Some(100));
        assert_eq!(hp.status.as_deref(), Some("slp"));

        assert!(HpStatus::parse("0 fnt").unwrap().is_fainted());
        assert!(HpStatus::parse("").is_none());
    }

    #[test]
    fn test_event_accessors() {
        let event = Event::new(EventTag::Heal)
            .arg("p2a: Snorlax")
            .arg("94/100")
            .kwarg("from", "item: Leftovers");

        assert_eq!(event.ident(0).unwrap().name, "Snorlax");
        assert_eq!(event.hp_status(1).unwrap().unwrap().current, 94);
        assert_eq!(
            event.from_effect(),
            Some(EffectRef {
                kind: EffectKind::Item,
                name: "Leftovers".to_string()
            })
        );
        assert!(event.require(5).is_err());
        assert_eq!(
            event.to_string(),
            "|-heal|p2a: Snorlax|94/100|[from] item: Leftovers"
        );
    }

    #[test]
    fn test_event_from_json() {
        let json = r#"{"tag":"-sidestart","args":["p1: Alice","move: Stealth Rock"]}"#;
        let event: Event = serde_json::from_str(json).unwrap();

        assert_eq!(event.tag, EventTag::SideStart);
        assert_eq!(event.get(1), Some("move: Stealth Rock"));
        assert!(event.kwargs.is_empty());
    }

    #[test]
    fn test_to_id() {
        assert_eq!(to_id("Flash Fire"), "flashfire");
        assert_eq!(to_id("Heavy-Duty Boots"), "heavydutyboots");
    }
}
