use super::*;

#[test]
fn format_substitutes_named_params() {
    let locale = Locale::builtin();
    assert_eq!(locale.format("level_egg", &[("level", "5")]), "Level 5 Egg");
    assert_eq!(locale.format("active_raids", &[("x", "3")]), "Active Raids: **3**");
}

#[test]
fn missing_key_renders_as_key() {
    let locale = Locale::builtin();
    assert_eq!(locale.get("no_such_key"), "no_such_key");
}

#[test]
fn overrides_replace_defaults_and_add_names() {
    let locale = Locale::from_json(r#"{"quests": "Quêtes", "mon_25": "Pikachu"}"#).unwrap();
    assert_eq!(locale.get("quests"), "Quêtes");
    assert_eq!(locale.get("raids"), "Raids");
    assert_eq!(locale.creature_name(25), "Pikachu");
}

#[test]
fn unknown_names_fall_back_to_id() {
    let locale = Locale::builtin();
    assert_eq!(locale.creature_name(150), "#150");
    assert_eq!(locale.item_name(1301), "#1301");
    assert_eq!(locale.move_name(14), "#14");
}

#[test]
fn from_json_rejects_nested_values() {
    let err = Locale::from_json(r#"{"quests": {"nested": true}}"#).unwrap_err();
    assert!(matches!(err, LocaleError::Json(_)));
}
