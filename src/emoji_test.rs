use super::*;

#[test]
fn data_uri_encodes_image_bytes() {
    assert_eq!(data_uri("image/png", b"PNG"), "data:image/png;base64,UE5H");
    assert_eq!(data_uri("image/webp", &[]), "data:image/webp;base64,");
}

#[test]
fn markup_names_the_emoji_by_key() {
    assert_eq!(emoji_markup("mon_150", "998877"), "<:mon_150:998877>");
}

#[test]
fn emojis_url_targets_the_guild() {
    assert_eq!(
        emojis_url("https://discord.test/api/v10/", "42"),
        "https://discord.test/api/v10/guilds/42/emojis"
    );
}

#[test]
fn create_body_carries_name_and_image() {
    let body = CreateEmoji { name: "item_1", image: data_uri("image/png", b"x") };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["name"], "item_1");
    assert_eq!(json["image"], "data:image/png;base64,eA==");
}

#[test]
fn emoji_response_parses_id() {
    let emoji: Emoji = serde_json::from_str(r#"{"id":"41771983429993937","name":"mon_150","roles":[]}"#).unwrap();
    assert_eq!(emoji.id, "41771983429993937");
}
