use super::*;

#[test]
fn message_url_appends_message_path() {
    assert_eq!(
        message_url("https://discord.test/api/webhooks/1/abc/", "42"),
        "https://discord.test/api/webhooks/1/abc/messages/42"
    );
    assert_eq!(message_url("https://hook.test/x", "7"), "https://hook.test/x/messages/7");
}

#[test]
fn body_wraps_payload_in_embeds() {
    let payload = BoardPayload::loading("Raids".into(), "Loading Downtown...".into(), None);
    let json = serde_json::to_value(webhook_body(&payload)).unwrap();

    let embeds = json["embeds"].as_array().unwrap();
    assert_eq!(embeds.len(), 1);
    assert_eq!(embeds[0]["title"], "Raids");
    assert_eq!(embeds[0]["footer"]["text"], "Loading Downtown...");
}

#[test]
fn message_response_parses_id() {
    let message: WebhookMessage = serde_json::from_str(r#"{"id":"1234","channel_id":"9"}"#).unwrap();
    assert_eq!(message.id, "1234");
}

#[test]
fn rejected_delivery_reports_body() {
    let err = SinkError::Response { status: 404, body: r#"{"message":"Unknown Message"}"#.into() };
    assert_eq!(err.to_string(), r#"delivery rejected: status 404: {"message":"Unknown Message"}"#);
}
