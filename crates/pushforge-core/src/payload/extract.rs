use serde::Serialize;
use serde_json::{Map, Value};

use crate::APP_NAME;

/// How many characters of the raw payload become the fallback body.
pub const FALLBACK_BODY_CHARS: usize = 200;

/// Displayable notification text, normalized across payload dialects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NotificationContent {
    pub title: String,
    pub subtitle: Option<String>,
    pub body: String,
}

impl NotificationContent {
    fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            body: body.into(),
        }
    }
}

/// Pulls title/subtitle/body out of a payload.
///
/// First match wins: APNs `aps.alert`, FCM `notification`, Web Push
/// top-level `title`, then a synthesized summary of a data-only message.
/// Malformed JSON and unrecognized shapes yield `None`.
pub fn extract_content(text: &str) -> Option<NotificationContent> {
    let Ok(Value::Object(json)) = serde_json::from_str::<Value>(text) else {
        return None;
    };

    apns(&json)
        .or_else(|| fcm(&json))
        .or_else(|| web_push(&json))
        .or_else(|| data_only(&json))
}

/// [`extract_content`] with the caller-side defaults applied: the app name as
/// title and the head of the raw payload as body.
pub fn content_or_default(text: &str) -> NotificationContent {
    extract_content(text).unwrap_or_else(|| {
        NotificationContent::new(APP_NAME, text.chars().take(FALLBACK_BODY_CHARS).collect::<String>())
    })
}

fn str_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

fn apns(json: &Map<String, Value>) -> Option<NotificationContent> {
    match json.get("aps")?.get("alert")? {
        Value::Object(alert) => Some(NotificationContent {
            title: str_field(alert, "title").unwrap_or_else(|| APP_NAME.to_string()),
            subtitle: str_field(alert, "subtitle"),
            body: str_field(alert, "body").unwrap_or_default(),
        }),
        Value::String(alert) => Some(NotificationContent::new(APP_NAME, alert.clone())),
        _ => None,
    }
}

fn fcm(json: &Map<String, Value>) -> Option<NotificationContent> {
    let Value::Object(notification) = json.get("notification")? else {
        return None;
    };
    Some(NotificationContent::new(
        str_field(notification, "title").unwrap_or_else(|| APP_NAME.to_string()),
        str_field(notification, "body").unwrap_or_default(),
    ))
}

fn web_push(json: &Map<String, Value>) -> Option<NotificationContent> {
    let title = str_field(json, "title")?;
    Some(NotificationContent::new(title, str_field(json, "body").unwrap_or_default()))
}

fn data_only(json: &Map<String, Value>) -> Option<NotificationContent> {
    let Value::Object(data) = json.get("data")? else {
        return None;
    };
    let label = str_field(data, "action")
        .or_else(|| str_field(data, "type"))
        .unwrap_or_else(|| "Data Message".to_string());
    let mut keys: Vec<&str> = data.keys().map(String::as_str).collect();
    keys.sort_unstable();
    Some(NotificationContent::new(
        format!("Data: {label}"),
        format!("Fields: {}", keys.join(", ")),
    ))
}
