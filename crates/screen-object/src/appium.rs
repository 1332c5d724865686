//! Blocking W3C WebDriver client for a running Appium server.
//!
//! Every [`AutomationDriver`] call maps to one HTTP round trip under
//! `/session/{id}`. Request bodies and response parsing live in free
//! functions so they can be checked without a server.

use std::cell::Cell;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Method;
use serde_json::{json, Map, Value};

use crate::config::AppiumConfig;
use crate::driver::{
    AutomationDriver, BoundingBox, DriverError, DriverResult, ElementRef, Gesture, Orientation,
    Platform, Size,
};
use crate::error::{ScreenError, ScreenResult};
use crate::locator::Locator;

/// W3C element identifier key
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Pre-W3C (JSONWP) element identifier key
pub const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// WebDriver code point for the enter key
pub const ENTER_KEY: &str = "\u{E007}";

/// Per-request HTTP timeout
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// Appium session over HTTP
#[derive(Debug)]
pub struct AppiumDriver {
    base_url: String,
    session_id: String,
    client: Client,
    platform: Platform,
    implicit_wait: Cell<Duration>,
}

impl AppiumDriver {
    /// Create a session with the configured capabilities
    pub fn start(config: &AppiumConfig) -> ScreenResult<Self> {
        let base_url = config.server_url.trim_end_matches('/').to_string();
        let client = build_client()?;
        let url = format!("{base_url}/session");
        let body = new_session_body(&config.capabilities);
        tracing::debug!(%url, "creating appium session");
        let value = send(&client, Method::POST, &url, &body, "new session", "")?;
        let (session_id, platform) = parse_new_session(&value)?;
        tracing::debug!(%session_id, ?platform, "appium session created");
        Ok(Self {
            base_url,
            session_id,
            client,
            platform,
            implicit_wait: Cell::new(Duration::ZERO),
        })
    }

    /// Attach to a session created elsewhere
    pub fn attach(
        server_url: impl Into<String>,
        session_id: impl Into<String>,
        platform: Platform,
    ) -> ScreenResult<Self> {
        Ok(Self {
            base_url: server_url.into().trim_end_matches('/').to_string(),
            session_id: session_id.into(),
            client: build_client()?,
            platform,
            implicit_wait: Cell::new(Duration::ZERO),
        })
    }

    /// Server base URL, without trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session id assigned by the server
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Delete the session
    pub fn quit(self) -> ScreenResult<()> {
        self.command(Method::DELETE, "", &Value::Null, "delete session", "")?;
        tracing::debug!(session_id = %self.session_id, "appium session closed");
        Ok(())
    }

    fn command(
        &self,
        method: Method,
        path: &str,
        body: &Value,
        name: &str,
        subject: &str,
    ) -> DriverResult<Value> {
        let url = format!("{}/session/{}{path}", self.base_url, self.session_id);
        send(&self.client, method, &url, body, name, subject)
    }

    fn element_get(&self, element: &ElementRef, suffix: &str, name: &str) -> DriverResult<Value> {
        self.command(
            Method::GET,
            &format!("/element/{}{suffix}", element.id()),
            &Value::Null,
            name,
            element.id(),
        )
    }

    fn element_post(
        &self,
        element: &ElementRef,
        suffix: &str,
        body: &Value,
        name: &str,
    ) -> DriverResult<Value> {
        self.command(
            Method::POST,
            &format!("/element/{}{suffix}", element.id()),
            body,
            name,
            element.id(),
        )
    }
}

impl AutomationDriver for AppiumDriver {
    fn find_element(&self, locator: &Locator) -> DriverResult<ElementRef> {
        let subject = locator.to_string();
        let value = self.command(
            Method::POST,
            "/element",
            &locator_body(locator),
            "find element",
            &subject,
        )?;
        parse_element(&value)
    }

    fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>> {
        let subject = locator.to_string();
        let value = self.command(
            Method::POST,
            "/elements",
            &locator_body(locator),
            "find elements",
            &subject,
        )?;
        parse_elements(&value)
    }

    fn is_displayed(&self, element: &ElementRef) -> DriverResult<bool> {
        let value = self.element_get(element, "/displayed", "is displayed")?;
        parse_bool(&value, "is displayed")
    }

    fn is_enabled(&self, element: &ElementRef) -> DriverResult<bool> {
        let value = self.element_get(element, "/enabled", "is enabled")?;
        parse_bool(&value, "is enabled")
    }

    fn click(&self, element: &ElementRef) -> DriverResult<()> {
        self.element_post(element, "/click", &json!({}), "click")
            .map(drop)
    }

    fn text(&self, element: &ElementRef) -> DriverResult<String> {
        let value = self.element_get(element, "/text", "get text")?;
        Ok(value_to_string(&value).unwrap_or_default())
    }

    fn attribute(&self, element: &ElementRef, name: &str) -> DriverResult<Option<String>> {
        let value = self.element_get(element, &format!("/attribute/{name}"), "get attribute")?;
        Ok(value_to_string(&value))
    }

    fn rect(&self, element: &ElementRef) -> DriverResult<BoundingBox> {
        let value = self.element_get(element, "/rect", "get rect")?;
        parse_rect(&value)
    }

    fn send_keys(&self, element: &ElementRef, text: &str) -> DriverResult<()> {
        self.element_post(element, "/value", &send_keys_body(text), "send keys")
            .map(drop)
    }

    fn clear(&self, element: &ElementRef) -> DriverResult<()> {
        self.element_post(element, "/clear", &json!({}), "clear")
            .map(drop)
    }

    fn perform_gesture(&self, gesture: &Gesture) -> DriverResult<()> {
        tracing::trace!(?gesture, "performing gesture");
        self.command(
            Method::POST,
            "/actions",
            &pointer_actions(gesture),
            "perform actions",
            "",
        )
        .map(drop)
    }

    fn window_size(&self) -> DriverResult<Size> {
        let value = self.command(Method::GET, "/window/rect", &Value::Null, "window rect", "")?;
        let rect = parse_rect(&value)?;
        Ok(Size::new(rect.width, rect.height))
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    fn set_implicit_wait(&self, wait: Duration) -> DriverResult<()> {
        self.command(
            Method::POST,
            "/timeouts",
            &json!({ "implicit": millis(wait) }),
            "set timeouts",
            "",
        )?;
        self.implicit_wait.set(wait);
        Ok(())
    }

    fn implicit_wait(&self) -> Duration {
        self.implicit_wait.get()
    }

    fn back(&self) -> DriverResult<()> {
        self.command(Method::POST, "/back", &json!({}), "back", "")
            .map(drop)
    }

    fn rotate(&self, orientation: Orientation) -> DriverResult<()> {
        self.command(
            Method::POST,
            "/orientation",
            &json!({ "orientation": orientation.as_str() }),
            "set orientation",
            "",
        )
        .map(drop)
    }

    fn hide_keyboard(&self) -> DriverResult<()> {
        self.command(
            Method::POST,
            "/appium/device/hide_keyboard",
            &json!({}),
            "hide keyboard",
            "",
        )
        .map(drop)
    }

    fn press_enter(&self) -> DriverResult<()> {
        self.command(Method::POST, "/actions", &enter_actions(), "press enter", "")
            .map(drop)
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

fn build_client() -> ScreenResult<Client> {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| ScreenError::Driver(DriverError::Transport {
            message: e.to_string(),
        }))
}

fn send(
    client: &Client,
    method: Method,
    url: &str,
    body: &Value,
    command: &str,
    subject: &str,
) -> DriverResult<Value> {
    tracing::trace!(%method, url, command, "appium request");
    let mut request = client.request(method, url);
    if !body.is_null() {
        request = request.json(body);
    }
    let response = request.send().map_err(|e| DriverError::Transport {
        message: e.to_string(),
    })?;
    let status = response.status();
    let payload: Value = response
        .json()
        .map_err(|e| DriverError::protocol(format!("{command}: unreadable response: {e}")))?;
    if status.is_success() {
        Ok(payload.get("value").cloned().unwrap_or(Value::Null))
    } else {
        Err(map_error(command, subject, &payload))
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// =============================================================================
// REQUEST BODIES
// =============================================================================

/// `POST /session` body: capabilities under `alwaysMatch`
#[must_use]
pub fn new_session_body(capabilities: &Map<String, Value>) -> Value {
    json!({ "capabilities": { "alwaysMatch": capabilities, "firstMatch": [{}] } })
}

/// Find-element body
#[must_use]
pub fn locator_body(locator: &Locator) -> Value {
    json!({ "using": locator.strategy().w3c_using(), "value": locator.value() })
}

/// Element send-keys body
#[must_use]
pub fn send_keys_body(text: &str) -> Value {
    let chars: Vec<String> = text.chars().map(String::from).collect();
    json!({ "text": text, "value": chars })
}

/// Single-finger touch sequence: move, press, hold, move, release
#[must_use]
pub fn pointer_actions(gesture: &Gesture) -> Value {
    let mut steps = vec![
        json!({
            "type": "pointerMove",
            "duration": 0,
            "origin": "viewport",
            "x": gesture.start.x.round() as i64,
            "y": gesture.start.y.round() as i64,
        }),
        json!({ "type": "pointerDown", "button": 0 }),
    ];
    if !gesture.hold.is_zero() {
        steps.push(json!({ "type": "pause", "duration": millis(gesture.hold) }));
    }
    steps.push(json!({
        "type": "pointerMove",
        "duration": millis(gesture.duration),
        "origin": "viewport",
        "x": gesture.end.x.round() as i64,
        "y": gesture.end.y.round() as i64,
    }));
    steps.push(json!({ "type": "pointerUp", "button": 0 }));

    json!({
        "actions": [{
            "type": "pointer",
            "id": "finger1",
            "parameters": { "pointerType": "touch" },
            "actions": steps,
        }]
    })
}

/// Key down and up of the enter key
#[must_use]
pub fn enter_actions() -> Value {
    json!({
        "actions": [{
            "type": "key",
            "id": "keyboard",
            "actions": [
                { "type": "keyDown", "value": ENTER_KEY },
                { "type": "keyUp", "value": ENTER_KEY },
            ],
        }]
    })
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

/// Session id and platform from a new-session `value`
pub fn parse_new_session(value: &Value) -> DriverResult<(String, Platform)> {
    let session_id = value
        .get("sessionId")
        .and_then(Value::as_str)
        .ok_or_else(|| DriverError::protocol("new session response has no sessionId"))?
        .to_string();
    let platform = value
        .pointer("/capabilities/platformName")
        .and_then(Value::as_str)
        .and_then(Platform::from_platform_name)
        .unwrap_or_default();
    Ok((session_id, platform))
}

/// Element reference from a find-element `value`
pub fn parse_element(value: &Value) -> DriverResult<ElementRef> {
    value
        .get(ELEMENT_KEY)
        .or_else(|| value.get(LEGACY_ELEMENT_KEY))
        .and_then(Value::as_str)
        .map(ElementRef::new)
        .ok_or_else(|| DriverError::protocol(format!("not an element reference: {value}")))
}

/// Element references from a find-elements `value`
pub fn parse_elements(value: &Value) -> DriverResult<Vec<ElementRef>> {
    value
        .as_array()
        .ok_or_else(|| DriverError::protocol(format!("expected an element list: {value}")))?
        .iter()
        .map(parse_element)
        .collect()
}

/// Rect from a `{x, y, width, height}` value
pub fn parse_rect(value: &Value) -> DriverResult<BoundingBox> {
    let field = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_f64)
            .ok_or_else(|| DriverError::protocol(format!("rect is missing '{key}': {value}")))
    };
    Ok(BoundingBox::new(
        field("x")?,
        field("y")?,
        field("width")?,
        field("height")?,
    ))
}

fn parse_bool(value: &Value, command: &str) -> DriverResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| DriverError::protocol(format!("{command}: expected a boolean, got {value}")))
}

/// Attribute and text values: `null` is absent, strings as-is, anything
/// else in its JSON form
#[must_use]
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Map a W3C error payload onto [`DriverError`]
#[must_use]
pub fn map_error(command: &str, subject: &str, payload: &Value) -> DriverError {
    let error = payload
        .pointer("/value/error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    let message = payload
        .pointer("/value/message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    match error {
        "no such element" => DriverError::no_such_element(subject),
        "stale element reference" => DriverError::StaleElement {
            element: subject.to_string(),
        },
        _ if message.is_empty() => DriverError::command(command, error),
        _ => DriverError::command(command, format!("{error}: {message}")),
    }
}
