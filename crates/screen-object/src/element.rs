//! Element Handle - resolve-and-act wrapper around one locator.
//!
//! A handle never caches the driver's element reference: every operation
//! looks the element up again, so a re-rendered screen never leaves a
//! handle holding a stale reference.
//!
//! Error policy:
//!
//! - predicates (`exists`, `enabled`, `checked`, `dynamic_text_exists`)
//!   fold every failure into `false`
//! - actions surface `Interaction` whether the lookup or the action itself
//!   fails; reads surface `NotFound` when the lookup fails
//! - scroll searches surface `ScrollTimeout`

use std::time::Duration;

use crate::driver::{Direction, DriverError, DriverResult, ElementRef, Platform, Rect};
use crate::error::{ScreenError, ScreenResult};
use crate::gesture;
use crate::locator::Locator;
use crate::session::Session;
use crate::wait::SearchState;

/// Handle for one declared element
#[derive(Debug, Clone)]
pub struct ElementHandle {
    session: Session,
    name: String,
    declared: Locator,
    active: Locator,
}

impl ElementHandle {
    /// Create a handle; the active locator starts as the declared one
    #[must_use]
    pub fn new(session: Session, name: impl Into<String>, locator: Locator) -> Self {
        Self {
            session,
            name: name.into(),
            active: locator.clone(),
            declared: locator,
        }
    }

    /// Declared element name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Locator as declared
    #[must_use]
    pub fn locator(&self) -> &Locator {
        &self.declared
    }

    /// Locator used by the next lookup
    #[must_use]
    pub fn active_locator(&self) -> &Locator {
        &self.active
    }

    /// Session this handle drives
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Find the element through the active locator
    pub fn resolve(&self) -> ScreenResult<ElementRef> {
        tracing::trace!(element = %self.name, locator = %self.active, "resolve");
        self.session
            .driver()
            .find_element(&self.active)
            .map_err(|e| self.not_found(&e))
    }

    /// Find the element for `action`; a failed lookup is an interaction failure
    fn resolve_for(&self, action: &str) -> ScreenResult<ElementRef> {
        self.session
            .driver()
            .find_element(&self.active)
            .map_err(|e| self.interaction(action, &e))
    }

    /// Find every element matching the active locator
    pub fn resolve_all(&self) -> ScreenResult<Vec<ElementRef>> {
        self.session
            .driver()
            .find_elements(&self.active)
            .map_err(|e| self.not_found(&e))
    }

    /// Number of elements matching the active locator
    pub fn count(&self) -> ScreenResult<usize> {
        Ok(self.resolve_all()?.len())
    }

    // =========================================================================
    // Predicates
    // =========================================================================

    /// Whether the element is present and displayed; never fails
    #[must_use]
    pub fn exists(&self) -> bool {
        self.is_visible(&self.active)
    }

    /// Whether the element is present and enabled; never fails
    #[must_use]
    pub fn enabled(&self) -> bool {
        let driver = self.session.driver();
        driver
            .find_element(&self.active)
            .and_then(|el| driver.is_enabled(&el))
            .unwrap_or(false)
    }

    /// Checkbox state; never fails.
    ///
    /// Android reports `checked="true"`; iOS reports `value` as `1` or `true`.
    #[must_use]
    pub fn checked(&self) -> bool {
        let attribute = match self.session.platform() {
            Platform::Android => "checked",
            Platform::Ios => "value",
        };
        let driver = self.session.driver();
        driver
            .find_element(&self.active)
            .and_then(|el| driver.attribute(&el, attribute))
            .ok()
            .flatten()
            .is_some_and(|v| matches!(v.trim(), "true" | "1"))
    }

    fn is_visible(&self, locator: &Locator) -> bool {
        let driver = self.session.driver();
        driver
            .find_element(locator)
            .and_then(|el| driver.is_displayed(&el))
            .unwrap_or(false)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Label text: the element text on Android, the `value` attribute on iOS
    pub fn text(&self) -> ScreenResult<String> {
        let el = self.resolve()?;
        self.label_of(&el)
            .map_err(|e| self.interaction("read text of", &e))
    }

    /// Driver text regardless of platform
    pub fn raw_text(&self) -> ScreenResult<String> {
        let el = self.resolve()?;
        self.session
            .driver()
            .text(&el)
            .map_err(|e| self.interaction("read text of", &e))
    }

    /// The `value` attribute, empty when absent
    pub fn value(&self) -> ScreenResult<String> {
        Ok(self.attribute("value")?.unwrap_or_default())
    }

    /// Named attribute
    pub fn attribute(&self, name: &str) -> ScreenResult<Option<String>> {
        let el = self.resolve()?;
        self.session
            .driver()
            .attribute(&el, name)
            .map_err(|e| self.interaction(format!("read attribute '{name}' of"), &e))
    }

    /// Element edges and size
    pub fn position(&self) -> ScreenResult<Rect> {
        let el = self.resolve()?;
        self.rect_of(&el)
    }

    fn rect_of(&self, el: &ElementRef) -> ScreenResult<Rect> {
        self.session
            .driver()
            .rect(el)
            .map(Rect::from)
            .map_err(|e| ScreenError::Geometry {
                element: self.name.clone(),
                locator: self.active.to_string(),
                message: e.to_string(),
            })
    }

    fn label_of(&self, el: &ElementRef) -> Result<String, DriverError> {
        let driver = self.session.driver();
        match driver.platform() {
            Platform::Android => driver.text(el),
            Platform::Ios => Ok(driver.attribute(el, "value")?.unwrap_or_default()),
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Tap the element
    pub fn tap(&self) -> ScreenResult<()> {
        tracing::debug!(element = %self.name, locator = %self.active, "tap");
        let el = self.resolve_for("tap")?;
        self.session
            .driver()
            .click(&el)
            .map_err(|e| self.interaction("tap", &e))
    }

    /// Alias of [`Self::tap`]
    pub fn click(&self) -> ScreenResult<()> {
        self.tap()
    }

    /// Clear then type `text`
    pub fn set_text(&self, text: &str) -> ScreenResult<()> {
        tracing::debug!(element = %self.name, "set text");
        let el = self.resolve_for("set text of")?;
        let driver = self.session.driver();
        driver
            .clear(&el)
            .and_then(|()| driver.send_keys(&el, text))
            .map_err(|e| self.interaction("set text of", &e))
    }

    /// Clear an editable element
    pub fn clear(&self) -> ScreenResult<()> {
        let el = self.resolve_for("clear")?;
        self.session
            .driver()
            .clear(&el)
            .map_err(|e| self.interaction("clear", &e))
    }

    /// Tap only if currently unchecked
    pub fn check(&self) -> ScreenResult<()> {
        if self.checked() {
            return Ok(());
        }
        self.tap()
    }

    /// Tap only if currently checked
    pub fn uncheck(&self) -> ScreenResult<()> {
        if !self.checked() {
            return Ok(());
        }
        self.tap()
    }

    /// Swipe inside the element's own bounds
    pub fn swipe(&self, direction: Direction, duration: Duration) -> ScreenResult<()> {
        let action = format!("swipe {direction} on");
        let el = self.resolve_for(&action)?;
        let rect = self.rect_of(&el)?;
        let gesture = gesture::element_swipe(rect, direction, duration);
        tracing::debug!(element = %self.name, %direction, ?gesture, "element swipe");
        self.session
            .driver()
            .perform_gesture(&gesture)
            .map_err(|e| self.interaction(action, &e))
    }

    /// Scroll the element's content down
    pub fn scroll_element_down(&self) -> ScreenResult<()> {
        self.swipe(Direction::Down, self.session.config().scroll_duration())
    }

    /// Scroll the element's content up
    pub fn scroll_element_up(&self) -> ScreenResult<()> {
        self.swipe(Direction::Up, self.session.config().scroll_duration())
    }

    /// Swipe left across the element
    pub fn swipe_element_left(&self) -> ScreenResult<()> {
        self.swipe(Direction::Left, self.session.config().swipe_duration())
    }

    /// Swipe right across the element
    pub fn swipe_element_right(&self) -> ScreenResult<()> {
        self.swipe(Direction::Right, self.session.config().swipe_duration())
    }

    // =========================================================================
    // Text matching
    // =========================================================================

    /// Whether any match has the expected label, ignoring case and
    /// surrounding or repeated whitespace
    pub fn has_text(&self, expected: &str) -> ScreenResult<bool> {
        Ok(self.find_with_text(expected)?.is_some())
    }

    /// First match whose label equals `expected` under [`Self::has_text`] rules
    pub fn with_text(&self, expected: &str) -> ScreenResult<ElementRef> {
        self.find_with_text(expected)?.ok_or_else(|| {
            ScreenError::not_found(
                self.name.clone(),
                &self.active,
                format!("no element with text '{expected}'"),
            )
        })
    }

    fn find_with_text(&self, expected: &str) -> ScreenResult<Option<ElementRef>> {
        let wanted = normalize_text(expected);
        let found = self
            .resolve_all()?
            .into_iter()
            .find(|el| self.label_of(el).is_ok_and(|label| normalize_text(&label) == wanted));
        Ok(found)
    }

    /// Rewrite the active locator to match elements of the declared type
    /// whose `name`, `resource-id`, `value` or `text` contains `text`.
    ///
    /// Always derived from the declared locator, so a second call replaces
    /// the first.
    pub fn dynamic_locator(&mut self, text: &str) -> &Locator {
        self.active = self.declared.dynamic_text(text);
        &self.active
    }

    /// Rewrite the active locator to an exact `name`/`value`/`text` match
    pub fn exact_locator(&mut self, text: &str) -> &Locator {
        self.active = self.declared.exact_text(text);
        &self.active
    }

    /// Whether an element containing `text` is displayed; never fails
    pub fn dynamic_text_exists(&mut self, text: &str) -> bool {
        self.dynamic_locator(text);
        self.exists()
    }

    /// Label of the element containing `text`, `None` when there is none
    pub fn dynamic_text(&mut self, text: &str) -> ScreenResult<Option<String>> {
        self.dynamic_locator(text);
        match self.text() {
            Ok(label) => Ok(Some(label)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    // =========================================================================
    // Scroll search
    // =========================================================================

    /// Scroll the screen until the element is displayed
    pub fn scroll_to_view(&self, direction: Direction, timeout: Duration) -> ScreenResult<()> {
        self.scroll_search(direction, timeout).map(|_| ())
    }

    /// Scroll the screen until the element is displayed, then tap it once
    pub fn scroll_to_tap(&self, direction: Direction, timeout: Duration) -> ScreenResult<()> {
        self.scroll_search(direction, timeout)?;
        self.tap()
    }

    /// Scroll until an element containing `text` is displayed, then tap it
    pub fn scroll_to_dynamic_tap(
        &mut self,
        text: &str,
        direction: Direction,
        timeout: Duration,
    ) -> ScreenResult<()> {
        self.dynamic_locator(text);
        self.scroll_to_tap(direction, timeout)
    }

    /// Tap the element containing `text`, scrolling down to it if needed
    pub fn tap_dynamic_text(&mut self, text: &str) -> ScreenResult<()> {
        self.dynamic_locator(text);
        self.tap_or_scroll()
    }

    /// Tap the element whose text equals `text`, scrolling down to it if needed
    pub fn tap_dynamic_exact_text(&mut self, text: &str) -> ScreenResult<()> {
        self.exact_locator(text);
        self.tap_or_scroll()
    }

    /// Tap the declared element if displayed, otherwise scroll down to the
    /// element containing `text` and tap that
    pub fn tap_text(&mut self, text: &str) -> ScreenResult<()> {
        if self.exists() {
            return self.tap();
        }
        self.dynamic_locator(text);
        self.scroll_to_tap(Direction::Down, self.session.config().scroll_timeout())
    }

    /// Tap the declared element if displayed, otherwise scroll down to the
    /// element whose text equals `text` and tap that
    pub fn tap_exact_text(&mut self, text: &str) -> ScreenResult<()> {
        if self.exists() {
            return self.tap();
        }
        self.exact_locator(text);
        self.scroll_to_tap(Direction::Down, self.session.config().scroll_timeout())
    }

    fn tap_or_scroll(&self) -> ScreenResult<()> {
        if self.exists() {
            return self.tap();
        }
        self.scroll_to_tap(Direction::Down, self.session.config().scroll_timeout())
    }

    /// Bounded scroll search.
    ///
    /// Every lookup failure inside the loop counts as "not yet visible";
    /// only the overall timeout is a hard failure. The implicit wait is zero
    /// for the duration of the search.
    fn scroll_search(&self, direction: Direction, timeout: Duration) -> ScreenResult<SearchState> {
        tracing::debug!(
            element = %self.name,
            locator = %self.active,
            %direction,
            timeout_ms = timeout.as_millis() as u64,
            "scroll search"
        );
        let session = &self.session;
        let state = session.with_implicit_wait(Duration::ZERO, || {
            session.waiter(timeout).search(
                || self.exists(),
                || {
                    scroll_screen(session, direction)
                        .map_err(|e| self.interaction(format!("scroll {direction} to"), &e))
                },
            )
        })?;

        match state {
            SearchState::Found { attempts } => {
                tracing::debug!(element = %self.name, attempts, "scroll search found element");
                Ok(state)
            }
            _ => Err(ScreenError::ScrollTimeout {
                element: self.name.clone(),
                locator: self.active.to_string(),
                direction: direction.to_string(),
                ms: timeout.as_millis() as u64,
            }),
        }
    }

    fn not_found(&self, err: &DriverError) -> ScreenError {
        ScreenError::not_found(self.name.clone(), &self.active, err.to_string())
    }

    fn interaction(&self, action: impl Into<String>, err: &DriverError) -> ScreenError {
        ScreenError::interaction(self.name.clone(), &self.active, action, err.to_string())
    }
}

/// One window-centred scroll gesture
pub(crate) fn scroll_screen(session: &Session, direction: Direction) -> DriverResult<()> {
    let driver = session.driver();
    let window = driver.window_size()?;
    let gesture = gesture::window_scroll(window, direction, session.config().scroll_duration());
    tracing::trace!(%direction, ?gesture, "scroll screen");
    driver.perform_gesture(&gesture)?;
    Ok(())
}

/// Trim, collapse internal whitespace and lowercase
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::ScreenConfig;
    use crate::driver::{AutomationDriver, BoundingBox, Point};
    use crate::locator::{class, id};
    use crate::mock::{MockDriver, MockElement};
    use proptest::prelude::*;
    use std::rc::Rc;
    use std::time::Instant;

    fn fixture(platform: Platform) -> (Rc<MockDriver>, Session) {
        let driver = Rc::new(MockDriver::new().with_platform(platform));
        let config = ScreenConfig::default()
            .with_poll_interval(1)
            .with_scroll_timeout(2_000);
        let session = Session::new(driver.clone(), config);
        (driver, session)
    }

    mod predicate_tests {
        use super::*;

        #[test]
        fn test_exists_true_when_displayed() {
            let (driver, session) = fixture(Platform::Android);
            driver.add_element(id("login"), MockElement::new("Log in"));
            assert!(session.element("login", id("login")).exists());
        }

        #[test]
        fn test_exists_never_fails() {
            let (driver, session) = fixture(Platform::Android);
            let handle = session.element("ghost", id("ghost"));
            assert!(!handle.exists());

            driver.add_element(id("ghost"), MockElement::default());
            driver.fail_on("is_displayed");
            assert!(!handle.exists());
            driver.fail_on("find_element");
            assert!(!handle.exists());
        }

        #[test]
        fn test_enabled() {
            let (driver, session) = fixture(Platform::Android);
            driver.add_element(id("on"), MockElement::default());
            driver.add_element(id("off"), MockElement::default().disabled());
            assert!(session.element("on", id("on")).enabled());
            assert!(!session.element("off", id("off")).enabled());
            assert!(!session.element("none", id("none")).enabled());
        }

        #[test]
        fn test_checked_per_platform() {
            let (driver, session) = fixture(Platform::Android);
            driver.add_element(id("cb"), MockElement::default().with_attribute("checked", "true"));
            assert!(session.element("cb", id("cb")).checked());

            let (driver, session) = fixture(Platform::Ios);
            driver.add_element(id("cb"), MockElement::default().with_attribute("value", "1"));
            driver.add_element(id("off"), MockElement::default().with_attribute("value", "0"));
            assert!(session.element("cb", id("cb")).checked());
            assert!(!session.element("off", id("off")).checked());
            assert!(!session.element("none", id("none")).checked());
        }
    }

    mod read_tests {
        use super::*;

        #[test]
        fn test_text_is_platform_resolved() {
            let (driver, session) = fixture(Platform::Android);
            driver.add_element(
                id("title"),
                MockElement::new("Welcome").with_attribute("value", "ignored"),
            );
            assert_eq!(session.element("title", id("title")).text().unwrap(), "Welcome");

            let (driver, session) = fixture(Platform::Ios);
            driver.add_element(
                id("title"),
                MockElement::new("ignored").with_attribute("value", "Welcome"),
            );
            let handle = session.element("title", id("title"));
            assert_eq!(handle.text().unwrap(), "Welcome");
            assert_eq!(handle.raw_text().unwrap(), "ignored");
        }

        #[test]
        fn test_value_defaults_to_empty() {
            let (driver, session) = fixture(Platform::Android);
            driver.add_element(id("x"), MockElement::default());
            assert_eq!(session.element("x", id("x")).value().unwrap(), "");
        }

        #[test]
        fn test_text_of_missing_element_is_not_found() {
            let (_driver, session) = fixture(Platform::Android);
            let err = session.element("title", id("title")).text().unwrap_err();
            assert!(err.is_not_found());
            assert!(err.to_string().contains("'title'"));
        }

        #[test]
        fn test_position() {
            let (driver, session) = fixture(Platform::Android);
            driver.add_element(
                id("box"),
                MockElement::default().with_bounds(BoundingBox::new(10.0, 20.0, 30.0, 40.0)),
            );
            let rect = session.element("box", id("box")).position().unwrap();
            assert_eq!(rect.start_x, 10.0);
            assert_eq!(rect.end_x, 40.0);
            assert_eq!(rect.end_y, 60.0);
        }

        #[test]
        fn test_position_without_geometry_is_geometry_error() {
            let (driver, session) = fixture(Platform::Android);
            driver.add_element(id("box"), MockElement::default().without_bounds());
            let err = session.element("box", id("box")).position().unwrap_err();
            assert!(matches!(err, ScreenError::Geometry { .. }));
        }

        #[test]
        fn test_count() {
            let (driver, session) = fixture(Platform::Android);
            for _ in 0..3 {
                driver.add_element(id("row"), MockElement::default());
            }
            assert_eq!(session.element("rows", id("row")).count().unwrap(), 3);
            assert_eq!(session.element("none", id("none")).count().unwrap(), 0);
        }
    }

    mod action_tests {
        use super::*;

        #[test]
        fn test_tap_missing_is_interaction() {
            let (_driver, session) = fixture(Platform::Android);
            let err = session.element("submit", id("submit")).tap().unwrap_err();
            assert!(matches!(err, ScreenError::Interaction { .. }));
            let msg = err.to_string();
            assert!(msg.starts_with("Failed to tap element 'submit' using id=submit"));
            assert!(msg.contains("no such element"), "{msg}");
        }

        #[test]
        fn test_set_text_and_clear_missing_are_interaction() {
            let (_driver, session) = fixture(Platform::Android);
            let handle = session.element("username", id("user"));
            let err = handle.set_text("alice").unwrap_err();
            assert!(matches!(
                err,
                ScreenError::Interaction { ref action, .. } if action == "set text of"
            ));
            let err = handle.clear().unwrap_err();
            assert!(matches!(
                err,
                ScreenError::Interaction { ref action, .. } if action == "clear"
            ));
        }

        #[test]
        fn test_swipe_missing_is_interaction() {
            let (_driver, session) = fixture(Platform::Android);
            let err = session
                .element("pager", id("pager"))
                .swipe(Direction::Left, Duration::from_millis(100))
                .unwrap_err();
            assert!(matches!(
                err,
                ScreenError::Interaction { ref action, .. } if action == "swipe left on"
            ));
        }

        #[test]
        fn test_tap_rejected_is_interaction() {
            let (driver, session) = fixture(Platform::Android);
            driver.add_element(id("submit"), MockElement::default());
            driver.fail_on("click");
            let err = session.element("submit", id("submit")).tap().unwrap_err();
            assert!(matches!(err, ScreenError::Interaction { .. }));
            assert!(err.to_string().starts_with("Failed to tap element 'submit'"));
        }

        #[test]
        fn test_set_text_replaces_content() {
            let (driver, session) = fixture(Platform::Android);
            driver.add_element(id("user"), MockElement::new("old"));
            let handle = session.element("username", id("user"));
            handle.set_text("alice").unwrap();
            assert_eq!(handle.text().unwrap(), "alice");
            handle.clear().unwrap();
            assert_eq!(handle.text().unwrap(), "");
        }

        #[test]
        fn test_check_and_uncheck_are_idempotent() {
            let (driver, session) = fixture(Platform::Android);
            driver.add_element(id("cb"), MockElement::checkbox(false));
            let handle = session.element("cb", id("cb"));
            handle.check().unwrap();
            handle.check().unwrap();
            assert!(handle.checked());
            assert_eq!(driver.call_count("click"), 1);
            handle.uncheck().unwrap();
            assert!(!handle.checked());
            assert_eq!(driver.call_count("click"), 2);
        }

        #[test]
        fn test_element_swipe_uses_configured_duration() {
            let (driver, session) = fixture(Platform::Android);
            driver.add_element(
                id("list"),
                MockElement::default().with_bounds(BoundingBox::new(0.0, 0.0, 100.0, 100.0)),
            );
            let handle = session.element("list", id("list"));
            handle.swipe_element_left().unwrap();
            handle.scroll_element_down().unwrap();
            let gestures = driver.gestures();
            assert_eq!(gestures.len(), 2);
            assert_eq!(gestures[0].duration, Duration::from_millis(2_000));
            assert_eq!(gestures[0].start, Point::new(90.0, 50.0));
            assert_eq!(gestures[1].duration, Duration::from_millis(1_000));
        }
    }

    mod text_match_tests {
        use super::*;

        #[test]
        fn test_has_text_trimmed_case_insensitive() {
            let (driver, session) = fixture(Platform::Android);
            driver.add_element(id("label"), MockElement::new("Welcome"));
            driver.add_element(id("label"), MockElement::new("login"));
            let handle = session.element("label", id("label"));
            assert!(handle.has_text("Login ").unwrap());
            assert!(handle.has_text("  WELCOME").unwrap());
            assert!(!handle.has_text("Logout").unwrap());
        }

        #[test]
        fn test_has_text_without_matches_is_false() {
            let (_driver, session) = fixture(Platform::Android);
            assert!(!session.element("label", id("label")).has_text("x").unwrap());
        }

        #[test]
        fn test_has_text_enumeration_failure_is_error() {
            let (driver, session) = fixture(Platform::Android);
            driver.fail_on("find_elements");
            assert!(session.element("label", id("label")).has_text("x").is_err());
        }

        #[test]
        fn test_with_text_returns_matching_element() {
            let (driver, session) = fixture(Platform::Android);
            driver.add_element(id("item"), MockElement::new("One"));
            let two = driver.add_element(id("item"), MockElement::new("Two"));
            let handle = session.element("item", id("item"));
            assert_eq!(handle.with_text("two").unwrap(), two);
            assert!(handle.with_text("three").unwrap_err().is_not_found());
        }
    }

    mod dynamic_tests {
        use super::*;

        #[test]
        fn test_dynamic_locator_replaces_previous() {
            let (_driver, session) = fixture(Platform::Android);
            let mut handle = session.element("greeting", class("android.widget.TextView"));
            handle.dynamic_locator("Hello");
            let second = handle.dynamic_locator("Bye").clone();
            assert!(second.value().starts_with("//android.widget.TextView["));
            assert!(second.value().contains("'Bye'"));
            assert!(!second.value().contains("'Hello'"));
            assert_eq!(handle.locator(), &class("android.widget.TextView"));
        }

        #[test]
        fn test_dynamic_text_exists_and_read() {
            let (driver, session) = fixture(Platform::Android);
            let declared = id("greeting");
            driver.add_element(declared.dynamic_text("Alice"), MockElement::new("Welcome Alice"));
            let mut handle = session.element("greeting", declared);
            assert!(handle.dynamic_text_exists("Alice"));
            assert_eq!(
                handle.dynamic_text("Alice").unwrap().as_deref(),
                Some("Welcome Alice")
            );
            assert!(!handle.dynamic_text_exists("Bob"));
            assert_eq!(handle.dynamic_text("Bob").unwrap(), None);
        }

        #[test]
        fn test_tap_dynamic_text_visible_taps_without_scrolling() {
            let (driver, session) = fixture(Platform::Android);
            let declared = class("Button");
            driver.add_element(declared.dynamic_text("Save"), MockElement::default());
            session.element("save", declared).tap_dynamic_text("Save").unwrap();
            assert_eq!(driver.call_count("click"), 1);
            assert!(driver.gestures().is_empty());
        }

        #[test]
        fn test_tap_exact_text_scrolls_to_exact_match() {
            let (driver, session) = fixture(Platform::Android);
            let declared = class("Button");
            driver.add_element(declared.exact_text("Pay"), MockElement::default().hidden_for(1));
            session.element("pay", declared).tap_exact_text("Pay").unwrap();
            assert_eq!(driver.call_count("click"), 1);
            assert_eq!(driver.gestures().len(), 1);
        }

        #[test]
        fn test_tap_text_prefers_declared_element() {
            let (driver, session) = fixture(Platform::Android);
            driver.add_element(id("next"), MockElement::default());
            session.element("next", id("next")).tap_text("Next").unwrap();
            assert!(driver.was_called("click:el-0"));
        }
    }

    mod scroll_search_tests {
        use super::*;

        #[test]
        fn test_scroll_to_tap_after_three_hidden_polls() {
            let (driver, session) = fixture(Platform::Android);
            driver.add_element(id("submit_btn"), MockElement::default().hidden_for(3));
            session
                .element("submit", id("submit_btn"))
                .scroll_to_tap(Direction::Down, Duration::from_secs(2))
                .unwrap();
            let gestures = driver.gestures();
            assert_eq!(gestures.len(), 3);
            assert!(gestures.iter().all(|g| g.end.y < g.start.y));
            assert_eq!(driver.call_count("click"), 1);
        }

        #[test]
        fn test_scroll_to_view_times_out() {
            let (driver, session) = fixture(Platform::Android);
            driver.add_element(id("never"), MockElement::default().hidden());
            let start = Instant::now();
            let err = session
                .element("never", id("never"))
                .scroll_to_view(Direction::Down, Duration::from_millis(100))
                .unwrap_err();
            assert!(matches!(err, ScreenError::ScrollTimeout { .. }));
            assert!(start.elapsed() < Duration::from_secs(2));
            assert!(!driver.was_called("click"));
        }

        #[test]
        fn test_lookup_failures_keep_searching() {
            let (driver, session) = fixture(Platform::Android);
            let err = session
                .element("missing", id("missing"))
                .scroll_to_view(Direction::Up, Duration::from_millis(50))
                .unwrap_err();
            assert!(err.is_timeout());
            assert!(!driver.gestures().is_empty());
        }

        #[test]
        fn test_failed_scroll_names_element_and_locator() {
            let (driver, session) = fixture(Platform::Android);
            driver.add_element(id("submit_btn"), MockElement::default().hidden());
            driver.fail_on("perform_gesture");
            driver.set_implicit_wait(Duration::from_secs(5)).unwrap();
            let err = session
                .element("submit", id("submit_btn"))
                .scroll_to_tap(Direction::Down, Duration::from_secs(1))
                .unwrap_err();
            assert!(matches!(
                err,
                ScreenError::Interaction { ref action, .. } if action == "scroll down to"
            ));
            let msg = err.to_string();
            assert!(msg.contains("'submit'"), "{msg}");
            assert!(msg.contains("id=submit_btn"), "{msg}");
            assert!(msg.contains("injected failure"), "{msg}");
            assert_eq!(driver.implicit_wait(), Duration::from_secs(5));
            assert!(!driver.was_called("click"));
        }

        #[test]
        fn test_implicit_wait_zeroed_and_restored() {
            let (driver, session) = fixture(Platform::Android);
            driver.set_implicit_wait(Duration::from_secs(5)).unwrap();
            driver.add_element(id("x"), MockElement::default());
            session
                .element("x", id("x"))
                .scroll_to_view(Direction::Down, Duration::from_secs(1))
                .unwrap();
            assert!(driver.was_called("set_implicit_wait:0"));
            assert_eq!(driver.implicit_wait(), Duration::from_secs(5));
        }

        #[test]
        fn test_scroll_to_dynamic_tap() {
            let (driver, session) = fixture(Platform::Android);
            let declared = class("Cell");
            driver.add_element(declared.dynamic_text("Item 40"), MockElement::default().hidden_for(1));
            session
                .element("cell", declared)
                .scroll_to_dynamic_tap("Item 40", Direction::Down, Duration::from_secs(1))
                .unwrap();
            assert_eq!(driver.gestures().len(), 1);
            assert_eq!(driver.call_count("click"), 1);
        }
    }

    mod property_tests {
        use super::*;

        proptest! {
            #[test]
            fn prop_normalize_ignores_padding_and_case(word in "[A-Za-z]{1,12}", pad in " {0,4}") {
                let padded = format!("{pad}{}{pad}", word.to_uppercase());
                prop_assert_eq!(normalize_text(&padded), word.to_lowercase());
            }

            #[test]
            fn prop_normalize_is_idempotent(text in "[ A-Za-z\t]{0,30}") {
                let once = normalize_text(&text);
                prop_assert_eq!(normalize_text(&once), once.clone());
            }
        }
    }
}
