//! Scripted driver for unit tests.
//!
//! Elements are registered against the exact [`Locator`] a screen declares.
//! Each element carries its own visibility schedule, text, attributes and
//! bounds; the driver records every call so tests can assert on the exact
//! sequence of lookups, taps and gestures.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use crate::driver::{
    AutomationDriver, BoundingBox, DriverError, DriverResult, ElementRef, Gesture, Orientation,
    Platform, Size,
};
use crate::locator::Locator;

/// A scripted UI element
#[derive(Debug, Clone, PartialEq)]
pub struct MockElement {
    /// Visible text
    pub text: String,
    /// Attributes (`value`, `checked`, `name`, ...)
    pub attributes: BTreeMap<String, String>,
    /// Bounding box, `None` when the driver cannot report geometry
    pub bounds: Option<BoundingBox>,
    /// Whether the element accepts input
    pub enabled: bool,
    /// Whether the element is displayed once `hidden_polls` has run out
    pub displayed: bool,
    /// Number of `is_displayed` probes answered with `false` first
    pub hidden_polls: u32,
    /// Whether a tap toggles the checked state
    pub checkable: bool,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            text: String::new(),
            attributes: BTreeMap::new(),
            bounds: Some(BoundingBox::new(0.0, 0.0, 100.0, 40.0)),
            enabled: true,
            displayed: true,
            hidden_polls: 0,
            checkable: false,
        }
    }
}

impl MockElement {
    /// A displayed, enabled element with the given text
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A checkbox in the given state
    #[must_use]
    pub fn checkbox(checked: bool) -> Self {
        let mut element = Self {
            checkable: true,
            ..Self::default()
        };
        element.set_checked(checked);
        element
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the bounding box
    #[must_use]
    pub const fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Report no geometry
    #[must_use]
    pub fn without_bounds(mut self) -> Self {
        self.bounds = None;
        self
    }

    /// Never displayed
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Not displayed for the first `polls` visibility probes
    #[must_use]
    pub const fn hidden_for(mut self, polls: u32) -> Self {
        self.hidden_polls = polls;
        self
    }

    /// Reject input
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    fn set_checked(&mut self, checked: bool) {
        self.attributes
            .insert("checked".to_string(), checked.to_string());
        self.attributes
            .insert("value".to_string(), if checked { "1" } else { "0" }.to_string());
    }

    fn is_checked(&self) -> bool {
        self.attributes.get("checked").is_some_and(|v| v == "true")
    }
}

#[derive(Debug)]
struct MockState {
    elements: Vec<(Locator, MockElement)>,
    platform: Platform,
    window: Size,
    implicit_wait: Duration,
    orientation: Orientation,
    keyboard_shown: bool,
    failures: HashSet<String>,
    gestures: Vec<Gesture>,
    call_history: Vec<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            platform: Platform::Android,
            window: Size::new(400.0, 800.0),
            implicit_wait: Duration::ZERO,
            orientation: Orientation::Portrait,
            keyboard_shown: false,
            failures: HashSet::new(),
            gestures: Vec::new(),
            call_history: Vec::new(),
        }
    }
}

/// Mock driver for testing
#[derive(Debug, Default)]
pub struct MockDriver {
    state: RefCell<MockState>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report the given platform
    #[must_use]
    pub fn with_platform(self, platform: Platform) -> Self {
        self.state.borrow_mut().platform = platform;
        self
    }

    /// Report the given window size
    #[must_use]
    pub fn with_window_size(self, width: f64, height: f64) -> Self {
        self.state.borrow_mut().window = Size::new(width, height);
        self
    }

    /// Register an element under a locator; several elements may share one
    pub fn add_element(&self, locator: Locator, element: MockElement) -> ElementRef {
        let mut state = self.state.borrow_mut();
        state.elements.push((locator, element));
        ElementRef::new(format!("el-{}", state.elements.len() - 1))
    }

    /// Make every call of `command` fail
    pub fn fail_on(&self, command: &str) {
        self.state.borrow_mut().failures.insert(command.to_string());
    }

    /// Stop failing `command`
    pub fn recover(&self, command: &str) {
        self.state.borrow_mut().failures.remove(command);
    }

    /// Pretend the software keyboard is showing
    pub fn show_keyboard(&self) {
        self.state.borrow_mut().keyboard_shown = true;
    }

    /// Whether the software keyboard is showing
    #[must_use]
    pub fn keyboard_shown(&self) -> bool {
        self.state.borrow().keyboard_shown
    }

    /// Current orientation
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.state.borrow().orientation
    }

    /// Snapshot of a registered element
    #[must_use]
    pub fn element(&self, element: &ElementRef) -> Option<MockElement> {
        let state = self.state.borrow();
        index_of(element).and_then(|i| state.elements.get(i).map(|(_, e)| e.clone()))
    }

    /// Every gesture performed so far
    #[must_use]
    pub fn gestures(&self) -> Vec<Gesture> {
        self.state.borrow().gestures.clone()
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state.borrow().call_history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state
            .borrow()
            .call_history
            .iter()
            .any(|c| c.starts_with(method))
    }

    /// Number of recorded calls starting with `method`
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.state
            .borrow()
            .call_history
            .iter()
            .filter(|c| c.starts_with(method))
            .count()
    }

    fn record(&self, command: &str, detail: impl std::fmt::Display) -> DriverResult<()> {
        let mut state = self.state.borrow_mut();
        state.call_history.push(format!("{command}:{detail}"));
        if state.failures.contains(command) {
            return Err(DriverError::command(command, "injected failure"));
        }
        Ok(())
    }

    fn with_element<T>(
        &self,
        element: &ElementRef,
        f: impl FnOnce(&mut MockElement) -> DriverResult<T>,
    ) -> DriverResult<T> {
        let mut state = self.state.borrow_mut();
        let stale = || DriverError::StaleElement {
            element: element.id().to_string(),
        };
        let index = index_of(element).ok_or_else(stale)?;
        let (_, mock) = state.elements.get_mut(index).ok_or_else(stale)?;
        f(mock)
    }
}

fn index_of(element: &ElementRef) -> Option<usize> {
    element.id().strip_prefix("el-")?.parse().ok()
}

impl AutomationDriver for MockDriver {
    fn find_element(&self, locator: &Locator) -> DriverResult<ElementRef> {
        self.record("find_element", locator)?;
        let state = self.state.borrow();
        state
            .elements
            .iter()
            .position(|(l, _)| l == locator)
            .map(|i| ElementRef::new(format!("el-{i}")))
            .ok_or_else(|| DriverError::no_such_element(locator))
    }

    fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>> {
        self.record("find_elements", locator)?;
        let state = self.state.borrow();
        Ok(state
            .elements
            .iter()
            .enumerate()
            .filter(|(_, (l, _))| l == locator)
            .map(|(i, _)| ElementRef::new(format!("el-{i}")))
            .collect())
    }

    fn is_displayed(&self, element: &ElementRef) -> DriverResult<bool> {
        self.record("is_displayed", element)?;
        self.with_element(element, |mock| {
            if mock.hidden_polls > 0 {
                mock.hidden_polls -= 1;
                return Ok(false);
            }
            Ok(mock.displayed)
        })
    }

    fn is_enabled(&self, element: &ElementRef) -> DriverResult<bool> {
        self.record("is_enabled", element)?;
        self.with_element(element, |mock| Ok(mock.enabled))
    }

    fn click(&self, element: &ElementRef) -> DriverResult<()> {
        self.record("click", element)?;
        self.with_element(element, |mock| {
            if mock.checkable {
                let checked = mock.is_checked();
                mock.set_checked(!checked);
            }
            Ok(())
        })
    }

    fn text(&self, element: &ElementRef) -> DriverResult<String> {
        self.record("text", element)?;
        self.with_element(element, |mock| Ok(mock.text.clone()))
    }

    fn attribute(&self, element: &ElementRef, name: &str) -> DriverResult<Option<String>> {
        self.record("attribute", format_args!("{element}:{name}"))?;
        self.with_element(element, |mock| Ok(mock.attributes.get(name).cloned()))
    }

    fn rect(&self, element: &ElementRef) -> DriverResult<BoundingBox> {
        self.record("rect", element)?;
        self.with_element(element, |mock| {
            mock.bounds
                .ok_or_else(|| DriverError::command("rect", "element has no geometry"))
        })
    }

    fn send_keys(&self, element: &ElementRef, text: &str) -> DriverResult<()> {
        self.record("send_keys", format_args!("{element}:{text}"))?;
        self.with_element(element, |mock| {
            mock.text.push_str(text);
            mock.attributes
                .insert("value".to_string(), mock.text.clone());
            Ok(())
        })
    }

    fn clear(&self, element: &ElementRef) -> DriverResult<()> {
        self.record("clear", element)?;
        self.with_element(element, |mock| {
            mock.text.clear();
            mock.attributes.insert("value".to_string(), String::new());
            Ok(())
        })
    }

    fn perform_gesture(&self, gesture: &Gesture) -> DriverResult<()> {
        self.record(
            "perform_gesture",
            format_args!(
                "({},{})->({},{})",
                gesture.start.x, gesture.start.y, gesture.end.x, gesture.end.y
            ),
        )?;
        self.state.borrow_mut().gestures.push(*gesture);
        Ok(())
    }

    fn window_size(&self) -> DriverResult<Size> {
        self.record("window_size", "")?;
        Ok(self.state.borrow().window)
    }

    fn platform(&self) -> Platform {
        self.state.borrow().platform
    }

    fn set_implicit_wait(&self, wait: Duration) -> DriverResult<()> {
        self.record("set_implicit_wait", wait.as_millis())?;
        self.state.borrow_mut().implicit_wait = wait;
        Ok(())
    }

    fn implicit_wait(&self) -> Duration {
        self.state.borrow().implicit_wait
    }

    fn back(&self) -> DriverResult<()> {
        self.record("back", "")
    }

    fn rotate(&self, orientation: Orientation) -> DriverResult<()> {
        self.record("rotate", orientation.as_str())?;
        self.state.borrow_mut().orientation = orientation;
        Ok(())
    }

    fn hide_keyboard(&self) -> DriverResult<()> {
        self.record("hide_keyboard", "")?;
        let mut state = self.state.borrow_mut();
        if !state.keyboard_shown {
            return Err(DriverError::command(
                "hide_keyboard",
                "soft keyboard not present",
            ));
        }
        state.keyboard_shown = false;
        Ok(())
    }

    fn press_enter(&self) -> DriverResult<()> {
        self.record("press_enter", "")
    }
}
