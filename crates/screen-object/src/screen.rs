//! Screen Object Model Support
//!
//! A [`Screen`] is a named set of accessor bundles sharing one [`Session`].
//! Screens are declared with [`ScreenBuilder`] at runtime or with the
//! `screen!` macro at build time, and kept in a [`ScreenRegistry`] so step
//! definitions can look them up by name.
//!
//! # Example
//!
//! ```ignore
//! let login = ScreenBuilder::new("login")
//!     .button("submit", id("submit_btn"))
//!     .text_field("username", "id~user")
//!     .build(&session)?;
//!
//! login.call("set_username", &OperationArgs::text("alice"))?;
//! login.call("scroll_down_to_tap_submit", &OperationArgs::none())?;
//! ```

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::accessor::{AccessorBundle, Category, OperationArgs, OperationOutput};
use crate::driver::{Direction, ElementRef, Orientation};
use crate::element::scroll_screen;
use crate::error::{ScreenError, ScreenResult};
use crate::gesture;
use crate::locator::{Locator, LocatorSpec};
use crate::session::Session;
use crate::wait;

// =============================================================================
// SCREEN ACTIONS
// =============================================================================

/// Screen-level operations, available on anything holding a [`Session`].
pub trait ScreenActions {
    /// Session the actions drive
    fn session(&self) -> &Session;

    /// One window-centred scroll gesture
    fn scroll(&self, direction: Direction, duration: Duration) -> ScreenResult<()> {
        let session = self.session();
        let window = session.driver().window_size()?;
        let gesture = gesture::window_scroll(window, direction, duration);
        session.driver().perform_gesture(&gesture)?;
        Ok(())
    }

    /// Scroll down once
    fn scroll_down(&self) -> ScreenResult<()> {
        scroll_screen(self.session(), Direction::Down).map_err(ScreenError::from)
    }

    /// Scroll up once
    fn scroll_up(&self) -> ScreenResult<()> {
        scroll_screen(self.session(), Direction::Up).map_err(ScreenError::from)
    }

    /// Swipe left once
    fn swipe_left(&self) -> ScreenResult<()> {
        scroll_screen(self.session(), Direction::Left).map_err(ScreenError::from)
    }

    /// Swipe right once
    fn swipe_right(&self) -> ScreenResult<()> {
        scroll_screen(self.session(), Direction::Right).map_err(ScreenError::from)
    }

    /// Swipe inside the bounds of the element at `locator`
    fn swipe_element(
        &self,
        locator: &Locator,
        direction: Direction,
        duration: Duration,
    ) -> ScreenResult<()> {
        self.session()
            .element(locator.to_string(), locator.clone())
            .swipe(direction, duration)
    }

    /// Long-press `source`, drag it onto `target`, release
    fn drag_and_drop(&self, source: &Locator, target: &Locator) -> ScreenResult<()> {
        let session = self.session();
        let from = session.element(source.to_string(), source.clone()).position()?;
        let to = session.element(target.to_string(), target.clone()).position()?;
        let gesture = gesture::drag_and_drop(from, to);
        tracing::debug!(%source, %target, "drag and drop");
        session.driver().perform_gesture(&gesture).map_err(|e| {
            ScreenError::interaction(
                source.to_string(),
                source,
                format!("drag onto {target}"),
                e.to_string(),
            )
        })
    }

    /// Navigate back
    fn back(&self) -> ScreenResult<()> {
        self.session().driver().back()?;
        Ok(())
    }

    /// Rotate to landscape
    fn landscape(&self) -> ScreenResult<()> {
        self.session().driver().rotate(Orientation::Landscape)?;
        Ok(())
    }

    /// Rotate to portrait
    fn portrait(&self) -> ScreenResult<()> {
        self.session().driver().rotate(Orientation::Portrait)?;
        Ok(())
    }

    /// Press the enter key
    fn enter(&self) -> ScreenResult<()> {
        self.session().driver().press_enter()?;
        Ok(())
    }

    /// Dismiss the keyboard; `false` when there was nothing to dismiss
    fn hide_keyboard(&self) -> bool {
        match self.session().driver().hide_keyboard() {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(%err, "hide keyboard");
                false
            }
        }
    }

    /// Poll `predicate` with no implicit wait, failing with `message` after `timeout`
    fn wait_until<F>(&self, timeout: Duration, message: &str, predicate: F) -> ScreenResult<()>
    where
        F: FnMut() -> bool,
        Self: Sized,
    {
        let session = self.session();
        session.with_implicit_wait(Duration::ZERO, || {
            wait::wait_until(predicate, message, session.config().wait_options(timeout))
        })
    }

    /// Like [`Self::wait_until`], with the implicit wait set to `timeout`
    fn wait_step<F>(&self, timeout: Duration, message: &str, predicate: F) -> ScreenResult<()>
    where
        F: FnMut() -> bool,
        Self: Sized,
    {
        let session = self.session();
        session.with_implicit_wait(timeout, || {
            wait::wait_until(predicate, message, session.config().wait_options(timeout))
        })
    }

    /// Scroll until the element at `locator` is displayed and return it
    fn scroll_find(
        &self,
        locator: &Locator,
        direction: Direction,
        timeout: Duration,
    ) -> ScreenResult<ElementRef> {
        let handle = self.session().element(locator.to_string(), locator.clone());
        handle.scroll_to_view(direction, timeout)?;
        handle.resolve()
    }

    /// Scroll until the element at `locator` is displayed and tap it
    fn scroll_click(
        &self,
        locator: &Locator,
        direction: Direction,
        timeout: Duration,
    ) -> ScreenResult<()> {
        self.session()
            .element(locator.to_string(), locator.clone())
            .scroll_to_tap(direction, timeout)
    }
}

impl ScreenActions for Session {
    fn session(&self) -> &Session {
        self
    }
}

// =============================================================================
// BUILDER
// =============================================================================

#[derive(Debug, Clone)]
struct Declaration {
    category: Category,
    name: String,
    locator: LocatorSpec,
    cells: Option<LocatorSpec>,
}

/// Builder for declaring a screen's elements
#[derive(Debug, Clone)]
pub struct ScreenBuilder {
    name: String,
    declarations: Vec<Declaration>,
}

impl ScreenBuilder {
    /// Create a new screen builder
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declarations: Vec::new(),
        }
    }

    /// Declare an element of any category
    #[must_use]
    pub fn declare(
        mut self,
        category: Category,
        name: impl Into<String>,
        locator: impl Into<LocatorSpec>,
    ) -> Self {
        self.declarations.push(Declaration {
            category,
            name: name.into(),
            locator: locator.into(),
            cells: None,
        });
        self
    }

    /// Declare a button
    #[must_use]
    pub fn button(self, name: impl Into<String>, locator: impl Into<LocatorSpec>) -> Self {
        self.declare(Category::Button, name, locator)
    }

    /// Declare a checkbox
    #[must_use]
    pub fn checkbox(self, name: impl Into<String>, locator: impl Into<LocatorSpec>) -> Self {
        self.declare(Category::Checkbox, name, locator)
    }

    /// Declare a text label
    #[must_use]
    pub fn text(self, name: impl Into<String>, locator: impl Into<LocatorSpec>) -> Self {
        self.declare(Category::Text, name, locator)
    }

    /// Declare a text field
    #[must_use]
    pub fn text_field(self, name: impl Into<String>, locator: impl Into<LocatorSpec>) -> Self {
        self.declare(Category::TextField, name, locator)
    }

    /// Declare an image
    #[must_use]
    pub fn image(self, name: impl Into<String>, locator: impl Into<LocatorSpec>) -> Self {
        self.declare(Category::Image, name, locator)
    }

    /// Declare a generic element
    #[must_use]
    pub fn element(self, name: impl Into<String>, locator: impl Into<LocatorSpec>) -> Self {
        self.declare(Category::GenericElement, name, locator)
    }

    /// Declare a table; cells are counted through `cells`, or through the
    /// table locator itself when `None`
    #[must_use]
    pub fn table(
        mut self,
        name: impl Into<String>,
        locator: impl Into<LocatorSpec>,
        cells: Option<LocatorSpec>,
    ) -> Self {
        self.declarations.push(Declaration {
            category: Category::Table,
            name: name.into(),
            locator: locator.into(),
            cells,
        });
        self
    }

    /// Build against a session; declaration errors surface here.
    ///
    /// Every generated method name must be unique across the screen, so a
    /// button `title_text` cannot sit next to a text `title`.
    pub fn build(self, session: &Session) -> ScreenResult<Screen> {
        let mut seen = HashSet::new();
        let mut methods: HashMap<String, String> = HashMap::new();
        let mut bundles = Vec::with_capacity(self.declarations.len());
        for decl in self.declarations {
            if !seen.insert(decl.name.clone()) {
                return Err(ScreenError::invalid_argument(
                    "declare",
                    format!("element '{}' declared twice on screen '{}'", decl.name, self.name),
                ));
            }
            let mut bundle = AccessorBundle::new(session, decl.category, decl.name, decl.locator)?;
            if let Some(cells) = decl.cells {
                bundle = bundle.with_cells(cells)?;
            }
            for method in bundle.operation_names() {
                if let Some(owner) = methods.insert(method.to_string(), bundle.name().to_string()) {
                    return Err(ScreenError::invalid_argument(
                        "declare",
                        format!(
                            "method '{method}' of element '{}' is already generated for element '{owner}' on screen '{}'",
                            bundle.name(),
                            self.name
                        ),
                    ));
                }
            }
            bundles.push(bundle);
        }
        tracing::debug!(screen = %self.name, elements = bundles.len(), "built screen");
        Ok(Screen {
            name: self.name,
            session: session.clone(),
            bundles,
        })
    }
}

// =============================================================================
// SCREEN
// =============================================================================

/// A built screen
#[derive(Debug, Clone)]
pub struct Screen {
    name: String,
    session: Session,
    bundles: Vec<AccessorBundle>,
}

impl Screen {
    /// Screen name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bundle of a declared element
    #[must_use]
    pub fn bundle(&self, element: &str) -> Option<&AccessorBundle> {
        self.bundles.iter().find(|b| b.name() == element)
    }

    /// Declared element names
    #[must_use]
    pub fn element_names(&self) -> Vec<&str> {
        self.bundles.iter().map(AccessorBundle::name).collect()
    }

    /// Every generated method name on this screen
    #[must_use]
    pub fn operation_names(&self) -> Vec<&str> {
        self.bundles
            .iter()
            .flat_map(|b| b.operation_names())
            .collect()
    }

    /// Dispatch a generated method name to the bundle that owns it
    pub fn call(&self, method: &str, args: &OperationArgs) -> ScreenResult<OperationOutput> {
        let bundle = self
            .bundles
            .iter()
            .find(|b| b.has_operation(method))
            .ok_or_else(|| ScreenError::UnknownOperation {
                element: self.name.clone(),
                operation: method.to_string(),
            })?;
        bundle.invoke(method, args)
    }
}

impl ScreenActions for Screen {
    fn session(&self) -> &Session {
        &self.session
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Screens by name
#[derive(Debug, Default)]
pub struct ScreenRegistry {
    screens: HashMap<String, Screen>,
}

impl ScreenRegistry {
    /// Create a new screen registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a screen under its own name, replacing any previous one
    pub fn register(&mut self, screen: Screen) {
        let _ = self.screens.insert(screen.name.clone(), screen);
    }

    /// Get a screen by name
    pub fn get(&self, name: &str) -> ScreenResult<&Screen> {
        self.screens
            .get(name)
            .ok_or_else(|| ScreenError::UnknownScreen {
                name: name.to_string(),
            })
    }

    /// Step-definition spelling of [`Self::get`]
    pub fn on(&self, name: &str) -> ScreenResult<&Screen> {
        self.get(name)
    }

    /// List all registered screens
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        self.screens.keys().map(String::as_str).collect()
    }

    /// Get the number of registered screens
    #[must_use]
    pub fn count(&self) -> usize {
        self.screens.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::ScreenConfig;
    use crate::driver::{AutomationDriver, BoundingBox, Point};
    use crate::locator::{id, xpath};
    use crate::mock::{MockDriver, MockElement};
    use std::cell::Cell;
    use std::rc::Rc;

    fn fixture() -> (Rc<MockDriver>, Session) {
        let driver = Rc::new(MockDriver::new());
        let config = ScreenConfig::default()
            .with_poll_interval(1)
            .with_scroll_timeout(1_000);
        let session = Session::new(driver.clone(), config);
        (driver, session)
    }

    fn login(session: &Session) -> Screen {
        ScreenBuilder::new("login")
            .button("submit", id("submit_btn"))
            .checkbox("remember", id("remember_me"))
            .text_field("username", "id~user")
            .table("rows", id("rows"), Some(xpath("//Cell").into()))
            .build(session)
            .unwrap()
    }

    mod builder_tests {
        use super::*;

        #[test]
        fn test_builder_basic() {
            let (_driver, session) = fixture();
            let screen = login(&session);
            assert_eq!(screen.name(), "login");
            assert_eq!(
                screen.element_names(),
                vec!["submit", "remember", "username", "rows"]
            );
            assert!(screen.operation_names().contains(&"set_username"));
            assert!(screen.operation_names().contains(&"rows_cell_count"));
        }

        #[test]
        fn test_builder_rejects_invalid_locator() {
            let (_driver, session) = fixture();
            let err = ScreenBuilder::new("bad")
                .button("x", "~value")
                .build(&session)
                .unwrap_err();
            assert!(matches!(err, ScreenError::InvalidLocator { .. }));
        }

        #[test]
        fn test_builder_rejects_generated_name_clash() {
            let (driver, session) = fixture();
            driver.add_element(id("title"), MockElement::new("Hello"));
            let err = ScreenBuilder::new("home")
                .text("title", id("title"))
                .button("title_text", id("title_btn"))
                .build(&session)
                .unwrap_err();
            match err {
                ScreenError::InvalidArgument { message, .. } => {
                    assert!(message.contains("'title_text'"), "{message}");
                    assert!(message.contains("'title'"), "{message}");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_builder_rejects_duplicate_names() {
            let (_driver, session) = fixture();
            let err = ScreenBuilder::new("dup")
                .button("x", id("a"))
                .text("x", id("b"))
                .build(&session)
                .unwrap_err();
            assert!(matches!(err, ScreenError::InvalidArgument { .. }));
        }
    }

    mod call_tests {
        use super::*;

        #[test]
        fn test_call_routes_to_owning_bundle() {
            let (driver, session) = fixture();
            driver.add_element(id("user"), MockElement::default());
            let screen = login(&session);
            screen
                .call("set_username", &OperationArgs::text("alice"))
                .unwrap();
            let read = screen.call("username", &OperationArgs::none()).unwrap();
            assert_eq!(read.as_text(), Some("alice"));
        }

        #[test]
        fn test_call_unknown_method() {
            let (_driver, session) = fixture();
            let err = login(&session)
                .call("logout", &OperationArgs::none())
                .unwrap_err();
            match err {
                ScreenError::UnknownOperation { element, operation } => {
                    assert_eq!(element, "login");
                    assert_eq!(operation, "logout");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_scroll_down_to_tap_submit() {
            let (driver, session) = fixture();
            driver.add_element(id("submit_btn"), MockElement::default().hidden_for(3));
            login(&session)
                .call("scroll_down_to_tap_submit", &OperationArgs::none())
                .unwrap();
            assert_eq!(driver.gestures().len(), 3);
            assert_eq!(driver.call_count("click"), 1);
        }
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_register_and_get() {
            let (_driver, session) = fixture();
            let mut registry = ScreenRegistry::new();
            registry.register(login(&session));
            registry.register(ScreenBuilder::new("home").build(&session).unwrap());
            assert_eq!(registry.count(), 2);
            assert_eq!(registry.on("login").unwrap().name(), "login");
            assert!(registry.list().contains(&"home"));
        }

        #[test]
        fn test_unknown_screen() {
            let registry = ScreenRegistry::new();
            let err = registry.get("settings").unwrap_err();
            assert_eq!(err.to_string(), "No screen registered under 'settings'");
        }
    }

    mod action_tests {
        use super::*;

        #[test]
        fn test_window_scroll_directions() {
            let (driver, session) = fixture();
            session.scroll_down().unwrap();
            session.scroll_up().unwrap();
            session.swipe_left().unwrap();
            session.swipe_right().unwrap();
            let gestures = driver.gestures();
            assert_eq!(gestures[0].start, Point::new(200.0, 400.0));
            assert_eq!(gestures[0].end, Point::new(200.0, 200.0));
            assert_eq!(gestures[1].end, Point::new(200.0, 600.0));
            assert_eq!(gestures[2].end, Point::new(60.0, 400.0));
            assert_eq!(gestures[3].end, Point::new(120.0, 400.0));
        }

        #[test]
        fn test_window_scroll_follows_window_size() {
            let driver = Rc::new(MockDriver::new().with_window_size(1080.0, 1920.0));
            let session = Session::new(driver.clone(), ScreenConfig::default());
            session.scroll_down().unwrap();
            let g = driver.gestures()[0];
            assert_eq!(g.start, Point::new(540.0, 960.0));
            assert_eq!(g.end, Point::new(540.0, 480.0));
        }

        #[test]
        fn test_device_actions() {
            let (driver, session) = fixture();
            let screen = login(&session);
            screen.back().unwrap();
            screen.landscape().unwrap();
            assert_eq!(driver.orientation(), Orientation::Landscape);
            screen.portrait().unwrap();
            assert_eq!(driver.orientation(), Orientation::Portrait);
            screen.enter().unwrap();
            assert!(driver.was_called("back"));
            assert!(driver.was_called("press_enter"));
        }

        #[test]
        fn test_hide_keyboard_folds_errors() {
            let (driver, session) = fixture();
            assert!(!session.hide_keyboard());
            driver.show_keyboard();
            assert!(session.hide_keyboard());
        }

        #[test]
        fn test_drag_and_drop() {
            let (driver, session) = fixture();
            driver.add_element(
                id("card"),
                MockElement::default().with_bounds(BoundingBox::new(0.0, 0.0, 100.0, 100.0)),
            );
            driver.add_element(
                id("bin"),
                MockElement::default().with_bounds(BoundingBox::new(200.0, 400.0, 50.0, 50.0)),
            );
            session.drag_and_drop(&id("card"), &id("bin")).unwrap();
            let g = driver.gestures()[0];
            assert_eq!(g.start, Point::new(50.0, 50.0));
            assert_eq!(g.end, Point::new(225.0, 425.0));
            assert!(g.hold > Duration::ZERO);
        }

        #[test]
        fn test_failed_drag_names_source() {
            let (driver, session) = fixture();
            driver.add_element(id("card"), MockElement::default());
            driver.add_element(id("bin"), MockElement::default());
            driver.fail_on("perform_gesture");
            let err = session.drag_and_drop(&id("card"), &id("bin")).unwrap_err();
            assert!(matches!(err, ScreenError::Interaction { .. }));
            assert!(err.to_string().contains("id=card"));
        }

        #[test]
        fn test_wait_until_restores_implicit_wait() {
            let (driver, session) = fixture();
            driver.set_implicit_wait(Duration::from_secs(5)).unwrap();
            let polls = Cell::new(0);
            session
                .wait_until(Duration::from_secs(1), "third poll", || {
                    polls.set(polls.get() + 1);
                    polls.get() >= 3
                })
                .unwrap();
            assert_eq!(polls.get(), 3);
            assert!(driver.was_called("set_implicit_wait:0"));
            assert_eq!(driver.implicit_wait(), Duration::from_secs(5));
        }

        #[test]
        fn test_wait_until_timeout_message() {
            let (_driver, session) = fixture();
            let err = session
                .wait_until(Duration::from_millis(20), "spinner to vanish", || false)
                .unwrap_err();
            assert!(err.is_timeout());
            assert!(err.to_string().contains("spinner to vanish"));
        }

        #[test]
        fn test_wait_step_uses_step_timeout_as_implicit_wait() {
            let (driver, session) = fixture();
            session
                .wait_step(Duration::from_millis(300), "ready", || true)
                .unwrap();
            assert!(driver.was_called("set_implicit_wait:300"));
        }

        #[test]
        fn test_scroll_find_and_click() {
            let (driver, session) = fixture();
            let added = driver.add_element(id("footer"), MockElement::default().hidden_for(1));
            let found = session
                .scroll_find(&id("footer"), Direction::Down, Duration::from_secs(1))
                .unwrap();
            assert_eq!(found, added);
            session
                .scroll_click(&id("footer"), Direction::Down, Duration::from_secs(1))
                .unwrap();
            assert_eq!(driver.call_count("click"), 1);
        }

        #[test]
        fn test_swipe_element() {
            let (driver, session) = fixture();
            driver.add_element(id("pager"), MockElement::default());
            session
                .swipe_element(&id("pager"), Direction::Left, Duration::from_millis(300))
                .unwrap();
            assert_eq!(driver.gestures()[0].duration, Duration::from_millis(300));
        }
    }
}
