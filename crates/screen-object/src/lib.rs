//! Screen objects for mobile UI automation.
//!
//! Declare each element of a screen once, as a category plus a locator, and
//! get a family of accessors generated for it: tap, existence and enabled
//! checks, text reads, scroll-until-visible searches, checkbox toggles and
//! text entry. Everything talks to the device through the
//! [`AutomationDriver`] trait carried by an explicit [`Session`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌───────────────┐   ┌──────────────────┐
//! │ screen! /    │──►│ AccessorBundle   │──►│ ElementHandle │──►│ AutomationDriver │
//! │ ScreenBuilder│   │ (category table) │   │ (one element) │   │ (Appium / mock)  │
//! └──────────────┘   └──────────────────┘   └───────────────┘   └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use screen_object::prelude::*;
//!
//! let driver = MockDriver::new();
//! driver.add_element(id("submit_btn"), MockElement::new("Submit"));
//! let session = Session::from_driver(driver);
//!
//! let login = ScreenBuilder::new("login")
//!     .button("submit", id("submit_btn"))
//!     .build(&session)?;
//!
//! assert!(login.call("submit_exists", &OperationArgs::none())?.as_bool().unwrap_or(false));
//! login.call("submit", &OperationArgs::none())?;
//! # Ok::<(), ScreenError>(())
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Accessor generation: categories, operation tables, bundles
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod accessor;

/// Timeouts, gesture durations, Appium connection settings
pub mod config;

/// The driver seam and its geometry types
pub mod driver;

/// One declared element bound to a session
#[allow(clippy::missing_errors_doc)]
pub mod element;

/// Error types
pub mod error;

/// Scroll and swipe coordinates
pub mod gesture;

/// Locator parsing and text-locator construction
pub mod locator;

/// `tracing` subscriber setup
pub mod logging;

/// In-memory driver for tests
pub mod mock;

/// Screens, the screen registry and screen-level actions
#[allow(clippy::missing_errors_doc)]
pub mod screen;

/// Driver context
pub mod session;

/// Polling waits and scroll searches
pub mod wait;

/// Blocking W3C WebDriver client for Appium
#[cfg(feature = "appium")]
#[allow(clippy::missing_errors_doc)]
pub mod appium;

pub use accessor::{
    declare, Accessor, AccessorBundle, Button, Category, Checkbox, GenericElement, Image,
    OperationArgs, OperationKind, OperationOutput, Table, Text, TextField,
};
pub use config::{AppiumConfig, ScreenConfig};
pub use driver::{
    AutomationDriver, BoundingBox, Direction, DriverError, DriverResult, ElementRef, Gesture,
    Orientation, Platform, Point, Rect, Size,
};
pub use element::{normalize_text, ElementHandle};
pub use error::{ScreenError, ScreenResult};
pub use locator::{
    accessibility_id, class, class_chain, css, id, name, predicate, uiautomator, xpath, Locator,
    LocatorSpec, Strategy,
};
pub use logging::{init_logging, init_test_logging, LogFormat};
pub use mock::{MockDriver, MockElement};
pub use screen::{Screen, ScreenActions, ScreenBuilder, ScreenRegistry};
pub use session::Session;
pub use wait::{wait_until, SearchState, WaitOptions, Waiter};

#[cfg(feature = "appium")]
pub use appium::AppiumDriver;

/// Accessor-generation macro
#[cfg(feature = "derive")]
pub use screen_object_derive::screen;

/// Everything needed to declare and drive screens
pub mod prelude {
    pub use super::accessor::{
        Accessor, AccessorBundle, Button, Category, Checkbox, GenericElement, Image,
        OperationArgs, OperationKind, OperationOutput, Table, Text, TextField,
    };
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::element::*;
    pub use super::error::*;
    pub use super::locator::*;
    pub use super::mock::*;
    pub use super::screen::*;
    pub use super::session::*;
    pub use super::wait::{SearchState, WaitOptions, Waiter};

    #[cfg(feature = "appium")]
    pub use super::appium::AppiumDriver;

    #[cfg(feature = "derive")]
    pub use screen_object_derive::screen;
}
