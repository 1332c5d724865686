//! AutomationDriver - the device automation capability screen objects consume.
//!
//! Screen objects never talk to a device directly. Every lookup, tap and
//! gesture goes through [`AutomationDriver`], so the same declarations run
//! against a real Appium session ([`crate::AppiumDriver`], feature `appium`)
//! or the scripted [`crate::MockDriver`] in unit tests.
//!
//! The model is synchronous and single-threaded: one test thread drives one
//! session, and every call blocks until the driver answers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::locator::Locator;

/// Result type for raw driver calls
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors reported by a driver implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// No element matched the locator
    #[error("no such element: {locator}")]
    NoSuchElement {
        /// Locator that was searched
        locator: String,
    },

    /// Element reference no longer attached to the UI
    #[error("stale element reference: {element}")]
    StaleElement {
        /// Element id
        element: String,
    },

    /// The driver rejected or failed a command
    #[error("{command} failed: {message}")]
    Command {
        /// Command name
        command: String,
        /// Error message
        message: String,
    },

    /// The connection to the automation server failed
    #[error("transport error: {message}")]
    Transport {
        /// Error message
        message: String,
    },

    /// The automation server answered with something unexpected
    #[error("protocol error: {message}")]
    Protocol {
        /// Error message
        message: String,
    },
}

impl DriverError {
    /// Create a no-such-element error
    #[must_use]
    pub fn no_such_element(locator: impl ToString) -> Self {
        Self::NoSuchElement {
            locator: locator.to_string(),
        }
    }

    /// Create a command error
    #[must_use]
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a protocol error
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

/// Opaque reference to a live element, valid only until the UI re-renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    id: String,
}

impl ElementRef {
    /// Wrap a driver element id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Driver element id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Device platform, which decides where label text lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// UiAutomator2 / Espresso: labels live in `text`
    #[default]
    Android,
    /// XCUITest: labels live in the `value` attribute
    Ios,
}

impl Platform {
    /// Parse an Appium `platformName`
    #[must_use]
    pub fn from_platform_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "android" => Some(Self::Android),
            "ios" | "tvos" => Some(Self::Ios),
            _ => None,
        }
    }
}

/// Screen orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Upright
    Portrait,
    /// Rotated
    Landscape,
}

impl Orientation {
    /// Appium orientation keyword
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Portrait => "PORTRAIT",
            Self::Landscape => "LANDSCAPE",
        }
    }
}

/// Scroll and swipe direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards the top of the content
    Up,
    /// Towards the bottom of the content
    #[default]
    Down,
    /// Towards the leading edge
    Left,
    /// Towards the trailing edge
    Right,
}

impl Direction {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Window dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width in points
    pub width: f64,
    /// Height in points
    pub height: f64,
}

impl Size {
    /// Create a new size
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Bounding box as reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X position
    pub x: f64,
    /// Y position
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the center point
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if a point is inside this bounding box
    #[must_use]
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Element position expressed by its edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub start_x: f64,
    /// Right edge
    pub end_x: f64,
    /// Top edge
    pub start_y: f64,
    /// Bottom edge
    pub end_y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl From<BoundingBox> for Rect {
    fn from(bounds: BoundingBox) -> Self {
        Self {
            start_x: bounds.x,
            end_x: bounds.x + bounds.width,
            start_y: bounds.y,
            end_y: bounds.y + bounds.height,
            width: bounds.width,
            height: bounds.height,
        }
    }
}

/// Point-to-point touch gesture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gesture {
    /// Touch down position
    pub start: Point,
    /// Release position
    pub end: Point,
    /// Time spent moving from start to end
    pub duration: Duration,
    /// Press-and-hold before moving
    pub hold: Duration,
}

impl Gesture {
    /// Swipe from `start` to `end`
    #[must_use]
    pub const fn swipe(start: Point, end: Point, duration: Duration) -> Self {
        Self {
            start,
            end,
            duration,
            hold: Duration::ZERO,
        }
    }

    /// Long-press at `start`, then drag to `end`
    #[must_use]
    pub const fn drag(start: Point, end: Point, hold: Duration, duration: Duration) -> Self {
        Self {
            start,
            end,
            duration,
            hold,
        }
    }
}

/// Abstract automation capability.
///
/// # Implementations
///
/// - `AppiumDriver` - W3C WebDriver over HTTP (feature `appium`)
/// - `MockDriver` - scripted elements for unit tests
pub trait AutomationDriver: fmt::Debug {
    /// Find the first element matching the locator
    fn find_element(&self, locator: &Locator) -> DriverResult<ElementRef>;

    /// Find every element matching the locator (possibly none)
    fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>>;

    /// Whether the element is currently displayed
    fn is_displayed(&self, element: &ElementRef) -> DriverResult<bool>;

    /// Whether the element accepts input
    fn is_enabled(&self, element: &ElementRef) -> DriverResult<bool>;

    /// Tap the element
    fn click(&self, element: &ElementRef) -> DriverResult<()>;

    /// Visible text of the element
    fn text(&self, element: &ElementRef) -> DriverResult<String>;

    /// Named attribute, `None` when absent
    fn attribute(&self, element: &ElementRef, name: &str) -> DriverResult<Option<String>>;

    /// Element bounding box
    fn rect(&self, element: &ElementRef) -> DriverResult<BoundingBox>;

    /// Type into the element
    fn send_keys(&self, element: &ElementRef, text: &str) -> DriverResult<()>;

    /// Clear an editable element
    fn clear(&self, element: &ElementRef) -> DriverResult<()>;

    /// Perform a touch gesture
    fn perform_gesture(&self, gesture: &Gesture) -> DriverResult<()>;

    /// Current window size
    fn window_size(&self) -> DriverResult<Size>;

    /// Platform of the device under test
    fn platform(&self) -> Platform;

    /// Shorthand for `platform() == Platform::Android`
    fn is_android(&self) -> bool {
        self.platform() == Platform::Android
    }

    /// Set how long element lookups block before failing
    fn set_implicit_wait(&self, wait: Duration) -> DriverResult<()>;

    /// Implicit wait currently in effect
    fn implicit_wait(&self) -> Duration;

    /// Navigate back
    fn back(&self) -> DriverResult<()>;

    /// Rotate the device
    fn rotate(&self, orientation: Orientation) -> DriverResult<()>;

    /// Dismiss the software keyboard
    fn hide_keyboard(&self) -> DriverResult<()>;

    /// Send the enter key to the focused element
    fn press_enter(&self) -> DriverResult<()>;
}
