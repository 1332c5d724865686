//! Accessor Generator
//!
//! Declaring an element (`button("login", id("login_btn"))`) consults the
//! category's operation table once and yields an [`AccessorBundle`]: the
//! generated method names, each bound to an [`OperationKind`] closed over the
//! fixed locator. Every call builds a fresh [`ElementHandle`].
//!
//! | Contract name | Rust name |
//! |---|---|
//! | `name?` | `name_exists` |
//! | `name_enabled?` | `name_enabled` |
//! | `name=` | `set_name` |

use std::fmt;
use std::time::Duration;

use crate::driver::{Direction, ElementRef, Rect};
use crate::element::ElementHandle;
use crate::error::{ScreenError, ScreenResult};
use crate::locator::{Locator, LocatorSpec};
use crate::session::Session;

// =============================================================================
// CATEGORY
// =============================================================================

/// Kind of declared element; decides the default action and the operation set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Tappable button
    Button,
    /// Two-state checkbox or switch
    Checkbox,
    /// Read-only label
    Text,
    /// Editable input
    TextField,
    /// Image
    Image,
    /// List or table with countable cells
    Table,
    /// Anything else
    GenericElement,
}

const BASE: [OperationKind; 11] = [
    OperationKind::Element,
    OperationKind::Exists,
    OperationKind::Enabled,
    OperationKind::Position,
    OperationKind::Location,
    OperationKind::ScrollDownTo,
    OperationKind::ScrollUpTo,
    OperationKind::ScrollDownToTap,
    OperationKind::ScrollDownToClick,
    OperationKind::ScrollUpToTap,
    OperationKind::ScrollUpToClick,
];

const fn with_base<const N: usize, const M: usize>(
    default: bool,
    extra: [OperationKind; N],
) -> [OperationKind; M] {
    let mut table = [OperationKind::Default; M];
    let offset = if default { 1 } else { 0 };
    let mut i = 0;
    while i < BASE.len() {
        table[offset + i] = BASE[i];
        i += 1;
    }
    let mut j = 0;
    while j < N {
        table[offset + BASE.len() + j] = extra[j];
        j += 1;
    }
    table
}

const BUTTON_OPS: [OperationKind; 19] = with_base(
    true,
    [
        OperationKind::Text,
        OperationKind::Value,
        OperationKind::ScrollDynamic,
        OperationKind::ScrollText,
        OperationKind::ScrollDynamicText,
        OperationKind::ScrollExactText,
        OperationKind::ScrollDynamicExactText,
    ],
);

const CHECKBOX_OPS: [OperationKind; 17] = with_base(
    true,
    [
        OperationKind::Checked,
        OperationKind::Check,
        OperationKind::Uncheck,
        OperationKind::Text,
        OperationKind::Value,
    ],
);

const TEXT_OPS: [OperationKind; 19] = with_base(
    true,
    [
        OperationKind::Text,
        OperationKind::Tap,
        OperationKind::Click,
        OperationKind::DynamicText,
        OperationKind::HasText,
        OperationKind::Dynamic,
        OperationKind::Elements,
    ],
);

const TEXT_FIELD_OPS: [OperationKind; 17] = with_base(
    true,
    [
        OperationKind::Set,
        OperationKind::Clear,
        OperationKind::Text,
        OperationKind::Value,
        OperationKind::Elements,
    ],
);

const IMAGE_OPS: [OperationKind; 14] =
    with_base(true, [OperationKind::Text, OperationKind::Value]);

const TABLE_OPS: [OperationKind; 12] = with_base(false, [OperationKind::CellCount]);

const ELEMENT_OPS: [OperationKind; 21] = with_base(
    true,
    [
        OperationKind::Text,
        OperationKind::Value,
        OperationKind::Elements,
        OperationKind::Tap,
        OperationKind::Click,
        OperationKind::ScrollElementDown,
        OperationKind::ScrollElementUp,
        OperationKind::SwipeElementLeft,
        OperationKind::SwipeElementRight,
    ],
);

impl Category {
    /// All categories
    pub const ALL: [Self; 7] = [
        Self::Button,
        Self::Checkbox,
        Self::Text,
        Self::TextField,
        Self::Image,
        Self::Table,
        Self::GenericElement,
    ];

    /// Declaration keyword
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Checkbox => "checkbox",
            Self::Text => "text",
            Self::TextField => "text_field",
            Self::Image => "image",
            Self::Table => "table",
            Self::GenericElement => "element",
        }
    }

    /// Parse a declaration keyword
    #[must_use]
    pub fn parse(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == keyword)
    }

    /// Operations generated for this category, in declaration order
    #[must_use]
    pub const fn operations(&self) -> &'static [OperationKind] {
        match self {
            Self::Button => &BUTTON_OPS,
            Self::Checkbox => &CHECKBOX_OPS,
            Self::Text => &TEXT_OPS,
            Self::TextField => &TEXT_FIELD_OPS,
            Self::Image => &IMAGE_OPS,
            Self::Table => &TABLE_OPS,
            Self::GenericElement => &ELEMENT_OPS,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// OPERATION KIND
// =============================================================================

/// One generated operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// `{name}`: the category's default action
    Default,
    /// `{name}_element`
    Element,
    /// `{name}_exists`
    Exists,
    /// `{name}_enabled`
    Enabled,
    /// `{name}_position`
    Position,
    /// `{name}_location`
    Location,
    /// `scroll_down_to_{name}`
    ScrollDownTo,
    /// `scroll_up_to_{name}`
    ScrollUpTo,
    /// `scroll_down_to_tap_{name}`
    ScrollDownToTap,
    /// `scroll_down_to_click_{name}`
    ScrollDownToClick,
    /// `scroll_up_to_tap_{name}`
    ScrollUpToTap,
    /// `scroll_up_to_click_{name}`
    ScrollUpToClick,
    /// `{name}_text`
    Text,
    /// `{name}_value`
    Value,
    /// `{name}_scroll_dynamic(text)`
    ScrollDynamic,
    /// `{name}_scroll_text(text)`
    ScrollText,
    /// `{name}_scroll_dynamic_text(text)`
    ScrollDynamicText,
    /// `{name}_scroll_exact_text(text)`
    ScrollExactText,
    /// `{name}_scroll_dynamic_exact_text(text)`
    ScrollDynamicExactText,
    /// `{name}_checked`
    Checked,
    /// `check_{name}`
    Check,
    /// `uncheck_{name}`
    Uncheck,
    /// `tap_{name}`
    Tap,
    /// `click_{name}`
    Click,
    /// `{name}_dynamic_text(text)`
    DynamicText,
    /// `{name}_has_text(text)`
    HasText,
    /// `{name}_dynamic(text)`
    Dynamic,
    /// `{name}_elements`
    Elements,
    /// `set_{name}(text)`
    Set,
    /// `clear_{name}`
    Clear,
    /// `{name}_cell_count`
    CellCount,
    /// `{name}_scroll_down`
    ScrollElementDown,
    /// `{name}_scroll_up`
    ScrollElementUp,
    /// `{name}_swipe_left`
    SwipeElementLeft,
    /// `{name}_swipe_right`
    SwipeElementRight,
}

impl OperationKind {
    /// Generated method name for an element called `name`
    #[must_use]
    pub fn method_name(&self, name: &str) -> String {
        match self {
            Self::Default => name.to_string(),
            Self::Element => format!("{name}_element"),
            Self::Exists => format!("{name}_exists"),
            Self::Enabled => format!("{name}_enabled"),
            Self::Position => format!("{name}_position"),
            Self::Location => format!("{name}_location"),
            Self::ScrollDownTo => format!("scroll_down_to_{name}"),
            Self::ScrollUpTo => format!("scroll_up_to_{name}"),
            Self::ScrollDownToTap => format!("scroll_down_to_tap_{name}"),
            Self::ScrollDownToClick => format!("scroll_down_to_click_{name}"),
            Self::ScrollUpToTap => format!("scroll_up_to_tap_{name}"),
            Self::ScrollUpToClick => format!("scroll_up_to_click_{name}"),
            Self::Text => format!("{name}_text"),
            Self::Value => format!("{name}_value"),
            Self::ScrollDynamic => format!("{name}_scroll_dynamic"),
            Self::ScrollText => format!("{name}_scroll_text"),
            Self::ScrollDynamicText => format!("{name}_scroll_dynamic_text"),
            Self::ScrollExactText => format!("{name}_scroll_exact_text"),
            Self::ScrollDynamicExactText => format!("{name}_scroll_dynamic_exact_text"),
            Self::Checked => format!("{name}_checked"),
            Self::Check => format!("check_{name}"),
            Self::Uncheck => format!("uncheck_{name}"),
            Self::Tap => format!("tap_{name}"),
            Self::Click => format!("click_{name}"),
            Self::DynamicText => format!("{name}_dynamic_text"),
            Self::HasText => format!("{name}_has_text"),
            Self::Dynamic => format!("{name}_dynamic"),
            Self::Elements => format!("{name}_elements"),
            Self::Set => format!("set_{name}"),
            Self::Clear => format!("clear_{name}"),
            Self::CellCount => format!("{name}_cell_count"),
            Self::ScrollElementDown => format!("{name}_scroll_down"),
            Self::ScrollElementUp => format!("{name}_scroll_up"),
            Self::SwipeElementLeft => format!("{name}_swipe_left"),
            Self::SwipeElementRight => format!("{name}_swipe_right"),
        }
    }

    /// Whether the operation needs a text argument
    #[must_use]
    pub const fn takes_text(&self) -> bool {
        matches!(
            self,
            Self::ScrollDynamic
                | Self::ScrollText
                | Self::ScrollDynamicText
                | Self::ScrollExactText
                | Self::ScrollDynamicExactText
                | Self::DynamicText
                | Self::HasText
                | Self::Dynamic
                | Self::Set
        )
    }

    /// Whether the operation is a bounded scroll search
    #[must_use]
    pub const fn is_scroll_search(&self) -> bool {
        matches!(
            self,
            Self::ScrollDownTo
                | Self::ScrollUpTo
                | Self::ScrollDownToTap
                | Self::ScrollDownToClick
                | Self::ScrollUpToTap
                | Self::ScrollUpToClick
        )
    }
}

// =============================================================================
// ARGUMENTS AND OUTPUT
// =============================================================================

/// Arguments for [`AccessorBundle::invoke`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationArgs {
    text: Option<String>,
    timeout: Option<Duration>,
}

impl OperationArgs {
    /// No arguments
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// A text argument
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            timeout: None,
        }
    }

    /// Override the scroll-search timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn require_text(&self, operation: &str) -> ScreenResult<&str> {
        self.text
            .as_deref()
            .ok_or_else(|| ScreenError::invalid_argument(operation, "a text argument is required"))
    }
}

/// Value produced by an operation
#[derive(Debug, Clone)]
pub enum OperationOutput {
    /// Action completed
    Unit,
    /// Predicate result
    Bool(bool),
    /// Text read
    Text(String),
    /// Text read that may be absent
    MaybeText(Option<String>),
    /// Count
    Count(usize),
    /// Position
    Rect(Rect),
    /// Handle for further operations
    Element(Box<ElementHandle>),
    /// Every match
    Elements(Vec<ElementRef>),
}

impl OperationOutput {
    /// Predicate result, if this is one
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Text, if this is one
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::MaybeText(t) => t.as_deref(),
            _ => None,
        }
    }

    /// Count, if this is one
    #[must_use]
    pub const fn as_count(&self) -> Option<usize> {
        match self {
            Self::Count(n) => Some(*n),
            Self::Elements(v) => Some(v.len()),
            _ => None,
        }
    }

    /// Position, if this is one
    #[must_use]
    pub const fn as_rect(&self) -> Option<&Rect> {
        match self {
            Self::Rect(r) => Some(r),
            _ => None,
        }
    }

    /// Element handle, if this is one
    #[must_use]
    pub fn into_element(self) -> Option<ElementHandle> {
        match self {
            Self::Element(h) => Some(*h),
            _ => None,
        }
    }

    /// Whether this is a completed action
    #[must_use]
    pub const fn is_unit(&self) -> bool {
        matches!(self, Self::Unit)
    }
}

// =============================================================================
// BUNDLE
// =============================================================================

/// Declare an element and generate its operations
pub fn declare(
    session: &Session,
    category: Category,
    name: impl Into<String>,
    locator: impl Into<LocatorSpec>,
) -> ScreenResult<AccessorBundle> {
    AccessorBundle::new(session, category, name, locator)
}

/// The generated operations of one declared element
#[derive(Debug, Clone)]
pub struct AccessorBundle {
    name: String,
    category: Category,
    locator: Locator,
    cells: Option<Locator>,
    session: Session,
    operations: Vec<(String, OperationKind)>,
}

impl AccessorBundle {
    /// Declare an element; fails with `InvalidLocator` on a malformed locator
    pub fn new(
        session: &Session,
        category: Category,
        name: impl Into<String>,
        locator: impl Into<LocatorSpec>,
    ) -> ScreenResult<Self> {
        let name = name.into();
        let locator = locator.into().into_locator()?;
        let operations = category
            .operations()
            .iter()
            .map(|kind| (kind.method_name(&name), *kind))
            .collect();
        tracing::debug!(element = %name, %category, %locator, "declared accessor");
        Ok(Self {
            name,
            category,
            locator,
            cells: None,
            session: session.clone(),
            operations,
        })
    }

    /// Locator of a table's cells; defaults to the table locator itself
    pub fn with_cells(mut self, cells: impl Into<LocatorSpec>) -> ScreenResult<Self> {
        self.cells = Some(cells.into().into_locator()?);
        Ok(self)
    }

    /// Element name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Declared locator
    #[must_use]
    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Generated method names, in declaration order
    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.iter().map(|(name, _)| name.as_str())
    }

    /// Operation bound to a generated name
    #[must_use]
    pub fn operation(&self, method: &str) -> Option<OperationKind> {
        self.operations
            .iter()
            .find(|(name, _)| name == method)
            .map(|(_, kind)| *kind)
    }

    /// Whether a generated name belongs to this bundle
    #[must_use]
    pub fn has_operation(&self, method: &str) -> bool {
        self.operation(method).is_some()
    }

    /// Dispatch by generated name.
    ///
    /// A text argument is accepted only by operations that take one, and a
    /// timeout override only by scroll searches.
    pub fn invoke(&self, method: &str, args: &OperationArgs) -> ScreenResult<OperationOutput> {
        let kind = self
            .operation(method)
            .ok_or_else(|| ScreenError::UnknownOperation {
                element: self.name.clone(),
                operation: method.to_string(),
            })?;
        if kind.takes_text() {
            args.require_text(method)?;
        } else if args.text.is_some() {
            return Err(ScreenError::invalid_argument(method, "takes no text argument"));
        }
        if args.timeout.is_some() && !kind.is_scroll_search() {
            return Err(ScreenError::invalid_argument(
                method,
                "only scroll searches accept a timeout",
            ));
        }
        self.run(kind, method, args)
    }

    fn run(
        &self,
        kind: OperationKind,
        method: &str,
        args: &OperationArgs,
    ) -> ScreenResult<OperationOutput> {
        use OperationKind as K;
        use OperationOutput as O;

        let unit = |r: ScreenResult<()>| r.map(|()| O::Unit);
        let timeout = args.timeout;

        match kind {
            K::Default => self.default_action(),
            K::Element => Ok(O::Element(Box::new(self.element()))),
            K::Exists => Ok(O::Bool(self.exists())),
            K::Enabled => Ok(O::Bool(self.enabled())),
            K::Position | K::Location => self.position().map(O::Rect),
            K::ScrollDownTo => unit(self.scroll_to_view(Direction::Down, timeout)),
            K::ScrollUpTo => unit(self.scroll_to_view(Direction::Up, timeout)),
            K::ScrollDownToTap | K::ScrollDownToClick => {
                unit(self.scroll_to_tap(Direction::Down, timeout))
            }
            K::ScrollUpToTap | K::ScrollUpToClick => {
                unit(self.scroll_to_tap(Direction::Up, timeout))
            }
            K::Text => self.text().map(O::Text),
            K::Value => self.value().map(O::Text),
            K::ScrollDynamic => unit(self.scroll_dynamic(args.require_text(method)?)),
            K::ScrollText => unit(self.scroll_text(args.require_text(method)?)),
            K::ScrollDynamicText => unit(self.scroll_dynamic_text(args.require_text(method)?)),
            K::ScrollExactText => unit(self.scroll_exact_text(args.require_text(method)?)),
            K::ScrollDynamicExactText => {
                unit(self.scroll_dynamic_exact_text(args.require_text(method)?))
            }
            K::Checked => Ok(O::Bool(self.checked())),
            K::Check => unit(self.check()),
            K::Uncheck => unit(self.uncheck()),
            K::Tap | K::Click => unit(self.tap()),
            K::DynamicText => self.dynamic_text(args.require_text(method)?).map(O::MaybeText),
            K::HasText => self.has_text(args.require_text(method)?).map(O::Bool),
            K::Dynamic => Ok(O::Bool(self.dynamic_exists(args.require_text(method)?))),
            K::Elements => self.elements().map(O::Elements),
            K::Set => unit(self.set_text(args.require_text(method)?)),
            K::Clear => unit(self.clear()),
            K::CellCount => self.cell_count().map(O::Count),
            K::ScrollElementDown => unit(self.element().scroll_element_down()),
            K::ScrollElementUp => unit(self.element().scroll_element_up()),
            K::SwipeElementLeft => unit(self.element().swipe_element_left()),
            K::SwipeElementRight => unit(self.element().swipe_element_right()),
        }
    }

    /// The `{name}` operation: tap, read, or hand back the element
    pub fn default_action(&self) -> ScreenResult<OperationOutput> {
        match self.category {
            Category::Button | Category::Checkbox | Category::Image => {
                self.tap().map(|()| OperationOutput::Unit)
            }
            Category::Text | Category::TextField => self.text().map(OperationOutput::Text),
            Category::GenericElement => Ok(OperationOutput::Element(Box::new(self.element()))),
            Category::Table => Err(ScreenError::UnknownOperation {
                element: self.name.clone(),
                operation: self.name.clone(),
            }),
        }
    }

    // =========================================================================
    // Typed operations
    // =========================================================================

    /// Fresh handle on the declared locator
    #[must_use]
    pub fn element(&self) -> ElementHandle {
        ElementHandle::new(self.session.clone(), self.name.clone(), self.locator.clone())
    }

    /// Present and displayed
    #[must_use]
    pub fn exists(&self) -> bool {
        self.element().exists()
    }

    /// Present and enabled
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.element().enabled()
    }

    /// Element edges and size
    pub fn position(&self) -> ScreenResult<Rect> {
        self.element().position()
    }

    /// Scroll the screen until displayed
    pub fn scroll_to_view(
        &self,
        direction: Direction,
        timeout: Option<Duration>,
    ) -> ScreenResult<()> {
        self.element()
            .scroll_to_view(direction, self.timeout_or_default(timeout))
    }

    /// Scroll the screen until displayed, then tap once
    pub fn scroll_to_tap(&self, direction: Direction, timeout: Option<Duration>) -> ScreenResult<()> {
        self.element()
            .scroll_to_tap(direction, self.timeout_or_default(timeout))
    }

    /// Tap
    pub fn tap(&self) -> ScreenResult<()> {
        self.element().tap()
    }

    /// Platform-resolved label
    pub fn text(&self) -> ScreenResult<String> {
        self.element().text()
    }

    /// `value` attribute
    pub fn value(&self) -> ScreenResult<String> {
        self.element().value()
    }

    /// Scroll down until an element containing `text` shows, then tap it
    pub fn scroll_dynamic(&self, text: &str) -> ScreenResult<()> {
        let timeout = self.session.config().scroll_timeout();
        self.element()
            .scroll_to_dynamic_tap(text, Direction::Down, timeout)
    }

    /// Tap this element, or scroll to one containing `text`
    pub fn scroll_text(&self, text: &str) -> ScreenResult<()> {
        self.element().tap_text(text)
    }

    /// Tap the element containing `text`, scrolling to it if needed
    pub fn scroll_dynamic_text(&self, text: &str) -> ScreenResult<()> {
        self.element().tap_dynamic_text(text)
    }

    /// Tap this element, or scroll to one whose text is exactly `text`
    pub fn scroll_exact_text(&self, text: &str) -> ScreenResult<()> {
        self.element().tap_exact_text(text)
    }

    /// Tap the element whose text is exactly `text`, scrolling to it if needed
    pub fn scroll_dynamic_exact_text(&self, text: &str) -> ScreenResult<()> {
        self.element().tap_dynamic_exact_text(text)
    }

    /// Checkbox state
    #[must_use]
    pub fn checked(&self) -> bool {
        self.element().checked()
    }

    /// Ensure checked
    pub fn check(&self) -> ScreenResult<()> {
        self.element().check()
    }

    /// Ensure unchecked
    pub fn uncheck(&self) -> ScreenResult<()> {
        self.element().uncheck()
    }

    /// Label of the element containing `text`
    pub fn dynamic_text(&self, text: &str) -> ScreenResult<Option<String>> {
        self.element().dynamic_text(text)
    }

    /// Whether any match reads `expected`
    pub fn has_text(&self, expected: &str) -> ScreenResult<bool> {
        self.element().has_text(expected)
    }

    /// First match reading `expected`
    pub fn with_text(&self, expected: &str) -> ScreenResult<ElementRef> {
        self.element().with_text(expected)
    }

    /// Whether an element containing `text` is displayed
    #[must_use]
    pub fn dynamic_exists(&self, text: &str) -> bool {
        self.element().dynamic_text_exists(text)
    }

    /// Every match
    pub fn elements(&self) -> ScreenResult<Vec<ElementRef>> {
        self.element().resolve_all()
    }

    /// Replace the content of an editable element
    pub fn set_text(&self, text: &str) -> ScreenResult<()> {
        self.element().set_text(text)
    }

    /// Clear an editable element
    pub fn clear(&self) -> ScreenResult<()> {
        self.element().clear()
    }

    /// Number of cells
    pub fn cell_count(&self) -> ScreenResult<usize> {
        let cells = self.cells.clone().unwrap_or_else(|| self.locator.clone());
        ElementHandle::new(self.session.clone(), self.name.clone(), cells).count()
    }

    /// Element-relative gesture with the configured duration for `direction`
    pub fn swipe(&self, direction: Direction) -> ScreenResult<()> {
        let handle = self.element();
        match direction {
            Direction::Down => handle.scroll_element_down(),
            Direction::Up => handle.scroll_element_up(),
            Direction::Left => handle.swipe_element_left(),
            Direction::Right => handle.swipe_element_right(),
        }
    }

    fn timeout_or_default(&self, timeout: Option<Duration>) -> Duration {
        timeout.unwrap_or_else(|| self.session.config().scroll_timeout())
    }
}

// =============================================================================
// TYPED ACCESSORS
// =============================================================================

/// Operations every category shares
pub trait Accessor {
    /// Category of this accessor
    const CATEGORY: Category;

    /// Underlying bundle
    fn bundle(&self) -> &AccessorBundle;

    /// Declare an element of this accessor's category
    fn declare(
        session: &Session,
        name: impl Into<String>,
        locator: impl Into<LocatorSpec>,
    ) -> ScreenResult<Self>
    where
        Self: Sized;

    /// `{name}_element`
    fn element(&self) -> ElementHandle {
        self.bundle().element()
    }

    /// `{name}_exists`
    fn exists(&self) -> bool {
        self.bundle().exists()
    }

    /// `{name}_enabled`
    fn enabled(&self) -> bool {
        self.bundle().enabled()
    }

    /// `{name}_position`
    fn position(&self) -> ScreenResult<Rect> {
        self.bundle().position()
    }

    /// `{name}_location`
    fn location(&self) -> ScreenResult<Rect> {
        self.bundle().position()
    }

    /// `scroll_down_to_{name}`
    fn scroll_down_to(&self) -> ScreenResult<()> {
        self.bundle().scroll_to_view(Direction::Down, None)
    }

    /// `scroll_up_to_{name}`
    fn scroll_up_to(&self) -> ScreenResult<()> {
        self.bundle().scroll_to_view(Direction::Up, None)
    }

    /// `scroll_down_to_tap_{name}` / `scroll_down_to_click_{name}`
    fn scroll_down_to_tap(&self) -> ScreenResult<()> {
        self.bundle().scroll_to_tap(Direction::Down, None)
    }

    /// `scroll_up_to_tap_{name}` / `scroll_up_to_click_{name}`
    fn scroll_up_to_tap(&self) -> ScreenResult<()> {
        self.bundle().scroll_to_tap(Direction::Up, None)
    }
}

macro_rules! typed_accessor {
    ($(#[$doc:meta])* $ty:ident => $category:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $ty(AccessorBundle);

        impl Accessor for $ty {
            const CATEGORY: Category = Category::$category;

            fn bundle(&self) -> &AccessorBundle {
                &self.0
            }

            fn declare(
                session: &Session,
                name: impl Into<String>,
                locator: impl Into<LocatorSpec>,
            ) -> ScreenResult<Self> {
                AccessorBundle::new(session, Self::CATEGORY, name, locator).map(Self)
            }
        }

        impl From<$ty> for AccessorBundle {
            fn from(accessor: $ty) -> Self {
                accessor.0
            }
        }
    };
}

typed_accessor!(
    /// Button accessor; default action is tap
    Button => Button
);
typed_accessor!(
    /// Checkbox accessor; default action is tap
    Checkbox => Checkbox
);
typed_accessor!(
    /// Text accessor; default action is a read
    Text => Text
);
typed_accessor!(
    /// Text field accessor; default action is a read
    TextField => TextField
);
typed_accessor!(
    /// Image accessor; default action is tap
    Image => Image
);
typed_accessor!(
    /// Table accessor; no default action
    Table => Table
);
typed_accessor!(
    /// Generic element accessor; default action returns the handle
    GenericElement => GenericElement
);

impl Button {
    /// `{name}`
    pub fn tap(&self) -> ScreenResult<()> {
        self.0.tap()
    }

    /// `{name}_text`
    pub fn text(&self) -> ScreenResult<String> {
        self.0.text()
    }

    /// `{name}_value`
    pub fn value(&self) -> ScreenResult<String> {
        self.0.value()
    }

    /// `{name}_scroll_dynamic(text)`
    pub fn scroll_dynamic(&self, text: &str) -> ScreenResult<()> {
        self.0.scroll_dynamic(text)
    }

    /// `{name}_scroll_text(text)`
    pub fn scroll_text(&self, text: &str) -> ScreenResult<()> {
        self.0.scroll_text(text)
    }

    /// `{name}_scroll_dynamic_text(text)`
    pub fn scroll_dynamic_text(&self, text: &str) -> ScreenResult<()> {
        self.0.scroll_dynamic_text(text)
    }

    /// `{name}_scroll_exact_text(text)`
    pub fn scroll_exact_text(&self, text: &str) -> ScreenResult<()> {
        self.0.scroll_exact_text(text)
    }

    /// `{name}_scroll_dynamic_exact_text(text)`
    pub fn scroll_dynamic_exact_text(&self, text: &str) -> ScreenResult<()> {
        self.0.scroll_dynamic_exact_text(text)
    }
}

impl Checkbox {
    /// `{name}`
    pub fn tap(&self) -> ScreenResult<()> {
        self.0.tap()
    }

    /// `{name}_checked`
    #[must_use]
    pub fn checked(&self) -> bool {
        self.0.checked()
    }

    /// `check_{name}`
    pub fn check(&self) -> ScreenResult<()> {
        self.0.check()
    }

    /// `uncheck_{name}`
    pub fn uncheck(&self) -> ScreenResult<()> {
        self.0.uncheck()
    }

    /// `{name}_text`
    pub fn text(&self) -> ScreenResult<String> {
        self.0.text()
    }

    /// `{name}_value`
    pub fn value(&self) -> ScreenResult<String> {
        self.0.value()
    }
}

impl Text {
    /// `{name}` / `{name}_text`
    pub fn text(&self) -> ScreenResult<String> {
        self.0.text()
    }

    /// `tap_{name}` / `click_{name}`
    pub fn tap(&self) -> ScreenResult<()> {
        self.0.tap()
    }

    /// `{name}_dynamic_text(text)`
    pub fn dynamic_text(&self, text: &str) -> ScreenResult<Option<String>> {
        self.0.dynamic_text(text)
    }

    /// `{name}_has_text(text)`
    pub fn has_text(&self, expected: &str) -> ScreenResult<bool> {
        self.0.has_text(expected)
    }

    /// First match reading `expected`
    pub fn with_text(&self, expected: &str) -> ScreenResult<ElementRef> {
        self.0.with_text(expected)
    }

    /// `{name}_dynamic(text)`
    #[must_use]
    pub fn dynamic(&self, text: &str) -> bool {
        self.0.dynamic_exists(text)
    }

    /// `{name}_elements`
    pub fn elements(&self) -> ScreenResult<Vec<ElementRef>> {
        self.0.elements()
    }
}

impl TextField {
    /// `{name}` / `{name}_text`
    pub fn text(&self) -> ScreenResult<String> {
        self.0.text()
    }

    /// `set_{name}(text)`
    pub fn set(&self, text: &str) -> ScreenResult<()> {
        self.0.set_text(text)
    }

    /// `clear_{name}`
    pub fn clear(&self) -> ScreenResult<()> {
        self.0.clear()
    }

    /// `{name}_value`
    pub fn value(&self) -> ScreenResult<String> {
        self.0.value()
    }

    /// `{name}_elements`
    pub fn elements(&self) -> ScreenResult<Vec<ElementRef>> {
        self.0.elements()
    }
}

impl Image {
    /// `{name}`
    pub fn tap(&self) -> ScreenResult<()> {
        self.0.tap()
    }

    /// `{name}_text`
    pub fn text(&self) -> ScreenResult<String> {
        self.0.text()
    }

    /// `{name}_value`
    pub fn value(&self) -> ScreenResult<String> {
        self.0.value()
    }
}

impl Table {
    /// Declare a table whose cells have their own locator
    pub fn with_cells(
        session: &Session,
        name: impl Into<String>,
        locator: impl Into<LocatorSpec>,
        cells: impl Into<LocatorSpec>,
    ) -> ScreenResult<Self> {
        AccessorBundle::new(session, Category::Table, name, locator)?
            .with_cells(cells)
            .map(Self)
    }

    /// `{name}_cell_count`
    pub fn cell_count(&self) -> ScreenResult<usize> {
        self.0.cell_count()
    }
}

impl GenericElement {
    /// `{name}_text`
    pub fn text(&self) -> ScreenResult<String> {
        self.0.text()
    }

    /// `{name}_value`
    pub fn value(&self) -> ScreenResult<String> {
        self.0.value()
    }

    /// `{name}_elements`
    pub fn elements(&self) -> ScreenResult<Vec<ElementRef>> {
        self.0.elements()
    }

    /// `tap_{name}` / `click_{name}`
    pub fn tap(&self) -> ScreenResult<()> {
        self.0.tap()
    }

    /// `{name}_scroll_down`
    pub fn scroll_down(&self) -> ScreenResult<()> {
        self.0.swipe(Direction::Down)
    }

    /// `{name}_scroll_up`
    pub fn scroll_up(&self) -> ScreenResult<()> {
        self.0.swipe(Direction::Up)
    }

    /// `{name}_swipe_left`
    pub fn swipe_left(&self) -> ScreenResult<()> {
        self.0.swipe(Direction::Left)
    }

    /// `{name}_swipe_right`
    pub fn swipe_right(&self) -> ScreenResult<()> {
        self.0.swipe(Direction::Right)
    }
}
