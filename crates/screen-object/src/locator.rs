//! Locators: how a declared element is found on screen.
//!
//! A [`Locator`] is always exactly one `(strategy, value)` pair. Declarations
//! arrive in a few shapes ([`LocatorSpec`]) and are parsed once, at the
//! boundary; anything that is not a single pair with a known strategy is
//! rejected with [`ScreenError::InvalidLocator`].
//!
//! # Accepted shapes
//!
//! - builder helpers: `id("login")`, `xpath("//Button")`, ...
//! - a single `(strategy, value)` entry: `("accessibility_id", "Login")`
//! - `"strategy~value"` or `"strategy:value"` strings
//! - a bare type name (`"XCUIElementTypeButton"`), read as a class-name locator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ScreenError, ScreenResult};

/// Attributes searched by dynamic-text locators, in clause order.
pub const DYNAMIC_TEXT_ATTRIBUTES: [&str; 4] = ["name", "resource-id", "value", "text"];

/// Attributes compared by exact-text locators.
pub const EXACT_TEXT_ATTRIBUTES: [&str; 3] = ["name", "value", "text"];

/// Element lookup strategy understood by Appium-compatible drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Resource id (Android) or accessibility identifier (iOS)
    Id,
    /// XPath expression over the page source
    XPath,
    /// Accessibility id / content description
    AccessibilityId,
    /// Element class / type name
    ClassName,
    /// Element name attribute
    Name,
    /// CSS selector (webviews)
    Css,
    /// `UiSelector` expression
    AndroidUiAutomator,
    /// `NSPredicate` string
    IosPredicate,
    /// XCUITest class chain
    IosClassChain,
}

impl Strategy {
    /// All strategies, in declaration order
    pub const ALL: [Self; 9] = [
        Self::Id,
        Self::XPath,
        Self::AccessibilityId,
        Self::ClassName,
        Self::Name,
        Self::Css,
        Self::AndroidUiAutomator,
        Self::IosPredicate,
        Self::IosClassChain,
    ];

    /// Parse a strategy keyword, accepting the usual Appium spellings.
    #[must_use]
    pub fn parse(keyword: &str) -> Option<Self> {
        let normalized = keyword
            .trim()
            .trim_start_matches([':', '-'])
            .to_ascii_lowercase()
            .replace([' ', '-'], "_");
        match normalized.as_str() {
            "id" => Some(Self::Id),
            "xpath" => Some(Self::XPath),
            "accessibility_id" | "accessibility" | "a11y" => Some(Self::AccessibilityId),
            "class" | "class_name" => Some(Self::ClassName),
            "name" => Some(Self::Name),
            "css" | "css_selector" => Some(Self::Css),
            "uiautomator" | "android_uiautomator" => Some(Self::AndroidUiAutomator),
            "predicate" | "ios_predicate" | "ios_predicate_string" => Some(Self::IosPredicate),
            "class_chain" | "ios_class_chain" => Some(Self::IosClassChain),
            _ => None,
        }
    }

    /// Canonical keyword
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::XPath => "xpath",
            Self::AccessibilityId => "accessibility_id",
            Self::ClassName => "class_name",
            Self::Name => "name",
            Self::Css => "css",
            Self::AndroidUiAutomator => "android_uiautomator",
            Self::IosPredicate => "ios_predicate",
            Self::IosClassChain => "ios_class_chain",
        }
    }

    /// `using` value of the W3C find-element command
    #[must_use]
    pub const fn w3c_using(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::XPath => "xpath",
            Self::AccessibilityId => "accessibility id",
            Self::ClassName => "class name",
            Self::Name => "name",
            Self::Css => "css selector",
            Self::AndroidUiAutomator => "-android uiautomator",
            Self::IosPredicate => "-ios predicate string",
            Self::IosClassChain => "-ios class chain",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `(strategy, value)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    strategy: Strategy,
    value: String,
}

impl Locator {
    /// Create a locator, rejecting an empty value
    pub fn new(strategy: Strategy, value: impl Into<String>) -> ScreenResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ScreenError::invalid_locator(
                format!("{strategy}~{value}"),
                "locator value is empty",
            ));
        }
        Ok(Self { strategy, value })
    }

    /// Parse the string form: `strategy~value`, `strategy:value` or a bare type name.
    ///
    /// Whichever separator comes first splits keyword from value, so either
    /// may appear inside the value.
    pub fn parse(input: &str) -> ScreenResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ScreenError::invalid_locator(input, "locator is empty"));
        }

        let split = separator_index(trimmed).map(|i| (&trimmed[..i], &trimmed[i + 1..]));

        let Some((keyword, value)) = split else {
            if !bare_type_name().is_match(trimmed) {
                return Err(ScreenError::invalid_locator(
                    input,
                    "expected 'strategy~value', 'strategy:value' or an element type name",
                ));
            }
            return Self::new(Strategy::ClassName, trimmed);
        };

        if !strategy_keyword().is_match(keyword.trim()) {
            return Err(ScreenError::invalid_locator(
                input,
                format!("'{keyword}' is not a locator strategy"),
            ));
        }
        let strategy = Strategy::parse(keyword).ok_or_else(|| {
            ScreenError::invalid_locator(input, format!("unsupported strategy '{}'", keyword.trim()))
        })?;
        Self::new(strategy, value.trim()).map_err(|_| {
            ScreenError::invalid_locator(input, "locator value is empty")
        })
    }

    /// Lookup strategy
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Lookup value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Element type used to scope synthesized XPath.
    ///
    /// Class-name locators name the type directly; everything else widens to `*`.
    #[must_use]
    pub fn element_tag(&self) -> &str {
        match self.strategy {
            Strategy::ClassName => &self.value,
            _ => "*",
        }
    }

    /// XPath locator matching elements of the same type whose
    /// `name`, `resource-id`, `value` or `text` contains `text`.
    #[must_use]
    pub fn dynamic_text(&self, text: &str) -> Self {
        Self {
            strategy: Strategy::XPath,
            value: dynamic_text_xpath(self.element_tag(), text),
        }
    }

    /// XPath locator matching elements of the same type whose
    /// `name`, `value` or `text` equals `text`.
    #[must_use]
    pub fn exact_text(&self, text: &str) -> Self {
        Self {
            strategy: Strategy::XPath,
            value: exact_text_xpath(self.element_tag(), text),
        }
    }

    /// Shorthand constructors for the common strategies
    #[must_use]
    pub fn id(value: impl Into<String>) -> Self {
        Self::unchecked(Strategy::Id, value)
    }

    /// XPath locator
    #[must_use]
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::unchecked(Strategy::XPath, value)
    }

    fn unchecked(strategy: Strategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    pub(crate) fn validate(self) -> ScreenResult<Self> {
        if self.value.trim().is_empty() {
            return Err(ScreenError::invalid_locator(
                self.to_string(),
                "locator value is empty",
            ));
        }
        Ok(self)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy, self.value)
    }
}

#[allow(clippy::expect_used)]
fn strategy_keyword() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[:\-]?[A-Za-z][A-Za-z0-9_ \-]*$").expect("static regex"))
}

/// Byte offset of the first `~` or `:`; a leading `:` belongs to the keyword
fn separator_index(input: &str) -> Option<usize> {
    let skip = usize::from(input.starts_with(':'));
    input[skip..].find(['~', ':']).map(|i| i + skip)
}

#[allow(clippy::expect_used)]
fn bare_type_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.$]*$").expect("static regex"))
}

/// Locator as written at a declaration site, before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorSpec {
    /// Already-built locator
    Locator(Locator),
    /// Single `(strategy, value)` entry
    Pair(String, String),
    /// `strategy~value`, `strategy:value` or bare type name
    Text(String),
    /// Key/value mapping; must contain exactly one entry
    Map(Vec<(String, String)>),
}

impl LocatorSpec {
    /// Parse into a [`Locator`]
    pub fn into_locator(self) -> ScreenResult<Locator> {
        match self {
            Self::Locator(locator) => locator.validate(),
            Self::Pair(strategy, value) => pair_to_locator(&strategy, value),
            Self::Text(text) => Locator::parse(&text),
            Self::Map(entries) => match entries.as_slice() {
                [(strategy, value)] => pair_to_locator(strategy, value.clone()),
                [] => Err(ScreenError::invalid_locator("{}", "mapping has no entries")),
                _ => Err(ScreenError::invalid_locator(
                    format!("{entries:?}"),
                    format!("mapping must have exactly one entry, found {}", entries.len()),
                )),
            },
        }
    }
}

fn pair_to_locator(strategy: &str, value: String) -> ScreenResult<Locator> {
    let parsed = Strategy::parse(strategy).ok_or_else(|| {
        ScreenError::invalid_locator(
            format!("{strategy}~{value}"),
            format!("unsupported strategy '{strategy}'"),
        )
    })?;
    Locator::new(parsed, value)
}

impl From<Locator> for LocatorSpec {
    fn from(locator: Locator) -> Self {
        Self::Locator(locator)
    }
}

impl From<&str> for LocatorSpec {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for LocatorSpec {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<(&str, &str)> for LocatorSpec {
    fn from((strategy, value): (&str, &str)) -> Self {
        Self::Pair(strategy.to_string(), value.to_string())
    }
}

impl From<Vec<(&str, &str)>> for LocatorSpec {
    fn from(entries: Vec<(&str, &str)>) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl TryFrom<LocatorSpec> for Locator {
    type Error = ScreenError;

    fn try_from(spec: LocatorSpec) -> ScreenResult<Self> {
        spec.into_locator()
    }
}

/// `id` locator
#[must_use]
pub fn id(value: impl Into<String>) -> Locator {
    Locator::id(value)
}

/// `xpath` locator
#[must_use]
pub fn xpath(value: impl Into<String>) -> Locator {
    Locator::xpath(value)
}

/// Accessibility id locator
#[must_use]
pub fn accessibility_id(value: impl Into<String>) -> Locator {
    Locator::unchecked(Strategy::AccessibilityId, value)
}

/// Class / element type locator
#[must_use]
pub fn class(value: impl Into<String>) -> Locator {
    Locator::unchecked(Strategy::ClassName, value)
}

/// `name` attribute locator
#[must_use]
pub fn name(value: impl Into<String>) -> Locator {
    Locator::unchecked(Strategy::Name, value)
}

/// CSS selector locator
#[must_use]
pub fn css(value: impl Into<String>) -> Locator {
    Locator::unchecked(Strategy::Css, value)
}

/// Android `UiSelector` locator
#[must_use]
pub fn uiautomator(value: impl Into<String>) -> Locator {
    Locator::unchecked(Strategy::AndroidUiAutomator, value)
}

/// iOS predicate string locator
#[must_use]
pub fn predicate(value: impl Into<String>) -> Locator {
    Locator::unchecked(Strategy::IosPredicate, value)
}

/// iOS class chain locator
#[must_use]
pub fn class_chain(value: impl Into<String>) -> Locator {
    Locator::unchecked(Strategy::IosClassChain, value)
}

/// `//tag[contains(@name, 't') or contains(@resource-id, 't') or ...]`
#[must_use]
pub fn dynamic_text_xpath(tag: &str, text: &str) -> String {
    let literal = xpath_literal(text);
    let clauses: Vec<String> = DYNAMIC_TEXT_ATTRIBUTES
        .iter()
        .map(|attr| format!("contains(@{attr}, {literal})"))
        .collect();
    format!("//{tag}[{}]", clauses.join(" or "))
}

/// `//tag[@name='t' or @value='t' or @text='t']`
#[must_use]
pub fn exact_text_xpath(tag: &str, text: &str) -> String {
    let literal = xpath_literal(text);
    let clauses: Vec<String> = EXACT_TEXT_ATTRIBUTES
        .iter()
        .map(|attr| format!("@{attr}={literal}"))
        .collect();
    format!("//{tag}[{}]", clauses.join(" or "))
}

/// Quote `text` as an XPath 1.0 string literal.
#[must_use]
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{text}'");
    }
    if !text.contains('"') {
        return format!("\"{text}\"");
    }
    let parts: Vec<String> = text
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod strategy_tests {
        use super::*;

        #[test]
        fn test_parse_aliases() {
            assert_eq!(Strategy::parse("id"), Some(Strategy::Id));
            assert_eq!(Strategy::parse("XPath"), Some(Strategy::XPath));
            assert_eq!(
                Strategy::parse("accessibility id"),
                Some(Strategy::AccessibilityId)
            );
            assert_eq!(Strategy::parse(":class"), Some(Strategy::ClassName));
            assert_eq!(
                Strategy::parse("-android uiautomator"),
                Some(Strategy::AndroidUiAutomator)
            );
            assert_eq!(Strategy::parse("bogus"), None);
        }

        #[test]
        fn test_canonical_round_trip() {
            for strategy in Strategy::ALL {
                assert_eq!(Strategy::parse(strategy.as_str()), Some(strategy));
            }
        }

        #[test]
        fn test_w3c_using() {
            assert_eq!(Strategy::AccessibilityId.w3c_using(), "accessibility id");
            assert_eq!(Strategy::ClassName.w3c_using(), "class name");
            assert_eq!(Strategy::IosPredicate.w3c_using(), "-ios predicate string");
        }
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_tilde_form() {
            let locator = Locator::parse("xpath~//UIButtonField").unwrap();
            assert_eq!(locator.strategy(), Strategy::XPath);
            assert_eq!(locator.value(), "//UIButtonField");
        }

        #[test]
        fn test_colon_form_keeps_colons_in_value() {
            let locator = Locator::parse("id:com.example:id/login").unwrap();
            assert_eq!(locator.strategy(), Strategy::Id);
            assert_eq!(locator.value(), "com.example:id/login");
        }

        #[test]
        fn test_first_separator_wins() {
            let locator = Locator::parse("xpath~//*[@resource-id='app:id/x']").unwrap();
            assert_eq!(locator.value(), "//*[@resource-id='app:id/x']");

            let locator = Locator::parse("xpath://a[@text='x~y']").unwrap();
            assert_eq!(locator.strategy(), Strategy::XPath);
            assert_eq!(locator.value(), "//a[@text='x~y']");
        }

        #[test]
        fn test_symbol_style_keyword() {
            let locator = Locator::parse(":id~login").unwrap();
            assert_eq!(locator.strategy(), Strategy::Id);
            assert_eq!(locator.value(), "login");

            let locator = Locator::parse(":class:android.widget.Button").unwrap();
            assert_eq!(locator.strategy(), Strategy::ClassName);
            assert_eq!(locator.value(), "android.widget.Button");
        }

        #[test]
        fn test_bare_type_name_is_class() {
            let locator = Locator::parse("XCUIElementTypeButton").unwrap();
            assert_eq!(locator.strategy(), Strategy::ClassName);
            assert_eq!(locator.element_tag(), "XCUIElementTypeButton");
        }

        #[test]
        fn test_rejects_unknown_strategy() {
            let err = Locator::parse("foo~bar").unwrap_err();
            assert!(matches!(err, ScreenError::InvalidLocator { .. }));
        }

        #[test]
        fn test_rejects_empty_value() {
            assert!(Locator::parse("id~").is_err());
            assert!(Locator::parse("   ").is_err());
        }

        #[test]
        fn test_rejects_garbage() {
            assert!(Locator::parse("//Button[1]").is_err());
        }
    }

    mod spec_tests {
        use super::*;

        #[test]
        fn test_pair() {
            let locator = LocatorSpec::from(("id", "submit_btn")).into_locator().unwrap();
            assert_eq!(locator, Locator::id("submit_btn"));
        }

        #[test]
        fn test_map_needs_exactly_one_entry() {
            let ok = LocatorSpec::from(vec![("id", "a")]).into_locator();
            assert!(ok.is_ok());

            let two = LocatorSpec::from(vec![("id", "a"), ("xpath", "//b")]).into_locator();
            assert!(matches!(two, Err(ScreenError::InvalidLocator { .. })));

            let none = LocatorSpec::Map(vec![]).into_locator();
            assert!(none.is_err());
        }

        #[test]
        fn test_helper_with_empty_value_rejected() {
            assert!(LocatorSpec::from(id("")).into_locator().is_err());
        }

        #[test]
        fn test_display() {
            assert_eq!(accessibility_id("Login").to_string(), "accessibility_id=Login");
        }
    }

    mod dynamic_tests {
        use super::*;

        #[test]
        fn test_dynamic_text_covers_attribute_set() {
            let locator = class("android.widget.Button").dynamic_text("Pay");
            assert_eq!(locator.strategy(), Strategy::XPath);
            assert_eq!(
                locator.value(),
                "//android.widget.Button[contains(@name, 'Pay') or contains(@resource-id, 'Pay') \
                 or contains(@value, 'Pay') or contains(@text, 'Pay')]"
            );
        }

        #[test]
        fn test_dynamic_text_on_id_widens_tag() {
            let locator = id("pay").dynamic_text("Pay");
            assert!(locator.value().starts_with("//*["));
        }

        #[test]
        fn test_exact_text() {
            let locator = class("Cell").exact_text("Row 1");
            assert_eq!(
                locator.value(),
                "//Cell[@name='Row 1' or @value='Row 1' or @text='Row 1']"
            );
        }

        #[test]
        fn test_literal_quoting() {
            assert_eq!(xpath_literal("plain"), "'plain'");
            assert_eq!(xpath_literal("it's"), "\"it's\"");
            assert_eq!(
                xpath_literal("say \"it's\""),
                "concat('say \"it', \"'\", 's\"')"
            );
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

        proptest! {
            #[test]
            fn prop_dynamic_xpath_has_four_or_clauses(text in "[A-Za-z0-9]{1,20}") {
                let xpath = dynamic_text_xpath("Button", &text);
                prop_assert_eq!(xpath.matches("contains(").count(), 4);
                prop_assert_eq!(xpath.matches(" or ").count(), 3);
                for attr in DYNAMIC_TEXT_ATTRIBUTES {
                    let needle = format!("@{attr},");
                    prop_assert!(xpath.contains(&needle));
                }
            }

            #[test]
            fn prop_tilde_form_parses(value in "[a-z][a-z0-9_/]{0,15}") {
                let locator = Locator::parse(&format!("id~{value}")).unwrap();
                prop_assert_eq!(locator.strategy(), Strategy::Id);
                prop_assert_eq!(locator.value(), value.as_str());
            }

            #[test]
            fn prop_reapplying_dynamic_text_replaces(a in "[a-z]{1,8}", b in "[A-Z]{1,8}") {
                let base = class("Button");
                let first = base.dynamic_text(&a);
                let second = base.dynamic_text(&b);
                let stale = format!("'{a}'");
                prop_assert!(!second.value().contains(&stale));
                prop_assert_eq!(first.value().len() - 4 * a.len(), second.value().len() - 4 * b.len());
            }
        }
    }
}
