//! Screen Object Macros: compile-time accessor generation
//!
//! `screen!` turns a block of element declarations into a struct with one
//! typed method per generated operation, so a misspelt accessor is a
//! compile error instead of an `UnknownOperation` at run time.
//!
//! # Example
//!
//! ```ignore
//! use screen_object::prelude::*;
//!
//! screen! {
//!     /// Login form
//!     pub struct LoginScreen {
//!         button submit = id("submit_btn");
//!         checkbox remember = id("remember_me");
//!         text_field username = "id~user";
//!         element list = class("android.widget.ListView");
//!         table rows = id("rows") cells xpath("//Cell");
//!     }
//! }
//!
//! let login = LoginScreen::new(&session)?;
//! login.scroll_down_to_tap_submit()?;
//! login.set_username("alice")?;
//! assert!(!login.remember_checked());
//! ```
//!
//! # Declaration keywords
//!
//! `button`, `checkbox`, `text`, `text_field`, `image`, `table`, `element`.
//! The locator is any expression convertible into a `LocatorSpec`; tables
//! take an optional `cells <expr>` clause.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use std::collections::HashMap;
use syn::parse::{Parse, ParseStream};
use syn::{braced, parse_macro_input, Attribute, Expr, Ident, Token, Visibility};

/// Declare a screen and generate its accessor methods.
///
/// Generates:
/// - the struct, holding the session and one `AccessorBundle` per element
/// - `new(&Session) -> ScreenResult<Self>`, failing on a malformed locator
/// - one method per operation of each element's category
/// - `bundle`, `call` and `ELEMENTS` for name-based access
/// - an `impl ScreenActions`
#[proc_macro]
pub fn screen(input: TokenStream) -> TokenStream {
    let def = parse_macro_input!(input as ScreenDef);
    expand(&def)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

// ============================================================================
// Parsing
// ============================================================================

struct ScreenDef {
    attrs: Vec<Attribute>,
    vis: Visibility,
    name: Ident,
    elements: Vec<ElementDef>,
}

struct ElementDef {
    attrs: Vec<Attribute>,
    kind: Kind,
    name: Ident,
    locator: Expr,
    cells: Option<Expr>,
}

impl Parse for ScreenDef {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let vis: Visibility = input.parse()?;
        input.parse::<Token![struct]>()?;
        let name: Ident = input.parse()?;

        let content;
        braced!(content in input);
        let mut elements = Vec::new();
        while !content.is_empty() {
            elements.push(content.parse::<ElementDef>()?);
        }

        Ok(Self {
            attrs,
            vis,
            name,
            elements,
        })
    }
}

impl Parse for ElementDef {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let keyword: Ident = input.parse()?;
        let kind = Kind::parse(&keyword)?;
        let name: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        let locator: Expr = input.parse()?;

        let cells = if input.peek(Ident) {
            let clause: Ident = input.parse()?;
            if clause != "cells" {
                return Err(syn::Error::new(
                    clause.span(),
                    format!("expected `cells` or `;`, found `{clause}`"),
                ));
            }
            if kind != Kind::Table {
                return Err(syn::Error::new(
                    clause.span(),
                    "`cells` is only valid on `table` declarations",
                ));
            }
            Some(input.parse::<Expr>()?)
        } else {
            None
        };
        input.parse::<Token![;]>()?;

        Ok(Self {
            attrs,
            kind,
            name,
            locator,
            cells,
        })
    }
}

// ============================================================================
// Categories and operations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Button,
    Checkbox,
    Text,
    TextField,
    Image,
    Table,
    Element,
}

const KEYWORDS: &str = "button, checkbox, text, text_field, image, table, element";

impl Kind {
    fn parse(keyword: &Ident) -> syn::Result<Self> {
        match keyword.to_string().as_str() {
            "button" => Ok(Self::Button),
            "checkbox" => Ok(Self::Checkbox),
            "text" => Ok(Self::Text),
            "text_field" => Ok(Self::TextField),
            "image" => Ok(Self::Image),
            "table" => Ok(Self::Table),
            "element" => Ok(Self::Element),
            other => Err(syn::Error::new(
                keyword.span(),
                format!("unknown element category `{other}`; expected one of: {KEYWORDS}"),
            )),
        }
    }

    fn category(self) -> TokenStream2 {
        match self {
            Self::Button => quote!(::screen_object::Category::Button),
            Self::Checkbox => quote!(::screen_object::Category::Checkbox),
            Self::Text => quote!(::screen_object::Category::Text),
            Self::TextField => quote!(::screen_object::Category::TextField),
            Self::Image => quote!(::screen_object::Category::Image),
            Self::Table => quote!(::screen_object::Category::Table),
            Self::Element => quote!(::screen_object::Category::GenericElement),
        }
    }

    fn extra(self) -> &'static [Op] {
        match self {
            Self::Button => &[
                Op::Text,
                Op::Value,
                Op::ScrollDynamic,
                Op::ScrollText,
                Op::ScrollDynamicText,
                Op::ScrollExactText,
                Op::ScrollDynamicExactText,
            ],
            Self::Checkbox => &[Op::Checked, Op::Check, Op::Uncheck, Op::Text, Op::Value],
            Self::Text => &[
                Op::Text,
                Op::Tap,
                Op::Click,
                Op::DynamicText,
                Op::HasText,
                Op::Dynamic,
                Op::Elements,
            ],
            Self::TextField => &[Op::Set, Op::Clear, Op::Text, Op::Value, Op::Elements],
            Self::Image => &[Op::Text, Op::Value],
            Self::Table => &[Op::CellCount],
            Self::Element => &[
                Op::Text,
                Op::Value,
                Op::Elements,
                Op::Tap,
                Op::Click,
                Op::ScrollElementDown,
                Op::ScrollElementUp,
                Op::SwipeElementLeft,
                Op::SwipeElementRight,
            ],
        }
    }

    fn operations(self) -> Vec<Op> {
        let default = (self != Self::Table).then_some(Op::Default);
        default
            .into_iter()
            .chain(BASE)
            .chain(self.extra().iter().copied())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Default,
    Element,
    Exists,
    Enabled,
    Position,
    Location,
    ScrollDownTo,
    ScrollUpTo,
    ScrollDownToTap,
    ScrollDownToClick,
    ScrollUpToTap,
    ScrollUpToClick,
    Text,
    Value,
    ScrollDynamic,
    ScrollText,
    ScrollDynamicText,
    ScrollExactText,
    ScrollDynamicExactText,
    Checked,
    Check,
    Uncheck,
    Tap,
    Click,
    DynamicText,
    HasText,
    Dynamic,
    Elements,
    Set,
    Clear,
    CellCount,
    ScrollElementDown,
    ScrollElementUp,
    SwipeElementLeft,
    SwipeElementRight,
}

const BASE: [Op; 11] = [
    Op::Element,
    Op::Exists,
    Op::Enabled,
    Op::Position,
    Op::Location,
    Op::ScrollDownTo,
    Op::ScrollUpTo,
    Op::ScrollDownToTap,
    Op::ScrollDownToClick,
    Op::ScrollUpToTap,
    Op::ScrollUpToClick,
];

impl Op {
    fn method_name(self, name: &str) -> String {
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

    /// Parameters, return type and body of the generated method
    fn signature(self, kind: Kind, field: &Ident) -> (TokenStream2, TokenStream2, TokenStream2) {
        let so = quote!(::screen_object);
        let unit = quote!(#so::ScreenResult<()>);
        let text = quote!(, text: &str);
        let none = TokenStream2::new();
        let dir = |d: &str| {
            let d = format_ident!("{d}");
            quote!(#so::Direction::#d)
        };

        match self {
            Self::Default => match kind {
                Kind::Button | Kind::Checkbox | Kind::Image => {
                    (none, unit, quote!(self.#field.tap()))
                }
                Kind::Text | Kind::TextField => (
                    none,
                    quote!(#so::ScreenResult<String>),
                    quote!(self.#field.text()),
                ),
                Kind::Element | Kind::Table => (
                    none,
                    quote!(#so::ElementHandle),
                    quote!(self.#field.element()),
                ),
            },
            Self::Element => (
                none,
                quote!(#so::ElementHandle),
                quote!(self.#field.element()),
            ),
            Self::Exists => (none, quote!(bool), quote!(self.#field.exists())),
            Self::Enabled => (none, quote!(bool), quote!(self.#field.enabled())),
            Self::Position | Self::Location => (
                none,
                quote!(#so::ScreenResult<#so::Rect>),
                quote!(self.#field.position()),
            ),
            Self::ScrollDownTo => {
                let d = dir("Down");
                (none, unit, quote!(self.#field.scroll_to_view(#d, None)))
            }
            Self::ScrollUpTo => {
                let d = dir("Up");
                (none, unit, quote!(self.#field.scroll_to_view(#d, None)))
            }
            Self::ScrollDownToTap | Self::ScrollDownToClick => {
                let d = dir("Down");
                (none, unit, quote!(self.#field.scroll_to_tap(#d, None)))
            }
            Self::ScrollUpToTap | Self::ScrollUpToClick => {
                let d = dir("Up");
                (none, unit, quote!(self.#field.scroll_to_tap(#d, None)))
            }
            Self::Text => (
                none,
                quote!(#so::ScreenResult<String>),
                quote!(self.#field.text()),
            ),
            Self::Value => (
                none,
                quote!(#so::ScreenResult<String>),
                quote!(self.#field.value()),
            ),
            Self::ScrollDynamic => (text, unit, quote!(self.#field.scroll_dynamic(text))),
            Self::ScrollText => (text, unit, quote!(self.#field.scroll_text(text))),
            Self::ScrollDynamicText => (text, unit, quote!(self.#field.scroll_dynamic_text(text))),
            Self::ScrollExactText => (text, unit, quote!(self.#field.scroll_exact_text(text))),
            Self::ScrollDynamicExactText => (
                text,
                unit,
                quote!(self.#field.scroll_dynamic_exact_text(text)),
            ),
            Self::Checked => (none, quote!(bool), quote!(self.#field.checked())),
            Self::Check => (none, unit, quote!(self.#field.check())),
            Self::Uncheck => (none, unit, quote!(self.#field.uncheck())),
            Self::Tap | Self::Click => (none, unit, quote!(self.#field.tap())),
            Self::DynamicText => (
                text,
                quote!(#so::ScreenResult<Option<String>>),
                quote!(self.#field.dynamic_text(text)),
            ),
            Self::HasText => (
                text,
                quote!(#so::ScreenResult<bool>),
                quote!(self.#field.has_text(text)),
            ),
            Self::Dynamic => (text, quote!(bool), quote!(self.#field.dynamic_exists(text))),
            Self::Elements => (
                none,
                quote!(#so::ScreenResult<Vec<#so::ElementRef>>),
                quote!(self.#field.elements()),
            ),
            Self::Set => (text, unit, quote!(self.#field.set_text(text))),
            Self::Clear => (none, unit, quote!(self.#field.clear())),
            Self::CellCount => (
                none,
                quote!(#so::ScreenResult<usize>),
                quote!(self.#field.cell_count()),
            ),
            Self::ScrollElementDown => {
                let d = dir("Down");
                (none, unit, quote!(self.#field.swipe(#d)))
            }
            Self::ScrollElementUp => {
                let d = dir("Up");
                (none, unit, quote!(self.#field.swipe(#d)))
            }
            Self::SwipeElementLeft => {
                let d = dir("Left");
                (none, unit, quote!(self.#field.swipe(#d)))
            }
            Self::SwipeElementRight => {
                let d = dir("Right");
                (none, unit, quote!(self.#field.swipe(#d)))
            }
        }
    }

    const fn describe(self) -> &'static str {
        match self {
            Self::Default => "Default action",
            Self::Element => "Fresh element handle",
            Self::Exists => "Present and displayed",
            Self::Enabled => "Present and enabled",
            Self::Position | Self::Location => "Element edges and size",
            Self::ScrollDownTo | Self::ScrollUpTo => "Scroll until displayed",
            Self::ScrollDownToTap
            | Self::ScrollDownToClick
            | Self::ScrollUpToTap
            | Self::ScrollUpToClick => "Scroll until displayed, then tap",
            Self::Text => "Platform-resolved label",
            Self::Value => "`value` attribute",
            Self::ScrollDynamic => "Scroll down to an element containing `text` and tap it",
            Self::ScrollText | Self::ScrollExactText => {
                "Tap this element, or scroll to one matching `text`"
            }
            Self::ScrollDynamicText | Self::ScrollDynamicExactText => {
                "Tap the element matching `text`, scrolling to it if needed"
            }
            Self::Checked => "Checkbox state",
            Self::Check => "Ensure checked",
            Self::Uncheck => "Ensure unchecked",
            Self::Tap | Self::Click => "Tap",
            Self::DynamicText => "Label of the element containing `text`",
            Self::HasText => "Whether any match reads `text`",
            Self::Dynamic => "Whether an element containing `text` is displayed",
            Self::Elements => "Every match",
            Self::Set => "Replace the content",
            Self::Clear => "Clear the content",
            Self::CellCount => "Number of cells",
            Self::ScrollElementDown
            | Self::ScrollElementUp
            | Self::SwipeElementLeft
            | Self::SwipeElementRight => "Swipe inside the element's bounds",
        }
    }
}

// ============================================================================
// Expansion
// ============================================================================

fn expand(def: &ScreenDef) -> syn::Result<TokenStream2> {
    validate(def)?;

    let ScreenDef {
        attrs,
        vis,
        name,
        elements,
    } = def;
    let screen_name = name.to_string();
    let fields: Vec<&Ident> = elements.iter().map(|e| &e.name).collect();
    let field_names: Vec<String> = fields.iter().map(ToString::to_string).collect();
    let field_attrs: Vec<&Vec<Attribute>> = elements.iter().map(|e| &e.attrs).collect();
    let count = elements.len();

    let declarations = elements.iter().map(|e| {
        let field = &e.name;
        let label = field.to_string();
        let category = e.kind.category();
        let locator = &e.locator;
        let cells = e
            .cells
            .as_ref()
            .map(|cells| quote!(.with_cells(#cells)?));
        quote! {
            #field: ::screen_object::AccessorBundle::new(session, #category, #label, #locator)? #cells
        }
    });

    let methods = elements.iter().flat_map(|e| {
        let label = e.name.to_string();
        e.kind.operations().into_iter().map(move |op| {
            let method = format_ident!("{}", op.method_name(&label));
            let (params, ret, body) = op.signature(e.kind, &e.name);
            let doc = format!("{} (`{label}`)", op.describe());
            quote! {
                #[doc = #doc]
                pub fn #method(&self #params) -> #ret {
                    #body
                }
            }
        })
    });

    Ok(quote! {
        #(#attrs)*
        #[derive(Debug, Clone)]
        #vis struct #name {
            session: ::screen_object::Session,
            #(
                #(#field_attrs)*
                #fields: ::screen_object::AccessorBundle,
            )*
        }

        impl #name {
            /// Declared element names, in declaration order
            pub const ELEMENTS: [&'static str; #count] = [#(#field_names),*];

            /// Declare every element against `session`
            pub fn new(session: &::screen_object::Session) -> ::screen_object::ScreenResult<Self> {
                Ok(Self {
                    session: session.clone(),
                    #(#declarations,)*
                })
            }

            /// Accessor bundle of a declared element
            pub fn bundle(&self, element: &str) -> Option<&::screen_object::AccessorBundle> {
                match element {
                    #(#field_names => Some(&self.#fields),)*
                    _ => None,
                }
            }

            /// Dispatch a generated operation by name
            pub fn call(
                &self,
                method: &str,
                args: &::screen_object::OperationArgs,
            ) -> ::screen_object::ScreenResult<::screen_object::OperationOutput> {
                let bundles: [&::screen_object::AccessorBundle; #count] = [#(&self.#fields),*];
                match bundles.iter().find(|b| b.has_operation(method)) {
                    Some(bundle) => bundle.invoke(method, args),
                    None => Err(::screen_object::ScreenError::UnknownOperation {
                        element: #screen_name.to_string(),
                        operation: method.to_string(),
                    }),
                }
            }

            #(#methods)*
        }

        impl ::screen_object::ScreenActions for #name {
            fn session(&self) -> &::screen_object::Session {
                &self.session
            }
        }
    })
}

/// Names the generated struct already uses for its field and inherent items
const RESERVED: [&str; 5] = ["session", "new", "bundle", "call", "ELEMENTS"];

fn validate(def: &ScreenDef) -> syn::Result<()> {
    if def.elements.is_empty() {
        return Err(syn::Error::new(
            def.name.span(),
            "a screen needs at least one element",
        ));
    }
    let mut seen: Vec<String> = Vec::with_capacity(def.elements.len());
    let mut methods: HashMap<String, String> = HashMap::new();
    for element in &def.elements {
        let label = element.name.to_string();
        if RESERVED.contains(&label.as_str()) {
            return Err(syn::Error::new(
                element.name.span(),
                format!("`{label}` is reserved by the generated screen"),
            ));
        }
        if seen.contains(&label) {
            return Err(syn::Error::new(
                element.name.span(),
                format!("element `{label}` is declared twice"),
            ));
        }
        for op in element.kind.operations() {
            let method = op.method_name(&label);
            if let Some(owner) = methods.insert(method.clone(), label.clone()) {
                return Err(syn::Error::new(
                    element.name.span(),
                    format!(
                        "element `{label}` generates `{method}`, which element `{owner}` already generates"
                    ),
                ));
            }
        }
        seen.push(label);
    }
    Ok(())
}
