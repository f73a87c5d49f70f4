//! CSS property types and the enum_property! macro.

/// Macro for defining CSS keyword enums.
///
/// # Example
///
/// ```ignore
/// enum_property! {
///     /// CSS visibility values.
///     pub enum Visibility {
///         #[default]
///         Visible => "visible",
///         Hidden => "hidden",
///     }
/// }
/// ```
macro_rules! enum_property {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $css:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl $name {
            /// Returns the CSS keyword for this value.
            #[inline]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $css,)*
                }
            }

            /// Parse a CSS keyword into this enum.
            #[inline]
            pub fn from_css(s: &str) -> Option<Self> {
                match s {
                    $($css => Some($name::$variant),)*
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

enum_property! {
    /// CSS display values, collapsed to the outer display types that matter
    /// for rendering.
    pub enum Display {
        #[default]
        Inline => "inline",
        Block => "block",
        InlineBlock => "inline-block",
        ListItem => "list-item",
        Flex => "flex",
        Grid => "grid",
        Table => "table",
        Contents => "contents",
        None => "none",
    }
}

impl Display {
    /// Parse a keyword, folding variants onto the nearest tracked value
    /// (`inline-flex` is `Flex`, `table-row` is `Table`, and so on).
    pub fn from_keyword(s: &str) -> Option<Self> {
        Self::from_css(s).or(match s {
            "flow-root" => Some(Display::Block),
            "inline-flex" => Some(Display::Flex),
            "inline-grid" => Some(Display::Grid),
            "inline-table" => Some(Display::Table),
            _ if s.starts_with("table-") => Some(Display::Table),
            _ => None,
        })
    }
}

enum_property! {
    /// CSS visibility values.
    pub enum Visibility {
        #[default]
        Visible => "visible",
        Hidden => "hidden",
        Collapse => "collapse",
    }
}

impl Visibility {
    /// `hidden` and `collapse` both suppress rendering.
    pub fn is_hidden(&self) -> bool {
        !matches!(self, Visibility::Visible)
    }
}
