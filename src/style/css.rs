//! CSS parsing and cascade for the rendering-relevant properties.

use std::cmp::Ordering;

use cssparser::{
    AtRuleParser, DeclarationParser, ParseError, Parser, ParserInput, QualifiedRuleParser,
    RuleBodyItemParser, RuleBodyParser, StyleSheetParser,
};
use selectors::context::{MatchingContext, SelectorCaches};
use selectors::parser::Selector;

use super::{ComputedStyle, Display, Visibility};
use crate::dom::{DomSelectors, ElementRef};

/// A parsed CSS stylesheet.
#[derive(Debug, Default, Clone)]
pub struct Stylesheet {
    pub rules: Vec<CssRule>,
}

/// A CSS rule with selectors and declarations.
#[derive(Debug, Clone)]
pub struct CssRule {
    pub selectors: Vec<Selector<DomSelectors>>,
    pub declarations: Vec<Declaration>,
    pub specificity: Specificity,
}

/// A CSS declaration (property: value).
#[derive(Debug, Clone)]
pub struct Declaration {
    pub property: String,
    pub value: PropertyValue,
    pub important: bool,
}

/// Parsed CSS property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Display(Display),
    Visibility(Visibility),
    /// `inherit`, `initial` or `unset`.
    Keyword(String),
    None,
}

/// CSS specificity for cascade ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Specificity {
    pub ids: u16,
    pub classes: u16,
    pub elements: u16,
}

impl Specificity {
    /// Specificity used for `style` attribute declarations.
    pub const INLINE: Specificity = Specificity {
        ids: u16::MAX,
        classes: u16::MAX,
        elements: u16::MAX,
    };

    pub fn from_selector(selector: &Selector<DomSelectors>) -> Self {
        let spec = selector.specificity();
        // selectors crate packs specificity as (id << 20) | (class << 10) | elements
        Self {
            ids: ((spec >> 20) & 0x3FF) as u16,
            classes: ((spec >> 10) & 0x3FF) as u16,
            elements: (spec & 0x3FF) as u16,
        }
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ids
            .cmp(&other.ids)
            .then(self.classes.cmp(&other.classes))
            .then(self.elements.cmp(&other.elements))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Origin of a style (for cascade ordering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Origin {
    UserAgent = 0,
    Author = 1,
    Inline = 2,
}

/// A matched declaration with ordering information for the cascade.
#[derive(Debug)]
struct MatchedDeclaration<'a> {
    declaration: &'a Declaration,
    origin: Origin,
    specificity: Specificity,
    order: usize,
}

impl Stylesheet {
    /// Parse a CSS stylesheet from a string. Invalid rules are skipped.
    pub fn parse(css: &str) -> Self {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut rules = Vec::new();

        let mut rule_parser = TopLevelRuleParser { rules: &mut rules };
        let stylesheet_parser = StyleSheetParser::new(&mut parser, &mut rule_parser);

        for result in stylesheet_parser {
            // Ignore errors - lenient parsing
            let _ = result;
        }

        Self { rules }
    }

    /// Check if the stylesheet is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Parse the declarations of a `style` attribute.
pub fn parse_inline_declarations(css: &str) -> Vec<Declaration> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut declarations = Vec::new();
    let mut decl_parser = DeclarationListParser {
        declarations: &mut declarations,
    };
    for result in RuleBodyParser::new(&mut parser, &mut decl_parser) {
        let _ = result;
    }
    declarations
}

/// Parser for top-level stylesheet rules.
struct TopLevelRuleParser<'a> {
    rules: &'a mut Vec<CssRule>,
}

impl<'i> AtRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        _name: cssparser::CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        // @media and friends are skipped
        Err(input.new_custom_error(()))
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &cssparser::ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> QualifiedRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = Vec<Selector<DomSelectors>>;
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        parse_selector_list(input)
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &cssparser::ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let mut declarations = Vec::new();
        let mut decl_parser = DeclarationListParser {
            declarations: &mut declarations,
        };

        for result in RuleBodyParser::new(input, &mut decl_parser) {
            let _ = result;
        }

        if declarations.is_empty() {
            return Ok(());
        }

        // One rule per selector so each keeps its own specificity.
        for selector in prelude {
            self.rules.push(CssRule {
                specificity: Specificity::from_selector(&selector),
                selectors: vec![selector],
                declarations: declarations.clone(),
            });
        }

        Ok(())
    }
}

/// Parse a comma-separated list of selectors.
fn parse_selector_list<'i>(
    parser: &mut Parser<'i, '_>,
) -> Result<Vec<Selector<DomSelectors>>, ParseError<'i, ()>> {
    let location = parser.current_source_location();
    let selectors = selectors::parser::SelectorList::parse(
        &DomSelectors,
        parser,
        selectors::parser::ParseRelative::No,
    )
    .map_err(|_| location.new_custom_error(()))?;

    Ok(selectors.slice().to_vec())
}

struct DeclarationListParser<'a> {
    declarations: &'a mut Vec<Declaration>,
}

impl<'i> AtRuleParser<'i> for DeclarationListParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        _name: cssparser::CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &cssparser::ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> QualifiedRuleParser<'i> for DeclarationListParser<'_> {
    type Prelude = ();
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &cssparser::ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> DeclarationParser<'i> for DeclarationListParser<'_> {
    type Declaration = ();
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: cssparser::CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &cssparser::ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let property = name.to_ascii_lowercase();
        let value = parse_property_value(&property, input);

        // Trailing tokens (e.g. `display: block flow`) are ignored.
        let mut important = false;
        loop {
            if input.try_parse(cssparser::parse_important).is_ok() {
                important = true;
                break;
            }
            if input.next().is_err() {
                break;
            }
        }

        if value != PropertyValue::None {
            self.declarations.push(Declaration {
                property,
                value,
                important,
            });
        }

        Ok(())
    }
}

impl<'i> RuleBodyItemParser<'i, (), ()> for DeclarationListParser<'_> {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Parse a property value based on the property name.
fn parse_property_value(property: &str, input: &mut Parser<'_, '_>) -> PropertyValue {
    let parsed = match property {
        "display" => parse_display(input),
        "visibility" => parse_visibility(input),
        _ => None,
    };
    parsed.unwrap_or(PropertyValue::None)
}

fn parse_display(input: &mut Parser<'_, '_>) -> Option<PropertyValue> {
    let token = input.expect_ident_cloned().ok()?.to_ascii_lowercase();
    match token.as_str() {
        t @ ("inherit" | "initial" | "unset") => Some(PropertyValue::Keyword(t.to_string())),
        t => Display::from_keyword(t).map(PropertyValue::Display),
    }
}

fn parse_visibility(input: &mut Parser<'_, '_>) -> Option<PropertyValue> {
    let token = input.expect_ident_cloned().ok()?.to_ascii_lowercase();
    match token.as_str() {
        t @ ("inherit" | "initial" | "unset") => Some(PropertyValue::Keyword(t.to_string())),
        t => Visibility::from_css(t).map(PropertyValue::Visibility),
    }
}

/// Compute the style of an element by applying the cascade.
///
/// `stylesheets` are in source order; `inline` are the element's `style`
/// attribute declarations.
pub fn compute_style(
    elem: ElementRef<'_>,
    stylesheets: &[(&Stylesheet, Origin)],
    inline: &[Declaration],
    parent_style: Option<&ComputedStyle>,
) -> ComputedStyle {
    let mut matched: Vec<MatchedDeclaration> = Vec::new();
    let mut order = 0;

    for (stylesheet, origin) in stylesheets {
        for rule in &stylesheet.rules {
            if rule_matches(elem, rule) {
                for decl in &rule.declarations {
                    matched.push(MatchedDeclaration {
                        declaration: decl,
                        origin: *origin,
                        specificity: rule.specificity,
                        order,
                    });
                    order += 1;
                }
            }
        }
    }

    for decl in inline {
        matched.push(MatchedDeclaration {
            declaration: decl,
            origin: Origin::Inline,
            specificity: Specificity::INLINE,
            order,
        });
        order += 1;
    }

    // Ascending cascade priority; the last applied declaration wins.
    matched.sort_by(|a, b| {
        a.declaration
            .important
            .cmp(&b.declaration.important)
            .then(a.origin.cmp(&b.origin))
            .then(a.specificity.cmp(&b.specificity))
            .then(a.order.cmp(&b.order))
    });

    let parent = parent_style.copied().unwrap_or_default();
    let mut style = ComputedStyle::inherited_from(&parent);

    for m in &matched {
        apply_declaration(&mut style, m.declaration, &parent);
    }

    style
}

/// Check if a rule matches an element.
fn rule_matches(elem: ElementRef<'_>, rule: &CssRule) -> bool {
    let mut caches = SelectorCaches::default();
    let mut context = MatchingContext::new(
        selectors::matching::MatchingMode::Normal,
        None,
        &mut caches,
        selectors::context::QuirksMode::NoQuirks,
        selectors::matching::NeedsSelectorFlags::No,
        selectors::matching::MatchingForInvalidation::No,
    );

    rule.selectors.iter().any(|selector| {
        selectors::matching::matches_selector(selector, 0, None, &elem, &mut context)
    })
}

/// Apply a declaration to a computed style.
fn apply_declaration(style: &mut ComputedStyle, decl: &Declaration, parent: &ComputedStyle) {
    match (decl.property.as_str(), &decl.value) {
        ("display", PropertyValue::Display(d)) => style.display = *d,
        ("display", PropertyValue::Keyword(k)) => {
            style.display = match k.as_str() {
                "inherit" => parent.display,
                _ => Display::Inline,
            };
        }
        ("visibility", PropertyValue::Visibility(v)) => style.visibility = *v,
        ("visibility", PropertyValue::Keyword(k)) => {
            // visibility is inherited, so `unset` behaves like `inherit`
            style.visibility = match k.as_str() {
                "initial" => Visibility::Visible,
                _ => parent.visibility,
            };
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ArenaDom, ArenaNodeId, Document};

    fn style_of(doc: &Document, id: ArenaNodeId, sheets: &[(&Stylesheet, Origin)]) -> ComputedStyle {
        let dom: &ArenaDom = doc.dom();
        let inline = dom
            .get_attr(id, "style")
            .map(parse_inline_declarations)
            .unwrap_or_default();
        compute_style(ElementRef::new(dom, id), sheets, &inline, None)
    }

    #[test]
    fn test_parse_display_and_visibility() {
        let sheet = Stylesheet::parse(".a { display: none; visibility: hidden; color: red; }");

        assert_eq!(sheet.rules.len(), 1);
        let decls = &sheet.rules[0].declarations;
        // Untracked properties are dropped at parse time.
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].value, PropertyValue::Display(Display::None));
        assert_eq!(decls[1].value, PropertyValue::Visibility(Visibility::Hidden));
    }

    #[test]
    fn test_rule_without_tracked_properties_is_dropped() {
        let sheet = Stylesheet::parse("p { color: blue; margin: 0 }");
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_selector_list_splits_specificity() {
        let sheet = Stylesheet::parse("#skip, nav a { display: none }");
        assert_eq!(sheet.rules.len(), 2);
        assert!(sheet.rules[0].specificity > sheet.rules[1].specificity);
    }

    #[test]
    fn test_at_rules_are_skipped() {
        let sheet = Stylesheet::parse("@media print { h1 { display: none } } h2 { display: block }");
        assert_eq!(sheet.rules.len(), 1);
    }

    #[test]
    fn test_important_flag() {
        let sheet = Stylesheet::parse("p { display: none !important; }");
        assert!(sheet.rules[0].declarations[0].important);
    }

    #[test]
    fn test_inline_declarations() {
        let decls = parse_inline_declarations("display:none; visibility: collapse");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[1].value, PropertyValue::Visibility(Visibility::Collapse));
    }

    #[test]
    fn test_specificity_wins_over_order() {
        let doc = Document::parse(r#"<div id="x" class="c">t</div>"#);
        let div = doc.dom().find_by_tag("div").unwrap();
        let sheet = Stylesheet::parse("#x { display: none } .c { display: block }");

        let style = style_of(&doc, div, &[(&sheet, Origin::Author)]);
        assert_eq!(style.display, Display::None);
    }

    #[test]
    fn test_important_beats_inline() {
        let doc = Document::parse(r#"<div style="display: block">t</div>"#);
        let div = doc.dom().find_by_tag("div").unwrap();
        let sheet = Stylesheet::parse("div { display: none !important }");

        let style = style_of(&doc, div, &[(&sheet, Origin::Author)]);
        assert_eq!(style.display, Display::None);
    }

    #[test]
    fn test_inline_beats_author() {
        let doc = Document::parse(r#"<div id="x" style="display: none">t</div>"#);
        let div = doc.dom().find_by_tag("div").unwrap();
        let sheet = Stylesheet::parse("#x { display: block }");

        let style = style_of(&doc, div, &[(&sheet, Origin::Author)]);
        assert_eq!(style.display, Display::None);
    }

    #[test]
    fn test_visibility_inherits_and_keywords() {
        let parent = ComputedStyle {
            display: Display::Block,
            visibility: Visibility::Hidden,
        };
        let doc = Document::parse(r#"<span>a</span><em style="visibility: initial">b</em>"#);
        let span = doc.dom().find_by_tag("span").unwrap();
        let em = doc.dom().find_by_tag("em").unwrap();

        let inherited = compute_style(ElementRef::new(doc.dom(), span), &[], &[], Some(&parent));
        assert_eq!(inherited.visibility, Visibility::Hidden);
        assert_eq!(inherited.display, Display::Inline);

        let decls = parse_inline_declarations("visibility: initial");
        let reset = compute_style(ElementRef::new(doc.dom(), em), &[], &decls, Some(&parent));
        assert_eq!(reset.visibility, Visibility::Visible);
    }
}
