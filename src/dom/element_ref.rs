//! selectors crate Element implementation for ContentTree.
//!
//! Theme rules and the exporters' own queries (`code:not(pre code)`,
//! `blockquote p`, `ul ul`) all go through this matcher.

use std::fmt;

use cssparser::{CowRcStr, ParseError, ParserInput, SourceLocation, match_ignore_ascii_case};
use html5ever::{LocalName, Namespace};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::context::{
    MatchingContext, MatchingForInvalidation, MatchingMode, NeedsSelectorFlags, QuirksMode,
    SelectorCaches,
};
use selectors::matching::ElementSelectorFlags;
use selectors::parser::{ParseRelative, Selector, SelectorList, SelectorParseErrorKind};
use selectors::{OpaqueElement, SelectorImpl};

use super::{ContentTree, NodeData, NodeId};

/// Selector implementation for the selectors crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WenyanSelectors;

/// Identifier string type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct IdentStr(pub String);

impl precomputed_hash::PrecomputedHash for IdentStr {
    fn precomputed_hash(&self) -> u32 {
        let mut h: u32 = 0;
        for byte in self.0.bytes() {
            h = h.wrapping_mul(31).wrapping_add(byte as u32);
        }
        h
    }
}

impl AsRef<str> for IdentStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for IdentStr {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'a> From<&'a str> for IdentStr {
    fn from(s: &'a str) -> Self {
        Self(s.to_string())
    }
}

impl cssparser::ToCss for IdentStr {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

/// Wrapper type for LocalName that implements ToCss.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CssLocalName(pub LocalName);

impl precomputed_hash::PrecomputedHash for CssLocalName {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl cssparser::ToCss for CssLocalName {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(self.0.as_ref())
    }
}

impl From<String> for CssLocalName {
    fn from(s: String) -> Self {
        Self(LocalName::from(s))
    }
}

impl<'a> From<&'a str> for CssLocalName {
    fn from(s: &'a str) -> Self {
        Self(LocalName::from(s))
    }
}

impl AsRef<str> for CssLocalName {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

/// Wrapper type for Namespace that implements ToCss.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CssNamespace(pub Namespace);

impl precomputed_hash::PrecomputedHash for CssNamespace {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl cssparser::ToCss for CssNamespace {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(self.0.as_ref())
    }
}

impl From<String> for CssNamespace {
    fn from(s: String) -> Self {
        Self(Namespace::from(s))
    }
}

impl<'a> From<&'a str> for CssNamespace {
    fn from(s: &'a str) -> Self {
        Self(Namespace::from(s))
    }
}

impl<'i> selectors::parser::Parser<'i> for WenyanSelectors {
    type Impl = WenyanSelectors;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_non_ts_pseudo_class(
        &self,
        location: SourceLocation,
        name: CowRcStr<'i>,
    ) -> Result<NonTSPseudoClass, ParseError<'i, Self::Error>> {
        match_ignore_ascii_case! { &name,
            "link" => Ok(NonTSPseudoClass::Link),
            "visited" => Ok(NonTSPseudoClass::Visited),
            "hover" => Ok(NonTSPseudoClass::Hover),
            "active" => Ok(NonTSPseudoClass::Active),
            "focus" => Ok(NonTSPseudoClass::Focus),
            _ => Err(location.new_custom_error(
                SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name),
            )),
        }
    }
}

/// Pseudo-elements never parse; rules targeting them are handled by the
/// pseudo-element materializer instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoElement {}

impl cssparser::ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = WenyanSelectors;

    fn accepts_state_pseudo_classes(&self) -> bool {
        false
    }

    fn valid_after_slotted(&self) -> bool {
        false
    }
}

/// Dynamic pseudo-classes. They parse so that rules like `a:hover` do not
/// poison a whole selector list, but only `:link` ever matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NonTSPseudoClass {
    Link,
    Visited,
    Hover,
    Active,
    Focus,
}

impl selectors::parser::NonTSPseudoClass for NonTSPseudoClass {
    type Impl = WenyanSelectors;

    fn is_active_or_hover(&self) -> bool {
        matches!(self, Self::Hover | Self::Active)
    }

    fn is_user_action_state(&self) -> bool {
        matches!(self, Self::Hover | Self::Active | Self::Focus)
    }
}

impl cssparser::ToCss for NonTSPseudoClass {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        match self {
            Self::Link => dest.write_str(":link"),
            Self::Visited => dest.write_str(":visited"),
            Self::Hover => dest.write_str(":hover"),
            Self::Active => dest.write_str(":active"),
            Self::Focus => dest.write_str(":focus"),
        }
    }
}

impl SelectorImpl for WenyanSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = IdentStr;
    type Identifier = IdentStr;
    type LocalName = CssLocalName;
    type NamespaceUrl = CssNamespace;
    type NamespacePrefix = IdentStr;
    type BorrowedLocalName = CssLocalName;
    type BorrowedNamespaceUrl = CssNamespace;
    type NonTSPseudoClass = NonTSPseudoClass;
    type PseudoElement = PseudoElement;
}

/// Parse a selector list such as `h1, h2 > span`.
///
/// Returns `None` when any part fails to parse, matching how browsers drop
/// a whole rule with an invalid selector.
pub fn parse_selector_list(text: &str) -> Option<Vec<Selector<WenyanSelectors>>> {
    let mut input = ParserInput::new(text);
    let mut parser = cssparser::Parser::new(&mut input);
    SelectorList::parse(&WenyanSelectors, &mut parser, ParseRelative::No)
        .ok()
        .map(|list| list.slice().to_vec())
}

/// Whether an element matches any of the selectors.
pub fn matches_any(tree: &ContentTree, id: NodeId, selectors: &[Selector<WenyanSelectors>]) -> bool {
    if !tree.is_element(id) {
        return false;
    }
    let element = ElementRef::new(tree, id);
    let mut caches = SelectorCaches::default();
    let mut context = MatchingContext::new(
        MatchingMode::Normal,
        None,
        &mut caches,
        QuirksMode::NoQuirks,
        NeedsSelectorFlags::No,
        MatchingForInvalidation::No,
    );
    selectors.iter().any(|selector| {
        selectors::matching::matches_selector(selector, 0, None, &element, &mut context)
    })
}

/// Elements below `scope` (excluding it) matching `selector`, in document
/// order. An unparsable selector matches nothing.
pub fn select(tree: &ContentTree, scope: NodeId, selector: &str) -> Vec<NodeId> {
    let Some(selectors) = parse_selector_list(selector) else {
        return Vec::new();
    };
    tree.descendants(scope)
        .into_iter()
        .filter(|&id| matches_any(tree, id, &selectors))
        .collect()
}

/// Reference to an element in the ContentTree for selector matching.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    pub tree: &'a ContentTree,
    pub id: NodeId,
}

impl<'a> ElementRef<'a> {
    pub fn new(tree: &'a ContentTree, id: NodeId) -> Self {
        Self { tree, id }
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id)
            .field("name", &self.tree.element_name(self.id))
            .finish()
    }
}

impl<'a> selectors::Element for ElementRef<'a> {
    type Impl = WenyanSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self)
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.tree.parent(self.id)?;
        self.tree
            .is_element(parent)
            .then(|| Self::new(self.tree, parent))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        let mut current = self.tree.prev_sibling(self.id);
        while let Some(sibling) = current {
            if self.tree.is_element(sibling) {
                return Some(Self::new(self.tree, sibling));
            }
            current = self.tree.prev_sibling(sibling);
        }
        None
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.tree
            .next_element_sibling(self.id)
            .map(|id| Self::new(self.tree, id))
    }

    fn first_element_child(&self) -> Option<Self> {
        self.tree
            .children(self.id)
            .find(|&child| self.tree.is_element(child))
            .map(|id| Self::new(self.tree, id))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.tree
            .element_name(self.id)
            .is_some_and(|n| n == &name.0)
    }

    fn has_namespace(&self, ns: &CssNamespace) -> bool {
        self.tree
            .element_namespace(self.id)
            .is_some_and(|n| n == &ns.0)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.tree.element_name(self.id) == other.tree.element_name(other.id)
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssNamespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&IdentStr>,
    ) -> bool {
        self.tree
            .attrs(self.id)
            .iter()
            .filter(|attr| match ns {
                NamespaceConstraint::Any => true,
                NamespaceConstraint::Specific(ns) => attr.name.ns == ns.0,
            })
            .find(|attr| attr.name.local == local_name.0)
            .is_some_and(|attr| operation.eval_str(&attr.value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match pc {
            NonTSPseudoClass::Link => self.is_link(),
            _ => false,
        }
    }

    fn match_pseudo_element(
        &self,
        _pe: &PseudoElement,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        false
    }

    fn is_link(&self) -> bool {
        self.tree.is_tag(self.id, "a") && self.tree.has_attr(self.id, "href")
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.tree
            .get_attr(self.id, "id")
            .is_some_and(|elem_id| case_sensitivity.eq(elem_id.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.tree
            .classes(self.id)
            .any(|c| case_sensitivity.eq(c.as_bytes(), name.0.as_bytes()))
    }

    fn imported_part(&self, _name: &IdentStr) -> Option<IdentStr> {
        None
    }

    fn is_part(&self, _name: &IdentStr) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.tree.children(self.id).all(|child| {
            match self.tree.get(child).map(|n| &n.data) {
                Some(NodeData::Element { .. }) => false,
                Some(NodeData::Text(t)) => t.is_empty(),
                _ => true,
            }
        })
    }

    fn is_root(&self) -> bool {
        self.tree
            .parent(self.id)
            .and_then(|parent| self.tree.get(parent))
            .is_some_and(|parent| matches!(parent.data, NodeData::Document))
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn add_element_unique_hashes(&self, _filter: &mut selectors::bloom::BloomFilter) -> bool {
        false
    }

    fn has_custom_state(&self, _name: &IdentStr) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(tree: &ContentTree, tag: &str) -> NodeId {
        tree.elements_by_tag(tree.root(), tag)[0]
    }

    fn matches(tree: &ContentTree, id: NodeId, selector: &str) -> bool {
        let selectors = parse_selector_list(selector).expect("selector should parse");
        matches_any(tree, id, &selectors)
    }

    #[test]
    fn test_tag_and_class_selectors() {
        let tree = ContentTree::parse(r#"<p class="intro highlight">Hello</p>"#);
        let p = first(&tree, "p");
        assert!(matches(&tree, p, "p"));
        assert!(matches(&tree, p, ".intro"));
        assert!(matches(&tree, p, "p.highlight"));
        assert!(!matches(&tree, p, ".missing"));
        assert!(!matches(&tree, p, "div"));
    }

    #[test]
    fn test_root_id_prefix() {
        let tree = ContentTree::parse("<h2><span>T</span></h2>");
        let span = first(&tree, "span");
        assert!(matches(&tree, span, "#wenyan h2 span"));
        assert!(matches(&tree, tree.root(), "#wenyan"));
        assert!(matches(&tree, tree.root(), ":root"));
    }

    #[test]
    fn test_child_vs_descendant() {
        let tree = ContentTree::parse("<div><span><p>Nested</p></span></div>");
        let p = first(&tree, "p");
        assert!(matches(&tree, p, "div p"));
        assert!(!matches(&tree, p, "div > p"));
        assert!(matches(&tree, p, "span > p"));
    }

    #[test]
    fn test_negation_selects_inline_code_only() {
        let tree = ContentTree::parse("<p><code>a</code></p><pre><code>b</code></pre>");
        let hits = select(&tree, tree.root(), "code:not(pre code)");
        assert_eq!(hits.len(), 1);
        assert_eq!(tree.text_content(hits[0]), "a");
    }

    #[test]
    fn test_pseudo_element_does_not_parse() {
        assert!(parse_selector_list("h2::before").is_none());
        assert!(parse_selector_list("h2, h3::after").is_none());
    }

    #[test]
    fn test_hover_parses_but_never_matches() {
        let tree = ContentTree::parse(r#"<a href="x">x</a>"#);
        let a = first(&tree, "a");
        assert!(!matches(&tree, a, "a:hover"));
        assert!(matches(&tree, a, "a:link"));
    }

    #[test]
    fn test_select_is_document_ordered() {
        let tree = ContentTree::parse("<ul><li>1<ul><li>2</li></ul></li><li>3</li></ul>");
        let items = select(&tree, tree.root(), "li");
        let texts: Vec<_> = items
            .iter()
            .map(|&id| tree.text_content(id))
            .collect();
        assert_eq!(texts, ["12", "2", "3"]);
    }
}
