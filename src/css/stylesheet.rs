//! Lenient stylesheet parsing.
//!
//! Rules keep their selectors as text. Matching happens later against a
//! concrete tree, and the pseudo-element pass needs the raw selector text
//! (`h2::before`) that the selector parser refuses.

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, StyleSheetParser, Token,
};
use tracing::debug;

use super::declarations::{DeclarationBlock, split_important};
use crate::patterns::{COMMENT_RE, WHITESPACE_RE};

/// A parsed stylesheet: rules in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    pub rules: Vec<Rule>,
}

/// A style rule with its selectors and declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Individual selectors, whitespace-normalized, comments removed.
    pub selectors: Vec<String>,
    pub declarations: DeclarationBlock,
}

impl Rule {
    /// The selector list as written, joined with `, `.
    pub fn selector_text(&self) -> String {
        self.selectors.join(", ")
    }
}

impl StyleSheet {
    /// Parse a CSS stylesheet from a string.
    ///
    /// Style rules nested in `@media` and `@supports` are flattened into
    /// the top-level rule list. Other at-rules and rules that fail to parse
    /// are skipped.
    pub fn parse(css: &str) -> Self {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut rules = Vec::new();
        parse_rule_list(&mut parser, &mut rules);
        Self { rules }
    }

    /// Append every rule of `other` after the rules of `self`.
    pub fn append(&mut self, other: StyleSheet) {
        self.rules.extend(other.rules);
    }

    /// Check if the stylesheet is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }
}

fn parse_rule_list(parser: &mut Parser<'_, '_>, rules: &mut Vec<Rule>) {
    let mut rule_parser = TopLevelRuleParser { rules };
    for result in StyleSheetParser::new(parser, &mut rule_parser) {
        if let Err((_, source)) = result {
            debug!(rule = source.trim(), "skipping unparsable css rule");
        }
    }
}

/// Parser for top-level stylesheet rules.
struct TopLevelRuleParser<'a> {
    rules: &'a mut Vec<Rule>,
}

impl<'i> AtRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        if name.eq_ignore_ascii_case("media") || name.eq_ignore_ascii_case("supports") {
            while input.next().is_ok() {}
            Ok(())
        } else {
            Err(input.new_custom_error(()))
        }
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        parse_rule_list(input, &mut *self.rules);
        Ok(())
    }
}

impl<'i> QualifiedRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = Vec<String>;
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let selectors = split_selector_list(input);
        if selectors.is_empty() || selectors.iter().any(|s| s.contains(['{', '}'])) {
            return Err(input.new_custom_error(()));
        }
        Ok(selectors)
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let mut declarations = DeclarationBlock::new();
        let mut decl_parser = DeclarationListParser {
            declarations: &mut declarations,
        };

        for result in RuleBodyParser::new(input, &mut decl_parser) {
            if let Err((_, source)) = result {
                debug!(declaration = source.trim(), "skipping unparsable declaration");
            }
        }

        self.rules.push(Rule {
            selectors: prelude,
            declarations,
        });

        Ok(())
    }
}

/// Split a rule prelude on top-level commas, keeping each selector as text.
fn split_selector_list(input: &mut Parser<'_, '_>) -> Vec<String> {
    let mut selectors = Vec::new();
    let mut part_start = input.position();

    loop {
        let before = input.position();
        let token = input.next().map(|t| matches!(t, Token::Comma));
        match token {
            Ok(true) => {
                let part = input.slice(part_start..before);
                push_selector(&mut selectors, part);
                part_start = input.position();
            }
            Ok(false) => {}
            Err(_) => {
                let part = input.slice_from(part_start);
                push_selector(&mut selectors, part);
                break;
            }
        }
    }

    selectors
}

fn push_selector(selectors: &mut Vec<String>, raw: &str) {
    let without_comments = COMMENT_RE.replace_all(raw, "");
    let normalized = WHITESPACE_RE.replace_all(without_comments.trim(), " ");
    if !normalized.is_empty() {
        selectors.push(normalized.into_owned());
    }
}

struct DeclarationListParser<'a> {
    declarations: &'a mut DeclarationBlock,
}

impl<'i> AtRuleParser<'i> for DeclarationListParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        _name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
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
}

impl<'i> DeclarationParser<'i> for DeclarationListParser<'_> {
    type Declaration = ();
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next().is_ok() {}
        let raw = COMMENT_RE.replace_all(input.slice_from(start), "");
        let (value, important) = split_important(&raw);
        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }

        let property = name.to_string();
        if important {
            self.declarations.set_important(&property, value);
        } else {
            self.declarations.set(&property, value);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_rule() {
        let sheet = StyleSheet::parse("p { color: red; }");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].selectors, ["p"]);
        assert_eq!(sheet.rules[0].declarations.get("color"), Some("red"));
    }

    #[test]
    fn test_selector_list_is_split_on_top_level_commas() {
        let sheet = StyleSheet::parse("h1,\n  h2 >  span, a:not(.x, .y) { margin: 0 }");
        assert_eq!(
            sheet.rules[0].selectors,
            ["h1", "h2 > span", "a:not(.x, .y)"]
        );
    }

    #[test]
    fn test_values_are_kept_verbatim() {
        let sheet = StyleSheet::parse(
            "p { font-family: 'JetBrains Mono', monospace; background: url(\"a;b.png\") no-repeat; }",
        );
        let decls = &sheet.rules[0].declarations;
        assert_eq!(decls.get("font-family"), Some("'JetBrains Mono', monospace"));
        assert_eq!(decls.get("background"), Some("url(\"a;b.png\") no-repeat"));
    }

    #[test]
    fn test_important_is_flagged() {
        let sheet = StyleSheet::parse("p { color: red !important; margin: 0 ! important }");
        let decls: Vec<_> = sheet.rules[0].declarations.iter().collect();
        assert_eq!(decls[0].value, "red");
        assert!(decls[0].important);
        assert_eq!(decls[1].value, "0");
        assert!(decls[1].important);
    }

    #[test]
    fn test_media_rules_are_flattened() {
        let sheet = StyleSheet::parse(
            "p { color: red } @media (max-width: 600px) { h1 { font-size: 20px } } a { color: blue }",
        );
        let selectors: Vec<_> = sheet.rules.iter().map(Rule::selector_text).collect();
        assert_eq!(selectors, ["p", "h1", "a"]);
    }

    #[test]
    fn test_unknown_at_rules_and_garbage_are_skipped() {
        let sheet = StyleSheet::parse(
            "@import url(x.css); @font-face { font-family: X } p { color: red; : bad; } @keyframes k { from { opacity: 0 } }",
        );
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].selectors, ["p"]);
        assert_eq!(sheet.rules[0].declarations.len(), 1);
    }

    #[test]
    fn test_pseudo_element_selector_text_survives() {
        let sheet = StyleSheet::parse("#wenyan h2::before { content: \"#\"; }");
        assert_eq!(sheet.rules[0].selector_text(), "#wenyan h2::before");
        assert_eq!(sheet.rules[0].declarations.get("content"), Some("\"#\""));
    }

    #[test]
    fn test_comments_are_stripped() {
        let sheet = StyleSheet::parse("/* theme */ p /* x */ { color: /* c */ red; }");
        assert_eq!(sheet.rules[0].selectors, ["p"]);
        assert_eq!(sheet.rules[0].declarations.get("color"), Some("red"));
    }
}
