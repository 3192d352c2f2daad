//! YAML front matter.

use serde::Deserialize;
use tracing::warn;

use crate::patterns::FRONT_MATTER_RE;

/// The front matter keys the renderer understands. Other keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Split a leading `---` block from the body.
///
/// Returns default front matter and the whole input when there is no block
/// or its YAML does not parse.
pub fn split_front_matter(markdown: &str) -> (FrontMatter, &str) {
    let Some(caps) = FRONT_MATTER_RE.captures(markdown) else {
        return (FrontMatter::default(), markdown);
    };
    let (Some(whole), Some(yaml)) = (caps.get(0), caps.get(1)) else {
        return (FrontMatter::default(), markdown);
    };

    let body = &markdown[whole.end()..];
    if yaml.as_str().trim().is_empty() {
        return (FrontMatter::default(), body);
    }
    match serde_yaml::from_str::<FrontMatter>(yaml.as_str()) {
        Ok(front) => (front, body),
        Err(err) => {
            warn!(%err, "ignoring invalid front matter");
            (FrontMatter::default(), markdown)
        }
    }
}

/// Expand front matter into Markdown: `title` becomes a level-one heading
/// and `description` a block quote, both ahead of the body.
pub fn preprocess(markdown: &str) -> String {
    let (front, body) = split_front_matter(markdown);
    let mut head = String::new();
    if let Some(title) = front.title.filter(|t| !t.is_empty()) {
        head.push_str("# ");
        head.push_str(&title);
        head.push_str("\n\n");
    }
    if let Some(description) = front.description.filter(|d| !d.is_empty()) {
        head.push_str("> ");
        head.push_str(&description);
        head.push_str("\n\n");
    }
    head + body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_and_description() {
        let md = "---\ntitle: Hello\ndescription: \"A short intro\"\ntags: [a, b]\n---\nBody text\n";
        assert_eq!(preprocess(md), "# Hello\n\n> A short intro\n\nBody text\n");
    }

    #[test]
    fn test_no_front_matter() {
        assert_eq!(preprocess("# Title\n\ntext"), "# Title\n\ntext");
        assert_eq!(preprocess("text\n---\nmore"), "text\n---\nmore");
    }

    #[test]
    fn test_empty_block_is_stripped() {
        assert_eq!(preprocess("---\n\n---\nbody"), "body");
    }

    #[test]
    fn test_invalid_yaml_keeps_input() {
        let md = "---\ntitle: [unclosed\n---\nbody";
        assert_eq!(preprocess(md), md);
    }

    #[test]
    fn test_split_keeps_body_only() {
        let (front, body) = split_front_matter("---\ntitle: T\n---\n\nParagraph");
        assert_eq!(front.title.as_deref(), Some("T"));
        assert_eq!(front.description, None);
        assert_eq!(body, "\nParagraph");
    }
}
