//! Custom property flattening.
//!
//! Themes declare their palette as `--name: value;` (usually in `:root`) and
//! use it through `var(--name)`. Platforms that only accept inline styles
//! cannot evaluate either, so every reference is substituted textually and
//! the `:root` blocks are removed.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::{debug, warn};

use crate::patterns::{ROOT_RULE_RE, VAR_DEFINITION_RE, VAR_NAME_RE, VAR_USAGE_RE, WHITESPACE_RE};

#[derive(Debug, Error)]
enum ResolveError {
    #[error("circular reference through value `{0}`")]
    Cycle(String),
}

/// Variable name (without `--`) to raw value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
    values: HashMap<String, String>,
}

impl VariableTable {
    /// Collect every definition in `css`. Later definitions win; names that
    /// are not valid identifiers are ignored.
    pub fn extract(css: &str) -> Self {
        let mut values = HashMap::new();
        for caps in VAR_DEFINITION_RE.captures_iter(css) {
            let name = &caps[1];
            if !VAR_NAME_RE.is_match(name) {
                debug!(name, "ignoring invalid custom property name");
                continue;
            }
            let value = WHITESPACE_RE.replace_all(caps[2].trim(), " ").into_owned();
            values.insert(name.to_string(), value);
        }
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolve nested references of every variable.
    ///
    /// A variable whose resolution runs into a cycle keeps its raw value,
    /// so its `var(...)` text survives in the output.
    pub fn resolve(&self) -> HashMap<String, String> {
        self.values
            .iter()
            .map(|(name, raw)| {
                let resolved = match self.resolve_value(raw, &HashSet::new()) {
                    Ok(value) => value,
                    Err(err) => {
                        warn!(variable = %name, %err, "keeping unresolved css variable");
                        raw.clone()
                    }
                };
                (name.clone(), resolved)
            })
            .collect()
    }

    fn resolve_value(&self, value: &str, path: &HashSet<String>) -> Result<String, ResolveError> {
        if path.contains(value) {
            return Err(ResolveError::Cycle(value.to_string()));
        }
        let mut path = path.clone();
        path.insert(value.to_string());

        let mut out = String::with_capacity(value.len());
        let mut last = 0;
        for caps in VAR_USAGE_RE.captures_iter(value) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&value[last..whole.start()]);
            match self.values.get(name.as_str()) {
                Some(referenced) => out.push_str(&self.resolve_value(referenced, &path)?),
                None => out.push_str(whole.as_str()),
            }
            last = whole.end();
        }
        out.push_str(&value[last..]);
        Ok(out)
    }
}

/// Substitute every `var(--name)` in `css` with its resolved value and
/// strip the `:root { ... }` blocks.
///
/// Unknown names and variables caught in a cycle stay literal.
///
/// # Example
///
/// ```
/// let css = ":root { --x: 10px; --y: var(--x); } p { width: var(--y); }";
/// assert_eq!(wenyan::css::resolve_variables(css).trim(), "p { width: 10px; }");
/// ```
pub fn resolve_variables(css: &str) -> String {
    let table = VariableTable::extract(css);
    let resolved = table.resolve();
    debug!(variables = table.len(), "resolved css variables");

    let substituted = VAR_USAGE_RE.replace_all(css, |caps: &regex_lite::Captures<'_>| {
        resolved
            .get(&caps[1])
            .filter(|value| !value.is_empty())
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    });

    ROOT_RULE_RE.replace_all(&substituted, "").into_owned()
}
