//! Per-path attribute lookup.
//!
//! The classifier asks for the `diff` attribute of each side's path: an
//! explicit `-diff` forces binary, an explicit `diff` forces text, anything
//! else leaves the decision to the content sniff.
//!
//! [`AttributeRules`] reads gitattributes-style lines:
//!
//! ```text
//! *.png   -diff
//! *.txt   diff
//! docs/*  diff=markdown
//! vendor  !diff
//! ```
//!
//! Patterns use gitignore glob syntax; the last matching rule for an
//! attribute wins.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::warn;

use crate::error::{DiffError, DiffResult};

/// The attribute consulted for binary/text decisions.
pub const DIFF_ATTR: &str = "diff";

/// Value of an attribute for a path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrValue {
    /// No rule says anything, or a rule reset the attribute (`!attr`).
    Unspecified,
    /// Set (`attr`).
    True,
    /// Unset (`-attr`).
    False,
    /// Set to a value (`attr=value`).
    Value(String),
}

/// Attribute lookup for repository paths.
pub trait AttributeLookup: Send + Sync {
    fn get(&self, path: &str, name: &str) -> DiffResult<AttrValue>;
}

/// Lookup that never has an opinion.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAttributes;

impl AttributeLookup for NoAttributes {
    fn get(&self, _path: &str, _name: &str) -> DiffResult<AttrValue> {
        Ok(AttrValue::Unspecified)
    }
}

struct Rule {
    pattern: String,
    matcher: Gitignore,
    name: String,
    value: AttrValue,
}

/// Ordered attribute rules with gitignore-style glob patterns.
#[derive(Default)]
pub struct AttributeRules {
    rules: Vec<Rule>,
}

impl AttributeRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse rules from gitattributes-style text.
    ///
    /// Blank lines and `#` comments are skipped, as are lines that name a
    /// pattern but no attributes.
    pub fn parse(text: &str) -> DiffResult<Self> {
        let mut rules = Self::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let Some(pattern) = fields.next() else {
                continue;
            };
            let mut any = false;
            for field in fields {
                let (name, value) = parse_assignment(field);
                rules.add(pattern, name, value)?;
                any = true;
            }
            if !any {
                warn!(line = lineno + 1, pattern, "attribute line has no attributes, skipping");
            }
        }
        Ok(rules)
    }

    /// Read and parse a rules file.
    pub fn from_file(path: &Path) -> DiffResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| DiffError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Append one rule. Later rules take precedence over earlier ones.
    pub fn add(&mut self, pattern: &str, name: &str, value: AttrValue) -> DiffResult<()> {
        if pattern.starts_with('!') {
            return Err(DiffError::Attribute(format!(
                "negative patterns are not allowed: {pattern}"
            )));
        }
        let mut builder = GitignoreBuilder::new("");
        builder
            .add_line(None, pattern)
            .map_err(|e| DiffError::Attribute(format!("{pattern}: {e}")))?;
        let matcher = builder
            .build()
            .map_err(|e| DiffError::Attribute(format!("{pattern}: {e}")))?;
        self.rules.push(Rule {
            pattern: pattern.to_string(),
            matcher,
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl AttributeLookup for AttributeRules {
    fn get(&self, path: &str, name: &str) -> DiffResult<AttrValue> {
        let value = self
            .rules
            .iter()
            .rev()
            .filter(|rule| rule.name == name)
            .find(|rule| rule.matcher.matched(path, false).is_ignore())
            .map(|rule| rule.value.clone())
            .unwrap_or(AttrValue::Unspecified);
        Ok(value)
    }
}

impl std::fmt::Debug for AttributeRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| (&r.pattern, &r.name, &r.value)))
            .finish()
    }
}

fn parse_assignment(field: &str) -> (&str, AttrValue) {
    if let Some(name) = field.strip_prefix('-') {
        (name, AttrValue::False)
    } else if let Some(name) = field.strip_prefix('!') {
        (name, AttrValue::Unspecified)
    } else if let Some((name, value)) = field.split_once('=') {
        (name, AttrValue::Value(value.to_string()))
    } else {
        (field, AttrValue::True)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_attributes_is_always_unspecified() {
        assert_eq!(NoAttributes.get("a.png", DIFF_ATTR).unwrap(), AttrValue::Unspecified);
    }

    #[test]
    fn parse_all_assignment_forms() {
        let rules = AttributeRules::parse(
            "# comment\n\n*.png -diff\n*.txt diff\n*.md diff=markdown\nkeep.png !diff\n",
        )
        .unwrap();
        assert_eq!(rules.len(), 4);
        assert_eq!(rules.get("img/logo.png", DIFF_ATTR).unwrap(), AttrValue::False);
        assert_eq!(rules.get("notes.txt", DIFF_ATTR).unwrap(), AttrValue::True);
        assert_eq!(
            rules.get("README.md", DIFF_ATTR).unwrap(),
            AttrValue::Value("markdown".into())
        );
        assert_eq!(rules.get("keep.png", DIFF_ATTR).unwrap(), AttrValue::Unspecified);
        assert_eq!(rules.get("main.rs", DIFF_ATTR).unwrap(), AttrValue::Unspecified);
    }

    #[test]
    fn last_matching_rule_wins() {
        let rules = AttributeRules::parse("*.dat -diff\nlogs/*.dat diff\n").unwrap();
        assert_eq!(rules.get("blob.dat", DIFF_ATTR).unwrap(), AttrValue::False);
        assert_eq!(rules.get("logs/run.dat", DIFF_ATTR).unwrap(), AttrValue::True);
    }

    #[test]
    fn rules_only_answer_for_their_attribute() {
        let rules = AttributeRules::parse("*.sh text -diff\n").unwrap();
        assert_eq!(rules.get("x.sh", "text").unwrap(), AttrValue::True);
        assert_eq!(rules.get("x.sh", DIFF_ATTR).unwrap(), AttrValue::False);
        assert_eq!(rules.get("x.sh", "eol").unwrap(), AttrValue::Unspecified);
    }

    #[test]
    fn line_without_attributes_is_skipped() {
        let rules = AttributeRules::parse("lonely-pattern\n").unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn negative_pattern_is_rejected() {
        let err = AttributeRules::new()
            .add("!*.txt", DIFF_ATTR, AttrValue::True)
            .unwrap_err();
        assert!(matches!(err, DiffError::Attribute(_)));
    }

    #[test]
    fn from_file_reads_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attributes");
        std::fs::write(&path, "*.bin -diff\n").unwrap();
        let rules = AttributeRules::from_file(&path).unwrap();
        assert_eq!(rules.get("x.bin", DIFF_ATTR).unwrap(), AttrValue::False);

        let missing = AttributeRules::from_file(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(missing, DiffError::Read { .. }));
    }
}
