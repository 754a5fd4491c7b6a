//! Comment directives.
//!
//! Proto comments may carry `@key=value` or bare `@key` tags:
//!
//! ```proto
//! // The customer's login.
//! // @required @min=3 @max=32
//! // @pattern=^[a-z0-9_]+$
//! string login = 1;
//! ```
//!
//! Parsing ([`extract_directives`]) and applying ([`apply_directives`]) are
//! separate steps so the tag grammar can change without touching conversion.

use std::collections::BTreeMap;

use crate::descriptor::SourceLocation;
use crate::naming::to_split_case;
use crate::schema::{SchemaKind, SchemaNode};

/// Case-insensitive map from directive name to its raw value.
///
/// Bare tags map to `"true"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveSet {
    entries: BTreeMap<String, String>,
}

impl DirectiveSet {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&key.to_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Later inserts of the same key overwrite earlier ones.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_lowercase(), value.into());
    }
}

/// Collect the non-blank comment lines of a location: detached blocks first,
/// then the leading comment line by line, then the trailing comment.
pub fn comment_lines(location: &SourceLocation) -> Vec<String> {
    let mut lines = Vec::new();

    for block in &location.leading_detached_comments {
        let block = block.trim();
        if !block.is_empty() {
            lines.push(block.to_string());
        }
    }

    if let Some(leading) = &location.leading_comments {
        for line in leading.lines() {
            let line = line.trim();
            if !line.is_empty() {
                lines.push(line.to_string());
            }
        }
    }

    if let Some(trailing) = &location.trailing_comments {
        let trailing = trailing.trim();
        if !trailing.is_empty() {
            lines.push(trailing.to_string());
        }
    }

    lines
}

/// Parse the directive tags found on one comment line into `set`.
///
/// Text before the first `@` is prose, so a line reading just `required` or
/// `name=Foo` sets nothing; only `@`-prefixed tags count. Fragments still
/// containing `//` are dropped. A value keeps everything after the first `=`, so patterns may
/// contain `=` themselves.
pub fn parse_directive_line(line: &str, set: &mut DirectiveSet) {
    for fragment in line.split('@').skip(1) {
        if fragment.contains("//") {
            continue;
        }
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        match fragment.split_once('=') {
            Some((key, value)) => set.insert(key.trim(), value.trim()),
            None => set.insert(fragment, "true"),
        }
    }
}

/// Extract every directive attached to a descriptor's comments.
pub fn extract_directives(location: &SourceLocation) -> DirectiveSet {
    let mut set = DirectiveSet::default();
    for line in comment_lines(location) {
        parse_directive_line(&line, &mut set);
    }
    set
}

/// Directives for an optional location; no location means no directives.
pub fn directives_for(location: Option<&SourceLocation>) -> DirectiveSet {
    location.map(extract_directives).unwrap_or_default()
}

/// Apply recognized directives to `node`.
///
/// When both spellings of an alias are present the long form wins
/// (`title` over `name`, `description` over `desc`, `format` over `fmt`).
/// `min`/`max` bound the value of integer nodes and the length of every other
/// node; values that do not parse are ignored. Without a title directive the
/// title defaults to `identifier` in Split Case.
pub fn apply_directives(directives: &DirectiveSet, node: &mut SchemaNode, identifier: &str) {
    if let Some(title) = first_of(directives, &["title", "name"]) {
        node.title = Some(title.to_string());
    }
    if let Some(description) = first_of(directives, &["description", "desc"]) {
        node.description = Some(description.to_string());
    }
    if let Some(format) = first_of(directives, &["format", "fmt"]) {
        node.format = Some(format.to_string());
    }
    if let Some(pattern) = directives.get("pattern") {
        node.pattern = Some(pattern.to_string());
    }

    if directives.contains("required") {
        node.required = true;
    }
    if directives.contains("id") {
        node.primary_key = true;
    }
    if directives.contains("autoincrement") {
        node.auto_increment = true;
        node.primary_key = true;
    }
    if directives.contains("index") {
        node.index = true;
        node.required = true;
    }
    if directives.contains("query") {
        node.query = true;
    }

    let bounds_value = node.is(SchemaKind::Integer);
    if let Some(min) = directives.get("min") {
        if bounds_value {
            node.minimum = min.parse().ok().or(node.minimum);
        } else {
            node.min_length = min.parse().ok().or(node.min_length);
        }
    }
    if let Some(max) = directives.get("max") {
        if bounds_value {
            node.maximum = max.parse().ok().or(node.maximum);
        } else {
            node.max_length = max.parse().ok().or(node.max_length);
        }
    }

    if node.title.as_deref().map_or(true, str::is_empty) {
        node.title = Some(to_split_case(identifier));
    }
}

fn first_of<'a>(directives: &'a DirectiveSet, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| directives.get(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> DirectiveSet {
        let mut set = DirectiveSet::default();
        parse_directive_line(line, &mut set);
        set
    }

    #[test]
    fn bare_and_valued_tags() {
        let set = parse("@required @min=3 @max=10");
        assert_eq!(set.get("required"), Some("true"));
        assert_eq!(set.get("min"), Some("3"));
        assert_eq!(set.get("max"), Some("10"));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn keys_are_case_insensitive() {
        let set = parse("@Title=Customer Login @AutoIncrement");
        assert_eq!(set.get("title"), Some("Customer Login"));
        assert_eq!(set.get("TITLE"), Some("Customer Login"));
        assert!(set.contains("autoincrement"));
    }

    #[test]
    fn prose_before_first_tag_is_ignored() {
        let set = parse("The user's age in years. @min=0");
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("min"), Some("0"));
    }

    #[test]
    fn untagged_keywords_are_prose() {
        assert!(parse("required").is_empty());
        assert!(parse("name=Foo").is_empty());
        assert_eq!(parse("name=Foo @required").len(), 1);
    }

    #[test]
    fn fragments_with_comment_markers_are_dropped() {
        let set = parse("@format=uri // see http://example.com @query");
        assert!(set.get("format").is_none());
        assert!(set.contains("query"));
    }

    #[test]
    fn value_keeps_embedded_equals() {
        let set = parse("@pattern=^a=b$");
        assert_eq!(set.get("pattern"), Some("^a=b$"));
    }

    #[test]
    fn whitespace_around_equals_is_trimmed() {
        let set = parse("@min = 5");
        assert_eq!(set.get("min"), Some("5"));
    }

    #[test]
    fn later_lines_overwrite_earlier() {
        let location = SourceLocation::leading("@max=5\n@max=9\n");
        let set = extract_directives(&location);
        assert_eq!(set.get("max"), Some("9"));
    }

    #[test]
    fn comment_lines_gather_all_sources_in_order() {
        let location = SourceLocation::leading(" first line\n\n   second line \n")
            .with_trailing("  trailing ")
            .with_detached(" detached ")
            .with_detached("   ");
        assert_eq!(
            comment_lines(&location),
            vec!["detached", "first line", "second line", "trailing"]
        );
    }

    #[test]
    fn directives_from_every_comment_kind() {
        let location = SourceLocation::leading(" @title=Login\n")
            .with_trailing(" @required ")
            .with_detached(" @query ");
        let set = extract_directives(&location);
        assert_eq!(set.get("title"), Some("Login"));
        assert!(set.contains("required"));
        assert!(set.contains("query"));
    }

    #[test]
    fn missing_location_yields_empty_set() {
        assert!(directives_for(None).is_empty());
    }

    #[test]
    fn apply_length_bounds_on_string() {
        let mut node = SchemaNode::new(SchemaKind::String);
        apply_directives(&parse("@required @min=3 @max=10"), &mut node, "login");

        assert!(node.required);
        assert_eq!(node.min_length, Some(3));
        assert_eq!(node.max_length, Some(10));
        assert_eq!(node.minimum, None);
        assert_eq!(node.title.as_deref(), Some("Login"));
    }

    #[test]
    fn apply_value_bounds_on_integer() {
        let mut node = SchemaNode::new(SchemaKind::Integer);
        apply_directives(&parse("@min=-5 @max=100"), &mut node, "age");

        assert_eq!(node.minimum, Some(-5));
        assert_eq!(node.maximum, Some(100));
        assert_eq!(node.min_length, None);
    }

    #[test]
    fn apply_ignores_unparseable_bounds() {
        let mut node = SchemaNode::new(SchemaKind::Integer);
        apply_directives(&parse("@min=abc @max=1.5"), &mut node, "age");

        assert_eq!(node.minimum, None);
        assert_eq!(node.maximum, None);
    }

    #[test]
    fn apply_flags() {
        let mut node = SchemaNode::new(SchemaKind::Integer);
        apply_directives(&parse("@autoincrement @index @query"), &mut node, "id");

        assert!(node.auto_increment);
        assert!(node.primary_key);
        assert!(node.index);
        assert!(node.required);
        assert!(node.query);
    }

    #[test]
    fn apply_descriptive_aliases() {
        let mut node = SchemaNode::new(SchemaKind::String);
        apply_directives(
            &parse("@name=Email @desc=Contact address @fmt=email"),
            &mut node,
            "email_address",
        );

        assert_eq!(node.title.as_deref(), Some("Email"));
        assert_eq!(node.description.as_deref(), Some("Contact address"));
        assert_eq!(node.format.as_deref(), Some("email"));
    }

    #[test]
    fn apply_long_alias_wins() {
        let mut node = SchemaNode::new(SchemaKind::String);
        apply_directives(&parse("@title=Long @name=Short"), &mut node, "field");
        assert_eq!(node.title.as_deref(), Some("Long"));
    }

    #[test]
    fn apply_defaults_title_to_split_case() {
        let mut node = SchemaNode::new(SchemaKind::String);
        apply_directives(&DirectiveSet::default(), &mut node, "created_at");
        assert_eq!(node.title.as_deref(), Some("Created At"));

        let mut node = SchemaNode::new(SchemaKind::String);
        apply_directives(&parse("@title="), &mut node, "created_at");
        assert_eq!(node.title.as_deref(), Some("Created At"));
    }
}
