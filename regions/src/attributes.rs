use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

/// One `name` or `name=value` pair at the head of the input.
/// Groups: 1 = name, 2 = double-quoted, 3 = single-quoted, 4 = bare value.
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"+|'([^']*)'+|([^\s"'=<>`]+)))?"#,
    )
    .unwrap()
});

/// Attributes whose value is a comma-separated list.
const MULTI_VALUED: &[&str] = &["prefix"];

const PLACEHOLDER_PREFIX: &str = "placeholder-";

/// The value stored under one attribute name.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Attribute present without `=value`.
    Flag,
    String(String),
    List(Vec<String>),
    /// All `placeholder-<key>` attributes, folded together.
    Placeholders(IndexMap<String, String>),
}

/// Attributes of an opening region marker, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSet {
    entries: IndexMap<String, AttributeValue>,
}

impl AttributeSet {
    pub fn new() -> Self {
        AttributeSet::default()
    }

    /// Parse the text following a region name, e.g. `prefix="a,b" alone`.
    ///
    /// Parsing stops at the first position that is not a valid attribute;
    /// whatever was accumulated up to that point is returned.
    pub fn parse(text: &str) -> Self {
        let mut attrs = AttributeSet::new();
        let mut rest = text;

        while let Some(caps) = ATTRIBUTE.captures(rest) {
            let name = &caps[1];
            let raw = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4)).map(|m| m.as_str());

            if MULTI_VALUED.contains(&name) {
                let list = raw
                    .map(|v| v.split(',').map(str::to_string).collect())
                    .unwrap_or_default();
                attrs.insert(name, AttributeValue::List(list));
            } else if let Some(key) = name.strip_prefix(PLACEHOLDER_PREFIX) {
                attrs.insert_placeholder(key, raw.map(decode).unwrap_or_default());
            } else {
                let value = match raw {
                    Some(v) => AttributeValue::String(decode(v)),
                    None => AttributeValue::Flag,
                };
                attrs.insert(name, value);
            }

            rest = &rest[caps[0].len()..];
        }

        attrs
    }

    /// Store `value` under `name`, replacing any earlier value in place.
    pub fn insert(&mut self, name: &str, value: AttributeValue) {
        self.entries.insert(name.to_string(), value);
    }

    fn insert_placeholder(&mut self, key: &str, value: String) {
        let slot = self
            .entries
            .entry("placeholders".to_string())
            .or_insert_with(|| AttributeValue::Placeholders(IndexMap::new()));
        match slot {
            AttributeValue::Placeholders(map) => {
                map.insert(key.to_string(), value);
            }
            // A literal `placeholders=...` attribute came first; the folded map wins.
            other => *other = AttributeValue::Placeholders(IndexMap::from([(key.to_string(), value)])),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// True when `name` is present with a truthy value: a bare flag, a
    /// non-empty string, a list or the placeholder map. `alone=""` is not set.
    pub fn is_set(&self, name: &str) -> bool {
        match self.get(name) {
            Some(AttributeValue::String(s)) => !s.is_empty(),
            Some(_) => true,
            None => false,
        }
    }

    /// True when `name` was given as a bare flag.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some(AttributeValue::Flag))
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(AttributeValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn list(&self, name: &str) -> Option<&[String]> {
        match self.get(name) {
            Some(AttributeValue::List(items)) => Some(items),
            _ => None,
        }
    }

    pub fn placeholders(&self) -> Option<&IndexMap<String, String>> {
        match self.get("placeholders") {
            Some(AttributeValue::Placeholders(map)) => Some(map),
            _ => None,
        }
    }

    pub fn prefix(&self) -> Option<&[String]> {
        self.list("prefix")
    }

    pub fn description(&self) -> Option<&str> {
        self.string("description")
    }

    pub fn scope(&self) -> Option<&str> {
        self.string("scope")
    }

    /// The region is cut out of its parent instead of spliced in.
    pub fn is_alone(&self) -> bool {
        self.is_set("alone")
    }

    pub fn is_skipped(&self) -> bool {
        self.is_set("skip")
    }
}

fn decode(raw: &str) -> String {
    html_escape::decode_html_entities(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_description_and_flag() {
        let attrs = AttributeSet::parse(r#"prefix="a,b" description="hi there" alone"#);
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs.prefix(), Some(&["a".to_string(), "b".to_string()][..]));
        assert_eq!(attrs.description(), Some("hi there"));
        assert!(attrs.is_alone());
    }

    #[test]
    fn placeholders_fold_into_one_map() {
        let attrs = AttributeSet::parse(r#"placeholder-x="1" placeholder-y="2""#);
        assert_eq!(attrs.len(), 1);
        let map = attrs.placeholders().unwrap();
        assert_eq!(map.get("x").map(String::as_str), Some("1"));
        assert_eq!(map.get("y").map(String::as_str), Some("2"));
    }

    #[test]
    fn prefix_without_value_is_empty_list() {
        let attrs = AttributeSet::parse("prefix");
        assert_eq!(attrs.get("prefix"), Some(&AttributeValue::List(Vec::new())));
    }

    #[test]
    fn single_quoted_and_bare_values() {
        let attrs = AttributeSet::parse("scope='vue' description=plain");
        assert_eq!(attrs.scope(), Some("vue"));
        assert_eq!(attrs.description(), Some("plain"));
    }

    #[test]
    fn whitespace_around_equals() {
        let attrs = AttributeSet::parse(r#"  description =  "spaced"  "#);
        assert_eq!(attrs.description(), Some("spaced"));
    }

    #[test]
    fn character_references_are_decoded() {
        let attrs = AttributeSet::parse(r#"description="&lt;div&gt; &amp; &quot;x&quot;""#);
        assert_eq!(attrs.description(), Some(r#"<div> & "x""#));
    }

    #[test]
    fn malformed_text_stops_parsing() {
        let attrs = AttributeSet::parse(r#"alone ="broken skip"#);
        assert!(attrs.is_alone());
        assert!(!attrs.contains("skip"));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn repeated_attribute_overwrites() {
        let attrs = AttributeSet::parse(r#"scope="a" scope="b""#);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.scope(), Some("b"));
    }

    #[test]
    fn valued_flags_follow_truthiness() {
        assert!(AttributeSet::parse(r#"alone="true""#).is_alone());
        assert!(AttributeSet::parse("skip=1").is_skipped());
        assert!(!AttributeSet::parse(r#"alone="""#).is_alone());
        assert!(!AttributeSet::parse("skip=''").is_skipped());
        assert!(!AttributeSet::parse("scope=vue").is_alone());
    }

    #[test]
    fn placeholder_order_is_kept() {
        let attrs = AttributeSet::parse(r#"placeholder-z="1" placeholder-a="2""#);
        let keys: Vec<&str> = attrs.placeholders().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn empty_input() {
        assert!(AttributeSet::parse("").is_empty());
        assert!(AttributeSet::parse("   ").is_empty());
    }
}
