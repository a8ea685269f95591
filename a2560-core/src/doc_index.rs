//! Reader for the generated navigation tables that index the library's symbols,
//! `var <ident> = [ [ "name", "anchor", null ], ... ];`

use std::collections::HashMap;

use anyhow::{Context, Result};
use thiserror::Error;

/// One row of the table: a symbol name, the page anchor it links to, and an
/// optional extra value (used for struct pages).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexEntry {
    pub name: String,
    pub anchor: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexViolation {
    #[error("entry {index} has an empty name")]
    EmptyName { index: usize },
    #[error("entry {index} ({name}) has an empty anchor")]
    EmptyAnchor { index: usize, name: String },
    #[error("{first} and {second} share the anchor {anchor}")]
    SharedAnchor { anchor: String, first: String, second: String },
    #[error("{name} -> {anchor:?} is listed more than once")]
    DuplicatePair { name: String, anchor: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocIndex {
    ident: String,
    entries: Vec<IndexEntry>,
}

type RawEntry = (String, Option<String>, Option<String>);

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {},
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn quote(s: &Option<String>) -> Result<String> {
    match s {
        Some(s) => Ok(serde_json::to_string(s)?),
        None => Ok("null".to_owned()),
    }
}

impl DocIndex {
    pub fn new(ident: &str, entries: Vec<IndexEntry>) -> Result<Self> {
        if !is_ident(ident) {
            return Err(anyhow!("{:?} is not a valid table name", ident));
        }

        Ok(Self { ident: ident.to_owned(), entries })
    }

    pub fn parse(text: &str) -> Result<Self> {
        let body = text
            .trim_start()
            .strip_prefix("var")
            .filter(|rest| rest.starts_with(char::is_whitespace))
            .ok_or_else(|| anyhow!("index table must start with `var`"))?;

        let (ident, table) = body
            .split_once('=')
            .ok_or_else(|| anyhow!("index table has no `=`"))?;

        let ident = ident.trim();
        let table = table.trim_end();
        let table = table.strip_suffix(';').unwrap_or(table);

        let raw: Vec<RawEntry> = serde_json::from_str(table)
            .with_context(|| format!("Failed to parse index table {}", ident))?;

        trace!("index {} has {} entries", ident, raw.len());

        let entries = raw
            .into_iter()
            .map(|(name, anchor, value)| IndexEntry { name, anchor, value })
            .collect();

        DocIndex::new(ident, entries)
    }

    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn find(&self, name: &str) -> Option<&IndexEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn violations(&self) -> Vec<IndexViolation> {
        let mut violations = Vec::new();
        let mut anchors: HashMap<&str, &str> = HashMap::new();
        let mut pairs: HashMap<(&str, Option<&str>), usize> = HashMap::new();

        for (index, entry) in self.entries.iter().enumerate() {
            if entry.name.is_empty() {
                violations.push(IndexViolation::EmptyName { index });
            }

            let seen = pairs.entry((entry.name.as_str(), entry.anchor.as_deref())).or_insert(0);
            *seen += 1;

            if *seen == 2 {
                violations.push(IndexViolation::DuplicatePair {
                    name: entry.name.clone(),
                    anchor: entry.anchor.clone(),
                });
            }

            let anchor = match entry.anchor.as_deref() {
                Some(a) => a,
                None => continue,
            };

            if anchor.is_empty() {
                violations.push(IndexViolation::EmptyAnchor { index, name: entry.name.clone() });
                continue;
            }

            match anchors.get(anchor) {
                Some(&first) if first != entry.name => {
                    violations.push(IndexViolation::SharedAnchor {
                        anchor: anchor.to_owned(),
                        first: first.to_owned(),
                        second: entry.name.clone(),
                    });
                },
                Some(_) => {},
                None => {
                    anchors.insert(anchor, entry.name.as_str());
                },
            }
        }

        violations
    }

    pub fn validate(&self) -> Result<()> {
        let violations = self.violations();

        for v in &violations {
            warn!("{}: {}", self.ident, v);
        }

        match violations.first() {
            None => Ok(()),
            Some(v) => Err(anyhow!("index {} has {} problem(s), first: {}", self.ident, violations.len(), v)),
        }
    }

    /// Serialize in the generator's layout, entries in their original order
    pub fn to_js(&self) -> Result<String> {
        let mut rows = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            rows.push(format!(
                "    [ {}, {}, {} ]",
                serde_json::to_string(&entry.name)?,
                quote(&entry.anchor)?,
                quote(&entry.value)?
            ));
        }

        if rows.is_empty() {
            return Ok(format!("var {} =\n[\n];", self.ident));
        }

        Ok(format!("var {} =\n[\n{}\n];", self.ident, rows.join(",\n")))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    const BITMAP_INDEX: &str = include_str!("testdata/bitmap_8h.js");

    #[test]
    fn parse_bitmap_index() {
        crate::test_common::setup();

        let index = DocIndex::parse(BITMAP_INDEX).unwrap();
        assert_eq!(index.ident(), "bitmap_8h");
        assert_eq!(index.len(), 41);

        let first = &index.entries()[0];
        assert_eq!(first.name, "Bitmap");
        assert_eq!(first.anchor.as_deref(), Some("struct_bitmap.html"));
        assert_eq!(first.value.as_deref(), Some("struct_bitmap"));

        let blit = index.find("Bitmap_Blit").unwrap();
        assert_eq!(blit.anchor.as_deref(), Some("bitmap_8h.html#a5033e773db5a1fb8000e7b3113737e37"));
        assert_eq!(blit.value, None);

        assert_eq!(index.names().last(), Some("Bitmap_TileV2"));
        assert!(index.find("Bitmap_Nope").is_none());
    }

    #[test]
    fn bitmap_index_is_valid() {
        crate::test_common::setup();

        let index = DocIndex::parse(BITMAP_INDEX).unwrap();
        assert!(index.violations().is_empty());
        index.validate().unwrap();
    }

    #[test]
    fn round_trip_is_exact() {
        crate::test_common::setup();

        let index = DocIndex::parse(BITMAP_INDEX).unwrap();
        let js = index.to_js().unwrap();

        assert_eq!(js, BITMAP_INDEX);
        assert_eq!(DocIndex::parse(&js).unwrap(), index);
    }

    #[test]
    fn escapes_survive_round_trip() {
        crate::test_common::setup();

        let text = r#"var odd = [ [ "say \"hi\"", null, "a\\b" ] ];"#;
        let index = DocIndex::parse(text).unwrap();

        assert_eq!(index.entries()[0].name, "say \"hi\"");
        assert_eq!(index.entries()[0].value.as_deref(), Some("a\\b"));

        let again = DocIndex::parse(&index.to_js().unwrap()).unwrap();
        assert_eq!(again, index);
    }

    #[test]
    fn violations_found() {
        crate::test_common::setup();

        let entry = |name: &str, anchor: Option<&str>| IndexEntry {
            name: name.to_owned(),
            anchor: anchor.map(str::to_owned),
            value: None,
        };

        let index = DocIndex::new("bad", vec![
            entry("", Some("a.html")),
            entry("One", Some("")),
            entry("Two", Some("b.html")),
            entry("Three", Some("b.html")),
            entry("Two", Some("b.html")),
            entry("Four", None),
        ]).unwrap();

        let violations = index.violations();
        assert_eq!(violations, vec![
            IndexViolation::EmptyName { index: 0 },
            IndexViolation::EmptyAnchor { index: 1, name: "One".to_owned() },
            IndexViolation::SharedAnchor {
                anchor: "b.html".to_owned(),
                first: "Two".to_owned(),
                second: "Three".to_owned(),
            },
            IndexViolation::DuplicatePair { name: "Two".to_owned(), anchor: Some("b.html".to_owned()) },
        ]);
        assert!(index.validate().is_err());
    }

    #[test]
    fn malformed_tables() {
        crate::test_common::setup();

        assert!(DocIndex::parse("x = [];").is_err());
        assert!(DocIndex::parse("var x [];").is_err());
        assert!(DocIndex::parse("var x = [ [ \"a\" ] ];").is_err());
        assert!(DocIndex::parse("var 9x = [];").is_err());
        assert!(DocIndex::parse("varx = [];").is_err());

        let empty = DocIndex::parse("var empty = [];").unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.to_js().unwrap(), "var empty =\n[\n];");
    }
}
