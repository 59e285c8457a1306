use serde::{Deserialize, Serialize};

/// A single scripture reference attached to a catalog item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptureRef {
    /// Book name, e.g. "John"
    pub book: String,
    pub chapter: i32,
    pub verse: i32,
}

impl ScriptureRef {
    pub fn new(book: impl Into<String>, chapter: i32, verse: i32) -> Self {
        Self {
            book: book.into(),
            chapter,
            verse,
        }
    }

    /// Hierarchical match score against another reference
    ///
    /// 1.0 for an exact verse match, 0.5 when only the verse differs,
    /// 0.2 when only the book matches, 0.0 otherwise. Book comparison
    /// ignores ASCII case.
    pub fn match_score(&self, other: &ScriptureRef) -> f64 {
        if !self.book.eq_ignore_ascii_case(&other.book) {
            return 0.0;
        }
        if self.chapter != other.chapter {
            return 0.2;
        }
        if self.verse != other.verse {
            return 0.5;
        }
        1.0
    }
}

/// A catalog entry as read from the catalog store
///
/// Read-only to this service: the batch pipeline copies these into an
/// immutable snapshot at the start of a run and never writes them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Catalog-assigned identifier
    pub id: i64,
    pub name: String,
    pub description: String,
    pub tags: Vec<i64>,
    pub speakers: Vec<i64>,
    pub characters: Vec<i64>,
    pub scriptures: Vec<ScriptureRef>,
}

impl CatalogItem {
    pub fn new(id: i64, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            tags: Vec::new(),
            speakers: Vec::new(),
            characters: Vec::new(),
            scriptures: Vec::new(),
        }
    }

    /// The text blob used by the text-overlap metric
    pub fn text(&self) -> String {
        format!("{} {}", self.name, self.description)
    }
}
