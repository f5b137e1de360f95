use libris_db::{Document, DocumentId};
use serde::{Deserialize, Serialize};
use time::Date;

/// A catalogued book. `id` is absent only on a draft the store has not
/// persisted yet; every stored book carries one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Store-assigned identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Genre of the book
    pub genre: String,
    /// Calendar date of first publication
    pub publication_date: Date,
    /// Language the book was originally written in
    pub original_language: String,
}

impl Document for Book {
    fn id(&self) -> Option<&DocumentId> {
        self.id.as_ref()
    }

    fn assign_id(&mut self, id: DocumentId) {
        self.id = Some(id);
    }
}

/// Store-side constraint: a persisted book has every text field populated.
pub fn validate_book(book: &Book) -> Result<(), String> {
    let fields = [
        ("title", &book.title),
        ("author", &book.author),
        ("genre", &book.genre),
        ("original_language", &book.original_language),
    ];

    for (name, value) in fields {
        if value.is_empty() {
            return Err(format!("{name} must not be empty"));
        }
    }

    Ok(())
}

/// Partial book payload shared by create, replace, and patch.
///
/// A text field counts as provided only when present and non-empty; an empty
/// string is treated as absent, never as a value. The date counts as provided
/// whenever present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub publication_date: Option<Date>,
    pub original_language: Option<String>,
}

impl BookInput {
    /// Whether the payload provides no usable field at all.
    pub fn is_empty(&self) -> bool {
        provided(&self.title).is_none()
            && provided(&self.author).is_none()
            && provided(&self.genre).is_none()
            && self.publication_date.is_none()
            && provided(&self.original_language).is_none()
    }

    /// Build a complete book for creation. Fails with the names of the
    /// required fields this payload does not provide.
    pub fn try_into_book(self) -> Result<Book, Vec<&'static str>> {
        let BookInput {
            title,
            author,
            genre,
            publication_date,
            original_language,
        } = self;

        let mut missing = Vec::new();
        let title = require(title, "title", &mut missing);
        let author = require(author, "author", &mut missing);
        let genre = require(genre, "genre", &mut missing);
        if publication_date.is_none() {
            missing.push("publication_date");
        }
        let original_language = require(original_language, "original_language", &mut missing);

        match (title, author, genre, publication_date, original_language) {
            (Some(title), Some(author), Some(genre), Some(publication_date), Some(original_language)) => {
                Ok(Book {
                    id: None,
                    title,
                    author,
                    genre,
                    publication_date,
                    original_language,
                })
            }
            _ => Err(missing),
        }
    }

    /// Pure merge applied identically by replace and patch: fields provided
    /// here override `existing`; everything else keeps its stored value.
    pub fn merge_into(&self, existing: Book) -> Book {
        Book {
            id: existing.id,
            title: keep(&self.title, existing.title),
            author: keep(&self.author, existing.author),
            genre: keep(&self.genre, existing.genre),
            publication_date: self.publication_date.unwrap_or(existing.publication_date),
            original_language: keep(&self.original_language, existing.original_language),
        }
    }
}

fn provided(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn require(
    value: Option<String>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    let value = value.filter(|v| !v.is_empty());
    if value.is_none() {
        missing.push(name);
    }
    value
}

fn keep(new: &Option<String>, existing: String) -> String {
    match new.as_deref().filter(|v| !v.is_empty()) {
        Some(value) => value.to_string(),
        None => existing,
    }
}
