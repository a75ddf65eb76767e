use serde::{Deserialize, Serialize};

/// A stored snippet. Never modified after it is written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Paste {
    #[serde(default, alias = "Content")]
    pub content: String,
    #[serde(default, alias = "Note")]
    pub note: String,
}

/// On-disk form of a paste, keyed `Content`/`Note`.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoredPaste<'a> {
    pub content: &'a str,
    pub note: &'a str,
}

impl<'a> From<&'a Paste> for StoredPaste<'a> {
    fn from(paste: &'a Paste) -> Self {
        StoredPaste {
            content: &paste.content,
            note: &paste.note,
        }
    }
}
