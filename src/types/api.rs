use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PasteLink {
    pub name: String,
    pub link: String,
}
