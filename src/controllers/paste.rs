use tracing::info;

use crate::keys::{generate_key, sanitize_key, KEY_LENGTH};
use crate::models::Paste;
use crate::storage::FileStorage;

/// Store a new paste under a freshly generated key and return the key.
///
/// Keys are not checked against existing pastes, so a collision silently
/// replaces the older paste.
pub async fn create(storage: &FileStorage, paste: &Paste) -> crate::ApiResult<String> {
    let key = generate_key(KEY_LENGTH);

    info!(
        "new paste: key='{key}', content_size={content}, note_size={note}",
        content = paste.content.len(),
        note = paste.note.len()
    );

    storage.put_paste(&key, paste).await?;
    Ok(key)
}

/// Look up a paste by a client-supplied key.
pub async fn fetch(storage: &FileStorage, raw_key: &str) -> crate::ApiResult<Paste> {
    let key = sanitize_key(raw_key);
    storage.get_paste(&key).await
}
