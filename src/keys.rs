use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

/// Length of the keys handed out for new pastes.
pub const KEY_LENGTH: usize = 5;

/// Generate a random key of `length` characters from `[A-Za-z0-9]`.
///
/// No check is made against existing pastes.
pub fn generate_key(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Drop everything but ASCII letters and digits from a client-supplied key.
///
/// The result is safe to use as a file name stem and may be empty.
pub fn sanitize_key(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_alphanumeric).collect()
}
