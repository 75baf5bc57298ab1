use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

const SUFFIX_LEN: usize = 9;

static ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("ID_REGEX is a valid regex pattern")
});

/// Millisecond timestamp followed by a short random suffix.
///
/// Not guaranteed unique; the unique index on `id` surfaces collisions as
/// `AlreadyExists`.
pub fn generate_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}", Utc::now().timestamp_millis(), &suffix[..SUFFIX_LEN])
}

pub fn is_valid_id(id: &str) -> bool {
    ID_REGEX.is_match(id)
}
