//! Encoding detection from leading bytes

use super::binary::MAGIC;

/// On-disk scene encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Binary,
    Json,
}

impl Encoding {
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Binary => "binary",
            Encoding::Json => "json",
        }
    }
}

/// Classify a buffer by its first bytes.
///
/// Binary scenes start with the `COWS` magic. JSON scenes start with `{`
/// after an optional UTF-8 byte-order mark and ASCII whitespace. Anything
/// else, including empty input, is `None`.
pub fn detect(data: &[u8]) -> Option<Encoding> {
    if data.starts_with(MAGIC) {
        return Some(Encoding::Binary);
    }

    let text = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    match text.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => Some(Encoding::Json),
        _ => None,
    }
}
