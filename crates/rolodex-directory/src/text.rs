//! Lenient decoding for text fields that clients sometimes send as numbers.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
}

/// Decodes an optional field that may arrive as a JSON string or number.
///
/// Numbers are stored in their decimal text form, so `9876543210` and
/// `"9876543210"` name the same phone number.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<TextOrNumber>::deserialize(deserializer)?.map(|value| match value {
            TextOrNumber::Text(text) => text,
            TextOrNumber::Integer(n) => n.to_string(),
            TextOrNumber::Unsigned(n) => n.to_string(),
            TextOrNumber::Float(n) => n.to_string(),
        }),
    )
}
