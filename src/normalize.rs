//! Request normalization
//!
//! Pure helpers that turn loosely formatted caller input (phone numbers,
//! file extensions) into what the WhatsApp transport expects.

use std::fmt;

/// Server part of a personal WhatsApp JID.
const RECIPIENT_SUFFIX: &str = "@s.whatsapp.net";

/// A normalized recipient address (`<digits>@s.whatsapp.net`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient(String);

impl Recipient {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive a recipient address from a raw phone number.
///
/// Everything that is not an ASCII digit or `+` is stripped. A leading `+`
/// is tolerated but never preserved: the wire format is the bare digits
/// followed by the server suffix, so `+1 555-0100` and `1 (555) 0100`
/// normalize identically. Inputs without a single digit yield `None`.
pub fn normalize_recipient(raw: &str) -> Option<Recipient> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let digits: String = cleaned.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }

    Some(Recipient(format!("{digits}{RECIPIENT_SUFFIX}")))
}

/// MIME type for a file extension, with or without the leading dot.
///
/// Case-insensitive, total: unknown extensions map to the generic binary
/// type. No content sniffing.
pub fn mime_from_extension(ext: &str) -> &'static str {
    match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "pdf" => "application/pdf",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/m4a",
        _ => "application/octet-stream",
    }
}
