//! Reply normalization and the double-text split.

/// A trailing part with at most this many words can go out as its own message.
pub const MAX_TRAILING_TOKENS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Single(String),
    /// Sent as two messages with a pause in between.
    Double(String, String),
}

impl Outgoing {
    pub fn into_parts(self) -> Vec<String> {
        match self {
            Outgoing::Single(text) => vec![text],
            Outgoing::Double(first, second) => vec![first, second],
        }
    }

    pub fn is_double(&self) -> bool {
        matches!(self, Outgoing::Double(..))
    }
}

pub fn strip_apostrophes(text: &str) -> String {
    text.replace('\'', "")
}

/// Strip apostrophes, then split on the comma only when there is exactly one
/// and the part after it is short. Either side may come out empty (`"hey,"`
/// splits into `"hey"` and `""`).
pub fn finalize(raw_reply: &str) -> Outgoing {
    let cleaned = strip_apostrophes(raw_reply);
    let parts: Vec<&str> = cleaned.split(',').collect();
    if let [first, second] = parts.as_slice() {
        let (first, second) = (first.trim(), second.trim());
        if second.split_whitespace().count() <= MAX_TRAILING_TOKENS {
            return Outgoing::Double(first.to_string(), second.to_string());
        }
    }
    Outgoing::Single(cleaned.trim().to_string())
}
