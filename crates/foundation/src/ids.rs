use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Country identifier as carried by boundary datasets.
///
/// Datasets disagree on whether ids are numbers (`356`) or strings (`"356"`,
/// `"036"`). The text is kept exactly as given, for display and for requests.
/// Equality, ordering and hashing use the number when the text is all digits,
/// so `"036"` and `36` name the same country.
#[derive(Clone, Debug)]
pub struct CountryId {
    text: String,
    number: Option<u32>,
}

#[derive(PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Key<'a> {
    Numeric(u32),
    Code(&'a str),
}

impl CountryId {
    pub fn numeric(n: u32) -> Self {
        Self {
            text: n.to_string(),
            number: Some(n),
        }
    }

    pub fn code(s: impl Into<String>) -> Self {
        let text = s.into();
        let number = if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            text.parse().ok()
        } else {
            None
        };
        Self { text, number }
    }

    /// The id as the dataset spelled it.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_number(&self) -> Option<u32> {
        self.number
    }

    fn key(&self) -> Key<'_> {
        match self.number {
            Some(n) => Key::Numeric(n),
            None => Key::Code(&self.text),
        }
    }
}

impl PartialEq for CountryId {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for CountryId {}

impl Hash for CountryId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for CountryId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CountryId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for CountryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyCountryId;

impl fmt::Display for EmptyCountryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("country id is empty")
    }
}

impl std::error::Error for EmptyCountryId {}

impl FromStr for CountryId {
    type Err = EmptyCountryId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmptyCountryId);
        }
        Ok(CountryId::code(s))
    }
}

impl From<u32> for CountryId {
    fn from(n: u32) -> Self {
        CountryId::numeric(n)
    }
}
