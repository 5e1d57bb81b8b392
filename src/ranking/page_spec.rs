//! Page bounds for collecting a ranking
//!
//! A spec names the first page and either an explicit last page or
//! "scan for it". The resolved bounds of a finished collection are a
//! `PageRange`.

use crate::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// The upper bound of a page spec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "LastPageValue")]
pub enum LastPage {
    /// Collect up to and including this page
    Bounded(u32),

    /// Discover the last non-empty page before collecting
    Unbounded,
}

/// Raw TOML shape of `max-pages`: a positive integer or the word "all"
#[derive(Deserialize)]
#[serde(untagged)]
enum LastPageValue {
    Count(i64),
    Word(String),
}

impl TryFrom<LastPageValue> for LastPage {
    type Error = String;

    fn try_from(value: LastPageValue) -> Result<Self, Self::Error> {
        match value {
            LastPageValue::Count(n) if n >= 1 && n <= i64::from(u32::MAX) => {
                Ok(Self::Bounded(n as u32))
            }
            LastPageValue::Count(n) => Err(format!(
                "max-pages must be a positive integer or \"all\", got {}",
                n
            )),
            LastPageValue::Word(word) => word.parse(),
        }
    }
}

impl FromStr for LastPage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::Unbounded);
        }

        match s.parse::<u32>() {
            Ok(n) if n >= 1 => Ok(Self::Bounded(n)),
            _ => Err(format!(
                "max-pages must be a positive integer or \"all\", got '{}'",
                s
            )),
        }
    }
}

impl fmt::Display for LastPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(n) => write!(f, "{}", n),
            Self::Unbounded => write!(f, "all"),
        }
    }
}

/// Which pages to collect for every term of a pull
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    pub first: u32,
    pub last: LastPage,
}

impl PageSpec {
    /// Builds a page spec, rejecting page 0 and inverted bounded ranges
    pub fn new(first: u32, last: LastPage) -> Result<Self, ConfigError> {
        if first < 1 {
            return Err(ConfigError::InvalidPageSpec(
                "first page must be >= 1".to_string(),
            ));
        }

        if let LastPage::Bounded(last) = last {
            if last < first {
                return Err(ConfigError::InvalidPageSpec(format!(
                    "last page {} is before first page {}",
                    last, first
                )));
            }
        }

        Ok(Self { first, last })
    }

    /// Every page from 1 up to the discovered last page
    pub fn all() -> Self {
        Self {
            first: 1,
            last: LastPage::Unbounded,
        }
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        Self::all()
    }
}

/// Inclusive, resolved page bounds; `last < first` means no page had results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub first: u32,
    pub last: u32,
}

impl PageRange {
    pub fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    pub fn is_empty(&self) -> bool {
        self.last < self.first
    }

    /// Number of pages covered by the range
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.last - self.first) as usize + 1
        }
    }

    pub fn pages(&self) -> std::ops::RangeInclusive<u32> {
        self.first..=self.last
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "Pages: none")
        } else {
            write!(f, "Pages {}-{}", self.first, self.last)
        }
    }
}
