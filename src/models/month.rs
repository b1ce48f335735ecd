use anyhow::{bail, Context, Result};
use std::str::FromStr;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MIN_YEAR: i32 = 0;
const MAX_YEAR: i32 = 9999;

/// A calendar month, rendered and parsed as `YYYY-MM`.
/// Years `0000` to `9999`; stepping past either end stays put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            bail!("Month out of range: {month}");
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            bail!("Year out of range: {year}");
        }
        Ok(Self { year, month })
    }

    pub fn next(self) -> Self {
        if self.month == 12 && self.year == MAX_YEAR {
            self
        } else if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 && self.year == MIN_YEAR {
            self
        } else if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// e.g. `April 2025`
    pub fn display_name(&self) -> String {
        format!("{} {}", MONTH_NAMES[(self.month - 1) as usize], self.year)
    }

    /// The `YYYY-MM` prefix used by the month filter query.
    pub fn prefix(&self) -> String {
        self.to_string()
    }
}

impl FromStr for Month {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (y, m) = s
            .split_once('-')
            .with_context(|| format!("Expected YYYY-MM, got '{s}'"))?;
        if y.len() != 4 || m.len() != 2 || !y.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            bail!("Expected YYYY-MM, got '{s}'");
        }
        let year: i32 = y.parse()?;
        let month: u32 = m.parse()?;
        Self::new(year, month)
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// The month shown when a session starts.
pub const DEFAULT_MONTH: Month = Month {
    year: 2025,
    month: 4,
};
