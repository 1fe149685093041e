use crate::error::AppError;
use std::fmt;
use std::str::FromStr;

/// Cell range used when only a tab is known.
pub const DEFAULT_CELLS: &str = "A:Z";

/// A range in A1 notation, optionally qualified by a tab name: `Tab!A:Z`, `'Q1 Sales'!B2:F`
/// or just `A:Z`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpec {
    tab: Option<String>,
    cells: String,
}

impl RangeSpec {
    pub fn with_tab(tab: impl Into<String>, cells: impl Into<String>) -> Self {
        Self {
            tab: Some(tab.into()),
            cells: cells.into(),
        }
    }

    pub fn tab(&self) -> Option<&str> {
        self.tab.as_deref()
    }

    pub fn cells(&self) -> &str {
        &self.cells
    }

    /// The first row of this range, e.g. `Tab!B2:F` -> `Tab!B2:F2`.
    ///
    /// Returns `None` when the cell expression is not a column-bounded A1 range.
    pub fn header_row(&self) -> Option<RangeSpec> {
        let (start, end) = self.cells.split_once(':')?;
        let (start_col, start_row) = split_a1(start)?;
        let (end_col, _) = split_a1(end)?;
        let row = start_row.unwrap_or(1);

        Some(RangeSpec {
            tab: self.tab.clone(),
            cells: format!("{start_col}{row}:{end_col}{row}"),
        })
    }
}

/// Split an A1 reference into its column letters and optional row number.
fn split_a1(reference: &str) -> Option<(&str, Option<u32>)> {
    let reference = reference.trim();
    let digits_at = reference
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(reference.len());
    let (col, row) = reference.split_at(digits_at);

    if col.is_empty() || !col.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let row = match row {
        "" => None,
        digits => Some(digits.parse::<u32>().ok().filter(|r| *r > 0)?),
    };

    Some((col, row))
}

/// Quote a tab title for use in a range when it is not a plain identifier.
pub fn quote_tab(title: &str) -> String {
    let plain = !title.is_empty() && title.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    match plain {
        true => title.to_string(),
        false => format!("'{}'", title.replace('\'', "''")),
    }
}

impl FromStr for RangeSpec {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AppError::Validation("range must not be empty".to_string()));
        }

        let (tab, cells) = match s.strip_prefix('\'') {
            Some(quoted) => {
                let (tab, rest) = parse_quoted_tab(quoted)
                    .ok_or_else(|| AppError::Validation(format!("unterminated tab name in range '{}'", s)))?;
                let cells = rest.strip_prefix('!').ok_or_else(|| {
                    AppError::Validation(format!("expected '!' after tab name in range '{}'", s))
                })?;
                (Some(tab), cells)
            }
            None => match s.split_once('!') {
                Some((tab, cells)) => (Some(tab.to_string()), cells),
                None => (None, s),
            },
        };

        if tab.as_deref() == Some("") {
            return Err(AppError::Validation(format!("empty tab name in range '{}'", s)));
        }
        if cells.is_empty() {
            return Err(AppError::Validation(format!("missing cells in range '{}'", s)));
        }

        Ok(RangeSpec {
            tab,
            cells: cells.to_string(),
        })
    }
}

/// Read a tab name after its opening quote, returning it unescaped with the remaining input.
fn parse_quoted_tab(input: &str) -> Option<(String, &str)> {
    let mut tab = String::new();
    let mut chars = input.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if c != '\'' {
            tab.push(c);
            continue;
        }
        match chars.peek() {
            Some((_, '\'')) => {
                tab.push('\'');
                chars.next();
            }
            _ => return Some((tab, &input[idx + 1..])),
        }
    }
    None
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tab {
            Some(tab) => write!(f, "{}!{}", quote_tab(tab), self.cells),
            None => write!(f, "{}", self.cells),
        }
    }
}
