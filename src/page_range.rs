use std::fmt;
use thiserror::Error;

/// Why a page specification was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Empty,
    EmptyToken,
    NonNumeric,
    NotPositive,
    TooLarge,
    OutOfRange { page: u32, page_count: u32 },
    Reversed { start: u32, end: u32 },
    ZeroChunkSize,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Empty => write!(f, "no pages specified"),
            Reason::EmptyToken => write!(f, "empty token"),
            Reason::NonNumeric => write!(f, "not a page number"),
            Reason::NotPositive => write!(f, "page numbers start at 1"),
            Reason::TooLarge => write!(f, "page number is too large"),
            Reason::OutOfRange { page, page_count } => {
                write!(f, "page {} is out of range (1-{})", page, page_count)
            }
            Reason::Reversed { start, end } => {
                write!(f, "range start {} is after range end {}", start, end)
            }
            Reason::ZeroChunkSize => write!(f, "chunk size must be at least 1"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid page range {token:?}: {reason}")]
pub struct InvalidRangeSpec {
    pub token: String,
    pub reason: Reason,
}

impl InvalidRangeSpec {
    fn new(token: &str, reason: Reason) -> Self {
        InvalidRangeSpec {
            token: token.to_string(),
            reason,
        }
    }
}

/// One comma-separated unit of a page specification, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageToken {
    Single(u32),
    Range { start: u32, end: u32 },
}

impl PageToken {
    /// Parse a single token like "5" or "1-5". The token is trimmed first.
    pub fn parse(s: &str) -> Result<Self, InvalidRangeSpec> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InvalidRangeSpec::new(s, Reason::EmptyToken));
        }

        match s.find('-') {
            // "-5" is a negative number, not a range
            Some(0) => Err(InvalidRangeSpec::new(s, Reason::NotPositive)),
            Some(dash_pos) => {
                let start_str = &s[..dash_pos];
                let end_str = &s[dash_pos + 1..];
                if end_str.contains('-') {
                    return Err(InvalidRangeSpec::new(s, Reason::NonNumeric));
                }

                let start = parse_page_number(s, start_str)?;
                let end = parse_page_number(s, end_str)?;
                if start > end {
                    return Err(InvalidRangeSpec::new(s, Reason::Reversed { start, end }));
                }
                Ok(PageToken::Range { start, end })
            }
            None => parse_page_number(s, s).map(PageToken::Single),
        }
    }

    /// Largest 1-based page number this token refers to.
    pub fn last_page(&self) -> u32 {
        match *self {
            PageToken::Single(n) => n,
            PageToken::Range { end, .. } => end,
        }
    }

    /// Check the token against the document size.
    pub fn validate(&self, page_count: u32) -> Result<(), InvalidRangeSpec> {
        let last = self.last_page();
        if last > page_count {
            return Err(InvalidRangeSpec::new(
                &self.to_string(),
                Reason::OutOfRange {
                    page: last,
                    page_count,
                },
            ));
        }
        Ok(())
    }

    /// Zero-based indices covered by this token, in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = usize> {
        let (start, end) = match *self {
            PageToken::Single(n) => (n, n),
            PageToken::Range { start, end } => (start, end),
        };
        (start..=end).map(|page| (page - 1) as usize)
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageToken::Single(n) => write!(f, "{}", n),
            PageToken::Range { start, end } => write!(f, "{}-{}", start, end),
        }
    }
}

fn parse_page_number(token: &str, s: &str) -> Result<u32, InvalidRangeSpec> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidRangeSpec::new(token, Reason::NonNumeric));
    }

    // all digits, so the only way to fail is overflow
    let n = s
        .parse::<u32>()
        .map_err(|_| InvalidRangeSpec::new(token, Reason::TooLarge))?;

    if n == 0 {
        return Err(InvalidRangeSpec::new(token, Reason::NotPositive));
    }
    Ok(n)
}

/// Ordered zero-based page indices, as requested by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection(Vec<usize>);

impl PageSelection {
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse a comma-separated list of page tokens like "1,3,5-7"
pub fn parse_page_tokens(s: &str) -> Result<Vec<PageToken>, InvalidRangeSpec> {
    if s.trim().is_empty() {
        return Err(InvalidRangeSpec::new(s, Reason::Empty));
    }
    s.split(',').map(PageToken::parse).collect()
}

/// Expand a page specification into zero-based page indices.
///
/// Tokens are expanded in the order given and duplicates are kept, so
/// `"1,1,2"` selects the first page twice. Every returned index is
/// `< page_count`.
pub fn parse(spec: &str, page_count: u32) -> Result<PageSelection, InvalidRangeSpec> {
    let tokens = parse_page_tokens(spec)?;
    let mut indices = Vec::new();
    for token in tokens {
        token.validate(page_count)?;
        indices.extend(token.indices());
    }
    Ok(PageSelection(indices))
}

/// Build the specification for fixed-size chunks: "1-N,N+1-2N,...".
///
/// The last window is clamped to `page_count`.
pub fn chunk_spec(chunk_size: u32, page_count: u32) -> Result<String, InvalidRangeSpec> {
    if chunk_size == 0 {
        return Err(InvalidRangeSpec::new("0", Reason::ZeroChunkSize));
    }

    let mut tokens = Vec::new();
    let mut start = 1u32;
    while start <= page_count {
        let end = start.saturating_add(chunk_size - 1).min(page_count);
        tokens.push(PageToken::Range { start, end }.to_string());
        start = match end.checked_add(1) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(tokens.join(","))
}

/// One selection per chunk window, each fed through [`parse`].
pub fn chunk_windows(
    chunk_size: u32,
    page_count: u32,
) -> Result<Vec<PageSelection>, InvalidRangeSpec> {
    let spec = chunk_spec(chunk_size, page_count)?;
    // rejects the empty spec of a zero-page document
    parse_page_tokens(&spec)?;
    spec.split(',').map(|window| parse(window, page_count)).collect()
}
