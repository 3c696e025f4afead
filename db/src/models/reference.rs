use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::{Match, Regex};
use serde::{Deserialize, Serialize};

use crate::DbError;

/// A chapter reference, optionally narrowed to a verse range, written
/// with a canonical book id or a dataset abbreviation (e.g. `jo 3:16`,
/// `1co 13`, `sl 23:1-4`).
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Reference {
    pub book: String,
    pub chapter: i32,
    pub verses: Option<RangeInclusive<i32>>,
}

impl Reference {
    /// Whether the given verse number falls within the reference.
    pub fn includes(&self, verse: i32) -> bool {
        self.verses.as_ref().map_or(true, |vs| vs.contains(&verse))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.verses {
            None => write!(f, "{} {}", self.book, self.chapter),
            Some(verses) if verses.start() == verses.end() => {
                write!(f, "{} {}:{}", self.book, self.chapter, verses.start())
            }
            Some(verses) => write!(
                f,
                "{} {}:{}-{}",
                self.book,
                self.chapter,
                verses.start(),
                verses.end()
            ),
        }
    }
}

impl FromStr for Reference {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Reference, Self::Err> {
        lazy_static! {
            static ref REF_RE: Regex =
                Regex::new(r"^(\d?\s?\p{L}+)(?:\.|\s)+([0-9\-:\.]+)$").unwrap();
            static ref CV_RE: Regex =
                Regex::new(r"^(\d{1,3})(?:[:\.](\d{1,3})(?:-(\d{1,3}))?)?$").unwrap();
        }

        let s = s.trim();
        let ref_caps = REF_RE.captures(s).ok_or_else(|| invalid_reference(s))?;
        let (book, cv) = match (ref_caps.get(1), ref_caps.get(2)) {
            (Some(book), Some(cv)) => (book, cv),
            _ => return Err(invalid_reference(s)),
        };
        let cv_caps = CV_RE
            .captures(cv.as_str())
            .ok_or_else(|| invalid_reference(s))?;
        let book = book.as_str().replace(' ', "").to_lowercase();
        let chapter = cv_caps
            .get(1)
            .ok_or_else(|| invalid_reference(s))
            .and_then(|m| parse_num_match(m, s))?;

        let verses = match (cv_caps.get(2), cv_caps.get(3)) {
            (None, _) => None,
            (Some(verse), None) => {
                let verse = parse_num_match(verse, s)?;
                Some(verse..=verse)
            }
            (Some(start), Some(end)) => {
                let (start, end) = (parse_num_match(start, s)?, parse_num_match(end, s)?);
                if end < start {
                    return Err(invalid_reference(s));
                }
                Some(start..=end)
            }
        };

        Ok(Reference {
            book,
            chapter,
            verses,
        })
    }
}

/// Parse a [Match](regex::Match) into an i32.
fn parse_num_match(m: Match, s: &str) -> Result<i32, DbError> {
    m.as_str().parse().map_err(|_| invalid_reference(s))
}

fn invalid_reference(s: &str) -> DbError {
    DbError::InvalidReference {
        reference: s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::Reference;

    #[test]
    fn from_str() {
        vec![
            ("gn 1", "gn", 1, None),
            ("Jo 3:16", "jo", 3, Some(16..=16)),
            ("1co 13", "1co", 13, None),
            ("1 co 13:4-7", "1co", 13, Some(4..=7)),
            ("sl.23.1", "sl", 23, Some(1..=1)),
            ("jó 38", "jó", 38, None),
        ]
        .into_iter()
        .for_each(|(raw, book, chapter, verses)| {
            assert_eq!(
                raw.parse::<Reference>().unwrap(),
                Reference {
                    book: book.to_string(),
                    chapter,
                    verses,
                },
                "parsing {}",
                raw
            );
        });
    }

    #[test]
    fn rejects_garbage() {
        for raw in ["", "genesis", "jo 3:16-2", "jo three"] {
            assert!(raw.parse::<Reference>().is_err(), "{} should not parse", raw);
        }
    }

    #[test]
    fn fmt() {
        let reference: Reference = "1 co 13:4-7".parse().unwrap();
        assert_eq!(reference.to_string(), "1co 13:4-7");
        let reference: Reference = "jo 3:16".parse().unwrap();
        assert_eq!(reference.to_string(), "jo 3:16");
        let reference: Reference = "ap 22".parse().unwrap();
        assert_eq!(reference.to_string(), "ap 22");
    }
}
