//! Source ranges in the SCIP compact encoding.
//!
//! A range covers an identifier token exactly, never surrounding
//! punctuation. Lines and columns are 0-based. On the wire a range is an
//! array of three integers when it starts and ends on the same line
//! (`[line, start_col, end_col]`) and four otherwise
//! (`[start_line, start_col, end_line, end_col]`).

use serde::{Deserialize, Serialize};

/// A half-open source range, 0-based lines and columns.
///
/// Serializes to the compact 3/4 element array form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<i32>", try_from = "Vec<i32>")]
pub struct Range {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Range {
    /// Create a range. The start must not come after the end.
    ///
    /// # Panics
    /// Panics if the end position precedes the start position.
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        assert!(
            (start_line, start_col) <= (end_line, end_col),
            "range start {}:{} must be <= end {}:{}",
            start_line,
            start_col,
            end_line,
            end_col
        );
        Range {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Create a range confined to a single line.
    pub fn single_line(line: u32, start_col: u32, end_col: u32) -> Self {
        Range::new(line, start_col, line, end_col)
    }

    /// Whether the range starts and ends on the same line.
    pub fn is_single_line(&self) -> bool {
        self.start_line == self.end_line
    }

    /// The compact wire form: three integers for single-line ranges,
    /// four otherwise.
    pub fn to_compact(&self) -> Vec<i32> {
        if self.is_single_line() {
            vec![
                self.start_line as i32,
                self.start_col as i32,
                self.end_col as i32,
            ]
        } else {
            vec![
                self.start_line as i32,
                self.start_col as i32,
                self.end_line as i32,
                self.end_col as i32,
            ]
        }
    }

    /// Parse the compact wire form.
    pub fn from_compact(raw: &[i32]) -> Result<Self, RangeError> {
        let as_u32 = |v: i32| -> Result<u32, RangeError> {
            u32::try_from(v).map_err(|_| RangeError::Negative { raw: raw.to_vec() })
        };

        match raw {
            [line, start_col, end_col] => {
                let (line, start_col, end_col) =
                    (as_u32(*line)?, as_u32(*start_col)?, as_u32(*end_col)?);
                if start_col > end_col {
                    return Err(RangeError::Inverted { raw: raw.to_vec() });
                }
                Ok(Range {
                    start_line: line,
                    start_col,
                    end_line: line,
                    end_col,
                })
            }
            [start_line, start_col, end_line, end_col] => {
                let range = Range {
                    start_line: as_u32(*start_line)?,
                    start_col: as_u32(*start_col)?,
                    end_line: as_u32(*end_line)?,
                    end_col: as_u32(*end_col)?,
                };
                if (range.start_line, range.start_col) > (range.end_line, range.end_col) {
                    return Err(RangeError::Inverted { raw: raw.to_vec() });
                }
                Ok(range)
            }
            _ => Err(RangeError::BadLength { len: raw.len() }),
        }
    }
}

impl Ord for Range {
    /// Source order: by start position, ties broken by end position.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.start_line, self.start_col, self.end_line, self.end_col).cmp(&(
            other.start_line,
            other.start_col,
            other.end_line,
            other.end_col,
        ))
    }
}

impl PartialOrd for Range {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl From<Range> for Vec<i32> {
    fn from(range: Range) -> Vec<i32> {
        range.to_compact()
    }
}

impl TryFrom<Vec<i32>> for Range {
    type Error = RangeError;

    fn try_from(raw: Vec<i32>) -> Result<Self, Self::Error> {
        Range::from_compact(&raw)
    }
}

/// Errors for malformed compact range arrays.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// A compact range must have exactly 3 or 4 elements.
    #[error("compact range must have 3 or 4 elements, got {len}")]
    BadLength { len: usize },

    /// Lines and columns are unsigned.
    #[error("compact range contains a negative component: {raw:?}")]
    Negative { raw: Vec<i32> },

    /// End position precedes start position.
    #[error("compact range end precedes start: {raw:?}")]
    Inverted { raw: Vec<i32> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_compacts_to_three_elements() {
        let range = Range::single_line(4, 8, 13);
        assert_eq!(range.to_compact(), vec![4, 8, 13]);
    }

    #[test]
    fn multi_line_keeps_four_elements() {
        let range = Range::new(4, 8, 6, 1);
        assert_eq!(range.to_compact(), vec![4, 8, 6, 1]);
    }

    #[test]
    fn compact_round_trip() {
        for range in [Range::single_line(0, 0, 3), Range::new(2, 7, 5, 0)] {
            assert_eq!(Range::from_compact(&range.to_compact()), Ok(range));
        }
    }

    #[test]
    fn rejects_inverted_and_malformed() {
        assert!(matches!(
            Range::from_compact(&[3, 9, 4]),
            Err(RangeError::Inverted { .. })
        ));
        assert!(matches!(
            Range::from_compact(&[1, 2]),
            Err(RangeError::BadLength { len: 2 })
        ));
        assert!(matches!(
            Range::from_compact(&[1, -2, 3]),
            Err(RangeError::Negative { .. })
        ));
    }

    #[test]
    fn orders_by_start_then_end() {
        let a = Range::single_line(1, 0, 4);
        let b = Range::single_line(1, 0, 7);
        let c = Range::single_line(2, 0, 1);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    #[should_panic(expected = "must be <=")]
    fn constructor_rejects_backwards_range() {
        let _ = Range::new(5, 3, 5, 1);
    }

    #[test]
    fn serde_uses_compact_form() {
        let range = Range::single_line(4, 8, 13);
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, "[4,8,13]");
        let back: Range = serde_json::from_str(&json).unwrap();
        assert_eq!(back, range);
    }
}
