// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Index ranges over (possibly multidimensional) arrays.

use std::fmt;
use std::str::FromStr;

use super::StatusCode;

/// Inclusive index interval of one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeDimension {
    pub min: u32,
    pub max: u32,
}

impl RangeDimension {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn single(index: u32) -> Self {
        Self {
            min: index,
            max: index,
        }
    }

    /// Number of indices covered.
    pub fn count(&self) -> usize {
        (self.max - self.min) as usize + 1
    }
}

/// Ordered list of per-dimension intervals, outermost dimension first.
///
/// Textual form: `"a:b,c:d,e"`. A bare number selects a single index. In the
/// `min:max` form `min` must be strictly lower than `max`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NumericRange {
    dimensions: Vec<RangeDimension>,
}

impl NumericRange {
    /// Fails with `BadIndexRangeInvalid` for an empty list or `min > max`.
    pub fn new(dimensions: Vec<RangeDimension>) -> Result<Self, StatusCode> {
        if dimensions.is_empty() || dimensions.iter().any(|d| d.min > d.max) {
            return Err(StatusCode::BAD_INDEX_RANGE_INVALID);
        }
        Ok(Self { dimensions })
    }

    pub fn single(index: u32) -> Self {
        Self {
            dimensions: vec![RangeDimension::single(index)],
        }
    }

    pub fn dimensions(&self) -> &[RangeDimension] {
        &self.dimensions
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Number of elements in the addressed sub-rectangle.
    pub fn element_count(&self) -> usize {
        self.dimensions.iter().map(RangeDimension::count).product()
    }
}

fn parse_index(token: &str) -> Result<u32, StatusCode> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StatusCode::BAD_INDEX_RANGE_INVALID);
    }
    token.parse().map_err(|_| StatusCode::BAD_INDEX_RANGE_INVALID)
}

impl FromStr for NumericRange {
    type Err = StatusCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(StatusCode::BAD_INDEX_RANGE_INVALID);
        }
        let mut dimensions = Vec::new();
        for part in s.split(',') {
            let dim = match part.split_once(':') {
                Some((min, max)) => {
                    let min = parse_index(min)?;
                    let max = parse_index(max)?;
                    if min >= max {
                        return Err(StatusCode::BAD_INDEX_RANGE_INVALID);
                    }
                    RangeDimension { min, max }
                }
                None => RangeDimension::single(parse_index(part)?),
            };
            dimensions.push(dim);
        }
        Ok(Self { dimensions })
    }
}

impl fmt::Display for NumericRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, dim) in self.dimensions.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if dim.min == dim.max {
                write!(f, "{}", dim.min)?;
            } else {
                write!(f, "{}:{}", dim.min, dim.max)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single() {
        let range: NumericRange = "2".parse().expect("parse");
        assert_eq!(range.dimensions(), &[RangeDimension::new(2, 2)]);
    }

    #[test]
    fn test_parse_multi() {
        let range: NumericRange = "1:2,0:3,5".parse().expect("parse");
        assert_eq!(
            range.dimensions(),
            &[
                RangeDimension::new(1, 2),
                RangeDimension::new(0, 3),
                RangeDimension::new(5, 5)
            ]
        );
        assert_eq!(range.element_count(), 8);
        assert_eq!(range.to_string(), "1:2,0:3,5");
    }

    #[test]
    fn test_parse_rejects() {
        for bad in ["", "2:1", "3:3", "a", "1:b", "1,", ",1", "1:2:3", "-1", "+1", " 1"] {
            assert_eq!(
                bad.parse::<NumericRange>(),
                Err(StatusCode::BAD_INDEX_RANGE_INVALID),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_new_validates() {
        assert!(NumericRange::new(vec![]).is_err());
        assert!(NumericRange::new(vec![RangeDimension::new(4, 1)]).is_err());
        assert!(NumericRange::new(vec![RangeDimension::new(1, 1)]).is_ok());
    }
}
