//! Property paths for diagnostics and data navigation
//!
//! A path is a dotted chain of keys with optional bracketed indices, e.g.
//! `items[0].name`. The binder uses paths to report which settings entry a
//! failed bind came from; parse and build are exact inverses for any path
//! built from valid segments.

use thiserror::Error;

/// One step in a property path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Named object key
    Key(String),
    /// Numeric array index
    Index(usize),
}

/// Error produced when a path string cannot be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Empty path or empty segment (e.g. `a..b`)
    #[error("empty path segment at offset {0}")]
    EmptySegment(usize),

    /// Bracket without a matching close, or non-numeric index
    #[error("invalid index at offset {0}")]
    InvalidIndex(usize),
}

/// Parse a path string like `items[0].name` into segments.
pub fn parse_path(path: &str) -> Result<Vec<PathSegment>, PathError> {
    let mut segments = Vec::new();
    let bytes = path.as_bytes();
    let mut pos = 0;
    let mut expect_key = true;

    while pos < bytes.len() {
        match bytes[pos] {
            b'.' => {
                if expect_key {
                    return Err(PathError::EmptySegment(pos));
                }
                pos += 1;
                expect_key = true;
            }
            b'[' => {
                let close = path[pos..]
                    .find(']')
                    .map(|i| pos + i)
                    .ok_or(PathError::InvalidIndex(pos))?;
                let index: usize = path[pos + 1..close]
                    .parse()
                    .map_err(|_| PathError::InvalidIndex(pos))?;
                segments.push(PathSegment::Index(index));
                pos = close + 1;
                expect_key = false;
            }
            _ => {
                let end = path[pos..]
                    .find(['.', '['])
                    .map(|i| pos + i)
                    .unwrap_or(path.len());
                if end == pos {
                    return Err(PathError::EmptySegment(pos));
                }
                segments.push(PathSegment::Key(path[pos..end].to_string()));
                pos = end;
                expect_key = false;
            }
        }
    }

    if expect_key {
        return Err(PathError::EmptySegment(pos));
    }
    Ok(segments)
}

/// Build the canonical string form of a path.
pub fn build_path(segments: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathSegment::Index(index) => {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple() {
        assert_eq!(
            parse_path("items[0].name").unwrap(),
            vec![
                PathSegment::Key("items".to_string()),
                PathSegment::Index(0),
                PathSegment::Key("name".to_string()),
            ]
        );
    }

    #[test]
    fn test_round_trip() {
        for path in ["items[0].name", "a.b.c", "rows[2][3]", "x[10].y[0].z"] {
            let segments = parse_path(path).unwrap();
            assert_eq!(build_path(&segments), path);
        }
    }

    #[test]
    fn test_invalid_paths() {
        assert!(parse_path("").is_err());
        assert!(parse_path("a..b").is_err());
        assert!(parse_path("a.").is_err());
        assert!(parse_path("a[x]").is_err());
        assert!(parse_path("a[1").is_err());
    }
}
