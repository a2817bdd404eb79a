//! URL alias segments.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error building an [`AliasPath`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AliasError {
    /// No segments were given.
    #[error("alias path must contain at least one segment")]
    Empty,
    /// A segment was the empty string.
    #[error("alias segment {index} is empty")]
    EmptySegment {
        /// Zero-based position of the offending segment.
        index: usize,
    },
    /// A segment is `.`, `..` or contains a path separator.
    #[error("alias segment {index} is not a plain name: {segment:?}")]
    InvalidSegment {
        /// Zero-based position of the offending segment.
        index: usize,
        segment: String,
    },
}

/// Non-empty ordered sequence of non-empty URL segments.
///
/// Segments are plain names: `.`, `..` and anything containing `/` or `\`
/// are rejected, so a path always stays below the directory it is joined to.
///
/// `["featured", "news"]` joins to `/featured/news`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct AliasPath(Vec<String>);

impl AliasPath {
    /// Build from routed segments.
    ///
    /// # Errors
    ///
    /// Returns [`AliasError`] if there are no segments or one is empty or not
    /// a plain name.
    pub fn new<I, S>(segments: I) -> Result<Self, AliasError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(AliasError::Empty);
        }
        if let Some(index) = segments.iter().position(String::is_empty) {
            return Err(AliasError::EmptySegment { index });
        }
        if let Some(index) = segments.iter().position(|s| !is_plain_segment(s)) {
            return Err(AliasError::InvalidSegment {
                index,
                segment: segments[index].clone(),
            });
        }
        Ok(Self(segments))
    }

    /// Split a slash-separated alias (`/featured/news`), ignoring empty parts.
    ///
    /// # Errors
    ///
    /// Returns [`AliasError::Empty`] for `/` or the empty string, and
    /// [`AliasError::InvalidSegment`] for dot segments.
    pub fn parse(path: &str) -> Result<Self, AliasError> {
        Self::new(path.split('/').filter(|s| !s.is_empty()))
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Each segment prefixed by `/`, concatenated.
    #[must_use]
    pub fn join(&self) -> String {
        self.0.iter().map(|segment| format!("/{segment}")).collect()
    }
}

fn is_plain_segment(segment: &str) -> bool {
    segment != "." && segment != ".." && !segment.contains(['/', '\\'])
}

impl fmt::Display for AliasPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join())
    }
}

impl TryFrom<Vec<String>> for AliasPath {
    type Error = AliasError;

    fn try_from(segments: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(segments)
    }
}

impl From<AliasPath> for Vec<String> {
    fn from(path: AliasPath) -> Self {
        path.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_single_segment() {
        assert_eq!(AliasPath::new(["featured"]).unwrap().join(), "/featured");
    }

    #[test]
    fn test_join_nested_segments() {
        let path = AliasPath::new(["featured", "news"]).unwrap();
        assert_eq!(path.join(), "/featured/news");
        assert_eq!(path.to_string(), "/featured/news");
    }

    #[test]
    fn test_join_never_adds_separators() {
        for segments in [vec!["a"], vec!["a", "b"], vec!["x", "y", "z", "w"]] {
            let joined = AliasPath::new(segments.clone()).unwrap().join();
            let expected: String = segments.iter().map(|s| format!("/{s}")).collect();
            assert_eq!(joined, expected);
            assert!(!joined.contains("//"));
            assert!(!joined.contains(' '));
        }
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(
            AliasPath::new(Vec::<String>::new()).unwrap_err(),
            AliasError::Empty
        );
        assert_eq!(AliasPath::parse("/").unwrap_err(), AliasError::Empty);
    }

    #[test]
    fn test_empty_segment_rejected() {
        assert_eq!(
            AliasPath::new(["a", ""]).unwrap_err(),
            AliasError::EmptySegment { index: 1 }
        );
    }

    #[test]
    fn test_dot_segments_rejected() {
        assert_eq!(
            AliasPath::parse("/pages/../../../escaped").unwrap_err(),
            AliasError::InvalidSegment {
                index: 1,
                segment: "..".to_owned()
            }
        );
        assert!(matches!(
            AliasPath::new(["a", "."]),
            Err(AliasError::InvalidSegment { index: 1, .. })
        ));
    }

    #[test]
    fn test_separators_in_segment_rejected() {
        assert!(AliasPath::new(["a\\..\\b"]).is_err());
        assert!(AliasPath::new(["a/b"]).is_err());
        assert!(serde_json::from_str::<AliasPath>(r#"["..","etc"]"#).is_err());
        assert!(AliasPath::new(["..."]).is_ok());
    }

    #[test]
    fn test_parse_ignores_stray_slashes() {
        let path = AliasPath::parse("//pages/featured/").unwrap();
        assert_eq!(path.segments(), ["pages", "featured"]);
    }

    #[test]
    fn test_serde_as_segment_array() {
        let path: AliasPath = serde_json::from_str(r#"["featured","news"]"#).unwrap();
        assert_eq!(path.join(), "/featured/news");
        assert_eq!(serde_json::to_string(&path).unwrap(), r#"["featured","news"]"#);
        assert!(serde_json::from_str::<AliasPath>("[]").is_err());
    }
}
