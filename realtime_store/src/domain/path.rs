use super::errors::StoreError;
use std::fmt;

// Characters that cannot appear inside a path segment.
const FORBIDDEN: [char; 5] = ['.', '#', '$', '[', ']'];

/// A validated, `/`-separated location in the value tree.
///
/// Leading and trailing slashes are ignored; the empty path addresses the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            if segment.is_empty() || segment.contains(&FORBIDDEN[..]) {
                return Err(StoreError::InvalidPath(raw.to_string()));
            }
            segments.push(segment.to_string());
        }

        Ok(Self { segments })
    }

    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Appends a single key; the caller is responsible for the key being a valid segment.
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        Self { segments }
    }

    /// True when one path is an ancestor of (or equal to) the other, i.e. a write at one can
    /// change the value observed at the other.
    pub fn overlaps(&self, other: &StorePath) -> bool {
        let common = self.segments.len().min(other.segments.len());
        self.segments[..common] == other.segments[..common]
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_path_has_surrounding_slashes_then_they_are_ignored() {
        let path = StorePath::parse("/players/AB/").expect("valid path");
        assert_eq!(path.segments(), ["players", "AB"]);
        assert_eq!(path.to_string(), "players/AB");
    }

    #[test]
    fn when_path_is_empty_then_it_addresses_the_root() {
        assert!(StorePath::parse("").expect("valid path").is_root());
        assert!(StorePath::parse("/").expect("valid path").is_root());
    }

    #[test]
    fn when_segment_contains_forbidden_character_then_parse_fails() {
        for raw in ["players/a.b", "bullets/#1", "x/$y", "a/[0]"] {
            assert!(
                matches!(StorePath::parse(raw), Err(StoreError::InvalidPath(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn when_path_has_empty_segment_then_parse_fails() {
        assert!(StorePath::parse("players//AB").is_err());
    }

    #[test]
    fn when_paths_share_a_prefix_then_they_overlap() {
        let players = StorePath::parse("players").expect("valid path");
        let one = StorePath::parse("players/AB").expect("valid path");
        let bullets = StorePath::parse("bullets").expect("valid path");

        assert!(players.overlaps(&one));
        assert!(one.overlaps(&players));
        assert!(StorePath::root().overlaps(&bullets));
        assert!(!players.overlaps(&bullets));
    }
}
