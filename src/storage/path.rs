//! # Logical Paths
//!
//! Slash-delimited, substrate-agnostic paths. A single leading `.` or `/`
//! is normalized away and empty segments (doubled slashes) are dropped, so
//! `./db/users.db`, `/db/users.db` and `db//users.db` all resolve the same
//! location.

/// A normalized logical path: an ordered, non-empty list of segments.
///
/// Segment order is significant; the final segment may name a file or a
/// directory depending on the operation — intent is never inferred from
/// the path string itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalPath {
    segments: Vec<String>,
}

impl LogicalPath {
    /// Parse and normalize a raw slash-delimited path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw
            .strip_prefix("./")
            .or_else(|| raw.strip_prefix('.'))
            .or_else(|| raw.strip_prefix('/'))
            .unwrap_or(raw);

        let segments = trimmed
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Self { segments }
    }

    /// Path segments in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True when normalization left nothing (the root itself).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The final segment, treated as a file name by file operations.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Everything but the final segment: the parent directory path.
    pub fn parent(&self) -> LogicalPath {
        let len = self.segments.len().saturating_sub(1);
        LogicalPath {
            segments: self.segments[..len].to_vec(),
        }
    }

    /// Render back to a slash-delimited string.
    pub fn as_string(&self) -> String {
        self.segments.join("/")
    }
}

/// Name of the temp sibling used by the crash-safe write protocol.
///
/// Co-located with the target: `db/users.db` -> `db/users.db~`.
pub fn temp_sibling(path: &str) -> String {
    format!("{}~", path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_dot_and_slash_normalized() {
        assert_eq!(
            LogicalPath::parse("./db/users.db"),
            LogicalPath::parse("db/users.db")
        );
        assert_eq!(
            LogicalPath::parse("/db/users.db"),
            LogicalPath::parse("db/users.db")
        );
    }

    #[test]
    fn test_empty_segments_dropped() {
        let path = LogicalPath::parse("db//users.db");
        assert_eq!(path.segments(), ["db", "users.db"]);
    }

    #[test]
    fn test_root_path() {
        assert!(LogicalPath::parse("").is_root());
        assert!(LogicalPath::parse("/").is_root());
        assert!(LogicalPath::parse(".").is_root());
    }

    #[test]
    fn test_parent_and_file_name() {
        let path = LogicalPath::parse("a/b/c.db");
        assert_eq!(path.file_name(), Some("c.db"));
        assert_eq!(path.parent().as_string(), "a/b");

        let flat = LogicalPath::parse("c.db");
        assert!(flat.parent().is_root());
    }

    #[test]
    fn test_temp_sibling_shares_parent() {
        let temp = temp_sibling("db/users.db");
        assert_eq!(temp, "db/users.db~");
        assert_eq!(
            LogicalPath::parse(&temp).parent(),
            LogicalPath::parse("db/users.db").parent()
        );
    }
}
