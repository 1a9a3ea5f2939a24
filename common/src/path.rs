//! Pure helpers over emulated paths and branch names.
//!
//! Branch names may contain `/`, so a path like `a/b/c` can mean branch `a`
//! with residual `b/c`, branch `a/b` with residual `c`, or branch `a/b/c`.

pub const SEPARATOR: char = '/';

/// Drop the leading separator and a single trailing one. The root becomes
/// the empty string.
pub fn normalize(path: &str) -> &str {
    let path = path.strip_prefix(SEPARATOR).unwrap_or(path);
    path.strip_suffix(SEPARATOR).unwrap_or(path)
}

/// The absolute form of a normalized path.
pub fn absolute(normalized: &str) -> String {
    format!("{SEPARATOR}{normalized}")
}

/// Join a child name onto an absolute path.
pub fn join(parent: &str, name: &str) -> String {
    if parent.ends_with(SEPARATOR) {
        format!("{parent}{name}")
    } else {
        format!("{parent}{SEPARATOR}{name}")
    }
}

/// Absolute path of the directory containing `path`. The root is its own
/// parent.
pub fn parent(path: &str) -> &str {
    let trimmed = path.strip_suffix(SEPARATOR).unwrap_or(path);
    match trimmed.rfind(SEPARATOR) {
        Some(0) | None => "/",
        Some(cut) => &trimmed[..cut],
    }
}

/// Every `(branch, residual)` reading of a normalized path, shortest branch
/// candidate first, ending with the whole path as a branch and an empty
/// residual.
pub fn branch_candidates(path: &str) -> impl Iterator<Item = (&str, &str)> {
    path.match_indices(SEPARATOR)
        .map(move |(at, _)| (&path[..at], &path[at + 1..]))
        .chain(std::iter::once((path, "")))
        .filter(|(branch, _)| !branch.is_empty())
}

/// Whether `branch` lives at or below the virtual directory `prefix`. The
/// empty prefix is the root and holds every branch.
pub fn matches_prefix(branch: &str, prefix: &str) -> bool {
    prefix.is_empty()
        || branch == prefix
        || branch
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with(SEPARATOR))
}

/// The name `branch` contributes to the listing of `prefix`: the segment
/// right after the prefix, cut at the next separator.
pub fn next_segment<'a>(branch: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = if prefix.is_empty() {
        branch
    } else {
        branch.strip_prefix(prefix)?.strip_prefix(SEPARATOR)?
    };
    rest.split(SEPARATOR).next().filter(|segment| !segment.is_empty())
}

/// Whether every segment of `residual` can name a tree entry. Empty, `.`
/// and `..` segments never do.
pub fn is_entry_path(residual: &str) -> bool {
    residual
        .split(SEPARATOR)
        .all(|segment| !matches!(segment, "" | "." | ".."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_one_separator_each_side() {
        assert_eq!(normalize("/"), "");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("/main/src/"), "main/src");
        assert_eq!(normalize("main"), "main");
    }

    #[test]
    fn parents() {
        assert_eq!(parent("/"), "/");
        assert_eq!(parent("/main"), "/");
        assert_eq!(parent("/main/src/lib.rs"), "/main/src");
        assert_eq!(parent("/main/src/"), "/main");
        assert_eq!(join("/", "main"), "/main");
        assert_eq!(join("/main", "src"), "/main/src");
    }

    #[test]
    fn candidates_are_shortest_first() {
        let candidates: Vec<_> = branch_candidates("a/b/c").collect();
        assert_eq!(candidates, vec![("a", "b/c"), ("a/b", "c"), ("a/b/c", "")]);
        assert_eq!(branch_candidates("").count(), 0);
        assert_eq!(branch_candidates("main").collect::<Vec<_>>(), vec![("main", "")]);
    }

    #[test]
    fn prefix_matches_only_at_segment_boundaries() {
        assert!(matches_prefix("feature/x", "feature"));
        assert!(matches_prefix("feature", "feature"));
        assert!(!matches_prefix("features/x", "feature"));
        assert!(!matches_prefix("feat", "feature"));
        assert!(matches_prefix("anything", ""));
    }

    #[test]
    fn next_segments() {
        assert_eq!(next_segment("feature/x", "feature"), Some("x"));
        assert_eq!(next_segment("feature/x/y", "feature"), Some("x"));
        assert_eq!(next_segment("feature/x/y", "feature/x"), Some("y"));
        assert_eq!(next_segment("feature/x/y", ""), Some("feature"));
        assert_eq!(next_segment("feature", "feature"), None);
        assert_eq!(next_segment("features/x", "feature"), None);
    }

    #[test]
    fn entry_paths() {
        assert!(is_entry_path("README"));
        assert!(is_entry_path("bin/tool"));
        assert!(is_entry_path(".gitignore"));
        assert!(!is_entry_path("/d"));
        assert!(!is_entry_path("d//f"));
        assert!(!is_entry_path("./d"));
        assert!(!is_entry_path("bin/../README"));
    }
}
