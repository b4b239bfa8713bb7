//! Path validation
//!
//! Turns client-supplied relative paths into absolute paths and proves they
//! stay inside the configured root. Every filesystem operation goes through
//! [`SandboxRoot::resolve`]; nothing else builds a [`ResolvedPath`].

use log::{debug, warn};
use std::fs;
use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};

use crate::error::ExplorerError;

/// The directory every request is confined to.
#[derive(Debug, Clone)]
pub struct SandboxRoot {
    root: PathBuf,
}

/// An absolute path certified to lie inside a [`SandboxRoot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    absolute: PathBuf,
    virtual_path: String,
}

impl ResolvedPath {
    /// Absolute path on the host filesystem.
    pub fn as_path(&self) -> &Path {
        &self.absolute
    }

    /// Normalized path relative to the root, `/`-separated, empty for the root.
    pub fn virtual_path(&self) -> &str {
        &self.virtual_path
    }

    /// Virtual path as shown to clients (`/` for the root).
    pub fn display_path(&self) -> &str {
        if self.virtual_path.is_empty() {
            "/"
        } else {
            &self.virtual_path
        }
    }

    pub fn is_root(&self) -> bool {
        self.virtual_path.is_empty()
    }

    /// Last path segment, `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.virtual_path.rsplit('/').next()
        }
    }

    /// True if `self` is `other` or lies below it.
    pub fn is_within(&self, other: &ResolvedPath) -> bool {
        is_contained(&self.absolute, &other.absolute)
    }
}

impl SandboxRoot {
    /// Canonicalizes `root` once; it must be an existing directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, ExplorerError> {
        let root = root.as_ref();
        let canonical = fs::canonicalize(root).map_err(|e| {
            ExplorerError::NotFound(format!("server root {}: {}", root.display(), e))
        })?;

        if !canonical.is_dir() {
            return Err(ExplorerError::InvalidArgument(format!(
                "server root {} is not a directory",
                canonical.display()
            )));
        }

        Ok(Self { root: canonical })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolves a client-relative path against the root.
    ///
    /// Empty input, `"/"` and `"."` all resolve to the root itself. `.` and
    /// `..` are collapsed lexically; the result is rejected with
    /// `AccessDenied` unless it equals the root or starts with the root plus
    /// a separator, and unless its nearest existing ancestor still resolves
    /// inside the root once symlinks are followed.
    pub fn resolve(&self, relative: &str) -> Result<ResolvedPath, ExplorerError> {
        let mut absolute = self.root.clone();

        for segment in relative.split('/') {
            for component in Path::new(segment).components() {
                match component {
                    Component::Normal(part) => absolute.push(part),
                    Component::CurDir => {}
                    Component::ParentDir => {
                        absolute.pop();
                    }
                    Component::RootDir | Component::Prefix(_) => {
                        warn!("Rejected absolute path component in {:?}", relative);
                        return Err(ExplorerError::AccessDenied(relative.to_string()));
                    }
                }
            }
        }

        self.certify(absolute, relative)
    }

    /// Resolves `name` as a single entry inside an already resolved directory.
    pub fn child(&self, dir: &ResolvedPath, name: &str) -> Result<ResolvedPath, ExplorerError> {
        validate_segment(name)?;
        self.certify(dir.absolute.join(name), name)
    }

    /// Checks containment and builds the virtual path.
    fn certify(&self, absolute: PathBuf, requested: &str) -> Result<ResolvedPath, ExplorerError> {
        if !is_contained(&absolute, &self.root) {
            warn!(
                "Path traversal attempt: {:?} resolved to {}",
                requested,
                absolute.display()
            );
            return Err(ExplorerError::AccessDenied(requested.to_string()));
        }

        if self.escapes_through_link(&absolute) {
            warn!(
                "Symlink escape attempt: {:?} resolved to {}",
                requested,
                absolute.display()
            );
            return Err(ExplorerError::AccessDenied(requested.to_string()));
        }

        let virtual_path = self.virtual_path_of(&absolute);
        debug!("Resolved {:?} to {}", requested, absolute.display());

        Ok(ResolvedPath {
            absolute,
            virtual_path,
        })
    }

    /// True if the nearest existing ancestor of `candidate` canonicalizes
    /// outside the root.
    fn escapes_through_link(&self, candidate: &Path) -> bool {
        let mut ancestor = candidate;
        loop {
            match fs::canonicalize(ancestor) {
                Ok(real) => return !is_contained(&real, &self.root),
                Err(_) => match ancestor.parent() {
                    Some(parent) => ancestor = parent,
                    None => return true,
                },
            }
        }
    }

    /// `/`-separated path of `absolute` relative to the root. Callers must
    /// only pass contained paths.
    pub fn virtual_path_of(&self, absolute: &Path) -> String {
        absolute
            .strip_prefix(&self.root)
            .map(|rel| {
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default()
    }
}

/// `candidate == root` or `candidate` starts with `root` + separator.
///
/// The comparison is on strings so that the separator is part of the
/// prefix: a root of `/data/app` must not accept `/data/app-other`.
pub fn is_contained(candidate: &Path, root: &Path) -> bool {
    let candidate = candidate.to_string_lossy();
    let root = root.to_string_lossy();
    let root = root.trim_end_matches(MAIN_SEPARATOR);

    if root.is_empty() {
        // Filesystem root: every absolute path is inside it.
        return candidate.starts_with(MAIN_SEPARATOR);
    }

    candidate == root
        || candidate
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with(MAIN_SEPARATOR))
}

/// A name usable as exactly one path segment.
pub fn validate_segment(name: &str) -> Result<(), ExplorerError> {
    if name.trim().is_empty() {
        return Err(ExplorerError::InvalidArgument("Empty filename".into()));
    }

    let mut components = Path::new(name).components();
    let single_normal = matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none();

    if !single_normal || name.contains('/') || name.contains('\\') {
        return Err(ExplorerError::InvalidArgument(format!(
            "Invalid filename: {}",
            name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sandbox() -> (TempDir, SandboxRoot) {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("docs/inner")).unwrap();
        let root = SandboxRoot::new(temp_dir.path()).unwrap();
        (temp_dir, root)
    }

    #[test]
    fn test_empty_and_slash_resolve_to_root() {
        let (_temp_dir, root) = sandbox();

        for input in ["", "/", ".", "./", "//"] {
            let resolved = root.resolve(input).unwrap();
            assert_eq!(resolved.as_path(), root.path(), "input {:?}", input);
            assert!(resolved.is_root());
            assert_eq!(resolved.display_path(), "/");
        }
    }

    #[test]
    fn test_nested_paths_are_normalized() {
        let (_temp_dir, root) = sandbox();

        let resolved = root.resolve("/docs/./inner/../inner/").unwrap();
        assert_eq!(resolved.as_path(), root.path().join("docs/inner"));
        assert_eq!(resolved.virtual_path(), "docs/inner");
        assert_eq!(resolved.file_name(), Some("inner"));
    }

    #[test]
    fn test_parent_segments_cannot_escape() {
        let (_temp_dir, root) = sandbox();

        for input in ["..", "../", "docs/../..", "/../etc/passwd", "docs/inner/../../../x"] {
            let result = root.resolve(input);
            assert!(
                matches!(result, Err(ExplorerError::AccessDenied(_))),
                "input {:?} was accepted",
                input
            );
        }
    }

    #[test]
    fn test_parent_segments_within_root_are_allowed() {
        let (_temp_dir, root) = sandbox();

        let resolved = root.resolve("docs/inner/../..").unwrap();
        assert!(resolved.is_root());
    }

    #[test]
    fn test_sibling_with_shared_prefix_is_rejected() {
        assert!(!is_contained(
            Path::new("/data/app-other"),
            Path::new("/data/app")
        ));
        assert!(!is_contained(Path::new("/data/appx/file"), Path::new("/data/app")));
        assert!(is_contained(Path::new("/data/app"), Path::new("/data/app")));
        assert!(is_contained(Path::new("/data/app/file"), Path::new("/data/app")));
        assert!(is_contained(Path::new("/data/app/file"), Path::new("/data/app/")));
    }

    #[test]
    fn test_sibling_directory_on_disk_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("app")).unwrap();
        fs::create_dir_all(temp_dir.path().join("app-other")).unwrap();

        let root = SandboxRoot::new(temp_dir.path().join("app")).unwrap();
        let result = root.resolve("../app-other");
        assert!(matches!(result, Err(ExplorerError::AccessDenied(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_pointing_outside_is_rejected() {
        let outside = TempDir::new().unwrap();
        let (temp_dir, root) = sandbox();
        std::os::unix::fs::symlink(outside.path(), temp_dir.path().join("escape")).unwrap();

        assert!(matches!(
            root.resolve("escape"),
            Err(ExplorerError::AccessDenied(_))
        ));
        assert!(matches!(
            root.resolve("escape/new.txt"),
            Err(ExplorerError::AccessDenied(_))
        ));
    }

    #[test]
    fn test_child_requires_single_segment() {
        let (_temp_dir, root) = sandbox();
        let docs = root.resolve("docs").unwrap();

        let child = root.child(&docs, "notes.txt").unwrap();
        assert_eq!(child.virtual_path(), "docs/notes.txt");

        for name in ["", "  ", "..", ".", "a/b", "a\\b", "/etc"] {
            assert!(
                matches!(root.child(&docs, name), Err(ExplorerError::InvalidArgument(_))),
                "name {:?} was accepted",
                name
            );
        }
    }

    #[test]
    fn test_is_within() {
        let (_temp_dir, root) = sandbox();
        let docs = root.resolve("docs").unwrap();
        let inner = root.resolve("docs/inner").unwrap();
        let top = root.resolve("").unwrap();

        assert!(inner.is_within(&docs));
        assert!(docs.is_within(&docs));
        assert!(!docs.is_within(&inner));
        assert!(docs.is_within(&top));
    }
}
