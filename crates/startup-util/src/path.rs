use std::path::{Component, Path, PathBuf};

/// Resolve `path` against `root` without touching the filesystem.
///
/// Absolute inputs ignore `root`. `.` segments are dropped and `..` pops the
/// previous segment; `..` never climbs above the filesystem root. The target
/// does not need to exist.
#[must_use]
pub fn resolve_against(root: &Path, path: &str) -> PathBuf {
    let candidate = Path::new(path);
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };
    normalize(&joined)
}

/// Lexically normalize a path.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if !matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir | Component::Prefix(_))
                ) {
                    out.pop();
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Render a path with forward slashes, the form module ids use.
#[must_use]
pub fn to_slash(path: &Path) -> String {
    let s = path.to_string_lossy();
    if cfg!(windows) {
        s.replace('\\', "/")
    } else {
        s.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative() {
        let resolved = resolve_against(Path::new("/proj"), "./src/entry.ts");
        assert_eq!(resolved, PathBuf::from("/proj/src/entry.ts"));
    }

    #[test]
    fn test_resolve_bare_relative() {
        let resolved = resolve_against(Path::new("/proj"), "src/cron/example.ts");
        assert_eq!(resolved, PathBuf::from("/proj/src/cron/example.ts"));
    }

    #[test]
    fn test_resolve_parent_segments() {
        let resolved = resolve_against(Path::new("/proj/app"), "../shared/./boot.ts");
        assert_eq!(resolved, PathBuf::from("/proj/shared/boot.ts"));
    }

    #[test]
    fn test_resolve_absolute_ignores_root() {
        let resolved = resolve_against(Path::new("/proj"), "/opt/jobs/start.ts");
        assert_eq!(resolved, PathBuf::from("/opt/jobs/start.ts"));
    }

    #[test]
    fn test_parent_never_escapes_root() {
        assert_eq!(normalize(Path::new("/../../x")), PathBuf::from("/x"));
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("/proj/src/entry.ts")), "/proj/src/entry.ts");
    }
}
