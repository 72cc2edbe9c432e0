//! Filesystem helpers shared by backup, restore, and symlink operations.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

/// Ensure the parent directory of `path` exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Recursively copy a directory tree. Symlinks within the source tree are
/// followed (their content is copied, not the link itself).
///
/// # Errors
///
/// Returns an error on any read, create, or copy failure.
pub fn copy_dir_recursive(source: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest).with_context(|| format!("create dir: {}", dest.display()))?;
    let entries =
        std::fs::read_dir(source).with_context(|| format!("read dir: {}", source.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in: {}", source.display()))?;
        let from = entry.path();
        let to = dest.join(entry.file_name());
        if from.is_dir() {
            copy_dir_recursive(&from, &to)?;
        } else {
            std::fs::copy(&from, &to)
                .with_context(|| format!("copy {} to {}", from.display(), to.display()))?;
        }
    }
    Ok(())
}

/// Move a file or directory. Rename first (cheap on the same filesystem);
/// fall back to copy + delete when the rename crosses a filesystem boundary.
///
/// # Errors
///
/// Returns an error if both the rename and the copy fallback fail.
pub fn move_entry(source: &Path, dest: &Path) -> Result<()> {
    if std::fs::rename(source, dest).is_ok() {
        return Ok(());
    }
    if source.is_dir() {
        copy_dir_recursive(source, dest)?;
        std::fs::remove_dir_all(source)
            .with_context(|| format!("remove after copy: {}", source.display()))?;
    } else {
        std::fs::copy(source, dest)
            .with_context(|| format!("copy {} to {}", source.display(), dest.display()))?;
        std::fs::remove_file(source)
            .with_context(|| format!("remove after copy: {}", source.display()))?;
    }
    Ok(())
}

/// Expand a leading `~` plus `$VAR` and `${VAR}` references against the
/// process environment, in a single pass (substituted values are not
/// re-expanded). Unset variables expand to the empty string.
#[must_use]
pub fn expand_env(input: &str) -> String {
    let input = if input == "~" || input.starts_with("~/") {
        let home = std::env::var("HOME").unwrap_or_default();
        format!("{home}{}", input.trim_start_matches('~'))
    } else {
        input.to_string()
    };

    let mut result = String::with_capacity(input.len());
    let mut rest = input.as_str();
    while let Some(pos) = rest.find('$') {
        result.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        if let Some(braced) = tail.strip_prefix('{') {
            match braced.find('}') {
                Some(close) => {
                    result.push_str(&std::env::var(&braced[..close]).unwrap_or_default());
                    rest = &braced[close + 1..];
                }
                None => {
                    // Unterminated brace: keep the text literally.
                    result.push('$');
                    rest = tail;
                }
            }
        } else {
            let len = tail
                .char_indices()
                .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
                .count();
            if len == 0 {
                result.push('$');
                rest = tail;
            } else {
                result.push_str(&std::env::var(&tail[..len]).unwrap_or_default());
                rest = &tail[len..];
            }
        }
    }
    result.push_str(rest);
    result
}

/// Expand a path string into a [`PathBuf`] with env references resolved.
#[must_use]
pub fn expand_path(input: &str) -> PathBuf {
    PathBuf::from(expand_env(input))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn copy_dir_recursive_copies_nested_tree() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(src.join("nested")).unwrap();
        std::fs::write(src.join("a.txt"), "a").unwrap();
        std::fs::write(src.join("nested/b.txt"), "b").unwrap();

        let dst = dir.path().join("dst");
        copy_dir_recursive(&src, &dst).unwrap();

        assert_eq!(std::fs::read_to_string(dst.join("a.txt")).unwrap(), "a");
        assert_eq!(
            std::fs::read_to_string(dst.join("nested/b.txt")).unwrap(),
            "b"
        );
    }

    #[test]
    fn move_entry_moves_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("from.txt");
        let dst = dir.path().join("to.txt");
        std::fs::write(&src, "content").unwrap();

        move_entry(&src, &dst).unwrap();

        assert!(!src.exists());
        assert_eq!(std::fs::read_to_string(&dst).unwrap(), "content");
    }

    #[test]
    fn move_entry_moves_directory() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("from");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("f"), "x").unwrap();

        let dst = dir.path().join("to");
        move_entry(&src, &dst).unwrap();

        assert!(!src.exists());
        assert_eq!(std::fs::read_to_string(dst.join("f")).unwrap(), "x");
    }

    #[test]
    fn ensure_parent_dir_creates_chain() {
        let dir = tempfile::tempdir().unwrap();
        let deep = dir.path().join("a/b/c/file.txt");
        ensure_parent_dir(&deep).unwrap();
        assert!(deep.parent().unwrap().is_dir());
    }

    #[test]
    fn expand_env_plain_string_unchanged() {
        assert_eq!(expand_env("/etc/hosts"), "/etc/hosts");
    }

    #[test]
    fn expand_env_replaces_braced_and_bare_vars() {
        // SAFETY: the variable name is unique to this test.
        #[allow(unsafe_code)]
        unsafe {
            std::env::set_var("DOTCTL_FS_TEST", "value");
        }
        assert_eq!(expand_env("$DOTCTL_FS_TEST/x"), "value/x");
        assert_eq!(expand_env("${DOTCTL_FS_TEST}/y"), "value/y");
        assert_eq!(expand_env("a-${DOTCTL_FS_TEST}-b"), "a-value-b");
        // SAFETY: same variable, removed after use.
        #[allow(unsafe_code)]
        unsafe {
            std::env::remove_var("DOTCTL_FS_TEST");
        }
    }

    #[test]
    fn expand_env_unset_var_becomes_empty() {
        assert_eq!(expand_env("$DOTCTL_UNSET_VAR_12345/z"), "/z");
    }

    #[test]
    fn expand_env_lone_dollar_kept() {
        assert_eq!(expand_env("cost: 5$"), "cost: 5$");
        assert_eq!(expand_env("${unterminated"), "${unterminated");
    }

    #[test]
    fn expand_env_does_not_reexpand_substituted_values() {
        // SAFETY: the variable name is unique to this test.
        #[allow(unsafe_code)]
        unsafe {
            std::env::set_var("DOTCTL_FS_RECURSIVE", "$DOTCTL_FS_RECURSIVE");
        }
        assert_eq!(expand_env("$DOTCTL_FS_RECURSIVE"), "$DOTCTL_FS_RECURSIVE");
        // SAFETY: same variable, removed after use.
        #[allow(unsafe_code)]
        unsafe {
            std::env::remove_var("DOTCTL_FS_RECURSIVE");
        }
    }
}
