use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// `%APPDATA%` on Windows, the user's home directory elsewhere.
fn platform_home() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let dir = dirs::config_dir();
    #[cfg(not(target_os = "windows"))]
    let dir = dirs::home_dir();

    match dir {
        Some(dir) => Ok(dir),
        None => bail!("cannot determine the platform home directory; configure server.home_dir explicitly"),
    }
}

fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return platform_home();
    }
    match raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        Some(rest) => Ok(platform_home()?.join(rest)),
        None => Ok(PathBuf::from(raw)),
    }
}

/// Resolve the server home directory to an absolute path.
///
/// `None` selects `<platform home>/<default_subdir>`. A leading `~` expands
/// to the platform home and relative paths resolve against the working
/// directory. With `create` the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let path = match configured {
        Some(raw) => expand_tilde(raw.trim())?,
        None => platform_home()?.join(default_subdir),
    };
    let path = if path.is_absolute() {
        path
    } else {
        env::current_dir()
            .context("cannot read the working directory")?
            .join(path)
    };

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("cannot create home dir {}", path.display()))?;
    } else if !Path::new(&path).exists() {
        bail!("home dir {} does not exist", path.display());
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absolute_path_is_kept_and_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("a/b");
        let resolved =
            resolve_home_dir(Some(target.to_string_lossy().into_owned()), ".krydd", true).unwrap();
        assert_eq!(resolved, target);
        assert!(target.is_dir());
    }

    #[test]
    fn missing_dir_without_create_fails() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("absent");
        assert!(resolve_home_dir(Some(target.to_string_lossy().into_owned()), ".krydd", false).is_err());
    }

    #[test]
    fn tilde_expands_to_the_platform_home() {
        let Ok(home) = platform_home() else {
            return;
        };
        assert!(home.is_absolute());
        assert_eq!(expand_tilde("~").unwrap(), home);
        assert_eq!(expand_tilde("~/krydd-data").unwrap(), home.join("krydd-data"));
    }

    #[test]
    fn plain_paths_are_not_expanded() {
        assert_eq!(expand_tilde("data/home").unwrap(), PathBuf::from("data/home"));
        assert_eq!(expand_tilde("/srv/krydd").unwrap(), PathBuf::from("/srv/krydd"));
    }
}
