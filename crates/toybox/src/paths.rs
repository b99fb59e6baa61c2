use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories_next::ProjectDirs;

pub const ENV_CONFIG_DIR: &str = "TOYBOX_CONFIG_DIR";
pub const ENV_DATA_DIR: &str = "TOYBOX_DATA_DIR";
pub const ENV_SHARE_DIR: &str = "TOYBOX_SHARE_DIR";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "Toybox";
const APPLICATION: &str = "toybox";

const SUBS_DIR: &str = "subs";

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
    share_dir: PathBuf,
}

impl AppPaths {
    pub fn discover() -> Result<Self> {
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
            .ok_or_else(|| anyhow!("failed to determine user directories"))?;

        let config_dir =
            env_dir(ENV_CONFIG_DIR).unwrap_or_else(|| project_dirs.config_dir().into());
        let data_dir = env_dir(ENV_DATA_DIR).unwrap_or_else(|| project_dirs.data_dir().into());
        let share_dir =
            env_dir(ENV_SHARE_DIR).unwrap_or_else(|| system_share_dir(&project_dirs));

        Ok(Self {
            config_dir,
            data_dir,
            share_dir,
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn share_dir(&self) -> &Path {
        &self.share_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Pack search roots, most user-specific first.
    pub fn sub_roots(&self) -> Vec<PathBuf> {
        vec![
            self.config_dir.join(SUBS_DIR),
            self.data_dir.join(SUBS_DIR),
            self.share_dir.join(SUBS_DIR),
        ]
    }
}

/// Non-empty directory override from the environment.
fn env_dir(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn system_share_dir(project_dirs: &ProjectDirs) -> PathBuf {
    if cfg!(target_family = "unix") {
        PathBuf::from("/usr/share").join(APPLICATION)
    } else {
        project_dirs.data_dir().to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

    fn env_lock() -> &'static Mutex<()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    struct EnvGuard {
        key: &'static str,
        previous: Option<OsString>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &Path) -> Self {
            let previous = env::var_os(key);
            env::set_var(key, value);
            Self { key, previous }
        }

        fn clear(key: &'static str) -> Self {
            let previous = env::var_os(key);
            env::remove_var(key);
            Self { key, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match self.previous.take() {
                Some(value) => env::set_var(self.key, value),
                None => env::remove_var(self.key),
            }
        }
    }

    #[test]
    fn env_overrides_take_precedence() {
        let _guard = env_lock().lock().unwrap();
        let root = TempDir::new().unwrap();
        let config_dir = root.path().join("config");
        let data_dir = root.path().join("data");
        let share_dir = root.path().join("share");

        let _config = EnvGuard::set(ENV_CONFIG_DIR, &config_dir);
        let _data = EnvGuard::set(ENV_DATA_DIR, &data_dir);
        let _share = EnvGuard::set(ENV_SHARE_DIR, &share_dir);

        let paths = AppPaths::discover().unwrap();

        assert_eq!(paths.config_dir(), config_dir.as_path());
        assert_eq!(paths.data_dir(), data_dir.as_path());
        assert_eq!(paths.share_dir(), share_dir.as_path());
        assert_eq!(paths.sub_roots()[2], share_dir.join("subs"));
    }

    #[test]
    fn empty_env_value_falls_back_to_default() {
        let _guard = env_lock().lock().unwrap();
        let root = TempDir::new().unwrap();
        let _config = EnvGuard::set(ENV_CONFIG_DIR, Path::new(""));
        let _data = EnvGuard::set(ENV_DATA_DIR, &root.path().join("data"));

        let paths = AppPaths::discover().unwrap();

        assert!(!paths.config_dir().as_os_str().is_empty());
        assert_eq!(paths.data_dir(), root.path().join("data").as_path());
    }

    #[cfg(target_family = "unix")]
    #[test]
    fn default_share_dir_on_unix_matches_usr_share() {
        let _guard = env_lock().lock().unwrap();
        let root = TempDir::new().unwrap();
        let _config = EnvGuard::set(ENV_CONFIG_DIR, &root.path().join("config"));
        let _data = EnvGuard::set(ENV_DATA_DIR, &root.path().join("data"));
        let _share = EnvGuard::clear(ENV_SHARE_DIR);

        let paths = AppPaths::discover().unwrap();

        assert_eq!(paths.share_dir(), Path::new("/usr/share/toybox"));
    }
}
