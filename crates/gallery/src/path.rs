//! Expands user-supplied directory arguments (`--source`, `extra_roots`,
//! export targets) the same way everywhere: `$VAR`/`${VAR}` references, a
//! leading `~`, then resolution against the caller's working directory.
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use directories_next::BaseDirs;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PathResolver {
    cwd: PathBuf,
}

impl PathResolver {
    pub fn new() -> Result<Self> {
        let cwd = env::current_dir().context("failed to resolve current working directory")?;
        Ok(Self { cwd })
    }

    pub fn with_cwd<P: Into<PathBuf>>(cwd: P) -> Self {
        Self { cwd: cwd.into() }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn expand(&self, input: &str) -> Result<PathBuf> {
        let with_vars = expand_vars(input)?;
        let path = PathBuf::from(expand_tilde(&with_vars)?);
        debug!(original = %input, expanded = %path.display(), "expanded sub path");
        Ok(path)
    }

    /// Expands `input` and anchors relative results at the working directory.
    pub fn resolve(&self, input: &str) -> Result<PathBuf> {
        let expanded = self.expand(input)?;
        if expanded.as_os_str().is_empty() {
            bail!("path must not be empty");
        }
        if expanded.is_absolute() {
            return Ok(expanded);
        }
        Ok(self.cwd.join(expanded))
    }

    pub fn resolve_path(&self, input: &Path) -> Result<PathBuf> {
        let raw = input
            .to_str()
            .ok_or_else(|| anyhow!("path '{}' is not valid UTF-8", input.display()))?;
        self.resolve(raw)
    }
}

fn expand_tilde(input: &str) -> Result<String> {
    let rest = match input.strip_prefix('~') {
        Some(rest) => rest,
        None => return Ok(input.to_string()),
    };
    if !rest.is_empty() && !rest.starts_with('/') {
        bail!("user-specific home expansion ('{input}') is not supported");
    }

    let base_dirs =
        BaseDirs::new().ok_or_else(|| anyhow!("unable to determine home directory for '~'"))?;
    let mut path = base_dirs.home_dir().to_path_buf();
    if let Some(tail) = rest.strip_prefix('/') {
        path.push(tail);
    }
    Ok(path.to_string_lossy().into_owned())
}

fn expand_vars(input: &str) -> Result<String> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => output.push(chars.next().unwrap_or('\\')),
            '$' => match chars.peek().copied() {
                Some('{') => {
                    chars.next();
                    let mut name = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        bail!("missing closing '}}' in environment variable reference");
                    }
                    output.push_str(&lookup(&name)?);
                }
                Some(c) if is_var_char(c) => {
                    let mut name = String::new();
                    while let Some(&c) = chars.peek() {
                        if !is_var_char(c) {
                            break;
                        }
                        name.push(c);
                        chars.next();
                    }
                    output.push_str(&lookup(&name)?);
                }
                _ => output.push('$'),
            },
            other => output.push(other),
        }
    }

    Ok(output)
}

fn lookup(name: &str) -> Result<String> {
    if name.is_empty() {
        bail!("environment variable name must not be empty");
    }
    env::var(name).map_err(|_| anyhow!("environment variable '{name}' is not set"))
}

fn is_var_char(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_braced_and_bare_variables() {
        env::set_var("TOYBOX_PATH_TEST", "value");
        let resolver = PathResolver::with_cwd("/");
        assert_eq!(
            resolver.expand("/tmp/$TOYBOX_PATH_TEST/${TOYBOX_PATH_TEST}x").unwrap(),
            PathBuf::from("/tmp/value/valuex")
        );
        env::remove_var("TOYBOX_PATH_TEST");
    }

    #[test]
    fn keeps_escaped_and_trailing_dollar() {
        let resolver = PathResolver::with_cwd("/");
        assert_eq!(
            resolver.expand("/tmp/\\$HOME/$").unwrap(),
            PathBuf::from("/tmp/$HOME/$")
        );
    }

    #[test]
    fn fails_on_missing_variable() {
        let resolver = PathResolver::with_cwd("/");
        let err = resolver.expand("/tmp/$UNSET_TOYBOX_VAR").unwrap_err();
        assert!(err.to_string().contains("UNSET_TOYBOX_VAR"));
    }

    #[test]
    fn expands_home_prefix() {
        let resolver = PathResolver::with_cwd("/");
        assert!(resolver.expand("~").unwrap().is_absolute());
        assert!(resolver.expand("~other/x").is_err());
    }

    #[test]
    fn anchors_relative_paths_at_cwd() {
        let resolver = PathResolver::with_cwd("/work");
        assert_eq!(resolver.resolve("subs").unwrap(), PathBuf::from("/work/subs"));
        assert_eq!(resolver.resolve("/abs").unwrap(), PathBuf::from("/abs"));
        assert!(resolver.resolve("").is_err());
    }
}
