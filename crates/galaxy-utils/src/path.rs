//! Expansion of user-supplied paths such as `target_path = "~/galaxy/$PROFILE"`.

use std::{env, path::PathBuf};

use crate::error::{PathError, PathResult};

pub fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/"))
}

/// `$XDG_CONFIG_HOME`, falling back to `~/.config`.
pub fn xdg_config_home() -> PathBuf {
    env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"))
}

/// Expands `~`, `$VAR` and `${VAR}` and makes the result absolute against the
/// current directory.
///
/// ```
/// use galaxy_utils::path::resolve_path;
///
/// assert!(resolve_path("/tmp/galaxy-light").unwrap().is_absolute());
/// ```
pub fn resolve_path(input: &str) -> PathResult<PathBuf> {
    let input = input.trim();
    if input.is_empty() {
        return Err(PathError::Empty);
    }

    let path = PathBuf::from(expand(input)?);
    if path.is_absolute() {
        return Ok(path);
    }

    env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|source| PathError::CurrentDir { source })
}

fn expand(input: &str) -> PathResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    if let Some(after) = rest.strip_prefix('~') {
        if after.is_empty() || after.starts_with('/') {
            out.push_str(&home_dir().to_string_lossy());
            rest = after;
        }
    }

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let (name, remainder) = if let Some(braced) = after.strip_prefix('{') {
            let end = braced.find('}').ok_or_else(|| {
                PathError::UnclosedVariable {
                    input: rest[pos..].to_string(),
                }
            })?;
            (&braced[..end], &braced[end + 1..])
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], &after[end..])
        };

        if name.is_empty() {
            out.push('$');
        } else {
            let value = env::var(name).map_err(|_| {
                PathError::MissingEnvVar {
                    var: name.to_string(),
                    input: input.to_string(),
                }
            })?;
            out.push_str(&value);
        }
        rest = remainder;
    }

    out.push_str(rest);
    Ok(out)
}
