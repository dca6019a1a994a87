//! Pure string transforms used by the renderer.

const MODEL_PREFIX: &str = "claude-";

/// Abbreviate a path for display, substituting the user's home directory
/// with `~` and shortening every segment but the last to its first character.
///
/// `/home/user/projects/myapp` -> `~/p/myapp`, `/foo/bar/baz` -> `/f/b/baz`.
pub fn abbreviate_path(path: &str) -> String {
    let home = dirs::home_dir();
    let home = home.as_deref().and_then(|h| h.to_str());
    abbreviate_path_with_home(path, home)
}

/// Same as [`abbreviate_path`] with the home directory passed in explicitly.
pub fn abbreviate_path_with_home(path: &str, home: Option<&str>) -> String {
    let (prefix, rest) = match home.and_then(|h| strip_home(path, h)) {
        Some(rest) => ("~", rest),
        None => ("", path),
    };

    let segments: Vec<&str> = rest.split('/').collect();
    if segments.len() < 2 {
        return format!("{}{}", prefix, rest);
    }

    let last = segments.len() - 1;
    let abbreviated: Vec<&str> = segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            if i == last {
                segment
            } else {
                first_char(segment)
            }
        })
        .collect();

    format!("{}{}", prefix, abbreviated.join("/"))
}

/// Strip `home` from the front of `path`, only on a component boundary.
fn strip_home<'a>(path: &'a str, home: &str) -> Option<&'a str> {
    let home = home.trim_end_matches('/');
    if home.is_empty() {
        return None;
    }
    let rest = path.strip_prefix(home)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

fn first_char(segment: &str) -> &str {
    match segment.char_indices().nth(1) {
        Some((end, _)) => &segment[..end],
        None => segment,
    }
}

/// Drop the `claude-` vendor prefix from a model id, at most once.
pub fn normalize_model_id(id: &str) -> &str {
    id.strip_prefix(MODEL_PREFIX).unwrap_or(id)
}
