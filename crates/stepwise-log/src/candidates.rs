//! Ordered fallback evaluation and candidate path expansion.
//!
//! `first_success` is the "try locations in priority order" primitive: the
//! first candidate whose attempt succeeds wins, and every earlier failure is
//! kept so the caller can explain why nothing worked.

use std::path::PathBuf;

/// Try `attempt` on each candidate in order and return the first success.
///
/// On total failure, returns every candidate paired with its error, in order.
pub fn first_success<I, T, E, F>(candidates: I, mut attempt: F) -> Result<T, Vec<(I::Item, E)>>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> Result<T, E>,
{
    let mut failures = Vec::new();
    for candidate in candidates {
        match attempt(&candidate) {
            Ok(value) => return Ok(value),
            Err(err) => failures.push((candidate, err)),
        }
    }
    Err(failures)
}

/// Expand `~` and `$VAR` / `${VAR}` in a configured candidate path using the
/// process environment.
pub fn expand(raw: &str) -> Result<PathBuf, String> {
    expand_with(raw, |name| std::env::var(name).ok())
}

/// Expand `raw` with a caller-supplied variable lookup.
///
/// A leading `~` resolves through `HOME`, then `USERPROFILE`. An unknown
/// variable makes the whole candidate unusable.
pub fn expand_with<L>(raw: &str, lookup: L) -> Result<PathBuf, String>
where
    L: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    if let Some(stripped) = rest.strip_prefix('~') {
        if stripped.is_empty() || stripped.starts_with('/') || stripped.starts_with('\\') {
            let home = lookup("HOME")
                .or_else(|| lookup("USERPROFILE"))
                .ok_or_else(|| format!("cannot expand '~' in '{}': no home directory", raw))?;
            out.push_str(&home);
            rest = stripped;
        }
    }

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            let end = braced
                .find('}')
                .ok_or_else(|| format!("unterminated '${{' in '{}'", raw))?;
            (&braced[..end], end + 2)
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };

        if name.is_empty() {
            // A lone '$' is literal.
            out.push('$');
            rest = after;
            continue;
        }

        let value = lookup(name)
            .ok_or_else(|| format!("environment variable '{}' is not set (in '{}')", name, raw))?;
        out.push_str(&value);
        rest = &after[consumed..];
    }
    out.push_str(rest);

    Ok(PathBuf::from(out))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{expand_with, first_success};

    fn env(name: &str) -> Option<String> {
        match name {
            "HOME" => Some("/home/dev".to_string()),
            "TEMP" => Some("/tmp".to_string()),
            _ => None,
        }
    }

    #[test]
    fn first_success_stops_at_first_ok() {
        let mut tried = Vec::new();
        let result = first_success(vec![1, 2, 3], |n| {
            tried.push(*n);
            if *n >= 2 { Ok(n * 10) } else { Err("too small") }
        });
        assert_eq!(result, Ok(20));
        assert_eq!(tried, vec![1, 2], "candidates after the winner must not be tried");
    }

    #[test]
    fn first_success_reports_every_failure_in_order() {
        let result: Result<(), _> = first_success(vec!["a", "b"], |c| Err(format!("{} failed", c)));
        let failures = result.unwrap_err();
        assert_eq!(failures, vec![("a", "a failed".to_string()), ("b", "b failed".to_string())]);
    }

    #[test]
    fn expands_home_and_variables() {
        assert_eq!(
            expand_with("~/logs/setup.log", env).unwrap(),
            PathBuf::from("/home/dev/logs/setup.log")
        );
        assert_eq!(
            expand_with("$TEMP/setup.log", env).unwrap(),
            PathBuf::from("/tmp/setup.log")
        );
        assert_eq!(
            expand_with("${TEMP}x/setup.log", env).unwrap(),
            PathBuf::from("/tmpx/setup.log")
        );
    }

    #[test]
    fn tilde_inside_a_name_is_literal() {
        assert_eq!(expand_with("~backup/a.log", env).unwrap(), PathBuf::from("~backup/a.log"));
    }

    #[test]
    fn unknown_variable_is_an_error() {
        let err = expand_with("$LOCALAPPDATA/setup.log", env).unwrap_err();
        assert!(err.contains("LOCALAPPDATA"));
    }

    #[test]
    fn lone_dollar_is_kept() {
        assert_eq!(expand_with("/logs/$/a.log", env).unwrap(), PathBuf::from("/logs/$/a.log"));
    }
}
