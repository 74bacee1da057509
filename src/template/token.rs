//! Placeholder spellings.
//!
//! A token has a canonical inner name (`1`, `LOTE`) and three surface
//! forms that templates may use interchangeably:
//!
//! | Form | Example |
//! |------|---------|
//! | Double brace | `{{1}}` |
//! | Single brace | `{1}` |
//! | Bare | `1` |
//!
//! Forms are tried longest first, so `{1}` never matches inside a `{{1}}`
//! slot and a bare `1` only matches when no braced slot exists.

/// Double-brace spelling of the default primary token.
pub const DEFAULT_PRIMARY_TOKEN: &str = "{{1}}";

fn strip_double(token: &str) -> Option<&str> {
    (token.len() > 4 && token.starts_with("{{") && token.ends_with("}}")).then(|| &token[2..token.len() - 2])
}

fn strip_single(token: &str) -> Option<&str> {
    (token.len() > 2 && token.starts_with('{') && token.ends_with('}')).then(|| &token[1..token.len() - 1])
}

/// Surface forms to search for, in match priority order.
///
/// ```
/// use etiqueta::template::spellings;
///
/// assert_eq!(spellings("{{1}}"), ["{{1}}", "{1}", "1"]);
/// assert_eq!(spellings("{1}"), ["{{1}}", "{1}", "1"]);
/// assert_eq!(spellings("1"), ["{{1}}", "{1}", "1"]);
/// ```
pub fn spellings(token: &str) -> [String; 3] {
    let inner = normalize_token(token);
    [
        format!("{{{{{}}}}}", inner),
        format!("{{{}}}", inner),
        inner.to_string(),
    ]
}

/// Canonical name of a token: one pair of double or single braces removed.
pub fn normalize_token(token: &str) -> &str {
    strip_double(token)
        .or_else(|| strip_single(token))
        .unwrap_or(token)
}

/// Whether some entry of `variables` supplies `token` under any spelling.
pub fn variables_cover_token(token: &str, variables: &[(String, String)]) -> bool {
    let wanted = normalize_token(token);
    variables
        .iter()
        .any(|(name, _)| normalize_token(name) == wanted)
}
