//! # Label Templates
//!
//! Fixed-layout ZPL documents (`.prn` files exported from the label
//! designer) with placeholders for the values of one print.
//!
//! ## Substitution Rules
//!
//! - The primary token (default `{{1}}`) is replaced first, then the named
//!   tokens in the order the caller supplied them.
//! - For each token the spellings from [`spellings`] (`{{name}}`, `{name}`,
//!   `name`) are tried in order; the first one present in the document wins.
//! - Only the **first** occurrence of that spelling is replaced. Templates
//!   have one placeholder per pre-printed slot; a document that repeats a
//!   placeholder keeps its later occurrences verbatim.
//! - Every supplied token must match somewhere, otherwise the whole
//!   substitution fails with [`EtiquetaError::MissingToken`].
//!
//! ```
//! use etiqueta::template::Template;
//!
//! let template = Template::new("^XA^FD{{1}}^FS^XZ");
//! assert_eq!(template.apply(Some("ABC123"), &[])?, "^XA^FDABC123^FS^XZ");
//! # Ok::<(), etiqueta::EtiquetaError>(())
//! ```
//!
//! ## Trusted Root
//!
//! Template paths come from HTTP callers, so they are resolved against a
//! [`TemplateRoot`] and rejected when they escape it.

mod token;

pub use token::{DEFAULT_PRIMARY_TOKEN, normalize_token, spellings, variables_cover_token};

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::EtiquetaError;

/// A template document and the token that receives the primary value.
#[derive(Debug, Clone)]
pub struct Template {
    content: String,
    primary_token: String,
    path: Option<PathBuf>,
}

impl Template {
    /// Template from in-memory content with the default primary token.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            primary_token: DEFAULT_PRIMARY_TOKEN.to_string(),
            path: None,
        }
    }

    /// Read a template file as UTF-8, dropping a leading byte order mark.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EtiquetaError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            EtiquetaError::Template(format!("cannot read {}: {}", path.display(), e))
        })?;
        let content = raw.strip_prefix('\u{feff}').unwrap_or(&raw).to_string();

        Ok(Self {
            path: Some(path.to_path_buf()),
            ..Self::new(content)
        })
    }

    /// Replace the token that receives the primary value.
    pub fn with_primary_token(mut self, token: impl Into<String>) -> Self {
        self.primary_token = token.into();
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn primary_token(&self) -> &str {
        &self.primary_token
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Substitute `primary` and `variables` into the document.
    pub fn apply(
        &self,
        primary: Option<&str>,
        variables: &[(String, String)],
    ) -> Result<String, EtiquetaError> {
        let mut replacements: Vec<(&str, &str)> = Vec::with_capacity(variables.len() + 1);
        if let Some(value) = primary {
            replacements.push((self.primary_token.as_str(), value));
        }
        replacements.extend(variables.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        apply(&self.content, &replacements)
    }
}

/// Substitute `(token, value)` pairs into `content` in order.
///
/// Fails with the supplied spellings of every token that matched nowhere.
pub fn apply(content: &str, replacements: &[(&str, &str)]) -> Result<String, EtiquetaError> {
    // An empty spelling matches at offset 0 of any document
    if let Some((token, _)) = replacements.iter().find(|(token, _)| token.trim().is_empty()) {
        return Err(EtiquetaError::Template(format!(
            "token names cannot be empty (got {:?})",
            token
        )));
    }

    let mut output = content.to_string();
    let mut matched: HashSet<&str> = HashSet::new();

    for &(token, value) in replacements {
        if let Some(spelling) = spellings(token).into_iter().find(|s| output.contains(s.as_str())) {
            output = output.replacen(&spelling, value, 1);
            matched.insert(normalize_token(token));
            debug!(token, spelling = %spelling, "token substituted");
        }
    }

    let missing: Vec<String> = replacements
        .iter()
        .filter(|(token, _)| !matched.contains(normalize_token(token)))
        .map(|(token, _)| token.to_string())
        .collect();

    if missing.is_empty() {
        Ok(output)
    } else {
        Err(EtiquetaError::MissingToken(missing))
    }
}

/// Directory that template paths must stay inside.
#[derive(Debug, Clone)]
pub struct TemplateRoot {
    root: PathBuf,
}

impl TemplateRoot {
    /// Use `root` as the trusted directory. It must exist.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, EtiquetaError> {
        let root = root.as_ref();
        let root = root.canonicalize().map_err(|e| {
            EtiquetaError::Template(format!("template root {}: {}", root.display(), e))
        })?;
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve a caller-supplied template path.
    ///
    /// Relative paths are taken from the root. Symlinks and `..` are
    /// resolved before the containment check.
    pub fn resolve(&self, value: &str) -> Result<PathBuf, EtiquetaError> {
        let candidate = Path::new(value);
        let candidate = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        };

        let resolved = candidate.canonicalize().map_err(|_| {
            EtiquetaError::Template(format!("template not found: {}", candidate.display()))
        })?;

        if !resolved.starts_with(&self.root) {
            return Err(EtiquetaError::TemplateOutOfBounds {
                path: resolved,
                root: self.root.clone(),
            });
        }

        if !resolved.is_file() {
            return Err(EtiquetaError::Template(format!(
                "template is not a regular file: {}",
                resolved.display()
            )));
        }

        Ok(resolved)
    }

    /// Resolve and read a template.
    pub fn load(&self, value: &str) -> Result<Template, EtiquetaError> {
        Template::load(self.resolve(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_primary_token_substitution() {
        let template = Template::new("^XA^FD{{1}}^FS^XZ");
        assert_eq!(template.apply(Some("ABC123"), &[]).unwrap(), "^XA^FDABC123^FS^XZ");
    }

    #[test]
    fn test_named_tokens_any_spelling() {
        let template = Template::new("^XA^FD{{1}}^FS^FD{2}^FS^FDLOTE^FS^XZ");
        let out = template
            .apply(Some("SN1"), &vars(&[("{{2}}", "OP77"), ("{LOTE}", "L9")]))
            .unwrap();
        assert_eq!(out, "^XA^FDSN1^FS^FDOP77^FS^FDL9^FS^XZ");
    }

    #[test]
    fn test_only_first_occurrence_replaced() {
        let template = Template::new("^FD{{1}}^FS^FD{{1}}^FS");
        assert_eq!(template.apply(Some("A"), &[]).unwrap(), "^FDA^FS^FD{{1}}^FS");
    }

    #[test]
    fn test_missing_token_named_exactly() {
        let template = Template::new("^XA^FD{{1}}^FS^XZ");
        let err = template.apply(Some("A"), &vars(&[("{{9}}", "x")])).unwrap_err();
        match err {
            EtiquetaError::MissingToken(tokens) => assert_eq!(tokens, vec!["{{9}}".to_string()]),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_partial_substitution_rejected() {
        let template = Template::new("^FD{{1}}^FS");
        assert!(template.apply(Some("A"), &vars(&[("2", "B")])).is_err());
    }

    #[test]
    fn test_no_unresolved_spellings_remain() {
        let template = Template::new("^FD{{1}}^FS^FD{{2}}^FS^FD{{3}}^FS");
        let out = template
            .apply(Some("a"), &vars(&[("2", "b"), ("{3}", "c")]))
            .unwrap();
        for token in ["1", "2", "3"] {
            for spelling in spellings(token) {
                assert!(!out.contains(&spelling), "{} left in {}", spelling, out);
            }
        }
    }

    #[test]
    fn test_repeating_a_token_is_idempotent() {
        let template = Template::new("^FD{{1}}^FS^FD{{2}}^FS");
        let once = template.apply(None, &vars(&[("2", "X")])).unwrap();
        let twice = template.apply(None, &vars(&[("2", "X"), ("{{2}}", "X")])).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_tokens_applied_in_caller_order() {
        // The primary value introduces a {{2}} that the next pass picks up
        // before the template's own {{2}}.
        let template = Template::new("^FD{{1}}^FS^FD{{2}}^FS");
        let out = template.apply(Some("{{2}}"), &vars(&[("{{2}}", "B")])).unwrap();
        assert_eq!(out, "^FDB^FS^FD{{2}}^FS");
    }

    #[test]
    fn test_custom_primary_token() {
        let template = Template::new("^FD<SERIAL>^FS").with_primary_token("<SERIAL>");
        assert_eq!(template.apply(Some("S9"), &[]).unwrap(), "^FDS9^FS");
    }

    #[test]
    fn test_empty_tokens_rejected() {
        let template = Template::new("^XA^FD{{1}}^FS^XZ");
        assert!(matches!(
            template.clone().with_primary_token("").apply(Some("SN1"), &[]),
            Err(EtiquetaError::Template(_))
        ));
        assert!(matches!(
            template.apply(Some("A"), &vars(&[(" ", "B")])),
            Err(EtiquetaError::Template(_))
        ));
    }

    #[test]
    fn test_load_strips_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label.prn");
        std::fs::write(&path, "\u{feff}^XA^FD{{1}}^FS^XZ").unwrap();

        let template = Template::load(&path).unwrap();
        assert_eq!(template.content(), "^XA^FD{{1}}^FS^XZ");
        assert_eq!(template.path(), Some(path.as_path()));
    }

    #[test]
    fn test_root_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("models")).unwrap();
        std::fs::write(dir.path().join("models/serial.prn"), "^XA^XZ").unwrap();

        let root = TemplateRoot::new(dir.path()).unwrap();
        let resolved = root.resolve("models/serial.prn").unwrap();
        assert!(resolved.ends_with("models/serial.prn"));
    }

    #[test]
    fn test_root_rejects_traversal() {
        let outer = tempfile::tempdir().unwrap();
        let root_dir = outer.path().join("templates");
        std::fs::create_dir(&root_dir).unwrap();
        std::fs::write(outer.path().join("secret.prn"), "^XA^XZ").unwrap();

        let root = TemplateRoot::new(&root_dir).unwrap();
        assert!(matches!(
            root.resolve("../secret.prn"),
            Err(EtiquetaError::TemplateOutOfBounds { .. })
        ));

        let absolute = outer.path().join("secret.prn");
        assert!(matches!(
            root.resolve(absolute.to_str().unwrap()),
            Err(EtiquetaError::TemplateOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_root_rejects_missing_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let root = TemplateRoot::new(dir.path()).unwrap();

        assert!(matches!(root.resolve("nope.prn"), Err(EtiquetaError::Template(_))));
        assert!(matches!(root.resolve("sub"), Err(EtiquetaError::Template(_))));
    }
}
