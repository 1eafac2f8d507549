//! Language names, aliases and display labels.

/// Code block languages that are never highlighted or labelled.
pub const IGNORED_LANGUAGES: &[&str] = &["none", "plain", "plaintext", "text"];

/// Shorthand names mapped to canonical grammar names.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("jsx", "jsx"),
    ("ts", "typescript"),
    ("tsx", "tsx"),
    ("html", "markup"),
    ("xml", "markup"),
    ("svg", "markup"),
    ("yml", "yaml"),
    ("py", "python"),
    ("rb", "ruby"),
    ("sh", "bash"),
    ("shell", "bash"),
    ("zsh", "bash"),
    ("rs", "rust"),
    ("golang", "go"),
    ("kt", "kotlin"),
    ("c++", "cpp"),
    ("cs", "csharp"),
    ("c#", "csharp"),
    ("ps1", "powershell"),
    ("md", "markdown"),
    ("docker", "dockerfile"),
];

/// Display labels that differ from the uppercased language name.
const LANGUAGE_LABELS: &[(&str, &str)] = &[
    ("javascript", "JS"),
    ("typescript", "TS"),
    ("markdown", "MD"),
    ("md", "MD"),
    ("csharp", "C#"),
    ("cpp", "CPP"),
];

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, value)| *value)
}

/// Check whether a (lowercase) language is in the ignore list.
#[must_use]
pub fn is_ignored(language: &str) -> bool {
    IGNORED_LANGUAGES.contains(&language)
}

/// Canonical grammar name for a (lowercase) language.
#[must_use]
pub fn canonical_language(language: &str) -> &str {
    lookup(LANGUAGE_ALIASES, language).unwrap_or(language)
}

/// Display label for a (lowercase) language, e.g. `js` → `JS`, `csharp` → `C#`.
#[must_use]
pub fn language_label(language: &str) -> String {
    lookup(LANGUAGE_LABELS, language)
        .or_else(|| lookup(LANGUAGE_LABELS, canonical_language(language)))
        .map_or_else(|| language.to_uppercase(), str::to_owned)
}
