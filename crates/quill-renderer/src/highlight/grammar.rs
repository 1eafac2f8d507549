//! Tokenizer backed by syntect, with the extended grammar set from `two-face`.

use std::sync::LazyLock;

use syntect::parsing::{
    BasicScopeStackOp, ParseState, Scope, ScopeStack, SyntaxReference, SyntaxSet,
};
use syntect::util::LinesWithEndings;

use super::{HighlightError, Token, Tokenizer};

/// syntect's bundled grammars plus TypeScript, TSX, JSX, Kotlin, Swift,
/// TOML, Dockerfile, PowerShell and the rest of the `two-face` set.
static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(two_face::syntax::extra_newlines);

/// Canonical language names mapped to a grammar name and a fallback token.
///
/// The name pins a grammar when several claim the same extension (the plain
/// `JavaScript` grammar and `JavaScript (Babel)` both claim `js`).
const GRAMMARS: &[(&str, &str, &str)] = &[
    ("javascript", "JavaScript", "js"),
    ("jsx", "JavaScript (Babel)", "jsx"),
    ("typescript", "TypeScript", "ts"),
    ("tsx", "TypeScriptReact", "tsx"),
    ("markup", "HTML", "html"),
    ("bash", "Bourne Again Shell (bash)", "sh"),
    ("csharp", "C#", "cs"),
    ("python", "Python", "py"),
    ("ruby", "Ruby", "rb"),
    ("rust", "Rust", "rs"),
    ("markdown", "Markdown", "md"),
    ("kotlin", "Kotlin", "kt"),
    ("powershell", "PowerShell", "ps1"),
];

/// [`Tokenizer`] using syntect syntax definitions.
///
/// Each syntect scope becomes a classified token: the first atom of the
/// scope is the token kind, the remaining atoms its aliases
/// (`keyword.operator.js` → `token keyword operator js`).
#[derive(Clone, Copy, Debug, Default)]
pub struct SyntectTokenizer;

impl SyntectTokenizer {
    fn syntax(language: &str) -> Option<&'static SyntaxReference> {
        match GRAMMARS.iter().find(|(canonical, _, _)| *canonical == language) {
            Some((_, name, token)) => SYNTAXES
                .find_syntax_by_name(name)
                .or_else(|| SYNTAXES.find_syntax_by_token(token)),
            None => SYNTAXES.find_syntax_by_token(language),
        }
    }
}

impl Tokenizer for SyntectTokenizer {
    fn has_grammar(&self, language: &str) -> bool {
        Self::syntax(language).is_some()
    }

    fn tokenize(&self, language: &str, code: &str) -> Result<Vec<Token>, HighlightError> {
        let syntax = Self::syntax(language)
            .ok_or_else(|| HighlightError::UnknownLanguage(language.to_owned()))?;

        let mut state = ParseState::new(syntax);
        let mut scopes = ScopeStack::new();
        let mut tree = TokenTree::default();

        for line in LinesWithEndings::from(code) {
            let ops = state
                .parse_line(line, &SYNTAXES)
                .map_err(|e| HighlightError::Tokenize(e.to_string()))?;

            let mut cursor = 0;
            for (offset, op) in ops {
                tree.plain(slice(line, cursor, offset)?);
                cursor = offset;
                scopes
                    .apply_with_hook(&op, |basic, _| match basic {
                        BasicScopeStackOp::Push(scope) => tree.open(scope),
                        BasicScopeStackOp::Pop => tree.close(),
                    })
                    .map_err(|e| HighlightError::Tokenize(format!("{e:?}")))?;
            }
            tree.plain(slice(line, cursor, line.len())?);
        }

        Ok(tree.finish())
    }
}

fn slice(line: &str, start: usize, end: usize) -> Result<&str, HighlightError> {
    line.get(start..end).ok_or_else(|| {
        HighlightError::Tokenize(format!("scope boundary {start}..{end} is not a char boundary"))
    })
}

/// Open classified token: kind, aliases and content so far.
type Frame = (String, Vec<String>, Vec<Token>);

/// Builds nested tokens from scope push/pop operations.
#[derive(Default)]
struct TokenTree {
    root: Vec<Token>,
    open: Vec<Frame>,
}

impl TokenTree {
    fn content(&mut self) -> &mut Vec<Token> {
        match self.open.last_mut() {
            Some((_, _, content)) => content,
            None => &mut self.root,
        }
    }

    fn plain(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let content = self.content();
        if let Some(Token::Plain(last)) = content.last_mut() {
            last.push_str(text);
        } else {
            content.push(Token::Plain(text.to_owned()));
        }
    }

    fn open(&mut self, scope: Scope) {
        let name = scope.build_string();
        let mut atoms = name.split('.').map(str::to_owned);
        let kind = atoms.next().unwrap_or_default();
        self.open.push((kind, atoms.collect(), Vec::new()));
    }

    fn close(&mut self) {
        if let Some((kind, aliases, content)) = self.open.pop() {
            self.content().push(Token::Classified {
                kind,
                aliases,
                content,
            });
        }
    }

    fn finish(mut self) -> Vec<Token> {
        while !self.open.is_empty() {
            self.close();
        }
        self.root
    }
}
