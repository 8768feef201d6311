//! Tokenizer for the declaration language, generated with logos.
//!
//! Lossless: concatenating the text of every token reproduces the input,
//! comments and whitespace included. Bytes no rule accepts become ERROR
//! tokens rather than stopping the scan.

use super::syntax_kind::SyntaxKind;
use logos::Logos;
use text_size::TextSize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

/// Streams [`Token`]s over a source string.
pub struct Lexer<'a> {
    raw: logos::Lexer<'a, RawKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            raw: RawKind::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let raw = self.raw.next()?;
        let text = self.raw.slice();
        let offset = TextSize::new(self.raw.span().start as u32);
        let kind = match raw {
            Ok(RawKind::BLOCK_COMMENT) if is_doc_comment(text) => SyntaxKind::DOC_COMMENT,
            Ok(raw) => raw.kind(),
            Err(()) => SyntaxKind::ERROR,
        };
        Some(Token { kind, text, offset })
    }
}

pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

// `/**/` is an empty block comment.
fn is_doc_comment(text: &str) -> bool {
    text.len() > 4 && text.starts_with("/**")
}

/// Runs from `/*` to the first `*/`. An unterminated comment swallows the
/// rest of the input as one ERROR token.
fn block_comment(lex: &mut logos::Lexer<'_, RawKind>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(lex.remainder().len());
            false
        }
    }
}

/// Declares the logos enum with variants named after the [`SyntaxKind`]
/// they produce, so the two cannot drift apart.
macro_rules! lexicon {
    ($($kind:ident = $rule:ident $pattern:tt $(with $callback:ident)?),* $(,)?) => {
        #[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
        #[allow(non_camel_case_types, clippy::upper_case_acronyms)]
        enum RawKind {
            $(
                #[$rule($pattern $(, $callback)?)]
                $kind,
            )*
        }

        impl RawKind {
            fn kind(self) -> SyntaxKind {
                match self {
                    $(RawKind::$kind => SyntaxKind::$kind,)*
                }
            }
        }
    };
}

lexicon! {
    WHITESPACE = regex r"[ \t\r\n\x0C]+",
    LINE_COMMENT = regex r"//[^\n]*",
    BLOCK_COMMENT = token "/*" with block_comment,

    IDENT = regex r"[a-zA-Z_$][a-zA-Z0-9_$]*",
    INT_LITERAL = regex r"[0-9][0-9_]*|0[xX][0-9a-fA-F_]+|0[bB][01_]+",
    LONG_LITERAL = regex r"([0-9][0-9_]*|0[xX][0-9a-fA-F_]+|0[bB][01_]+)[lL]",
    FLOAT_LITERAL = regex r"([0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9]+)?|\.[0-9][0-9_]*([eE][+-]?[0-9]+)?|[0-9][0-9_]*[eE][+-]?[0-9]+|[0-9][0-9_]*)[fF]",
    DOUBLE_LITERAL = regex r"([0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9]+)?|\.[0-9][0-9_]*([eE][+-]?[0-9]+)?|[0-9][0-9_]*[eE][+-]?[0-9]+)[dD]?|[0-9][0-9_]*[dD]",
    CHAR_LITERAL = regex r"'([^'\\\n]|\\[^\n])*'",
    STRING_LITERAL = regex r#""([^"\\\n]|\\[^\n])*""#,

    // Longest match wins, so `>>>` never splits into `>>` `>`.
    USHR = token ">>>",
    SHR = token ">>",
    SHL = token "<<",
    LT_EQ = token "<=",
    GT_EQ = token ">=",
    EQ_EQ = token "==",
    BANG_EQ = token "!=",
    AMP_AMP = token "&&",
    PIPE_PIPE = token "||",
    L_BRACE = token "{",
    R_BRACE = token "}",
    L_BRACKET = token "[",
    R_BRACKET = token "]",
    L_PAREN = token "(",
    R_PAREN = token ")",
    SEMICOLON = token ";",
    COMMA = token ",",
    DOT = token ".",
    AT = token "@",
    EQ = token "=",
    QUESTION = token "?",
    COLON = token ":",
    PLUS = token "+",
    MINUS = token "-",
    STAR = token "*",
    SLASH = token "/",
    PERCENT = token "%",
    AMP = token "&",
    PIPE = token "|",
    CARET = token "^",
    TILDE = token "~",
    BANG = token "!",
    LT = token "<",
    GT = token ">",

    BOOLEAN_KW = token "boolean",
    BYTE_KW = token "byte",
    CHAR_KW = token "char",
    SHORT_KW = token "short",
    INT_KW = token "int",
    LONG_KW = token "long",
    FLOAT_KW = token "float",
    DOUBLE_KW = token "double",
    VOID_KW = token "void",
    PUBLIC_KW = token "public",
    PROTECTED_KW = token "protected",
    PRIVATE_KW = token "private",
    STATIC_KW = token "static",
    FINAL_KW = token "final",
    TRANSIENT_KW = token "transient",
    VOLATILE_KW = token "volatile",
    ABSTRACT_KW = token "abstract",
    CLASS_KW = token "class",
    INTERFACE_KW = token "interface",
    NEW_KW = token "new",
    TRUE_KW = token "true",
    FALSE_KW = token "false",
    NULL_KW = token "null",
}
