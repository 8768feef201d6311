//! Syntax kinds for the arena syntax tree
//!
//! This enum defines all possible node and token kinds in the syntax tree.
//! Tokens are leaves (identifiers, keywords, punctuation, trivia), nodes are
//! composite (classes, fields, types, expressions).

/// All syntax kinds (tokens and nodes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,
    DOC_COMMENT,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,
    INT_LITERAL,    // 42, 0x2A, 052, 0b101010
    LONG_LITERAL,   // 42L
    FLOAT_LITERAL,  // 4.2f
    DOUBLE_LITERAL, // 4.2, 4e2, 4d
    CHAR_LITERAL,   // 'c'
    STRING_LITERAL, // "text"

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,   // {
    R_BRACE,   // }
    L_BRACKET, // [
    R_BRACKET, // ]
    L_PAREN,   // (
    R_PAREN,   // )
    SEMICOLON, // ;
    COMMA,     // ,
    DOT,       // .
    AT,        // @
    EQ,        // =
    QUESTION,  // ?
    COLON,     // :
    PLUS,      // +
    MINUS,     // -
    STAR,      // *
    SLASH,     // /
    PERCENT,   // %
    AMP,       // &
    PIPE,      // |
    CARET,     // ^
    TILDE,     // ~
    BANG,      // !
    LT,        // <
    GT,        // >
    LT_EQ,     // <=
    GT_EQ,     // >=
    EQ_EQ,     // ==
    BANG_EQ,   // !=
    AMP_AMP,   // &&
    PIPE_PIPE, // ||
    SHL,       // <<
    SHR,       // >>
    USHR,      // >>>

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    // Primitive types
    BOOLEAN_KW,
    BYTE_KW,
    CHAR_KW,
    SHORT_KW,
    INT_KW,
    LONG_KW,
    FLOAT_KW,
    DOUBLE_KW,
    VOID_KW,

    // Modifiers
    PUBLIC_KW,
    PROTECTED_KW,
    PRIVATE_KW,
    STATIC_KW,
    FINAL_KW,
    TRANSIENT_KW,
    VOLATILE_KW,
    ABSTRACT_KW,

    // Declarations and expressions
    CLASS_KW,
    INTERFACE_KW,
    NEW_KW,
    TRUE_KW,
    FALSE_KW,
    NULL_KW,

    /// Lexer error or parse recovery node
    ERROR,

    // =========================================================================
    // NODES
    // =========================================================================
    FILE,
    /// Parentless root of a standalone fragment (expression or type text)
    DUMMY_HOLDER,
    CLASS,
    METHOD,
    FIELD,
    MODIFIER_LIST,
    ANNOTATION,
    TYPE,
    TYPE_ARGS,

    // Expressions
    LITERAL_EXPR,
    REFERENCE_EXPR,
    PAREN_EXPR,
    PREFIX_EXPR,
    BINARY_EXPR,
    CONDITIONAL_EXPR,
    CAST_EXPR,
    CALL_EXPR,
    NEW_EXPR,
    ARRAY_INITIALIZER,
    ARG_LIST,
}

impl SyntaxKind {
    /// Whitespace and comments, including doc comments.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::WHITESPACE
                | SyntaxKind::LINE_COMMENT
                | SyntaxKind::BLOCK_COMMENT
                | SyntaxKind::DOC_COMMENT
        )
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::INT_LITERAL
                | SyntaxKind::LONG_LITERAL
                | SyntaxKind::FLOAT_LITERAL
                | SyntaxKind::DOUBLE_LITERAL
                | SyntaxKind::CHAR_LITERAL
                | SyntaxKind::STRING_LITERAL
                | SyntaxKind::TRUE_KW
                | SyntaxKind::FALSE_KW
                | SyntaxKind::NULL_KW
        )
    }

    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            SyntaxKind::BOOLEAN_KW
                | SyntaxKind::BYTE_KW
                | SyntaxKind::CHAR_KW
                | SyntaxKind::SHORT_KW
                | SyntaxKind::INT_KW
                | SyntaxKind::LONG_KW
                | SyntaxKind::FLOAT_KW
                | SyntaxKind::DOUBLE_KW
                | SyntaxKind::VOID_KW
        )
    }

    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            SyntaxKind::PUBLIC_KW
                | SyntaxKind::PROTECTED_KW
                | SyntaxKind::PRIVATE_KW
                | SyntaxKind::STATIC_KW
                | SyntaxKind::FINAL_KW
                | SyntaxKind::TRANSIENT_KW
                | SyntaxKind::VOLATILE_KW
                | SyntaxKind::ABSTRACT_KW
        )
    }

    pub fn is_expression(self) -> bool {
        matches!(
            self,
            SyntaxKind::LITERAL_EXPR
                | SyntaxKind::REFERENCE_EXPR
                | SyntaxKind::PAREN_EXPR
                | SyntaxKind::PREFIX_EXPR
                | SyntaxKind::BINARY_EXPR
                | SyntaxKind::CONDITIONAL_EXPR
                | SyntaxKind::CAST_EXPR
                | SyntaxKind::CALL_EXPR
                | SyntaxKind::NEW_EXPR
                | SyntaxKind::ARRAY_INITIALIZER
        )
    }

    /// Composite kinds; everything else is a leaf token.
    pub fn is_node(self) -> bool {
        self >= SyntaxKind::FILE
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
