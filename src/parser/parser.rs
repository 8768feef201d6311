//! Recursive descent parser for declarations
//!
//! Builds an arena [`Tree`] from tokens. Supports error recovery and
//! produces a lossless CST: trivia tokens are kept as leaves.
//!
//! Grouped declarations follow a fixed layout: the first FIELD owns the doc
//! comment, MODIFIER_LIST and TYPE; later FIELDs start at their name; commas
//! and the trivia around them are siblings in the enclosing node; the final
//! `;` is the last child of the last FIELD.

use text_size::{TextRange, TextSize};
use thiserror::Error;

use super::lexer::{Lexer, Token};
use super::syntax_kind::SyntaxKind;
use crate::syntax::{NodeId, Tree, TreeBuilder};

/// Parse result containing the tree and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub tree: Tree,
    pub root: NodeId,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// A fragment of text that does not parse as the requested construct.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse `{text}`: {message} at {range:?}")]
pub struct ParseError {
    pub text: String,
    pub message: String,
    pub range: TextRange,
}

/// A standalone expression or type, parsed into its own parentless holder.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub tree: Tree,
    pub holder: NodeId,
    /// The expression or TYPE node inside the holder
    pub node: NodeId,
}

/// Parse a whole source file into a FILE tree
pub fn parse_file(input: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(input).collect();
    let mut parser = Parser::new(&tokens);
    parser.source_file();
    parser.finish()
}

/// Parse a bare expression without any surrounding statement context.
pub fn parse_standalone_expression(text: &str) -> Result<Fragment, ParseError> {
    parse_fragment(text, |p| {
        if p.at(SyntaxKind::L_BRACE) {
            p.array_initializer();
        } else {
            p.expression();
        }
    })
}

/// Parse a type reference (`int[]`, `java.util.List<String>`).
pub fn parse_type(text: &str) -> Result<Fragment, ParseError> {
    parse_fragment(text, |p| {
        if p.at_type_start() {
            p.type_ref();
        } else {
            p.error("expected type");
        }
    })
}

fn parse_fragment(text: &str, body: impl FnOnce(&mut Parser<'_>)) -> Result<Fragment, ParseError> {
    let tokens: Vec<_> = Lexer::new(text).collect();
    let mut parser = Parser::new(&tokens);
    parser.start_node(SyntaxKind::DUMMY_HOLDER);
    parser.skip_trivia();
    body(&mut parser);
    parser.skip_trivia();
    if !parser.at_eof() {
        parser.error("unexpected trailing input");
        while !parser.at_eof() {
            parser.bump();
        }
    }
    parser.finish_node();
    let parse = parser.finish();

    let fail = |message: String, range: TextRange| ParseError {
        text: text.to_string(),
        message,
        range,
    };
    if let Some(error) = parse.errors.first() {
        return Err(fail(error.message.clone(), error.range));
    }
    let node = parse
        .tree
        .children(parse.root)
        .find(|&n| !parse.tree.kind(n).is_trivia());
    match node {
        Some(node) => Ok(Fragment {
            holder: parse.root,
            node,
            tree: parse.tree,
        }),
        None => Err(fail("empty input".to_string(), TextRange::empty(TextSize::new(0)))),
    }
}

// Binding powers: (left, right). Higher binds tighter.
const TERNARY_BP: u8 = 1;

fn infix_binding_power(kind: SyntaxKind) -> Option<(u8, u8)> {
    let bp = match kind {
        SyntaxKind::PIPE_PIPE => (3, 4),
        SyntaxKind::AMP_AMP => (5, 6),
        SyntaxKind::PIPE => (7, 8),
        SyntaxKind::CARET => (9, 10),
        SyntaxKind::AMP => (11, 12),
        SyntaxKind::EQ_EQ | SyntaxKind::BANG_EQ => (13, 14),
        SyntaxKind::LT | SyntaxKind::GT | SyntaxKind::LT_EQ | SyntaxKind::GT_EQ => (15, 16),
        SyntaxKind::SHL | SyntaxKind::SHR | SyntaxKind::USHR => (17, 18),
        SyntaxKind::PLUS | SyntaxKind::MINUS => (19, 20),
        SyntaxKind::STAR | SyntaxKind::SLASH | SyntaxKind::PERCENT => (21, 22),
        _ => return None,
    };
    Some(bp)
}

/// The parser state
struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    builder: TreeBuilder,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>]) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: TreeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Parse {
        let (tree, root) = self.builder.finish();
        Parse {
            tree,
            root,
            errors: self.errors,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> SyntaxKind {
        self.current().map(|t| t.kind).unwrap_or(SyntaxKind::ERROR)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        !self.at_eof() && self.current_kind() == kind
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Index of the n-th non-trivia token at or after `from`.
    fn nth_index_from(&self, from: usize, n: usize) -> Option<usize> {
        let mut count = 0;
        for idx in from..self.tokens.len() {
            if !self.tokens[idx].kind.is_trivia() {
                if count == n {
                    return Some(idx);
                }
                count += 1;
            }
        }
        None
    }

    /// Look ahead, skipping trivia
    fn nth(&self, n: usize) -> SyntaxKind {
        self.nth_index_from(self.pos, n)
            .map(|idx| self.tokens[idx].kind)
            .unwrap_or(SyntaxKind::ERROR)
    }

    fn kind_at(&self, idx: usize) -> SyntaxKind {
        self.tokens.get(idx).map(|t| t.kind).unwrap_or(SyntaxKind::ERROR)
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) {
        if let Some(token) = self.current() {
            self.builder.token(token.kind, token.text);
            self.pos += 1;
        }
    }

    fn skip_trivia(&mut self) {
        while self.current().is_some_and(|t| t.kind.is_trivia()) {
            self.bump();
        }
    }

    /// Consume `kind` after any trivia, or report it missing.
    fn expect_after_trivia(&mut self, kind: SyntaxKind) -> bool {
        if self.nth(0) == kind {
            self.skip_trivia();
            self.bump();
            true
        } else {
            self.error(format!("expected {:?}", kind));
            false
        }
    }

    /// Consume a balanced `open ... close` group, nested groups included.
    fn balanced(&mut self, open: SyntaxKind, close: SyntaxKind) {
        let mut depth = 0usize;
        while !self.at_eof() {
            let kind = self.current_kind();
            self.bump();
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return;
                }
            }
        }
        self.error(format!("unterminated {:?}", open));
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&mut self, message: impl Into<String>) {
        let range = match self.current() {
            Some(t) => TextRange::at(t.offset, TextSize::of(t.text)),
            None => {
                let end = self
                    .tokens
                    .last()
                    .map(|t| t.offset + TextSize::of(t.text))
                    .unwrap_or_default();
                TextRange::empty(end)
            }
        };
        self.errors.push(SyntaxError::new(message, range));
    }

    // =========================================================================
    // Node building helpers
    // =========================================================================

    fn start_node(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind);
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn source_file(&mut self) {
        self.start_node(SyntaxKind::FILE);
        self.members(false);
        self.skip_trivia();
        self.finish_node();
    }

    /// Members of a file or class body. Stops at `}` inside a class.
    fn members(&mut self, in_class: bool) {
        loop {
            self.skip_trivia_before_member();
            if self.at_eof() {
                break;
            }
            if in_class && self.at(SyntaxKind::R_BRACE) {
                break;
            }
            if self.at(SyntaxKind::SEMICOLON) {
                self.bump();
                continue;
            }
            self.member(in_class);
        }
    }

    /// Bump trivia into the enclosing node, stopping at the doc comment that
    /// belongs to the next member.
    fn skip_trivia_before_member(&mut self) {
        while let Some(token) = self.current() {
            if !token.kind.is_trivia() {
                break;
            }
            if token.kind == SyntaxKind::DOC_COMMENT && self.doc_comment_attaches() {
                break;
            }
            self.bump();
        }
    }

    /// A doc comment attaches to a member when no other doc comment follows
    /// before the next significant token.
    fn doc_comment_attaches(&self) -> bool {
        for idx in self.pos + 1..self.tokens.len() {
            match self.tokens[idx].kind {
                SyntaxKind::DOC_COMMENT => return false,
                kind if kind.is_trivia() => continue,
                SyntaxKind::R_BRACE | SyntaxKind::SEMICOLON => return false,
                _ => return true,
            }
        }
        false
    }

    /// Skip modifiers and annotations starting at `idx`, returning the index
    /// of the first token after them.
    fn skip_modifiers_from(&self, mut idx: usize) -> usize {
        loop {
            let Some(next) = self.nth_index_from(idx, 0) else {
                return self.tokens.len();
            };
            let kind = self.kind_at(next);
            if kind.is_modifier() {
                idx = next + 1;
            } else if kind == SyntaxKind::AT {
                idx = next + 1;
                // @Name(.Name)*
                while let Some(i) = self.nth_index_from(idx, 0) {
                    if matches!(self.kind_at(i), SyntaxKind::IDENT | SyntaxKind::DOT) {
                        idx = i + 1;
                    } else {
                        break;
                    }
                }
                let args = self
                    .nth_index_from(idx, 0)
                    .filter(|&i| self.kind_at(i) == SyntaxKind::L_PAREN);
                if let Some(i) = args {
                    let mut depth = 0usize;
                    idx = i;
                    while idx < self.tokens.len() {
                        match self.kind_at(idx) {
                            SyntaxKind::L_PAREN => depth += 1,
                            SyntaxKind::R_PAREN => {
                                depth -= 1;
                                if depth == 0 {
                                    idx += 1;
                                    break;
                                }
                            }
                            _ => {}
                        }
                        idx += 1;
                    }
                }
            } else {
                return next;
            }
        }
    }

    fn at_class_start(&self) -> bool {
        let idx = self.skip_modifiers_from(self.pos);
        matches!(
            self.kind_at(idx),
            SyntaxKind::CLASS_KW | SyntaxKind::INTERFACE_KW
        )
    }

    fn at_type_start(&self) -> bool {
        let kind = self.current_kind();
        !self.at_eof() && (kind.is_primitive_type() || kind == SyntaxKind::IDENT)
    }

    fn member(&mut self, in_class: bool) {
        if self.at_class_start() {
            self.class();
            return;
        }

        let Some(cp) = self.builder.checkpoint() else {
            return;
        };
        if self.at(SyntaxKind::DOC_COMMENT) {
            self.bump();
            self.skip_trivia();
        }
        self.modifier_list();
        self.skip_trivia();

        if !self.at_type_start() {
            self.builder.start_node_at(cp, SyntaxKind::ERROR);
            self.error("expected field or method declaration");
            self.recover(in_class);
            self.finish_node();
            return;
        }
        self.type_ref();
        self.skip_trivia();
        if !self.at(SyntaxKind::IDENT) {
            self.builder.start_node_at(cp, SyntaxKind::ERROR);
            self.error("expected declaration name");
            self.recover(in_class);
            self.finish_node();
            return;
        }

        if self.nth(1) == SyntaxKind::L_PAREN {
            self.builder.start_node_at(cp, SyntaxKind::METHOD);
            self.method_tail();
            self.finish_node();
            return;
        }

        self.builder.start_node_at(cp, SyntaxKind::FIELD);
        self.declarator_tail();
        loop {
            match self.nth(0) {
                SyntaxKind::COMMA => {
                    self.finish_node();
                    self.skip_trivia();
                    self.bump();
                    self.skip_trivia();
                    if !self.at(SyntaxKind::IDENT) {
                        self.error("expected field name after `,`");
                        return;
                    }
                    self.start_node(SyntaxKind::FIELD);
                    self.declarator_tail();
                }
                SyntaxKind::SEMICOLON => {
                    self.skip_trivia();
                    self.bump();
                    self.finish_node();
                    return;
                }
                _ => {
                    self.error("expected `,` or `;`");
                    self.finish_node();
                    return;
                }
            }
        }
    }

    /// Skip to the end of a broken member: through `;`, or up to `}`.
    fn recover(&mut self, in_class: bool) {
        let mut consumed = false;
        while !self.at_eof() {
            match self.current_kind() {
                SyntaxKind::SEMICOLON => {
                    self.bump();
                    return;
                }
                SyntaxKind::R_BRACE if in_class => break,
                SyntaxKind::L_BRACE => self.balanced(SyntaxKind::L_BRACE, SyntaxKind::R_BRACE),
                _ => self.bump(),
            }
            consumed = true;
        }
        if !consumed && !self.at_eof() && !in_class {
            self.bump();
        }
    }

    fn class(&mut self) {
        self.start_node(SyntaxKind::CLASS);
        if self.at(SyntaxKind::DOC_COMMENT) {
            self.bump();
        }
        self.skip_trivia();
        self.modifier_list();
        self.skip_trivia();
        self.bump(); // class / interface
        self.skip_trivia();
        if self.at(SyntaxKind::IDENT) {
            self.bump();
        } else {
            self.error("expected class name");
        }
        // extends / implements clauses are kept as plain tokens
        while !self.at_eof() && !self.at(SyntaxKind::L_BRACE) && !self.at(SyntaxKind::R_BRACE) {
            self.bump();
        }
        if self.at(SyntaxKind::L_BRACE) {
            self.bump();
            self.members(true);
            if self.at(SyntaxKind::R_BRACE) {
                self.bump();
            } else {
                self.error("expected `}`");
            }
        } else {
            self.error("expected class body");
        }
        self.finish_node();
    }

    fn modifier_list(&mut self) {
        self.start_node(SyntaxKind::MODIFIER_LIST);
        loop {
            if self.current_kind().is_modifier() && !self.at_eof() {
                self.bump();
            } else if self.at(SyntaxKind::AT) {
                self.annotation();
            } else {
                break;
            }
            let next = self.nth(0);
            if next.is_modifier() || next == SyntaxKind::AT {
                self.skip_trivia();
            } else {
                break;
            }
        }
        self.finish_node();
    }

    fn annotation(&mut self) {
        self.start_node(SyntaxKind::ANNOTATION);
        self.bump(); // @
        self.skip_trivia();
        if self.at(SyntaxKind::IDENT) {
            self.bump();
        } else {
            self.error("expected annotation name");
        }
        while self.nth(0) == SyntaxKind::DOT && self.nth(1) == SyntaxKind::IDENT {
            self.skip_trivia();
            self.bump();
            self.skip_trivia();
            self.bump();
        }
        if self.nth(0) == SyntaxKind::L_PAREN {
            self.skip_trivia();
            self.balanced(SyntaxKind::L_PAREN, SyntaxKind::R_PAREN);
        }
        self.finish_node();
    }

    /// `name []* (= initializer)?`
    fn declarator_tail(&mut self) {
        self.bump(); // name
        self.bracket_pairs();
        if self.nth(0) == SyntaxKind::EQ {
            self.skip_trivia();
            self.bump();
            self.skip_trivia();
            if self.at(SyntaxKind::L_BRACE) {
                self.array_initializer();
            } else {
                self.expression();
            }
        }
    }

    fn bracket_pairs(&mut self) {
        while self.nth(0) == SyntaxKind::L_BRACKET && self.nth(1) == SyntaxKind::R_BRACKET {
            self.skip_trivia();
            self.bump();
            self.skip_trivia();
            self.bump();
        }
    }

    fn method_tail(&mut self) {
        self.bump(); // name
        self.skip_trivia();
        self.balanced(SyntaxKind::L_PAREN, SyntaxKind::R_PAREN);
        while !self.at_eof() {
            match self.current_kind() {
                SyntaxKind::SEMICOLON => {
                    self.bump();
                    return;
                }
                SyntaxKind::L_BRACE => {
                    self.balanced(SyntaxKind::L_BRACE, SyntaxKind::R_BRACE);
                    return;
                }
                SyntaxKind::R_BRACE => {
                    self.error("expected method body");
                    return;
                }
                _ => self.bump(),
            }
        }
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn type_ref(&mut self) {
        self.start_node(SyntaxKind::TYPE);
        if self.current_kind().is_primitive_type() {
            self.bump();
        } else if self.at(SyntaxKind::IDENT) {
            self.bump();
            while self.nth(0) == SyntaxKind::DOT && self.nth(1) == SyntaxKind::IDENT {
                self.skip_trivia();
                self.bump();
                self.skip_trivia();
                self.bump();
            }
            if self.nth(0) == SyntaxKind::LT {
                self.skip_trivia();
                self.type_args();
            }
        } else {
            self.error("expected type");
        }
        self.bracket_pairs();
        self.finish_node();
    }

    fn type_args(&mut self) {
        self.start_node(SyntaxKind::TYPE_ARGS);
        let mut depth: i32 = 0;
        while !self.at_eof() {
            match self.current_kind() {
                SyntaxKind::LT => depth += 1,
                SyntaxKind::GT => depth -= 1,
                SyntaxKind::SHR => depth -= 2,
                SyntaxKind::USHR => depth -= 3,
                SyntaxKind::SEMICOLON | SyntaxKind::L_BRACE | SyntaxKind::EQ => break,
                _ => {}
            }
            self.bump();
            if depth <= 0 {
                break;
            }
        }
        if depth > 0 {
            self.error("unterminated type arguments");
        }
        self.finish_node();
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn expression(&mut self) {
        self.expr_bp(0);
    }

    fn expr_bp(&mut self, min_bp: u8) {
        let Some(cp) = self.builder.checkpoint() else {
            return;
        };
        if !self.unary() {
            return;
        }
        loop {
            let op = self.nth(0);
            if op == SyntaxKind::QUESTION {
                if min_bp > TERNARY_BP {
                    break;
                }
                self.builder.start_node_at(cp, SyntaxKind::CONDITIONAL_EXPR);
                self.skip_trivia();
                self.bump();
                self.skip_trivia();
                self.expr_bp(0);
                if self.expect_after_trivia(SyntaxKind::COLON) {
                    self.skip_trivia();
                    self.expr_bp(TERNARY_BP);
                }
                self.finish_node();
                continue;
            }
            let Some((l_bp, r_bp)) = infix_binding_power(op) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }
            self.builder.start_node_at(cp, SyntaxKind::BINARY_EXPR);
            self.skip_trivia();
            self.bump();
            self.skip_trivia();
            self.expr_bp(r_bp);
            self.finish_node();
        }
    }

    /// Returns false when no expression could be started here.
    fn unary(&mut self) -> bool {
        match self.current_kind() {
            _ if self.at_eof() => {
                self.error("expected expression");
                false
            }
            SyntaxKind::PLUS | SyntaxKind::MINUS | SyntaxKind::BANG | SyntaxKind::TILDE => {
                self.start_node(SyntaxKind::PREFIX_EXPR);
                self.bump();
                self.skip_trivia();
                self.unary();
                self.finish_node();
                true
            }
            SyntaxKind::L_PAREN if self.at_cast() => {
                self.start_node(SyntaxKind::CAST_EXPR);
                self.bump();
                self.skip_trivia();
                self.type_ref();
                self.expect_after_trivia(SyntaxKind::R_PAREN);
                self.skip_trivia();
                self.unary();
                self.finish_node();
                true
            }
            SyntaxKind::L_PAREN => {
                self.start_node(SyntaxKind::PAREN_EXPR);
                self.bump();
                self.skip_trivia();
                self.expression();
                self.expect_after_trivia(SyntaxKind::R_PAREN);
                self.finish_node();
                true
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> bool {
        let kind = self.current_kind();
        if kind.is_literal() {
            self.start_node(SyntaxKind::LITERAL_EXPR);
            self.bump();
            self.finish_node();
            return true;
        }
        match kind {
            SyntaxKind::IDENT => {
                let Some(cp) = self.builder.checkpoint() else {
                    return false;
                };
                self.start_node(SyntaxKind::REFERENCE_EXPR);
                self.bump();
                while self.nth(0) == SyntaxKind::DOT && self.nth(1) == SyntaxKind::IDENT {
                    self.skip_trivia();
                    self.bump();
                    self.skip_trivia();
                    self.bump();
                }
                self.finish_node();
                if self.nth(0) == SyntaxKind::L_PAREN {
                    self.builder.start_node_at(cp, SyntaxKind::CALL_EXPR);
                    self.skip_trivia();
                    self.arg_list();
                    self.finish_node();
                }
                true
            }
            SyntaxKind::NEW_KW => {
                self.start_node(SyntaxKind::NEW_EXPR);
                self.bump();
                self.skip_trivia();
                self.type_ref();
                loop {
                    match self.nth(0) {
                        SyntaxKind::L_PAREN => {
                            self.skip_trivia();
                            self.balanced(SyntaxKind::L_PAREN, SyntaxKind::R_PAREN);
                        }
                        SyntaxKind::L_BRACKET => {
                            self.skip_trivia();
                            self.balanced(SyntaxKind::L_BRACKET, SyntaxKind::R_BRACKET);
                        }
                        SyntaxKind::L_BRACE => {
                            self.skip_trivia();
                            self.balanced(SyntaxKind::L_BRACE, SyntaxKind::R_BRACE);
                            break;
                        }
                        _ => break,
                    }
                }
                self.finish_node();
                true
            }
            SyntaxKind::L_BRACE => {
                self.array_initializer();
                true
            }
            _ => {
                self.error("expected expression");
                false
            }
        }
    }

    fn arg_list(&mut self) {
        self.start_node(SyntaxKind::ARG_LIST);
        self.bump(); // (
        self.skip_trivia();
        if !self.at(SyntaxKind::R_PAREN) {
            self.expression();
            while self.nth(0) == SyntaxKind::COMMA {
                self.skip_trivia();
                self.bump();
                self.skip_trivia();
                self.expression();
            }
        }
        self.expect_after_trivia(SyntaxKind::R_PAREN);
        self.finish_node();
    }

    fn array_initializer(&mut self) {
        self.start_node(SyntaxKind::ARRAY_INITIALIZER);
        self.bump(); // {
        self.skip_trivia();
        while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
            if self.at(SyntaxKind::L_BRACE) {
                self.array_initializer();
            } else if !self.unary_start_then_expression() {
                break;
            }
            if self.nth(0) == SyntaxKind::COMMA {
                self.skip_trivia();
                self.bump();
                self.skip_trivia();
            } else {
                break;
            }
        }
        self.expect_after_trivia(SyntaxKind::R_BRACE);
        self.finish_node();
    }

    fn unary_start_then_expression(&mut self) -> bool {
        let before = self.pos;
        self.expression();
        self.pos > before
    }

    /// `(` primitive-or-name dims `)` followed by something that can start an
    /// operand. Signs after the `)` are read as binary operators.
    fn at_cast(&self) -> bool {
        let Some(mut idx) = self.nth_index_from(self.pos + 1, 0) else {
            return false;
        };
        let first = self.kind_at(idx);
        let primitive = first.is_primitive_type();
        if !primitive && first != SyntaxKind::IDENT {
            return false;
        }
        idx += 1;
        loop {
            let Some(next) = self.nth_index_from(idx, 0) else {
                return false;
            };
            match self.kind_at(next) {
                SyntaxKind::DOT | SyntaxKind::IDENT if !primitive => idx = next + 1,
                SyntaxKind::L_BRACKET | SyntaxKind::R_BRACKET => idx = next + 1,
                SyntaxKind::R_PAREN => {
                    idx = next + 1;
                    break;
                }
                _ => return false,
            }
        }
        if primitive {
            return true;
        }
        let Some(after) = self.nth_index_from(idx, 0) else {
            return false;
        };
        let kind = self.kind_at(after);
        kind == SyntaxKind::IDENT
            || kind.is_literal()
            || matches!(
                kind,
                SyntaxKind::L_PAREN | SyntaxKind::BANG | SyntaxKind::TILDE | SyntaxKind::NEW_KW
            )
    }
}
