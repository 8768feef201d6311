//! Owned expression model lowered from syntax.
//!
//! Lowering copies everything the evaluator needs out of the tree, so
//! evaluation never holds a borrow of (or a lock around) the syntax tree
//! while it recurses into other declarations.

use crate::base::Name;
use crate::parser::SyntaxKind;
use crate::syntax::{NodeId, Tree};

use super::constant::ConstValue;
use super::types::{TypeContext, TypeDescriptor, from_type_node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
}

impl BinaryOp {
    fn from_token(kind: SyntaxKind) -> Option<Self> {
        let op = match kind {
            SyntaxKind::PLUS => BinaryOp::Add,
            SyntaxKind::MINUS => BinaryOp::Sub,
            SyntaxKind::STAR => BinaryOp::Mul,
            SyntaxKind::SLASH => BinaryOp::Div,
            SyntaxKind::PERCENT => BinaryOp::Rem,
            SyntaxKind::SHL => BinaryOp::Shl,
            SyntaxKind::SHR => BinaryOp::Shr,
            SyntaxKind::USHR => BinaryOp::UShr,
            SyntaxKind::LT => BinaryOp::Lt,
            SyntaxKind::GT => BinaryOp::Gt,
            SyntaxKind::LT_EQ => BinaryOp::Le,
            SyntaxKind::GT_EQ => BinaryOp::Ge,
            SyntaxKind::EQ_EQ => BinaryOp::Eq,
            SyntaxKind::BANG_EQ => BinaryOp::Ne,
            SyntaxKind::AMP => BinaryOp::BitAnd,
            SyntaxKind::PIPE => BinaryOp::BitOr,
            SyntaxKind::CARET => BinaryOp::BitXor,
            SyntaxKind::AMP_AMP => BinaryOp::And,
            SyntaxKind::PIPE_PIPE => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(ConstValue),
    Null,
    /// `NAME` or `Qualifier.NAME`
    Reference(Vec<Name>),
    Paren(Box<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Cast {
        ty: TypeDescriptor,
        operand: Box<Expr>,
    },
    /// Calls, `new`, array initializers and anything malformed
    NonConstant,
}

impl Expr {
    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Literal(_))
    }
}

fn significant_children(tree: &Tree, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.children(node).filter(move |&c| !tree.kind(c).is_trivia())
}

/// Lower the expression rooted at `node`.
pub fn lower_expression(tree: &Tree, node: NodeId) -> Expr {
    match tree.kind(node) {
        SyntaxKind::LITERAL_EXPR => {
            let Some(token) = tree.first_child(node) else {
                return Expr::NonConstant;
            };
            let text = tree.leaf_text(token).unwrap_or_default();
            match tree.kind(token) {
                SyntaxKind::NULL_KW => Expr::Null,
                kind => parse_literal(kind, text, false)
                    .map(Expr::Literal)
                    .unwrap_or(Expr::NonConstant),
            }
        }
        SyntaxKind::REFERENCE_EXPR => {
            let path = tree
                .children(node)
                .filter(|&c| tree.kind(c) == SyntaxKind::IDENT)
                .filter_map(|c| tree.leaf_text(c))
                .map(Name::from)
                .collect();
            Expr::Reference(path)
        }
        SyntaxKind::PAREN_EXPR => {
            let inner = significant_children(tree, node).find(|&c| tree.kind(c).is_expression());
            match inner {
                Some(inner) => Expr::Paren(Box::new(lower_expression(tree, inner))),
                None => Expr::NonConstant,
            }
        }
        SyntaxKind::PREFIX_EXPR => lower_prefix(tree, node),
        SyntaxKind::BINARY_EXPR => {
            let mut parts = significant_children(tree, node);
            let (Some(lhs), Some(op), Some(rhs)) = (parts.next(), parts.next(), parts.next()) else {
                return Expr::NonConstant;
            };
            let Some(op) = BinaryOp::from_token(tree.kind(op)) else {
                return Expr::NonConstant;
            };
            Expr::Binary {
                op,
                lhs: Box::new(lower_expression(tree, lhs)),
                rhs: Box::new(lower_expression(tree, rhs)),
            }
        }
        SyntaxKind::CONDITIONAL_EXPR => {
            let operands: Vec<_> = significant_children(tree, node)
                .filter(|&c| tree.kind(c).is_expression())
                .collect();
            let &[condition, then_branch, else_branch] = operands.as_slice() else {
                return Expr::NonConstant;
            };
            Expr::Conditional {
                condition: Box::new(lower_expression(tree, condition)),
                then_branch: Box::new(lower_expression(tree, then_branch)),
                else_branch: Box::new(lower_expression(tree, else_branch)),
            }
        }
        SyntaxKind::CAST_EXPR => {
            let ty = tree
                .find_child(node, SyntaxKind::TYPE)
                .and_then(|ty| from_type_node(tree, ty, &TypeContext::default()).ok());
            let operand = significant_children(tree, node).find(|&c| tree.kind(c).is_expression());
            match (ty, operand) {
                (Some(ty), Some(operand)) => Expr::Cast {
                    ty,
                    operand: Box::new(lower_expression(tree, operand)),
                },
                _ => Expr::NonConstant,
            }
        }
        _ => Expr::NonConstant,
    }
}

fn lower_prefix(tree: &Tree, node: NodeId) -> Expr {
    let mut parts = significant_children(tree, node);
    let (Some(op), Some(operand)) = (parts.next(), parts.next()) else {
        return Expr::NonConstant;
    };
    let op = match tree.kind(op) {
        SyntaxKind::PLUS => UnaryOp::Plus,
        SyntaxKind::MINUS => UnaryOp::Neg,
        SyntaxKind::BANG => UnaryOp::Not,
        SyntaxKind::TILDE => UnaryOp::BitNot,
        _ => return Expr::NonConstant,
    };

    // `-2147483648` and `-9223372036854775808L` are only valid negated.
    if op == UnaryOp::Neg && tree.kind(operand) == SyntaxKind::LITERAL_EXPR {
        if let Some(token) = tree.first_child(operand) {
            let text = tree.leaf_text(token).unwrap_or_default();
            if let Some(value) = parse_literal(tree.kind(token), text, true) {
                let negated = match value {
                    ConstValue::Int(i32::MIN) => Some(ConstValue::Int(i32::MIN)),
                    ConstValue::Long(i64::MIN) => Some(ConstValue::Long(i64::MIN)),
                    _ => None,
                };
                if let Some(negated) = negated {
                    return Expr::Literal(negated);
                }
            }
        }
    }

    Expr::Unary {
        op,
        operand: Box::new(lower_expression(tree, operand)),
    }
}

/// Parse a literal token. `negated` admits the one decimal literal that is
/// only legal under unary minus.
pub fn parse_literal(kind: SyntaxKind, text: &str, negated: bool) -> Option<ConstValue> {
    match kind {
        SyntaxKind::TRUE_KW => Some(ConstValue::Boolean(true)),
        SyntaxKind::FALSE_KW => Some(ConstValue::Boolean(false)),
        SyntaxKind::INT_LITERAL => {
            let (value, decimal) = parse_integer(text)?;
            if decimal {
                match value {
                    v if v <= i32::MAX as u64 => Some(ConstValue::Int(v as i32)),
                    2_147_483_648 if negated => Some(ConstValue::Int(i32::MIN)),
                    _ => None,
                }
            } else {
                u32::try_from(value).ok().map(|v| ConstValue::Int(v as i32))
            }
        }
        SyntaxKind::LONG_LITERAL => {
            let (value, decimal) = parse_integer(&text[..text.len() - 1])?;
            if decimal {
                match value {
                    v if v <= i64::MAX as u64 => Some(ConstValue::Long(v as i64)),
                    9_223_372_036_854_775_808 if negated => Some(ConstValue::Long(i64::MIN)),
                    _ => None,
                }
            } else {
                Some(ConstValue::Long(value as i64))
            }
        }
        SyntaxKind::FLOAT_LITERAL => {
            let digits = text[..text.len() - 1].replace('_', "");
            digits.parse::<f32>().ok().filter(|v| v.is_finite()).map(ConstValue::Float)
        }
        SyntaxKind::DOUBLE_LITERAL => {
            let digits = text.trim_end_matches(['d', 'D']).replace('_', "");
            digits.parse::<f64>().ok().filter(|v| v.is_finite()).map(ConstValue::Double)
        }
        SyntaxKind::CHAR_LITERAL => {
            let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
            match unescape(inner)?.as_slice() {
                [unit] => Some(ConstValue::Char(*unit)),
                _ => None,
            }
        }
        SyntaxKind::STRING_LITERAL => {
            let inner = text.strip_prefix('"')?.strip_suffix('"')?;
            Some(ConstValue::string(String::from_utf16_lossy(&unescape(inner)?)))
        }
        _ => None,
    }
}

/// Integer digits with radix prefix and underscores. Returns the magnitude
/// and whether it was written in decimal.
fn parse_integer(text: &str) -> Option<(u64, bool)> {
    let digits = text.replace('_', "");
    let (radix, body, decimal) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex.to_string(), false)
    } else if let Some(bin) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        (2, bin.to_string(), false)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, digits[1..].to_string(), false)
    } else {
        (10, digits.clone(), true)
    };
    if body.is_empty() {
        return None;
    }
    u64::from_str_radix(&body, radix).ok().map(|v| (v, decimal))
}

/// Decode escapes into UTF-16 code units.
fn unescape(text: &str) -> Option<Vec<u16>> {
    let mut units = Vec::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            let mut buf = [0u16; 2];
            units.extend_from_slice(ch.encode_utf16(&mut buf));
            continue;
        }
        let escaped = chars.next()?;
        let unit = match escaped {
            'n' => '\n' as u16,
            't' => '\t' as u16,
            'b' => 0x08,
            'r' => '\r' as u16,
            'f' => 0x0C,
            's' => ' ' as u16,
            '\'' => '\'' as u16,
            '"' => '"' as u16,
            '\\' => '\\' as u16,
            'u' => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 {
                    return None;
                }
                u16::from_str_radix(&hex, 16).ok()?
            }
            '0'..='7' => {
                // Up to three octal digits, at most \377.
                let mut value = escaped.to_digit(8)?;
                let max_digits = if escaped <= '3' { 2 } else { 1 };
                for _ in 0..max_digits {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                value as u16
            }
            _ => return None,
        };
        units.push(unit);
    }
    Some(units)
}
