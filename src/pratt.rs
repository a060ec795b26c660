//! Binding powers for Jung expression parsing.
//!
//! The parser climbs operator precedence with the Pratt technique:
//! every infix operator carries a `(left, right)` binding-power pair, and
//! the expression loop consumes an operator only while its left power is
//! at least the current minimum. Parsing the right operand with the
//! operator's right power encodes associativity:
//! - left < right: left associative
//! - left > right: right associative
//!
//! # Precedence table
//!
//! From lowest to highest:
//! 1. Ternary `? :` (4, 3) - right associative
//! 2. Logical `or` (10, 11)
//! 3. Logical `and` (20, 21)
//! 4. Equality `==`, `!=` (30, 31)
//! 5. Comparison `<`, `<=`, `>`, `>=` (40, 41)
//! 6. Additive `+`, `-` (50, 51)
//! 7. Multiplicative `*`, `/`, `%` (60, 61)
//! 8. Unary `-`, `not` (70)
//!
//! The postfix chain (`[index]`, `.field`, `.method(args)`, call
//! arguments) binds tighter than all of the above and is handled
//! directly by the parser.

use crate::lexer::TokenKind;

/// Returns the binding power `(left, right)` for infix operators.
///
/// Returns `None` when the token is not an infix operator, which is how
/// the expression loop detects the end of an expression.
pub fn infix_binding_power(op: &TokenKind) -> Option<(u8, u8)> {
    Some(match op {
        // Ternary (right-assoc; the parser handles the ':' arm)
        TokenKind::Question => (4, 3),

        // Logical
        TokenKind::Or => (10, 11),
        TokenKind::And => (20, 21),

        // Equality
        TokenKind::Eq | TokenKind::Ne => (30, 31),

        // Comparison
        TokenKind::Lt | TokenKind::Le | TokenKind::Gt | TokenKind::Ge => (40, 41),

        // Additive
        TokenKind::Plus | TokenKind::Minus => (50, 51),

        // Multiplicative
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => (60, 61),

        _ => return None,
    })
}

/// Returns the binding power for prefix operators.
pub fn prefix_binding_power(op: &TokenKind) -> Option<u8> {
    match op {
        TokenKind::Minus | TokenKind::Not => Some(70),
        _ => None,
    }
}
