//! Arithmetic expression evaluation for numeric input fields.
//!
//! Quantity fields accept shorthand such as `5*2+3` or `97+150`. Input is
//! checked against a character allow-list first and only then tokenized and
//! parsed; nothing outside the grammar below is ever interpreted.
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := number | '(' expr ')'
//! number  := digits ['.' digits] | '.' digits | digits '.'
//! ```
//!
//! The increment/decrement pairs `++` and `--` are rejected, as is any
//! juxtaposition of operands (`2(3)`, `1 2`).
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use wos_core::calculations::expression::evaluate;
//!
//! assert_eq!(evaluate("97+150"), dec!(247));
//! assert_eq!(evaluate("5*2+3"), dec!(13));
//! assert_eq!(evaluate("10/0"), dec!(0));
//! assert_eq!(evaluate("alert(1)"), dec!(0));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::trace;

/// Deepest parenthesis nesting the parser will follow.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Reasons an expression is rejected.
///
/// [`evaluate`] folds all of these into `0`; [`try_evaluate`] exposes them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("expression is empty")]
    Empty,

    #[error("character {0:?} is not allowed in an expression")]
    DisallowedCharacter(char),

    #[error("malformed number '{0}'")]
    MalformedNumber(String),

    #[error("number '{0}' is out of range")]
    NumberOutOfRange(String),

    #[error("operator '{0}' is not allowed")]
    RepeatedOperator(String),

    #[error("unexpected {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("parentheses nested deeper than {}", MAX_NESTING_DEPTH)]
    TooDeep,

    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow")]
    Overflow,
}

/// Characters an expression may contain: ASCII digits, space, tab,
/// `+ - * / ( )` and the decimal point.
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, ' ' | '\t' | '+' | '-' | '*' | '/' | '(' | ')' | '.')
}

/// Checks the allow-list without evaluating anything.
pub fn validate(text: &str) -> Result<(), ExpressionError> {
    if text.is_empty() {
        return Err(ExpressionError::Empty);
    }
    match text.chars().find(|c| !is_allowed_char(*c)) {
        Some(c) => Err(ExpressionError::DisallowedCharacter(c)),
        None => Ok(()),
    }
}

/// Evaluates `text`, reporting why it was rejected.
pub fn try_evaluate(text: &str) -> Result<Decimal, ExpressionError> {
    validate(text)?;
    let tokens = tokenize(text)?;
    Parser::new(&tokens).parse().map(|value| value.normalize())
}

/// Evaluates `text` as arithmetic, returning `0` for anything that is not a
/// valid, finite expression.
pub fn evaluate(text: &str) -> Decimal {
    try_evaluate(text).unwrap_or_else(|error| {
        if !text.is_empty() {
            trace!(input = %text, %error, "expression rejected");
        }
        Decimal::ZERO
    })
}

/// Evaluates optional field text; a missing field counts as `0`.
pub fn evaluate_field(text: Option<&str>) -> Decimal {
    text.map(evaluate).unwrap_or(Decimal::ZERO)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Number(Decimal),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Number(n) => format!("number {n}"),
            Self::Plus => "'+'".to_string(),
            Self::Minus => "'-'".to_string(),
            Self::Star => "'*'".to_string(),
            Self::Slash => "'/'".to_string(),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
        }
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, ExpressionError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                tokens.push(Token::Number(parse_number(&literal)?));
            }
            '+' | '-' => {
                if chars.get(i + 1) == Some(&c) {
                    return Err(ExpressionError::RepeatedOperator(format!("{c}{c}")));
                }
                tokens.push(if c == '+' { Token::Plus } else { Token::Minus });
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            other => return Err(ExpressionError::DisallowedCharacter(other)),
        }
    }

    Ok(tokens)
}

/// Parses a run of digits with at most one decimal point.
fn parse_number(literal: &str) -> Result<Decimal, ExpressionError> {
    let (int_part, frac_part) = literal.split_once('.').unwrap_or((literal, ""));
    if frac_part.contains('.') || (int_part.is_empty() && frac_part.is_empty()) {
        return Err(ExpressionError::MalformedNumber(literal.to_string()));
    }

    let frac_part = frac_part.trim_end_matches('0');
    let digits = format!("{int_part}{frac_part}");
    let digits = digits.trim_start_matches('0');
    let out_of_range = || ExpressionError::NumberOutOfRange(literal.to_string());

    let mantissa: i128 = if digits.is_empty() {
        0
    } else {
        digits.parse().map_err(|_| out_of_range())?
    };
    let scale = u32::try_from(frac_part.len()).map_err(|_| out_of_range())?;

    Decimal::try_from_i128_with_scale(mantissa, scale).map_err(|_| out_of_range())
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn parse(mut self) -> Result<Decimal, ExpressionError> {
        let value = self.expression()?;
        match self.peek() {
            Some(token) => Err(ExpressionError::UnexpectedToken(token.describe())),
            None => Ok(value),
        }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next_token(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expression(&mut self) -> Result<Decimal, ExpressionError> {
        let mut acc = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    acc = acc.checked_add(rhs).ok_or(ExpressionError::Overflow)?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    acc = acc.checked_sub(rhs).ok_or(ExpressionError::Overflow)?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn term(&mut self) -> Result<Decimal, ExpressionError> {
        let mut acc = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    acc = acc.checked_mul(rhs).ok_or(ExpressionError::Overflow)?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    if rhs.is_zero() {
                        return Err(ExpressionError::DivisionByZero);
                    }
                    acc = acc.checked_div(rhs).ok_or(ExpressionError::Overflow)?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn unary(&mut self) -> Result<Decimal, ExpressionError> {
        match self.peek() {
            Some(Token::Plus) => {
                self.pos += 1;
                self.nested(Self::unary)
            }
            Some(Token::Minus) => {
                self.pos += 1;
                self.nested(Self::unary).map(|value| -value)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Decimal, ExpressionError> {
        match self.next_token() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::LParen) => {
                let value = self.nested(Self::expression)?;
                match self.next_token() {
                    Some(Token::RParen) => Ok(value),
                    Some(token) => Err(ExpressionError::UnexpectedToken(token.describe())),
                    None => Err(ExpressionError::UnexpectedEnd),
                }
            }
            Some(token) => Err(ExpressionError::UnexpectedToken(token.describe())),
            None => Err(ExpressionError::UnexpectedEnd),
        }
    }

    /// Runs `rule` one nesting level deeper.
    fn nested(
        &mut self,
        rule: fn(&mut Self) -> Result<Decimal, ExpressionError>,
    ) -> Result<Decimal, ExpressionError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ExpressionError::TooDeep);
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // allow-list
    // =========================================================================

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(evaluate(""), Decimal::ZERO);
        assert_eq!(try_evaluate(""), Err(ExpressionError::Empty));
    }

    #[test]
    fn whitespace_only_input_is_zero() {
        assert_eq!(try_evaluate("  \t "), Err(ExpressionError::UnexpectedEnd));
    }

    #[test]
    fn disallowed_characters_are_rejected_before_parsing() {
        assert_eq!(
            try_evaluate("1+1;x"),
            Err(ExpressionError::DisallowedCharacter(';'))
        );
        assert_eq!(evaluate("Math.max(1)"), Decimal::ZERO);
        assert_eq!(evaluate("1e5"), Decimal::ZERO);
        assert_eq!(evaluate("1,000"), Decimal::ZERO);
        assert_eq!(evaluate("5\n"), Decimal::ZERO);
    }

    // =========================================================================
    // arithmetic
    // =========================================================================

    #[test]
    fn evaluates_sums() {
        assert_eq!(evaluate("97+150"), dec!(247));
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(evaluate("5*2+3"), dec!(13));
        assert_eq!(evaluate("3+5*2"), dec!(13));
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(evaluate("(3+5)*2"), dec!(16));
        assert_eq!(evaluate("((2))"), dec!(2));
    }

    #[test]
    fn subtraction_and_division_are_left_associative() {
        assert_eq!(evaluate("10-4-3"), dec!(3));
        assert_eq!(evaluate("100/10/5"), dec!(2));
    }

    #[test]
    fn unary_signs_are_supported() {
        assert_eq!(evaluate("-5+10"), dec!(5));
        assert_eq!(evaluate("5+-3"), dec!(2));
        assert_eq!(evaluate("5- -3"), dec!(8));
        assert_eq!(evaluate("+7"), dec!(7));
    }

    #[test]
    fn decimal_points_are_supported() {
        assert_eq!(evaluate("0.5*4"), dec!(2));
        assert_eq!(evaluate(".5+5."), dec!(5.5));
        assert_eq!(evaluate("0.1+0.2"), dec!(0.3));
    }

    #[test]
    fn leading_zeros_are_accepted() {
        assert_eq!(evaluate("007"), dec!(7));
    }

    #[test]
    fn tabs_and_spaces_are_ignored() {
        assert_eq!(evaluate(" 12 \t* 3 "), dec!(36));
    }

    // =========================================================================
    // failures
    // =========================================================================

    #[test]
    fn division_by_zero_is_zero() {
        assert_eq!(try_evaluate("10/0"), Err(ExpressionError::DivisionByZero));
        assert_eq!(evaluate("10/0"), Decimal::ZERO);
        assert_eq!(evaluate("0/0"), Decimal::ZERO);
        assert_eq!(evaluate("1/(2-2)"), Decimal::ZERO);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert_eq!(
            try_evaluate("1.2.3"),
            Err(ExpressionError::MalformedNumber("1.2.3".to_string()))
        );
        assert_eq!(evaluate("."), Decimal::ZERO);
    }

    #[test]
    fn unbalanced_parentheses_are_rejected() {
        assert_eq!(try_evaluate("(1+2"), Err(ExpressionError::UnexpectedEnd));
        assert_eq!(
            try_evaluate("1+2)"),
            Err(ExpressionError::UnexpectedToken("')'".to_string()))
        );
        assert_eq!(evaluate("()"), Decimal::ZERO);
    }

    #[test]
    fn dangling_operators_are_rejected() {
        assert_eq!(evaluate("5*"), Decimal::ZERO);
        assert_eq!(evaluate("*5"), Decimal::ZERO);
        assert_eq!(evaluate("5//2"), Decimal::ZERO);
    }

    #[test]
    fn juxtaposed_operands_are_rejected() {
        assert_eq!(evaluate("2(3)"), Decimal::ZERO);
        assert_eq!(evaluate("1 2"), Decimal::ZERO);
        assert_eq!(evaluate("(1)(2)"), Decimal::ZERO);
    }

    #[test]
    fn increment_and_decrement_pairs_are_rejected() {
        assert_eq!(
            try_evaluate("5--3"),
            Err(ExpressionError::RepeatedOperator("--".to_string()))
        );
        assert_eq!(evaluate("++5"), Decimal::ZERO);
    }

    #[test]
    fn overflow_is_zero() {
        assert_eq!(
            try_evaluate("99999999999999999999*99999999999999999999"),
            Err(ExpressionError::Overflow)
        );
        assert_eq!(
            evaluate("999999999999999999999999999999999"),
            Decimal::ZERO
        );
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let deep = format!("{}1{}", "(".repeat(100), ")".repeat(100));

        assert_eq!(try_evaluate(&deep), Err(ExpressionError::TooDeep));
    }

    #[test]
    fn evaluate_field_treats_missing_as_zero() {
        assert_eq!(evaluate_field(None), Decimal::ZERO);
        assert_eq!(evaluate_field(Some("4*4")), dec!(16));
    }
}
