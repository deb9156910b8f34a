use super::lexer::{Spanned, Token};
use super::FormulaError;

pub(crate) const MAX_NESTING_DEPTH: usize = 64;
/// Bounds the height of the expression tree, which is walked recursively.
pub(crate) const MAX_FORMULA_TOKENS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Arithmetic expression tree with period placeholders already bound to their grades.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(f64),
    Placeholder {
        name: String,
        value: f64,
    },
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn evaluate(&self) -> Result<f64, FormulaError> {
        match self {
            Expr::Literal(value) => Ok(*value),
            Expr::Placeholder { value, .. } => Ok(*value),
            Expr::Negate(inner) => Ok(-inner.evaluate()?),
            Expr::Binary { op, lhs, rhs } => {
                let lhs = lhs.evaluate()?;
                let rhs = rhs.evaluate()?;
                match op {
                    BinaryOp::Add => Ok(lhs + rhs),
                    BinaryOp::Subtract => Ok(lhs - rhs),
                    BinaryOp::Multiply => Ok(lhs * rhs),
                    BinaryOp::Divide if rhs == 0.0 => Err(FormulaError::DivisionByZero),
                    BinaryOp::Divide => Ok(lhs / rhs),
                }
            }
        }
    }
}

/// Recursive-descent parser over the token stream.
///
/// `bindings[k - 1]` is the value of `evalk`; any other placeholder binds to 0 and is
/// reported through `unresolved`.
pub(crate) struct Parser<'a> {
    tokens: &'a [Spanned],
    cursor: usize,
    depth: usize,
    bindings: &'a [f64],
    source_len: usize,
    unresolved: Vec<String>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: &'a [Spanned], bindings: &'a [f64], source_len: usize) -> Self {
        Self {
            tokens,
            cursor: 0,
            depth: 0,
            bindings,
            source_len,
            unresolved: Vec::new(),
        }
    }

    /// Parses a complete expression and returns it with the unresolved placeholder names.
    pub(crate) fn parse(mut self) -> Result<(Expr, Vec<String>), FormulaError> {
        if self.tokens.is_empty() {
            return Err(FormulaError::UnexpectedEnd {
                offset: self.source_len,
            });
        }
        if self.tokens.len() > MAX_FORMULA_TOKENS {
            return Err(FormulaError::TooLong {
                limit: MAX_FORMULA_TOKENS,
            });
        }

        let expr = self.expression()?;
        if let Some(extra) = self.tokens.get(self.cursor) {
            return Err(FormulaError::UnexpectedToken {
                token: describe(&extra.token),
                offset: extra.offset,
            });
        }

        Ok((expr, self.unresolved))
    }

    fn expression(&mut self) -> Result<Expr, FormulaError> {
        let mut expr = self.term()?;
        while let Some(op) = self.peek_op(&[Token::Plus, Token::Minus]) {
            self.cursor += 1;
            let rhs = self.term()?;
            expr = Expr::Binary {
                op,
                lhs: Box::new(expr),
                rhs: Box::new(rhs),
            };
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut expr = self.factor()?;
        while let Some(op) = self.peek_op(&[Token::Star, Token::Slash]) {
            self.cursor += 1;
            let rhs = self.factor()?;
            expr = Expr::Binary {
                op,
                lhs: Box::new(expr),
                rhs: Box::new(rhs),
            };
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, FormulaError> {
        self.enter()?;
        let result = self.factor_inner();
        self.depth -= 1;
        result
    }

    fn factor_inner(&mut self) -> Result<Expr, FormulaError> {
        let Some(spanned) = self.tokens.get(self.cursor) else {
            return Err(FormulaError::UnexpectedEnd {
                offset: self.source_len,
            });
        };
        self.cursor += 1;

        match &spanned.token {
            Token::Plus => self.factor(),
            Token::Minus => Ok(Expr::Negate(Box::new(self.factor()?))),
            Token::Number(value) => Ok(Expr::Literal(*value)),
            Token::Placeholder { name, index } => Ok(self.bind(name, *index)),
            Token::LeftParen => {
                let inner = self.expression()?;
                match self.tokens.get(self.cursor) {
                    Some(Spanned {
                        token: Token::RightParen,
                        ..
                    }) => {
                        self.cursor += 1;
                        Ok(inner)
                    }
                    Some(other) => Err(FormulaError::UnexpectedToken {
                        token: describe(&other.token),
                        offset: other.offset,
                    }),
                    None => Err(FormulaError::UnexpectedEnd {
                        offset: self.source_len,
                    }),
                }
            }
            other => Err(FormulaError::UnexpectedToken {
                token: describe(other),
                offset: spanned.offset,
            }),
        }
    }

    fn enter(&mut self) -> Result<(), FormulaError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(FormulaError::TooDeeplyNested {
                limit: MAX_NESTING_DEPTH,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn bind(&mut self, name: &str, index: Option<usize>) -> Expr {
        let value = index
            .filter(|index| *index >= 1)
            .and_then(|index| self.bindings.get(index - 1))
            .copied();

        match value {
            Some(value) => Expr::Placeholder {
                name: name.to_string(),
                value,
            },
            None => {
                if !self.unresolved.iter().any(|seen| seen == name) {
                    self.unresolved.push(name.to_string());
                }
                Expr::Placeholder {
                    name: name.to_string(),
                    value: 0.0,
                }
            }
        }
    }

    fn peek_op(&self, accepted: &[Token]) -> Option<BinaryOp> {
        let token = &self.tokens.get(self.cursor)?.token;
        if !accepted.contains(token) {
            return None;
        }
        match token {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Subtract),
            Token::Star => Some(BinaryOp::Multiply),
            Token::Slash => Some(BinaryOp::Divide),
            _ => None,
        }
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Number(value) => value.to_string(),
        Token::Placeholder { name, .. } => name.clone(),
        Token::Plus => "+".to_string(),
        Token::Minus => "-".to_string(),
        Token::Star => "*".to_string(),
        Token::Slash => "/".to_string(),
        Token::LeftParen => "(".to_string(),
        Token::RightParen => ")".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn parse(source: &str, bindings: &[f64]) -> Result<(Expr, Vec<String>), FormulaError> {
        let tokens = tokenize(source)?;
        Parser::new(&tokens, bindings, source.len()).parse()
    }

    fn eval(source: &str, bindings: &[f64]) -> Result<f64, FormulaError> {
        parse(source, bindings)?.0.evaluate()
    }

    #[test]
    fn respects_operator_precedence_and_grouping() {
        assert_eq!(eval("2 + 3 * 4", &[]), Ok(14.0));
        assert_eq!(eval("(2 + 3) * 4", &[]), Ok(20.0));
        assert_eq!(eval("10 - 4 - 3", &[]), Ok(3.0));
        assert_eq!(eval("8 / 4 / 2", &[]), Ok(1.0));
    }

    #[test]
    fn supports_unary_signs() {
        assert_eq!(eval("-eval1 + 10", &[4.0]), Ok(6.0));
        assert_eq!(eval("+3 * -(2)", &[]), Ok(-6.0));
    }

    #[test]
    fn binds_placeholders_without_prefix_collisions() {
        let bindings: Vec<f64> = (1..=10).map(f64::from).collect();
        assert_eq!(eval("eval1 + eval10", &bindings), Ok(11.0));
    }

    #[test]
    fn unresolved_placeholders_bind_to_zero() {
        let (expr, unresolved) = parse("eval1 + eval3 + eval0 + eval3", &[5.0]).expect("parses");
        assert_eq!(expr.evaluate(), Ok(5.0));
        assert_eq!(unresolved, vec!["eval3".to_string(), "eval0".to_string()]);
    }

    #[test]
    fn division_by_zero_fails() {
        assert_eq!(
            eval("eval1 / eval2", &[7.0, 0.0]),
            Err(FormulaError::DivisionByZero)
        );
    }

    #[test]
    fn reports_structural_errors() {
        assert!(matches!(
            parse("eval1 +", &[1.0]),
            Err(FormulaError::UnexpectedEnd { offset: 7 })
        ));
        assert!(matches!(
            parse("(eval1 + 2", &[1.0]),
            Err(FormulaError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            parse("eval1 eval2", &[1.0, 2.0]),
            Err(FormulaError::UnexpectedToken { offset: 6, .. })
        ));
        assert!(matches!(
            parse("* 2", &[]),
            Err(FormulaError::UnexpectedToken { offset: 0, .. })
        ));
        assert!(matches!(
            parse("()", &[]),
            Err(FormulaError::UnexpectedToken { offset: 1, .. })
        ));
        assert!(matches!(
            parse("   ", &[]),
            Err(FormulaError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn rejects_excessive_nesting() {
        let source = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(
            parse(&source, &[]).map(|(expr, _)| expr),
            Err(FormulaError::TooDeeplyNested {
                limit: MAX_NESTING_DEPTH
            })
        );

        let unary = format!("{}1", "-".repeat(200));
        assert!(matches!(
            parse(&unary, &[]),
            Err(FormulaError::TooDeeplyNested { .. })
        ));
    }

    #[test]
    fn rejects_flat_chains_longer_than_the_token_limit() {
        let at_limit = format!("1{}", " + 1".repeat((MAX_FORMULA_TOKENS - 1) / 2));
        assert_eq!(eval(&at_limit, &[]), Ok(128.0));

        let too_long = format!("eval1{}", " + 1".repeat(20_000));
        assert_eq!(
            parse(&too_long, &[5.0]).map(|(expr, _)| expr),
            Err(FormulaError::TooLong {
                limit: MAX_FORMULA_TOKENS
            })
        );
    }
}
