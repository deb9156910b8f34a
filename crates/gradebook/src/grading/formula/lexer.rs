use super::FormulaError;

const PLACEHOLDER_PREFIX: &str = "eval";

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    /// `eval<digits>`; the index is `None` when the digits overflow.
    Placeholder { name: String, index: Option<usize> },
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub offset: usize,
}

/// Splits a formula into tokens, refusing anything outside the arithmetic allow-list.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>, FormulaError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut offset = 0;

    while offset < source.len() {
        let Some(ch) = source[offset..].chars().next() else {
            break;
        };

        let token = match ch {
            c if c.is_whitespace() => {
                offset += c.len_utf8();
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '0'..='9' | '.' => {
                let end = scan_while(bytes, offset, |b| b.is_ascii_digit() || b == b'.');
                let literal = &source[offset..end];
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| FormulaError::MalformedNumber {
                        literal: literal.to_string(),
                        offset,
                    })?;
                tokens.push(Spanned {
                    token: Token::Number(value),
                    offset,
                });
                offset = end;
                continue;
            }
            'e' if source[offset..].starts_with(PLACEHOLDER_PREFIX) => {
                let digits_start = offset + PLACEHOLDER_PREFIX.len();
                let end = scan_while(bytes, digits_start, |b| b.is_ascii_digit());
                if end == digits_start {
                    return Err(FormulaError::InvalidCharacter {
                        character: ch,
                        offset,
                    });
                }
                if let Some(next) = source[end..].chars().next() {
                    if next.is_alphanumeric() || next == '_' {
                        return Err(FormulaError::InvalidCharacter {
                            character: next,
                            offset: end,
                        });
                    }
                }

                tokens.push(Spanned {
                    token: Token::Placeholder {
                        name: source[offset..end].to_string(),
                        index: source[digits_start..end].parse::<usize>().ok(),
                    },
                    offset,
                });
                offset = end;
                continue;
            }
            other => {
                return Err(FormulaError::InvalidCharacter {
                    character: other,
                    offset,
                })
            }
        };

        tokens.push(Spanned { token, offset });
        offset += ch.len_utf8();
    }

    Ok(tokens)
}

fn scan_while(bytes: &[u8], start: usize, accept: impl Fn(u8) -> bool) -> usize {
    bytes[start..]
        .iter()
        .position(|b| !accept(*b))
        .map_or(bytes.len(), |len| start + len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .expect("tokenizes")
            .into_iter()
            .map(|spanned| spanned.token)
            .collect()
    }

    #[test]
    fn tokenizes_arithmetic_with_placeholders() {
        assert_eq!(
            kinds("(eval1 + eval10) * 0.5"),
            vec![
                Token::LeftParen,
                Token::Placeholder {
                    name: "eval1".to_string(),
                    index: Some(1)
                },
                Token::Plus,
                Token::Placeholder {
                    name: "eval10".to_string(),
                    index: Some(10)
                },
                Token::RightParen,
                Token::Star,
                Token::Number(0.5),
            ]
        );
    }

    #[test]
    fn rejects_letters_outside_placeholders() {
        let error = tokenize("eval1; DROP TABLE").expect_err("semicolon rejected");
        assert_eq!(
            error,
            FormulaError::InvalidCharacter {
                character: ';',
                offset: 5
            }
        );

        assert!(matches!(
            tokenize("Math.max(eval1)"),
            Err(FormulaError::InvalidCharacter { character: 'M', .. })
        ));
    }

    #[test]
    fn rejects_placeholder_with_trailing_identifier() {
        assert!(matches!(
            tokenize("eval1x"),
            Err(FormulaError::InvalidCharacter {
                character: 'x',
                offset: 5
            })
        ));
        assert!(matches!(
            tokenize("eval + 1"),
            Err(FormulaError::InvalidCharacter {
                character: 'e',
                offset: 0
            })
        ));
    }

    #[test]
    fn rejects_malformed_numbers() {
        assert!(matches!(
            tokenize("1.2.3 + eval1"),
            Err(FormulaError::MalformedNumber { offset: 0, .. })
        ));
    }
}
