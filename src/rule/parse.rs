use logos::{Logos, Span};

use crate::error::{Result, RuleError};

use super::Rule;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum Token {
    #[regex(r"[+-]?[0-9]+", |lex| lex.slice().parse::<i32>().ok())]
    Surf(i32),
    #[token(":")]
    Union,
    #[token("(")]
    Open,
    #[token(")")]
    Close,
    #[token("#")]
    Complement,
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<(Token, Span)>,
    pos: usize,
}

/// Parses a rule string. An empty or all-whitespace string yields `None`.
pub(super) fn parse(input: &str) -> Result<Option<Rule>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(input);
    while let Some(token) = lexer.next() {
        match token {
            Ok(t) => tokens.push((t, lexer.span())),
            Err(()) => {
                return Err(error(
                    input,
                    lexer.span().start,
                    format!("unknown token \"{}\"", lexer.slice()),
                ))
            }
        }
    }
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut parser = Parser {
        input,
        tokens,
        pos: 0,
    };
    let rule = parser.union()?;
    if let Some((token, span)) = parser.tokens.get(parser.pos) {
        let message = if *token == Token::Close {
            "unbalanced ')'".to_string()
        } else {
            format!("unexpected {token:?}")
        };
        return Err(error(input, span.start, message));
    }
    Ok(Some(rule))
}

fn error(input: &str, position: usize, message: String) -> crate::error::KernelError {
    RuleError::Parse {
        input: input.to_string(),
        position,
        message,
    }
    .into()
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(t, _)| *t)
    }

    fn here(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.input.len(), |(_, span)| span.start)
    }

    fn union(&mut self) -> Result<Rule> {
        let mut items = vec![self.intersection()?];
        while self.peek() == Some(Token::Union) {
            self.pos += 1;
            items.push(self.intersection()?);
        }
        Ok(Rule::or(items))
    }

    fn intersection(&mut self) -> Result<Rule> {
        let mut items = Vec::new();
        while matches!(
            self.peek(),
            Some(Token::Surf(_) | Token::Open | Token::Complement)
        ) {
            items.push(self.factor()?);
        }
        if items.is_empty() {
            return Err(error(
                self.input,
                self.here(),
                "expected surface, '(' or '#'".into(),
            ));
        }
        Ok(Rule::and(items))
    }

    fn factor(&mut self) -> Result<Rule> {
        let start = self.here();
        match self.peek() {
            Some(Token::Surf(0)) => Err(error(self.input, start, "surface 0 is not allowed".into())),
            Some(Token::Surf(i32::MIN)) => Err(error(
                self.input,
                start,
                "surface number has no positive counterpart".into(),
            )),
            Some(Token::Surf(n)) => {
                self.pos += 1;
                Ok(Rule::Literal(n))
            }
            Some(Token::Open) => {
                self.pos += 1;
                let inner = self.union()?;
                if self.peek() != Some(Token::Close) {
                    return Err(error(self.input, start, "unbalanced '('".into()));
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(Token::Complement) => {
                self.pos += 1;
                Ok(self.factor()?.complement())
            }
            _ => Err(error(
                self.input,
                start,
                "expected surface, '(' or '#'".into(),
            )),
        }
    }
}
