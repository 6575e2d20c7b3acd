// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Argument parser
//!
//! Reinterprets a `ParenRound` token's interior as a function call's
//! positional and keyword arguments, recognizing the inline arrow-function
//! literal `() => { ... }` along the way.

use std::collections::HashMap;

use log::trace;

use crate::error::SyntaxError;
use crate::token::{Token, TokenKind};
use crate::tokenizer::Tokenizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrowState {
    None,
    SawEmptyParens,
    SawArrow,
}

impl<'a> Tokenizer<'a> {
    /// Reinterpret `token` (which must be a [`TokenKind::ParenRound`]) as a
    /// call's positional arguments and keyword arguments.
    pub fn parse_args(&self, token: &Token) -> Result<(Vec<Token>, HashMap<String, Token>), SyntaxError> {
        if token.kind != TokenKind::ParenRound {
            return Err(self.error(token.pos.line, token.pos.col, "Expected ("));
        }

        let interior = &token.text[1..token.text.len() - 1];
        let tokens = self.tokenize_expr(interior, token.pos.line, token.pos.col)?;
        trace!("parsing {} tokens of argument list", tokens.len());

        let mut positional: Vec<Token> = Vec::new();
        let mut keyword: HashMap<String, Token> = HashMap::new();
        let mut arg = String::new();
        let mut key = String::new();
        let mut arrow_state = ArrowState::None;
        let mut last_token: Option<Token> = None;

        for tok in tokens {
            if arrow_state == ArrowState::SawEmptyParens {
                if tok.kind == TokenKind::Keyword && tok.text == "=>" {
                    arrow_state = ArrowState::SawArrow;
                    last_token = Some(tok);
                    continue;
                }
                // Not an arrow function after all: the remembered `()` was
                // an ordinary value. Commit it, then fall through to
                // dispatch the current token normally.
                arg = "()".to_string();
                if !key.is_empty() {
                    let trigger = last_token
                        .as_ref()
                        .expect("arrow_state transitions only after a token was seen");
                    commit_keyword(self, &mut keyword, &mut key, &mut arg, trigger)?;
                }
                arrow_state = ArrowState::None;
            } else if arrow_state == ArrowState::SawArrow {
                if tok.kind != TokenKind::ParenCurly {
                    return Err(self.error(tok.pos.line, tok.pos.col, "Expected {"));
                }
                let body = tok.text[1..tok.text.len() - 1].to_string();
                let func_token = Token::new(TokenKind::Func, tok.pos, body);
                arg = func_token.text.clone();
                if !key.is_empty() {
                    commit_keyword(self, &mut keyword, &mut key, &mut arg, &func_token)?;
                }
                arrow_state = ArrowState::None;
                last_token = Some(func_token);
                continue;
            }

            match tok.kind {
                TokenKind::ParenRound if tok.text == "()" => {
                    arrow_state = ArrowState::SawEmptyParens;
                    last_token = Some(tok);
                    continue;
                }
                TokenKind::ParenRound | TokenKind::ParenSquare | TokenKind::ParenCurly | TokenKind::String => {
                    arg = tok.text.clone();
                    if !key.is_empty() {
                        commit_keyword(self, &mut keyword, &mut key, &mut arg, &tok)?;
                    }
                }
                TokenKind::Comma => {
                    arrow_state = ArrowState::None;
                    if !arg.is_empty() {
                        let trigger = last_token
                            .as_ref()
                            .expect("a staged positional implies a preceding token");
                        commit_positional(self, &mut positional, &keyword, &mut arg, trigger)?;
                    }
                }
                TokenKind::Keyword => dispatch_keyword(self, &tok, &mut key, &mut arg, &mut keyword)?,
                TokenKind::Func => unreachable!("Func tokens never appear in a raw token stream"),
            }

            last_token = Some(tok);
        }

        if arrow_state == ArrowState::SawEmptyParens {
            let trigger = last_token
                .as_ref()
                .expect("arrow_state transitions only after a token was seen");
            arg = "()".to_string();
            if !key.is_empty() {
                commit_keyword(self, &mut keyword, &mut key, &mut arg, trigger)?;
            }
        }

        if !arg.is_empty() {
            let trigger = last_token
                .as_ref()
                .expect("a staged positional implies a preceding token");
            commit_positional(self, &mut positional, &keyword, &mut arg, trigger)?;
        }

        Ok((positional, keyword))
    }
}

fn dispatch_keyword(
    tokenizer: &Tokenizer,
    tok: &Token,
    key: &mut String,
    arg: &mut String,
    keyword: &mut HashMap<String, Token>,
) -> Result<(), SyntaxError> {
    if !arg.is_empty() {
        match tok.text.strip_prefix('=') {
            Some(rest) => {
                *key = std::mem::take(arg);
                *arg = rest.to_string();
                if !arg.is_empty() {
                    commit_keyword(tokenizer, keyword, key, arg, tok)?;
                }
            }
            None => {
                return Err(tokenizer.error(tok.pos.line, tok.pos.col, "Unexpected token"));
            }
        }
        return Ok(());
    }

    if !key.is_empty() {
        *arg = tok.text.clone();
        if let Some(eq_idx) = tok.text.find('=') {
            let col = tok.pos.col + eq_idx + 1;
            return Err(tokenizer.error(tok.pos.line, col, "Duplicated equal sign(=)"));
        }
        commit_keyword(tokenizer, keyword, key, arg, tok)?;
        return Ok(());
    }

    let eq_count = tok.text.matches('=').count();
    if eq_count > 1 {
        let last_eq = tok.text.rfind('=').expect("eq_count > 1 implies at least one '='");
        let col = tok.pos.col + last_eq + 1;
        return Err(tokenizer.error(tok.pos.line, col, "Duplicated equal sign(=)"));
    }

    if let Some(stripped) = tok.text.strip_suffix('=') {
        *key = stripped.to_string();
    } else if let Some(eq_idx) = tok.text.find('=') {
        *key = tok.text[..eq_idx].to_string();
        *arg = tok.text[eq_idx + 1..].to_string();
        commit_keyword(tokenizer, keyword, key, arg, tok)?;
    } else {
        *arg = tok.text.clone();
    }

    Ok(())
}

fn commit_positional(
    tokenizer: &Tokenizer,
    positional: &mut Vec<Token>,
    keyword: &HashMap<String, Token>,
    arg: &mut String,
    trigger: &Token,
) -> Result<(), SyntaxError> {
    if !keyword.is_empty() {
        return Err(tokenizer.error(
            trigger.pos.line,
            trigger.pos.col + 1,
            "Positional argument follows keyword argument",
        ));
    }
    positional.push(Token::new(trigger.kind, trigger.pos, std::mem::take(arg)));
    Ok(())
}

fn commit_keyword(
    tokenizer: &Tokenizer,
    keyword: &mut HashMap<String, Token>,
    key: &mut String,
    arg: &mut String,
    trigger: &Token,
) -> Result<(), SyntaxError> {
    if key.is_empty() {
        return Err(tokenizer.error(trigger.pos.line, trigger.pos.col, "Empty key"));
    }
    if matches!(key.chars().next(), Some('{') | Some('(') | Some('[')) {
        return Err(tokenizer.error(
            trigger.pos.line,
            trigger.pos.col,
            format!("Invalid key({})", key),
        ));
    }
    if keyword.contains_key(key.as_str()) {
        return Err(tokenizer.error(
            trigger.pos.line,
            trigger.pos.col,
            format!("Duplicated key({})", key),
        ));
    }
    keyword.insert(std::mem::take(key), Token::new(trigger.kind, trigger.pos, std::mem::take(arg)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn paren_round(src: &str) -> Token {
        let program = tokenize(src, "test.jmc").unwrap();
        program[0]
            .iter()
            .find(|t| t.kind == TokenKind::ParenRound)
            .cloned()
            .expect("fixture source must contain a parenthesized call")
    }

    #[test]
    fn keyword_arguments_only() {
        let tokenizer = Tokenizer::new("test.jmc", "foo(x=1, y=2);");
        let token = paren_round("foo(x=1, y=2);");
        let (positional, keyword) = tokenizer.parse_args(&token).unwrap();
        assert!(positional.is_empty());
        assert_eq!(keyword.get("x").unwrap().text, "1");
        assert_eq!(keyword.get("y").unwrap().text, "2");
    }

    #[test]
    fn positional_arguments_only() {
        let tokenizer = Tokenizer::new("test.jmc", "foo(1, 2);");
        let token = paren_round("foo(1, 2);");
        let (positional, keyword) = tokenizer.parse_args(&token).unwrap();
        assert!(keyword.is_empty());
        assert_eq!(positional.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(), vec!["1", "2"]);
    }

    #[test]
    fn arrow_function_literal_becomes_a_func_token() {
        let src = "run(() => { say hi; });";
        let tokenizer = Tokenizer::new("test.jmc", src);
        let token = paren_round(src);
        let (positional, keyword) = tokenizer.parse_args(&token).unwrap();
        assert!(keyword.is_empty());
        assert_eq!(positional.len(), 1);
        assert_eq!(positional[0].kind, TokenKind::Func);
        assert_eq!(positional[0].text, " say hi; ");
    }

    #[test]
    fn positional_after_keyword_is_an_error() {
        let src = "foo(1, x=2, 3);";
        let tokenizer = Tokenizer::new("test.jmc", src);
        let token = paren_round(src);
        let err = tokenizer.parse_args(&token).unwrap_err();
        assert!(err.message.contains("Positional argument follows keyword argument"));
    }

    #[test]
    fn duplicated_key_is_an_error() {
        let src = "foo(x=1, x=2);";
        let tokenizer = Tokenizer::new("test.jmc", src);
        let token = paren_round(src);
        let err = tokenizer.parse_args(&token).unwrap_err();
        assert!(err.message.contains("Duplicated key"));
    }

    #[test]
    fn empty_parens_without_arrow_is_a_positional_unit_value() {
        let src = "foo(());";
        let tokenizer = Tokenizer::new("test.jmc", src);
        let token = paren_round(src);
        let (positional, keyword) = tokenizer.parse_args(&token).unwrap();
        assert!(keyword.is_empty());
        assert_eq!(positional.len(), 1);
        assert_eq!(positional[0].text, "()");
    }

    #[test]
    fn duplicated_equal_sign_is_an_error() {
        let src = "foo(x==1);";
        let tokenizer = Tokenizer::new("test.jmc", src);
        let token = paren_round(src);
        let err = tokenizer.parse_args(&token).unwrap_err();
        assert!(err.message.contains("Duplicated equal sign"));
    }

    #[test]
    fn non_paren_round_token_is_rejected() {
        let program = tokenize("foo[1];", "test.jmc").unwrap();
        let token = program[0]
            .iter()
            .find(|t| t.kind == TokenKind::ParenSquare)
            .unwrap()
            .clone();
        let tokenizer = Tokenizer::new("test.jmc", "foo[1];");
        assert!(tokenizer.parse_args(&token).is_err());
    }
}
