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

//! JMC tokenizer
//!
//! A single-pass, character-driven state machine. It performs bracket
//! balancing, string-literal decoding, comment skipping and statement
//! termination, and it is reused (not reimplemented) by the argument parser
//! and the structural expander whenever they need to re-tokenize a fragment
//! of already-tokenized text.

use log::{debug, trace};

use crate::error::SyntaxError;
use crate::escape;
use crate::position::Position;
use crate::token::{Program, Statement, Token, TokenKind};

/// The tokenizer's working state. Modeled as a small owned struct per scan,
/// never exposed to callers beyond the `Token` values it emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    None,
    Keyword,
    Str,
    Paren,
    Comment,
}

fn matching_close(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        _ => unreachable!("matching_close called with non-opener {:?}", open),
    }
}

fn is_keyword_terminator(ch: char) -> bool {
    matches!(ch, '\'' | '"' | '{' | '(' | '[' | ';' | ',') || ch.is_whitespace()
}

/// The JMC tokenizer. One instance is created per compile unit (one source
/// file, or one already-captured fragment being re-interpreted); it retains
/// the unit's file path and full source text so that errors raised while
/// re-tokenizing a fragment (an argument list's interior, a class body)
/// still point at the real, original source rather than the fragment.
pub struct Tokenizer<'a> {
    file_path: &'a str,
    source: &'a str,
}

impl<'a> Tokenizer<'a> {
    pub fn new(file_path: &'a str, source: &'a str) -> Self {
        debug!("initializing tokenizer for {}", file_path);
        Tokenizer { file_path, source }
    }

    pub fn file_path(&self) -> &'a str {
        self.file_path
    }

    /// The full original source text, used for error excerpts by callers
    /// (the argument parser, the structural expander) that re-tokenize a
    /// fragment of it.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Tokenize the whole source in statement mode.
    pub fn tokenize(&self) -> Result<Program, SyntaxError> {
        self.tokenize_fragment(self.source, 1, 1, true)
    }

    /// Tokenize `fragment` in statement mode (`;`-terminated), starting at
    /// `start_line`/`start_col` in the *original* source's coordinate
    /// space. Used internally whenever a fragment's positions must line up
    /// with the enclosing source (e.g. a class body).
    pub fn tokenize_fragment(
        &self,
        fragment: &str,
        start_line: usize,
        start_col: usize,
        expect_semicolon: bool,
    ) -> Result<Program, SyntaxError> {
        Scanner::new(self.file_path, self.source, start_line, start_col).run(fragment, expect_semicolon)
    }

    /// Tokenize `fragment` in expression mode (no `;` permitted), returning
    /// the single resulting statement (empty if `fragment` yielded no
    /// tokens at all).
    pub fn tokenize_expr(
        &self,
        fragment: &str,
        start_line: usize,
        start_col: usize,
    ) -> Result<Statement, SyntaxError> {
        let mut program = self.tokenize_fragment(fragment, start_line, start_col, false)?;
        Ok(program.pop().unwrap_or_default())
    }

    /// Build a `SyntaxError` pointing at this tokenizer's original source,
    /// for use by callers (the argument parser, the structural expander)
    /// that re-tokenize fragments of it.
    pub(crate) fn error(&self, line: usize, col: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.file_path, self.source, line, col, message)
    }
}

/// Top-level convenience matching the core's stated contract:
/// `tokenize(source, file_path) -> Program`.
pub fn tokenize(source: &str, file_path: &str) -> Result<Program, SyntaxError> {
    Tokenizer::new(file_path, source).tokenize()
}

struct Scanner<'a> {
    file_path: &'a str,
    diag_source: &'a str,

    line: usize,
    col: usize,

    mode: Mode,
    token: String,
    token_pos: Option<Position>,

    // String / in-bracket-string sub-state (shared, since the two never
    // overlap in time).
    quote: char,
    is_escaped: bool,

    // Bracket sub-state.
    paren: char,
    r_paren: char,
    paren_count: i32,
    in_string: bool,

    prev_was_slash: bool,

    statement: Statement,
    program: Program,
}

impl<'a> Scanner<'a> {
    fn new(file_path: &'a str, diag_source: &'a str, start_line: usize, start_col: usize) -> Self {
        Scanner {
            file_path,
            diag_source,
            line: start_line,
            col: start_col - 1,
            mode: Mode::None,
            token: String::new(),
            token_pos: None,
            quote: '\0',
            is_escaped: false,
            paren: '\0',
            r_paren: '\0',
            paren_count: 0,
            in_string: false,
            prev_was_slash: false,
            statement: Vec::new(),
            program: Vec::new(),
        }
    }

    fn err(&self, line: usize, col: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.file_path, self.diag_source, line, col, message)
    }

    fn pos(&self) -> Position {
        Position::new(self.line, self.col)
    }

    fn push_token(&mut self, kind: TokenKind, text: String) {
        let pos = self
            .token_pos
            .take()
            .expect("push_token called with no token start recorded");
        trace!("emitting {:?} token {:?} at {}", kind, text, pos);
        self.statement.push(Token::new(kind, pos, text));
        self.token.clear();
        self.mode = Mode::None;
    }

    fn flush_statement(&mut self) {
        if !self.statement.is_empty() {
            let statement = std::mem::take(&mut self.statement);
            debug!("flushing statement of {} tokens", statement.len());
            self.program.push(statement);
        }
    }

    fn run(mut self, fragment: &str, expect_semicolon: bool) -> Result<Program, SyntaxError> {
        for ch in fragment.chars() {
            self.col += 1;

            // A bare top-level semicolon is a syntax error in expression
            // mode; one embedded inside a still-open bracket group is just
            // ordinary bracket content (e.g. an arrow function's body).
            if !expect_semicolon && ch == ';' && self.mode != Mode::Paren {
                return Err(self.err(self.line, self.col, "Unexpected semicolon(;)"));
            }

            if ch == '\n' {
                self.handle_newline()?;
                self.line += 1;
                self.col = 0;
                self.prev_was_slash = false;
                continue;
            }

            if ch == '/' && self.prev_was_slash && self.mode != Mode::Str {
                self.mode = Mode::Comment;
                self.token.pop();
                self.prev_was_slash = false;
                continue;
            }

            if self.mode == Mode::Keyword && is_keyword_terminator(ch) {
                let text = std::mem::take(&mut self.token);
                self.push_token(TokenKind::Keyword, text);
                // fall through: re-dispatch the terminator via `Mode::None`
            } else if self.mode == Mode::Keyword {
                self.token.push(ch);
                self.prev_was_slash = ch == '/';
                continue;
            }

            match self.mode {
                Mode::None => self.dispatch_none(ch)?,
                Mode::Str => self.dispatch_string(ch)?,
                Mode::Paren => self.dispatch_paren(ch, expect_semicolon)?,
                Mode::Comment | Mode::Keyword => {}
            }

            self.prev_was_slash = ch == '/';
        }

        self.finish(expect_semicolon)
    }

    fn handle_newline(&mut self) -> Result<(), SyntaxError> {
        match self.mode {
            Mode::Str => {
                return Err(self.err(
                    self.line,
                    self.col,
                    "String literal contains an unescaped line break",
                ));
            }
            Mode::Comment => self.mode = Mode::None,
            Mode::Keyword => {
                let text = std::mem::take(&mut self.token);
                self.push_token(TokenKind::Keyword, text);
            }
            Mode::Paren => self.token.push('\n'),
            Mode::None => {}
        }
        Ok(())
    }

    fn dispatch_none(&mut self, ch: char) -> Result<(), SyntaxError> {
        match ch {
            '\'' | '"' => {
                self.mode = Mode::Str;
                self.token_pos = Some(self.pos());
                self.quote = ch;
                self.is_escaped = false;
                self.token.clear();
                self.token.push(ch);
            }
            c if c.is_whitespace() => {}
            ';' => self.flush_statement(),
            '{' | '(' | '[' => {
                self.mode = Mode::Paren;
                self.token.clear();
                self.token.push(ch);
                self.token_pos = Some(self.pos());
                self.paren = ch;
                self.r_paren = matching_close(ch);
                self.paren_count = 0;
                self.in_string = false;
            }
            '}' | ')' | ']' => {
                return Err(self.err(self.line, self.col, "Unexpected bracket"));
            }
            '#' if self.col == 1 => self.mode = Mode::Comment,
            ',' => {
                let tok = Token::new(TokenKind::Comma, self.pos(), ",".to_string());
                self.statement.push(tok);
            }
            _ => {
                self.mode = Mode::Keyword;
                self.token_pos = Some(self.pos());
                self.token.clear();
                self.token.push(ch);
            }
        }
        Ok(())
    }

    fn dispatch_string(&mut self, ch: char) -> Result<(), SyntaxError> {
        self.token.push(ch);
        if ch == '\\' && !self.is_escaped {
            self.is_escaped = true;
        } else if ch == self.quote && !self.is_escaped {
            let pos = self.token_pos.expect("string token start recorded");
            let raw = std::mem::take(&mut self.token);
            let decoded = escape::decode(&raw[1..raw.len() - 1])
                .map_err(|message| self.err(pos.line, pos.col, message))?;
            self.push_token(TokenKind::String, decoded);
        } else if self.is_escaped {
            self.is_escaped = false;
        }
        Ok(())
    }

    fn dispatch_paren(&mut self, ch: char, expect_semicolon: bool) -> Result<(), SyntaxError> {
        self.token.push(ch);

        if self.in_string {
            if ch == '\\' && !self.is_escaped {
                self.is_escaped = true;
            } else if ch == self.quote && !self.is_escaped {
                self.in_string = false;
            } else if self.is_escaped {
                self.is_escaped = false;
            }
            return Ok(());
        }

        if ch == self.r_paren && self.paren_count == 0 {
            let kind = match self.paren {
                '(' => TokenKind::ParenRound,
                '[' => TokenKind::ParenSquare,
                '{' => TokenKind::ParenCurly,
                _ => unreachable!(),
            };
            let is_curly = self.paren == '{';
            let text = std::mem::take(&mut self.token);
            self.push_token(kind, text);
            if is_curly && expect_semicolon {
                self.flush_statement();
            }
            return Ok(());
        }

        if ch == self.paren {
            self.paren_count += 1;
        } else if ch == self.r_paren {
            self.paren_count -= 1;
        } else if ch == '\'' || ch == '"' {
            self.in_string = true;
            self.quote = ch;
        }
        Ok(())
    }

    fn finish(mut self, expect_semicolon: bool) -> Result<Program, SyntaxError> {
        if self.mode == Mode::Keyword {
            if !self.token.is_empty() {
                let text = std::mem::take(&mut self.token);
                self.push_token(TokenKind::Keyword, text);
            }
            if !expect_semicolon {
                self.flush_statement();
            }
        }

        if self.mode == Mode::Str {
            let pos = self.token_pos.expect("open string has a start position");
            return Err(self.err(pos.line, pos.col, "Unterminated string literal"));
        }

        if self.mode == Mode::Paren {
            let pos = self.token_pos.expect("open bracket has a start position");
            return Err(self.err(pos.line, pos.col, "Bracket was never closed"));
        }

        if expect_semicolon {
            if let Some(last) = self.statement.last() {
                return Err(self.err(
                    last.pos.line,
                    last.pos.col + last.length,
                    "Expected semicolon(;)",
                ));
            }
        } else {
            self.flush_statement();
        }

        Ok(self.program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_text(statement: &Statement) -> Vec<(TokenKind, &str)> {
        statement.iter().map(|t| (t.kind, t.text.as_str())).collect()
    }

    #[test]
    fn tokenizes_simple_call() {
        let program = tokenize("foo(1, 2);", "test.jmc").unwrap();
        assert_eq!(program.len(), 1);
        assert_eq!(
            kinds_and_text(&program[0]),
            vec![(TokenKind::Keyword, "foo"), (TokenKind::ParenRound, "(1, 2)")]
        );
    }

    #[test]
    fn semicolon_inside_string_inside_parens_stays_opaque() {
        let program = tokenize(r#"foo("a;b");"#, "test.jmc").unwrap();
        assert_eq!(
            kinds_and_text(&program[0]),
            vec![(TokenKind::Keyword, "foo"), (TokenKind::ParenRound, r#"("a;b")"#)]
        );
    }

    #[test]
    fn class_body_is_one_curly_token_and_self_terminates() {
        let program = tokenize("class A { function f() { say hi; } }", "test.jmc").unwrap();
        assert_eq!(program.len(), 1);
        assert_eq!(
            kinds_and_text(&program[0]),
            vec![
                (TokenKind::Keyword, "class"),
                (TokenKind::Keyword, "A"),
                (TokenKind::ParenCurly, "{ function f() { say hi; } }"),
            ]
        );
    }

    #[test]
    fn line_comment_is_skipped() {
        let program = tokenize("// a comment\nfoo;", "test.jmc").unwrap();
        assert_eq!(program.len(), 1);
        assert_eq!(kinds_and_text(&program[0]), vec![(TokenKind::Keyword, "foo")]);
    }

    #[test]
    fn hash_comment_only_at_column_one() {
        let program = tokenize("#load me;\nfoo;", "test.jmc").unwrap();
        assert_eq!(program.len(), 1);
        assert_eq!(kinds_and_text(&program[0]), vec![(TokenKind::Keyword, "foo")]);
    }

    #[test]
    fn string_escapes_decode() {
        let program = tokenize(r#"say "a\nb";"#, "test.jmc").unwrap();
        let tok = &program[0][1];
        assert_eq!(tok.kind, TokenKind::String);
        assert_eq!(tok.text, "a\nb");
        assert_eq!(tok.length, tok.text.chars().count() + 2);
    }

    #[test]
    fn unterminated_string_reports_position() {
        let err = tokenize("\"unterminated", "test.jmc").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.to_lowercase().contains("unterminated"));
    }

    #[test]
    fn unterminated_string_via_newline_reports_unescaped_break() {
        let err = tokenize("say \"oops\nmore;", "test.jmc").unwrap_err();
        assert!(err.message.to_lowercase().contains("unescaped line break"));
    }

    #[test]
    fn missing_semicolon_at_eof_is_an_error() {
        let err = tokenize("foo", "test.jmc").unwrap_err();
        assert!(err.message.to_lowercase().contains("semicolon"));
    }

    #[test]
    fn unmatched_close_bracket_is_an_error() {
        // A closing bracket only errors when it starts a fresh token (here,
        // right after a statement-ending `;`); mid-keyword it is legal
        // keyword material, per the tokenizer's terminator table.
        let err = tokenize("foo; );", "test.jmc").unwrap_err();
        assert!(err.message.to_lowercase().contains("bracket"));
    }

    #[test]
    fn stray_closing_bracket_mid_keyword_is_not_an_error() {
        let program = tokenize("foo);", "test.jmc").unwrap();
        assert_eq!(kinds_and_text(&program[0]), vec![(TokenKind::Keyword, "foo)")]);
    }

    #[test]
    fn unclosed_bracket_is_an_error() {
        let err = tokenize("foo(1, 2;", "test.jmc").unwrap_err();
        assert!(err.message.to_lowercase().contains("never closed"));
    }

    #[test]
    fn tokenizing_twice_is_deterministic() {
        let src = "class A { function f(x=1) { say hi; } } run(() => { say bye; });";
        assert_eq!(tokenize(src, "test.jmc"), tokenize(src, "test.jmc"));
    }

    #[test]
    fn positions_point_at_token_start() {
        let program = tokenize("foo(1);", "test.jmc").unwrap();
        let statement = &program[0];
        assert_eq!(statement[0].pos, Position::new(1, 1));
        assert_eq!(statement[1].pos, Position::new(1, 4));
    }

    #[test]
    fn expression_mode_allows_semicolons_inside_arrow_function_body() {
        let tokenizer = Tokenizer::new("test.jmc", "run(() => { say hi; });");
        let statement = tokenizer
            .tokenize_expr("() => { say hi; }", 1, 5)
            .expect("semicolons nested in a curly body must not abort expression mode");
        assert_eq!(
            kinds_and_text(&statement),
            vec![
                (TokenKind::ParenRound, "()"),
                (TokenKind::Keyword, "=>"),
                (TokenKind::ParenCurly, "{ say hi; }"),
            ]
        );
    }

    #[test]
    fn expression_mode_rejects_top_level_semicolon() {
        let tokenizer = Tokenizer::new("test.jmc", "a;b");
        let err = tokenizer.tokenize_expr("a;b", 1, 1).unwrap_err();
        assert!(err.message.to_lowercase().contains("semicolon"));
    }

    #[test]
    fn expression_mode_on_empty_input_is_an_empty_statement() {
        let tokenizer = Tokenizer::new("test.jmc", "()");
        let statement = tokenizer.tokenize_expr("", 1, 1).unwrap();
        assert!(statement.is_empty());
    }
}
