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

//! Tokens: the units the tokenizer emits and everything downstream consumes.

use std::fmt;

use crate::position::Position;

/// The kind of a [`Token`]. `Paren` and `Comment` are scanning-only states
/// internal to the tokenizer and never appear on an emitted token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A run of identifier/operator characters, the coarsest classification.
    Keyword,
    /// A decoded quoted string literal (quotes stripped, escapes resolved).
    String,
    /// A balanced `(...)` group; `text` includes the delimiters.
    ParenRound,
    /// A balanced `[...]` group; `text` includes the delimiters.
    ParenSquare,
    /// A balanced `{...}` group; `text` includes the delimiters.
    ParenCurly,
    /// A single `,`.
    Comma,
    /// An arrow-function body, `() => { ... }`, minus the outer braces.
    Func,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TokenKind::Keyword => "Keyword",
            TokenKind::String => "StringLiteral",
            TokenKind::ParenRound => "RoundParentheses",
            TokenKind::ParenSquare => "SquareParentheses",
            TokenKind::ParenCurly => "CurlyParentheses",
            TokenKind::Comma => "Comma",
            TokenKind::Func => "Function",
        };
        f.write_str(name)
    }
}

/// A single emitted token. Immutable once built: downstream passes never
/// mutate a `Token`, only read it or build fresh ones (e.g. the rewritten
/// `Func` token produced during arrow-function recognition).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Position,
    pub text: String,
    pub length: usize,
}

impl Token {
    pub fn new(kind: TokenKind, pos: Position, text: String) -> Self {
        let length = match kind {
            // +2 accounts for the quotes stripped out of `text`, so that
            // position arithmetic over the *original* source stays correct.
            TokenKind::String => text.chars().count() + 2,
            _ => text.chars().count(),
        };
        Token {
            kind,
            pos,
            text,
            length,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.text)
    }
}

/// An ordered, non-empty sequence of tokens terminated by a top-level `;`
/// or the close of a self-terminating curly block.
pub type Statement = Vec<Token>;

/// An ordered sequence of statements.
pub type Program = Vec<Statement>;
