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

//! The single error kind produced by the core: a fatal, position-carrying
//! syntax error. There is no recovery path; the first one found wins.

use std::error::Error;
use std::fmt;

/// A fatal syntax error, carrying enough context to render the three-line
/// diagnostic format pinned by the core's external interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub file_path: String,
    pub line: usize,
    pub col: usize,
    pub message: String,
    excerpt: String,
}

impl SyntaxError {
    /// `source` is the *original* source text the position refers to; for
    /// errors raised while re-tokenizing a fragment (an argument list's
    /// interior, a class body) this must be the enclosing compile unit's
    /// text, not the fragment, so the excerpt still points at real source.
    pub fn new(file_path: &str, source: &str, line: usize, col: usize, message: impl Into<String>) -> Self {
        SyntaxError {
            file_path: file_path.to_string(),
            line,
            col,
            message: message.into(),
            excerpt: excerpt_at(source, line, col),
        }
    }
}

fn excerpt_at(source: &str, line: usize, col: usize) -> String {
    let line_text = source.split('\n').nth(line.saturating_sub(1)).unwrap_or("");
    line_text.chars().take(col).collect()
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "In {}\n{} at line {} col {}.\n{} <-",
            self.file_path, self.message, self.line, self.col, self.excerpt
        )
    }
}

impl Error for SyntaxError {}
