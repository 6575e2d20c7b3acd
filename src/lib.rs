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

//! JMC syntax front-end
//!
//! This crate provides the tokenizer, argument parser and structural
//! (class) expander for the JMC datapack language. It turns source text
//! into a flat stream of function bodies and their call arguments; turning
//! those into `.mcfunction` output is deliberately someone else's job.
//!
//! ```
//! use jmc_syntax::tokenizer::tokenize;
//!
//! let program = tokenize("say \"hello\";", "main.jmc").unwrap();
//! assert_eq!(program.len(), 1);
//! ```
#![warn(clippy::all)]

pub mod args;
pub mod class;
pub mod error;
pub mod escape;
pub mod position;
pub mod token;
pub mod tokenizer;

pub use error::SyntaxError;
pub use position::Position;
pub use token::{Program, Statement, Token, TokenKind};
pub use tokenizer::{tokenize, Tokenizer};
