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

//! Structural expander
//!
//! Flattens nested `class Name { ... }` blocks into dotted function-name
//! prefixes, handing each function body found along the way to an injected
//! collaborator rather than emitting anything itself.

use log::trace;

use crate::error::SyntaxError;
use crate::token::{Statement, Token, TokenKind};
use crate::tokenizer::Tokenizer;

/// What `expand_class` found a statement to be, once it has looked past the
/// leading keyword.
enum Shape<'t> {
    /// `class Name { ... }`
    Class { name: &'t Token, body: &'t Token },
    /// Everything else: handed to the collaborator verbatim.
    Other,
}

fn shape_of(statement: &Statement) -> Result<Shape<'_>, ()> {
    if statement[0].kind == TokenKind::Keyword && statement[0].text == "class" {
        let well_formed = statement.len() == 3
            && statement[1].kind == TokenKind::Keyword
            && statement[2].kind == TokenKind::ParenCurly;
        if !well_formed {
            return Err(());
        }
        return Ok(Shape::Class {
            name: &statement[1],
            body: &statement[2],
        });
    }
    Ok(Shape::Other)
}

impl<'a> Tokenizer<'a> {
    /// Walk `program`, recursing into every `class` block and flattening it
    /// into a dotted `prefix` handed to `on_function` along with the
    /// unexpanded remainder of each non-`class` statement's source text.
    ///
    /// `on_function(prefix, statement_source)` is called once per non-`class`
    /// top-level statement, in source order, depth-first. It returns the
    /// text this statement should be replaced by in the (conceptual) output;
    /// `expand_class` does not itself build output, only drives the walk and
    /// propagates whatever the collaborator returns or errors with.
    pub fn expand_class(
        &self,
        program: &crate::token::Program,
        prefix: &str,
        on_function: &mut dyn FnMut(&str, &Statement) -> Result<(), SyntaxError>,
    ) -> Result<(), SyntaxError> {
        for statement in program {
            match shape_of(statement) {
                Ok(Shape::Class { name, body }) => {
                    let class_name = &name.text;
                    let nested_prefix = format!("{}{}.", prefix, class_name);
                    trace!("entering class {} (prefix {:?})", class_name, nested_prefix);

                    let interior = &body.text[1..body.text.len() - 1];
                    let nested = self.tokenize_fragment(interior, body.pos.line, body.pos.col, true)?;
                    self.expand_class(&nested, &nested_prefix, on_function)?;
                }
                Ok(Shape::Other) => on_function(prefix, statement)?,
                Err(()) => {
                    let pos = statement[0].pos;
                    return Err(self.error(pos.line, pos.col, "Invalid class declaration"));
                }
            }
        }
        Ok(())
    }
}
