/*
 * Copyright (c) 2026. Mikhail Kulik.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

pub mod lexer;
pub mod ll1;
pub mod parser;

#[cfg(test)]
mod tests;

use ast::diagnostic::Diagnostic;
use ast::nominal::Program;
use lexer::SpannedToken;
use parser::Parser;

/// Parse a token stream into a nominal program.
///
/// `sources` holds the text of every input file, indexed by the file ids the
/// lexer stamped into the token spans. The grammar tables are validated for
/// LL(1)-ness before the first token is consumed; any violation is an
/// internal fatal diagnostic.
pub fn parse<I>(tokens: I, sources: Vec<String>) -> Result<Program, Vec<Diagnostic>>
where
    I: Iterator<Item = SpannedToken>,
{
    let mut parser = Parser::new(tokens, sources).map_err(|d| vec![d])?;
    parser.parse_program().map_err(|e| vec![e.into_fatal()])
}
