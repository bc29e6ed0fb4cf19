// Copyright (c) 2017 King's College London
// created by the Software Development Team <http://soft-dev.org/>
//
// The Universal Permissive License (UPL), Version 1.0
//
// Subject to the condition set forth below, permission is hereby granted to any person obtaining a
// copy of this software, associated documentation and/or data (collectively the "Software"), free
// of charge and under any and all copyright rights in the Software, and any and all patent rights
// owned or freely licensable by each licensor hereunder covering either (i) the unmodified
// Software as contributed to or provided by such licensor, or (ii) the Larger Works (as defined
// below), to deal in both
//
// (a) the Software, and
// (b) any piece of software and/or hardware listed in the lrgrwrks.txt file
// if one is included with the Software (each a "Larger Work" to which the Software is contributed
// by such licensors),
//
// without restriction, including without limitation the rights to copy, create derivative works
// of, display, perform, and distribute the Software and make, use, sell, offer for sale, import,
// export, have made, and have sold the Software and the Larger Work(s), and to sublicense the
// foregoing rights on either these or other terms.
//
// This license is subject to the following condition: The above copyright notice and either this
// complete permission notice or at a minimum a reference to the UPL must be included in all copies
// or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
// BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! The incremental GLR parse driver: given a compiled table, a lexer, and
//! (optionally) the tree from a previous parse of a similar input, produces
//! a single best tree, reusing as much of the previous tree as the table
//! allows and recovering from lexical/syntactic errors along the way.

pub mod cursor;
pub mod debug;
pub mod engine;
pub mod lookahead;
pub mod recovery;
pub mod repair;
pub mod select;
#[cfg(test)]
mod test_table;

pub use cfgrammar::{RIdx, SymbolId, SymbolMetadata, TIdx, EOF_SYMBOL, ERROR_SYMBOL};
pub use lrtable::{Action, ParseTable, ReduceAction, ShiftAction, StIdx, StateOrError};
pub use lrlex::{LexOutcome, Lexeme, LexRule, Lexer, RegexLexer};
pub use tree::{LexState, Tree};

pub use debug::{DebugEvent, Debugger};
pub use engine::ConsumeResult;
pub use repair::FoundRepair;

use cursor::ReusableNode;
use stack::Stack;

/// Drives one or more `ParseTable`-described grammars' worth of GLR state
/// over a single input string. Not `Sync`/`Send`: a parser holds borrowed
/// and boxed trait objects with no internal synchronization, matching the
/// assumption that independent parses run on independent threads with
/// nothing shared between them.
pub struct Parser<'a> {
    table: &'a dyn ParseTable,
    lexer: Box<dyn Lexer>,
    debugger: Option<Debugger<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(table: &'a dyn ParseTable, lexer: Box<dyn Lexer>) -> Parser<'a> {
        Parser {
            table,
            lexer,
            debugger: None,
        }
    }

    pub fn set_debugger(&mut self, debugger: Debugger<'a>) {
        self.debugger = Some(debugger);
    }

    /// Parse `input` from scratch, or incrementally against `previous_tree`
    /// when one is supplied. Returns `None` only if every version died
    /// without ever reaching `Accept` — a grammar/lexer combination that
    /// can't make progress on this input at all, which a table with a
    /// working error-recovery path should never produce.
    pub fn parse(&mut self, input: &str, previous_tree: Option<&Tree>) -> Option<Tree> {
        self.lexer.set_input(input);
        let mut stack = Stack::new(Some(self.table.start_state()));
        let mut cursors: Vec<ReusableNode> = vec![ReusableNode::new(previous_tree.cloned())];
        let mut accepted: Option<Tree> = None;

        while stack.version_count() > 0 {
            let mut v = 0;
            while v < stack.version_count() {
                let state = stack.top_state(v);
                let top_position = stack.top_position(v);
                let lookahead =
                    lookahead::get_lookahead(self.table, &mut *self.lexer, state, top_position, &mut cursors[v]);
                if lookahead.request_breakdown {
                    engine::breakdown_top(&mut stack, v);
                }

                let outcome = engine::consume_lookahead(self.table, &mut stack, v, &lookahead.tree, &mut self.debugger);

                // Forks append new versions at the tail; give each one its
                // own copy of the cursor it forked from so it keeps reusing
                // the same previous-tree position its sibling does.
                while cursors.len() < stack.version_count() {
                    cursors.push(cursors[v].clone());
                }

                match outcome {
                    ConsumeResult::Shifted => v += 1,
                    ConsumeResult::Accepted(tree) => {
                        let keep = match &accepted {
                            Some(existing) => select::select_tree(existing, &tree),
                            None => true,
                        };
                        if keep {
                            accepted = Some(tree);
                        }
                        stack.remove_version(v);
                        cursors.remove(v);
                    }
                    ConsumeResult::Dead => {
                        stack.remove_version(v);
                        cursors.remove(v);
                    }
                }
            }

            stack.condense();
            // A merge can fold two versions with unrelated reuse cursors
            // into one; rather than guess which survivor's cursor is still
            // valid, any slot condense() leaves unaccounted for falls back
            // to lexing fresh from here on. Correct, if not maximally
            // reuse-friendly, at a merge point.
            while cursors.len() < stack.version_count() {
                cursors.push(ReusableNode::new(None));
            }
            cursors.truncate(stack.version_count());
        }

        if let Some(tree) = &accepted {
            Tree::assign_parents(tree);
        }
        accepted
    }
}
