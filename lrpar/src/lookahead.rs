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

//! Produces the next tree a version should consume: reused from the
//! previous parse where possible, lexed fresh otherwise.

use cfgrammar::{SymbolId, ERROR_SYMBOL};
use lrlex::Lexer;
use lrtable::{Action, ParseTable, StateOrError};
use tree::{LexState, Tree};

use crate::cursor::ReusableNode;

/// A tree reusable at `state` must not be an error, must respect its lex
/// state, must match the exact parse state it was built under if fragile,
/// must still resolve to a plain shift (not a hidden-split one) in the
/// table, and must agree with the table on its `extra`-ness.
pub fn can_reuse(table: &dyn ParseTable, state: StateOrError, tree: &Tree) -> bool {
    if tree.symbol() == ERROR_SYMBOL {
        return false;
    }
    let state = match state {
        Some(s) => s,
        None => return false,
    };
    if tree.is_fragile() && tree.parse_state() != Some(state) {
        return false;
    }
    if let LexState::State(id) = tree.lex_state() {
        if table.lex_state(state).0 != id {
            return false;
        }
    }
    match table.last_action(state, tree.symbol()) {
        Action::Shift(s) if !s.can_hide_split => s.extra == table.symbol_metadata(tree.symbol()).extra,
        _ => false,
    }
}

/// Returned alongside the lookahead tree: whether the leaf it replaced a
/// changed composite tree with was itself a leaf, in which case the caller
/// should also break down the stack top before consuming it.
pub struct Lookahead {
    pub tree: Tree,
    pub request_breakdown: bool,
}

pub fn get_lookahead(
    table: &dyn ParseTable,
    lexer: &mut dyn Lexer,
    state: StateOrError,
    top_position: usize,
    cursor: &mut ReusableNode,
) -> Lookahead {
    let mut request_breakdown = false;
    loop {
        let tree = match cursor.tree() {
            Some(t) => t,
            None => break,
        };
        if cursor.char_index() > top_position {
            break;
        }
        if cursor.char_index() < top_position {
            cursor.pop();
            continue;
        }
        if tree.has_changes() {
            if tree.child_count() == 0 {
                request_breakdown = true;
            }
            cursor.breakdown();
            continue;
        }
        if !can_reuse(table, state, &tree) {
            cursor.breakdown();
            continue;
        }
        cursor.pop();
        return Lookahead {
            tree,
            request_breakdown,
        };
    }

    lexer.reset(top_position);
    let lex_state = match state {
        Some(s) => table.lex_state(s),
        None => cfgrammar::LexStateId(0),
    };
    lexer.start(lex_state, state.is_none());

    // Characters the lexer can't tokenize at all are skipped one at a time
    // (the lexer itself advances past each one); fold them into the next
    // real token's leading padding rather than surfacing a standalone error
    // symbol the table would have no action for.
    let mut skipped = 0;
    let mut outcome = lexer.finish();
    while outcome.symbol == ERROR_SYMBOL {
        skipped += outcome.padding + outcome.size;
        outcome = lexer.finish();
    }

    let metadata = table.symbol_metadata(outcome.symbol);
    let leaf = Tree::make_leaf(outcome.symbol, skipped + outcome.padding, outcome.size, metadata);
    leaf.set_fragile(outcome.is_fragile, outcome.is_fragile);
    if skipped > 0 {
        leaf.add_error_size(skipped);
    }
    Lookahead {
        tree: leaf,
        request_breakdown,
    }
}

#[allow(dead_code)]
pub fn eof_symbol(table: &dyn ParseTable) -> SymbolId {
    table.eof_symbol()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_table::ToyTable;

    #[test]
    fn lexes_fresh_when_cursor_empty() {
        let table = ToyTable::linear_abc();
        let mut lexer = table.lexer();
        lexer.set_input("abc");
        let mut cursor = ReusableNode::new(None);
        let lookahead = get_lookahead(&table, &mut lexer, Some(table.start_state()), 0, &mut cursor);
        assert_eq!(lookahead.tree.symbol(), table.symbol_a());
        assert!(!lookahead.request_breakdown);
    }
}
