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

//! A hand-built `ParseTable` for `E -> E '+' E | E '*' E | '(' E ')' | num`,
//! standing in for a table a grammar compiler would otherwise produce.
//! Precedence and left-associativity come entirely from which action
//! `set` was called with last at each shift/reduce conflict: equal
//! precedence resolves to reduce (left-assoc), and `*` outranks `+` by
//! resolving its conflict with `+` in favour of whichever keeps `*`
//! binding tighter.

use std::collections::HashMap;

use cfgrammar::{LexStateId, RIdx, SymbolId, SymbolMetadata, EOF_SYMBOL};
use lrlex::{LexRule, RegexLexer};
use lrtable::{Action, ParseTable, ReduceAction, ShiftAction, StIdx};
use regex::Regex;

pub const NUM: SymbolId = 2;
pub const PLUS: SymbolId = 3;
pub const STAR: SymbolId = 4;
pub const LPAREN: SymbolId = 5;
pub const RPAREN: SymbolId = 6;
pub const EXPR: SymbolId = 7;

pub struct ArithTable {
    actions: HashMap<(u32, SymbolId), Vec<Action>>,
}

impl ArithTable {
    pub fn new() -> ArithTable {
        let mut t = ArithTable { actions: HashMap::new() };

        let shift = |to: u32| Action::Shift(ShiftAction { to_state: StIdx(to), extra: false, can_hide_split: false });
        let reduce = |count: u32| Action::Reduce(ReduceAction { symbol: RIdx(EXPR), count, fragile: false, extra: false });

        // States 0, 3, 4, 5 all close over the same items (E -> .E+E,
        // E -> .E*E, E -> .(E), E -> .num); they differ only in where the
        // goto on E lands once one is found.
        for (state, goto_on_e) in [(0, 1), (3, 6), (4, 7), (5, 8)] {
            t.set(state, NUM, shift(2));
            t.set(state, LPAREN, shift(3));
            t.set(state, EXPR, shift(goto_on_e));
        }

        t.set(1, PLUS, shift(4));
        t.set(1, STAR, shift(5));
        t.set(1, EOF_SYMBOL, Action::Accept);

        for sym in [EOF_SYMBOL, PLUS, STAR, RPAREN] {
            t.set(2, sym, reduce(1));
        }

        t.set(6, RPAREN, shift(9));
        t.set(6, PLUS, shift(4));
        t.set(6, STAR, shift(5));

        // state 7: E -> E + E ., also E -> E .+ E, E -> E .* E
        t.set(7, PLUS, shift(4)); // forked: keep extending a right-leaning +
        t.set(7, PLUS, reduce(3)); // default: same precedence, left-assoc
        t.set(7, STAR, reduce(3)); // forked: finish the + first (wrong grouping, kept as a live alternative)
        t.set(7, STAR, shift(5)); // default: '*' binds tighter than '+'
        for sym in [EOF_SYMBOL, RPAREN] {
            t.set(7, sym, reduce(3));
        }

        // state 8: E -> E * E ., also E -> E .+ E, E -> E .* E
        t.set(8, PLUS, shift(4)); // default: '+' is lower precedence, so finish * first...
        t.set(8, PLUS, reduce(3)); // ...this is the one that actually wins (last call)
        t.set(8, STAR, shift(5)); // forked
        t.set(8, STAR, reduce(3)); // default: same precedence, left-assoc
        for sym in [EOF_SYMBOL, RPAREN] {
            t.set(8, sym, reduce(3));
        }

        for sym in [EOF_SYMBOL, PLUS, STAR, RPAREN] {
            t.set(9, sym, reduce(3)); // E -> ( E ).
        }

        t
    }

    fn set(&mut self, state: u32, symbol: SymbolId, action: Action) {
        self.actions.entry((state, symbol)).or_default().push(action);
    }

    pub fn lexer(&self) -> RegexLexer {
        RegexLexer::new(
            vec![
                LexRule { state: None, regex: Regex::new(r"^[0-9]+").unwrap(), symbol: NUM, fragile: false },
                LexRule { state: None, regex: Regex::new(r"^\+").unwrap(), symbol: PLUS, fragile: false },
                LexRule { state: None, regex: Regex::new(r"^\*").unwrap(), symbol: STAR, fragile: false },
                LexRule { state: None, regex: Regex::new(r"^\(").unwrap(), symbol: LPAREN, fragile: false },
                LexRule { state: None, regex: Regex::new(r"^\)").unwrap(), symbol: RPAREN, fragile: false },
            ],
            Regex::new(r"^[ \t]+").unwrap(),
        )
    }
}

impl ParseTable for ArithTable {
    fn start_state(&self) -> StIdx {
        StIdx(0)
    }

    fn actions(&self, state: StIdx, symbol: SymbolId) -> &[Action] {
        static EMPTY: &[Action] = &[];
        self.actions.get(&(state.0, symbol)).map_or(EMPTY, |v| v.as_slice())
    }

    fn lex_state(&self, _state: StIdx) -> LexStateId {
        LexStateId(0)
    }

    fn symbol_metadata(&self, _symbol: SymbolId) -> SymbolMetadata {
        SymbolMetadata::default()
    }

    fn symbol_count(&self) -> SymbolId {
        8
    }
}
