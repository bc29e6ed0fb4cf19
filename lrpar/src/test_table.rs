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

//! Small hand-built tables used only by this workspace's own test suite.
//! None of this is a table compiler: every action is written out by hand,
//! the way a unit test for a driver would wire up a fixture.

#![cfg(test)]

use std::collections::HashMap;

use cfgrammar::{LexStateId, RIdx, SymbolId, SymbolMetadata, EOF_SYMBOL};
use lrlex::{LexRule, RegexLexer};
use lrtable::{Action, ParseTable, ReduceAction, ShiftAction, StIdx};
use regex::Regex;

pub struct ToyTable {
    actions: HashMap<(u32, u32), Vec<Action>>,
    metadata: HashMap<u32, SymbolMetadata>,
    symbol_count: SymbolId,
    start: StIdx,
}

impl ToyTable {
    fn empty(symbol_count: SymbolId, start: StIdx) -> ToyTable {
        ToyTable {
            actions: HashMap::new(),
            metadata: HashMap::new(),
            symbol_count,
            start,
        }
    }

    /// Appends `action` to `(state, symbol)`'s action list. Calling this
    /// more than once for the same pair is how a conflict is encoded: the
    /// last call wins as the table's default (`last_action`).
    fn set(&mut self, state: u32, symbol: u32, action: Action) {
        self.actions.entry((state, symbol)).or_default().push(action);
    }

    pub fn start_state(&self) -> StIdx {
        self.start
    }

    pub fn symbol_a(&self) -> SymbolId {
        2
    }

    pub fn lexer(&self) -> RegexLexer {
        RegexLexer::new(
            vec![
                LexRule { state: None, regex: Regex::new("^a").unwrap(), symbol: 2, fragile: false },
                LexRule { state: None, regex: Regex::new("^b").unwrap(), symbol: 3, fragile: false },
                LexRule { state: None, regex: Regex::new("^c").unwrap(), symbol: 4, fragile: false },
            ],
            Regex::new(r"^[ \t\n]+").unwrap(),
        )
    }

    /// `S -> a b c`, no conflicts: 0 -a-> 1 -b-> 2 -c-> 3 -reduce(S,3)-> GOTO(S) -> 4 -eof-> accept.
    pub fn linear_abc() -> ToyTable {
        let mut t = ToyTable::empty(6, StIdx(0));
        t.set(0, 2, Action::Shift(ShiftAction { to_state: StIdx(1), extra: false, can_hide_split: false }));
        t.set(1, 3, Action::Shift(ShiftAction { to_state: StIdx(2), extra: false, can_hide_split: false }));
        t.set(2, 4, Action::Shift(ShiftAction { to_state: StIdx(3), extra: false, can_hide_split: false }));
        t.set(
            3,
            EOF_SYMBOL,
            Action::Reduce(ReduceAction { symbol: RIdx(5), count: 3, fragile: false, extra: false }),
        );
        t.set(0, 5, Action::Shift(ShiftAction { to_state: StIdx(4), extra: false, can_hide_split: false }));
        t.set(4, EOF_SYMBOL, Action::Accept);
        t
    }

    /// `E -> E '+' E | num`, left-recursive with a shift/reduce conflict at
    /// the state reached after `E + E` on lookahead `+`: the reduce action
    /// is listed last, so `last_action` (the table's default) collapses the
    /// pending `E + E` before extending further, giving left-associative
    /// grouping. The shift action is listed first and still runs as a
    /// forked version — on this grammar it also reaches `Accept`, just with
    /// a differently-shaped (right-grouped) tree for the same string, a
    /// genuine local ambiguity for the selection step to resolve.
    pub fn left_recursive_expr() -> ToyTable {
        // symbols: 0 error, 1 eof, 2 num, 3 '+', 4 E
        let mut t = ToyTable::empty(5, StIdx(0));
        t.set(0, 2, Action::Shift(ShiftAction { to_state: StIdx(1), extra: false, can_hide_split: false }));
        t.set(0, 4, Action::Shift(ShiftAction { to_state: StIdx(2), extra: false, can_hide_split: false }));
        t.set(1, EOF_SYMBOL, Action::Reduce(ReduceAction { symbol: RIdx(4), count: 1, fragile: false, extra: false }));
        t.set(1, 3, Action::Reduce(ReduceAction { symbol: RIdx(4), count: 1, fragile: false, extra: false }));
        t.set(2, 3, Action::Shift(ShiftAction { to_state: StIdx(3), extra: false, can_hide_split: false }));
        t.set(2, EOF_SYMBOL, Action::Accept);
        t.set(3, 2, Action::Shift(ShiftAction { to_state: StIdx(1), extra: false, can_hide_split: false }));
        t.set(3, 4, Action::Shift(ShiftAction { to_state: StIdx(4), extra: false, can_hide_split: false }));
        // shift/reduce conflict at state 4 on '+': shift listed first (the
        // forked alternative), reduce last so it's the default.
        t.set(4, 3, Action::Shift(ShiftAction { to_state: StIdx(3), extra: false, can_hide_split: false }));
        t.set(4, 3, Action::Reduce(ReduceAction { symbol: RIdx(4), count: 3, fragile: false, extra: false }));
        t.set(4, EOF_SYMBOL, Action::Reduce(ReduceAction { symbol: RIdx(4), count: 3, fragile: false, extra: false }));
        t
    }
}

impl ParseTable for ToyTable {
    fn start_state(&self) -> StIdx {
        self.start
    }

    fn actions(&self, state: StIdx, symbol: SymbolId) -> &[Action] {
        static EMPTY: &[Action] = &[];
        self.actions.get(&(state.0, symbol)).map_or(EMPTY, |v| v.as_slice())
    }

    fn lex_state(&self, _state: StIdx) -> LexStateId {
        LexStateId(0)
    }

    fn symbol_metadata(&self, symbol: SymbolId) -> SymbolMetadata {
        self.metadata.get(&symbol).copied().unwrap_or_default()
    }

    fn symbol_count(&self) -> SymbolId {
        self.symbol_count
    }
}
