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
//! LR state identity and the compiled table's action vocabulary. Building a
//! table from a grammar is out of scope here — `ParseTable` is the
//! interface the driver consumes; any concrete table (hand-built,
//! generated, or deserialized) just needs to implement it.

use cfgrammar::{RIdx, SymbolId, SymbolMetadata, LexStateId, EOF_SYMBOL};

/// An LR automaton state. `None` in a `StateOrError` stands for
/// `STATE_ERROR`: "do not trust this tree/state for reuse".
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct StIdx(pub u32);

/// A parse/tree state that may be the error sentinel.
pub type StateOrError = Option<StIdx>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ShiftAction {
    pub to_state: StIdx,
    /// Shift the token but leave the LR state unchanged and mark the
    /// pushed tree `extra`.
    pub extra: bool,
    /// Opaque "do not reuse" bit: the precise semantics are
    /// table-generator-specific. The driver only ever tests it.
    pub can_hide_split: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ReduceAction {
    pub symbol: RIdx,
    pub count: u32,
    /// Force the produced node to carry `fragile_left`/`fragile_right` and
    /// `parse_state = STATE_ERROR` regardless of split state.
    pub fragile: bool,
    pub extra: bool,
}

/// The tagged union a table's action list is built from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Action {
    Shift(ShiftAction),
    Reduce(ReduceAction),
    Accept,
    Recover(StIdx),
    Error,
}

impl Action {
    pub fn is_error(&self) -> bool {
        matches!(self, Action::Error)
    }
}

/// The compiled parse table. `actions` returns every `ParseAction` declared
/// for `(state, symbol)`, in table order; `last_action` is the default
/// action for a reduce/shift lookup (the last element in table order).
pub trait ParseTable {
    /// The state a fresh parse (or a fresh `STATE_ERROR` recovery search)
    /// begins in.
    fn start_state(&self) -> StIdx;

    fn actions(&self, state: StIdx, symbol: SymbolId) -> &[Action];

    fn last_action(&self, state: StIdx, symbol: SymbolId) -> Action {
        self.actions(state, symbol)
            .last()
            .copied()
            .unwrap_or(Action::Error)
    }

    fn has_action(&self, state: StIdx, symbol: SymbolId) -> bool {
        !self.actions(state, symbol).is_empty()
    }

    fn lex_state(&self, state: StIdx) -> LexStateId;

    fn symbol_metadata(&self, symbol: SymbolId) -> SymbolMetadata;

    /// Number of distinct symbols in the language, used by the error
    /// handler to enumerate every symbol's action at a
    /// state.
    fn symbol_count(&self) -> SymbolId;

    fn eof_symbol(&self) -> SymbolId {
        EOF_SYMBOL
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_last_action_is_error() {
        struct Empty;
        impl ParseTable for Empty {
            fn start_state(&self) -> StIdx {
                StIdx(0)
            }
            fn actions(&self, _: StIdx, _: SymbolId) -> &[Action] {
                &[]
            }
            fn lex_state(&self, _: StIdx) -> LexStateId {
                LexStateId(0)
            }
            fn symbol_metadata(&self, _: SymbolId) -> SymbolMetadata {
                SymbolMetadata::default()
            }
            fn symbol_count(&self) -> SymbolId {
                0
            }
        }
        let t = Empty;
        assert!(t.last_action(StIdx(0), 7).is_error());
        assert!(!t.has_action(StIdx(0), 7));
    }
}

