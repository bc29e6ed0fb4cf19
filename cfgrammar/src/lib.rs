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
//! Symbol and grammar vocabulary shared by the table, lexer, tree, stack, and
//! driver crates. Unlike upstream `cfgrammar`, this crate does not parse or
//! validate Yacc grammars or build LR tables from them: building a compiled
//! parse table is explicitly out of scope for the driver this workspace
//! implements (the table is supplied, already built, by the caller). What
//! remains is the small vocabulary that the driver and its collaborators
//! need to agree on: symbol identity, symbol metadata, and lex-state
//! identity.
//!
//! As with upstream `cfgrammar`, terminology is kept deliberately narrow:
//! a *symbol* is either a token (terminal) or a rule (nonterminal); a
//! *lex state* is the lexer's mode at a given parse state.

use std::fmt;

/// The flat symbol-id space a compiled table and a parsed tree agree on.
/// Terminals and nonterminals share one numbering, exactly as `TSSymbol`
/// does in a tree-sitter-style table: which half of the space a given id
/// falls in is a property of the table, not of this type.
pub type SymbolId = u32;

/// The reserved symbol id for the lexer/parser error sentinel. A tree with
/// this symbol is an error node (`ts_builtin_sym_error` in the original).
pub const ERROR_SYMBOL: SymbolId = 0;

/// The reserved symbol id for end-of-input.
pub const EOF_SYMBOL: SymbolId = 1;

/// A rule (nonterminal) index, distinct from [`TIdx`] so that the two index
/// spaces can't be confused at a call site even though both are ultimately
/// `SymbolId`s.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RIdx(pub SymbolId);

/// A token (terminal) index.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TIdx(pub SymbolId);

impl From<RIdx> for SymbolId {
    fn from(r: RIdx) -> SymbolId {
        r.0
    }
}

impl From<TIdx> for SymbolId {
    fn from(t: TIdx) -> SymbolId {
        t.0
    }
}

impl fmt::Display for RIdx {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

impl fmt::Display for TIdx {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Either half of the symbol space, named the way a grammar author would
/// name it rather than by its raw id.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Symbol {
    Rule(RIdx),
    Token(TIdx),
}

impl Symbol {
    pub fn id(self) -> SymbolId {
        match self {
            Symbol::Rule(r) => r.0,
            Symbol::Token(t) => t.0,
        }
    }
}

/// Per-symbol metadata the table exposes for every symbol id.
/// `extra` symbols (whitespace, comments, ...) lie outside the grammar's
/// main derivation stream; `structural` symbols are the subset of `extra`
/// symbols whose tree is ever cloned rather than shared across stack
/// versions (see the clone-on-write shift logic in the driver);  `named`
/// and `visible` mirror tree-sitter's visible/named child bookkeeping and
/// are carried here purely as data the driver threads through to
/// `make_node` — the driver itself makes no decisions based on them beyond
/// passing them along.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct SymbolMetadata {
    pub extra: bool,
    pub structural: bool,
    pub named: bool,
    pub visible: bool,
}

/// The lexer's mode at a given parse state. `lex_state(state) == INDEPENDENT`
/// effectively never happens for a *state*; `INDEPENDENT` is a property of a
/// *tree* (see `tree::LexState`) meaning "lexable in any state".
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct LexStateId(pub u32);
