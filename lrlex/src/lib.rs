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
//! The lexeme type and lexer interface the driver consumes. The generated, per-language scanning function itself is out of
//! scope; what lives here is the boundary the driver calls
//! across, plus a small regex-table-driven `Lexer` used by the test suite
//! and the worked example, playing the role of "the generated lexer
//! function" without claiming to be a lexer generator.

use cfgrammar::{LexStateId, SymbolId, ERROR_SYMBOL};
use regex::Regex;

/// A single lexed token: a symbol and its character span. Positions and
/// lengths are counted in characters throughout, matching the `TSLength`
/// convention the tree model uses.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Lexeme {
    symbol: SymbolId,
    start: usize,
    len: usize,
}

impl Lexeme {
    pub fn new(symbol: SymbolId, start: usize, len: usize) -> Lexeme {
        Lexeme { symbol, start, len }
    }

    pub fn symbol(&self) -> SymbolId {
        self.symbol
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// What a single lex step returns: a symbol (possibly `ERROR_SYMBOL`),
/// leading whitespace/padding consumed before it, its own size, whether it
/// was produced under ambiguity (`is_fragile`), and — for error tokens —
/// the first character the lexer couldn't make sense of.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LexOutcome {
    pub symbol: SymbolId,
    pub padding: usize,
    pub size: usize,
    pub is_fragile: bool,
    pub first_unexpected_char: Option<char>,
}

/// The lexer boundary: `set_input` installs the whole input
/// once per parse, `reset` repositions the lexer's cursor (used both by the
/// normal lookahead path and, after an edit, by reuse), `start` declares
/// which lex state to scan in, and `finish` performs the scan and reports
/// the result.
pub trait Lexer {
    fn set_input(&mut self, input: &str);
    fn reset(&mut self, position: usize);
    fn start(&mut self, lex_state: LexStateId, error_mode: bool);
    fn finish(&mut self) -> LexOutcome;
}

/// One entry in a [`RegexLexer`]'s table: match `regex` while in `state`
/// (or in any state, if `state` is `None`) and produce `symbol`.
pub struct LexRule {
    pub state: Option<LexStateId>,
    pub regex: Regex,
    pub symbol: SymbolId,
    pub fragile: bool,
}

/// A small regex-table-driven lexer good enough to drive the worked example
/// and the end-to-end tests. Not a lexer generator: rules are supplied
/// directly rather than compiled from a `.l`-style spec.
pub struct RegexLexer {
    rules: Vec<LexRule>,
    skip: Regex,
    input: Vec<char>,
    position: usize,
    lex_state: LexStateId,
    error_mode: bool,
}

impl RegexLexer {
    pub fn new(rules: Vec<LexRule>, skip: Regex) -> RegexLexer {
        RegexLexer {
            rules,
            skip,
            input: Vec::new(),
            position: 0,
            lex_state: LexStateId(0),
            error_mode: false,
        }
    }

    fn rest(&self) -> String {
        self.input[self.position..].iter().collect()
    }
}

impl Lexer for RegexLexer {
    fn set_input(&mut self, input: &str) {
        self.input = input.chars().collect();
        self.position = 0;
    }

    fn reset(&mut self, position: usize) {
        self.position = position;
    }

    fn start(&mut self, lex_state: LexStateId, error_mode: bool) {
        self.lex_state = lex_state;
        self.error_mode = error_mode;
    }

    fn finish(&mut self) -> LexOutcome {
        let padding_start = self.position;
        if let Some(m) = self.skip.find(&self.rest()) {
            if m.start() == 0 {
                self.position += m.as_str().chars().count();
            }
        }
        let padding = self.position - padding_start;

        if self.position >= self.input.len() {
            return LexOutcome {
                symbol: cfgrammar::EOF_SYMBOL,
                padding,
                size: 0,
                is_fragile: false,
                first_unexpected_char: None,
            };
        }

        let remaining = self.rest();
        let mut best: Option<(usize, &LexRule)> = None;
        for rule in &self.rules {
            if let Some(state) = rule.state {
                if state.0 != self.lex_state.0 {
                    continue;
                }
            }
            if let Some(m) = rule.regex.find(&remaining) {
                if m.start() == 0 {
                    let len = m.as_str().chars().count();
                    if len > 0 && best.map_or(true, |(blen, _)| len > blen) {
                        best = Some((len, rule));
                    }
                }
            }
        }

        match best {
            Some((len, rule)) => {
                self.position += len;
                LexOutcome {
                    symbol: rule.symbol,
                    padding,
                    size: len,
                    is_fragile: rule.fragile,
                    first_unexpected_char: None,
                }
            }
            None => {
                let bad = self.input[self.position];
                self.position += 1;
                LexOutcome {
                    symbol: ERROR_SYMBOL,
                    padding,
                    size: 1,
                    is_fragile: false,
                    first_unexpected_char: Some(bad),
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lexeme_accessors() {
        let l = Lexeme::new(3, 5, 2);
        assert_eq!(l.symbol(), 3);
        assert_eq!(l.start(), 5);
        assert_eq!(l.len(), 2);
        assert!(!l.is_empty());
    }

    #[test]
    fn regex_lexer_skips_whitespace_and_tokenizes() {
        let rules = vec![LexRule {
            state: None,
            regex: Regex::new(r"^[a-z]+").unwrap(),
            symbol: 10,
            fragile: false,
        }];
        let mut lx = RegexLexer::new(rules, Regex::new(r"^[ \t]+").unwrap());
        lx.set_input("  ab");
        lx.start(LexStateId(0), false);
        let out = lx.finish();
        assert_eq!(out.symbol, 10);
        assert_eq!(out.padding, 2);
        assert_eq!(out.size, 2);
    }

    #[test]
    fn regex_lexer_reports_unexpected_char() {
        let mut lx = RegexLexer::new(vec![], Regex::new(r"^[ \t]+").unwrap());
        lx.set_input("$");
        lx.start(LexStateId(0), false);
        let out = lx.finish();
        assert_eq!(out.symbol, ERROR_SYMBOL);
        assert_eq!(out.first_unexpected_char, Some('$'));
    }
}

