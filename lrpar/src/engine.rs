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

//! Drives a single stack version through however many shifts, reduces and
//! GOTOs are needed to either consume one lookahead tree or discover the
//! version can't be driven any further.

use cfgrammar::{SymbolId, SymbolMetadata};
use lrtable::{Action, ParseTable, ReduceAction, StIdx};
use stack::{Stack, StackPopStatus};
use tree::Tree;

use crate::debug::{DebugEvent, Debugger};
use crate::recovery;
use crate::repair;
use crate::select;

/// Outcome of a reduce attempted purely to probe for a resync point: no
/// duplicate-slice merge, no repair search, just the pop-and-GOTO a real
/// reduce would do once the pop itself succeeds.
pub(crate) enum FragileReduceOutcome {
    /// Every resulting version (usually just `version` itself, plus any the
    /// pop fanned out into if the GSS below it already forked).
    Reduced(Vec<usize>),
    StoppedAtError,
    Failed,
}

/// What became of a version after it was offered one lookahead tree.
pub enum ConsumeResult {
    /// The lookahead was shifted (or, while in `STATE_ERROR`, absorbed
    /// unconditionally); the version is still alive and wants the next
    /// lookahead.
    Shifted,
    /// The version reached `Accept`; here is its finished parse.
    Accepted(Tree),
    /// No action existed for the lookahead and no repair could be found
    /// below it either: the version is dead and should be dropped.
    Dead,
}

enum StepOutcome {
    Shifted,
    ReducedOrGoto,
    Accepted(Tree),
    Dead,
}

/// Breaks any pending frames off the top of `version` before a reduce or
/// accept inspects it. A no-op when the top frame isn't pending — safe to
/// call unconditionally.
pub fn breakdown_top(stack: &mut Stack, version: usize) {
    let _ = stack.pop_pending(version);
}

pub fn consume_lookahead(
    table: &dyn ParseTable,
    stack: &mut Stack,
    version: usize,
    lookahead: &Tree,
    debugger: &mut Option<Debugger<'_>>,
) -> ConsumeResult {
    loop {
        let state = match stack.top_state(version) {
            Some(s) => s,
            None => {
                if lookahead.symbol() == table.eof_symbol() {
                    return ConsumeResult::Dead;
                }
                stack.push(version, Some(lookahead.clone()), false, None);
                return ConsumeResult::Shifted;
            }
        };

        let symbol = lookahead.symbol();
        let actions: Vec<Action> = table.actions(state, symbol).to_vec();
        if actions.is_empty() {
            recovery::handle_error(table, stack, version, state, symbol, debugger);
            continue;
        }

        let (last, forks) = actions.split_last().unwrap();
        for action in forks {
            let forked = stack.duplicate_version(version);
            apply_action(table, stack, forked, state, *action, lookahead, debugger);
        }

        match apply_action(table, stack, version, state, *last, lookahead, debugger) {
            StepOutcome::Shifted => return ConsumeResult::Shifted,
            StepOutcome::ReducedOrGoto => continue,
            StepOutcome::Accepted(tree) => return ConsumeResult::Accepted(tree),
            StepOutcome::Dead => return ConsumeResult::Dead,
        }
    }
}

fn apply_action(
    table: &dyn ParseTable,
    stack: &mut Stack,
    version: usize,
    state: StIdx,
    action: Action,
    lookahead: &Tree,
    debugger: &mut Option<Debugger<'_>>,
) -> StepOutcome {
    match action {
        Action::Shift(s) => {
            let tree = if s.extra { lookahead.make_copy() } else { lookahead.clone() };
            if s.extra {
                tree.set_extra(true);
            }
            let symbol = lookahead.symbol();
            stack.push(version, Some(tree), false, Some(s.to_state));
            if let Some(dbg) = debugger {
                dbg(DebugEvent::Shift { version, symbol, to_state: Some(s.to_state) });
            }
            StepOutcome::Shifted
        }
        Action::Reduce(ra) => {
            breakdown_top(stack, version);
            reduce(table, stack, version, state, ra, lookahead.symbol(), debugger)
        }
        Action::Accept => {
            breakdown_top(stack, version);
            let popped = stack.pop_all(version);
            if popped.status != StackPopStatus::Ok {
                return StepOutcome::Dead;
            }
            let slice = popped.slices.into_iter().find(|s| s.version == version).unwrap();
            if let Some(dbg) = debugger {
                dbg(DebugEvent::Accept { version });
            }
            StepOutcome::Accepted(finalize_accept(slice.trees))
        }
        Action::Recover(to_state) => {
            stack.push(version, Some(Tree::make_error(0, 0, None)), false, Some(to_state));
            StepOutcome::ReducedOrGoto
        }
        Action::Error => StepOutcome::Dead,
    }
}

fn reduce(
    table: &dyn ParseTable,
    stack: &mut Stack,
    version: usize,
    state: StIdx,
    ra: ReduceAction,
    lookahead_symbol: SymbolId,
    debugger: &mut Option<Debugger<'_>>,
) -> StepOutcome {
    let popped = stack.pop_count(version, ra.count as usize);
    match popped.status {
        StackPopStatus::Failed => StepOutcome::Dead,
        StackPopStatus::StoppedAtError => {
            let trees_above_error = popped.slices.into_iter().next().map(|s| s.trees).unwrap_or_default();
            match repair::find_repair(table, stack, version, &trees_above_error, state, lookahead_symbol) {
                Some(found) => {
                    let symbol = found.symbol();
                    let skip_count = found.skip_count();
                    repair::apply_repair(table, stack, version, &trees_above_error, &found);
                    if let Some(dbg) = debugger {
                        dbg(DebugEvent::RepairFound { version, symbol, skip_count });
                    }
                }
                None => {
                    stack.push(version, None, false, None);
                    if let Some(dbg) = debugger {
                        dbg(DebugEvent::NoRepairFound { version });
                    }
                }
            }
            StepOutcome::ReducedOrGoto
        }
        StackPopStatus::Ok => {
            let start_version_count = stack.version_count();
            for slice in popped.slices {
                let below_state = stack.top_state(slice.version);
                let metadata = table.symbol_metadata(ra.symbol.0);
                let node = Tree::make_node(ra.symbol.0, slice.trees, metadata);
                if ra.fragile {
                    node.set_fragile(true, true);
                    node.set_parse_state(None);
                }
                node.set_extra(ra.extra);
                let to_state = below_state.and_then(|s| match table.last_action(s, ra.symbol.0) {
                    Action::Shift(goto) => Some(goto.to_state),
                    _ => None,
                });
                if to_state.is_none() && below_state.is_some() {
                    // No GOTO for this nonterminal from the state reached:
                    // this fork can't continue, so it's simply left off the
                    // stack rather than pushed into an unreachable state.
                    continue;
                }
                stack.push(slice.version, Some(node), false, to_state.or(below_state));
            }
            merge_duplicate_slices(stack, start_version_count);
            if let Some(dbg) = debugger {
                dbg(DebugEvent::Reduce { version, symbol: ra.symbol, count: ra.count });
            }
            StepOutcome::ReducedOrGoto
        }
    }
}

/// A single, repair-free reduce attempt used while probing a state with no
/// action for the lookahead: pops `ra.count` trees and re-pushes the GOTO'd
/// node, fragile, without the duplicate-slice merge or repair search a real
/// reduce would use.
pub(crate) fn try_fragile_reduce(table: &dyn ParseTable, stack: &mut Stack, version: usize, ra: ReduceAction) -> FragileReduceOutcome {
    let popped = stack.pop_count(version, ra.count as usize);
    match popped.status {
        StackPopStatus::Failed => FragileReduceOutcome::Failed,
        StackPopStatus::StoppedAtError => FragileReduceOutcome::StoppedAtError,
        StackPopStatus::Ok => {
            let mut resulting = Vec::with_capacity(popped.slices.len());
            for slice in popped.slices {
                let below_state = stack.top_state(slice.version);
                let metadata = table.symbol_metadata(ra.symbol.0);
                let node = Tree::make_node(ra.symbol.0, slice.trees, metadata);
                node.set_fragile(true, true);
                node.set_parse_state(None);
                let to_state = below_state.and_then(|s| match table.last_action(s, ra.symbol.0) {
                    Action::Shift(goto) => Some(goto.to_state),
                    _ => None,
                });
                if to_state.is_none() && below_state.is_some() {
                    continue;
                }
                stack.push(slice.version, Some(node), false, to_state.or(below_state));
                resulting.push(slice.version);
            }
            FragileReduceOutcome::Reduced(resulting)
        }
    }
}

/// After a reduce forks one new version per popped slice, fold any pair that
/// landed on the same `(state, position)` back into one. They're alternative
/// derivations of the same span, so `select::select_tree` picks which one's
/// children survive before the versions themselves are spliced together.
fn merge_duplicate_slices(stack: &mut Stack, start_version_count: usize) {
    let mut v = start_version_count;
    while v < stack.version_count() {
        let mut merged = false;
        for earlier in 0..v {
            let existing = stack.top_tree(earlier);
            let challenger = stack.top_tree(v);
            let (existing, challenger) = match (existing, challenger) {
                (Some(e), Some(c)) => (e, c),
                _ => continue,
            };
            if stack.merge(earlier, v) {
                if select::select_tree(&existing, &challenger) {
                    existing.set_children(challenger.children());
                }
                merged = true;
                break;
            }
        }
        if merged {
            stack.remove_version(v);
        } else {
            v += 1;
        }
    }
}

/// Collapse a version's fully-reduced top-level sequence into one tree: the
/// rightmost non-`extra` entry is the derivation's root, and every other
/// entry (leading/trailing comments, whitespace, ...) is folded in as one
/// of its children, with its error span folded into the root's own.
fn finalize_accept(trees: Vec<Tree>) -> Tree {
    if trees.is_empty() {
        return Tree::make_error(0, 0, None);
    }
    let root_idx = trees.iter().rposition(|t| !t.extra()).unwrap_or(trees.len() - 1);
    let root = trees[root_idx].clone();
    if trees.len() == 1 {
        return root;
    }
    let mut children = root.children();
    for (i, t) in trees.iter().enumerate() {
        if i == root_idx {
            continue;
        }
        root.add_error_size(t.error_size());
        if i < root_idx {
            children.insert(i, t.clone());
        } else {
            children.push(t.clone());
        }
    }
    root.set_children(children);
    root
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_table::ToyTable;
    use lrtable::StIdx;

    fn leaf(sym: u32) -> Tree {
        Tree::make_leaf(sym, 0, 1, SymbolMetadata::default())
    }

    #[test]
    fn shift_moves_version_forward() {
        let table = ToyTable::linear_abc();
        let mut stack = Stack::new(Some(table.start_state()));
        let mut debugger: Option<Debugger<'_>> = None;
        let outcome = consume_lookahead(&table, &mut stack, 0, &leaf(2), &mut debugger);
        assert!(matches!(outcome, ConsumeResult::Shifted));
        assert_eq!(stack.top_state(0), Some(StIdx(1)));
    }

    #[test]
    fn full_sentence_accepts() {
        let table = ToyTable::linear_abc();
        let mut stack = Stack::new(Some(table.start_state()));
        let mut debugger: Option<Debugger<'_>> = None;
        assert!(matches!(
            consume_lookahead(&table, &mut stack, 0, &leaf(2), &mut debugger),
            ConsumeResult::Shifted
        ));
        assert!(matches!(
            consume_lookahead(&table, &mut stack, 0, &leaf(3), &mut debugger),
            ConsumeResult::Shifted
        ));
        assert!(matches!(
            consume_lookahead(&table, &mut stack, 0, &leaf(4), &mut debugger),
            ConsumeResult::Shifted
        ));
        let result = consume_lookahead(&table, &mut stack, 0, &leaf(cfgrammar::EOF_SYMBOL), &mut debugger);
        match result {
            ConsumeResult::Accepted(tree) => {
                assert_eq!(tree.symbol(), 5);
                assert_eq!(tree.child_count(), 3);
            }
            _ => panic!("expected accept"),
        }
    }

    #[test]
    fn unrecognized_symbol_enters_state_error_and_gets_absorbed() {
        let table = ToyTable::linear_abc();
        let mut stack = Stack::new(Some(table.start_state()));
        let mut debugger: Option<Debugger<'_>> = None;
        // No reduce at state 0 can ever absorb this lookahead, so the
        // version resyncs straight to `STATE_ERROR` and swallows it as an
        // extra rather than reporting the version dead immediately.
        let outcome = consume_lookahead(&table, &mut stack, 0, &leaf(99), &mut debugger);
        assert!(matches!(outcome, ConsumeResult::Shifted));
        assert_eq!(stack.top_state(0), None);
    }

    #[test]
    fn version_in_state_error_dies_on_eof() {
        let table = ToyTable::linear_abc();
        let mut stack = Stack::new(Some(table.start_state()));
        let mut debugger: Option<Debugger<'_>> = None;
        consume_lookahead(&table, &mut stack, 0, &leaf(99), &mut debugger);
        let outcome = consume_lookahead(&table, &mut stack, 0, &leaf(cfgrammar::EOF_SYMBOL), &mut debugger);
        assert!(matches!(outcome, ConsumeResult::Dead));
    }

    /// A small standalone table whose only point is giving `reduce` a pop
    /// that stops on a `STATE_ERROR` sentinel partway down, so the
    /// `StoppedAtError` branch's call into `repair::find_repair` /
    /// `apply_repair` runs for real rather than being exercised only from
    /// `repair`'s own unit tests.
    struct SentinelProbeTable {
        actions: std::collections::HashMap<(u32, SymbolId), Action>,
    }

    impl SentinelProbeTable {
        fn new() -> SentinelProbeTable {
            use lrtable::ShiftAction;
            let mut actions = std::collections::HashMap::new();
            actions.insert((0, 5), Action::Shift(ShiftAction { to_state: StIdx(1), extra: false, can_hide_split: false }));
            actions.insert((1, 2), Action::Shift(ShiftAction { to_state: StIdx(2), extra: false, can_hide_split: false }));
            actions.insert((1, cfgrammar::EOF_SYMBOL), Action::Accept);
            actions.insert((2, 3), Action::Shift(ShiftAction { to_state: StIdx(3), extra: false, can_hide_split: false }));
            actions.insert((3, 5), Action::Reduce(ReduceAction { symbol: cfgrammar::RIdx(5), count: 2, fragile: false, extra: false }));
            SentinelProbeTable { actions }
        }
    }

    impl ParseTable for SentinelProbeTable {
        fn start_state(&self) -> StIdx {
            StIdx(0)
        }

        fn actions(&self, state: StIdx, symbol: SymbolId) -> &[Action] {
            unimplemented!("SentinelProbeTable only backs last_action/has_action: {state:?}/{symbol}")
        }

        fn last_action(&self, state: StIdx, symbol: SymbolId) -> Action {
            self.actions.get(&(state.0, symbol)).copied().unwrap_or(Action::Error)
        }

        fn has_action(&self, state: StIdx, symbol: SymbolId) -> bool {
            self.actions.contains_key(&(state.0, symbol))
        }

        fn lex_state(&self, _state: StIdx) -> cfgrammar::LexStateId {
            cfgrammar::LexStateId(0)
        }

        fn symbol_metadata(&self, _symbol: SymbolId) -> SymbolMetadata {
            SymbolMetadata::default()
        }

        fn symbol_count(&self) -> SymbolId {
            6
        }
    }

    #[test]
    fn reduce_stopping_on_a_sentinel_routes_through_the_repair_search() {
        let table = SentinelProbeTable::new();
        let mut stack = Stack::new(Some(table.start_state()));
        stack.push(0, Some(leaf(2)), false, Some(StIdx(1)));
        stack.push(0, None, false, None);
        stack.push(0, Some(leaf(3)), false, Some(StIdx(9)));

        let mut debugger: Option<Debugger<'_>> = None;
        let ra = ReduceAction { symbol: cfgrammar::RIdx(5), count: 2, fragile: false, extra: false };
        let outcome = reduce(&table, &mut stack, 0, StIdx(9), ra, cfgrammar::EOF_SYMBOL, &mut debugger);
        assert!(matches!(outcome, StepOutcome::ReducedOrGoto));
        // The repair landed on state 1 (the goto's shift target); the
        // version is no longer stuck at `STATE_ERROR`.
        assert_eq!(stack.top_state(0), Some(StIdx(1)));
    }
}
