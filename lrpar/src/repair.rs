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

//! Invoked when a reduce's pop stops at an error boundary mid-stack: looks
//! below the boundary for a state that can absorb the trees already popped
//! (plus some more of its own) under some nonterminal, and wraps whatever
//! sits in between in an error node.

use cfgrammar::{RIdx, SymbolId};
use lrtable::{Action, ParseTable, StIdx};
use stack::{IterateAction, Stack};
use tree::Tree;

/// A reduce that, starting `candidate.count` trees below the error
/// boundary, would absorb the boundary entirely: `original_count` is the
/// full child count of the reduce this repair is standing in for, used only
/// to validate the candidate once a resync depth is reached.
#[derive(Clone, Copy, Debug)]
struct RepairCandidate {
    symbol: RIdx,
    count: u32,
    original_count: u32,
}

/// A validated resync point below the error boundary.
#[derive(Clone, Copy, Debug)]
pub struct FoundRepair {
    depth: usize,
    skip_count: usize,
    candidate_symbol: RIdx,
    candidate_count: u32,
    state_after_repair: StIdx,
}

impl FoundRepair {
    pub fn skip_count(&self) -> usize {
        self.skip_count
    }

    pub fn symbol(&self) -> RIdx {
        self.candidate_symbol
    }
}

/// Setup + Search: collect every reduce `current_state` offers that could
/// still absorb the trees already popped above the boundary, then walk the
/// stack below the boundary looking for the shallowest depth at which one
/// of them validates.
pub fn find_repair(
    table: &dyn ParseTable,
    stack: &Stack,
    version: usize,
    trees_above_error: &[Tree],
    current_state: StIdx,
    lookahead: SymbolId,
) -> Option<FoundRepair> {
    let count_above_error = Tree::array_essential_count(trees_above_error);

    let mut candidates: Vec<RepairCandidate> = Vec::new();
    for sym in 0..table.symbol_count() {
        if let Action::Reduce(ra) = table.last_action(current_state, sym) {
            if ra.count as usize > count_above_error {
                let candidate = RepairCandidate {
                    symbol: ra.symbol,
                    count: ra.count - count_above_error as u32,
                    original_count: ra.count,
                };
                if !candidates.iter().any(|c| c.symbol == candidate.symbol && c.count == candidate.count) {
                    candidates.push(candidate);
                }
            }
        }
    }
    if candidates.is_empty() {
        return None;
    }

    let mut remaining = candidates;
    let mut best: Option<FoundRepair> = None;
    stack.iterate_below_error(version, trees_above_error.len(), |depth, state_below, trees_so_far| {
        let state_below = match state_below {
            Some(s) => s,
            None => return IterateAction::Stop,
        };
        remaining.retain(|candidate| {
            let tree_count = trees_so_far.len();
            if candidate.count as usize > tree_count {
                return true;
            }
            let skip_count = tree_count - candidate.count as usize;
            if let Some(found) = &best {
                if skip_count >= found.skip_count {
                    return false;
                }
            }
            let shift = match table.last_action(state_below, candidate.symbol.0) {
                Action::Shift(s) => s,
                _ => return false,
            };
            let state_after_repair = shift.to_state;
            if !table.has_action(state_after_repair, lookahead) {
                return false;
            }
            if !validates(table, state_after_repair, candidate, trees_so_far, trees_above_error) {
                return false;
            }
            best = Some(FoundRepair {
                depth,
                skip_count,
                candidate_symbol: candidate.symbol,
                candidate_count: candidate.count,
                state_after_repair,
            });
            false
        });
        if remaining.is_empty() {
            IterateAction::Stop
        } else {
            IterateAction::Continue
        }
    });
    best
}

/// Simulate shifting `candidate.count` bottom-most non-extra trees of
/// `trees_so_far`, then every tree above the error boundary, then confirm
/// the resulting state still reduces `candidate.symbol` with its original
/// child count — the chain a repair promises is actually well-formed.
fn validates(table: &dyn ParseTable, state_after_repair: StIdx, candidate: &RepairCandidate, trees_so_far: &[Tree], trees_above_error: &[Tree]) -> bool {
    let essential: Vec<&Tree> = trees_so_far.iter().filter(|t| !t.extra()).collect();
    if essential.len() < candidate.count as usize {
        return false;
    }
    let mut state = state_after_repair;
    for t in essential.into_iter().take(candidate.count as usize) {
        state = match table.last_action(state, t.symbol()) {
            Action::Shift(s) => s.to_state,
            _ => return false,
        };
    }
    for t in trees_above_error {
        state = match table.last_action(state, t.symbol()) {
            Action::Shift(s) => s.to_state,
            _ => return false,
        };
    }
    matches!(table.last_action(state, candidate.symbol.0), Action::Reduce(ra) if ra.count == candidate.original_count)
}

/// Pop `repair.depth` trees from below the boundary, split them into the
/// repair's own kept children and the skip-penalty children, and push the
/// repaired node — `kept_children ++ [error_node] ++ trees_above_error` —
/// with the state the search validated.
pub fn apply_repair(table: &dyn ParseTable, stack: &mut Stack, version: usize, trees_above_error: &[Tree], repair: &FoundRepair) -> Tree {
    let below = stack
        .drop_above_error(version, trees_above_error.len(), repair.depth)
        .expect("a validated repair depth is always reachable below the error boundary");
    let essential: Vec<Tree> = below.into_iter().filter(|t| !t.extra()).collect();
    let kept_count = repair.candidate_count as usize;
    let kept_children: Vec<Tree> = essential[..kept_count].to_vec();
    let skipped: Vec<Tree> = essential[kept_count..].to_vec();

    let error_node = Tree::make_error_node(skipped);
    let mut children = kept_children;
    children.push(error_node);
    children.extend(trees_above_error.iter().cloned());

    let metadata = table.symbol_metadata(repair.candidate_symbol.0);
    let node = Tree::make_node(repair.candidate_symbol.0, children, metadata);
    node.set_fragile(true, true);
    node.set_parse_state(None);
    stack.push(version, Some(node.clone()), false, Some(repair.state_after_repair));
    node
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use cfgrammar::{LexStateId, SymbolMetadata, EOF_SYMBOL};
    use lrtable::{ReduceAction, ShiftAction};

    use super::*;

    fn leaf(sym: u32) -> Tree {
        Tree::make_leaf(sym, 0, 1, Default::default())
    }

    /// A small standalone table for exercising the search below an error
    /// boundary: state 0 offers a goto-shift on the reduced symbol, state 1
    /// can shift the one tree the search needs below the boundary, state 2
    /// can then shift the one tree already collected above it, and state 3
    /// is where the resulting chain reduces with the repair's original
    /// child count. State 9 stands in for wherever the stalled reduce was
    /// attempted from.
    struct RepairTable {
        actions: HashMap<(u32, SymbolId), Action>,
    }

    impl RepairTable {
        fn new() -> RepairTable {
            let mut actions = HashMap::new();
            actions.insert((0, 5), Action::Shift(ShiftAction { to_state: StIdx(1), extra: false, can_hide_split: false }));
            actions.insert((1, 2), Action::Shift(ShiftAction { to_state: StIdx(2), extra: false, can_hide_split: false }));
            actions.insert((1, EOF_SYMBOL), Action::Accept);
            actions.insert((2, 3), Action::Shift(ShiftAction { to_state: StIdx(3), extra: false, can_hide_split: false }));
            actions.insert((3, 5), Action::Reduce(ReduceAction { symbol: RIdx(5), count: 2, fragile: false, extra: false }));
            actions.insert((9, EOF_SYMBOL), Action::Reduce(ReduceAction { symbol: RIdx(5), count: 2, fragile: false, extra: false }));
            RepairTable { actions }
        }
    }

    impl ParseTable for RepairTable {
        fn start_state(&self) -> StIdx {
            StIdx(0)
        }

        fn actions(&self, state: StIdx, symbol: SymbolId) -> &[Action] {
            unimplemented!("RepairTable only backs last_action/has_action, both overridden below: {state:?}/{symbol}")
        }

        fn last_action(&self, state: StIdx, symbol: SymbolId) -> Action {
            self.actions.get(&(state.0, symbol)).copied().unwrap_or(Action::Error)
        }

        fn has_action(&self, state: StIdx, symbol: SymbolId) -> bool {
            self.actions.contains_key(&(state.0, symbol))
        }

        fn lex_state(&self, _state: StIdx) -> LexStateId {
            LexStateId(0)
        }

        fn symbol_metadata(&self, _symbol: SymbolId) -> SymbolMetadata {
            SymbolMetadata::default()
        }

        fn symbol_count(&self) -> SymbolId {
            6
        }
    }

    /// One real tree (`a`, symbol 2) sits below the boundary at state 0;
    /// above it, past the `STATE_ERROR` sentinel, one tree (`b`, symbol 3)
    /// has already been collected by a stalled reduce attempted from state
    /// 9. The search should land one tree below the boundary, shift `b`
    /// through the repair's goto state, and find it reduces with the
    /// original count of 2.
    fn table_and_stack_with_sentinel() -> (RepairTable, Stack, Vec<Tree>) {
        let table = RepairTable::new();
        let mut stack = Stack::new(Some(table.start_state()));
        stack.push(0, Some(leaf(2)), false, Some(StIdx(1)));
        stack.push(0, None, false, None);
        let above = leaf(3);
        stack.push(0, Some(above.clone()), false, Some(StIdx(9)));
        (table, stack, vec![above])
    }

    #[test]
    fn finds_a_resync_point_below_the_boundary() {
        let (table, stack, above) = table_and_stack_with_sentinel();
        let repair = find_repair(&table, &stack, 0, &above, StIdx(9), EOF_SYMBOL).expect("a repair should be found");
        assert_eq!(repair.skip_count(), 0);
        assert_eq!(repair.symbol(), RIdx(5));
    }

    #[test]
    fn no_repair_when_nothing_below_validates() {
        let (table, stack, above) = table_and_stack_with_sentinel();
        // A lookahead the goto state doesn't recognise fails the
        // `has_action` check, so no candidate ever validates.
        assert!(find_repair(&table, &stack, 0, &above, StIdx(9), 99).is_none());
    }

    #[test]
    fn apply_repair_wraps_the_gap_in_an_error_node_and_resumes_below() {
        let (table, mut stack, above) = table_and_stack_with_sentinel();
        let repair = find_repair(&table, &stack, 0, &above, StIdx(9), EOF_SYMBOL).unwrap();
        let node = apply_repair(&table, &mut stack, 0, &above, &repair);
        assert_eq!(node.symbol(), 5);
        assert_eq!(node.child_count(), 3);
        assert_eq!(node.child(0).symbol(), 2);
        assert!(node.child(1).is_error());
        assert_eq!(node.child(1).child_count(), 0);
        assert_eq!(node.child(2).symbol(), 3);
        assert_eq!(stack.top_state(0), Some(StIdx(1)));
    }
}
