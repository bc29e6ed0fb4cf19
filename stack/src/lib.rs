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
//! The graph-structured stack (GSS) the driver forks and merges parse
//! versions over. Each version is a head pointer into a shared,
//! reference-counted graph of frames; forking a version is an `Rc` clone,
//! and two versions that reach the same
//! `(state, position)` can be merged back into shared structure.
//!
//! A frame's payload is `Option<Tree>`: `None` marks the sentinel frame
//! `handle_error` pushes at `STATE_ERROR` — a placeholder
//! with no tree of its own. `pop_count`/`pop_pending` stop in front of such
//! a frame rather than walking through it, which is how the driver notices
//! it has hit an error boundary mid-reduction.

use std::cell::RefCell;
use std::rc::Rc;

use lrtable::StateOrError;
use tree::Tree;

struct StackLink {
    tree: Option<Tree>,
    is_pending: bool,
    predecessor: Rc<StackNode>,
}

struct StackNode {
    state: StateOrError,
    position: usize,
    links: RefCell<Vec<StackLink>>,
}

impl StackNode {
    fn root(state: StateOrError, position: usize) -> Rc<StackNode> {
        Rc::new(StackNode {
            state,
            position,
            links: RefCell::new(Vec::new()),
        })
    }
}

/// Outcome of a pop-like primitive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StackPopStatus {
    /// The requested number of frames were popped (or, for `pop_pending`,
    /// zero or more pending frames were popped without hitting a real gap).
    Ok,
    /// Popping stopped in front of an error-boundary sentinel frame before
    /// the requested count was reached. `slices` holds what was collected
    /// above the boundary; the stack itself is left untouched.
    StoppedAtError,
    /// The stack underneath didn't have enough frames to satisfy the
    /// request at all.
    Failed,
}

/// One path's worth of a pop: which version now stands at the frame reached
/// (only meaningful when `status == Ok`) and the trees collected, in
/// left-to-right (bottom-to-top) order.
#[derive(Clone, Debug)]
pub struct StackSlice {
    pub version: usize,
    pub trees: Vec<Tree>,
}

#[derive(Clone, Debug)]
pub struct StackPopResult {
    pub status: StackPopStatus,
    pub slices: Vec<StackSlice>,
}

/// Outcome of `iterate`'s per-frame callback: keep walking down, or stop
/// here and report this depth as a candidate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IterateAction {
    Continue,
    Stop,
}

/// The graph-structured stack. Versions are dense indices into `heads`;
/// `remove_version` compacts the vector so iteration over
/// `0..version_count()` never needs to skip holes.
pub struct Stack {
    heads: Vec<Rc<StackNode>>,
}

impl Stack {
    /// A single version sitting at `start_state`, before any tree has been
    /// pushed.
    pub fn new(start_state: StateOrError) -> Stack {
        Stack {
            heads: vec![StackNode::root(start_state, 0)],
        }
    }

    pub fn version_count(&self) -> usize {
        self.heads.len()
    }

    pub fn top_state(&self, version: usize) -> StateOrError {
        self.heads[version].state
    }

    pub fn top_position(&self, version: usize) -> usize {
        self.heads[version].position
    }

    /// Push `tree` (or, at an error boundary, `None`) onto `version`,
    /// leaving it in `state`. Always succeeds.
    pub fn push(&mut self, version: usize, tree: Option<Tree>, is_pending: bool, state: StateOrError) {
        let predecessor = self.heads[version].clone();
        let position = predecessor.position + tree.as_ref().map_or(0, |t| t.total_chars());
        let node = StackNode::root(state, position);
        node.links.borrow_mut().push(StackLink {
            tree,
            is_pending,
            predecessor,
        });
        self.heads[version] = node;
    }

    /// Clone `version`'s head into a brand-new version that shares all of
    /// its history: the GSS fan-out
    /// primitive behind the "try the next action too" fork.
    pub fn duplicate_version(&mut self, version: usize) -> usize {
        self.heads.push(self.heads[version].clone());
        self.heads.len() - 1
    }

    /// Make `dst` point at whatever `src` currently points at (used when a
    /// version is being folded into another's identity), then drop `src`.
    pub fn renumber_version(&mut self, src: usize, dst: usize) {
        self.heads[dst] = self.heads[src].clone();
        self.remove_version(src);
    }

    pub fn remove_version(&mut self, version: usize) {
        self.heads.remove(version);
    }

    pub fn clear(&mut self, start_state: StateOrError) {
        self.heads.clear();
        self.heads.push(StackNode::root(start_state, 0));
    }

    /// Merge `b` into `a` if they stand at the same `(state, position)`:
    /// `a`'s node gains `b`'s incoming links (true GSS fan-in), and `b` is
    /// left pointing at the same shared node. Returns whether a merge
    /// happened.
    pub fn merge(&mut self, a: usize, b: usize) -> bool {
        if a == b {
            return false;
        }
        let (sa, pa) = (self.heads[a].state, self.heads[a].position);
        let (sb, pb) = (self.heads[b].state, self.heads[b].position);
        if sa != sb || pa != pb || Rc::ptr_eq(&self.heads[a], &self.heads[b]) {
            return false;
        }
        let mut incoming = self.heads[b].links.borrow_mut().drain(..).collect::<Vec<_>>();
        self.heads[a].links.borrow_mut().append(&mut incoming);
        self.heads[b] = self.heads[a].clone();
        true
    }

    /// Try to merge every version from `start_version_count` onward into an
    /// earlier version at the same `(state, position)`: the
    /// cleanup step after a reduce has forked one version per ambiguous
    /// derivation.
    pub fn merge_from(&mut self, start_version_count: usize) {
        let mut v = start_version_count;
        while v < self.version_count() {
            let mut merged = false;
            for earlier in 0..v {
                if self.merge(earlier, v) {
                    merged = true;
                    break;
                }
            }
            if merged {
                self.remove_version(v);
            } else {
                v += 1;
            }
        }
    }

    /// Scan every pair of versions and merge duplicate tops together
    ///. Returns whether
    /// anything changed.
    pub fn condense(&mut self) -> bool {
        let mut changed = false;
        let mut v = 1;
        while v < self.version_count() {
            let mut merged = false;
            for earlier in 0..v {
                if self.merge(earlier, v) {
                    merged = true;
                    changed = true;
                    break;
                }
            }
            if merged {
                self.remove_version(v);
            } else {
                v += 1;
            }
        }
        changed
    }

    /// Pop `n` real trees off `version`, fanning out into one slice per
    /// distinct path the GSS below it forks into. Stops (without mutating
    /// anything) if it runs into an error-boundary sentinel before `n`
    /// trees have been collected.
    pub fn pop_count(&mut self, version: usize, n: usize) -> StackPopResult {
        match walk(&self.heads[version], n) {
            Walk::StoppedAtError(trees) => StackPopResult {
                status: StackPopStatus::StoppedAtError,
                slices: vec![StackSlice { version, trees }],
            },
            Walk::Failed => StackPopResult {
                status: StackPopStatus::Failed,
                slices: Vec::new(),
            },
            Walk::Completed(paths) => self.commit(version, paths),
        }
    }

    /// Pop every frame at the top of `version` that was pushed as pending
    ///: stops at the first non-pending frame.
    pub fn pop_pending(&mut self, version: usize) -> StackPopResult {
        match walk_pending(&self.heads[version]) {
            Walk::StoppedAtError(trees) => StackPopResult {
                status: StackPopStatus::StoppedAtError,
                slices: vec![StackSlice { version, trees }],
            },
            Walk::Failed => StackPopResult {
                status: StackPopStatus::Failed,
                slices: Vec::new(),
            },
            Walk::Completed(paths) => self.commit(version, paths),
        }
    }

    /// Pop every real tree off `version`, all the way to the root (used by
    /// `accept` to collect the finished parse).
    pub fn pop_all(&mut self, version: usize) -> StackPopResult {
        match walk_all(&self.heads[version]) {
            Walk::StoppedAtError(trees) => StackPopResult {
                status: StackPopStatus::StoppedAtError,
                slices: vec![StackSlice { version, trees }],
            },
            Walk::Failed => StackPopResult {
                status: StackPopStatus::Failed,
                slices: Vec::new(),
            },
            Walk::Completed(paths) => self.commit(version, paths),
        }
    }

    /// Walk down from `version` one real tree at a time, innermost
    /// (topmost) tree first, calling `f(depth, state_below, trees_so_far)`
    /// after each step; `trees_so_far` is left-to-right. Used by the error
    /// repair search to find a depth worth trying a recovery
    /// reduction from. Stops at the first error-boundary sentinel or at the
    /// root, whichever comes first; doesn't follow fan-out (the repair
    /// search only ever runs on a single, as-yet-unforked version).
    pub fn iterate<F>(&self, version: usize, mut f: F)
    where
        F: FnMut(usize, StateOrError, &[Tree]) -> IterateAction,
    {
        let mut node = self.heads[version].clone();
        let mut trees_reversed = Vec::new();
        let mut depth = 0;
        loop {
            let next = {
                let links = node.links.borrow();
                links.first().map(|l| (l.tree.clone(), l.predecessor.clone()))
            };
            match next {
                None => break,
                Some((None, _)) => break,
                Some((Some(t), predecessor)) => {
                    trees_reversed.push(t);
                    depth += 1;
                    let trees: Vec<Tree> = trees_reversed.iter().rev().cloned().collect();
                    if f(depth, predecessor.state, &trees) == IterateAction::Stop {
                        break;
                    }
                    node = predecessor;
                }
            }
        }
    }

    /// The tree carried by `version`'s topmost link, if any. A freshly
    /// pushed node always has exactly one incoming link, so this is
    /// unambiguous right after a `push`.
    pub fn top_tree(&self, version: usize) -> Option<Tree> {
        self.heads[version].links.borrow().first().and_then(|l| l.tree.clone())
    }

    /// Walk down from `version`'s top past `trees_above_error` real trees
    /// and the error-boundary sentinel beneath them, then continue walking
    /// one real tree at a time exactly like `iterate`, calling
    /// `f(depth, state_below, trees_so_far)` for each frame below the
    /// boundary. Used by the error repair search, which only ever runs
    /// below a boundary it already knows the size of.
    pub fn iterate_below_error<F>(&self, version: usize, trees_above_error: usize, mut f: F)
    where
        F: FnMut(usize, StateOrError, &[Tree]) -> IterateAction,
    {
        let mut node = self.heads[version].clone();
        for _ in 0..trees_above_error {
            let next = {
                let links = node.links.borrow();
                links.first().map(|l| l.predecessor.clone())
            };
            node = match next {
                Some(n) => n,
                None => return,
            };
        }
        let next = {
            let links = node.links.borrow();
            links.first().map(|l| l.predecessor.clone())
        };
        node = match next {
            Some(n) => n,
            None => return,
        };

        let mut trees_reversed = Vec::new();
        let mut depth = 0;
        loop {
            let next = {
                let links = node.links.borrow();
                links.first().map(|l| (l.tree.clone(), l.predecessor.clone()))
            };
            match next {
                None => break,
                Some((None, _)) => break,
                Some((Some(t), predecessor)) => {
                    trees_reversed.push(t);
                    depth += 1;
                    let trees: Vec<Tree> = trees_reversed.iter().rev().cloned().collect();
                    if f(depth, predecessor.state, &trees) == IterateAction::Stop {
                        break;
                    }
                    node = predecessor;
                }
            }
        }
    }

    /// Pop `below_count` real trees from below `version`'s error boundary
    /// (skipping past `trees_above_error` real trees and the sentinel
    /// itself first), repositioning `version`'s head there. Returns the
    /// popped trees in bottom-to-top order, or `None` if the stack below
    /// doesn't actually have that many frames — a repair candidate that
    /// `find_repair` validated should never hit this.
    pub fn drop_above_error(&mut self, version: usize, trees_above_error: usize, below_count: usize) -> Option<Vec<Tree>> {
        let mut node = self.heads[version].clone();
        for _ in 0..trees_above_error {
            let next = {
                let links = node.links.borrow();
                links.first().map(|l| l.predecessor.clone())
            };
            node = next?;
        }
        let next = {
            let links = node.links.borrow();
            links.first().map(|l| l.predecessor.clone())
        };
        node = next?;

        let mut trees_reversed = Vec::with_capacity(below_count);
        for _ in 0..below_count {
            let next = {
                let links = node.links.borrow();
                links.first().map(|l| (l.tree.clone(), l.predecessor.clone()))
            };
            match next {
                Some((Some(t), predecessor)) => {
                    trees_reversed.push(t);
                    node = predecessor;
                }
                _ => return None,
            }
        }
        self.heads[version] = node;
        Some(trees_reversed.into_iter().rev().collect())
    }

    fn commit(&mut self, version: usize, mut paths: Vec<(Rc<StackNode>, Vec<Tree>)>) -> StackPopResult {
        let mut slices = Vec::with_capacity(paths.len());
        let (first_node, first_trees) = paths.remove(0);
        self.heads[version] = first_node;
        slices.push(StackSlice {
            version,
            trees: first_trees,
        });
        for (node, trees) in paths {
            self.heads.push(node);
            slices.push(StackSlice {
                version: self.heads.len() - 1,
                trees,
            });
        }
        StackPopResult {
            status: StackPopStatus::Ok,
            slices,
        }
    }
}

enum Walk {
    Completed(Vec<(Rc<StackNode>, Vec<Tree>)>),
    StoppedAtError(Vec<Tree>),
    Failed,
}

fn walk(node: &Rc<StackNode>, steps: usize) -> Walk {
    if steps == 0 {
        return Walk::Completed(vec![(node.clone(), Vec::new())]);
    }
    let links = node.links.borrow();
    if links.is_empty() {
        return Walk::Failed;
    }
    let mut out = Vec::new();
    for link in links.iter() {
        match &link.tree {
            None => return Walk::StoppedAtError(Vec::new()),
            Some(tree) => match walk(&link.predecessor, steps - 1) {
                Walk::Completed(sub) => {
                    for (reached, mut trees) in sub {
                        trees.push(tree.clone());
                        out.push((reached, trees));
                    }
                }
                Walk::StoppedAtError(mut trees) => {
                    trees.push(tree.clone());
                    return Walk::StoppedAtError(trees);
                }
                Walk::Failed => return Walk::Failed,
            },
        }
    }
    Walk::Completed(out)
}

fn walk_pending(node: &Rc<StackNode>) -> Walk {
    let links = node.links.borrow();
    if links.is_empty() {
        return Walk::Completed(vec![(node.clone(), Vec::new())]);
    }
    let mut out = Vec::new();
    for link in links.iter() {
        if !link.is_pending {
            out.push((node.clone(), Vec::new()));
            continue;
        }
        match &link.tree {
            None => out.push((node.clone(), Vec::new())),
            Some(tree) => match walk_pending(&link.predecessor) {
                Walk::Completed(sub) => {
                    for (reached, mut trees) in sub {
                        trees.push(tree.clone());
                        out.push((reached, trees));
                    }
                }
                Walk::StoppedAtError(_) | Walk::Failed => out.push((node.clone(), Vec::new())),
            },
        }
    }
    Walk::Completed(out)
}

fn walk_all(node: &Rc<StackNode>) -> Walk {
    let links = node.links.borrow();
    if links.is_empty() {
        return Walk::Completed(vec![(node.clone(), Vec::new())]);
    }
    let mut out = Vec::new();
    for link in links.iter() {
        match &link.tree {
            None => return Walk::StoppedAtError(Vec::new()),
            Some(tree) => match walk_all(&link.predecessor) {
                Walk::Completed(sub) => {
                    for (reached, mut trees) in sub {
                        trees.push(tree.clone());
                        out.push((reached, trees));
                    }
                }
                Walk::StoppedAtError(mut trees) => {
                    trees.push(tree.clone());
                    return Walk::StoppedAtError(trees);
                }
                Walk::Failed => return Walk::Failed,
            },
        }
    }
    Walk::Completed(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use cfgrammar::SymbolMetadata;

    fn leaf(sym: u32) -> Tree {
        Tree::make_leaf(sym, 0, 1, SymbolMetadata::default())
    }

    #[test]
    fn push_and_pop_count_round_trips() {
        let mut s = Stack::new(Some(lrtable::StIdx(0)));
        s.push(0, Some(leaf(1)), false, Some(lrtable::StIdx(1)));
        s.push(0, Some(leaf(2)), false, Some(lrtable::StIdx(2)));
        assert_eq!(s.top_position(0), 2);

        let result = s.pop_count(0, 2);
        assert_eq!(result.status, StackPopStatus::Ok);
        assert_eq!(result.slices.len(), 1);
        assert_eq!(result.slices[0].trees.len(), 2);
        assert_eq!(result.slices[0].trees[0].symbol(), 1);
        assert_eq!(result.slices[0].trees[1].symbol(), 2);
        assert_eq!(s.top_state(0), Some(lrtable::StIdx(0)));
        assert_eq!(s.top_position(0), 0);
    }

    #[test]
    fn pop_count_stops_at_error_sentinel_without_mutating() {
        let mut s = Stack::new(Some(lrtable::StIdx(0)));
        s.push(0, None, false, None);
        s.push(0, Some(leaf(5)), false, Some(lrtable::StIdx(1)));

        let result = s.pop_count(0, 2);
        assert_eq!(result.status, StackPopStatus::StoppedAtError);
        assert_eq!(result.slices[0].trees.len(), 1);
        assert_eq!(s.top_state(0), Some(lrtable::StIdx(1)));
    }

    #[test]
    fn pop_pending_stops_at_first_non_pending_frame() {
        let mut s = Stack::new(Some(lrtable::StIdx(0)));
        s.push(0, Some(leaf(1)), true, Some(lrtable::StIdx(1)));
        s.push(0, Some(leaf(2)), true, Some(lrtable::StIdx(2)));
        s.push(0, Some(leaf(3)), false, Some(lrtable::StIdx(3)));

        let result = s.pop_pending(0);
        assert_eq!(result.status, StackPopStatus::Ok);
        assert_eq!(result.slices[0].trees.len(), 0);
        assert_eq!(s.top_state(0), Some(lrtable::StIdx(3)));
    }

    #[test]
    fn duplicate_version_shares_structure_until_diverging() {
        let mut s = Stack::new(Some(lrtable::StIdx(0)));
        s.push(0, Some(leaf(1)), false, Some(lrtable::StIdx(1)));
        let v1 = s.duplicate_version(0);
        assert_eq!(s.top_state(v1), s.top_state(0));

        s.push(0, Some(leaf(2)), false, Some(lrtable::StIdx(2)));
        s.push(v1, Some(leaf(3)), false, Some(lrtable::StIdx(2)));
        assert_eq!(s.top_state(0), s.top_state(v1));
        assert_ne!(s.top_position(0), s.top_position(v1));
    }

    #[test]
    fn merge_unifies_versions_at_same_state_and_position() {
        let mut s = Stack::new(Some(lrtable::StIdx(0)));
        s.push(0, Some(leaf(1)), false, Some(lrtable::StIdx(1)));
        let v1 = s.duplicate_version(0);
        s.push(0, Some(leaf(2)), false, Some(lrtable::StIdx(2)));
        s.push(v1, Some(leaf(3)), false, Some(lrtable::StIdx(2)));

        assert!(s.merge(0, v1));
        assert!(Rc::ptr_eq(&s.heads[0], &s.heads[v1]));
    }

    #[test]
    fn condense_removes_duplicate_tops() {
        let mut s = Stack::new(Some(lrtable::StIdx(0)));
        s.push(0, Some(leaf(1)), false, Some(lrtable::StIdx(1)));
        let v1 = s.duplicate_version(0);
        s.push(0, Some(leaf(2)), false, Some(lrtable::StIdx(2)));
        s.push(v1, Some(leaf(3)), false, Some(lrtable::StIdx(2)));

        assert_eq!(s.version_count(), 2);
        assert!(s.condense());
        assert_eq!(s.version_count(), 1);
    }

    #[test]
    fn iterate_walks_down_one_real_tree_at_a_time() {
        let mut s = Stack::new(Some(lrtable::StIdx(0)));
        s.push(0, Some(leaf(1)), false, Some(lrtable::StIdx(1)));
        s.push(0, Some(leaf(2)), false, Some(lrtable::StIdx(2)));

        let mut seen = Vec::new();
        s.iterate(0, |depth, state, trees| {
            seen.push((depth, state, trees.len()));
            IterateAction::Continue
        });
        assert_eq!(seen, vec![(1, Some(lrtable::StIdx(1)), 1), (2, Some(lrtable::StIdx(0)), 2)]);
    }

    #[test]
    fn iterate_below_error_skips_the_sentinel_and_the_trees_above_it() {
        let mut s = Stack::new(Some(lrtable::StIdx(0)));
        s.push(0, Some(leaf(1)), false, Some(lrtable::StIdx(1)));
        s.push(0, None, false, None);
        s.push(0, Some(leaf(2)), false, Some(lrtable::StIdx(2)));

        let mut seen = Vec::new();
        s.iterate_below_error(0, 1, |depth, state, trees| {
            seen.push((depth, state, trees.len()));
            IterateAction::Continue
        });
        assert_eq!(seen, vec![(1, Some(lrtable::StIdx(0)), 1)]);
    }

    #[test]
    fn drop_above_error_repositions_the_head_below_the_boundary() {
        let mut s = Stack::new(Some(lrtable::StIdx(0)));
        s.push(0, Some(leaf(1)), false, Some(lrtable::StIdx(1)));
        s.push(0, None, false, None);
        s.push(0, Some(leaf(2)), false, Some(lrtable::StIdx(2)));

        let below = s.drop_above_error(0, 1, 1).expect("one real frame sits below the sentinel");
        assert_eq!(below.len(), 1);
        assert_eq!(below[0].symbol(), 1);
        assert_eq!(s.top_state(0), Some(lrtable::StIdx(0)));
    }
}

