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
//! The concrete syntax tree the driver produces. Trees are
//! reference-counted (`Rc`) and single-threaded, matching the Non-goal that
//! a parser instance is not thread-safe; a handful of fields are mutated
//! after construction (the scratch-tree swap in the reduce-merge path, the
//! post-parse `assign_parents` pass, marking a shared leaf `extra`), so the
//! inner data lives behind a `RefCell`.
//!
//! Cyclic references are avoided deliberately: `context`
//! (the parent back-edge) is a non-owning `Weak`, assigned only once in a
//! single downward walk after parsing completes. During parsing only the
//! child→parent direction exists as ordinary owning `Rc`s.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::{Rc, Weak};

use cfgrammar::{SymbolId, SymbolMetadata, ERROR_SYMBOL};
use lrtable::StateOrError;

/// A tree's lex-state requirement: either lexable from any state, or only
/// reusable when the current LR state maps to the same specific lex state
///.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LexState {
    Independent,
    State(u32),
}

/// Non-owning back-reference to a tree's parent, assigned once after
/// parsing completes.
#[derive(Clone)]
pub struct Context {
    pub parent: Weak<RefCell<TreeData>>,
    pub index: usize,
}

pub struct TreeData {
    pub symbol: SymbolId,
    pub children: Vec<Tree>,
    pub padding: usize,
    pub size: usize,
    pub error_size: usize,
    pub extra: bool,
    pub lex_state: LexState,
    pub parse_state: StateOrError,
    pub fragile_left: bool,
    pub fragile_right: bool,
    pub has_changes: bool,
    pub context: Option<Context>,
    pub metadata: SymbolMetadata,
}

/// A reference-counted handle to a tree node. Cloning a `Tree` is the
/// `retain` primitive; dropping the last handle is `release`.
#[derive(Clone)]
pub struct Tree(Rc<RefCell<TreeData>>);

impl Tree {
    fn from_data(data: TreeData) -> Tree {
        Tree(Rc::new(RefCell::new(data)))
    }

    pub fn make_leaf(symbol: SymbolId, padding: usize, size: usize, metadata: SymbolMetadata) -> Tree {
        Tree::from_data(TreeData {
            symbol,
            children: Vec::new(),
            padding,
            size,
            error_size: 0,
            extra: metadata.extra,
            lex_state: LexState::Independent,
            parse_state: None,
            fragile_left: false,
            fragile_right: false,
            has_changes: false,
            context: None,
            metadata,
        })
    }

    pub fn make_error(padding: usize, size: usize, _first_unexpected_char: Option<char>) -> Tree {
        Tree::from_data(TreeData {
            symbol: ERROR_SYMBOL,
            children: Vec::new(),
            padding,
            size,
            error_size: size,
            extra: false,
            lex_state: LexState::Independent,
            parse_state: None,
            fragile_left: false,
            fragile_right: false,
            has_changes: false,
            context: None,
            metadata: SymbolMetadata::default(),
        })
    }

    /// Build a composite node out of `children`. The node's own leading
    /// `padding` is inherited from the first child; `size` is whatever of each child's total span isn't already
    /// accounted for by that inherited padding.
    pub fn make_node(symbol: SymbolId, children: Vec<Tree>, metadata: SymbolMetadata) -> Tree {
        let mut t = Tree::from_data(TreeData {
            symbol,
            children: Vec::new(),
            padding: 0,
            size: 0,
            error_size: 0,
            extra: metadata.extra,
            lex_state: LexState::Independent,
            parse_state: None,
            fragile_left: false,
            fragile_right: false,
            has_changes: false,
            context: None,
            metadata,
        });
        t.set_children(children);
        t
    }

    /// Build the error node a repair produces: its children are the
    /// skipped trees, and its span covers their whole combined extent.
    pub fn make_error_node(children: Vec<Tree>) -> Tree {
        let size: usize = children.iter().map(|c| c.total_chars()).sum();
        let error_size = size;
        Tree::from_data(TreeData {
            symbol: ERROR_SYMBOL,
            children,
            padding: 0,
            size,
            error_size,
            extra: false,
            lex_state: LexState::Independent,
            parse_state: None,
            fragile_left: false,
            fragile_right: false,
            has_changes: false,
            context: None,
            metadata: SymbolMetadata::default(),
        })
    }

    /// A fresh top node sharing no identity with `self`, used when a tree
    /// that might be shared across stack versions must be mutated (marking
    /// it `extra` on shift) without disturbing versions that still see the
    /// original.
    pub fn make_copy(&self) -> Tree {
        let d = self.0.borrow();
        Tree::from_data(TreeData {
            symbol: d.symbol,
            children: d.children.clone(),
            padding: d.padding,
            size: d.size,
            error_size: d.error_size,
            extra: d.extra,
            lex_state: d.lex_state,
            parse_state: d.parse_state,
            fragile_left: d.fragile_left,
            fragile_right: d.fragile_right,
            has_changes: d.has_changes,
            context: None,
            metadata: d.metadata,
        })
    }

    /// Replace this node's children in place, recomputing `padding`/`size`/
    /// `error_size` from them. Used both by ordinary node construction and
    /// by the reduce-merge scratch-swap and accept-finalizer splice
    ///.
    pub fn set_children(&self, children: Vec<Tree>) {
        let (padding, size) = if let Some(first) = children.first() {
            let padding = first.padding();
            let mut size = first.size();
            for c in &children[1..] {
                size += c.total_chars();
            }
            (padding, size)
        } else {
            (0, 0)
        };
        let error_size: usize = children.iter().map(|c| c.error_size()).sum();
        let mut d = self.0.borrow_mut();
        d.children = children;
        d.padding = padding;
        d.size = size;
        d.error_size = error_size;
    }

    pub fn retain(&self) -> Tree {
        self.clone()
    }

    pub fn release(self) {}

    pub fn symbol(&self) -> SymbolId {
        self.0.borrow().symbol
    }

    pub fn padding(&self) -> usize {
        self.0.borrow().padding
    }

    pub fn size(&self) -> usize {
        self.0.borrow().size
    }

    pub fn total_chars(&self) -> usize {
        let d = self.0.borrow();
        d.padding + d.size
    }

    pub fn error_size(&self) -> usize {
        self.0.borrow().error_size
    }

    pub fn add_error_size(&self, delta: usize) {
        self.0.borrow_mut().error_size += delta;
    }

    pub fn extra(&self) -> bool {
        self.0.borrow().extra
    }

    pub fn set_extra(&self, extra: bool) {
        self.0.borrow_mut().extra = extra;
    }

    pub fn lex_state(&self) -> LexState {
        self.0.borrow().lex_state
    }

    pub fn set_lex_state(&self, state: LexState) {
        self.0.borrow_mut().lex_state = state;
    }

    pub fn parse_state(&self) -> StateOrError {
        self.0.borrow().parse_state
    }

    pub fn set_parse_state(&self, state: StateOrError) {
        self.0.borrow_mut().parse_state = state;
    }

    pub fn is_fragile(&self) -> bool {
        let d = self.0.borrow();
        d.fragile_left || d.fragile_right
    }

    pub fn set_fragile(&self, left: bool, right: bool) {
        let mut d = self.0.borrow_mut();
        d.fragile_left = left;
        d.fragile_right = right;
    }

    pub fn has_changes(&self) -> bool {
        self.0.borrow().has_changes
    }

    pub fn set_has_changes(&self, v: bool) {
        self.0.borrow_mut().has_changes = v;
    }

    pub fn is_error(&self) -> bool {
        self.symbol() == ERROR_SYMBOL
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    pub fn child(&self, i: usize) -> Tree {
        self.0.borrow().children[i].clone()
    }

    pub fn children(&self) -> Vec<Tree> {
        self.0.borrow().children.clone()
    }

    pub fn metadata(&self) -> SymbolMetadata {
        self.0.borrow().metadata
    }

    pub fn context_index(&self) -> Option<usize> {
        self.0.borrow().context.as_ref().map(|c| c.index)
    }

    pub fn parent(&self) -> Option<Tree> {
        self.0
            .borrow()
            .context
            .as_ref()
            .and_then(|c| c.parent.upgrade())
            .map(Tree)
    }

    pub fn ptr_eq(&self, other: &Tree) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of "essential" (non-`extra`) children.
    pub fn array_essential_count(children: &[Tree]) -> usize {
        children.iter().filter(|c| !c.extra()).count()
    }

    /// Deterministic structural pre-order comparison used to break ties
    /// between two candidate derivations of the same span.
    /// `Less` means `self` is preferred.
    pub fn compare(&self, other: &Tree) -> Ordering {
        if self.ptr_eq(other) {
            return Ordering::Equal;
        }
        match self.symbol().cmp(&other.symbol()) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match self.child_count().cmp(&other.child_count()) {
            Ordering::Equal => {}
            ord => return ord,
        }
        for i in 0..self.child_count() {
            match self.child(i).compare(&other.child(i)) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    /// Assign every descendant's `context` (parent + index) in one downward
    /// walk, after parsing has finished.
    pub fn assign_parents(root: &Tree) {
        let weak = Rc::downgrade(&root.0);
        let n = root.child_count();
        for i in 0..n {
            let child = root.child(i);
            child.0.borrow_mut().context = Some(Context {
                parent: weak.clone(),
                index: i,
            });
            Tree::assign_parents(&child);
        }
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let d = self.0.borrow();
        write!(
            f,
            "Tree(sym={}, children={}, padding={}, size={}, error_size={}, extra={})",
            d.symbol,
            d.children.len(),
            d.padding,
            d.size,
            d.error_size,
            d.extra
        )
    }
}
