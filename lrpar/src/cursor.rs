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

//! A depth-first walk over a previous parse tree, used to find subtrees the
//! new parse can reuse instead of relighting the lexer and the table.

use tree::Tree;

/// Current position in a previous tree: the tree sitting at `char_index`
/// characters into the input, or nothing if the walk has run off the end.
#[derive(Clone)]
pub struct ReusableNode {
    current: Option<Tree>,
    char_index: usize,
}

impl ReusableNode {
    pub fn new(root: Option<Tree>) -> ReusableNode {
        ReusableNode {
            current: root,
            char_index: 0,
        }
    }

    pub fn tree(&self) -> Option<Tree> {
        self.current.clone()
    }

    pub fn char_index(&self) -> usize {
        self.char_index
    }

    pub fn is_exhausted(&self) -> bool {
        self.current.is_none()
    }

    /// Advance past the current tree, then climb until an unvisited right
    /// sibling is found; descend into it. Becomes exhausted if the walk
    /// reaches the root with no sibling left.
    pub fn pop(&mut self) {
        let mut node = match self.current.take() {
            Some(t) => t,
            None => return,
        };
        self.char_index += node.total_chars();
        loop {
            match (node.parent(), node.context_index()) {
                (Some(parent), Some(index)) => {
                    if index + 1 < parent.child_count() {
                        self.current = Some(parent.child(index + 1));
                        return;
                    }
                    node = parent;
                }
                _ => {
                    self.current = None;
                    return;
                }
            }
        }
    }

    /// Descend into the current tree's first child, repeatedly, while it's
    /// fragile. An error node or a leaf can't be descended into, so those
    /// are skipped over with `pop` instead.
    pub fn breakdown(&mut self) {
        let node = match &self.current {
            Some(t) => t.clone(),
            None => return,
        };
        if node.is_error() || node.child_count() == 0 {
            self.pop();
            return;
        }
        let mut cur = node;
        while cur.is_fragile() && cur.child_count() > 0 {
            cur = cur.child(0);
        }
        self.current = Some(cur);
    }
}
