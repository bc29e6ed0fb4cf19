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

//! Picks a winner between two candidate derivations of the same span, for
//! when a reduce-merge finds more than one version collapsing to the same
//! `(state, position)`.

use std::cmp::Ordering;

use tree::Tree;

/// `true` if `candidate` should replace `existing`: fewer accumulated error
/// characters wins outright; a tie is broken by a deterministic structural
/// comparison so the choice doesn't depend on version-creation order.
pub fn select_tree(existing: &Tree, candidate: &Tree) -> bool {
    match candidate.error_size().cmp(&existing.error_size()) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => candidate.compare(existing) == Ordering::Less,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use cfgrammar::SymbolMetadata;

    fn leaf(sym: u32, size: usize) -> Tree {
        Tree::make_leaf(sym, 0, size, SymbolMetadata::default())
    }

    #[test]
    fn fewer_errors_wins() {
        let existing = Tree::make_error_node(vec![leaf(1, 1)]);
        let candidate = leaf(2, 1);
        assert!(select_tree(&existing, &candidate));
        assert!(!select_tree(&candidate, &existing));
    }

    #[test]
    fn tie_breaks_by_structural_comparison() {
        let a = leaf(1, 1);
        let b = leaf(2, 1);
        assert!(select_tree(&b, &a));
        assert!(!select_tree(&a, &b));
    }

    #[test]
    fn identical_tree_keeps_existing() {
        let a = leaf(1, 1);
        assert!(!select_tree(&a, &a.clone()));
    }
}
