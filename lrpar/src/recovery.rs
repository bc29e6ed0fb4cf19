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

//! What happens to a version when the table has no action for its
//! lookahead: fan out one fragile reduce attempt per reduce action the
//! state offers, keep whichever one succeeds and doesn't collide with a
//! shift or recover action already available there, then resync every
//! surviving fork onto `STATE_ERROR` so later reduces can find a repair
//! (`repair::find_repair`) below the boundary.

use cfgrammar::SymbolId;
use lrtable::{Action, ParseTable, ReduceAction, StIdx};
use stack::Stack;

use crate::debug::{DebugEvent, Debugger};
use crate::engine::{self, FragileReduceOutcome};

pub fn handle_error(
    table: &dyn ParseTable,
    stack: &mut Stack,
    version: usize,
    state: StIdx,
    lookahead: SymbolId,
    debugger: &mut Option<Debugger<'_>>,
) {
    if let Some(dbg) = debugger {
        dbg(DebugEvent::HandleError { version, state });
    }

    let mut reduce_actions: Vec<ReduceAction> = Vec::new();
    let mut has_shift_or_recover = false;
    for sym in 0..table.symbol_count() {
        for action in table.actions(state, sym) {
            match action {
                Action::Reduce(ra) if ra.count > 0 => {
                    if !reduce_actions.iter().any(|r| r.symbol == ra.symbol && r.count == ra.count) {
                        reduce_actions.push(*ra);
                    }
                }
                Action::Shift(_) | Action::Recover(_) => has_shift_or_recover = true,
                _ => {}
            }
        }
    }

    let mut winners: Vec<usize> = Vec::new();
    for ra in reduce_actions {
        let forked = stack.duplicate_version(version);
        match engine::try_fragile_reduce(table, stack, forked, ra) {
            FragileReduceOutcome::Reduced(resulting) => winners.extend(resulting),
            FragileReduceOutcome::StoppedAtError | FragileReduceOutcome::Failed => {
                stack.remove_version(forked);
                for w in winners.iter_mut() {
                    if *w > forked {
                        *w -= 1;
                    }
                }
            }
        }
    }

    if !winners.is_empty() && !has_shift_or_recover {
        let winner = winners.remove(0);
        stack.renumber_version(winner, version);
        for w in winners.iter_mut() {
            if *w > winner {
                *w -= 1;
            }
        }
    }

    stack.push(version, None, false, None);
    for w in winners {
        stack.push(w, None, false, None);
        stack.merge(version, w);
        stack.remove_version(w);
    }

    if let Some(dbg) = debugger {
        dbg(DebugEvent::Resynced { version });
    }
}
