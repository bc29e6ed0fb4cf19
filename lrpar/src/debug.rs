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

//! Per-parser diagnostics. A global `log`/`tracing` subscriber can't be used
//! here: two `Parser`s on two threads must never interleave into shared
//! process-wide state, so the driver calls a callback the caller owns
//! instead.

use cfgrammar::RIdx;
use lrtable::StIdx;

/// One notable event during a parse, handed to the installed `Debugger`.
/// Fields mirror what a `LOG_ACTION`-style trace would print.
#[derive(Clone, Debug)]
pub enum DebugEvent {
    Shift { version: usize, symbol: u32, to_state: Option<StIdx> },
    Reduce { version: usize, symbol: RIdx, count: u32 },
    Accept { version: usize },
    Recover { version: usize, forked: usize, to_state: StIdx },
    HandleError { version: usize, state: StIdx },
    RepairFound { version: usize, symbol: RIdx, skip_count: usize },
    NoRepairFound { version: usize },
    Resynced { version: usize },
    Breakdown { version: usize },
    Condense,
    Reuse { version: usize, symbol: u32 },
    LexAccept { version: usize, symbol: u32 },
}

/// A parser's debug callback, set via `Parser::set_debugger`. Boxed rather
/// than generic so `Parser` doesn't need a type parameter just for this.
pub type Debugger<'a> = Box<dyn FnMut(DebugEvent) + 'a>;
