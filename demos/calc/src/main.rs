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

//! A small REPL driving the incremental driver end to end: each line is
//! lexed and parsed against a hand-built arithmetic table, and the
//! resulting tree is printed as an s-expression. Enter the same expression
//! again with a typo and the previous tree is passed back in, so the parser
//! reuses everything except the part that changed.

mod table;

use std::io::{self, BufRead, Write};

use lrpar::{Parser, Tree};
use table::{ArithTable, LPAREN, NUM, PLUS, RPAREN, STAR};

fn print_tree(tree: &Tree, out: &mut String) {
    if tree.child_count() == 0 {
        match tree.symbol() {
            s if s == NUM => out.push_str("num"),
            s if s == PLUS => out.push('+'),
            s if s == STAR => out.push('*'),
            s if s == LPAREN => out.push('('),
            s if s == RPAREN => out.push(')'),
            _ if tree.is_error() => out.push_str("<error>"),
            _ => out.push_str("<eof>"),
        }
        return;
    }
    out.push('(');
    for i in 0..tree.child_count() {
        if i > 0 {
            out.push(' ');
        }
        print_tree(&tree.child(i), out);
    }
    out.push(')');
}

fn main() {
    let table = ArithTable::new();
    let stdin = io::stdin();
    let mut previous: Option<Tree> = None;

    loop {
        print!(">>> ");
        io::stdout().flush().ok();
        match stdin.lock().lines().next() {
            Some(Ok(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                let mut lexer = table.lexer();
                lexer.set_input(&line);
                let mut parser = Parser::new(&table, Box::new(lexer));
                match parser.parse(&line, previous.as_ref()) {
                    Some(tree) => {
                        let mut out = String::new();
                        print_tree(&tree, &mut out);
                        println!("{} (error_size={})", out, tree.error_size());
                        previous = Some(tree);
                    }
                    None => println!("no parse could be produced"),
                }
            }
            _ => break,
        }
    }
}
