// Copyright 2017 Google Inc. All rights reserved.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.

//! The reference-collection pass.
//!
//! Walks the raw document line by line before any block parsing happens.
//! Reference definitions are stored in the table and dropped from the text;
//! every other line is staged with tabs expanded to 4-column stops and line
//! endings collapsed to `\n`. A leading UTF-8 BOM is skipped.

use memchr::memchr2;

use crate::buffer::Buffer;
use crate::linklabel::{scan_link_ref, RefTable};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Runs phase 1 over `document`, filling `refs` and returning the staged
/// text the block recognizer operates on.
pub(crate) fn run_first_pass(document: &[u8], refs: &mut RefTable) -> Buffer {
    let mut text = Buffer::new(64);
    // preallocate to avoid expanding while copying
    text.grow(document.len());

    let mut beg = 0;
    if document.starts_with(UTF8_BOM) {
        beg += 3;
    }

    while beg < document.len() {
        if let Some(spans) = scan_link_ref(document, beg) {
            let mut link = Buffer::new(spans.link.len());
            link.put(&document[spans.link.clone()]);
            let title = spans.title.clone().map(|t| {
                let mut title = Buffer::new(t.len());
                title.put(&document[t]);
                title
            });
            refs.insert(&document[spans.label.clone()], link, title);
            beg = spans.end;
        } else {
            // skipping to the next line
            let mut end = beg
                + memchr2(b'\n', b'\r', &document[beg..]).unwrap_or(document.len() - beg);

            if end > beg {
                expand_tabs(&mut text, &document[beg..end]);
            }

            // one \n per line ending, whatever its source form
            while end < document.len() && (document[end] == b'\n' || document[end] == b'\r') {
                if document[end] == b'\n'
                    || (end + 1 < document.len() && document[end + 1] != b'\n')
                {
                    text.put_byte(b'\n');
                }
                end += 1;
            }

            beg = end;
        }
    }

    text
}

/// Expands tabs to the next 4-column boundary, counting columns from the
/// start of the line.
fn expand_tabs(ob: &mut Buffer, line: &[u8]) {
    let mut tab = 0;
    let mut i = 0;

    while i < line.len() {
        let org = i;
        while i < line.len() && line[i] != b'\t' {
            i += 1;
            tab += 1;
        }

        if i > org {
            ob.put(&line[org..i]);
        }

        if i >= line.len() {
            break;
        }

        loop {
            ob.put_byte(b' ');
            tab += 1;
            if tab % 4 == 0 {
                break;
            }
        }

        i += 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn staged(input: &[u8]) -> Vec<u8> {
        let mut refs = RefTable::default();
        run_first_pass(input, &mut refs).as_slice().to_vec()
    }

    #[test]
    fn newline_normalization() {
        assert_eq!(staged(b"a\r\nb\rc\nd"), b"a\nb\nc\nd");
    }

    #[test]
    fn bom_is_stripped_at_offset_zero() {
        assert_eq!(staged(b"\xEF\xBB\xBFhello"), b"hello");
        // a BOM anywhere else is ordinary bytes
        assert_eq!(staged(b"x\xEF\xBB\xBF"), b"x\xEF\xBB\xBF");
    }

    #[test]
    fn tab_expansion_law() {
        assert_eq!(staged(b"\tx"), b"    x");
        assert_eq!(staged(b"ab\tx"), b"ab  x");
        assert_eq!(staged(b"abcd\tx"), b"abcd    x");
    }

    #[test]
    fn definitions_are_consumed() {
        let mut refs = RefTable::default();
        let text = run_first_pass(b"[id]: http://e.com \"t\"\n", &mut refs);
        assert_eq!(text.as_slice(), b"\n");
        let r = refs.find(b"id").unwrap();
        assert_eq!(r.link.as_slice(), b"http://e.com");
        assert_eq!(r.title.as_ref().unwrap().as_slice(), b"t");
    }
}
