// Copyright 2015 Google Inc. All rights reserved.
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

//! Typographic substitution over rendered HTML ("smartypants"): curly
//! quotes, en/em dashes, ellipses, fractions and the common symbol marks.
//!
//! Runs after the HTML renderer, dispatching on a byte table just like the
//! inline engine. Content inside `pre`, `code` and friends is passed
//! through untouched.

use std::fmt::Write;

use crate::buffer::Buffer;
use crate::html::{is_tag, HtmlTag};
use crate::scanners::is_ascii_space;

// byte -> substitution routine index
#[rustfmt::skip]
static SMARTYPANTS_CB_CHARS: [u8; 256] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 4, 0, 0, 0, 5, 3, 2, 0, 0, 0, 0, 1, 6, 0,
    0, 7, 0, 7, 0, 0, 0, 0, 0, 0, 0, 0, 8, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 10, 0, 0, 0,
    9, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

struct SmartypantsData {
    in_squote: bool,
    in_dquote: bool,
}

fn word_boundary(c: u8) -> bool {
    c == 0 || is_ascii_space(c) || c.is_ascii_punctuation()
}

fn at(text: &[u8], i: usize) -> u8 {
    text.get(i).copied().unwrap_or(0)
}

fn quotes(ob: &mut Buffer, previous: u8, next: u8, quote: char, is_open: &mut bool) -> bool {
    if *is_open && !word_boundary(next) {
        return false;
    }
    if !*is_open && !word_boundary(previous) {
        return false;
    }

    let _ = write!(ob, "&{}{}quo;", if *is_open { 'r' } else { 'l' }, quote);
    *is_open = !*is_open;
    true
}

fn cb_squote(ob: &mut Buffer, smrt: &mut SmartypantsData, previous: u8, text: &[u8]) -> usize {
    let size = text.len();

    if size >= 2 {
        let t1 = text[1].to_ascii_lowercase();

        if t1 == b'\'' && quotes(ob, previous, at(text, 2), 'd', &mut smrt.in_dquote) {
            return 1;
        }

        // common contractions keep a right quote
        if matches!(t1, b's' | b't' | b'm' | b'd') && (size == 3 || word_boundary(at(text, 2))) {
            ob.put_str("&rsquo;");
            return 0;
        }

        if size >= 3 {
            let t2 = text[2].to_ascii_lowercase();
            if matches!((t1, t2), (b'r', b'e') | (b'l', b'l') | (b'v', b'e'))
                && (size == 4 || word_boundary(at(text, 3)))
            {
                ob.put_str("&rsquo;");
                return 0;
            }
        }
    }

    if quotes(ob, previous, at(text, 1), 's', &mut smrt.in_squote) {
        return 0;
    }

    ob.put_byte(text[0]);
    0
}

fn cb_parens(ob: &mut Buffer, _smrt: &mut SmartypantsData, _previous: u8, text: &[u8]) -> usize {
    let size = text.len();

    if size >= 3 {
        let t1 = text[1].to_ascii_lowercase();
        let t2 = text[2].to_ascii_lowercase();

        if t1 == b'c' && t2 == b')' {
            ob.put_str("&copy;");
            return 2;
        }
        if t1 == b'r' && t2 == b')' {
            ob.put_str("&reg;");
            return 2;
        }
        if size >= 4 && t1 == b't' && t2 == b'm' && text[3] == b')' {
            ob.put_str("&trade;");
            return 3;
        }
    }

    ob.put_byte(text[0]);
    0
}

fn cb_dash(ob: &mut Buffer, _smrt: &mut SmartypantsData, _previous: u8, text: &[u8]) -> usize {
    if text.len() >= 3 && text[1] == b'-' && text[2] == b'-' {
        ob.put_str("&mdash;");
        return 2;
    }
    if text.len() >= 2 && text[1] == b'-' {
        ob.put_str("&ndash;");
        return 1;
    }

    ob.put_byte(text[0]);
    0
}

fn cb_amp(ob: &mut Buffer, smrt: &mut SmartypantsData, previous: u8, text: &[u8]) -> usize {
    if text.len() >= 6
        && &text[..6] == b"&quot;"
        && quotes(ob, previous, at(text, 6), 'd', &mut smrt.in_dquote)
    {
        return 5;
    }

    if text.len() >= 4 && &text[..4] == b"&#0;" {
        return 3;
    }

    ob.put_byte(b'&');
    0
}

fn cb_period(ob: &mut Buffer, _smrt: &mut SmartypantsData, _previous: u8, text: &[u8]) -> usize {
    if text.len() >= 3 && text[1] == b'.' && text[2] == b'.' {
        ob.put_str("&hellip;");
        return 2;
    }

    if text.len() >= 5 && text[1] == b' ' && text[2] == b'.' && text[3] == b' ' && text[4] == b'.'
    {
        ob.put_str("&hellip;");
        return 4;
    }

    ob.put_byte(text[0]);
    0
}

fn cb_backtick(ob: &mut Buffer, smrt: &mut SmartypantsData, previous: u8, text: &[u8]) -> usize {
    if text.len() >= 2
        && text[1] == b'`'
        && quotes(ob, previous, at(text, 2), 'd', &mut smrt.in_dquote)
    {
        return 1;
    }

    0
}

fn cb_number(ob: &mut Buffer, _smrt: &mut SmartypantsData, previous: u8, text: &[u8]) -> usize {
    if word_boundary(previous) && text.len() >= 3 {
        if text[0] == b'1' && text[1] == b'/' && text[2] == b'2' {
            if text.len() == 3 || word_boundary(text[3]) {
                ob.put_str("&frac12;");
                return 2;
            }
        }

        if text[0] == b'1' && text[1] == b'/' && text[2] == b'4' {
            if text.len() == 3
                || word_boundary(text[3])
                || (text.len() >= 5
                    && text[3].to_ascii_lowercase() == b't'
                    && text[4].to_ascii_lowercase() == b'h')
            {
                ob.put_str("&frac14;");
                return 2;
            }
        }

        if text[0] == b'3' && text[1] == b'/' && text[2] == b'4' {
            if text.len() == 3
                || word_boundary(text[3])
                || (text.len() >= 6
                    && text[3].to_ascii_lowercase() == b't'
                    && text[4].to_ascii_lowercase() == b'h'
                    && text[5].to_ascii_lowercase() == b's')
            {
                ob.put_str("&frac34;");
                return 2;
            }
        }
    }

    ob.put_byte(text[0]);
    0
}

fn cb_dquote(ob: &mut Buffer, smrt: &mut SmartypantsData, previous: u8, text: &[u8]) -> usize {
    if !quotes(ob, previous, at(text, 1), 'd', &mut smrt.in_dquote) {
        ob.put_str("&quot;");
    }

    0
}

fn cb_ltag(ob: &mut Buffer, _smrt: &mut SmartypantsData, _previous: u8, text: &[u8]) -> usize {
    const SKIP_TAGS: [&str; 8] = [
        "pre", "code", "var", "samp", "kbd", "math", "script", "style",
    ];

    let size = text.len();
    let mut i = 0;
    while i < size && text[i] != b'>' {
        i += 1;
    }

    let skip = SKIP_TAGS
        .iter()
        .find(|tag| is_tag(text, tag) == Some(HtmlTag::Open));

    if let Some(tag) = skip {
        loop {
            while i < size && text[i] != b'<' {
                i += 1;
            }
            if i == size {
                break;
            }
            if is_tag(&text[i..], tag) == Some(HtmlTag::Close) {
                break;
            }
            i += 1;
        }
        while i < size && text[i] != b'>' {
            i += 1;
        }
    }

    ob.put(&text[..size.min(i + 1)]);
    i
}

fn cb_escape(ob: &mut Buffer, _smrt: &mut SmartypantsData, _previous: u8, text: &[u8]) -> usize {
    if text.len() < 2 {
        return 0;
    }

    match text[1] {
        b'\\' | b'"' | b'\'' | b'.' | b'-' | b'`' => {
            ob.put_byte(text[1]);
            1
        }
        _ => {
            ob.put_byte(b'\\');
            0
        }
    }
}

/// Applies the typographic substitutions to `text`, appending to `ob`.
pub fn smartypants(ob: &mut Buffer, text: &[u8]) {
    let mut smrt = SmartypantsData {
        in_squote: false,
        in_dquote: false,
    };

    ob.grow(ob.len() + text.len());

    let mut i = 0;
    while i < text.len() {
        let org = i;
        let mut action = 0;
        while i < text.len() {
            action = SMARTYPANTS_CB_CHARS[text[i] as usize];
            if action != 0 {
                break;
            }
            i += 1;
        }

        if i > org {
            ob.put(&text[org..i]);
        }
        if i >= text.len() {
            break;
        }

        let previous = if i > 0 { text[i - 1] } else { 0 };
        let consumed = match action {
            1 => cb_dash(ob, &mut smrt, previous, &text[i..]),
            2 => cb_parens(ob, &mut smrt, previous, &text[i..]),
            3 => cb_squote(ob, &mut smrt, previous, &text[i..]),
            4 => cb_dquote(ob, &mut smrt, previous, &text[i..]),
            5 => cb_amp(ob, &mut smrt, previous, &text[i..]),
            6 => cb_period(ob, &mut smrt, previous, &text[i..]),
            7 => cb_number(ob, &mut smrt, previous, &text[i..]),
            8 => cb_ltag(ob, &mut smrt, previous, &text[i..]),
            9 => cb_backtick(ob, &mut smrt, previous, &text[i..]),
            10 => cb_escape(ob, &mut smrt, previous, &text[i..]),
            _ => 0,
        };
        i += consumed + 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn smart(input: &[u8]) -> Vec<u8> {
        let mut ob = Buffer::new(64);
        smartypants(&mut ob, input);
        ob.as_slice().to_vec()
    }

    #[test]
    fn double_quotes() {
        assert_eq!(smart(b"\"hi\""), b"&ldquo;hi&rdquo;");
        assert_eq!(smart(b"``hi''"), b"&ldquo;hi&rdquo;");
    }

    #[test]
    fn single_quotes_and_contractions() {
        assert_eq!(smart(b"'quoted'"), b"&lsquo;quoted&rsquo;");
        assert_eq!(smart(b"it's"), b"it&rsquo;s");
        assert_eq!(smart(b"we're"), b"we&rsquo;re");
    }

    #[test]
    fn dashes_and_ellipses() {
        assert_eq!(smart(b"a--b"), b"a&ndash;b");
        assert_eq!(smart(b"a---b"), b"a&mdash;b");
        assert_eq!(smart(b"wait..."), b"wait&hellip;");
        assert_eq!(smart(b"wait. . ."), b"wait&hellip;");
    }

    #[test]
    fn symbol_marks_and_fractions() {
        assert_eq!(smart(b"(c) (r) (tm)"), b"&copy; &reg; &trade;");
        assert_eq!(smart(b"1/2 cup"), b"&frac12; cup");
        assert_eq!(smart(b"3/4ths"), b"&frac34;ths");
        assert_eq!(smart(b"11/22"), b"11/22");
    }

    #[test]
    fn skip_tags_pass_through() {
        assert_eq!(
            smart(b"<code>\"as-is\"</code>"),
            b"<code>\"as-is\"</code>"
        );
        assert_eq!(smart(b"<p>\"curly\"</p>"), b"<p>&ldquo;curly&rdquo;</p>");
    }

    #[test]
    fn escapes() {
        assert_eq!(smart(b"\\\"x\\\""), b"\"x\"");
        assert_eq!(smart(b"\\-"), b"-");
    }
}
