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

//! Scanners for fragments of Markdown syntax.
//!
//! Everything here is a pure function over a byte slice, returning either a
//! consumed length (zero meaning no match) or a small analysis of the
//! prefix. Block recognizers in `parse` consult these in a fixed order.

use std::cmp::Ordering;
use std::ops::Range;

use crate::AutolinkType;

// sorted for binary search
const BLOCK_TAGS: [&str; 24] = [
    "blockquote",
    "del",
    "div",
    "dl",
    "fieldset",
    "figure",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "iframe",
    "ins",
    "math",
    "noscript",
    "ol",
    "p",
    "pre",
    "script",
    "style",
    "table",
    "ul",
];

/// A Markdown space: the literal space or a newline. Tabs and carriage
/// returns are filtered out during the preprocessing phase.
pub(crate) fn is_md_space(b: u8) -> bool {
    b == b' ' || b == b'\n'
}

/// ASCII whitespace in the C `isspace` sense.
pub(crate) fn is_ascii_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

fn strcasecmp(a: &[u8], b: &[u8]) -> Ordering {
    for (&ca, &cb) in a.iter().zip(b.iter()) {
        let ord = ca.to_ascii_lowercase().cmp(&cb.to_ascii_lowercase());
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// Looks up a token in the HTML block-tag table, case-insensitively.
pub(crate) fn find_block_tag(tag: &[u8]) -> Option<&'static str> {
    if tag.is_empty() || tag.len() > 10 {
        return None;
    }
    BLOCK_TAGS
        .binary_search_by(|probe| strcasecmp(probe.as_bytes(), tag))
        .ok()
        .map(|ix| BLOCK_TAGS[ix])
}

/// Returns the line length when the line is blank, 0 otherwise.
pub(crate) fn is_empty(data: &[u8]) -> usize {
    for (i, &b) in data.iter().enumerate() {
        if b == b'\n' {
            return i + 1;
        }
        if b != b' ' {
            return 0;
        }
    }
    data.len() + 1
}

/// Whether the line is a horizontal rule.
pub(crate) fn is_hrule(data: &[u8]) -> bool {
    let size = data.len();
    if size < 3 {
        return false;
    }
    let mut i = 0;
    while i < 3 && data[i] == b' ' {
        i += 1;
    }
    if i + 2 >= size || !(data[i] == b'*' || data[i] == b'-' || data[i] == b'_') {
        return false;
    }
    let c = data[i];
    let mut n = 0;
    while i < size && data[i] != b'\n' {
        if data[i] == c {
            n += 1;
        } else if data[i] != b' ' {
            return false;
        }
        i += 1;
    }
    n >= 3
}

/// If the line begins with a code fence, returns the fence width in bytes.
fn prefix_codefence(data: &[u8]) -> usize {
    let size = data.len();
    if size < 3 {
        return 0;
    }
    let mut i = 0;
    while i < 3 && data[i] == b' ' {
        i += 1;
    }
    if i + 2 >= size || !(data[i] == b'~' || data[i] == b'`') {
        return 0;
    }
    let c = data[i];
    let mut n = 0;
    while i < size && data[i] == c {
        n += 1;
        i += 1;
    }
    if n < 3 {
        return 0;
    }
    i
}

/// If the line is a code fence, returns the consumed length (through the
/// trailing newline), the fence character, and the span of the language
/// token. The `{ lang }` wrapped form is accepted.
pub(crate) fn is_codefence(data: &[u8]) -> Option<(usize, u8, Range<usize>)> {
    let size = data.len();
    let mut i = prefix_codefence(data);
    if i == 0 {
        return None;
    }
    let fence_char = data[i - 1];
    while i < size && data[i] == b' ' {
        i += 1;
    }
    let mut syn_start = i;
    let mut syn_len = 0;
    if i < size && data[i] == b'{' {
        i += 1;
        syn_start += 1;
        while i < size && data[i] != b'}' && data[i] != b'\n' {
            syn_len += 1;
            i += 1;
        }
        if i == size || data[i] != b'}' {
            return None;
        }
        // strip whitespace at both ends of the {} block
        while syn_len > 0 && is_md_space(data[syn_start]) {
            syn_start += 1;
            syn_len -= 1;
        }
        while syn_len > 0 && is_md_space(data[syn_start + syn_len - 1]) {
            syn_len -= 1;
        }
        i += 1;
    } else {
        while i < size && !is_md_space(data[i]) {
            syn_len += 1;
            i += 1;
        }
    }
    while i < size && data[i] != b'\n' {
        if !is_md_space(data[i]) {
            return None;
        }
        i += 1;
    }
    Some((i + 1, fence_char, syn_start..syn_start + syn_len))
}

/// Whether the line is a hash-prefixed header.
pub(crate) fn is_atxheader(data: &[u8], space_headers: bool) -> bool {
    if data.is_empty() || data[0] != b'#' {
        return false;
    }
    if space_headers {
        let mut level = 0;
        while level < data.len() && level < 6 && data[level] == b'#' {
            level += 1;
        }
        if level < data.len() && data[level] != b' ' {
            return false;
        }
    }
    true
}

/// Setext underline check: returns the header level (1 for `=`, 2 for `-`),
/// or 0 when the line is not an underline.
pub(crate) fn is_headerline(data: &[u8]) -> i32 {
    let size = data.len();
    if size == 0 {
        return 0;
    }
    let c = data[0];
    let level = match c {
        b'=' => 1,
        b'-' => 2,
        _ => return 0,
    };
    let mut i = 1;
    while i < size && data[i] == c {
        i += 1;
    }
    while i < size && data[i] == b' ' {
        i += 1;
    }
    if i >= size || data[i] == b'\n' {
        level
    } else {
        0
    }
}

fn is_next_headerline(data: &[u8]) -> bool {
    let size = data.len();
    let mut i = 0;
    while i < size && data[i] != b'\n' {
        i += 1;
    }
    i += 1;
    if i >= size {
        return false;
    }
    is_headerline(&data[i..]) != 0
}

/// Blockquote prefix length, 0 when absent.
pub(crate) fn prefix_quote(data: &[u8]) -> usize {
    let size = data.len();
    let mut i = 0;
    while i < 3 && i < size && data[i] == b' ' {
        i += 1;
    }
    if i < size && data[i] == b'>' {
        if i + 1 < size && data[i + 1] == b' ' {
            return i + 2;
        }
        return i + 1;
    }
    0
}

/// Indented-code prefix length, 0 when absent.
pub(crate) fn prefix_code(data: &[u8]) -> usize {
    if data.len() > 3 && data[0] == b' ' && data[1] == b' ' && data[2] == b' ' && data[3] == b' ' {
        return 4;
    }
    0
}

/// Ordered-list item prefix length, 0 when absent.
pub(crate) fn prefix_oli(data: &[u8]) -> usize {
    let size = data.len();
    let mut i = 0;
    while i < 3 && i < size && data[i] == b' ' {
        i += 1;
    }
    if i >= size || !data[i].is_ascii_digit() {
        return 0;
    }
    while i < size && data[i].is_ascii_digit() {
        i += 1;
    }
    if i + 1 >= size || data[i] != b'.' || data[i + 1] != b' ' {
        return 0;
    }
    if is_next_headerline(&data[i..]) {
        return 0;
    }
    i + 2
}

/// Unordered-list item prefix length, 0 when absent.
pub(crate) fn prefix_uli(data: &[u8]) -> usize {
    let size = data.len();
    let mut i = 0;
    while i < 3 && i < size && data[i] == b' ' {
        i += 1;
    }
    if i + 1 >= size
        || (data[i] != b'*' && data[i] != b'+' && data[i] != b'-')
        || data[i + 1] != b' '
    {
        return 0;
    }
    if is_next_headerline(&data[i..]) {
        return 0;
    }
    i + 2
}

/// Looks for the address part of a mail autolink and the closing `>`.
/// The address is assumed to be `[-@._a-zA-Z0-9]+` with exactly one `@`.
fn is_mail_autolink(data: &[u8]) -> usize {
    let mut nb = 0;
    for (i, &b) in data.iter().enumerate() {
        if b.is_ascii_alphanumeric() {
            continue;
        }
        match b {
            b'@' => nb += 1,
            b'-' | b'.' | b'_' => {}
            b'>' => return if nb == 1 { i + 1 } else { 0 },
            _ => return 0,
        }
    }
    0
}

/// Returns the length of the tag beginning at `data`, with the autolink
/// classification when the angle-bracketed span is a URI or email address.
/// A zero length means the bytes do not form a valid tag.
pub(crate) fn tag_length(data: &[u8]) -> (usize, Option<AutolinkType>) {
    let size = data.len();

    // a valid tag can't be shorter than 3 bytes
    if size < 3 || data[0] != b'<' {
        return (0, None);
    }
    let mut i = if data[1] == b'/' { 2 } else { 1 };
    if !data[i].is_ascii_alphanumeric() {
        return (0, None);
    }

    // try to find the beginning of a URI
    while i < size
        && (data[i].is_ascii_alphanumeric() || data[i] == b'.' || data[i] == b'+' || data[i] == b'-')
    {
        i += 1;
    }

    if i > 1 && i < size && data[i] == b'@' {
        let j = is_mail_autolink(&data[i..]);
        if j != 0 {
            return (i + j, Some(AutolinkType::Email));
        }
    }

    let mut autolink = false;
    if i > 2 && i < size && data[i] == b':' {
        autolink = true;
        i += 1;
    }

    if i >= size {
        autolink = false;
    }
    if autolink {
        // completing the autolink test: no whitespace, ' or "
        let j = i;
        while i < size {
            if data[i] == b'\\' {
                i += 2;
            } else if data[i] == b'>'
                || data[i] == b'\''
                || data[i] == b'"'
                || data[i] == b' '
                || data[i] == b'\n'
            {
                break;
            } else {
                i += 1;
            }
        }
        if i >= size {
            return (0, None);
        }
        if i > j && data[i] == b'>' {
            return (i + 1, Some(AutolinkType::Normal));
        }
        // one of the forbidden bytes has been found
    }

    // looking for something that ends like a tag
    while i < size && data[i] != b'>' {
        i += 1;
    }
    if i >= size {
        return (0, None);
    }
    (i + 1, None)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hrule_variants() {
        assert!(is_hrule(b"***\n"));
        assert!(is_hrule(b" - - -\n"));
        assert!(is_hrule(b"___\n"));
        assert!(!is_hrule(b"**\n"));
        assert!(!is_hrule(b"*-*\n"));
        assert!(!is_hrule(b"    ***\n"));
    }

    #[test]
    fn codefence_language() {
        let (len, c, lang) = is_codefence(b"```rust\ncode\n```\n").unwrap();
        assert_eq!(len, 8);
        assert_eq!(c, b'`');
        assert_eq!(lang, 3..7);

        let (_, c, lang) = is_codefence(b"~~~ { c++ }\n").unwrap();
        assert_eq!(c, b'~');
        assert_eq!(lang, 6..9);

        assert!(is_codefence(b"``\n").is_none());
        assert!(is_codefence(b"``` foo bar\n").is_none());
    }

    #[test]
    fn atx_space_headers() {
        assert!(is_atxheader(b"# ok\n", false));
        assert!(is_atxheader(b"#nospace\n", false));
        assert!(!is_atxheader(b"#nospace\n", true));
        assert!(is_atxheader(b"###### deep\n", true));
    }

    #[test]
    fn list_prefix_rejects_underline() {
        assert_eq!(prefix_uli(b"- item\n"), 2);
        assert_eq!(prefix_uli(b"- item\n---\n"), 0);
        assert_eq!(prefix_oli(b"12. item\n"), 4);
        assert_eq!(prefix_oli(b"12.item\n"), 0);
    }

    #[test]
    fn tag_length_classification() {
        assert_eq!(
            tag_length(b"<http://x.com/>"),
            (15, Some(AutolinkType::Normal))
        );
        assert_eq!(tag_length(b"<a@b.com>"), (9, Some(AutolinkType::Email)));
        assert_eq!(tag_length(b"<em>"), (4, None));
        assert_eq!(tag_length(b"</em>"), (5, None));
        assert_eq!(tag_length(b"<>"), (0, None));
        assert_eq!(tag_length(b"<no end"), (0, None));
    }

    #[test]
    fn block_tag_lookup() {
        assert_eq!(find_block_tag(b"div"), Some("div"));
        assert_eq!(find_block_tag(b"DIV"), Some("div"));
        assert_eq!(find_block_tag(b"h3"), Some("h3"));
        assert_eq!(find_block_tag(b"span"), None);
        assert_eq!(find_block_tag(b""), None);
    }
}
