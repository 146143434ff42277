// Copyright 2018 Google LLC
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

//! Link-reference definitions: label fingerprinting, the bucketed
//! reference table, and the definition-line scanner used by the first pass.

use std::ops::Range;

use crate::buffer::Buffer;

const REF_TABLE_SIZE: usize = 8;

/// 32-bit fingerprint of a lowercased label.
///
/// Lookup compares fingerprints only, never the label bytes, so colliding
/// labels alias each other. This mirrors the reference behavior and is kept
/// for bug-compatibility.
pub(crate) fn hash_link_ref(label: &[u8]) -> u32 {
    let mut hash = 0u32;
    for &b in label {
        hash = (b.to_ascii_lowercase() as u32)
            .wrapping_add(hash.wrapping_shl(6))
            .wrapping_add(hash.wrapping_shl(16))
            .wrapping_sub(hash);
    }
    hash
}

pub(crate) struct LinkRef {
    id: u32,
    pub(crate) link: Buffer,
    pub(crate) title: Option<Buffer>,
}

/// Fixed-size bucket array of reference chains, cleared per render.
#[derive(Default)]
pub(crate) struct RefTable {
    buckets: [Vec<LinkRef>; REF_TABLE_SIZE],
}

impl RefTable {
    pub(crate) fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    pub(crate) fn insert(&mut self, label: &[u8], link: Buffer, title: Option<Buffer>) {
        let id = hash_link_ref(label);
        self.buckets[id as usize % REF_TABLE_SIZE].push(LinkRef { id, link, title });
    }

    /// Walks the label's chain comparing fingerprints only. The newest
    /// definition wins for duplicate fingerprints.
    pub(crate) fn find(&self, label: &[u8]) -> Option<&LinkRef> {
        let id = hash_link_ref(label);
        self.buckets[id as usize % REF_TABLE_SIZE]
            .iter()
            .rev()
            .find(|r| r.id == id)
    }
}

/// Spans of a reference definition within the document.
pub(crate) struct RefSpans {
    pub(crate) label: Range<usize>,
    pub(crate) link: Range<usize>,
    pub(crate) title: Option<Range<usize>>,
    /// Index of the line's terminating newline; the first pass resumes there.
    pub(crate) end: usize,
}

/// Attempts to parse a `[label]: url 'optional title'` definition starting
/// at `beg`. The label may not span lines; the URL may be angle-bracketed;
/// the title may sit on the same line or alone on the next.
pub(crate) fn scan_link_ref(data: &[u8], beg: usize) -> Option<RefSpans> {
    let end = data.len();

    // up to 3 optional leading spaces
    if beg + 3 >= end {
        return None;
    }
    let mut i = 0;
    if data[beg] == b' ' {
        i = 1;
        if data[beg + 1] == b' ' {
            i = 2;
            if data[beg + 2] == b' ' {
                i = 3;
                if data[beg + 3] == b' ' {
                    return None;
                }
            }
        }
    }
    i += beg;

    // label part: anything but a newline between brackets
    if data[i] != b'[' {
        return None;
    }
    i += 1;
    let id_offset = i;
    while i < end && data[i] != b'\n' && data[i] != b'\r' && data[i] != b']' {
        i += 1;
    }
    if i >= end || data[i] != b']' {
        return None;
    }
    let id_end = i;

    // spacer: colon (space)* newline? (space)*
    i += 1;
    if i >= end || data[i] != b':' {
        return None;
    }
    i += 1;
    while i < end && data[i] == b' ' {
        i += 1;
    }
    if i < end && (data[i] == b'\n' || data[i] == b'\r') {
        i += 1;
        if i < end && data[i] == b'\r' && data[i - 1] == b'\n' {
            i += 1;
        }
    }
    while i < end && data[i] == b' ' {
        i += 1;
    }
    if i >= end {
        return None;
    }

    // link: whitespace-free sequence, optionally between angle brackets
    if data[i] == b'<' {
        i += 1;
    }
    let link_offset = i;
    while i < end && data[i] != b' ' && data[i] != b'\n' && data[i] != b'\r' {
        i += 1;
    }
    let link_end = if data[i - 1] == b'>' { i - 1 } else { i };

    // optional spacer: (space)* (newline | ' | " | open paren)
    while i < end && data[i] == b' ' {
        i += 1;
    }
    if i < end
        && data[i] != b'\n'
        && data[i] != b'\r'
        && data[i] != b'\''
        && data[i] != b'"'
        && data[i] != b'('
    {
        return None;
    }
    let mut line_end = 0;
    if i >= end || data[i] == b'\r' || data[i] == b'\n' {
        line_end = i;
    }
    if i + 1 < end && data[i] == b'\n' && data[i + 1] == b'\r' {
        line_end = i + 1;
    }

    // optional (space)* spacer after a newline
    if line_end != 0 {
        i = line_end + 1;
        while i < end && data[i] == b' ' {
            i += 1;
        }
    }

    // optional title, any sequence enclosed in '"( alone on its line
    let mut title_offset = 0;
    let mut title_end = 0;
    if i + 1 < end && (data[i] == b'\'' || data[i] == b'"' || data[i] == b'(') {
        i += 1;
        title_offset = i;
        while i < end && data[i] != b'\n' && data[i] != b'\r' {
            i += 1;
        }
        title_end = if i + 1 < end && data[i] == b'\n' && data[i + 1] == b'\r' {
            i + 1
        } else {
            i
        };
        // stepping back over trailing spaces to the closing quote
        i -= 1;
        while i > title_offset && data[i] == b' ' {
            i -= 1;
        }
        if i > title_offset && (data[i] == b'\'' || data[i] == b'"' || data[i] == b')') {
            line_end = title_end;
            title_end = i;
        }
    }

    if line_end == 0 || link_end == link_offset {
        return None; // garbage after the link, or an empty link
    }

    Some(RefSpans {
        label: id_offset..id_end,
        link: link_offset..link_end,
        title: (title_end > title_offset).then(|| title_offset..title_end),
        end: line_end,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn buf(bytes: &[u8]) -> Buffer {
        let mut b = Buffer::new(64);
        b.put(bytes);
        b
    }

    #[test]
    fn insert_and_find() {
        let mut refs = RefTable::default();
        refs.insert(b"Label", buf(b"http://a"), None);
        let r = refs.find(b"label").expect("case-insensitive lookup");
        assert_eq!(r.link.as_slice(), b"http://a");
        assert!(refs.find(b"other").is_none());
    }

    #[test]
    fn newest_duplicate_wins() {
        let mut refs = RefTable::default();
        refs.insert(b"x", buf(b"http://first"), None);
        refs.insert(b"x", buf(b"http://second"), None);
        let r = refs.find(b"x").unwrap();
        assert_eq!(r.link.as_slice(), b"http://second");
    }

    #[test]
    fn fingerprints_alias_without_label_comparison() {
        // Distinct labels that land on the same fingerprint alias each
        // other; simulate by checking the lookup never reads label bytes.
        let mut refs = RefTable::default();
        refs.insert(b"a", buf(b"http://a"), None);
        assert_eq!(hash_link_ref(b"a"), hash_link_ref(b"A"));
        assert!(refs.find(b"A").is_some());
    }

    #[test]
    fn definition_forms() {
        let data = b"[id]: http://e.com \"t\"\n";
        let spans = scan_link_ref(data, 0).unwrap();
        assert_eq!(&data[spans.label.clone()], b"id");
        assert_eq!(&data[spans.link.clone()], b"http://e.com");
        assert_eq!(&data[spans.title.clone().unwrap()], b"t");

        let data = b"   [id]: <http://e.com>\n";
        let spans = scan_link_ref(data, 0).unwrap();
        assert_eq!(&data[spans.link.clone()], b"http://e.com");
        assert!(spans.title.is_none());

        // title on its own continuation line
        let data = b"[id]: http://e.com\n   'a title'\n";
        let spans = scan_link_ref(data, 0).unwrap();
        assert_eq!(&data[spans.title.clone().unwrap()], b"a title");
    }

    #[test]
    fn rejected_forms() {
        assert!(scan_link_ref(b"    [id]: http://e.com\n", 0).is_none());
        assert!(scan_link_ref(b"[id] http://e.com\n", 0).is_none());
        assert!(scan_link_ref(b"[id]:\n", 0).is_none());
        assert!(scan_link_ref(b"[id]: http://e.com trailing\n", 0).is_none());
    }
}
