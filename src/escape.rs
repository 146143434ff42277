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

//! HTML body and href escaping over static lookup tables.

use crate::buffer::Buffer;

// Escapes per the OWASP rules; the forward slash entry is only honored in
// secure mode.
#[rustfmt::skip]
static HTML_ESCAPE_TABLE: [u8; 256] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 1, 0, 0, 0, 2, 3, 0, 0, 0, 0, 0, 0, 0, 4,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 5, 0, 6, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
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

static HTML_ESCAPES: [&str; 7] = ["", "&quot;", "&amp;", "&#39;", "&#47;", "&lt;", "&gt;"];

/// Escapes HTML body text into `ob`. The forward slash is only escaped in
/// secure mode.
pub(crate) fn escape_html(ob: &mut Buffer, src: &[u8], secure: bool) {
    ob.grow(ob.len() + src.len() * 12 / 10);

    let mut i = 0;
    while i < src.len() {
        let org = i;
        while i < src.len() && HTML_ESCAPE_TABLE[src[i] as usize] == 0 {
            i += 1;
        }
        if i > org {
            ob.put(&src[org..i]);
        }
        if i >= src.len() {
            break;
        }

        if src[i] == b'/' && !secure {
            ob.put_byte(b'/');
        } else {
            ob.put_str(HTML_ESCAPES[HTML_ESCAPE_TABLE[src[i] as usize] as usize]);
        }
        i += 1;
    }
}

#[rustfmt::skip]
static HREF_SAFE: [u8; 256] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 1, 0, 1, 1, 1, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 0, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 1,
    0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// Escapes a URL for an href attribute: `%XX` for unsafe bytes, with the
/// ampersand and single quote HTML-entity escaped.
pub(crate) fn escape_href(ob: &mut Buffer, src: &[u8]) {
    const HEX_CHARS: &[u8] = b"0123456789ABCDEF";

    ob.grow(ob.len() + src.len() * 12 / 10);

    let mut i = 0;
    while i < src.len() {
        let org = i;
        while i < src.len() && HREF_SAFE[src[i] as usize] != 0 {
            i += 1;
        }
        if i > org {
            ob.put(&src[org..i]);
        }
        if i >= src.len() {
            break;
        }

        match src[i] {
            // amp appears all the time in URLs but needs HTML-entity
            // escaping inside an href
            b'&' => ob.put_str("&amp;"),
            // the single quote is a valid URL byte but needs entity
            // escaping too
            b'\'' => ob.put_str("&#x27;"),
            c => {
                let hex = [b'%', HEX_CHARS[(c >> 4) as usize], HEX_CHARS[(c & 0xF) as usize]];
                ob.put(&hex);
            }
        }
        i += 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn html(src: &[u8], secure: bool) -> Vec<u8> {
        let mut ob = Buffer::new(64);
        escape_html(&mut ob, src, secure);
        ob.as_slice().to_vec()
    }

    fn href(src: &[u8]) -> Vec<u8> {
        let mut ob = Buffer::new(64);
        escape_href(&mut ob, src);
        ob.as_slice().to_vec()
    }

    #[test]
    fn body_escapes() {
        assert_eq!(html(b"a < b & c > \"d\"", false), b"a &lt; b &amp; c &gt; &quot;d&quot;");
        assert_eq!(html(b"a/b", false), b"a/b");
        assert_eq!(html(b"a/b", true), b"a&#47;b");
        assert_eq!(html(b"it's", false), b"it&#39;s");
    }

    #[test]
    fn href_escapes() {
        assert_eq!(href(b"http://e.com/a b"), b"http://e.com/a%20b");
        assert_eq!(href(b"http://e.com/?a=1&b=2"), b"http://e.com/?a=1&amp;b=2");
        assert_eq!(href(b"http://e.com/'x'"), b"http://e.com/&#x27;x&#x27;");
        assert_eq!(href(b"caf\xc3\xa9"), b"caf%C3%A9");
    }
}
