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

//! Recognizers for bare URLs, `www.` prefixes and email addresses inside
//! running text.
//!
//! Each recognizer is handed the whole inline region plus the offset of its
//! trigger byte and answers with the span of the link: the number of bytes
//! it extends forward from the trigger, and the number of already-emitted
//! bytes to rewind. Where the C lineage indexes backward from a raw
//! pointer, these take the base slice and bound both directions explicitly.

use crate::scanners::is_ascii_space;

/// Whether a URL starts with a scheme considered safe to link to.
///
/// The scheme must be followed by at least one alphanumeric byte; matching
/// is case-insensitive.
pub fn is_safe_link(link: &[u8]) -> bool {
    const VALID_URIS: [&[u8]; 5] = [b"/", b"http://", b"https://", b"ftp://", b"mailto:"];

    VALID_URIS.iter().any(|scheme| {
        link.len() > scheme.len()
            && link[..scheme.len()].eq_ignore_ascii_case(scheme)
            && link[scheme.len()].is_ascii_alphanumeric()
    })
}

/// Peels trailing punctuation and unbalanced closers off a candidate span.
///
/// `data` starts at the trigger byte; the candidate occupies
/// `data[..link_end]`. Returns the trimmed end, 0 when nothing is left.
fn autolink_delim(data: &[u8], mut link_end: usize) -> usize {
    for (i, &b) in data[..link_end].iter().enumerate() {
        if b == b'<' {
            link_end = i;
            break;
        }
    }

    while link_end > 0 {
        let c = data[link_end - 1];
        if matches!(c, b'?' | b'!' | b'.' | b',') {
            link_end -= 1;
        } else if c == b';' {
            // an entity reference like &amp; is peeled whole
            if link_end >= 2 {
                let mut new_end = link_end - 2;
                while new_end > 0 && data[new_end].is_ascii_alphabetic() {
                    new_end -= 1;
                }
                if new_end < link_end - 2 && data[new_end] == b'&' {
                    link_end = new_end;
                } else {
                    link_end -= 1;
                }
            } else {
                link_end -= 1;
            }
        } else {
            break;
        }
    }

    if link_end == 0 {
        return 0;
    }

    let cclose = data[link_end - 1];
    let copen: u8 = match cclose {
        b'"' => b'"',
        b'\'' => b'\'',
        b')' => b'(',
        b']' => b'[',
        b'}' => b'{',
        _ => 0,
    };

    if copen != 0 {
        // Try to close the final punctuation sign in this same line; if we
        // managed to close it outside of the URL, that means it's not part
        // of the URL. If it closes inside the URL, it is part of the URL.
        //
        //  foo http://www.pokemon.com/Pikachu_(Electric) bar
        //      => http://www.pokemon.com/Pikachu_(Electric)
        //
        //  foo (http://www.pokemon.com/Pikachu_(Electric)) bar
        //      => http://www.pokemon.com/Pikachu_(Electric)
        //
        //  foo http://www.pokemon.com/Pikachu_(Electric)) bar
        //      => http://www.pokemon.com/Pikachu_(Electric))
        let mut opening = 0;
        let mut closing = 0;
        for &b in &data[..link_end] {
            if b == copen {
                opening += 1;
            } else if b == cclose {
                closing += 1;
            }
        }
        if closing != opening {
            link_end -= 1;
        }
    }

    link_end
}

fn check_domain(data: &[u8]) -> usize {
    if data.is_empty() || !data[0].is_ascii_alphanumeric() {
        return 0;
    }
    let mut np = 0;
    let mut i = 1;
    while i + 1 < data.len() {
        if data[i] == b'.' {
            np += 1;
        } else if !data[i].is_ascii_alphanumeric() && data[i] != b'-' {
            break;
        }
        i += 1;
    }
    // a valid domain needs at least one dot; that's as far as we get
    if np > 0 {
        i
    } else {
        0
    }
}

/// `www.`-prefixed autolink at `data[offset]`. Returns `(link_end, rewind)`.
pub(crate) fn www(data: &[u8], offset: usize) -> Option<(usize, usize)> {
    let sub = &data[offset..];

    if offset > 0 && !data[offset - 1].is_ascii_punctuation() && !is_ascii_space(data[offset - 1])
    {
        return None;
    }
    if sub.len() < 4 || &sub[..4] != b"www." {
        return None;
    }

    let mut link_end = check_domain(sub);
    if link_end == 0 {
        return None;
    }
    while link_end < sub.len() && !is_ascii_space(sub[link_end]) {
        link_end += 1;
    }

    let link_end = autolink_delim(sub, link_end);
    if link_end == 0 {
        return None;
    }
    Some((link_end, 0))
}

/// Email autolink around the `@` at `data[offset]`. Returns
/// `(link_end, rewind)`: the span runs from `offset - rewind` through
/// `offset + link_end`.
pub(crate) fn email(data: &[u8], offset: usize) -> Option<(usize, usize)> {
    let sub = &data[offset..];

    let mut rewind = 0;
    while rewind < offset {
        let c = data[offset - rewind - 1];
        if c.is_ascii_alphanumeric() || matches!(c, b'.' | b'+' | b'-' | b'_') {
            rewind += 1;
        } else {
            break;
        }
    }
    if rewind == 0 {
        return None;
    }

    let mut nb = 0;
    let mut np = 0;
    let mut link_end = 0;
    while link_end < sub.len() {
        let c = sub[link_end];
        if c.is_ascii_alphanumeric() {
        } else if c == b'@' {
            nb += 1;
        } else if c == b'.' && link_end < sub.len() - 1 {
            np += 1;
        } else if c != b'-' && c != b'_' {
            break;
        }
        link_end += 1;
    }

    if link_end < 2 || nb != 1 || np == 0 || !sub[link_end - 1].is_ascii_alphabetic() {
        return None;
    }

    let link_end = autolink_delim(sub, link_end);
    if link_end == 0 {
        return None;
    }
    Some((link_end, rewind))
}

/// Scheme autolink around the `:` at `data[offset]`. Returns
/// `(link_end, rewind)` like [`email`].
pub(crate) fn url(data: &[u8], offset: usize) -> Option<(usize, usize)> {
    let sub = &data[offset..];

    if sub.len() < 4 || sub[1] != b'/' || sub[2] != b'/' {
        return None;
    }

    let mut rewind = 0;
    while rewind < offset && data[offset - rewind - 1].is_ascii_alphabetic() {
        rewind += 1;
    }

    if !is_safe_link(&data[offset - rewind..]) {
        return None;
    }

    let mut link_end = 3; // "://"
    let domain_len = check_domain(&sub[link_end..]);
    if domain_len == 0 {
        return None;
    }
    link_end += domain_len;
    while link_end < sub.len() && !is_ascii_space(sub[link_end]) {
        link_end += 1;
    }

    let link_end = autolink_delim(sub, link_end);
    if link_end == 0 {
        return None;
    }
    Some((link_end, rewind))
}

#[cfg(test)]
mod test {
    use super::*;

    fn url_span(text: &[u8]) -> Option<&[u8]> {
        let offset = text.iter().position(|&b| b == b':')?;
        url(text, offset).map(|(end, rewind)| &text[offset - rewind..offset + end])
    }

    #[test]
    fn safe_schemes() {
        assert!(is_safe_link(b"http://example.com"));
        assert!(is_safe_link(b"HTTPS://example.com"));
        assert!(is_safe_link(b"/relative"));
        assert!(is_safe_link(b"mailto:a@b.com"));
        assert!(!is_safe_link(b"javascript:alert(1)"));
        assert!(!is_safe_link(b"http://"));
    }

    #[test]
    fn balanced_parens_stay_in_the_link() {
        assert_eq!(
            url_span(b"http://www.pokemon.com/Pikachu_(Electric) bar"),
            Some(&b"http://www.pokemon.com/Pikachu_(Electric)"[..])
        );
        // an unbalanced closer is peeled
        assert_eq!(
            url_span(b"(foo http://www.pokemon.com/Pikachu_(Electric)) bar"),
            Some(&b"http://www.pokemon.com/Pikachu_(Electric)"[..])
        );
    }

    #[test]
    fn trailing_punctuation_is_peeled() {
        assert_eq!(
            url_span(b"http://example.com/a."),
            Some(&b"http://example.com/a"[..])
        );
        assert_eq!(
            url_span(b"http://example.com/a?!"),
            Some(&b"http://example.com/a"[..])
        );
    }

    #[test]
    fn email_needs_local_part_and_dot() {
        let text = b"mail me@example.com now";
        let at = 7;
        assert_eq!(email(text, at), Some((12, 2)));
        assert_eq!(email(b"@example.com", 0), None);
        assert_eq!(email(b"me@examplecom x", 2), None);
    }

    #[test]
    fn www_requires_domain() {
        let text = b"see www.example.com here";
        assert_eq!(www(text, 4), Some((15, 0)));
        assert_eq!(www(b"xwww.example.com", 1), None);
        assert_eq!(www(b"www.", 0), None);
    }
}
