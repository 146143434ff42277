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

//! The parsing engine: a recursive block recognizer interleaved with a
//! table-driven inline recognizer, emitting renderer callbacks as it goes.
//!
//! A [`Markdown`] context owns the callback table, the reference table and
//! two scratch-buffer pools. Block recognizers run line-oriented over the
//! staged text and recurse into themselves for container blocks; leaf text
//! is handed to the inline recognizer, which dispatches on a 256-entry
//! active-character table populated once at construction.

use memchr::memchr;

use crate::autolink;
use crate::buffer::{Buffer, BufferPool};
use crate::firstpass::run_first_pass;
use crate::linklabel::RefTable;
use crate::scanners::*;
use crate::{AutolinkType, Extensions, ListFlags, TableFlags};

const BLOCK_BUF_UNIT: usize = 256;
const SPAN_BUF_UNIT: usize = 64;

/// Renderer callback table.
///
/// Block callbacks return nothing; a `None` skips the block entirely. Span
/// callbacks return `true` when they handled the span; `false` (or a `None`
/// entry) falls back to verbatim emission. The low-level pair copies input
/// straight through when absent. All text arguments borrow either the
/// staged input or a scratch buffer; an empty slice stands for "no text".
pub struct Callbacks<R> {
    pub blockcode: Option<fn(ob: &mut Buffer, text: &[u8], lang: &[u8], rndr: &mut R)>,
    pub blockquote: Option<fn(ob: &mut Buffer, text: &[u8], rndr: &mut R)>,
    pub blockhtml: Option<fn(ob: &mut Buffer, text: &[u8], rndr: &mut R)>,
    pub header: Option<fn(ob: &mut Buffer, text: &[u8], level: i32, rndr: &mut R)>,
    pub hrule: Option<fn(ob: &mut Buffer, rndr: &mut R)>,
    pub list: Option<fn(ob: &mut Buffer, text: &[u8], flags: ListFlags, rndr: &mut R)>,
    pub listitem: Option<fn(ob: &mut Buffer, text: &[u8], flags: ListFlags, rndr: &mut R)>,
    pub paragraph: Option<fn(ob: &mut Buffer, text: &[u8], rndr: &mut R)>,
    pub table: Option<fn(ob: &mut Buffer, header: &[u8], body: &[u8], rndr: &mut R)>,
    pub table_row: Option<fn(ob: &mut Buffer, text: &[u8], rndr: &mut R)>,
    pub table_cell: Option<fn(ob: &mut Buffer, text: &[u8], flags: TableFlags, rndr: &mut R)>,

    pub autolink:
        Option<fn(ob: &mut Buffer, link: &[u8], link_type: AutolinkType, rndr: &mut R) -> bool>,
    pub codespan: Option<fn(ob: &mut Buffer, text: &[u8], rndr: &mut R) -> bool>,
    pub double_emphasis: Option<fn(ob: &mut Buffer, text: &[u8], rndr: &mut R) -> bool>,
    pub emphasis: Option<fn(ob: &mut Buffer, text: &[u8], rndr: &mut R) -> bool>,
    pub image:
        Option<fn(ob: &mut Buffer, link: &[u8], title: &[u8], alt: &[u8], rndr: &mut R) -> bool>,
    pub linebreak: Option<fn(ob: &mut Buffer, rndr: &mut R) -> bool>,
    pub link: Option<
        fn(ob: &mut Buffer, link: &[u8], title: &[u8], content: &[u8], rndr: &mut R) -> bool,
    >,
    pub raw_html_tag: Option<fn(ob: &mut Buffer, tag: &[u8], rndr: &mut R) -> bool>,
    pub triple_emphasis: Option<fn(ob: &mut Buffer, text: &[u8], rndr: &mut R) -> bool>,
    pub strikethrough: Option<fn(ob: &mut Buffer, text: &[u8], rndr: &mut R) -> bool>,
    pub superscript: Option<fn(ob: &mut Buffer, text: &[u8], rndr: &mut R) -> bool>,

    pub entity: Option<fn(ob: &mut Buffer, entity: &[u8], rndr: &mut R)>,
    pub normal_text: Option<fn(ob: &mut Buffer, text: &[u8], rndr: &mut R)>,

    pub doc_header: Option<fn(ob: &mut Buffer, rndr: &mut R)>,
    pub doc_footer: Option<fn(ob: &mut Buffer, rndr: &mut R)>,
}

impl<R> Default for Callbacks<R> {
    fn default() -> Callbacks<R> {
        Callbacks {
            blockcode: None,
            blockquote: None,
            blockhtml: None,
            header: None,
            hrule: None,
            list: None,
            listitem: None,
            paragraph: None,
            table: None,
            table_row: None,
            table_cell: None,
            autolink: None,
            codespan: None,
            double_emphasis: None,
            emphasis: None,
            image: None,
            linebreak: None,
            link: None,
            raw_html_tag: None,
            triple_emphasis: None,
            strikethrough: None,
            superscript: None,
            entity: None,
            normal_text: None,
            doc_header: None,
            doc_footer: None,
        }
    }
}

impl<R> Clone for Callbacks<R> {
    fn clone(&self) -> Callbacks<R> {
        *self
    }
}

impl<R> Copy for Callbacks<R> {}

/// What an active byte triggers in the inline recognizer.
#[derive(Clone, Copy, PartialEq, Eq)]
enum CharAction {
    None,
    Emphasis,
    Codespan,
    Linebreak,
    Link,
    Langle,
    Escape,
    Entity,
    AutolinkUrl,
    AutolinkEmail,
    AutolinkWww,
    Superscript,
}

/// A parser context, reusable across documents but never concurrently.
pub struct Markdown<R> {
    cb: Callbacks<R>,
    renderer: R,
    refs: RefTable,
    active_char: [CharAction; 256],
    block_bufs: BufferPool,
    span_bufs: BufferPool,
    ext: Extensions,
    max_nesting: usize,
    in_link_body: bool,
}

impl<R> Markdown<R> {
    /// Builds a context from the extension set, the nesting bound, the
    /// callback table and the renderer state the callbacks receive.
    ///
    /// # Panics
    ///
    /// Panics when `max_nesting` is zero.
    pub fn new(
        extensions: Extensions,
        max_nesting: usize,
        callbacks: Callbacks<R>,
        renderer: R,
    ) -> Markdown<R> {
        assert!(max_nesting > 0, "max_nesting must be nonzero");

        let mut active_char = [CharAction::None; 256];

        if callbacks.emphasis.is_some()
            || callbacks.double_emphasis.is_some()
            || callbacks.triple_emphasis.is_some()
        {
            active_char[b'*' as usize] = CharAction::Emphasis;
            active_char[b'_' as usize] = CharAction::Emphasis;
            if extensions.contains(Extensions::STRIKETHROUGH) {
                active_char[b'~' as usize] = CharAction::Emphasis;
            }
        }

        if callbacks.codespan.is_some() {
            active_char[b'`' as usize] = CharAction::Codespan;
        }

        if callbacks.linebreak.is_some() {
            active_char[b'\n' as usize] = CharAction::Linebreak;
        }

        if callbacks.image.is_some() || callbacks.link.is_some() {
            active_char[b'[' as usize] = CharAction::Link;
        }

        active_char[b'<' as usize] = CharAction::Langle;
        active_char[b'\\' as usize] = CharAction::Escape;
        active_char[b'&' as usize] = CharAction::Entity;

        if extensions.contains(Extensions::AUTOLINK) {
            active_char[b':' as usize] = CharAction::AutolinkUrl;
            active_char[b'@' as usize] = CharAction::AutolinkEmail;
            active_char[b'w' as usize] = CharAction::AutolinkWww;
        }

        if extensions.contains(Extensions::SUPERSCRIPT) {
            active_char[b'^' as usize] = CharAction::Superscript;
        }

        Markdown {
            cb: callbacks,
            renderer,
            refs: RefTable::default(),
            active_char,
            block_bufs: BufferPool::new(BLOCK_BUF_UNIT),
            span_bufs: BufferPool::new(SPAN_BUF_UNIT),
            ext: extensions,
            max_nesting,
            in_link_body: false,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Renders `document` into `ob`.
    ///
    /// Phase 1 collects reference definitions and stages the text; phase 2
    /// runs the block recognizer over the remainder, bracketed by the
    /// header and footer callbacks.
    pub fn render(&mut self, ob: &mut Buffer, document: &[u8]) {
        self.refs.clear();
        let mut text = run_first_pass(document, &mut self.refs);

        // pre-grow the output buffer to minimize allocations
        ob.grow(text.len() + text.len() / 2);

        if let Some(f) = self.cb.doc_header {
            f(ob, &mut self.renderer);
        }

        if !text.is_empty() {
            // a final newline if not already present
            if text[text.len() - 1] != b'\n' && text[text.len() - 1] != b'\r' {
                text.put_byte(b'\n');
            }
            self.parse_block(ob, &text);
        }

        if let Some(f) = self.cb.doc_footer {
            f(ob, &mut self.renderer);
        }

        debug_assert_eq!(self.span_bufs.active(), 0);
        debug_assert_eq!(self.block_bufs.active(), 0);
    }

    fn nesting_exceeded(&self) -> bool {
        self.span_bufs.active() + self.block_bufs.active() > self.max_nesting
    }

    /****************************
     * INLINE PARSING FUNCTIONS *
     ****************************/

    /// Parses inline markdown elements inside `data`, writing to `ob`.
    fn parse_inline(&mut self, ob: &mut Buffer, data: &[u8]) {
        if self.nesting_exceeded() {
            return;
        }

        let size = data.len();
        let mut i = 0;
        let mut end = 0;

        while i < size {
            // copying inactive bytes into the output
            let mut action = CharAction::None;
            while end < size {
                action = self.active_char[data[end] as usize];
                if action != CharAction::None {
                    break;
                }
                end += 1;
            }

            if let Some(f) = self.cb.normal_text {
                f(ob, &data[i..end], &mut self.renderer);
            } else {
                ob.put(&data[i..end]);
            }

            if end >= size {
                break;
            }
            i = end;

            let consumed = match action {
                CharAction::Emphasis => self.char_emphasis(ob, data, i),
                CharAction::Codespan => self.char_codespan(ob, data, i),
                CharAction::Linebreak => self.char_linebreak(ob, data, i),
                CharAction::Link => self.char_link(ob, data, i),
                CharAction::Langle => self.char_langle_tag(ob, data, i),
                CharAction::Escape => self.char_escape(ob, data, i),
                CharAction::Entity => self.char_entity(ob, data, i),
                CharAction::AutolinkUrl => self.char_autolink_url(ob, data, i),
                CharAction::AutolinkEmail => self.char_autolink_email(ob, data, i),
                CharAction::AutolinkWww => self.char_autolink_www(ob, data, i),
                CharAction::Superscript => self.char_superscript(ob, data, i),
                CharAction::None => 0,
            };

            if consumed == 0 {
                // no action from the recognizer; the byte rides along with
                // the next normal-text run
                end = i + 1;
            } else {
                i += consumed;
                end = i;
            }
        }
    }

    /// Single and double emphasis dispatch.
    fn char_emphasis(&mut self, ob: &mut Buffer, data: &[u8], offset: usize) -> usize {
        let sub = &data[offset..];
        let size = sub.len();
        let c = sub[0];

        if self.ext.contains(Extensions::NO_INTRA_EMPHASIS)
            && offset > 0
            && !is_md_space(data[offset - 1])
            && data[offset - 1] != b'>'
        {
            return 0;
        }

        if size > 2 && sub[1] != c {
            // whitespace cannot follow an opening emphasis;
            // strikethrough only takes two tildes
            if c == b'~' || is_md_space(sub[1]) {
                return 0;
            }
            let ret = self.parse_emph1(ob, &data[offset + 1..], c);
            return if ret == 0 { 0 } else { ret + 1 };
        }

        if size > 3 && sub[1] == c && sub[2] != c {
            if is_md_space(sub[2]) {
                return 0;
            }
            let ret = self.parse_emph2(ob, &data[offset + 2..], c);
            return if ret == 0 { 0 } else { ret + 2 };
        }

        if size > 4 && sub[1] == c && sub[2] == c && sub[3] != c {
            if c == b'~' || is_md_space(sub[3]) {
                return 0;
            }
            let ret = self.parse_emph3(ob, data, offset + 3, c);
            return if ret == 0 { 0 } else { ret + 3 };
        }

        0
    }

    /// Single emphasis: closed by a delimiter not preceded by whitespace
    /// and not followed by the same delimiter.
    fn parse_emph1(&mut self, ob: &mut Buffer, data: &[u8], c: u8) -> usize {
        if self.cb.emphasis.is_none() {
            return 0;
        }

        let size = data.len();
        let mut i = 0;

        // skipping one symbol when coming from emph3
        if size > 1 && data[0] == c && data[1] == c {
            i = 1;
        }

        while i < size {
            let len = find_emph_char(&data[i..], c);
            if len == 0 {
                return 0;
            }
            i += len;
            if i >= size {
                return 0;
            }

            if data[i] == c && !is_md_space(data[i - 1]) {
                if self.ext.contains(Extensions::NO_INTRA_EMPHASIS)
                    && i + 1 < size
                    && data[i + 1].is_ascii_alphanumeric()
                {
                    continue;
                }

                let mut work = self.span_bufs.acquire();
                self.parse_inline(&mut work, &data[..i]);
                let f = self.cb.emphasis.unwrap();
                let r = f(ob, &work, &mut self.renderer);
                self.span_bufs.release(work);
                return if r { i + 1 } else { 0 };
            }
        }

        0
    }

    /// Double emphasis, or strikethrough for `~~`.
    fn parse_emph2(&mut self, ob: &mut Buffer, data: &[u8], c: u8) -> usize {
        let render_method = if c == b'~' {
            self.cb.strikethrough
        } else {
            self.cb.double_emphasis
        };
        let Some(render_method) = render_method else {
            return 0;
        };

        let size = data.len();
        let mut i = 0;

        while i < size {
            let len = find_emph_char(&data[i..], c);
            if len == 0 {
                return 0;
            }
            i += len;

            if i + 1 < size && data[i] == c && data[i + 1] == c && i > 0 && !is_md_space(data[i - 1])
            {
                let mut work = self.span_bufs.acquire();
                self.parse_inline(&mut work, &data[..i]);
                let r = render_method(ob, &work, &mut self.renderer);
                self.span_bufs.release(work);
                return if r { i + 2 } else { 0 };
            }
            i += 1;
        }

        0
    }

    /// Triple emphasis: finds the closing run, then hands shorter closers
    /// back to the other emphasis parsers.
    fn parse_emph3(&mut self, ob: &mut Buffer, data: &[u8], start: usize, c: u8) -> usize {
        let sub = &data[start..];
        let size = sub.len();
        let mut i = 0;

        while i < size {
            let len = find_emph_char(&sub[i..], c);
            if len == 0 {
                return 0;
            }
            i += len;

            // skip whitespace-preceded delimiters
            if sub[i] != c || is_md_space(sub[i - 1]) {
                continue;
            }

            if i + 2 < size && sub[i + 1] == c && sub[i + 2] == c && self.cb.triple_emphasis.is_some()
            {
                let mut work = self.span_bufs.acquire();
                self.parse_inline(&mut work, &sub[..i]);
                let f = self.cb.triple_emphasis.unwrap();
                let r = f(ob, &work, &mut self.renderer);
                self.span_bufs.release(work);
                return if r { i + 3 } else { 0 };
            } else if i + 1 < size && sub[i + 1] == c {
                // double symbol found; the opening run loses two bytes
                let len = self.parse_emph1(ob, &data[start - 2..], c);
                return if len == 0 { 0 } else { len - 2 };
            } else {
                // single symbol found
                let len = self.parse_emph2(ob, &data[start - 1..], c);
                return if len == 0 { 0 } else { len - 1 };
            }
        }

        0
    }

    /// `\n` preceded by two spaces.
    fn char_linebreak(&mut self, ob: &mut Buffer, data: &[u8], offset: usize) -> usize {
        if offset < 2 || data[offset - 1] != b' ' || data[offset - 2] != b' ' {
            return 0;
        }

        // removing the trailing spaces from the output
        let mut len = ob.len();
        while len > 0 && ob[len - 1] == b' ' {
            len -= 1;
        }
        ob.truncate(len);

        if let Some(f) = self.cb.linebreak {
            if f(ob, &mut self.renderer) {
                return 1;
            }
        }
        0
    }

    /// `` ` `` code span: the opening backtick run is matched against the
    /// first later run of the same length.
    fn char_codespan(&mut self, ob: &mut Buffer, data: &[u8], offset: usize) -> usize {
        let sub = &data[offset..];
        let size = sub.len();

        let mut nb = 0;
        while nb < size && sub[nb] == b'`' {
            nb += 1;
        }

        // finding the next delimiter
        let mut i = 0;
        let mut end = nb;
        while end < size && i < nb {
            if sub[end] == b'`' {
                i += 1;
            } else {
                i = 0;
            }
            end += 1;
        }

        if i < nb && end >= size {
            return 0; // no matching delimiter
        }

        // trimming outside whitespace
        let mut f_begin = nb;
        while f_begin < end && sub[f_begin] == b' ' {
            f_begin += 1;
        }
        let mut f_end = end - nb;
        while f_end > nb && sub[f_end - 1] == b' ' {
            f_end -= 1;
        }

        let Some(f) = self.cb.codespan else {
            return 0;
        };
        let handled = if f_begin < f_end {
            f(ob, &sub[f_begin..f_end], &mut self.renderer)
        } else {
            f(ob, &[], &mut self.renderer)
        };

        if handled {
            end
        } else {
            0
        }
    }

    /// `\` backslash escape.
    fn char_escape(&mut self, ob: &mut Buffer, data: &[u8], offset: usize) -> usize {
        const ESCAPE_CHARS: &[u8] = b"\\`*_{}[]()#+-.!:|&<>^~";

        let sub = &data[offset..];
        if sub.len() > 1 {
            if !ESCAPE_CHARS.contains(&sub[1]) {
                return 0;
            }
            if let Some(f) = self.cb.normal_text {
                f(ob, &sub[1..2], &mut self.renderer);
            } else {
                ob.put_byte(sub[1]);
            }
        } else if sub.len() == 1 {
            ob.put_byte(sub[0]);
        }

        2
    }

    /// `&`, escaped when it does not introduce an entity. Valid entities
    /// are assumed to match `&#?[A-Za-z0-9]+;`.
    fn char_entity(&mut self, ob: &mut Buffer, data: &[u8], offset: usize) -> usize {
        let sub = &data[offset..];
        let size = sub.len();
        let mut end = 1;

        if end < size && sub[end] == b'#' {
            end += 1;
        }
        while end < size && sub[end].is_ascii_alphanumeric() {
            end += 1;
        }
        if end < size && sub[end] == b';' {
            end += 1; // a real entity
        } else {
            return 0; // a lone '&'
        }

        if let Some(f) = self.cb.entity {
            f(ob, &sub[..end], &mut self.renderer);
        } else {
            ob.put(&sub[..end]);
        }

        end
    }

    /// `<` introducing either an autolink or a raw HTML tag.
    fn char_langle_tag(&mut self, ob: &mut Buffer, data: &[u8], offset: usize) -> usize {
        let sub = &data[offset..];
        let (end, altype) = tag_length(sub);

        let mut handled = false;
        if end > 2 {
            if let (Some(f), Some(ty)) = (self.cb.autolink, altype) {
                let mut u_link = self.span_bufs.acquire();
                unscape_text(&mut u_link, &sub[1..end - 1]);
                handled = f(ob, &u_link, ty, &mut self.renderer);
                self.span_bufs.release(u_link);
            } else if let Some(f) = self.cb.raw_html_tag {
                handled = f(ob, &sub[..end], &mut self.renderer);
            }
        }

        if handled {
            end
        } else {
            0
        }
    }

    fn char_autolink_www(&mut self, ob: &mut Buffer, data: &[u8], offset: usize) -> usize {
        if self.cb.link.is_none() || self.in_link_body {
            return 0;
        }

        let Some((link_end, _)) = autolink::www(data, offset) else {
            return 0;
        };

        let mut link = self.span_bufs.acquire();
        link.put(&data[offset..offset + link_end]);

        let mut link_url = self.span_bufs.acquire();
        link_url.put_str("http://");
        link_url.put(&link);

        let f = self.cb.link.unwrap();
        if let Some(nt) = self.cb.normal_text {
            let mut link_text = self.span_bufs.acquire();
            nt(&mut link_text, &link, &mut self.renderer);
            f(ob, &link_url, &[], &link_text, &mut self.renderer);
            self.span_bufs.release(link_text);
        } else {
            f(ob, &link_url, &[], &link, &mut self.renderer);
        }

        self.span_bufs.release(link_url);
        self.span_bufs.release(link);
        link_end
    }

    fn char_autolink_email(&mut self, ob: &mut Buffer, data: &[u8], offset: usize) -> usize {
        if self.cb.autolink.is_none() || self.in_link_body {
            return 0;
        }

        let Some((link_end, rewind)) = autolink::email(data, offset) else {
            return 0;
        };

        let mut link = self.span_bufs.acquire();
        link.put(&data[offset - rewind..offset + link_end]);

        // the local part has already been emitted as normal text
        ob.truncate(ob.len().saturating_sub(rewind));
        let f = self.cb.autolink.unwrap();
        f(ob, &link, AutolinkType::Email, &mut self.renderer);

        self.span_bufs.release(link);
        link_end
    }

    fn char_autolink_url(&mut self, ob: &mut Buffer, data: &[u8], offset: usize) -> usize {
        if self.cb.autolink.is_none() || self.in_link_body {
            return 0;
        }

        let Some((link_end, rewind)) = autolink::url(data, offset) else {
            return 0;
        };

        let mut link = self.span_bufs.acquire();
        link.put(&data[offset - rewind..offset + link_end]);

        ob.truncate(ob.len().saturating_sub(rewind));
        let f = self.cb.autolink.unwrap();
        f(ob, &link, AutolinkType::Normal, &mut self.renderer);

        self.span_bufs.release(link);
        link_end
    }

    /// `[`: a link, or an image when preceded by `!`.
    fn char_link(&mut self, ob: &mut Buffer, data: &[u8], offset: usize) -> usize {
        let is_img = offset > 0 && data[offset - 1] == b'!';
        let sub = &data[offset..];
        let size = sub.len();

        // checking whether the correct renderer exists
        if (is_img && self.cb.image.is_none()) || (!is_img && self.cb.link.is_none()) {
            return 0;
        }

        // looking for the matching closing bracket
        let mut level: i32 = 1;
        let mut i = 1;
        let mut text_has_nl = false;
        while i < size {
            if sub[i] == b'\n' {
                text_has_nl = true;
            } else if sub[i - 1] == b'\\' {
                // escaped
            } else if sub[i] == b'[' {
                level += 1;
            } else if sub[i] == b']' {
                level -= 1;
                if level <= 0 {
                    break;
                }
            }
            i += 1;
        }
        if i >= size {
            return 0;
        }
        let txt_e = i;
        i += 1;

        // skip any amount of whitespace or newline
        while i < size && is_md_space(sub[i]) {
            i += 1;
        }

        let mut link: Option<Buffer> = None;
        let mut title: Option<Buffer> = None;
        let mut handled = false;
        let mut consumed = 0;

        'done: {
            if i < size && sub[i] == b'(' {
                // inline style link
                i += 1;
                while i < size && is_md_space(sub[i]) {
                    i += 1;
                }
                let mut link_b = i;

                // looking for the link end: ' " )
                while i < size {
                    if sub[i] == b'\\' {
                        i += 2;
                    } else if sub[i] == b')' {
                        break;
                    } else if i >= 1 && is_md_space(sub[i - 1]) && (sub[i] == b'\'' || sub[i] == b'"')
                    {
                        break;
                    } else {
                        i += 1;
                    }
                }
                if i >= size {
                    break 'done;
                }
                let mut link_e = i;
                let mut title_b = 0;
                let mut title_e = 0;

                // looking for the title end if present
                if sub[i] == b'\'' || sub[i] == b'"' {
                    let qtype = sub[i];
                    let mut in_title = true;
                    i += 1;
                    title_b = i;

                    while i < size {
                        if sub[i] == b'\\' {
                            i += 2;
                        } else if sub[i] == qtype {
                            in_title = false;
                            i += 1;
                        } else if sub[i] == b')' && !in_title {
                            break;
                        } else {
                            i += 1;
                        }
                    }
                    if i >= size {
                        break 'done;
                    }

                    // skipping whitespace after the title
                    title_e = i - 1;
                    while title_e > title_b && is_md_space(sub[title_e]) {
                        title_e -= 1;
                    }

                    // checking for closing quote presence
                    if sub[title_e] != b'\'' && sub[title_e] != b'"' {
                        title_b = 0;
                        title_e = 0;
                        link_e = i;
                    }
                }

                // remove whitespace at the end of the link
                while link_e > link_b && is_md_space(sub[link_e - 1]) {
                    link_e -= 1;
                }

                // remove optional angle brackets around the link
                if sub[link_b] == b'<' {
                    link_b += 1;
                }
                if sub[link_e - 1] == b'>' {
                    link_e -= 1;
                }

                if link_e > link_b {
                    let mut l = self.span_bufs.acquire();
                    l.put(&sub[link_b..link_e]);
                    link = Some(l);
                }
                if title_e > title_b {
                    let mut t = self.span_bufs.acquire();
                    t.put(&sub[title_b..title_e]);
                    title = Some(t);
                }

                i += 1;
            } else if i < size && sub[i] == b'[' {
                // reference style link
                i += 1;
                let link_b = i;
                while i < size && sub[i] != b']' {
                    i += 1;
                }
                if i >= size {
                    break 'done;
                }
                let link_e = i;

                let mut id_buf: Option<Buffer> = None;
                let id_slice: &[u8] = if link_b == link_e {
                    // empty label: the bracketed text doubles as the label
                    if text_has_nl {
                        let mut b = self.span_bufs.acquire();
                        collapse_label(&mut b, sub, txt_e);
                        id_buf = Some(b);
                        id_buf.as_deref().unwrap()
                    } else {
                        &sub[1..txt_e]
                    }
                } else {
                    &sub[link_b..link_e]
                };

                let mut lbuf = self.span_bufs.acquire();
                let mut tbuf = self.span_bufs.acquire();
                let mut has_title = false;
                let found = match self.refs.find(id_slice) {
                    Some(lr) => {
                        lbuf.put(&lr.link);
                        if let Some(t) = &lr.title {
                            tbuf.put(t);
                            has_title = true;
                        }
                        true
                    }
                    None => false,
                };
                if let Some(b) = id_buf.take() {
                    self.span_bufs.release(b);
                }
                if !found {
                    self.span_bufs.release(tbuf);
                    self.span_bufs.release(lbuf);
                    break 'done;
                }
                link = Some(lbuf);
                if has_title {
                    title = Some(tbuf);
                } else {
                    self.span_bufs.release(tbuf);
                }

                i += 1;
            } else {
                // shortcut reference style link
                let mut id_buf: Option<Buffer> = None;
                let id_slice: &[u8] = if text_has_nl {
                    let mut b = self.span_bufs.acquire();
                    collapse_label(&mut b, sub, txt_e);
                    id_buf = Some(b);
                    id_buf.as_deref().unwrap()
                } else {
                    &sub[1..txt_e]
                };

                let mut lbuf = self.span_bufs.acquire();
                let mut tbuf = self.span_bufs.acquire();
                let mut has_title = false;
                let found = match self.refs.find(id_slice) {
                    Some(lr) => {
                        lbuf.put(&lr.link);
                        if let Some(t) = &lr.title {
                            tbuf.put(t);
                            has_title = true;
                        }
                        true
                    }
                    None => false,
                };
                if let Some(b) = id_buf.take() {
                    self.span_bufs.release(b);
                }
                if !found {
                    self.span_bufs.release(tbuf);
                    self.span_bufs.release(lbuf);
                    break 'done;
                }
                link = Some(lbuf);
                if has_title {
                    title = Some(tbuf);
                } else {
                    self.span_bufs.release(tbuf);
                }

                // rewinding the whitespace
                i = txt_e + 1;
            }

            // building content: image alt is kept raw, link content is parsed
            let mut content: Option<Buffer> = None;
            if txt_e > 1 {
                let mut c = self.span_bufs.acquire();
                if is_img {
                    c.put(&sub[1..txt_e]);
                } else {
                    // no autolinks inside a link's own content
                    self.in_link_body = true;
                    self.parse_inline(&mut c, &sub[1..txt_e]);
                    self.in_link_body = false;
                }
                content = Some(c);
            }

            let mut u_link: Option<Buffer> = None;
            if let Some(l) = &link {
                let mut u = self.span_bufs.acquire();
                unscape_text(&mut u, l);
                u_link = Some(u);
            }

            let empty: &[u8] = &[];
            let u = u_link.as_deref().unwrap_or(empty);
            let t = title.as_deref().unwrap_or(empty);
            let c = content.as_deref().unwrap_or(empty);

            if is_img {
                if !ob.is_empty() && ob[ob.len() - 1] == b'!' {
                    let len = ob.len() - 1;
                    ob.truncate(len);
                }
                let f = self.cb.image.unwrap();
                handled = f(ob, u, t, c, &mut self.renderer);
            } else {
                let f = self.cb.link.unwrap();
                handled = f(ob, u, t, c, &mut self.renderer);
            }
            consumed = i;

            if let Some(b) = u_link {
                self.span_bufs.release(b);
            }
            if let Some(b) = content {
                self.span_bufs.release(b);
            }
        }

        if let Some(b) = title {
            self.span_bufs.release(b);
        }
        if let Some(b) = link {
            self.span_bufs.release(b);
        }

        if handled {
            consumed
        } else {
            0
        }
    }

    /// `^word` or `^(span)`.
    fn char_superscript(&mut self, ob: &mut Buffer, data: &[u8], offset: usize) -> usize {
        let Some(f) = self.cb.superscript else {
            return 0;
        };

        let sub = &data[offset..];
        let size = sub.len();
        if size < 2 {
            return 0;
        }

        let sup_start;
        let mut sup_len;
        if sub[1] == b'(' {
            sup_start = 2;
            sup_len = 2;
            while sup_len < size && sub[sup_len] != b')' && sub[sup_len - 1] != b'\\' {
                sup_len += 1;
            }
            if sup_len == size {
                return 0;
            }
        } else {
            sup_start = 1;
            sup_len = 1;
            while sup_len < size && !is_md_space(sub[sup_len]) {
                sup_len += 1;
            }
        }

        if sup_len == sup_start {
            return if sup_start == 2 { 3 } else { 0 };
        }

        let mut sup = self.span_bufs.acquire();
        self.parse_inline(&mut sup, &sub[sup_start..sup_len]);
        f(ob, &sup, &mut self.renderer);
        self.span_bufs.release(sup);

        if sup_start == 2 {
            sup_len + 1
        } else {
            sup_len
        }
    }

    /*********************************
     * BLOCK-LEVEL PARSING FUNCTIONS *
     *********************************/

    /// Parses one run of blocks, dispatching in the fixed recognizer order.
    fn parse_block(&mut self, ob: &mut Buffer, data: &[u8]) {
        if self.nesting_exceeded() {
            return;
        }

        let size = data.len();
        let space_headers = self.ext.contains(Extensions::SPACE_HEADERS);
        let mut beg = 0;

        while beg < size {
            let txt = &data[beg..];

            if is_atxheader(txt, space_headers) {
                beg += self.parse_atxheader(ob, txt);
                continue;
            }

            if txt[0] == b'<' && self.cb.blockhtml.is_some() {
                let i = self.parse_htmlblock(ob, txt, true);
                if i != 0 {
                    beg += i;
                    continue;
                }
            }

            let i = is_empty(txt);
            if i != 0 {
                beg += i;
                continue;
            }

            if is_hrule(txt) {
                if let Some(f) = self.cb.hrule {
                    f(ob, &mut self.renderer);
                }
                while beg < size && data[beg] != b'\n' {
                    beg += 1;
                }
                beg += 1;
                continue;
            }

            if self.ext.contains(Extensions::FENCED_CODE) {
                let i = self.parse_fencedcode(ob, txt);
                if i != 0 {
                    beg += i;
                    continue;
                }
            }

            if self.ext.contains(Extensions::TABLES) {
                let i = self.parse_table(ob, txt);
                if i != 0 {
                    beg += i;
                    continue;
                }
            }

            if prefix_quote(txt) != 0 {
                beg += self.parse_blockquote(ob, txt);
                continue;
            }

            if prefix_code(txt) != 0 {
                beg += self.parse_blockcode(ob, txt);
                continue;
            }

            if prefix_uli(txt) != 0 {
                beg += self.parse_list(ob, txt, ListFlags::empty());
                continue;
            }

            if prefix_oli(txt) != 0 {
                beg += self.parse_list(ob, txt, ListFlags::ORDERED);
                continue;
            }

            beg += self.parse_paragraph(ob, txt);
        }
    }

    fn parse_atxheader(&mut self, ob: &mut Buffer, data: &[u8]) -> usize {
        let size = data.len();

        let mut level = 0;
        while level < size && level < 6 && data[level] == b'#' {
            level += 1;
        }

        let mut i = level;
        while i < size && data[i] == b' ' {
            i += 1;
        }

        let mut end = i + memchr(b'\n', &data[i..]).unwrap_or(size - i);
        let skip = end;

        while end > 0 && data[end - 1] == b'#' {
            end -= 1;
        }
        while end > 0 && data[end - 1] == b' ' {
            end -= 1;
        }

        if end > i {
            let mut work = self.span_bufs.acquire();
            self.parse_inline(&mut work, &data[i..end]);
            if let Some(f) = self.cb.header {
                f(ob, &work, level as i32, &mut self.renderer);
            }
            self.span_bufs.release(work);
        }

        skip
    }

    /// Parsing of an HTML block: an opening block tag, its matching
    /// unindented closer and a blank line. `do_render` is cleared when the
    /// paragraph recognizer merely probes for an interrupting block.
    fn parse_htmlblock(&mut self, ob: &mut Buffer, data: &[u8], do_render: bool) -> usize {
        let size = data.len();

        // identification of the opening tag
        if size < 2 || data[0] != b'<' {
            return 0;
        }
        let mut i = 1;
        while i < size && data[i] != b'>' && data[i] != b' ' {
            i += 1;
        }
        let curtag = if i < size {
            find_block_tag(&data[1..i])
        } else {
            None
        };

        let Some(curtag) = curtag else {
            // HTML comment, laxist form
            if size > 5 && data[1] == b'!' && data[2] == b'-' && data[3] == b'-' {
                let mut i = 5;
                while i < size && !(data[i - 2] == b'-' && data[i - 1] == b'-' && data[i] == b'>') {
                    i += 1;
                }
                i += 1;
                if i < size {
                    let j = is_empty(&data[i..]);
                    if j != 0 {
                        let work_size = i + j;
                        if do_render {
                            if let Some(f) = self.cb.blockhtml {
                                f(ob, &data[..work_size.min(size)], &mut self.renderer);
                            }
                        }
                        return work_size;
                    }
                }
            }

            // HR, the only self-closing block tag considered
            if size > 4 && (data[1] == b'h' || data[1] == b'H') && (data[2] == b'r' || data[2] == b'R')
            {
                let mut i = 3;
                while i < size && data[i] != b'>' {
                    i += 1;
                }
                if i + 1 < size {
                    i += 1;
                    let j = is_empty(&data[i..]);
                    if j != 0 {
                        let work_size = i + j;
                        if do_render {
                            if let Some(f) = self.cb.blockhtml {
                                f(ob, &data[..work_size.min(size)], &mut self.renderer);
                            }
                        }
                        return work_size;
                    }
                }
            }

            return 0;
        };

        // looking for an unindented matching closing tag followed by a
        // blank line
        let mut tag_end = htmlblock_end(curtag, data, true);

        // a second pass allows indented matches, but not for ins/del
        if tag_end == 0 && curtag != "ins" && curtag != "del" {
            tag_end = htmlblock_end(curtag, data, false);
        }

        if tag_end == 0 {
            return 0;
        }

        if do_render {
            if let Some(f) = self.cb.blockhtml {
                f(ob, &data[..tag_end.min(size)], &mut self.renderer);
            }
        }
        tag_end
    }

    fn parse_blockquote(&mut self, ob: &mut Buffer, data: &[u8]) -> usize {
        let size = data.len();

        let mut out = self.block_bufs.acquire();
        let mut work = self.block_bufs.acquire();

        let mut beg = 0;
        let mut end = 0;
        while beg < size {
            end = line_end(data, beg + 1);

            let pre = prefix_quote(&data[beg..end]);
            if pre != 0 {
                beg += pre; // skipping the prefix
            } else if is_empty(&data[beg..end]) != 0
                && (end >= size
                    || (prefix_quote(&data[end..]) == 0 && is_empty(&data[end..]) == 0))
            {
                // empty line followed by a non-quote line
                break;
            }

            if beg < end {
                work.put(&data[beg..end]);
            }
            beg = end;
        }

        self.parse_block(&mut out, &work);
        if let Some(f) = self.cb.blockquote {
            f(ob, &out, &mut self.renderer);
        }
        self.block_bufs.release(work);
        self.block_bufs.release(out);
        end
    }

    /// A paragraph; also the place setext headers are discovered, since the
    /// underline only reveals itself after the text has been consumed.
    fn parse_paragraph(&mut self, ob: &mut Buffer, data: &[u8]) -> usize {
        let size = data.len();
        let space_headers = self.ext.contains(Extensions::SPACE_HEADERS);

        let mut i = 0;
        let mut end = 0;
        let mut level = 0;

        while i < size {
            end = line_end(data, i + 1);

            if is_empty(&data[i..]) != 0 {
                break;
            }

            level = is_headerline(&data[i..]);
            if level != 0 {
                break;
            }

            if is_atxheader(&data[i..], space_headers)
                || is_hrule(&data[i..])
                || prefix_quote(&data[i..]) != 0
            {
                end = i;
                break;
            }

            // Early termination with Markdown 1.0.0 logic: if the first
            // byte of a new line is not a letter, check whether some other
            // block starts here.
            if self.ext.contains(Extensions::LAX_SPACING) && !data[i].is_ascii_alphanumeric() {
                if prefix_oli(&data[i..]) != 0 || prefix_uli(&data[i..]) != 0 {
                    end = i;
                    break;
                }

                if data[i] == b'<'
                    && self.cb.blockhtml.is_some()
                    && self.parse_htmlblock(ob, &data[i..], false) != 0
                {
                    end = i;
                    break;
                }

                if self.ext.contains(Extensions::FENCED_CODE) && is_codefence(&data[i..]).is_some()
                {
                    end = i;
                    break;
                }
            }

            i = end;
        }

        let mut work_size = i;
        while work_size > 0 && data[work_size - 1] == b'\n' {
            work_size -= 1;
        }

        if level == 0 {
            let mut tmp = self.block_bufs.acquire();
            self.parse_inline(&mut tmp, &data[..work_size]);
            if let Some(f) = self.cb.paragraph {
                f(ob, &tmp, &mut self.renderer);
            }
            self.block_bufs.release(tmp);
        } else {
            // a setext header closes the paragraph; the text before the
            // last line becomes its own paragraph
            let mut header_start = 0;
            if work_size > 0 {
                let whole = work_size;
                work_size -= 1;

                while work_size > 0 && data[work_size] != b'\n' {
                    work_size -= 1;
                }
                let beg = work_size + 1;
                while work_size > 0 && data[work_size - 1] == b'\n' {
                    work_size -= 1;
                }

                if work_size > 0 {
                    let mut tmp = self.block_bufs.acquire();
                    self.parse_inline(&mut tmp, &data[..work_size]);
                    if let Some(f) = self.cb.paragraph {
                        f(ob, &tmp, &mut self.renderer);
                    }
                    self.block_bufs.release(tmp);

                    header_start = beg;
                    work_size = whole - beg;
                } else {
                    work_size = whole;
                }
            }

            let mut header_work = self.span_bufs.acquire();
            self.parse_inline(&mut header_work, &data[header_start..header_start + work_size]);
            if let Some(f) = self.cb.header {
                f(ob, &header_work, level, &mut self.renderer);
            }
            self.span_bufs.release(header_work);
        }

        end
    }

    fn parse_fencedcode(&mut self, ob: &mut Buffer, data: &[u8]) -> usize {
        let size = data.len();

        let Some((mut beg, fence_char, lang)) = is_codefence(data) else {
            return 0;
        };

        let mut work = self.block_bufs.acquire();

        while beg < size {
            if let Some((fence_end, trail_char, trail)) = is_codefence(&data[beg..]) {
                if trail_char == fence_char && trail.is_empty() {
                    beg += fence_end;
                    break;
                }
            }

            let end = line_end(data, beg + 1);

            if beg < end {
                // verbatim copy to the working buffer
                if is_empty(&data[beg..end]) != 0 {
                    work.put_byte(b'\n');
                } else {
                    work.put(&data[beg..end]);
                }
            }
            beg = end;
        }

        if !work.is_empty() && work[work.len() - 1] != b'\n' {
            work.put_byte(b'\n');
        }

        if let Some(f) = self.cb.blockcode {
            f(ob, &work, &data[lang], &mut self.renderer);
        }

        self.block_bufs.release(work);
        beg
    }

    fn parse_blockcode(&mut self, ob: &mut Buffer, data: &[u8]) -> usize {
        let size = data.len();

        let mut work = self.block_bufs.acquire();

        let mut beg = 0;
        while beg < size {
            let end = line_end(data, beg + 1);

            let pre = prefix_code(&data[beg..end]);
            if pre != 0 {
                beg += pre; // skipping the prefix
            } else if is_empty(&data[beg..end]) == 0 {
                // a non-empty unprefixed line breaks the block
                break;
            }

            if beg < end {
                if is_empty(&data[beg..end]) != 0 {
                    work.put_byte(b'\n');
                } else {
                    work.put(&data[beg..end]);
                }
            }
            beg = end;
        }

        let mut len = work.len();
        while len > 0 && work[len - 1] == b'\n' {
            len -= 1;
        }
        work.truncate(len);
        work.put_byte(b'\n');

        if let Some(f) = self.cb.blockcode {
            f(ob, &work, &[], &mut self.renderer);
        }

        self.block_bufs.release(work);
        beg
    }

    /// A single list item, the initial prefix already verified.
    fn parse_listitem(&mut self, ob: &mut Buffer, data: &[u8], flags: &mut ListFlags) -> usize {
        let size = data.len();

        // keeping track of the first indentation prefix
        let mut orgpre = 0;
        while orgpre < 3 && orgpre < size && data[orgpre] == b' ' {
            orgpre += 1;
        }

        let mut beg = prefix_uli(data);
        if beg == 0 {
            beg = prefix_oli(data);
        }
        if beg == 0 {
            return 0;
        }

        // skipping to the beginning of the following line
        let mut end = line_end(data, beg);

        let mut work = self.span_bufs.acquire();
        let mut inter = self.span_bufs.acquire();

        // the first line goes into the working buffer unprefixed
        work.put(&data[beg..end]);
        beg = end;

        let mut in_empty = false;
        let mut has_inside_empty = false;
        let mut in_fence = false;
        let mut sublist = 0;

        // process the following lines
        while beg < size {
            end = line_end(data, end + 1);

            if is_empty(&data[beg..end]) != 0 {
                in_empty = true;
                beg = end;
                continue;
            }

            // calculating the indentation
            let mut i = 0;
            while i < 4 && beg + i < end && data[beg + i] == b' ' {
                i += 1;
            }
            let pre = i;

            if self.ext.contains(Extensions::FENCED_CODE)
                && is_codefence(&data[beg + i..end]).is_some()
            {
                in_fence = !in_fence;
            }

            // new list items are only recognized outside of fences
            let (has_next_uli, has_next_oli) = if in_fence {
                (0, 0)
            } else {
                (
                    prefix_uli(&data[beg + i..end]),
                    prefix_oli(&data[beg + i..end]),
                )
            };

            // a marker-type switch after an empty line ends the whole list
            if in_empty
                && ((flags.contains(ListFlags::ORDERED) && has_next_uli != 0)
                    || (!flags.contains(ListFlags::ORDERED) && has_next_oli != 0))
            {
                *flags |= ListFlags::END;
                break;
            }

            if (has_next_uli != 0 && !is_hrule(&data[beg + i..end])) || has_next_oli != 0 {
                if in_empty {
                    has_inside_empty = true;
                }

                if pre == orgpre {
                    // the next item shares this item's indentation
                    break;
                }

                if sublist == 0 {
                    sublist = work.len();
                }
            } else if in_empty && pre == 0 {
                // joining only indented content after empty lines
                *flags |= ListFlags::END;
                break;
            } else if in_empty {
                work.put_byte(b'\n');
                has_inside_empty = true;
            }

            in_empty = false;

            // adding the line without prefix into the working buffer
            work.put(&data[beg + i..end]);
            beg = end;
        }

        // render of the item contents
        if has_inside_empty {
            *flags |= ListFlags::BLOCK;
        }

        if flags.contains(ListFlags::BLOCK) {
            // intermediate render of a block item
            if sublist != 0 && sublist < work.len() {
                self.parse_block(&mut inter, &work[..sublist]);
                self.parse_block(&mut inter, &work[sublist..]);
            } else {
                self.parse_block(&mut inter, &work);
            }
        } else {
            // intermediate render of an inline item
            if sublist != 0 && sublist < work.len() {
                self.parse_inline(&mut inter, &work[..sublist]);
                self.parse_block(&mut inter, &work[sublist..]);
            } else {
                self.parse_inline(&mut inter, &work);
            }
        }

        if let Some(f) = self.cb.listitem {
            f(ob, &inter, *flags, &mut self.renderer);
        }

        self.span_bufs.release(inter);
        self.span_bufs.release(work);
        beg
    }

    fn parse_list(&mut self, ob: &mut Buffer, data: &[u8], flags: ListFlags) -> usize {
        let mut flags = flags;
        let mut work = self.block_bufs.acquire();

        let mut i = 0;
        while i < data.len() {
            let j = self.parse_listitem(&mut work, &data[i..], &mut flags);
            i += j;
            if j == 0 || flags.contains(ListFlags::END) {
                break;
            }
        }

        if let Some(f) = self.cb.list {
            f(ob, &work, flags, &mut self.renderer);
        }
        self.block_bufs.release(work);
        i
    }

    fn parse_table_row(
        &mut self,
        ob: &mut Buffer,
        data: &[u8],
        col_data: &[TableFlags],
        header_flag: TableFlags,
    ) {
        let size = data.len();
        let columns = col_data.len();

        if self.cb.table_cell.is_none() || self.cb.table_row.is_none() {
            return;
        }

        let mut row_work = self.span_bufs.acquire();

        let mut i = 0;
        if i < size && data[i] == b'|' {
            i += 1;
        }

        let mut col = 0;
        while col < columns && i < size {
            let mut cell_work = self.span_bufs.acquire();

            while i < size && is_md_space(data[i]) {
                i += 1;
            }
            let cell_start = i;

            while i < size && data[i] != b'|' {
                i += 1;
            }
            let mut cell_end = i - 1;
            while cell_end > cell_start && is_md_space(data[cell_end]) {
                cell_end -= 1;
            }

            self.parse_inline(&mut cell_work, &data[cell_start..1 + cell_end]);
            let f = self.cb.table_cell.unwrap();
            f(
                &mut row_work,
                &cell_work,
                col_data[col] | header_flag,
                &mut self.renderer,
            );

            self.span_bufs.release(cell_work);
            i += 1;
            col += 1;
        }

        let f = self.cb.table_cell.unwrap();
        while col < columns {
            f(
                &mut row_work,
                &[],
                col_data[col] | header_flag,
                &mut self.renderer,
            );
            col += 1;
        }

        let f = self.cb.table_row.unwrap();
        f(ob, &row_work, &mut self.renderer);

        self.span_bufs.release(row_work);
    }

    /// Validates the header line plus its alignment underline. On success
    /// the header row has been rendered into `ob`, and the consumed byte
    /// count plus the per-column alignment flags are returned.
    fn parse_table_header(
        &mut self,
        ob: &mut Buffer,
        data: &[u8],
    ) -> Option<(usize, Vec<TableFlags>)> {
        let size = data.len();

        let mut i = 0;
        let mut pipes: i32 = 0;
        while i < size && data[i] != b'\n' {
            if data[i] == b'|' {
                pipes += 1;
            }
            i += 1;
        }
        if i == size || pipes == 0 {
            return None;
        }

        let mut header_end = i;
        while header_end > 0 && is_md_space(data[header_end - 1]) {
            header_end -= 1;
        }

        if data[0] == b'|' {
            pipes -= 1;
        }
        if header_end > 0 && data[header_end - 1] == b'|' {
            pipes -= 1;
        }

        let columns = (pipes + 1).max(0) as usize;
        let mut col_data = vec![TableFlags::empty(); columns];

        // parse the header underline
        i += 1;
        if i < size && data[i] == b'|' {
            i += 1;
        }

        let mut under_end = i;
        while under_end < size && data[under_end] != b'\n' {
            under_end += 1;
        }

        let mut col = 0;
        while col < columns && i < under_end {
            let mut dashes = 0;

            while i < under_end && data[i] == b' ' {
                i += 1;
            }

            if i < under_end && data[i] == b':' {
                i += 1;
                col_data[col] |= TableFlags::ALIGN_LEFT;
                dashes += 1;
            }

            while i < under_end && data[i] == b'-' {
                i += 1;
                dashes += 1;
            }

            if i < under_end && data[i] == b':' {
                i += 1;
                col_data[col] |= TableFlags::ALIGN_RIGHT;
                dashes += 1;
            }

            while i < under_end && data[i] == b' ' {
                i += 1;
            }

            if i < under_end && data[i] != b'|' {
                break;
            }
            if dashes < 3 {
                break;
            }

            i += 1;
            col += 1;
        }

        if col < columns {
            return None;
        }

        self.parse_table_row(ob, &data[..header_end], &col_data, TableFlags::HEADER);

        Some((under_end + 1, col_data))
    }

    fn parse_table(&mut self, ob: &mut Buffer, data: &[u8]) -> usize {
        let size = data.len();

        let mut header_work = self.span_bufs.acquire();
        let mut body_work = self.block_bufs.acquire();

        let mut i = 0;
        if let Some((consumed, col_data)) = self.parse_table_header(&mut header_work, data) {
            i = consumed;

            while i < size {
                let row_start = i;
                let mut pipes = 0;

                while i < size && data[i] != b'\n' {
                    if data[i] == b'|' {
                        pipes += 1;
                    }
                    i += 1;
                }

                if pipes == 0 || i == size {
                    i = row_start;
                    break;
                }

                self.parse_table_row(
                    &mut body_work,
                    &data[row_start..i],
                    &col_data,
                    TableFlags::empty(),
                );
                i += 1;
            }

            if let Some(f) = self.cb.table {
                f(ob, &header_work, &body_work, &mut self.renderer);
            }
        }

        self.span_bufs.release(header_work);
        self.block_bufs.release(body_work);
        i
    }
}

/// Drops backslash escapes while emitting a link destination into a fresh
/// buffer.
fn unscape_text(ob: &mut Buffer, src: &[u8]) {
    let mut i = 0;
    while i < src.len() {
        let org = i;
        while i < src.len() && src[i] != b'\\' {
            i += 1;
        }
        if i > org {
            ob.put(&src[org..i]);
        }
        if i + 1 >= src.len() {
            break;
        }
        ob.put_byte(src[i + 1]);
        i += 2;
    }
}

/// Squeezes the label's newlines to single spaces, as the shortcut and
/// empty-reference link forms require.
fn collapse_label(ob: &mut Buffer, sub: &[u8], txt_e: usize) {
    for j in 1..txt_e {
        if sub[j] != b'\n' {
            ob.put_byte(sub[j]);
        } else if sub[j - 1] != b' ' {
            ob.put_byte(b' ');
        }
    }
}

/// Looks for the next potential emphasis closer, skipping code spans and
/// bracketed link text on the way.
fn find_emph_char(data: &[u8], c: u8) -> usize {
    let size = data.len();
    let mut i = 1;

    while i < size {
        while i < size && data[i] != c && data[i] != b'`' && data[i] != b'[' {
            i += 1;
        }
        if i == size {
            return 0;
        }
        if data[i] == c {
            return i;
        }

        // not counting escaped delimiters
        if data[i - 1] == b'\\' {
            i += 1;
            continue;
        }

        if data[i] == b'`' {
            // a code span hides its delimiters until the matching run
            let mut span_nb = 0;
            let mut tmp_i = 0;
            while i < size && data[i] == b'`' {
                i += 1;
                span_nb += 1;
            }
            if i >= size {
                return 0;
            }

            let mut bt = 0;
            while i < size && bt < span_nb {
                if tmp_i == 0 && data[i] == c {
                    tmp_i = i;
                }
                if data[i] == b'`' {
                    bt += 1;
                } else {
                    bt = 0;
                }
                i += 1;
            }
            if i >= size {
                return tmp_i;
            }
        } else if data[i] == b'[' {
            // skipping a link
            let mut tmp_i = 0;
            i += 1;
            while i < size && data[i] != b']' {
                if tmp_i == 0 && data[i] == c {
                    tmp_i = i;
                }
                i += 1;
            }
            i += 1;
            while i < size && (data[i] == b' ' || data[i] == b'\n') {
                i += 1;
            }
            if i >= size {
                return tmp_i;
            }

            let cc = match data[i] {
                b'[' => b']',
                b'(' => b')',
                _ => {
                    if tmp_i != 0 {
                        return tmp_i;
                    } else {
                        continue;
                    }
                }
            };

            i += 1;
            while i < size && data[i] != cc {
                if tmp_i == 0 && data[i] == c {
                    tmp_i = i;
                }
                i += 1;
            }
            if i >= size {
                return tmp_i;
            }
            i += 1;
        }
    }

    0
}

/// Checking the end of an HTML block: `</tag>` + blank line(s).
fn htmlblock_end_tag(tag: &str, data: &[u8]) -> usize {
    let size = data.len();
    let tag_len = tag.len();

    // checking if the tag closes here
    if tag_len + 3 >= size
        || !data[2..2 + tag_len].eq_ignore_ascii_case(tag.as_bytes())
        || data[tag_len + 2] != b'>'
    {
        return 0;
    }

    // checking for white lines
    let mut i = tag_len + 3;
    let mut w = 0;
    if i < size {
        w = is_empty(&data[i..]);
        if w == 0 {
            return 0; // non-blank content after the tag
        }
    }
    i += w;
    w = 0;

    if i < size {
        w = is_empty(&data[i..]);
    }
    i + w
}

fn htmlblock_end(curtag: &str, data: &[u8], start_of_line: bool) -> usize {
    let size = data.len();
    let tag_size = curtag.len();
    let mut i = 1;
    let mut block_lines = 0;

    while i < size {
        i += 1;
        while i < size && !(data[i - 1] == b'<' && data[i] == b'/') {
            if data[i] == b'\n' {
                block_lines += 1;
            }
            i += 1;
        }

        // When only unindented tags are wanted, the closer must follow a
        // newline, unless it still sits on the opening line.
        if start_of_line && block_lines > 0 && data[i - 2] != b'\n' {
            continue;
        }

        if i + 2 + tag_size >= size {
            break;
        }

        let end_tag = htmlblock_end_tag(curtag, &data[i - 1..]);
        if end_tag != 0 {
            return i + end_tag - 1;
        }
    }

    0
}

/// The C-shaped end-of-line scan: smallest `end >= from` with a newline at
/// `end - 1`, or the buffer length.
fn line_end(data: &[u8], from: usize) -> usize {
    debug_assert!(from > 0);
    match memchr(b'\n', &data[from - 1..]) {
        Some(x) => from + x,
        None => data.len(),
    }
}
