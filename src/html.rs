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

//! The standard HTML renderer, plus a table-of-contents variant.
//!
//! [`renderer`] fills a [`Callbacks`] table with the HTML emitters and
//! hands back the [`Renderer`] state they share; pass both to
//! [`Markdown::new`](crate::Markdown::new).

use std::fmt::Write;

use bitflags::bitflags;

use crate::autolink::is_safe_link;
use crate::buffer::Buffer;
use crate::escape::{escape_href, escape_html};
use crate::scanners::is_ascii_space;
use crate::{AutolinkType, Callbacks, ListFlags, TableFlags};

bitflags! {
    /// Render-time options for the HTML back-end.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HtmlFlags: u32 {
        const SKIP_HTML = 1 << 0;
        const SKIP_STYLE = 1 << 1;
        const SKIP_IMAGES = 1 << 2;
        const SKIP_LINKS = 1 << 3;
        /// Accepted for compatibility; tabs are always expanded upstream.
        const EXPAND_TABS = 1 << 4;
        /// Drop links whose URL scheme is not known-safe.
        const SAFELINK = 1 << 5;
        /// Number headers with `toc_N` anchors.
        const TOC = 1 << 6;
        /// Every newline inside a paragraph becomes a `<br>`.
        const HARD_WRAP = 1 << 7;
        /// XHTML-style self-closing tags.
        const USE_XHTML = 1 << 8;
        /// Escape all raw HTML instead of passing it through.
        const ESCAPE = 1 << 9;
    }
}

#[derive(Debug, Default)]
struct TocData {
    header_count: i32,
    current_level: i32,
    level_offset: i32,
}

/// Shared state of the HTML callbacks.
pub struct Renderer {
    pub flags: HtmlFlags,
    toc_data: TocData,
    /// Extra attributes for `<a>` tags, emitted after the href.
    pub link_attributes: Option<fn(ob: &mut Buffer, url: &[u8], rndr: &Renderer)>,
}

impl Renderer {
    fn new(flags: HtmlFlags) -> Renderer {
        Renderer {
            flags,
            toc_data: TocData::default(),
            link_attributes: None,
        }
    }

    fn xhtml(&self) -> bool {
        self.flags.contains(HtmlFlags::USE_XHTML)
    }
}

/// Whether `tag_data` is an opening or closing `tagname` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlTag {
    Open,
    Close,
}

/// Matches a raw tag against a tag name, byte for byte.
pub fn is_tag(tag_data: &[u8], tagname: &str) -> Option<HtmlTag> {
    if tag_data.len() < 3 || tag_data[0] != b'<' {
        return None;
    }

    let mut i = 1;
    let mut closed = false;
    if tag_data[i] == b'/' {
        closed = true;
        i += 1;
    }

    for &name_byte in tagname.as_bytes() {
        if i >= tag_data.len() {
            break;
        }
        if tag_data[i] != name_byte {
            return None;
        }
        i += 1;
    }

    if i == tag_data.len() {
        return None;
    }

    if is_ascii_space(tag_data[i]) || tag_data[i] == b'>' {
        Some(if closed { HtmlTag::Close } else { HtmlTag::Open })
    } else {
        None
    }
}

/********************
 * GENERIC RENDERER *
 ********************/

fn rndr_autolink(ob: &mut Buffer, link: &[u8], ty: AutolinkType, rndr: &mut Renderer) -> bool {
    if link.is_empty() {
        return false;
    }

    if rndr.flags.contains(HtmlFlags::SAFELINK)
        && !is_safe_link(link)
        && ty != AutolinkType::Email
    {
        return false;
    }

    ob.put_str("<a href=\"");
    if ty == AutolinkType::Email {
        ob.put_str("mailto:");
    }
    escape_href(ob, link);

    if let Some(attrs) = rndr.link_attributes {
        ob.put_byte(b'"');
        attrs(ob, link, rndr);
        ob.put_byte(b'>');
    } else {
        ob.put_str("\">");
    }

    // Pretty printing: an explicit mailto: URI is displayed without the
    // mailto: prefix.
    if link.len() > 7 && link[..7].eq_ignore_ascii_case(b"mailto:") {
        escape_html(ob, &link[7..], false);
    } else {
        escape_html(ob, link, false);
    }

    ob.put_str("</a>");
    true
}

fn rndr_blockcode(ob: &mut Buffer, text: &[u8], lang: &[u8], _rndr: &mut Renderer) {
    if !ob.is_empty() {
        ob.put_byte(b'\n');
    }

    if !lang.is_empty() {
        ob.put_str("<pre><code class=\"");

        let mut i = 0;
        let mut cls = 0;
        while i < lang.len() {
            while i < lang.len() && is_ascii_space(lang[i]) {
                i += 1;
            }
            if i < lang.len() {
                let mut org = i;
                while i < lang.len() && !is_ascii_space(lang[i]) {
                    i += 1;
                }
                // a leading dot is a language marker, not a class name
                if lang[org] == b'.' {
                    org += 1;
                }
                if cls > 0 {
                    ob.put_byte(b' ');
                }
                escape_html(ob, &lang[org..i], false);
            }
            i += 1;
            cls += 1;
        }

        ob.put_str("\">");
    } else {
        ob.put_str("<pre><code>");
    }

    escape_html(ob, text, false);
    ob.put_str("</code></pre>\n");
}

fn rndr_blockquote(ob: &mut Buffer, text: &[u8], _rndr: &mut Renderer) {
    if !ob.is_empty() {
        ob.put_byte(b'\n');
    }
    ob.put_str("<blockquote>\n");
    ob.put(text);
    ob.put_str("</blockquote>\n");
}

fn rndr_codespan(ob: &mut Buffer, text: &[u8], _rndr: &mut Renderer) -> bool {
    ob.put_str("<code>");
    escape_html(ob, text, false);
    ob.put_str("</code>");
    true
}

fn rndr_strikethrough(ob: &mut Buffer, text: &[u8], _rndr: &mut Renderer) -> bool {
    if text.is_empty() {
        return false;
    }
    ob.put_str("<del>");
    ob.put(text);
    ob.put_str("</del>");
    true
}

fn rndr_double_emphasis(ob: &mut Buffer, text: &[u8], _rndr: &mut Renderer) -> bool {
    if text.is_empty() {
        return false;
    }
    ob.put_str("<strong>");
    ob.put(text);
    ob.put_str("</strong>");
    true
}

fn rndr_emphasis(ob: &mut Buffer, text: &[u8], _rndr: &mut Renderer) -> bool {
    if text.is_empty() {
        return false;
    }
    ob.put_str("<em>");
    ob.put(text);
    ob.put_str("</em>");
    true
}

fn rndr_linebreak(ob: &mut Buffer, rndr: &mut Renderer) -> bool {
    ob.put_str(if rndr.xhtml() { "<br/>\n" } else { "<br>\n" });
    true
}

fn rndr_header(ob: &mut Buffer, text: &[u8], level: i32, rndr: &mut Renderer) {
    if !ob.is_empty() {
        ob.put_byte(b'\n');
    }

    if rndr.flags.contains(HtmlFlags::TOC) {
        let _ = write!(ob, "<h{} id=\"toc_{}\">", level, rndr.toc_data.header_count);
        rndr.toc_data.header_count += 1;
    } else {
        let _ = write!(ob, "<h{}>", level);
    }

    ob.put(text);
    let _ = write!(ob, "</h{}>\n", level);
}

fn rndr_link(
    ob: &mut Buffer,
    link: &[u8],
    title: &[u8],
    content: &[u8],
    rndr: &mut Renderer,
) -> bool {
    if !link.is_empty() && rndr.flags.contains(HtmlFlags::SAFELINK) && !is_safe_link(link) {
        return false;
    }

    ob.put_str("<a href=\"");
    escape_href(ob, link);

    if !title.is_empty() {
        ob.put_str("\" title=\"");
        escape_html(ob, title, false);
    }

    if let Some(attrs) = rndr.link_attributes {
        ob.put_byte(b'"');
        attrs(ob, link, rndr);
        ob.put_byte(b'>');
    } else {
        ob.put_str("\">");
    }

    ob.put(content);
    ob.put_str("</a>");
    true
}

fn rndr_list(ob: &mut Buffer, text: &[u8], flags: ListFlags, _rndr: &mut Renderer) {
    if !ob.is_empty() {
        ob.put_byte(b'\n');
    }
    ob.put_str(if flags.contains(ListFlags::ORDERED) {
        "<ol>\n"
    } else {
        "<ul>\n"
    });
    ob.put(text);
    ob.put_str(if flags.contains(ListFlags::ORDERED) {
        "</ol>\n"
    } else {
        "</ul>\n"
    });
}

fn rndr_listitem(ob: &mut Buffer, text: &[u8], _flags: ListFlags, _rndr: &mut Renderer) {
    ob.put_str("<li>");
    let mut size = text.len();
    while size > 0 && text[size - 1] == b'\n' {
        size -= 1;
    }
    ob.put(&text[..size]);
    ob.put_str("</li>\n");
}

fn rndr_paragraph(ob: &mut Buffer, text: &[u8], rndr: &mut Renderer) {
    if !ob.is_empty() {
        ob.put_byte(b'\n');
    }

    let mut i = 0;
    while i < text.len() && is_ascii_space(text[i]) {
        i += 1;
    }
    if i == text.len() {
        return;
    }

    ob.put_str("<p>");
    if rndr.flags.contains(HtmlFlags::HARD_WRAP) {
        while i < text.len() {
            let org = i;
            while i < text.len() && text[i] != b'\n' {
                i += 1;
            }
            if i > org {
                ob.put(&text[org..i]);
            }

            // no line break after the paragraph's final newline
            if i + 1 >= text.len() {
                break;
            }

            rndr_linebreak(ob, rndr);
            i += 1;
        }
    } else {
        ob.put(&text[i..]);
    }
    ob.put_str("</p>\n");
}

fn rndr_raw_block(ob: &mut Buffer, text: &[u8], _rndr: &mut Renderer) {
    let mut sz = text.len();
    while sz > 0 && text[sz - 1] == b'\n' {
        sz -= 1;
    }
    let mut org = 0;
    while org < sz && text[org] == b'\n' {
        org += 1;
    }
    if org >= sz {
        return;
    }
    if !ob.is_empty() {
        ob.put_byte(b'\n');
    }
    ob.put(&text[org..sz]);
    ob.put_byte(b'\n');
}

fn rndr_triple_emphasis(ob: &mut Buffer, text: &[u8], _rndr: &mut Renderer) -> bool {
    if text.is_empty() {
        return false;
    }
    ob.put_str("<strong><em>");
    ob.put(text);
    ob.put_str("</em></strong>");
    true
}

fn rndr_hrule(ob: &mut Buffer, rndr: &mut Renderer) {
    if !ob.is_empty() {
        ob.put_byte(b'\n');
    }
    ob.put_str(if rndr.xhtml() { "<hr/>\n" } else { "<hr>\n" });
}

fn rndr_image(
    ob: &mut Buffer,
    link: &[u8],
    title: &[u8],
    alt: &[u8],
    rndr: &mut Renderer,
) -> bool {
    if link.is_empty() {
        return false;
    }

    ob.put_str("<img src=\"");
    escape_href(ob, link);
    ob.put_str("\" alt=\"");
    escape_html(ob, alt, false);

    if !title.is_empty() {
        ob.put_str("\" title=\"");
        escape_html(ob, title, false);
    }

    ob.put_str(if rndr.xhtml() { "\"/>" } else { "\">" });
    true
}

fn rndr_raw_html(ob: &mut Buffer, text: &[u8], rndr: &mut Renderer) -> bool {
    // ESCAPE overrides the SKIP flags; it doesn't care whether the tag is
    // valid, it just escapes everything.
    if rndr.flags.contains(HtmlFlags::ESCAPE) {
        escape_html(ob, text, false);
        return true;
    }

    if rndr.flags.contains(HtmlFlags::SKIP_HTML) {
        return true;
    }

    if rndr.flags.contains(HtmlFlags::SKIP_STYLE) && is_tag(text, "style").is_some() {
        return true;
    }

    if rndr.flags.contains(HtmlFlags::SKIP_LINKS) && is_tag(text, "a").is_some() {
        return true;
    }

    if rndr.flags.contains(HtmlFlags::SKIP_IMAGES) && is_tag(text, "img").is_some() {
        return true;
    }

    ob.put(text);
    true
}

fn rndr_table(ob: &mut Buffer, header: &[u8], body: &[u8], _rndr: &mut Renderer) {
    if !ob.is_empty() {
        ob.put_byte(b'\n');
    }
    ob.put_str("<table><thead>\n");
    ob.put(header);
    ob.put_str("</thead><tbody>\n");
    ob.put(body);
    ob.put_str("</tbody></table>\n");
}

fn rndr_tablerow(ob: &mut Buffer, text: &[u8], _rndr: &mut Renderer) {
    ob.put_str("<tr>\n");
    ob.put(text);
    ob.put_str("</tr>\n");
}

fn rndr_tablecell(ob: &mut Buffer, text: &[u8], flags: TableFlags, _rndr: &mut Renderer) {
    if flags.contains(TableFlags::HEADER) {
        ob.put_str("<th");
    } else {
        ob.put_str("<td");
    }

    match flags & TableFlags::ALIGN_MASK {
        f if f == TableFlags::ALIGN_CENTER => ob.put_str(" align=\"center\">"),
        f if f == TableFlags::ALIGN_LEFT => ob.put_str(" align=\"left\">"),
        f if f == TableFlags::ALIGN_RIGHT => ob.put_str(" align=\"right\">"),
        _ => ob.put_str(">"),
    }

    ob.put(text);

    if flags.contains(TableFlags::HEADER) {
        ob.put_str("</th>\n");
    } else {
        ob.put_str("</td>\n");
    }
}

fn rndr_superscript(ob: &mut Buffer, text: &[u8], _rndr: &mut Renderer) -> bool {
    if text.is_empty() {
        return false;
    }
    ob.put_str("<sup>");
    ob.put(text);
    ob.put_str("</sup>");
    true
}

fn rndr_normal_text(ob: &mut Buffer, text: &[u8], _rndr: &mut Renderer) {
    escape_html(ob, text, false);
}

/*****************
 * TOC RENDERER  *
 *****************/

fn toc_header(ob: &mut Buffer, text: &[u8], level: i32, rndr: &mut Renderer) {
    // the first header sets the offset for the whole document
    if rndr.toc_data.current_level == 0 {
        rndr.toc_data.level_offset = level - 1;
    }
    let level = level - rndr.toc_data.level_offset;

    if level > rndr.toc_data.current_level {
        while level > rndr.toc_data.current_level {
            ob.put_str("<ul>\n<li>\n");
            rndr.toc_data.current_level += 1;
        }
    } else if level < rndr.toc_data.current_level {
        ob.put_str("</li>\n");
        while level < rndr.toc_data.current_level {
            ob.put_str("</ul>\n</li>\n");
            rndr.toc_data.current_level -= 1;
        }
        ob.put_str("<li>\n");
    } else {
        ob.put_str("</li>\n<li>\n");
    }

    let _ = write!(ob, "<a href=\"#toc_{}\">", rndr.toc_data.header_count);
    rndr.toc_data.header_count += 1;
    escape_html(ob, text, false);
    ob.put_str("</a>\n");
}

fn toc_link(
    ob: &mut Buffer,
    _link: &[u8],
    _title: &[u8],
    content: &[u8],
    _rndr: &mut Renderer,
) -> bool {
    ob.put(content);
    true
}

fn toc_finalize(ob: &mut Buffer, rndr: &mut Renderer) {
    while rndr.toc_data.current_level > 0 {
        ob.put_str("</li>\n</ul>\n");
        rndr.toc_data.current_level -= 1;
    }
}

/// Builds the standard HTML callback table and its renderer state.
pub fn renderer(render_flags: HtmlFlags) -> (Callbacks<Renderer>, Renderer) {
    let mut cb = Callbacks {
        blockcode: Some(rndr_blockcode),
        blockquote: Some(rndr_blockquote),
        blockhtml: Some(rndr_raw_block),
        header: Some(rndr_header),
        hrule: Some(rndr_hrule),
        list: Some(rndr_list),
        listitem: Some(rndr_listitem),
        paragraph: Some(rndr_paragraph),
        table: Some(rndr_table),
        table_row: Some(rndr_tablerow),
        table_cell: Some(rndr_tablecell),

        autolink: Some(rndr_autolink),
        codespan: Some(rndr_codespan),
        double_emphasis: Some(rndr_double_emphasis),
        emphasis: Some(rndr_emphasis),
        image: Some(rndr_image),
        linebreak: Some(rndr_linebreak),
        link: Some(rndr_link),
        raw_html_tag: Some(rndr_raw_html),
        triple_emphasis: Some(rndr_triple_emphasis),
        strikethrough: Some(rndr_strikethrough),
        superscript: Some(rndr_superscript),

        normal_text: Some(rndr_normal_text),
        ..Callbacks::default()
    };

    if render_flags.contains(HtmlFlags::SKIP_IMAGES) {
        cb.image = None;
    }
    if render_flags.contains(HtmlFlags::SKIP_LINKS) {
        cb.link = None;
        cb.autolink = None;
    }
    if render_flags.contains(HtmlFlags::SKIP_HTML) || render_flags.contains(HtmlFlags::ESCAPE) {
        cb.blockhtml = None;
    }

    (cb, Renderer::new(render_flags))
}

/// Builds the table-of-contents callback table: headers become numbered
/// anchors, spans keep their emphasis, everything else is dropped.
pub fn toc_renderer() -> (Callbacks<Renderer>, Renderer) {
    let cb = Callbacks {
        header: Some(toc_header),
        codespan: Some(rndr_codespan),
        double_emphasis: Some(rndr_double_emphasis),
        emphasis: Some(rndr_emphasis),
        link: Some(toc_link),
        triple_emphasis: Some(rndr_triple_emphasis),
        strikethrough: Some(rndr_strikethrough),
        superscript: Some(rndr_superscript),
        doc_footer: Some(toc_finalize),
        ..Callbacks::default()
    };

    (cb, Renderer::new(HtmlFlags::TOC))
}
