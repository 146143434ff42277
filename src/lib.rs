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

//! Callback-driven Markdown parser implementing the Sundown dialect.
//!
//! A [`Markdown`] context couples a block-level recognizer with a
//! table-driven inline recognizer and pushes semantic callbacks into a
//! renderer as it walks the document. The [`html`] module provides the
//! standard HTML renderer (and a table-of-contents variant); any back-end
//! that fills in a [`Callbacks`] table works the same way.
//!
//! Extensions beyond vanilla Markdown (tables, fenced code, autolinks,
//! strikethrough, superscript) are off by default and enabled through
//! [`Extensions`] flags.
//!
//! # Example
//! ```rust
//! use sundown::{html, Buffer, Extensions, Markdown};
//!
//! let (callbacks, renderer) = html::renderer(html::HtmlFlags::empty());
//! let mut md = Markdown::new(Extensions::empty(), 16, callbacks, renderer);
//!
//! let mut output = Buffer::new(64);
//! md.render(&mut output, b"Hello *world*");
//!
//! assert_eq!(output.as_slice(), b"<p>Hello <em>world</em></p>\n");
//! ```

#![forbid(unsafe_code)]

pub mod html;
pub mod smartypants;

mod autolink;
mod buffer;
mod escape;
mod firstpass;
mod linklabel;
mod parse;
mod scanners;

pub use crate::autolink::is_safe_link;
pub use crate::buffer::Buffer;
pub use crate::parse::{Callbacks, Markdown};

use bitflags::bitflags;

bitflags! {
    /// Syntax extensions, selectable per parser context.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Extensions: u32 {
        /// `_` and `*` inside words do not open emphasis.
        const NO_INTRA_EMPHASIS = 1 << 0;
        /// PHP-Markdown-style tables.
        const TABLES = 1 << 1;
        /// Backtick or tilde code fences.
        const FENCED_CODE = 1 << 2;
        /// Linkify bare URLs, `www.` prefixes and email addresses.
        const AUTOLINK = 1 << 3;
        /// `~~strikethrough~~`.
        const STRIKETHROUGH = 1 << 4;
        /// ATX headers require a space after the `#` run.
        const SPACE_HEADERS = 1 << 6;
        /// `^superscript`.
        const SUPERSCRIPT = 1 << 7;
        /// Blocks may interrupt paragraphs without a blank line.
        const LAX_SPACING = 1 << 8;
    }
}

bitflags! {
    /// Flags passed to the `list` and `listitem` callbacks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ListFlags: u32 {
        const ORDERED = 1 << 0;
        /// The item's contents were parsed in block mode.
        const BLOCK = 1 << 1;
        /// Internal marker for the end of the enclosing list.
        const END = 1 << 3;
    }
}

bitflags! {
    /// Flags passed to the `table_cell` callback: a two-bit alignment
    /// field plus the header-row bit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TableFlags: u32 {
        const ALIGN_LEFT = 1;
        const ALIGN_RIGHT = 2;
        const ALIGN_CENTER = 3;
        const ALIGN_MASK = 3;
        const HEADER = 4;
    }
}

/// How an autolinked span was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutolinkType {
    /// An `http://`-style or otherwise schemed link.
    Normal,
    /// An email address without an explicit `mailto:`.
    Email,
}

/// The dialect version this crate tracks, as `(major, minor, revision)`.
pub fn version() -> (i32, i32, i32) {
    (1, 16, 0)
}
