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

//! Growable byte buffers and the scratch-buffer pool backing the parser.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

/// Hard cap on any single buffer growth request.
const MAX_ALLOC: usize = 16 * 1024 * 1024;

/// An owned, growable byte sequence.
///
/// Capacity grows in `unit`-sized quanta. Appends are best-effort: a request
/// that would push the buffer past the 16 MiB allocation cap is a silent
/// no-op, and the buffer's size simply does not advance. Renderer callbacks
/// write their output through this type, including formatted output via
/// [`std::fmt::Write`].
#[derive(Debug)]
pub struct Buffer {
    data: Vec<u8>,
    unit: usize,
}

impl Buffer {
    /// Creates an empty buffer with the given reallocation unit.
    pub fn new(unit: usize) -> Buffer {
        debug_assert!(unit > 0);
        Buffer {
            data: Vec::new(),
            unit,
        }
    }

    /// Ensures capacity for at least `size` bytes, rounded up to a multiple
    /// of the reallocation unit. Returns `false` when the request exceeds
    /// the allocation cap.
    pub fn grow(&mut self, size: usize) -> bool {
        if size > MAX_ALLOC {
            return false;
        }
        if self.data.capacity() >= size {
            return true;
        }
        let mut target = self.data.capacity() + self.unit;
        while target < size {
            target += self.unit;
        }
        self.data.reserve_exact(target - self.data.len());
        true
    }

    /// Appends raw bytes.
    pub fn put(&mut self, bytes: &[u8]) {
        if self.data.len() + bytes.len() > self.data.capacity()
            && !self.grow(self.data.len() + bytes.len())
        {
            return;
        }
        self.data.extend_from_slice(bytes);
    }

    /// Appends a string slice.
    pub fn put_str(&mut self, s: &str) {
        self.put(s.as_bytes());
    }

    /// Appends a single byte.
    pub fn put_byte(&mut self, b: u8) {
        if self.data.len() + 1 > self.data.capacity() && !self.grow(self.data.len() + 1) {
            return;
        }
        self.data.push(b);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Shortens the buffer to `size` bytes. The inline linebreak recognizer
    /// relies on this to drop trailing spaces it has already emitted.
    pub fn truncate(&mut self, size: usize) {
        self.data.truncate(size);
    }

    /// Empties the buffer, keeping its allocation.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Removes the first `n` bytes by move.
    pub fn slurp(&mut self, n: usize) {
        if n >= self.data.len() {
            self.data.clear();
            return;
        }
        self.data.drain(..n);
    }

    /// Lexicographically compares the leading bytes against `prefix`.
    ///
    /// Only the overlapping region is examined, so a buffer shorter than
    /// `prefix` still compares `Equal` when it matches as far as it goes.
    pub fn prefix(&self, prefix: &[u8]) -> Ordering {
        for (i, &p) in prefix.iter().enumerate() {
            match self.data.get(i) {
                None => return Ordering::Equal,
                Some(&b) if b != p => return b.cmp(&p),
                Some(_) => {}
            }
        }
        Ordering::Equal
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Deref for Buffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Write for Buffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.put(s.as_bytes());
        Ok(())
    }
}

/// A stack of scratch buffers, one pool per parsing scope (block or span).
///
/// Acquiring reuses a previously released buffer when one is cached,
/// resetting its size to zero; released buffers are kept for the next
/// acquisition rather than freed. The active count doubles as the nesting
/// measure for the recursion bound.
pub(crate) struct BufferPool {
    cache: Vec<Buffer>,
    active: usize,
    unit: usize,
}

impl BufferPool {
    pub(crate) fn new(unit: usize) -> BufferPool {
        BufferPool {
            cache: Vec::new(),
            active: 0,
            unit,
        }
    }

    pub(crate) fn acquire(&mut self) -> Buffer {
        self.active += 1;
        match self.cache.pop() {
            Some(mut buf) => {
                buf.clear();
                buf
            }
            None => Buffer::new(self.unit),
        }
    }

    pub(crate) fn release(&mut self, buf: Buffer) {
        debug_assert!(self.active > 0);
        self.active -= 1;
        self.cache.push(buf);
    }

    pub(crate) fn active(&self) -> usize {
        self.active
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn put_and_grow() {
        let mut buf = Buffer::new(16);
        buf.put(b"hello ");
        buf.put_str("world");
        buf.put_byte(b'!');
        assert_eq!(buf.as_slice(), b"hello world!");
    }

    #[test]
    fn grow_refuses_past_cap() {
        let mut buf = Buffer::new(8);
        assert!(!buf.grow(MAX_ALLOC + 1));
        buf.put(b"still usable");
        assert_eq!(buf.as_slice(), b"still usable");
    }

    #[test]
    fn slurp_moves_head() {
        let mut buf = Buffer::new(8);
        buf.put(b"abcdef");
        buf.slurp(2);
        assert_eq!(buf.as_slice(), b"cdef");
        buf.slurp(100);
        assert!(buf.is_empty());
    }

    #[test]
    fn prefix_ordering() {
        let mut buf = Buffer::new(8);
        buf.put(b"mailto:someone");
        assert_eq!(buf.prefix(b"mailto:"), Ordering::Equal);
        assert_eq!(buf.prefix(b"mailtp:"), Ordering::Less);
        assert_eq!(buf.prefix(b"mailtn:"), Ordering::Greater);
        // shorter buffers compare equal as far as they go
        let mut short = Buffer::new(8);
        short.put(b"mai");
        assert_eq!(short.prefix(b"mailto:"), Ordering::Equal);
    }

    #[test]
    fn formatted_append() {
        let mut buf = Buffer::new(8);
        let _ = write!(buf, "<h{}>", 3);
        assert_eq!(buf.as_slice(), b"<h3>");
    }

    #[test]
    fn pool_reuses_released_buffers() {
        let mut pool = BufferPool::new(64);
        let mut a = pool.acquire();
        a.put(b"scratch");
        assert_eq!(pool.active(), 1);
        pool.release(a);
        assert_eq!(pool.active(), 0);
        let b = pool.acquire();
        assert!(b.is_empty());
        pool.release(b);
    }
}
