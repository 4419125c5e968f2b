// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Terminal output capability set and the CBMEM console adapter.
//!
//! Only character emission reaches the ring buffer. Cursor movement,
//! clearing and colour changes are rendered by [`Vt100Term`] as escape
//! sequences, which in turn are written one byte at a time.

use alloc::rc::Rc;
use core::fmt::Write;

use crate::config::{TERM_HEIGHT, TERM_WIDTH};
use crate::slot::ConsoleSlot;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TermPos {
    pub x: u16,
    pub y: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TermSize {
    pub width: u16,
    pub height: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorState {
    Standard,
    Normal,
    Highlight,
}

/// Single-byte output primitive underneath a terminal.
pub trait CharSink {
    fn put(&mut self, byte: u8);
}

/// Capabilities of a registered output device.
pub trait TermOutput {
    fn name(&self) -> &str;
    fn putchar(&mut self, c: char);
    fn getxy(&self) -> TermPos;
    fn getwh(&self) -> TermSize;
    fn gotoxy(&mut self, pos: TermPos);
    fn cls(&mut self);
    fn set_color_state(&mut self, state: ColorState);
    fn set_cursor(&mut self, visible: bool);
}

/// Writes through to the shared console handle.
pub struct CbmemTerm<B> {
    slot: Rc<ConsoleSlot<B>>,
}

impl<B> CbmemTerm<B> {
    pub fn new(slot: Rc<ConsoleSlot<B>>) -> Self {
        Self { slot }
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> CharSink for CbmemTerm<B> {
    fn put(&mut self, byte: u8) {
        self.slot.put(byte);
    }
}

/// Generic vt100 emulation over a [`CharSink`]. ASCII only.
pub struct Vt100Term<S> {
    name: &'static str,
    sink: S,
    pos: TermPos,
    size: TermSize,
}

impl<S: CharSink> Vt100Term<S> {
    pub fn new(name: &'static str, sink: S) -> Self {
        Self::with_size(
            name,
            sink,
            TermSize {
                width: TERM_WIDTH,
                height: TERM_HEIGHT,
            },
        )
    }

    pub fn with_size(name: &'static str, sink: S, size: TermSize) -> Self {
        Self {
            name,
            sink,
            pos: TermPos::default(),
            size,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn put_str(&mut self, s: &str) {
        for b in s.bytes() {
            self.sink.put(b);
        }
    }

    fn line_feed(&mut self) {
        if self.pos.y + 1 < self.size.height {
            self.pos.y += 1;
        }
    }
}

impl<S: CharSink> Write for Vt100Term<S> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for c in s.chars() {
            self.putchar(c);
        }
        Ok(())
    }
}

impl<S: CharSink> TermOutput for Vt100Term<S> {
    fn name(&self) -> &str {
        self.name
    }

    fn putchar(&mut self, c: char) {
        let byte = if c.is_ascii() { c as u8 } else { b'?' };
        match byte {
            0x07 => {}
            0x08 | 0x7f => self.pos.x = self.pos.x.saturating_sub(1),
            b'\n' => self.line_feed(),
            b'\r' => self.pos.x = 0,
            _ => {
                if self.pos.x >= self.size.width {
                    self.pos.x = 0;
                    self.line_feed();
                    self.sink.put(b'\r');
                    self.sink.put(b'\n');
                }
                self.pos.x += 1;
            }
        }
        self.sink.put(byte);
    }

    fn getxy(&self) -> TermPos {
        self.pos
    }

    fn getwh(&self) -> TermSize {
        self.size
    }

    fn gotoxy(&mut self, pos: TermPos) {
        let pos = TermPos {
            x: pos.x.min(self.size.width.saturating_sub(1)),
            y: pos.y.min(self.size.height.saturating_sub(1)),
        };
        // At most "\x1b[65535;65535H", 14 bytes.
        let mut seq = EscBuf::new();
        let formatted = write!(seq, "\x1b[{};{}H", pos.y + 1, pos.x + 1);
        debug_assert!(formatted.is_ok());
        self.put_str(seq.as_str());
        self.pos = pos;
    }

    fn cls(&mut self) {
        self.put_str("\x1b[H\x1b[J");
        self.pos = TermPos::default();
    }

    fn set_color_state(&mut self, state: ColorState) {
        match state {
            ColorState::Standard | ColorState::Normal => self.put_str("\x1b[m"),
            ColorState::Highlight => self.put_str("\x1b[7m"),
        }
    }

    fn set_cursor(&mut self, visible: bool) {
        if visible {
            self.put_str("\x1b[?25h");
        } else {
            self.put_str("\x1b[?25l");
        }
    }
}

/// Stack buffer for formatting a single escape sequence.
struct EscBuf {
    buf: [u8; 16],
    len: usize,
}

impl EscBuf {
    fn new() -> Self {
        Self { buf: [0; 16], len: 0 }
    }

    fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }
}

impl Write for EscBuf {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let end = self.len + s.len();
        if end > self.buf.len() {
            return Err(core::fmt::Error);
        }
        self.buf[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}
