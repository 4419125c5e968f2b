// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Shared handle to the located console.
//!
//! Writer (terminal) and reader (dump command) both go through one
//! `ConsoleSlot`. A dump detaches the console for its whole duration, so a
//! write issued from inside the dump, e.g. the sink echoing onto the cbmemc
//! terminal, finds the slot empty and is dropped instead of racing the read.

use core::cell::RefCell;
use core::ops::Deref;

use crate::console::{CbmemConsole, ConsoleStats};
use crate::error::{CbmemcError, Result};
use crate::sink::ByteSink;

pub struct ConsoleSlot<B> {
    inner: RefCell<Option<CbmemConsole<B>>>,
}

/// Exclusive access to a detached console. Dropping it reattaches.
pub struct Detached<'s, B> {
    slot: &'s ConsoleSlot<B>,
    console: Option<CbmemConsole<B>>,
}

impl<B> Deref for Detached<'_, B> {
    type Target = CbmemConsole<B>;

    fn deref(&self) -> &Self::Target {
        // Only taken in Drop.
        self.console.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl<B> Drop for Detached<'_, B> {
    fn drop(&mut self) {
        if let Some(console) = self.console.take() {
            *self.slot.inner.borrow_mut() = Some(console);
        }
    }
}

impl<B> Default for ConsoleSlot<B> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<B> ConsoleSlot<B> {
    pub const fn empty() -> Self {
        Self {
            inner: RefCell::new(None),
        }
    }

    pub fn new(console: CbmemConsole<B>) -> Self {
        Self {
            inner: RefCell::new(Some(console)),
        }
    }

    pub fn attach(&self, console: CbmemConsole<B>) {
        *self.inner.borrow_mut() = Some(console);
    }

    pub fn clear(&self) -> Option<CbmemConsole<B>> {
        self.inner.borrow_mut().take()
    }

    pub fn is_attached(&self) -> bool {
        self.inner.try_borrow().map(|c| c.is_some()).unwrap_or(false)
    }

    /// Takes the console out of the slot until the guard is dropped.
    /// `None` when nothing is attached or a dump is already in progress.
    pub fn detach(&self) -> Option<Detached<'_, B>> {
        let console = self.inner.try_borrow_mut().ok()?.take()?;
        Some(Detached {
            slot: self,
            console: Some(console),
        })
    }
}

impl<B: AsRef<[u8]>> ConsoleSlot<B> {
    /// Plays back the console through `sink`, oldest byte first.
    pub fn dump<S: ByteSink + ?Sized>(&self, sink: &mut S) -> Result<usize> {
        let console = self.detach().ok_or(CbmemcError::NoConsole)?;
        let emitted = console.dump_to(sink);
        tracing::debug!(emitted, "dumped CBMEM console");
        Ok(emitted)
    }

    pub fn stats(&self) -> Option<ConsoleStats> {
        self.inner.try_borrow().ok()?.as_ref().map(|c| c.stats())
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ConsoleSlot<B> {
    /// Writer entry point. Silently does nothing while detached or empty.
    pub fn put(&self, byte: u8) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            if let Some(console) = inner.as_mut() {
                console.put(byte);
            }
        }
    }
}
