// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Activation, deactivation and the `cbmemc` command.

use alloc::boxed::Box;
use alloc::rc::Rc;

use crate::config::{CBMEMC_NAME, CBMEMC_SUMMARY};
use crate::error::Result;
use crate::lbio::TableSource;
use crate::locator::{find_console, ConsoleMapper};
use crate::sink::ByteSink;
use crate::slot::ConsoleSlot;
use crate::term::{CbmemTerm, TermOutput, Vt100Term};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CommandId(pub u32);

/// Host side registry of output devices.
pub trait TerminalRegistry {
    fn register_output(&mut self, term: Box<dyn TermOutput>);
    fn unregister_output(&mut self, name: &str);
}

/// Host side registry of commands.
pub trait CommandRegistry {
    fn register_command(&mut self, name: &'static str, summary: &'static str) -> CommandId;
    fn unregister_command(&mut self, id: CommandId);
}

pub struct CbmemcModule<B> {
    slot: Rc<ConsoleSlot<B>>,
    command: CommandId,
    terminal: bool,
}

impl<B> CbmemcModule<B>
where
    B: AsRef<[u8]> + AsMut<[u8]> + 'static,
{
    /// Locates the console, registers the `cbmemc` terminal when one was
    /// found and registers the `cbmemc` command in every case.
    pub fn init<T, M, R, C>(table: &mut T, mapper: &mut M, terms: &mut R, cmds: &mut C) -> Self
    where
        T: TableSource + ?Sized,
        M: ConsoleMapper<Backing = B> + ?Sized,
        R: TerminalRegistry + ?Sized,
        C: CommandRegistry + ?Sized,
    {
        let slot = Rc::new(ConsoleSlot::empty());
        let mut terminal = false;

        if let Some(console) = find_console(table, mapper) {
            slot.attach(console);
            let term = Vt100Term::new(CBMEMC_NAME, CbmemTerm::new(Rc::clone(&slot)));
            terms.register_output(Box::new(term));
            terminal = true;
        } else {
            tracing::info!("no CBMEM console, terminal not registered");
        }

        let command = cmds.register_command(CBMEMC_NAME, CBMEMC_SUMMARY);
        Self {
            slot,
            command,
            terminal,
        }
    }

    /// The `cbmemc` command: plays the console back through `sink`.
    pub fn run_command<S: ByteSink + ?Sized>(&self, sink: &mut S) -> Result<usize> {
        self.slot.dump(sink)
    }

    pub fn slot(&self) -> &Rc<ConsoleSlot<B>> {
        &self.slot
    }

    pub fn has_terminal(&self) -> bool {
        self.terminal
    }

    pub fn command(&self) -> CommandId {
        self.command
    }

    /// Unregisters both surfaces and drops the console handle.
    pub fn fini<R, C>(self, terms: &mut R, cmds: &mut C)
    where
        R: TerminalRegistry + ?Sized,
        C: CommandRegistry + ?Sized,
    {
        terms.unregister_output(CBMEMC_NAME);
        cmds.unregister_command(self.command);
        self.slot.clear();
    }
}
