//! Operator-facing admin surface.
//!
//! [`AdminMenu`] reads operator input from any [`BufRead`] and writes to any
//! [`Write`], so the interactive flows can be driven by a scripted input in
//! tests. Every action funnels through [`AdminMenu::dispatch`].

mod command;


pub use command::{AdminCommand, MenuChoice};

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::database::{EndpointEntry, EntryStore, StoreError};
use crate::monitoring::{MonitorLoop, MonitorOutcome};
use command::{MENU_TEXT, is_back, parse_index};

/// Result of one dispatched command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    /// The operator's input was refused (duplicate, bad position, ...)
    Rejected,
    Exit,
}

pub struct AdminMenu<R, W> {
    store: EntryStore,
    monitor: MonitorLoop,
    input: R,
    output: W,
    interrupt: Box<dyn Fn() -> CancellationToken>,
    /// Monitoring sessions run so far
    sessions: usize,
}

impl<R: BufRead, W: Write> AdminMenu<R, W> {
    pub fn new(store: EntryStore, monitor: MonitorLoop, input: R, output: W) -> Self {
        Self { store, monitor, input, output, interrupt: Box::new(ctrl_c_token), sessions: 0 }
    }

    /// Replace the source of the token that stops a monitoring session
    pub fn with_interrupt(mut self, interrupt: impl Fn() -> CancellationToken + 'static) -> Self {
        self.interrupt = Box::new(interrupt);
        self
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Interactive loop; returns when the operator exits or input ends
    pub async fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "{MENU_TEXT}")?;
            let Some(choice) = self.prompt("Choose an option: ")? else {
                return Ok(());
            };

            let outcome = match MenuChoice::parse(&choice) {
                Some(MenuChoice::View) => self.dispatch(AdminCommand::View).await?,
                Some(MenuChoice::Add) => self.add_flow()?,
                Some(MenuChoice::Delete) => self.delete_flow()?,
                Some(MenuChoice::StartMonitoring) => {
                    let sessions = self.sessions;
                    let outcome = self.dispatch(AdminCommand::StartMonitoring).await?;
                    if self.sessions > sessions {
                        // The Ctrl+C listener stays registered for the rest of the process
                        writeln!(self.output, "Use option 5 to exit.")?;
                    }
                    outcome
                }
                Some(MenuChoice::Exit) => self.dispatch(AdminCommand::Exit).await?,
                None => {
                    writeln!(self.output, "Invalid choice.")?;
                    Outcome::Continue
                }
            };

            if outcome == Outcome::Exit {
                return Ok(());
            }
        }
    }

    /// Execute one command.
    ///
    /// Operator mistakes are reported on the output and yield
    /// [`Outcome::Rejected`]; anything else, including a corrupt store, is
    /// returned as an error.
    pub async fn dispatch(&mut self, command: AdminCommand) -> Result<Outcome> {
        debug!(?command, "Dispatching admin command");
        match command {
            AdminCommand::View => self.view(),
            AdminCommand::Add { identifier, label } => self.add(&identifier, &label),
            AdminCommand::Delete { index } => self.delete(index),
            AdminCommand::StartMonitoring => self.start_monitoring().await,
            AdminCommand::Exit => Ok(Outcome::Exit),
        }
    }

    fn load(&self) -> Result<Vec<EndpointEntry>> {
        self.store
            .load()
            .with_context(|| format!("failed to load entries from {}", self.store.path().display()))
    }

    fn view(&mut self) -> Result<Outcome> {
        let entries = self.load()?;
        self.print_entries(&entries)?;
        Ok(Outcome::Continue)
    }

    fn print_entries(&mut self, entries: &[EndpointEntry]) -> io::Result<()> {
        if entries.is_empty() {
            return writeln!(self.output, "No entries stored.");
        }

        writeln!(self.output, "\nStored Entries:")?;
        for (position, entry) in entries.iter().enumerate() {
            writeln!(self.output, "{}. {}", position + 1, entry)?;
        }
        Ok(())
    }

    fn add(&mut self, identifier: &str, label: &str) -> Result<Outcome> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            writeln!(self.output, "IP address cannot be empty.")?;
            return Ok(Outcome::Rejected);
        }

        match self.store.add(identifier, label.trim()) {
            Ok(entry) => {
                writeln!(self.output, "{} ({}) added.", entry.identifier, entry.label)?;
                Ok(Outcome::Continue)
            }
            Err(StoreError::DuplicateEntry { .. }) => {
                writeln!(self.output, "IP already exists.")?;
                Ok(Outcome::Rejected)
            }
            Err(e) => Err(e).context("failed to add entry"),
        }
    }

    fn delete(&mut self, index: usize) -> Result<Outcome> {
        match self.store.remove(index) {
            Ok(removed) => {
                writeln!(self.output, "Removed {removed}")?;
                Ok(Outcome::Continue)
            }
            Err(StoreError::OutOfRange { .. }) => {
                writeln!(self.output, "Invalid selection.")?;
                Ok(Outcome::Rejected)
            }
            Err(e) => Err(e).context("failed to delete entry"),
        }
    }

    async fn start_monitoring(&mut self) -> Result<Outcome> {
        let entries = self.load()?;
        if entries.is_empty() {
            writeln!(self.output, "No entries to monitor. Please add IPs in admin panel first.")?;
            return Ok(Outcome::Continue);
        }

        writeln!(self.output, "\nStarting monitoring. Press Ctrl+C to stop.")?;
        self.output.flush()?;

        self.sessions += 1;
        let cancel = (self.interrupt)();
        let output = &mut self.output;
        let outcome = self
            .monitor
            .run_with(&entries, &cancel, |event| {
                // Echo failures must not stop the session
                let _ = writeln!(output, "{}", event.body()).and_then(|()| output.flush());
            })
            .await;
        // Releases the interrupt listener when the session ended on its own
        cancel.cancel();

        if let MonitorOutcome::Stopped(report) = outcome {
            debug!(?report, "Monitoring session finished");
        }
        writeln!(self.output, "\nMonitoring stopped.")?;
        Ok(Outcome::Continue)
    }

    fn add_flow(&mut self) -> Result<Outcome> {
        loop {
            writeln!(self.output, "\n--- Add IP Entry (type 'b' to go back) ---")?;
            let Some(identifier) = self.prompt("Enter IP address to monitor: ")? else {
                return Ok(Outcome::Continue);
            };
            if is_back(&identifier) {
                return Ok(Outcome::Continue);
            }
            if identifier.is_empty() {
                writeln!(self.output, "IP address cannot be empty.")?;
                continue;
            }

            let Some(label) = self.prompt("Enter machine name: ")? else {
                return Ok(Outcome::Continue);
            };
            if is_back(&label) {
                return Ok(Outcome::Continue);
            }

            match self.add(&identifier, &label)? {
                Outcome::Rejected => continue,
                outcome => return Ok(outcome),
            }
        }
    }

    fn delete_flow(&mut self) -> Result<Outcome> {
        loop {
            let entries = self.load()?;
            if entries.is_empty() {
                writeln!(self.output, "No entries to delete.")?;
                return Ok(Outcome::Continue);
            }

            self.print_entries(&entries)?;
            writeln!(self.output, "Enter entry number to delete or 'b' to go back.")?;
            let Some(choice) = self.prompt("Your choice: ")? else {
                return Ok(Outcome::Continue);
            };
            if is_back(&choice) {
                return Ok(Outcome::Continue);
            }

            let Some(index) = parse_index(&choice) else {
                writeln!(self.output, "Invalid input.")?;
                continue;
            };
            match self.delete(index)? {
                Outcome::Rejected => continue,
                outcome => return Ok(outcome),
            }
        }
    }

    /// Print `message` and read one trimmed line; `None` at end of input
    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.output, "{message}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Token cancelled by the next Ctrl+C, or by the caller once the session
/// it guards is over
pub fn ctrl_c_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => trigger.cancel(),
                Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
            },
            _ = trigger.cancelled() => {}
        }
    });
    cancel
}
