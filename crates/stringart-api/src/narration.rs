//! Narration through an external speech command such as `espeak-ng`.

use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};

use stringart_core::speech::{Narrator, NarratorFactory};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// A speech program and its leading arguments, e.g. `espeak-ng -v es`.
///
/// As a [`NarratorFactory`] it gives every session its own
/// [`CommandNarrator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechCommand {
    program: String,
    args: Vec<String>,
}

impl SpeechCommand {
    /// Parses a whitespace-separated command line. Returns `None` if it is
    /// blank.
    #[must_use]
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_owned);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl NarratorFactory for SpeechCommand {
    fn create(&self) -> Arc<dyn Narrator> {
        Arc::new(CommandNarrator::new(self.clone()))
    }
}

/// Speaks each utterance by running a [`SpeechCommand`] with the text as
/// its last argument. At most one utterance plays at a time.
#[derive(Debug)]
pub struct CommandNarrator {
    command: SpeechCommand,
    current: Mutex<Option<Child>>,
}

impl CommandNarrator {
    #[must_use]
    pub fn new(command: SpeechCommand) -> Self {
        Self {
            command,
            current: Mutex::new(None),
        }
    }

    fn stop_current(current: &mut Option<Child>) {
        if let Some(mut child) = current.take() {
            if let Err(e) = child.start_kill() {
                debug!(error = %e, "speech process already gone");
            }
        }
    }
}

impl Narrator for CommandNarrator {
    fn speak(&self, utterance: &str) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        Self::stop_current(&mut current);

        let spawned = Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(utterance)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();
        match spawned {
            Ok(child) => *current = Some(child),
            Err(e) => warn!(
                program = %self.command.program,
                error = %e,
                "speech command failed to start"
            ),
        }
    }

    fn cancel(&self) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        Self::stop_current(&mut current);
    }
}
