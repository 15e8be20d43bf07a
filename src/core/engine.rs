use crate::core::command::{parse_line, Command};
use crate::domain::model::{display_payload, Payload, PortRecord};
use crate::domain::ports::PortTable;
use crate::utils::error::{RegistryError, Result};
use std::fmt;

/// What a successfully executed command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Created(PortRecord),
    Deleted { port: i64 },
    Status { port: i64, is_open: bool },
    Sent { port: i64, payload: Payload },
    Received { port: i64, payload: Payload },
    /// Formatted listing destined for the diagnostic stream.
    Listed(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created(record) => {
                write!(f, "created port {} ({})", record.port(), record.protocol())
            }
            Outcome::Deleted { port } => write!(f, "deleted port {}", port),
            Outcome::Status { port, is_open } => write!(f, "port {} open={}", port, is_open),
            Outcome::Sent { port, payload } => {
                write!(f, "sent to port {}: {}", port, display_payload(payload))
            }
            Outcome::Received { port, payload } => {
                write!(f, "received from port {}: {}", port, display_payload(payload))
            }
            Outcome::Listed(text) => write!(f, "{}", text.trim_end()),
        }
    }
}

/// Result of one non-empty script line.
#[derive(Debug)]
pub struct StepReport {
    pub line: usize,
    pub result: Result<Outcome>,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub executed: usize,
    pub failed: usize,
    pub steps: Vec<StepReport>,
    /// The failing step that stopped a fail-fast run.
    pub aborted: Option<StepReport>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.executed - self.failed
    }

    /// Most severe failure recorded during the run, if any.
    pub fn worst_error(&self) -> Option<&RegistryError> {
        self.steps
            .iter()
            .chain(self.aborted.iter())
            .filter_map(|step| step.result.as_ref().err())
            .max_by_key(|err| err.severity())
    }
}

pub struct CommandEngine<T: PortTable> {
    table: T,
    fail_fast: bool,
}

impl<T: PortTable> CommandEngine<T> {
    pub fn new(table: T) -> Self {
        Self {
            table,
            fail_fast: false,
        }
    }

    pub fn with_fail_fast(table: T, fail_fast: bool) -> Self {
        Self { table, fail_fast }
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn into_table(self) -> T {
        self.table
    }

    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        tracing::debug!("Executing `{}`", command);

        match command {
            Command::Create { port, protocol } => {
                let record = self.table.create(port, &protocol)?;
                Ok(Outcome::Created(record.clone()))
            }
            Command::Delete { port } => {
                self.table.delete(port)?;
                Ok(Outcome::Deleted { port })
            }
            Command::SetOpen { port, status } => {
                let is_open = self.table.set_open(port, status)?;
                Ok(Outcome::Status { port, is_open })
            }
            Command::Send { port, data } => {
                let payload = self.table.send(port, data)?.clone();
                Ok(Outcome::Sent { port, payload })
            }
            Command::Receive { port } => {
                let payload = self.table.receive(port)?.clone();
                Ok(Outcome::Received { port, payload })
            }
            Command::List => {
                let mut buf = Vec::new();
                self.table.list_to(&mut buf)?;
                Ok(Outcome::Listed(String::from_utf8_lossy(&buf).into_owned()))
            }
        }
    }

    /// Runs every line of `script`. Failures are logged and recorded; in
    /// fail-fast mode the first failure ends the run and lands in `aborted`,
    /// with the steps before it kept.
    pub fn run_script(&mut self, script: &str) -> RunSummary {
        tracing::info!("Running registry script");
        let mut summary = RunSummary::default();

        for (idx, line) in script.lines().enumerate() {
            let line_no = idx + 1;
            let result = match parse_line(line_no, line) {
                Ok(Some(command)) => self.execute(command),
                Ok(None) => continue,
                Err(e) => Err(e),
            };

            summary.executed += 1;
            if let Err(e) = &result {
                summary.failed += 1;
                tracing::warn!("Line {} rejected: {}", line_no, e);
            }

            let step = StepReport {
                line: line_no,
                result,
            };
            if self.fail_fast && step.result.is_err() {
                summary.aborted = Some(step);
                break;
            }
            summary.steps.push(step);
        }

        tracing::info!(
            "Script finished: {} command(s), {} failed",
            summary.executed,
            summary.failed
        );
        summary
    }
}
