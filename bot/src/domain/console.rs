//! Remote console invocation and the output it produces.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use secrecy::SecretString;
use spotcraft_common::JobStatus;

/// ESC followed by a single Fp or Fe byte (`ESC 7`, `ESC M`, ...), or a full
/// CSI sequence. `[` is left to the CSI branch.
static CONTROL_SEQUENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"\x1B(?:[0-Z\\-_]|\[[0-?]*[ -/]*[@-~])").expect("valid regex")
});

/// One console command as discrete fields. The adapter decides how to
/// transport it; the caller's text is always a single opaque argument.
#[derive(Debug, Clone)]
pub struct ConsoleInvocation {
    pub binary: String,
    pub host: String,
    pub password: SecretString,
    pub argument: String,
}

/// Status plus raw stdout of one remote job poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub status: JobStatus,
    pub stdout: String,
}

/// Terminal result of a console command. `output` is already normalised.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CommandOutput {
    pub command: String,
    pub job_id: String,
    pub status: JobStatus,
    pub output: String,
}

impl CommandOutput {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status == JobStatus::Success
    }
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Command `{}` executed. Status: `{}`\nOutput:```{}```",
            self.command, self.status, self.output
        )
    }
}

/// Removes terminal control sequences, leaving every other byte untouched.
///
/// Repeats until no sequence is left so that an ESC exposed by a removal
/// is stripped too; the result is always a fixed point.
#[must_use]
pub fn strip_control_sequences(text: &str) -> String {
    let mut out = CONTROL_SEQUENCE_RE.replace_all(text, "").into_owned();
    while CONTROL_SEQUENCE_RE.is_match(&out) {
        out = CONTROL_SEQUENCE_RE.replace_all(&out, "").into_owned();
    }
    out
}
