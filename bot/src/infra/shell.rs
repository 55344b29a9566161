//! Rendering a `ConsoleInvocation` into the single shell line a run-script
//! job executes.

use secrecy::ExposeSecret;

use crate::domain::ConsoleInvocation;

/// POSIX single-quote `input`; the result is always exactly one shell word.
#[must_use]
pub fn shell_quote(input: &str) -> String {
    let mut result = String::with_capacity(input.len() + 2);
    result.push('\'');
    for ch in input.chars() {
        if ch == '\'' {
            result.push_str("'\\''");
        } else {
            result.push(ch);
        }
    }
    result.push('\'');
    result
}

/// `'<binary>' -H '<host>' -p '<password>' '<argument>'`, every field quoted.
///
/// The returned string contains the password and must never be logged.
#[must_use]
pub fn render_invocation(invocation: &ConsoleInvocation) -> String {
    format!(
        "{} -H {} -p {} {}",
        shell_quote(&invocation.binary),
        shell_quote(&invocation.host),
        shell_quote(invocation.password.expose_secret()),
        shell_quote(&invocation.argument),
    )
}
