//! Chat reply shaping.

use std::borrow::Cow;

/// Maximum characters the chat platform accepts in one message.
pub const MESSAGE_LIMIT: usize = 2000;

const ELLIPSIS: char = '…';
const FENCE: &str = "```";

/// Cut `text` to at most `limit` characters (`limit` ≥ 4), marking the cut
/// with `…` and closing a code block the cut left open.
#[must_use]
pub fn truncate_reply(text: &str, limit: usize) -> Cow<'_, str> {
    if text.chars().count() <= limit {
        return Cow::Borrowed(text);
    }

    let keep = limit.saturating_sub(1 + FENCE.len());
    let cut = text.char_indices().nth(keep).map_or(text.len(), |(i, _)| i);
    let mut out = text[..cut].trim_end_matches('`').to_string();
    let open_block = out.matches(FENCE).count() % 2 == 1;

    out.push(ELLIPSIS);
    if open_block {
        out.push_str(FENCE);
    }
    Cow::Owned(out)
}
