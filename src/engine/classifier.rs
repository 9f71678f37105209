/// Markers of a message the upstream channel is still updating.
pub const TEMPORARY_MARKERS: [&str; 4] = ["⏰", "▶", "🕐", "➡️"];
/// Markers of a finalized message.
pub const COMPLETION_MARKERS: [&str; 2] = ["✅", "🔰"];
/// Marker required before a message may verify predictions.
pub const SUCCESS_MARKER: &str = "✅";
/// Round played without a contest.
pub const NO_CONTEST_MARKER: &str = "#X";
/// Round voided upstream.
pub const VOID_MARKERS: [&str; 2] = ["#R", "🔰"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Temporary,
    Final,
    Ordinary,
}

pub fn has_temporary_marker(text: &str) -> bool {
    TEMPORARY_MARKERS.iter().any(|m| text.contains(m))
}

pub fn has_completion_marker(text: &str) -> bool {
    COMPLETION_MARKERS.iter().any(|m| text.contains(m))
}

pub fn has_success_marker(text: &str) -> bool {
    text.contains(SUCCESS_MARKER)
}

/// Final wins over temporary when both are present.
pub fn classify(text: &str) -> MessageKind {
    if has_completion_marker(text) {
        MessageKind::Final
    } else if has_temporary_marker(text) {
        MessageKind::Temporary
    } else {
        MessageKind::Ordinary
    }
}

/// The skip token found in `text`, if any.
pub fn skip_marker(text: &str) -> Option<&'static str> {
    std::iter::once(NO_CONTEST_MARKER)
        .chain(VOID_MARKERS)
        .find(|m| text.contains(m))
}
