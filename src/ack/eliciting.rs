//! Ack-eliciting classification.

/// Frame tokens that never oblige the peer to acknowledge.
pub const NON_ELICITING_FRAMES: [&str; 2] = ["ack", "padding"];

/// Returns `true` if the comma-joined frame list holds any frame other than ack/padding.
///
/// Tokens are compared verbatim, so `" ack"` is not stripped and counts as eliciting.
pub fn is_ack_eliciting(frame_types: &str) -> bool {
    frame_types
        .split(',')
        .any(|frame| !frame.is_empty() && !NON_ELICITING_FRAMES.contains(&frame))
}

/// OR of [`is_ack_eliciting`] over `packets`; packets without a frame list are skipped.
pub fn any_ack_eliciting<'a, I, F>(packets: I, frame_types_of: F) -> bool
where
    I: IntoIterator<Item = u64>,
    F: Fn(u64) -> Option<&'a str>,
{
    packets
        .into_iter()
        .filter_map(frame_types_of)
        .any(is_ack_eliciting)
}
