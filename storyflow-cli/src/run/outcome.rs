//! Lines printed on stdout after a successful run.

use storyflow::{Operation, StoryState};

/// Ids first, then the produced texts separated by `---`.
///
/// An interactive session already said its texts to the player, so only the
/// ids are returned for it.
pub fn outcome_lines(operation: Operation, state: &StoryState) -> Vec<String> {
    let mut lines = Vec::new();
    let ids = [
        ("world_id", &state.world_id),
        ("character_id", &state.character_id),
    ];
    for (key, value) in ids {
        if let Some(v) = value {
            lines.push(format!("{}: {}", key, v));
        }
    }
    if operation.is_interactive() {
        return lines;
    }
    let texts = [
        &state.world_summary,
        &state.ai_question,
        &state.immediate_events,
    ];
    for text in texts.into_iter().flatten() {
        lines.push(format!("---\n{}", text));
    }
    lines
}
