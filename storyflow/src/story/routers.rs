//! Routers for the story graphs. Each reads state and returns an edge label.

use crate::state::{ActiveStep, StoryState};

/// Edge labels returned by the story routers.
pub mod labels {
    pub const VALID: &str = "valid";
    pub const INVALID: &str = "invalid";
    pub const MUST_RESTART_INIT: &str = "must_restart_init";
    pub const MUST_RESTART_CHARACTER: &str = "must_restart_character";
    pub const MUST_CONFIGURE: &str = "must_configure";
    pub const EXISTS: &str = "exists";
    pub const FROM_WORLD: &str = "from_world";
    pub const FROM_LORE: &str = "from_lore";
    pub const FROM_CHARACTER: &str = "from_character";
    pub const CONTINUE: &str = "continue";
    pub const END: &str = "end";
}

/// `valid` when `user_input` is non-blank.
pub fn input_validity(state: &StoryState) -> String {
    let label = if StoryState::non_blank(&state.user_input).is_some() {
        labels::VALID
    } else {
        labels::INVALID
    };
    label.to_string()
}

/// After `check_world_exists`: restart, configure a new world, or use the existing one.
pub fn route_world_creation(state: &StoryState) -> String {
    let label = if state.must_restart_init.unwrap_or(false) {
        labels::MUST_RESTART_INIT
    } else if state.create_new_world.unwrap_or(false) {
        labels::MUST_CONFIGURE
    } else {
        labels::EXISTS
    };
    label.to_string()
}

/// After `check_character_exists`: restart, configure a new character, or play the existing one.
pub fn route_character_creation(state: &StoryState) -> String {
    let label = if state.must_restart_character.unwrap_or(false) {
        labels::MUST_RESTART_CHARACTER
    } else if state.create_new_character.unwrap_or(false) {
        labels::MUST_CONFIGURE
    } else {
        labels::EXISTS
    };
    label.to_string()
}

/// After `save_documents`: which generation produced what was saved.
pub fn route_after_saving(state: &StoryState) -> String {
    let label = match state.active_step {
        Some(ActiveStep::WorldCreation) => labels::FROM_WORLD,
        Some(ActiveStep::CharacterCreation) => labels::FROM_CHARACTER,
        _ => labels::FROM_LORE,
    };
    label.to_string()
}

/// Router over a question list of length `total`: `continue` until every question is answered.
pub fn questions_remaining(total: usize) -> impl Fn(&StoryState) -> String + Send + Sync {
    move |state: &StoryState| {
        let label = if state.question_index.unwrap_or(0) >= total {
            labels::END
        } else {
            labels::CONTINUE
        };
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_validity_labels() {
        let mut s = StoryState::default();
        assert_eq!(input_validity(&s), labels::INVALID);
        s.user_input = Some("  ".into());
        assert_eq!(input_validity(&s), labels::INVALID);
        s.user_input = Some("eldoria".into());
        assert_eq!(input_validity(&s), labels::VALID);
    }

    /// **Scenario**: Restart wins over configure; no flags means the entity exists.
    #[test]
    fn world_creation_priority() {
        let mut s = StoryState::default();
        assert_eq!(route_world_creation(&s), labels::EXISTS);
        s.create_new_world = Some(true);
        assert_eq!(route_world_creation(&s), labels::MUST_CONFIGURE);
        s.must_restart_init = Some(true);
        assert_eq!(route_world_creation(&s), labels::MUST_RESTART_INIT);
    }

    #[test]
    fn character_creation_priority() {
        let mut s = StoryState::default();
        assert_eq!(route_character_creation(&s), labels::EXISTS);
        s.create_new_character = Some(true);
        assert_eq!(route_character_creation(&s), labels::MUST_CONFIGURE);
        s.must_restart_character = Some(true);
        assert_eq!(route_character_creation(&s), labels::MUST_RESTART_CHARACTER);
    }

    #[test]
    fn after_saving_follows_active_step() {
        let mut s = StoryState::default();
        assert_eq!(route_after_saving(&s), labels::FROM_LORE);
        s.active_step = Some(ActiveStep::WorldCreation);
        assert_eq!(route_after_saving(&s), labels::FROM_WORLD);
        s.active_step = Some(ActiveStep::CharacterCreation);
        assert_eq!(route_after_saving(&s), labels::FROM_CHARACTER);
        s.active_step = Some(ActiveStep::LoreGeneration);
        assert_eq!(route_after_saving(&s), labels::FROM_LORE);
    }

    #[test]
    fn questions_remaining_counts_index() {
        let route = questions_remaining(2);
        let mut s = StoryState::default();
        assert_eq!(route(&s), labels::CONTINUE);
        s.question_index = Some(2);
        assert_eq!(route(&s), labels::END);
    }
}
