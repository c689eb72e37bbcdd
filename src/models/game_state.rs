use crate::models::dance::Stars;

/// Input that can move the game between screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Confirm,
    Back,
    Next,
    Previous,
    SessionFinished(Stars),
}

/// Top-level screen the game is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    MainMenu,
    DanceSelection { index: usize },
    Playing { dance_index: usize },
    Scoreboard { dance_index: usize, stars: Stars },
}

impl Default for GameState {
    fn default() -> Self {
        Self::MainMenu
    }
}

impl GameState {
    /// Apply an event. Events that mean nothing on the current screen leave it unchanged.
    pub fn on_event(self, event: GameEvent, dance_count: usize) -> Self {
        match (self, event) {
            (Self::MainMenu, GameEvent::Confirm) => Self::DanceSelection { index: 0 },

            (Self::DanceSelection { .. }, GameEvent::Back) => Self::MainMenu,
            (Self::DanceSelection { index }, GameEvent::Next) if dance_count > 0 => {
                Self::DanceSelection {
                    index: (index + 1) % dance_count,
                }
            }
            (Self::DanceSelection { index }, GameEvent::Previous) if dance_count > 0 => {
                Self::DanceSelection {
                    index: (index + dance_count - 1) % dance_count,
                }
            }
            (Self::DanceSelection { index }, GameEvent::Confirm) if index < dance_count => {
                Self::Playing { dance_index: index }
            }

            (Self::Playing { dance_index }, GameEvent::SessionFinished(stars)) => {
                Self::Scoreboard { dance_index, stars }
            }
            (Self::Playing { dance_index }, GameEvent::Back) => {
                Self::DanceSelection { index: dance_index }
            }

            (Self::Scoreboard { dance_index, .. }, GameEvent::Confirm | GameEvent::Back) => {
                Self::DanceSelection { index: dance_index }
            }

            (state, _) => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_round_trip() {
        let state = GameState::default()
            .on_event(GameEvent::Confirm, 3)
            .on_event(GameEvent::Next, 3)
            .on_event(GameEvent::Confirm, 3);
        assert_eq!(state, GameState::Playing { dance_index: 1 });

        let stars = Stars::new(2).unwrap();
        let state = state.on_event(GameEvent::SessionFinished(stars), 3);
        assert_eq!(
            state,
            GameState::Scoreboard {
                dance_index: 1,
                stars
            }
        );

        let state = state.on_event(GameEvent::Confirm, 3);
        assert_eq!(state, GameState::DanceSelection { index: 1 });
    }

    #[test]
    fn test_selection_wraps() {
        let state = GameState::DanceSelection { index: 0 }.on_event(GameEvent::Previous, 3);
        assert_eq!(state, GameState::DanceSelection { index: 2 });
    }

    #[test]
    fn test_cannot_play_without_dances() {
        let state = GameState::DanceSelection { index: 0 }.on_event(GameEvent::Confirm, 0);
        assert_eq!(state, GameState::DanceSelection { index: 0 });
    }

    #[test]
    fn test_unrelated_event_is_ignored() {
        let state = GameState::MainMenu.on_event(GameEvent::Next, 3);
        assert_eq!(state, GameState::MainMenu);
    }
}
