use ratatui::style::{Color, Style, Stylize};

use crate::controller::view::RecognitionState;

pub fn dim_unless_focused(is_focused: bool, style: Style) -> Style {
    if is_focused { style.bold() } else { style.dim() }
}

/// Green while recognition runs, red while it does not.
pub fn status_color(state: RecognitionState) -> Color {
    match state {
        RecognitionState::Active => Color::Green,
        RecognitionState::Inactive => Color::Red,
    }
}
