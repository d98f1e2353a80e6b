use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Styles for each kind of terminal message
#[derive(Debug, Clone)]
pub struct Theme {
    pub heading: Style,
    pub ok: Style,
    pub caution: Style,
    pub label: Style,
    colored: bool,
}

impl Theme {
    pub fn new(colored: bool) -> Self {
        let pick = |style: Style| if colored { style } else { Style::new() };
        Self {
            heading: pick(Style::new().cyan().bold()),
            ok: pick(Style::new().green().bold()),
            caution: pick(Style::new().yellow().bold()),
            label: pick(Style::new().white().dimmed()),
            colored,
        }
    }

    pub fn detect() -> Self {
        Self::new(wants_color(
            std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()),
            console::Term::stdout().is_term(),
        ))
    }

    pub fn is_colored(&self) -> bool {
        self.colored
    }
}

// NO_COLOR wins over a terminal
fn wants_color(no_color: bool, is_term: bool) -> bool {
    !no_color && is_term
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
