//! Terminal palette
//!
//! Call listings color the caller, the callee and the kind of call site;
//! status lines share the remaining styles.

use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// `UCE_COLOR=always|never|auto`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn from_env() -> Self {
        let value = std::env::var("UCE_COLOR").ok();
        Self::parse(value.as_deref(), std::env::var_os("NO_COLOR").is_some())
    }

    /// An explicit `UCE_COLOR` beats `NO_COLOR`
    fn parse(value: Option<&str>, no_color: bool) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("always") => ColorChoice::Always,
            Some("never") => ColorChoice::Never,
            _ if no_color => ColorChoice::Never,
            _ => ColorChoice::Auto,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub info: Style,
    pub label: Style,
    pub muted: Style,
    pub caller: Style,
    pub callee: Style,
    pub constructor: Style,
    pub awaited: Style,
}

impl Theme {
    pub fn detect() -> Self {
        match ColorChoice::from_env() {
            ColorChoice::Always => Self::colored(),
            ColorChoice::Never => Self::plain(),
            ColorChoice::Auto if console::Term::stdout().is_term() => Self::colored(),
            ColorChoice::Auto => Self::plain(),
        }
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().bright_cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warn: Style::new().yellow().bold(),
            info: Style::new().bright_blue(),
            label: Style::new().bright_black(),
            muted: Style::new().white().dimmed(),
            caller: Style::new().bright_magenta().bold(),
            callee: Style::new().bright_white(),
            constructor: Style::new().bright_green(),
            awaited: Style::new().bright_yellow().italic(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            warn: Style::new(),
            info: Style::new(),
            label: Style::new(),
            muted: Style::new(),
            caller: Style::new(),
            callee: Style::new(),
            constructor: Style::new(),
            awaited: Style::new(),
        }
    }

    /// Callee style for one call site
    pub fn call_site(&self, constructor: bool, awaited: bool) -> Style {
        if constructor {
            self.constructor.clone()
        } else if awaited {
            self.awaited.clone()
        } else {
            self.callee.clone()
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use owo_colors::OwoColorize;

    #[test]
    fn test_color_choice() {
        assert_eq!(ColorChoice::parse(None, false), ColorChoice::Auto);
        assert_eq!(ColorChoice::parse(None, true), ColorChoice::Never);
        assert_eq!(ColorChoice::parse(Some("Always"), true), ColorChoice::Always);
        assert_eq!(ColorChoice::parse(Some("never"), false), ColorChoice::Never);
        assert_eq!(ColorChoice::parse(Some("sometimes"), false), ColorChoice::Auto);
    }

    #[test]
    fn test_plain_theme_has_no_escapes() {
        let theme = Theme::plain();
        assert_eq!("Repo".style(theme.call_site(true, false)).to_string(), "Repo");
        assert_eq!("main".style(theme.caller.clone()).to_string(), "main");
    }

    #[test]
    fn test_call_site_styles_differ_when_colored() {
        let theme = Theme::colored();
        let plain = "f".style(theme.call_site(false, false)).to_string();
        let ctor = "f".style(theme.call_site(true, false)).to_string();
        let awaited = "f".style(theme.call_site(false, true)).to_string();
        assert_ne!(plain, ctor);
        assert_ne!(plain, awaited);
        assert!(ctor.contains('f'));
    }
}
