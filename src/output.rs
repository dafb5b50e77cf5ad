//! Console rendering - banner, environment diagnostics and the error panel.

use crate::env::DotenvStatus;
use colored::Colorize;
use std::io::IsTerminal;

/// Interior width of the banner frame.
pub const BANNER_WIDTH: usize = 60;

/// Text width of a row inside the error panel.
pub const PANEL_TEXT_WIDTH: usize = 63;

const BANNER_TITLE: &str = "MCP Proxy Server";
const PANEL_HEADLINE: &str = "Failed to start server:";

/// Renders human-readable launcher output, with or without ANSI colors.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    color_enabled: bool,
}

impl Console {
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Color for stdout when it is a terminal (honors `NO_COLOR`/`CLICOLOR`).
    pub fn stdout() -> Self {
        Self::for_terminal(std::io::stdout().is_terminal())
    }

    /// Color for stderr when it is a terminal (honors `NO_COLOR`/`CLICOLOR`).
    pub fn stderr() -> Self {
        Self::for_terminal(std::io::stderr().is_terminal())
    }

    fn for_terminal(is_terminal: bool) -> Self {
        Self::new(is_terminal && colored::control::SHOULD_COLORIZE.should_colorize())
    }

    /// The startup banner.
    pub fn banner(&self, version: &str) -> String {
        let version = format!("v{}", version.trim_start_matches('v'));
        let left = 15;
        let right = 3;
        let gap = BANNER_WIDTH
            .saturating_sub(left + right + BANNER_TITLE.chars().count() + version.chars().count())
            .max(1);

        let rule = "─".repeat(BANNER_WIDTH);
        let top = self.paint(&format!("┌{}┐", rule), Style::Frame);
        let bottom = self.paint(&format!("└{}┘", rule), Style::Frame);
        let side = self.paint("│", Style::Frame);

        format!(
            "\n{top}\n{side}{}{}{}{}{}{side}\n{bottom}\n",
            " ".repeat(left),
            self.paint(BANNER_TITLE, Style::Title),
            " ".repeat(gap),
            self.paint(&version, Style::Dim),
            " ".repeat(right),
        )
    }

    /// Where the launcher looked for its `.env` file.
    pub fn env_debug(&self, status: &DotenvStatus) -> String {
        let rule = self.paint(&"─".repeat(BANNER_WIDTH), Style::Rule);
        let found = if status.found {
            format!("yes ({} variables loaded)", status.loaded)
        } else {
            "no".to_string()
        };

        format!(
            "\n{}\n{rule}\n{} {}\n{} {}\n{rule}",
            self.paint("Environment Debug Info:", Style::Frame),
            self.paint("Looking for .env at:", Style::Label),
            status.path.display(),
            self.paint("Found:", Style::Label),
            found,
        )
    }

    /// Boxed panel for a startup failure. The message stays on one row:
    /// shorter text is padded to the frame, longer text runs past it.
    pub fn error_panel(&self, message: &str) -> String {
        // "║ " + text + " ║"
        let inner = PANEL_TEXT_WIDTH + 2;
        let title = "═ Error ";
        let top = format!(
            "╔{}{}╗",
            title,
            "═".repeat(inner - title.chars().count())
        );
        let bottom = format!("╚{}╝", "═".repeat(inner));

        [
            String::new(),
            self.paint(&top, Style::Error),
            self.panel_row(PANEL_HEADLINE, Style::Label),
            self.panel_row(message, Style::Message),
            self.paint(&bottom, Style::Error),
        ]
        .join("\n")
    }

    fn panel_row(&self, text: &str, style: Style) -> String {
        let pad = PANEL_TEXT_WIDTH.saturating_sub(text.chars().count());
        format!(
            "{}{}{}{}",
            self.paint("║ ", Style::Error),
            self.paint(text, style),
            " ".repeat(pad),
            self.paint(" ║", Style::Error),
        )
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match style {
            Style::Frame => text.cyan().to_string(),
            Style::Title => text.bold().to_string(),
            Style::Dim => text.dimmed().to_string(),
            Style::Rule => text.bright_black().to_string(),
            Style::Label => text.yellow().to_string(),
            Style::Error => text.red().to_string(),
            Style::Message => text.white().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Style {
    Frame,
    Title,
    Dim,
    Rule,
    Label,
    Error,
    Message,
}
