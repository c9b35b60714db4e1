use std::io::IsTerminal;

use anstyle::{AnsiColor, Effects, Style};
use clap::ValueEnum;
use envsync_graph::PrunePlan;
use indicatif::HumanCount;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct TerminalRenderer {
    style: OutputStyle,
}

impl TerminalRenderer {
    pub(crate) fn from_style(style: OutputStyle) -> Self {
        Self { style }
    }

    pub(crate) fn print_status(self, status: &str, message: &str) {
        println!("{}", render_status_line(self.style, status, message));
    }

    pub(crate) fn print_section(self, title: &str) {
        if self.style == OutputStyle::Rich {
            println!();
            println!("{}", colorize(section_style(), &format!("== {title} ==")));
        }
    }

    pub(crate) fn print_lines(self, lines: &[String]) {
        for line in lines {
            println!("{line}");
        }
    }
}

pub(crate) fn resolve_output_style(
    choice: ColorChoice,
    no_color_env: bool,
    stdout_is_terminal: bool,
) -> OutputStyle {
    match choice {
        ColorChoice::Always => OutputStyle::Rich,
        ColorChoice::Never => OutputStyle::Plain,
        ColorChoice::Auto if no_color_env || !stdout_is_terminal => OutputStyle::Plain,
        ColorChoice::Auto => OutputStyle::Rich,
    }
}

pub(crate) fn current_output_style(choice: ColorChoice) -> OutputStyle {
    let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());
    resolve_output_style(choice, no_color_env, std::io::stdout().is_terminal())
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => format!("{status}: {message}"),
        OutputStyle::Rich => format!(
            "{} {message}",
            colorize(status_style(status), &format!("{status:>10}"))
        ),
    }
}

/// Lines describing what a prune will remove, roots of removal first.
pub(crate) fn format_prune_plan_lines(plan: &PrunePlan) -> Vec<String> {
    if plan.is_empty() {
        return vec!["Nothing to remove".to_string()];
    }

    vec![
        format!("Roots of removal: {}", plan.removal_roots.join(" ")),
        format!(
            "Removing {} package(s) no longer required ({} kept)",
            HumanCount(plan.removal.len() as u64),
            HumanCount(plan.kept.len() as u64)
        ),
    ]
}

fn status_style(status: &str) -> Style {
    let color = match status {
        "error" => AnsiColor::BrightRed,
        "warning" | "dry-run" => AnsiColor::BrightYellow,
        "removed" | "pruned" => AnsiColor::BrightMagenta,
        _ => AnsiColor::BrightGreen,
    };
    Style::new().fg_color(Some(color.into())).effects(Effects::BOLD)
}

fn section_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightBlue.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
