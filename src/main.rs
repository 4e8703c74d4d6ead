//! Clumptui: SameGame-style tile-matching puzzle in the terminal.

mod app;
mod game;
mod input;
mod logging;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::time::Duration;

/// Options derived from CLI that affect how a game is set up and paced.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub seed: Option<u64>,
    pub demo: Option<Demo>,
    /// Pause between two cascade steps (removal or fall).
    pub step_delay: Duration,
    pub no_animation: bool,
}

impl From<&Args> for GameConfig {
    fn from(args: &Args) -> Self {
        Self {
            width: args.width as usize,
            height: args.height as usize,
            seed: args.seed,
            demo: args.demo,
            step_delay: Duration::from_millis(args.step_delay_ms),
            no_animation: args.no_animation,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log_file.as_deref(), args.verbosity.log_level_filter())?;
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|err| {
        log::warn!("falling back to default theme: {err}");
        theme::Theme::default()
    });
    let config = GameConfig::from(&args);
    log::info!("starting {}x{} board (seed {:?}, demo {:?})", config.width, config.height, config.seed, config.demo);
    let mut app = App::new(config, theme);
    app.run()?;
    Ok(())
}

/// SameGame-style tile-matching puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "clumptui",
    version,
    about = "SameGame-style puzzle in the terminal. Click a group of two or more same-coloured tiles to clear it.",
    long_about = "Clumptui is a terminal tile-matching puzzle.\n\n\
        Click a tile: if it touches at least one tile of the same colour (up, down, left, right), \
        the whole connected group is removed and scores n*(n-1) points. Tiles above fall into the gap \
        and emptied columns slide toward the centre. Clear the board to win; the game is lost when no \
        two neighbouring tiles share a colour.\n\n\
        CONTROLS:\n  Mouse       Click a tile\n  Arrows/hjkl Move cursor   Enter/Space Click at cursor\n  R           New board     Esc / Q     Quit"
)]
pub struct Args {
    /// Board width in tiles.
    #[arg(long, default_value = "9", value_name = "COLS", value_parser = clap::value_parser!(u16).range(2..=30))]
    pub width: u16,

    /// Board height in tiles.
    #[arg(long, default_value = "9", value_name = "ROWS", value_parser = clap::value_parser!(u16).range(2..=30))]
    pub height: u16,

    /// Seed for the board generator; the same seed deals the same boards.
    #[arg(short, long, value_name = "N")]
    pub seed: Option<u64>,

    /// Start from a preset layout instead of a random board.
    #[arg(long, value_name = "LAYOUT")]
    pub demo: Option<Demo>,

    /// Delay between cascade steps in ms.
    #[arg(long, default_value = "50", value_name = "MS")]
    pub step_delay_ms: u64,

    /// Resolve removals and falls instantly instead of step by step.
    #[arg(long)]
    pub no_animation: bool,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Write log records to this file (the terminal is taken by the game).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<std::path::PathBuf>,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

/// Preset board layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Demo {
    /// Diagonal stripes with a single group left to clear.
    #[value(alias = "lose")]
    LastMove,
    /// One colour per column; can be cleared completely.
    #[value(alias = "win")]
    Columns,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["clumptui"]);
        let config = GameConfig::from(&args);
        assert_eq!((config.width, config.height), (9, 9));
        assert_eq!(config.step_delay, Duration::from_millis(50));
        assert_eq!(config.demo, None);
        assert!(!config.no_animation);
    }

    #[test]
    fn test_demo_aliases() {
        let args = Args::parse_from(["clumptui", "--demo", "win", "--seed", "3"]);
        assert_eq!(args.demo, Some(Demo::Columns));
        assert_eq!(args.seed, Some(3));
        let args = Args::parse_from(["clumptui", "--demo", "last-move"]);
        assert_eq!(args.demo, Some(Demo::LastMove));
    }

    #[test]
    fn test_rejects_tiny_board() {
        assert!(Args::try_parse_from(["clumptui", "--width", "1"]).is_err());
    }

    #[test]
    fn test_cli_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
