use core::fmt;
use core::str::FromStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};
use unicode_width::UnicodeWidthStr;

use crate::Edges;

/// File name looked up under `~/.config/conway-screensaver/`
pub const CONFIG_FILE: &str = "game_of_life.conf";

pub const MIN_UPDATE_INTERVAL_US: u32 = 1;
pub const MAX_UPDATE_INTERVAL_US: u32 = 1_000_000;

/// The string drawn for every live cell.
///
/// Short enough to fit in a terminal cell or two, and never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellGlyph(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GlyphError {
    #[error("cell glyph is empty")]
    Empty,

    #[error("cell glyph {glyph:?} has {chars} characters, at most {max} fit", max = CellGlyph::MAX_CHARS)]
    TooLong { glyph: String, chars: usize },

    #[error("cell glyph {glyph:?} is {width} columns wide, it must be 1 to {max}", max = CellGlyph::MAX_WIDTH)]
    BadWidth { glyph: String, width: usize },
}

impl CellGlyph {
    pub const MAX_CHARS: usize = 7;

    /// In terminal columns
    pub const MAX_WIDTH: usize = 2;

    pub fn new(glyph: &str) -> Result<Self, GlyphError> {
        if glyph.is_empty() {
            return Err(GlyphError::Empty);
        }

        let chars = glyph.chars().count();
        if chars > Self::MAX_CHARS {
            return Err(GlyphError::TooLong {
                glyph: glyph.to_string(),
                chars,
            });
        }

        let width = glyph.width();
        if width == 0 || width > Self::MAX_WIDTH {
            return Err(GlyphError::BadWidth {
                glyph: glyph.to_string(),
                width,
            });
        }

        Ok(Self(glyph.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// How many terminal columns the glyph covers
    pub fn width(&self) -> usize {
        self.0.width()
    }
}

impl Default for CellGlyph {
    fn default() -> Self {
        Self("&".to_string())
    }
}

impl FromStr for CellGlyph {
    type Err = GlyphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for CellGlyph {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CellGlyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the screensaver reads from its config file
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Drop a fresh glider onto the board every [`Config::glider_interval_s`] seconds
    pub infinite_mode: bool,

    /// Delay between frames. The only field that changes while running (`+`/`-` keys).
    pub update_interval_us: u32,

    pub cell_glyph: CellGlyph,

    /// Live cells cycle through this many colors as they age
    pub max_age: u32,

    pub color_mode: bool,

    pub glider_interval_s: u32,

    /// Probability that a cell starts alive, `0.0..=1.0`
    pub initial_density: f64,

    pub wrap_edges: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            infinite_mode: false,
            update_interval_us: 100_000,
            cell_glyph: CellGlyph::default(),
            max_age: 5,
            color_mode: true,
            glider_interval_s: 5,
            initial_density: 0.2,
            wrap_edges: true,
        }
    }
}

/// Why a single line of a config file was skipped
#[derive(Debug, Error, PartialEq)]
pub enum ConfigLineError {
    #[error("expected `key=value`")]
    MissingEquals,

    #[error("unknown key `{0}`")]
    UnknownKey(String),

    #[error("`{key}` has no value")]
    EmptyValue { key: String },

    #[error("`{key}` expects {expected}, got {value:?}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error(transparent)]
    Glyph(#[from] GlyphError),
}

impl Config {
    /// `$HOME/.config/conway-screensaver/game_of_life.conf`, or `game_of_life.conf` in the
    /// working directory when there is no `$HOME`
    pub fn default_path() -> PathBuf {
        match std::env::var_os("HOME") {
            Some(home) if !home.is_empty() => PathBuf::from(home)
                .join(".config")
                .join("conway-screensaver")
                .join(CONFIG_FILE),
            _ => PathBuf::from(CONFIG_FILE),
        }
    }

    /// Reads `path`, falling back to defaults for anything the file doesn't set.
    ///
    /// A missing or unreadable file is not an error, it just means "use the defaults".
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                info!(path = %path.display(), "loading config");
                Self::parse(&text)
            }
            Err(err) => {
                info!(path = %path.display(), %err, "no config file, using defaults");
                Self::default()
            }
        }
    }

    /// Parses `key=value` lines on top of the defaults.
    ///
    /// Bad lines are logged and skipped; they never stop the rest of the file from loading.
    pub fn parse(text: &str) -> Self {
        let mut config = Self::default();
        for (n, line) in text.lines().enumerate() {
            if let Err(err) = config.apply_line(line) {
                match &err {
                    ConfigLineError::UnknownKey(_) | ConfigLineError::MissingEquals => {
                        debug!(line = n + 1, %err, "skipping config line")
                    }
                    _ => warn!(line = n + 1, %err, "skipping config line"),
                }
            }
        }
        config
    }

    /// Applies one line of a config file. Blank lines and `#` comments are accepted and ignored.
    pub fn apply_line(&mut self, line: &str) -> Result<(), ConfigLineError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let (key, value) = line
            .split_once('=')
            .ok_or(ConfigLineError::MissingEquals)?;
        self.apply(key.trim(), value.trim())
    }

    /// Sets a single option. On error the config is left as it was.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigLineError> {
        if !KEYS.contains(&key) {
            return Err(ConfigLineError::UnknownKey(key.to_string()));
        }
        if value.is_empty() {
            return Err(ConfigLineError::EmptyValue {
                key: key.to_string(),
            });
        }

        match key {
            "infinite_mode" => self.infinite_mode = parse_flag(key, value)?,
            "update_interval" => {
                self.update_interval_us = parse_int(key, value)?
                    .clamp(MIN_UPDATE_INTERVAL_US as i64, MAX_UPDATE_INTERVAL_US as i64)
                    as u32
            }
            "cell_char" => self.cell_glyph = CellGlyph::new(value)?,
            "max_age" => self.max_age = parse_int(key, value)?.clamp(1, u32::MAX as i64) as u32,
            "color_mode" => self.color_mode = parse_flag(key, value)?,
            "glider_interval" => {
                self.glider_interval_s = parse_int(key, value)?.clamp(1, u32::MAX as i64) as u32
            }
            "initial_density" => {
                let density: f64 = value
                    .parse()
                    .ok()
                    .filter(|d: &f64| !d.is_nan())
                    .ok_or_else(|| invalid(key, value, "a number from 0 to 1"))?;
                self.initial_density = density.clamp(0.0, 1.0);
            }
            "wrap_edges" => self.wrap_edges = parse_flag(key, value)?,
            _ => unreachable!("{key} is in KEYS but has no parser"),
        }

        Ok(())
    }

    pub fn edges(&self) -> Edges {
        Edges::from_wrap(self.wrap_edges)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_micros(self.update_interval_us as u64)
    }

    pub fn glider_interval(&self) -> Duration {
        Duration::from_secs(self.glider_interval_s as u64)
    }

    /// The color a live cell of `age` is drawn with, `1..=max_age`, or `None` when color is off
    pub fn color_for_age(&self, age: u32) -> Option<u8> {
        if !self.color_mode {
            return None;
        }

        let index = age % self.max_age.max(1) + 1;
        Some(u8::try_from(index).unwrap_or(u8::MAX))
    }
}

const KEYS: [&str; 8] = [
    "infinite_mode",
    "update_interval",
    "cell_char",
    "max_age",
    "color_mode",
    "glider_interval",
    "initial_density",
    "wrap_edges",
];

fn invalid(key: &str, value: &str, expected: &'static str) -> ConfigLineError {
    ConfigLineError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    }
}

fn parse_int(key: &str, value: &str) -> Result<i64, ConfigLineError> {
    value
        .parse()
        .map_err(|_| invalid(key, value, "an integer"))
}

/// `0` is off, any other integer is on
fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigLineError> {
    value
        .parse::<i64>()
        .map(|v| v != 0)
        .map_err(|_| invalid(key, value, "0 or 1"))
}

#[cfg(test)]
mod test {
    use super::*;

    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn check_defaults() {
        let config = Config::default();
        assert!(!config.infinite_mode);
        assert_eq!(config.update_interval_us, 100_000);
        assert_eq!(config.cell_glyph.as_str(), "&");
        assert_eq!(config.max_age, 5);
        assert!(config.color_mode);
        assert_eq!(config.glider_interval_s, 5);
        assert_eq!(config.initial_density, 0.2);
        assert!(config.wrap_edges);
    }

    #[test]
    fn check_bad_line_is_skipped() {
        let config = Config::parse("update_interval=5000\nbad_line\nmax_age=3\n");
        assert_eq!(
            config,
            Config {
                update_interval_us: 5000,
                max_age: 3,
                ..Config::default()
            }
        );
    }

    #[test]
    fn check_every_key() {
        let config = Config::parse(indoc! {"
            # a comment
            infinite_mode=1
            update_interval=250000
            cell_char=██

            max_age=8
            color_mode=0
            glider_interval=12
            initial_density=0.35
            wrap_edges=0
        "});

        assert_eq!(
            config,
            Config {
                infinite_mode: true,
                update_interval_us: 250_000,
                cell_glyph: CellGlyph::new("██").unwrap(),
                max_age: 8,
                color_mode: false,
                glider_interval_s: 12,
                initial_density: 0.35,
                wrap_edges: false,
            }
        );
        assert_eq!(config.edges(), Edges::Bounded);
    }

    #[test]
    fn check_bad_values_keep_previous() {
        let config = Config::parse(indoc! {"
            max_age=7
            max_age=lots
            unknown_key=4
            update_interval=
            initial_density=NaN
            cell_char=
            = 5
        "});

        assert_eq!(
            config,
            Config {
                max_age: 7,
                ..Config::default()
            }
        );
    }

    #[test]
    fn check_whitespace_and_later_keys_win() {
        let config = Config::parse("  wrap_edges = 0 \nwrap_edges=1\ncell_char = @ \n");
        assert!(config.wrap_edges);
        assert_eq!(config.cell_glyph.as_str(), "@");
    }

    #[rstest]
    #[case("update_interval=0", MIN_UPDATE_INTERVAL_US)]
    #[case("update_interval=-40", MIN_UPDATE_INTERVAL_US)]
    #[case("update_interval=5000000", MAX_UPDATE_INTERVAL_US)]
    #[case("update_interval=777", 777)]
    fn check_update_interval_is_clamped(#[case] line: &str, #[case] expected: u32) {
        assert_eq!(Config::parse(line).update_interval_us, expected);
    }

    #[rstest]
    #[case("initial_density=1.5", 1.0)]
    #[case("initial_density=-0.5", 0.0)]
    #[case("initial_density=0.75", 0.75)]
    fn check_density_is_clamped(#[case] line: &str, #[case] expected: f64) {
        assert_eq!(Config::parse(line).initial_density, expected);
    }

    #[test]
    fn check_minimums() {
        let config = Config::parse("max_age=0\nglider_interval=-3\n");
        assert_eq!(config.max_age, 1);
        assert_eq!(config.glider_interval_s, 1);
    }

    #[rstest]
    #[case("2", true)]
    #[case("1", true)]
    #[case("0", false)]
    fn check_flags(#[case] value: &str, #[case] expected: bool) {
        let mut config = Config::default();
        config.apply("infinite_mode", value).unwrap();
        assert_eq!(config.infinite_mode, expected);
    }

    #[test]
    fn check_line_errors() {
        let mut config = Config::default();
        assert_eq!(
            config.apply_line("no equals here"),
            Err(ConfigLineError::MissingEquals)
        );
        assert_eq!(
            config.apply_line("speed=3"),
            Err(ConfigLineError::UnknownKey("speed".to_string()))
        );
        assert_eq!(
            config.apply_line("color_mode=yes"),
            Err(ConfigLineError::InvalidValue {
                key: "color_mode".to_string(),
                value: "yes".to_string(),
                expected: "0 or 1",
            })
        );
        assert_eq!(config.apply_line("   "), Ok(()));
        assert_eq!(config, Config::default());
    }

    #[rstest]
    #[case("&")]
    #[case("██")]
    #[case("o")]
    #[case("猫")]
    fn check_valid_glyphs(#[case] glyph: &str) {
        assert_eq!(CellGlyph::new(glyph).unwrap().as_str(), glyph);
    }

    #[test]
    fn check_invalid_glyphs() {
        assert_eq!(CellGlyph::new(""), Err(GlyphError::Empty));
        assert_eq!(
            CellGlyph::new("abcdefgh"),
            Err(GlyphError::TooLong {
                glyph: "abcdefgh".to_string(),
                chars: 8
            })
        );
        assert_eq!(
            CellGlyph::new("abc"),
            Err(GlyphError::BadWidth {
                glyph: "abc".to_string(),
                width: 3
            })
        );
    }

    #[test]
    fn check_color_for_age() {
        let config = Config {
            max_age: 3,
            ..Config::default()
        };
        let colors: Vec<_> = (0..7).map(|age| config.color_for_age(age)).collect();
        assert_eq!(colors, [1_u8, 2, 3, 1, 2, 3, 1].map(Some).to_vec());

        let mono = Config {
            color_mode: false,
            ..Config::default()
        };
        assert_eq!(mono.color_for_age(4), None);
    }

    #[test]
    fn check_missing_file_is_defaults() {
        let path = std::env::temp_dir().join("conway-screensaver-test-does-not-exist.conf");
        assert_eq!(Config::load(&path), Config::default());
    }

    #[test]
    fn check_load_file() {
        let path = std::env::temp_dir().join(format!(
            "conway-screensaver-test-{}.conf",
            std::process::id()
        ));
        std::fs::write(&path, "infinite_mode=1\nglider_interval=9\n").unwrap();

        let config = Config::load(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(config.infinite_mode);
        assert_eq!(config.glider_interval_s, 9);
        assert_eq!(config.glider_interval(), Duration::from_secs(9));
    }
}
