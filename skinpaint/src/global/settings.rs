use skinpaint_core::{Color, Config};

const DOCUMENTATION: &str = r##"# Skinpaint settings. You may edit this file, but be aware that formatting and comments will not
# be preserved. Missing fields take their default value.

# Colors are written "#RRGGBB".
# eraser_color - color painted by the eraser.
# new_skin_color - color of every cell of a new, blank skin.
# terminal_preview - draw the skin to the terminal while editing, if stdout is a terminal.
# cell_width - terminal columns per skin cell.

"##;

/// A [`Color`] stored as its `#RRGGBB` string.
#[derive(Copy, Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub Color);
impl TryFrom<String> for HexColor {
    type Error = skinpaint_core::color::ColorParseError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse().map(Self)
    }
}
impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.0.to_hex()
    }
}

#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub eraser_color: HexColor,
    pub new_skin_color: HexColor,
    pub terminal_preview: bool,
    pub cell_width: u8,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            eraser_color: HexColor(Color::WHITE),
            new_skin_color: HexColor(Color::WHITE),
            terminal_preview: true,
            cell_width: 2,
        }
    }
}
impl Settings {
    /// Editor configuration for a new session.
    #[must_use]
    pub fn session_config(&self) -> Config {
        Config {
            eraser_color: self.eraser_color.0,
            new_skin_color: self.new_skin_color.0,
        }
    }
    /// Terminal columns per cell, never zero.
    #[must_use]
    pub fn cell_width(&self) -> usize {
        usize::from(self.cell_width.max(1))
    }
}

/// Where the current settings came from.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Source {
    /// Read from the user's settings file.
    File,
    /// No settings file yet.
    Missing,
    /// A settings file exists but couldn't be read. It is left untouched.
    Invalid,
    /// No preferences directory on this platform.
    NoPath,
}

pub struct Preferences {
    source: Source,
    pub settings: Settings,
}
impl Preferences {
    const FILENAME: &'static str = "settings.toml";
    /// Shared global settings, saved and loaded from user preferences.
    /// (Or defaulted, if unavailable for some reason)
    #[must_use]
    pub fn get() -> &'static parking_lot::RwLock<Self> {
        static GLOBAL_SETTINGS: std::sync::OnceLock<parking_lot::RwLock<Preferences>> =
            std::sync::OnceLock::new();

        GLOBAL_SETTINGS.get_or_init(|| {
            let preferences = match super::preferences_dir() {
                None => Self::defaulted(Source::NoPath),
                Some(mut dir) => {
                    dir.push(Self::FILENAME);
                    Self::load_or_default(&dir)
                }
            };
            parking_lot::RwLock::new(preferences)
        })
    }
    /// Read a clone of the current settings.
    #[must_use]
    pub fn read_clone() -> Settings {
        Self::get().read().settings.clone()
    }
    #[must_use]
    fn defaulted(source: Source) -> Self {
        log::warn!("Settings weren't available ({source:?}), defaulting.");
        Self {
            source,
            settings: Settings::default(),
        }
    }
    #[must_use]
    fn load_or_default(path: &std::path::Path) -> Self {
        let string = match std::fs::read_to_string(path) {
            Ok(string) => string,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Self::defaulted(Source::Missing)
            }
            Err(e) => {
                log::warn!("Failed to read {path:?}: {e}");
                return Self::defaulted(Source::Invalid);
            }
        };
        match Self::parse(&string) {
            Ok(settings) => Self {
                source: Source::File,
                settings,
            },
            Err(e) => {
                log::warn!("Failed to parse {path:?}: {e}");
                Self::defaulted(Source::Invalid)
            }
        }
    }
    pub fn parse(string: &str) -> Result<Settings, toml::de::Error> {
        toml::from_str(string)
    }
    /// Write the settings out, but only if there was no file to begin with. An existing file is never
    /// overwritten, even if it failed to parse.
    pub fn save_if_missing(&mut self) -> anyhow::Result<()> {
        if self.source != Source::Missing {
            return Ok(());
        }
        let mut preferences =
            super::preferences_dir().ok_or_else(|| anyhow::anyhow!("No preferences dir found"))?;
        // Explicity do *not* create recursively. If not found, the user probably has a good reason.
        // Ignore errors (could already exist). Any real errors will be emitted by file access below.
        let _ = std::fs::DirBuilder::new().create(&preferences);

        preferences.push(Self::FILENAME);
        let string = DOCUMENTATION.to_owned() + &toml::ser::to_string_pretty(&self.settings)?;
        std::fs::write(&preferences, string)?;
        self.source = Source::File;
        log::info!("Wrote default settings to {preferences:?}");
        Ok(())
    }
}
