//! Input scripts: a skin to start from, where to save, and a timed list of input events to replay.
//!
//! ```toml
//! input = "steve.png"
//! output = "out.png"
//! preview = "out.obj"
//!
//! [[event]]
//! kind = "press"
//! x = 8
//! y = 8
//! tool = "pencil"
//! color = "#FF0000"
//!
//! [[event]]
//! kind = "move"
//! x = 15
//! y = 8
//! delay_ms = 16
//! ```
//! `tool` and `color` carry over from the previous event when omitted.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use skinpaint_core::{Color, Coordinate, InputEvent, InputKind, Tool};

use crate::global::settings::HexColor;

#[derive(serde::Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Press,
    Move,
    Release,
    Step,
}
impl From<EventKind> for InputKind {
    fn from(value: EventKind) -> Self {
        match value {
            EventKind::Press => Self::Press,
            EventKind::Move => Self::Move,
            EventKind::Release => Self::Release,
            EventKind::Step => Self::Step,
        }
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct ScriptEvent {
    pub kind: EventKind,
    pub x: i32,
    pub y: i32,
    pub tool: Option<String>,
    pub color: Option<HexColor>,
    /// Wait this long after the previous event.
    #[serde(default)]
    pub delay_ms: u64,
}

#[derive(serde::Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Skin to start from. A new skin is used if absent or unreadable.
    pub input: Option<PathBuf>,
    pub output: PathBuf,
    /// Where to write a textured model of the result.
    pub preview: Option<PathBuf>,
    #[serde(default, rename = "event")]
    pub events: Vec<ScriptEvent>,
}

#[derive(thiserror::Error, Debug)]
pub enum ScriptError {
    #[error("event {index}: unknown tool {name:?}")]
    UnknownTool { index: usize, name: String },
}

/// An event ready to hand to the session, after waiting `delay`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TimedEvent {
    pub delay: Duration,
    pub event: InputEvent,
}

impl Script {
    /// Read a script from disk. Relative paths within are taken relative to the script itself.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let string =
            std::fs::read_to_string(path).with_context(|| format!("reading script {path:?}"))?;
        let mut script = Self::parse(&string).with_context(|| format!("parsing script {path:?}"))?;
        if let Some(base) = path.parent() {
            script.rebase(base);
        }
        Ok(script)
    }
    pub fn parse(string: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(string)
    }
    fn rebase(&mut self, base: &Path) {
        let rebase = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        rebase(&mut self.output);
        for path in [&mut self.input, &mut self.preview].into_iter().flatten() {
            rebase(path);
        }
    }
    /// Resolve every event's tool and color.
    pub fn timed_events(&self) -> Result<Vec<TimedEvent>, ScriptError> {
        let mut tool = Tool::default();
        let mut color = Color::BLACK;
        self.events
            .iter()
            .enumerate()
            .map(|(index, event)| {
                if let Some(name) = &event.tool {
                    tool = name.parse().map_err(|_| ScriptError::UnknownTool {
                        index,
                        name: name.clone(),
                    })?;
                }
                if let Some(HexColor(new)) = event.color {
                    color = new;
                }
                Ok(TimedEvent {
                    delay: Duration::from_millis(event.delay_ms),
                    event: InputEvent {
                        kind: event.kind.into(),
                        coord: Coordinate::new(event.x, event.y),
                        tool,
                        color,
                    },
                })
            })
            .collect()
    }
}
