#![warn(clippy::pedantic)]

pub mod global;
pub mod preview;
pub mod script;
pub mod surface;

use std::time::Duration;

use anyhow::{Context, Result as AnyResult};
use skinpaint_core::{
    projector::SceneHost,
    scheduler::{DisplaySurface, FrameScheduler},
    InputEvent, Session,
};

/// How long to keep ticking after the last input, waiting for the session to settle.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Feed script events into the editor, honoring their delays.
async fn replay(
    events: Vec<script::TimedEvent>,
    send: tokio::sync::mpsc::Sender<InputEvent>,
) -> AnyResult<()> {
    for script::TimedEvent { delay, event } in events {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        send.send(event)
            .await
            .map_err(|_| anyhow::anyhow!("editor closed before replay finished"))?;
    }
    // Dropping `send` tells the editor no more input is coming.
    Ok(())
}

/// Owns the session. Interleaves input with display refreshes until input runs dry and everything
/// has been committed, drawn, and uploaded.
async fn editor(
    session: &mut Session,
    surface: &mut impl DisplaySurface,
    scene: &mut impl SceneHost,
    mut recv: tokio::sync::mpsc::Receiver<InputEvent>,
) -> AnyResult<()> {
    let mut interval = tokio::time::interval(FrameScheduler::frame_interval());
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut input_open = true;
    let mut drain_deadline = None;

    loop {
        tokio::select! {
            event = recv.recv(), if input_open => match event {
                Some(event) => {
                    session.handle(event);
                }
                None => {
                    log::debug!("input finished");
                    input_open = false;
                    drain_deadline = Some(tokio::time::Instant::now() + DRAIN_TIMEOUT);
                }
            },
            now = interval.tick() => {
                let summary = session.tick(now.into_std(), surface, scene);
                if summary.changed != 0 || summary.drawn != 0 {
                    log::trace!("{summary:?}");
                }
                if !input_open && session.is_idle() {
                    break;
                }
                if drain_deadline.is_some_and(|deadline| now >= deadline) {
                    log::warn!("session did not settle within {DRAIN_TIMEOUT:?}, saving what's committed");
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Replace the session's skin with the one at `input`. On failure the session keeps its new skin.
fn open_input(session: &mut Session, input: &std::path::Path) -> bool {
    // Not try_block!, its closure is Fn and this borrows the session mutably.
    let mut try_block = || -> AnyResult<()> {
        let bytes = std::fs::read(input)?;
        session.load(&bytes)?;
        Ok(())
    };
    if let Err(e) = try_block() {
        log::error!("failed to open skin {input:?}, starting from a new skin: {e:#}");
        false
    } else {
        true
    }
}

/// Replay `events` through the session on a fresh runtime, returning once it has settled.
fn run(
    session: &mut Session,
    surface: &mut impl DisplaySurface,
    scene: &mut impl SceneHost,
    events: Vec<script::TimedEvent>,
) -> AnyResult<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let (send, recv) = tokio::sync::mpsc::channel(64);
    // between current_thread runtime and try_join, these tasks are
    // not actually run in parallel, just interleaved.
    runtime.block_on(async {
        tokio::try_join!(replay(events, send), editor(session, surface, scene, recv))
    })?;
    Ok(())
}

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Info);
    }

    let script_path: std::path::PathBuf = std::env::args_os()
        .nth(1)
        .map(Into::into)
        .ok_or_else(|| anyhow::anyhow!("usage: skinpaint <script.toml>"))?;

    let settings = global::settings::Preferences::read_clone();
    if let Err(e) = global::settings::Preferences::get().write().save_if_missing() {
        log::warn!("Failed to save default settings:\n{e:?}");
    }

    let script = script::Script::load(&script_path)?;
    let events = script.timed_events()?;
    log::info!("replaying {} events from {script_path:?}", events.len());

    let mut session = Session::new(settings.session_config());
    if let Some(input) = &script.input {
        open_input(&mut session, input);
    }

    let mut scene = preview::ObjScene::default();
    let draw_to_terminal =
        settings.terminal_preview && std::io::IsTerminal::is_terminal(&std::io::stdout());
    if draw_to_terminal {
        let mut surface =
            surface::TerminalSurface::new(std::io::stdout().lock(), settings.cell_width());
        run(&mut session, &mut surface, &mut scene, events)?;
        drop(surface.finish()?);
    } else {
        run(&mut session, &mut surface::NullSurface, &mut scene, events)?;
    }

    let encoded = session.serialize()?;
    std::fs::write(&script.output, encoded)
        .with_context(|| format!("writing {:?}", script.output))?;
    log::info!("saved skin to {:?}", script.output);

    if let Some(preview) = &script.preview {
        scene.write(preview)?;
    }

    let stats = session.frame_stats();
    match stats.updates_per_second {
        Some(ups) => log::info!("ran at {ups:.1} updates per second, {} frames skipped", stats.skipped),
        None => log::info!("finished in under a second, {} frames skipped", stats.skipped),
    }
    if let Some(color) = session.picked_color() {
        log::info!("last picked color {color}");
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::open_input;
    use skinpaint_core::{Color, Config, Coordinate, Session};

    #[test]
    fn open_input_falls_back() {
        let config = Config {
            eraser_color: Color::WHITE,
            new_skin_color: Color::new(0x10, 0x20, 0x30),
        };
        let mut session = Session::new(config);
        let dir = std::env::temp_dir().join(format!("skinpaint-open-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        assert!(!open_input(&mut session, &dir.join("missing.png")));
        let garbage = dir.join("garbage.png");
        std::fs::write(&garbage, b"not a png").unwrap();
        assert!(!open_input(&mut session, &garbage));
        assert_eq!(
            session.raster().get(Coordinate::new(0, 0)),
            Ok(config.new_skin_color)
        );

        let saved = Session::new(Config {
            new_skin_color: Color::BLACK,
            ..config
        })
        .serialize()
        .unwrap();
        let good = dir.join("good.png");
        std::fs::write(&good, saved).unwrap();
        assert!(open_input(&mut session, &good));
        assert_eq!(session.raster().get(Coordinate::new(0, 0)), Ok(Color::BLACK));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
