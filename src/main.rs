//! Headless coin pusher entry point
//!
//! Runs the simulation for a fixed stretch of wall time, dropping a coin at
//! regular intervals, and prints the final tally. Pass a JSON config path as
//! the first argument to override the defaults.

use std::process::ExitCode;

use coin_pusher::{PusherConfig, Session};

const FRAME_DT: f32 = 1.0 / 60.0;
const RUN_SECONDS: f32 = 60.0;
const FRAMES_PER_SPAWN: u32 = 45;

fn load_config() -> Result<PusherConfig, String> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|err| format!("cannot read {path}: {err}"))?;
            PusherConfig::from_json(&text).map_err(|err| format!("bad config {path}: {err}"))
        }
        None => Ok(PusherConfig::default()),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let mut session = match Session::new(config) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    let frames = (RUN_SECONDS / FRAME_DT) as u32;
    for frame in 0..frames {
        if frame % FRAMES_PER_SPAWN == 0 {
            match session.spawn_coin() {
                Ok(id) => log::debug!("dropped coin {id:?}"),
                Err(err) => log::warn!("spawn rejected: {err}"),
            }
        }

        let report = session.frame(FRAME_DT);
        if report.scored > 0 || report.lost > 0 {
            let tally = session.score();
            log::info!(
                "t={:.1}s score {} lost {} in play {}",
                frame as f32 * FRAME_DT,
                tally.score,
                tally.lost,
                session.coins_in_play(),
            );
        }
    }

    let tally = session.score();
    println!(
        "ran {RUN_SECONDS}s ({} ticks): scored {}, lost {}, {} coins still in play",
        session.time_ticks(),
        tally.score,
        tally.lost,
        session.coins_in_play(),
    );
    ExitCode::SUCCESS
}
