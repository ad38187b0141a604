//! Galaxy Raid entry point
//!
//! Native builds run a headless demo session: the autopilot plays one credit
//! on 60 Hz frame timestamps and a JSON summary is printed when it ends.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use galaxy_raid::platform::{Autopilot, FrameDriver};
    use galaxy_raid::sim::{GameEvent, GameMode, GameState, Intent};
    use galaxy_raid::{Difficulty, Tuning};

    /// Milliseconds between frames on a 60 Hz display
    const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Command line options
    #[derive(Debug)]
    struct Options {
        difficulty: Difficulty,
        tuning_path: Option<String>,
        seed: u64,
        frames: u64,
    }

    impl Default for Options {
        fn default() -> Self {
            Self {
                difficulty: Difficulty::Arcade,
                tuning_path: None,
                seed: 0x5EED,
                frames: 60 * 60 * 5,
            }
        }
    }

    fn parse_args() -> Options {
        parse_arg_list(std::env::args().skip(1))
    }

    fn parse_arg_list(args: impl IntoIterator<Item = String>) -> Options {
        let mut options = Options::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let flag = arg.as_str();
            if !matches!(flag, "--difficulty" | "--tuning" | "--seed" | "--frames") {
                log::warn!("Ignoring argument '{}'", flag);
                continue;
            }
            let Some(v) = args.next() else {
                log::warn!("Missing value for '{}'", flag);
                break;
            };
            match flag {
                "--difficulty" => match Difficulty::from_str(&v) {
                    Some(d) => options.difficulty = d,
                    None => log::warn!("Unknown difficulty '{}', using {}", v, options.difficulty.as_str()),
                },
                "--tuning" => options.tuning_path = Some(v),
                "--seed" => match v.parse() {
                    Ok(seed) => options.seed = seed,
                    Err(e) => log::warn!("Bad seed '{}': {}", v, e),
                },
                _ => match v.parse() {
                    Ok(frames) => options.frames = frames,
                    Err(e) => log::warn!("Bad frame count '{}': {}", v, e),
                },
            }
        }
        options
    }

    fn load_tuning(options: &Options) -> Tuning {
        let Some(path) = options.tuning_path.as_deref() else {
            return Tuning::from_preset(options.difficulty);
        };
        match Tuning::from_file(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path);
                tuning
            }
            Err(e) => {
                log::warn!("Failed to load tuning ({}), using defaults", e);
                Tuning::from_preset(options.difficulty)
            }
        }
    }

    pub fn run() {
        let options = parse_args();
        let tuning = load_tuning(&options);
        log::info!(
            "Galaxy Raid (native) starting: difficulty {}, seed {}",
            tuning.difficulty.as_str(),
            options.seed
        );

        let mut driver = FrameDriver::new(GameState::with_tuning(options.seed, tuning));
        driver.apply(Intent::InsertCoin);
        driver.apply(Intent::StartOrContinue);

        let pilot = Autopilot::default();
        let mut kills = 0u64;
        let mut deaths = 0u64;
        let mut frames = 0u64;

        while frames < options.frames && driver.state.mode != GameMode::GameOver {
            pilot.drive(&mut driver.state);
            for event in driver.frame(frames as f64 * FRAME_MS) {
                match event {
                    GameEvent::EnemyHit { .. } => kills += 1,
                    GameEvent::PlayerDeath => deaths += 1,
                    GameEvent::WaveClear { wave } => log::info!("Reached wave {}", wave),
                    _ => {}
                }
            }
            frames += 1;
        }

        let state = &driver.state;
        log::info!(
            "Session ended after {} frames: score {}, wave {}, {:?}",
            frames,
            state.score,
            state.wave,
            state.mode
        );

        let summary = serde_json::json!({
            "seed": state.seed,
            "difficulty": state.tuning.difficulty.as_str(),
            "frames": frames,
            "sim_seconds": state.time,
            "mode": state.mode,
            "score": state.score,
            "high_score": state.high_score,
            "wave": state.wave,
            "lives": state.lives,
            "kills": kills,
            "deaths": deaths,
        });
        println!("{}", summary);
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Web hosts drive `platform::FrameDriver` from their own frame callback
}
