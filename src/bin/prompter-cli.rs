use anyhow::{Context, Result};
use clap::Parser;

use std::io::{self, BufRead, Write};

use prompter::follower::LinearLayout;
use prompter::opts::EngineOpts;
use prompter::session::Session;
use prompter::transcript::TranscriptEvent;

/// Follow a script from transcript lines on stdin.
///
/// Each input line is treated as one final transcript fragment. After every fragment the
/// session is ticked for a fixed simulated interval and the resulting position event and
/// scroll frame are printed as JSON lines, so the engine's behavior can be inspected (or
/// piped) without a real recognizer or renderer attached.
#[derive(Parser, Debug)]
#[command(name = "prompter")]
#[command(about = "A script-following CLI")]
struct Params {
    /// Path to the script text file.
    #[arg(short = 's', long = "script")]
    pub script_path: String,

    /// Optional JSON file with engine option overrides.
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,

    /// Caret position as a fraction of viewport height from the top.
    #[arg(long = "caret", default_value_t = 0.33)]
    pub caret_percent: f32,

    /// Simulated seconds of animation per input line.
    #[arg(long = "step-seconds", default_value_t = 0.5)]
    pub step_seconds: f64,
}

fn main() -> Result<()> {
    prompter::logging::init();
    let params = Params::parse();

    let mut opts = load_opts(params.config_path.as_deref())?;
    opts.follower.caret_percent = params.caret_percent;

    let script_text = std::fs::read_to_string(&params.script_path)
        .with_context(|| format!("failed to read script from '{}'", params.script_path))?;
    let layout = LinearLayout {
        viewport_height: opts.follower.viewport_height,
        ..LinearLayout::default()
    };
    let mut session =
        Session::with_layout(&script_text, opts, layout).context("failed to start session")?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    // Tick in ~60 Hz steps so the throttle and hold timeout observe realistic deltas.
    let frame_dt = 1.0 / 60.0;
    let frames_per_line = (params.step_seconds / frame_dt).ceil() as usize;

    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        if let Some(event) = session.on_transcript(&TranscriptEvent::final_result(line)) {
            serde_json::to_writer(&mut out, &event)?;
            out.write_all(b"\n")?;
        }

        let mut frame = session.tick(frame_dt);
        for _ in 1..frames_per_line {
            frame = session.tick(frame_dt);
        }
        serde_json::to_writer(&mut out, &frame)?;
        out.write_all(b"\n")?;
    }

    Ok(())
}

fn load_opts(config_path: Option<&str>) -> Result<EngineOpts> {
    let Some(path) = config_path else {
        return Ok(EngineOpts::default());
    };
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config from '{path}'"))?;
    serde_json::from_str(&data).with_context(|| format!("failed to parse config '{path}'"))
}
