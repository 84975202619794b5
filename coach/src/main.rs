use anyhow::Context;
use clap::Parser;
use formcore::pose_interface::{CapturePayload, ExerciseType};
use generator::profile::{build_capture_payload_from_config, GeneratorConfig};
use gui_bridge::bridge::GuiBridge;
use gui_bridge::model::VisualizationModel;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Rust-facing workout analysis workflow driver")]
struct Args {
    /// Run a single offline capture and emit a baseline summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Analyze a recorded landmark capture (JSON) instead of a synthetic one
    #[arg(long)]
    input: Option<PathBuf>,
    /// Exercise profile for the synthetic generator
    #[arg(long, default_value = "squat")]
    exercise: String,
    #[arg(long, default_value_t = 120)]
    frames: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value_t = 30)]
    min_valid_frames: usize,
    #[arg(long, default_value_t = 10)]
    min_rep_frames: usize,
    #[arg(long, default_value_t = 5)]
    smoothing_window: usize,
    /// Keep the HTTP bridge alive for incoming capture payloads
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn parse_exercise(token: &str) -> anyhow::Result<ExerciseType> {
    match token {
        "squat" => Ok(ExerciseType::Squat),
        "push_up" | "pushup" => Ok(ExerciseType::PushUp),
        "lunge" => Ok(ExerciseType::Lunge),
        "unknown" => Ok(ExerciseType::Unknown),
        other => anyhow::bail!("unrecognized exercise profile '{}'", other),
    }
}

fn load_capture(path: &Path) -> anyhow::Result<CapturePayload> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading capture {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing capture {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(
            args.min_valid_frames,
            args.min_rep_frames,
            args.smoothing_window,
        )
    };

    let runner = Runner::new(workflow_config.clone());
    let gui_bridge = GuiBridge::new(Arc::new(runner.clone()));

    let payload = if let Some(path) = args.input.as_deref() {
        load_capture(path)?
    } else {
        let generator_config = GeneratorConfig {
            exercise: parse_exercise(&args.exercise)?,
            frames: args.frames,
            seed: args.seed,
            ..Default::default()
        };
        build_capture_payload_from_config(&generator_config)?
    };

    if args.offline {
        let result = runner.execute(&payload);

        println!(
            "Offline run -> {} reps {} score {:.1} over {}/{} frames",
            result.analysis.exercise_name,
            result.analysis.rep_count,
            result.analysis.form_score,
            result.valid_frames,
            result.total_frames
        );

        let model = VisualizationModel::from_workflow(&result);
        gui_bridge.publish(&model)?;
        gui_bridge.publish_status("Offline analysis results ready.");

        let report = format!(
            "exercise={} reps={} score={:.1} frames={}/{} feedback={:?}\n",
            result.analysis.exercise_name,
            result.analysis.rep_count,
            result.analysis.form_score,
            result.valid_frames,
            result.total_frames,
            result.analysis.feedback
        );
        let report_path = PathBuf::from("tools/data/offline_analysis.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(report_path)?;
        file.write_all(report.as_bytes())?;
    }
    if args.serve {
        gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
