//! PUBG Scout CLI Module
//!
//! Command-line interface for training, one-off scouting and serving.

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::data::{load_csv, FeatureVector, N_FEATURES};
use crate::export::{ArtifactStore, MODEL_FILE, SCALER_FILE};
use crate::inference::Predictor;
use crate::report::ScoutReport;
use crate::training::{train, Solver, TrainingConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(242, 169, 0) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn bad(s: &str) -> ColoredString    { s.truecolor(231, 76, 60) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "pubg-scout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scout PUBG players for the pro league from their match stats")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Match stats for one player; defaults mirror the web form
#[derive(Args, Debug, Clone)]
pub struct FeatureArgs {
    #[arg(long, default_value_t = 5.0)]
    pub kills: f64,
    #[arg(long, default_value_t = 450.0)]
    pub damage: f64,
    #[arg(long, default_value_t = 2.0)]
    pub boosts: f64,
    #[arg(long, default_value_t = 2.0)]
    pub heals: f64,
    /// Distance travelled in metres
    #[arg(long, default_value_t = 1200.0)]
    pub distance: f64,
    /// Weapons acquired
    #[arg(long, default_value_t = 4.0)]
    pub weapons: f64,
    #[arg(long, default_value_t = 1.0)]
    pub revives: f64,
    #[arg(long, default_value_t = 1.0)]
    pub headshots: f64,
}

impl From<FeatureArgs> for FeatureVector {
    fn from(args: FeatureArgs) -> Self {
        FeatureVector {
            kills: args.kills,
            damage: args.damage,
            boosts: args.boosts,
            heals: args.heals,
            distance: args.distance,
            weapons: args.weapons,
            revives: args.revives,
            headshots: args.headshots,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the scaler and classifier from a labelled CSV
    Train {
        /// Training CSV with the 8 stat columns and `is_pro`
        #[arg(short, long)]
        data: PathBuf,

        /// Directory for scaler.bin and model.bin
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Inverse L2 regularisation strength
        #[arg(long, default_value_t = 1.0)]
        c: f64,

        #[arg(long, default_value_t = 100)]
        max_iter: usize,

        #[arg(long, default_value_t = 1e-6)]
        tol: f64,

        /// Optimiser (newton, gd)
        #[arg(long, default_value = "newton")]
        solver: String,

        /// Step size for the gd solver
        #[arg(long, default_value_t = 0.5)]
        learning_rate: f64,

        /// Minimum examples required per label
        #[arg(long, default_value_t = 2)]
        min_class_count: usize,
    },

    /// Scout one player against trained artifacts
    Predict {
        /// Directory holding scaler.bin and model.bin
        #[arg(short, long, default_value = ".")]
        artifacts: PathBuf,

        #[command(flatten)]
        features: FeatureArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the web server
    Serve {
        /// Server port (defaults to API_PORT or 8080)
        #[arg(short, long)]
        port: Option<u16>,

        /// Server host (defaults to API_HOST or 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Artifact directory (defaults to ARTIFACT_DIR or .)
        #[arg(short, long)]
        artifacts: Option<PathBuf>,
    },

    /// Show what a trained artifact pair contains
    Info {
        #[arg(short, long, default_value = ".")]
        artifacts: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

/// Message printed after a successful training run
pub fn completion_message(n_features: usize) -> String {
    format!(
        "MISSION ACCOMPLISHED: {} and {} created for {} features!",
        MODEL_FILE, SCALER_FILE, n_features
    )
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_train(
    data_path: &Path,
    output_dir: &Path,
    c: f64,
    max_iter: usize,
    tol: f64,
    solver: &str,
    learning_rate: f64,
    min_class_count: usize,
) -> anyhow::Result<()> {
    section("Train");

    let config = TrainingConfig::new()
        .with_c(c)
        .with_max_iter(max_iter)
        .with_tol(tol)
        .with_solver(solver.parse::<Solver>()?)
        .with_learning_rate(learning_rate)
        .with_min_class_count(min_class_count);

    step_run("Loading data");
    let start = Instant::now();
    let dataset = load_csv(data_path)?;
    let (not_pro, pro) = dataset.class_counts();
    step_done(&format!(
        "{} rows ({} pro, {} not pro) in {:?}",
        dataset.len(),
        pro,
        not_pro,
        start.elapsed()
    ));

    step_run(&format!("Fitting scaler and logistic regression ({:?})", config.solver));
    let artifacts = train(&dataset, &config)?;
    step_done(&format!("{} iterations", artifacts.report.n_iter));
    if !artifacts.report.converged {
        println!(
            "  {} {}",
            bad("!"),
            "optimiser hit max_iter before converging; model kept".yellow()
        );
    }

    step_run("Saving artifacts");
    let paths = ArtifactStore::new(output_dir).save(&artifacts)?;
    step_done(&format!("{}", output_dir.display()));
    step_ok(&format!("{}", paths.scaler.display()));
    step_ok(&format!("{}", paths.classifier.display()));

    let metrics = &artifacts.metrics;
    println!();
    println!("  {:<16} {}", muted("Accuracy"), format!("{:.4}", metrics.accuracy).white().bold());
    println!("  {:<16} {}", muted("F1"), format!("{:.4}", metrics.f1_score).white());
    println!("  {:<16} {}", muted("Log loss"), format!("{:.4}", metrics.log_loss).white());
    println!("  {:<16} {}", muted("Time"), format!("{:.3}s", metrics.training_time_secs).white());
    println!();
    println!("  {}", ok(&completion_message(artifacts.feature_names().len())).bold());
    println!();

    Ok(())
}

pub fn cmd_predict(artifacts: &Path, features: FeatureVector, json: bool) -> anyhow::Result<()> {
    let predictor = Predictor::load(artifacts)?;
    let prediction = predictor.predict(&features)?;
    let report = ScoutReport::from_prediction(&features, &prediction);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let paint = |s: &str| if report.is_pro() { accent(s) } else { bad(s) };

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", paint(&report.title).bold()));
    line_box_center(&format!("{}", paint(&report.verdict)));
    line_box_empty();
    line_box_center(&report.confidence_line);
    line_box_empty();
    line_box_sep();
    line_box_empty();
    for (name, value) in report.scores.entries() {
        line_box(&kv(&format!("{:<13}", name), &format!("{:.1}", value)));
    }
    line_box_empty();
    line_box_bottom();

    for warning in &report.warnings {
        println!("  {} {}", bad("!"), warning.to_string().yellow());
    }
    println!();

    Ok(())
}

pub fn cmd_info(artifacts: &Path, json: bool) -> anyhow::Result<()> {
    let predictor = Predictor::load(artifacts)?;
    let info = predictor.model_info();

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    section("Artifacts");
    println!("  {:<14} {}", muted("Directory"), artifacts.display());
    println!("  {:<14} {}", muted("Pair id"), info.pair_id);
    println!("  {:<14} {}", muted("Created"), info.created_at.to_rfc3339());
    println!("  {:<14} v{} (format {})", muted("Written by"), info.crate_version, info.format_version);
    println!("  {:<14} {}", muted("Solver"), format!("{:?}", info.config.solver));
    println!(
        "  {:<14} {} iterations, {}",
        muted("Fit"),
        info.fit.n_iter,
        if info.fit.converged { ok("converged") } else { bad("not converged") }
    );

    section("Model");
    println!(
        "  {:<12} {:>12} {:>12} {:>10}",
        muted("Feature"), muted("Mean"), muted("Std"), muted("Weight")
    );
    println!("  {}", dim(&"─".repeat(50)));
    for (i, name) in info.feature_names.iter().enumerate() {
        println!(
            "  {:<12} {:>12.3} {:>12.3} {:>10.4}",
            name, info.means[i], info.scales[i], info.weights[i]
        );
    }
    println!("  {:<12} {:>12} {:>12} {:>10.4}", "bias", "", "", info.bias);

    section("Training metrics");
    let m = &info.metrics;
    println!("  {:<14} {:.4}", muted("Accuracy"), m.accuracy);
    println!("  {:<14} {:.4}", muted("Precision"), m.precision);
    println!("  {:<14} {:.4}", muted("Recall"), m.recall);
    println!("  {:<14} {:.4}", muted("F1"), m.f1_score);
    println!("  {:<14} {:.4}", muted("Log loss"), m.log_loss);
    println!("  {:<14} {}", muted("Samples"), m.n_samples);
    println!();

    Ok(())
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(
    host: Option<String>,
    port: Option<u16>,
    artifacts: Option<PathBuf>,
) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    let defaults = ServerConfig::default();
    let config = ServerConfig {
        host: host.unwrap_or(defaults.host),
        port: port.unwrap_or(defaults.port),
        artifact_dir: artifacts.unwrap_or(defaults.artifact_dir),
    };

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "PUBG Scout".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Form   ", &format!("http://{}:{}", config.host, config.port)));
    line_box(&kv("API    ", &format!("http://{}:{}/api/predict", config.host, config.port)));
    line_box(&kv("Health ", &format!("http://{}:{}/api/health", config.host, config.port)));
    line_box(&kv("Model  ", &config.artifact_dir.display().to_string()));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    run_server(config).await
}

pub fn show_help() {
    section("Commands");
    println!("  {:<10} {}", accent("train"), muted("fit scaler.bin + model.bin from a CSV"));
    println!("  {:<10} {}", accent("predict"), muted("scout one player from the command line"));
    println!("  {:<10} {}", accent("serve"), muted("start the scouting web form"));
    println!("  {:<10} {}", accent("info"), muted("inspect trained artifacts"));
    println!();
    println!("  {}", dim(&format!("{} features expected: run with --help for flags", N_FEATURES)));
    println!();
}
