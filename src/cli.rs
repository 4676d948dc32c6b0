// ============================================================================
// SnapEdit CLI — headless editing via command-line arguments
// ============================================================================
//
// Usage examples:
//   snapedit -i photo.png --op "resize 800 600" -o small.png
//   snapedit -i logo.jpg --op "remove #ffffff 30" -o logo.png
//   snapedit -i scan.png --op "crop 10 10 500 400" --op undo --op redo -f pdf
//   snapedit -i "shots/*.png" --op "resize-width 320" --output-dir thumbs/ -f webp
//
// Each input gets its own editor session; commands run in the order given.
// A failing command is reported and skipped, and the session carries on,
// the same way a rejected edit in an interactive editor leaves the image as
// it was.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use crate::canvas::{CropRegion, Rgb};
use crate::io::ExportFormat;
use crate::ops::color_removal::ColorMode;
use crate::ops::transform::{Interpolation, parse_dimension};
use crate::session::{EditorSession, Notice};
use crate::settings::Settings;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// SnapEdit headless image editor.
#[derive(Parser, Debug)]
#[command(
    name = "snapedit",
    version,
    about = "SnapEdit headless image editor",
    long_about = "Resize, crop, remove or replace colors, and export images without a GUI.\n\
                  Outputs PNG, JPEG, WEBP, SVG (one rect per pixel) or PDF.\n\n\
                  Commands (--op, applied in order):\n  \
                  resize W H | resize-width W | resize-height H\n  \
                  crop X Y W H\n  \
                  remove #rrggbb TOLERANCE\n  \
                  replace #rrggbb TOLERANCE #rrggbb\n  \
                  pick X Y\n  \
                  undo | redo | reset"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Editing command; repeat to run several in order.
    #[arg(long = "op", value_name = "COMMAND")]
    pub ops: Vec<EditCommand>,

    /// Output file path. Only valid for single-file input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory. Files keep the input stem and take the format's extension.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Export file name (stem for raster/SVG, full name for PDF). Single input only;
    /// written into --output-dir or the current directory.
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Output format: png, jpeg, webp, svg, pdf.
    /// When omitted, the format is inferred from --output's extension, defaulting to png.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<ExportFormat>,

    /// Lossy export quality, 0.0–1.0 (defaults to the settings value).
    #[arg(short, long, value_name = "0.0-1.0")]
    pub quality: Option<f32>,

    /// Resize interpolation: nearest, bilinear, bicubic, lanczos3.
    #[arg(long, value_name = "METHOD")]
    pub interpolation: Option<Interpolation>,

    /// Settings file (JSON). Defaults to the per-user settings file if present.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Skip writing any output (useful with `pick`).
    #[arg(long)]
    pub no_output: bool,

    /// Print history details and per-file timing; enables debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

// ============================================================================
// Editing commands
// ============================================================================

/// One `--op` value.
#[derive(Clone, Debug, PartialEq)]
pub enum EditCommand {
    Resize { width: u32, height: u32 },
    ResizeWidth(u32),
    ResizeHeight(u32),
    Crop(CropRegion),
    Remove { target: Rgb, tolerance: f64 },
    Replace { target: Rgb, tolerance: f64, with: Rgb },
    Pick { x: i64, y: i64 },
    Undo,
    Redo,
    Reset,
}

impl FromStr for EditCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        let Some((&name, args)) = parts.split_first() else {
            return Err("empty command".to_string());
        };

        let expect = |n: usize| -> Result<(), String> {
            if args.len() == n {
                Ok(())
            } else {
                Err(format!("'{}' takes {} argument(s), got {}", name, n, args.len()))
            }
        };
        let dim = |s: &str| parse_dimension(s).map_err(|e| e.to_string());
        let int = |s: &str| s.parse::<i64>().map_err(|_| format!("'{}' is not an integer", s));
        let color = |s: &str| Rgb::from_hex(s).map_err(|e| e.to_string());
        let tolerance = |s: &str| s.parse::<f64>().map_err(|_| format!("'{}' is not a tolerance", s));

        match name.to_lowercase().as_str() {
            "resize" => {
                expect(2)?;
                Ok(EditCommand::Resize { width: dim(args[0])?, height: dim(args[1])? })
            }
            "resize-width" => {
                expect(1)?;
                Ok(EditCommand::ResizeWidth(dim(args[0])?))
            }
            "resize-height" => {
                expect(1)?;
                Ok(EditCommand::ResizeHeight(dim(args[0])?))
            }
            "crop" => {
                expect(4)?;
                Ok(EditCommand::Crop(CropRegion::new(
                    int(args[0])?,
                    int(args[1])?,
                    int(args[2])?,
                    int(args[3])?,
                )))
            }
            "remove" => {
                expect(2)?;
                Ok(EditCommand::Remove { target: color(args[0])?, tolerance: tolerance(args[1])? })
            }
            "replace" => {
                expect(3)?;
                Ok(EditCommand::Replace {
                    target: color(args[0])?,
                    tolerance: tolerance(args[1])?,
                    with: color(args[2])?,
                })
            }
            "pick" => {
                expect(2)?;
                Ok(EditCommand::Pick { x: int(args[0])?, y: int(args[1])? })
            }
            "undo" => expect(0).map(|_| EditCommand::Undo),
            "redo" => expect(0).map(|_| EditCommand::Redo),
            "reset" => expect(0).map(|_| EditCommand::Reset),
            other => Err(format!("unknown command '{}'", other)),
        }
    }
}

impl fmt::Display for EditCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditCommand::Resize { width, height } => write!(f, "resize {} {}", width, height),
            EditCommand::ResizeWidth(w) => write!(f, "resize-width {}", w),
            EditCommand::ResizeHeight(h) => write!(f, "resize-height {}", h),
            EditCommand::Crop(r) => write!(f, "crop {} {} {} {}", r.x, r.y, r.width, r.height),
            EditCommand::Remove { target, tolerance } => write!(f, "remove {} {}", target, tolerance),
            EditCommand::Replace { target, tolerance, with } => {
                write!(f, "replace {} {} {}", target, tolerance, with)
            }
            EditCommand::Pick { x, y } => write!(f, "pick {} {}", x, y),
            EditCommand::Undo => f.write_str("undo"),
            EditCommand::Redo => f.write_str("redo"),
            EditCommand::Reset => f.write_str("reset"),
        }
    }
}

impl EditCommand {
    /// Run against a session, returning the notice to show.
    pub fn apply(&self, session: &mut EditorSession) -> crate::error::Result<Notice> {
        match self {
            EditCommand::Resize { width, height } => session.resize(*width, *height),
            EditCommand::ResizeWidth(w) => session.resize_to_width(*w),
            EditCommand::ResizeHeight(h) => session.resize_to_height(*h),
            EditCommand::Crop(region) => session.crop(*region),
            EditCommand::Remove { target, tolerance } => {
                session.apply_color_op(*target, *tolerance, ColorMode::Erase)
            }
            EditCommand::Replace { target, tolerance, with } => {
                session.apply_color_op(*target, *tolerance, ColorMode::Replace(*with))
            }
            EditCommand::Pick { x, y } => session.pick_color(*x, *y).map(Notice::ColorPicked),
            EditCommand::Undo => session.undo(),
            EditCommand::Redo => session.redo(),
            EditCommand::Reset => session.reset_to_original(),
        }
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Resolve settings: `--config` must load if given; otherwise the per-user
/// file is used when it exists and parses.
pub fn load_settings(args: &CliArgs) -> anyhow::Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load_required(path)
            .with_context(|| format!("could not read settings '{}'", path.display()))?,
        None => match Settings::default_path() {
            Some(path) => Settings::load(&path).unwrap_or_else(|e| {
                // Runs before the logger is installed
                eprintln!("warning: ignoring settings file {}: {:#}", path.display(), e);
                Settings::default()
            }),
            None => Settings::default(),
        },
    };
    if let Some(interp) = args.interpolation {
        settings.interpolation = interp;
    }
    if let Some(q) = args.quality {
        settings.export_quality = q;
    }
    Ok(settings)
}

/// Run all CLI processing and return an OS exit code.
/// `0` = every file and command succeeded, `1` otherwise.
pub fn run(args: CliArgs, settings: Settings) -> ExitCode {
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if inputs.len() > 1 && (args.output.is_some() || args.name.is_some()) {
        eprintln!(
            "error: {} input files given but --output/--name only name a single file.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    let format = ExportFormat::infer(args.format, args.output.as_deref());

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!(
            "error: could not create output directory '{}': {}",
            dir.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }
        let file_start = Instant::now();

        match run_one(input_path, &args, &settings, format) {
            Ok(clean) => {
                any_failure |= !clean;
                if args.verbose {
                    println!(
                        "  done ({:.0}ms)",
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                tracing::error!(input = %input_path.display(), "{:#}", e);
                eprintln!("  error: {:#}", e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Per-file processing pipeline
// ============================================================================

/// Returns `Ok(false)` when some commands were rejected but the file was
/// still processed.
fn run_one(
    input: &Path,
    args: &CliArgs,
    settings: &Settings,
    format: ExportFormat,
) -> anyhow::Result<bool> {
    // -- Step 1: Load ----------------------------------------------------
    let mut session = EditorSession::new(settings.clone());
    let notice = session.load_path(input).context("load failed")?;
    println!("  {}", notice);

    // -- Step 2: Commands ------------------------------------------------
    let mut clean = true;
    for command in &args.ops {
        match command.apply(&mut session) {
            Ok(notice) => println!("  {}", notice),
            Err(e) => {
                tracing::warn!(command = %command, "{}", e);
                eprintln!("  {}: {}", command, e);
                clean = false;
            }
        }
    }
    if args.verbose {
        let history = session.history();
        println!(
            "  history: {} state(s), {} undo / {} redo, {:.1} MiB",
            history.len(),
            history.undo_count(),
            history.redo_count(),
            history.memory_usage() as f64 / (1024.0 * 1024.0)
        );
    }

    // -- Step 3: Save ----------------------------------------------------
    if args.no_output {
        return Ok(clean);
    }
    let output_path = build_output_path(&session, input, args, format)
        .with_context(|| format!("cannot determine output path for '{}'", input.display()))?;
    let notice = session
        .save_to(&output_path, format, settings.export_quality)
        .context("save failed")?;
    println!("  {}", notice);

    Ok(clean)
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand each `-i` value into input files.
///
/// A value naming an existing path is used as-is and anything else is read as
/// a glob. Files keep the order they first appear in; repeats are dropped.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut inputs: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let literal = Path::new(pattern);
        let found: Vec<PathBuf> = if literal.exists() {
            vec![literal.to_path_buf()]
        } else {
            match glob::glob(pattern) {
                Ok(paths) => paths
                    .filter_map(|entry| {
                        entry
                            .map_err(|e| tracing::warn!(%pattern, "skipping unreadable match: {}", e))
                            .ok()
                    })
                    .collect(),
                Err(e) => {
                    tracing::warn!(%pattern, "invalid glob: {}", e);
                    continue;
                }
            }
        };

        if found.is_empty() {
            tracing::warn!(%pattern, "pattern matched no files");
        }
        for path in found {
            if !inputs.contains(&path) {
                inputs.push(path);
            }
        }
    }

    inputs
}

/// Compute the output path for a single input file.
///
/// Priority:
/// 1. `--output` (explicit path, single-file input)
/// 2. `--name` (default-style file name in `--output-dir` or the current directory)
/// 3. `--output-dir` (input stem + format extension)
/// 4. Fallback: next to the input, same stem, new extension
///    (appends `_out` to the stem if it would overwrite the input)
fn build_output_path(
    session: &EditorSession,
    input: &Path,
    args: &CliArgs,
    format: ExportFormat,
) -> Option<PathBuf> {
    if let Some(out) = &args.output {
        return Some(out.clone());
    }

    if let Some(name) = &args.name {
        let dir = args.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        return Some(dir.join(session.default_file_name(Some(name), format)));
    }

    let ext = format.extension();
    let stem = input.file_stem()?.to_string_lossy().into_owned();

    if let Some(dir) = &args.output_dir {
        return Some(dir.join(format!("{}.{}", stem, ext)));
    }

    let parent = input.parent().unwrap_or(Path::new("."));
    let candidate = parent.join(format!("{}.{}", stem, ext));
    if candidate == input {
        Some(parent.join(format!("{}_out.{}", stem, ext)))
    } else {
        Some(candidate)
    }
}
