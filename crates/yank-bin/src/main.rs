//! multiyank entrypoint: one multi-caret yank over a file, reported as JSON.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use core_actions::{BufferMotionResolver, MotionKind, YankEngine, YankReport};
use core_config::{SessionState, discover_session, load_from, load_session, save_session};
use core_model::EditorModel;
use core_state::{Register, SelectionType, TextRange};
use core_text::Buffer;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Once;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE_NAME: &str = "multiyank.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "multiyank", version, about = "Multi-caret yank over a text file")]
struct Args {
    /// File to yank from (UTF-8 text).
    pub path: PathBuf,
    /// Caret char offset; repeat for more carets. The first one is primary.
    #[arg(long = "caret", required = true)]
    pub carets: Vec<usize>,
    /// Optional configuration file path (overrides discovery of `multiyank.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Session file path (overrides the platform data dir).
    #[arg(long = "session")]
    pub session: Option<PathBuf>,
    /// Register receiving this yank (`"x` in Vim).
    #[arg(long = "register")]
    pub register: Option<char>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Yank `count` lines from each caret (`yy`).
    Line {
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Yank over a motion from each caret (`y{motion}`).
    Motion {
        #[arg(value_enum)]
        motion: MotionArg,
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Yank an explicit range, one `START:END` span per caret.
    Range {
        #[arg(long = "span", value_parser = parse_span, required = true)]
        spans: Vec<(usize, usize)>,
        #[arg(long, value_enum, default_value_t = KindArg::Char)]
        kind: KindArg,
        #[arg(long)]
        move_cursor: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum MotionArg {
    #[value(alias = "h")]
    Left,
    #[value(alias = "l")]
    Right,
    #[value(alias = "0")]
    LineStart,
    #[value(alias = "$")]
    LineEnd,
    #[value(alias = "^")]
    FirstNonBlank,
    #[value(alias = "w")]
    WordForward,
    #[value(alias = "e")]
    WordEnd,
    #[value(alias = "b")]
    WordBackward,
    #[value(alias = "k")]
    Up,
    #[value(alias = "j")]
    Down,
    #[value(alias = "+")]
    DownFirstNonBlank,
    #[value(alias = "-")]
    UpFirstNonBlank,
    #[value(name = "down-less-one-first-non-blank", alias = "_")]
    DownLess1FirstNonBlank,
}

impl From<MotionArg> for MotionKind {
    fn from(arg: MotionArg) -> Self {
        match arg {
            MotionArg::Left => MotionKind::Left,
            MotionArg::Right => MotionKind::Right,
            MotionArg::LineStart => MotionKind::LineStart,
            MotionArg::LineEnd => MotionKind::LineEnd,
            MotionArg::FirstNonBlank => MotionKind::FirstNonBlank,
            MotionArg::WordForward => MotionKind::WordForward,
            MotionArg::WordEnd => MotionKind::WordEnd,
            MotionArg::WordBackward => MotionKind::WordBackward,
            MotionArg::Up => MotionKind::Up,
            MotionArg::Down => MotionKind::Down,
            MotionArg::DownFirstNonBlank => MotionKind::DownFirstNonBlank,
            MotionArg::UpFirstNonBlank => MotionKind::UpFirstNonBlank,
            MotionArg::DownLess1FirstNonBlank => MotionKind::DownLess1FirstNonBlank,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum KindArg {
    Char,
    Line,
    Block,
}

impl From<KindArg> for SelectionType {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Char => SelectionType::CharacterWise,
            KindArg::Line => SelectionType::LineWise,
            KindArg::Block => SelectionType::BlockWise,
        }
    }
}

fn parse_span(raw: &str) -> Result<(usize, usize), String> {
    let (start, end) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got {raw:?}"))?;
    let start = start.trim().parse().map_err(|e| format!("bad start {start:?}: {e}"))?;
    let end = end.trim().parse().map_err(|e| format!("bad end {end:?}: {e}"))?;
    Ok((start, end))
}

/// JSON document printed on stdout.
#[derive(Debug, Serialize)]
struct Outcome {
    success: bool,
    error: Option<String>,
    report: Option<YankReport>,
    register: Option<Register>,
    carets: Vec<usize>,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn run(&mut self) -> Result<Outcome> {
        self.configure_logging()?;
        Self::install_panic_hook();

        info!(target: "runtime", "startup");
        let args = Args::parse();
        let outcome = execute(&args)?;
        info!(
            target: "runtime",
            success = outcome.success,
            carets = outcome.carets.len(),
            "shutdown"
        );
        Ok(outcome)
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join(LOG_FILE_NAME);
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .with_ansi(false)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }

        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

/// Record the first version that ran against this session file. Session trouble is
/// never fatal to a yank.
fn touch_session(path: &Path) {
    let mut session = match load_session(path) {
        Ok(state) => state,
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "session_load_failed");
            SessionState::default()
        }
    };
    if session.record_first_version(env!("CARGO_PKG_VERSION")) {
        if let Err(e) = save_session(path, &session) {
            warn!(target: "config", path = %path.display(), error = %e, "session_save_failed");
        } else {
            info!(target: "config", version = %session.first_version, "session_first_version_recorded");
        }
    }
}

fn load_model(path: &Path, carets: &[usize]) -> Result<EditorModel> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("file");
    tracing::debug!(
        target: "io",
        file = %path.display(),
        size_bytes = content.len(),
        carets = carets.len(),
        "file_read_ok"
    );
    let buffer = Buffer::from_str(name, &content)?;
    Ok(EditorModel::with_carets(buffer, carets.iter().copied()))
}

fn execute(args: &Args) -> Result<Outcome> {
    let config = load_from(args.config.clone())?;
    let session_path = args.session.clone().unwrap_or_else(discover_session);
    touch_session(&session_path);

    let mut model = load_model(&args.path, &args.carets)?;
    let mut engine = YankEngine::from_config(&config).context("invalid default register in config")?;
    run_command(&args.command, args.register, &mut model, &mut engine)
}

fn run_command(
    command: &Command,
    register: Option<char>,
    model: &mut EditorModel,
    engine: &mut YankEngine,
) -> Result<Outcome> {
    if let Some(name) = register {
        engine
            .select_register(name)
            .with_context(|| format!("cannot yank into register {name:?}"))?;
    }
    let (text, carets) = model.split_text_and_carets();
    let result = match command {
        Command::Line { count } => engine.try_yank_line(text, carets, *count),
        Command::Motion { motion, count } => {
            engine.try_yank_motion(text, carets, &BufferMotionResolver, (*motion).into(), *count)
        }
        Command::Range {
            spans,
            kind,
            move_cursor,
        } => {
            let range = TextRange::from_spans(spans.iter().copied())
                .context("at least one --span is required")?;
            engine.try_yank_range(text, carets, &range, (*kind).into(), *move_cursor)
        }
    };
    let (report, error) = match result {
        Ok(report) => (Some(report), None),
        Err(e) => (None, Some(e.to_string())),
    };
    Ok(Outcome {
        success: error.is_none(),
        error,
        report,
        register: engine.registers().last_register().cloned(),
        carets: model.carets().offsets(),
    })
}

fn main() -> Result<ExitCode> {
    let mut startup = AppStartup::new();
    let outcome = startup.run()?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
