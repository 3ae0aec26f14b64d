//! Configuration: `config.conf` (working directory, line-oriented) merged
//! with CLI overrides, plus the run/output/backend mode enums and the
//! on-disk path conventions under `./data/`.

use crate::error::{EngineError, EngineResult};
use crate::layout::PinMask;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Analyze,
    Compare,
    Rank,
    Generate,
    Improve,
    Benchmark,
    Help,
    Info,
}

impl RunMode {
    pub fn parse(s: &str) -> EngineResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "analyze" => Ok(RunMode::Analyze),
            "compare" => Ok(RunMode::Compare),
            "rank" => Ok(RunMode::Rank),
            "generate" => Ok(RunMode::Generate),
            "improve" => Ok(RunMode::Improve),
            "benchmark" => Ok(RunMode::Benchmark),
            "help" => Ok(RunMode::Help),
            "info" => Ok(RunMode::Info),
            other => Err(EngineError::ConfigurationInvalid(format!(
                "unrecognized run mode '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Quiet,
    Normal,
    Verbose,
}

impl OutputMode {
    pub fn parse(s: &str) -> EngineResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" => Ok(OutputMode::Quiet),
            "normal" => Ok(OutputMode::Normal),
            "verbose" => Ok(OutputMode::Verbose),
            other => Err(EngineError::ConfigurationInvalid(format!(
                "unrecognized output mode '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Cpu,
    Gpu,
}

impl BackendMode {
    pub fn parse(s: &str) -> EngineResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(BackendMode::Cpu),
            "gpu" => Ok(BackendMode::Gpu),
            other => Err(EngineError::ConfigurationInvalid(format!(
                "unrecognized backend mode '{other}'"
            ))),
        }
    }
}

/// Fully resolved run configuration: `config.conf` values overridden
/// field-by-field by whatever the CLI actually supplied.
#[derive(Debug, Clone)]
pub struct Context {
    pub pins: PinMask,
    pub lang: String,
    pub corpus: String,
    pub layout: Option<String>,
    pub layout2: Option<String>,
    pub weight: Option<String>,
    pub run_mode: RunMode,
    pub repetitions: usize,
    pub threads: usize,
    pub output_mode: OutputMode,
    pub backend_mode: BackendMode,
}

impl Context {
    pub fn lang_file_path(&self) -> PathBuf {
        PathBuf::from("data").join(&self.lang).join(format!("{}.lang", self.lang))
    }

    pub fn corpus_text_path(&self) -> PathBuf {
        PathBuf::from("data")
            .join(&self.lang)
            .join("corpora")
            .join(format!("{}.txt", self.corpus))
    }

    pub fn corpus_cache_path(&self) -> PathBuf {
        PathBuf::from("data")
            .join(&self.lang)
            .join("corpora")
            .join(format!("{}.cache", self.corpus))
    }

    pub fn weight_file_path(&self, name: &str) -> PathBuf {
        PathBuf::from("data").join("weights").join(format!("{name}.wght"))
    }

    pub fn layout_file_path(&self, name: &str) -> PathBuf {
        PathBuf::from("data")
            .join(&self.lang)
            .join("layouts")
            .join(format!("{name}.glg"))
    }
}

/// Raw `config.conf` contents before CLI overrides are applied.
#[derive(Debug, Clone)]
struct FileConfig {
    pins: String,
    lang: String,
    corpus: String,
    layout: String,
    layout2: String,
    weight: String,
    run_mode: String,
    repetitions: String,
    threads: String,
    output_mode: String,
    backend_mode: String,
}

/// Parses `config.conf`'s line-oriented `key: value` format. Every key is
/// mandatory and must appear in the documented order.
fn parse_file_config(body: &str) -> EngineResult<FileConfig> {
    let mut lines = body.lines().filter(|l| !l.trim().is_empty());
    let mut field = |expected_key: &str| -> EngineResult<String> {
        let line = lines.next().ok_or_else(|| {
            EngineError::ConfigurationMissing(format!("config.conf missing '{expected_key}' line"))
        })?;
        let (key, value) = line.split_once(':').ok_or_else(|| {
            EngineError::ConfigurationInvalid(format!("malformed config.conf line: {line}"))
        })?;
        let key = key.trim();
        if key != expected_key {
            return Err(EngineError::ConfigurationInvalid(format!(
                "expected '{expected_key}:' line, got '{key}:'"
            )));
        }
        Ok(value.trim().to_string())
    };

    Ok(FileConfig {
        pins: field("pins")?,
        lang: field("lang")?,
        corpus: field("corpus")?,
        layout: field("layout")?,
        layout2: field("layout2")?,
        weight: field("weight")?,
        run_mode: field("run_mode")?,
        repetitions: field("repetitions")?,
        threads: field("threads")?,
        output_mode: field("output_mode")?,
        backend_mode: field("backend_mode")?,
    })
}

/// Command-line surface: short flags mirror the on-disk config keys, plus
/// an explicit long-form mode alias. Any flag actually supplied overrides
/// the corresponding `config.conf` value.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Keyboard layout scorer and optimizer", long_about = None)]
pub struct Cli {
    #[arg(short = 'l', long = "lang")]
    pub lang: Option<String>,

    #[arg(short = 'c', long = "corpus")]
    pub corpus: Option<String>,

    #[arg(short = '1', long = "layout")]
    pub layout: Option<String>,

    #[arg(short = '2', long = "layout2")]
    pub layout2: Option<String>,

    #[arg(short = 'w', long = "weight")]
    pub weight: Option<String>,

    #[arg(short = 'r', long = "repetitions")]
    pub repetitions: Option<usize>,

    #[arg(short = 't', long = "threads")]
    pub threads: Option<usize>,

    #[arg(short = 'm', long = "mode")]
    pub mode: Option<String>,

    #[arg(short = 'o', long = "output")]
    pub output: Option<String>,

    #[arg(short = 'b', long = "backend")]
    pub backend: Option<String>,
}

/// Builds the effective `Context` from `config.conf`'s body plus whatever
/// the CLI actually supplied; CLI values win field by field.
pub fn build_context(file_body: &str, cli: &Cli) -> EngineResult<Context> {
    let file = parse_file_config(file_body)?;

    let lang = cli.lang.clone().unwrap_or(file.lang);
    let corpus = cli.corpus.clone().unwrap_or(file.corpus);
    let layout = cli.layout.clone().or(non_empty(file.layout));
    let layout2 = cli.layout2.clone().or(non_empty(file.layout2));
    let weight = cli.weight.clone().or(non_empty(file.weight));

    let run_mode = RunMode::parse(cli.mode.as_deref().unwrap_or(&file.run_mode))?;
    let output_mode = OutputMode::parse(cli.output.as_deref().unwrap_or(&file.output_mode))?;
    let backend_mode = BackendMode::parse(cli.backend.as_deref().unwrap_or(&file.backend_mode))?;

    let repetitions = match cli.repetitions {
        Some(v) => v,
        None => parse_nonnegative(&file.repetitions, "repetitions")?,
    };
    let threads = match cli.threads {
        Some(v) => v,
        None => parse_nonnegative(&file.threads, "threads")?,
    };

    let pins = PinMask::parse(&file.pins)?;

    Ok(Context {
        pins,
        lang,
        corpus,
        layout,
        layout2,
        weight,
        run_mode,
        repetitions,
        threads,
        output_mode,
        backend_mode,
    })
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn parse_nonnegative(s: &str, field: &str) -> EngineResult<usize> {
    s.parse::<usize>()
        .map_err(|_| EngineError::ConfigurationInvalid(format!("'{field}' must be a non-negative integer, got '{s}'")))
}
