//! Summarize and embed commands - run the pipeline over a directory

use crate::cli::commands::common::{ChunkingArgs, FilterArgs};
use crate::cli::output::{colors, format_duration, print_warning};
use crate::cli::OutputFormat;
use crate::core::capability;
use crate::core::config::{CapabilityBackend, Config};
use crate::core::pipeline::DirectoryPipeline;
use crate::core::sink::{JsonSink, ResultSink, SinkTarget, TextReportSink, VectorRecordSink};
use crate::core::types::{OutputKind, PipelineResult, RunStats};
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Capability backend selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CapabilityChoice {
    /// Extractive summary (no model)
    Excerpt,
    /// Hashed character-trigram vectors
    Ngram,
    /// External program per chunk (--command, --arg)
    Command,
}

impl From<CapabilityChoice> for CapabilityBackend {
    fn from(choice: CapabilityChoice) -> Self {
        match choice {
            CapabilityChoice::Excerpt => CapabilityBackend::Excerpt,
            CapabilityChoice::Ngram => CapabilityBackend::Ngram,
            CapabilityChoice::Command => CapabilityBackend::Command,
        }
    }
}

/// Where and how results are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SinkKind {
    /// Pretty JSON object keyed by path
    Json,
    /// `--- path ---` text report
    Text,
    /// JSON Lines vector records (embed only)
    Vectors,
}

/// Arguments for the summarize and embed commands
#[derive(Args, Debug)]
pub struct PipelineArgs {
    /// Root directory to process
    pub path: PathBuf,

    /// Capability backend [default: excerpt for summarize, ngram for embed]
    #[arg(long, short = 'c', value_enum)]
    pub capability: Option<CapabilityChoice>,

    /// Program for the command backend
    #[arg(long, value_name = "PROGRAM")]
    pub command: Option<String>,

    /// Argument for the command program; `{path}` and `{chunk}` expand (repeatable)
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Vector width for the ngram embedder
    #[arg(long)]
    pub dimensions: Option<usize>,

    #[command(flatten)]
    pub chunking: ChunkingArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Files processed in parallel
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Stop starting new chunks after this many seconds (0 = no limit)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Also summarize each file's joined chunk summaries
    #[arg(long)]
    pub overview: bool,

    /// Write results with this sink
    #[arg(long, value_enum)]
    pub sink: Option<SinkKind>,

    /// Sink output file [default: stdout]
    #[arg(long, short = 'o', requires = "sink")]
    pub output: Option<PathBuf>,

    /// Suppress progress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl PipelineArgs {
    /// Fold flag overrides into the loaded configuration
    pub fn apply(&self, kind: OutputKind, config: &mut Config) {
        self.chunking.apply(&mut config.pipeline);
        self.filter.apply(&mut config.pipeline);

        if self.overview {
            config.pipeline.overview = true;
        }

        if let Some(choice) = self.capability {
            match kind {
                OutputKind::Summary => config.capability.summarizer = choice.into(),
                OutputKind::Embedding => config.capability.embedder = choice.into(),
            }
        }
        if let Some(program) = &self.command {
            config.capability.command = Some(program.clone());
        }
        if !self.args.is_empty() {
            config.capability.args = self.args.clone();
        }
        if let Some(dimensions) = self.dimensions {
            config.capability.dimensions = dimensions;
        }

        if let Some(workers) = self.workers {
            config.limits.workers = workers;
        }
        if let Some(timeout) = self.timeout_secs {
            config.limits.timeout_sec = timeout;
        }
    }
}

/// Run result response
#[derive(Debug, Serialize)]
pub struct RunResponse<'a> {
    pub root: String,
    pub kind: OutputKind,
    pub capability: String,
    pub stats: &'a RunStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<&'a PipelineResult>,
}

/// Execute the summarize or embed command
pub async fn execute(
    args: PipelineArgs,
    kind: OutputKind,
    mut config: Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = args.path.canonicalize().map_err(|e| {
        format!(
            "Invalid path '{}': {}. Make sure the path exists and is accessible.",
            args.path.display(),
            e
        )
    })?;

    if !path.is_dir() {
        return Err(format!(
            "Path '{}' is not a directory. Use `codebrief chunk` to inspect a single file.",
            path.display()
        )
        .into());
    }

    if args.sink == Some(SinkKind::Vectors) && kind == OutputKind::Summary {
        return Err("The vectors sink only applies to `codebrief embed`.".into());
    }

    if args.overview && kind == OutputKind::Embedding {
        print_warning("--overview only applies to summaries; ignoring it");
    }

    args.apply(kind, &mut config);
    config.validate()?;

    let capability = capability::from_config(&config.capability, kind)?;
    let capability_name = capability.name().to_string();

    let pipeline = DirectoryPipeline::from_config(&config, capability)?;

    let show_progress = !args.quiet && format == OutputFormat::Human;
    let pipeline = if show_progress {
        eprintln!(
            "{} {} with {}...",
            colors::label(match kind {
                OutputKind::Summary => "Summarizing",
                OutputKind::Embedding => "Embedding",
            }),
            colors::file_path(&path.display().to_string()),
            colors::dim(&capability_name)
        );
        pipeline.with_progress(|event| {
            eprintln!(
                "  [{}/{}] {}",
                event.completed,
                event.total,
                colors::file_path(&event.path.display().to_string())
            );
        })
    } else {
        pipeline
    };

    // Ctrl-C stops the run between chunks; partial results are still written
    let token = pipeline.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let pipeline = Arc::new(pipeline);
    let report = if config.limits.workers > 1 {
        Arc::clone(&pipeline).run_concurrent(&path).await?
    } else {
        let pipeline = Arc::clone(&pipeline);
        let root = path.clone();
        tokio::task::spawn_blocking(move || pipeline.run_with_stats(&root)).await??
    };
    interrupt.abort();

    let written = args.sink.map(|kind| {
        let target = SinkTarget::from_option(args.output.clone());
        let sink: Box<dyn ResultSink> = match kind {
            SinkKind::Json => Box::new(JsonSink::new(target)),
            SinkKind::Text => Box::new(TextReportSink::new(target)),
            SinkKind::Vectors => Box::new(VectorRecordSink::new(target)),
        };
        sink.write(&report.result)
    });

    // stdout belongs to the sink when it writes there
    let sink_owns_stdout = args.sink.is_some() && args.output.is_none();

    match format {
        OutputFormat::Human => {
            if args.sink.is_none() {
                print!("{}", TextReportSink::render(&report.result));
            }
            let summary = human_summary(&report.stats);
            if sink_owns_stdout {
                eprintln!("{summary}");
            } else {
                println!("{summary}");
            }
        }
        OutputFormat::Json => {
            let response = RunResponse {
                root: path.to_string_lossy().into_owned(),
                kind,
                capability: capability_name,
                stats: &report.stats,
                results: args.sink.is_none().then_some(&report.result),
            };
            let json = serde_json::to_string_pretty(&response)?;
            if sink_owns_stdout {
                eprintln!("{json}");
            } else {
                println!("{json}");
            }
        }
    }

    if let Some(Err(e)) = written {
        return Err(Box::new(e));
    }

    Ok(())
}

fn human_summary(stats: &RunStats) -> String {
    let mut line = format!(
        "{} {} files ({} chunks) in {}",
        colors::success("Processed"),
        colors::number(&stats.files_processed.to_string()),
        colors::number(&stats.chunks_processed.to_string()),
        colors::number(&format_duration(stats.duration_ms as f64 / 1000.0))
    );

    let mut notes = Vec::new();
    if stats.chunks_failed > 0 {
        notes.push(format!("{} chunks failed", stats.chunks_failed));
    }
    if stats.files_unreadable > 0 {
        notes.push(format!("{} unreadable", stats.files_unreadable));
    }
    if stats.files_failed > 0 {
        notes.push(format!("{} aborted", stats.files_failed));
    }
    if stats.files_ignored > 0 {
        notes.push(format!("{} ignored", stats.files_ignored));
    }
    if !notes.is_empty() {
        line.push_str(&format!(" ({})", notes.join(", ")));
    }
    if stats.cancelled {
        line.push_str(&format!(" {}", colors::warning("[cancelled]")));
    }
    line
}
