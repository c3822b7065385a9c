use std::io::{self, IsTerminal, Stderr, Stdout, Write};

use clap::Args;
use dirbase_fs::FileRecord;

/// Trait for writing status messages (baseline progress, summaries).
pub trait StatusWriter {
    fn write_status(&mut self, msg: &str) -> io::Result<()>;
}

/// Default status writer that outputs to stderr.
pub struct StderrWriter;

impl StatusWriter for StderrWriter {
    fn write_status(&mut self, msg: &str) -> io::Result<()> {
        eprintln!("{}", msg);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output with optional colors.
    #[default]
    Human,
    /// NDJSON (newline-delimited JSON) for machine consumption.
    Json,
}

/// Color handling strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Default)]
pub struct PrinterConfig {
    pub format: OutputFormat,
    pub color: ColorChoice,
    /// Suppress the trailing summary.
    pub quiet: bool,
}

#[derive(Debug, Args)]
pub struct OutputOptions {
    /// Output changes as NDJSON (one JSON object per line)
    #[arg(long)]
    pub json: bool,

    /// When to use colors: auto, always, never
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: String,

    /// Suppress the summary line
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl OutputOptions {
    pub fn config(&self) -> PrinterConfig {
        let format = if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        };

        let color = match self.color.as_str() {
            "always" => ColorChoice::Always,
            "never" => ColorChoice::Never,
            _ => ColorChoice::Auto,
        };

        PrinterConfig {
            format,
            color,
            quiet: self.quiet,
        }
    }

    pub fn make_printer(&self) -> Box<dyn DiffPrinter> {
        let cfg = self.config();
        match cfg.format {
            OutputFormat::Human => Box::new(HumanPrinter::<Stdout, Stderr>::stdout(cfg)),
            OutputFormat::Json => Box::new(JsonPrinter::<Stdout, Stderr>::stdout(cfg)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Modified,
    New,
    Deleted,
}

impl ChangeKind {
    pub fn name(self) -> &'static str {
        match self {
            ChangeKind::Modified => "modified",
            ChangeKind::New => "new",
            ChangeKind::Deleted => "deleted",
        }
    }

    fn marker(self) -> char {
        match self {
            ChangeKind::Modified => 'M',
            ChangeKind::New => '+',
            ChangeKind::Deleted => '-',
        }
    }

    fn color(self) -> &'static str {
        match self {
            ChangeKind::Modified => "\x1b[33m",
            ChangeKind::New => "\x1b[32m",
            ChangeKind::Deleted => "\x1b[31m",
        }
    }
}

/// Static context about a diff print run.
#[derive(Debug)]
pub struct DiffPrintContext<'a> {
    /// Folders that were compared
    pub folders: &'a [String],
    /// Folders absent from the baseline
    pub missing: &'a [String],
    pub modified: usize,
    pub new: usize,
    pub deleted: usize,
}

impl DiffPrintContext<'_> {
    pub fn total(&self) -> usize {
        self.modified + self.new + self.deleted
    }
}

#[derive(Debug)]
pub struct DiffRow<'a> {
    pub change: ChangeKind,
    pub record: &'a FileRecord,
}

/// Receives the rows of one diff between `begin` and `finish`.
pub trait DiffPrinter {
    fn begin(&mut self, ctx: &DiffPrintContext) -> io::Result<()>;

    fn print_row(&mut self, row: &DiffRow<'_>, ctx: &DiffPrintContext) -> io::Result<()>;

    /// Footer and summary.
    fn finish(&mut self, ctx: &DiffPrintContext) -> io::Result<()>;
}

pub struct HumanPrinter<W: Write, E: Write> {
    out: W,
    err: E,
    cfg: PrinterConfig,
    use_color: bool,
}

impl<W: Write, E: Write> HumanPrinter<W, E> {
    /// `ColorChoice::Auto` means no color here; only [`HumanPrinter::stdout`]
    /// can see the terminal.
    pub fn new(out: W, err: E, cfg: PrinterConfig) -> Self {
        let use_color = cfg.color == ColorChoice::Always;
        Self {
            out,
            err,
            cfg,
            use_color,
        }
    }

    pub fn stdout(cfg: PrinterConfig) -> HumanPrinter<Stdout, Stderr> {
        let use_color = match cfg.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stdout().is_terminal(),
        };

        HumanPrinter {
            out: io::stdout(),
            err: io::stderr(),
            cfg,
            use_color,
        }
    }

    pub fn into_inner(self) -> (W, E) {
        (self.out, self.err)
    }
}

impl<W: Write, E: Write> DiffPrinter for HumanPrinter<W, E> {
    fn begin(&mut self, ctx: &DiffPrintContext) -> io::Result<()> {
        for folder in ctx.missing {
            writeln!(self.err, "[diff] not in baseline: {folder}")?;
        }
        Ok(())
    }

    fn print_row(&mut self, row: &DiffRow<'_>, _ctx: &DiffPrintContext) -> io::Result<()> {
        let marker = row.change.marker();
        if self.use_color {
            writeln!(
                self.out,
                "{}{} {}\x1b[0m",
                row.change.color(),
                marker,
                row.record.path
            )
        } else {
            writeln!(self.out, "{} {}", marker, row.record.path)
        }
    }

    fn finish(&mut self, ctx: &DiffPrintContext) -> io::Result<()> {
        if self.cfg.quiet {
            return Ok(());
        }

        writeln!(
            self.err,
            "\n[diff] {} folder(s): {} modified, {} new, {} deleted",
            ctx.folders.len(),
            ctx.modified,
            ctx.new,
            ctx.deleted
        )
    }
}

pub struct JsonPrinter<W: Write, E: Write> {
    out: W,
    err: E,
    cfg: PrinterConfig,
}

impl<W: Write, E: Write> JsonPrinter<W, E> {
    pub fn new(out: W, err: E, cfg: PrinterConfig) -> Self {
        Self { out, err, cfg }
    }

    pub fn stdout(cfg: PrinterConfig) -> JsonPrinter<Stdout, Stderr> {
        JsonPrinter {
            out: io::stdout(),
            err: io::stderr(),
            cfg,
        }
    }

    pub fn into_inner(self) -> (W, E) {
        (self.out, self.err)
    }
}

impl<W: Write, E: Write> DiffPrinter for JsonPrinter<W, E> {
    fn begin(&mut self, ctx: &DiffPrintContext) -> io::Result<()> {
        for folder in ctx.missing {
            let obj = serde_json::json!({
                "type": "missing",
                "folder": folder,
            });
            writeln!(self.out, "{}", obj)?;
        }
        Ok(())
    }

    fn print_row(&mut self, row: &DiffRow<'_>, _ctx: &DiffPrintContext) -> io::Result<()> {
        let r = row.record;
        let obj = serde_json::json!({
            "change": row.change.name(),
            "path": r.path,
            "size": r.size,
            "permissions": format!("{:o}", r.permissions),
            "mtime": r.mtime_secs,
        });
        writeln!(self.out, "{}", obj)
    }

    fn finish(&mut self, ctx: &DiffPrintContext) -> io::Result<()> {
        if self.cfg.quiet {
            return Ok(());
        }

        let obj = serde_json::json!({
            "type": "summary",
            "folders": ctx.folders,
            "missing": ctx.missing,
            "total": ctx.total(),
            "modified": ctx.modified,
            "new": ctx.new,
            "deleted": ctx.deleted,
        });
        writeln!(self.err, "{}", obj)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
