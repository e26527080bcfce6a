//! pen2pdf CLI - smartpen notebook export tool

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pen2pdf::archive::NotebookArchive;
use pen2pdf::device::MirrorSession;
use pen2pdf::render::to_json;
use pen2pdf::{
    connect_any, detect_archive_from_path, export_notebooks, output_path_for, BackgroundPolicy,
    CaptionTimezone, DeviceInfo, DeviceSession, ExportOptions, ExternalDecoder, JsonFormat,
    JsonLinesDecoder, MirrorConnector, NotebookRenderer, RenderEvent, RenderOptions, Rgb,
    StrokeDecoder, TimeOrigin, PRODUCT_IDS,
};

#[derive(Parser)]
#[command(name = "pen2pdf")]
#[command(version)]
#[command(about = "Export smartpen notebooks to PDF", long_about = None)]
struct Cli {
    /// Notebook archive to render
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(flatten)]
    decoder: DecoderArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one notebook archive to PDF
    Render {
        /// Notebook archive
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output PDF (defaults to the archive path with a .pdf extension)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Document title used in page captions and PDF metadata
        #[arg(long)]
        title: Option<String>,

        /// Device clock in milliseconds when the archive was fetched
        #[arg(long, value_name = "MS", conflicts_with = "device_info")]
        device_clock: Option<u64>,

        /// Pen info XML supplying the device clock
        #[arg(long, value_name = "FILE")]
        device_info: Option<PathBuf>,

        /// Write a JSON page report to this file ("-" for stdout)
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        /// Write the report as compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Export every notebook of a connected pen
    Sync {
        /// Device mirror directory
        #[arg(short, long, value_name = "DIR", env = "PEN2PDF_DEVICE")]
        device: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", env = "PEN2PDF_OUTPUT", default_value = ".")]
        output: PathBuf,

        /// Keep fetched archives next to the PDFs
        #[arg(long)]
        keep_archives: bool,

        /// Continue when a notebook fails to render
        #[arg(long)]
        skip_failed: bool,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// List the notebooks of a connected pen
    List {
        /// Device mirror directory
        #[arg(short, long, value_name = "DIR", env = "PEN2PDF_DEVICE")]
        device: PathBuf,
    },

    /// Show the page and background layout of an archive
    Info {
        /// Notebook archive
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone, Default)]
struct DecoderArgs {
    /// External stroke decoder program (JSON-lines pages are read natively otherwise)
    #[arg(long, value_name = "PROGRAM", env = "PEN2PDF_DECODER", global = true)]
    decoder: Option<PathBuf>,

    /// Argument passed to the decoder before the page path (repeatable)
    #[arg(long = "decoder-arg", value_name = "ARG", allow_hyphen_values = true, global = true)]
    decoder_args: Vec<String>,
}

impl DecoderArgs {
    fn build(&self) -> Box<dyn StrokeDecoder> {
        match &self.decoder {
            Some(program) => {
                let decoder =
                    ExternalDecoder::new(program).with_args(self.decoder_args.iter().cloned());
                log::debug!("decoding pages with {}", decoder.program().display());
                Box::new(decoder)
            }
            None => Box::new(JsonLinesDecoder::new()),
        }
    }
}

#[derive(Args, Clone, Default)]
struct RenderArgs {
    /// Page width in points
    #[arg(long, value_name = "PT")]
    page_width: Option<f32>,

    /// Ink colour as hex (e.g. 000073)
    #[arg(long, value_name = "HEX")]
    ink: Option<String>,

    /// Fail when a page has no background image
    #[arg(long)]
    strict_backgrounds: bool,

    /// Do not caption pages
    #[arg(long)]
    no_captions: bool,

    /// Print caption times in UTC instead of local time
    #[arg(long)]
    utc: bool,

    /// Do not compress PDF streams
    #[arg(long)]
    no_compress: bool,
}

impl RenderArgs {
    fn options(&self) -> pen2pdf::Result<RenderOptions> {
        let mut options = RenderOptions::new()
            .with_captions(!self.no_captions)
            .with_compression(!self.no_compress);

        if let Some(width) = self.page_width {
            options = options.with_page_width(width);
        }
        if let Some(ref hex) = self.ink {
            options = options.with_ink(Rgb::parse_hex(hex)?);
        }
        if self.strict_backgrounds {
            options = options.with_background_policy(BackgroundPolicy::Fail);
        }
        if self.utc {
            options.caption.timezone = CaptionTimezone::Utc;
        }

        options.validate()?;
        Ok(options)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Render {
            input,
            output,
            title,
            device_clock,
            device_info,
            report,
            compact,
            render,
        }) => {
            let origin = match (device_clock, device_info) {
                (Some(ms), _) => Ok(Some(TimeOrigin::from_device_clock(ms, Utc::now()))),
                (None, Some(path)) => origin_from_info(&path),
                (None, None) => Ok(None),
            };
            origin.and_then(|origin| {
                cmd_render(
                    &input,
                    output.as_deref(),
                    title.as_deref(),
                    origin.as_ref(),
                    report.as_deref(),
                    compact,
                    &render,
                    &cli.decoder,
                )
            })
        }
        Some(Commands::Sync {
            device,
            output,
            keep_archives,
            skip_failed,
            render,
        }) => cmd_sync(
            &device,
            &output,
            keep_archives,
            skip_failed,
            &render,
            &cli.decoder,
        ),
        Some(Commands::List { device }) => cmd_list(&device),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: render if input is provided
            if let Some(input) = cli.input {
                cmd_render(
                    &input,
                    None,
                    None,
                    None,
                    None,
                    false,
                    &RenderArgs::default(),
                    &cli.decoder,
                )
            } else {
                println!("{}", "Usage: pen2pdf <FILE>".yellow());
                println!("       pen2pdf --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn origin_from_info(path: &Path) -> Result<Option<TimeOrigin>, Box<dyn std::error::Error>> {
    let info = DeviceInfo::parse(&fs::read(path)?)?;
    if info.clock_ms.is_none() {
        eprintln!(
            "{}: {} has no device clock; captions will omit times",
            "Warning".yellow().bold(),
            path.display()
        );
    }
    Ok(info.time_origin(Utc::now()))
}

fn page_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

#[allow(clippy::too_many_arguments)]
fn cmd_render(
    input: &Path,
    output: Option<&Path>,
    title: Option<&str>,
    origin: Option<&TimeOrigin>,
    report: Option<&Path>,
    compact: bool,
    render: &RenderArgs,
    decoder: &DecoderArgs,
) -> CliResult {
    detect_archive_from_path(input)?;
    let options = render.options()?;
    let decoder = decoder.build();
    let renderer = NotebookRenderer::new(decoder.as_ref(), options);

    let default_title = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned());
    let title = title.map(str::to_string).or(default_title);

    let mut archive = NotebookArchive::open(input)?;
    let pb = page_bar(0);
    let mut notebook = renderer.render_with_progress(
        &mut archive,
        origin,
        title.as_deref(),
        |event| match event {
            RenderEvent::NotebookStart { page_count } => pb.set_length(*page_count as u64),
            RenderEvent::PageRendered(page) => {
                pb.set_message(format!("page {}", page.number));
                pb.inc(1);
            }
            RenderEvent::NotebookEnd => pb.finish_with_message("Done!"),
        },
    )?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| output_path_for(input));
    notebook.save(&output)?;
    println!(
        "{} {} ({} pages)",
        "Saved to".green(),
        output.display(),
        notebook.page_count()
    );

    if let Some(path) = report {
        let format = if compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        };
        let json = to_json(title.as_deref(), &notebook.pages, format)?;
        if path == Path::new("-") {
            println!("{}", json);
        } else {
            fs::write(path, &json)?;
            println!("{} {}", "Report saved to".green(), path.display());
        }
    }

    Ok(())
}

fn connect(device: &Path) -> Result<MirrorSession, Box<dyn std::error::Error>> {
    let connector = MirrorConnector::new(device);
    Ok(connect_any(&connector, &PRODUCT_IDS)?)
}

fn cmd_sync(
    device: &Path,
    output: &Path,
    keep_archives: bool,
    skip_failed: bool,
    render: &RenderArgs,
    decoder: &DecoderArgs,
) -> CliResult {
    let options = render.options()?;
    let decoder = decoder.build();
    let renderer = NotebookRenderer::new(decoder.as_ref(), options);

    let mut session = connect(device)?;
    let info = session.device_info()?;
    println!("{}", "Device".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {:#06x}", "Product".bold(), session.product_id());
    if let Some(ref pen_id) = info.pen_id {
        println!("{}: {}", "Pen".bold(), pen_id);
    }
    println!("{}", info.raw.trim().dimmed());
    println!();

    let export = ExportOptions::new(output)
        .with_keep_archives(keep_archives)
        .with_skip_failed(skip_failed);
    let exported = export_notebooks(&mut session, &renderer, &export, |entry, pdf| {
        println!("{} {} -> {}", "Exporting".green(), entry.title, pdf.display());
    });
    session.disconnect()?;
    let exported = exported?;

    let pages: usize = exported.iter().map(|n| n.pages).sum();
    println!(
        "\n{} {} notebooks, {} pages",
        "Done!".green().bold(),
        exported.len(),
        pages
    );
    Ok(())
}

fn cmd_list(device: &Path) -> CliResult {
    let mut session = connect(device)?;
    let info = session.device_info()?;
    let notebooks = session.notebooks()?;
    session.disconnect()?;

    println!("{}", "Device Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {:#06x}", "Product".bold(), session.product_id());
    if let Some(ref pen_id) = info.pen_id {
        println!("{}: {}", "Pen".bold(), pen_id);
    }
    match info.time_origin(Utc::now()) {
        Some(origin) => println!("{}: {}", "Clock origin".bold(), origin.epoch()),
        None => println!("{}: {}", "Clock origin".bold(), "unknown".dimmed()),
    }

    println!();
    println!("{} ({})", "Notebooks".cyan().bold(), notebooks.len());
    println!("{}", "─".repeat(40).dimmed());
    for (i, entry) in notebooks.iter().enumerate() {
        let branch = if i + 1 == notebooks.len() { "└─" } else { "├─" };
        println!(
            "  {} {} {}",
            branch.dimmed(),
            entry.title,
            entry.guid.dimmed()
        );
    }
    Ok(())
}

fn cmd_info(input: &Path) -> CliResult {
    let kind = detect_archive_from_path(input)?;
    let archive = NotebookArchive::open(input)?;
    let layout = archive.layout(&RenderOptions::default().patterns);

    println!("{}", "Archive Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), kind);
    println!("{}: {}", "Entries".bold(), archive.len());
    println!("{}: {}", "Pages".bold(), layout.page_count());
    println!("{}: {}", "Backgrounds".bold(), layout.backgrounds.len());
    println!(
        "{}: {}",
        "Output".bold(),
        output_path_for(input).display()
    );

    if !layout.pages.is_empty() {
        println!();
        println!("{}", "Pages".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for (i, page) in layout.pages.iter().enumerate() {
            let background = layout.background_for(i).unwrap_or("(none)");
            println!("  {:>4}  {}  {}", i + 1, page, background.dimmed());
        }
    }

    let ignored: Vec<String> = archive
        .entry_names()
        .into_iter()
        .filter(|name| !layout.pages.contains(name) && !layout.backgrounds.contains(name))
        .collect();
    if !ignored.is_empty() {
        println!();
        println!("{}", "Ignored Entries".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for name in &ignored {
            println!("  {}", name.dimmed());
        }
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pen2pdf".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Smartpen notebook to PDF export tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render_options() {
        let cli = Cli::try_parse_from([
            "pen2pdf",
            "render",
            "Notes.zip",
            "--ink",
            "ff0000",
            "--no-captions",
            "--decoder",
            "stf-decode",
            "--decoder-arg",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.decoder.decoder, Some(PathBuf::from("stf-decode")));
        assert_eq!(cli.decoder.decoder_args, vec!["--json".to_string()]);
        match cli.command {
            Some(Commands::Render { input, render, .. }) => {
                assert_eq!(input, PathBuf::from("Notes.zip"));
                let options = render.options().unwrap();
                assert_eq!(options.ink, Rgb(1.0, 0.0, 0.0));
                assert!(!options.caption.enabled);
            }
            _ => panic!("Expected render command"),
        }
    }

    #[test]
    fn test_render_args_reject_bad_ink() {
        let args = RenderArgs {
            ink: Some("zz".to_string()),
            ..RenderArgs::default()
        };
        assert!(args.options().is_err());
    }

    #[test]
    fn test_device_clock_conflicts_with_info() {
        let result = Cli::try_parse_from([
            "pen2pdf",
            "render",
            "Notes.zip",
            "--device-clock",
            "5",
            "--device-info",
            "info.xml",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_info_on_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        assert!(cmd_info(&dir.path().join("missing.zip")).is_err());
    }
}
