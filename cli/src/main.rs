use anyhow::Context;
use clap::{Parser, ValueEnum};
use fdspatch_core::report::{render_json, render_text};
use fdspatch_core::{
    classify, load_image, patch_file, Classification, LoggingProgress, PatchOptions,
    PatchOutcome, ReplaceStrategy,
};
use log::debug;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fdspatch", version)]
#[command(about = "Inspect Famicom Disk System images and add the FDSLoader header", long_about = None)]
struct Cli {
    /// FDS image file
    file: PathBuf,

    /// Display information about the FDS file. This is the default action
    #[arg(short, long, overrides_with = "convert")]
    print: bool,

    /// Add the FDSLoader header if required. Files that already have a
    /// header, or whose size is not a recognised FDS image size, are left
    /// unchanged
    #[arg(short, long, overrides_with = "print")]
    convert: bool,

    /// Print the report as JSON
    #[arg(long, conflicts_with = "convert")]
    json: bool,

    /// With --convert, report what would be written without touching the file
    #[arg(long, requires = "convert")]
    dry_run: bool,

    /// How the patched file replaces the original
    #[arg(long, value_enum, default_value_t = ReplaceMode::Atomic)]
    replace: ReplaceMode,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log classification details
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReplaceMode {
    /// Rename the patched file over the original in one step
    Atomic,
    /// Remove the original first, then rename the patched file into place
    RemoveThenRename,
}

impl From<ReplaceMode> for ReplaceStrategy {
    fn from(mode: ReplaceMode) -> Self {
        match mode {
            ReplaceMode::Atomic => ReplaceStrategy::Atomic,
            ReplaceMode::RemoveThenRename => ReplaceStrategy::RemoveThenRename,
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version still exit successfully
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    init_logging(&cli);

    if let Err(e) = run(&cli) {
        eprintln!("fdspatch: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut image = load_image(&cli.file)?;
    let classification = classify(&image)?;
    debug!("{}: {:?}", cli.file.display(), classification);

    if cli.convert {
        convert(cli, &classification, &mut image)
    } else {
        print_report(cli, &classification)
    }
}

fn print_report(cli: &Cli, classification: &Classification) -> anyhow::Result<()> {
    if cli.json {
        println!("{}", render_json(classification)?);
    } else {
        print!("{}", render_text(classification));
    }
    Ok(())
}

fn convert(cli: &Cli, classification: &Classification, image: &mut Vec<u8>) -> anyhow::Result<()> {
    let options = PatchOptions {
        strategy: cli.replace.into(),
        dry_run: cli.dry_run,
    };

    let outcome = patch_file(classification, image, &cli.file, &options, &LoggingProgress)
        .with_context(|| format!("Failed to convert {}", cli.file.display()))?;

    match outcome {
        PatchOutcome::AlreadyHeadered => {
            println!("{}: FDS header already present, left unchanged", cli.file.display());
        }
        PatchOutcome::Patched { new_len } => {
            println!("{}: added FDS header ({} bytes)", cli.file.display(), new_len);
        }
        PatchOutcome::DryRun { new_len } => {
            println!("{}: would add FDS header ({} bytes)", cli.file.display(), new_len);
        }
    }
    Ok(())
}
