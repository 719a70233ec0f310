use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};

use litdoc::generator::{watch, Generator, GeneratorOptions, RunProgress, SourceWalker};
use litdoc::highlight::{self, HighlighterChoice};
use litdoc::languages::{GuesserChain, LanguageConfig, LanguageRegistry};
use litdoc::render::PageTemplate;

#[derive(Parser)]
#[command(name = "litdoc")]
#[command(about = "Generate side-by-side literate documentation from annotated source files")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Document a few files into ./docs
    litdoc src/main.py src/util.py

    # Walk a directory, keep its layout and write an index page
    litdoc -p -i src/

    # Keep going when a file cannot be processed
    litdoc -s 'scripts/*'

    # Regenerate pages as sources change
    litdoc --watch src/app.js
"#)]
pub struct Cli {
    /// Source files, directories or glob patterns
    #[arg(required = true)]
    pub sources: Vec<PathBuf>,

    /// Preserve path structure of original files
    #[arg(short = 'p', long = "paths")]
    pub paths: bool,

    /// The output directory that the rendered files should go to
    #[arg(short = 'd', long = "directory", default_value = "docs")]
    pub directory: PathBuf,

    /// Force the language for the given files
    #[arg(short = 'l', long)]
    pub language: Option<String>,

    /// Generate an index.html linking every page
    #[arg(short = 'i', long)]
    pub index: bool,

    /// Watch original files and regenerate pages on change
    #[arg(short = 'w', long)]
    pub watch: bool,

    /// Continue processing after hitting a bad file
    #[arg(short = 's', long = "skip-bad-files")]
    pub skip_bad_files: bool,

    /// Page template to use instead of the built-in one
    #[arg(short = 't', long)]
    pub template: Option<PathBuf>,

    /// Syntax highlighter
    #[arg(long, value_enum, default_value_t = HighlighterArg::Auto)]
    pub highlighter: HighlighterArg,

    /// Language config file (default: .litdoc.yml if present)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum HighlighterArg {
    Auto,
    Pygments,
    Plain,
}

impl From<HighlighterArg> for HighlighterChoice {
    fn from(arg: HighlighterArg) -> Self {
        match arg {
            HighlighterArg::Auto => HighlighterChoice::Auto,
            HighlighterArg::Pygments => HighlighterChoice::Pygments,
            HighlighterArg::Plain => HighlighterChoice::Plain,
        }
    }
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Cannot read the working directory")?;
    let config = LanguageConfig::discover(cli.config.as_deref(), &cwd)?;
    let registry = LanguageRegistry::with_config(&config)?;

    let sources = SourceWalker::new(&registry).collect(&cli.sources)?;
    if sources.is_empty() {
        bail!("No source files to document");
    }
    tracing::debug!("Documenting {} files", sources.len());

    let template = match &cli.template {
        Some(path) => PageTemplate::load(path)
            .with_context(|| format!("Cannot use template {}", path.display()))?,
        None => PageTemplate::builtin(),
    };

    let generator = Generator::new(GeneratorOptions {
        outdir: cli.directory.clone(),
        preserve_paths: cli.paths,
        language: cli.language.clone(),
        index: cli.index,
        skip_bad_files: cli.skip_bad_files,
    })
    .with_registry(registry)
    .with_guesser(Box::new(GuesserChain::default()))
    .with_highlighter(highlight::select(cli.highlighter.into()))
    .with_template(template);

    let progress = RunProgress::new(sources.len());
    let report = generator.process(&sources, &progress);
    progress.finish();
    let report = report?;

    let snapshot = progress.snapshot();
    println!(
        "Documented {} of {} files in {} ms",
        snapshot.pages_written, snapshot.files_total, snapshot.elapsed_ms
    );

    if snapshot.failures > 0 {
        eprintln!("Skipped {} files:", snapshot.failures);
        for (source, e) in &report.failures {
            eprintln!("  {}: {}", source.display(), e);
        }
    }

    if cli.watch {
        watch(&generator, &sources)?;
    }

    Ok(())
}
