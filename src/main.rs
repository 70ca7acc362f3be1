// Command-line entry point for xml2md.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use xml2md::application::{ConvertUsecase, DependencyContext};
use xml2md::config::Config;
use xml2md::domain::{DependencyResolver, Direction, FunctionIndex, LinkResolver, TreeRenderer};
use xml2md::infrastructure::concurrency::init_thread_pool;
use xml2md::infrastructure::discovery::build_doc_lookup;
use xml2md::infrastructure::{AnalysisLoader, MarkdownExporter, PurposeCache, XmlDocumentParser};
use xml2md::ports::NoExcerpts;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct LimitArgs {
    /// TOML config file (max_depth, max_children, jobs)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum outline depth, in call edges
    #[arg(long)]
    max_depth: Option<usize>,

    /// Maximum expanded neighbours per outline node
    #[arg(long)]
    max_children: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a doc.xml file, or every doc.xml below a directory, to Markdown
    Convert {
        /// Input XML file or directory containing doc.xml files
        path: PathBuf,

        /// Analysis result (JSON) with function call relations
        analysis: Option<PathBuf>,

        /// Output Markdown file (single-file input only; stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worker threads for directory conversion
        #[arg(short, long)]
        jobs: Option<usize>,

        #[command(flatten)]
        limits: LimitArgs,
    },
    /// Print the caller/callee outline of a function from an analysis result
    Deps {
        /// Analysis result (JSON)
        analysis: PathBuf,

        /// Function name (or id)
        name: String,

        /// Which side of the call graph to print
        #[arg(short, long, value_enum, default_value = "both")]
        direction: DirectionArg,

        #[command(flatten)]
        limits: LimitArgs,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum DirectionArg {
    Callers,
    Callees,
    Both,
}

impl DirectionArg {
    fn directions(self) -> &'static [Direction] {
        match self {
            DirectionArg::Callers => &[Direction::Callers],
            DirectionArg::Callees => &[Direction::Callees],
            DirectionArg::Both => &[Direction::Callers, Direction::Callees],
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let result = match cli.command {
        Command::Convert {
            path,
            analysis,
            output,
            jobs,
            limits,
        } => run_convert(&path, analysis.as_deref(), output.as_deref(), jobs, &limits),
        Command::Deps {
            analysis,
            name,
            direction,
            limits,
        } => run_deps(&analysis, &name, direction, &limits),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(limits: &LimitArgs, jobs: Option<usize>) -> Result<Config> {
    Config::load_or_default(limits.config.as_deref())?.with_overrides(
        limits.max_depth,
        limits.max_children,
        jobs,
    )
}

fn run_convert(
    path: &Path,
    analysis: Option<&Path>,
    output: Option<&Path>,
    jobs: Option<usize>,
    limits: &LimitArgs,
) -> Result<ExitCode> {
    let config = load_config(limits, jobs)?;

    if !path.exists() {
        bail!("Input path does not exist: {}", path.display());
    }
    if path.is_dir() && output.is_some() {
        bail!("--output cannot be used with a directory input");
    }

    // A malformed analysis file aborts before any document is touched.
    let index = match analysis {
        Some(analysis) => Some(AnalysisLoader::load(analysis)?),
        None => None,
    };

    let parser = XmlDocumentParser;
    let renderer = MarkdownExporter;
    let excerpts = PurposeCache::new(&parser);
    let usecase = ConvertUsecase {
        parser: &parser,
        renderer: &renderer,
        excerpts: &excerpts,
        limits: config.limits(),
    };

    if path.is_dir() {
        init_thread_pool(config.jobs)?;
        let report = usecase.process_directory(path, index.as_deref());
        if report.generated.is_empty() && report.failed.is_empty() {
            eprintln!("No doc.xml found under {}", path.display());
        }
        for generated in &report.generated {
            println!("Generated: {}", generated.display());
        }
        if !report.is_success() {
            eprintln!("{} document(s) failed to convert", report.failed.len());
            return Ok(ExitCode::FAILURE);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let docs = index.as_ref().map(|_| {
        build_doc_lookup(path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new(".")))
    });
    let deps = index.as_deref().map(|index| DependencyContext {
        index,
        docs: docs.as_ref(),
    });

    let markdown = usecase
        .convert(path, deps)
        .with_context(|| format!("Failed to convert {}", path.display()))?;

    match output {
        Some(output) => fs::write(output, markdown)
            .with_context(|| format!("Failed to write {}", output.display()))?,
        None => println!("{}", markdown),
    }
    Ok(ExitCode::SUCCESS)
}

fn run_deps(analysis: &Path, name: &str, direction: DirectionArg, limits: &LimitArgs) -> Result<ExitCode> {
    let config = load_config(limits, None)?;
    let index = AnalysisLoader::load(analysis)?;

    let start = start_ids(&index, name);
    if start.is_empty() {
        bail!("No function named {} in {}", name, analysis.display());
    }

    let resolver = DependencyResolver::new(&index);
    let labels = LinkResolver::new(&index, None, &NoExcerpts, Path::new("."));
    let tree = TreeRenderer::new(&index, &labels, config.limits());

    for (i, &dir) in direction.directions().iter().enumerate() {
        if i > 0 {
            println!();
        }
        let direct = if index.ids_named(name).is_empty() {
            resolver.neighbors(start.as_slice(), dir)
        } else {
            resolver.neighbors_by_name(name, dir)
        };
        println!("## {} of {} ({} direct)", dir, name, direct.len());
        println!();
        for line in MarkdownExporter::outline_lines(&tree.render(start.as_slice(), dir)) {
            println!("{}", line);
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Ids carrying `name`, or `name` itself when it is a known id.
fn start_ids(index: &FunctionIndex, name: &str) -> Vec<String> {
    let named = index.ids_named(name);
    if !named.is_empty() {
        return named.iter().cloned().collect();
    }
    if index.contains(name) {
        return vec![name.to_string()];
    }
    Vec::new()
}
