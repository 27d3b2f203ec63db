use blackblog::config::{self, ConfigError, Mode};
use blackblog::engine::{Engine, EngineOptions};
use blackblog::{compile, output, server};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Exit code for bad flags or a bad `blog.toml`.
const CONFIG_EXIT_CODE: i32 = 2;

#[derive(Parser)]
#[command(name = "blackblog")]
#[command(about = "Markdown blog engine: compile to static files or serve live")]
#[command(long_about = "\
Markdown blog engine: compile to static files or serve live

Every .md file under the root is a post. A post opens with optional
header lines that set its title, URL and date:

  ~~title: Hello World
  ~~url: hello
  ~~date: 6 January 2012

  Markdown body starts here.

Dated posts live under year/month (2012/1/hello.html), undated ones at
the top level (hello.html).

Modes (pick exactly one):
  --dest <dir>   Write every post plus index listings to <dir> and exit
  --port <n>     Serve over HTTP, rebuilding when posts change

An optional blog.toml in the root sets the title, poll interval, and
static assets directory.")]
#[command(version = env!("BLACKBLOG_VERSION"))]
struct Cli {
    /// Directory holding the Markdown posts
    #[arg(long)]
    root: PathBuf,

    /// Compile the blog into this directory
    #[arg(long)]
    dest: Option<PathBuf>,

    /// Serve the blog on this port
    #[arg(long)]
    port: Option<u16>,

    /// Seconds between checks for changed posts (overrides blog.toml)
    #[arg(long, value_name = "SECS")]
    poll_time: Option<u64>,

    /// Log progress at info level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mode = config::select_mode(cli.dest.clone(), cli.port).unwrap_or_else(|e| config_failure(e));
    let blog = load_blog_config(&cli).unwrap_or_else(|e| config_failure(e));

    match mode {
        Mode::Compile { dest } => {
            let report = compile::compile(&cli.root, &dest, &blog)?;
            output::print_compile_output(&report, &cli.root, &dest);
        }
        Mode::Serve { port } => {
            let options = EngineOptions::from_config(&blog);
            let poll_interval = options.poll_interval;
            let engine = Engine::start(&cli.root, options)?;
            let statics = server::StaticFiles::from_config(&blog, &cli.root);
            let workers = config::effective_workers(&blog.server);

            let (listener, addr) = server::bind(port)?;
            output::print_serve_output(
                addr,
                &cli.root,
                engine.post_count(),
                poll_interval,
                statics.as_ref(),
            );
            server::run(listener, engine, statics, workers)?;
        }
    }

    Ok(())
}

/// Load `blog.toml` and apply command-line overrides.
fn load_blog_config(cli: &Cli) -> Result<config::BlogConfig, ConfigError> {
    let mut blog = config::load_config(&cli.root)?;
    if let Some(secs) = cli.poll_time {
        blog.server.poll_interval = secs;
        blog.validate()?;
    }
    Ok(blog)
}

fn config_failure(err: ConfigError) -> ! {
    eprintln!("Error: {err}");
    std::process::exit(CONFIG_EXIT_CODE)
}
