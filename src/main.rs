use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use postbake::assets::RandomFingerprint;
use postbake::build::{self, Delegates};
use postbake::imaging::RustBackend;
use postbake::render::CmarkRenderer;
use postbake::{config, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "postbake")]
#[command(about = "Static site builder for Markdown blogs")]
#[command(long_about = "\
Static site builder for Markdown blogs

Every post is a directory holding a Markdown file with a frontmatter block.
A build renders each post, then writes the homepage, tag pages, the tag
directory, RSS and JSON feeds, and a sitemap.

Site structure:

  site.toml                        # Site config (required for build)
  templates/
  ├── header.html                  # {{title}}, {{body_class}}, {{site_title}},
  └── footer.html                  # <!-- CRITICAL_CSS -->, <!-- POST_START/END -->
  css/
  ├── style.css                    # Published as style.<fingerprint>.min.css
  └── critical.css                 # Inlined into every page head
  posts/
  └── hoagie-fest/                 # Directory name = slug
      ├── post.md                  # Frontmatter + Markdown body
      └── photos/                  # Gallery when photo_page: 1

Set RUST_LOG (e.g. RUST_LOG=debug) to change log verbosity.
Run 'postbake gen-config' to generate a documented site.toml.")]
#[command(version)]
struct Cli {
    /// Path to the site config; its directory is the site root
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild every page, feed and the sitemap
    Build {
        /// Date used as sitemap lastmod for non-post pages (YYYY-MM-DD, default today)
        #[arg(long)]
        build_date: Option<NaiveDate>,
    },
    /// Validate templates and posts without writing anything
    Check,
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build { build_date } => {
            init_tracing();
            let site = config::load_site(&cli.config)?;
            println!("==> Building {}", site.root.display());

            let renderer = CmarkRenderer::new();
            let images = RustBackend::new();
            let fingerprinter = RandomFingerprint;
            let delegates = Delegates {
                renderer: &renderer,
                images: &images,
                fingerprinter: &fingerprinter,
            };
            let build_date = build_date.unwrap_or_else(|| Utc::now().date_naive());

            let summary = build::build_site(&site, &delegates, build_date)?;
            output::print_build_summary(&summary);
            println!("==> Build complete: {}", site.root.display());
        }
        Command::Check => {
            init_tracing();
            let site = config::load_site(&cli.config)?;
            println!("==> Checking {}", site.root.display());
            let summary = build::check_site(&site)?;
            output::print_check_output(&summary);
            println!("==> Site is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
