use std::path::PathBuf;

use clap::Parser;

use duoscroll::config;

#[derive(Parser)]
#[command(
    name = "duoscroll",
    about = "Two-pane scroll synchronization demo over a shared virtual axis"
)]
struct Cli {
    /// Left pane text file
    left: PathBuf,

    /// Right pane text file
    right: PathBuf,

    /// Wheel smoothing factor (0 disables wheel handling, >=1 is instant)
    #[arg(long)]
    smooth: Option<f64>,

    /// Snap-settle range in virtual px (0 disables)
    #[arg(long)]
    snap: Option<f64>,

    /// Disable automatic file watching (panes reload on file change by default)
    #[arg(long)]
    no_watch: bool,

    /// Log output file path (enables logging when specified)
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    if let Some(log_path) = &cli.log {
        let file = std::fs::File::create(log_path).expect("failed to open log file");
        env_logger::Builder::from_default_env()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    }
    // no --log → logger not initialized (raw-mode terminal owns the screen)

    let mut cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };
    cfg.merge_cli(cli.smooth, cli.snap);
    let config = cfg.resolve();

    if let Err(e) = duoscroll::demo::run(cli.left, cli.right, config, !cli.no_watch) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
