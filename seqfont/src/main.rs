use std::path::PathBuf;

use seqfont::Config;

/// Build a color font, stylesheet and demo page from a set of color schemes.
///
/// With no arguments, builds `Protsolata` from `Inconsolata-Regular.otf` and
/// `cleancolors.json` in the current directory.
#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Args {
    /// The font whose outlines are used
    #[arg(long)]
    source: Option<PathBuf>,
    /// JSON file of color schemes
    #[arg(long)]
    schemes: Option<PathBuf>,
    /// Directory for the generated files
    #[arg(long, short)]
    out_dir: Option<PathBuf>,
    /// Family name of the generated font, also used to name output files
    #[arg(long)]
    font_name: Option<String>,
    /// The scheme used for palette 0
    #[arg(long)]
    base: Option<String>,
    /// Also write a TTX fragment per scheme to this directory
    #[arg(long)]
    ttx_dir: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Config {
        let defaults = Config::default();
        Config {
            source_font: self.source.unwrap_or(defaults.source_font),
            schemes: self.schemes.unwrap_or(defaults.schemes),
            out_dir: self.out_dir.unwrap_or(defaults.out_dir),
            font_name: self.font_name.unwrap_or(defaults.font_name),
            base_scheme: self.base.unwrap_or(defaults.base_scheme),
            ttx_dir: self.ttx_dir.or(defaults.ttx_dir),
            ..defaults
        }
    }
}

fn main() {
    env_logger::init();
    use clap::Parser as _;
    let config = Args::parse().into_config();
    log::debug!("{config:?}");
    if let Err(e) = seqfont::run(&config, &mut rand::thread_rng(), std::io::stdout().lock()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
