use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use text_watermark::{Color, Defaults, FontSource, FontSpec, Margin, Position, Watermark};

#[derive(Parser)]
#[command(
    name = "text-watermark",
    about = "Stamp a text watermark onto a PNG, JPEG or animated GIF",
    version,
    after_help = "The output uses the source's codec. Without --output the image is \
                  written to <save>/sai.<ext>."
)]
struct Cli {
    /// Input image file
    input: PathBuf,

    /// Text to draw
    #[arg(short, long)]
    text: String,

    /// Font file (TrueType/OpenType)
    #[arg(short, long, env = "TEXT_WATERMARK_FONT")]
    font: Option<PathBuf>,

    /// Text size in points
    #[arg(short, long, default_value = "16")]
    size: f32,

    /// Anchor: top-left, top-right, bottom-left, bottom-right or center
    #[arg(short, long, default_value = "top-left")]
    position: Position,

    /// Horizontal margin in pixels
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    dx: i32,

    /// Vertical margin in pixels
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    dy: i32,

    /// Text color as r,g,b[,a] or #RRGGBB[AA]
    #[arg(short, long, default_value = "255,255,255,255")]
    color: Color,

    /// Output file (default: <save>/sai.<ext>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for outputs written without --output
    #[arg(long, default_value = "./", env = "TEXT_WATERMARK_SAVE_DIR")]
    save: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if !text_watermark::fs::exists(&cli.input) {
        eprintln!("Error: Input path does not exist: {}", cli.input.display());
        process::exit(1);
    }

    let defaults = Defaults {
        save_dir: cli.save.clone(),
        font_path: cli.font.clone(),
    };

    let mut wm = Watermark::with_defaults(defaults)
        .source(&cli.input)
        .font(FontSpec {
            source: FontSource::Path(PathBuf::new()),
            size: cli.size,
            text: cli.text.clone(),
        })
        .position(cli.position)
        .margin(Margin::new(cli.dx, cli.dy))
        .color(cli.color);
    if let Some(output) = &cli.output {
        wm = wm.to(output);
    }

    match wm.finish() {
        Ok(path) => {
            if !cli.quiet {
                println!("{}", path.display());
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
