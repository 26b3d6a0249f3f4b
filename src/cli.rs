use crate::config::load_config;
use crate::error::AvatarError;
use crate::logging::init_logger;
use crate::request::{RawParams, normalize};
use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "lavatar", version, about = "Deterministic letter avatars (SVG, PNG, JPEG)")]
pub struct Args {
    /// Display name the avatar is derived from
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,

    /// Palette entry to use instead of the name-derived one
    #[arg(long = "color")]
    pub color: Option<String>,

    /// Number of initials (1 or 2)
    #[arg(short = 'l', long = "letter-count")]
    pub letter_count: Option<String>,

    /// Accepted for compatibility; avatars are always 300px
    #[arg(long = "size")]
    pub size: Option<String>,

    /// circle or square
    #[arg(short = 's', long = "shape")]
    pub shape: Option<String>,

    /// Render lowercase initials
    #[arg(long = "lowercase")]
    pub lowercase: bool,

    /// svg, png or jpeg. Inferred from the output extension when omitted.
    #[arg(short = 'f', long = "format")]
    pub format: Option<String>,

    #[arg(long = "font-family")]
    pub font_family: Option<String>,

    #[arg(long = "font-weight")]
    pub font_weight: Option<String>,

    /// URL-encoded parameters, e.g. 'name=Ada%20Lovelace&shape=circle'. Flags win.
    #[arg(short = 'q', long = "query")]
    pub query: Option<String>,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Print the color catalog and exit
    #[arg(long = "list-colors")]
    pub list_colors: bool,

    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Runs the CLI and returns the process exit code: 0 on success, 2 for a bad
/// request, 1 for anything else.
pub fn run() -> i32 {
    let args = Args::parse();
    init_logger(args.verbose);
    match execute(&args) {
        Ok(()) => 0,
        Err(err) => report(&err),
    }
}

fn execute(args: &Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    if args.list_colors {
        let catalog = config.load_catalog()?;
        let mut stdout = io::stdout().lock();
        for color in catalog.colors() {
            writeln!(stdout, "{}\t{}\t{}", color.name, color.background, color.foreground)?;
        }
        return Ok(());
    }

    // Reject a bad request before fonts or catalogs are touched.
    let request = normalize(&build_params(args))?;
    let engine = config.build_engine()?;
    let avatar = engine.render_request(&request)?;
    tracing::info!(
        content_type = avatar.content_type,
        bytes = avatar.payload().len(),
        color = avatar.color.name.as_str(),
        "rendered avatar"
    );
    write_output(avatar.payload(), args.output.as_deref())
}

fn build_params(args: &Args) -> RawParams {
    let mut params = args
        .query
        .as_deref()
        .map(RawParams::from_query)
        .unwrap_or_default();

    let overrides = [
        (&mut params.name, &args.name),
        (&mut params.color, &args.color),
        (&mut params.letter_count, &args.letter_count),
        (&mut params.size, &args.size),
        (&mut params.shape, &args.shape),
        (&mut params.format, &args.format),
        (&mut params.font_family, &args.font_family),
        (&mut params.font_weight, &args.font_weight),
    ];
    for (slot, value) in overrides {
        if value.is_some() {
            *slot = value.clone();
        }
    }
    if args.lowercase {
        params.lowercase = Some("true".to_string());
    }
    if params.format.is_none() {
        params.format = args
            .output
            .as_deref()
            .and_then(|path| path.extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_string());
    }
    params
}

fn write_output(payload: &[u8], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, payload)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(payload)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn report(err: &anyhow::Error) -> i32 {
    if let Some(avatar_err) = err.downcast_ref::<AvatarError>() {
        let body = avatar_err.body();
        match serde_json::to_string(&body) {
            Ok(json) => eprintln!("{json}"),
            Err(_) => eprintln!("error: {avatar_err}"),
        }
        return if avatar_err.is_client_error() { 2 } else { 1 };
    }
    eprintln!("error: {err:#}");
    1
}
