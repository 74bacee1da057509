//! # Etiqueta CLI
//!
//! Command-line interface for Zebra label printing.
//!
//! ## Usage
//!
//! ```bash
//! # Print ZPL given on the command line
//! etiqueta --text '^XA^FO40,40^A0N,36,36^FDHello^FS^XZ'
//!
//! # Print the self-test label on a named printer
//! etiqueta --zpl-test --printer "ZDesigner GK420t"
//!
//! # Fill a template: the typed text goes to {{1}}, --var fills the rest
//! etiqueta --template models/serial.prn --var '{{2}}=OP1234' --var LOTE=L9
//!
//! # Serial label rasterized with the label font
//! etiqueta --serial PBS12345
//!
//! # Save the rasterized serial label as PNG instead of printing
//! etiqueta --serial PBS12345 --png label.png
//!
//! # Accept jobs over HTTP
//! etiqueta --serve --host 0.0.0.0 --port 5000
//! ```

use clap::Parser;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use etiqueta::{
    EtiquetaError,
    config::Config,
    dispatch::Dispatcher,
    job::{JobRequest, parse_assignment},
    protocol::label::{LabelRenderer, ZPL_TEST_PAYLOAD},
    server::{self, AppState, ServerConfig},
    template::{DEFAULT_PRIMARY_TOKEN, TemplateRoot},
    transport::PrintMode,
};

/// Etiqueta - send text, ZPL or label templates to a Zebra printer
#[derive(Parser, Debug)]
#[command(name = "etiqueta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Text or ZPL commands to print (skips the prompt)
    #[arg(long)]
    text: Option<String>,

    /// Read the whole text from stdin
    #[arg(long)]
    stdin: bool,

    /// Exact printer name (defaults to the system default printer)
    #[arg(long)]
    printer: Option<String>,

    /// Encoding used for the payload, e.g. utf-8 or cp1252
    #[arg(long)]
    encoding: Option<String>,

    /// Ignore other input and print a ZPL test label
    #[arg(long)]
    zpl_test: bool,

    /// .prn template whose primary token receives the text
    #[arg(long, value_name = "FILE")]
    template: Option<String>,

    /// Extra template tokens, e.g. --var {{2}}=ABC --var 3=DEF
    #[arg(long = "var", value_name = "TOKEN=VALUE")]
    vars: Vec<String>,

    /// Template token replaced by the text
    #[arg(long, default_value = DEFAULT_PRIMARY_TOKEN)]
    token: String,

    /// Print a serial number label rasterized with the label font
    #[arg(long, value_name = "SERIAL")]
    serial: Option<String>,

    /// Save the rasterized serial label as PNG instead of printing
    #[arg(long, value_name = "FILE", requires = "serial")]
    png: Option<PathBuf>,

    /// Run the HTTP print server
    #[arg(long)]
    serve: bool,

    /// Server host (0.0.0.0 exposes it on the network)
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Verbose logging
    #[arg(long)]
    debug: bool,

    /// How jobs reach the printer (default: detect)
    #[arg(long, value_enum)]
    mode: Option<PrintMode>,

    /// Relay peer base URL
    #[arg(long, value_name = "URL")]
    relay: Option<String>,

    /// Directory templates must live in
    #[arg(long, value_name = "DIR")]
    template_root: Option<PathBuf>,

    /// TTF font for rasterized labels
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Mirror rasterized labels
    #[arg(long)]
    mirror: bool,
}

impl Cli {
    fn prints_immediately(&self) -> bool {
        self.text.is_some() || self.zpl_test || self.template.is_some() || self.serial.is_some()
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if cli.serve && cli.prints_immediately() {
        eprintln!("Error: --serve cannot be combined with --text, --zpl-test, --template or --serial");
        std::process::exit(2);
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("etiqueta=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("etiqueta=info,tower_http=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), EtiquetaError> {
    let mut config = Config::from_env()?;
    if let Some(root) = &cli.template_root {
        config.template_root = root.clone();
    }
    if let Some(url) = &cli.relay {
        config.relay_url = url.clone();
    }
    if let Some(mode) = cli.mode {
        config.print_mode = mode;
    }
    if let Some(font) = &cli.font {
        config.font_path = font.clone();
    }
    if let Some(encoding) = &cli.encoding {
        config.encoding = encoding.clone();
    }
    config.mirror |= cli.mirror;

    let renderer = || LabelRenderer::load(&config.font_path, config.text_style(), config.label);

    if let (Some(path), Some(serial)) = (&cli.png, &cli.serial) {
        save_png(path, &renderer(), serial)?;
        println!("Saved label preview to {}", path.display());
        return Ok(());
    }

    let dispatcher =
        Dispatcher::for_capability(config.print_mode.capability(), config.relay_client())?;
    let templates = TemplateRoot::new(&config.template_root)?;
    let encoding = config.payload_encoding()?;

    if cli.serve {
        let state = AppState::new(dispatcher, renderer(), templates, encoding);
        let server_config = ServerConfig {
            listen_addr: format!("{}:{}", cli.host, cli.port),
        };
        return server::serve(server_config, state).await;
    }

    let printer = match &cli.serial {
        Some(serial) => {
            dispatcher
                .print_serial(&renderer(), serial, cli.printer.clone(), encoding)
                .await?
        }
        None => {
            let job = job_request(&cli)?.prepare(&templates, encoding)?;
            dispatcher.dispatch(job).await?
        }
    };

    println!("Sent to printer: {}", printer);
    Ok(())
}

/// Collect the job input from flags, stdin or the prompt.
fn job_request(cli: &Cli) -> Result<JobRequest, EtiquetaError> {
    if cli.zpl_test {
        return Ok(JobRequest {
            text: Some(ZPL_TEST_PAYLOAD.to_string()),
            printer: cli.printer.clone(),
            encoding: cli.encoding.clone(),
            ..Default::default()
        });
    }

    let variables = cli
        .vars
        .iter()
        .map(String::as_str)
        .map(parse_assignment)
        .collect::<Result<Vec<_>, _>>()?;

    let mut request = JobRequest {
        text: None,
        printer: cli.printer.clone(),
        encoding: cli.encoding.clone(),
        template: cli.template.clone(),
        token: Some(cli.token.clone()),
        variables,
    };

    // The primary token already comes from --var, so no prompt
    let skip_prompt = request.template.is_some()
        && request.primary_covered()
        && cli.text.is_none()
        && !cli.stdin
        && std::io::stdin().is_terminal();

    if !skip_prompt {
        request.text = Some(read_text(cli)?);
    }
    request.validate()?;
    Ok(request)
}

fn read_text(cli: &Cli) -> Result<String, EtiquetaError> {
    if let Some(text) = &cli.text {
        return Ok(text.clone());
    }

    let mut stdin = std::io::stdin();
    if cli.stdin || !stdin.is_terminal() {
        let mut text = String::new();
        stdin.read_to_string(&mut text)?;
        return Ok(text);
    }

    println!("Type the text (or ZPL commands) to print. Finish with an empty line.");
    let mut lines = Vec::new();
    for line in stdin.lines() {
        let line = line?;
        if line.is_empty() {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Save the rasterized serial label exactly as it would be printed.
fn save_png(path: &Path, renderer: &LabelRenderer, serial: &str) -> Result<(), EtiquetaError> {
    use image::{GrayImage, Luma};

    let bitmap = renderer.graphics(serial)?.decode()?;
    let mut img = GrayImage::new(bitmap.width() as u32, bitmap.height() as u32);

    for y in 0..bitmap.height() {
        for (x, &ink) in bitmap.row(y).iter().enumerate() {
            let color = if ink { 0u8 } else { 255u8 };
            img.put_pixel(x as u32, y as u32, Luma([color]));
        }
    }

    img.save(path)
        .map_err(|e| EtiquetaError::Image(format!("Failed to save PNG: {}", e)))?;

    Ok(())
}
