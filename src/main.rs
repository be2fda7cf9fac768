use clap::Parser;
use envsubst::config::load_vars_file;
use envsubst::{ExpandOptions, MapResolver};
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "envsubst")]
#[command(about = "Substitute bash-style ${VAR} expressions in text")]
#[command(version)]
struct Cli {
    /// Template file to expand
    #[arg()]
    file: Option<PathBuf>,

    /// Template given inline instead of a file
    #[arg(short = 'i', long = "input", conflicts_with = "file")]
    input: Option<String>,

    /// Write the result to a file instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// TOML file of variables, layered over the environment
    #[arg(long = "vars")]
    vars: Option<PathBuf>,

    /// Do not read variables from the process environment
    #[arg(long = "no-env")]
    no_env: bool,

    /// Fail when a referenced variable is unset
    #[arg(long = "no-unset")]
    no_unset: bool,

    /// Fail when a referenced variable is set but empty
    #[arg(long = "no-empty")]
    no_empty: bool,

    /// Print the parsed template as JSON and exit
    #[arg(long = "ast")]
    ast: bool,

    /// Output results as JSON (output, error)
    #[arg(long = "json")]
    json: bool,
}

fn main() {
    // Initialize tracing on stderr (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    match run(cli) {
        Ok(()) => std::process::exit(0),
        Err(message) => {
            if json {
                println!("{}", serde_json::json!({ "output": null, "error": message }));
            } else {
                eprintln!("envsubst: {}", message);
            }
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    // Determine template source: -i, file, or stdin
    let template = if let Some(s) = cli.input {
        s
    } else if let Some(ref file) = cli.file {
        std::fs::read_to_string(file)
            .map_err(|e| format!("cannot read template file: {}: {}", file.display(), e))?
    } else {
        use std::io::IsTerminal;
        if std::io::stdin().is_terminal() {
            return Err(
                "no template provided. Use -i 'template', provide a file, or pipe via stdin."
                    .to_string(),
            );
        }
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("cannot read stdin: {}", e))?;
        buf
    };

    let tree = envsubst::parse(&template).map_err(|e| e.to_string())?;

    if cli.ast {
        let rendered = serde_json::to_string_pretty(&tree).map_err(|e| e.to_string())?;
        return write_output(cli.output.as_ref(), &format!("{}\n", rendered));
    }

    let mut resolver = if cli.no_env {
        MapResolver::new()
    } else {
        MapResolver::from_env()
    };
    if let Some(ref path) = cli.vars {
        resolver.extend(load_vars_file(path).map_err(|e| e.to_string())?);
    }

    let options = ExpandOptions {
        no_unset: cli.no_unset,
        no_empty: cli.no_empty,
    };
    let output = tree
        .execute_with(&mut resolver, &options)
        .map_err(|e| e.to_string())?;

    if cli.json {
        let rendered = serde_json::json!({ "output": output, "error": null }).to_string();
        return write_output(cli.output.as_ref(), &format!("{}\n", rendered));
    }
    write_output(cli.output.as_ref(), &output)
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), String> {
    match path {
        Some(path) => std::fs::write(path, content)
            .map_err(|e| format!("cannot write {}: {}", path.display(), e)),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|e| format!("cannot write stdout: {}", e))
        }
    }
}
