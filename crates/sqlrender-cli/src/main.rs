use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sqlrender_core::{Config, GenerateRequest, GenerateResponse, OptionsPolicy};
use sqlrender_engine::Generator;
use sqlrender_template::{check_template, TemplateSource};

/// sqlrender - render SQL query metadata through a template
#[derive(Parser)]
#[command(name = "sqlrender")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: sqlrender.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate code from a JSON request
    Generate {
        /// Request file, `-` for stdin
        #[arg(short, long, default_value = "-")]
        request: PathBuf,

        /// Template to render instead of the configured one
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Write generated files here instead of printing the response
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Treat malformed plugin options as empty instead of failing
        #[arg(long)]
        lenient_options: bool,
    },

    /// Check that a template parses
    ValidateTemplate {
        /// Template file (default: the embedded template)
        template: Option<PathBuf>,
    },

    /// Print the embedded template
    PrintTemplate,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    // stdout carries the response; logs go to stderr
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref(), cli.verbose)?;

    match cli.command {
        Commands::Generate {
            request,
            template,
            output_dir,
            lenient_options,
        } => generate_command(
            config,
            &request,
            template.as_deref(),
            output_dir.as_deref(),
            lenient_options,
            cli.verbose,
        ),
        Commands::ValidateTemplate { template } => {
            validate_template_command(&config, template.as_deref())
        }
        Commands::PrintTemplate => {
            print!("{}", TemplateSource::embedded().source);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    if let Some(config_path) = path {
        return Config::from_file(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()));
    }

    let default_path = Path::new("sqlrender.toml");
    if default_path.exists() {
        return Config::from_file(default_path)
            .with_context(|| format!("Failed to load config {}", default_path.display()));
    }

    if verbose {
        eprintln!("{}", "No config file found, using defaults".yellow());
    }
    Ok(Config::default())
}

/// Generate command - read a request, render it, emit the response
fn generate_command(
    mut config: Config,
    request_path: &Path,
    template: Option<&Path>,
    output_dir: Option<&Path>,
    lenient_options: bool,
    verbose: bool,
) -> Result<()> {
    if let Some(template) = template {
        config.template = Some(std::env::current_dir()?.join(template));
    }
    if lenient_options {
        config.options_policy = OptionsPolicy::Lenient;
    }

    let generator = Generator::from_config(&config)?;
    if verbose {
        eprintln!("{} {}", "Using template:".cyan(), generator.template().name);
    }

    let request = read_request(request_path)?;
    if verbose {
        eprintln!("{} {} queries", "Loaded request:".cyan(), request.queries.len());
    }

    let response = generator.generate(request)?;

    match output_dir {
        Some(dir) => {
            write_files(&response, dir)?;
            if verbose {
                for file in &response.files {
                    eprintln!("{} {}", "✓ wrote".green(), dir.join(&file.name).display());
                }
            }
        }
        None => {
            let json = response.to_json_pretty()?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}

fn read_request(path: &Path) -> Result<GenerateRequest> {
    let mut raw = Vec::new();
    if path == Path::new("-") {
        std::io::stdin()
            .read_to_end(&mut raw)
            .context("Failed to read request from stdin")?;
    } else {
        raw = std::fs::read(path)
            .with_context(|| format!("Failed to read request {}", path.display()))?;
    }

    GenerateRequest::from_slice(&raw).context("Failed to parse request JSON")
}

/// Persist every response file beneath `dir`
fn write_files(response: &GenerateResponse, dir: &Path) -> Result<()> {
    for file in &response.files {
        let relative = Path::new(&file.name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if file.name.is_empty() || escapes {
            anyhow::bail!("Refusing to write file with invalid name {:?}", file.name);
        }

        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, &file.contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}

/// Validate-template command - parse a template and report the result
fn validate_template_command(config: &Config, template: Option<&Path>) -> Result<()> {
    let source = match template.map(Path::to_path_buf).or_else(|| config.template_path()) {
        Some(path) => TemplateSource::from_file(&path)?,
        None => TemplateSource::embedded(),
    };

    check_template(&source, &config.render)?;
    println!("{} {}", "✓ Template parses:".green(), source.name);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlrender_core::File;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sqlrender-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn writes_nested_files() {
        let dir = scratch_dir("nested");
        let mut response = GenerateResponse::new();
        response.push_file(File::new("db/queries.rs", "// generated\n"));

        write_files(&response, &dir).unwrap();

        let written = std::fs::read_to_string(dir.join("db/queries.rs")).unwrap();
        assert_eq!(written, "// generated\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn rejects_escaping_and_empty_names() {
        let dir = scratch_dir("escape");
        for name in ["../outside.rs", "/etc/passwd", ""] {
            let mut response = GenerateResponse::new();
            response.push_file(File::new(name, "x"));
            assert!(write_files(&response, &dir).is_err(), "{name:?} should be rejected");
        }
        assert!(!dir.exists());
    }

    #[test]
    fn cli_parses_generate_flags() {
        let cli = Cli::try_parse_from([
            "sqlrender",
            "generate",
            "--request",
            "req.json",
            "--output-dir",
            "out",
            "--lenient-options",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate {
                request,
                output_dir,
                lenient_options,
                template,
            } => {
                assert_eq!(request, PathBuf::from("req.json"));
                assert_eq!(output_dir, Some(PathBuf::from("out")));
                assert!(lenient_options);
                assert!(template.is_none());
            }
            _ => panic!("expected generate command"),
        }
    }
}
