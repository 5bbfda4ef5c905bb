use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use crate::conditions;
use crate::config;
use crate::message::MessageView;

use super::output::{self, EvalData, OutputMode, ParseData, VerifyData};

#[derive(Parser)]
#[command(name = "msgrule")]
#[command(about = "Evaluate chat moderation rule expressions against messages")]
#[command(version)]
pub struct Cli {
    /// Path to config file (overrides MSGRULE_CONFIG env var and default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (auto-enabled when stdout is piped)
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Force text output even when stdout is piped
    #[arg(long, global = true, conflicts_with = "json")]
    pub no_json: bool,

    /// Suppress all output on success (errors still go to stderr)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check the configuration file and list every problem found
    Verify,

    /// Parse an expression and print its canonical form
    Parse {
        /// Expression, e.g. "(channels AND forums) OR NOT categories"
        expression: String,
    },

    /// Evaluate messages (one JSON object per line) against the configured rules
    Eval {
        /// Read messages from a file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Evaluate this expression instead of the configured one
        #[arg(short, long)]
        expression: Option<String>,
    },
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        OutputMode::from_flags(self.json, self.no_json, self.quiet)
    }
}

pub fn execute(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    let output_mode = cli.output_mode();

    match cli.command {
        Commands::Verify => {
            let path = config::get_config_path(config_path)?;
            let errors = config::verify(&path)?;

            if output_mode.is_json() {
                output::print_json(&VerifyData {
                    path: path.display().to_string(),
                    valid: errors.is_empty(),
                    errors: errors.clone(),
                });
            } else if !output_mode.is_quiet() {
                if errors.is_empty() {
                    println!("✓ Configuration is valid: {}", path.display());
                } else {
                    println!(
                        "✗ Configuration has {} error(s): {}",
                        errors.len(),
                        path.display()
                    );
                    println!();
                    for error in &errors {
                        println!("  - {}", error);
                    }
                }
            }

            if errors.is_empty() {
                Ok(())
            } else {
                Err(crate::Error::config("configuration validation failed").into())
            }
        }

        Commands::Parse { expression } => {
            let expr = conditions::parse_expression(&expression).map_err(crate::Error::from)?;

            if output_mode.is_json() {
                output::print_json(&ParseData {
                    canonical: expr.to_string(),
                    identifiers: expr.identifiers().iter().map(|s| s.to_string()).collect(),
                    expression,
                });
            } else if !output_mode.is_quiet() {
                println!("{}", expr);
            }
            Ok(())
        }

        Commands::Eval { input, expression } => {
            let path = config::get_config_path(config_path)?;
            let config = config::load(&path)?;
            let ctx = config
                .build_context()
                .with_context(|| format!("Invalid rules in {}", path.display()))?;

            let expr = match expression {
                Some(s) => {
                    let expr = conditions::parse_expression(&s).map_err(crate::Error::from)?;
                    conditions::resolve(&expr, ctx.rules())?;
                    expr
                }
                None => ctx.expr().clone(),
            };
            debug!(expression = %expr, "evaluating messages");

            let reader: Box<dyn BufRead> = match &input {
                Some(path) => Box::new(BufReader::new(File::open(path).with_context(|| {
                    format!("Failed to open input file: {}", path.display())
                })?)),
                None => Box::new(BufReader::new(io::stdin())),
            };

            for (index, line) in reader.lines().enumerate() {
                let line_no = index + 1;
                let line = line.context("Failed to read input")?;
                if line.trim().is_empty() {
                    continue;
                }

                let message: MessageView = serde_json::from_str(&line)
                    .with_context(|| format!("line {}: invalid message", line_no))?;
                let fired = ctx.evaluate_expr(&expr, &message)?;

                if output_mode.is_json() {
                    output::print_json(&EvalData {
                        line: line_no,
                        author: message.author.id,
                        channel: message.channel.id,
                        fired,
                    });
                } else if !output_mode.is_quiet() {
                    println!("{}", fired);
                }
            }

            Ok(())
        }
    }
}
