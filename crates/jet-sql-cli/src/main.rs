//! jet-rewrite CLI
//!
//! Shows how a statement is rewritten for Microsoft Jet/Access.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

use jet_sql_core::{FixRule, Limit, ParameterStyle, SqlStatement, SqlValue};
use jet_sql_driver::{Command, CommandType, DriverConfig, JetDriver, NativeDriver, SqlType};

/// Rewrite ANSI SQL into the Jet dialect.
#[derive(Parser)]
#[command(name = "jet-rewrite")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON driver configuration file.
    #[arg(short, long, env = "JET_REWRITE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a statement and print the command the driver would run.
    Rewrite {
        /// SQL text (read from stdin if not given).
        sql: Option<String>,

        /// Parameter values, in marker order: null, true, false, numbers or text.
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// Parameter marker style (defaults to the configuration's).
        #[arg(short, long, value_enum)]
        style: Option<Style>,

        /// Disable a fix rule (repeatable).
        #[arg(long)]
        disable_fix: Vec<FixRule>,

        /// Print the command as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Add a TOP clause to a SELECT.
    Limit {
        /// SQL text (read from stdin if not given).
        sql: Option<String>,

        /// Rows to skip. Jet only accepts 0.
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Maximum number of rows.
        #[arg(short, long)]
        limit: u64,
    },

    /// List the fix rules in application order.
    Fixes,
}

#[derive(Clone, Copy, ValueEnum)]
enum Style {
    Positional,
    Named,
}

impl From<Style> for ParameterStyle {
    fn from(style: Style) -> Self {
        match style {
            Style::Positional => Self::Positional,
            Style::Named => Self::Named,
        }
    }
}

/// Hands commands straight back so they can be printed.
struct Echo;

impl NativeDriver for Echo {
    type Command = Command;
    type Error = std::convert::Infallible;

    fn create_command(&self, command: Command) -> Result<Command, Self::Error> {
        Ok(command)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &cli.config {
        Some(path) => DriverConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => DriverConfig::default(),
    };
    debug!(config = ?config, "Configuration loaded");

    match cli.command {
        Commands::Rewrite {
            sql,
            params,
            style,
            disable_fix,
            json,
        } => {
            if let Some(style) = style {
                config.parameter_style = style.into();
            }
            config.rewrite.fixes.retain(|rule| !disable_fix.contains(rule));

            let sql = read_sql(sql)?;
            let values: Vec<SqlValue> = params.iter().map(|p| parse_value(p)).collect();
            let types: Vec<SqlType> = values.iter().map(SqlType::for_value).collect();
            let statement = SqlStatement::parse(&sql, values)?;

            let driver = JetDriver::new(Echo, &config);
            let command = driver.generate_command(CommandType::Text, &statement, &types)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&command)?);
            } else {
                println!("{}", command.text);
                for parameter in &command.parameters {
                    println!(
                        "  {}{} {:?} = {}",
                        driver.named_prefix(),
                        parameter.name,
                        parameter.sql_type,
                        parameter.value.to_sql_inline()
                    );
                }
            }
        }

        Commands::Limit { sql, offset, limit } => {
            let sql = read_sql(sql)?;
            let statement = SqlStatement::parse(&sql, Vec::<SqlValue>::new())
                .context("the limit command does not take parameters")?;
            let driver = JetDriver::new(Echo, &config);
            let limited = driver.limit(&statement, offset, &Limit::Fixed(limit))?;
            println!("{limited}");
        }

        Commands::Fixes => {
            for rule in FixRule::ALL {
                let state = if config.rewrite.fixes.contains(&rule) {
                    "enabled"
                } else {
                    "disabled"
                };
                println!("{rule:<20} {state}");
            }
        }
    }

    Ok(())
}

fn read_sql(sql: Option<String>) -> anyhow::Result<String> {
    if let Some(sql) = sql {
        return Ok(sql);
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("reading SQL from stdin")?;
    Ok(buffer.trim_end().to_string())
}

/// Parses a `--param` value. Anything that is not null, a boolean or a
/// number is text; surrounding single quotes are removed.
fn parse_value(raw: &str) -> SqlValue {
    match raw {
        "null" | "NULL" => SqlValue::Null,
        "true" | "TRUE" => SqlValue::Bool(true),
        "false" | "FALSE" => SqlValue::Bool(false),
        _ => {
            if let Ok(n) = raw.parse::<i64>() {
                SqlValue::Int(n)
            } else if let Ok(f) = raw.parse::<f64>() {
                SqlValue::Float(f)
            } else {
                let text = raw
                    .strip_prefix('\'')
                    .and_then(|s| s.strip_suffix('\''))
                    .unwrap_or(raw);
                SqlValue::Text(text.to_string())
            }
        }
    }
}
