//! dalgen compiler CLI.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use dal_compiler::{CompileWarning, Compiler, CompilerConfig};

mod ui;

#[derive(Parser)]
#[command(name = "dalgen")]
#[command(about = "dalgen - compiles declarative model access configs to SQL and Go")]
struct Cli {
    /// Log compiler internals (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the Go data-access package
    Compile {
        #[command(flatten)]
        input: InputArgs,

        /// Output directory for generated Go code
        #[arg(short, long, default_value = "dal")]
        output: PathBuf,

        /// Go package name of the generated files
        #[arg(short, long, default_value = "dal")]
        package: String,

        /// Module path written to go.mod
        #[arg(short, long, default_value = "example.com/dal")]
        module: String,
    },

    /// Validate models without generating code
    Check {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Print the SQL and parameter plan of every access method
    Sql {
        #[command(flatten)]
        input: InputArgs,

        /// Only print methods of this model
        #[arg(long)]
        model: Option<String>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Directory containing model files and attributes.json
    #[arg(short = 'd', long, default_value = "models")]
    models: PathBuf,

    /// SQL dialect (postgres or sqlite)
    #[arg(long, default_value = "postgres")]
    dialect: String,
}

impl InputArgs {
    fn into_config(self) -> CompilerConfig {
        CompilerConfig {
            model_dir: self.models,
            dialect: self.dialect,
            ..CompilerConfig::default()
        }
    }
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Compile {
            input,
            output,
            package,
            module,
        } => {
            let config = CompilerConfig {
                out_dir: output,
                package,
                module_path: module,
                ..input.into_config()
            };
            compile(config)?;
        }
        Commands::Check { input } => check(input.into_config())?,
        Commands::Sql { input, model } => print_sql(input.into_config(), model.as_deref())?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "dal_compiler=debug" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Generate the Go package for a model directory.
fn compile(config: CompilerConfig) -> miette::Result<()> {
    let start = Instant::now();
    let out_dir = config.out_dir.clone();
    let spinner = ui::spinner("Compiling models...");

    let compiler = Compiler::new(config);
    let result = match compiler.compile() {
        Ok(result) => result,
        Err(e) => {
            spinner.finish_and_clear();
            ui::failure_header();
            return Err(e.into());
        }
    };
    spinner.finish_and_clear();

    ui::box_header("MODELS");
    ui::box_line("");
    for (model, methods) in &result.model_methods {
        ui::box_line(&ui::model_line(model, *methods));
    }
    ui::box_line("");
    ui::box_footer();
    println!();

    print_warnings(&result.warnings);
    ui::success(&format!(
        "Wrote {} files to {}",
        result.files,
        style(out_dir.display()).bold()
    ));
    ui::timing("Done", start.elapsed().as_millis());
    Ok(())
}

fn check(config: CompilerConfig) -> miette::Result<()> {
    let compiler = Compiler::new(config);
    let result = match compiler.check() {
        Ok(result) => result,
        Err(e) => {
            ui::failure_header();
            return Err(e.into());
        }
    };

    ui::check_passed();
    println!();
    println!(
        "    {} models {} {} methods {} {} warnings",
        result.models,
        ui::symbols::DOT,
        result.methods,
        ui::symbols::DOT,
        result.warnings.len()
    );
    println!();
    print_warnings(&result.warnings);
    Ok(())
}

fn print_sql(config: CompilerConfig, only: Option<&str>) -> miette::Result<()> {
    let compiler = Compiler::new(config);
    let statements = compiler.statements()?;

    let mut printed = 0;
    for (model, methods) in statements
        .iter()
        .filter(|(model, _)| only.map(|name| name == model.as_str()).unwrap_or(true))
    {
        for stmt in methods {
            println!(
                "{} {}.{} {}",
                style("--").fg(ui::colors::DIM),
                style(model).fg(ui::colors::CYAN).bold(),
                style(&stmt.name).bold(),
                style(format!("({})", stmt.kind)).fg(ui::colors::DIM)
            );
            println!("{}", stmt.sql);
            if !stmt.params.is_empty() {
                let params: Vec<String> = stmt.params.iter().map(|p| p.to_string()).collect();
                println!("{} params: {}", style("--").fg(ui::colors::DIM), params.join(", "));
            }
            for warning in &stmt.warnings {
                println!("{} warning: {}", style("--").fg(ui::colors::YELLOW), warning);
            }
            println!();
            printed += 1;
        }
    }

    if printed == 0 {
        match only {
            Some(name) => ui::dim(&format!("No access methods found for model '{}'.", name)),
            None => ui::dim("No access methods found."),
        }
    }
    Ok(())
}

fn print_warnings(warnings: &[CompileWarning]) {
    if warnings.is_empty() {
        return;
    }
    for warning in warnings {
        ui::warning(&warning.to_string());
    }
    println!();
    ui::info("Dropped filters no longer narrow their query. Check the operator names.");
    println!();
}
