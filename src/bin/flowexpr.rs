//! Command-line front-end for evaluating, analyzing and binding
//! template expressions.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use flowexpr::{Binder, Evaluator, EvaluatorOptions, ExpressionContext, Value};

#[derive(Parser)]
#[command(name = "flowexpr", about = "Sandboxed template-expression engine", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate an expression against an item
    Eval {
        /// Expression source, e.g. "item.count > 10"
        expression: String,

        /// JSON file providing the current item
        #[arg(long)]
        item: Option<PathBuf>,

        /// Named variable as key=json (repeatable)
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,

        /// Wall-clock budget in milliseconds
        #[arg(long, value_name = "MS", default_value_t = 1000)]
        timeout: u64,

        /// Attach evaluation metadata to the output
        #[arg(long)]
        metrics: bool,
    },

    /// Report complexity, depth and dependencies without evaluating
    Analyze {
        /// Expression source
        expression: String,
    },

    /// Bind every {{ ... }} span in a settings JSON file or template string
    Bind {
        /// Template string, or a settings JSON file via --settings
        template: Option<String>,

        /// JSON file providing the current item
        #[arg(long)]
        item: Option<PathBuf>,

        /// Settings JSON file to bind recursively
        #[arg(long)]
        settings: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Eval {
            expression,
            item,
            vars,
            timeout,
            metrics,
        } => eval(&expression, item.as_deref(), &vars, timeout, metrics),
        Command::Analyze { expression } => analyze(&expression),
        Command::Bind {
            template,
            item,
            settings,
        } => bind(template.as_deref(), item.as_deref(), settings.as_deref()),
    }
}

fn load_json(path: &std::path::Path) -> Result<serde_json::Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn build_context(item: Option<&std::path::Path>, vars: &[String]) -> Result<ExpressionContext> {
    let mut ctx = match item {
        Some(path) => ExpressionContext::with_item(Value::from(load_json(path)?)),
        None => ExpressionContext::default(),
    };
    for pair in vars {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("--var expects key=value, got '{pair}'"))?;
        // Bare words that are not valid JSON are taken as strings
        let value: serde_json::Value = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        ctx.set_variable(key, Value::from(value));
    }
    Ok(ctx)
}

fn eval(
    expression: &str,
    item: Option<&std::path::Path>,
    vars: &[String],
    timeout_ms: u64,
    metrics: bool,
) -> Result<()> {
    let ctx = build_context(item, vars)?;
    let evaluator = Evaluator::new(
        EvaluatorOptions::default()
            .with_timeout(Duration::from_millis(timeout_ms))
            .with_metrics(metrics),
    );
    let result = evaluator.evaluate(expression, &ctx);
    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

fn analyze(expression: &str) -> Result<()> {
    let evaluator = Evaluator::default();
    let report = evaluator
        .analyze_complexity(expression)
        .with_context(|| format!("cannot parse '{expression}'"))?;
    let parsed = flowexpr::parse_expression(expression)?;
    println!("complexity:          {}", report.complexity);
    println!("depth:               {}", report.max_depth);
    println!("function calls:      {}", report.function_calls);
    println!("property accesses:   {}", report.property_accesses);
    println!("estimated time (ms): {}", report.estimated_execution_time_ms);
    println!("simple:              {}", parsed.is_simple());
    println!("dependencies:        {}", parsed.dependencies().join(", "));
    println!("functions:           {}", parsed.functions().join(", "));
    Ok(())
}

fn bind(
    template: Option<&str>,
    item: Option<&std::path::Path>,
    settings: Option<&std::path::Path>,
) -> Result<()> {
    let item = match item {
        Some(path) => load_json(path)?,
        None => serde_json::Value::Object(serde_json::Map::new()),
    };
    let binder = Binder::new(Arc::new(Evaluator::default()));
    let bound = match (template, settings) {
        (Some(text), None) => binder.bind_string(&item, text)?,
        (None, Some(path)) => binder.bind_value(&item, &load_json(path)?)?,
        _ => bail!("provide either a template string or --settings FILE"),
    };
    println!("{}", serde_json::to_string_pretty(&bound)?);
    Ok(())
}
