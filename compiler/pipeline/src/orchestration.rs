//! Pipeline orchestration for the main entry points.
//!
//! This module turns a [`Config`] into an evaluation request, runs it, and
//! coordinates decoding, selection and generation.

use std::path::PathBuf;
use std::time::Duration;

use codegen::GenerateOptions;
use config::{Config, EvaluatorConfig, OutputFormat};
use options::Module;
use provider::{CommandProvider, EvalRequest, EvaluationError, SchemaProvider};
use tracing::{debug, info};

use crate::output::{write_output, Output};
use crate::{PipelineError, Result};

/// Build the evaluation request described by `config`.
pub fn eval_request(config: &Config) -> EvalRequest {
    let module = &config.module;
    let mut request = if module.expr {
        EvalRequest::expr(module.locator.as_str())
    } else {
        EvalRequest::path(module.locator.as_str())
    };
    if let Some(pkgs) = &module.pkgs {
        request = request.with_pkgs(pkgs.as_str());
    }
    for (name, expr) in &module.special_args {
        request = request.with_special_arg(name.as_str(), expr.as_str());
    }
    request.with_options_path(config.options_path())
}

/// The subprocess evaluator described by `evaluator`.
///
/// Fails with [`EvaluationError::InvalidRequest`] when no dump expression
/// file is configured, since the evaluator would have nothing to evaluate.
pub fn provider_from_config(evaluator: &EvaluatorConfig) -> Result<CommandProvider> {
    let dumper = evaluator.dumper.as_deref().ok_or_else(|| {
        EvaluationError::InvalidRequest(
            "no dump expression configured; set `evaluator.dumper`".to_string(),
        )
    })?;
    let mut provider = CommandProvider::new(evaluator.program.as_str())
        .with_args(&evaluator.args)
        .with_trailing_args([dumper]);
    if evaluator.check_syntax {
        provider = provider.with_syntax_check(evaluator.program.as_str(), Vec::<String>::new());
    }
    if let Some(secs) = evaluator.timeout_secs {
        provider = provider.with_timeout(Duration::from_secs(secs));
    }
    Ok(provider)
}

/// Naming rules for the generator, taken from the `[naming]` section.
pub fn naming_rules(naming: &config::NamingConfig) -> codegen::NamingConfig {
    let mut rules = codegen::NamingConfig::with_initialisms(&naming.initialisms);
    rules.overrides = naming.overrides.clone();
    rules
}

fn select<'a>(module: &'a Module, path: &[String]) -> Result<&'a Module> {
    if path.is_empty() {
        return Ok(module);
    }
    let dotted = path.join(".");
    let node = module.by_path(path).ok_or_else(|| PipelineError::SelectNotFound(dotted.clone()))?;
    node.as_module().ok_or(PipelineError::SelectNotModule(dotted))
}

/// Evaluate, decode and generate according to `config`.
///
/// Nothing is written to disk; see [`run_to_dir`] for that.
pub fn run(config: &Config, provider: &dyn SchemaProvider) -> Result<Output> {
    let request = eval_request(config);
    info!(provider = %provider.describe(), locator = ?request.locator, "evaluating module");

    let bytes = provider.evaluate(&request)?;
    debug!(bytes = bytes.len(), "evaluator finished");

    let module = options::decode(&bytes)?;
    let selected = select(&module, &config.select_path())?;
    debug!(members = selected.len(), select = ?config.codegen.select, "module decoded");

    let package = config.codegen.package.clone();
    match config.codegen.format {
        OutputFormat::Rust => {
            let generate_options =
                GenerateOptions { root_type: config.codegen.root_type.clone(), package };
            let unit =
                codegen::generate(selected, &generate_options, &naming_rules(&config.naming))?;
            Ok(Output::Rust(unit))
        }
        OutputFormat::Json => {
            let bytes = if config.codegen.json_pretty {
                options::encode_pretty(selected)?
            } else {
                options::encode(selected)?
            };
            Ok(Output::Json { package, bytes })
        }
    }
}

/// Drive a whole run from `config`: install the configured log subscriber
/// (if none is installed yet), run the configured evaluator and write the
/// result under the configured output directory.
///
/// Returns the path of the written file.
pub fn run_to_dir(config: &Config) -> Result<PathBuf> {
    logging::init(&config.logging)?;
    let provider = provider_from_config(&config.evaluator)?;
    let output = run(config, &provider)?;
    let path = write_output(config.codegen.output_dir(), &output, config.codegen.rustfmt)?;
    info!(path = %path.display(), "wrote output");
    Ok(path)
}
