use anyhow::Context;
use clap::Parser;
use port_registry::core::engine::StepReport;
use port_registry::utils::error::ErrorSeverity;
use port_registry::utils::{logger, validation::Validate};
use port_registry::{CliConfig, CommandEngine, Outcome, PortRegistry, RegistryConfig, SendPolicy};
use std::io::Read;

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn read_script(path: Option<&str>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script '{}'", path)),
        None => {
            let mut script = String::new();
            std::io::stdin()
                .read_to_string(&mut script)
                .context("failed to read script from stdin")?;
            Ok(script)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    let mut config = match &args.config {
        Some(path) => match RegistryConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 {}", e.recovery_suggestion());
                std::process::exit(1);
            }
        },
        None => RegistryConfig::default(),
    };

    if args.json_logs || config.json_logs() {
        logger::init_json_logger(args.verbose, config.log_level());
    } else {
        logger::init_cli_logger(args.verbose, config.log_level());
    }

    tracing::info!("Starting port-registry");
    tracing::debug!("CLI config: {:?}", args);

    if let Err(e) = args.validate().and_then(|_| config.validate()) {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    if args.allow_first_send {
        config.set_send_policy(SendPolicy::AllowFirstWrite);
        tracing::info!("Send policy overridden to {:?}", SendPolicy::AllowFirstWrite);
    }

    let registry = match PortRegistry::from_config(&config) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(exit_code(e.severity()));
        }
    };

    let script = read_script(args.script.as_deref())?;
    let mut engine = CommandEngine::with_fail_fast(registry, args.fail_fast);

    let summary = engine.run_script(&script);

    for step in &summary.steps {
        match &step.result {
            Ok(Outcome::Listed(text)) => eprint!("{}", text),
            Ok(outcome) => println!("{}", outcome),
            Err(e) => eprintln!("❌ line {}: {}", step.line, e.user_friendly_message()),
        }
    }

    if let Some(StepReport {
        line,
        result: Err(e),
    }) = &summary.aborted
    {
        tracing::error!(
            "Script aborted at line {}: {} (Category: {:?}, Severity: {:?})",
            line,
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ line {}: {}", line, e.user_friendly_message());
    }

    tracing::info!(
        "{} command(s) succeeded, {} failed",
        summary.succeeded(),
        summary.failed
    );

    if let Some(e) = summary.worst_error() {
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(exit_code(e.severity()));
    }

    Ok(())
}
