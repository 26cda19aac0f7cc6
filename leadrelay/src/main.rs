mod config;

use clap::{Args, Parser, Subcommand, ValueEnum};
use config::{Config, LoggingConfig, MetricsConfig};
use intake::fields::FieldId;
use intake::{FieldEvent, FormState, SubmitOutcome, Submitter};
use metrics_exporter_statsd::StatsdBuilder;
use relay::errors::RelayError;
use shared::metrics_defs::MetricType;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(version, about = "Lead intake form and messaging relay")]
struct Cli {
    #[arg(long, default_value = "leadrelay.yaml")]
    config_file: PathBuf,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Serve the relay
    Relay,
    /// Fill in the intake form and submit it to the relay
    Submit(SubmitArgs),
}

#[derive(Args)]
struct SubmitArgs {
    #[arg(long, default_value = "")]
    first_name: String,
    #[arg(long, default_value = "")]
    last_name: String,
    /// Birth date as YYYY-MM-DD
    #[arg(long, default_value = "")]
    birth_date: String,
    #[arg(long)]
    phone: Option<String>,
    /// Contact link or handle, depending on the form layout
    #[arg(long)]
    social: Option<String>,
    #[arg(long, value_enum)]
    social_type: Option<SocialTypeArg>,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    contact_method: Option<String>,
    /// May be repeated
    #[arg(long = "service")]
    services: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SocialTypeArg {
    Telegram,
    Whatsapp,
}

impl SocialTypeArg {
    fn label(&self) -> &'static str {
        match self {
            SocialTypeArg::Telegram => "Telegram",
            SocialTypeArg::Whatsapp => "WhatsApp",
        }
    }
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("config file has no `{0}` section")]
    MissingSection(&'static str),
    #[error("relay error: {0}")]
    Relay(#[from] RelayError),
    #[error("intake error: {0}")]
    Intake(#[from] intake::errors::IntakeError),
    #[error("metrics setup failed: {0}")]
    Metrics(String),
    #[error("{value:?} is not an option of {field}")]
    UnknownOption { field: &'static str, value: String },
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_file(&cli.config_file) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {e}", cli.config_file.display());
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be set up before the runtime starts
    let _sentry = init_logging(config.common.logging.as_ref());

    match run(cli.command, config) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "leadrelay failed");
            ExitCode::FAILURE
        }
    }
}

fn run(command: CliCommand, config: Config) -> Result<ExitCode, CliError> {
    if let Some(metrics_config) = &config.common.metrics {
        init_metrics(metrics_config)?;
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match command {
        CliCommand::Relay => {
            let relay_config = config.relay.ok_or(CliError::MissingSection("relay"))?;
            rt.block_on(relay::run(relay_config))?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Submit(args) => {
            let intake_config = config.intake.ok_or(CliError::MissingSection("intake"))?;
            let mut submitter = Submitter::new(&intake_config)?;
            fill_form(submitter.form_mut(), args)?;
            rt.block_on(submit(&mut submitter))
        }
    }
}

fn init_logging(config: Option<&LoggingConfig>) -> Option<sentry::ClientInitGuard> {
    let guard = config.map(|logging| {
        sentry::init((
            logging.sentry_dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });
    let sentry_layer = guard
        .as_ref()
        .map(|_| sentry::integrations::tracing::layer());

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_layer)
        .init();

    guard
}

fn init_metrics(config: &MetricsConfig) -> Result<(), CliError> {
    let recorder = StatsdBuilder::from(config.statsd_host.as_str(), config.statsd_port)
        .build(Some("leadrelay"))
        .map_err(|e| CliError::Metrics(e.to_string()))?;
    metrics::set_global_recorder(recorder).map_err(|e| CliError::Metrics(e.to_string()))?;

    for def in relay::metrics_defs::ALL_METRICS {
        match def.metric_type {
            MetricType::Counter => metrics::describe_counter!(def.name, def.description),
            MetricType::Gauge => metrics::describe_gauge!(def.name, def.description),
            MetricType::Histogram => {
                metrics::describe_histogram!(def.name, def.description)
            }
        }
    }
    Ok(())
}

/// Replays the command-line values as form events, the way a user would
/// type and click them.
fn fill_form(form: &mut FormState, args: SubmitArgs) -> Result<(), CliError> {
    let texts = [
        (FieldId::FirstName, Some(args.first_name)),
        (FieldId::LastName, Some(args.last_name)),
        (FieldId::Phone, args.phone),
        (FieldId::Social, args.social),
    ];
    for (field, value) in texts {
        if let Some(value) = value {
            let _ = form.handle(FieldEvent::Input { field, value });
        }
    }
    let _ = form.handle(FieldEvent::DatePicked(args.birth_date));

    let choices = [
        (FieldId::SocialType, args.social_type.map(|s| s.label().to_string())),
        (FieldId::Gender, args.gender),
        (FieldId::ContactMethod, args.contact_method),
    ];
    for (field, label) in choices {
        if let Some(label) = label {
            let index = option_index(form, field, label)?;
            let _ = form.handle(FieldEvent::Selected { field, index });
        }
    }

    for service in args.services {
        let index = option_index(form, FieldId::Services, service)?;
        let _ = form.handle(FieldEvent::Toggled {
            index,
            checked: true,
        });
    }
    Ok(())
}

fn option_index(form: &FormState, field: FieldId, label: String) -> Result<usize, CliError> {
    form.option_index(field, &label)
        .ok_or(CliError::UnknownOption {
            field: field.label(),
            value: label,
        })
}

async fn submit(submitter: &mut Submitter) -> Result<ExitCode, CliError> {
    match submitter.attempt_submit().await {
        SubmitOutcome::Invalid => {
            for (field, error) in submitter.form().errors() {
                eprintln!("{}: {}", field.label(), error);
            }
            Ok(ExitCode::from(2))
        }
        SubmitOutcome::Delivered(reply) => {
            let message = reply.map(|r| r.message).unwrap_or_default();
            println!("{message}");
            Ok(ExitCode::SUCCESS)
        }
        SubmitOutcome::Failed(_) => {
            // Details were logged by the submitter
            eprintln!("{}", submitter.notice().unwrap_or_default());
            Ok(ExitCode::FAILURE)
        }
    }
}
