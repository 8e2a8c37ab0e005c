use std::sync::Arc;

use aws_config::BehaviorVersion;
use email_worker::configuration::get_configuration;
use email_worker::driver::run_batch;
use email_worker::mail::MAILGUN_BASE_URL;
use email_worker::pipeline::Pipeline;
use email_worker::secrets::SsmSecretStore;
use email_worker::startup;
use email_worker::telemetry::get_subscriber;
use email_worker::telemetry::init_subscriber;

/// Initialise telemetry, load settings, and run one batch (§4.9). The worker is invoked
/// periodically by an external trigger; each process invocation is exactly one run, and
/// exits successfully regardless of individual emails' terminal status (§6).
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("email-worker", "info", std::io::stdout);
    init_subscriber(subscriber);

    let settings = get_configuration()?;
    tracing::info!(stage = %settings.stage, "starting batch run");

    let aws_cfg = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let secret_store = SsmSecretStore::new(aws_sdk_ssm::Client::new(&aws_cfg));
    let s3_client = aws_sdk_s3::Client::new(&aws_cfg);

    let components = startup::build(&settings, &secret_store, s3_client, MAILGUN_BASE_URL).await?;
    let pipeline = Pipeline::new(
        Arc::clone(&components.scheduled_email_client),
        Arc::clone(&components.token_cache),
        Arc::clone(&components.attachment_fetcher),
        Arc::clone(&components.mail_dispatcher),
    );

    let output = run_batch(components.scheduled_email_client, pipeline).await?;
    tracing::info!(count = output.emails.len(), "batch run complete");

    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}
