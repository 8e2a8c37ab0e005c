pub mod attachment;
pub mod configuration;
pub mod domain;
pub mod driver;
pub mod errors;
pub mod mail;
pub mod pipeline;
pub mod render;
pub mod scheduled_email_client;
pub mod secrets;
pub mod startup;
pub mod telemetry;
pub mod token;
pub mod uri;
