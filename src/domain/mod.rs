mod auth_token;
mod batch;
mod context;
mod recipient_link;
mod rendered_email;
mod scheduled_email;

// allow external `use` statements to skip the submodule names
pub use auth_token::AuthToken;
pub use batch::BatchResult;
pub use batch::WorkerOutput;
pub use batch::WorkerOutputEmail;
pub use context::parse_context;
pub use context::ContextLink;
pub use recipient_link::parse_recipient_links;
pub use recipient_link::RecipientLink;
pub use rendered_email::FetchedAttachment;
pub use rendered_email::RenderedEmail;
pub use scheduled_email::AttachmentRef;
pub use scheduled_email::ScheduledEmail;
pub use scheduled_email::ScheduledEmailStatus;
