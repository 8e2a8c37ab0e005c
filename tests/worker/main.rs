// fn main not required
mod context_errors;
mod happy_path;
mod helpers;
mod mail_transfer_errors;
mod pagination;
mod template_errors;
