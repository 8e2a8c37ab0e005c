//! The Template Renderer (§4.5): subject/body rendering via `tera`, with autoescape
//! on and a hand-rolled stand-in for the Jinja2 "debug undefined" semantics the spec
//! calls for — `tera` has no built-in undefined-variable leniency, so a missing
//! variable (bare, or nested via attribute access like `person.email`) is detected
//! from `tera`'s own error and patched into the context as a placeholder that echoes
//! its own reference, then the template is re-rendered.

use std::collections::HashMap;
use std::collections::HashSet;

use serde_json::Value;
use tera::Context;
use tera::Tera;

use crate::domain::FetchedAttachment;
use crate::domain::RenderedEmail;
use crate::domain::ScheduledEmail;
use crate::errors::RenderError;

/// Bound on the number of re-render passes so a pathological template (hundreds of
/// distinct undefined names) can't loop indefinitely; each pass patches exactly one
/// previously-unseen missing dotted path.
const MAX_UNDEFINED_PASSES: usize = 64;

/// `tera` reports the full dotted path it failed to look up (e.g. `person.email`, not
/// just `person`), so a single extraction handles both bare names and attribute access.
fn missing_variable_path(message: &str) -> Option<String> {
    if !message.contains("not found in context") {
        return None;
    }
    let start = message.find('`')? + 1;
    let rest = &message[start..];
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}

/// Set `placeholder` at the dotted `path` inside `root`, creating intermediate objects
/// as needed and preserving any siblings a previous pass already patched under `root`.
fn set_nested(root: &mut Value, path: &str, placeholder: &str) {
    let mut current = root;
    let segments: Vec<&str> = path.split('.').collect();
    for (i, segment) in segments.iter().enumerate() {
        if !current.is_object() {
            *current = Value::Object(serde_json::Map::new());
        }
        let map = current.as_object_mut().expect("just coerced to an object");
        if i == segments.len() - 1 {
            map.insert((*segment).to_string(), Value::String(placeholder.to_string()));
            return;
        }
        current = map.entry((*segment).to_string()).or_insert_with(|| Value::Object(serde_json::Map::new()));
    }
}

/// Render one template string against `context`, autoescape on. Undefined variables —
/// bare (`{{ name }}`) or nested via attribute access (`{{ person.email }}`) — render to
/// a `{{ path }}` placeholder (invariant #7, §8) instead of failing the render; a
/// genuine syntax error still propagates as `RenderError::TemplateSyntax`.
fn render_template(template_source: &str, context: &Context) -> Result<String, RenderError> {
    let mut context = context.clone();
    let mut patched_paths: HashSet<String> = HashSet::new();
    let mut patched_roots: HashMap<String, Value> = HashMap::new();
    loop {
        match Tera::one_off(template_source, &context, true) {
            Ok(rendered) => return Ok(rendered),
            Err(err) => {
                let message = err.to_string();
                match missing_variable_path(&message) {
                    Some(path)
                        if !patched_paths.contains(&path) && patched_paths.len() < MAX_UNDEFINED_PASSES =>
                    {
                        let placeholder = format!("{{{{ {path} }}}}");
                        let (root, rest) = match path.split_once('.') {
                            Some((root, rest)) => (root, Some(rest)),
                            None => (path.as_str(), None),
                        };
                        match rest {
                            None => context.insert(root, &placeholder),
                            Some(rest) => {
                                let entry = patched_roots.entry(root.to_string()).or_insert_with(|| {
                                    context.get(root).cloned().unwrap_or_else(|| Value::Object(serde_json::Map::new()))
                                });
                                set_nested(entry, rest, &placeholder);
                                context.insert(root, entry);
                            }
                        }
                        patched_paths.insert(path);
                    }
                    _ => return Err(RenderError::TemplateSyntax(message)),
                }
            }
        }
    }
}

fn markdown_to_html(body: &str) -> String {
    use pulldown_cmark::html;
    use pulldown_cmark::Parser;

    let parser = Parser::new(body);
    let mut html_out = String::new();
    html::push_html(&mut html_out, parser);
    html_out
}

/// Email-level render (§4.5): subject, then body (post-processed through markdown
/// unconditionally), then `to_header_rendered` built by filtering the already-resolved
/// recipient strings for non-empty values, preserving order.
pub fn render_email(
    email: &ScheduledEmail,
    context: &Context,
    recipients: Vec<String>,
) -> Result<RenderedEmail, RenderError> {
    let subject_rendered = render_template(&email.subject, context)?;
    let body_rendered_markdown = render_template(&email.body, context)?;
    let body_rendered = markdown_to_html(&body_rendered_markdown);
    let to_header_rendered: Vec<String> = recipients.into_iter().filter(|address| !address.is_empty()).collect();

    Ok(RenderedEmail {
        source: email.clone(),
        subject_rendered,
        body_rendered,
        to_header_rendered,
        attachments_with_content: Vec::<FetchedAttachment>::new(),
    })
}
