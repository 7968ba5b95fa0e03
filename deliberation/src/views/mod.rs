//! Route handlers.
//!
//! Every handler takes the [`AuthUser`](crate::access_control::AuthUser)
//! guard, resolves a fresh [`CommunityScope`](crate::scope::CommunityScope)
//! inside `Db::run`, and only then reads or writes rows.
use rocket::form::{Context, Contextual, Form};
use rocket::response::content::RawHtml;
use rocket::response::Redirect;
use rocket::{Responder, Route};
use serde_json::{Map, Value};
use validator::Validate;

use crate::helper::{error_messages, malformed_submission, FieldErrors};

pub mod comments;
pub mod communities;
pub mod issues;
pub mod proposals;

pub fn routes() -> Vec<Route> {
    rocket::routes![
        issues::issue_list,
        issues::issue_detail,
        issues::create_comment,
        issues::issue_create_form,
        issues::issue_create,
        issues::issue_edit_form,
        issues::issue_edit,
        comments::comment_edit,
        comments::comment_delete,
        proposals::proposal_create_form,
        proposals::proposal_create,
        proposals::proposal_detail,
        proposals::proposal_accept,
        proposals::proposal_edit_form,
        proposals::proposal_edit,
        communities::upcoming_meeting,
        communities::upcoming_meeting_edit_form,
        communities::upcoming_meeting_edit,
        communities::publish_form,
        communities::publish,
    ]
}

/// Outcome of a page form: back to the form, or on to the saved object.
#[derive(Debug, Responder)]
pub enum FormResponse {
    Page(RawHtml<String>),
    Redirect(Redirect),
}

impl FormResponse {
    pub fn redirect(url: String) -> Self {
        FormResponse::Redirect(Redirect::to(url))
    }
}

/// A page form submission that did not make it through parsing or
/// validation, with what the user typed so the form can be shown again.
#[derive(Debug)]
pub struct Rejected {
    pub errors: FieldErrors,
    pub values: Value,
}

/// Parses and validates a page form. `fields` are echoed back on rejection.
pub fn check<T: Validate>(form: Form<Contextual<'_, T>>, fields: &[&str]) -> Result<T, Rejected> {
    let Contextual { value, context } = form.into_inner();
    let errors = match value {
        Some(value) => match value.validate() {
            Ok(()) => return Ok(value),
            Err(e) => error_messages(&e),
        },
        None => parse_errors(&context),
    };

    Err(Rejected {
        errors,
        values: echo(&context, fields),
    })
}

fn parse_errors(context: &Context<'_>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for error in context.errors() {
        let field = error
            .name
            .as_ref()
            .map(|name| name.to_string())
            .unwrap_or_else(|| "__all__".to_owned());
        errors.entry(field).or_insert_with(Vec::new).push(error.to_string());
    }

    if errors.is_empty() {
        malformed_submission()
    } else {
        errors
    }
}

fn echo(context: &Context<'_>, fields: &[&str]) -> Value {
    let mut values = Map::new();
    for field in fields {
        if let Some(value) = context.field_value(*field) {
            values.insert((*field).to_owned(), Value::String(value.to_owned()));
        }
    }
    Value::Object(values)
}
