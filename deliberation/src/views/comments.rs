use diesel::prelude::*;
use rocket::form::Form;
use rocket::response::content::RawHtml;
use rocket::{post, State};
use validator::Validate;

use crate::access_control::AuthUser;
use crate::config::AppConfig;
use crate::error::DeliberationResult;
use crate::forms::{DeleteIssueCommentForm, EditIssueCommentForm};
use crate::models::{ContentUpdate, IssueComment, User};
use crate::schema::users;
use crate::scope::CommunityScope;
use crate::templates::{render_comment, CommentView};
use crate::Db;

/// Applies a versioned edit and answers with the comment as it now stands.
///
/// The comment is looked up before the form is checked, so an unknown comment
/// is a 404 either way. An invalid submission then gets an empty 200 response.
/// A stale version leaves the comment untouched; the fragment then shows the
/// stored content.
#[post("/<community_id>/comments/<pk>/edit", data = "<form>")]
pub async fn comment_edit(
    community_id: i32,
    pk: i32,
    user: AuthUser,
    db: Db,
    config: &State<AppConfig>,
    form: Option<Form<EditIssueCommentForm>>,
) -> DeliberationResult<RawHtml<String>> {
    let form = form
        .map(Form::into_inner)
        .filter(|form| form.validate().is_ok());

    let editor = user.into_user();
    let edited = db
        .run(move |conn| -> DeliberationResult<Option<(IssueComment, User)>> {
            let scope = CommunityScope::resolve(conn, community_id)?;
            let comment = scope.comment(conn, pk)?;
            let form = match form {
                Some(form) => form,
                None => return Ok(None),
            };

            let outcome = comment.update_content(conn, form.version, &editor, &form.content)?;
            let comment = scope.comment(conn, pk)?;
            match outcome {
                ContentUpdate::Updated { version } => {
                    log::debug!("comment {} now at version {}", comment.id, version)
                }
                ContentUpdate::Conflict => log::info!(
                    "edit of comment {} by {} was based on version {}, stored version is {}",
                    comment.id,
                    editor.username,
                    form.version,
                    comment.version
                ),
                ContentUpdate::Unchanged => {}
            }

            let author = users::table.find(comment.created_by).first(conn)?;
            Ok(Some((comment, author)))
        })
        .await?;

    match edited {
        Some((comment, author)) => {
            let html = render_comment(&CommentView::new(&comment, &author, community_id, config))?;
            Ok(RawHtml(html))
        }
        None => Ok(RawHtml(String::new())),
    }
}

/// Soft-deletes or restores a comment. The body is the new `active` flag as
/// `1` or `0`.
#[post("/<community_id>/comments/<pk>/delete", data = "<form>")]
pub async fn comment_delete(
    community_id: i32,
    pk: i32,
    _user: AuthUser,
    db: Db,
    form: Form<DeleteIssueCommentForm>,
) -> DeliberationResult<RawHtml<String>> {
    let active = form.active();
    let comment = db
        .run(move |conn| -> DeliberationResult<IssueComment> {
            let comment = CommunityScope::resolve(conn, community_id)?.comment(conn, pk)?;
            Ok(comment.set_active(conn, active)?)
        })
        .await?;

    Ok(RawHtml(i32::from(comment.active).to_string()))
}
