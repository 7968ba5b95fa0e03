use diesel::prelude::*;
use rocket::form::{Contextual, Form};
use rocket::response::content::RawHtml;
use rocket::{get, post, State};
use serde_json::json;
use validator::Validate;

use super::{check, FormResponse, Rejected};
use crate::access_control::AuthUser;
use crate::config::AppConfig;
use crate::error::{DeliberationError, DeliberationResult};
use crate::forms::{CreateIssueCommentForm, CreateIssueForm, UpdateIssueForm};
use crate::models::{now, Community, Issue, IssueComment, NewIssueComment};
use crate::schema::{issue_comments, issues};
use crate::scope::CommunityScope;
use crate::templates::{render_comment, render_errors, render_page, CommentView, IssueView, ProposalView};
use crate::Db;

const ISSUE_FIELDS: &[&str] = &["title", "summary", "content", "is_closed"];

#[get("/<community_id>/issues")]
pub async fn issue_list(
    community_id: i32,
    _user: AuthUser,
    db: Db,
    config: &State<AppConfig>,
) -> DeliberationResult<RawHtml<String>> {
    let (community, issues) = db
        .run(move |conn| -> DeliberationResult<_> {
            let scope = CommunityScope::resolve(conn, community_id)?;
            let issues = scope.open_issues(conn)?;
            Ok((scope.into_community(), issues))
        })
        .await?;

    let issues: Vec<_> = issues.iter().map(|i| IssueView::new(i, config)).collect();
    let html = render_page(
        "issues/issue_list",
        config,
        "Open issues",
        &community,
        json!({
            "issues": issues,
            "create_url": format!("{}/create", community.issues_url()),
        }),
    )?;
    Ok(RawHtml(html))
}

#[get("/<community_id>/issues/<pk>", rank = 2)]
pub async fn issue_detail(
    community_id: i32,
    pk: i32,
    _user: AuthUser,
    db: Db,
    config: &State<AppConfig>,
) -> DeliberationResult<RawHtml<String>> {
    let (scope, proposals, comments) = db
        .run(move |conn| -> DeliberationResult<_> {
            let scope = CommunityScope::resolve(conn, community_id)?.issue_scope(conn, pk)?;
            let proposals = scope.all_proposals(conn)?;
            let comments = scope.active_comments(conn)?;
            Ok((scope, proposals, comments))
        })
        .await?;

    let mut comments_html = String::new();
    for (comment, author) in &comments {
        comments_html.push_str(&render_comment(&CommentView::new(
            comment,
            author,
            community_id,
            config,
        ))?);
    }

    let issue = IssueView::new(&scope.issue, config);
    let create_proposal_url = format!("{}/proposals/create", issue.url);
    let proposals: Vec<_> = proposals
        .iter()
        .map(|p| ProposalView::new(p, community_id, config))
        .collect();

    let html = render_page(
        "issues/issue_detail",
        config,
        &scope.issue.title,
        &scope.community,
        json!({
            "create_proposal_url": create_proposal_url,
            "issue": issue,
            "proposals": proposals,
            "comments_html": comments_html,
        }),
    )?;
    Ok(RawHtml(html))
}

/// Adds a comment to the issue and answers with its fragment.
#[post("/<community_id>/issues/<pk>", data = "<form>", rank = 2)]
pub async fn create_comment(
    community_id: i32,
    pk: i32,
    user: AuthUser,
    db: Db,
    config: &State<AppConfig>,
    form: Option<Form<CreateIssueCommentForm>>,
) -> DeliberationResult<RawHtml<String>> {
    let form = form.ok_or(DeliberationError::Malformed)?.into_inner();
    form.validate()?;

    let author = user.into_user();
    let created_by = author.id;
    let comment = db
        .run(move |conn| -> DeliberationResult<IssueComment> {
            let issue = CommunityScope::resolve(conn, community_id)?.issue(conn, pk)?;
            let comment = diesel::insert_into(issue_comments::table)
                .values(NewIssueComment {
                    issue_id: issue.id,
                    content: form.content.trim(),
                    created_by,
                })
                .get_result(conn)?;
            Ok(comment)
        })
        .await?;

    log::debug!("user {} commented on issue {} ({})", author.username, pk, comment.id);
    let html = render_comment(&CommentView::new(&comment, &author, community_id, config))?;
    Ok(RawHtml(html))
}

fn issue_form_page(
    config: &AppConfig,
    community: &Community,
    issue: Option<&Issue>,
    values: serde_json::Value,
    errors_html: String,
) -> DeliberationResult<FormResponse> {
    let (title, action) = match issue {
        Some(issue) => ("Edit issue".to_owned(), format!("{}/edit", issue.absolute_url())),
        None => ("New issue".to_owned(), format!("{}/create", community.issues_url())),
    };

    let html = render_page(
        "issues/issue_form",
        config,
        &title,
        community,
        json!({
            "action": action,
            "editing": issue.is_some(),
            "form": values,
            "errors_html": errors_html,
        }),
    )?;
    Ok(FormResponse::Page(RawHtml(html)))
}

fn issue_values(issue: &Issue) -> serde_json::Value {
    json!({
        "title": issue.title,
        "summary": issue.summary,
        "content": issue.content,
        "is_closed": issue.is_closed,
    })
}

#[get("/<community_id>/issues/create")]
pub async fn issue_create_form(
    community_id: i32,
    _user: AuthUser,
    db: Db,
    config: &State<AppConfig>,
) -> DeliberationResult<FormResponse> {
    let community = db
        .run(move |conn| CommunityScope::resolve(conn, community_id))
        .await?
        .into_community();

    issue_form_page(config, &community, None, json!({}), String::new())
}

#[post("/<community_id>/issues/create", data = "<form>")]
pub async fn issue_create<'r>(
    community_id: i32,
    user: AuthUser,
    db: Db,
    config: &State<AppConfig>,
    form: Form<Contextual<'r, CreateIssueForm>>,
) -> DeliberationResult<FormResponse> {
    let submitted = check(form, ISSUE_FIELDS);
    let created_by = user.user().id;

    let (community, created) = db
        .run(move |conn| -> DeliberationResult<_> {
            let community = CommunityScope::resolve(conn, community_id)?.into_community();
            let created = match submitted {
                Ok(form) => Ok(diesel::insert_into(issues::table)
                    .values(form.into_new(community.id, created_by))
                    .get_result::<Issue>(conn)?),
                Err(rejected) => Err(rejected),
            };
            Ok((community, created))
        })
        .await?;

    match created {
        Ok(issue) => {
            log::info!("issue {} created in community {}", issue.id, community.id);
            Ok(FormResponse::redirect(issue.absolute_url()))
        }
        Err(Rejected { errors, values }) => {
            issue_form_page(config, &community, None, values, render_errors(&errors)?)
        }
    }
}

#[get("/<community_id>/issues/<pk>/edit")]
pub async fn issue_edit_form(
    community_id: i32,
    pk: i32,
    _user: AuthUser,
    db: Db,
    config: &State<AppConfig>,
) -> DeliberationResult<FormResponse> {
    let scope = db
        .run(move |conn| CommunityScope::resolve(conn, community_id)?.issue_scope(conn, pk))
        .await?;

    issue_form_page(
        config,
        &scope.community,
        Some(&scope.issue),
        issue_values(&scope.issue),
        String::new(),
    )
}

#[post("/<community_id>/issues/<pk>/edit", data = "<form>")]
pub async fn issue_edit<'r>(
    community_id: i32,
    pk: i32,
    _user: AuthUser,
    db: Db,
    config: &State<AppConfig>,
    form: Form<Contextual<'r, UpdateIssueForm>>,
) -> DeliberationResult<FormResponse> {
    let submitted = check(form, ISSUE_FIELDS);

    let (scope, updated) = db
        .run(move |conn| -> DeliberationResult<_> {
            let scope = CommunityScope::resolve(conn, community_id)?.issue_scope(conn, pk)?;
            let updated = match submitted {
                Ok(form) => Ok(diesel::update(&scope.issue)
                    .set(form.into_changes(&scope.issue, now()))
                    .get_result::<Issue>(conn)?),
                Err(rejected) => Err(rejected),
            };
            Ok((scope, updated))
        })
        .await?;

    match updated {
        Ok(issue) => Ok(FormResponse::redirect(issue.absolute_url())),
        Err(Rejected { errors, values }) => issue_form_page(
            config,
            &scope.community,
            Some(&scope.issue),
            values,
            render_errors(&errors)?,
        ),
    }
}
