use diesel::prelude::*;
use rocket::form::{Contextual, Form};
use rocket::response::content::{RawHtml, RawJson};
use rocket::{get, post, State};
use serde_json::json;

use super::{check, FormResponse, Rejected};
use crate::access_control::AuthUser;
use crate::config::AppConfig;
use crate::error::DeliberationResult;
use crate::forms::{ProposalAcceptanceForm, ProposalForm};
use crate::models::{now, Proposal};
use crate::schema::proposals;
use crate::scope::{CommunityScope, IssueScope};
use crate::templates::{render_errors, render_page, IssueView, ProposalView};
use crate::Db;

const PROPOSAL_FIELDS: &[&str] = &["title", "content"];

fn proposal_form_page(
    config: &AppConfig,
    scope: &IssueScope,
    proposal: Option<&Proposal>,
    values: serde_json::Value,
    errors_html: String,
) -> DeliberationResult<FormResponse> {
    let issue = IssueView::new(&scope.issue, config);
    let (title, action) = match proposal {
        Some(p) => (
            "Edit proposal".to_owned(),
            format!("{}/edit", p.absolute_url(scope.community.id)),
        ),
        None => ("New proposal".to_owned(), format!("{}/proposals/create", issue.url)),
    };

    let html = render_page(
        "issues/proposal_form",
        config,
        &title,
        &scope.community,
        json!({
            "action": action,
            "issue": issue,
            "form": values,
            "errors_html": errors_html,
        }),
    )?;
    Ok(FormResponse::Page(RawHtml(html)))
}

#[get("/<community_id>/issues/<pk>/proposals/create")]
pub async fn proposal_create_form(
    community_id: i32,
    pk: i32,
    _user: AuthUser,
    db: Db,
    config: &State<AppConfig>,
) -> DeliberationResult<FormResponse> {
    let scope = db
        .run(move |conn| CommunityScope::resolve(conn, community_id)?.issue_scope(conn, pk))
        .await?;

    proposal_form_page(config, &scope, None, json!({}), String::new())
}

/// Creates a proposal on issue `pk` and goes back to the issue page.
#[post("/<community_id>/issues/<pk>/proposals/create", data = "<form>")]
pub async fn proposal_create<'r>(
    community_id: i32,
    pk: i32,
    user: AuthUser,
    db: Db,
    config: &State<AppConfig>,
    form: Form<Contextual<'r, ProposalForm>>,
) -> DeliberationResult<FormResponse> {
    let submitted = check(form, PROPOSAL_FIELDS);
    let created_by = user.user().id;

    let (scope, created) = db
        .run(move |conn| -> DeliberationResult<_> {
            let scope = CommunityScope::resolve(conn, community_id)?.issue_scope(conn, pk)?;
            let created = match submitted {
                Ok(form) => Ok(diesel::insert_into(proposals::table)
                    .values(form.into_new(scope.issue.id, created_by))
                    .get_result::<Proposal>(conn)?),
                Err(rejected) => Err(rejected),
            };
            Ok((scope, created))
        })
        .await?;

    match created {
        Ok(proposal) => {
            log::info!("proposal {} added to issue {}", proposal.id, scope.issue.id);
            Ok(FormResponse::redirect(scope.issue.absolute_url()))
        }
        Err(Rejected { errors, values }) => {
            proposal_form_page(config, &scope, None, values, render_errors(&errors)?)
        }
    }
}

#[get("/<community_id>/issues/<issue_id>/proposals/<pk>", rank = 2)]
pub async fn proposal_detail(
    community_id: i32,
    issue_id: i32,
    pk: i32,
    _user: AuthUser,
    db: Db,
    config: &State<AppConfig>,
) -> DeliberationResult<RawHtml<String>> {
    let (scope, proposal) = db
        .run(move |conn| -> DeliberationResult<_> {
            let scope = CommunityScope::resolve(conn, community_id)?.issue_scope(conn, issue_id)?;
            let proposal = scope.proposal(conn, pk)?;
            Ok((scope, proposal))
        })
        .await?;

    let html = render_page(
        "issues/proposal_detail",
        config,
        &proposal.title,
        &scope.community,
        json!({
            "issue": IssueView::new(&scope.issue, config),
            "proposal": ProposalView::new(&proposal, community_id, config),
        }),
    )?;
    Ok(RawHtml(html))
}

/// Accepts the proposal when `accepted` is `"0"`, rejects it otherwise.
/// Answers with the resulting flag as a JSON integer.
#[post("/<community_id>/issues/<issue_id>/proposals/<pk>", data = "<form>", rank = 2)]
pub async fn proposal_accept(
    community_id: i32,
    issue_id: i32,
    pk: i32,
    user: AuthUser,
    db: Db,
    form: Form<ProposalAcceptanceForm>,
) -> DeliberationResult<RawJson<String>> {
    let acceptance = form.acceptance(now());
    let proposal = db
        .run(move |conn| -> DeliberationResult<Proposal> {
            let scope = CommunityScope::resolve(conn, community_id)?.issue_scope(conn, issue_id)?;
            let proposal = scope.proposal(conn, pk)?;
            Ok(diesel::update(&proposal).set(acceptance).get_result(conn)?)
        })
        .await?;

    log::info!(
        "proposal {} {} by {}",
        proposal.id,
        if proposal.is_accepted { "accepted" } else { "rejected" },
        user.user().username
    );
    Ok(RawJson(acceptance.as_json()))
}

#[get("/<community_id>/issues/<issue_id>/proposals/<pk>/edit")]
pub async fn proposal_edit_form(
    community_id: i32,
    issue_id: i32,
    pk: i32,
    _user: AuthUser,
    db: Db,
    config: &State<AppConfig>,
) -> DeliberationResult<FormResponse> {
    let (scope, proposal) = db
        .run(move |conn| -> DeliberationResult<_> {
            let scope = CommunityScope::resolve(conn, community_id)?.issue_scope(conn, issue_id)?;
            let proposal = scope.proposal(conn, pk)?;
            Ok((scope, proposal))
        })
        .await?;

    let values = json!({ "title": proposal.title, "content": proposal.content });
    proposal_form_page(config, &scope, Some(&proposal), values, String::new())
}

#[post("/<community_id>/issues/<issue_id>/proposals/<pk>/edit", data = "<form>")]
pub async fn proposal_edit<'r>(
    community_id: i32,
    issue_id: i32,
    pk: i32,
    _user: AuthUser,
    db: Db,
    config: &State<AppConfig>,
    form: Form<Contextual<'r, ProposalForm>>,
) -> DeliberationResult<FormResponse> {
    let submitted = check(form, PROPOSAL_FIELDS);

    let (scope, proposal, updated) = db
        .run(move |conn| -> DeliberationResult<_> {
            let scope = CommunityScope::resolve(conn, community_id)?.issue_scope(conn, issue_id)?;
            let proposal = scope.proposal(conn, pk)?;
            let updated = match submitted {
                Ok(form) => Ok(diesel::update(&proposal)
                    .set(form.into_changes())
                    .get_result::<Proposal>(conn)?),
                Err(rejected) => Err(rejected),
            };
            Ok((scope, proposal, updated))
        })
        .await?;

    match updated {
        Ok(updated) => Ok(FormResponse::redirect(updated.absolute_url(community_id))),
        Err(Rejected { errors, values }) => {
            proposal_form_page(config, &scope, Some(&proposal), values, render_errors(&errors)?)
        }
    }
}
