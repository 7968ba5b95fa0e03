use diesel::prelude::*;
use rocket::form::{Contextual, Form};
use rocket::response::content::RawHtml;
use rocket::{get, post, State};
use serde_json::json;

use super::{check, FormResponse, Rejected};
use crate::access_control::AuthUser;
use crate::config::AppConfig;
use crate::datetime::to_input_value;
use crate::error::DeliberationResult;
use crate::forms::{EditUpcomingMeetingForm, PublishUpcomingMeetingForm};
use crate::models::Community;
use crate::publish::{publish_upcoming_meeting, Audience};
use crate::scope::CommunityScope;
use crate::templates::{render_errors, render_page, MeetingView};
use crate::Db;

const MEETING_FIELDS: &[&str] = &[
    "upcoming_meeting_scheduled_at",
    "upcoming_meeting_location",
    "upcoming_meeting_comments",
];

#[get("/<community_id>/upcoming")]
pub async fn upcoming_meeting(
    community_id: i32,
    _user: AuthUser,
    db: Db,
    config: &State<AppConfig>,
) -> DeliberationResult<RawHtml<String>> {
    let community = db
        .run(move |conn| CommunityScope::resolve(conn, community_id))
        .await?
        .into_community();

    let url = community.upcoming_meeting_url();
    let html = render_page(
        "communities/upcoming_meeting",
        config,
        "Upcoming meeting",
        &community,
        json!({
            "meeting": MeetingView::new(&community, config),
            "edit_url": format!("{}/edit", url),
            "publish_url": format!("{}/publish", url),
        }),
    )?;
    Ok(RawHtml(html))
}

fn meeting_form_page(
    config: &AppConfig,
    community: &Community,
    values: serde_json::Value,
    errors_html: String,
) -> DeliberationResult<FormResponse> {
    let html = render_page(
        "communities/upcoming_meeting_form",
        config,
        "Edit upcoming meeting",
        community,
        json!({
            "action": format!("{}/edit", community.upcoming_meeting_url()),
            "form": values,
            "errors_html": errors_html,
        }),
    )?;
    Ok(FormResponse::Page(RawHtml(html)))
}

#[get("/<community_id>/upcoming/edit")]
pub async fn upcoming_meeting_edit_form(
    community_id: i32,
    _user: AuthUser,
    db: Db,
    config: &State<AppConfig>,
) -> DeliberationResult<FormResponse> {
    let community = db
        .run(move |conn| CommunityScope::resolve(conn, community_id))
        .await?
        .into_community();

    let values = json!({
        "upcoming_meeting_scheduled_at": to_input_value(community.upcoming_meeting_scheduled_at),
        "upcoming_meeting_location": &community.upcoming_meeting_location,
        "upcoming_meeting_comments": &community.upcoming_meeting_comments,
    });
    meeting_form_page(config, &community, values, String::new())
}

#[post("/<community_id>/upcoming/edit", data = "<form>")]
pub async fn upcoming_meeting_edit<'r>(
    community_id: i32,
    _user: AuthUser,
    db: Db,
    config: &State<AppConfig>,
    form: Form<Contextual<'r, EditUpcomingMeetingForm>>,
) -> DeliberationResult<FormResponse> {
    let submitted = check(form, MEETING_FIELDS);

    let (community, updated) = db
        .run(move |conn| -> DeliberationResult<_> {
            let community = CommunityScope::resolve(conn, community_id)?.into_community();
            let updated = match submitted {
                Ok(form) => Ok(diesel::update(&community)
                    .set(form.into_changes())
                    .get_result::<Community>(conn)?),
                Err(rejected) => Err(rejected),
            };
            Ok((community, updated))
        })
        .await?;

    match updated {
        Ok(community) => Ok(FormResponse::redirect(community.upcoming_meeting_url())),
        Err(Rejected { errors, values }) => {
            meeting_form_page(config, &community, values, render_errors(&errors)?)
        }
    }
}

#[get("/<community_id>/upcoming/publish")]
pub async fn publish_form(
    community_id: i32,
    _user: AuthUser,
    db: Db,
    config: &State<AppConfig>,
) -> DeliberationResult<RawHtml<String>> {
    let community = db
        .run(move |conn| CommunityScope::resolve(conn, community_id))
        .await?
        .into_community();

    let html = render_page(
        "communities/publish_form",
        config,
        "Publish upcoming meeting",
        &community,
        json!({ "action": format!("{}/publish", community.upcoming_meeting_url()) }),
    )?;
    Ok(RawHtml(html))
}

/// Marks the upcoming meeting published and lists who is to be told.
#[post("/<community_id>/upcoming/publish", data = "<form>")]
pub async fn publish(
    community_id: i32,
    _user: AuthUser,
    db: Db,
    config: &State<AppConfig>,
    form: Form<PublishUpcomingMeetingForm>,
) -> DeliberationResult<RawHtml<String>> {
    let audience = Audience::from(form.into_inner());
    let (community, recipients) = db
        .run(move |conn| -> DeliberationResult<_> {
            let community = CommunityScope::resolve(conn, community_id)?.into_community();
            Ok(publish_upcoming_meeting(conn, &community, audience)?)
        })
        .await?;

    let recipients: Vec<&str> = recipients.iter().map(|u| u.label()).collect();
    let html = render_page(
        "communities/published",
        config,
        "Meeting published",
        &community,
        json!({
            "published_at": config.format_optional(community.upcoming_meeting_published_at),
            "recipient_count": recipients.len(),
            "recipients": recipients,
            "upcoming_url": community.upcoming_meeting_url(),
        }),
    )?;
    Ok(RawHtml(html))
}
