//! Page and fragment rendering.
//!
//! Pages are the body template spliced into `base.html`; fragments such as
//! `issues/_comment` are registered on their own so they can be returned to
//! XHR callers as-is.
use handlebars::{Handlebars, RenderError};
use lazy_static::lazy_static;
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::helper::FieldErrors;
use crate::models::{Community, Issue, IssueComment, Proposal, User};

const PAGES: &[(&str, &str)] = &[
    ("issues/issue_list", include_str!("templates/issues/issue_list.hbs")),
    ("issues/issue_detail", include_str!("templates/issues/issue_detail.hbs")),
    ("issues/issue_form", include_str!("templates/issues/issue_form.hbs")),
    ("issues/proposal_detail", include_str!("templates/issues/proposal_detail.hbs")),
    ("issues/proposal_form", include_str!("templates/issues/proposal_form.hbs")),
    ("communities/upcoming_meeting", include_str!("templates/communities/upcoming_meeting.hbs")),
    (
        "communities/upcoming_meeting_form",
        include_str!("templates/communities/upcoming_meeting_form.hbs"),
    ),
    ("communities/publish_form", include_str!("templates/communities/publish_form.hbs")),
    ("communities/published", include_str!("templates/communities/published.hbs")),
];

const FRAGMENTS: &[(&str, &str)] = &[
    ("issues/_comment", include_str!("templates/issues/_comment.hbs")),
    ("form_errors", include_str!("templates/form_errors.hbs")),
];

lazy_static! {
    static ref TEMPLATES: Handlebars<'static> = {
        let mut hbars = Handlebars::new();
        let root_template = include_str!("templates/base.html");

        for (name, fragment) in PAGES {
            let page = root_template.replace("{{content}}", fragment);
            hbars
                .register_template_string(name, &page)
                .unwrap_or_else(|e| panic!("unable to register {} template: {}", name, e));
        }

        for (name, fragment) in FRAGMENTS {
            hbars
                .register_template_string(name, fragment)
                .unwrap_or_else(|e| panic!("unable to register {} template: {}", name, e));
        }

        hbars
    };
}

pub fn render<T: Serialize>(name: &str, context: &T) -> Result<String, RenderError> {
    TEMPLATES.render(name, context)
}

/// Renders a full page. `body` must be a JSON object; the site name, page
/// title and community header are added to it.
pub fn render_page(
    name: &str,
    config: &AppConfig,
    title: &str,
    community: &Community,
    body: Value,
) -> Result<String, RenderError> {
    let mut context = json!({
        "site_name": config.site_name,
        "title": title,
        "community": CommunityView::new(community),
    });
    if let (Some(context), Value::Object(body)) = (context.as_object_mut(), body) {
        context.extend(body);
    }
    render(name, &context)
}

pub fn render_comment(comment: &CommentView) -> Result<String, RenderError> {
    render("issues/_comment", &json!({ "c": comment }))
}

pub fn render_errors(errors: &FieldErrors) -> Result<String, RenderError> {
    render("form_errors", &json!({ "errors": errors }))
}

#[derive(Debug, Serialize)]
pub struct CommunityView {
    pub id: i32,
    pub name: String,
    pub issues_url: String,
    pub upcoming_meeting_url: String,
}

impl CommunityView {
    pub fn new(community: &Community) -> Self {
        CommunityView {
            id: community.id,
            name: community.name.clone(),
            issues_url: community.issues_url(),
            upcoming_meeting_url: community.upcoming_meeting_url(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeetingView {
    pub scheduled_at: Option<String>,
    pub location: String,
    pub comments: String,
    pub is_published: bool,
    pub published_at: Option<String>,
}

impl MeetingView {
    pub fn new(community: &Community, config: &AppConfig) -> Self {
        MeetingView {
            scheduled_at: config.format_optional(community.upcoming_meeting_scheduled_at),
            location: community.upcoming_meeting_location.clone(),
            comments: community.upcoming_meeting_comments.clone(),
            is_published: community.upcoming_meeting_is_published,
            published_at: config.format_optional(community.upcoming_meeting_published_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IssueView {
    pub id: i32,
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub is_closed: bool,
    pub created_at: String,
    pub closed_at: Option<String>,
    pub url: String,
    pub edit_url: String,
}

impl IssueView {
    pub fn new(issue: &Issue, config: &AppConfig) -> Self {
        let url = issue.absolute_url();
        IssueView {
            id: issue.id,
            title: issue.title.clone(),
            summary: issue.summary.clone(),
            content: issue.content.clone(),
            is_closed: issue.is_closed,
            created_at: config.format_time(issue.created_at),
            closed_at: config.format_optional(issue.closed_at),
            edit_url: format!("{}/edit", url),
            url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: i32,
    pub content: String,
    pub active: bool,
    pub version: i32,
    pub author: String,
    pub created_at: String,
    pub edited_at: Option<String>,
    pub edit_url: String,
    pub delete_url: String,
}

impl CommentView {
    pub fn new(comment: &IssueComment, author: &User, community_id: i32, config: &AppConfig) -> Self {
        CommentView {
            id: comment.id,
            content: comment.content.clone(),
            active: comment.active,
            version: comment.version,
            author: author.label().to_owned(),
            created_at: config.format_time(comment.created_at),
            edited_at: config.format_optional(comment.last_edited_at),
            edit_url: format!("/{}/comments/{}/edit", community_id, comment.id),
            delete_url: format!("/{}/comments/{}/delete", community_id, comment.id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProposalView {
    pub id: i32,
    pub title: String,
    pub content: Option<String>,
    pub is_accepted: bool,
    pub accepted_at: Option<String>,
    pub url: String,
    pub edit_url: String,
}

impl ProposalView {
    pub fn new(proposal: &Proposal, community_id: i32, config: &AppConfig) -> Self {
        let url = proposal.absolute_url(community_id);
        ProposalView {
            id: proposal.id,
            title: proposal.title.clone(),
            content: proposal.content.clone(),
            is_accepted: proposal.is_accepted,
            accepted_at: config.format_optional(proposal.accepted_at),
            edit_url: format!("{}/edit", url),
            url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn user() -> User {
        User {
            id: 1,
            username: "dana".into(),
            display_name: "Dana K.".into(),
            created_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    fn comment(active: bool) -> IssueComment {
        IssueComment {
            id: 12,
            issue_id: 3,
            content: "<b>bold</b> claim".into(),
            active,
            version: 2,
            created_at: NaiveDate::from_ymd_opt(2026, 10, 16)
                .unwrap()
                .and_hms_opt(9, 15, 0)
                .unwrap(),
            created_by: 1,
            last_edited_at: None,
            last_edited_by: None,
        }
    }

    #[test]
    fn comment_fragment_escapes_content() {
        let view = CommentView::new(&comment(true), &user(), 4, &AppConfig::default());
        let html = render_comment(&view).unwrap();

        assert!(html.contains(r#"id="comment-12""#));
        assert!(html.contains(r#"data-version="2""#));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt; claim"));
        assert!(html.contains("Dana K."));
        assert!(html.contains("2026-10-16 09:15"));
        assert!(html.contains("/4/comments/12/edit"));
        assert!(!html.contains("<b>bold</b>"));
    }

    #[test]
    fn deleted_comment_offers_undelete() {
        let view = CommentView::new(&comment(false), &user(), 4, &AppConfig::default());
        let html = render_comment(&view).unwrap();
        assert!(html.contains(r#"name="undelete""#));
    }

    #[test]
    fn pages_carry_site_and_community() {
        let community = Community {
            id: 4,
            name: "Riverside".into(),
            upcoming_meeting_scheduled_at: None,
            upcoming_meeting_location: String::new(),
            upcoming_meeting_comments: String::new(),
            upcoming_meeting_is_published: false,
            upcoming_meeting_published_at: None,
            created_at: user().created_at,
        };
        let config = AppConfig {
            site_name: "Town Square".into(),
            ..AppConfig::default()
        };
        let html = render_page(
            "issues/issue_list",
            &config,
            "Open issues",
            &community,
            json!({ "issues": [], "create_url": "/4/issues/create" }),
        )
        .unwrap();

        assert!(html.contains("<title>Open issues | Town Square</title>"));
        assert!(html.contains(r#"href="/4/issues""#));
        assert!(html.contains("There are no open issues."));
    }

    #[test]
    fn errors_list_each_field() {
        let mut errors = BTreeMap::new();
        errors.insert("title".to_owned(), vec!["This field is required.".to_owned()]);
        let html = render_errors(&errors).unwrap();
        assert!(html.contains(r#"data-field="title""#));
        assert!(html.contains("This field is required."));
    }
}
