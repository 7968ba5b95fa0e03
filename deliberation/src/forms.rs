//! Form inputs. Parsing is done by Rocket's `FromForm`, field rules by
//! `validator`.
use rocket::FromForm;
use validator::Validate;

use crate::datetime::ScheduledAt;
use crate::helper::{blank_to_none, not_blank};
use crate::models::{
    Acceptance, Issue, IssueChanges, NewIssue, NewProposal, ProposalChanges, UpcomingMeetingChanges,
};

#[derive(Debug, FromForm, Validate)]
pub struct CreateIssueCommentForm {
    #[validate(custom = "not_blank")]
    pub content: String,
}

#[derive(Debug, FromForm, Validate)]
pub struct EditIssueCommentForm {
    pub version: i32,
    #[validate(custom = "not_blank")]
    pub content: String,
}

/// Soft-delete toggle. The comment stays active only when `undelete` is
/// present, whatever its value.
#[derive(Debug, FromForm)]
pub struct DeleteIssueCommentForm {
    pub undelete: Option<String>,
}

impl DeleteIssueCommentForm {
    pub fn active(&self) -> bool {
        self.undelete.is_some()
    }
}

#[derive(Debug, FromForm, Validate)]
pub struct CreateIssueForm {
    #[validate(length(min = 1, max = 300), custom = "not_blank")]
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
}

impl CreateIssueForm {
    pub fn into_new(self, community_id: i32, created_by: i32) -> NewIssue {
        NewIssue {
            community_id,
            title: self.title.trim().to_owned(),
            summary: blank_to_none(self.summary),
            content: blank_to_none(self.content),
            created_by,
        }
    }
}

#[derive(Debug, FromForm, Validate)]
pub struct UpdateIssueForm {
    #[validate(length(min = 1, max = 300), custom = "not_blank")]
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub is_closed: bool,
}

impl UpdateIssueForm {
    pub fn into_changes(self, issue: &Issue, at: chrono::NaiveDateTime) -> IssueChanges {
        IssueChanges {
            title: self.title.trim().to_owned(),
            summary: blank_to_none(self.summary),
            content: blank_to_none(self.content),
            is_closed: self.is_closed,
            closed_at: IssueChanges::closing(issue, self.is_closed, at),
        }
    }
}

#[derive(Debug, FromForm, Validate)]
pub struct ProposalForm {
    #[validate(length(min = 1, max = 300), custom = "not_blank")]
    pub title: String,
    pub content: Option<String>,
}

impl ProposalForm {
    pub fn into_new(self, issue_id: i32, created_by: i32) -> NewProposal {
        NewProposal {
            issue_id,
            title: self.title.trim().to_owned(),
            content: blank_to_none(self.content),
            created_by,
        }
    }

    pub fn into_changes(self) -> ProposalChanges {
        ProposalChanges {
            title: self.title.trim().to_owned(),
            content: blank_to_none(self.content),
        }
    }
}

/// Accept/reject toggle; see [`Acceptance::from_field`].
#[derive(Debug, FromForm)]
pub struct ProposalAcceptanceForm {
    pub accepted: String,
}

impl ProposalAcceptanceForm {
    pub fn acceptance(&self, at: chrono::NaiveDateTime) -> Acceptance {
        Acceptance::from_field(&self.accepted, at)
    }
}

#[derive(Debug, FromForm, Validate)]
pub struct EditUpcomingMeetingForm {
    pub upcoming_meeting_scheduled_at: ScheduledAt,
    #[field(default = String::new())]
    #[validate(length(max = 300))]
    pub upcoming_meeting_location: String,
    #[field(default = String::new())]
    pub upcoming_meeting_comments: String,
}

impl EditUpcomingMeetingForm {
    pub fn into_changes(self) -> UpcomingMeetingChanges {
        UpcomingMeetingChanges {
            upcoming_meeting_scheduled_at: self.upcoming_meeting_scheduled_at.into_inner(),
            upcoming_meeting_location: self.upcoming_meeting_location.trim().to_owned(),
            upcoming_meeting_comments: self.upcoming_meeting_comments.trim().to_owned(),
        }
    }
}

/// Publishing carries no model fields, only who should be told.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, FromForm)]
pub struct PublishUpcomingMeetingForm {
    pub send_to_members: bool,
    pub send_to_board: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::form::Form;

    #[test]
    fn comment_content_must_not_be_blank() {
        let form = Form::<CreateIssueCommentForm>::parse("content=   ").unwrap();
        assert!(form.validate().is_err());

        let form = Form::<CreateIssueCommentForm>::parse("content=Agreed").unwrap();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn edit_requires_a_version() {
        assert!(Form::<EditIssueCommentForm>::parse("content=x").is_err());
        let form = Form::<EditIssueCommentForm>::parse("version=4&content=x").unwrap();
        assert_eq!(form.version, 4);
    }

    #[test]
    fn undelete_presence_decides_activity() {
        let form = Form::<DeleteIssueCommentForm>::parse("").unwrap();
        assert!(!form.active());

        let form = Form::<DeleteIssueCommentForm>::parse("undelete=").unwrap();
        assert!(form.active());
    }

    #[test]
    fn long_titles_are_rejected() {
        let body = format!("title={}", "a".repeat(301));
        let form = Form::<CreateIssueForm>::parse(&body).unwrap();
        assert!(form.validate().is_err());
    }

    #[test]
    fn blank_optional_issue_fields_are_dropped() {
        let form = Form::<CreateIssueForm>::parse("title= Roads &summary=&content=potholes").unwrap();
        let new = form.into_new(2, 9);
        assert_eq!(new.title, "Roads");
        assert_eq!(new.summary, None);
        assert_eq!(new.content.as_deref(), Some("potholes"));
        assert_eq!(new.community_id, 2);
        assert_eq!(new.created_by, 9);
    }

    #[test]
    fn acceptance_field_is_required() {
        assert!(Form::<ProposalAcceptanceForm>::parse("").is_err());
        let form = Form::<ProposalAcceptanceForm>::parse("accepted=0").unwrap();
        assert_eq!(form.accepted, "0");
    }

    #[test]
    fn meeting_fields_default_to_blank() {
        let form = Form::<EditUpcomingMeetingForm>::parse("").unwrap();
        let changes = form.into_changes();
        assert_eq!(changes.upcoming_meeting_scheduled_at, None);
        assert_eq!(changes.upcoming_meeting_location, "");
        assert_eq!(changes.upcoming_meeting_comments, "");
    }

    #[test]
    fn meeting_time_must_parse() {
        assert!(Form::<EditUpcomingMeetingForm>::parse("upcoming_meeting_scheduled_at=soon").is_err());
        let form = Form::<EditUpcomingMeetingForm>::parse(
            "upcoming_meeting_scheduled_at=2026-11-02T18:30&upcoming_meeting_location=Town hall",
        )
        .unwrap();
        assert!(form.upcoming_meeting_scheduled_at.is_some());
        assert_eq!(form.upcoming_meeting_location, "Town hall");
    }

    #[test]
    fn publish_checkboxes_default_off() {
        let form = Form::<PublishUpcomingMeetingForm>::parse("send_to_board=on").unwrap();
        assert!(form.send_to_board);
        assert!(!form.send_to_members);

        let form = Form::<PublishUpcomingMeetingForm>::parse("").unwrap();
        assert_eq!(form, PublishUpcomingMeetingForm::default());
    }
}
