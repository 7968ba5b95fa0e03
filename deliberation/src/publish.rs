use diesel::prelude::*;
use diesel::PgConnection;

use crate::forms::PublishUpcomingMeetingForm;
use crate::models::{now, Community, Membership, User};
use crate::schema::{communities, memberships, users};

/// Who hears about a published meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Audience {
    pub members: bool,
    pub board: bool,
}

impl From<PublishUpcomingMeetingForm> for Audience {
    fn from(form: PublishUpcomingMeetingForm) -> Self {
        Audience {
            members: form.send_to_members,
            board: form.send_to_board,
        }
    }
}

impl Audience {
    pub fn includes(&self, membership: &Membership) -> bool {
        self.members || (self.board && membership.is_board)
    }

    pub fn is_empty(&self) -> bool {
        !self.members && !self.board
    }
}

/// Members of `community` selected by `audience`, ordered by username.
pub fn recipients(
    conn: &mut PgConnection,
    community: &Community,
    audience: Audience,
) -> QueryResult<Vec<User>> {
    if audience.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<(Membership, User)> = memberships::table
        .inner_join(users::table)
        .filter(memberships::community_id.eq(community.id))
        .order(users::username.asc())
        .load(conn)?;

    Ok(rows
        .into_iter()
        .filter(|(membership, _)| audience.includes(membership))
        .map(|(_, user)| user)
        .collect())
}

/// Marks the upcoming meeting as published and returns the recipients.
pub fn publish_upcoming_meeting(
    conn: &mut PgConnection,
    community: &Community,
    audience: Audience,
) -> QueryResult<(Community, Vec<User>)> {
    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let community: Community = diesel::update(communities::table.find(community.id))
            .set((
                communities::upcoming_meeting_is_published.eq(true),
                communities::upcoming_meeting_published_at.eq(Some(now())),
            ))
            .get_result(conn)?;

        let recipients = recipients(conn, &community, audience)?;
        log::info!(
            "published upcoming meeting of community {} to {} recipient(s): {}",
            community.id,
            recipients.len(),
            recipients
                .iter()
                .map(|u| u.username.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok((community, recipients))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn membership(is_board: bool) -> Membership {
        Membership {
            id: 1,
            community_id: 1,
            user_id: 1,
            is_board,
            created_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn members_include_everyone() {
        let audience = Audience { members: true, board: false };
        assert!(audience.includes(&membership(false)));
        assert!(audience.includes(&membership(true)));
    }

    #[test]
    fn board_only_includes_board() {
        let audience = Audience { members: false, board: true };
        assert!(!audience.includes(&membership(false)));
        assert!(audience.includes(&membership(true)));
    }

    #[test]
    fn nobody_without_checkboxes() {
        let audience = Audience::from(PublishUpcomingMeetingForm::default());
        assert!(audience.is_empty());
        assert!(!audience.includes(&membership(true)));
    }
}
