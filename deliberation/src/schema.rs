table! {
    communities (id) {
        id -> Int4,
        name -> Varchar,
        upcoming_meeting_scheduled_at -> Nullable<Timestamp>,
        upcoming_meeting_location -> Varchar,
        upcoming_meeting_comments -> Text,
        upcoming_meeting_is_published -> Bool,
        upcoming_meeting_published_at -> Nullable<Timestamp>,
        created_at -> Timestamp,
    }
}

table! {
    issue_comment_revisions (id) {
        id -> Int4,
        comment_id -> Int4,
        version -> Int4,
        content -> Text,
        created_at -> Timestamp,
        created_by -> Int4,
    }
}

table! {
    issue_comments (id) {
        id -> Int4,
        issue_id -> Int4,
        content -> Text,
        active -> Bool,
        version -> Int4,
        created_at -> Timestamp,
        created_by -> Int4,
        last_edited_at -> Nullable<Timestamp>,
        last_edited_by -> Nullable<Int4>,
    }
}

table! {
    issues (id) {
        id -> Int4,
        community_id -> Int4,
        title -> Varchar,
        summary -> Nullable<Text>,
        content -> Nullable<Text>,
        is_closed -> Bool,
        closed_at -> Nullable<Timestamp>,
        created_at -> Timestamp,
        created_by -> Int4,
    }
}

table! {
    memberships (id) {
        id -> Int4,
        community_id -> Int4,
        user_id -> Int4,
        is_board -> Bool,
        created_at -> Timestamp,
    }
}

table! {
    proposals (id) {
        id -> Int4,
        issue_id -> Int4,
        title -> Varchar,
        content -> Nullable<Text>,
        is_accepted -> Bool,
        accepted_at -> Nullable<Timestamp>,
        created_at -> Timestamp,
        created_by -> Int4,
    }
}

table! {
    users (id) {
        id -> Int4,
        username -> Varchar,
        display_name -> Varchar,
        created_at -> Timestamp,
    }
}

joinable!(issue_comment_revisions -> issue_comments (comment_id));
joinable!(issue_comments -> issues (issue_id));
joinable!(issue_comments -> users (created_by));
joinable!(issues -> communities (community_id));
joinable!(memberships -> communities (community_id));
joinable!(memberships -> users (user_id));
joinable!(proposals -> issues (issue_id));
joinable!(proposals -> users (created_by));

allow_tables_to_appear_in_same_query!(
    communities,
    issue_comment_revisions,
    issue_comments,
    issues,
    memberships,
    proposals,
    users,
);
