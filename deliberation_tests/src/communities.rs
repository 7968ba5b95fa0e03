use rocket::http::Status;

use crate::common::*;

#[test]
fn edit_upcoming_meeting() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let client = client();

    let uri = format!("{}/edit", fixture.community.upcoming_meeting_url());
    let body = "upcoming_meeting_scheduled_at=2026-11-02T19:30\
                &upcoming_meeting_location=Town hall\
                &upcoming_meeting_comments=Bring chairs";
    let response = post_form(&client, uri, &fixture.board, body).dispatch();
    assert_eq!(response.status(), Status::SeeOther);

    let community = reload_community(&mut conn, fixture.community.id);
    assert_eq!(community.upcoming_meeting_location, "Town hall");
    assert_eq!(community.upcoming_meeting_comments, "Bring chairs");
    assert_eq!(
        community.upcoming_meeting_scheduled_at.map(|at| at.to_string()),
        Some("2026-11-02 19:30:00".to_string())
    );

    let page = get_as(&client, community.upcoming_meeting_url(), &fixture.member)
        .dispatch()
        .into_string()
        .unwrap();
    assert!(page.contains("Town hall"));
}

#[test]
fn publish_lists_selected_audience() {
    let mut conn = connect();
    let fixture = Fixture::new(&mut conn);
    let client = client();

    let uri = format!("{}/publish", fixture.community.upcoming_meeting_url());
    let response = post_form(&client, uri.clone(), &fixture.board, "send_to_board=true").dispatch();
    assert_eq!(response.status(), Status::Ok);

    let body = response.into_string().unwrap();
    assert!(body.contains("The Chair"));
    assert!(!body.contains(&fixture.member.username));

    let community = reload_community(&mut conn, fixture.community.id);
    assert!(community.upcoming_meeting_is_published);
    assert!(community.upcoming_meeting_published_at.is_some());

    let response = post_form(&client, uri, &fixture.board, "").dispatch();
    let body = response.into_string().unwrap();
    assert!(body.contains("Nobody was selected to be notified."));
}
