// Tests for the Google Calendar store and the service-account token exchange.
use chrono::{FixedOffset, NaiveDate};
use mockito::{Matcher, Server};
use serde_json::json;
use thsr_presale::PresaleError;
use thsr_presale::client::GoogleCalendar;
use thsr_presale::client::auth::JWT_BEARER_GRANT;
use thsr_presale::client::core::https_client;
use thsr_presale::config::{Config, Settings};
use thsr_presale::credential::ServiceAccountKey;
use thsr_presale::model::PresaleRecord;
use thsr_presale::pipeline::Pipeline;
use thsr_presale::publish::build_event;
use thsr_presale::reconcile::day_window;
use thsr_presale::store::CalendarStore;

const CALENDAR: &str = "presale@group.calendar.google.com";
const EVENTS_PATH: &str = "/calendars/presale@group.calendar.google.com/events";
const TEST_KEY_PEM: &str = include_str!("fixtures/test_service_account.pem");

fn key(token_uri: &str) -> ServiceAccountKey {
    let raw = json!({
        "type": "service_account",
        "project_id": "presale-test",
        "private_key_id": "kid-1",
        "private_key": TEST_KEY_PEM,
        "client_email": "bot@presale-test.iam.gserviceaccount.com",
        "token_uri": token_uri,
    });
    ServiceAccountKey::from_json(raw.to_string().as_bytes()).unwrap()
}

fn config(server_url: &str) -> Config {
    let settings = Settings {
        calendar_api_base: server_url.to_string(),
        ..Settings::default()
    };
    Config::new(CALENDAR, key(&format!("{}/token", server_url)), settings)
}

fn record() -> PresaleRecord {
    PresaleRecord {
        holiday_name: "端午節".into(),
        travel_period: "6/1–6/3".into(),
        sale_date: NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
        source_year_label: "2025".into(),
    }
}

fn taipei() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

#[tokio::test]
async fn connect_exchanges_signed_assertion_for_token() {
    let mut server = Server::new_async().await;
    let token = server
        .mock("POST", "/token")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), JWT_BEARER_GRANT.into()),
            Matcher::Regex(r"assertion=[\w-]+\.[\w-]+\.[\w-]+".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"access_token":"ya29.test","expires_in":3599,"token_type":"Bearer"}"#)
        .create_async()
        .await;
    let list = server
        .mock("GET", EVENTS_PATH)
        .match_header("authorization", "Bearer ya29.test")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"kind":"calendar#events","items":[]}"#)
        .create_async()
        .await;

    let cfg = config(&server.url());
    let calendar = GoogleCalendar::connect(&cfg).await.unwrap();
    let w = day_window(record().sale_date, taipei()).unwrap();
    let found = calendar
        .list_events(CALENDAR, w.start, w.end, "高鐵端午節預售票")
        .await
        .unwrap();

    assert!(found.is_empty());
    token.assert_async().await;
    list.assert_async().await;
}

#[tokio::test]
async fn rejected_token_request_is_auth_error() {
    let mut server = Server::new_async().await;
    let _token = server
        .mock("POST", "/token")
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant"}"#)
        .create_async()
        .await;

    let err = GoogleCalendar::connect(&config(&server.url())).await.unwrap_err();
    assert!(matches!(err, PresaleError::Auth(ref m) if m.contains("invalid_grant")));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn list_sends_day_window_and_query() {
    let mut server = Server::new_async().await;
    let list = server
        .mock("GET", EVENTS_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("timeMin".into(), "2025-04-10T00:00:00+08:00".into()),
            Matcher::UrlEncoded("timeMax".into(), "2025-04-10T23:59:00+08:00".into()),
            Matcher::UrlEncoded("q".into(), "高鐵端午節預售票".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"items":[{"id":"abc","summary":"高鐵端午節預售票開賣",
                "start":{"dateTime":"2025-04-10T00:00:00+08:00","timeZone":"Asia/Taipei"},
                "end":{"dateTime":"2025-04-10T00:30:00+08:00","timeZone":"Asia/Taipei"}}]}"#,
        )
        .create_async()
        .await;

    let calendar = GoogleCalendar::with_token(https_client(), &server.url(), "tok").unwrap();
    let w = day_window(record().sale_date, taipei()).unwrap();
    let found = calendar
        .list_events(CALENDAR, w.start, w.end, "高鐵端午節預售票")
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id.as_deref(), Some("abc"));
    list.assert_async().await;
}

#[tokio::test]
async fn insert_posts_event_payload() {
    let mut server = Server::new_async().await;
    let insert = server
        .mock("POST", EVENTS_PATH)
        .match_header("authorization", "Bearer tok")
        .match_body(Matcher::PartialJson(json!({
            "summary": "高鐵端午節預售票開賣",
            "start": {"dateTime": "2025-04-10T00:00:00+08:00", "timeZone": "Asia/Taipei"},
            "end": {"dateTime": "2025-04-10T00:30:00+08:00", "timeZone": "Asia/Taipei"},
            "reminders": {
                "useDefault": false,
                "overrides": [
                    {"method": "popup", "minutes": 1440},
                    {"method": "popup", "minutes": 60},
                    {"method": "popup", "minutes": 15}
                ]
            }
        })))
        .with_status(200)
        .with_body(r#"{"id":"created-1","summary":"高鐵端午節預售票開賣"}"#)
        .create_async()
        .await;

    let cfg = config(&server.url());
    let calendar = GoogleCalendar::with_token(https_client(), &server.url(), "tok").unwrap();
    let event = build_event(&record(), &cfg).unwrap();
    let created = calendar.insert_event(CALENDAR, &event).await.unwrap();

    assert_eq!(created.id.as_deref(), Some("created-1"));
    insert.assert_async().await;
}

#[tokio::test]
async fn api_error_surfaces_status_and_body() {
    let mut server = Server::new_async().await;
    let _insert = server
        .mock("POST", EVENTS_PATH)
        .with_status(403)
        .with_body(r#"{"error":{"message":"forbidden"}}"#)
        .create_async()
        .await;

    let cfg = config(&server.url());
    let calendar = GoogleCalendar::with_token(https_client(), &server.url(), "tok").unwrap();
    let event = build_event(&record(), &cfg).unwrap();
    let err = calendar.insert_event(CALENDAR, &event).await.unwrap_err();

    assert!(matches!(err, PresaleError::Calendar { status: 403, ref body } if body.contains("forbidden")));
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn existing_remote_event_suppresses_insert() {
    let mut server = Server::new_async().await;
    let _list = server
        .mock("GET", EVENTS_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"items":[{"id":"abc","summary":"高鐵端午節預售票開賣"}]}"#)
        .create_async()
        .await;
    let insert = server
        .mock("POST", EVENTS_PATH)
        .expect(0)
        .create_async()
        .await;

    let page = r#"<table summary="高鐵車票購買日期清單"><caption>2025</caption>
        <tr><th>節日</th><th>疏運期間</th><th>開賣日期</th></tr>
        <tr><td>端午節</td><td>6/1–6/3</td><td>2025/04/10 10:00</td></tr>
    </table>"#;

    let cfg = config(&server.url());
    let calendar = GoogleCalendar::with_token(https_client(), &server.url(), "tok").unwrap();
    let summary = Pipeline::new(&cfg, &calendar).process_markup(page).await.unwrap();

    assert_eq!(summary.duplicates(), 1);
    assert_eq!(summary.created(), 0);
    insert.assert_async().await;
}

#[tokio::test]
async fn failed_lookup_is_isolated_to_its_record() {
    let mut server = Server::new_async().await;
    let _list = server
        .mock("GET", EVENTS_PATH)
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let page = r#"<table summary="高鐵車票購買日期清單">
        <tr><th>節日</th><th>疏運期間</th><th>開賣日期</th></tr>
        <tr><td>端午節</td><td>6/1–6/3</td><td>2025/04/10</td></tr>
        <tr><td>中秋節</td><td>10/3–10/6</td><td>2025/08/21</td></tr>
    </table>"#;

    let cfg = config(&server.url());
    let calendar = GoogleCalendar::with_token(https_client(), &server.url(), "tok").unwrap();
    let summary = Pipeline::new(&cfg, &calendar).process_markup(page).await.unwrap();

    assert_eq!(summary.failed(), 2);
    assert_eq!(summary.processed(), 0);
}
