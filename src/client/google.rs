//! Google Calendar v3 as a `CalendarStore`.
use crate::client::auth::fetch_access_token;
use crate::client::core::{HttpsClient, https_client, send};
use crate::config::Config;
use crate::error::{PresaleError, Result};
use crate::model::CalendarEvent;
use crate::store::CalendarStore;
use chrono::{DateTime, FixedOffset};
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderValue, Method, Request};
use serde::Deserialize;
use std::fmt;
use tower_http::auth::AddAuthorization;
use url::Url;

type AuthedClient = AddAuthorization<HttpsClient>;

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

#[derive(Clone)]
pub struct GoogleCalendar {
    client: AuthedClient,
    api_base: Url,
}

impl fmt::Debug for GoogleCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleCalendar")
            .field("api_base", &self.api_base.as_str())
            .finish_non_exhaustive()
    }
}

impl GoogleCalendar {
    /// Authenticates with the configured service account.
    pub async fn connect(config: &Config) -> Result<Self> {
        let http = https_client();
        let token = fetch_access_token(&http, &config.credential).await?;
        Self::with_token(http, &config.settings.calendar_api_base, &token)
    }

    pub fn with_token(http: HttpsClient, api_base: &str, token: &str) -> Result<Self> {
        // AddAuthorization panics on a header-unsafe token, so check first.
        HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| PresaleError::Auth("access token is not header-safe".to_string()))?;
        Ok(Self {
            client: AddAuthorization::bearer(http, token),
            api_base: Url::parse(api_base)?,
        })
    }

    fn events_url(&self, calendar_id: &str) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| PresaleError::Config(format!("{} cannot be a base url", self.api_base)))?
            .pop_if_empty()
            .push("calendars")
            .push(calendar_id)
            .push("events");
        Ok(url)
    }

    async fn call(&self, req: Request<String>) -> Result<String> {
        let (status, body) = send(self.client.clone(), req).await?;
        if !status.is_success() {
            return Err(PresaleError::Calendar {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

impl CalendarStore for GoogleCalendar {
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<FixedOffset>,
        time_max: DateTime<FixedOffset>,
        query: &str,
    ) -> Result<Vec<CalendarEvent>> {
        let mut url = self.events_url(calendar_id)?;
        url.query_pairs_mut()
            .append_pair("timeMin", &time_min.to_rfc3339())
            .append_pair("timeMax", &time_max.to_rfc3339())
            .append_pair("q", query)
            .append_pair("singleEvents", "true");

        let req = Request::builder()
            .method(Method::GET)
            .uri(url.as_str())
            .header(ACCEPT, "application/json")
            .body(String::new())?;
        let body = self.call(req).await?;
        let list: EventList = serde_json::from_str(&body)?;
        Ok(list.items)
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<CalendarEvent> {
        let url = self.events_url(calendar_id)?;
        let req = Request::builder()
            .method(Method::POST)
            .uri(url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(serde_json::to_string(event)?)?;
        let body = self.call(req).await?;
        Ok(serde_json::from_str(&body)?)
    }
}
