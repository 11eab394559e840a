use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use service::ServiceError;
use tracing::info;

use crate::errors::ApiError;
use crate::state::ServerState;
use crate::views;

/// Name of the per-poll cookie that blocks a second vote from the same browser.
pub fn vote_cookie_name(poll_id: u64) -> String {
    format!("vote_{poll_id}_cookie")
}

/// Parse a path segment made only of ASCII digits; signs and spaces are rejected.
fn parse_digits<T: std::str::FromStr>(raw: &str) -> Option<T> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Ids that are not numbers can never match a poll.
fn parse_poll_id(raw: &str) -> Result<u64, ApiError> {
    parse_digits(raw).ok_or(ApiError::Service(ServiceError::NotFound(0)))
}

/// Pull every `option*` field out of a submitted form, ordered by numeric
/// suffix. Fields without a numeric suffix keep form order after the rest.
pub fn collect_options(fields: &[(String, String)]) -> Vec<String> {
    let mut found: Vec<(u32, usize, &String)> = fields
        .iter()
        .enumerate()
        .filter_map(|(pos, (key, value))| {
            let suffix = key.strip_prefix("option")?;
            Some((suffix.parse::<u32>().unwrap_or(u32::MAX), pos, value))
        })
        .collect();
    found.sort_by_key(|(n, pos, _)| (*n, *pos));
    found.into_iter().map(|(_, _, v)| v.clone()).collect()
}

pub async fn index(State(state): State<ServerState>) -> Result<Html<String>, ApiError> {
    let polls = state.polls.list_polls().await?;
    Ok(Html(views::index(&polls)))
}

#[derive(Debug, Default, Deserialize)]
pub struct ShowParams {
    pub voted: Option<String>,
}

pub async fn show_poll(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(params): Query<ShowParams>,
    jar: CookieJar,
) -> Result<Html<String>, ApiError> {
    let id = parse_poll_id(&id)?;
    let poll = state.polls.get_poll(id).await?;
    let your_vote = jar
        .get(&vote_cookie_name(id))
        .and_then(|c| c.value().parse::<usize>().ok());
    let just_voted = params.voted.is_some_and(|v| v == "true" || v == "True" || v == "1");
    Ok(Html(views::poll_detail(&poll, just_voted, your_vote)))
}

pub async fn new_poll_form(State(state): State<ServerState>) -> Html<String> {
    Html(views::new_poll_form(state.polls.max_options()))
}

pub async fn create_poll(
    State(state): State<ServerState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Redirect, ApiError> {
    let question = fields
        .iter()
        .find(|(k, _)| k == "poll")
        .map(|(_, v)| v.clone())
        .ok_or_else(|| ApiError::BadRequest("Missing poll question".into()))?;
    let options = collect_options(&fields);
    state.polls.create_poll(&question, options).await?;
    Ok(Redirect::to("/"))
}

pub async fn vote(
    State(state): State<ServerState>,
    Path((id, option)): Path<(String, String)>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let id = parse_poll_id(&id)?;
    let cookie_name = vote_cookie_name(id);
    if jar.get(&cookie_name).is_some() {
        info!(poll_id = id, "repeat vote blocked by cookie");
        return Ok(Html(views::already_voted(id)).into_response());
    }

    // Slot 0 never exists, so an unparseable option surfaces as InvalidOption
    // after the poll lookup.
    let slot = parse_digits::<usize>(&option).unwrap_or(0);
    state.polls.record_vote(id, slot).await?;

    let cookie = Cookie::build((cookie_name, slot.to_string())).path("/");
    let target = format!("/polls/{id}?voted=true");
    Ok((jar.add(cookie), Redirect::to(&target)).into_response())
}

pub async fn delete_poll(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    if let Some(id) = parse_digits::<u64>(&id) {
        state.polls.delete_poll(id).await?;
    }
    Ok(Redirect::to("/"))
}
