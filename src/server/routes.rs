//! Route handlers for the question flow and results page.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::render::{render_question, render_results, QuestionView, THANK_YOU_MESSAGE};
use super::session::{clear_cookie, session_cookie, SessionToken};
use super::SharedState;
use crate::error::AppError;
use crate::survey::{
    collect_results, Action, Outcome, Results, SessionState, NO_RESPONSES_MESSAGE,
};

/// Shown when an answer could not be stored.
pub const STORAGE_FAILURE_MESSAGE: &str = "We could not save your response. Please try again.";

/// Build the application router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(start).post(start))
        .route("/reset", post(reset))
        .route("/question", get(show_question).post(submit_question))
        .route("/done", get(done))
        .route("/results", get(results))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Form body posted by the question page.
#[derive(Debug, Deserialize)]
pub struct QuestionForm {
    /// Raw answer text.
    #[serde(default)]
    pub response: Option<String>,
    /// `Next` or `Back`.
    #[serde(default)]
    pub action: Option<String>,
}

async fn begin_session(state: &SharedState, previous: Option<String>) -> SessionState {
    if let Some(old) = previous {
        state.sessions.remove(&old).await;
    }
    let session = SessionState::new();
    state.sessions.put(session.clone()).await;
    info!(session_id = %session.session_id, "Session started");
    session
}

/// GET|POST / - start or restart a session.
async fn start(State(state): State<SharedState>, SessionToken(token): SessionToken) -> Response {
    let session = begin_session(&state, token).await;
    (
        [(
            header::SET_COOKIE,
            session_cookie(state.cookie_name(), &session.session_id),
        )],
        Redirect::to("/question"),
    )
        .into_response()
}

/// POST /reset - replace the session with a fresh one.
async fn reset(State(state): State<SharedState>, SessionToken(token): SessionToken) -> Response {
    let session = begin_session(&state, token).await;
    (
        StatusCode::NO_CONTENT,
        [(
            header::SET_COOKIE,
            session_cookie(state.cookie_name(), &session.session_id),
        )],
    )
        .into_response()
}

fn question_page(
    state: &SharedState,
    session: &SessionState,
    status: StatusCode,
    prefill: Option<&str>,
    error: Option<&str>,
) -> Response {
    let question = match state.navigator.current_question(session) {
        Ok(q) => q,
        Err(e) => return AppError::from(e).into_response(),
    };
    let stored = session.answer_for(&question.prompt).map(|a| a.to_string());
    let view = QuestionView {
        question,
        index: session.current_index,
        total: state.catalog().len(),
        current_answer: prefill.or(stored.as_deref()),
        error,
    };
    (status, Html(render_question(&view))).into_response()
}

/// GET /question - render the current question.
async fn show_question(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
) -> Response {
    let Some(session) = load_session(&state, token).await else {
        return Redirect::to("/").into_response();
    };
    if session.done {
        return Redirect::to("/done").into_response();
    }
    question_page(&state, &session, StatusCode::OK, None, None)
}

/// POST /question - apply Next or Back.
async fn submit_question(
    State(state): State<SharedState>,
    SessionToken(token): SessionToken,
    Form(form): Form<QuestionForm>,
) -> Response {
    let Some(mut session) = load_session(&state, token).await else {
        return Redirect::to("/").into_response();
    };
    if session.done {
        return Redirect::to("/done").into_response();
    }

    let raw = form.response.unwrap_or_default();
    let action = match form.action.as_deref().unwrap_or("").parse::<Action>() {
        Ok(action) => action,
        Err(e) => {
            let message = e.to_string();
            return question_page(
                &state,
                &session,
                StatusCode::UNPROCESSABLE_ENTITY,
                Some(raw.as_str()),
                Some(message.as_str()),
            );
        }
    };

    let result = state.navigator.submit(&mut session, action, &raw).await;
    state.sessions.put(session.clone()).await;

    match result {
        Ok(Outcome::Question(_)) => Redirect::to("/question").into_response(),
        Ok(Outcome::Done) => Redirect::to("/done").into_response(),
        Ok(Outcome::Rejected { message }) => question_page(
            &state,
            &session,
            StatusCode::UNPROCESSABLE_ENTITY,
            Some(raw.trim()),
            Some(message.as_str()),
        ),
        Err(AppError::Storage(e)) => {
            error!(
                session_id = %session.session_id,
                index = session.current_index,
                error = %e,
                "Failed to store response"
            );
            question_page(
                &state,
                &session,
                StatusCode::INTERNAL_SERVER_ERROR,
                Some(raw.trim()),
                Some(STORAGE_FAILURE_MESSAGE),
            )
        }
        Err(e) => e.into_response(),
    }
}

/// GET /done - finish and forget the session.
async fn done(State(state): State<SharedState>, SessionToken(token): SessionToken) -> Response {
    if let Some(token) = token {
        state.sessions.remove(&token).await;
    }
    (
        [(header::SET_COOKIE, clear_cookie(state.cookie_name()))],
        THANK_YOU_MESSAGE,
    )
        .into_response()
}

/// GET /results - every stored response, oldest session first.
async fn results(State(state): State<SharedState>) -> Response {
    match collect_results(state.navigator.store().as_ref()).await {
        Results::Empty => NO_RESPONSES_MESSAGE.into_response(),
        Results::Records(records) => Html(render_results(&records)).into_response(),
    }
}

/// GET /health - liveness probe.
async fn health() -> &'static str {
    "ok"
}

async fn load_session(state: &SharedState, token: Option<String>) -> Option<SessionState> {
    state.sessions.get(&token?).await
}
