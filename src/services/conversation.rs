use std::sync::Arc;

use crate::ledger::LedgerError;
use crate::models::{Input, Rejection, Reply, Session, SessionState, SlotOracle, Step};
use crate::services::bookings::notify;
use crate::services::menus;
use crate::services::slots::LedgerSlots;
use crate::state::AppState;

pub const SLOT_TAKEN: &str = "This slot has already been taken";

/// What goes back to the client for one incoming event.
#[derive(Debug, Default, Clone)]
pub struct Response {
    pub reply: Option<Reply>,
    /// Popup shown on the pressed button; only meaningful for callbacks.
    pub alert: Option<String>,
}

impl Response {
    pub fn reply(reply: Reply) -> Self {
        Self {
            reply: Some(reply),
            alert: None,
        }
    }

    pub fn alert(text: impl Into<String>) -> Self {
        Self {
            reply: None,
            alert: Some(text.into()),
        }
    }
}

pub async fn process_input(state: &Arc<AppState>, user_id: &str, input: Input) -> Response {
    let typed = matches!(input, Input::Text(_) | Input::Contact(_));
    let slots = state.slots();

    let (step, session) = {
        let mut sessions = state.sessions();
        let session = sessions.entry(user_id.to_string()).or_default();
        let from = session.state;
        let step = session.advance(input, &slots);

        tracing::info!(
            user_id,
            from = from.as_str(),
            to = session.state.as_str(),
            step = ?step,
            "dialogue turn"
        );
        let session = session.clone();
        // Idle sessions carry nothing worth keeping.
        if session.state == SessionState::Idle {
            sessions.remove(user_id);
        }
        (step, session)
    };

    match step {
        Step::Commit => commit(state, user_id, &session, &slots).await,
        Step::Greet => Response::reply(menus::greeting(&state.config.master_name)),
        Step::ShowServices => Response::reply(menus::services_menu(&session)),
        Step::ShowDates => Response::reply(menus::dates_menu(&slots)),
        Step::ShowTimes => match session.draft.date {
            Some(date) => Response::reply(menus::times_menu(date, &slots)),
            None => Response::reply(menus::dates_menu(&slots)),
        },
        Step::AskName => Response::reply(menus::ask_name()),
        Step::AskPhone => Response::reply(menus::ask_phone()),
        Step::ShowSummary => Response::reply(menus::summary(&session, &state.config.master_name)),
        Step::Aborted => Response::reply(menus::aborted()),
        Step::Reject(rejection) => rejected(rejection),
        Step::Ignored if typed => match session.state {
            SessionState::Idle => Response::reply(menus::idle_hint()),
            _ => Response::reply(Reply::text("Please use the buttons above.")),
        },
        Step::Ignored => Response::alert("This button is no longer active"),
    }
}

fn rejected(rejection: Rejection) -> Response {
    match rejection {
        Rejection::NoServiceSelected => Response::alert("Pick at least one service"),
        Rejection::UnknownOption => Response::alert("This option is no longer available"),
        Rejection::SlotTaken => Response::alert(SLOT_TAKEN),
        Rejection::NameTooShort => {
            Response::reply(Reply::text("Enter your name (at least 2 characters):"))
        }
        Rejection::InvalidPhone => Response::reply(Reply::text("Invalid number. Please try again:")),
    }
}

async fn commit(
    state: &Arc<AppState>,
    user_id: &str,
    session: &Session,
    slots: &LedgerSlots<'_>,
) -> Response {
    let Some(new) = session.to_new_booking(user_id) else {
        tracing::warn!(user_id, "confirmation with incomplete draft");
        reset_session(state, user_id);
        return Response::reply(menus::aborted());
    };

    match state.ledger.book(new) {
        Ok(booking) => {
            reset_session(state, user_id);
            notify(state, &state.config.admin_id, &menus::admin_new_booking(&booking)).await;
            Response::reply(menus::booked(&booking, &state.config.master_name))
        }
        Err(LedgerError::SlotTaken { date, time }) => {
            tracing::info!(user_id, %date, time = %time, "slot lost at confirmation");
            if let Some(s) = state.sessions().get_mut(user_id) {
                s.return_to_time_selection();
            }
            Response {
                reply: Some(menus::times_menu(date, slots as &dyn SlotOracle)),
                alert: Some(SLOT_TAKEN.to_string()),
            }
        }
        Err(e) => {
            tracing::error!(error = %e, user_id, "booking failed");
            Response::alert("Something went wrong, please try again")
        }
    }
}

fn reset_session(state: &AppState, user_id: &str) {
    state.sessions().remove(user_id);
}
