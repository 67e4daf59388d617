use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use teloxide::types::{CallbackQuery, Message, Update, UpdateKind};

use crate::models::{Callback, Input, Reply};
use crate::services::conversation::{self, Response};
use crate::services::{bookings, menus};
use crate::state::AppState;

const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

pub async fn telegram_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(update): Json<Update>,
) -> StatusCode {
    // Skip secret validation when no secret is configured (dev mode)
    if !state.config.webhook_secret.is_empty() {
        let token = headers
            .get(SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if token != state.config.webhook_secret {
            tracing::warn!(update_id = ?update.id, "invalid webhook secret token");
            return StatusCode::FORBIDDEN;
        }
    }

    match update.kind {
        UpdateKind::CallbackQuery(query) => handle_callback(&state, query).await,
        UpdateKind::Message(message) => handle_message(&state, message).await,
        _ => tracing::debug!(update_id = ?update.id, "ignoring unsupported update"),
    }

    StatusCode::OK
}

// Private chats only: the chat id doubles as the user id.
async fn handle_message(state: &Arc<AppState>, message: Message) {
    let user_id = message.chat.id.0.to_string();

    let replies: Vec<Reply> = if let Some(contact) = message.contact() {
        let phone = contact.phone_number.clone();
        conversation::process_input(state, &user_id, Input::Contact(phone))
            .await
            .reply
            .into_iter()
            .collect()
    } else if let Some(text) = message.text() {
        let text = text.trim();
        tracing::info!(user_id = %user_id, text, "incoming message");
        if text.starts_with('/') {
            handle_command(state, &user_id, text).await
        } else {
            conversation::process_input(state, &user_id, Input::Text(text.to_string()))
                .await
                .reply
                .into_iter()
                .collect()
        }
    } else {
        vec![]
    };

    for reply in &replies {
        send(state, &user_id, reply).await;
    }
}

async fn handle_command(state: &Arc<AppState>, user_id: &str, text: &str) -> Vec<Reply> {
    let command = text
        .split_whitespace()
        .next()
        .unwrap_or("")
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    if command == "/start" {
        return conversation::process_input(state, user_id, Input::Start)
            .await
            .reply
            .into_iter()
            .collect();
    }
    handle_admin_command(state, user_id, &command).await
}

/// `/bookings` and `/delete_<id>`, restricted to the configured administrator.
pub async fn handle_admin_command(
    state: &Arc<AppState>,
    user_id: &str,
    command: &str,
) -> Vec<Reply> {
    let is_admin_command = command == "/bookings" || command.starts_with("/delete_");
    if !is_admin_command {
        return vec![menus::idle_hint()];
    }
    if !state.config.is_admin(user_id) {
        tracing::warn!(user_id, command, "non-admin attempted admin command");
        return vec![Reply::text(menus::ACCESS_DENIED)];
    }

    if command == "/bookings" {
        return menus::admin_bookings(&state.ledger.list_confirmed());
    }

    let Some(booking_id) = command
        .strip_prefix("/delete_")
        .and_then(|id| id.parse::<i64>().ok())
    else {
        return vec![Reply::text("❌ Invalid booking id")];
    };

    let reply = match bookings::cancel_by_admin(state, booking_id).await {
        Ok(booking) => menus::admin_cancel_done(&booking),
        Err(_) => Reply::text("❌ Booking not found or already cancelled"),
    };
    vec![reply]
}

async fn handle_callback(state: &Arc<AppState>, query: CallbackQuery) {
    let user_id = query.from.id.0.to_string();
    let callback_id = query.id.to_string();
    let data = query.data.as_deref().unwrap_or("");

    tracing::info!(user_id = %user_id, data, "incoming callback");

    let response = match Callback::parse(data) {
        Some(Callback::Dialogue(action)) => {
            conversation::process_input(state, &user_id, Input::Action(action)).await
        }
        Some(Callback::CancelOwn(booking_id)) => {
            bookings::cancel_by_client(state, &user_id, booking_id).await
        }
        Some(Callback::AdminCancel(booking_id)) => {
            admin_cancel_callback(state, &user_id, booking_id).await
        }
        None => {
            tracing::warn!(data, "unrecognised callback data");
            Response::alert("❌ Unknown action")
        }
    };

    if let Err(e) = state
        .messaging
        .answer_callback(&callback_id, response.alert.as_deref())
        .await
    {
        tracing::error!(error = %e, "failed to answer callback");
    }
    if let Some(reply) = response.reply {
        send(state, &user_id, &reply).await;
    }
}

async fn admin_cancel_callback(state: &Arc<AppState>, user_id: &str, booking_id: i64) -> Response {
    if !state.config.is_admin(user_id) {
        return Response::alert("❌ Only the administrator can cancel bookings");
    }
    match bookings::cancel_by_admin(state, booking_id).await {
        Ok(booking) => Response::reply(menus::admin_cancel_done(&booking)),
        Err(_) => Response::alert("❌ Booking not found or already cancelled"),
    }
}

async fn send(state: &Arc<AppState>, chat_id: &str, reply: &Reply) {
    if let Err(e) = state.messaging.send_message(chat_id, reply).await {
        tracing::error!(error = %e, chat_id, "failed to send reply");
    }
}
