use std::sync::Arc;

use crate::ledger::LedgerError;
use crate::models::{Booking, CancelledBy, Reply};
use crate::services::conversation::Response;
use crate::services::menus;
use crate::state::AppState;

/// A client cancels one of their own bookings; the administrator is told.
pub async fn cancel_by_client(state: &Arc<AppState>, user_id: &str, booking_id: i64) -> Response {
    tracing::info!(user_id, booking_id, "client cancelling booking");

    match state.ledger.cancel_for_client(booking_id, user_id) {
        Ok(booking) => {
            notify(state, &state.config.admin_id, &menus::admin_client_cancelled(&booking)).await;
            Response::reply(menus::cancelled_by_client(&booking))
        }
        Err(LedgerError::NotOwner(_)) => Response::alert("❌ This is not your booking"),
        Err(_) => Response::alert("❌ Booking not found"),
    }
}

/// The administrator cancels any confirmed booking; the client is told.
pub async fn cancel_by_admin(state: &Arc<AppState>, booking_id: i64) -> Result<Booking, LedgerError> {
    tracing::info!(booking_id, "admin cancelling booking");

    let booking = state
        .ledger
        .cancel(booking_id, CancelledBy::Admin)
        .ok_or(LedgerError::NotFound(booking_id))?;
    notify(state, &booking.user_id, &menus::client_cancelled_by_admin(&booking)).await;
    Ok(booking)
}

/// Fire-and-forget: failures are logged, never surfaced to the other party.
pub async fn notify(state: &Arc<AppState>, chat_id: &str, reply: &Reply) {
    if chat_id.is_empty() {
        tracing::warn!("notification recipient not configured, skipping notification");
        return;
    }

    if let Err(e) = state.messaging.send_message(chat_id, reply).await {
        tracing::error!(error = %e, chat_id, "failed to send notification");
    }
}
