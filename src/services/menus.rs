use chrono::NaiveDate;
use teloxide::types::InlineKeyboardButton;

use crate::models::{Booking, Reply, Session, SlotOracle, CATALOG};

pub const ACCESS_DENIED: &str = "⛔ Access denied";

/// Telegram rejects message texts longer than this.
pub const MAX_MESSAGE_CHARS: usize = 4096;
const BOOKINGS_PER_MESSAGE: usize = 20;
const BOOKINGS_HEADER: &str = "📊 Active bookings:\n\n";

pub fn greeting(master_name: &str) -> Reply {
    Reply::with_buttons(
        format!("Hi! I'm the booking bot for {master_name}. ✨\n\nTap the button below to book:"),
        vec![vec![InlineKeyboardButton::callback("📅 Book", "book")]],
    )
}

pub fn services_menu(session: &Session) -> Reply {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = CATALOG
        .iter()
        .map(|s| {
            let mark = if session.draft.services.contains(&s.id) { "✅ " } else { "" };
            vec![InlineKeyboardButton::callback(
                format!("{mark}{} — {}", s.name, s.price),
                format!("svc_{}", s.id),
            )]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback("✅ Done", "svc_done")]);
    rows.push(vec![InlineKeyboardButton::callback("🔙 Cancel", "back_start")]);
    Reply::with_buttons("Choose services (tap to toggle):", rows)
}

pub fn dates_menu(slots: &dyn SlotOracle) -> Reply {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = slots
        .offered_dates()
        .into_iter()
        .map(|d| {
            vec![InlineKeyboardButton::callback(
                format!("📅 {}", d.format("%d.%m.%Y (%a)")),
                format!("date_{}", d.format("%Y-%m-%d")),
            )]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback("🔙 Back", "back_services")]);
    Reply::with_buttons("Choose a date:", rows)
}

pub fn times_menu(date: NaiveDate, slots: &dyn SlotOracle) -> Reply {
    let buttons: Vec<InlineKeyboardButton> = slots
        .availability(date)
        .into_iter()
        .map(|(t, free)| {
            if free {
                InlineKeyboardButton::callback(t.clone(), format!("time_{t}"))
            } else {
                InlineKeyboardButton::callback(format!("❌ {t}"), "busy")
            }
        })
        .collect();
    let mut rows: Vec<Vec<InlineKeyboardButton>> = buttons.chunks(3).map(<[InlineKeyboardButton]>::to_vec).collect();
    rows.push(vec![InlineKeyboardButton::callback("🔙 Back", "back_dates")]);
    Reply::with_buttons(
        format!("🕐 Choose a time on {}:", date.format("%d.%m.%Y")),
        rows,
    )
}

pub fn ask_name() -> Reply {
    Reply::text("👤 Enter your name:")
}

pub fn ask_phone() -> Reply {
    Reply::request_contact("📞 Enter your phone number:", "📱 Share my number")
}

pub fn summary(session: &Session, master_name: &str) -> Reply {
    let draft = &session.draft;
    let date = draft
        .date
        .map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_default();
    let text = format!(
        "Please confirm your booking:\n\n\
         Name: {}\n\
         Phone: {}\n\
         Services: {}\n\
         Date: {date}\n\
         Time: {}\n\
         Master: {master_name}",
        draft.name.as_deref().unwrap_or_default(),
        draft.phone.as_deref().unwrap_or_default(),
        session.service_names().join(", "),
        draft.time.as_deref().unwrap_or_default(),
    );
    Reply::with_buttons(
        text,
        vec![
            vec![InlineKeyboardButton::callback("✅ Confirm", "confirm_book")],
            vec![InlineKeyboardButton::callback("❌ Cancel", "cancel_flow")],
        ],
    )
}

pub fn booked(booking: &Booking, master_name: &str) -> Reply {
    Reply::with_buttons(
        format!(
            "You're booked with {master_name}!\n\n\
             Services: {}\n\
             Date: {}\n\
             Time: {}\n\
             Name: {}\n\
             Phone: {}\n\n\
             See you soon! Changed your mind? You can cancel below.",
            booking.services_label(),
            booking.date_display(),
            booking.time,
            booking.name,
            booking.phone,
        ),
        vec![vec![InlineKeyboardButton::callback(
            "❌ Cancel this booking",
            format!("cancel_{}", booking.id),
        )]],
    )
}

pub fn aborted() -> Reply {
    Reply::text("Booking cancelled. Send /start to begin again.")
}

pub fn idle_hint() -> Reply {
    Reply::text("Send /start to make a booking.")
}

pub fn cancelled_by_client(booking: &Booking) -> Reply {
    Reply::text(format!(
        "✅ Booking cancelled!\n\n📅 {} {}\n💈 {}\n\nSend /start to book again.",
        booking.date_display(),
        booking.time,
        booking.services_label(),
    ))
}

pub fn admin_new_booking(booking: &Booking) -> Reply {
    Reply::text(format!(
        "🆕 New booking #{id}\n👤 {}\n📞 {}\n💈 {}\n📅 {} {}\n\n❌ Cancel: /delete_{id}",
        booking.name,
        booking.phone,
        booking.services_label(),
        booking.date,
        booking.time,
        id = booking.id,
    ))
}

pub fn admin_client_cancelled(booking: &Booking) -> Reply {
    Reply::text(format!(
        "❌ Client cancelled booking #{}\n👤 {} ({})\n📅 {} {}\n💈 {}",
        booking.id,
        booking.name,
        booking.phone,
        booking.date,
        booking.time,
        booking.services_label(),
    ))
}

pub fn client_cancelled_by_admin(booking: &Booking) -> Reply {
    Reply::text(format!(
        "❌ Your booking was cancelled by the administrator\n\n📅 {} {}\n💈 {}\n\nSend /start to book again.",
        booking.date_display(),
        booking.time,
        booking.services_label(),
    ))
}

pub fn admin_cancel_done(booking: &Booking) -> Reply {
    Reply::text(format!(
        "✅ Booking #{} cancelled\n\n👤 {} ({})\n📅 {} {}\n💈 {}",
        booking.id,
        booking.name,
        booking.phone,
        booking.date,
        booking.time,
        booking.services_label(),
    ))
}

/// The active bookings, split over as many messages as Telegram needs.
pub fn admin_bookings(active: &[Booking]) -> Vec<Reply> {
    if active.is_empty() {
        return vec![Reply::text("📭 No active bookings")];
    }

    let header_len = BOOKINGS_HEADER.chars().count();
    let mut pages = vec![];
    let mut text = String::from(BOOKINGS_HEADER);
    let mut len = header_len;
    let mut rows = vec![];
    for b in active {
        let entry = truncate_chars(
            &format!(
                "🔹 {} {}\n   👤 {} ({})\n   💈 {}\n   ID: #{}\n\n",
                b.date_display(),
                b.time,
                b.name,
                b.phone,
                b.services_label(),
                b.id,
            ),
            MAX_MESSAGE_CHARS - header_len,
        );
        let entry_len = entry.chars().count();
        if rows.len() == BOOKINGS_PER_MESSAGE || len + entry_len > MAX_MESSAGE_CHARS {
            pages.push(Reply::with_buttons(
                text.trim_end().to_string(),
                std::mem::take(&mut rows),
            ));
            text = String::from(BOOKINGS_HEADER);
            len = header_len;
        }

        text.push_str(&entry);
        len += entry_len;
        rows.push(vec![InlineKeyboardButton::callback(
            format!("🗑️ Remove {} {}", b.date_display(), b.time),
            format!("admin_cancel_{}", b.id),
        )]);
    }
    pages.push(Reply::with_buttons(text.trim_end().to_string(), rows));
    pages
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingStatus;

    struct OneTaken;

    impl SlotOracle for OneTaken {
        fn offered_dates(&self) -> Vec<NaiveDate> {
            vec![NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()]
        }

        fn offered_times(&self) -> Vec<String> {
            ["10:00", "10:45", "11:30", "12:15"]
                .iter()
                .map(|s| s.to_string())
                .collect()
        }

        fn is_free(&self, _date: NaiveDate, time: &str) -> bool {
            time != "10:45"
        }
    }

    #[test]
    fn test_times_menu_marks_taken_slots() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        let reply = times_menu(date, &OneTaken);
        assert_eq!(
            reply.callback_data(),
            vec!["time_10:00", "busy", "time_11:30", "time_12:15", "back_dates"]
        );
        let rows = reply.inline_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[0][1].text, "❌ 10:45");
    }

    #[test]
    fn test_dates_menu_labels() {
        let reply = dates_menu(&OneTaken);
        assert_eq!(reply.callback_data(), vec!["date_2025-06-09", "back_services"]);
        assert!(reply.text.contains("date"));
        assert_eq!(reply.inline_rows()[0][0].text, "📅 09.06.2025 (Mon)");
    }

    #[test]
    fn test_services_menu_marks_selection() {
        let mut session = Session::default();
        session.draft.services = vec![2];
        let reply = services_menu(&session);
        let rows = reply.inline_rows();
        assert!(rows[1][0].text.starts_with("✅ Beard"));
        assert!(!rows[0][0].text.starts_with("✅"));
    }

    fn booking(id: i64, name: &str) -> Booking {
        Booking {
            id,
            user_id: "9".to_string(),
            name: name.to_string(),
            phone: "901234567".to_string(),
            services: vec!["Beard".to_string()],
            date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            time: "10:00".to_string(),
            status: BookingStatus::Confirmed,
            created: NaiveDate::from_ymd_opt(2025, 6, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            cancelled_at: None,
            cancelled_by: None,
        }
    }

    #[test]
    fn test_admin_bookings_lists_cancel_buttons() {
        let pages = admin_bookings(&[booking(5, "Eve")]);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].callback_data(), vec!["admin_cancel_5"]);
        assert!(pages[0].text.contains("10.06.2025 10:00"));

        let empty = admin_bookings(&[]);
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].text, "📭 No active bookings");
    }

    #[test]
    fn test_admin_bookings_split_across_messages() {
        let active: Vec<Booking> = (1..=65).map(|id| booking(id, "Eve")).collect();
        let pages = admin_bookings(&active);

        assert_eq!(pages.len(), 4);
        for page in &pages {
            assert!(page.text.chars().count() <= MAX_MESSAGE_CHARS);
            assert!(page.callback_data().len() <= BOOKINGS_PER_MESSAGE);
        }
        let ids: Vec<&str> = pages.iter().flat_map(|p| p.callback_data()).collect();
        assert_eq!(ids.len(), 65);
        assert_eq!(ids[0], "admin_cancel_1");
        assert_eq!(ids[64], "admin_cancel_65");
    }

    #[test]
    fn test_admin_bookings_long_entries_stay_under_limit() {
        let long_name = "N".repeat(3000);
        let active: Vec<Booking> = (1..=3).map(|id| booking(id, &long_name)).collect();
        let pages = admin_bookings(&active);

        assert_eq!(pages.len(), 3);
        for page in &pages {
            assert!(page.text.chars().count() <= MAX_MESSAGE_CHARS);
        }

        let huge = booking(9, &"N".repeat(5000));
        let pages = admin_bookings(&[huge]);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].text.chars().count() <= MAX_MESSAGE_CHARS);
        assert!(pages[0].text.ends_with('…'));
    }
}
