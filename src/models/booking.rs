use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub phone: String,
    pub services: Vec<String>,
    pub date: NaiveDate,
    pub time: String,
    pub status: BookingStatus,
    pub created: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_by: Option<CancelledBy>,
}

impl Booking {
    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }

    pub fn occupies(&self, date: NaiveDate, time: &str) -> bool {
        self.is_confirmed() && self.date == date && self.time == time
    }

    pub fn services_label(&self) -> String {
        self.services.join(", ")
    }

    pub fn date_display(&self) -> String {
        self.date.format("%d.%m.%Y").to_string()
    }
}

/// Everything a client supplies before the ledger assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub user_id: String,
    pub name: String,
    pub phone: String,
    pub services: Vec<String>,
    pub date: NaiveDate,
    pub time: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CancelledBy {
    Client,
    Admin,
}

impl CancelledBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancelledBy::Client => "client",
            CancelledBy::Admin => "admin",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Booking {
        Booking {
            id: 1717000000000,
            user_id: "42".to_string(),
            name: "Alice".to_string(),
            phone: "+998 90 123 45 67".to_string(),
            services: vec!["Beard".to_string()],
            date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            time: "10:00".to_string(),
            status: BookingStatus::Confirmed,
            created: NaiveDateTime::parse_from_str("2025-06-09 12:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            cancelled_at: None,
            cancelled_by: None,
        }
    }

    #[test]
    fn test_serialized_layout() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["date"], "2025-06-10");
        assert_eq!(json["time"], "10:00");
        assert_eq!(json["status"], "confirmed");
        assert_eq!(json["user_id"], "42");
        assert!(json.get("cancelled_at").is_none());
        assert!(json.get("cancelled_by").is_none());
    }

    #[test]
    fn test_reads_records_with_fractional_timestamps() {
        let raw = r#"{
            "id": 1717000000000,
            "user_id": "42",
            "name": "Alice",
            "phone": "901234567",
            "services": ["Beard", "Beard"],
            "date": "2025-06-10",
            "time": "10:45",
            "status": "cancelled",
            "created": "2025-06-09T12:00:00.123456",
            "cancelled_at": "2025-06-09T13:00:00.5",
            "cancelled_by": "admin"
        }"#;
        let booking: Booking = serde_json::from_str(raw).unwrap();
        assert_eq!(booking.services.len(), 2);
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert_eq!(booking.cancelled_by, Some(CancelledBy::Admin));
        assert!(!booking.is_confirmed());
    }

    #[test]
    fn test_occupies_requires_confirmed() {
        let mut booking = sample();
        let date = booking.date;
        assert!(booking.occupies(date, "10:00"));
        assert!(!booking.occupies(date, "10:45"));
        booking.status = BookingStatus::Cancelled;
        assert!(!booking.occupies(date, "10:00"));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(BookingStatus::parse("confirmed"), Some(BookingStatus::Confirmed));
        assert_eq!(BookingStatus::parse("cancelled"), Some(BookingStatus::Cancelled));
        assert_eq!(BookingStatus::parse("pending"), None);
    }
}
