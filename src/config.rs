use std::env;

use chrono::NaiveTime;

use crate::services::slots::SlotGrid;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub data_file: String,
    pub bot_token: String,
    pub admin_id: String,
    pub admin_token: String,
    pub webhook_secret: String,
    pub public_url: String,
    pub telegram_api_url: String,
    pub master_name: String,
    pub work_start: NaiveTime,
    pub work_end: NaiveTime,
    pub slot_interval_minutes: u32,
    pub days_ahead: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            data_file: env::var("DATA_FILE").unwrap_or_else(|_| "bookings.json".to_string()),
            bot_token: env::var("BOT_TOKEN").unwrap_or_default(),
            admin_id: env::var("ADMIN_ID").unwrap_or_default(),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            webhook_secret: env::var("WEBHOOK_SECRET").unwrap_or_default(),
            public_url: env::var("PUBLIC_URL").unwrap_or_default(),
            telegram_api_url: env::var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
            master_name: env::var("MASTER_NAME").unwrap_or_else(|_| "Den".to_string()),
            work_start: time_var("WORK_START", 10),
            work_end: time_var("WORK_END", 22),
            slot_interval_minutes: env::var("SLOT_INTERVAL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|m| *m > 0)
                .unwrap_or(45),
            days_ahead: env::var("DAYS_AHEAD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(7),
        }
    }

    pub fn slot_grid(&self) -> SlotGrid {
        SlotGrid::new(self.work_start, self.work_end, self.slot_interval_minutes)
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        !self.admin_id.is_empty() && self.admin_id == user_id
    }
}

fn time_var(key: &str, default_hour: u32) -> NaiveTime {
    env::var(key)
        .ok()
        .and_then(|v| NaiveTime::parse_from_str(v.trim(), "%H:%M").ok())
        .or_else(|| NaiveTime::from_hms_opt(default_hour, 0, 0))
        .unwrap_or(NaiveTime::MIN)
}
