use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Local;

use crate::config::AppConfig;
use crate::ledger::Ledger;
use crate::models::Session;
use crate::services::messaging::MessagingProvider;
use crate::services::slots::LedgerSlots;

pub struct AppState {
    pub ledger: Ledger,
    pub config: AppConfig,
    pub messaging: Box<dyn MessagingProvider>,
    pub sessions: Mutex<HashMap<String, Session>>,
}

impl AppState {
    pub fn new(config: AppConfig, ledger: Ledger, messaging: Box<dyn MessagingProvider>) -> Self {
        Self {
            ledger,
            config,
            messaging,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn slots(&self) -> LedgerSlots<'_> {
        LedgerSlots {
            ledger: &self.ledger,
            grid: self.config.slot_grid(),
            today: Local::now().date_naive(),
            days_ahead: self.config.days_ahead,
        }
    }

    pub fn sessions(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}
