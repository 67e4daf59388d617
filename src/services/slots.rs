use chrono::{Duration, NaiveDate, NaiveTime};

use crate::ledger::Ledger;
use crate::models::SlotOracle;

/// Fixed grid of start times, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid {
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub step_minutes: u32,
}

impl SlotGrid {
    pub fn new(open: NaiveTime, close: NaiveTime, step_minutes: u32) -> Self {
        Self {
            open,
            close,
            step_minutes: step_minutes.max(1),
        }
    }

    pub fn labels(&self) -> Vec<String> {
        let step = Duration::minutes(i64::from(self.step_minutes));
        let mut labels = vec![];
        let mut cur = self.open;
        while cur <= self.close {
            labels.push(cur.format("%H:%M").to_string());
            let (next, wrapped) = cur.overflowing_add_signed(step);
            if wrapped != 0 {
                break;
            }
            cur = next;
        }
        labels
    }
}

/// The next `days` calendar days, starting the day after `today`.
pub fn upcoming_dates(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (1..=i64::from(days))
        .filter_map(|i| today.checked_add_signed(Duration::days(i)))
        .collect()
}

/// Live availability: the configured grid checked against the ledger.
pub struct LedgerSlots<'a> {
    pub ledger: &'a Ledger,
    pub grid: SlotGrid,
    pub today: NaiveDate,
    pub days_ahead: u32,
}

impl SlotOracle for LedgerSlots<'_> {
    fn offered_dates(&self) -> Vec<NaiveDate> {
        upcoming_dates(self.today, self.days_ahead)
    }

    fn offered_times(&self) -> Vec<String> {
        self.grid.labels()
    }

    fn is_free(&self, date: NaiveDate, time: &str) -> bool {
        self.ledger.is_slot_free(date, time)
    }

    fn availability(&self, date: NaiveDate) -> Vec<(String, bool)> {
        let confirmed = self.ledger.list_confirmed();
        self.grid
            .labels()
            .into_iter()
            .map(|t| {
                let free = !confirmed.iter().any(|b| b.occupies(date, &t));
                (t, free)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::ledger::{BookingStore, MemoryStore, StoreError};
    use crate::models::{Booking, NewBooking};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_default_grid_has_seventeen_labels() {
        let labels = SlotGrid::new(t(10, 0), t(22, 0), 45).labels();
        assert_eq!(labels.len(), 17);
        assert_eq!(&labels[..3], ["10:00", "10:45", "11:30"]);
        assert_eq!(labels.last().map(String::as_str), Some("22:00"));
    }

    #[test]
    fn test_grid_stops_before_close_when_step_overshoots() {
        let labels = SlotGrid::new(t(10, 0), t(11, 0), 45).labels();
        assert_eq!(labels, vec!["10:00", "10:45"]);
    }

    #[test]
    fn test_grid_near_midnight_does_not_wrap() {
        let labels = SlotGrid::new(t(22, 0), t(23, 59), 60).labels();
        assert_eq!(labels, vec!["22:00", "23:00"]);
    }

    #[test]
    fn test_inverted_grid_is_empty() {
        assert!(SlotGrid::new(t(22, 0), t(10, 0), 45).labels().is_empty());
    }

    struct CountingStore {
        inner: MemoryStore,
        loads: Arc<AtomicUsize>,
    }

    impl BookingStore for CountingStore {
        fn load(&self) -> Result<Vec<Booking>, StoreError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load()
        }

        fn save(&self, bookings: &[Booking]) -> Result<(), StoreError> {
            self.inner.save(bookings)
        }
    }

    #[test]
    fn test_availability_reads_ledger_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let ledger = Ledger::new(Box::new(CountingStore {
            inner: MemoryStore::new(),
            loads: Arc::clone(&loads),
        }));
        let today = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        let date = today.succ_opt().unwrap();
        ledger
            .book(NewBooking {
                user_id: "1".to_string(),
                name: "Alice".to_string(),
                phone: "901234567".to_string(),
                services: vec!["Beard".to_string()],
                date,
                time: "10:45".to_string(),
            })
            .unwrap();

        let slots = LedgerSlots {
            ledger: &ledger,
            grid: SlotGrid::new(t(10, 0), t(22, 0), 45),
            today,
            days_ahead: 7,
        };
        let before = loads.load(Ordering::SeqCst);
        let availability = slots.availability(date);

        assert_eq!(loads.load(Ordering::SeqCst) - before, 1);
        assert_eq!(availability.len(), 17);
        assert_eq!(availability[0], ("10:00".to_string(), true));
        assert_eq!(availability[1], ("10:45".to_string(), false));
    }

    #[test]
    fn test_upcoming_dates_start_tomorrow() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 28).unwrap();
        let dates = upcoming_dates(today, 7);
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2025, 6, 29).unwrap());
        assert_eq!(dates[6], NaiveDate::from_ymd_opt(2025, 7, 5).unwrap());
        assert!(!dates.contains(&today));
    }
}
