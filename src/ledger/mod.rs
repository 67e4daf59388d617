pub mod store;

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{Local, NaiveDate};

use crate::models::{Booking, BookingStatus, CancelledBy, NewBooking};

pub use store::{BookingStore, JsonFileStore, MemoryStore, StoreError};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LedgerError {
    #[error("slot {date} {time} is already booked")]
    SlotTaken { date: NaiveDate, time: String },

    #[error("booking #{0} not found or already cancelled")]
    NotFound(i64),

    #[error("booking #{0} belongs to another client")]
    NotOwner(i64),
}

/// The full collection of bookings ever made, behind a swappable store.
///
/// Every read-modify-write runs under one process-wide lock, so the
/// check-then-append in [`Ledger::book`] is atomic. [`Ledger::append`] keeps
/// the raw, unchecked write for callers that do their own checking.
pub struct Ledger {
    store: Box<dyn BookingStore>,
    write_lock: Mutex<()>,
    last_id: AtomicI64,
}

impl Ledger {
    pub fn new(store: Box<dyn BookingStore>) -> Self {
        let ledger = Self {
            store,
            write_lock: Mutex::new(()),
            last_id: AtomicI64::new(0),
        };
        let max_id = ledger.list_all().iter().map(|b| b.id).max().unwrap_or(0);
        ledger.last_id.store(max_id, Ordering::SeqCst);
        ledger
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    /// Every record in storage order. A missing or unreadable store reads as empty.
    pub fn list_all(&self) -> Vec<Booking> {
        match self.store.load() {
            Ok(bookings) => bookings,
            Err(e) => {
                tracing::error!(error = %e, "failed to load bookings, treating as empty");
                vec![]
            }
        }
    }

    pub fn list_confirmed(&self) -> Vec<Booking> {
        self.list_all()
            .into_iter()
            .filter(Booking::is_confirmed)
            .collect()
    }

    pub fn get(&self, id: i64) -> Option<Booking> {
        self.list_all().into_iter().find(|b| b.id == id)
    }

    pub fn is_slot_free(&self, date: NaiveDate, time: &str) -> bool {
        slot_free_in(&self.list_all(), date, time)
    }

    /// Appends without checking the slot.
    pub fn append(&self, booking: Booking) {
        let _guard = self.lock();
        let mut bookings = self.list_all();
        bookings.push(booking);
        self.persist(&bookings);
    }

    /// Checks the slot and appends in one critical section.
    pub fn book(&self, new: NewBooking) -> Result<Booking, LedgerError> {
        let _guard = self.lock();
        let mut bookings = self.list_all();
        if !slot_free_in(&bookings, new.date, &new.time) {
            return Err(LedgerError::SlotTaken {
                date: new.date,
                time: new.time,
            });
        }

        let booking = Booking {
            id: self.next_id(),
            user_id: new.user_id,
            name: new.name,
            phone: new.phone,
            services: new.services,
            date: new.date,
            time: new.time,
            status: BookingStatus::Confirmed,
            created: Local::now().naive_local(),
            cancelled_at: None,
            cancelled_by: None,
        };
        bookings.push(booking.clone());
        self.persist(&bookings);

        tracing::info!(
            booking_id = booking.id,
            user_id = %booking.user_id,
            date = %booking.date,
            time = %booking.time,
            "booking confirmed"
        );
        Ok(booking)
    }

    /// Cancels the first confirmed record with `id`. `None` leaves the store untouched.
    pub fn cancel(&self, id: i64, actor: CancelledBy) -> Option<Booking> {
        self.cancel_where(id, actor, |_| Ok(())).ok()
    }

    /// Client-side cancel: only the client who made the booking may cancel it.
    pub fn cancel_for_client(&self, id: i64, user_id: &str) -> Result<Booking, LedgerError> {
        self.cancel_where(id, CancelledBy::Client, |b| {
            if b.user_id == user_id {
                Ok(())
            } else {
                Err(LedgerError::NotOwner(id))
            }
        })
    }

    fn cancel_where(
        &self,
        id: i64,
        actor: CancelledBy,
        allowed: impl Fn(&Booking) -> Result<(), LedgerError>,
    ) -> Result<Booking, LedgerError> {
        let _guard = self.lock();
        let mut bookings = self.list_all();
        let booking = bookings
            .iter_mut()
            .find(|b| b.id == id && b.is_confirmed())
            .ok_or(LedgerError::NotFound(id))?;
        allowed(&*booking)?;

        booking.status = BookingStatus::Cancelled;
        booking.cancelled_at = Some(Local::now().naive_local());
        booking.cancelled_by = Some(actor);
        let cancelled = booking.clone();
        self.persist(&bookings);

        tracing::info!(booking_id = id, by = actor.as_str(), "booking cancelled");
        Ok(cancelled)
    }

    /// Millisecond timestamp ids, bumped past the previous id when the clock
    /// has not moved on.
    pub fn next_id(&self) -> i64 {
        let now = Local::now().timestamp_millis();
        let prev = self
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        now.max(prev + 1)
    }

    fn persist(&self, bookings: &[Booking]) {
        if let Err(e) = self.store.save(bookings) {
            tracing::error!(error = %e, "failed to save bookings");
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn slot_free_in(bookings: &[Booking], date: NaiveDate, time: &str) -> bool {
    !bookings.iter().any(|b| b.occupies(date, time))
}
