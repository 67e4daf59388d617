use chrono::NaiveDate;

use super::booking::NewBooking;
use super::service;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    SelectingServices,
    SelectingDate,
    SelectingTime,
    EnteringName,
    EnteringPhone,
    Confirming,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::SelectingServices => "selecting_services",
            SessionState::SelectingDate => "selecting_date",
            SessionState::SelectingTime => "selecting_time",
            SessionState::EnteringName => "entering_name",
            SessionState::EnteringPhone => "entering_phone",
            SessionState::Confirming => "confirming",
        }
    }
}

/// Fields collected so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingDraft {
    pub services: Vec<u32>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Button payloads understood by the booking dialogue.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Book,
    ToggleService(u32),
    ServicesDone,
    PickDate(NaiveDate),
    PickTime(String),
    BusySlot,
    BackToStart,
    BackToServices,
    BackToDates,
    Confirm,
    Abort,
}

/// Every callback payload the bot emits.
#[derive(Debug, Clone, PartialEq)]
pub enum Callback {
    Dialogue(Action),
    CancelOwn(i64),
    AdminCancel(i64),
}

impl Callback {
    pub fn parse(data: &str) -> Option<Self> {
        let action = match data {
            "book" => Action::Book,
            "svc_done" => Action::ServicesDone,
            "busy" => Action::BusySlot,
            "back_start" => Action::BackToStart,
            "back_services" => Action::BackToServices,
            "back_dates" => Action::BackToDates,
            "confirm_book" => Action::Confirm,
            "cancel_flow" => Action::Abort,
            _ => {
                if let Some(id) = data.strip_prefix("admin_cancel_") {
                    return id.parse().ok().map(Callback::AdminCancel);
                }
                if let Some(id) = data.strip_prefix("cancel_") {
                    return id.parse().ok().map(Callback::CancelOwn);
                }
                if let Some(id) = data.strip_prefix("svc_") {
                    Action::ToggleService(id.parse().ok()?)
                } else if let Some(date) = data.strip_prefix("date_") {
                    Action::PickDate(NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?)
                } else if let Some(time) = data.strip_prefix("time_") {
                    Action::PickTime(time.to_string())
                } else {
                    return None;
                }
            }
        };
        Some(Callback::Dialogue(action))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Start,
    Action(Action),
    Text(String),
    Contact(String),
}

/// What the dialogue wants shown after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Greet,
    ShowServices,
    ShowDates,
    ShowTimes,
    AskName,
    AskPhone,
    ShowSummary,
    /// The client confirmed; the caller must commit the draft.
    Commit,
    Aborted,
    Reject(Rejection),
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NoServiceSelected,
    UnknownOption,
    SlotTaken,
    NameTooShort,
    InvalidPhone,
}

/// Read-only view of what can currently be booked.
pub trait SlotOracle {
    fn offered_dates(&self) -> Vec<NaiveDate>;
    fn offered_times(&self) -> Vec<String>;
    fn is_free(&self, date: NaiveDate, time: &str) -> bool;

    /// Every offered time on `date` paired with whether it is still free.
    fn availability(&self, date: NaiveDate) -> Vec<(String, bool)> {
        self.offered_times()
            .into_iter()
            .map(|t| {
                let free = self.is_free(date, &t);
                (t, free)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub state: SessionState,
    pub draft: BookingDraft,
}

impl Session {
    pub fn reset(&mut self) {
        *self = Session::default();
    }

    /// Runs one dialogue turn. Invalid input leaves state and draft untouched.
    pub fn advance(&mut self, input: Input, slots: &dyn SlotOracle) -> Step {
        match input {
            Input::Start | Input::Action(Action::BackToStart) => {
                self.reset();
                return Step::Greet;
            }
            Input::Action(Action::Book) => {
                self.draft = BookingDraft::default();
                self.state = SessionState::SelectingServices;
                return Step::ShowServices;
            }
            Input::Action(Action::Abort) if self.state != SessionState::Idle => {
                self.reset();
                return Step::Aborted;
            }
            _ => {}
        }

        match (self.state, input) {
            (SessionState::SelectingServices, Input::Action(Action::ToggleService(id))) => {
                if service::find(id).is_none() {
                    return Step::Reject(Rejection::UnknownOption);
                }
                if let Some(pos) = self.draft.services.iter().position(|s| *s == id) {
                    self.draft.services.remove(pos);
                } else {
                    self.draft.services.push(id);
                }
                Step::ShowServices
            }
            (SessionState::SelectingServices, Input::Action(Action::ServicesDone)) => {
                if self.draft.services.is_empty() {
                    return Step::Reject(Rejection::NoServiceSelected);
                }
                self.state = SessionState::SelectingDate;
                Step::ShowDates
            }
            (SessionState::SelectingDate, Input::Action(Action::PickDate(date))) => {
                if !slots.offered_dates().contains(&date) {
                    return Step::Reject(Rejection::UnknownOption);
                }
                self.draft.date = Some(date);
                self.state = SessionState::SelectingTime;
                Step::ShowTimes
            }
            (SessionState::SelectingDate, Input::Action(Action::BackToServices)) => {
                self.state = SessionState::SelectingServices;
                Step::ShowServices
            }
            (SessionState::SelectingTime, Input::Action(Action::PickTime(time))) => {
                let Some(date) = self.draft.date else {
                    return Step::Reject(Rejection::UnknownOption);
                };
                if !slots.offered_times().contains(&time) {
                    return Step::Reject(Rejection::UnknownOption);
                }
                if !slots.is_free(date, &time) {
                    return Step::Reject(Rejection::SlotTaken);
                }
                self.draft.time = Some(time);
                self.state = SessionState::EnteringName;
                Step::AskName
            }
            (SessionState::SelectingTime, Input::Action(Action::BusySlot)) => {
                Step::Reject(Rejection::SlotTaken)
            }
            (SessionState::SelectingTime, Input::Action(Action::BackToDates)) => {
                self.draft.time = None;
                self.state = SessionState::SelectingDate;
                Step::ShowDates
            }
            (SessionState::EnteringName, Input::Text(text)) => match validate_name(&text) {
                Some(name) => {
                    self.draft.name = Some(name);
                    self.state = SessionState::EnteringPhone;
                    Step::AskPhone
                }
                None => Step::Reject(Rejection::NameTooShort),
            },
            (SessionState::EnteringPhone, Input::Text(raw) | Input::Contact(raw)) => {
                match validate_phone(&raw) {
                    Some(phone) => {
                        self.draft.phone = Some(phone);
                        self.state = SessionState::Confirming;
                        Step::ShowSummary
                    }
                    None => Step::Reject(Rejection::InvalidPhone),
                }
            }
            (SessionState::Confirming, Input::Action(Action::Confirm)) => Step::Commit,
            _ => Step::Ignored,
        }
    }

    /// Sends the dialogue back to the time menu after the chosen slot was lost.
    pub fn return_to_time_selection(&mut self) {
        self.draft.time = None;
        self.state = SessionState::SelectingTime;
    }

    pub fn service_names(&self) -> Vec<String> {
        service::names_for(&self.draft.services)
    }

    pub fn to_new_booking(&self, user_id: &str) -> Option<NewBooking> {
        let draft = &self.draft;
        Some(NewBooking {
            user_id: user_id.to_string(),
            name: draft.name.clone()?,
            phone: draft.phone.clone()?,
            services: self.service_names(),
            date: draft.date?,
            time: draft.time.clone()?,
        })
    }
}

pub fn validate_name(raw: &str) -> Option<String> {
    let name = raw.trim();
    (name.chars().count() >= 2).then(|| name.to_string())
}

pub fn validate_phone(raw: &str) -> Option<String> {
    let phone = raw.trim();
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    (digits >= 9).then(|| phone.to_string())
}
