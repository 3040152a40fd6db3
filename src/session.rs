use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::resolver::Resolution;

/// One interactive session, modeled as an immutable value updated by
/// discrete events. Requests carry a sequence number taken from the state;
/// only the completion of the most recently issued request is applied, so a
/// slow response from an earlier click can never overwrite a newer one.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub target: Option<DateTime<Utc>>,
    pub timezone: Tz,
    pub resolution: Option<Resolution>,
    pub instant: Option<DateTime<Utc>>,
    pub last_issued: u64,
    pub in_flight: Option<u64>,
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    DateChosen(DateTime<Utc>),
    TimezoneChosen(Tz),
    RequestIssued,
    BlockResolved { seq: u64, resolution: Resolution },
    TimestampResolved { seq: u64, instant: DateTime<Utc> },
    RequestFailed { seq: u64 },
}

impl SessionState {
    pub fn new(timezone: Tz) -> Self {
        Self {
            target: None,
            timezone,
            resolution: None,
            instant: None,
            last_issued: 0,
            in_flight: None,
        }
    }

    pub fn is_current(&self, seq: u64) -> bool {
        self.in_flight == Some(seq)
    }
}

pub fn apply(state: &SessionState, event: SessionEvent) -> SessionState {
    let mut next = state.clone();
    match event {
        SessionEvent::DateChosen(instant) => {
            next.target = Some(instant);
        }
        SessionEvent::TimezoneChosen(tz) => {
            next.timezone = tz;
        }
        SessionEvent::RequestIssued => {
            next.last_issued += 1;
            next.in_flight = Some(next.last_issued);
        }
        SessionEvent::BlockResolved { seq, resolution } => {
            if state.is_current(seq) {
                next.resolution = Some(resolution);
                next.in_flight = None;
            }
        }
        SessionEvent::TimestampResolved { seq, instant } => {
            if state.is_current(seq) {
                next.instant = Some(instant);
                next.in_flight = None;
            }
        }
        // Displayed values stay as they were; only the in-flight marker is
        // cleared.
        SessionEvent::RequestFailed { seq } => {
            if state.is_current(seq) {
                next.in_flight = None;
            }
        }
    }
    next
}
