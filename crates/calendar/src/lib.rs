//! Calendar provider boundary.
//!
//! The native calendar integration is modeled as an injected capability:
//! a [`CalendarProvider`] accepts a pre-validated [`EventRequest`] and
//! reports an [`EventOutcome`], never failing past its boundary. The
//! in-process [`LocalCalendarProvider`] stands in for the real provider;
//! tests inject scripted doubles. [`schedule`] resolves raw extracted
//! date/time hints into the normalized start timestamp the request needs.

pub mod provider;
pub mod schedule;

pub use provider::{CalendarProvider, EventOutcome, EventRequest, LocalCalendarProvider};
pub use schedule::resolve_start_time;
