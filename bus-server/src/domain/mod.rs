//! Domain types for the bus arrival board.
//!
//! These types represent validated transit data. They enforce their
//! invariants at construction time, so code that receives them can trust
//! their validity.

mod stop_code;
mod time;

pub use stop_code::{InvalidStopCode, StopCode};
pub use time::{DayType, OperatingWindow, TimeError, WeeklySchedule, parse_hhmm};
