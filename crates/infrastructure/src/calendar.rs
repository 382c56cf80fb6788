// Rust guideline compliant 2026-10-18

//! Clock collaborator.
//!
//! [`Calendar::create`] reads the local system date; the stand-in returned by
//! [`Calendar::create_null`] always reports a fixed month. Clock reads are not
//! published as events.

use std::fmt;

use chrono::Local;
use domain::{Clock, MonthInYear};

type Today = Box<dyn Fn() -> MonthInYear + Send + Sync>;

/// `Clock` adapter over a source of "today".
pub struct Calendar {
    today: Today,
}

impl Calendar {
    /// Calendar backed by the operating-system clock (local time zone).
    #[must_use]
    pub fn create() -> Self {
        Self { today: Box::new(|| MonthInYear::from(Local::now().date_naive())) }
    }

    /// Stand-in calendar fixed at January 1970.
    #[must_use]
    pub fn create_null() -> Self {
        Self::create_null_at(MonthInYear::EPOCH)
    }

    /// Stand-in calendar fixed at `current`.
    #[must_use]
    pub fn create_null_at(current: MonthInYear) -> Self {
        Self { today: Box::new(move || current) }
    }
}

impl Clock for Calendar {
    fn current_month_year(&self) -> MonthInYear {
        (self.today)()
    }
}

impl fmt::Debug for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Calendar").field("current", &self.current_month_year()).finish()
    }
}
