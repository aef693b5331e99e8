//! Break accounting for a single work session.
//!
//! # Algorithm Summary
//!
//! 1. Walk the intervals once, in order. Work intervals count as work and
//!    feed the accrual counter. Break intervals first consume the accrual
//!    break earned so far, then the daily budget; the rest is slack.
//! 2. Spread the total reclassified break time over all work intervals,
//!    proportionally to their real duration. This only affects adjusted
//!    durations used for display; the worked total is exact.

use chrono::Duration;

use crate::accounting::{Accounting, AccountingError, AccrualBreak, BreakPolicies};
use crate::interval::{Interval, seconds_to_duration};

/// Worked and slacked time of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkSessionStats {
    worked_seconds: f64,
    slacked_seconds: f64,
    break_seconds_counted_as_work: f64,
    expected_work_time: Duration,
}

/// Running state of the forward pass.
struct Analysis {
    policies: BreakPolicies,
    worked_seconds: f64,
    slacked_seconds: f64,
    break_seconds_counted_as_work: f64,
    recent_work_seconds: f64,
    usable_daily_break_seconds: f64,
}

impl Analysis {
    fn new(policies: BreakPolicies, is_workday: bool) -> Self {
        let usable_daily_break_seconds = match policies.daily {
            Some(daily) if is_workday => daily.budget_seconds,
            _ => 0.0,
        };
        Self {
            policies,
            worked_seconds: 0.0,
            slacked_seconds: 0.0,
            break_seconds_counted_as_work: 0.0,
            recent_work_seconds: 0.0,
            usable_daily_break_seconds,
        }
    }

    fn analyze_work(&mut self, seconds: f64) {
        self.worked_seconds += seconds;
        self.recent_work_seconds += seconds;
    }

    fn analyze_break(&mut self, interval: &mut Interval) {
        let mut remaining = interval.real_seconds();

        if let Some(accrual) = self.policies.accrual {
            let used = self.legal_accrual_seconds(accrual).min(remaining);
            remaining -= used;
            self.count_as_work(interval, used);
            self.recent_work_seconds -= used / accrual.scale();
        }

        if self.policies.daily.is_some() {
            let used = self.usable_daily_break_seconds.min(remaining);
            self.usable_daily_break_seconds -= used;
            remaining -= used;
            self.count_as_work(interval, used);
        }

        self.slacked_seconds += remaining;
    }

    /// Accrual break seconds earned by recent work, capped at one earning period.
    fn legal_accrual_seconds(&mut self, accrual: AccrualBreak) -> f64 {
        self.recent_work_seconds = self.recent_work_seconds.min(accrual.earn_seconds);
        (self.recent_work_seconds * accrual.scale()).max(0.0)
    }

    fn count_as_work(&mut self, interval: &mut Interval, seconds: f64) {
        interval.account_work_seconds(seconds);
        self.worked_seconds += seconds;
        self.break_seconds_counted_as_work += seconds;
    }
}

impl WorkSessionStats {
    /// Analyzes a session's intervals, setting each interval's accounted adjustment.
    ///
    /// Adjustments from an earlier analysis are discarded first.
    pub fn compute(
        intervals: &mut [Interval],
        accounting: &Accounting,
        is_workday: bool,
    ) -> Result<Self, AccountingError> {
        let mut analysis = Analysis::new(accounting.break_policies()?, is_workday);
        let mut real_work_seconds = 0.0;

        for interval in intervals.iter_mut() {
            interval.reset_adjustment();
            if interval.is_break() {
                analysis.analyze_break(interval);
            } else {
                let seconds = interval.real_seconds();
                analysis.analyze_work(seconds);
                real_work_seconds += seconds;
            }
        }

        // Without work there is nothing to attribute the paid break time to.
        if real_work_seconds > 0.0 {
            let counted = analysis.break_seconds_counted_as_work;
            for interval in intervals.iter_mut().filter(|interval| !interval.is_break()) {
                let share = counted * interval.real_seconds() / real_work_seconds;
                interval.account_break_seconds(share);
            }
        }

        let expected_work_time = if is_workday {
            accounting.daily_work_time
        } else {
            Duration::zero()
        };

        tracing::trace!(
            worked = analysis.worked_seconds,
            slacked = analysis.slacked_seconds,
            paid_breaks = analysis.break_seconds_counted_as_work,
            "analyzed session"
        );

        Ok(Self {
            worked_seconds: analysis.worked_seconds,
            slacked_seconds: analysis.slacked_seconds,
            break_seconds_counted_as_work: analysis.break_seconds_counted_as_work,
            expected_work_time,
        })
    }

    /// Work time including paid breaks.
    pub fn time_worked(&self) -> Duration {
        seconds_to_duration(self.worked_seconds)
    }

    /// Break time not counted as work.
    pub fn time_slacked(&self) -> Duration {
        seconds_to_duration(self.slacked_seconds)
    }

    /// Break time reclassified as work.
    pub fn paid_break_time(&self) -> Duration {
        seconds_to_duration(self.break_seconds_counted_as_work)
    }

    /// Daily work time on workdays, zero otherwise.
    pub const fn expected_work_time(&self) -> Duration {
        self.expected_work_time
    }

    /// Worked time minus expected work time.
    pub fn overhours(&self) -> Duration {
        self.time_worked() - self.expected_work_time
    }
}
