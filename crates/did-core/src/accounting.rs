//! Paid-break policies and the accounting template they live in.
//!
//! An [`Accounting`] describes the expected daily work time and the kinds of
//! paid breaks that count as work. Each session owns its own copy, taken
//! when the session starts.
//!
//! Two break shapes are supported, at most one of each per accounting:
//!
//! - **accrual** ("computer break"): earned proportionally to recent work,
//!   e.g. 5 minutes per hour of work, capped at the earning period.
//! - **daily cap**: a fixed budget available once per workday.

use chrono::Duration;
use thiserror::Error;

use crate::interval::duration_to_seconds;

/// Errors from managing or interpreting break policies.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountingError {
    /// Tried to delete a break that is not configured.
    #[error("break \"{0}\" doesn't exist")]
    UnknownBreak(String),

    /// The break configuration has a shape the engine can't evaluate.
    #[error("unsupported configuration of break \"{name}\": {reason}")]
    UnsupportedBreakConfig { name: String, reason: &'static str },
}

/// Definition of a kind of paid break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaidBreakConfig {
    /// Identifier of the break kind.
    pub name: String,
    /// Length of the break.
    pub duration: Duration,
    /// How many times per day the break may be taken. `None` means no limit.
    pub max_occurrences_per_day: Option<u32>,
    /// Whether the break may be taken in several chunks.
    pub splittable: bool,
    /// Work time needed to earn the full break.
    pub earned_after_preceding_work_time: Option<Duration>,
    /// Minimum total work time in a day for the break to be granted.
    pub min_day_total_work_time: Option<Duration>,
}

impl PaidBreakConfig {
    /// Creates a splittable break with no limits.
    pub fn new(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            duration,
            max_occurrences_per_day: None,
            splittable: true,
            earned_after_preceding_work_time: None,
            min_day_total_work_time: None,
        }
    }

    /// Allows the break once per day.
    #[must_use]
    pub const fn daily(mut self) -> Self {
        self.max_occurrences_per_day = Some(1);
        self
    }

    /// Requires `work_time` of preceding work to earn the full break.
    #[must_use]
    pub const fn earned_after(mut self, work_time: Duration) -> Self {
        self.earned_after_preceding_work_time = Some(work_time);
        self
    }

    /// Requires `work_time` of total work in the day.
    #[must_use]
    pub const fn min_day_work_time(mut self, work_time: Duration) -> Self {
        self.min_day_total_work_time = Some(work_time);
        self
    }

    fn unsupported(&self, reason: &'static str) -> AccountingError {
        AccountingError::UnsupportedBreakConfig {
            name: self.name.clone(),
            reason,
        }
    }
}

/// A break earned proportionally to recent work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccrualBreak {
    /// Break seconds granted after a full earning period.
    pub duration_seconds: f64,
    /// Length of the earning period; recent work is capped at this.
    pub earn_seconds: f64,
}

impl AccrualBreak {
    /// Break seconds earned per second of work.
    pub fn scale(&self) -> f64 {
        self.duration_seconds / self.earn_seconds
    }
}

/// A break with a fixed per-day budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyCapBreak {
    /// Break seconds available per workday.
    pub budget_seconds: f64,
}

/// Shape of a single validated paid break.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakPolicy {
    Accrual(AccrualBreak),
    DailyCap(DailyCapBreak),
}

impl BreakPolicy {
    /// Validates a break configuration and determines its shape.
    pub fn classify(config: &PaidBreakConfig) -> Result<Self, AccountingError> {
        if !config.splittable {
            return Err(config.unsupported("non-splittable breaks are not supported yet"));
        }

        match config.max_occurrences_per_day {
            None => {
                if config.min_day_total_work_time.is_some() {
                    return Err(config
                        .unsupported("min_day_work_time is not supported with accrual breaks"));
                }
                let Some(earn) = config.earned_after_preceding_work_time else {
                    return Err(
                        config.unsupported("earn_work_time is required for non-daily breaks")
                    );
                };
                if earn <= Duration::zero() {
                    return Err(config.unsupported("earn_work_time must be positive"));
                }
                Ok(Self::Accrual(AccrualBreak {
                    duration_seconds: duration_to_seconds(config.duration),
                    earn_seconds: duration_to_seconds(earn),
                }))
            }
            Some(occurrences) => {
                if occurrences != 1 {
                    return Err(
                        config.unsupported("only one occurrence of a daily break is supported")
                    );
                }
                if config.earned_after_preceding_work_time.is_some() {
                    return Err(
                        config.unsupported("earn_work_time is not supported with daily breaks")
                    );
                }
                Ok(Self::DailyCap(DailyCapBreak {
                    budget_seconds: duration_to_seconds(config.duration) * f64::from(occurrences),
                }))
            }
        }
    }
}

/// The validated break policies of one accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BreakPolicies {
    pub accrual: Option<AccrualBreak>,
    pub daily: Option<DailyCapBreak>,
}

/// Expected work time and paid break kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accounting {
    /// Work time expected on a full workday.
    pub daily_work_time: Duration,
    break_configs: Vec<PaidBreakConfig>,
}

impl Accounting {
    pub const fn new(daily_work_time: Duration, break_configs: Vec<PaidBreakConfig>) -> Self {
        Self {
            daily_work_time,
            break_configs,
        }
    }

    /// Paid breaks in configuration order.
    pub fn break_configs(&self) -> &[PaidBreakConfig] {
        &self.break_configs
    }

    pub fn break_config(&self, name: &str) -> Option<&PaidBreakConfig> {
        self.break_configs.iter().find(|config| config.name == name)
    }

    /// Replaces the break with the same name, or appends a new one.
    pub fn set_break(&mut self, config: PaidBreakConfig) {
        match self
            .break_configs
            .iter_mut()
            .find(|existing| existing.name == config.name)
        {
            Some(existing) => *existing = config,
            None => self.break_configs.push(config),
        }
    }

    pub fn delete_break(&mut self, name: &str) -> Result<(), AccountingError> {
        let index = self
            .break_configs
            .iter()
            .position(|config| config.name == name)
            .ok_or_else(|| AccountingError::UnknownBreak(name.to_string()))?;
        self.break_configs.remove(index);
        Ok(())
    }

    /// Classifies every configured break, rejecting duplicate shapes.
    pub fn break_policies(&self) -> Result<BreakPolicies, AccountingError> {
        let mut policies = BreakPolicies::default();
        for config in &self.break_configs {
            match BreakPolicy::classify(config)? {
                BreakPolicy::Accrual(accrual) => {
                    if policies.accrual.is_some() {
                        return Err(config.unsupported("only one accrual break is supported"));
                    }
                    policies.accrual = Some(accrual);
                }
                BreakPolicy::DailyCap(daily) => {
                    if policies.daily.is_some() {
                        return Err(config.unsupported("only one daily break is supported"));
                    }
                    policies.daily = Some(daily);
                }
            }
        }
        Ok(policies)
    }
}

/// A named, built-in accounting.
#[derive(Debug, Clone)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub accounting: Accounting,
}

/// Name of the preset a fresh work log starts from.
pub const DEFAULT_PRESET: &str = "PL-computer";

/// All built-in presets.
pub fn presets() -> Vec<Preset> {
    vec![
        Preset {
            name: "default",
            description: "8 hours work per day, no paid breaks",
            accounting: Accounting::new(Duration::hours(8), Vec::new()),
        },
        Preset {
            name: "PL-computer",
            description: "8 hours work per day. Paid breaks: 5 minutes of \
                computer break per hour of recent work (scaled down, not up), \
                and one 15 minute breakfast break per workday.",
            accounting: Accounting::new(
                Duration::hours(8),
                vec![
                    PaidBreakConfig::new("breakfast", Duration::minutes(15))
                        .daily()
                        .min_day_work_time(Duration::hours(6)),
                    PaidBreakConfig::new("computer", Duration::minutes(5))
                        .earned_after(Duration::hours(1)),
                ],
            ),
        },
    ]
}

/// Returns a copy of the named preset accounting.
pub fn preset_accounting(name: &str) -> Option<Accounting> {
    presets()
        .into_iter()
        .find(|preset| preset.name == name)
        .map(|preset| preset.accounting)
}
