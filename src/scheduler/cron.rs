use crate::config::{ConfigError, ScheduleConfig, TimeZoneSetting};
use chrono::{DateTime, FixedOffset, Local, Utc};
use cron::Schedule as CronSchedule;
use std::str::FromStr;

/// Cron expression bound to the zone it is evaluated in.
#[derive(Debug, Clone)]
pub struct CronTrigger {
    expression: String,
    schedule: CronSchedule,
    time_zone: TimeZoneSetting,
}

impl CronTrigger {
    /// Parse a standard 5-field crontab expression, or the 6/7-field form with
    /// seconds (and optional year).
    pub fn parse(expression: &str, time_zone: TimeZoneSetting) -> Result<Self, ConfigError> {
        let normalized = normalize_expression(expression)?;
        let schedule = CronSchedule::from_str(&normalized).map_err(|e| ConfigError::InvalidCron {
            expression: expression.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            expression: expression.trim().to_string(),
            schedule,
            time_zone,
        })
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self, ConfigError> {
        Self::parse(&config.cron_expression, config.time_zone)
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn time_zone(&self) -> TimeZoneSetting {
        self.time_zone
    }

    /// First firing strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.time_zone {
            TimeZoneSetting::Utc => self.schedule.after(&now).next(),
            TimeZoneSetting::Local => self
                .schedule
                .after(&now.with_timezone(&Local))
                .next()
                .map(|t| t.with_timezone(&Utc)),
        }
    }

    /// The next `count` firings after `now`, expressed in the configured zone.
    pub fn upcoming(&self, now: DateTime<Utc>, count: usize) -> Vec<DateTime<FixedOffset>> {
        match self.time_zone {
            TimeZoneSetting::Utc => self
                .schedule
                .after(&now)
                .take(count)
                .map(|t| t.fixed_offset())
                .collect(),
            TimeZoneSetting::Local => self
                .schedule
                .after(&now.with_timezone(&Local))
                .take(count)
                .map(|t| t.fixed_offset())
                .collect(),
        }
    }
}

fn normalize_expression(expression: &str) -> Result<String, ConfigError> {
    let expression = expression.trim();
    let fields: Vec<&str> = expression.split_whitespace().collect();

    match fields.len() {
        // standard crontab syntax: minute hour day month weekday
        5 => {
            let weekdays = crontab_weekdays(fields[4]).map_err(|reason| ConfigError::InvalidCron {
                expression: expression.to_string(),
                reason,
            })?;
            Ok(format!("0 {} {weekdays}", fields[..4].join(" ")))
        }
        // crate-native syntax includes seconds (+ optional year)
        6 | 7 => Ok(expression.to_string()),
        n => Err(ConfigError::InvalidCron {
            expression: expression.to_string(),
            reason: format!("expected 5, 6, or 7 fields, got {n}"),
        }),
    }
}

const WEEKDAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Rewrite numeric crontab weekdays (0-7, Sunday is 0 or 7) as day names.
///
/// The cron crate numbers weekdays 1-7 from Sunday, so `1-5` would otherwise
/// mean Sunday to Thursday. Names and `*` forms mean the same in both and are
/// passed through.
fn crontab_weekdays(field: &str) -> Result<String, String> {
    let mut days: Vec<&str> = Vec::new();

    for item in field.split(',') {
        let (range, step) = match item.split_once('/') {
            Some((range, step)) => (range, Some(step)),
            None => (item, None),
        };
        if !range.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
            days.push(item);
            continue;
        }

        let bound = |raw: &str| -> Result<usize, String> {
            match raw.parse::<usize>() {
                Ok(day) if day <= 7 => Ok(day),
                Ok(day) => Err(format!("day of week {day} out of range 0-7")),
                Err(_) => Err(format!("invalid day of week '{item}'")),
            }
        };
        let (first, last) = match range.split_once('-') {
            Some((a, b)) => (bound(a)?, bound(b)?),
            // `n/step` runs to the end of the week
            None if step.is_some() => {
                let first = bound(range)?;
                (first, first.max(6))
            }
            None => {
                let day = bound(range)?;
                (day, day)
            }
        };
        if first > last {
            return Err(format!("invalid day of week range '{item}'"));
        }
        let step = match step {
            Some(raw) => match raw.parse::<usize>() {
                Ok(step) if step > 0 => step,
                _ => return Err(format!("invalid day of week step '{item}'")),
            },
            None => 1,
        };

        for day in (first..=last).step_by(step) {
            let name = WEEKDAY_NAMES[day % 7];
            if !days.contains(&name) {
                days.push(name);
            }
        }
    }

    Ok(days.join(","))
}
