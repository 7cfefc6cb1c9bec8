//! Run input: the loosely-typed wire form and its validated counterpart.

use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::models::{Company, Keyword, Persona};

/// Input as received from a request body or input file. Every field may be
/// absent; [`CalendarInput::validate`] decides what is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarInput {
    pub company: Option<Company>,
    pub personas: Option<Vec<Persona>>,
    pub keywords: Option<Vec<Keyword>>,
    pub week_number: Option<u32>,
    /// First day of the week. Defaults to today shifted by the week number.
    pub start_date: Option<NaiveDate>,
}

/// Validated input for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarRequest {
    pub company: Company,
    pub personas: Vec<Persona>,
    pub keywords: Vec<Keyword>,
    pub week_number: u32,
    pub start_date: Option<NaiveDate>,
}

impl CalendarInput {
    /// Check required fields and structural constraints.
    ///
    /// A missing or zero week number becomes week 1.
    pub fn validate(self) -> Result<CalendarRequest, InputError> {
        let (company, personas, keywords) = match (self.company, self.personas, self.keywords) {
            (Some(c), Some(p), Some(k)) => (c, p, k),
            (c, p, k) => {
                let missing: Vec<&str> = [
                    ("company", c.is_none()),
                    ("personas", p.is_none()),
                    ("keywords", k.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                return Err(InputError::MissingFields(missing.join(", ")));
            }
        };

        if company.subreddits.is_empty() {
            return Err(InputError::NoChannels);
        }
        if company.posts_per_week == 0 {
            return Err(InputError::NoPosts);
        }
        if personas.is_empty() {
            return Err(InputError::NoPersonas);
        }
        if keywords.is_empty() {
            return Err(InputError::NoKeywords);
        }

        let mut seen = HashSet::new();
        for p in &personas {
            if !seen.insert(p.username.as_str()) {
                return Err(InputError::DuplicatePersona(p.username.clone()));
            }
        }

        let mut seen = HashSet::new();
        for k in &keywords {
            if !seen.insert(k.keyword_id.as_str()) {
                return Err(InputError::DuplicateKeyword(k.keyword_id.clone()));
            }
        }

        Ok(CalendarRequest {
            company,
            personas,
            keywords,
            week_number: self.week_number.filter(|w| *w > 0).unwrap_or(1),
            start_date: self.start_date,
        })
    }
}

impl CalendarRequest {
    /// The explicit start date, or `today + (week_number - 1) * 7` days.
    pub fn start_date_from(&self, today: NaiveDate) -> NaiveDate {
        self.start_date.unwrap_or_else(|| {
            let offset = u64::from(self.week_number.saturating_sub(1)) * 7;
            today.checked_add_days(Days::new(offset)).unwrap_or(today)
        })
    }
}
