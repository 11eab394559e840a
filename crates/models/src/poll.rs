use serde::Serialize;

use crate::errors::ModelError;
use crate::layout::MAX_OPTION_SLOTS;

/// One populated option slot with its tally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PollOption {
    /// 1-based position in the table layout.
    pub slot: usize,
    pub text: String,
    pub votes: u64,
}

/// A single row of the poll table.
///
/// Only populated slots are kept, so an option always has a counter and a
/// counter always has an option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Poll {
    pub id: u64,
    pub question: String,
    pub options: Vec<PollOption>,
}

/// Trim the raw option texts and drop the blank ones, keeping order.
pub fn clean_options<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Poll {
    /// Build a fresh poll with zeroed counters, slots numbered from 1.
    ///
    /// `options` is expected to be cleaned already; `max_options` caps the count.
    pub fn new(id: u64, question: &str, options: Vec<String>, max_options: usize) -> Result<Self, ModelError> {
        if options.is_empty() {
            return Err(ModelError::Validation("At least one option is required".into()));
        }
        let max = max_options.min(MAX_OPTION_SLOTS);
        if options.len() > max {
            return Err(ModelError::Validation(format!(
                "too many options: {} (at most {max})",
                options.len()
            )));
        }
        let options = options
            .into_iter()
            .enumerate()
            .map(|(i, text)| PollOption { slot: i + 1, text, votes: 0 })
            .collect();
        Ok(Self { id, question: question.trim().to_string(), options })
    }

    pub fn option(&self, slot: usize) -> Option<&PollOption> {
        self.options.iter().find(|o| o.slot == slot)
    }

    /// Add one vote to `slot` and return the new tally.
    pub fn record_vote(&mut self, slot: usize) -> Result<u64, ModelError> {
        let opt = self
            .options
            .iter_mut()
            .find(|o| o.slot == slot)
            .ok_or(ModelError::InvalidOption(slot))?;
        opt.votes = opt
            .votes
            .checked_add(1)
            .ok_or_else(|| ModelError::Validation(format!("vote counter for option {slot} is full")))?;
        Ok(opt.votes)
    }

    pub fn total_votes(&self) -> u64 {
        self.options.iter().fold(0u64, |acc, o| acc.saturating_add(o.votes))
    }

    pub fn votes(&self) -> Vec<u64> {
        self.options.iter().map(|o| o.votes).collect()
    }
}
