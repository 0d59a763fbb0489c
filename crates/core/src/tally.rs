//! Vote tally.

use serde::Serialize;

use crate::model::Poll;

/// Display row for one option of a poll's results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionResult {
    pub option_id: String,
    pub text: String,
    pub votes: u64,
    pub percentage: u8,
}

/// Share of `total_votes` held by `option_votes`, rounded half up.
///
/// Returns 0 when no votes have been cast. The result is in `0..=100`.
#[must_use]
pub fn percentage_of(option_votes: u64, total_votes: u64) -> u8 {
    if total_votes == 0 {
        return 0;
    }
    // round(100 * v / t) == floor((200 * v + t) / (2 * t))
    let v = u128::from(option_votes);
    let t = u128::from(total_votes);
    let pct = (200 * v + t) / (2 * t);
    pct.min(100) as u8
}

/// Per-option percentages for a poll.
///
/// Each option is rounded on its own, so the column need not add up to 100.
#[must_use]
pub fn tally(poll: &Poll) -> Vec<OptionResult> {
    poll.options
        .iter()
        .map(|option| OptionResult {
            option_id: option.id.clone(),
            text: option.text.clone(),
            votes: option.votes,
            percentage: percentage_of(option.votes, poll.total_votes),
        })
        .collect()
}
