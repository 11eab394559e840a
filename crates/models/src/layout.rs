//! Fixed column layout of the poll table.
//!
//! Every row carries `id`, `poll`, `option1..option100` and `votes1..votes100`
//! no matter how many options the poll actually uses.

pub const MAX_OPTION_SLOTS: usize = 100;
pub const ID_COLUMN: &str = "id";
pub const QUESTION_COLUMN: &str = "poll";
pub const COLUMN_COUNT: usize = 2 + 2 * MAX_OPTION_SLOTS;

pub fn option_column(slot: usize) -> String {
    format!("option{slot}")
}

pub fn votes_column(slot: usize) -> String {
    format!("votes{slot}")
}

/// Index of the text cell for a 1-based slot.
pub fn option_index(slot: usize) -> usize {
    1 + slot
}

/// Index of the counter cell for a 1-based slot.
pub fn votes_index(slot: usize) -> usize {
    1 + MAX_OPTION_SLOTS + slot
}

pub fn header() -> Vec<String> {
    let mut cols = Vec::with_capacity(COLUMN_COUNT);
    cols.push(ID_COLUMN.to_string());
    cols.push(QUESTION_COLUMN.to_string());
    cols.extend((1..=MAX_OPTION_SLOTS).map(option_column));
    cols.extend((1..=MAX_OPTION_SLOTS).map(votes_column));
    cols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_has_fixed_shape() {
        let h = header();
        assert_eq!(h.len(), COLUMN_COUNT);
        assert_eq!(h[0], "id");
        assert_eq!(h[1], "poll");
        assert_eq!(h[option_index(1)], "option1");
        assert_eq!(h[option_index(100)], "option100");
        assert_eq!(h[votes_index(1)], "votes1");
        assert_eq!(h[votes_index(100)], "votes100");
    }
}
