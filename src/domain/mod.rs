// Domain layer module exports
// Domain is independent of infrastructure concerns

pub mod drawing;
pub mod errors;
pub mod participant;
pub mod prize;
pub mod repositories;
pub mod room;

pub use errors::{LotteryError, LotteryResult};

/// Trims `raw` and checks it is non-empty and at most `max_len` characters
pub(crate) fn required_text(field: &str, raw: &str, max_len: usize) -> LotteryResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(LotteryError::Validation(format!("{} cannot be empty", field)));
    }
    if value.chars().count() > max_len {
        return Err(LotteryError::Validation(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(value.to_string())
}
