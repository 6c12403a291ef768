pub mod check_delta;
pub mod diff;

/// How a command finished when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Complete,
    /// The diff ran but produced no result
    Aborted,
}

pub type CommandResult = Result<Status, Box<dyn std::error::Error>>;
