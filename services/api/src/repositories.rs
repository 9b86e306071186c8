//! Repositories for database operations

pub mod group;
pub mod schedule;

pub use group::GroupRepository;
pub use schedule::ScheduleRepository;

/// Result of a guarded write
///
/// Access checks run inside the write's transaction, so their verdict is
/// reported alongside the write instead of through a separate lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome<T = ()> {
    /// The write was committed
    Applied(T),
    /// The target row does not exist
    NotFound,
    /// The caller lacks the required ownership or role
    Forbidden,
    /// The row the write would create already exists
    AlreadyExists,
    /// The write breaks a membership rule
    Invalid(&'static str),
}
