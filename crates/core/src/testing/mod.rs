//! Mock implementations for tests.

mod mock_locker;
mod mock_source;

pub use mock_locker::MockLocker;
pub use mock_source::MockSource;
