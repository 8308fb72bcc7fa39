pub mod activity;
pub mod clock;
pub mod guard;
pub mod idle;

pub use activity::ActivityLogger;
pub use clock::{ActivityClock, ClockTransition, Deadline};
pub use guard::{require_session, RouteGuard};
pub use idle::{IdleHandle, IdleMonitor, SessionTerminator};
