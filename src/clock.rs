use std::future::Future;
use std::time::Duration;

/// Source of request timestamps (ISO-8601, UTC).
pub trait Clock {
    fn now(&self) -> String;
}

/// Source of per-call deadlines.
pub trait Timer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Wall clock of the Workers runtime.
pub struct WorkerClock;

impl Clock for WorkerClock {
    fn now(&self) -> String {
        js_sys::Date::new_0().to_iso_string().into()
    }
}

/// Timer backed by the runtime's `setTimeout`.
pub struct WorkerTimer;

impl Timer for WorkerTimer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        worker::Delay::from(duration)
    }
}
