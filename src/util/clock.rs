use tokio::time::Instant;


/// Source of the millisecond timestamps that go on the wire. Timestamps are relative to the
///  clock's creation (like a device's uptime counter) and wrap around after ~49 days.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u32;
}

pub struct MonotonicClock {
    reference_time: Instant,
}
impl MonotonicClock {
    pub fn new() -> MonotonicClock {
        MonotonicClock {
            reference_time: Instant::now(),
        }
    }
}
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> u32 {
        // truncation is the intended wrap-around
        self.reference_time.elapsed().as_millis() as u32
    }
}
