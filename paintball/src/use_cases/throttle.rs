use std::time::{Duration, Instant};

const LOG_THROTTLE: Duration = Duration::from_secs(2);

/// Rate limiter for warnings that would otherwise repeat every frame.
#[derive(Debug, Default)]
pub struct LogThrottle {
    last: Option<Instant>,
}

impl LogThrottle {
    pub fn should_log(&mut self) -> bool {
        match self.last {
            Some(last) if last.elapsed() < LOG_THROTTLE => false,
            _ => {
                self.last = Some(Instant::now());
                true
            }
        }
    }
}
