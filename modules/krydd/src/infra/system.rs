use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

use crate::domain::ports::{Clock, IdGenerator};

/// Wall clock truncated to milliseconds, the precision timestamps are stored with.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
