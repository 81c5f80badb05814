use serde::{Deserialize, Serialize};

/// Default and maximum page size of one listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitCfg {
    pub default: u64,
    pub max: u64,
}

impl LimitCfg {
    pub const fn new(default: u64, max: u64) -> Self {
        Self { default, max }
    }
}

/// Resolve a requested page size: missing → default, 0 → 1, above max → max.
pub fn clamp_limit(req: Option<u64>, cfg: LimitCfg) -> u64 {
    let mut l = req.unwrap_or(cfg.default);
    if l == 0 {
        l = 1;
    }
    if l > cfg.max {
        l = cfg.max;
    }
    l
}
