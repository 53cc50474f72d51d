use serde::{Serialize, Serializer};

/// Sentinel bound for non-finite ratios in serialized/display output. The
/// raw value stays available internally.
pub const RATIO_CLAMP: f64 = 1e9;

/// Money accumulator threaded through the wave loop. Single writer (the
/// projector); bounty is added only after a wave's metrics are recorded.
#[derive(Debug, Clone)]
pub struct EconomyState {
    pub starting_money: f64,
    /// Difficulty-to-money-need divisor.
    pub alpha: f64,
    cumulative_bounty: f64,
}

impl EconomyState {
    pub fn new(starting_money: f64, alpha: f64) -> Self {
        EconomyState {
            starting_money,
            alpha,
            cumulative_bounty: 0.0,
        }
    }

    /// Bounty earned by all prior waves.
    pub fn cumulative_bounty(&self) -> f64 {
        self.cumulative_bounty
    }

    /// Assets available entering the current wave.
    pub fn cumulative_assets(&self) -> f64 {
        self.starting_money + self.cumulative_bounty
    }

    /// Money-earning rate `R = C / alpha`, or +inf when alpha is not
    /// positive.
    pub fn earning_rate(&self) -> f64 {
        if self.alpha > 0.0 {
            self.cumulative_assets() / self.alpha
        } else {
            f64::INFINITY
        }
    }

    pub fn record_wave_bounty(&mut self, bounty: f64) {
        self.cumulative_bounty += bounty;
    }
}

/// Which branch of the balance-ratio decision table applied. The branches
/// are evaluated in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioCase {
    /// Positive bounty, duration and alpha: the ratio formula proper.
    Nominal,
    /// No assets and no bounty: nothing to balance, ratio pinned to 1.
    NothingToBalance,
    /// No bounty but a positive earning rate: infinitely favorable.
    NoBountyWithIncome,
    /// Bounty with a zero-duration wave: no time to earn it.
    InstantaneousWave,
    /// Non-positive alpha with assets on hand: unbounded earning.
    UnboundedIncome,
    /// Anything else; pinned to 0.
    Degenerate,
}

/// Per-wave balance ratio `g_n`: how many multiples of the required income
/// rate the wave delivers. Returns the raw (possibly infinite) value and
/// the decision-table branch that produced it.
pub fn balance_ratio(
    total_bounty: f64,
    duration_ms: f64,
    alpha: f64,
    cumulative_assets: f64,
    earning_rate: f64,
) -> (f64, RatioCase) {
    if total_bounty > 0.0 && duration_ms > 0.0 && alpha > 0.0 {
        let duration_sec = duration_ms / 1000.0;
        return (earning_rate * duration_sec / total_bounty, RatioCase::Nominal);
    }
    if cumulative_assets == 0.0 && total_bounty == 0.0 {
        return (1.0, RatioCase::NothingToBalance);
    }
    if total_bounty <= 0.0 && earning_rate > 0.0 {
        return (f64::INFINITY, RatioCase::NoBountyWithIncome);
    }
    if duration_ms <= 0.0 && total_bounty > 0.0 {
        return (0.0, RatioCase::InstantaneousWave);
    }
    if alpha <= 0.0 && cumulative_assets > 0.0 {
        return (f64::INFINITY, RatioCase::UnboundedIncome);
    }
    (0.0, RatioCase::Degenerate)
}

/// Bounty earned per millisecond of wave time; 0 unless both are positive.
pub fn bounty_rate(total_bounty: f64, duration_ms: f64) -> f64 {
    if total_bounty > 0.0 && duration_ms > 0.0 {
        total_bounty / duration_ms
    } else {
        0.0
    }
}

/// Clamp non-finite values to the display sentinel.
pub fn clamp_for_display(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-RATIO_CLAMP, RATIO_CLAMP)
    }
}

fn serialize_clamped<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(clamp_for_display(*value))
}

/// Per-wave output record; the append-only sequence of these is the
/// engine's primary artifact. `earning_rate` and `ratio` hold raw values
/// in memory and clamp to the display sentinel when serialized.
#[derive(Debug, Clone, Serialize)]
pub struct WaveResult {
    pub wave: u32,
    pub total_bounty: f64,
    pub duration_ms: f64,
    /// Assets entering the wave: starting money plus prior bounty.
    pub cumulative_assets: f64,
    #[serde(serialize_with = "serialize_clamped")]
    pub earning_rate: f64,
    pub bounty_rate: f64,
    #[serde(serialize_with = "serialize_clamped")]
    pub ratio: f64,
    pub ratio_case: RatioCase,
}

impl WaveResult {
    /// Ratio bounded to the display sentinel, for tables and plots.
    pub fn ratio_clamped(&self) -> f64 {
        clamp_for_display(self.ratio)
    }
}
