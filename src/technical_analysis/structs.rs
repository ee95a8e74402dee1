use serde::{Deserialize, Serialize};
use std::fmt;

/// Window lengths for the Ichimoku lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IchimokuParams {
    /// Conversion line window (tenkan-sen)
    pub tenkan_period: usize,
    /// Base line window (kijun-sen)
    pub kijun_period: usize,
    /// Leading span B window (senkou span B)
    pub span_b_period: usize,
    /// Bars the leading spans are pushed forward and the lagging span pulled back
    pub displacement: usize,
}

impl Default for IchimokuParams {
    fn default() -> Self {
        Self {
            tenkan_period: 9,
            kijun_period: 26,
            span_b_period: 52,
            displacement: 26,
        }
    }
}

impl IchimokuParams {
    /// Shortest series the engine will look at at all.
    pub fn min_bars(&self) -> usize {
        self.span_b_period + self.displacement
    }

    /// Shortest series that contains at least one row where every line is defined.
    ///
    /// Span B is first defined at index `span_b_period - 1 + displacement` and the
    /// lagging span is last defined at index `len - 1 - displacement`.
    pub fn complete_row_bars(&self) -> usize {
        let longest = self.span_b_period.max(self.kijun_period).max(self.tenkan_period);
        longest + 2 * self.displacement
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tenkan_period == 0 || self.kijun_period == 0 || self.span_b_period == 0 {
            return Err(format!("Ichimoku periods must be positive, got {}", self));
        }
        Ok(())
    }
}

impl fmt::Display for IchimokuParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ichimoku({},{},{},{})",
            self.tenkan_period, self.kijun_period, self.span_b_period, self.displacement
        )
    }
}

/// Ichimoku lines read at a single index of a candle series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IchimokuState {
    pub tenkan: f64,
    pub kijun: f64,
    pub span_a: f64,
    pub span_b: f64,
    pub chikou: f64,
    pub close: f64,
}

impl IchimokuState {
    /// False when any line is NaN or infinite, as with an undefined lagging span.
    pub fn is_finite(&self) -> bool {
        [self.tenkan, self.kijun, self.span_a, self.span_b, self.chikou, self.close]
            .iter()
            .all(|v| v.is_finite())
    }

    pub fn cloud_top(&self) -> f64 {
        self.span_a.max(self.span_b)
    }

    pub fn cloud_bottom(&self) -> f64 {
        self.span_a.min(self.span_b)
    }
}

impl fmt::Display for IchimokuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "T:{:.4} K:{:.4} SpA:{:.4} SpB:{:.4} Ch:{:.4} C:{:.4}",
            self.tenkan, self.kijun, self.span_a, self.span_b, self.chikou, self.close
        )
    }
}

/// Directional call derived from an [`IchimokuState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Long,
    Short,
    Neutral,
}

impl Signal {
    pub fn is_directional(&self) -> bool {
        !matches!(self, Signal::Neutral)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Long => "long",
            Signal::Short => "short",
            Signal::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Long => write!(f, "LONG"),
            Signal::Short => write!(f, "SHORT"),
            Signal::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = IchimokuParams::default();
        assert_eq!(params.min_bars(), 78);
        assert_eq!(params.complete_row_bars(), 104);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_zero_period_rejected() {
        let params = IchimokuParams { kijun_period: 0, ..Default::default() };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_params_from_partial_toml() {
        let params: IchimokuParams = toml::from_str("tenkan_period = 7").unwrap();
        assert_eq!(params.tenkan_period, 7);
        assert_eq!(params.kijun_period, 26);
    }

    #[test]
    fn test_signal_display() {
        assert_eq!(Signal::Long.to_string(), "LONG");
        assert_eq!(Signal::Short.to_string(), "SHORT");
        assert!(Signal::Short.is_directional());
        assert!(!Signal::Neutral.is_directional());
    }

    #[test]
    fn test_cloud_bounds() {
        let state = IchimokuState { tenkan: 1.0, kijun: 1.0, span_a: 100.0, span_b: 95.0, chikou: 1.0, close: 1.0 };
        assert_eq!(state.cloud_top(), 100.0);
        assert_eq!(state.cloud_bottom(), 95.0);
        assert!(state.is_finite());
        assert!(!IchimokuState { span_a: f64::NAN, ..state }.is_finite());
    }
}
