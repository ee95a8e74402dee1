use crate::candles::{CandleSeries, OHLCVCandle};
use crate::technical_analysis::structs::{IchimokuParams, IchimokuState};

/// Full-length Ichimoku columns, one slot per candle; `None` marks a gap.
#[derive(Debug, Clone, PartialEq)]
pub struct IchimokuLines {
    pub tenkan: Vec<Option<f64>>,
    pub kijun: Vec<Option<f64>>,
    pub span_a: Vec<Option<f64>>,
    pub span_b: Vec<Option<f64>>,
    pub chikou: Vec<Option<f64>>,
    pub close: Vec<f64>,
}

impl IchimokuLines {
    /// Compute every line at every index of `candles`.
    pub fn compute(candles: &[OHLCVCandle], params: &IchimokuParams) -> Self {
        let displacement = params.displacement;

        let tenkan = rolling_midpoint(candles, params.tenkan_period);
        let kijun = rolling_midpoint(candles, params.kijun_period);

        let base_span_a: Vec<Option<f64>> = tenkan
            .iter()
            .zip(kijun.iter())
            .map(|(t, k)| Some(((*t)? + (*k)?) / 2.0))
            .collect();
        let span_a = shift_forward(&base_span_a, displacement);
        let span_b = shift_forward(&rolling_midpoint(candles, params.span_b_period), displacement);

        let chikou = (0..candles.len())
            .map(|i| candles.get(i + displacement).map(|c| c.close))
            .collect();

        Self {
            tenkan,
            kijun,
            span_a,
            span_b,
            chikou,
            close: candles.iter().map(|c| c.close).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// Every line read at `index`, or `None` if any of them is a gap there.
    pub fn row(&self, index: usize) -> Option<IchimokuState> {
        Some(IchimokuState {
            tenkan: (*self.tenkan.get(index)?)?,
            kijun: (*self.kijun.get(index)?)?,
            span_a: (*self.span_a.get(index)?)?,
            span_b: (*self.span_b.get(index)?)?,
            chikou: (*self.chikou.get(index)?)?,
            close: *self.close.get(index)?,
        })
    }

    /// Index of the newest row without gaps.
    pub fn last_complete_index(&self) -> Option<usize> {
        (0..self.len()).rev().find(|&i| self.row(i).is_some())
    }

    pub fn last_complete_row(&self) -> Option<IchimokuState> {
        self.last_complete_index().and_then(|i| self.row(i))
    }

    /// The newest row with the lagging span read as NaN when it runs off the end.
    ///
    /// `None` if any other line is still a gap at the last index.
    pub fn last_row(&self) -> Option<IchimokuState> {
        let index = self.len().checked_sub(1)?;
        Some(IchimokuState {
            tenkan: (*self.tenkan.get(index)?)?,
            kijun: (*self.kijun.get(index)?)?,
            span_a: (*self.span_a.get(index)?)?,
            span_b: (*self.span_b.get(index)?)?,
            chikou: self.chikou.get(index).copied().flatten().unwrap_or(f64::NAN),
            close: *self.close.get(index)?,
        })
    }
}

/// Evaluate the Ichimoku lines for a series.
///
/// Returns `None` when there is no series or when it is shorter than
/// `span_b_period + displacement`. Otherwise the newest complete row is used.
/// A series long enough for the cloud but too short for the lagging span
/// yields its last row with `chikou` set to NaN, which classifies as Neutral.
/// Pure: the same input always produces the same state.
pub fn compute_ichimoku(series: Option<&CandleSeries>, params: &IchimokuParams) -> Option<IchimokuState> {
    let series = series?;
    if series.len() < params.min_bars() {
        return None;
    }
    let lines = IchimokuLines::compute(series.candles(), params);
    lines.last_complete_row().or_else(|| lines.last_row())
}

/// `(highest high + lowest low) / 2` over the `period` bars ending at each index.
fn rolling_midpoint(candles: &[OHLCVCandle], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; candles.len()];
    if period == 0 {
        return out;
    }
    for end in (period - 1)..candles.len() {
        let window = &candles[end + 1 - period..=end];
        let highest = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        let lowest = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        out[end] = Some((highest + lowest) / 2.0);
    }
    out
}

/// Move each value `by` slots towards the end; the first `by` slots become gaps.
fn shift_forward(values: &[Option<f64>], by: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| if i >= by { values[i - by] } else { None })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::technical_analysis::{classify, Signal};
    use crate::candles::TimestampMS;

    const HOUR_MS: TimestampMS = 3_600_000;

    /// close = 100 + i, high = close + 1, low = close - 1
    fn rising_series(len: usize) -> CandleSeries {
        let candles = (0..len)
            .map(|i| {
                let close = 100.0 + i as f64;
                let open_time = i as TimestampMS * HOUR_MS;
                OHLCVCandle::new_from_values(open_time, open_time + HOUR_MS - 1, close, close + 1.0, close - 1.0, close, 1.0)
            })
            .collect();
        CandleSeries::new(candles).unwrap()
    }

    #[test]
    fn test_absent_series() {
        assert_eq!(compute_ichimoku(None, &IchimokuParams::default()), None);
    }

    #[test]
    fn test_short_series_rejected_by_history_guard() {
        let series = rising_series(77);
        assert_eq!(compute_ichimoku(Some(&series), &IchimokuParams::default()), None);
    }

    #[test]
    fn test_guard_length_yields_last_row() {
        // 78 bars clear the guard: span B starts at index 77 while the
        // lagging span ends at index 51, so no row is complete.
        let params = IchimokuParams::default();
        let series = rising_series(78);
        let lines = IchimokuLines::compute(series.candles(), &params);
        assert!(lines.span_b[77].is_some());
        assert!(lines.chikou[51].is_some());
        assert!(lines.chikou[52].is_none());
        assert_eq!(lines.last_complete_index(), None);

        let state = compute_ichimoku(Some(&series), &params).unwrap();
        assert_eq!(state.close, 177.0);
        assert_eq!(state.tenkan, 173.0); // (178 + 168) / 2
        assert_eq!(state.span_b, 125.5); // (152 + 99) / 2 from index 51
        assert!(state.chikou.is_nan());
        assert_eq!(classify(Some(&state)), Signal::Neutral);
    }

    #[test]
    fn test_first_complete_length() {
        let params = IchimokuParams::default();
        let partial = compute_ichimoku(Some(&rising_series(103)), &params).unwrap();
        assert!(partial.chikou.is_nan());
        assert_eq!(partial.close, 202.0);

        let complete = compute_ichimoku(Some(&rising_series(104)), &params).unwrap();
        assert_eq!(complete.chikou, 203.0);
        assert_eq!(complete.close, 177.0);
    }

    #[test]
    fn test_last_row_needs_the_cloud() {
        let params = IchimokuParams::default();
        // span B at the last index needs span_b_period + displacement bars
        let lines = IchimokuLines::compute(rising_series(77).candles(), &params);
        assert_eq!(lines.last_row(), None);
        let lines = IchimokuLines::compute(&[], &params);
        assert_eq!(lines.last_row(), None);
    }

    #[test]
    fn test_values_on_rising_series() {
        let params = IchimokuParams::default();
        let series = rising_series(104);
        let lines = IchimokuLines::compute(series.candles(), &params);
        assert_eq!(lines.last_complete_index(), Some(77));

        let state = compute_ichimoku(Some(&series), &params).unwrap();
        assert_eq!(state.tenkan, 173.0); // (178 + 168) / 2
        assert_eq!(state.kijun, 164.5); // (178 + 151) / 2
        assert_eq!(state.span_a, 142.75); // (147 + 138.5) / 2 from index 51
        assert_eq!(state.span_b, 125.5); // (152 + 99) / 2 from index 51
        assert_eq!(state.chikou, 203.0); // close at index 103
        assert_eq!(state.close, 177.0);
    }

    #[test]
    fn test_selected_row_tracks_series_end() {
        let params = IchimokuParams::default();
        let series = rising_series(100 + 30);
        let lines = IchimokuLines::compute(series.candles(), &params);
        assert_eq!(lines.last_complete_index(), Some(130 - 1 - 26));
        // Tail rows are incomplete because the lagging span runs off the end.
        assert!(lines.row(129).is_none());
    }

    #[test]
    fn test_compute_is_deterministic() {
        let params = IchimokuParams::default();
        let series = rising_series(150);
        let first = compute_ichimoku(Some(&series), &params);
        let second = compute_ichimoku(Some(&series), &params);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_params() {
        let params = IchimokuParams { tenkan_period: 2, kijun_period: 3, span_b_period: 4, displacement: 1 };
        let series = rising_series(6);
        let state = compute_ichimoku(Some(&series), &params).unwrap();
        // last complete index = 6 - 1 - 1 = 4
        assert_eq!(state.close, 104.0);
        assert_eq!(state.chikou, 105.0);
        assert_eq!(state.tenkan, (105.0 + 102.0) / 2.0);
    }

    #[test]
    fn test_rolling_midpoint_gaps() {
        let series = rising_series(5);
        let mid = rolling_midpoint(series.candles(), 3);
        assert_eq!(mid[0], None);
        assert_eq!(mid[1], None);
        assert_eq!(mid[2], Some((103.0 + 99.0) / 2.0));
        assert!(rolling_midpoint(series.candles(), 0).iter().all(Option::is_none));
    }

    #[test]
    fn test_shift_forward() {
        let shifted = shift_forward(&[Some(1.0), Some(2.0), Some(3.0)], 2);
        assert_eq!(shifted, vec![None, None, Some(1.0)]);
    }
}
