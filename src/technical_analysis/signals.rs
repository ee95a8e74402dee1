use crate::technical_analysis::structs::{IchimokuState, Signal};

/// Map an Ichimoku reading to a directional call.
///
/// Long requires price above the whole cloud, tenkan above kijun and the
/// lagging span above price; Short is the mirror image. Every comparison is
/// strict, so any tie falls through to `Neutral`. A reading with a NaN or
/// infinite line is `Neutral` as well.
pub fn classify(state: Option<&IchimokuState>) -> Signal {
    let Some(state) = state.filter(|s| s.is_finite()) else {
        return Signal::Neutral;
    };

    let close = state.close;
    let bullish = close > state.cloud_top() && state.tenkan > state.kijun && state.chikou > close;
    let bearish = close < state.cloud_bottom() && state.tenkan < state.kijun && state.chikou < close;

    if bullish {
        Signal::Long
    } else if bearish {
        Signal::Short
    } else {
        Signal::Neutral
    }
}
