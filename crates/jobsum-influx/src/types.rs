//! Typed views of metrics-store results.

use std::collections::HashMap;

/// One field's samples, in time order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSeries {
    pub value: Vec<f64>,
}

/// Lustre jobstats samples: filesystem -> server role -> field -> series.
///
/// Sparse by nature; consumers treat any missing key as a zero reading.
pub type JobstatsData = HashMap<String, HashMap<String, HashMap<String, FieldSeries>>>;
