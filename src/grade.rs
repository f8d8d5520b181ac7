use crate::error::{check_series, ElevationError, Result};

/// Grade in percent between consecutive points (rise over run * 100).
///
/// Entry `i` is the grade of the step arriving at point `i`; the first entry
/// and steps with no horizontal distance are reported as 0.
pub fn grade(distances: &[f64], elevations: &[f64]) -> Result<Vec<f64>> {
    check_series("distances", distances)?;
    check_series("elevations", elevations)?;
    if distances.len() != elevations.len() {
        return Err(ElevationError::invalid(format!(
            "distances has {} points but elevations has {}",
            distances.len(),
            elevations.len()
        )));
    }

    let mut out = Vec::with_capacity(distances.len());
    out.push(0.0);
    for i in 1..distances.len() {
        let run = distances[i] - distances[i - 1];
        if run == 0.0 {
            out.push(0.0);
        } else {
            out.push((elevations[i] - elevations[i - 1]) / run * 100.0);
        }
    }

    Ok(out)
}
