use approx::assert_abs_diff_eq;
use elevation_smoother::*;

/// Noisy rolling course: ~4.3 m spacing with a stop halfway.
fn course() -> (Vec<f64>, Vec<f64>) {
    let mut distances = Vec::new();
    let mut d = 0.0;
    for i in 0..800 {
        if !(400..410).contains(&i) {
            d += 3.0 + (i % 5) as f64 * 0.7;
        }
        distances.push(d);
    }
    let elevations = distances
        .iter()
        .enumerate()
        .map(|(i, x)| 250.0 + 35.0 * (x / 600.0).sin() + ((i * 7919) % 13) as f64 * 0.3 - 1.8)
        .collect();
    (distances, elevations)
}

#[test]
fn time_smooth_keeps_length() {
    for n in [21, 22, 60, 301] {
        let s: Vec<f64> = (0..n).map(|i| (i as f64 * 0.37).cos() * 4.0).collect();
        assert_eq!(time_smooth(&s, 21, 2).unwrap().len(), n);
    }
}

#[test]
fn time_smooth_too_short() {
    let s = vec![1.0; 10];
    assert_eq!(
        time_smooth(&s, DEFAULT_WINDOW_LEN, DEFAULT_POLY_ORDER),
        Err(ElevationError::SeriesTooShort { len: 10, window_len: 21 })
    );
}

#[test]
fn distance_smooth_keeps_length_and_input() {
    let (d, e) = course();
    let before = e.clone();
    let out = distance_smooth(&d, &e, DEFAULT_SAMPLE_LEN, DEFAULT_WINDOW_LEN, DEFAULT_POLY_ORDER).unwrap();
    assert_eq!(out.len(), d.len());
    assert_eq!(e, before);
    assert!(gain_naive(&out).unwrap() < gain_naive(&e).unwrap());
}

#[test]
fn distance_smooth_rejects_non_monotonic() {
    let d = vec![0.0, 5.0, 10.0, 8.0, 20.0];
    let e = vec![1.0; 5];
    assert!(matches!(
        distance_smooth(&d, &e, 1.0, 3, 1),
        Err(ElevationError::InvalidInput(_))
    ));
}

#[test]
fn distance_smooth_linear_climb_exact() {
    // 1000 points, 3 m apart, climbing 1 m per point
    let d: Vec<f64> = (0..1000).map(|i| 3.0 * i as f64).collect();
    let e: Vec<f64> = (0..1000).map(|i| i as f64).collect();
    let out = distance_smooth(&d, &e, 5.0, 21, 2).unwrap();
    for (a, b) in out.iter().zip(e.iter()) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-6);
    }
}

#[test]
fn flatten_is_constant_mean() {
    let (_, e) = course();
    let mean = e.iter().sum::<f64>() / e.len() as f64;
    let flat = flatten(&e).unwrap();
    assert_eq!(flat.len(), e.len());
    for v in flat {
        assert_abs_diff_eq!(v, mean, epsilon = 1e-9);
    }
}

#[test]
fn threshold_filter_is_piecewise_constant() {
    let (_, e) = course();
    let out = threshold_filter(&e, DEFAULT_THRESHOLD).unwrap();
    assert_eq!(out.len(), e.len());
    assert_eq!(out[0], e[0]);
    for i in 1..out.len() {
        if out[i] != out[i - 1] {
            assert_eq!(out[i], e[i]);
            assert!((e[i] - out[i - 1]).abs() > DEFAULT_THRESHOLD);
        } else {
            assert!((e[i] - out[i]).abs() <= DEFAULT_THRESHOLD || out[i] == e[i]);
        }
    }
}

#[test]
fn threshold_filter_concrete() {
    assert_eq!(
        threshold_filter(&[0.0, 1.0, 2.0, 3.0, 10.0, 11.0], 5.0).unwrap(),
        vec![0.0, 0.0, 0.0, 0.0, 10.0, 10.0]
    );
}

#[test]
fn gain_minus_loss_telescopes() {
    let (_, e) = course();
    let gain = gain_naive(&e).unwrap();
    let loss = loss_naive(&e).unwrap();
    assert_abs_diff_eq!(gain - loss, e[e.len() - 1] - e[0], epsilon = 1e-8);

    let neg: Vec<f64> = e.iter().map(|v| -v).collect();
    assert_abs_diff_eq!(loss, gain_naive(&neg).unwrap(), epsilon = 1e-9);
}

#[test]
fn gain_loss_concrete() {
    let s = [0.0, 1.0, 2.0, 1.0, 0.0];
    assert_eq!(gain_naive(&s).unwrap(), 2.0);
    assert_eq!(loss_naive(&s).unwrap(), 2.0);
}

#[test]
fn threshold_gain_never_exceeds_naive() {
    let (_, e) = course();
    let naive = gain_naive(&e).unwrap();
    for threshold in [0.5, 2.0, 5.0, 10.0] {
        assert!(gain_threshold(&e, threshold).unwrap() <= naive + 1e-9);
    }
}

#[test]
fn empty_series_rejected_everywhere() {
    let empty: [f64; 0] = [];
    assert!(threshold_filter(&empty, 5.0).is_err());
    assert!(flatten(&empty).is_err());
    assert!(time_smooth(&empty, 3, 1).is_err());
    assert!(distance_smooth(&empty, &empty, 5.0, 3, 1).is_err());
    assert!(gain_naive(&empty).is_err());
    assert!(loss_naive(&empty).is_err());
    assert!(gain_threshold(&empty, 5.0).is_err());
}

#[test]
fn pipeline_config_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.json");

    // missing file falls back to defaults
    assert_eq!(PipelineConfig::load(&path).unwrap(), PipelineConfig::default());

    let config = PipelineConfig {
        prefilter: Prefilter::Threshold { threshold: 2.0 },
        smoother: Smoother::Time { window_len: 9, poly_order: 3, sample_len: 2 },
        gain: GainPolicy::Threshold { threshold: 4.0 },
    };
    config.save(&path).unwrap();
    assert_eq!(PipelineConfig::load(&path).unwrap(), config);
}

#[test]
fn pipeline_config_rejects_bad_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.json");
    std::fs::write(&path, r#"{"smoother": {"kind": "distance", "window_len": 8}}"#).unwrap();
    assert!(matches!(PipelineConfig::load(&path), Err(ConfigError::Invalid(_))));

    std::fs::write(&path, "not json").unwrap();
    assert!(matches!(PipelineConfig::load(&path), Err(ConfigError::Json(_))));
}

#[test]
fn pipeline_time_domain() {
    let (_, e) = course();
    let config = PipelineConfig {
        smoother: Smoother::Time { window_len: 21, poly_order: 2, sample_len: 1 },
        ..Default::default()
    };
    let summary = config.run(None, &e).unwrap();
    assert_eq!(summary.smoothed, time_smooth(&e, 21, 2).unwrap());
    assert_eq!(summary.gain, gain_naive(&summary.smoothed).unwrap());
}
