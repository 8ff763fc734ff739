//! Integration tests for the full exposure scoring pipeline
//!
//! Exercises the feed → segment → feature → pricing → currency flow end to
//! end, including the degraded currency path and per-record skip handling.

#[cfg(test)]
mod exposure_integration_tests {
    use async_trait::async_trait;
    use sponsorflow::{
        AnalyticsConfig, BoundingBox, CurrencyConverter, Detection, DetectionFeed, ExposureEngine,
        RateProvider, RateProviderError,
    };
    use std::collections::HashMap;
    use std::fs::File;
    use std::io::Write;

    fn create_test_detection(sponsor_id: &str, timestamp_sec: f64, confidence: f64) -> Detection {
        Detection {
            timestamp_sec,
            sponsor_id: sponsor_id.to_string(),
            bbox: BoundingBox::new(0.4, 0.4, 0.2, 0.1),
            confidence,
        }
    }

    #[test]
    fn test_full_pipeline_two_sponsors() {
        let _ = env_logger::try_init();

        let config = AnalyticsConfig::default();
        let engine = ExposureEngine::new(&config).unwrap();
        let converter = CurrencyConverter::with_static_rate(config.currency.static_npr_rate);

        let mut by_sponsor = HashMap::new();

        // Sponsor with two retained segments: [0, 2] and [10, 11.5]
        by_sponsor.insert(
            "acme_cola".to_string(),
            vec![
                create_test_detection("acme_cola", 0.0, 0.9),
                create_test_detection("acme_cola", 1.0, 0.8),
                create_test_detection("acme_cola", 2.0, 0.85),
                create_test_detection("acme_cola", 10.0, 0.7),
                create_test_detection("acme_cola", 11.5, 0.9),
                create_test_detection("acme_cola", 10.9, 0.75),
            ],
        );

        // Sponsor whose only appearance is too short to retain
        by_sponsor.insert(
            "nimbus_air".to_string(),
            vec![create_test_detection("nimbus_air", 30.0, 0.95)],
        );

        let report = engine.score_video("match_01", by_sponsor, &converter);

        assert_eq!(report.video_id, "match_01");
        assert_eq!(report.scores.len(), 2);
        assert_eq!(report.skipped_detections, 0);

        // Sorted by sponsor_id
        assert_eq!(report.scores[0].sponsor_id, "acme_cola");
        assert_eq!(report.scores[1].sponsor_id, "nimbus_air");

        let acme = &report.scores[0];
        // [0, 2] retained; detections at 10.0, 10.9, 11.5 chain into [10, 11.5]
        assert_eq!(acme.features.frequency_count, 2);
        assert!((acme.features.total_duration_sec - 3.5).abs() < 1e-9);
        // 0.2 x 0.1 box -> 2% coverage
        assert!((acme.features.coverage_pct - 2.0).abs() < 1e-9);
        assert!(acme.raw_score > 0.0 && acme.raw_score <= 1.0);
        assert!((acme.npr_value - acme.usd_value * 135.0).abs() < 1e-6);
        assert!(!acme.stale_rate);

        // Single-detection sponsor: nothing retained, all-zero features,
        // still present in the report
        let nimbus = &report.scores[1];
        assert_eq!(nimbus.features.frequency_count, 0);
        assert_eq!(nimbus.usd_value, 0.0);
        assert_eq!(nimbus.npr_value, 0.0);
    }

    #[test]
    fn test_invalid_records_skipped_batch_continues() {
        let config = AnalyticsConfig::default();
        let engine = ExposureEngine::new(&config).unwrap();
        let converter = CurrencyConverter::with_static_rate(config.currency.static_npr_rate);

        let mut by_sponsor = HashMap::new();
        by_sponsor.insert(
            "acme_cola".to_string(),
            vec![
                create_test_detection("acme_cola", 0.0, 0.9),
                create_test_detection("acme_cola", 0.8, 0.85),
                create_test_detection("acme_cola", -1.0, 0.9), // negative timestamp
                create_test_detection("acme_cola", 0.4, 1.5),  // confidence out of range
            ],
        );

        let report = engine.score_video("match_02", by_sponsor, &converter);

        assert_eq!(report.skipped_detections, 2);
        let acme = &report.scores[0];
        assert_eq!(acme.features.frequency_count, 1);
        assert!((acme.features.total_duration_sec - 0.8).abs() < 1e-9);
    }

    struct FailingProvider;

    #[async_trait]
    impl RateProvider for FailingProvider {
        async fn fetch_rate(&self, _base: &str, _quote: &str) -> Result<f64, RateProviderError> {
            Err(RateProviderError::Api("simulated outage".to_string()))
        }
    }

    #[tokio::test]
    async fn test_degraded_currency_path_marks_scores_stale() {
        let config = AnalyticsConfig::default();
        let engine = ExposureEngine::new(&config).unwrap();

        // Provider fails: converter resolves to the static rate, stale
        let converter = CurrencyConverter::resolve(&config.currency, Some(&FailingProvider)).await;

        let detections: Vec<Detection> = (0..20)
            .map(|i| create_test_detection("acme_cola", i as f64 * 0.5, 0.9))
            .collect();

        let mut by_sponsor = HashMap::new();
        by_sponsor.insert("acme_cola".to_string(), detections);

        let report = engine.score_video("match_03", by_sponsor, &converter);

        let acme = &report.scores[0];
        assert!(acme.stale_rate);
        // Degraded, not different: same numbers as the static path
        assert!((acme.npr_value - acme.usd_value * 135.0).abs() < 1e-6);
    }

    #[test]
    fn test_feed_file_to_report() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("match_04.jsonl");

        let mut file = File::create(&file_path).unwrap();
        for i in 0..10 {
            writeln!(
                file,
                r#"{{"timestamp_sec":{},"sponsor_id":"acme_cola","bbox":{{"x":0.1,"y":0.1,"width":0.3,"height":0.2}},"confidence":0.9}}"#,
                i as f64 * 0.5
            )
            .unwrap();
        }
        writeln!(file, "corrupted line").unwrap();
        drop(file);

        let feed = DetectionFeed::load(&file_path).unwrap();
        assert_eq!(feed.malformed_lines, 1);

        let config = AnalyticsConfig::default();
        let engine = ExposureEngine::new(&config).unwrap();
        let converter = CurrencyConverter::with_static_rate(config.currency.static_npr_rate);

        let report = engine.score_video("match_04", feed.by_sponsor(), &converter);

        assert_eq!(report.scores.len(), 1);
        let acme = &report.scores[0];
        assert_eq!(acme.features.frequency_count, 1);
        assert!((acme.features.total_duration_sec - 4.5).abs() < 1e-9);
        // 0.3 x 0.2 box -> 6% coverage, inside the 10% cap
        assert!((acme.features.coverage_pct - 6.0).abs() < 1e-9);
        assert!(acme.usd_value > 0.0);
    }

    #[test]
    fn test_report_serializes_for_the_caller() {
        let config = AnalyticsConfig::default();
        let engine = ExposureEngine::new(&config).unwrap();
        let converter = CurrencyConverter::with_static_rate(config.currency.static_npr_rate);

        let mut by_sponsor = HashMap::new();
        by_sponsor.insert(
            "acme_cola".to_string(),
            vec![
                create_test_detection("acme_cola", 0.0, 0.9),
                create_test_detection("acme_cola", 0.7, 0.9),
            ],
        );

        let report = engine.score_video("match_05", by_sponsor, &converter);
        let json = serde_json::to_string(&report).unwrap();

        assert!(json.contains("\"video_id\":\"match_05\""));
        assert!(json.contains("\"sponsor_id\":\"acme_cola\""));
        assert!(json.contains("\"stale_rate\":false"));
    }
}
