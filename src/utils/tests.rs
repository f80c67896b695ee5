#[cfg(test)]
mod unit_tests {
    use crate::utils::{
        as_millis_f64, format_duration, measure_time, EventLevel, EventSink, MemorySink,
        ProbeError, TestResult,
    };
    use std::time::Duration;

    #[test]
    fn test_format_duration_milliseconds() {
        let duration = Duration::from_millis(500);
        assert_eq!(format_duration(duration), "500ms");
    }

    #[test]
    fn test_format_duration_seconds() {
        let duration = Duration::from_millis(1500);
        assert_eq!(format_duration(duration), "1.50s");
    }

    #[test]
    fn test_as_millis_f64() {
        assert_eq!(as_millis_f64(Duration::from_micros(1500)), 1.5);
    }

    #[test]
    fn test_test_result_new() {
        let result = TestResult::new("test_name".to_string());
        assert_eq!(result.test_name, "test_name");
        assert!(!result.success);
        assert_eq!(result.duration, Duration::ZERO);
        assert!(result.details.is_empty());
        assert!(result.error.is_none());
    }

    #[test]
    fn test_test_result_success() {
        let duration = Duration::from_millis(100);
        let details = "Port 445 is open on dc1".to_string();
        let result = TestResult::new("test".to_string()).success(duration, details.clone());

        assert!(result.success);
        assert_eq!(result.duration, duration);
        assert_eq!(result.message(), details);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_test_result_failure() {
        let duration = Duration::from_millis(200);
        let result = TestResult::new("test".to_string()).failure(
            duration,
            "Port 53 is closed on dc1".to_string(),
            ProbeError::ConnectionTimeout,
        );

        assert!(!result.success);
        assert_eq!(result.duration, duration);
        assert_eq!(result.message(), "Port 53 is closed on dc1");
        assert!(matches!(result.error, Some(ProbeError::ConnectionTimeout)));
    }

    #[test]
    fn test_closed_covers_timeout_and_refused() {
        assert!(ProbeError::ConnectionTimeout.is_closed());
        assert!(ProbeError::ConnectionRefused.is_closed());
        assert!(!ProbeError::Unknown("boom".to_string()).is_closed());
        assert!(!ProbeError::NoSamples.is_closed());
    }

    #[test]
    fn test_memory_sink_records_levels() {
        let sink = MemorySink::new();
        sink.info("one");
        sink.warn("two");
        sink.warn("three");
        sink.error("four");

        assert_eq!(sink.count(EventLevel::Info), 1);
        assert_eq!(sink.count(EventLevel::Warn), 2);
        assert_eq!(sink.count(EventLevel::Error), 1);
        assert_eq!(sink.events()[3], (EventLevel::Error, "four".to_string()));
    }

    #[tokio::test]
    async fn test_measure_time() {
        let (duration, result) = measure_time(|| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            "test_result"
        })
        .await;

        assert!(duration >= Duration::from_millis(90));
        assert!(duration <= Duration::from_millis(500));
        assert_eq!(result, "test_result");
    }
}
