//! Mock source for testing.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use bunkmeter_core::model::SubjectRecord;
use bunkmeter_core::traits::AttendanceSource;

/// An attendance source that returns canned records without touching disk
/// or network.
pub struct MockSource {
    records: Vec<SubjectRecord>,
    failure: Option<String>,
    call_count: AtomicU32,
}

impl MockSource {
    pub fn new(records: Vec<SubjectRecord>) -> Self {
        Self {
            records,
            failure: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// A mock whose every fetch fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            records: Vec::new(),
            failure: Some(message.to_string()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Number of fetches made so far.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AttendanceSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self) -> anyhow::Result<Vec<SubjectRecord>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        match &self.failure {
            Some(message) => anyhow::bail!("{message}"),
            None => Ok(self.records.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bunkmeter_core::statistics::{compute_overall, Target};

    #[tokio::test]
    async fn canned_records() {
        let source = MockSource::new(vec![
            SubjectRecord::new("CS301", "OS", 8, 10),
            SubjectRecord::new("MA201", "Maths", 5, 10),
        ]);

        let records = source.fetch().await.unwrap();
        let overall = compute_overall(&records, Target::default());
        assert_eq!((overall.attended, overall.total), (13, 20));
        assert_eq!(overall.must_attend, 8);

        source.fetch().await.unwrap();
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn failing_source() {
        let source = MockSource::failing("portal unreachable");
        let err = source.fetch().await.unwrap_err();
        assert_eq!(err.to_string(), "portal unreachable");
        assert_eq!(source.call_count(), 1);
    }
}
