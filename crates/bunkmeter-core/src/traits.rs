//! Core trait definitions for attendance sources.
//!
//! Implemented by the `bunkmeter-sources` crate: a local sheet file, the
//! scraping backend, and a mock for tests.

use async_trait::async_trait;

use crate::model::SubjectRecord;

/// Something that yields raw per-subject attendance counts.
///
/// A source may return an empty list; deciding whether that is an error is
/// up to the source (the remote backend treats it as one, a fresh sheet
/// does not).
#[async_trait]
pub trait AttendanceSource: Send + Sync {
    /// Human-readable source name (e.g. "sheet").
    fn name(&self) -> &str;

    /// Fetch the current counts, in the order the source lists them.
    async fn fetch(&self) -> anyhow::Result<Vec<SubjectRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<SubjectRecord>);

    #[async_trait]
    impl AttendanceSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch(&self) -> anyhow::Result<Vec<SubjectRecord>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn trait_objects_are_usable() {
        let source: Box<dyn AttendanceSource> =
            Box::new(Fixed(vec![SubjectRecord::new("CS301", "OS", 3, 4)]));
        assert_eq!(source.name(), "fixed");
        assert_eq!(source.fetch().await.unwrap().len(), 1);
    }
}
