use super::source::FunctionSource;
use super::{last_used, FunctionRecord};
use chrono::{DateTime, Utc};
use eyre::Context;
use futures::future;

/// Collect all functions of a region, page by page
///
/// Every page is joined with one metrics lookup covering all of its functions.
pub(crate) async fn list_in_region(
    source: &impl FunctionSource,
    region: &str,
    inactive_only: bool,
    now: DateTime<Utc>,
) -> eyre::Result<Vec<FunctionRecord>> {
    let mut records = Vec::new();
    let mut marker = None;

    loop {
        let page = source.list_functions(marker).await?;

        if page.functions.is_empty() {
            break;
        }

        let names: Vec<String> = page.functions.iter().map(|f| f.name.clone()).collect();

        let last_invocations = source
            .last_invocations(&names)
            .await
            .wrap_err(format!("Failed to get invocations in {region}"))?;

        for function in page.functions {
            let last_invocation = last_invocations.get(&function.name).copied().flatten();

            let record = FunctionRecord {
                region: region.to_string(),
                last_used: last_used(now, last_invocation),
                name: function.name,
                runtime: function.runtime,
                memory_size: function.memory_size,
                code_size: function.code_size,
                last_modified: function.last_modified,
            };

            if !inactive_only || record.is_inactive() {
                records.push(record);
            }
        }

        match page.next_marker {
            Some(next) => marker = Some(next),
            None => break,
        }
    }

    log::info!("Found {} functions in {region}", records.len());
    Ok(records)
}

/// Collect functions of all regions concurrently
///
/// Results keep the order of regions. Failure in any region fails the whole listing.
pub(crate) async fn list_in_all_regions<S: FunctionSource>(
    regions: &[String],
    inactive_only: bool,
    now: DateTime<Utc>,
    source_for: impl Fn(&str) -> S,
) -> eyre::Result<Vec<FunctionRecord>> {
    let sources: Vec<(&str, S)> = regions
        .iter()
        .map(|region| (region.as_str(), source_for(region)))
        .collect();

    let per_region = future::try_join_all(
        sources
            .iter()
            .map(|(region, source)| list_in_region(source, region, inactive_only, now)),
    )
    .await?;

    Ok(per_region.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::{FunctionPage, FunctionSummary, INACTIVE};
    use chrono::TimeDelta;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Barrier;

    /// Serves pages in order, one per listing call
    struct FakeSource {
        region: String,
        pages: Vec<FunctionPage>,
        invoked: HashMap<String, DateTime<Utc>>,
        calls: Arc<Mutex<Vec<(String, Option<String>)>>>,
        metric_calls: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl FakeSource {
        fn new(region: &str, pages: Vec<FunctionPage>) -> Self {
            FakeSource {
                region: region.to_string(),
                pages,
                invoked: HashMap::new(),
                calls: Default::default(),
                metric_calls: Default::default(),
            }
        }

        fn listing_calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl FunctionSource for FakeSource {
        async fn list_functions(&self, marker: Option<String>) -> eyre::Result<FunctionPage> {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push((self.region.clone(), marker));
            Ok(self.pages.get(index).cloned().unwrap_or_default())
        }

        async fn last_invocations(
            &self,
            function_names: &[String],
        ) -> eyre::Result<HashMap<String, Option<DateTime<Utc>>>> {
            self.metric_calls.lock().unwrap().push(function_names.to_vec());

            Ok(function_names
                .iter()
                .map(|name| (name.clone(), self.invoked.get(name).copied()))
                .collect())
        }
    }

    /// Always fails listing
    struct BrokenSource;

    impl FunctionSource for BrokenSource {
        async fn list_functions(&self, _marker: Option<String>) -> eyre::Result<FunctionPage> {
            Err(eyre::eyre!("AccessDenied"))
        }

        async fn last_invocations(
            &self,
            _function_names: &[String],
        ) -> eyre::Result<HashMap<String, Option<DateTime<Utc>>>> {
            Ok(HashMap::new())
        }
    }

    /// Lists only after every region has started listing
    struct GatedSource {
        region: String,
        gate: Arc<Barrier>,
    }

    impl FunctionSource for GatedSource {
        async fn list_functions(&self, _marker: Option<String>) -> eyre::Result<FunctionPage> {
            self.gate.wait().await;
            Ok(page(&[self.region.as_str()], None))
        }

        async fn last_invocations(
            &self,
            _function_names: &[String],
        ) -> eyre::Result<HashMap<String, Option<DateTime<Utc>>>> {
            Ok(HashMap::new())
        }
    }

    fn page(names: &[&str], next_marker: Option<&str>) -> FunctionPage {
        FunctionPage {
            functions: names
                .iter()
                .map(|name| FunctionSummary {
                    name: name.to_string(),
                    runtime: "nodejs10.x".into(),
                    memory_size: 128,
                    code_size: 1024,
                    last_modified: "2019-10-01T12:00:00.000+0000".into(),
                })
                .collect(),
            next_marker: next_marker.map(str::to_string),
        }
    }

    fn names(records: &[FunctionRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[tokio::test]
    async fn follows_the_marker_through_all_pages() {
        let source = FakeSource::new(
            "us-east-1",
            vec![page(&["function-a"], Some("more")), page(&["function-b"], None)],
        );

        let records = list_in_region(&source, "us-east-1", false, Utc::now())
            .await
            .unwrap();

        assert_eq!(source.listing_calls(), 2);
        assert_eq!(names(&records), vec!["function-a", "function-b"]);

        let calls = source.calls.lock().unwrap();
        assert_eq!(calls[0].1, None);
        assert_eq!(calls[1].1.as_deref(), Some("more"));
    }

    #[tokio::test]
    async fn one_metrics_batch_per_page() {
        let source = FakeSource::new(
            "us-east-1",
            vec![
                page(&["a", "b", "c"], Some("page-2")),
                page(&["d", "e"], Some("page-3")),
                page(&["f"], None),
            ],
        );

        let records = list_in_region(&source, "us-east-1", false, Utc::now())
            .await
            .unwrap();

        assert_eq!(source.listing_calls(), 3);
        assert_eq!(names(&records), vec!["a", "b", "c", "d", "e", "f"]);

        let batches = source.metric_calls.lock().unwrap();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[1], vec!["d".to_string(), "e".to_string()]);
    }

    #[tokio::test]
    async fn empty_page_stops_listing() {
        let source = FakeSource::new("us-east-1", vec![page(&[], Some("dangling"))]);

        let records = list_in_region(&source, "us-east-1", false, Utc::now())
            .await
            .unwrap();

        assert!(records.is_empty());
        assert_eq!(source.listing_calls(), 1);
        assert!(source.metric_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn functions_without_metrics_are_inactive() {
        let now = Utc::now();
        let mut source = FakeSource::new("us-east-1", vec![page(&["idle", "busy"], None)]);
        source
            .invoked
            .insert("busy".into(), now - TimeDelta::hours(2));

        let all = list_in_region(&source, "us-east-1", false, now).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].last_used, INACTIVE);
        assert_eq!(all[1].last_used, "2 hours ago");
        assert_eq!(all[0].memory_size, 128);

        source.calls.lock().unwrap().clear();

        let inactive = list_in_region(&source, "us-east-1", true, now).await.unwrap();
        assert_eq!(names(&inactive), vec!["idle"]);
    }

    #[tokio::test]
    async fn aggregates_every_region_in_order() {
        let regions: Vec<String> = ["us-east-1", "eu-west-1", "ap-south-1"]
            .iter()
            .map(|r| r.to_string())
            .collect();

        let logs: Arc<Mutex<Vec<Arc<Mutex<Vec<(String, Option<String>)>>>>>> =
            Default::default();

        let records = list_in_all_regions(&regions, false, Utc::now(), |region| {
            let pages = match region {
                "eu-west-1" => vec![page(&["eu-1"], Some("next")), page(&["eu-2"], None)],
                "ap-south-1" => vec![page(&[], None)],
                _ => vec![page(&["us-1"], None)],
            };

            let source = FakeSource::new(region, pages);
            logs.lock().unwrap().push(source.calls.clone());
            source
        })
        .await
        .unwrap();

        assert_eq!(names(&records), vec!["us-1", "eu-1", "eu-2"]);
        assert_eq!(records[1].region, "eu-west-1");

        let per_region: Vec<usize> = logs
            .lock()
            .unwrap()
            .iter()
            .map(|log| log.lock().unwrap().len())
            .collect();

        assert_eq!(per_region, vec![1, 2, 1]);
    }

    #[tokio::test]
    async fn regions_are_listed_concurrently() {
        let regions: Vec<String> = ["us-east-1", "eu-west-1", "ap-south-1"]
            .iter()
            .map(|r| r.to_string())
            .collect();

        let gate = Arc::new(Barrier::new(regions.len()));

        let listing = list_in_all_regions(&regions, false, Utc::now(), |region| GatedSource {
            region: region.to_string(),
            gate: gate.clone(),
        });

        // One region at a time would wait at the barrier forever
        let records = tokio::time::timeout(Duration::from_secs(5), listing)
            .await
            .expect("regions were listed one after another")
            .unwrap();

        assert_eq!(names(&records), vec!["us-east-1", "eu-west-1", "ap-south-1"]);
    }

    #[tokio::test]
    async fn one_failing_region_fails_everything() {
        let regions = vec!["us-east-1".to_string()];

        let result =
            list_in_all_regions(&regions, false, Utc::now(), |_| BrokenSource).await;

        assert!(result.is_err());
    }
}
