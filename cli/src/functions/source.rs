use super::metrics::{invocation_queries, names_by_id};
use crate::error::Error;
use aws_config::{Region, SdkConfig};
use aws_sdk_cloudwatch::primitives::DateTime as AwsDateTime;
use aws_sdk_cloudwatch::types::ScanBy;
use chrono::{DateTime, TimeDelta, Utc};
use eyre::Context;
use std::collections::HashMap;

/// Page size of ListFunctions
const PAGE_SIZE: i32 = 50;

/// How far back invocations are looked up
const LOOKBACK_DAYS: i64 = 30;

/// Function properties as returned by the listing
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FunctionSummary {
    pub(crate) name: String,
    pub(crate) runtime: String,
    pub(crate) memory_size: i32,
    pub(crate) code_size: i64,
    pub(crate) last_modified: String,
}

/// One page of the listing
#[derive(Debug, Clone, Default)]
pub(crate) struct FunctionPage {
    pub(crate) functions: Vec<FunctionSummary>,
    pub(crate) next_marker: Option<String>,
}

/// Functions and their usage metrics in a single region
pub(crate) trait FunctionSource {
    /// List one page of functions, starting after the marker
    async fn list_functions(&self, marker: Option<String>) -> eyre::Result<FunctionPage>;

    /// Most recent invocation hour per function name within the lookback window
    ///
    /// Functions without invocations map to None.
    async fn last_invocations(
        &self,
        function_names: &[String],
    ) -> eyre::Result<HashMap<String, Option<DateTime<Utc>>>>;
}

/// Lambda and CloudWatch clients bound to one region
pub(crate) struct AwsFunctionSource {
    region: String,
    lambda: aws_sdk_lambda::Client,
    cloudwatch: aws_sdk_cloudwatch::Client,
}

impl AwsFunctionSource {
    pub(crate) fn new(config: &SdkConfig, region: &str) -> Self {
        let lambda = aws_sdk_lambda::config::Builder::from(config)
            .region(Region::new(region.to_string()))
            .build();

        let cloudwatch = aws_sdk_cloudwatch::config::Builder::from(config)
            .region(Region::new(region.to_string()))
            .build();

        AwsFunctionSource {
            region: region.to_string(),
            lambda: aws_sdk_lambda::Client::from_conf(lambda),
            cloudwatch: aws_sdk_cloudwatch::Client::from_conf(cloudwatch),
        }
    }
}

impl FunctionSource for AwsFunctionSource {
    async fn list_functions(&self, marker: Option<String>) -> eyre::Result<FunctionPage> {
        log::debug!("Listing functions in {} after {marker:?}", self.region);

        let output = self
            .lambda
            .list_functions()
            .set_marker(marker)
            .max_items(PAGE_SIZE)
            .send()
            .await
            .wrap_err(Error::upstream(
                "Failed to list Lambda functions",
                Some(&format!("Region {}", self.region)),
            ))?;

        let functions = output
            .functions()
            .iter()
            .map(|f| FunctionSummary {
                name: f.function_name().unwrap_or_default().to_string(),
                runtime: f
                    .runtime()
                    .map(|r| r.as_str().to_string())
                    .unwrap_or_else(|| "-".into()),
                memory_size: f.memory_size().unwrap_or_default(),
                code_size: f.code_size(),
                last_modified: f.last_modified().unwrap_or_default().to_string(),
            })
            .collect();

        Ok(FunctionPage {
            functions,
            next_marker: output.next_marker().map(str::to_string),
        })
    }

    async fn last_invocations(
        &self,
        function_names: &[String],
    ) -> eyre::Result<HashMap<String, Option<DateTime<Utc>>>> {
        let queries = invocation_queries(function_names);
        let names = names_by_id(&queries);

        let metric_queries: Vec<_> = queries.iter().map(|q| q.to_query()).collect();

        let end = Utc::now();
        let start = end - TimeDelta::days(LOOKBACK_DAYS);

        let mut latest: HashMap<String, Option<DateTime<Utc>>> = function_names
            .iter()
            .map(|name| (name.clone(), None))
            .collect();

        let mut next_token = None;

        // Results are paginated when there are too many datapoints
        loop {
            let output = self
                .cloudwatch
                .get_metric_data()
                .start_time(AwsDateTime::from_secs(start.timestamp()))
                .end_time(AwsDateTime::from_secs(end.timestamp()))
                .scan_by(ScanBy::TimestampDescending)
                .set_metric_data_queries(Some(metric_queries.clone()))
                .set_next_token(next_token)
                .send()
                .await
                .wrap_err(Error::upstream(
                    "Failed to fetch invocation metrics",
                    Some(&format!("Region {}", self.region)),
                ))?;

            for result in output.metric_data_results() {
                let Some(name) = result.id().and_then(|id| names.get(id)) else {
                    log::warn!("Unexpected metric result {:?}", result.id());
                    continue;
                };

                let newest = result
                    .timestamps()
                    .iter()
                    .filter_map(|ts| DateTime::<Utc>::from_timestamp(ts.secs(), ts.subsec_nanos()))
                    .max();

                if let Some(entry) = latest.get_mut(name) {
                    *entry = (*entry).max(newest);
                }
            }

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(latest)
    }
}
