use aws_sdk_cloudwatch::types::{Dimension, Metric, MetricDataQuery, MetricStat};
use std::collections::HashMap;

const NAMESPACE: &str = "AWS/Lambda";
const METRIC_NAME: &str = "Invocations";
const DIMENSION_NAME: &str = "FunctionName";
const ONE_HOUR_IN_SECONDS: i32 = 60 * 60;

/// Hourly sum of invocations of one function
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MetricQuery {
    /// Positional id, function names do not always fit the id grammar of CloudWatch
    pub(crate) id: String,
    pub(crate) label: String,
    pub(crate) dimension: (String, String),
    pub(crate) statistic: String,
    pub(crate) period: i32,
}

impl MetricQuery {
    pub(crate) fn invocations(index: usize, function_name: &str) -> Self {
        MetricQuery {
            id: format!("q{index}"),
            label: function_name.to_string(),
            dimension: (DIMENSION_NAME.to_string(), function_name.to_string()),
            statistic: "Sum".to_string(),
            period: ONE_HOUR_IN_SECONDS,
        }
    }

    pub(crate) fn to_query(&self) -> MetricDataQuery {
        let (name, value) = &self.dimension;

        let metric = Metric::builder()
            .namespace(NAMESPACE)
            .metric_name(METRIC_NAME)
            .dimensions(Dimension::builder().name(name).value(value).build())
            .build();

        let stat = MetricStat::builder()
            .metric(metric)
            .period(self.period)
            .stat(&self.statistic)
            .build();

        MetricDataQuery::builder()
            .id(&self.id)
            .label(&self.label)
            .metric_stat(stat)
            .return_data(true)
            .build()
    }
}

/// One query per function name, in the order of names
pub(crate) fn invocation_queries(function_names: &[String]) -> Vec<MetricQuery> {
    function_names
        .iter()
        .enumerate()
        .map(|(index, name)| MetricQuery::invocations(index, name))
        .collect()
}

/// Map query ids back to the function names they were built for
pub(crate) fn names_by_id(queries: &[MetricQuery]) -> HashMap<String, String> {
    queries
        .iter()
        .map(|q| (q.id.clone(), q.label.clone()))
        .collect()
}
