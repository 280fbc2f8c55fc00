use crate::grpc::api;

use super::JobId;

/// Running sums over one metrics upload.
///
/// Samples are folded in as they arrive so an upload of any length is
/// summarized in constant memory. Samples for different jobs are averaged
/// together.
#[derive(Clone, Debug, Default)]
pub struct Aggregate {
    job_id: Option<JobId>,
    count: u64,
    cpu_sum: f64,
    memory_sum: f64,
}

impl Aggregate {
    pub fn record(&mut self, sample: api::JobMetrics) {
        self.job_id = Some(sample.id.into());
        self.count += 1;
        self.cpu_sum += sample.cpu_usage_percent;
        self.memory_sum += sample.memory_usage_mb;
    }

    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Close the aggregate. With no samples both averages are zero.
    #[allow(clippy::cast_precision_loss)]
    pub fn summarize(self) -> MetricsSummary {
        let mean = |sum: f64| {
            if self.count == 0 {
                0.0
            } else {
                sum / self.count as f64
            }
        };

        MetricsSummary {
            avg_cpu_usage_percent: mean(self.cpu_sum),
            avg_memory_usage_mb: mean(self.memory_sum),
            job_id: self.job_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MetricsSummary {
    /// The job of the last sample received, if any.
    pub job_id: Option<JobId>,
    pub avg_cpu_usage_percent: f64,
    pub avg_memory_usage_mb: f64,
}

impl From<MetricsSummary> for api::MetricsSummary {
    fn from(summary: MetricsSummary) -> Self {
        api::MetricsSummary {
            id: summary.job_id.map(Into::into).unwrap_or_default(),
            avg_cpu_usage_percent: summary.avg_cpu_usage_percent,
            avg_memory_usage_mb: summary.avg_memory_usage_mb,
        }
    }
}
