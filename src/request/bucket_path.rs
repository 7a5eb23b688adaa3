//! Pipeline bucket paths
//!
//! Scope segments and dimension names are joined with `>`; the metric is
//! appended after a `.` (`finance_symbols>ipo_year.sum_this_year`).

/// Separator between aggregation levels
pub const AGG_SEPARATOR: &str = ">";
/// Separator before the metric name
pub const METRIC_SEPARATOR: &str = ".";

/// Builds a bucket path from level names and a metric
pub fn bucket_path<S: AsRef<str>>(levels: &[S], metric: &str) -> String {
    if levels.is_empty() {
        return metric.to_string();
    }
    let joined: Vec<&str> = levels.iter().map(|s| s.as_ref()).collect();
    format!("{}{}{}", joined.join(AGG_SEPARATOR), METRIC_SEPARATOR, metric)
}

/// Metric name → bucket path, relative to some aggregation level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketPaths {
    entries: Vec<(String, String)>,
}

impl BucketPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a path; the first definition of a metric wins
    pub fn insert(&mut self, metric: impl Into<String>, path: impl Into<String>) {
        let metric = metric.into();
        if self.get(&metric).is_none() {
            self.entries.push((metric, path.into()));
        }
    }

    pub fn extend(&mut self, other: BucketPaths) {
        for (metric, path) in other.entries {
            self.insert(metric, path);
        }
    }

    pub fn get(&self, metric: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(m, _)| m == metric)
            .map(|(_, p)| p.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(m, p)| (m.as_str(), p.as_str()))
    }

    /// Re-roots every path beneath `levels` (`a>b` + `x.m` → `a>b>x.m`)
    pub fn nested_under<S: AsRef<str>>(self, levels: &[S]) -> BucketPaths {
        if levels.is_empty() {
            return self;
        }
        let prefix: Vec<&str> = levels.iter().map(|s| s.as_ref()).collect();
        let prefix = prefix.join(AGG_SEPARATOR);
        BucketPaths {
            entries: self
                .entries
                .into_iter()
                .map(|(metric, path)| (metric, format!("{}{}{}", prefix, AGG_SEPARATOR, path)))
                .collect(),
        }
    }
}
