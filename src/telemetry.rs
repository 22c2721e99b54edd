use indicatif::{ProgressBar, ProgressStyle};

/// Statistics aggregated over the batches of one load
#[derive(Debug, Default, Clone)]
pub struct ProgressStats {
    pub batches_loaded: usize,
    pub records_loaded: u64,
    pub batch_durations_ms: Vec<u64>,
}

impl ProgressStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one written batch
    pub fn record_batch(&mut self, records_loaded: u64, duration_ms: u64) {
        self.batches_loaded += 1;
        self.records_loaded += records_loaded;
        self.batch_durations_ms.push(duration_ms);
    }

    /// Calculate percentile from batch durations
    pub fn percentile(&self, p: f64) -> Option<u64> {
        if self.batch_durations_ms.is_empty() {
            return None;
        }

        let mut sorted = self.batch_durations_ms.clone();
        sorted.sort_unstable();

        let index = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
        let index = index.saturating_sub(1).min(sorted.len() - 1);

        Some(sorted[index])
    }

    /// Get p50, p90, p99 percentiles
    pub fn get_percentiles(&self) -> (Option<u64>, Option<u64>, Option<u64>) {
        (
            self.percentile(50.0),
            self.percentile(90.0),
            self.percentile(99.0),
        )
    }
}

/// Terminal progress bar for a batched load
pub struct LoadProgress {
    bar: ProgressBar,
}

impl LoadProgress {
    /// Create a bar over `total_rows`; hidden when `quiet`
    pub fn new(label: &str, total_rows: u64, quiet: bool) -> Self {
        if quiet {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let template = format!(
            "[{{elapsed_precise}}] {}: [{{bar:30.green/blue}}] {{human_pos}}/{{human_len}} ({{percent}}%) | {{per_sec}} | {{msg}}",
            label
        );
        let style = ProgressStyle::default_bar()
            .template(&template)
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());

        let bar = ProgressBar::new(total_rows);
        bar.set_style(style);
        Self { bar }
    }

    /// Refresh the bar from the current stats
    pub fn update(&self, stats: &ProgressStats) {
        self.bar.set_position(stats.records_loaded);

        if let (Some(p50), Some(p90), Some(p99)) = stats.get_percentiles() {
            self.bar
                .set_message(format!("batch p50: {}ms, p90: {}ms, p99: {}ms", p50, p90, p99));
        }
    }

    pub fn finish(&self) {
        self.bar.finish();
    }
}
