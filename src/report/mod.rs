//! Human-readable rendering of a pipeline check.


use std::fmt;
use std::fmt::Write as _;
use std::time::Duration;

use crate::time::format_millis;
use crate::BatchReport;
use crate::Document;
use crate::Error;
use crate::Result;
use crate::ResultRecord;
use crate::WatchOutcome;

const EXCERPT_CHARS: usize = 60;
const RULE: &str = "================================================================================";

/// One line telling the operator how the watch ended and what to look at.
pub fn outcome_summary(outcome: &Result<WatchOutcome>) -> String {
    match outcome {
        Ok(WatchOutcome::Completed { new_count }) => {
            format!("All {new_count} results received")
        }
        Ok(WatchOutcome::TimedOut { new_count, expected }) => format!(
            "Timed out: {} of {} results missing ({} received); check the processing stage",
            expected.saturating_sub(*new_count),
            expected,
            new_count
        ),
        Ok(WatchOutcome::Cancelled { new_count, expected }) => {
            format!("Cancelled after {new_count} of {expected} results")
        }
        Err(Error::StoreUnavailable { attempts, source }) => format!(
            "Cannot reach the result store ({attempts} attempts): {source}; check store connectivity"
        ),
        Err(e) => format!("Pipeline check failed: {e}"),
    }
}

/// Numbered listing of results, newest first.
pub fn render_results(results: &[Document<ResultRecord>]) -> String {
    let mut out = String::new();
    for (i, doc) in results.iter().enumerate() {
        let r = &doc.body;
        let _ = writeln!(out, "{}. Movie: {}", i + 1, r.title.as_deref().unwrap_or("Unknown"));
        let _ = writeln!(out, "   Review: {}", excerpt(&r.text));
        let _ = writeln!(out, "   Sentiment: {}", r.label);
        let _ = writeln!(out, "   Confidence: {:.4}", r.confidence);
        let _ = writeln!(out, "   Processed: {}", format_millis(r.processed_at_ms));
        let _ = writeln!(out, "   Model: {}", r.model_version);
    }
    out
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Collection sizes before and after a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountSummary {
    /// (before, after)
    pub incoming: (u64, u64),
    /// (before, after)
    pub results: (u64, u64),
    /// Records the producer managed to insert
    pub submitted: u64,
}

impl CountSummary {
    pub fn new_results(&self) -> u64 {
        self.results.1.saturating_sub(self.results.0)
    }

    /// Fewer results than submitted inputs appeared.
    pub fn results_missing(&self) -> bool {
        self.new_results() < self.submitted
    }
}

impl fmt::Display for CountSummary {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let (ib, ia) = self.incoming;
        let (rb, ra) = self.results;
        writeln!(f, "Incoming records: {} -> {} (+{})", ib, ia, ia.saturating_sub(ib))?;
        write!(f, "Result records:   {} -> {} (+{})", rb, ra, ra.saturating_sub(rb))?;
        if self.results_missing() {
            write!(f, "\nSome results may be missing")?;
        }
        Ok(())
    }
}

/// Everything a pipeline check learned, ready to print.
#[derive(Debug)]
pub struct PipelineReport {
    pub correlation_id: String,
    pub batch: BatchReport,
    pub outcome: Result<WatchOutcome>,
    /// `None` when the counts could not be read
    pub counts: Option<CountSummary>,
    /// Most recent results, listed only on completion
    pub results: Vec<Document<ResultRecord>>,
    pub elapsed: Duration,
}

impl PipelineReport {
    pub fn is_success(&self) -> bool {
        matches!(&self.outcome, Ok(o) if o.is_completed())
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "Pipeline check {}", self.correlation_id)?;
        writeln!(f, "{RULE}")?;
        writeln!(
            f,
            "Submitted {} records, {} rejected",
            self.batch.inserted.len(),
            self.batch.failures.len()
        )?;
        for (position, reason) in &self.batch.failures {
            writeln!(f, "  record {position}: {reason}")?;
        }
        if self.batch.cancelled {
            writeln!(f, "  submission cancelled before the batch was complete")?;
        }
        writeln!(f, "{} (after {:.1}s)", outcome_summary(&self.outcome), self.elapsed.as_secs_f64())?;

        if !self.results.is_empty() {
            writeln!(f, "\nResults:")?;
            writeln!(f, "{RULE}")?;
            write!(f, "{}", render_results(&self.results))?;
        }

        match &self.counts {
            Some(counts) => write!(f, "\nSummary:\n{counts}")?,
            None => write!(f, "\nSummary: counts unavailable")?,
        }
        Ok(())
    }
}
