//! Console reporter
//!
//! Box tables for question rows, tab counts for the change list and a
//! text progress bar for the similarity score.

use std::fmt::Write;

use anyhow::Result;
use syllabus_report::{
    AlignmentReport, AlignmentStatus, ChangeFilter, ChangeReport, ChangeStatus, MappingTier,
    NormalizedReport, SimilarityReport,
};

use super::{fit, RenderedReport};

const RULE: &str = "────────────────────────────────────────────────────────────────";
const BAR_WIDTH: usize = 30;
const TOPIC_WIDTH: usize = 28;

pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn format(rendered: &RenderedReport) -> Result<String> {
        let mut output = String::new();

        let title = match &rendered.report {
            NormalizedReport::Alignment(_) => "PAPER ALIGNMENT",
            NormalizedReport::Changes(_) => "SYLLABUS CHANGES",
            NormalizedReport::Mapping(_) => "SYLLABUS MAPPING",
        };

        writeln!(output)?;
        writeln!(output, "╔══════════════════════════════════════════════════════════════╗")?;
        writeln!(output, "║{:^62}║", title)?;
        writeln!(output, "╚══════════════════════════════════════════════════════════════╝")?;
        writeln!(output)?;
        writeln!(output, "Source:  {}", rendered.origin)?;
        writeln!(
            output,
            "Loaded:  {}",
            rendered.loaded_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(output)?;

        match &rendered.report {
            NormalizedReport::Alignment(report) => Self::format_alignment(&mut output, report)?,
            NormalizedReport::Changes(report) => {
                Self::format_changes(&mut output, report, rendered.filter)?
            }
            NormalizedReport::Mapping(Some(report)) => Self::format_mapping(&mut output, report)?,
            NormalizedReport::Mapping(None) => {
                writeln!(output, "No mapping report available.")?;
            }
        }

        writeln!(output)?;
        Ok(output)
    }

    fn format_alignment(output: &mut String, report: &AlignmentReport) -> Result<()> {
        let summary = &report.summary;
        writeln!(output, "Summary:")?;
        writeln!(output, "  Total Questions:  {}", summary.total)?;
        for status in AlignmentStatus::ALL {
            let label = format!("{}:", status.label());
            writeln!(output, "  {:<18}{}", label, summary.count(status))?;
        }
        writeln!(output)?;

        if report.is_empty() {
            writeln!(output, "No questions to display.")?;
            return Ok(());
        }

        writeln!(output, "  ┌──────┬──────────────────────────────┬─────────────────┬─────────────┐")?;
        writeln!(output, "  │  Q   │ Topic                        │ Status          │ Confidence  │")?;
        writeln!(output, "  ├──────┼──────────────────────────────┼─────────────────┼─────────────┤")?;
        for record in &report.records {
            writeln!(
                output,
                "  │ {:>4} │ {:<w$} │ {} {:<13} │ {:<6} {:>3.0}% │",
                record.question_number,
                fit(&record.topic, TOPIC_WIDTH),
                status_symbol(record.status),
                record.status.label(),
                record.confidence_level().label(),
                record.confidence * 100.0,
                w = TOPIC_WIDTH,
            )?;
        }
        writeln!(output, "  └──────┴──────────────────────────────┴─────────────────┴─────────────┘")?;
        writeln!(output)?;

        writeln!(output, "Topic Coverage:")?;
        for slice in &report.coverage {
            writeln!(
                output,
                "  ■ {}  {:<w$} {:>3}  ({:.1}%)",
                slice.color,
                fit(&slice.topic, TOPIC_WIDTH),
                slice.count,
                slice.share_percent(summary.total),
                w = TOPIC_WIDTH,
            )?;
        }

        let detailed: Vec<_> = report.records.iter().filter(|r| r.has_details()).collect();
        if !detailed.is_empty() {
            writeln!(output)?;
            writeln!(output, "Details:")?;
            for record in detailed {
                if let Some(elaboration) = &record.elaboration {
                    writeln!(output, "  Q{}: {}", record.question_number, elaboration)?;
                }
            }
        }

        Ok(())
    }

    fn format_changes(
        output: &mut String,
        report: &ChangeReport,
        filter: ChangeFilter,
    ) -> Result<()> {
        let tabs: Vec<String> = ChangeFilter::ALL
            .iter()
            .map(|tab| {
                let label = format!("{} {}", tab.label(), report.summary.count_for(*tab));
                if *tab == filter {
                    format!("[{}]", label)
                } else {
                    format!(" {} ", label)
                }
            })
            .collect();
        writeln!(output, "Filter: {}", tabs.join(" "))?;
        writeln!(output, "{}", RULE)?;

        let visible = report.filtered(filter);
        if visible.is_empty() {
            writeln!(output, "No changes detected.")?;
            return Ok(());
        }

        for record in visible {
            writeln!(
                output,
                "{} {:<9} {}",
                change_symbol(record.status),
                record.status.label(),
                record.title
            )?;
            if !record.summary.is_empty() {
                writeln!(output, "    {}", record.summary)?;
            }
            if let Some(old) = &record.old_summary {
                writeln!(output, "    Old: {}", old)?;
            }
            if let Some(new) = &record.new_summary {
                writeln!(output, "    New: {}", new)?;
            }
        }
        writeln!(output, "{}", RULE)?;

        Ok(())
    }

    fn format_mapping(output: &mut String, report: &SimilarityReport) -> Result<()> {
        let filled = (report.progress_width() / 100.0 * BAR_WIDTH as f64).round() as usize;
        let bar = format!(
            "{}{}",
            "█".repeat(filled),
            "░".repeat(BAR_WIDTH.saturating_sub(filled))
        );
        let pill = match report.tier() {
            MappingTier::High => "●",
            MappingTier::Partial => "◐",
        };

        writeln!(output, "Similarity:  [{}] {}", bar, report.score_text())?;
        writeln!(output, "Mapping:     {} {}", pill, report.label)?;
        writeln!(output)?;

        let justification = &report.justification;
        if justification.is_empty() {
            writeln!(output, "No justification provided.")?;
            return Ok(());
        }

        if let Some(overview) = &justification.overview {
            writeln!(output, "Overview:")?;
            writeln!(output, "  {}", overview)?;
            writeln!(output)?;
        }
        if !justification.key_similarities.is_empty() {
            writeln!(output, "Key Similarities:")?;
            for item in &justification.key_similarities {
                writeln!(output, "  ✓ {}", item)?;
            }
            writeln!(output)?;
        }
        if !justification.key_differences.is_empty() {
            writeln!(output, "Key Differences:")?;
            for item in &justification.key_differences {
                writeln!(output, "  ✗ {}", item)?;
            }
            writeln!(output)?;
        }
        if let Some(recommendation) = &justification.recommendation {
            writeln!(output, "Recommendation:")?;
            writeln!(output, "  {}", recommendation)?;
        }

        Ok(())
    }
}

fn status_symbol(status: AlignmentStatus) -> &'static str {
    match status {
        AlignmentStatus::Aligned => "✓",
        AlignmentStatus::NeedsReview => "?",
        AlignmentStatus::OutOfScope => "✗",
    }
}

fn change_symbol(status: ChangeStatus) -> &'static str {
    match status {
        ChangeStatus::Added => "+",
        ChangeStatus::Removed => "-",
        ChangeStatus::Modified => "~",
    }
}
