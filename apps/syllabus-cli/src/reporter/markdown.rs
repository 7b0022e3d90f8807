//! Markdown reporter

use std::fmt::Write;

use anyhow::Result;
use syllabus_report::{
    AlignmentReport, ChangeFilter, ChangeReport, NormalizedReport, SimilarityReport,
};

use super::RenderedReport;

pub struct MarkdownReporter;

impl MarkdownReporter {
    pub fn format(rendered: &RenderedReport) -> Result<String> {
        let mut output = String::new();

        let title = match &rendered.report {
            NormalizedReport::Alignment(_) => "Paper Alignment",
            NormalizedReport::Changes(_) => "Syllabus Changes",
            NormalizedReport::Mapping(_) => "Syllabus Mapping",
        };
        writeln!(output, "# {}", title)?;
        writeln!(output)?;
        writeln!(output, "- **Source:** {}", rendered.origin)?;
        writeln!(output, "- **Loaded:** {}", rendered.loaded_at.to_rfc3339())?;
        writeln!(output)?;

        match &rendered.report {
            NormalizedReport::Alignment(report) => Self::format_alignment(&mut output, report)?,
            NormalizedReport::Changes(report) => {
                Self::format_changes(&mut output, report, rendered.filter)?
            }
            NormalizedReport::Mapping(Some(report)) => Self::format_mapping(&mut output, report)?,
            NormalizedReport::Mapping(None) => writeln!(output, "_No mapping report available._")?,
        }

        Ok(output)
    }

    fn format_alignment(output: &mut String, report: &AlignmentReport) -> Result<()> {
        let summary = &report.summary;
        writeln!(output, "## Summary")?;
        writeln!(output)?;
        writeln!(output, "| Total | Aligned | Needs Review | Out of Syllabus |")?;
        writeln!(output, "|------:|--------:|-------------:|----------------:|")?;
        writeln!(
            output,
            "| {} | {} | {} | {} |",
            summary.total, summary.aligned, summary.need_review, summary.out_of_scope
        )?;
        writeln!(output)?;

        if report.is_empty() {
            writeln!(output, "_No questions to display._")?;
            return Ok(());
        }

        writeln!(output, "## Questions")?;
        writeln!(output)?;
        writeln!(output, "| Q | Topic | Status | Confidence | Notes |")?;
        writeln!(output, "|--:|-------|--------|-----------:|-------|")?;
        for record in &report.records {
            writeln!(
                output,
                "| {} | {} | {} | {} ({:.0}%) | {} |",
                record.question_number,
                cell(&record.topic),
                record.status.label(),
                record.confidence_level().label(),
                record.confidence * 100.0,
                record.elaboration.as_deref().map(cell).unwrap_or_default(),
            )?;
        }
        writeln!(output)?;

        writeln!(output, "## Topic Coverage")?;
        writeln!(output)?;
        writeln!(output, "| Topic | Questions | Share | Color |")?;
        writeln!(output, "|-------|----------:|------:|-------|")?;
        for slice in &report.coverage {
            writeln!(
                output,
                "| {} | {} | {:.1}% | `{}` |",
                cell(&slice.topic),
                slice.count,
                slice.share_percent(summary.total),
                slice.color
            )?;
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
                let label = format!("{} ({})", tab.label(), report.summary.count_for(*tab));
                if *tab == filter {
                    format!("**{}**", label)
                } else {
                    label
                }
            })
            .collect();
        writeln!(output, "{}", tabs.join(" · "))?;
        writeln!(output)?;

        let visible = report.filtered(filter);
        if visible.is_empty() {
            writeln!(output, "_No changes detected._")?;
            return Ok(());
        }

        for record in visible {
            writeln!(output, "### {} ({})", record.title, record.status.label())?;
            writeln!(output)?;
            if !record.summary.is_empty() {
                writeln!(output, "{}", record.summary)?;
                writeln!(output)?;
            }
            if let Some(old) = &record.old_summary {
                writeln!(output, "- **Old:** {}", old)?;
            }
            if let Some(new) = &record.new_summary {
                writeln!(output, "- **New:** {}", new)?;
            }
            if record.old_summary.is_some() || record.new_summary.is_some() {
                writeln!(output)?;
            }
        }

        Ok(())
    }

    fn format_mapping(output: &mut String, report: &SimilarityReport) -> Result<()> {
        writeln!(output, "**Similarity:** {} ({})", report.score_text(), report.label)?;
        writeln!(output)?;

        let justification = &report.justification;
        if let Some(overview) = &justification.overview {
            writeln!(output, "## Overview")?;
            writeln!(output)?;
            writeln!(output, "{}", overview)?;
            writeln!(output)?;
        }
        for (heading, items) in [
            ("Key Similarities", &justification.key_similarities),
            ("Key Differences", &justification.key_differences),
        ] {
            if items.is_empty() {
                continue;
            }
            writeln!(output, "## {}", heading)?;
            writeln!(output)?;
            for item in items {
                writeln!(output, "- {}", item)?;
            }
            writeln!(output)?;
        }
        if let Some(recommendation) = &justification.recommendation {
            writeln!(output, "## Recommendation")?;
            writeln!(output)?;
            writeln!(output, "{}", recommendation)?;
        }

        Ok(())
    }
}

/// Escape text for a table cell
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
