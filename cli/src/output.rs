//! Console output for plan results

use colored::Colorize;
use ube_domain::{DomainTaskResult, PlanExecutionResult, PlanStatus, ReportStatus};

/// Formats plan results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Per-task summary, followed by any failure details
    pub fn format_summary(result: &PlanExecutionResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {}  {}\n",
            "Plan:".cyan().bold(),
            result.plan_id,
            Self::plan_status(result.status)
        ));
        output.push_str(&format!(
            "{} {} total, {} completed, {} failed, {} pending ({} ms)\n",
            "Tasks:".cyan().bold(),
            result.total_tasks,
            result.completed,
            result.failed,
            result.pending,
            result.execution_time_ms
        ));

        for task in &result.results {
            output.push('\n');
            output.push_str(&Self::format_task(task));
        }

        if !result.failed_details.is_empty() {
            output.push_str(&format!("\n{}\n", "Failures:".red().bold()));
            for detail in &result.failed_details {
                output.push_str(&format!(
                    "  * {} [{}]: {}\n",
                    detail.task_id, detail.domain, detail.error
                ));
            }
        }

        output
    }

    fn format_task(task: &DomainTaskResult) -> String {
        let mut output = format!(
            "{} {}\n  {}\n",
            format!("── {} ──", task.task_id).yellow().bold(),
            Self::report_status(task.status),
            task.summary
        );

        if let Some(batch) = &task.tlb_result {
            for report in &batch.reports {
                output.push_str(&format!(
                    "  - {} ({}) {}\n",
                    report.task_id,
                    report.executor_name,
                    Self::report_status(report.status)
                ));
                if let Some(error) = &report.error_message {
                    output.push_str(&format!("      {}\n", error));
                } else if let Some(artifact) = report.artifact() {
                    for line in artifact.lines().take(5) {
                        output.push_str(&format!("      {}\n", line));
                    }
                }
            }
        }

        output
    }

    /// Format as JSON
    pub fn format_json(result: &PlanExecutionResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    fn plan_status(status: PlanStatus) -> String {
        let label = status.to_string();
        match status {
            PlanStatus::Completed => label.green().bold().to_string(),
            PlanStatus::Failed => label.red().bold().to_string(),
            PlanStatus::Cancelled => label.yellow().bold().to_string(),
        }
    }

    fn report_status(status: ReportStatus) -> String {
        let label = status.to_string();
        match status {
            ReportStatus::Completed => label.green().to_string(),
            ReportStatus::Failed => label.red().to_string(),
            ReportStatus::Pending => label.yellow().to_string(),
        }
    }
}
