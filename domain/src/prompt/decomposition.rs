//! Prompts used by domain handlers to break tasks down

use crate::orchestration::entities::{ExecutorKind, TaskDefinition};

/// Templates for task decomposition
pub struct DecompositionPromptTemplate;

impl DecompositionPromptTemplate {
    /// Name of the handler responsible for `domain`
    pub fn handler_name(domain: &str) -> String {
        format!("{}DomainLead", domain)
    }

    /// Domain-specific guidance for the standard domains; empty otherwise
    pub fn domain_guidance(domain: &str) -> &'static str {
        match domain {
            "Development" => {
                r#"You are the Lead Developer.
Focus on clean, maintainable code and test-driven development.
When breaking down tasks:
1. Always include an IMPLEMENTATION task ("coder")
2. Always include a TEST task ("tester")
3. Ensure the tests cover the implementation"#
            }
            "QA" => {
                r#"You are the QA Domain Lead.
When breaking down tasks, prioritize:
1. Unit tests for individual components
2. Integration tests for workflows
3. Regression tests for critical paths
Delegate all test writing to the "tester" executor."#
            }
            "Documentation" => {
                r#"You are the Lead Technical Writer.
Keep documentation accurate and in sync with the code.
When breaking down tasks:
1. Always include a WRITING task ("writer")
2. If code analysis is needed, include a small "research" task first"#
            }
            _ => "",
        }
    }

    /// System prompt for the `domain` handler
    pub fn system(domain: &str) -> String {
        let mut prompt = format!(
            r#"You are the {domain} Domain Lead.

Your goal: convert high-level tasks into atomic subtasks for executors.
You do NOT write code yourself. You delegate to executors."#,
            domain = domain
        );
        let guidance = Self::domain_guidance(domain);
        if !guidance.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(guidance);
        }
        prompt
    }

    /// The break-down request for `task`
    pub fn break_down(task: &TaskDefinition, domain: &str) -> String {
        let executors = ExecutorKind::ALL
            .iter()
            .map(|k| format!("- \"{}\": {}", k.as_str(), k.executor_name()))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"BREAK DOWN this high-level task into atomic subtasks for executors.

Task: {description}
Domain: {domain}

Available executors:
{executors}

Return a JSON list of objects with:
- description: specific instruction for the executor
- executor_type: one of the executor names above
- task_id: a unique subtask id (e.g. "{task_id}_sub1")

Example:
[
  {{"description": "Write a function to...", "executor_type": "coder", "task_id": "{task_id}_sub1"}},
  {{"description": "Write a test for...", "executor_type": "tester", "task_id": "{task_id}_sub2"}}
]

RETURN ONLY JSON. NO MARKDOWN."#,
            description = task.description,
            domain = domain,
            executors = executors,
            task_id = task.task_id,
        )
    }

    /// Appended to the prompt after a failed attempt
    pub fn retry_suffix(error: &str) -> String {
        format!(
            "\n\nPREVIOUS ATTEMPT FAILED: {}. PLEASE FIX JSON FORMAT.",
            error
        )
    }
}
