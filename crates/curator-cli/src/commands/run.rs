use super::progress::TaskProgress;
use super::AppContext;
use crate::output::{Output, OutputFormat};
use crate::TaskName;
use color_eyre::Result;
use curator_core::task_by_name;
use tracing::error;

pub async fn run_task(name: TaskName, ctx: &AppContext, output: &Output) -> Result<()> {
    let collaborators = ctx.collaborators()?;
    let task = task_by_name(name.as_str(), &ctx.config, &collaborators)
        .ok_or_else(|| color_eyre::eyre::eyre!("Unknown task: {}", name.as_str()))?;

    let progress = TaskProgress::start(task.name(), output.format() == OutputFormat::Human && !output.is_quiet());
    let result = task.run().await;
    progress.finish();

    match result {
        Ok(summary) => {
            output.summary(&summary);
            Ok(())
        }
        Err(e) if e.is_config_incomplete() => {
            output.warn(format!("[{}] skipped: {}", task.name(), e));
            Ok(())
        }
        Err(e) => {
            error!(operation = "task_run", task = task.name(), error = %e, "Task run failed");
            output.error(format!("[{}] run failed: {}", task.name(), e));
            Err(color_eyre::eyre::eyre!("Task {} failed: {}", task.name(), e))
        }
    }
}
