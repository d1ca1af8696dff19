use super::AppContext;
use crate::output::Output;
use color_eyre::Result;
use curator_core::{task_by_name, Task, TASK_NAMES};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

/// A task plus the guard that keeps its runs from overlapping
struct ScheduledTask {
    task: Box<dyn Task>,
    running: Mutex<()>,
}

impl ScheduledTask {
    async fn run(&self, trigger: &str) {
        let Ok(_guard) = self.running.try_lock() else {
            warn!(
                operation = "scheduled_run",
                task = self.task.name(),
                trigger = trigger,
                "Previous run still in progress, skipping this trigger"
            );
            return;
        };

        info!(operation = "scheduled_run_start", task = self.task.name(), trigger = trigger, "Starting task");
        match self.task.run().await {
            Ok(summary) => {
                info!(
                    operation = "scheduled_run_complete",
                    task = self.task.name(),
                    found = summary.found,
                    processed = summary.processed,
                    skipped = summary.skipped,
                    "Task completed"
                );
            }
            Err(e) if e.is_config_incomplete() => {
                info!(operation = "scheduled_run_skipped", task = self.task.name(), reason = %e, "Task skipped");
            }
            Err(e) => {
                error!(operation = "scheduled_run_error", task = self.task.name(), error = %e, "Task failed");
            }
        }
    }
}

pub async fn run_daemon(mut ctx: AppContext, output: &Output) -> Result<()> {
    let collaborators = ctx.collaborators()?;

    let tasks: Vec<Arc<ScheduledTask>> = TASK_NAMES
        .iter()
        .filter_map(|name| task_by_name(name, &ctx.config, &collaborators))
        .filter(|task| task.is_enabled())
        .map(|task| Arc::new(ScheduledTask { task, running: Mutex::new(()) }))
        .collect();

    if tasks.is_empty() {
        output.warn("No tasks are enabled; nothing to schedule");
        return Ok(());
    }

    let mut scheduler = JobScheduler::new()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create scheduler: {}", e))?;

    for scheduled in &tasks {
        let (cron, is_default) = scheduled.task.describe_schedule();
        let job_task = scheduled.clone();
        let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
            let task = job_task.clone();
            Box::pin(async move {
                task.run("cron").await;
            })
        })
        .map_err(|e| {
            color_eyre::eyre::eyre!("Invalid schedule '{}' for {}: {}", cron, scheduled.task.name(), e)
        })?;
        scheduler
            .add(job)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to register {}: {}", scheduled.task.name(), e))?;

        info!(
            operation = "scheduler_register",
            task = scheduled.task.name(),
            schedule = %cron,
            default_schedule = is_default,
            "Task scheduled (UTC)"
        );
        output.info(format!(
            "{}: {}{}",
            scheduled.task.name(),
            cron,
            if is_default { " (default)" } else { "" }
        ));
    }

    run_once_tasks(&mut ctx, &tasks).await;

    scheduler
        .start()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to start scheduler: {}", e))?;
    info!(operation = "scheduler_started", tasks = tasks.len(), "Scheduler started");

    tokio::signal::ctrl_c().await?;
    info!(operation = "scheduler_shutdown", "Shutdown requested");
    scheduler
        .shutdown()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to stop scheduler: {}", e))?;
    Ok(())
}

/// Run every task flagged `run_once`, then clear the flags in the config file
async fn run_once_tasks(ctx: &mut AppContext, tasks: &[Arc<ScheduledTask>]) {
    let mut changed = false;
    for scheduled in tasks {
        if ctx.config.clear_run_once(scheduled.task.name()) {
            scheduled.run("run_once").await;
            changed = true;
        }
    }

    if changed {
        if let Err(e) = ctx.config.save_to_file(&ctx.config_path) {
            error!(
                operation = "run_once_clear",
                path = %ctx.config_path.display(),
                error = %e,
                "Failed to persist cleared run_once flags"
            );
        } else {
            info!(operation = "run_once_clear", "Cleared run_once flags");
        }
    }
}
