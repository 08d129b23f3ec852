use std::env;
use std::sync::Arc;

use dotenv::dotenv;
use tracing_subscriber::EnvFilter;
use workforce::prelude::*;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let email = env::var("WORKFORCE_EMAIL").expect("WORKFORCE_EMAIL must be set");
    let password = env::var("WORKFORCE_PASSWORD").expect("WORKFORCE_PASSWORD must be set");

    let toasts = ToastQueue::new();
    let app = Workforce::from_env()?.with_notifier(Arc::new(toasts.clone()));
    app.auth().sign_in_with_password(&email, &password).await?;

    let active = app.queries().active_workers().await?;
    let Some(worker) = active.first() else {
        println!("No active workers; run workers_example first");
        return Ok(());
    };

    // Create a task assigned to the first active worker
    let mut form = EntityForm::create(TaskFormValues {
        title: "Repaint the shed".into(),
        description: "Two coats, exterior".into(),
        worker_id: Some(worker.id),
        priority: TaskPriority::High,
        estimated_hours: "6".into(),
        ..Default::default()
    });
    let tasks = app.mutations::<Task>();
    let task = tasks.submit(&mut form).await?;
    println!("Created task {} ({})", task.title, task.status);

    // Status changes are full-row updates
    let task = tasks.update(&task.with_status(TaskStatus::InProgress)).await?;
    println!("Task is now {}", task.status);

    let mut entry = EntityForm::create(TimeEntryFormValues::for_task(task.id, worker.id));
    entry.values.hours_worked = "2.5".into();
    entry.values.notes = "First coat".into();
    app.mutations::<TimeEntry>().submit(&mut entry).await?;

    let summary = app.queries().task_summary(&task).await?;
    println!(
        "{}: {:.1}h logged, ${:.2} spent",
        summary.task.title, summary.total_hours, summary.total_cost
    );

    for task in app.queries().tasks().await? {
        println!("  [{}] {} ({})", task.priority, task.title, task.status);
    }

    for toast in toasts.drain() {
        println!("{}: {}", toast.title, toast.description.unwrap_or_default());
    }

    Ok(())
}
