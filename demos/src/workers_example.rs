use std::env;
use std::io::{self, Write};
use std::sync::Arc;

use dotenv::dotenv;
use tracing_subscriber::EnvFilter;
use workforce::prelude::*;

fn print_toasts(toasts: &ToastQueue) {
    for toast in toasts.drain() {
        let marker = if toast.is_destructive() { "!" } else { "*" };
        println!(
            "{} {}: {}",
            marker,
            toast.title,
            toast.description.unwrap_or_default()
        );
    }
}

fn ask(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

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

    let session = app.auth().sign_in_with_password(&email, &password).await?;
    println!("Signed in as {}", session.user_id);

    let workers = app.queries().workers().await?;
    println!("\n{} workers on file", workers.len());
    for worker in &workers {
        println!(
            "  {} ({}) ${:.2}/h {}",
            worker.name,
            worker.status,
            worker.hourly_rate,
            worker.skills.join(", ")
        );
    }

    // Add a worker through the form, the way the dialog does
    let mut form = EntityForm::create(WorkerFormValues::default());
    form.values.name = format!("Demo worker {}", &uuid::Uuid::new_v4().to_string()[..8]);
    form.values.hourly_rate = "32.50".into();
    form.values.skill = "Carpentry".into();
    form.values.add_skill();

    let mutations = app.mutations::<Worker>();
    let created = mutations.submit(&mut form).await;
    print_toasts(&toasts);
    let created = created?;

    // The create invalidated ["workers"], so this goes back to the store
    let workers = app.queries().workers().await?;
    println!("\nNow {} workers", workers.len());

    let mut form = EntityForm::<WorkerFormValues>::edit(created.clone());
    form.values.status = WorkerStatus::OnLeave;
    let updated = mutations.submit(&mut form).await;
    print_toasts(&toasts);
    println!("Status is now {}", updated?.status);

    let confirm = |prompt: &str| ask(prompt);
    if mutations.delete(created.id, &confirm).await? {
        println!("Removed {}", created.name);
    } else {
        println!("Kept {}", created.name);
    }
    print_toasts(&toasts);

    app.auth().sign_out();
    Ok(())
}
