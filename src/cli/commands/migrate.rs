use crate::config::Config;
use crate::db::Store;

/// Opening a store applies any pending migrations.
pub async fn cmd_migrate(config: &Config) -> anyhow::Result<()> {
    let db = &config.database;

    let users = Store::new(&db.users_url).await?;
    users.ping().await?;
    println!("Credential store up to date: {}", db.users_url);

    if !config.shares_database() {
        let tasks = Store::new(&db.tasks_url).await?;
        tasks.ping().await?;
        println!("Task store up to date: {}", db.tasks_url);
    }

    Ok(())
}
