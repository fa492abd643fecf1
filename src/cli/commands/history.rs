use crate::config::Config;
use crate::db::Store;
use crate::models::title_case;

pub async fn cmd_history(config: &Config, limit: u64) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let queries = store.recent_queries(limit).await?;

    if queries.is_empty() {
        println!("No weather queries yet.");
        return Ok(());
    }

    println!("Recent Weather Queries (last {}):", queries.len());
    println!("{:-<70}", "");

    for query in queries {
        println!("• {} [{}]", title_case(&query.city_name), query.status);
        println!(
            "  Query: {} | {}",
            query.query_id,
            query.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    Ok(())
}
