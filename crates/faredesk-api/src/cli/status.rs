//! Store status command.

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Table};
use console::style;

use crate::state::AppState;

/// Display store statistics.
///
/// Shows ticket counts by status, pending refunds, chat session counts,
/// and registered users.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let ticket_counts: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM tickets GROUP BY status ORDER BY status")
            .fetch_all(&state.db_pool.reader)
            .await?;

    let total_tickets: i64 = ticket_counts.iter().map(|(_, n)| n).sum();

    let (pending_refunds,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM refund_requests WHERE status = 'pending'")
            .fetch_one(&state.db_pool.reader)
            .await?;

    let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&state.db_pool.reader)
        .await?;

    let (sessions,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_sessions")
        .fetch_one(&state.db_pool.reader)
        .await?;

    if json {
        let mut by_status = serde_json::Map::new();
        for (status, count) in &ticket_counts {
            by_status.insert(status.clone(), serde_json::json!(count));
        }
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "tickets": {
                "total": total_tickets,
                "by_status": by_status,
            },
            "pending_refunds": pending_refunds,
            "users": users,
            "chat_sessions": sessions,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} faredesk v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("  {}", style(state.data_dir.display()).dim());
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Ticket status", "Count"]);
    for (status, count) in &ticket_counts {
        table.add_row(vec![status.clone(), count.to_string()]);
    }
    if ticket_counts.is_empty() {
        table.add_row(vec!["(no tickets)".to_string(), "0".to_string()]);
    }
    println!("{table}");

    println!();
    println!("  Pending refunds: {}", style(pending_refunds).yellow());
    println!("  Users:           {}", style(users).bold());
    println!("  Chat sessions:   {}", style(sessions).bold());
    println!();

    Ok(())
}
