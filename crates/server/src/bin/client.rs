use anyhow::{bail, Context};
use std::time::Instant;

use domain::{PagedComments, PagedReplies};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_PAGE_ID: &str = "demo.example/hello";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let base_url = args.next().unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let page_id = args.next().unwrap_or_else(|| DEFAULT_PAGE_ID.to_string());

    let client = reqwest::Client::new();
    println!("Starting natter smoke client against {}...", base_url);

    println!("\n[1/3] Checking health...");
    let resp = client
        .get(format!("{}/health", base_url))
        .send()
        .await
        .context("Server unreachable")?;
    if !resp.status().is_success() {
        bail!("Health check failed: {}", resp.status());
    }
    println!("   -> OK");

    println!("\n[2/3] Listing top-level comments for {}...", page_id);
    let start = Instant::now();
    let resp = client
        .get(format!("{}/api/comments", base_url))
        .query(&[("pageId", page_id.as_str()), ("limit", "5")])
        .send()
        .await?;
    if !resp.status().is_success() {
        bail!("Listing failed: {} {}", resp.status(), resp.text().await?);
    }
    let page: PagedComments = resp.json().await?;
    println!(
        "   -> {} of {} comments in {:.2?} (hasMore: {})",
        page.comments.len(),
        page.meta.total,
        start.elapsed(),
        page.meta.has_more
    );
    for top in &page.comments {
        println!(
            "      {} by {} ({} replies)",
            top.comment.id, top.comment.author, top.replies_count
        );
    }

    let Some(first) = page.comments.iter().find(|c| c.replies_count > 0) else {
        println!("\n[3/3] No comment with replies, skipping.");
        return Ok(());
    };

    println!("\n[3/3] Fetching replies of {}...", first.comment.id);
    let replies: PagedReplies = client
        .get(format!(
            "{}/api/comments/{}/replies",
            base_url, first.comment.id
        ))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    for reply in &replies.replies {
        println!("      {} by {}", reply.id, reply.author);
    }
    println!(
        "   -> {} of {} replies",
        replies.replies.len(),
        replies.meta.total
    );

    Ok(())
}
