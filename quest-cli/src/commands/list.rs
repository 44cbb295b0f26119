use std::sync::Arc;

use anyhow::Result;
use quest_hunt_rs::{
    config::Config,
    pager::{PageLoad, QuestPager, ViewportEvent},
    structs::QuestFeed,
};
use tracing::info;

pub async fn run(config: &Config, feed: QuestFeed, pages: usize) -> Result<()> {
    let ledger = Arc::new(quest_hunt_rs::read_ledger(config));
    let enricher = Arc::new(quest_hunt_rs::enricher(config, ledger.clone())?);
    let pager = QuestPager::new(feed, ledger, enricher, config.page_size);

    for page in 0..pages {
        match pager.on_viewport(ViewportEvent { intersecting: true }).await? {
            PageLoad::Appended(count) => info!(page, count, "loaded page"),
            PageLoad::Exhausted | PageLoad::Skipped => break,
        }
    }

    let state = pager.snapshot().await;
    if state.empty {
        info!(%feed, "no quests");
    }
    println!("{}", serde_json::to_string_pretty(&state.quests)?);
    Ok(())
}
