use std::sync::Arc;

use anyhow::Context;
use colored::*;

use crate::terminal::{colors, print};
use tagscan_common::provider::CloudProvider;
use tagscan_common::success;

pub async fn regions(provider: Arc<dyn CloudProvider>, quiet: u8) -> anyhow::Result<()> {
    let account: String = provider
        .account_id()
        .await
        .context("failed to resolve the caller account")?;
    let regions: Vec<String> = provider
        .list_regions()
        .await
        .context("failed to enumerate regions")?;

    print::header("enabled regions", quiet);
    for (idx, region) in regions.iter().enumerate() {
        print::tree_head(idx, region);
    }

    let count: ColoredString = format!("{} regions", regions.len()).bold().green();
    success!(
        "{}",
        format!("Account {} has {count} enabled", account.color(colors::ACCENT))
            .color(colors::TEXT_DEFAULT)
    );
    Ok(())
}
