mod feed;

use anyhow::Result;
use feed::{Clicked, Feed, Issue};
use joiner_core::RealPositionResolver;

fn main() -> Result<()> {
    #[cfg(feature = "logging")]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    println!("=== Joined feed demo ===");
    println!("Set RUST_LOG=debug to watch sections join, or trace for every relay.");
    println!();

    let feed = Feed::new(
        vec!["water the plants".into(), "renew passport".into()],
        vec![
            issue(101, "window flickers on resize", true),
            issue(102, "docs link is broken", true),
            issue(103, "slow startup", false),
        ],
    )?;
    let surface = feed.joiner.surface();
    let _changes = surface.subscribe(|change| log::info!("feed change: {change:?}"));
    print_feed(&feed, "initial")?;

    feed.notes.push("book dentist".into());
    feed.close_issue(102)?;
    feed.issues.move_item(2, 0);
    let removed = feed.remove_issue(101)?;
    log::info!("removed issue #{} ({})", removed.id, removed.title);
    feed.notes_header.set_visible(false);
    print_feed(&feed, "after edits")?;

    let resolver = RealPositionResolver::new(&feed.joiner);
    for slot in [0, 3, 4] {
        let clicked = feed.click(slot)?;
        let real = resolver.real_position(slot);
        match clicked {
            Clicked::Header(title) => println!("slot {slot}: header {title}"),
            Clicked::Note { index, text } => {
                println!("slot {slot}: note {index} ({real:?}) -> {text}")
            }
            Clicked::Issue { index, issue } => println!(
                "slot {slot}: issue {index} ({real:?}) -> #{} open={}",
                issue.id, issue.open
            ),
        }
    }

    feed.notes_header.set_visible(true);
    print_feed(&feed, "header restored")?;
    Ok(())
}

fn issue(id: u64, title: &str, open: bool) -> Issue {
    Issue {
        id,
        title: title.to_string(),
        open,
    }
}

fn print_feed(feed: &Feed, label: &str) -> Result<()> {
    let surface = feed.joiner.surface();
    println!("--- {label} ({} rows) ---", surface.item_count());
    for (slot, row) in feed.render()?.iter().enumerate() {
        let id = surface.id_at(slot)?;
        match id {
            Some(id) => println!("{slot:>2} {row}  (id {id})"),
            None => println!("{slot:>2} {row}"),
        }
    }
    println!();
    Ok(())
}
