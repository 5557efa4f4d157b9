//! Mutation storm example - a ticker that rewrites the page every 20ms
//!
//! Shows the scheduler backing off while the storm lasts and decaying once
//! it stops. Run with `RUST_LOG=debug` for the scheduler's own logs.

use std::sync::Arc;
use std::time::Duration;

use dom::{DomArena, NodeType};
use monitor::{Command, DocumentMonitor, MonitorEvent, Mutation, MutationStats, Response};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut arena = DomArena::new_document();
    let body = arena.body().ok_or("document has no body")?;
    let header = arena.create_element("header");
    let main = arena.create_element_with("div", &[("id", "content")]);
    let ticker = arena.create_element_with("aside", &[("aria-label", "Ticker")]);
    arena.append_child(body, header)?;
    arena.append_child(body, main)?;
    arena.append_child(body, ticker)?;

    let monitor = DocumentMonitor::new(arena)?;
    let stats = Arc::new(MutationStats::new());
    monitor.register_observer(stats.clone()).await;

    let mut events = monitor.event_bus().subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                MonitorEvent::PauseChanged { pause_ms } => println!("pause now {}ms", pause_ms),
                MonitorEvent::ScanCompleted { trigger, count, .. } => {
                    println!("scan ({:?}) found {} landmarks", trigger, count)
                }
                _ => {}
            }
        }
    });

    monitor.start().await;

    let tree = monitor.tree();
    for tick in 0..150 {
        {
            let mut arena = tree.write().await;
            let item = arena.create_element_with("span", &[("class", "quote")]);
            let text = arena.create_text(&format!("tick {}", tick));
            arena.append_child(item, text)?;
            arena.append_child(ticker, item)?;
        }
        monitor
            .handle_mutations(vec![Mutation::child_list(&[NodeType::Element], &[])])
            .await;
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    println!("storm over, pause {:?}", monitor.scheduler().pause().await);
    tokio::time::sleep(Duration::from_secs(5)).await;
    println!("settled, pause {:?}", monitor.scheduler().pause().await);

    if let Response::Landmarks(landmarks) = monitor.handle(Command::GetLandmarks).await? {
        for landmark in landmarks {
            println!("  {}", landmark.display_name());
        }
    }
    println!("{}", serde_json::to_string_pretty(&stats.snapshot().await)?);

    monitor.stop().await;
    Ok(())
}
