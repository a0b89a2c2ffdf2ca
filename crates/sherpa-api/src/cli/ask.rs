//! One-shot turn from the command line.

use anyhow::Result;
use console::style;

use sherpa_types::tour::{CityHint, SessionId, TurnMetadata, TurnRequest};

use crate::state::AppState;

/// Run one turn and print the response.
pub async fn ask(
    state: &AppState,
    query: String,
    city: CityHint,
    first: bool,
    session: &str,
    json: bool,
) -> Result<()> {
    let request = TurnRequest::new(
        query,
        TurnMetadata {
            city,
            is_first_request: first,
        },
    );
    let response = state.guide.answer(&SessionId::from(session), request).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!();
    println!("  {} {}", style("🧭").bold(), response.speech);
    if !response.locations.is_empty() {
        println!();
        println!("  {}", style("── Places ──").dim());
        for (i, place) in response.locations.iter().enumerate() {
            println!(
                "  {}. {}  {}  {}",
                i + 1,
                style(&place.display_name).cyan().bold(),
                style(format!("({:.4}, {:.4})", place.latitude, place.longitude)).dim(),
                style(format!("★ {:.1}", place.rating)).yellow()
            );
        }
    }
    if let Some(url) = &response.audio_url {
        println!();
        println!("  {} {}", style("🔊").bold(), style(url).dim());
    }
    println!();
    Ok(())
}
