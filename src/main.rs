//! # PawMatch demo
//!
//! Walks the stub [`Container`] through what a first session in the app does:
//! 1. Sign in with the fixture adopter.
//! 2. Load the liked dogs and the discover deck.
//! 3. Like a dog from the deck, then change their mind.
//! 4. Shut everything down.
//!
//! No network I/O happens; every repository is backed by an in-process record store.

use pawmatch::fixtures;
use pawmatch::interactor::Discard;
use pawmatch::repository::stub::STUB_PASSWORD;
use pawmatch::state::path;
use pawmatch::Container;
use record_store::tracing::setup_tracing;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    info!("Starting PawMatch with stub repositories");

    let container = Container::stub();

    let span = tracing::info_span!("sign_in");
    let adopter = async {
        info!("Signing in fixture adopter");
        container
            .session
            .sign_in("rae@example.com", STUB_PASSWORD)
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;

    info!(adopter_id = %adopter.id, name = %adopter.name, "Signed in");

    let liked = container
        .dogs
        .load_liked_dogs(&Discard)
        .await
        .into_result()
        .ok_or("liked dogs load did not finish")?
        .map_err(|e| e.to_string())?;
    let names: Vec<&str> = liked.iter().map(|dog| dog.name.as_str()).collect();
    info!(?names, "Liked dogs");

    let deck = container
        .dogs
        .load_discover_deck(&Discard)
        .await
        .into_result()
        .ok_or("deck load did not finish")?
        .map_err(|e| e.to_string())?;
    info!(size = deck.len(), "Discover deck ready");

    let span = tracing::info_span!("swipes");
    let swipes = async {
        let dog_id = deck.first().map(|dog| dog.id).unwrap_or(fixtures::ZIGGY);
        container.dogs.like(dog_id).await?;
        info!(%dog_id, matched = container.app_state.get(path::MATCHED).len(), "Liked");
        container.dogs.unlike(dog_id).await?;
        info!(%dog_id, liked = container.app_state.get(path::LIKED).len(), "Unliked");
        Ok::<_, pawmatch::RepositoryError>(())
    }
    .instrument(span)
    .await;

    if let Err(e) = swipes {
        error!(error = %e, "Swiping failed");
    }

    container.shutdown().await;

    info!("Demo completed successfully");
    Ok(())
}
