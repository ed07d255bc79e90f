use cardwire::prelude::*;
use rand::seq::SliceRandom;

// ---------------------------------------------------------------------------
// Deck
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    const ALL: [Suit; 4] =
        [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Card {
    suit: Suit,
    rank: u8, // 1 = ace .. 13 = king
}

/// Standard 52-card deck, shuffled fresh for every new room.
struct CrazyEightsDeck;

impl DeckProvider for CrazyEightsDeck {
    type Deck = Vec<Card>;

    fn shuffled_deck(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = Suit::ALL
            .iter()
            .flat_map(|&suit| (1..=13).map(move |rank| Card { suit, rank }))
            .collect();
        cards.shuffle(&mut rand::rng());
        cards
    }
}

// ---------------------------------------------------------------------------
// Server bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env(),
        )
        .init();

    eprintln!("starting crazy-eights relay on 0.0.0.0:8080");

    let server = CardwireServerBuilder::new()
        .bind("0.0.0.0:8080")
        .build(CrazyEightsDeck)
        .await?;

    server.run().await?;
    Ok(())
}
