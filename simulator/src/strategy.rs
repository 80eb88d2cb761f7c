//! Player strategies.

use serde::{Deserialize, Serialize};

use arcade_blackjack::{Card, Hand};

/// What the simulated player does next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Hit,
    Stand,
    /// Double if the table allows it, otherwise hit.
    Double,
}

/// A fixed playing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Simplified basic strategy: hard and soft totals against the dealer's
    /// up card, doubling on 9 to 11.
    Basic,
    /// Never draw.
    Stand,
    /// Draw to 17, mirroring the dealer.
    HitTo17,
}

impl Strategy {
    /// Load a strategy by name.
    pub fn load(name: &str) -> anyhow::Result<Self> {
        match name {
            "basic" => Ok(Strategy::Basic),
            "stand" => Ok(Strategy::Stand),
            "hit-to-17" => Ok(Strategy::HitTo17),
            _ => Err(anyhow::anyhow!("Unknown strategy: {}", name)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Basic => "basic",
            Strategy::Stand => "stand",
            Strategy::HitTo17 => "hit-to-17",
        }
    }

    /// Decide on `player` against the dealer's face-up card.
    pub fn decide(&self, player: &Hand, up_card: Card) -> Decision {
        match self {
            Strategy::Stand => Decision::Stand,
            Strategy::HitTo17 => {
                if player.score() < 17 {
                    Decision::Hit
                } else {
                    Decision::Stand
                }
            }
            Strategy::Basic => basic(player, up_card.value()),
        }
    }
}

fn basic(player: &Hand, up: u32) -> Decision {
    let total = player.score();
    let opening = player.len() == 2;

    if player.is_soft() {
        return match total {
            19.. => Decision::Stand,
            18 if (3..=6).contains(&up) && opening => Decision::Double,
            18 if up <= 8 => Decision::Stand,
            13..=17 if (5..=6).contains(&up) && opening => Decision::Double,
            _ => Decision::Hit,
        };
    }

    match total {
        17.. => Decision::Stand,
        13..=16 if up <= 6 => Decision::Stand,
        12 if (4..=6).contains(&up) => Decision::Stand,
        11 => Decision::Double,
        10 if up <= 9 => Decision::Double,
        9 if (3..=6).contains(&up) => Decision::Double,
        _ => Decision::Hit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_blackjack::{Rank, Suit};

    fn hand(ranks: &[Rank]) -> Hand {
        ranks.iter().map(|r| Card::new(*r, Suit::Clubs)).collect()
    }

    fn up(rank: Rank) -> Card {
        Card::new(rank, Suit::Hearts)
    }

    #[test]
    fn test_load() {
        assert_eq!(Strategy::load("basic").unwrap(), Strategy::Basic);
        assert_eq!(Strategy::load("hit-to-17").unwrap(), Strategy::HitTo17);
        assert!(Strategy::load("martingale").is_err());
        for s in [Strategy::Basic, Strategy::Stand, Strategy::HitTo17] {
            assert_eq!(Strategy::load(s.name()).unwrap(), s);
        }
    }

    #[test]
    fn test_hit_to_17() {
        let s = Strategy::HitTo17;
        assert_eq!(s.decide(&hand(&[Rank::Ten, Rank::Six]), up(Rank::Two)), Decision::Hit);
        assert_eq!(s.decide(&hand(&[Rank::Ten, Rank::Seven]), up(Rank::Ace)), Decision::Stand);
    }

    #[test]
    fn test_basic_hard_totals() {
        let s = Strategy::Basic;
        assert_eq!(s.decide(&hand(&[Rank::Ten, Rank::Six]), up(Rank::Six)), Decision::Stand);
        assert_eq!(s.decide(&hand(&[Rank::Ten, Rank::Six]), up(Rank::Ten)), Decision::Hit);
        assert_eq!(s.decide(&hand(&[Rank::Six, Rank::Five]), up(Rank::Ace)), Decision::Double);
        assert_eq!(s.decide(&hand(&[Rank::Six, Rank::Four]), up(Rank::Ten)), Decision::Hit);
        assert_eq!(s.decide(&hand(&[Rank::Ten, Rank::Two]), up(Rank::Two)), Decision::Hit);
    }

    #[test]
    fn test_basic_soft_totals() {
        let s = Strategy::Basic;
        assert_eq!(s.decide(&hand(&[Rank::Ace, Rank::Eight]), up(Rank::Six)), Decision::Stand);
        assert_eq!(s.decide(&hand(&[Rank::Ace, Rank::Seven]), up(Rank::Four)), Decision::Double);
        assert_eq!(s.decide(&hand(&[Rank::Ace, Rank::Seven]), up(Rank::Nine)), Decision::Hit);
        assert_eq!(s.decide(&hand(&[Rank::Ace, Rank::Two, Rank::Four]), up(Rank::Ten)), Decision::Hit);
    }
}
