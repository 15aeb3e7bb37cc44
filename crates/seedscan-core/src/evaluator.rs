//! Hit evaluation
//!
//! Decides whether a phrase counts as a discovery and, if so, fabricates the
//! chain, address and balance shown for it. None of this is key material: the
//! address is random hex and the phrase is never derived from.

use rand::Rng;
use seedscan_chains::Chain;
use seedscan_phrase::Phrase;

use crate::error::EngineError;

/// Cosmetic address prefix
const ADDRESS_PREFIX: &str = "0x";
/// Random bytes per address (40 hex characters)
const ADDRESS_BYTES: usize = 20;

/// A synthetic discovery
#[derive(Debug, Clone, PartialEq)]
pub struct Discovery {
    pub chain: Chain,
    pub address: String,
    pub balance: f64,
}

/// Result of evaluating one phrase
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Miss,
    Hit(Discovery),
}

impl Outcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, Outcome::Hit(_))
    }
}

/// Bernoulli hit decision with a fixed probability
#[derive(Debug, Clone)]
pub struct HitEvaluator {
    chains: Vec<Chain>,
    probability: f64,
    max_balance: f64,
}

impl HitEvaluator {
    /// Validate the chain set, probability and balance bound
    pub fn new(
        chains: Vec<Chain>,
        probability: f64,
        max_balance: f64,
    ) -> Result<Self, EngineError> {
        if chains.is_empty() {
            return Err(EngineError::Configuration("chain set is empty".into()));
        }
        if !(0.0..=1.0).contains(&probability) {
            return Err(EngineError::Configuration(format!(
                "hit probability must be within [0, 1], got {}",
                probability
            )));
        }
        if !max_balance.is_finite() || max_balance <= 0.0 {
            return Err(EngineError::Configuration(format!(
                "max balance must be positive and finite, got {}",
                max_balance
            )));
        }
        Ok(Self {
            chains,
            probability,
            max_balance,
        })
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Evaluate a phrase. The phrase content does not influence the draw;
    /// every call is an independent trial.
    pub fn evaluate<R: Rng + ?Sized>(&self, _phrase: &Phrase, rng: &mut R) -> Outcome {
        if !rng.gen_bool(self.probability) {
            return Outcome::Miss;
        }

        let chain = self.chains[rng.gen_range(0..self.chains.len())];
        let address = synthetic_address(rng);
        let balance = round_cents(rng.gen_range(0.0..self.max_balance));

        Outcome::Hit(Discovery {
            chain,
            address,
            balance,
        })
    }
}

fn synthetic_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; ADDRESS_BYTES];
    rng.fill(&mut bytes[..]);
    format!("{}{}", ADDRESS_PREFIX, hex::encode(bytes))
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use seedscan_chains::{all_chains, ETH};
    use seedscan_phrase::PhraseGenerator;

    fn phrase(rng: &mut StdRng) -> Phrase {
        PhraseGenerator::default().generate(rng)
    }

    #[test]
    fn test_zero_probability_never_hits() {
        let evaluator = HitEvaluator::new(all_chains(), 0.0, 5000.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let p = phrase(&mut rng);
            assert_eq!(evaluator.evaluate(&p, &mut rng), Outcome::Miss);
        }
    }

    #[test]
    fn test_certain_probability_always_hits() {
        let evaluator = HitEvaluator::new(all_chains(), 1.0, 5000.0).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..200 {
            let p = phrase(&mut rng);
            match evaluator.evaluate(&p, &mut rng) {
                Outcome::Hit(d) => {
                    assert!(all_chains().contains(&d.chain));
                    assert!(d.address.starts_with("0x"));
                    assert_eq!(d.address.len(), 42);
                    assert!(d.address[2..].chars().all(|c| c.is_ascii_hexdigit()));
                    assert!(d.balance >= 0.0 && d.balance <= 5000.0);
                    assert_eq!(round_cents(d.balance), d.balance);
                }
                Outcome::Miss => panic!("expected a hit"),
            }
        }
    }

    #[test]
    fn test_single_chain_attribution() {
        let evaluator = HitEvaluator::new(vec![ETH], 1.0, 10.0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let p = phrase(&mut rng);
        match evaluator.evaluate(&p, &mut rng) {
            Outcome::Hit(d) => assert_eq!(d.chain, ETH),
            Outcome::Miss => panic!("expected a hit"),
        }
    }

    #[test]
    fn test_seeded_outcomes_reproduce() {
        let evaluator = HitEvaluator::new(all_chains(), 0.3, 5000.0).unwrap();
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..100)
                .map(|_| {
                    let p = phrase(&mut rng);
                    evaluator.evaluate(&p, &mut rng)
                })
                .collect::<Vec<_>>()
        };
        let a = run(99);
        assert_eq!(a, run(99));
        assert!(a.iter().any(Outcome::is_hit));
        assert!(a.iter().any(|o| !o.is_hit()));
    }

    #[test]
    fn test_invalid_construction() {
        assert!(HitEvaluator::new(Vec::new(), 0.1, 5000.0).is_err());
        assert!(HitEvaluator::new(all_chains(), 2.0, 5000.0).is_err());
        assert!(HitEvaluator::new(all_chains(), 0.1, -1.0).is_err());
    }
}
