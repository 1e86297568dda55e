use crate::errors::{LlmError, LlmResult};
use crate::response::Usage;

/// Dollars per million tokens
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPrice {
    pub input: f64,
    pub output: f64,
}

/// Keyed by model name fragment. The longest fragment contained in a model name wins.
const PRICES: &[(&str, ModelPrice)] = &[
    ("claude-3-5-haiku", ModelPrice { input: 0.8, output: 4.0 }),
    ("claude-3-haiku", ModelPrice { input: 0.25, output: 1.25 }),
    ("claude-3-5-sonnet", ModelPrice { input: 3.0, output: 15.0 }),
    ("claude-sonnet-4", ModelPrice { input: 3.0, output: 15.0 }),
    ("claude-opus-4", ModelPrice { input: 15.0, output: 75.0 }),
    ("gpt-4.1", ModelPrice { input: 1.7, output: 6.84 }),
    ("gpt-4.1-mini", ModelPrice { input: 0.4, output: 1.6 }),
    ("gpt-4.1-nano", ModelPrice { input: 0.1, output: 0.4 }),
    ("gpt-5", ModelPrice { input: 1.25, output: 10.0 }),
    ("gpt-5-mini", ModelPrice { input: 0.25, output: 2.0 }),
    ("gpt-5-nano", ModelPrice { input: 0.05, output: 0.4 }),
];

pub fn price_for(model: &str) -> LlmResult<ModelPrice> {
    PRICES
        .iter()
        .filter(|(fragment, _)| model.contains(fragment))
        .max_by_key(|(fragment, _)| fragment.len())
        .map(|(_, price)| *price)
        .ok_or_else(|| LlmError::UnknownPricing(model.to_string()))
}

pub fn cost(model: &str, usage: Usage) -> LlmResult<f64> {
    let price = price_for(model)?;
    let input = price.input * f64::from(usage.input_tokens);
    let output = price.output * f64::from(usage.output_tokens);
    Ok((input + output) / 1_000_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_specific_fragment_wins() {
        assert_eq!(price_for("gpt-4.1-mini").unwrap().input, 0.4);
        assert_eq!(price_for("gpt-4.1-mini-2025-04-14").unwrap().input, 0.4);
        assert_eq!(price_for("gpt-4.1-nano").unwrap().input, 0.1);
        assert_eq!(price_for("gpt-4.1").unwrap().input, 1.7);
        assert_eq!(price_for("gpt-5-nano").unwrap().output, 0.4);
        assert_eq!(price_for("gpt-5").unwrap().output, 10.0);
        assert_eq!(price_for("claude-3-5-haiku-latest").unwrap().input, 0.8);
    }

    #[test]
    fn test_fragments_are_unique() {
        for (i, (fragment, _)) in PRICES.iter().enumerate() {
            assert!(
                PRICES[i + 1..].iter().all(|(other, _)| other != fragment),
                "duplicate price entry for {}",
                fragment
            );
        }
    }

    #[test]
    fn test_cost_formula() {
        let cost = cost("claude-3-5-haiku-latest", Usage::new(1_000, 500)).unwrap();
        assert!((cost - 0.0028).abs() < 1e-12);
        assert_eq!(cost, super::cost("claude-3-5-haiku-latest", Usage::new(1_000, 500)).unwrap());
        assert_eq!(super::cost("gpt-5", Usage::default()).unwrap(), 0.0);
    }

    #[test]
    fn test_unknown_model() {
        assert!(matches!(
            price_for("llama3.2"),
            Err(LlmError::UnknownPricing(model)) if model == "llama3.2"
        ));
    }
}
