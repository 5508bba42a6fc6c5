//! Growth ranking and the three-slot portfolio suggestion.

use crate::pipeline::SymbolReport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioSuggestion {
    pub high_return: String,
    pub balanced: String,
    pub low_risk: String,
}

/// Batch results sorted by growth descending.
pub fn rank_by_growth(reports: &[SymbolReport]) -> Vec<&SymbolReport> {
    let mut ranked: Vec<&SymbolReport> = reports.iter().collect();
    ranked.sort_unstable_by(|a, b| {
        b.growth_pct
            .partial_cmp(&a.growth_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

/// Maps the ranked batch onto risk-appetite slots: best growth takes High
/// Return, worst takes Low Risk, and position `len / 2` takes Balanced.
/// The floor division is the carried tie-break for even batches; it picks
/// the lower-middle element of the descending order.
pub fn suggest(reports: &[SymbolReport]) -> Option<PortfolioSuggestion> {
    if reports.is_empty() {
        return None;
    }

    let ranked = rank_by_growth(reports);
    Some(PortfolioSuggestion {
        high_return: ranked[0].symbol.clone(),
        balanced: ranked[ranked.len() / 2].symbol.clone(),
        low_risk: ranked[ranked.len() - 1].symbol.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{CrashSignal, Mood, Risk};

    fn report(symbol: &str, growth_pct: f64) -> SymbolReport {
        SymbolReport {
            symbol: symbol.to_string(),
            predicted_price: 0.0,
            mood: Mood::Unknown,
            risk: Risk::Unknown,
            crash: CrashSignal::Unknown,
            growth_pct,
        }
    }

    #[test]
    fn four_symbol_batch_maps_extremes_and_floor_median() {
        // Deliberately out of order on input.
        let reports = vec![
            report("MID", 2.0),
            report("TOP", 10.0),
            report("LOSER", -3.0),
            report("SECOND", 5.0),
        ];

        let suggestion = suggest(&reports).unwrap();
        assert_eq!(suggestion.high_return, "TOP");
        // Descending order [10, 5, 2, -3]; 4 / 2 = index 2.
        assert_eq!(suggestion.balanced, "MID");
        assert_eq!(suggestion.low_risk, "LOSER");
    }

    #[test]
    fn odd_batch_takes_the_true_middle() {
        let reports = vec![
            report("A", 1.0),
            report("B", 7.0),
            report("C", -4.0),
        ];

        let suggestion = suggest(&reports).unwrap();
        assert_eq!(suggestion.high_return, "B");
        assert_eq!(suggestion.balanced, "A");
        assert_eq!(suggestion.low_risk, "C");
    }

    #[test]
    fn suggestion_is_idempotent() {
        let reports = vec![
            report("A", 4.0),
            report("B", 4.0),
            report("C", 1.0),
            report("D", 9.0),
        ];

        assert_eq!(suggest(&reports), suggest(&reports));

        let first: Vec<String> = rank_by_growth(&reports)
            .iter()
            .map(|r| r.symbol.clone())
            .collect();
        let second: Vec<String> = rank_by_growth(&reports)
            .iter()
            .map(|r| r.symbol.clone())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_batch_yields_no_suggestion() {
        assert_eq!(suggest(&[]), None);
    }

    #[test]
    fn single_symbol_fills_every_slot() {
        let reports = vec![report("ONLY", 3.0)];
        let suggestion = suggest(&reports).unwrap();
        assert_eq!(suggestion.high_return, "ONLY");
        assert_eq!(suggestion.balanced, "ONLY");
        assert_eq!(suggestion.low_risk, "ONLY");
    }
}
