//! Symbol normalization for user-entered ticker batches.

/// Trims and uppercases a raw ticker. Symbols without a "." exchange
/// delimiter get the configured market suffix appended; an empty suffix
/// (US listings) leaves them untouched.
///
/// Never fails: an empty token normalizes to the bare suffix and is
/// rejected later by the fetch step.
pub fn normalize(raw: &str, default_suffix: &str) -> String {
    let mut symbol = raw.trim().to_uppercase();
    if !default_suffix.is_empty() && !symbol.contains('.') {
        symbol.push_str(default_suffix);
    }
    symbol
}

/// Splits a comma-separated batch ("AAPL, TSLA, MSFT") into normalized
/// symbols, preserving input order.
pub fn parse_batch(input: &str, default_suffix: &str) -> Vec<String> {
    input
        .split(',')
        .map(|token| normalize(token, default_suffix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_suffix_when_no_delimiter() {
        assert_eq!(normalize("tcs", ".NS"), "TCS.NS");
        assert_eq!(normalize(" msft ", ".NS"), "MSFT.NS");
    }

    #[test]
    fn keeps_existing_delimiter() {
        assert_eq!(normalize("TCS.NS", ".NS"), "TCS.NS");
        assert_eq!(normalize("rds.as", ".NS"), "RDS.AS");
    }

    #[test]
    fn empty_suffix_passes_symbols_through() {
        assert_eq!(normalize("AAPL", ""), "AAPL");
        assert_eq!(normalize(" aapl ", ""), "AAPL");
    }

    #[test]
    fn empty_token_yields_bare_suffix() {
        assert_eq!(normalize("", ".NS"), ".NS");
        assert_eq!(normalize("  ", ""), "");
    }

    #[test]
    fn batch_preserves_order() {
        assert_eq!(
            parse_batch("aapl, tsla ,msft", ""),
            vec!["AAPL", "TSLA", "MSFT"]
        );
        assert_eq!(
            parse_batch("infy, tcs", ".NS"),
            vec!["INFY.NS", "TCS.NS"]
        );
    }
}
