use crate::indicators::{CrashSignal, Mood, Risk};
use crate::pipeline::BatchReport;
use chrono::Utc;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ContentArrangement, Table,
    modifiers::UTF8_ROUND_CORNERS, presets::UTF8_BORDERS_ONLY,
};

fn get_visibility_ratio(current_pct: f64, top_pct: f64) -> f64 {
    if top_pct <= 0.0 {
        1.0
    } else {
        (0.4 + 0.6 * (current_pct / top_pct)).max(0.4)
    }
}

fn mood_cell(mood: Mood) -> Cell {
    let color = match mood {
        Mood::Bullish => Color::Green,
        Mood::Bearish => Color::Red,
        Mood::Neutral => Color::Grey,
        Mood::Unknown => Color::DarkGrey,
    };
    Cell::new(mood).fg(color)
}

fn risk_cell(risk: Risk) -> Cell {
    let color = match risk {
        Risk::Low => Color::Green,
        Risk::Medium => Color::Yellow,
        Risk::High => Color::Red,
        Risk::Unknown => Color::DarkGrey,
    };
    Cell::new(risk).fg(color)
}

fn crash_cell(crash: CrashSignal) -> Cell {
    let color = match crash {
        CrashSignal::Stable => Color::Green,
        CrashSignal::Downtrend => Color::Red,
        CrashSignal::Unknown => Color::DarkGrey,
    };
    Cell::new(crash).fg(color)
}

/// Prints the ranked batch table, one line per skipped symbol, and the
/// portfolio suggestion.
pub fn print_report(batch: &BatchReport, currency: &str) {
    for failure in &batch.failures {
        println!("✗ {} skipped: {}", failure.symbol, failure.error);
    }

    if batch.reports.is_empty() {
        println!("\nNo symbol produced a result; nothing to rank.");
        return;
    }

    let ranked = batch.ranked();
    let title = format!(
        "(Analyzed {} symbol(s) at {} UTC)",
        batch.reports.len(),
        Utc::now().format("%d-%m-%Y %H:%M:%S")
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_BORDERS_ONLY)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Rank").add_attribute(Attribute::Bold),
            Cell::new("Symbol").add_attribute(Attribute::Bold),
            Cell::new("Predicted (30d)")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Right),
            Cell::new("Mood").add_attribute(Attribute::Bold),
            Cell::new("Risk").add_attribute(Attribute::Bold),
            Cell::new("Crash Signal").add_attribute(Attribute::Bold),
            Cell::new("Growth (%)")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Right),
        ]);

    let top_growth_pct = ranked[0].growth_pct;
    let safe_top_pct = if top_growth_pct == 0.0 {
        1.0
    } else {
        top_growth_pct
    };

    for (i, report) in ranked.iter().enumerate() {
        let ratio = get_visibility_ratio(report.growth_pct, safe_top_pct);

        let cyan_val = (255.0 * ratio) as u8;
        let shade = (255.0 * ratio) as u8;

        let growth_color = if report.growth_pct < 0.0 {
            Color::Rgb {
                r: shade,
                g: 0,
                b: 0,
            }
        } else {
            Color::Rgb {
                r: 0,
                g: shade,
                b: 0,
            }
        };

        table.add_row(vec![
            Cell::new(i + 1).fg(Color::DarkGrey),
            Cell::new(&report.symbol).fg(Color::Rgb {
                r: 0,
                g: cyan_val,
                b: cyan_val,
            }),
            Cell::new(format!("{}{:.2}", currency, report.predicted_price))
                .set_alignment(CellAlignment::Right),
            mood_cell(report.mood),
            risk_cell(report.risk),
            crash_cell(report.crash),
            Cell::new(format!("{:.2}%", report.growth_pct))
                .fg(growth_color)
                .set_alignment(CellAlignment::Right),
        ]);
    }

    println!("\n{}\n{}", title, table);

    if let Some(suggestion) = batch.portfolio() {
        let mut portfolio = Table::new();
        portfolio
            .load_preset(UTF8_BORDERS_ONLY)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Appetite").add_attribute(Attribute::Bold),
                Cell::new("Pick").add_attribute(Attribute::Bold),
            ]);
        portfolio.add_row(vec![
            Cell::new("High Return").fg(Color::Green),
            Cell::new(&suggestion.high_return),
        ]);
        portfolio.add_row(vec![
            Cell::new("Balanced").fg(Color::Yellow),
            Cell::new(&suggestion.balanced),
        ]);
        portfolio.add_row(vec![
            Cell::new("Low Risk").fg(Color::Cyan),
            Cell::new(&suggestion.low_risk),
        ]);

        println!("\nPortfolio suggestion\n{}", portfolio);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_ratio_floors_at_forty_percent() {
        assert_eq!(get_visibility_ratio(-50.0, 10.0), 0.4);
        assert_eq!(get_visibility_ratio(10.0, 10.0), 1.0);
        assert_eq!(get_visibility_ratio(5.0, 0.0), 1.0);
    }
}
