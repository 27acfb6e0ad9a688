//! Console rendering of analysis results.

use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Col, Row, Table};

use crate::domain::Outcome;
use crate::kelly::KellyResult;
use crate::model::FixtureAnalysis;
use crate::tesseract::TesseractResult;

pub fn tabulate_summary(analysis: &FixtureAnalysis) -> Table {
    let mut table = Table::default().with_cols(vec![
        Col::new(Styles::default().with(MinWidth(20)).with(HAlign::Left)),
        Col::new(Styles::default().with(MinWidth(24)).with(HAlign::Left)),
    ]);
    table.push_row(Row::new(
        Styles::default().with(Header(true)).with(Separator(true)),
        vec![
            "Fixture".into(),
            format!(
                "{} vs {}",
                analysis.fixture.home_team, analysis.fixture.away_team
            )
            .into(),
        ],
    ));
    table.push_row(Row::new(
        Styles::default(),
        vec![
            "Predicted score".into(),
            format!("{}", analysis.oracle.predicted_score).into(),
        ],
    ));
    table.push_row(Row::new(
        Styles::default(),
        vec![
            "Baseline confidence".into(),
            format!("{}%", analysis.oracle.confidence).into(),
        ],
    ));
    if let Some(signal) = &analysis.oracle.mastermind {
        table.push_row(Row::new(
            Styles::default(),
            vec!["Signal".into(), signal.title.clone().into()],
        ));
        table.push_row(Row::new(
            Styles::default(),
            vec![
                "Signal confidence".into(),
                format!("{}%", signal.confidence).into(),
            ],
        ));
        table.push_row(Row::new(
            Styles::default(),
            vec!["Recommendation".into(), signal.recommendation.clone().into()],
        ));
    }
    table.push_row(Row::new(
        Styles::default(),
        vec![
            "Recommended stake".into(),
            format!(
                "{:.2}% ({})",
                analysis.kelly.recommended_stake_percentage, analysis.kelly.risk_level
            )
            .into(),
        ],
    ));
    table
}

pub fn tabulate_outcomes(tesseract: &TesseractResult) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)).with(Separator(true)),
            vec!["Market".into(), "Probability".into(), "Fair price".into()],
        ));
    for ordinal in 0..Outcome::COUNT {
        let outcome = Outcome::from(ordinal);
        let probability = tesseract.outcome_probability(&outcome);
        let fair_price = if probability > 0.0 {
            format!("{:.3}", 1.0 / probability)
        } else {
            "-".into()
        };
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("{outcome}").into(),
                format!("{probability:.4}").into(),
                fair_price.into(),
            ],
        ));
    }
    table.push_row(Row::new(
        Styles::default(),
        vec![
            "BTTS".into(),
            format!("{:.4}", tesseract.btts_probability).into(),
            "".into(),
        ],
    ));
    table.push_row(Row::new(
        Styles::default(),
        vec![
            "Over 2.5".into(),
            format!("{:.4}", tesseract.over_2_5_probability).into(),
            "".into(),
        ],
    ));
    table
}

pub fn tabulate_scores(tesseract: &TesseractResult) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)).with(Separator(true)),
            vec!["Score".into(), "Frequency".into(), "Share".into()],
        ));
    for entry in &tesseract.top_score_distribution {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("{}", entry.score).into(),
                format!("{}", entry.frequency).into(),
                format!(
                    "{:.1}%",
                    entry.frequency as f64 / tesseract.simulation_count as f64 * 100.0
                )
                .into(),
            ],
        ));
    }
    table
}

pub fn tabulate_staking(kelly: &KellyResult) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)).with(Separator(true)),
            vec!["Market".into(), "Kelly".into(), "Value score".into()],
        ));
    let rows = [
        ("home win", kelly.home_win_kelly, kelly.home_win_value_score),
        ("draw", kelly.draw_kelly, kelly.draw_value_score),
        ("away win", kelly.away_win_kelly, kelly.away_win_value_score),
    ];
    for (label, fraction, value_score) in rows {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                label.into(),
                fraction
                    .map(|fraction| format!("{fraction:.4}"))
                    .unwrap_or_else(|| "-".into())
                    .into(),
                format!("{value_score:.1}").into(),
            ],
        ));
    }
    table
}
