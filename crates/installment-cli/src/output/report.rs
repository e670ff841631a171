use colored::Colorize;
use rust_decimal::Decimal;
use serde_json::Value;
use std::fmt::Write;
use tabled::{builder::Builder, Table};

use installment_core::financing::{
    ComparisonRow, FinancingAnalysis, FinancingSummary, InvestmentOutcome, InvestmentSimulation,
    Recommendation,
};
use installment_core::types::ComputationOutput;

use super::fmt::{money, pct};
use super::table;

/// Narrative report for `compare`. Other outputs fall back to tables.
pub fn print_report(value: &Value) {
    match serde_json::from_value::<ComputationOutput<FinancingAnalysis>>(value.clone()) {
        Ok(output) => print!("{}", render_report(&output)),
        Err(_) => table::print_table(value),
    }
}

fn render_report(output: &ComputationOutput<FinancingAnalysis>) -> String {
    let analysis = &output.result;
    let s = &analysis.summary;
    let mut out = String::new();

    let _ = writeln!(out, "{}", "Cash vs installments".bold());
    let _ = writeln!(out);
    render_financing(&mut out, s);
    render_inflation(&mut out, s);
    if let Some(sim) = &analysis.investment {
        render_investment(&mut out, sim);
    }
    render_recommendation(&mut out, s);
    render_comparison(&mut out, s, &analysis.comparison);

    if !output.warnings.is_empty() {
        let _ = writeln!(out, "\nWarnings:");
        for w in &output.warnings {
            let _ = writeln!(out, "  - {}", w);
        }
    }
    out
}

fn render_financing(out: &mut String, s: &FinancingSummary) {
    let _ = writeln!(out, "Financing");
    let _ = writeln!(
        out,
        "  Overprice:              {} ({})",
        money(s.overprice),
        pct(s.overprice_pct, 1)
    );
    let _ = writeln!(
        out,
        "  Installment:            {} x {}",
        money(s.nominal_payment),
        s.installment_count
    );
    let _ = writeln!(
        out,
        "  Monthly financing rate: {} vs inflation {}",
        pct(s.monthly_financing_rate, 2),
        pct(s.periodic_inflation_rate, 1)
    );
}

fn render_inflation(out: &mut String, s: &FinancingSummary) {
    let _ = writeln!(out, "\nWith inflation");
    let _ = writeln!(
        out,
        "  Real value of installments: {} ({})",
        money(s.present_value_of_installments),
        pct(s.real_difference_pct, 1)
    );
    let _ = writeln!(
        out,
        "  Eroded by inflation:        {}",
        money(s.inflation_savings)
    );
    let _ = writeln!(
        out,
        "  Real difference:            {}",
        money(s.real_difference.abs())
    );
    let _ = writeln!(
        out,
        "  Break-even total:           {}",
        money(s.breakeven_installment_total)
    );
}

fn render_investment(out: &mut String, sim: &InvestmentSimulation) {
    let _ = writeln!(
        out,
        "\nInvesting the cash price at {} per month",
        pct(sim.investment_rate, 1)
    );
    let _ = writeln!(out, "  Final balance:           {}", money(sim.final_balance));
    let _ = writeln!(
        out,
        "  Sustainable installment: {}",
        money(sim.sustainable_payment)
    );
    match sim.outcome {
        InvestmentOutcome::Surplus => {
            let _ = writeln!(
                out,
                "  {}",
                format!(
                    "Investing the money and paying the installments leaves {}",
                    money(sim.surplus)
                )
                .green()
            );
        }
        InvestmentOutcome::Shortfall => {
            let _ = writeln!(
                out,
                "  {}",
                format!("You would need {} more", money(sim.shortfall)).yellow()
            );
        }
    }
}

fn render_recommendation(out: &mut String, s: &FinancingSummary) {
    let _ = writeln!(out);
    match s.recommendation {
        Recommendation::Installments => {
            let _ = writeln!(out, "{}", "Recommendation: pay in INSTALLMENTS".green().bold());
            let _ = writeln!(
                out,
                "  - In real terms you pay {} instead of {}",
                money(s.present_value_of_installments),
                money(s.installment_total)
            );
            let _ = writeln!(
                out,
                "  - The present value of the installments is below the cash price of {}",
                money(s.cash_price)
            );
            let _ = writeln!(
                out,
                "  - Inflation erodes {} of the financing cost",
                money(s.inflation_savings)
            );
            let _ = writeln!(
                out,
                "  - You save {} in real terms and keep the cash on hand",
                money(s.installment_benefit.abs())
            );
        }
        Recommendation::Cash => {
            let _ = writeln!(out, "{}", "Recommendation: pay CASH".yellow().bold());
            let _ = writeln!(
                out,
                "  - The present value of the installments ({}) is not below the cash price ({})",
                money(s.present_value_of_installments),
                money(s.cash_price)
            );
            let _ = writeln!(
                out,
                "  - Installments cost {} more in real terms",
                money(s.real_difference.abs())
            );
            let _ = writeln!(out, "  - Inflation helps but does not offset the overprice");
        }
    }
}

fn render_comparison(out: &mut String, s: &FinancingSummary, rows: &[ComparisonRow]) {
    let mut builder = Builder::default();
    builder.push_record(["Concept", "Cash", "Installments", "Difference"]);
    for row in rows {
        let cells = match row.concept.as_str() {
            "monthly_rate" => [
                "Monthly rate".to_string(),
                pct(row.cash, 0),
                pct(row.installments, 2),
                format!(
                    "{} vs {} inflation",
                    pct(row.installments, 2),
                    pct(s.periodic_inflation_rate, 1)
                ),
            ],
            concept => [
                concept_label(concept),
                money(row.cash),
                money(row.installments),
                money(row.difference),
            ],
        };
        builder.push_record(cells);
    }
    let (cash_mark, inst_mark) = match s.recommendation {
        Recommendation::Cash => ("yes", "no"),
        Recommendation::Installments => ("no", "yes"),
    };
    let verdict = if s.installment_benefit > Decimal::ZERO {
        "saving"
    } else {
        "extra cost"
    };
    builder.push_record([
        "Preferred".to_string(),
        cash_mark.to_string(),
        inst_mark.to_string(),
        format!("{} {}", verdict, money(s.installment_benefit.abs())),
    ]);

    let _ = writeln!(out, "\n{}", Table::from(builder));
}

fn concept_label(concept: &str) -> String {
    match concept {
        "total_payment" => "Total payment".to_string(),
        "present_value" => "Present value".to_string(),
        other => other.replace('_', " "),
    }
}
