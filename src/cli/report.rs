use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};
use serde::Serialize;

use crate::cli::{open_store, ReportCommands};
use crate::db::load_records;
use crate::error::Result;
use crate::fmt::{money, percent};
use crate::reports;
use crate::settings::load_settings;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn amount_cell(val: f64) -> Cell {
    Cell::new(money(val)).set_alignment(CellAlignment::Right)
}

pub fn run(command: ReportCommands) -> Result<()> {
    let conn = open_store(&load_settings())?;
    let records = load_records(&conn)?;
    tracing::debug!(records = records.len(), "report input loaded");

    match command {
        ReportCommands::Indicators { json } => {
            let ind = reports::indicators(&records);
            if json {
                return print_json(&ind);
            }
            let mut table = Table::new();
            table.set_header(vec!["Indicador", "Valor"]);
            table.add_row(vec![Cell::new("Receita".green()), amount_cell(ind.income)]);
            table.add_row(vec![Cell::new("Gastos".red()), amount_cell(ind.expenses)]);
            let net_label = if ind.net >= 0.0 {
                "Lucro líquido".green().bold()
            } else {
                "Lucro líquido".red().bold()
            };
            table.add_row(vec![Cell::new(net_label), amount_cell(ind.net)]);
            table.add_row(vec![
                Cell::new("Margem de lucro"),
                Cell::new(percent(ind.margin)).set_alignment(CellAlignment::Right),
            ]);
            println!("Indicadores financeiros\n{table}");
        }
        ReportCommands::Trends { json } => {
            let trends = reports::monthly_trends(&records);
            if json {
                return print_json(&trends);
            }
            let mut table = Table::new();
            table.set_header(vec!["Mês", "Receitas", "Despesas"]);
            for ((label, income), expense) in trends.labels.iter().zip(&trends.income).zip(&trends.expenses) {
                table.add_row(vec![Cell::new(label), amount_cell(*income), amount_cell(*expense)]);
            }
            println!("Tendência mensal\n{table}");
        }
        ReportCommands::Distribution { json } => {
            let dist = reports::expense_distribution(&records);
            if json {
                return print_json(&dist);
            }
            let mut table = Table::new();
            table.set_header(vec!["Categoria", "Total"]);
            for (label, value) in dist.labels.iter().zip(&dist.values) {
                table.add_row(vec![Cell::new(label), amount_cell(*value)]);
            }
            println!("Despesas por categoria\n{table}");
        }
        ReportCommands::Types { json } => {
            let share = reports::expense_type_percentage(&records);
            if json {
                return print_json(&share);
            }
            if share.is_empty() {
                println!("Nenhuma despesa registrada.");
                return Ok(());
            }
            let mut table = Table::new();
            table.set_header(vec!["Categoria", "Participação"]);
            for (category, pct) in &share.shares {
                table.add_row(vec![
                    Cell::new(category),
                    Cell::new(percent(*pct)).set_alignment(CellAlignment::Right),
                ]);
            }
            println!("Participação por tipo de despesa\n{table}");
        }
        ReportCommands::Cashflow { json } => {
            let flow = reports::cash_flow(&records);
            if json {
                return print_json(&flow);
            }
            let mut table = Table::new();
            table.set_header(vec!["Mês", "Fluxo"]);
            for (label, net) in flow.labels.iter().zip(&flow.net) {
                let cell = if *net >= 0.0 {
                    Cell::new(money(*net).green())
                } else {
                    Cell::new(money(*net).red())
                };
                table.add_row(vec![Cell::new(label), cell.set_alignment(CellAlignment::Right)]);
            }
            println!("Fluxo de caixa\n{table}");
        }
    }
    Ok(())
}
