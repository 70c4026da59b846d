use std::fmt::Display;

use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::core::{contract::Contract, customer::Customer, period::InvoicingPeriod};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

/// Right-aligned value, or dimmed `n/a` when it is unavailable.
fn value_cell<T: Display>(value: Option<T>) -> Cell {
    match value {
        Some(value) => Cell::new(value).set_alignment(CellAlignment::Right),
        None => {
            Cell::new("n/a").set_alignment(CellAlignment::Right).add_attribute(Attribute::Dim)
        }
    }
}

fn text_cell(text: Option<&str>) -> Cell {
    Cell::new(text.unwrap_or_default())
}

fn id_cell<T: Display>(id: Option<T>) -> Cell {
    id.map_or_else(|| Cell::new(""), |id| Cell::new(id).fg(Color::Cyan))
}

pub fn build_customer_table(customer: &Customer) -> Table {
    let mut table = new_table();
    table.set_header(vec!["ID", "Code", "Name", "Email", "Phone", "Address", "Main customer"]);
    table.add_row(vec![
        Cell::new(customer.id).fg(Color::Cyan),
        text_cell(customer.code.as_deref()),
        Cell::new(customer).add_attribute(Attribute::Bold),
        text_cell(customer.email.as_deref()),
        text_cell(customer.phone.as_deref()),
        id_cell(customer.address_id).add_attribute(Attribute::Dim),
        id_cell(customer.main_customer_id),
    ]);
    table
}

pub fn build_contracts_table(contracts: &[Contract]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "ID",
        "Code",
        "Product",
        "Metering point ID",
        "Metering point",
        "Created",
        "Start",
        "Stop",
    ]);
    for contract in contracts {
        table.add_row(vec![
            Cell::new(contract.id).fg(Color::Cyan),
            text_cell(contract.code.as_deref()),
            text_cell(contract.product.as_deref()),
            id_cell(contract.metering_point_id),
            text_cell(contract.metering_point.as_deref()),
            text_cell(contract.created.as_deref()).add_attribute(Attribute::Dim),
            text_cell(contract.start.as_deref()).add_attribute(Attribute::Dim),
            text_cell(contract.stop.as_deref()).add_attribute(Attribute::Dim),
        ]);
    }
    table
}

/// Consumption and the average price components per period.
pub fn build_prices_table(periods: &[InvoicingPeriod]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "ID",
        "Period",
        "Start",
        "Stop",
        "Consumption",
        "Fixed kWh",
        "Open kWh",
        "Spot",
        "Weighted spot",
        "Fixed price",
        "Profile",
        "Delivery",
        "VAT",
    ]);
    for period in periods {
        let spot_color = match (period.weighted_spot_price(), period.average_spot_price()) {
            (Some(weighted), Some(average)) if weighted > average => Color::Red,
            (Some(_), Some(_)) => Color::Green,
            _ => Color::Reset,
        };
        table.add_row(vec![
            Cell::new(period.id).fg(Color::Cyan),
            Cell::new(&period.description),
            Cell::new(period.start.format("%Y-%m-%d")).add_attribute(Attribute::Dim),
            Cell::new(period.stop.format("%Y-%m-%d")).add_attribute(Attribute::Dim),
            value_cell(period.total_consumption()),
            value_cell(period.total_fixed_consumption()),
            value_cell(period.total_open_consumption()),
            value_cell(period.average_spot_price()),
            value_cell(period.weighted_spot_price()).fg(spot_color),
            value_cell(period.average_fixed_price()),
            value_cell(period.profile_price()),
            value_cell(period.delivery_price()),
            value_cell(period.vat_percentage()),
        ]);
    }
    table
}

/// Total prices, including the profile and delivery prices, and the resulting costs per period.
pub fn build_costs_table(periods: &[InvoicingPeriod]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "ID",
        "Period",
        "Total spot",
        "Total weighted spot",
        "Total fixed",
        "Spot cost",
        "Weighted spot cost",
        "Fixed cost",
        "Weighted spot cost + VAT",
    ]);
    for period in periods {
        let weighted_cost_with_vat =
            period.total_weighted_spot_cost().and_then(|cost| period.with_vat(cost));
        table.add_row(vec![
            Cell::new(period.id).fg(Color::Cyan),
            Cell::new(&period.description),
            value_cell(period.total_spot_price()),
            value_cell(period.total_weighted_spot_price()),
            value_cell(period.total_fixed_price()),
            value_cell(period.total_spot_cost()),
            value_cell(period.total_weighted_spot_cost()),
            value_cell(period.total_fixed_cost()),
            value_cell(weighted_cost_with_vat).add_attribute(Attribute::Bold),
        ]);
    }
    table
}
