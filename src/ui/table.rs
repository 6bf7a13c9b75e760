use tabled::{settings::Style, Table, Tabled};

use crate::scraper::ScrapeSummary;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: impl ToString) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

/// Render the end-of-run counts
pub fn summary_table(summary: &ScrapeSummary) -> String {
    let mut builder = TableBuilder::new();
    builder.add_row("Pages", summary.pages);
    builder.add_row("Listings", summary.listings);
    builder.add_row("Bodies fetched", summary.bodies_fetched);
    builder.add_row("Users written", summary.users);
    builder.add_row("Organizations written", summary.organizations);
    builder.add_row("Headers written", summary.headers);
    builder.add_row("Bodies written", summary.bodies);
    builder.build()
}
