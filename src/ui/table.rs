use tabled::{settings::Style, Table, Tabled};

use crate::stone::StoneSummary;

#[derive(Tabled)]
pub struct StoneRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Unique ID")]
    pub unique_id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Created")]
    pub created_at: String,
}

impl From<&StoneSummary> for StoneRow {
    fn from(stone: &StoneSummary) -> Self {
        Self {
            id: stone.id,
            unique_id: stone.unique_id.clone(),
            name: stone.name.clone(),
            created_at: stone.created_at.clone(),
        }
    }
}

/// Render stones as a rounded table; empty input gives an empty string
pub fn stones_table(stones: &[StoneSummary]) -> String {
    if stones.is_empty() {
        return String::new();
    }

    let rows: Vec<StoneRow> = stones.iter().map(StoneRow::from).collect();
    Table::new(&rows).with(Style::rounded()).to_string()
}
