use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct ScopeRow {
    #[tabled(rename = "Scope")]
    pub scope: String,
    #[tabled(rename = "Targets")]
    pub targets: usize,
    #[tabled(rename = "Bindings")]
    pub bindings: usize,
    #[tabled(rename = "Multibindings")]
    pub multibindings: usize,
    #[tabled(rename = "Modules")]
    pub modules: usize,
    #[tabled(rename = "Excludes")]
    pub excludes: usize,
}

pub fn scope_table(rows: Vec<ScopeRow>) -> String {
    if rows.is_empty() {
        return String::new();
    }

    Table::new(&rows).with(Style::rounded()).to_string()
}
