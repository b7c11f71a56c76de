//! Human- and machine-readable views of a grammar analysis.
//!
//! [`SetsReport`] lists FIRST/FOLLOW/SELECT sets with table statistics and
//! renders as text (via `Display`) or JSON (via `serde`). [`TableReport`] lays
//! the predictive table out as a grid and writes it as CSV so it opens in a
//! spreadsheet.

use crate::config::EOF_NAME;
use crate::grammar::sets::{GrammarSets, TerminalSet};
use crate::grammar::table::PredictiveTable;
use crate::grammar::{Grammar, NonTermId, TermId};
use crate::trace::UsageLog;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

/// Display name of the epsilon marker.
pub const EPSILON: &str = "ε";

/// Terminal names of `set`: epsilon, then `EOF`, then the rest by name.
fn set_names(grammar: &Grammar, set: &TerminalSet) -> Vec<String> {
    let mut names: Vec<String> = set
        .iter()
        .filter(|t| *t != grammar.eof())
        .map(|t| grammar.terminal_name(t).to_string())
        .collect();
    names.sort();

    let mut out = Vec::with_capacity(names.len() + 2);
    if set.has_epsilon() {
        out.push(EPSILON.to_string());
    }
    if set.contains(grammar.eof()) {
        out.push(EOF_NAME.to_string());
    }
    out.extend(names);
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NonTerminalSets {
    pub nonterminal: String,
    pub first: Vec<String>,
    pub follow: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectEntry {
    pub production: usize,
    pub rule: String,
    pub select: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictEntry {
    pub nonterminal: String,
    pub terminal: String,
    pub kept: String,
    pub rejected: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableStats {
    pub nonterminals: usize,
    /// Includes `EOF`.
    pub terminals: usize,
    pub productions: usize,
    pub filled_cells: usize,
    pub conflicts: usize,
}

/// FIRST/FOLLOW per nonterminal, SELECT per production and table statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetsReport {
    pub sets: Vec<NonTerminalSets>,
    pub select: Vec<SelectEntry>,
    pub stats: TableStats,
    pub conflicts: Vec<ConflictEntry>,
}

impl SetsReport {
    pub fn new(grammar: &Grammar, sets: &GrammarSets, table: &PredictiveTable) -> Self {
        let mut nonterminal_sets: Vec<NonTerminalSets> = grammar
            .nonterminal_ids()
            .map(|nt| NonTerminalSets {
                nonterminal: grammar.nonterminal_name(nt).to_string(),
                first: set_names(grammar, sets.first(nt)),
                follow: set_names(grammar, sets.follow(nt)),
            })
            .collect();
        nonterminal_sets.sort_by(|a, b| a.nonterminal.cmp(&b.nonterminal));

        let select = grammar
            .productions()
            .iter()
            .map(|p| SelectEntry {
                production: p.id.0,
                rule: grammar.display_production(p.id).to_string(),
                select: set_names(grammar, sets.select(p.id)),
            })
            .collect();

        let conflicts = table
            .conflicts()
            .iter()
            .map(|c| ConflictEntry {
                nonterminal: grammar.nonterminal_name(c.nonterminal).to_string(),
                terminal: grammar.terminal_name(c.terminal).to_string(),
                kept: grammar.display_production(c.existing).to_string(),
                rejected: grammar.display_production(c.rejected).to_string(),
            })
            .collect();

        SetsReport {
            sets: nonterminal_sets,
            select,
            stats: TableStats {
                nonterminals: grammar.nonterminal_count(),
                terminals: grammar.terminal_count(),
                productions: grammar.productions().len(),
                filled_cells: table.filled_cells(),
                conflicts: table.conflicts().len(),
            },
            conflicts,
        }
    }
}

impl fmt::Display for SetsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .sets
            .iter()
            .map(|s| s.nonterminal.chars().count())
            .max()
            .unwrap_or(0);

        writeln!(f, "FIRST")?;
        for entry in &self.sets {
            writeln!(
                f,
                "  {:<width$}  {{ {} }}",
                entry.nonterminal,
                entry.first.join(", ")
            )?;
        }
        writeln!(f)?;
        writeln!(f, "FOLLOW")?;
        for entry in &self.sets {
            writeln!(
                f,
                "  {:<width$}  {{ {} }}",
                entry.nonterminal,
                entry.follow.join(", ")
            )?;
        }
        writeln!(f)?;
        writeln!(f, "SELECT")?;
        for entry in &self.select {
            writeln!(
                f,
                "  ({:>3}) {}  {{ {} }}",
                entry.production,
                entry.rule,
                entry.select.join(", ")
            )?;
        }
        writeln!(f)?;

        let stats = &self.stats;
        writeln!(
            f,
            "{} nonterminals, {} terminals, {} productions, {} filled cells, {} conflict(s)",
            stats.nonterminals,
            stats.terminals,
            stats.productions,
            stats.filled_cells,
            stats.conflicts
        )?;
        for conflict in &self.conflicts {
            writeln!(
                f,
                "  conflict at [{}, {}]: kept `{}`, rejected `{}`",
                conflict.nonterminal, conflict.terminal, conflict.kept, conflict.rejected
            )?;
        }
        Ok(())
    }
}

/// One row of the table grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub nonterminal: String,
    /// One entry per column; `None` for an empty cell.
    pub cells: Vec<Option<String>>,
}

/// The predictive table as a grid: terminals across, nonterminals down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl TableReport {
    /// Full grid. Columns are terminals in declaration order with `EOF` last.
    pub fn new(grammar: &Grammar, table: &PredictiveTable) -> Self {
        Self::build(grammar, table, None)
    }

    /// Only the cells a parse consulted. Rows and columns with no used cell
    /// are dropped.
    pub fn used_only(grammar: &Grammar, table: &PredictiveTable, usage: &UsageLog) -> Self {
        Self::build(grammar, table, Some(usage))
    }

    fn build(grammar: &Grammar, table: &PredictiveTable, usage: Option<&UsageLog>) -> Self {
        let eof = grammar.eof();
        let mut terminals: Vec<TermId> = grammar.terminal_ids().filter(|t| *t != eof).collect();
        terminals.push(eof);

        let keep = |nt: NonTermId, t: TermId| usage.map_or(true, |u| u.used_cell(nt, t));

        if usage.is_some() {
            terminals.retain(|t| grammar.nonterminal_ids().any(|nt| {
                table.get(nt, *t).is_some() && keep(nt, *t)
            }));
        }

        let mut rows = Vec::new();
        for nt in grammar.nonterminal_ids() {
            let cells: Vec<Option<String>> = terminals
                .iter()
                .map(|t| {
                    table
                        .get(nt, *t)
                        .filter(|_| keep(nt, *t))
                        .map(|p| grammar.display_production(p).to_string())
                })
                .collect();
            if usage.is_some() && cells.iter().all(Option::is_none) {
                continue;
            }
            rows.push(TableRow {
                nonterminal: grammar.nonterminal_name(nt).to_string(),
                cells,
            });
        }

        TableReport {
            columns: terminals
                .iter()
                .map(|t| grammar.terminal_name(*t).to_string())
                .collect(),
            rows,
        }
    }

    pub fn write_csv<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let header: Vec<String> = std::iter::once(String::new())
            .chain(self.columns.iter().map(|c| csv_field(c)))
            .collect();
        writeln!(out, "{}", header.join(","))?;

        for row in &self.rows {
            let fields: Vec<String> = std::iter::once(csv_field(&row.nonterminal))
                .chain(
                    row.cells
                        .iter()
                        .map(|cell| cell.as_deref().map(csv_field).unwrap_or_default()),
                )
                .collect();
            writeln!(out, "{}", fields.join(","))?;
        }
        Ok(())
    }

    pub fn to_csv(&self) -> String {
        let mut out = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = self.write_csv(&mut out);
        String::from_utf8_lossy(&out).into_owned()
    }
}

/// Quotes a CSV field when it contains a separator, quote or line break.
fn csv_field(text: &str) -> String {
    if text.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{GrammarBuilder, ProdId};

    fn expr_grammar() -> Grammar {
        let mut builder = GrammarBuilder::new("E");
        builder
            .terminals(&["+", "*", "(", ")", "id"])
            .production("E", &["T", "E'"])
            .production("E'", &["+", "T", "E'"])
            .production("E'", &[])
            .production("T", &["F", "T'"])
            .production("T'", &["*", "F", "T'"])
            .production("T'", &[])
            .production("F", &["(", "E", ")"])
            .production("F", &["id"]);
        builder.build().unwrap()
    }

    fn analyze(grammar: &Grammar) -> (GrammarSets, PredictiveTable) {
        let sets = GrammarSets::compute(grammar).unwrap();
        let table = PredictiveTable::build(grammar, &sets);
        (sets, table)
    }

    #[test]
    fn test_sets_report_orders_names() {
        let g = expr_grammar();
        let (sets, table) = analyze(&g);
        let report = SetsReport::new(&g, &sets, &table);

        let names: Vec<&str> = report.sets.iter().map(|s| s.nonterminal.as_str()).collect();
        assert_eq!(names, vec!["E", "E'", "F", "T", "T'"]);

        let e_prime = &report.sets[1];
        assert_eq!(e_prime.first, vec!["ε", "+"]);
        assert_eq!(e_prime.follow, vec!["EOF", ")"]);

        assert_eq!(report.select[2].rule, "E' -> ε");
        assert_eq!(report.select[2].select, vec!["EOF", ")"]);
        assert_eq!(report.stats.conflicts, 0);
        assert_eq!(report.stats.productions, 8);
    }

    #[test]
    fn test_sets_report_text_and_json() {
        let g = expr_grammar();
        let (sets, table) = analyze(&g);
        let report = SetsReport::new(&g, &sets, &table);

        let text = report.to_string();
        assert!(text.starts_with("FIRST\n"));
        assert!(text.contains("FOLLOW\n"));
        assert!(text.contains("E' -> + T E'"));
        assert!(text.contains("0 conflict(s)"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stats"]["nonterminals"], 5);
        assert_eq!(json["sets"][0]["first"][0], "(");
    }

    #[test]
    fn test_conflicts_listed() {
        let mut builder = GrammarBuilder::new("S");
        builder
            .terminals(&["a"])
            .production("S", &["a"])
            .production("S", &["a", "a"]);
        let g = builder.build().unwrap();
        let (sets, table) = analyze(&g);
        let report = SetsReport::new(&g, &sets, &table);

        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].kept, "S -> a");
        assert_eq!(report.conflicts[0].rejected, "S -> a a");
        assert!(report.to_string().contains("conflict at [S, a]"));
    }

    #[test]
    fn test_table_csv() {
        let g = expr_grammar();
        let (_, table) = analyze(&g);
        let report = TableReport::new(&g, &table);

        assert_eq!(report.columns.last().map(String::as_str), Some("EOF"));
        assert_eq!(report.rows.len(), 5);

        let csv = report.to_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(",+,*,(,),id,EOF"));
        assert_eq!(lines.next(), Some("E,,,E -> T E',,E -> T E',"));
    }

    #[test]
    fn test_table_used_only() {
        let g = expr_grammar();
        let (_, table) = analyze(&g);
        let nt = |n: &str| g.nonterminal(n).unwrap();
        let t = |n: &str| g.terminal(n).unwrap();

        let mut usage = UsageLog::default();
        usage.record(nt("F"), t("id"), ProdId(7));
        let report = TableReport::used_only(&g, &table, &usage);

        assert_eq!(report.columns, vec!["id"]);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].cells, vec![Some("F -> id".to_string())]);
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("a"), "a");
        assert_eq!(csv_field(","), "\",\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
