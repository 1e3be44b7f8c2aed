// src/services/tables.rs

//! HTML table extraction and the salary block accessor.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::SourceConfig;
use crate::utils::normalize_whitespace;

/// Upper bound for `colspan`/`rowspan`, as browsers clamp them.
const MAX_SPAN: usize = 1000;

/// A table cell; `None` when the cell is empty.
pub type Cell = Option<String>;

/// One `<table>` with spans expanded into a rectangular-ish grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlTable {
    /// Rows from `<thead>`, or leading all-`<th>` rows when there is none
    pub header: Vec<Vec<Cell>>,
    /// Body rows followed by `<tfoot>` rows
    pub rows: Vec<Vec<Cell>>,
}

impl HtmlTable {
    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Head,
    Body,
    Foot,
}

struct RawRow {
    section: Section,
    cells: Vec<RawCell>,
}

struct RawCell {
    is_header: bool,
    text: Cell,
    colspan: usize,
    rowspan: usize,
}

/// Parse every table in a document, in document order.
///
/// Tables without any text, or without any row, are skipped and do not
/// take an index. Nested tables are returned as separate tables and their
/// rows are not counted in the enclosing table.
pub fn read_tables(html: &str) -> Result<Vec<HtmlTable>> {
    let document = Html::parse_document(html);
    let table_sel = parse_selector("table")?;
    let row_sel = parse_selector("tr")?;

    Ok(document
        .select(&table_sel)
        .filter(|table| table.text().any(|t| !t.trim().is_empty()))
        .map(|table| parse_table(table, &row_sel))
        .filter(|table| !table.header.is_empty() || !table.rows.is_empty())
        .collect())
}

fn parse_table(table: ElementRef<'_>, row_sel: &Selector) -> HtmlTable {
    let raw_rows: Vec<RawRow> = table
        .select(row_sel)
        .filter(|row| owning_table(*row).map(|t| t.id()) == Some(table.id()))
        .map(read_row)
        .collect();

    let mut head: Vec<&RawRow> = raw_rows.iter().filter(|r| r.section == Section::Head).collect();
    let mut body: Vec<&RawRow> = raw_rows.iter().filter(|r| r.section == Section::Body).collect();
    let foot: Vec<&RawRow> = raw_rows.iter().filter(|r| r.section == Section::Foot).collect();

    if head.is_empty() {
        let leading = body
            .iter()
            .take_while(|r| !r.cells.is_empty() && r.cells.iter().all(|c| c.is_header))
            .count();
        head = body.drain(..leading).collect();
    }
    body.extend(foot);

    HtmlTable {
        header: expand_spans(&head),
        rows: expand_spans(&body),
    }
}

fn owning_table(row: ElementRef<'_>) -> Option<ElementRef<'_>> {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
}

fn read_row(row: ElementRef<'_>) -> RawRow {
    let section = row
        .ancestors()
        .filter_map(ElementRef::wrap)
        .map(|el| el.value().name())
        .take_while(|name| *name != "table")
        .find_map(|name| match name {
            "thead" => Some(Section::Head),
            "tfoot" => Some(Section::Foot),
            "tbody" => Some(Section::Body),
            _ => None,
        })
        .unwrap_or(Section::Body);

    let cells = row
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .map(|el| {
            let text = normalize_whitespace(&el.text().collect::<String>());
            RawCell {
                is_header: el.value().name() == "th",
                text: (!text.is_empty()).then_some(text),
                colspan: span_attr(el, "colspan"),
                rowspan: span_attr(el, "rowspan"),
            }
        })
        .collect();

    RawRow { section, cells }
}

fn span_attr(el: ElementRef<'_>, name: &str) -> usize {
    el.value()
        .attr(name)
        .and_then(|v| v.trim().parse().ok())
        .filter(|n: &usize| *n > 0)
        .map(|n| n.min(MAX_SPAN))
        .unwrap_or(1)
}

/// Lay out cells on a grid, repeating spanned cells into every slot they cover.
fn expand_spans(rows: &[&RawRow]) -> Vec<Vec<Cell>> {
    // column -> (rows still covered, value)
    let mut carried: BTreeMap<usize, (usize, Cell)> = BTreeMap::new();
    let mut grid = Vec::with_capacity(rows.len());

    for row in rows {
        let mut out: Vec<Cell> = Vec::new();
        let mut column = 0;

        for cell in &row.cells {
            take_carried(&mut carried, &mut column, &mut out);
            for _ in 0..cell.colspan {
                out.push(cell.text.clone());
                if cell.rowspan > 1 {
                    carried.insert(column, (cell.rowspan - 1, cell.text.clone()));
                }
                column += 1;
            }
        }
        take_carried(&mut carried, &mut column, &mut out);

        grid.push(out);
    }

    grid
}

fn take_carried(
    carried: &mut BTreeMap<usize, (usize, Cell)>,
    column: &mut usize,
    out: &mut Vec<Cell>,
) {
    while let Some((left, value)) = carried.get_mut(&*column) {
        out.push(value.clone());
        *left -= 1;
        let exhausted = *left == 0;
        if exhausted {
            carried.remove(&*column);
        }
        *column += 1;
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// The captain pay block of an airline page.
///
/// Located purely by position (see [`SourceConfig`]); every position is
/// checked and a mismatch is an [`AppError::Shape`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalarySlice {
    pub capt_max: Cell,
    pub capt_min: Cell,
    pub date_capt_max: Cell,
    pub date_capt_min: Cell,
}

impl SalarySlice {
    /// Pick the salary block out of a page's tables.
    ///
    /// On error, the targeted table is handed back when it exists so the
    /// caller can keep it for diagnostics.
    pub fn locate<'a>(
        url: &str,
        tables: &'a [HtmlTable],
        source: &SourceConfig,
    ) -> std::result::Result<Self, (AppError, Option<&'a HtmlTable>)> {
        let table = tables.get(source.table_index).ok_or_else(|| {
            let err = AppError::shape(
                url,
                format!(
                    "expected at least {} tables, found {}",
                    source.table_index + 1,
                    tables.len()
                ),
            );
            (err, None)
        })?;

        let cell = |row: usize, column: usize| {
            table.cell(row, column).cloned().ok_or_else(|| {
                let err = AppError::shape(
                    url,
                    format!(
                        "table {} has no cell at row {}, column {} ({} rows)",
                        source.table_index,
                        row,
                        column,
                        table.rows.len()
                    ),
                );
                (err, Some(table))
            })
        };

        let first = source.first_row;
        Ok(Self {
            capt_max: cell(first, source.salary_column)?,
            capt_min: cell(first + 1, source.salary_column)?,
            date_capt_max: cell(first, source.date_column)?,
            date_capt_min: cell(first + 1, source.date_column)?,
        })
    }
}
