//! Table extraction
//!
//! Only top-level tables are enumerated; a table nested inside another
//! table's cell is skipped, and its rows and cells never leak into the
//! enclosing table.

use super::record::ExtractedTable;
use super::{element_text, selector};
use scraper::{ElementRef, Html, Selector};

struct TableSelectors {
    table: Selector,
    row: Selector,
    head: Selector,
    cell: Selector,
}

impl TableSelectors {
    fn compile() -> Option<Self> {
        Some(Self {
            table: selector("table")?,
            row: selector("tr")?,
            head: selector("thead")?,
            cell: selector("th, td")?,
        })
    }
}

/// Extracts every top-level table that carries data
///
/// # Header Resolution
///
/// 1. Cells of the table's `<thead>`, if present
/// 2. Otherwise the first row, when it contains `<th>` cells or the table
///    has more than one row; that row is then not repeated as a body row
///
/// Rows whose cells are all empty are dropped. A table is kept only if it has
/// body rows or more than one header column.
pub fn extract_tables(document: &Html) -> Vec<ExtractedTable> {
    let selectors = match TableSelectors::compile() {
        Some(selectors) => selectors,
        None => return Vec::new(),
    };

    document
        .select(&selectors.table)
        .filter(|table| owning_table(table).is_none())
        .filter_map(|table| extract_table(table, &selectors))
        .collect()
}

fn extract_table(table: ElementRef, selectors: &TableSelectors) -> Option<ExtractedTable> {
    let body_rows: Vec<ElementRef> = table
        .select(&selectors.row)
        .filter(|row| owning_table(row) == Some(table) && !in_head(row, table))
        .collect();
    let head = table
        .select(&selectors.head)
        .find(|head| owning_table(head) == Some(table));

    let mut headers: Vec<String> = match head {
        Some(head) => head
            .select(&selectors.cell)
            .filter(|cell| owning_table(cell) == Some(table))
            .map(|cell| element_text(&cell))
            .collect(),
        None => Vec::new(),
    };

    // A header row taken from the body must not be repeated as data
    let mut header_from_first_row = false;
    if headers.is_empty() {
        if let Some(first) = body_rows.first() {
            let cells = row_cells(first, table, selectors);
            let has_header_cells = cells.iter().any(|cell| cell.value().name() == "th");
            if has_header_cells || body_rows.len() > 1 {
                headers = cells.iter().map(element_text).collect();
                header_from_first_row = true;
            }
        }
    }

    let body: Vec<Vec<String>> = body_rows
        .iter()
        .skip(usize::from(header_from_first_row))
        .map(|row| row_texts(row, table, selectors))
        .filter(|cells| cells.iter().any(|cell| !cell.is_empty()))
        .collect();

    if body.is_empty() && headers.len() <= 1 {
        return None;
    }

    Some(ExtractedTable {
        headers,
        rows: body,
    })
}

fn row_cells<'a>(
    row: &ElementRef<'a>,
    table: ElementRef<'a>,
    selectors: &TableSelectors,
) -> Vec<ElementRef<'a>> {
    row.select(&selectors.cell)
        .filter(|cell| owning_table(cell) == Some(table))
        .collect()
}

fn row_texts<'a>(
    row: &ElementRef<'a>,
    table: ElementRef<'a>,
    selectors: &TableSelectors,
) -> Vec<String> {
    row_cells(row, table, selectors)
        .iter()
        .map(element_text)
        .collect()
}

/// Returns the closest enclosing `<table>`, if any
fn owning_table<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "table")
}

/// Returns true if the row sits inside a `<thead>` of the given table
fn in_head<'a>(row: &ElementRef<'a>, table: ElementRef<'a>) -> bool {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .take_while(|ancestor| *ancestor != table)
        .any(|ancestor| ancestor.value().name() == "thead")
}
