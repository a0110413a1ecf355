use bookstore_core::{Book, Cart, Inventory, OrderReceipt};
use rust_decimal::Decimal;

const CATALOG_HEADERS: [&str; 4] = ["Book ID", "Title", "Author", "Price"];
const CART_HEADERS: [&str; 3] = ["Book ID", "Title", "Price"];

pub fn format_price(price: Decimal) -> String {
    format!("${price}")
}

pub fn catalog_table(inventory: &Inventory) -> String {
    let rows = inventory
        .books()
        .iter()
        .map(|book| {
            vec![
                book.id.to_string(),
                book.title.clone(),
                book.author.clone(),
                format_price(book.price),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&CATALOG_HEADERS, &rows)
}

/// Cart rows never show an author.
pub fn cart_table(cart: &Cart) -> String {
    line_item_table(cart.items())
}

pub fn order_summary(receipt: &OrderReceipt) -> String {
    [
        "\nOrder Summary:".to_string(),
        line_item_table(&receipt.lines),
        format!("\nTotal Price: {}", format_price(receipt.total)),
        format!("Order placed successfully. Thank you, {}!", receipt.username),
    ]
    .join("\n")
}

fn line_item_table(items: &[Book]) -> String {
    let rows = items
        .iter()
        .map(|item| vec![item.id.to_string(), item.title.clone(), format_price(item.price)])
        .collect::<Vec<_>>();
    render_table(&CART_HEADERS, &rows)
}

/// Boxed table with every cell centred in its column.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths = headers
        .iter()
        .enumerate()
        .map(|(column, header)| {
            rows.iter()
                .filter_map(|row| row.get(column))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();

    let border = widths
        .iter()
        .map(|width| "-".repeat(width + 2))
        .collect::<Vec<_>>()
        .join("+");
    let border = format!("+{border}+");

    let mut lines = vec![border.clone()];
    lines.push(render_row(&widths, headers.iter().copied()));
    lines.push(border.clone());
    for row in rows {
        lines.push(render_row(&widths, row.iter().map(String::as_str)));
    }
    if !rows.is_empty() {
        lines.push(border);
    }
    lines.join("\n")
}

fn render_row<'a>(widths: &[usize], mut cells: impl Iterator<Item = &'a str>) -> String {
    let cells = widths
        .iter()
        .map(|&width| format!(" {:^width$} ", cells.next().unwrap_or("")))
        .collect::<Vec<_>>()
        .join("|");
    format!("|{cells}|")
}
