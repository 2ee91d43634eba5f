//! Orders to rows: one row per order position.
//!
//! Fixed order and position fields come first, followed by one column per
//! distinct question text. Question columns are named by display text, not
//! by id, so two questions sharing a text share a column.

mod columns;

pub use columns::ColumnAllocator;

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::debug;

use crate::pretix::{Item, ItemRef, Order, Question};
use crate::table::{Cell, Table};

/// Column holding the order status code.
pub const STATUS_COLUMN: &str = "status";

/// Fixed leading columns of the raw table.
pub const FIXED_COLUMNS: [&str; 18] = [
    "order_code",
    STATUS_COLUMN,
    "email",
    "total",
    "date",
    "invoice_name",
    "invoice_company",
    "invoice_street",
    "invoice_zipcode",
    "invoice_city",
    "invoice_country",
    "invoice_vat_id",
    "position_id",
    "item_id",
    "item_name",
    "price",
    "attendee_firstname",
    "attendee_lastname",
];

/// Question id to display text, in listing order.
pub type QuestionIndex = IndexMap<i64, String>;

/// Item id to display name.
pub type ItemIndex = HashMap<i64, String>;

pub fn question_index(questions: &[Question]) -> QuestionIndex {
    questions.iter().map(|q| (q.id, q.text())).collect()
}

pub fn item_index(items: &[Item]) -> ItemIndex {
    items.iter().map(|i| (i.id, i.display_name())).collect()
}

struct PendingRow {
    fixed: Vec<Cell>,
    answers: HashMap<String, String>,
}

/// Flatten orders into the raw table.
///
/// Every question in `questions` ends up as exactly one column, answered or
/// not. Missing values are empty strings. The same input always yields the
/// same table.
pub fn flatten(orders: &[Order], questions: &QuestionIndex, items: &ItemIndex) -> Table {
    let mut allocator = ColumnAllocator::new(FIXED_COLUMNS);
    let mut pending = Vec::new();

    for order in orders {
        let order_cells = order_cells(order);

        for position in &order.positions {
            let item_name = match &position.item {
                ItemRef::Embedded { name, .. } => name.display(),
                ItemRef::Id(id) => items
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| format!("Item {}", id)),
            };
            let names = position.attendee_name_parts.clone().unwrap_or_default();

            let mut fixed = order_cells.clone();
            fixed.extend([
                Cell::Integer(position.id),
                Cell::Integer(position.item.id()),
                Cell::Text(item_name),
                Cell::Text(position.price.clone()),
                Cell::Text(names.given_name),
                Cell::Text(names.family_name),
            ]);

            let mut answers = HashMap::new();
            for answer in &position.answers {
                let qid = answer.question.id();
                let text = questions
                    .get(&qid)
                    .cloned()
                    .unwrap_or_else(|| format!("question_{}", qid));
                let column = allocator.column_for(&text).to_string();
                answers.insert(column, answer.answer.clone());
            }

            pending.push(PendingRow { fixed, answers });
        }
    }

    // unanswered questions still get a column
    for text in questions.values() {
        allocator.column_for(text);
    }

    let question_columns = allocator.columns().to_vec();
    for column in &question_columns {
        if let Some(text) = allocator.text_of(column).filter(|text| *text != column.as_str()) {
            debug!("Question '{}' stored in column '{}'", text, column);
        }
    }
    let mut columns: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(question_columns.iter().cloned());

    let mut table = Table::new(columns);
    for mut row in pending {
        let answers = question_columns
            .iter()
            .map(|col| row.answers.remove(col).map(Cell::Text).unwrap_or_default());
        row.fixed.extend(answers);
        table.push_row(row.fixed);
    }

    table
}

fn order_cells(order: &Order) -> Vec<Cell> {
    let invoice = order.invoice_address.clone().unwrap_or_default();
    vec![
        Cell::Text(order.code.clone()),
        Cell::Text(order.status.code().to_string()),
        Cell::Text(order.email.clone()),
        Cell::Text(order.total.clone()),
        Cell::Text(order.datetime.clone()),
        Cell::Text(invoice.name),
        Cell::Text(invoice.company),
        Cell::Text(invoice.street),
        Cell::Text(invoice.zipcode),
        Cell::Text(invoice.city),
        Cell::Text(invoice.country),
        Cell::Text(invoice.vat_id),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pretix::{Answer, LocalizedText, NameParts, OrderStatus, Position, QuestionRef};

    fn text(s: &str) -> LocalizedText {
        [("de", s)].into_iter().collect()
    }

    fn position(id: i64, item: ItemRef, answers: &[(i64, &str)]) -> Position {
        Position {
            id,
            item,
            price: "10.00".to_string(),
            attendee_name_parts: Some(NameParts {
                given_name: "Max".to_string(),
                family_name: "Muster".to_string(),
            }),
            answers: answers
                .iter()
                .map(|(q, a)| Answer {
                    question: QuestionRef::Id(*q),
                    answer: a.to_string(),
                })
                .collect(),
        }
    }

    fn order(code: &str, positions: Vec<Position>) -> Order {
        Order {
            code: code.to_string(),
            status: OrderStatus::Paid,
            email: "a@example.org".to_string(),
            total: "10.00".to_string(),
            datetime: "2024-05-01T10:00:00Z".to_string(),
            invoice_address: None,
            positions,
        }
    }

    fn questions(entries: &[(i64, &str)]) -> QuestionIndex {
        entries.iter().map(|(id, t)| (*id, t.to_string())).collect()
    }

    #[test]
    fn test_fixed_columns_come_first() {
        let orders = vec![order("ABC", vec![position(1, ItemRef::Id(7), &[(1, "x")])])];
        let table = flatten(&orders, &questions(&[(1, "Q1")]), &ItemIndex::new());

        assert_eq!(&table.columns()[..18], FIXED_COLUMNS.map(String::from).as_slice());
        assert_eq!(table.columns()[18], "Q1");
        assert_eq!(table.cell(0, "position_id"), Some(&Cell::Integer(1)));
        assert_eq!(table.cell(0, "item_id"), Some(&Cell::Integer(7)));
        assert_eq!(table.text(0, "invoice_city"), "");
        assert_eq!(table.text(0, "attendee_lastname"), "Muster");
    }

    #[test]
    fn test_item_name_resolution() {
        let orders = vec![order(
            "ABC",
            vec![
                position(1, ItemRef::Id(7), &[]),
                position(2, ItemRef::Id(42), &[]),
                position(
                    3,
                    ItemRef::Embedded {
                        id: 9,
                        name: text("Mitarbeiter"),
                    },
                    &[],
                ),
            ],
        )];
        let items: ItemIndex = [(7, "Jungscharler".to_string())].into_iter().collect();
        let table = flatten(&orders, &QuestionIndex::new(), &items);

        assert_eq!(table.text(0, "item_name"), "Jungscharler");
        assert_eq!(table.text(1, "item_name"), "Item 42");
        assert_eq!(table.text(2, "item_name"), "Mitarbeiter");
        assert_eq!(table.cell(2, "item_id"), Some(&Cell::Integer(9)));
    }

    #[test]
    fn test_same_text_merges_into_one_column() {
        let orders = vec![order(
            "ABC",
            vec![
                position(1, ItemRef::Id(1), &[(1, "Stuttgart")]),
                position(2, ItemRef::Id(1), &[(2, "Esslingen")]),
            ],
        )];
        let index = questions(&[(1, "Ort"), (2, "Ort")]);
        let table = flatten(&orders, &index, &ItemIndex::new());

        let ort_columns = table.columns().iter().filter(|c| c.starts_with("Ort")).count();
        assert_eq!(ort_columns, 1);
        assert_eq!(table.text(0, "Ort"), "Stuttgart");
        assert_eq!(table.text(1, "Ort"), "Esslingen");
    }

    #[test]
    fn test_unanswered_questions_get_empty_columns() {
        let orders = vec![order("ABC", vec![position(1, ItemRef::Id(1), &[(2, "b")])])];
        let index = questions(&[(1, "First"), (2, "Second"), (3, "Third")]);
        let table = flatten(&orders, &index, &ItemIndex::new());

        assert_eq!(&table.columns()[18..], &["Second", "First", "Third"]);
        assert_eq!(table.text(0, "First"), "");
        assert_eq!(table.text(0, "Second"), "b");
    }

    #[test]
    fn test_unknown_question_gets_placeholder() {
        let orders = vec![order("ABC", vec![position(1, ItemRef::Id(1), &[(99, "x")])])];
        let table = flatten(&orders, &QuestionIndex::new(), &ItemIndex::new());
        assert_eq!(table.text(0, "question_99"), "x");
    }

    #[test]
    fn test_question_named_like_fixed_column() {
        let orders = vec![order("ABC", vec![position(1, ItemRef::Id(1), &[(1, "other")])])];
        let table = flatten(&orders, &questions(&[(1, "email")]), &ItemIndex::new());
        assert_eq!(table.text(0, "email"), "a@example.org");
        assert_eq!(table.text(0, "email (#2)"), "other");
    }

    #[test]
    fn test_no_orders_keeps_schema() {
        let table = flatten(&[], &questions(&[(1, "Q")]), &ItemIndex::new());
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), 19);
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let orders = vec![
            order("A", vec![position(1, ItemRef::Id(1), &[(1, "x"), (2, "y")])]),
            order("B", vec![position(2, ItemRef::Id(2), &[(2, "z")])]),
        ];
        let index = questions(&[(1, "Q1"), (2, "Q2"), (3, "Q3")]);
        let first = flatten(&orders, &index, &ItemIndex::new());
        let second = flatten(&orders, &index, &ItemIndex::new());
        assert_eq!(first, second);
    }
}
