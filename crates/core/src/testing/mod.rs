//! Testing utilities and mock implementations.
//!
//! Mocks stand in for pretix and Nextcloud so a whole cycle can run without
//! network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use p2n_core::testing::{fixtures, MockPretixSource, MockPublisher};
//!
//! let source = MockPretixSource::new();
//! fixtures::load_teencamp(&source).await;
//! let publisher = MockPublisher::new();
//! ```

mod mock_pretix;
mod mock_publisher;

pub use mock_pretix::MockPretixSource;
pub use mock_publisher::{MockPublisher, PublishedContent, PublishedFile};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::json;

    use super::MockPretixSource;
    use crate::pretix::{
        Answer, InvoiceAddress, Item, ItemRef, LocalizedText, NameParts, Order, OrderStatus,
        Position, Question, QuestionRef,
    };

    pub const LOCATION_QUESTION_ID: i64 = 10;
    pub const PARENT_PHONE_QUESTION_ID: i64 = 11;
    pub const STAFF_PHONE_QUESTION_ID: i64 = 12;
    pub const CHILD_ITEM_ID: i64 = 1;
    pub const STAFF_ITEM_ID: i64 = 2;

    /// Location question text as asked at checkout.
    pub const LOCATION_QUESTION: &str = "Ich melde mich über folgende Ortschaft an";

    pub fn text(value: &str) -> LocalizedText {
        [("de", value)].into_iter().collect()
    }

    pub fn question(id: i64, value: &str) -> Question {
        Question {
            id,
            question: text(value),
        }
    }

    pub fn item(id: i64, name: &str) -> Item {
        Item {
            id,
            name: text(name),
        }
    }

    pub fn answer(question_id: i64, value: &str) -> Answer {
        Answer {
            question: QuestionRef::Id(question_id),
            answer: value.to_string(),
        }
    }

    /// A position with an attendee name and the given answers.
    pub fn position(
        id: i64,
        item_id: i64,
        given: &str,
        family: &str,
        answers: Vec<Answer>,
    ) -> Position {
        Position {
            id,
            item: ItemRef::Id(item_id),
            price: "0.00".to_string(),
            attendee_name_parts: Some(NameParts {
                given_name: given.to_string(),
                family_name: family.to_string(),
            }),
            answers,
        }
    }

    /// A paid order placed at `datetime` (RFC 3339).
    pub fn order(code: &str, datetime: &str, positions: Vec<Position>) -> Order {
        Order {
            code: code.to_string(),
            status: OrderStatus::Paid,
            email: format!("{}@example.org", code.to_lowercase()),
            total: "0.00".to_string(),
            datetime: datetime.to_string(),
            invoice_address: Some(InvoiceAddress::default()),
            positions,
        }
    }

    pub fn cancelled(mut order: Order) -> Order {
        order.status = OrderStatus::Cancelled;
        order
    }

    pub fn teencamp_questions() -> Vec<Question> {
        vec![
            question(LOCATION_QUESTION_ID, LOCATION_QUESTION),
            question(PARENT_PHONE_QUESTION_ID, "Telefonnummer der Eltern"),
            question(STAFF_PHONE_QUESTION_ID, "Telefonnummer"),
        ]
    }

    pub fn teencamp_items() -> Vec<Item> {
        vec![
            item(CHILD_ITEM_ID, "Jungscharler"),
            item(STAFF_ITEM_ID, "Mitarbeiter"),
        ]
    }

    pub fn child(id: i64, given: &str, family: &str, location: &str) -> Position {
        position(
            id,
            CHILD_ITEM_ID,
            given,
            family,
            vec![
                answer(LOCATION_QUESTION_ID, location),
                answer(PARENT_PHONE_QUESTION_ID, "0711 123"),
            ],
        )
    }

    pub fn staff(id: i64, given: &str, family: &str, location: &str) -> Position {
        position(
            id,
            STAFF_ITEM_ID,
            given,
            family,
            vec![
                answer(LOCATION_QUESTION_ID, location),
                answer(STAFF_PHONE_QUESTION_ID, "0170 456"),
            ],
        )
    }

    /// Three children and two staff in Musterstadt, one child in Beispielhausen.
    pub fn teencamp_orders() -> Vec<Order> {
        vec![
            order(
                "AAA01",
                "2025-03-01T09:30:00Z",
                vec![
                    child(1, "Max", "Mustermann", "Musterstadt"),
                    child(2, "Erika", "Mustermann", "Musterstadt"),
                ],
            ),
            order(
                "BBB02",
                "2025-03-02T12:00:00Z",
                vec![child(3, "Paul", "Beispiel", "Musterstadt")],
            ),
            order(
                "CCC03",
                "2025-03-03T18:15:00Z",
                vec![
                    staff(4, "Anna", "Leiterin", "Musterstadt"),
                    staff(5, "Ben", "Leiter", "Musterstadt"),
                ],
            ),
            order(
                "DDD04",
                "2025-03-04T07:45:00Z",
                vec![child(6, "Lena", "Fremd", "Beispielhausen")],
            ),
        ]
    }

    /// Detail record of the location question with its answer options.
    pub fn location_detail() -> serde_json::Value {
        json!({
            "id": LOCATION_QUESTION_ID,
            "options": [
                {"answer": {"de": "Musterstadt"}},
                {"answer": {"de": "Beispielhausen"}},
                {"answer": {"de": "Leerdorf"}}
            ]
        })
    }

    /// Load the teencamp event into a mock source.
    pub async fn load_teencamp(source: &MockPretixSource) {
        source.set_questions(teencamp_questions()).await;
        source.set_items(teencamp_items()).await;
        source.set_orders(teencamp_orders()).await;
        source
            .set_question_detail(LOCATION_QUESTION_ID, location_detail())
            .await;
    }
}
