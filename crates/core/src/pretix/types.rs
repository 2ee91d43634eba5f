//! pretix REST API records, reduced to the fields the reports need.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// A language-tagged text as delivered by pretix (`{"de": "...", "en": "..."}`).
///
/// Insertion order is kept so "first available language" is the first one
/// the API sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(IndexMap<String, String>);

impl LocalizedText {
    /// Preferred display text: German when present and non-empty, otherwise
    /// the first language.
    pub fn display(&self) -> String {
        self.0
            .get("de")
            .filter(|s| !s.is_empty())
            .or_else(|| self.0.values().next())
            .cloned()
            .unwrap_or_default()
    }

    pub fn get(&self, lang: &str) -> Option<&str> {
        self.0.get(lang).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocalizedText {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A question asked during checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question: LocalizedText,
}

impl Question {
    pub fn text(&self) -> String {
        self.question.display()
    }
}

/// A product that can be ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: LocalizedText,
}

impl Item {
    pub fn display_name(&self) -> String {
        self.name.display()
    }
}

/// Order status codes used by pretix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Paid,
    Expired,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    /// The single-letter code pretix uses on the wire.
    pub fn code(&self) -> &str {
        match self {
            OrderStatus::Pending => "n",
            OrderStatus::Paid => "p",
            OrderStatus::Expired => "e",
            OrderStatus::Cancelled => "c",
            OrderStatus::Other(code) => code,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, OrderStatus::Cancelled)
    }
}

impl From<String> for OrderStatus {
    fn from(code: String) -> Self {
        match code.as_str() {
            "n" => OrderStatus::Pending,
            "p" => OrderStatus::Paid,
            "e" => OrderStatus::Expired,
            "c" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(code),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.code().to_string()
    }
}

/// Invoice address attached to an order. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceAddress {
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub company: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub street: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub zipcode: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub country: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub vat_id: String,
}

/// An order with its positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub code: String,
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(deserialize_with = "string_or_number")]
    pub total: String,
    pub datetime: String,
    #[serde(default)]
    pub invoice_address: Option<InvoiceAddress>,
    #[serde(default)]
    pub positions: Vec<Position>,
}

/// Reference to an item: either its id or the embedded object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemRef {
    Id(i64),
    Embedded { id: i64, name: LocalizedText },
}

impl ItemRef {
    pub fn id(&self) -> i64 {
        match self {
            ItemRef::Id(id) | ItemRef::Embedded { id, .. } => *id,
        }
    }
}

/// Attendee name split into parts. Other scheme keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameParts {
    #[serde(deserialize_with = "null_as_empty")]
    pub given_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub family_name: String,
}

/// One registered ticket inside an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: i64,
    pub item: ItemRef,
    #[serde(deserialize_with = "string_or_number")]
    pub price: String,
    #[serde(default)]
    pub attendee_name_parts: Option<NameParts>,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// Reference to a question: either its id or the embedded object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionRef {
    Id(i64),
    Embedded { id: i64 },
}

impl QuestionRef {
    pub fn id(&self) -> i64 {
        match self {
            QuestionRef::Id(id) | QuestionRef::Embedded { id } => *id,
        }
    }
}

/// Answer to a question on a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question: QuestionRef,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub answer: String,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Money amounts arrive as decimal strings, but accept plain numbers too.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Text(String),
        Number(serde_json::Number),
        Null(()),
    }

    Ok(match Amount::deserialize(deserializer)? {
        Amount::Text(s) => s,
        Amount::Number(n) => n.to_string(),
        Amount::Null(()) => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_localized_text_prefers_german() {
        let text: LocalizedText = [("en", "Town"), ("de", "Ort")].into_iter().collect();
        assert_eq!(text.display(), "Ort");
    }

    #[test]
    fn test_localized_text_falls_back_to_first_language() {
        let text: LocalizedText = [("fr", "Ville"), ("en", "Town")].into_iter().collect();
        assert_eq!(text.display(), "Ville");
        assert_eq!(LocalizedText::default().display(), "");
    }

    #[test]
    fn test_deserialize_order() {
        let order: Order = serde_json::from_value(json!({
            "code": "ABC12",
            "status": "p",
            "email": null,
            "total": "23.00",
            "datetime": "2025-03-01T10:00:00Z",
            "invoice_address": {"name": "Erika", "city": null},
            "positions": [{
                "id": 7,
                "item": 3,
                "price": 11.5,
                "attendee_name_parts": {"_scheme": "given_family", "given_name": "Max"},
                "answers": [{"question": 9, "answer": "Musterstadt"}]
            }]
        }))
        .unwrap();

        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.email, "");
        let invoice = order.invoice_address.unwrap();
        assert_eq!(invoice.name, "Erika");
        assert_eq!(invoice.city, "");
        assert_eq!(invoice.vat_id, "");

        let position = &order.positions[0];
        assert_eq!(position.item, ItemRef::Id(3));
        assert_eq!(position.price, "11.5");
        let names = position.attendee_name_parts.clone().unwrap();
        assert_eq!(names.given_name, "Max");
        assert_eq!(names.family_name, "");
        assert_eq!(position.answers[0].question.id(), 9);
    }

    #[test]
    fn test_deserialize_embedded_refs() {
        let position: Position = serde_json::from_value(json!({
            "id": 1,
            "item": {"id": 5, "name": {"de": "Teilnehmer"}},
            "price": "0.00",
            "answers": [{"question": {"id": 4, "question": {"de": "Ort"}}, "answer": "X"}]
        }))
        .unwrap();

        assert_eq!(position.item.id(), 5);
        assert!(matches!(position.item, ItemRef::Embedded { .. }));
        assert_eq!(position.answers[0].question, QuestionRef::Embedded { id: 4 });
        assert!(position.attendee_name_parts.is_none());
    }

    #[test]
    fn test_order_status_codes() {
        assert!(OrderStatus::from("c".to_string()).is_cancelled());
        assert_eq!(OrderStatus::from("x".to_string()).code(), "x");
        assert_eq!(String::from(OrderStatus::Expired), "e");
    }

    #[test]
    fn test_page_without_next() {
        let page: Page<Question> = serde_json::from_value(json!({
            "count": 1,
            "results": [{"id": 1, "question": {"de": "Ort"}}]
        }))
        .unwrap();
        assert!(page.next.is_none());
        assert_eq!(page.results[0].text(), "Ort");
    }
}
