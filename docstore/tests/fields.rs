use docstore::{
    DocumentFields,
    bson::{self, Bson},
    document::FieldRegistry,
    error::ErrorKind,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, DocumentFields)]
#[serde(rename_all = "camelCase")]
struct Order {
    order_id: String,
    total_cents: i64,
    #[serde(rename = "sku")]
    item_code: String,
    #[serde(skip)]
    cached_label: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, DocumentFields)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
struct Shipment {
    tracking_number: String,
    #[serde(rename(serialize = "dest", deserialize = "destination"))]
    destination: String,
    #[serde(skip_serializing, default)]
    internal_note: String,
}

#[test]
fn names_follow_serde_renames() {
    assert_eq!(Order::field_names(), &["orderId", "totalCents", "sku"]);
    assert_eq!(Shipment::field_names(), &["TRACKING_NUMBER", "dest"]);
}

#[test]
fn registered_names_match_the_serialized_keys() {
    let order = Order::default();
    let serialized = bson::ser::serialize_to_document(&order).unwrap();

    let keys: Vec<_> = serialized.keys().map(String::as_str).collect();
    assert_eq!(keys, Order::field_names());
}

#[test]
fn values_are_converted_to_bson() {
    let order = Order {
        order_id: "A-1".into(),
        total_cents: 1250,
        item_code: "SKU-9".into(),
        cached_label: Some("ignored".into()),
    };

    assert_eq!(order.field_value("orderId").unwrap(), Bson::from("A-1"));
    assert_eq!(order.field_value("totalCents").unwrap(), Bson::Int64(1250));
    assert_eq!(order.field_value("sku").unwrap(), Bson::from("SKU-9"));
}

#[test]
fn rust_names_and_skipped_fields_are_unknown() {
    let order = Order::default();

    for name in ["order_id", "cached_label", "cachedLabel", ""] {
        let err = order.field_value(name).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownField, "{name}");
    }
    assert!(Shipment::default().field_value("INTERNAL_NOTE").is_err());
}
