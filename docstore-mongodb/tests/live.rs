//! Runs against a MongoDB server on localhost. Start one and run with `--ignored`.

use bson::oid::ObjectId;
use docstore_core::{
    config::StoreConfig,
    document::Document,
    error::ErrorKind,
    store::DocumentStore,
};
use docstore_macros::DocumentFields;
use docstore_mongodb::MongoDbStore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, DocumentFields)]
#[docstore(crate = "docstore_core")]
struct Person {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    #[serde(rename = "firstName")]
    first_name: String,
    #[serde(rename = "lastName")]
    last_name: String,
}

impl Document for Person {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

fn store() -> DocumentStore<MongoDbStore> {
    DocumentStore::new(
        MongoDbStore::new(Default::default()),
        StoreConfig::builder()
            .uri("mongodb://localhost:27017")
            .timeout_secs(5)
            .database("testdb")
            .collection("testcol")
            .build(),
    )
}

#[tokio::test]
#[ignore = "requires a MongoDB server on localhost:27017"]
async fn crud_round_trip() {
    let store = store();

    let mut person = Person {
        first_name: "John".into(),
        last_name: "Doe".into(),
        ..Default::default()
    };
    store.create(&mut person).await.unwrap();
    let id = person.id.unwrap().to_hex();

    let mut found = Person::default();
    store.get_by_id(&mut found, &id).await.unwrap();
    assert_eq!(found, person);

    person.first_name = "Jane".into();
    store.update(&person, &id).await.unwrap();
    let mut updated = Person::default();
    store.get_by_id(&mut updated, &id).await.unwrap();
    assert_eq!(updated.first_name, "Jane");

    let matches = store
        .query(&Person::default(), &["firstName".into(), "Jane".into()])
        .await
        .unwrap();
    assert!(matches.iter().any(|p| p.id == person.id));

    store.delete(&person, &id).await.unwrap();
    let err = store.get_by_id(&mut Person::default(), &id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    store.shutdown().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a MongoDB server on localhost:27017"]
async fn clients_are_shared_per_uri() {
    let store = store();

    store.connect().await.unwrap();
    store.connect().await.unwrap();

    assert_eq!(store.backend().pool().len().await, 1);
}
