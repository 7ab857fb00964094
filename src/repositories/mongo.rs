use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};

use crate::domains::{Person, PersonDraft, PersonId};
use crate::error::{Result, StoreError};

use super::{PeopleRepository, PersonFilter, PersonPatch, PersonQuery};

const COLLECTION: &str = "people";

/// Repository backed by a document database reached through the driver.
///
/// Owns the client handle for its whole lifetime; call
/// [`MongoPeopleRepository::close`] to tear the connection down.
pub struct MongoPeopleRepository {
    client: Client,
    people: Collection<Person>,
}

impl MongoPeopleRepository {
    /// Connects and verifies the deployment is reachable.
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(StoreError::Connection)?;

        let db = client.database(database);
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(StoreError::Connection)?;
        tracing::info!(database, "connected to storage engine");

        let people = db.collection(COLLECTION);
        Ok(Self { client, people })
    }

    /// Connects using `MONGO_URI` and `MONGO_DATABASE`, with local defaults.
    pub async fn connect_from_env() -> Result<Self> {
        let uri =
            std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://0.0.0.0:27017".into());
        let database = std::env::var("MONGO_DATABASE").unwrap_or_else(|_| "people".into());

        Self::connect(&uri, &database).await
    }

    pub async fn close(self) {
        self.client.shutdown().await;
    }
}

#[async_trait]
impl PeopleRepository for MongoPeopleRepository {
    async fn insert_one(&self, draft: PersonDraft) -> Result<Person> {
        draft.validate()?;

        let person = draft.into_person(PersonId::generate());
        self.people
            .insert_one(&person)
            .await
            .map_err(StoreError::from_driver)?;

        Ok(person)
    }

    async fn insert_many(&self, drafts: Vec<PersonDraft>) -> Result<Vec<Person>> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        for draft in &drafts {
            draft.validate()?;
        }

        let people: Vec<_> = drafts
            .into_iter()
            .map(|draft| draft.into_person(PersonId::generate()))
            .collect();
        self.people
            .insert_many(&people)
            .await
            .map_err(StoreError::from_driver)?;

        Ok(people)
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Person>> {
        self.people
            .find(doc! { "name": name })
            .await
            .map_err(StoreError::from_driver)?
            .try_collect()
            .await
            .map_err(StoreError::from_driver)
    }

    async fn find_one_by_food(&self, food: &str) -> Result<Option<Person>> {
        self.people
            .find_one(doc! { "favoriteFoods": food })
            .await
            .map_err(StoreError::from_driver)
    }

    async fn find_by_id(&self, id: PersonId) -> Result<Option<Person>> {
        self.people
            .find_one(doc! { "_id": id })
            .await
            .map_err(StoreError::from_driver)
    }

    async fn save(&self, person: &Person) -> Result<()> {
        let result = self
            .people
            .replace_one(doc! { "_id": person.id }, person)
            .await
            .map_err(StoreError::from_driver)?;

        if result.matched_count == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn update_first(&self, filter: PersonFilter, patch: PersonPatch) -> Result<Person> {
        if patch.is_empty() {
            return Err(StoreError::Validation("patch sets no fields".into()));
        }

        self.people
            .find_one_and_update(filter.to_document(), patch.to_update_document())
            .return_document(ReturnDocument::After)
            .await
            .map_err(StoreError::from_driver)?
            .ok_or(StoreError::NotFound)
    }

    async fn delete_by_id(&self, id: PersonId) -> Result<Person> {
        self.people
            .find_one_and_delete(doc! { "_id": id })
            .await
            .map_err(StoreError::from_driver)?
            .ok_or(StoreError::NotFound)
    }

    async fn delete_many(&self, filter: PersonFilter) -> Result<u64> {
        let result = self
            .people
            .delete_many(filter.to_document())
            .await
            .map_err(StoreError::from_driver)?;

        Ok(result.deleted_count)
    }

    async fn search(&self, query: PersonQuery) -> Result<Vec<Person>> {
        let mut find = self.people.find(query.filter.to_document());
        if let Some(sort) = query.sort_document() {
            find = find.sort(sort);
        }
        if let Some(limit) = query.limit {
            find = find.limit(i64::from(limit));
        }
        if let Some(projection) = query.projection_document() {
            find = find.projection(projection);
        }

        find.await
            .map_err(StoreError::from_driver)?
            .try_collect()
            .await
            .map_err(StoreError::from_driver)
    }
}
