pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use mongodb::bson::{doc, Document};

use crate::domains::{Person, PersonDraft, PersonId};
use crate::error::{Result, StoreError};

/// Predicate selecting people records.
#[derive(Debug, Clone)]
pub enum PersonFilter {
    /// Exact name match.
    Name(String),
    /// Membership in the favorite foods list.
    Food(String),
}

impl PersonFilter {
    pub(crate) fn to_document(&self) -> Document {
        match self {
            Self::Name(name) => doc! { "name": name.as_str() },
            Self::Food(food) => doc! { "favoriteFoods": food.as_str() },
        }
    }

    pub(crate) fn matches(&self, person: &Person) -> bool {
        match self {
            Self::Name(name) => person.name == *name,
            Self::Food(food) => person.favorite_foods.iter().any(|f| f == food),
        }
    }
}

/// Field-level patch applied in one storage-layer operation.
#[derive(Debug, Clone, Default)]
pub struct PersonPatch {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub favorite_foods: Option<Vec<String>>,
}

impl PersonPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.favorite_foods.is_none()
    }

    pub(crate) fn to_update_document(&self) -> Document {
        let mut set = Document::new();
        if let Some(name) = &self.name {
            set.insert("name", name.as_str());
        }
        if let Some(age) = self.age {
            set.insert("age", age);
        }
        if let Some(foods) = &self.favorite_foods {
            set.insert("favoriteFoods", foods.clone());
        }

        doc! { "$set": set }
    }

    pub(crate) fn apply(&self, person: &mut Person) {
        if let Some(name) = &self.name {
            person.name = name.clone();
        }
        if let Some(age) = self.age {
            person.age = Some(age);
        }
        if let Some(foods) = &self.favorite_foods {
            person.favorite_foods = foods.clone();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Age,
}

impl SortKey {
    fn field(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Age => "age",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Query chain over the collection: filter, sort, limit, field omission.
///
/// Everything here executes inside the storage engine; results are never
/// post-filtered in application memory. Only the optional fields can be
/// omitted — a record without its required name could not be materialized.
/// An omitted age comes back as `None`, omitted foods as the empty list.
#[derive(Debug, Clone)]
pub struct PersonQuery {
    pub(crate) filter: PersonFilter,
    pub(crate) sort: Option<(SortKey, SortOrder)>,
    pub(crate) limit: Option<u32>,
    pub(crate) omit_age: bool,
    pub(crate) omit_favorite_foods: bool,
}

impl PersonQuery {
    pub fn new(filter: PersonFilter) -> Self {
        Self {
            filter,
            sort: None,
            limit: None,
            omit_age: false,
            omit_favorite_foods: false,
        }
    }

    pub fn sort(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort = Some((key, order));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn omit_age(mut self) -> Self {
        self.omit_age = true;
        self
    }

    pub fn omit_favorite_foods(mut self) -> Self {
        self.omit_favorite_foods = true;
        self
    }

    pub(crate) fn sort_document(&self) -> Option<Document> {
        self.sort.map(|(key, order)| {
            let direction = match order {
                SortOrder::Ascending => 1,
                SortOrder::Descending => -1,
            };

            let mut sort = Document::new();
            sort.insert(key.field(), direction);
            sort
        })
    }

    pub(crate) fn projection_document(&self) -> Option<Document> {
        let mut projection = Document::new();
        if self.omit_age {
            projection.insert("age", 0);
        }
        if self.omit_favorite_foods {
            projection.insert("favoriteFoods", 0);
        }

        (!projection.is_empty()).then_some(projection)
    }
}

/// Typed, asynchronous access to the `people` collection.
///
/// Each operation is a single round trip with no observable intermediate
/// state. Failures are surfaced to the caller unretried.
#[async_trait]
pub trait PeopleRepository: Send + Sync {
    /// Persists one draft, returning the record with its generated id.
    async fn insert_one(&self, draft: PersonDraft) -> Result<Person>;

    /// Persists all drafts in one call, preserving input order.
    async fn insert_many(&self, drafts: Vec<PersonDraft>) -> Result<Vec<Person>>;

    async fn find_by_name(&self, name: &str) -> Result<Vec<Person>>;

    /// First record listing `food` among its favorites, in engine order.
    async fn find_one_by_food(&self, food: &str) -> Result<Option<Person>>;

    async fn find_by_id(&self, id: PersonId) -> Result<Option<Person>>;

    /// Replaces the stored record wholesale. Last write wins.
    async fn save(&self, person: &Person) -> Result<()>;

    /// Patches the first record matching `filter` at the storage layer and
    /// returns the post-update record. No read-then-write race on this path.
    async fn update_first(&self, filter: PersonFilter, patch: PersonPatch) -> Result<Person>;

    /// Deletes and returns the removed record.
    async fn delete_by_id(&self, id: PersonId) -> Result<Person>;

    /// Deletes every matching record, returning the count. Zero matches is
    /// a successful zero.
    async fn delete_many(&self, filter: PersonFilter) -> Result<u64>;

    async fn search(&self, query: PersonQuery) -> Result<Vec<Person>>;

    /// Loads by id, applies the in-memory mutation, persists the full record.
    ///
    /// Not atomic: a concurrent write between the load and the save is
    /// silently overwritten. [`PeopleRepository::update_first`] is the
    /// race-free path.
    async fn load_modify_save(
        &self,
        id: PersonId,
        mutate: Box<dyn for<'a> FnOnce(&'a mut Person) + Send>,
    ) -> Result<Person> {
        let mut person = self.find_by_id(id).await?.ok_or(StoreError::NotFound)?;
        mutate(&mut person);
        self.save(&person).await?;

        Ok(person)
    }
}
