use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domains::{Person, PersonDraft, PersonId};
use crate::error::{Result, StoreError};

use super::{PeopleRepository, PersonFilter, PersonPatch, PersonQuery, SortKey, SortOrder};

/// In-process repository keeping records in insertion order.
///
/// Implements the same contract as the driver-backed repository so the
/// operation semantics can be exercised without a running database.
#[derive(Debug, Default)]
pub struct MemoryPeopleRepository {
    people: RwLock<Vec<Person>>,
}

impl MemoryPeopleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PeopleRepository for MemoryPeopleRepository {
    async fn insert_one(&self, draft: PersonDraft) -> Result<Person> {
        draft.validate()?;

        let person = draft.into_person(PersonId::generate());
        self.people.write().await.push(person.clone());

        Ok(person)
    }

    async fn insert_many(&self, drafts: Vec<PersonDraft>) -> Result<Vec<Person>> {
        for draft in &drafts {
            draft.validate()?;
        }

        let people: Vec<_> = drafts
            .into_iter()
            .map(|draft| draft.into_person(PersonId::generate()))
            .collect();
        self.people.write().await.extend(people.iter().cloned());

        Ok(people)
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Person>> {
        let people = self.people.read().await;

        Ok(people.iter().filter(|p| p.name == name).cloned().collect())
    }

    async fn find_one_by_food(&self, food: &str) -> Result<Option<Person>> {
        let people = self.people.read().await;

        Ok(people
            .iter()
            .find(|p| p.favorite_foods.iter().any(|f| f == food))
            .cloned())
    }

    async fn find_by_id(&self, id: PersonId) -> Result<Option<Person>> {
        let people = self.people.read().await;

        Ok(people.iter().find(|p| p.id == id).cloned())
    }

    async fn save(&self, person: &Person) -> Result<()> {
        let mut people = self.people.write().await;
        let slot = people
            .iter_mut()
            .find(|p| p.id == person.id)
            .ok_or(StoreError::NotFound)?;
        *slot = person.clone();

        Ok(())
    }

    async fn update_first(&self, filter: PersonFilter, patch: PersonPatch) -> Result<Person> {
        if patch.is_empty() {
            return Err(StoreError::Validation("patch sets no fields".into()));
        }

        let mut people = self.people.write().await;
        let person = people
            .iter_mut()
            .find(|p| filter.matches(p))
            .ok_or(StoreError::NotFound)?;
        patch.apply(person);

        Ok(person.clone())
    }

    async fn delete_by_id(&self, id: PersonId) -> Result<Person> {
        let mut people = self.people.write().await;
        let index = people
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;

        Ok(people.remove(index))
    }

    async fn delete_many(&self, filter: PersonFilter) -> Result<u64> {
        let mut people = self.people.write().await;
        let before = people.len();
        people.retain(|p| !filter.matches(p));

        Ok((before - people.len()) as u64)
    }

    async fn search(&self, query: PersonQuery) -> Result<Vec<Person>> {
        let mut matches: Vec<_> = {
            let people = self.people.read().await;
            people
                .iter()
                .filter(|p| query.filter.matches(p))
                .cloned()
                .collect()
        };

        if let Some((key, order)) = query.sort {
            matches.sort_by(|a, b| {
                let ordering = match key {
                    SortKey::Name => a.name.cmp(&b.name),
                    SortKey::Age => a.age.cmp(&b.age),
                };
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit {
            matches.truncate(limit as usize);
        }
        for person in &mut matches {
            if query.omit_age {
                person.age = None;
            }
            if query.omit_favorite_foods {
                person.favorite_foods.clear();
            }
        }

        Ok(matches)
    }
}
