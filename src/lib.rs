//! Typed access to a `people` collection in a document database.
//!
//! [`PeopleRepository`] is the facade: a fixed set of CRUD and query
//! operations, each delegating to a single driver call.
//! [`MongoPeopleRepository`] is the document-database implementation;
//! [`MemoryPeopleRepository`] runs the same contract in process for tests.

pub mod domains;
pub mod error;
pub mod repositories;

pub use domains::{Person, PersonDraft, PersonId};
pub use error::{Result, StoreError};
pub use repositories::memory::MemoryPeopleRepository;
pub use repositories::mongo::MongoPeopleRepository;
pub use repositories::{
    PeopleRepository, PersonFilter, PersonPatch, PersonQuery, SortKey, SortOrder,
};
