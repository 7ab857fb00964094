use std::process;

use anyhow::Context;
use people_store::{
    MongoPeopleRepository, PeopleRepository, PersonDraft, PersonFilter, PersonPatch, PersonQuery,
    SortKey, SortOrder,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let repository = match MongoPeopleRepository::connect_from_env().await {
        Ok(repository) => repository,
        Err(err) => {
            tracing::error!(%err, "failed to reach storage engine");
            process::exit(1);
        }
    };

    if let Err(err) = run_chain(&repository).await {
        tracing::error!(%err, "operation chain halted");
        process::exit(1);
    }

    repository.close().await;
}

/// Runs every operation once, strictly sequentially. The first error stops
/// the chain.
async fn run_chain(repository: &dyn PeopleRepository) -> anyhow::Result<()> {
    let john = repository
        .insert_one(PersonDraft {
            name: "John Doe".into(),
            age: Some(30),
            favorite_foods: vec!["Pizza".into(), "Burger".into()],
        })
        .await?;
    tracing::info!(id = %john.id, "created and saved person");

    let created = repository
        .insert_many(vec![
            PersonDraft {
                name: "Alice".into(),
                age: Some(25),
                favorite_foods: vec!["Sushi".into()],
            },
            PersonDraft {
                name: "Bob".into(),
                age: Some(35),
                favorite_foods: vec!["Steak".into(), "Pasta".into()],
            },
        ])
        .await?;
    tracing::info!(count = created.len(), "created many people");

    let named = repository.find_by_name("Alice").await?;
    tracing::info!(count = named.len(), "found people by name");

    let pizza_fan = repository
        .find_one_by_food("Pizza")
        .await?
        .context("nobody likes pizza")?;
    tracing::info!(name = %pizza_fan.name, "found person by favorite food");

    let loaded = repository
        .find_by_id(pizza_fan.id)
        .await?
        .context("person vanished between queries")?;
    tracing::info!(id = %loaded.id, "found person by id");

    let updated = repository
        .load_modify_save(
            loaded.id,
            Box::new(|person| person.favorite_foods.push("Hamburger".into())),
        )
        .await?;
    tracing::info!(foods = ?updated.favorite_foods, "edited and saved person");

    let bob = repository
        .update_first(
            PersonFilter::Name("Bob".into()),
            PersonPatch {
                age: Some(20),
                ..PersonPatch::default()
            },
        )
        .await?;
    tracing::info!(age = ?bob.age, "updated person in place");

    let removed = repository.delete_by_id(bob.id).await?;
    tracing::info!(name = %removed.name, "removed person by id");

    let deleted = repository
        .delete_many(PersonFilter::Name("Mary".into()))
        .await?;
    tracing::info!(deleted, "removed people by name");

    let results = repository
        .search(
            PersonQuery::new(PersonFilter::Food("Burritos".into()))
                .sort(SortKey::Name, SortOrder::Ascending)
                .limit(2)
                .omit_age(),
        )
        .await?;
    tracing::info!(count = results.len(), "query chain finished");

    Ok(())
}
