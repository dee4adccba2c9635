//! Sample data seeding
//!
//! Populates the six well-known sample stones (`WS-2024-001`..`WS-2024-006`)
//! into an empty store. A store that already holds any stone is left alone,
//! so running the seeder on every startup is safe.

use crate::storage::{StoneStore, StoreHandle};
use crate::stone::NewStone;
use crate::{Error, Result};

/// One row of the fixed sample dataset
#[derive(Debug, Clone, Copy)]
pub struct SampleStone {
    pub name: &'static str,
    pub unique_id: &'static str,
    pub preview_url: &'static str,
    pub description: &'static str,
    pub location: &'static str,
}

impl SampleStone {
    pub fn to_new_stone(&self) -> NewStone {
        NewStone::new(self.name, self.unique_id)
            .with_preview_url(self.preview_url)
            .with_description(self.description)
            .with_location(self.location)
    }
}

/// The sample dataset, in insertion order
pub const SAMPLE_STONES: &[SampleStone] = &[
    SampleStone {
        name: "Schwarzwaldstein",
        unique_id: "WS-2024-001",
        preview_url: "https://picsum.photos/300/200?random=1",
        description: "Ein historischer Wanderstein im Herzen des Schwarzwaldes",
        location: "Schwarzwald, Baden-Württemberg",
    },
    SampleStone {
        name: "Alpenblick",
        unique_id: "WS-2024-002",
        preview_url: "https://picsum.photos/300/200?random=2",
        description: "Wanderstein mit herrlichem Blick auf die Alpen",
        location: "Allgäu, Bayern",
    },
    SampleStone {
        name: "Rheintalweg",
        unique_id: "WS-2024-003",
        preview_url: "https://picsum.photos/300/200?random=3",
        description: "Markanter Stein am Rheintalweg",
        location: "Rheintal, Baden-Württemberg",
    },
    SampleStone {
        name: "Berggipfel",
        unique_id: "WS-2024-004",
        preview_url: "https://picsum.photos/300/200?random=4",
        description: "Wanderstein auf dem höchsten Punkt der Route",
        location: "Harz, Niedersachsen",
    },
    SampleStone {
        name: "Waldlichtung",
        unique_id: "WS-2024-005",
        preview_url: "https://picsum.photos/300/200?random=5",
        description: "Ruhiger Wanderstein in einer schönen Waldlichtung",
        location: "Eifel, Nordrhein-Westfalen",
    },
    SampleStone {
        name: "Seeufer",
        unique_id: "WS-2024-006",
        preview_url: "https://picsum.photos/300/200?random=6",
        description: "Wanderstein direkt am malerischen Seeufer",
        location: "Chiemsee, Bayern",
    },
];

/// How inserts are grouped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedMode {
    /// All inserts in one transaction; a failure leaves the store untouched
    #[default]
    Atomic,
    /// One insert at a time; stones inserted before a failure are kept
    Sequential,
}

/// What a seeding run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The store was not empty; nothing was written
    AlreadySeeded { existing: u64 },
    /// The store was empty and this many stones were inserted
    Inserted(usize),
}

/// Seed the store behind `handle` with [`SAMPLE_STONES`]
pub async fn seed(handle: &StoreHandle, mode: SeedMode) -> Result<SeedOutcome> {
    seed_stones(handle.store(), &sample_stones(), mode).await
}

/// The sample dataset as insert payloads
pub fn sample_stones() -> Vec<NewStone> {
    SAMPLE_STONES.iter().map(SampleStone::to_new_stone).collect()
}

/// Insert `stones` into `store` unless it already holds data.
///
/// Any failure, including the emptiness check, is reported as
/// `Error::Seed`; callers are expected to log it and keep serving.
pub async fn seed_stones(
    store: &dyn StoneStore,
    stones: &[NewStone],
    mode: SeedMode,
) -> Result<SeedOutcome> {
    let existing = store.count().await.map_err(Error::Seed)?;
    if existing > 0 {
        tracing::debug!(existing, "Store already populated, skipping seed");
        return Ok(SeedOutcome::AlreadySeeded { existing });
    }

    match mode {
        SeedMode::Atomic => {
            store.create_all(stones).await.map_err(Error::Seed)?;
        }
        SeedMode::Sequential => {
            for stone in stones {
                store.create(stone).await.map_err(|e| {
                    tracing::warn!(unique_id = %stone.unique_id, "Seed insert failed, aborting");
                    Error::Seed(e)
                })?;
            }
        }
    }

    tracing::info!(count = stones.len(), ?mode, backend = %store.kind(), "Seeded sample stones");
    Ok(SeedOutcome::Inserted(stones.len()))
}
