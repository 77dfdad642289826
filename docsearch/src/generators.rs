//! Synthetic documents for the demo run.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use docsearch_shared::{CatalogItem, FileRecord};

const NOUNS: &[&str] = &[
    "site", "plan", "survey", "budget", "permit", "contract", "invoice", "schedule", "drawing",
    "inspection", "estimate", "proposal", "summary", "audit", "inventory",
];

const ADJECTIVES: &[&str] = &[
    "annual",
    "quarterly",
    "preliminary",
    "final",
    "revised",
    "detailed",
    "internal",
    "external",
    "technical",
    "financial",
];

const OWNERS: &[&str] = &[
    "Northwind Traders",
    "Contoso",
    "Fabrikam",
    "Tailspin Toys",
    "Wide World Importers",
];

const SECTIONS: &[&str] = &["Drawings", "Specifications", "Correspondence", "Submittals", "Reports"];

const CONTENT_TYPE: &str = "application/pdf";

/// Generates file records and catalog items.
///
/// Titles and file names carry a running counter, so every generated document is
/// distinguishable even when the random words repeat.
pub struct DataGenerator {
    rng: StdRng,
    file_counter: usize,
    catalog_counter: usize,
}

impl Default for DataGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DataGenerator {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic generator for tests.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            file_counter: 0,
            catalog_counter: 0,
        }
    }

    fn pick(&mut self, words: &[&'static str]) -> &'static str {
        words.choose(&mut self.rng).copied().unwrap_or_default()
    }

    /// Generate `count` file records sharing one creation timestamp.
    pub fn file_records(&mut self, count: usize) -> Vec<FileRecord> {
        let created_on = Utc::now();
        let file_text = format!(
            "The cat runs and jumps all morning long {}",
            created_on.format("%Y-%m-%d %H:%M:%S")
        );

        (0..count)
            .map(|_| {
                let n = self.file_counter;
                self.file_counter += 1;

                let adjective = self.pick(ADJECTIVES);
                let noun = self.pick(NOUNS);
                let section_number = self.rng.gen_range(1..=20);

                FileRecord {
                    id: Uuid::new_v4().to_string(),
                    owner_id: Uuid::new_v4(),
                    owner_name: self.pick(OWNERS).to_string(),
                    section_id: Uuid::new_v4().to_string(),
                    section_name: self.pick(SECTIONS).to_string(),
                    section_number: format!("{:02}", section_number),
                    file_name: format!("{}-{}.pdf", noun, n),
                    content_type: CONTENT_TYPE.to_string(),
                    title: format!("{} {} report {}", adjective, noun, n),
                    file_text: file_text.clone(),
                    created_on,
                }
            })
            .collect()
    }

    /// Generate `count` catalog items titled `Title - n` / `Description - n`.
    pub fn catalog_items(&mut self, count: usize) -> Vec<CatalogItem> {
        (0..count)
            .map(|_| {
                let n = self.catalog_counter;
                self.catalog_counter += 1;
                CatalogItem::new(format!("Title - {}", n), format!("Description - {}", n))
            })
            .collect()
    }
}
