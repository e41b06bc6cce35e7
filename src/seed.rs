//! Static seed dataset / 静态种子数据
//!
//! Served directly when no store is configured and inserted into the store by
//! `POST /api/seed`. Initialized once, never mutated.

use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::models::{Advocate, NewAdvocate};

/// Filterable specialty catalog / 可筛选的专长列表
pub const SPECIALTIES: &[&str] = &[
    "Bipolar",
    "LGBTQ",
    "Medication/Prescribing",
    "Suicide History/Attempts",
    "General Mental Health (anxiety, depression, stress, grief, life transitions)",
    "Men's issues",
    "Relationship Issues (family, friends, couple, etc)",
    "Trauma & PTSD",
    "Personality disorders",
    "Personal growth",
    "Substance use/abuse",
    "Pediatrics",
    "Women's issues (post-partum, infertility, family planning)",
    "Chronic pain",
    "Weight loss & nutrition",
    "Eating disorders",
    "Diabetic Diet and nutrition",
    "Coaching (leadership, career, academic and wellness)",
    "Life coaching",
    "Obsessive-compulsive disorders",
    "Neuropsychological evaluations & testing (ADHD testing)",
    "Attention and Hyperactivity (ADHD)",
    "Sleep issues",
    "Schizophrenia and psychotic disorders",
    "Learning disorders",
    "Domestic abuse",
];

/// (first, last, city, degree, specialty indexes, years, phone)
type SeedRow = (&'static str, &'static str, &'static str, &'static str, &'static [usize], i64, i64);

const ROWS: &[SeedRow] = &[
    ("John", "Doe", "New York", "MD", &[0, 1, 2], 10, 5551234567),
    ("Jane", "Smith", "Los Angeles", "PhD", &[4, 6], 8, 5559876543),
    ("Alice", "Johnson", "Chicago", "MSW", &[7, 8, 9], 5, 5554567890),
    ("Michael", "Brown", "Houston", "MD", &[10, 3], 12, 5556543210),
    ("Emily", "Davis", "Phoenix", "PhD", &[11, 12], 7, 5553210987),
    ("Chris", "Martinez", "Philadelphia", "MSW", &[13, 14, 15], 9, 5557890123),
    ("Jessica", "Taylor", "San Antonio", "MD", &[16, 17], 11, 5554561234),
    ("David", "Harris", "San Diego", "PhD", &[18, 19, 5], 6, 5557896543),
    ("Laura", "Clark", "Dallas", "MSW", &[20, 21], 4, 5550123456),
    ("Daniel", "Lewis", "San Jose", "MD", &[22, 23, 0], 13, 5553217654),
    ("Sarah", "Lee", "Austin", "PhD", &[24, 25], 10, 5551238765),
    ("James", "King", "Jacksonville", "MSW", &[4, 7], 5, 5556540987),
    ("Megan", "Green", "San Francisco", "MD", &[1, 6, 9], 14, 5553216543),
    ("Joshua", "Walker", "Columbus", "PhD", &[2, 10], 9, 5554329876),
    ("Amanda", "Hall", "Fort Worth", "MSW", &[12, 15, 22], 3, 5558765432),
];

fn build_seed() -> Vec<NewAdvocate> {
    ROWS.iter()
        .map(|&(first, last, city, degree, specialties, years, phone)| NewAdvocate {
            first_name: first.to_string(),
            last_name: last.to_string(),
            city: city.to_string(),
            degree: degree.to_string(),
            specialties: specialties.iter().map(|&i| SPECIALTIES[i].to_string()).collect(),
            years_of_experience: years,
            phone_number: phone,
        })
        .collect()
}

static SEED: Lazy<Vec<NewAdvocate>> = Lazy::new(build_seed);

/// Seed rows without ids, in insertion order / 种子数据（无ID）
pub fn seed_advocates() -> &'static [NewAdvocate] {
    &SEED
}

/// Assign ids `1..=n` in order, matching a freshly seeded store / 按顺序分配ID
pub fn with_sequential_ids(rows: &[NewAdvocate]) -> Arc<[Advocate]> {
    rows.iter()
        .cloned()
        .zip(1i64..)
        .map(|(row, id)| Advocate::from_new(id, row))
        .collect()
}
