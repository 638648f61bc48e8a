pub mod boundaries;
pub mod levenshtein;
pub mod report;
pub mod transcript;
