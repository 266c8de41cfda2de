pub mod analyzer;
pub mod cache;
pub mod enrichment;
pub mod grading;
pub mod paginator;
pub mod provider;
pub mod resolver;
pub mod sorting;
pub mod transcript;

#[cfg(test)]
pub mod testing;
