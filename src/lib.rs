// Library exports for blastsieve
pub mod blast_table;
pub mod compare;
pub mod config;
pub mod extract;
pub mod fasta;
pub mod heatmap;
pub mod hit;
pub mod input;
pub mod pipeline;
pub mod shared;
pub mod threshold;
