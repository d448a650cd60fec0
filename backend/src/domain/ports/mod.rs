//! Domain ports and supporting types for the hexagonal boundary.

mod movie_repository;

pub use movie_repository::{FixtureMovieRepository, MovieRepository};
