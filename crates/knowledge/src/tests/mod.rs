//! End-to-end pipeline tests over in-memory collaborators.
