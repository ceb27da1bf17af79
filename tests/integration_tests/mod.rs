// Aggregates per-area suites.
mod _support;
mod cli;
mod scenarios;
mod wal_storage;
mod wire;
