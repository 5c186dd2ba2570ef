
mod counts;
mod engine;
