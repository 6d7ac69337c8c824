mod engines;
mod operations;
