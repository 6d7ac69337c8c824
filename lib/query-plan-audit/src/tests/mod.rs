mod audit;
mod testkit;
mod walker;
