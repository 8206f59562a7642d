mod config;
mod line_of_sight;
