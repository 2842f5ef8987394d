mod palette;
pub mod week_grid;
