pub mod car_rental;
pub mod grid_world;
