pub mod capture;
pub mod ring;
pub mod sink;
