pub mod aggregate;
pub mod catalog;
pub mod forecast;
pub mod icons;
pub mod jma;
pub mod normalize;
