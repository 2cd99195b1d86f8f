pub mod article;
pub mod quiz;
pub mod selection;
pub mod treasure;
