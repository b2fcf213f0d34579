// Domain layer - value types shared by every other layer
pub mod options;
pub mod records;
pub mod series;
