pub mod circuit;
pub mod component;
pub mod events;

pub use circuit::*;
pub use component::*;
pub use events::*;
