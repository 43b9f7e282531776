pub mod bentley_ottmann;
pub mod naive;

#[doc(inline)]
pub use bentley_ottmann::find_intersections;
