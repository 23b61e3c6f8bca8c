//! GPS-to-map positioning algorithms

pub mod affine;
pub mod fallback;
pub mod mapper;
pub mod proximity;

pub use affine::{AffineTransform, ControlPoint, TripletSelection};
pub use fallback::VenueBounds;
pub use mapper::{CoordinateMapper, FallbackReason, MappingMethod, MappingResult};
pub use proximity::{haversine_distance, ProximityMatcher};
