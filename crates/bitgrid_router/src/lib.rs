//! The Manhattan router: inserts `ROUTE4` pass-through cells so every
//! cell input ends up reading from an orthogonally adjacent neighbor.

#![warn(missing_docs)]

pub mod astar;
pub mod error;
pub mod lut;
pub mod pass;
pub mod router;

pub use error::RouteError;
pub use lut::route_luts;
pub use pass::route_program;
pub use router::ManhattanRouter;
